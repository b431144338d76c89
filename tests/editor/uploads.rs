//! Media and map image uploads.

use atlas_editor::{Actor, CommandKind, EditorError, MediaType, ToastLevel};

use crate::support::harbor_backend;

#[test]
fn media_upload_records_the_durable_url() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));

    let staged = session
        .stage_media("north", "harbor", "1900s", "pier.png", "image/png", b"png".to_vec())
        .unwrap();
    assert_eq!(staged.media_type, MediaType::Image);
    assert_eq!(staged.preview_url(), "data:image/png;base64,cG5n");
    // Staging alone touches neither the object store nor the history.
    assert!(backend.blobs.inner().is_empty().unwrap());
    assert!(session.history().is_empty());

    let seq = session.upload_media(&staged, "The old pier").unwrap();
    assert_eq!(seq, 1);
    assert_eq!(
        session.history().commands()[0].kind(),
        CommandKind::UploadMedia
    );

    let path = "media/north/harbor/1900s/pier.png";
    assert_eq!(
        backend.blobs.inner().get(path).unwrap(),
        Some(b"png".to_vec())
    );

    let harbor = session.atlas().district("north", "harbor").unwrap();
    let media = &harbor.period("1900s").unwrap().media;
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].url, format!("memory://{}", path));
    assert_eq!(media[0].description, "The old pier");
    assert_eq!(harbor.version, 2);

    let toast = session.notifier().last().unwrap();
    assert_eq!(toast.level, ToastLevel::Success);

    session.undo().unwrap();
    let harbor = session.atlas().district("north", "harbor").unwrap();
    assert!(harbor.period("1900s").unwrap().media.is_empty());
}

#[test]
fn failed_transfer_records_nothing() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));
    let staged = session
        .stage_map_image("north", "harbor", "map.jpg", "image/jpeg", vec![1, 2, 3])
        .unwrap();

    backend.blobs.set_offline(true);
    let err = session.upload_map_image(&staged).unwrap_err();
    assert!(matches!(err, EditorError::Transfer(_)));
    assert!(session.history().is_empty());
    assert_eq!(
        session.atlas().district("north", "harbor").unwrap().map_image_url,
        None
    );
    assert_eq!(session.notifier().last().unwrap().level, ToastLevel::Error);

    // The same staged file can be retried once the store is back.
    backend.blobs.set_offline(false);
    session.upload_map_image(&staged).unwrap();
    assert_eq!(
        session
            .atlas()
            .district("north", "harbor")
            .unwrap()
            .map_image_url
            .as_deref(),
        Some("memory://maps/north/harbor/map.jpg")
    );
    assert_eq!(
        session.history().commands()[0].kind(),
        CommandKind::UploadMapImage
    );
}

#[test]
fn staging_validates_the_file() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));

    let err = session
        .stage_media("north", "harbor", "1900s", "notes.txt", "text/plain", b"hi".to_vec())
        .unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));

    let err = session
        .stage_media("north", "harbor", "1700s", "pier.png", "image/png", b"png".to_vec())
        .unwrap_err();
    assert!(matches!(err, EditorError::NotFound(_)));

    let err = session
        .stage_map_image("north", "harbor", "tour.mp4", "video/mp4", b"mp4".to_vec())
        .unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));

    let video = session
        .stage_media("north", "harbor", "1900s", "tour.mp4", "video/mp4", b"mp4".to_vec())
        .unwrap();
    assert_eq!(video.media_type, MediaType::Video);

    // Period media cannot be sent through the map image path.
    let err = session.upload_map_image(&video).unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));
}

#[test]
fn uploads_respect_the_gate() {
    let backend = harbor_backend();
    let mut bob = backend.session(Actor::editor("bob"));

    let err = bob
        .stage_media("north", "harbor", "1900s", "pier.png", "image/png", b"png".to_vec())
        .unwrap_err();
    assert!(matches!(err, EditorError::Authorization { .. }));
    assert!(backend.blobs.inner().is_empty().unwrap());
}
