//! Drag-to-reposition: many live moves, one recorded command.

use atlas_editor::{Actor, Change, Coordinates, EditorError, EntityKey, Point};

use crate::support::{harbor_backend, Backend};

#[test]
fn fifty_moves_record_one_command() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));

    session
        .begin_drag("north", "harbor", Point::new(0.0, 0.0))
        .unwrap();
    assert!(session.is_dragging());
    assert_eq!(
        session.atlas().selection(),
        Some(&EntityKey::district("north", "harbor"))
    );

    for step in 1..=50 {
        let dy = (step * 3 / 5) as f64;
        assert!(session.drag_to(Point::new(step as f64, dy)));
    }
    // Live state follows the pointer while nothing is recorded yet.
    assert_eq!(
        session.atlas().district("north", "harbor").unwrap().coordinates,
        Coordinates::new(150.0, 130.0, 50.0, 50.0)
    );
    assert!(session.history().is_empty());

    assert_eq!(session.end_drag().unwrap(), Some(1));
    assert!(!session.is_dragging());
    assert_eq!(session.history().len(), 1);

    match &session.history().commands()[0].change {
        Change::UpdateDistrict {
            province_id,
            new_state,
            previous_state,
        } => {
            assert_eq!(province_id, "north");
            assert_eq!(previous_state.coordinates.x, 100.0);
            assert_eq!(previous_state.coordinates.y, 100.0);
            assert_eq!(new_state.coordinates.x, 150.0);
            assert_eq!(new_state.coordinates.y, 130.0);
            assert_eq!(new_state.version, previous_state.version + 1);
        }
        other => panic!("unexpected change: {other:?}"),
    }

    session.undo().unwrap();
    let harbor = session.atlas().district("north", "harbor").unwrap();
    assert_eq!(harbor.coordinates.x, 100.0);
    assert_eq!(harbor.coordinates.y, 100.0);
}

#[test]
fn drag_delta_is_scaled_by_zoom() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));
    session.zoom(2.0);

    session
        .begin_drag("north", "harbor", Point::new(10.0, 10.0))
        .unwrap();
    session.drag_to(Point::new(50.0, 30.0));
    session.end_drag().unwrap();

    let harbor = session.atlas().district("north", "harbor").unwrap();
    assert_eq!(harbor.coordinates.x, 120.0);
    assert_eq!(harbor.coordinates.y, 110.0);
}

#[test]
fn release_without_movement_records_nothing() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));

    session
        .begin_drag("north", "harbor", Point::new(5.0, 5.0))
        .unwrap();
    session.drag_to(Point::new(5.0, 5.0));
    assert_eq!(session.end_drag().unwrap(), None);
    assert!(session.history().is_empty());

    // No drag in progress.
    assert!(!session.drag_to(Point::new(9.0, 9.0)));
    assert_eq!(session.end_drag().unwrap(), None);
}

#[test]
fn cancel_restores_the_original_position() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));

    session
        .begin_drag("north", "harbor", Point::new(0.0, 0.0))
        .unwrap();
    session.drag_to(Point::new(40.0, 40.0));
    assert!(session.cancel_drag());
    assert!(!session.cancel_drag());

    let harbor = session.atlas().district("north", "harbor").unwrap();
    assert_eq!(harbor.coordinates.x, 100.0);
    assert!(session.history().is_empty());
}

#[test]
fn undo_mid_drag_cancels_it() {
    let backend = harbor_backend();
    let mut session = backend.session(Actor::editor("alice"));
    session
        .edit_district("north", "harbor", |d| d.visitor_tips = "Bring a coat".into())
        .unwrap();

    session
        .begin_drag("north", "harbor", Point::new(0.0, 0.0))
        .unwrap();
    session.drag_to(Point::new(30.0, 0.0));
    assert_eq!(session.undo().unwrap(), Some(1));

    assert!(!session.is_dragging());
    let harbor = session.atlas().district("north", "harbor").unwrap();
    assert_eq!(harbor.coordinates.x, 100.0);
    assert_eq!(harbor.visitor_tips, "");
}

#[test]
fn dragging_someone_elses_district_is_refused() {
    let backend = Backend::new();
    backend.seed_province("north", "alice", false);
    backend.seed_district("north", "harbor", "alice", false);
    let mut bob = backend.session(Actor::editor("bob"));

    let err = bob
        .begin_drag("north", "harbor", Point::new(0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, EditorError::Authorization { .. }));
    assert!(!bob.is_dragging());
    assert!(!bob.drag_to(Point::new(10.0, 10.0)));
}
