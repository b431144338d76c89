use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::info;

use crate::command::{Change, EntityKey};
use crate::error::EditorError;
use crate::history::KeyValueStore;
use crate::model::{Media, MediaType};
use crate::notify::ToastLevel;
use crate::persistence::{BlobStore, DocumentStore};

use super::EditorSession;

/// Where a staged file goes once uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Media attached to one period of the district.
    Media { era: String },
    /// The district's map image.
    MapImage,
}

/// A local file selected for upload but not yet transferred.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpload {
    pub province_id: String,
    pub district_id: String,
    pub target: UploadTarget,
    pub file_name: String,
    pub content_type: String,
    pub media_type: MediaType,
    bytes: Vec<u8>,
}

impl StagedUpload {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Inline `data:` URL for previewing the file before it is uploaded.
    pub fn preview_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

impl<K, D, B> EditorSession<K, D, B>
where
    K: KeyValueStore,
    D: DocumentStore,
    B: BlobStore,
{
    /// Stage an image or video for one of a district's periods.
    pub fn stage_media(
        &mut self,
        province_id: &str,
        district_id: &str,
        era: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StagedUpload, EditorError> {
        let result = self.try_stage(
            province_id,
            district_id,
            UploadTarget::Media {
                era: era.to_string(),
            },
            file_name,
            content_type,
            bytes,
        );
        self.report(result)
    }

    /// Stage a map image for a district.
    pub fn stage_map_image(
        &mut self,
        province_id: &str,
        district_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StagedUpload, EditorError> {
        let result = self.try_stage(
            province_id,
            district_id,
            UploadTarget::MapImage,
            file_name,
            content_type,
            bytes,
        );
        self.report(result)
    }

    fn try_stage(
        &self,
        province_id: &str,
        district_id: &str,
        target: UploadTarget,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StagedUpload, EditorError> {
        let key = EntityKey::district(province_id, district_id);
        let district = self
            .atlas
            .district(province_id, district_id)
            .ok_or_else(|| EditorError::NotFound(key.to_string()))?;
        self.authorize(district, &key)?;

        let file_name = file_name.trim();
        if file_name.is_empty() || file_name.contains('/') {
            return Err(EditorError::Validation(format!(
                "invalid file name {:?}",
                file_name
            )));
        }
        if bytes.is_empty() {
            return Err(EditorError::Validation(format!("{} is empty", file_name)));
        }

        let media_type = MediaType::from_content_type(content_type).ok_or_else(|| {
            EditorError::Validation(format!("unsupported content type {}", content_type))
        })?;
        match &target {
            UploadTarget::Media { era } => {
                if district.period(era).is_none() {
                    return Err(EditorError::NotFound(format!("era {} on {}", era, key)));
                }
            }
            UploadTarget::MapImage => {
                if media_type != MediaType::Image {
                    return Err(EditorError::Validation(
                        "a map image must be an image".into(),
                    ));
                }
            }
        }

        Ok(StagedUpload {
            province_id: province_id.to_string(),
            district_id: district_id.to_string(),
            target,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            media_type,
            bytes,
        })
    }

    /// Transfer staged media and record `uploadMedia` with the durable URL.
    pub fn upload_media(
        &mut self,
        staged: &StagedUpload,
        description: &str,
    ) -> Result<u64, EditorError> {
        let result = match &staged.target {
            UploadTarget::Media { .. } => self.try_upload(staged, description),
            UploadTarget::MapImage => Err(EditorError::Validation(
                "staged file is a map image, not period media".into(),
            )),
        };
        self.report(result)
    }

    /// Transfer a staged map image and record `uploadMapImage`.
    pub fn upload_map_image(&mut self, staged: &StagedUpload) -> Result<u64, EditorError> {
        let result = match &staged.target {
            UploadTarget::MapImage => self.try_upload(staged, ""),
            UploadTarget::Media { .. } => Err(EditorError::Validation(
                "staged file is period media, not a map image".into(),
            )),
        };
        self.report(result)
    }

    /// Nothing is recorded unless the transfer succeeds; a failed transfer
    /// can simply be retried with the same staged file.
    fn try_upload(&mut self, staged: &StagedUpload, description: &str) -> Result<u64, EditorError> {
        let key = EntityKey::district(staged.province_id.as_str(), staged.district_id.as_str());
        let previous = self
            .atlas
            .district(&staged.province_id, &staged.district_id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(key.to_string()))?;
        self.authorize(&previous, &key)?;

        let path = match &staged.target {
            UploadTarget::Media { era } => format!(
                "{}/{}/{}/{}/{}",
                self.config.media_root,
                staged.province_id,
                staged.district_id,
                era,
                staged.file_name
            ),
            UploadTarget::MapImage => format!(
                "{}/{}/{}/{}",
                self.config.map_image_root, staged.province_id, staged.district_id, staged.file_name
            ),
        };

        let url = self
            .blobs
            .upload_blob(&path, &staged.bytes)
            .map_err(|err| EditorError::Transfer(format!("{}: {}", staged.file_name, err)))?;

        let mut next = previous.clone();
        next.version = previous.version + 1;
        let change = match &staged.target {
            UploadTarget::Media { era } => {
                let period = next.period_mut(era).ok_or_else(|| {
                    EditorError::NotFound(format!("era {} on {}", era, key))
                })?;
                period.media.push(Media {
                    kind: staged.media_type,
                    url: url.clone(),
                    description: description.to_string(),
                });
                Change::UploadMedia {
                    province_id: staged.province_id.clone(),
                    era: era.clone(),
                    new_state: next,
                    previous_state: previous,
                }
            }
            UploadTarget::MapImage => {
                next.map_image_url = Some(url.clone());
                Change::UploadMapImage {
                    province_id: staged.province_id.clone(),
                    new_state: next,
                    previous_state: previous,
                }
            }
        };

        let sequence_id = self.record(change)?;
        info!(target_key = %key, url = %url, "upload recorded");
        self.notifier
            .notify(ToastLevel::Success, format!("{} uploaded", staged.file_name));
        Ok(sequence_id)
    }
}
