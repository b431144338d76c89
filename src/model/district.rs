use serde::{Deserialize, Serialize};

use super::geometry::Coordinates;
use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classify a MIME content type. Anything other than `image/*` or
    /// `video/*` is not media.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let major = content_type.split('/').next()?.trim().to_ascii_lowercase();
        match major.as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaType,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// A historical era attached to a district.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Period {
    pub era: String,
    pub color: String,
    pub description: String,
    pub media: Vec<Media>,
}

impl Period {
    pub fn new(era: impl Into<String>, color: impl Into<String>) -> Self {
        Period {
            era: era.into(),
            color: color.into(),
            ..Period::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct District {
    pub id: String,
    pub name: String,
    pub localized_name: String,
    pub created_by: String,
    pub lock: bool,
    pub version: u64,
    pub coordinates: Coordinates,
    pub base_color: String,
    pub historical_periods: Vec<Period>,
    pub map_image_url: Option<String>,
    pub cultural_significance: String,
    pub visitor_tips: String,
}

impl District {
    pub fn period(&self, era: &str) -> Option<&Period> {
        self.historical_periods.iter().find(|p| p.era == era)
    }

    pub fn period_mut(&mut self, era: &str) -> Option<&mut Period> {
        self.historical_periods.iter_mut().find(|p| p.era == era)
    }

    /// Fill color for the selected era: the period override when one
    /// exists, otherwise the base color.
    pub fn fill_for(&self, era: Option<&str>) -> &str {
        era.and_then(|era| self.period(era))
            .map(|period| period.color.as_str())
            .filter(|color| !color.is_empty())
            .unwrap_or(self.base_color.as_str())
    }
}

impl Record for District {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
