use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Editor configuration.
///
/// Defaults suit local development; every field can be overridden through
/// `ATLAS_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Local storage key holding the serialized command sequence.
    pub history_key: String,
    /// Local storage key holding the history cursor.
    pub cursor_key: String,
    /// How long a toast stays visible before it is dismissed automatically.
    pub toast_ttl: Duration,
    /// Top-level collection holding provinces.
    pub provinces_collection: String,
    /// Sub-collection (under each province) holding districts.
    pub districts_collection: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Blob path prefix for period media.
    pub media_root: String,
    /// Blob path prefix for district map images.
    pub map_image_root: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            history_key: "editorHistory".into(),
            cursor_key: "editorHistoryIndex".into(),
            toast_ttl: Duration::from_millis(3000),
            provinces_collection: "provinces".into(),
            districts_collection: "districts".into(),
            min_zoom: 0.5,
            max_zoom: 3.0,
            media_root: "media".into(),
            map_image_root: "maps".into(),
        }
    }
}

impl EditorConfig {
    /// Load a `.env` file if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Read configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default              |
    /// |--------------------------------|----------------------|
    /// | `ATLAS_HISTORY_KEY`            | `editorHistory`      |
    /// | `ATLAS_CURSOR_KEY`             | `editorHistoryIndex` |
    /// | `ATLAS_TOAST_TTL_MS`           | `3000`               |
    /// | `ATLAS_PROVINCES_COLLECTION`   | `provinces`          |
    /// | `ATLAS_DISTRICTS_COLLECTION`   | `districts`          |
    /// | `ATLAS_MIN_ZOOM`               | `0.5`                |
    /// | `ATLAS_MAX_ZOOM`               | `3.0`                |
    /// | `ATLAS_MEDIA_ROOT`             | `media`              |
    /// | `ATLAS_MAP_IMAGE_ROOT`         | `maps`               |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = EditorConfig::default();

        let toast_ttl = match lookup("ATLAS_TOAST_TTL_MS") {
            Some(raw) => Duration::from_millis(parse("ATLAS_TOAST_TTL_MS", raw)?),
            None => defaults.toast_ttl,
        };
        let min_zoom = match lookup("ATLAS_MIN_ZOOM") {
            Some(raw) => parse("ATLAS_MIN_ZOOM", raw)?,
            None => defaults.min_zoom,
        };
        let max_zoom = match lookup("ATLAS_MAX_ZOOM") {
            Some(raw) => parse("ATLAS_MAX_ZOOM", raw)?,
            None => defaults.max_zoom,
        };
        if !(min_zoom > 0.0 && min_zoom <= max_zoom) {
            return Err(ConfigError::Invalid {
                var: "ATLAS_MIN_ZOOM",
                value: min_zoom.to_string(),
            });
        }

        Ok(EditorConfig {
            history_key: lookup("ATLAS_HISTORY_KEY").unwrap_or(defaults.history_key),
            cursor_key: lookup("ATLAS_CURSOR_KEY").unwrap_or(defaults.cursor_key),
            toast_ttl,
            provinces_collection: lookup("ATLAS_PROVINCES_COLLECTION")
                .unwrap_or(defaults.provinces_collection),
            districts_collection: lookup("ATLAS_DISTRICTS_COLLECTION")
                .unwrap_or(defaults.districts_collection),
            min_zoom,
            max_zoom,
            media_root: lookup("ATLAS_MEDIA_ROOT").unwrap_or(defaults.media_root),
            map_image_root: lookup("ATLAS_MAP_IMAGE_ROOT").unwrap_or(defaults.map_image_root),
        })
    }

    /// Collection path for provinces.
    pub fn province_path(&self) -> String {
        self.provinces_collection.clone()
    }

    /// Collection path for the districts of one province.
    pub fn district_path(&self, province_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.provinces_collection, province_id, self.districts_collection
        )
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value: raw })
}
