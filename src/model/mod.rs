//! Geometry model - provinces and districts as rectangles on an abstract
//! canvas, with per-era color and media overrides.
//!
//! ## Example
//!
//! ```ignore
//! use atlas_editor::{Atlas, EntityKey};
//!
//! let atlas = Atlas::load(&documents, &config)?;
//! for view in atlas.era_view(Some("bronze-age")) {
//!     draw(view.coordinates, view.fill);
//! }
//! ```

mod atlas;
mod district;
mod geometry;
mod province;
mod viewer;

pub use atlas::Atlas;
pub use district::{District, Media, MediaType, Period};
pub use geometry::{Coordinates, Point, Viewport};
pub use province::Province;
pub use viewer::DistrictView;

/// A document persisted under a caller-assigned id.
pub trait Record: Clone {
    /// Stable identifier; immutable once assigned.
    fn id(&self) -> &str;

    fn version(&self) -> u64;

    fn set_version(&mut self, version: u64);
}

/// Derive a document id from a display name: lowercase, each run of
/// whitespace replaced by a single `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
