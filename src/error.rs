//! Error kinds surfaced by the compositor core.
//!
//! The core never unwinds across a render call: each layer recovers
//! independently and a failed layer simply keeps whatever was drawn
//! last time (see `Compositor::render`).

use std::fmt;

/// A single discrete failure recognized by this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// No grid has been loaded into the compositor yet.
    MissingGrid,
    /// One of the grid's parallel arrays does not have `rows*cols` entries.
    DimensionMismatch {
        expected: usize,
        found: usize,
        field: &'static str,
    },
    /// `bounds` has zero width or height.
    DegenerateBounds,
    /// `max - min < 0.1` for the height field; not an error, just an empty layer.
    FlatHeightField,
    /// An export raster would exceed the host's maximum texture size.
    TextureSizeExceeded { requested: (u32, u32), max: u32 },
    /// A persisted record had an invalid color or point list and was skipped.
    Import(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MissingGrid => write!(f, "no grid is loaded"),
            MapError::DimensionMismatch {
                expected,
                found,
                field,
            } => write!(
                f,
                "field '{field}' has {found} entries, expected {expected}"
            ),
            MapError::DegenerateBounds => write!(f, "grid bounds have zero extent"),
            MapError::FlatHeightField => write!(f, "height field is flat (max - min < 0.1)"),
            MapError::TextureSizeExceeded { requested, max } => write!(
                f,
                "requested export {}x{} exceeds host maximum of {max}px",
                requested.0, requested.1
            ),
            MapError::Import(msg) => write!(f, "skipped invalid record: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

pub type MapResult<T> = Result<T, MapError>;
