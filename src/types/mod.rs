//! Core types for realpx.

mod colour;
mod config;
mod grid;
mod raster;
mod region;

pub use colour::Colour;
pub use config::{BitDepth, ColorExclusionSpec, Exclusion, SampleMode, TransformConfig};
pub use grid::{GridLines, GridSpec};
pub use raster::Raster;
pub use region::{Polygon, Rect, Region};
