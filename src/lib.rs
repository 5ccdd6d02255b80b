//! realpx - Restore upscaled pixel art to its true resolution
//!
//! A library for detecting the pixel grid of nearest-neighbour upscaled art
//! and downsampling it back to one pixel per logical pixel.

pub mod cli;
pub mod detect;
pub mod error;
pub mod output;
pub mod render;
pub mod settings;
pub mod transform;
pub mod types;

pub use detect::{detect, detect_with, Candidate, CandidateRange, DetectOptions, DetectionResult};
pub use error::{PxError, Result};
pub use render::{draw_grid_overlay, fit_square, load_raster, write_raster, OverlayStyle};
pub use settings::Settings;
pub use transform::{transform, transform_lines, TransformDiagnostics};
pub use types::{
    BitDepth, ColorExclusionSpec, Colour, Exclusion, GridLines, GridSpec, Polygon, Raster, Rect,
    Region, SampleMode, TransformConfig,
};
