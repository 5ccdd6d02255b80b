//! Raster I/O and image output for realpx.
//!
//! This module handles decoding input images, encoding results as PNG,
//! drawing grid overlays, and fitting results to output size presets.

mod overlay;
mod png;
mod resize;

pub use overlay::{draw_grid_overlay, OverlayStyle};
pub use png::{load_raster, write_raster, SUPPORTED_EXTENSIONS};
pub use resize::{fit_square, SIZE_PRESETS};
