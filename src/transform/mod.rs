//! Downsampling of upscaled pixel art to one pixel per cell.
//!
//! Each cell contributes one output pixel, taken from its centre. The
//! sampled colour is then checked against the excluded colours and the
//! region mask (either of which makes the pixel transparent) and finally
//! quantized to the configured bit depth.

mod lines;
mod sample;

use serde::Serialize;

use crate::error::{PxError, Result};
use crate::types::{BitDepth, Colour, ColorExclusionSpec, Raster, Region, TransformConfig};

pub use lines::transform_lines;
pub use sample::{cells, grid_dimensions, sample, Cell};

/// Per-run counters reported alongside the output raster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformDiagnostics {
    pub cells_sampled: u32,
    pub cells_excluded: u32,
    pub cells_outside_mask: u32,
}

/// Outcome of classifying one sampled colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFate {
    Kept,
    Excluded,
    OutsideMask,
}

/// Transform `raster` within `region` into a 1:1 pixel raster.
pub fn transform(
    raster: &Raster,
    region: &Region,
    config: &TransformConfig,
) -> Result<(Raster, TransformDiagnostics)> {
    let bounds = region.bounds(raster)?;
    config.grid.validate(&bounds)?;

    let (cols, rows) = grid_dimensions(&bounds, &config.grid);
    if cols == 0 || rows == 0 {
        return Err(PxError::EmptyOutput {
            message: format!(
                "cell size {} with offset ({}, {}) leaves a {}x{} grid in a {}x{} region",
                config.grid.cell_size,
                config.grid.offset_x,
                config.grid.offset_y,
                cols,
                rows,
                bounds.width,
                bounds.height
            ),
        });
    }

    let mut diagnostics = TransformDiagnostics::default();
    let mut pixels = Vec::with_capacity(cols as usize * rows as usize);

    for cell in cells(bounds, config.grid) {
        let center = cell.center();
        let colour = sample(raster, center, cell.area(), config.sample);

        let fate = classify(colour, region.includes(center.0, center.1), &config.excluded);
        pixels.push(finish(colour, fate, config.bit_depth, &mut diagnostics));
    }

    let output = Raster::new(cols, rows, &pixels)?;
    Ok((output, diagnostics))
}

/// Decide what happens to a sampled colour.
pub fn classify(colour: Colour, in_mask: bool, excluded: &ColorExclusionSpec) -> CellFate {
    if !in_mask {
        CellFate::OutsideMask
    } else if excluded.matches(colour) {
        CellFate::Excluded
    } else {
        CellFate::Kept
    }
}

/// Apply a fate and the bit depth to a sampled colour, updating counters.
fn finish(
    colour: Colour,
    fate: CellFate,
    depth: BitDepth,
    diagnostics: &mut TransformDiagnostics,
) -> Colour {
    diagnostics.cells_sampled += 1;
    let colour = match fate {
        CellFate::Kept => colour,
        CellFate::Excluded => {
            diagnostics.cells_excluded += 1;
            colour.with_alpha(0)
        }
        CellFate::OutsideMask => {
            diagnostics.cells_outside_mask += 1;
            colour.with_alpha(0)
        }
    };

    if colour.is_transparent() {
        colour
    } else {
        depth.quantize_colour(colour)
    }
}
