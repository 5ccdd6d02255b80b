//! Transform over explicit, possibly non-uniform grid lines.

use crate::error::{PxError, Result};
use crate::types::{BitDepth, ColorExclusionSpec, GridLines, Raster, SampleMode};

use super::{classify, finish, sample, CellFate, TransformDiagnostics};

/// Transform using explicit grid lines.
///
/// Cells listed in `lines.excluded_cells` become transparent and count as
/// excluded; cells in `lines.included_cells` skip colour exclusion.
pub fn transform_lines(
    raster: &Raster,
    lines: &GridLines,
    bit_depth: BitDepth,
    excluded: &ColorExclusionSpec,
    mode: SampleMode,
) -> Result<(Raster, TransformDiagnostics)> {
    lines.validate()?;

    let (cols, rows) = (lines.num_cols(), lines.num_rows());
    if cols == 0 || rows == 0 {
        return Err(PxError::EmptyOutput {
            message: format!("grid lines describe a {}x{} grid", cols, rows),
        });
    }

    let none = ColorExclusionSpec::new();
    let mut diagnostics = TransformDiagnostics::default();
    let mut pixels = Vec::with_capacity(cols as usize * rows as usize);

    for row in 0..rows {
        for col in 0..cols {
            let center = lines.cell_center(col, row);
            let colour = sample::sample(raster, center, lines.cell_bounds(col, row), mode);

            let fate = if lines.excluded_cells.contains(&(col, row)) {
                CellFate::Excluded
            } else if lines.included_cells.contains(&(col, row)) {
                classify(colour, true, &none)
            } else {
                classify(colour, true, excluded)
            };
            pixels.push(finish(colour, fate, bit_depth, &mut diagnostics));
        }
    }

    let output = Raster::new(cols, rows, &pixels)?;
    Ok((output, diagnostics))
}
