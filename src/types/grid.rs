//! Grid descriptions: uniform grids and explicit grid lines.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PxError, Result};

use super::Rect;

/// A uniform square grid anchored at the region origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    pub cell_size: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl GridSpec {
    /// Grid with the given cell size and no offset.
    pub const fn new(cell_size: u32) -> Self {
        Self {
            cell_size,
            offset_x: 0,
            offset_y: 0,
        }
    }

    pub const fn with_offset(self, offset_x: u32, offset_y: u32) -> Self {
        Self {
            offset_x,
            offset_y,
            ..self
        }
    }

    /// Derive a grid from one logical pixel marked by the user.
    ///
    /// The cell size is the larger side of the marked rectangle and the offset
    /// is its position relative to `origin`, wrapped to the grid period.
    pub fn from_defined_pixel(pixel: Rect, origin: (u32, u32)) -> Result<Self> {
        let cell_size = pixel.width.max(pixel.height);
        if cell_size == 0 {
            return Err(PxError::grid("defined pixel has zero size"));
        }
        let wrap = |pos: u32, start: u32| -> u32 {
            let rel = pos as i64 - start as i64;
            rel.rem_euclid(cell_size as i64) as u32
        };
        Ok(Self {
            cell_size,
            offset_x: wrap(pixel.x, origin.0),
            offset_y: wrap(pixel.y, origin.1),
        })
    }

    /// Check the grid against a region of `bounds`.
    pub fn validate(&self, bounds: &Rect) -> Result<()> {
        if self.cell_size == 0 {
            return Err(PxError::InvalidGrid {
                message: "cell size must be at least 1".to_string(),
                help: Some("Pass --grid-size with a positive value".to_string()),
            });
        }

        let limit = bounds.width.min(bounds.height);
        if self.cell_size > limit {
            return Err(PxError::InvalidGrid {
                message: format!(
                    "cell size {} exceeds the region's smaller side ({})",
                    self.cell_size, limit
                ),
                help: Some(format!("Use a cell size between 1 and {}", limit)),
            });
        }

        if self.offset_x >= self.cell_size || self.offset_y >= self.cell_size {
            return Err(PxError::InvalidGrid {
                message: format!(
                    "offset ({}, {}) must be smaller than the cell size {}",
                    self.offset_x, self.offset_y, self.cell_size
                ),
                help: None,
            });
        }

        Ok(())
    }
}

/// Explicit grid line positions describing cells of varying size.
///
/// Lines are absolute raster coordinates and include both outer edges, so
/// `n` lines describe `n - 1` cells on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLines {
    pub x_lines: Vec<u32>,
    pub y_lines: Vec<u32>,
    /// Cells (col, row) forced transparent.
    pub excluded_cells: HashSet<(u32, u32)>,
    /// Cells (col, row) kept even when their colour is excluded.
    pub included_cells: HashSet<(u32, u32)>,
}

impl GridLines {
    pub fn new(x_lines: Vec<u32>, y_lines: Vec<u32>) -> Result<Self> {
        let lines = Self {
            x_lines,
            y_lines,
            ..Default::default()
        };
        lines.validate()?;
        Ok(lines)
    }

    /// Lines of a uniform grid over `bounds`, with edge lines added so the
    /// cells cover the whole extent.
    pub fn from_uniform(bounds: Rect, grid: GridSpec) -> Result<Self> {
        grid.validate(&bounds)?;
        let axis = |start: u32, len: u32, offset: u32| -> Vec<u32> {
            let end = start + len;
            let mut lines: Vec<u32> = (start + offset..=end)
                .step_by(grid.cell_size as usize)
                .collect();
            if lines.first() != Some(&start) {
                lines.insert(0, start);
            }
            if lines.last() != Some(&end) {
                lines.push(end);
            }
            lines
        };
        Self::new(
            axis(bounds.x, bounds.width, grid.offset_x),
            axis(bounds.y, bounds.height, grid.offset_y),
        )
    }

    pub fn num_cols(&self) -> u32 {
        self.x_lines.len().saturating_sub(1) as u32
    }

    pub fn num_rows(&self) -> u32 {
        self.y_lines.len().saturating_sub(1) as u32
    }

    /// Cell bounds as (x1, y1, x2, y2).
    pub fn cell_bounds(&self, col: u32, row: u32) -> (u32, u32, u32, u32) {
        let (c, r) = (col as usize, row as usize);
        (
            self.x_lines[c],
            self.y_lines[r],
            self.x_lines[c + 1],
            self.y_lines[r + 1],
        )
    }

    pub fn cell_center(&self, col: u32, row: u32) -> (u32, u32) {
        let (x1, y1, x2, y2) = self.cell_bounds(col, row);
        ((x1 + x2) / 2, (y1 + y2) / 2)
    }

    /// Flip a cell between excluded, included and untouched.
    pub fn toggle_cell(&mut self, col: u32, row: u32) {
        let cell = (col, row);
        if self.excluded_cells.remove(&cell) {
            self.included_cells.insert(cell);
        } else if !self.included_cells.remove(&cell) {
            self.excluded_cells.insert(cell);
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, lines) in [("x", &self.x_lines), ("y", &self.y_lines)] {
            if lines.len() < 2 {
                return Err(PxError::grid(format!(
                    "grid needs at least 2 {} lines, got {}",
                    name,
                    lines.len()
                )));
            }
            if lines.windows(2).any(|w| w[0] >= w[1]) {
                return Err(PxError::grid(format!(
                    "{} lines must be strictly increasing",
                    name
                )));
            }
        }
        Ok(())
    }
}
