//! Cell enumeration and colour sampling.

use crate::types::{Colour, GridSpec, Raster, Rect, SampleMode};

/// One cell of a uniform grid, in raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

impl Cell {
    /// Centre pixel: `size / 2` past the top-left corner.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.size / 2, self.y + self.size / 2)
    }

    /// Cell area as `(x1, y1, x2, y2)`, exclusive at the far edges.
    pub fn area(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.x + self.size, self.y + self.size)
    }
}

/// Output dimensions for `grid` over `bounds`; partial cells at the far
/// edges are dropped.
pub fn grid_dimensions(bounds: &Rect, grid: &GridSpec) -> (u32, u32) {
    let cols = bounds.width.saturating_sub(grid.offset_x) / grid.cell_size;
    let rows = bounds.height.saturating_sub(grid.offset_y) / grid.cell_size;
    (cols, rows)
}

/// Row-major cells of `grid` within `bounds`.
pub fn cells(bounds: Rect, grid: GridSpec) -> impl Iterator<Item = Cell> {
    let (cols, rows) = grid_dimensions(&bounds, &grid);
    (0..rows).flat_map(move |row| {
        (0..cols).map(move |col| Cell {
            col,
            row,
            x: bounds.x + grid.offset_x + col * grid.cell_size,
            y: bounds.y + grid.offset_y + row * grid.cell_size,
            size: grid.cell_size,
        })
    })
}

/// Representative colour of the area `(x1, y1)..(x2, y2)` sampled around `center`.
pub fn sample(
    raster: &Raster,
    center: (u32, u32),
    area: (u32, u32, u32, u32),
    mode: SampleMode,
) -> Colour {
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    match mode {
        SampleMode::Center => raster.get_clamped(cx, cy),
        SampleMode::Average => {
            let (x1, y1, x2, y2) = area;
            let (x2, y2) = (x2.max(x1 + 1), y2.max(y1 + 1));
            let mut sum = [0u32; 4];
            let mut n = 0u32;
            for y in (cy - 1).max(y1 as i64)..=(cy + 1).min(y2 as i64 - 1) {
                for x in (cx - 1).max(x1 as i64)..=(cx + 1).min(x2 as i64 - 1) {
                    let c = raster.get_clamped(x, y).to_rgba();
                    for (s, v) in sum.iter_mut().zip(c) {
                        *s += v as u32;
                    }
                    n += 1;
                }
            }
            if n == 0 {
                return raster.get_clamped(cx, cy);
            }
            let avg = |i: usize| ((sum[i] + n / 2) / n) as u8;
            Colour::new(avg(0), avg(1), avg(2), avg(3))
        }
    }
}
