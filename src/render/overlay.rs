//! Grid overlay visualisation.
//!
//! Draws the grid lines and the sampling points on top of the source image so
//! a detected or manual grid can be checked by eye.

use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::transform::{cells, classify, sample, CellFate};
use crate::types::{Colour, Raster, Region, TransformConfig};

/// Colours and toggles for the overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub grid: Colour,
    pub center: Colour,
    pub excluded: Colour,
    pub show_grid: bool,
    pub show_centers: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            grid: Colour::new(255, 50, 80, 150),
            center: Colour::new(50, 255, 100, 200),
            excluded: Colour::new(255, 100, 100, 200),
            show_grid: true,
            show_centers: true,
        }
    }
}

/// Render the grid of `config` over `raster`.
///
/// Kept cells get a filled disc at their sampling point; cells that would be
/// made transparent get an X. Cells are judged on the colour the configured
/// sample mode picks, as in the transform.
pub fn draw_grid_overlay(
    raster: &Raster,
    region: &Region,
    config: &TransformConfig,
    style: &OverlayStyle,
) -> Result<Raster> {
    let bounds = region.bounds(raster)?;
    config.grid.validate(&bounds)?;

    let mut img = raster.as_image().clone();
    let n = config.grid.cell_size;

    if style.show_grid {
        let right = bounds.x + bounds.width;
        let bottom = bounds.y + bounds.height;
        for x in (bounds.x + config.grid.offset_x..=right).step_by(n as usize) {
            for y in bounds.y..bottom {
                blend(&mut img, x as i64, y as i64, style.grid);
            }
        }
        for y in (bounds.y + config.grid.offset_y..=bottom).step_by(n as usize) {
            for x in bounds.x..right {
                blend(&mut img, x as i64, y as i64, style.grid);
            }
        }
    }

    if style.show_centers {
        let radius = (n / 8).max(1) as i64;
        for cell in cells(bounds, config.grid) {
            let (cx, cy) = cell.center();
            let colour = sample(raster, (cx, cy), cell.area(), config.sample);
            match classify(colour, region.includes(cx, cy), &config.excluded) {
                CellFate::Kept => disc(&mut img, cx as i64, cy as i64, radius, style.center),
                _ => cross(&mut img, cx as i64, cy as i64, radius, style.excluded),
            }
        }
    }

    Raster::from_image(img)
}

fn disc(img: &mut RgbaImage, cx: i64, cy: i64, r: i64, colour: Colour) {
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                blend(img, cx + dx, cy + dy, colour);
            }
        }
    }
}

fn cross(img: &mut RgbaImage, cx: i64, cy: i64, r: i64, colour: Colour) {
    for d in -r..=r {
        blend(img, cx + d, cy + d, colour);
        if d != 0 {
            blend(img, cx + d, cy - d, colour);
        }
    }
}

/// Source-over composite of `colour` onto the pixel at (x, y), if in bounds.
fn blend(img: &mut RgbaImage, x: i64, y: i64, colour: Colour) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    let sa = colour.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let src = colour.to_rgba();
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorExclusionSpec, GridSpec, SampleMode};

    fn style() -> OverlayStyle {
        OverlayStyle {
            grid: Colour::rgb(255, 0, 0),
            center: Colour::rgb(0, 255, 0),
            excluded: Colour::rgb(0, 0, 255),
            ..Default::default()
        }
    }

    #[test]
    fn test_lines_and_markers() {
        let raster = Raster::filled(16, 16, Colour::BLACK).unwrap();
        let config = TransformConfig::new(GridSpec::new(8));
        let out = draw_grid_overlay(&raster, &Region::Full, &config, &style()).unwrap();

        assert_eq!(out.get(0, 5), Colour::rgb(255, 0, 0));
        assert_eq!(out.get(8, 3), Colour::rgb(255, 0, 0));
        assert_eq!(out.get(4, 4), Colour::rgb(0, 255, 0));
        assert_eq!(out.get(2, 2), Colour::BLACK);
    }

    #[test]
    fn test_excluded_cells_get_cross() {
        let raster = Raster::filled(16, 16, Colour::WHITE).unwrap();
        let config = TransformConfig::new(GridSpec::new(8))
            .with_exclusions(ColorExclusionSpec::new().with(Colour::WHITE, 0));
        let s = OverlayStyle {
            show_grid: false,
            ..style()
        };
        let out = draw_grid_overlay(&raster, &Region::Full, &config, &s).unwrap();

        assert_eq!(out.get(4, 4), Colour::rgb(0, 0, 255));
        assert_eq!(out.get(5, 3), Colour::rgb(0, 0, 255));
        assert_eq!(out.get(4, 5), Colour::WHITE);
    }

    #[test]
    fn test_markers_follow_sample_mode() {
        // A lone white pixel at the centre of a black 4px cell
        let raster = Raster::from_fn(4, 4, |x, y| {
            if (x, y) == (2, 2) {
                Colour::WHITE
            } else {
                Colour::BLACK
            }
        })
        .unwrap();
        let s = OverlayStyle {
            show_grid: false,
            ..style()
        };
        let config = TransformConfig::new(GridSpec::new(4))
            .with_exclusions(ColorExclusionSpec::new().with(Colour::WHITE, 0));

        let centre = draw_grid_overlay(&raster, &Region::Full, &config, &s).unwrap();
        assert_eq!(centre.get(2, 2), Colour::rgb(0, 0, 255));

        // The 3x3 average is dark grey, so the cell is kept
        let average = config.with_sample(SampleMode::Average);
        let out = draw_grid_overlay(&raster, &Region::Full, &average, &s).unwrap();
        assert_eq!(out.get(2, 2), Colour::rgb(0, 255, 0));
    }

    #[test]
    fn test_translucent_blend() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        blend(&mut img, 0, 0, Colour::new(255, 255, 255, 128));
        let p = img.get_pixel(0, 0).0;
        assert_eq!(p[3], 255);
        assert_eq!(p[0], 128);

        // Out of bounds is ignored
        blend(&mut img, -1, 3, Colour::WHITE);
    }
}
