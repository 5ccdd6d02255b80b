//! Output size presets.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::Result;
use crate::types::Raster;

/// Square output sizes offered for export. Zero keeps the original size.
pub const SIZE_PRESETS: &[u32] = &[0, 8, 16, 24, 32, 48, 64, 96, 128, 256];

/// Scale `raster` with nearest-neighbour sampling to fit inside a
/// `size`x`size` transparent canvas, centred. A size of 0 returns a copy.
pub fn fit_square(raster: &Raster, size: u32) -> Result<Raster> {
    if size == 0 {
        return Ok(raster.clone());
    }

    let (w, h) = (raster.width() as f64, raster.height() as f64);
    let scale = (size as f64 / w).min(size as f64 / h);
    let new_w = ((w * scale) as u32).clamp(1, size);
    let new_h = ((h * scale) as u32).clamp(1, size);

    let resized = imageops::resize(raster.as_image(), new_w, new_h, FilterType::Nearest);

    let mut canvas = RgbaImage::new(size, size);
    let x = (size - new_w) / 2;
    let y = (size - new_h) / 2;
    imageops::overlay(&mut canvas, &resized, x as i64, y as i64);

    Raster::from_image(canvas)
}
