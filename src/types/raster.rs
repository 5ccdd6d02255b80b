//! Immutable RGBA raster.

use image::RgbaImage;

use crate::error::{PxError, Result};

use super::Colour;

/// A 2D grid of RGBA pixels with 8-bit channels.
///
/// Width and height are always at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Build a raster from row-major pixels.
    pub fn new(width: u32, height: u32, pixels: &[Colour]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PxError::region(format!(
                "raster must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        if pixels.len() != width as usize * height as usize {
            return Err(PxError::Parse {
                message: format!(
                    "expected {} pixels for a {}x{} raster, got {}",
                    width as usize * height as usize,
                    width,
                    height,
                    pixels.len()
                ),
                help: None,
            });
        }

        let raw = pixels.iter().flat_map(|c| c.to_rgba()).collect();
        // Length was checked above
        let image = RgbaImage::from_raw(width, height, raw).ok_or_else(|| PxError::Parse {
            message: "pixel buffer does not match raster size".to_string(),
            help: None,
        })?;
        Ok(Self { image })
    }

    /// A raster filled with one colour.
    pub fn filled(width: u32, height: u32, colour: Colour) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PxError::region(format!(
                "raster must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, colour.into()),
        })
    }

    /// Build a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Colour) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PxError::region(format!(
                "raster must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            image: RgbaImage::from_fn(width, height, |x, y| f(x, y).into()),
        })
    }

    /// Wrap an already-decoded image.
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PxError::region(format!(
                "image has zero dimensions ({}x{})",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at (x, y). Panics when out of bounds, like indexing.
    pub fn get(&self, x: u32, y: u32) -> Colour {
        (*self.image.get_pixel(x, y)).into()
    }

    /// Pixel at (x, y) with coordinates clamped into the raster.
    pub fn get_clamped(&self, x: i64, y: i64) -> Colour {
        let cx = x.clamp(0, self.width() as i64 - 1) as u32;
        let cy = y.clamp(0, self.height() as i64 - 1) as u32;
        self.get(cx, cy)
    }

    /// Row-major pixel iterator.
    pub fn pixels(&self) -> impl Iterator<Item = Colour> + '_ {
        self.image.pixels().map(|p| Colour::from(*p))
    }

    /// Borrow the underlying image buffer.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
