//! Raster decode and PNG encode.

use std::path::Path;

use crate::error::{PxError, Result};
use crate::types::Raster;

/// File extensions accepted as input images.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Decode an image file into an RGBA raster.
pub fn load_raster(path: &Path) -> Result<Raster> {
    if !path.exists() {
        return Err(PxError::Io {
            path: path.to_path_buf(),
            message: "File not found".to_string(),
        });
    }

    let img = image::open(path)
        .map_err(|e| PxError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .to_rgba8();

    Raster::from_image(img).map_err(|_| PxError::Decode {
        path: path.to_path_buf(),
        message: "image has zero dimensions".to_string(),
    })
}

/// Write a raster as a lossless RGBA PNG.
pub fn write_raster(raster: &Raster, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| PxError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create output directory: {}", e),
            })?;
        }
    }

    raster
        .as_image()
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| PxError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write PNG: {}", e),
        })?;

    Ok(())
}
