use std::path::Path;

use crate::foundation::error::{HandvizError, HandvizResult};

/// Pixel rectangle kept from a rendered still.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CropRect {
    // Centered hand region of the host's default 1920x1080 render.
    fn default() -> Self {
        Self {
            x: 660,
            y: 140,
            width: 600,
            height: 800,
        }
    }
}

impl CropRect {
    fn fits(&self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }
}

/// Crop the PNG at `path` to `rect` and overwrite it.
#[tracing::instrument(skip(rect))]
pub fn crop_png_in_place(path: &Path, rect: CropRect) -> HandvizResult<()> {
    let img = image::open(path).map_err(|e| {
        HandvizError::post_process(format!("open '{}': {e}", path.display()))
    })?;

    if !rect.fits(img.width(), img.height()) {
        return Err(HandvizError::post_process(format!(
            "crop {}x{}+{}+{} exceeds image '{}' ({}x{})",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            path.display(),
            img.width(),
            img.height()
        )));
    }

    let cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
    cropped
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| HandvizError::post_process(format!("write '{}': {e}", path.display())))?;

    tracing::debug!(width = rect.width, height = rect.height, "cropped png");
    Ok(())
}
