//! Drawing surface contract.
//!
//! The engine is constructed against a surface sized to the viewport. A
//! surface is a [`Painter`] that additionally supports resizing (preserving
//! existing pixel content) and PNG export of its current contents.

mod pixmap;
mod recording;

pub use pixmap::PixmapSurface;
pub use recording::{DisplayItem, RecordingSurface};

use pagemark_core::Painter;
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface allocation failed for {0}x{1}")]
    Allocation(u32, u32),
    #[error("PNG encode failed: {0}")]
    Encode(String),
    #[error("surface does not support {0}")]
    Unsupported(&'static str),
}

/// A drawing surface.
pub trait Surface: Painter {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Resize the surface, preserving existing pixel content in the
    /// top-left corner.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    /// Clear the whole surface to transparent.
    fn clear(&mut self);

    /// Clear a region to transparent (in surface coordinates).
    fn clear_region(&mut self, region: kurbo::Rect);

    /// Restrict subsequent painting to a region (None lifts the clip).
    /// Used for damaged-region repaints.
    fn set_clip(&mut self, region: Option<kurbo::Rect>);

    /// Encode the current contents as a PNG.
    fn export_png(&self) -> Result<Vec<u8>, SurfaceError>;
}

/// Assemble a PNG data URL from encoded bytes.
pub fn png_data_url(png: &[u8]) -> String {
    use base64::Engine as _;
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_prefix() {
        let url = png_data_url(&[1, 2, 3]);
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
