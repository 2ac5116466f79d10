//! Recording surface: captures display items instead of rasterizing.
//!
//! Used by renderer tests to assert what was painted and how often.

use super::{Surface, SurfaceError};
use kurbo::{Affine, BezPath, Rect};
use pagemark_core::options::Shadow;
use pagemark_core::{Painter, TextRun};
use peniko::Color;

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    FillPath { bounds: Rect, color: Color },
    StrokePath { bounds: Rect, color: Color, width: f64 },
    ErasePath { bounds: Rect, width: f64 },
    Text { content: String },
    Clear,
    ClearRegion { region: Rect },
}

/// A surface that records commands for inspection.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    items: Vec<DisplayItem>,
    transform: Affine,
    alpha: f64,
    dash: Vec<f64>,
    shadow: Option<Shadow>,
    clip: Option<Rect>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: 1.0,
            ..Self::default()
        }
    }

    /// The recorded commands.
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Drop all recorded commands.
    pub fn reset_items(&mut self) {
        self.items.clear();
    }

    /// Count recorded stroke commands.
    pub fn stroke_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DisplayItem::StrokePath { .. }))
            .count()
    }

    /// Count recorded text commands.
    pub fn text_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DisplayItem::Text { .. }))
            .count()
    }

    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    pub fn current_transform(&self) -> Affine {
        self.transform
    }

    pub fn current_alpha(&self) -> f64 {
        self.alpha
    }

    pub fn current_dash(&self) -> &[f64] {
        &self.dash
    }

    pub fn current_shadow(&self) -> Option<Shadow> {
        self.shadow
    }
}

impl Painter for RecordingSurface {
    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.items.push(DisplayItem::FillPath {
            bounds: path.control_box(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        self.items.push(DisplayItem::StrokePath {
            bounds: path.control_box(),
            color,
            width,
        });
    }

    fn erase_path(&mut self, path: &BezPath, width: f64) {
        self.items.push(DisplayItem::ErasePath {
            bounds: path.control_box(),
            width,
        });
    }

    fn draw_text(&mut self, run: &TextRun) {
        self.items.push(DisplayItem::Text {
            content: run.text.to_string(),
        });
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn set_dash(&mut self, pattern: &[f64]) {
        self.dash = pattern.to_vec();
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.shadow = shadow.copied();
    }

    fn reset_state(&mut self) {
        self.transform = Affine::IDENTITY;
        self.alpha = 1.0;
        self.dash.clear();
        self.shadow = None;
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn clear(&mut self) {
        self.items.push(DisplayItem::Clear);
    }

    fn clear_region(&mut self, region: Rect) {
        self.items.push(DisplayItem::ClearRegion { region });
    }

    fn set_clip(&mut self, region: Option<Rect>) {
        self.clip = region;
    }

    fn export_png(&self) -> Result<Vec<u8>, SurfaceError> {
        Err(SurfaceError::Unsupported("PNG export"))
    }
}
