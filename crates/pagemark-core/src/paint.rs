//! Painter abstraction.
//!
//! Tool plugins render through this trait so the core stays independent of
//! the backing surface. A backend applies the ambient state (transform,
//! alpha, dash, shadow) to every primitive until `reset_state` is called.

use crate::options::{FontSpec, Shadow};
use kurbo::{Affine, BezPath, Point};
use peniko::Color;

/// A positioned run of text. Multi-line content is newline-delimited; the
/// backend lays lines out using the same metrics as
/// [`crate::text_metrics::measure`].
#[derive(Debug, Clone)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// Top-left corner of the text block.
    pub origin: Point,
    pub font: &'a FontSpec,
    pub color: Color,
}

/// Backend-agnostic drawing primitives.
pub trait Painter {
    /// Fill a path with a solid color.
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Stroke a path with a solid color.
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64);

    /// Stroke a path clearing the pixels beneath it (eraser strokes).
    fn erase_path(&mut self, path: &BezPath, width: f64);

    /// Draw a text block.
    fn draw_text(&mut self, run: &TextRun);

    /// Set the transform applied to subsequent primitives.
    fn set_transform(&mut self, transform: Affine);

    /// Set the global alpha applied to subsequent primitives.
    fn set_alpha(&mut self, alpha: f64);

    /// Set the dash pattern applied to subsequent strokes (empty = solid).
    fn set_dash(&mut self, pattern: &[f64]);

    /// Set the drop shadow applied to subsequent primitives.
    fn set_shadow(&mut self, shadow: Option<&Shadow>);

    /// Reset transform, alpha, dash and shadow to their defaults so one
    /// object's style never leaks into the next.
    fn reset_state(&mut self);
}

/// Build a polyline path from a point list.
pub fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
    }
    path
}
