//! Highlighter tool: a wide, semi-transparent freehand stroke.

use super::pen::extend_stroke;
use super::{Tool, ToolContext};
use crate::geometry::{bounds_of_points, point_to_polyline_dist};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::{polyline_path, Painter};
use kurbo::{Point, Rect};

/// Minimum stroke width for highlighter marks.
const MIN_WIDTH: f64 = 12.0;
/// Alpha applied to the stroke color.
const STROKE_ALPHA: u8 = 128;

pub struct HighlighterTool;

impl Tool for HighlighterTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Highlighter
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Highlighter, point);
        object.options.stroke_width = object.options.stroke_width.max(MIN_WIDTH);
        object.options.stroke_color.a = STROKE_ALPHA;
        object.points.push(point);
        object.bounds = bounds_of_points(&object.points);
        Some(object)
    }

    fn extend(&self, point: Point, object: &mut DrawingObject, _ctx: &mut ToolContext) {
        extend_stroke(point, object);
    }

    fn finish(
        &self,
        point: Point,
        mut object: DrawingObject,
        _ctx: &mut ToolContext,
    ) -> Option<DrawingObject> {
        extend_stroke(point, &mut object);
        if object.points.len() < 2 {
            return None;
        }
        object.bounds = bounds_of_points(&object.points);
        Some(object)
    }

    fn render(&self, object: &DrawingObject, painter: &mut dyn Painter) {
        if object.points.len() < 2 {
            return;
        }
        painter.stroke_path(
            &polyline_path(&object.points),
            object.options.stroke(),
            object.options.stroke_width,
        );
    }

    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool {
        point_to_polyline_dist(point, &object.points)
            <= margin + object.options.stroke_width / 2.0
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        bounds_of_points(&object.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DrawOptions;

    #[test]
    fn test_style_overrides() {
        let mut options = DrawOptions::default();
        options.stroke_width = 2.0;
        let mut ctx = ToolContext::new(&options);

        let object = HighlighterTool.begin(Point::ZERO, &mut ctx).unwrap();
        assert!((object.options.stroke_width - MIN_WIDTH).abs() < f64::EPSILON);
        assert_eq!(object.options.stroke_color.a, STROKE_ALPHA);
        // The global options are untouched
        assert!((options.stroke_width - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wide_strokes_keep_user_width() {
        let mut options = DrawOptions::default();
        options.stroke_width = 20.0;
        let mut ctx = ToolContext::new(&options);

        let object = HighlighterTool.begin(Point::ZERO, &mut ctx).unwrap();
        assert!((object.options.stroke_width - 20.0).abs() < f64::EPSILON);
    }
}
