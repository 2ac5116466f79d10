//! Arrow tool: a line with a filled arrowhead at the end point.

use super::{Tool, ToolContext};
use crate::geometry::{bounds_of_points, point_to_segment_dist};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{BezPath, Point, Rect, Vec2};

/// Length of the arrowhead along the shaft.
const HEAD_SIZE: f64 = 15.0;
/// Arrows shorter than this are treated as accidental clicks.
const MIN_LENGTH: f64 = 2.0;

pub struct ArrowTool;

impl ArrowTool {
    fn endpoints(object: &DrawingObject) -> (Point, Point) {
        (object.start, object.end.unwrap_or(object.start))
    }

    /// Unit direction of the shaft, defaulting to +x for degenerate arrows.
    fn direction(start: Point, end: Point) -> Vec2 {
        let d = end - start;
        let len = d.hypot();
        if len < f64::EPSILON {
            Vec2::new(1.0, 0.0)
        } else {
            d / len
        }
    }

    /// The three corners of the arrowhead triangle.
    fn head_points(start: Point, end: Point) -> [Point; 3] {
        let dir = Self::direction(start, end);
        let perp = Vec2::new(-dir.y, dir.x);
        let back = end - dir * HEAD_SIZE;
        [
            end,
            back + perp * (HEAD_SIZE * 0.5),
            back - perp * (HEAD_SIZE * 0.5),
        ]
    }
}

impl Tool for ArrowTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Arrow
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Arrow, point);
        object.end = Some(point);
        Some(object)
    }

    fn reshape(&self, point: Point, object: &mut DrawingObject, _ctx: &mut ToolContext) {
        object.end = Some(point);
        object.bounds = self.bounds(object);
    }

    fn finish(
        &self,
        point: Point,
        mut object: DrawingObject,
        _ctx: &mut ToolContext,
    ) -> Option<DrawingObject> {
        object.end = Some(point);
        let (start, end) = Self::endpoints(&object);
        if start.distance(end) < MIN_LENGTH {
            return None;
        }
        object.bounds = self.bounds(&object);
        Some(object)
    }

    fn render(&self, object: &DrawingObject, painter: &mut dyn Painter) {
        let (start, end) = Self::endpoints(object);
        let dir = Self::direction(start, end);
        let color = object.options.stroke();

        // Stop the shaft at the back of the head so the tip stays sharp
        let shaft_end = if start.distance(end) > HEAD_SIZE {
            end - dir * HEAD_SIZE
        } else {
            start
        };
        let mut shaft = BezPath::new();
        shaft.move_to(start);
        shaft.line_to(shaft_end);
        painter.stroke_path(&shaft, color, object.options.stroke_width);

        let [tip, left, right] = Self::head_points(start, end);
        let mut head = BezPath::new();
        head.move_to(tip);
        head.line_to(left);
        head.line_to(right);
        head.close_path();
        painter.fill_path(&head, color);
    }

    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool {
        let (start, end) = Self::endpoints(object);
        point_to_segment_dist(point, start, end) <= margin
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        let (start, end) = Self::endpoints(object);
        let [tip, left, right] = Self::head_points(start, end);
        bounds_of_points(&[start, end, tip, left, right])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DrawOptions;
    use crate::paint::test_support::CountingPainter;

    #[test]
    fn test_bounds_include_head() {
        let options = DrawOptions::default();
        let mut ctx = ToolContext::new(&options);
        let tool = ArrowTool;

        let mut object = tool.begin(Point::new(0.0, 0.0), &mut ctx).unwrap();
        tool.reshape(Point::new(100.0, 0.0), &mut object, &mut ctx);

        // Head half-width extends above and below the shaft
        assert!(object.bounds.y0 < 0.0);
        assert!(object.bounds.y1 > 0.0);
        assert!((object.bounds.x1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_renders_shaft_and_head() {
        let options = DrawOptions::default();
        let mut ctx = ToolContext::new(&options);
        let tool = ArrowTool;

        let mut object = tool.begin(Point::new(0.0, 0.0), &mut ctx).unwrap();
        tool.reshape(Point::new(80.0, 40.0), &mut object, &mut ctx);

        let mut painter = CountingPainter::default();
        tool.render(&object, &mut painter);
        assert_eq!(painter.strokes, 1);
        assert_eq!(painter.fills, 1);
    }

    #[test]
    fn test_degenerate_arrow_discarded() {
        let options = DrawOptions::default();
        let mut ctx = ToolContext::new(&options);
        let tool = ArrowTool;

        let object = tool.begin(Point::new(5.0, 5.0), &mut ctx).unwrap();
        assert!(tool.finish(Point::new(5.0, 5.0), object, &mut ctx).is_none());
    }
}
