//! Straight line tool.

use super::{Tool, ToolContext};
use crate::geometry::{point_to_segment_dist, rect_from_corners};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{BezPath, Point, Rect};

/// Lines shorter than this are treated as accidental clicks.
const MIN_LENGTH: f64 = 2.0;

pub struct LineTool;

impl LineTool {
    fn endpoints(object: &DrawingObject) -> (Point, Point) {
        (object.start, object.end.unwrap_or(object.start))
    }
}

impl Tool for LineTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Line
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Line, point);
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
        let mut path = BezPath::new();
        path.move_to(start);
        path.line_to(end);
        painter.stroke_path(&path, object.options.stroke(), object.options.stroke_width);
    }

    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool {
        let (start, end) = Self::endpoints(object);
        point_to_segment_dist(point, start, end) <= margin
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        let (start, end) = Self::endpoints(object);
        rect_from_corners(start, end)
    }
}
