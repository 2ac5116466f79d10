//! Freehand pen tool.

use super::{Tool, ToolContext};
use crate::geometry::{bounds_of_points, point_to_polyline_dist};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::{polyline_path, Painter};
use kurbo::{Point, Rect};

/// Minimum pointer travel before a new polyline point is recorded.
const MIN_POINT_DISTANCE: f64 = 0.5;

/// Append a point to a polyline stroke, skipping sub-pixel jitter.
pub(super) fn extend_stroke(point: Point, object: &mut DrawingObject) {
    let far_enough = object
        .points
        .last()
        .is_none_or(|last| last.distance(point) >= MIN_POINT_DISTANCE);
    if far_enough {
        object.points.push(point);
        object.bounds = bounds_of_points(&object.points);
    }
}

/// Freehand strokes: one polyline point per sampled pointer position.
pub struct PenTool;

impl Tool for PenTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Pen
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Pen, point);
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
