//! Eraser tool: a freehand stroke that clears the pixels beneath it.

use super::pen::extend_stroke;
use super::{Tool, ToolContext};
use crate::geometry::{bounds_of_points, point_to_polyline_dist};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::{polyline_path, Painter};
use kurbo::{Point, Rect};

/// Minimum eraser width, independent of the configured stroke width.
const MIN_WIDTH: f64 = 10.0;

pub struct EraserTool;

impl Tool for EraserTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Eraser
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Eraser, point);
        object.options.stroke_width = object.options.stroke_width.max(MIN_WIDTH);
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
        painter.erase_path(&polyline_path(&object.points), object.options.stroke_width);
    }

    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool {
        point_to_polyline_dist(point, &object.points)
            <= margin + object.options.stroke_width / 2.0
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        bounds_of_points(&object.points)
    }
}
