//! Rectangle tool.

use super::{Tool, ToolContext};
use crate::geometry::rect_from_corners;
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{Point, Rect, Shape as KurboShape};

/// Rectangles smaller than this in both dimensions are discarded.
const MIN_SIZE: f64 = 1.0;

pub struct RectangleTool;

impl RectangleTool {
    fn rect(object: &DrawingObject) -> Rect {
        rect_from_corners(object.start, object.end.unwrap_or(object.start))
    }
}

impl Tool for RectangleTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Rectangle
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Rectangle, point);
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
        let rect = Self::rect(&object);
        if rect.width() < MIN_SIZE && rect.height() < MIN_SIZE {
            return None;
        }
        object.bounds = rect;
        Some(object)
    }

    fn render(&self, object: &DrawingObject, painter: &mut dyn Painter) {
        let path = Self::rect(object).to_path(0.1);
        if let Some(fill) = object.options.fill() {
            painter.fill_path(&path, fill);
        }
        painter.stroke_path(&path, object.options.stroke(), object.options.stroke_width);
    }

    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool {
        Self::rect(object).inflate(margin, margin).contains(point)
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        Self::rect(object)
    }
}
