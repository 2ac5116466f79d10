//! Triangle tool: an isosceles triangle inscribed in the drag rectangle.

use super::{Tool, ToolContext};
use crate::geometry::rect_from_corners;
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{BezPath, Point, Rect};

const MIN_SIZE: f64 = 1.0;

pub struct TriangleTool;

impl TriangleTool {
    fn rect(object: &DrawingObject) -> Rect {
        rect_from_corners(object.start, object.end.unwrap_or(object.start))
    }

    fn path(rect: Rect) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(Point::new(rect.center().x, rect.y0));
        path.line_to(Point::new(rect.x1, rect.y1));
        path.line_to(Point::new(rect.x0, rect.y1));
        path.close_path();
        path
    }
}

impl Tool for TriangleTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Triangle
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Triangle, point);
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
        let path = Self::path(Self::rect(object));
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
