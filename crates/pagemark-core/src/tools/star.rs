//! Five-pointed star tool, inscribed in the drag rectangle.

use super::{Tool, ToolContext};
use crate::geometry::rect_from_corners;
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{BezPath, Point, Rect};

const MIN_SIZE: f64 = 1.0;
/// Inner radius as a fraction of the outer radius.
const INNER_RATIO: f64 = 0.5;
const SPIKES: usize = 5;

pub struct StarTool;

impl StarTool {
    fn rect(object: &DrawingObject) -> Rect {
        rect_from_corners(object.start, object.end.unwrap_or(object.start))
    }

    fn path(rect: Rect) -> BezPath {
        let center = rect.center();
        let rx = rect.width() / 2.0;
        let ry = rect.height() / 2.0;

        let mut path = BezPath::new();
        for i in 0..SPIKES * 2 {
            // Start at the top spike, alternating outer and inner vertices
            let angle = -std::f64::consts::FRAC_PI_2
                + i as f64 * std::f64::consts::PI / SPIKES as f64;
            let ratio = if i % 2 == 0 { 1.0 } else { INNER_RATIO };
            let vertex = Point::new(
                center.x + angle.cos() * rx * ratio,
                center.y + angle.sin() * ry * ratio,
            );
            if i == 0 {
                path.move_to(vertex);
            } else {
                path.line_to(vertex);
            }
        }
        path.close_path();
        path
    }
}

impl Tool for StarTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Star
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Star, point);
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
