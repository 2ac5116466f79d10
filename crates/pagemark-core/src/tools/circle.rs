//! Circle tool.
//!
//! The drag diagonal defines the circle: center at the midpoint, radius
//! half the drag distance.

use super::{Tool, ToolContext};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{Circle, Point, Rect, Shape as KurboShape};

/// Circles with a radius below this are discarded.
const MIN_RADIUS: f64 = 1.0;

pub struct CircleTool;

impl CircleTool {
    fn circle(object: &DrawingObject) -> Circle {
        let end = object.end.unwrap_or(object.start);
        let center = object.start.midpoint(end);
        Circle::new(center, object.start.distance(end) / 2.0)
    }
}

impl Tool for CircleTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Circle
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Circle, point);
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
        if Self::circle(&object).radius < MIN_RADIUS {
            return None;
        }
        object.bounds = self.bounds(&object);
        Some(object)
    }

    fn render(&self, object: &DrawingObject, painter: &mut dyn Painter) {
        let path = Self::circle(object).to_path(0.1);
        if let Some(fill) = object.options.fill() {
            painter.fill_path(&path, fill);
        }
        painter.stroke_path(&path, object.options.stroke(), object.options.stroke_width);
    }

    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool {
        let circle = Self::circle(object);
        point.distance(circle.center) <= circle.radius + margin
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        let circle = Self::circle(object);
        Rect::new(
            circle.center.x - circle.radius,
            circle.center.y - circle.radius,
            circle.center.x + circle.radius,
            circle.center.y + circle.radius,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DrawOptions;

    #[test]
    fn test_circle_from_diagonal() {
        let options = DrawOptions::default();
        let mut ctx = ToolContext::new(&options);
        let tool = CircleTool;

        let mut object = tool.begin(Point::new(0.0, 0.0), &mut ctx).unwrap();
        tool.reshape(Point::new(100.0, 0.0), &mut object, &mut ctx);

        let circle = CircleTool::circle(&object);
        assert_eq!(circle.center, Point::new(50.0, 0.0));
        assert!((circle.radius - 50.0).abs() < f64::EPSILON);
        assert_eq!(object.bounds, Rect::new(0.0, -50.0, 100.0, 50.0));
    }

    #[test]
    fn test_hit_by_distance() {
        let options = DrawOptions::default();
        let mut ctx = ToolContext::new(&options);
        let tool = CircleTool;

        let mut object = tool.begin(Point::new(0.0, 0.0), &mut ctx).unwrap();
        tool.reshape(Point::new(100.0, 0.0), &mut object, &mut ctx);

        assert!(tool.hit_test(Point::new(50.0, 0.0), &object, 0.0));
        assert!(tool.hit_test(Point::new(50.0, 49.0), &object, 0.0));
        assert!(!tool.hit_test(Point::new(50.0, 60.0), &object, 8.0));
    }
}
