//! Text tool.
//!
//! The only non-drag tool: it commits on pointer-down and asks the engine
//! to enter text editing via the object's transient marker.

use super::{Tool, ToolContext};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::{Painter, TextRun};
use crate::text_metrics;
use kurbo::{Point, Rect};

pub struct TextTool;

impl Tool for TextTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Text
    }

    fn requires_drag(&self) -> bool {
        false
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::Text, point);
        object.text = Some(String::new());
        object.bounds = self.bounds(&object);
        object.request_text_edit();
        Some(object)
    }

    fn finish(
        &self,
        _point: Point,
        mut object: DrawingObject,
        _ctx: &mut ToolContext,
    ) -> Option<DrawingObject> {
        object.bounds = self.bounds(&object);
        Some(object)
    }

    fn render(&self, object: &DrawingObject, painter: &mut dyn Painter) {
        let Some(text) = object.text.as_deref() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        painter.draw_text(&TextRun {
            text,
            origin: object.start,
            font: &object.options.font,
            color: object.options.stroke(),
        });
    }

    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool {
        self.bounds(object).inflate(margin, margin).contains(point)
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        let text = object.text.as_deref().unwrap_or("");
        let size = text_metrics::measure(text, &object.options.font);
        Rect::from_origin_size(object.start, size)
    }
}
