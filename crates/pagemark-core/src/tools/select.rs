//! Select mode.
//!
//! Selection gestures (pick, drag, transform) are driven by the interaction
//! state machine; this plugin exists so the registry is total over the mode
//! set. It never produces an object.

use super::{Tool, ToolContext};
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{Point, Rect};

pub struct SelectTool;

impl Tool for SelectTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Select
    }

    fn begin(&self, _point: Point, _ctx: &mut ToolContext) -> Option<DrawingObject> {
        None
    }

    fn finish(
        &self,
        _point: Point,
        _object: DrawingObject,
        _ctx: &mut ToolContext,
    ) -> Option<DrawingObject> {
        None
    }

    fn render(&self, _object: &DrawingObject, _painter: &mut dyn Painter) {}

    fn hit_test(&self, _point: Point, _object: &DrawingObject, _margin: f64) -> bool {
        false
    }

    fn bounds(&self, object: &DrawingObject) -> Rect {
        object.bounds
    }
}
