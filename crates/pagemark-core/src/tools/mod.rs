//! Tool plugins: one implementation per drawing mode.
//!
//! Each plugin owns the gesture lifecycle, rendering, hit testing and
//! bounds computation for its mode. Plugins never reach into global state;
//! they receive a narrow [`ToolContext`] instead.

mod arrow;
mod circle;
mod eraser;
mod hand_drawn;
mod highlighter;
mod line;
mod pen;
mod rectangle;
mod select;
mod star;
mod text;
mod triangle;

pub use arrow::ArrowTool;
pub use circle::CircleTool;
pub use eraser::EraserTool;
pub use hand_drawn::HandDrawnTool;
pub use highlighter::HighlighterTool;
pub use line::LineTool;
pub use pen::PenTool;
pub use rectangle::RectangleTool;
pub use select::SelectTool;
pub use star::StarTool;
pub use text::TextTool;
pub use triangle::TriangleTool;

use crate::object::{DrawingObject, ObjectId, ObjectKind};
use crate::options::DrawOptions;
use crate::paint::Painter;
use kurbo::{Point, Rect};
use uuid::Uuid;

/// Default hit-test margin: thin strokes stay comfortably selectable.
pub fn hit_margin(options: &DrawOptions) -> f64 {
    options.stroke_width.max(8.0)
}

/// Narrow capability object handed to tool plugins during a gesture.
#[derive(Debug)]
pub struct ToolContext<'a> {
    /// Style options for new objects.
    pub options: &'a DrawOptions,
    redraw_requested: bool,
    save_requested: bool,
}

impl<'a> ToolContext<'a> {
    pub fn new(options: &'a DrawOptions) -> Self {
        Self {
            options,
            redraw_requested: false,
            save_requested: false,
        }
    }

    /// Allocate a fresh object id.
    pub fn alloc_id(&mut self) -> ObjectId {
        Uuid::new_v4()
    }

    /// Build a new object anchored at `start`, carrying a value copy of the
    /// current options with a freshly frozen jitter seed.
    pub fn new_object(&mut self, kind: ObjectKind, start: Point) -> DrawingObject {
        let mut object = DrawingObject::new(kind, start, self.options.for_new_object());
        object.id = self.alloc_id();
        object
    }

    /// Ask the engine to repaint.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Ask the engine to record an undo snapshot.
    pub fn request_save(&mut self) {
        self.save_requested = true;
    }

    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    pub fn save_requested(&self) -> bool {
        self.save_requested
    }
}

/// The per-mode plugin contract.
///
/// Drag tools (`requires_drag` = true) build the object across
/// pointer-down → move → up: `begin` creates it, `extend` grows a polyline
/// incrementally, `reshape` recomputes drag-defined geometry from the fixed
/// anchor, `finish` commits (or discards by returning `None`). Non-drag
/// tools commit synchronously on pointer-down and may request text editing
/// via the object's transient marker.
pub trait Tool: Send + Sync {
    /// The mode this plugin implements.
    fn kind(&self) -> ObjectKind;

    /// Whether the tool waits for pointer-up before committing.
    fn requires_drag(&self) -> bool {
        true
    }

    /// Start a gesture. Returns the object under construction, or `None`
    /// for modes that never produce one.
    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject>;

    /// Incremental growth for modes that paint point by point.
    fn extend(&self, _point: Point, _object: &mut DrawingObject, _ctx: &mut ToolContext) {}

    /// Recompute drag-defined geometry from the fixed anchor.
    fn reshape(&self, _point: Point, _object: &mut DrawingObject, _ctx: &mut ToolContext) {}

    /// Complete the gesture. Returns the finished object, or `None` to
    /// discard a degenerate one.
    fn finish(
        &self,
        point: Point,
        object: DrawingObject,
        ctx: &mut ToolContext,
    ) -> Option<DrawingObject>;

    /// Paint the object.
    fn render(&self, object: &DrawingObject, painter: &mut dyn Painter);

    /// Check whether a point hits the object within the given margin.
    fn hit_test(&self, point: Point, object: &DrawingObject, margin: f64) -> bool;

    /// Compute the object's bounding box from its current geometry.
    fn bounds(&self, object: &DrawingObject) -> Rect;
}
