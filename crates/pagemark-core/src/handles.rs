//! Transform handles for the selected object.
//!
//! Handles are ephemeral: regenerated whenever the selection or its bounds
//! change, never persisted.

use crate::geometry::rotate_about;
use kurbo::{Point, Rect, Vec2};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;
/// Distance from the top edge to the rotation handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge midpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// The nine handle kinds: four corners, four edge midpoints, one rotation
/// handle above the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    Rotate,
}

/// A transform handle with its position and kind.
#[derive(Debug, Clone, Copy)]
pub struct TransformHandle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl TransformHandle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Generate the nine handles for a bounding box, rotated by the object's
/// rotation around the box center.
pub fn handles_for(bounds: Rect, rotation: f64) -> Vec<TransformHandle> {
    let center = bounds.center();
    let place = |x: f64, y: f64, kind: HandleKind| {
        TransformHandle::new(rotate_about(Point::new(x, y), center, rotation), kind)
    };

    vec![
        place(bounds.x0, bounds.y0, HandleKind::Corner(Corner::TopLeft)),
        place(bounds.x1, bounds.y0, HandleKind::Corner(Corner::TopRight)),
        place(bounds.x0, bounds.y1, HandleKind::Corner(Corner::BottomLeft)),
        place(bounds.x1, bounds.y1, HandleKind::Corner(Corner::BottomRight)),
        place(center.x, bounds.y0, HandleKind::Edge(Edge::Top)),
        place(bounds.x1, center.y, HandleKind::Edge(Edge::Right)),
        place(center.x, bounds.y1, HandleKind::Edge(Edge::Bottom)),
        place(bounds.x0, center.y, HandleKind::Edge(Edge::Left)),
        place(
            center.x,
            bounds.y0 - ROTATE_HANDLE_OFFSET,
            HandleKind::Rotate,
        ),
    ]
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(
    bounds: Rect,
    rotation: f64,
    point: Point,
    tolerance: f64,
) -> Option<HandleKind> {
    handles_for(bounds, rotation)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// For each non-rotation handle, the `(left, top, right, bottom)` factors
/// describing which edges of the bounding box follow the pointer delta.
pub fn edge_deltas(kind: HandleKind) -> (f64, f64, f64, f64) {
    match kind {
        HandleKind::Corner(Corner::TopLeft) => (1.0, 1.0, 0.0, 0.0),
        HandleKind::Corner(Corner::TopRight) => (0.0, 1.0, 1.0, 0.0),
        HandleKind::Corner(Corner::BottomLeft) => (1.0, 0.0, 0.0, 1.0),
        HandleKind::Corner(Corner::BottomRight) => (0.0, 0.0, 1.0, 1.0),
        HandleKind::Edge(Edge::Top) => (0.0, 1.0, 0.0, 0.0),
        HandleKind::Edge(Edge::Right) => (0.0, 0.0, 1.0, 0.0),
        HandleKind::Edge(Edge::Bottom) => (0.0, 0.0, 0.0, 1.0),
        HandleKind::Edge(Edge::Left) => (1.0, 0.0, 0.0, 0.0),
        HandleKind::Rotate => (0.0, 0.0, 0.0, 0.0),
    }
}

/// Apply a resize delta to a bounding box through a handle's edge factors.
/// The result is normalized and clamped to a minimum 1×1 size.
pub fn resize_bounds(original: Rect, kind: HandleKind, delta: Vec2) -> Rect {
    let (l, t, r, b) = edge_deltas(kind);
    let x0 = original.x0 + delta.x * l;
    let y0 = original.y0 + delta.y * t;
    let x1 = original.x1 + delta.x * r;
    let y1 = original.y1 + delta.y * b;

    let (x0, x1) = if x0 < x1 { (x0, x1) } else { (x1, x0) };
    let (y0, y1) = if y0 < y1 { (y0, y1) } else { (y1, y0) };

    Rect::new(x0, y0, (x1).max(x0 + 1.0), (y1).max(y0 + 1.0))
}
