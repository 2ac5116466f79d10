//! The drawing object: the persisted unit of the annotation document.

use crate::options::DrawOptions;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drawing objects.
pub type ObjectId = Uuid;

/// The closed set of drawing modes. Every persisted object carries the mode
/// that created it; `Select` never produces a persisted object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    #[default]
    Select,
    Pen,
    Arrow,
    Rectangle,
    Circle,
    Text,
    HandDrawn,
    Line,
    Eraser,
    Highlighter,
    Star,
    Triangle,
}

impl ObjectKind {
    /// All modes, in toolbar order.
    pub fn all() -> &'static [ObjectKind] {
        &[
            ObjectKind::Select,
            ObjectKind::Pen,
            ObjectKind::Highlighter,
            ObjectKind::Eraser,
            ObjectKind::Line,
            ObjectKind::Arrow,
            ObjectKind::Rectangle,
            ObjectKind::Circle,
            ObjectKind::Triangle,
            ObjectKind::Star,
            ObjectKind::HandDrawn,
            ObjectKind::Text,
        ]
    }

    /// Whether this mode produces persisted objects.
    pub fn persists(&self) -> bool {
        !matches!(self, ObjectKind::Select)
    }
}

/// Optional per-object transform. Identity when absent from the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2d {
    /// Rotation in radians around the bounding-box center.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform2d {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Transform2d {
    /// Check if this transform is the identity.
    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0
            && self.scale_x == 1.0
            && self.scale_y == 1.0
            && self.translate_x == 0.0
            && self.translate_y == 0.0
    }
}

/// A drawing object. Created by a tool plugin at gesture completion, mutated
/// in place by move/resize/rotate/style edits, removed on delete or replaced
/// wholesale on undo/redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingObject {
    pub(crate) id: ObjectId,
    /// The mode that created this object.
    pub kind: ObjectKind,
    /// Anchor point of the gesture that created the object.
    pub start: Point,
    /// Second defining point for drag-defined shapes.
    pub end: Option<Point>,
    /// Ordered polyline for freehand/eraser/highlighter strokes.
    #[serde(default)]
    pub points: Vec<Point>,
    /// Text content for text objects.
    pub text: Option<String>,
    /// Owned style snapshot.
    pub options: DrawOptions,
    /// Axis-aligned bounding box in canvas coordinates. Kept consistent with
    /// the geometry: must always re-derive to the box the owning tool's
    /// `bounds()` computes.
    pub bounds: Rect,
    /// Per-object transform (identity when absent).
    #[serde(default)]
    pub transform: Transform2d,
    /// Transient request to enter text editing right after creation.
    /// Set by non-drag tools, consumed and cleared once observed.
    #[serde(skip)]
    pub(crate) wants_text_edit: bool,
}

impl DrawingObject {
    /// Create a new object anchored at `start` with a fresh id.
    pub fn new(kind: ObjectKind, start: Point, options: DrawOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            start,
            end: None,
            points: Vec::new(),
            text: None,
            options,
            bounds: Rect::from_origin_size(start, (0.0, 0.0)),
            transform: Transform2d::default(),
            wants_text_edit: false,
        }
    }

    /// Get the unique identifier.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Regenerate the object's id. Used when duplicating or pasting so the
    /// copy has a unique identity.
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Translate the object (and its cached bounds) by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        if let Some(end) = &mut self.end {
            *end += delta;
        }
        for point in &mut self.points {
            *point += delta;
        }
        self.bounds = self.bounds + delta;
    }

    /// The affine for the object's transform: translate to the bounding-box
    /// center, rotate, scale, translate back, then the extra translation.
    pub fn transform_affine(&self) -> Affine {
        let t = &self.transform;
        let center = self.bounds.center().to_vec2();
        Affine::translate(center + Vec2::new(t.translate_x, t.translate_y))
            * Affine::rotate(t.rotation)
            * Affine::scale_non_uniform(t.scale_x, t.scale_y)
            * Affine::translate(-center)
    }

    /// The region a repaint must cover for this object: its bounds under
    /// the object transform, padded by stroke overhang and shadow reach.
    pub fn damage_bounds(&self) -> Rect {
        let mut bounds = self.bounds;
        if !self.transform.is_identity() {
            bounds = self.transform_affine().transform_rect_bbox(bounds);
        }
        let mut pad = self.options.stroke_width / 2.0 + 1.0;
        if let Some(shadow) = &self.options.shadow {
            pad += shadow.offset_x.abs().max(shadow.offset_y.abs()) + shadow.blur;
        }
        bounds.inflate(pad, pad)
    }

    /// Mark this object as wanting to enter text editing.
    pub fn request_text_edit(&mut self) {
        self.wants_text_edit = true;
    }

    /// Consume the text-edit request, clearing the marker.
    pub fn take_text_edit_request(&mut self) -> bool {
        std::mem::take(&mut self.wants_text_edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_has_identity_transform() {
        let obj = DrawingObject::new(
            ObjectKind::Rectangle,
            Point::new(10.0, 20.0),
            DrawOptions::default(),
        );
        assert!(obj.transform.is_identity());
        assert!(obj.end.is_none());
        assert!(obj.points.is_empty());
    }

    #[test]
    fn test_translate_moves_geometry_and_bounds() {
        let mut obj = DrawingObject::new(
            ObjectKind::Line,
            Point::new(0.0, 0.0),
            DrawOptions::default(),
        );
        obj.end = Some(Point::new(100.0, 50.0));
        obj.bounds = Rect::new(0.0, 0.0, 100.0, 50.0);

        obj.translate(Vec2::new(10.0, 20.0));

        assert_eq!(obj.start, Point::new(10.0, 20.0));
        assert_eq!(obj.end, Some(Point::new(110.0, 70.0)));
        assert_eq!(obj.bounds, Rect::new(10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn test_regenerate_id() {
        let mut obj = DrawingObject::new(
            ObjectKind::Pen,
            Point::ZERO,
            DrawOptions::default(),
        );
        let old = obj.id();
        obj.regenerate_id();
        assert_ne!(old, obj.id());
    }

    #[test]
    fn test_text_edit_request_consumed_once() {
        let mut obj = DrawingObject::new(
            ObjectKind::Text,
            Point::ZERO,
            DrawOptions::default(),
        );
        obj.request_text_edit();
        assert!(obj.take_text_edit_request());
        assert!(!obj.take_text_edit_request());
    }

    #[test]
    fn test_select_never_persists() {
        assert!(!ObjectKind::Select.persists());
        assert!(ObjectKind::Pen.persists());
    }

    #[test]
    fn test_damage_bounds_cover_stroke_overhang() {
        let mut obj = DrawingObject::new(
            ObjectKind::Rectangle,
            Point::new(10.0, 10.0),
            DrawOptions::default(),
        );
        obj.options.stroke_width = 8.0;
        obj.bounds = Rect::new(10.0, 10.0, 110.0, 60.0);

        let damage = obj.damage_bounds();
        assert!(damage.x0 <= 10.0 - 4.0);
        assert!(damage.x1 >= 110.0 + 4.0);
    }

    #[test]
    fn test_damage_bounds_follow_rotation() {
        let mut obj = DrawingObject::new(
            ObjectKind::Rectangle,
            Point::new(0.0, 0.0),
            DrawOptions::default(),
        );
        // A wide flat box rotated a quarter turn becomes tall
        obj.bounds = Rect::new(0.0, 40.0, 200.0, 60.0);
        obj.transform.rotation = std::f64::consts::FRAC_PI_2;

        let damage = obj.damage_bounds();
        assert!(damage.height() > damage.width());
        assert!(damage.height() >= 200.0);
    }
}
