//! Hand-drawn rectangle tool.
//!
//! Edges are subdivided and jittered by the object's roughness. Offsets
//! come from a PRNG seeded with the object's frozen style seed, so a
//! committed object renders identically on every frame.

use super::{Tool, ToolContext};
use crate::geometry::rect_from_corners;
use crate::object::{DrawingObject, ObjectKind};
use crate::paint::Painter;
use kurbo::{BezPath, Point, Rect};

const MIN_SIZE: f64 = 1.0;
/// Nominal segment length for edge subdivision.
const SEGMENT_LENGTH: f64 = 24.0;
/// Jitter amplitude in pixels per unit of roughness.
const JITTER_PER_ROUGHNESS: f64 = 1.6;

/// Deterministic stream of jitter offsets (splitmix64).
struct JitterRng(u64);

impl JitterRng {
    fn new(seed: u32) -> Self {
        Self(seed as u64 | 0x9E37_79B9_0000_0000)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in [-1, 1].
    fn next_offset(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

/// Build the jittered outline of a rectangle.
pub(crate) fn rough_rect_path(rect: Rect, roughness: f64, seed: u32) -> BezPath {
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x0, rect.y0),
    ];
    let amplitude = roughness * JITTER_PER_ROUGHNESS;
    let mut rng = JitterRng::new(seed);

    let mut path = BezPath::new();
    path.move_to(corners[0]);
    for pair in corners.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let length = from.distance(to);
        let segments = (length / SEGMENT_LENGTH).ceil().max(1.0) as usize;
        for i in 1..=segments {
            let t = i as f64 / segments as f64;
            let mut p = from.lerp(to, t);
            // Corners stay anchored so the outline closes cleanly
            if i < segments {
                p.x += rng.next_offset() * amplitude;
                p.y += rng.next_offset() * amplitude;
            }
            path.line_to(p);
        }
    }
    path
}

pub struct HandDrawnTool;

impl HandDrawnTool {
    fn rect(object: &DrawingObject) -> Rect {
        rect_from_corners(object.start, object.end.unwrap_or(object.start))
    }
}

impl Tool for HandDrawnTool {
    fn kind(&self) -> ObjectKind {
        ObjectKind::HandDrawn
    }

    fn begin(&self, point: Point, ctx: &mut ToolContext) -> Option<DrawingObject> {
        let mut object = ctx.new_object(ObjectKind::HandDrawn, point);
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
        let path = rough_rect_path(
            Self::rect(object),
            object.options.roughness,
            object.options.seed,
        );
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
