//! Layered scene renderer.
//!
//! The static layer holds all committed objects and is repainted only when
//! the object list changes (tracked by the drawing state's revision) and
//! only inside damaged regions. The overlay layer carries everything that
//! changes per interaction frame: the live drag preview, the dashed
//! selection box with its transform handles, and the text-edit overlay with
//! its caret. Per-object painting applies the object's transform bracket
//! and resets painter state afterwards so no style leaks between objects.

use crate::damage::{merge_rects, Damage, DamageTracker};
use crate::surface::Surface;
use kurbo::{BezPath, Point, Rect};
use pagemark_core::geometry::rotate_about;
use pagemark_core::handles::{handles_for, HandleKind, HANDLE_SIZE};
use pagemark_core::text_metrics;
use pagemark_core::{DrawingObject, ObjectId, Painter, TextRun, ToolManager};
use peniko::Color;

/// Selection chrome color.
pub fn selection_color() -> Color {
    Color::from_rgba8(59, 130, 246, 255)
}

/// Dash pattern of the selection box.
const SELECTION_DASH: [f64; 2] = [4.0, 4.0];

/// The in-place text edit overlay.
#[derive(Debug)]
pub struct TextOverlay<'a> {
    /// The object being edited (hidden from the static scene).
    pub object: &'a DrawingObject,
    /// Live edit buffer (the object's text is not yet updated).
    pub buffer: &'a str,
    /// Caret position in characters.
    pub cursor: usize,
    pub caret_visible: bool,
}

/// Everything one frame needs.
pub struct RenderContext<'a> {
    /// Committed objects in z-order.
    pub objects: &'a [DrawingObject],
    pub tools: &'a ToolManager,
    /// Selected object, for the selection chrome.
    pub selected: Option<&'a DrawingObject>,
    /// Object under construction (live preview).
    pub preview: Option<&'a DrawingObject>,
    /// Committed object owned by an active gesture or text edit: skipped in
    /// the static scene and drawn on the overlay instead.
    pub active_id: Option<ObjectId>,
    pub editing: Option<TextOverlay<'a>>,
}

/// Damage-tracked two-layer renderer.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    damage: DamageTracker,
    last_revision: Option<u64>,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a region of the committed scene as needing repaint.
    pub fn mark_dirty(&mut self, rect: Rect) {
        self.damage.mark_dirty(rect);
    }

    /// Mark the whole committed scene as needing repaint.
    pub fn mark_all_dirty(&mut self) {
        self.damage.mark_all_dirty();
    }

    /// Paint one frame: the static layer where damaged, then the overlay.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        revision: u64,
        static_surface: &mut dyn Surface,
        overlay_surface: &mut dyn Surface,
    ) {
        self.render_static(ctx, revision, static_surface);
        self.render_overlay(ctx, overlay_surface);
    }

    /// Repaint damaged regions of the committed scene. Returns whether
    /// anything was painted.
    pub fn render_static(
        &mut self,
        ctx: &RenderContext,
        revision: u64,
        surface: &mut dyn Surface,
    ) -> bool {
        if self.last_revision != Some(revision) {
            self.damage.mark_all_dirty();
            self.last_revision = Some(revision);
        }
        let Some(damage) = self.damage.take() else {
            return false;
        };

        match damage {
            Damage::Full => {
                surface.clear();
                for object in visible_objects(ctx) {
                    paint_object(object, ctx.tools, surface);
                }
            }
            Damage::Rects(rects) => {
                for region in expand_regions(ctx, rects) {
                    surface.set_clip(Some(region));
                    surface.clear_region(region);
                    for object in visible_objects(ctx) {
                        if rects_overlap(object.damage_bounds(), region) {
                            paint_object(object, ctx.tools, surface);
                        }
                    }
                }
                surface.set_clip(None);
            }
        }
        true
    }

    /// Repaint the dynamic overlay: preview, gesture-held object, selection
    /// chrome and text-edit overlay. Redrawn in full every call.
    pub fn render_overlay(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) {
        surface.clear();

        // The committed object owned by a drag/transform follows the
        // pointer here instead of invalidating the static layer per frame
        if let Some(active_id) = ctx.active_id {
            if ctx.editing.is_none() {
                if let Some(object) = ctx.objects.iter().find(|o| o.id() == active_id) {
                    paint_object(object, ctx.tools, surface);
                }
            }
        }

        if let Some(preview) = ctx.preview {
            paint_object(preview, ctx.tools, surface);
        }

        if let Some(editing) = &ctx.editing {
            paint_text_overlay(editing, surface);
        } else if let Some(selected) = ctx.selected {
            paint_selection_chrome(selected, surface);
        }
    }
}

/// Committed objects that belong on the static layer this frame.
fn visible_objects<'a>(ctx: &'a RenderContext) -> impl Iterator<Item = &'a DrawingObject> {
    ctx.objects
        .iter()
        .filter(move |object| Some(object.id()) != ctx.active_id)
}

fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Grow damaged regions until they cover every object they touch, so a
/// partial repaint never cuts an object in half against stale pixels.
fn expand_regions(ctx: &RenderContext, rects: Vec<Rect>) -> Vec<Rect> {
    let mut regions = rects;
    loop {
        let mut changed = false;
        for region in &mut regions {
            for object in visible_objects(ctx) {
                let bounds = object.damage_bounds();
                if rects_overlap(bounds, *region) && region.union(bounds) != *region {
                    *region = region.union(bounds);
                    changed = true;
                }
            }
        }
        if !changed {
            return merge_rects(regions);
        }
    }
}

/// Paint one object through its owning tool, bracketed by the object's
/// transform and style state, then reset so nothing leaks.
pub fn paint_object(object: &DrawingObject, tools: &ToolManager, painter: &mut dyn Painter) {
    let Some(tool) = tools.tool(object.kind) else {
        log::warn!("no tool registered for {:?}", object.kind);
        return;
    };
    if !object.transform.is_identity() {
        painter.set_transform(object.transform_affine());
    }
    painter.set_alpha(object.options.opacity);
    painter.set_dash(&object.options.line_dash);
    painter.set_shadow(object.options.shadow.as_ref());
    tool.render(object, painter);
    painter.reset_state();
}

/// Dashed selection box plus the nine transform handles.
fn paint_selection_chrome(selected: &DrawingObject, painter: &mut dyn Painter) {
    let bounds = selected.bounds;
    let rotation = selected.transform.rotation;
    let center = bounds.center();
    let color = selection_color();

    let corners = [
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
        Point::new(bounds.x1, bounds.y1),
        Point::new(bounds.x0, bounds.y1),
    ];
    let mut box_path = BezPath::new();
    box_path.move_to(rotate_about(corners[0], center, rotation));
    for corner in &corners[1..] {
        box_path.line_to(rotate_about(*corner, center, rotation));
    }
    box_path.close_path();

    painter.set_dash(&SELECTION_DASH);
    painter.stroke_path(&box_path, color, 1.0);
    painter.set_dash(&[]);

    for handle in handles_for(bounds, rotation) {
        let half = HANDLE_SIZE / 2.0;
        let mut path = BezPath::new();
        match handle.kind {
            HandleKind::Rotate => {
                let circle = kurbo::Circle::new(handle.position, half);
                path = kurbo::Shape::to_path(&circle, 0.1);
            }
            _ => {
                let p = handle.position;
                path.move_to(Point::new(p.x - half, p.y - half));
                path.line_to(Point::new(p.x + half, p.y - half));
                path.line_to(Point::new(p.x + half, p.y + half));
                path.line_to(Point::new(p.x - half, p.y + half));
                path.close_path();
            }
        }
        painter.fill_path(&path, Color::WHITE);
        painter.stroke_path(&path, color, 1.5);
    }
    painter.reset_state();
}

/// Live text buffer plus the blinking caret, positioned by measuring the
/// substring before the cursor.
fn paint_text_overlay(overlay: &TextOverlay, painter: &mut dyn Painter) {
    let object = overlay.object;
    let font = &object.options.font;

    if !overlay.buffer.is_empty() {
        painter.set_alpha(object.options.opacity);
        painter.draw_text(&TextRun {
            text: overlay.buffer,
            origin: object.start,
            font,
            color: object.options.stroke(),
        });
        painter.reset_state();
    }

    if overlay.caret_visible {
        let caret = text_metrics::caret_position(overlay.buffer, overlay.cursor, font);
        let top = Point::new(object.start.x + caret.x, object.start.y + caret.y);
        let mut path = BezPath::new();
        path.move_to(top);
        path.line_to(Point::new(top.x, top.y + text_metrics::line_height(font)));
        painter.stroke_path(&path, object.options.stroke(), 1.5);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DisplayItem, RecordingSurface};
    use kurbo::{Affine, Point};
    use pagemark_core::{DrawOptions, DrawingObject, ObjectKind, ToolContext};

    struct Scene {
        objects: Vec<DrawingObject>,
        tools: ToolManager,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                objects: Vec::new(),
                tools: ToolManager::new(),
            }
        }

        fn add_rect(&mut self, from: Point, to: Point) -> ObjectId {
            let options = DrawOptions::default();
            let tool = self.tools.tool(ObjectKind::Rectangle).unwrap();
            let mut ctx = ToolContext::new(&options);
            let mut object = tool.begin(from, &mut ctx).unwrap();
            tool.reshape(to, &mut object, &mut ctx);
            let object = tool.finish(to, object, &mut ctx).unwrap();
            let id = object.id();
            self.objects.push(object);
            id
        }

        fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                objects: &self.objects,
                tools: &self.tools,
                selected: None,
                preview: None,
                active_id: None,
                editing: None,
            }
        }
    }

    #[test]
    fn test_static_layer_repaints_only_on_revision_change() {
        let mut scene = Scene::new();
        scene.add_rect(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        let mut renderer = SceneRenderer::new();
        let mut surface = RecordingSurface::new(800, 600);

        assert!(renderer.render_static(&scene.ctx(), 1, &mut surface));
        let first = surface.items().len();
        assert!(first > 0);

        // Same revision, no damage: nothing repainted
        assert!(!renderer.render_static(&scene.ctx(), 1, &mut surface));
        assert_eq!(surface.items().len(), first);

        // Revision moved: full repaint
        assert!(renderer.render_static(&scene.ctx(), 2, &mut surface));
        assert!(surface.items().len() > first);
    }

    #[test]
    fn test_partial_damage_repaints_intersecting_objects_only() {
        let mut scene = Scene::new();
        scene.add_rect(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        scene.add_rect(Point::new(500.0, 500.0), Point::new(560.0, 560.0));
        let mut renderer = SceneRenderer::new();
        let mut surface = RecordingSurface::new(800, 600);

        // Prime the static layer
        renderer.render_static(&scene.ctx(), 1, &mut surface);
        surface.reset_items();

        // Damage only the first object's area
        renderer.mark_dirty(Rect::new(0.0, 0.0, 60.0, 60.0));
        assert!(renderer.render_static(&scene.ctx(), 1, &mut surface));

        // One clear-region plus one object stroke
        assert_eq!(surface.stroke_count(), 1);
        assert!(surface
            .items()
            .iter()
            .any(|i| matches!(i, DisplayItem::ClearRegion { .. })));
    }

    #[test]
    fn test_active_object_moves_to_overlay() {
        let mut scene = Scene::new();
        let id = scene.add_rect(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        let mut renderer = SceneRenderer::new();
        let mut static_surface = RecordingSurface::new(800, 600);
        let mut overlay_surface = RecordingSurface::new(800, 600);

        let mut ctx = scene.ctx();
        ctx.active_id = Some(id);
        renderer.render(&ctx, 1, &mut static_surface, &mut overlay_surface);

        // The active object is absent from the static layer
        assert_eq!(static_surface.stroke_count(), 0);
        // ...and present on the overlay
        assert_eq!(overlay_surface.stroke_count(), 1);
    }

    #[test]
    fn test_selection_chrome_draws_nine_handles() {
        let mut scene = Scene::new();
        scene.add_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let mut renderer = SceneRenderer::new();
        let mut overlay = RecordingSurface::new(800, 600);

        let mut ctx = scene.ctx();
        ctx.selected = scene.objects.first();
        renderer.render_overlay(&ctx, &mut overlay);

        // 9 handle fills (white squares/circle)
        let fills = overlay
            .items()
            .iter()
            .filter(|i| matches!(i, DisplayItem::FillPath { .. }))
            .count();
        assert_eq!(fills, 9);
        // Dashed box + 9 handle outlines
        assert_eq!(overlay.stroke_count(), 10);
    }

    #[test]
    fn test_text_overlay_draws_buffer_and_caret() {
        let mut scene = Scene::new();
        let options = DrawOptions::default();
        let mut object =
            DrawingObject::new(ObjectKind::Text, Point::new(10.0, 10.0), options);
        object.text = Some("old".to_string());
        scene.objects.push(object);

        let mut renderer = SceneRenderer::new();
        let mut overlay = RecordingSurface::new(800, 600);

        let binding = scene.objects[0].clone();
        let mut ctx = scene.ctx();
        ctx.active_id = Some(binding.id());
        ctx.editing = Some(TextOverlay {
            object: &binding,
            buffer: "new text",
            cursor: 3,
            caret_visible: true,
        });
        renderer.render_overlay(&ctx, &mut overlay);

        assert_eq!(overlay.text_count(), 1);
        // The caret stroke
        assert_eq!(overlay.stroke_count(), 1);

        // Caret hidden mid-blink: only the text remains
        let mut overlay2 = RecordingSurface::new(800, 600);
        let mut ctx = scene.ctx();
        ctx.active_id = Some(binding.id());
        ctx.editing = Some(TextOverlay {
            object: &binding,
            buffer: "new text",
            cursor: 3,
            caret_visible: false,
        });
        renderer.render_overlay(&ctx, &mut overlay2);
        assert_eq!(overlay2.stroke_count(), 0);
        assert_eq!(overlay2.text_count(), 1);
    }

    #[test]
    fn test_painter_state_never_leaks_between_objects() {
        let mut scene = Scene::new();
        scene.add_rect(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        scene.objects[0].options.opacity = 0.4;
        scene.objects[0].options.line_dash = vec![2.0, 2.0];
        scene.objects[0].transform.rotation = 0.7;

        let mut surface = RecordingSurface::new(800, 600);
        paint_object(&scene.objects[0], &scene.tools, &mut surface);

        assert_eq!(surface.current_transform(), Affine::IDENTITY);
        assert!((surface.current_alpha() - 1.0).abs() < f64::EPSILON);
        assert!(surface.current_dash().is_empty());
        assert!(surface.current_shadow().is_none());
    }

    #[test]
    fn test_damage_expansion_covers_whole_objects() {
        let mut scene = Scene::new();
        scene.add_rect(Point::new(0.0, 0.0), Point::new(200.0, 200.0));
        let regions = expand_regions(
            &scene.ctx(),
            vec![Rect::new(90.0, 90.0, 110.0, 110.0)],
        );

        assert_eq!(regions.len(), 1);
        // The region grew to the object's padded bounds
        assert!(regions[0].x0 < 0.0);
        assert!(regions[0].x1 > 200.0);
    }
}
