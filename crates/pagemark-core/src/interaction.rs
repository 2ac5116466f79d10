//! Interaction state machine.
//!
//! Pointer, keyboard and touch events drive transitions between Idle,
//! Drawing, Dragging, Transforming and EditingText. The mutable gesture
//! context lives in one [`Session`]; handlers receive the capabilities they
//! need through [`Workspace`] rather than reaching back into the engine.

use crate::handles::{self, HandleKind, HANDLE_HIT_TOLERANCE};
use crate::manager::ToolManager;
use crate::object::{DrawingObject, ObjectId, ObjectKind};
use crate::options::DrawOptions;
use crate::state::DrawingState;
use crate::text_edit::TextEditingState;
use crate::text_metrics;
use crate::tools::ToolContext;
use kurbo::{Point, Rect, Vec2};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// The action modifier (Ctrl, or Cmd on macOS hosts mapping meta).
    pub fn action(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keyboard key for the engine's shortcut set and text entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Character(char),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Escape,
}

/// Normalized input event. Touch events carry the same payload as pointer
/// events and share their handling (single-touch gestures).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PointerDown { position: Point },
    PointerMove { position: Point },
    PointerUp { position: Point },
    DoubleClick { position: Point },
    KeyDown { key: Key, modifiers: Modifiers },
    TouchStart { position: Point },
    TouchMove { position: Point },
    TouchEnd { position: Point },
}

/// What the caller must repaint after a transition.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    /// Overlay (selection chrome, preview, caret) needs repainting.
    pub redraw: bool,
    /// Damaged regions of the committed scene.
    pub dirty: Vec<Rect>,
    /// The whole canvas is damaged (clear/undo/redo/paste).
    pub dirty_all: bool,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    pub fn dirty(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            redraw: true,
            dirty: rects.into_iter().collect(),
            dirty_all: false,
        }
    }

    pub fn dirty_all() -> Self {
        Self {
            redraw: true,
            dirty: Vec::new(),
            dirty_all: true,
        }
    }

    pub fn is_none(&self) -> bool {
        !self.redraw && self.dirty.is_empty() && !self.dirty_all
    }
}

/// The interaction states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Drawing,
    Dragging,
    Transforming,
    EditingText,
}

/// Mutable gesture context: anchor point, active handle, drag offset and
/// the pre-gesture snapshots used for history commits and cancel-restore.
#[derive(Debug, Default)]
struct Session {
    phase: Phase,
    /// Pointer position at gesture start.
    anchor: Point,
    /// Offset between the pointer and the dragged object's bounds origin.
    drag_offset: Vec2,
    /// Handle being dragged while transforming.
    active_handle: Option<HandleKind>,
    /// Object under construction while drawing.
    draft: Option<DrawingObject>,
    /// Clone of the manipulated object at gesture start. Deltas apply to
    /// this snapshot so repeated small moves never compound rounding error.
    original: Option<DrawingObject>,
    /// Object-list snapshot at gesture start, committed as the single
    /// history entry at pointer-up.
    pre_gesture: Option<Vec<DrawingObject>>,
    /// Whether the gesture actually changed anything.
    moved: bool,
}

impl Session {
    fn reset(&mut self) {
        *self = Session::default();
    }
}

/// The capabilities a transition may touch.
pub struct Workspace<'a> {
    pub state: &'a mut DrawingState,
    pub text: &'a mut TextEditingState,
    pub tools: &'a ToolManager,
    pub options: &'a DrawOptions,
}

/// The interaction state machine.
#[derive(Debug, Default)]
pub struct Interaction {
    session: Session,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    /// The object being drawn, for the live preview.
    pub fn draft(&self) -> Option<&DrawingObject> {
        self.session.draft.as_ref()
    }

    /// The committed object currently owned by a gesture (drag/transform),
    /// drawn on the overlay instead of the static scene.
    pub fn active_object(&self, ws_state: &DrawingState) -> Option<ObjectId> {
        match self.session.phase {
            Phase::Dragging | Phase::Transforming => ws_state.selected_id(),
            _ => None,
        }
    }

    /// Dispatch one event. Touch events are normalized onto the pointer
    /// handlers.
    pub fn handle_event(&mut self, event: Event, ws: &mut Workspace) -> Effects {
        match event {
            Event::PointerDown { position } | Event::TouchStart { position } => {
                self.on_pointer_down(position, ws)
            }
            Event::PointerMove { position } | Event::TouchMove { position } => {
                self.on_pointer_move(position, ws)
            }
            Event::PointerUp { position } | Event::TouchEnd { position } => {
                self.on_pointer_up(position, ws)
            }
            Event::DoubleClick { position } => self.on_double_click(position, ws),
            Event::KeyDown { key, modifiers } => self.on_key_down(key, modifiers, ws),
        }
    }

    fn on_pointer_down(&mut self, position: Point, ws: &mut Workspace) -> Effects {
        let mut effects = Effects::none();

        // A click outside the edited object finalizes the edit, then the
        // press continues as a fresh Idle interaction.
        if self.session.phase == Phase::EditingText {
            if editing_hit(ws, position) {
                return Effects::none();
            }
            effects = self.finish_text_edit(ws);
        }

        if self.session.phase != Phase::Idle {
            return effects;
        }

        if ws.tools.mode() == ObjectKind::Select {
            let select_effects = self.on_select_down(position, ws);
            return merge(effects, select_effects);
        }

        let draw_effects = self.on_draw_down(position, ws);
        merge(effects, draw_effects)
    }

    /// Pointer-down in select mode: handles, then objects, then empty space.
    fn on_select_down(&mut self, position: Point, ws: &mut Workspace) -> Effects {
        if let Some(selected) = ws.state.selected() {
            let handle = handles::hit_test_handles(
                selected.bounds,
                selected.transform.rotation,
                position,
                HANDLE_HIT_TOLERANCE,
            );
            if let Some(handle) = handle {
                self.session.phase = Phase::Transforming;
                self.session.anchor = position;
                self.session.active_handle = Some(handle);
                self.session.original = Some(selected.clone());
                self.session.pre_gesture = Some(ws.state.snapshot());
                self.session.moved = false;
                return Effects::redraw();
            }
        }

        if let Some(id) = ws.state.object_at(position, ws.tools) {
            ws.state.select(id);
            let object = ws.state.object(id).cloned();
            if let Some(object) = object {
                self.session.phase = Phase::Dragging;
                self.session.anchor = position;
                self.session.drag_offset = position - object.bounds.origin();
                self.session.original = Some(object);
                self.session.pre_gesture = Some(ws.state.snapshot());
                self.session.moved = false;
            }
            return Effects::redraw();
        }

        let had_selection = ws.state.selected_id().is_some();
        ws.state.clear_selection();
        if had_selection {
            Effects::redraw()
        } else {
            Effects::none()
        }
    }

    /// Pointer-down in a drawing mode: delegate to the active tool plugin.
    fn on_draw_down(&mut self, position: Point, ws: &mut Workspace) -> Effects {
        let tool = ws.tools.current();
        let mut ctx = ToolContext::new(ws.options);

        if tool.requires_drag() {
            if let Some(mut object) = tool.begin(position, &mut ctx) {
                object.bounds = tool.bounds(&object);
                self.session.phase = Phase::Drawing;
                self.session.anchor = position;
                self.session.draft = Some(object);
                return Effects::redraw();
            }
            return Effects::none();
        }

        // Non-drag tools commit synchronously on pointer-down
        let object = tool
            .begin(position, &mut ctx)
            .and_then(|object| tool.finish(position, object, &mut ctx));
        let Some(mut object) = object else {
            return Effects::none();
        };
        object.bounds = tool.bounds(&object);
        let wants_edit = object.take_text_edit_request();
        let damage = object.damage_bounds();
        let id = ws.state.add_object(object);

        if wants_edit {
            ws.state.select(id);
            if let Some(object) = ws.state.object(id) {
                ws.text.start_editing(object);
            }
            self.session.phase = Phase::EditingText;
        }
        Effects::dirty([damage])
    }

    fn on_pointer_move(&mut self, position: Point, ws: &mut Workspace) -> Effects {
        match self.session.phase {
            Phase::Drawing => {
                let tool = ws.tools.current();
                let mut ctx = ToolContext::new(ws.options);
                let Some(draft) = self.session.draft.as_mut() else {
                    return Effects::none();
                };
                let old = draft.damage_bounds();
                // Incremental tools extend the polyline; shape tools
                // recompute from the anchor. Each implements one of the two.
                tool.extend(position, draft, &mut ctx);
                tool.reshape(position, draft, &mut ctx);
                draft.bounds = tool.bounds(draft);
                Effects::dirty([old, draft.damage_bounds()])
            }
            Phase::Dragging => {
                let offset = self.session.drag_offset;
                let Some(object) = ws.state.selected_mut() else {
                    return Effects::none();
                };
                let old = object.damage_bounds();
                let delta = (position - offset) - object.bounds.origin();
                if delta.hypot2() > 0.0 {
                    object.translate(delta);
                    self.session.moved = true;
                }
                Effects::dirty([old, object.damage_bounds()])
            }
            Phase::Transforming => self.apply_transform(position, ws),
            _ => Effects::none(),
        }
    }

    /// Apply a resize or rotation relative to the gesture-start snapshot.
    fn apply_transform(&mut self, position: Point, ws: &mut Workspace) -> Effects {
        let Some(handle) = self.session.active_handle else {
            return Effects::none();
        };
        let Some(original) = self.session.original.clone() else {
            return Effects::none();
        };
        let Some(object) = ws.state.selected_mut() else {
            return Effects::none();
        };
        let old = object.damage_bounds();

        match handle {
            HandleKind::Rotate => {
                let center = original.bounds.center();
                // Angle offset so straight up is zero rotation
                let angle = (position.y - center.y).atan2(position.x - center.x)
                    + std::f64::consts::FRAC_PI_2;
                object.transform.rotation = angle;
            }
            _ => {
                let delta = position - self.session.anchor;
                let new_bounds = handles::resize_bounds(original.bounds, handle, delta);
                remap_geometry(object, &original, new_bounds);
                let tool = ws.tools.tool(object.kind);
                object.bounds = match tool {
                    Some(tool) => tool.bounds(object),
                    None => new_bounds,
                };
            }
        }
        self.session.moved = true;
        Effects::dirty([old, object.damage_bounds()])
    }

    fn on_pointer_up(&mut self, position: Point, ws: &mut Workspace) -> Effects {
        match self.session.phase {
            Phase::Drawing => {
                let tool = ws.tools.current();
                let mut ctx = ToolContext::new(ws.options);
                let Some(draft) = self.session.draft.take() else {
                    self.session.reset();
                    return Effects::none();
                };
                let preview_bounds = draft.damage_bounds();
                let finished = tool.finish(position, draft, &mut ctx);
                self.session.reset();

                match finished {
                    Some(mut object) => {
                        object.bounds = tool.bounds(&object);
                        let wants_edit = object.take_text_edit_request();
                        let damage = object.damage_bounds();
                        let id = ws.state.add_object(object);
                        if wants_edit {
                            ws.state.select(id);
                            if let Some(object) = ws.state.object(id) {
                                ws.text.start_editing(object);
                            }
                            self.session.phase = Phase::EditingText;
                        }
                        Effects::dirty([preview_bounds, damage])
                    }
                    None => Effects::dirty([preview_bounds]),
                }
            }
            Phase::Dragging | Phase::Transforming => {
                let moved = self.session.moved;
                let pre_gesture = self.session.pre_gesture.take();
                self.session.reset();
                if moved {
                    if let Some(pre) = pre_gesture {
                        ws.state.commit_gesture(pre);
                    }
                }
                Effects::redraw()
            }
            _ => Effects::none(),
        }
    }

    fn on_double_click(&mut self, position: Point, ws: &mut Workspace) -> Effects {
        let mut effects = Effects::none();
        if self.session.phase == Phase::EditingText {
            if editing_hit(ws, position) {
                return Effects::none();
            }
            effects = self.finish_text_edit(ws);
        }

        if ws.tools.mode() != ObjectKind::Select {
            return effects;
        }

        match ws.state.object_at(position, ws.tools) {
            Some(id) => {
                let is_text = ws
                    .state
                    .object(id)
                    .is_some_and(|object| object.kind == ObjectKind::Text);
                if is_text {
                    ws.state.select(id);
                    if let Some(object) = ws.state.object(id) {
                        ws.text.start_editing(object);
                    }
                    self.session.reset();
                    self.session.phase = Phase::EditingText;
                    return merge(effects, Effects::redraw());
                }
                effects
            }
            None => {
                // Double-click on empty canvas creates a text object and
                // edits it immediately
                let text_tool = match ws.tools.tool(ObjectKind::Text) {
                    Some(tool) => tool,
                    None => return effects,
                };
                let mut ctx = ToolContext::new(ws.options);
                let object = text_tool
                    .begin(position, &mut ctx)
                    .and_then(|object| text_tool.finish(position, object, &mut ctx));
                let Some(mut object) = object else {
                    return effects;
                };
                object.bounds = text_tool.bounds(&object);
                object.take_text_edit_request();
                let damage = object.damage_bounds();
                let id = ws.state.add_object(object);
                ws.state.select(id);
                if let Some(object) = ws.state.object(id) {
                    ws.text.start_editing(object);
                }
                self.session.reset();
                self.session.phase = Phase::EditingText;
                merge(effects, Effects::dirty([damage]))
            }
        }
    }

    fn on_key_down(&mut self, key: Key, modifiers: Modifiers, ws: &mut Workspace) -> Effects {
        if self.session.phase == Phase::EditingText {
            return self.on_edit_key(key, modifiers, ws);
        }

        match key {
            Key::Escape => self.cancel(ws),
            Key::Delete | Key::Backspace => match ws.state.selected_id() {
                Some(id) => {
                    let damage = ws.state.object(id).map(|o| o.damage_bounds());
                    ws.state.remove_object(id);
                    Effects::dirty(damage)
                }
                None => Effects::none(),
            },
            Key::Character(c) if modifiers.action() => match c.to_ascii_lowercase() {
                'c' => {
                    ws.state.copy_selected();
                    Effects::none()
                }
                'v' => match ws.state.paste() {
                    Some(id) => {
                        Effects::dirty(ws.state.object(id).map(|o| o.damage_bounds()))
                    }
                    None => Effects::none(),
                },
                'd' => match ws.state.duplicate_selected() {
                    Some(id) => {
                        Effects::dirty(ws.state.object(id).map(|o| o.damage_bounds()))
                    }
                    None => Effects::none(),
                },
                'z' if modifiers.shift => toggle_history(ws.state.redo()),
                'z' => toggle_history(ws.state.undo()),
                'y' => toggle_history(ws.state.redo()),
                _ => Effects::none(),
            },
            _ => Effects::none(),
        }
    }

    /// Keys while editing text.
    fn on_edit_key(&mut self, key: Key, modifiers: Modifiers, ws: &mut Workspace) -> Effects {
        match key {
            Key::Escape => self.finish_text_edit(ws),
            Key::Backspace => {
                ws.text.delete_backward();
                Effects::redraw()
            }
            Key::Delete => {
                ws.text.delete_forward();
                Effects::redraw()
            }
            Key::Enter => {
                ws.text.insert_char('\n');
                Effects::redraw()
            }
            Key::Left => {
                ws.text.move_cursor_left();
                Effects::redraw()
            }
            Key::Right => {
                ws.text.move_cursor_right();
                Effects::redraw()
            }
            Key::Up => {
                ws.text.move_cursor_up();
                Effects::redraw()
            }
            Key::Down => {
                ws.text.move_cursor_down();
                Effects::redraw()
            }
            Key::Home => {
                ws.text.move_cursor_to_line_start();
                Effects::redraw()
            }
            Key::End => {
                ws.text.move_cursor_to_line_end();
                Effects::redraw()
            }
            Key::Character(c) if !modifiers.action() => {
                ws.text.insert_char(c);
                Effects::redraw()
            }
            _ => Effects::none(),
        }
    }

    /// Finalize the current text edit: write the buffer back, recompute
    /// bounds from measured metrics, delete the object when the buffer is
    /// empty.
    fn finish_text_edit(&mut self, ws: &mut Workspace) -> Effects {
        let Some((id, buffer)) = ws.text.finish_editing() else {
            self.session.reset();
            return Effects::none();
        };
        self.session.reset();

        let Some(object) = ws.state.object(id) else {
            return Effects::none();
        };
        let old_bounds = object.damage_bounds();

        if buffer.trim().is_empty() {
            log::debug!("removing empty text object {id}");
            ws.state.remove_object(id);
            return Effects::dirty([old_bounds]);
        }

        if object.text.as_deref() == Some(buffer.as_str()) {
            return Effects::redraw();
        }

        ws.state.push_undo();
        let Some(object) = ws.state.object_mut(id) else {
            return Effects::none();
        };
        let size = text_metrics::measure(&buffer, &object.options.font);
        object.text = Some(buffer);
        object.bounds = Rect::from_origin_size(object.start, size);
        let new_bounds = object.damage_bounds();
        ws.state.mark_changed();
        Effects::dirty([old_bounds, new_bounds])
    }

    /// Cancel whatever is in flight: discard a draft, restore the
    /// pre-gesture object, or finish a text edit. Escape with nothing open
    /// clears the selection.
    pub fn cancel(&mut self, ws: &mut Workspace) -> Effects {
        match self.session.phase {
            Phase::Drawing => {
                let damage = self.session.draft.as_ref().map(|d| d.damage_bounds());
                self.session.reset();
                Effects::dirty(damage)
            }
            Phase::Dragging | Phase::Transforming => {
                let original = self.session.original.take();
                self.session.reset();
                if let Some(original) = original {
                    let dirty = ws
                        .state
                        .object_mut(original.id())
                        .map(|object| {
                            let moved = object.damage_bounds();
                            *object = original.clone();
                            [moved, original.damage_bounds()]
                        })
                        .into_iter()
                        .flatten();
                    return Effects::dirty(dirty);
                }
                Effects::redraw()
            }
            Phase::EditingText => self.finish_text_edit(ws),
            Phase::Idle => {
                if ws.state.selected_id().is_some() {
                    ws.state.clear_selection();
                    Effects::redraw()
                } else {
                    Effects::none()
                }
            }
        }
    }
}

/// Whether a point lands on the object being edited, measured against the
/// live buffer (the object's cached bounds are stale mid-edit).
fn editing_hit(ws: &Workspace, position: Point) -> bool {
    ws.text
        .editing_id()
        .and_then(|id| ws.state.object(id))
        .is_some_and(|object| {
            let buffer = ws.text.buffer().unwrap_or("");
            let size = text_metrics::measure(buffer, &object.options.font);
            Rect::from_origin_size(object.start, size).contains(position)
        })
}

fn toggle_history(changed: bool) -> Effects {
    if changed {
        Effects::dirty_all()
    } else {
        Effects::none()
    }
}

fn merge(mut a: Effects, b: Effects) -> Effects {
    a.redraw |= b.redraw;
    a.dirty_all |= b.dirty_all;
    a.dirty.extend(b.dirty);
    a
}

/// Map an object's geometry from its gesture-start bounds into new bounds.
fn remap_geometry(object: &mut DrawingObject, original: &DrawingObject, new_bounds: Rect) {
    let old_bounds = original.bounds;
    let scale_x = new_bounds.width() / old_bounds.width().max(f64::EPSILON);
    let scale_y = new_bounds.height() / old_bounds.height().max(f64::EPSILON);
    let map = |p: Point| {
        Point::new(
            new_bounds.x0 + (p.x - old_bounds.x0) * scale_x,
            new_bounds.y0 + (p.y - old_bounds.y0) * scale_y,
        )
    };

    object.start = map(original.start);
    object.end = original.end.map(map);
    object.points = original.points.iter().copied().map(map).collect();

    // Text scales through its font size rather than raw geometry
    if object.kind == ObjectKind::Text {
        let ratio = scale_y.max(f64::EPSILON);
        object.options.font.size = (original.options.font.size * ratio).max(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::ROTATE_HANDLE_OFFSET;

    struct Fixture {
        state: DrawingState,
        text: TextEditingState,
        tools: ToolManager,
        options: DrawOptions,
        interaction: Interaction,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: DrawingState::new(),
                text: TextEditingState::new(),
                tools: ToolManager::new(),
                options: DrawOptions::default(),
                interaction: Interaction::new(),
            }
        }

        fn send(&mut self, event: Event) -> Effects {
            let mut ws = Workspace {
                state: &mut self.state,
                text: &mut self.text,
                tools: &self.tools,
                options: &self.options,
            };
            self.interaction.handle_event(event, &mut ws)
        }

        fn draw_rect(&mut self, from: Point, to: Point) -> ObjectId {
            self.tools.set_mode(ObjectKind::Rectangle);
            self.send(Event::PointerDown { position: from });
            self.send(Event::PointerMove { position: to });
            self.send(Event::PointerUp { position: to });
            self.tools.set_mode(ObjectKind::Select);
            self.state.objects().last().map(|o| o.id()).unwrap()
        }
    }

    #[test]
    fn test_draw_commits_on_pointer_up() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Rectangle);

        fx.send(Event::PointerDown {
            position: Point::new(10.0, 10.0),
        });
        assert_eq!(fx.interaction.phase(), Phase::Drawing);
        assert_eq!(fx.state.len(), 0);
        assert!(fx.interaction.draft().is_some());

        fx.send(Event::PointerMove {
            position: Point::new(110.0, 60.0),
        });
        fx.send(Event::PointerUp {
            position: Point::new(110.0, 60.0),
        });
        assert_eq!(fx.interaction.phase(), Phase::Idle);
        assert_eq!(fx.state.len(), 1);
        assert_eq!(
            fx.state.objects()[0].bounds,
            Rect::new(10.0, 10.0, 110.0, 60.0)
        );
    }

    #[test]
    fn test_click_selects_and_drags() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));

        fx.send(Event::PointerDown {
            position: Point::new(50.0, 50.0),
        });
        assert_eq!(fx.interaction.phase(), Phase::Dragging);
        assert_eq!(fx.state.selected_id(), Some(id));

        fx.send(Event::PointerMove {
            position: Point::new(80.0, 60.0),
        });
        fx.send(Event::PointerUp {
            position: Point::new(80.0, 60.0),
        });
        assert_eq!(fx.interaction.phase(), Phase::Idle);
        let object = fx.state.object(id).unwrap();
        assert_eq!(object.bounds, Rect::new(30.0, 10.0, 130.0, 110.0));
    }

    #[test]
    fn test_drag_commits_single_snapshot() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let history_before = fx.state.history_len();

        fx.send(Event::PointerDown {
            position: Point::new(50.0, 50.0),
        });
        for i in 1..=10 {
            fx.send(Event::PointerMove {
                position: Point::new(50.0 + i as f64, 50.0),
            });
        }
        fx.send(Event::PointerUp {
            position: Point::new(60.0, 50.0),
        });

        assert_eq!(fx.state.history_len(), history_before + 1);
        assert!(fx.state.undo());
        assert_eq!(
            fx.state.object(id).unwrap().bounds,
            Rect::new(0.0, 0.0, 100.0, 100.0)
        );
    }

    #[test]
    fn test_click_without_movement_commits_nothing() {
        let mut fx = Fixture::new();
        fx.draw_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let history_before = fx.state.history_len();

        fx.send(Event::PointerDown {
            position: Point::new(50.0, 50.0),
        });
        fx.send(Event::PointerUp {
            position: Point::new(50.0, 50.0),
        });
        assert_eq!(fx.state.history_len(), history_before);
    }

    #[test]
    fn test_click_empty_clears_selection() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        fx.state.select(id);

        fx.send(Event::PointerDown {
            position: Point::new(300.0, 300.0),
        });
        assert!(fx.state.selected_id().is_none());
    }

    #[test]
    fn test_handle_starts_transform() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        fx.state.select(id);

        // Press exactly on the bottom-right corner handle
        fx.send(Event::PointerDown {
            position: Point::new(100.0, 100.0),
        });
        assert_eq!(fx.interaction.phase(), Phase::Transforming);

        fx.send(Event::PointerMove {
            position: Point::new(150.0, 125.0),
        });
        fx.send(Event::PointerUp {
            position: Point::new(150.0, 125.0),
        });

        let object = fx.state.object(id).unwrap();
        assert_eq!(object.bounds, Rect::new(0.0, 0.0, 150.0, 125.0));
    }

    #[test]
    fn test_resize_applies_from_original_without_compounding() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        fx.state.select(id);

        fx.send(Event::PointerDown {
            position: Point::new(100.0, 100.0),
        });
        // Many tiny moves ending at the same place as one large move
        for i in 1..=50 {
            fx.send(Event::PointerMove {
                position: Point::new(100.0 + i as f64, 100.0 + i as f64),
            });
        }
        fx.send(Event::PointerUp {
            position: Point::new(150.0, 150.0),
        });

        let object = fx.state.object(id).unwrap();
        assert_eq!(object.bounds, Rect::new(0.0, 0.0, 150.0, 150.0));
    }

    #[test]
    fn test_rotation_writes_transform() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        fx.state.select(id);

        // The rotation handle sits above the top edge
        fx.send(Event::PointerDown {
            position: Point::new(50.0, -ROTATE_HANDLE_OFFSET),
        });
        assert_eq!(fx.interaction.phase(), Phase::Transforming);

        // Drag to the right of the center: pointer at 0° from center,
        // rotation = 0 + PI/2
        fx.send(Event::PointerMove {
            position: Point::new(150.0, 50.0),
        });
        fx.send(Event::PointerUp {
            position: Point::new(150.0, 50.0),
        });

        let object = fx.state.object(id).unwrap();
        assert!((object.transform.rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_text_tool_enters_edit_on_pointer_down() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Text);

        fx.send(Event::PointerDown {
            position: Point::new(40.0, 40.0),
        });
        assert_eq!(fx.interaction.phase(), Phase::EditingText);
        assert_eq!(fx.state.len(), 1);
        assert!(fx.text.is_editing());
        // The transient marker was consumed
        assert!(!fx.state.objects()[0].wants_text_edit);
    }

    #[test]
    fn test_typed_text_applied_on_escape() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Text);
        fx.send(Event::PointerDown {
            position: Point::new(40.0, 40.0),
        });

        for c in "Hi".chars() {
            fx.send(Event::KeyDown {
                key: Key::Character(c),
                modifiers: Modifiers::default(),
            });
        }
        fx.send(Event::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::default(),
        });

        assert_eq!(fx.interaction.phase(), Phase::Idle);
        assert!(!fx.text.is_editing());
        let object = &fx.state.objects()[0];
        assert_eq!(object.text.as_deref(), Some("Hi"));
        // Bounds re-derive from the measured text
        let expected = text_metrics::measure("Hi", &object.options.font);
        assert!((object.bounds.width() - expected.width).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_removed_on_finish() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Text);
        fx.send(Event::PointerDown {
            position: Point::new(40.0, 40.0),
        });
        assert_eq!(fx.state.len(), 1);

        fx.send(Event::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::default(),
        });
        assert_eq!(fx.state.len(), 0);
    }

    #[test]
    fn test_pointer_down_outside_finishes_edit() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Text);
        fx.send(Event::PointerDown {
            position: Point::new(40.0, 40.0),
        });
        for c in "note".chars() {
            fx.send(Event::KeyDown {
                key: Key::Character(c),
                modifiers: Modifiers::default(),
            });
        }

        fx.tools.set_mode(ObjectKind::Select);
        fx.send(Event::PointerDown {
            position: Point::new(500.0, 500.0),
        });
        assert!(!fx.text.is_editing());
        assert_eq!(fx.state.objects()[0].text.as_deref(), Some("note"));
    }

    #[test]
    fn test_double_click_on_empty_creates_text() {
        let mut fx = Fixture::new();
        fx.send(Event::DoubleClick {
            position: Point::new(80.0, 80.0),
        });
        assert_eq!(fx.interaction.phase(), Phase::EditingText);
        assert_eq!(fx.state.len(), 1);
        assert_eq!(fx.state.objects()[0].kind, ObjectKind::Text);
    }

    #[test]
    fn test_double_click_on_text_reenters_edit() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Text);
        fx.send(Event::PointerDown {
            position: Point::new(40.0, 40.0),
        });
        fx.send(Event::KeyDown {
            key: Key::Character('a'),
            modifiers: Modifiers::default(),
        });
        fx.send(Event::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::default(),
        });
        fx.tools.set_mode(ObjectKind::Select);

        let inside = fx.state.objects()[0].bounds.center();
        fx.send(Event::DoubleClick { position: inside });
        assert_eq!(fx.interaction.phase(), Phase::EditingText);
        assert_eq!(fx.text.buffer(), Some("a"));
    }

    #[test]
    fn test_single_click_on_text_drags_not_edits() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Text);
        fx.send(Event::PointerDown {
            position: Point::new(40.0, 40.0),
        });
        fx.send(Event::KeyDown {
            key: Key::Character('a'),
            modifiers: Modifiers::default(),
        });
        fx.send(Event::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::default(),
        });
        fx.tools.set_mode(ObjectKind::Select);

        let inside = fx.state.objects()[0].bounds.center();
        fx.send(Event::PointerDown { position: inside });
        assert_eq!(fx.interaction.phase(), Phase::Dragging);
        assert!(!fx.text.is_editing());
    }

    #[test]
    fn test_escape_cancels_drag_restoring_original() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(100.0, 100.0));

        fx.send(Event::PointerDown {
            position: Point::new(50.0, 50.0),
        });
        fx.send(Event::PointerMove {
            position: Point::new(90.0, 90.0),
        });
        fx.send(Event::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::default(),
        });

        assert_eq!(fx.interaction.phase(), Phase::Idle);
        assert_eq!(
            fx.state.object(id).unwrap().bounds,
            Rect::new(0.0, 0.0, 100.0, 100.0)
        );
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        fx.state.select(id);

        fx.send(Event::KeyDown {
            key: Key::Delete,
            modifiers: Modifiers::default(),
        });
        assert!(fx.state.is_empty());
    }

    #[test]
    fn test_touch_events_draw_like_pointer() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Line);

        fx.send(Event::TouchStart {
            position: Point::new(0.0, 0.0),
        });
        fx.send(Event::TouchMove {
            position: Point::new(60.0, 0.0),
        });
        fx.send(Event::TouchEnd {
            position: Point::new(60.0, 0.0),
        });
        assert_eq!(fx.state.len(), 1);
        assert_eq!(fx.state.objects()[0].kind, ObjectKind::Line);
    }

    #[test]
    fn test_ctrl_shortcuts() {
        let mut fx = Fixture::new();
        let id = fx.draw_rect(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        fx.state.select(id);
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };

        fx.send(Event::KeyDown {
            key: Key::Character('c'),
            modifiers: ctrl,
        });
        fx.send(Event::KeyDown {
            key: Key::Character('v'),
            modifiers: ctrl,
        });
        assert_eq!(fx.state.len(), 2);

        fx.send(Event::KeyDown {
            key: Key::Character('z'),
            modifiers: ctrl,
        });
        assert_eq!(fx.state.len(), 1);
    }

    #[test]
    fn test_eraser_commits_polyline() {
        let mut fx = Fixture::new();
        fx.tools.set_mode(ObjectKind::Eraser);

        fx.send(Event::PointerDown {
            position: Point::new(0.0, 0.0),
        });
        fx.send(Event::PointerMove {
            position: Point::new(30.0, 30.0),
        });
        fx.send(Event::PointerUp {
            position: Point::new(60.0, 30.0),
        });

        assert_eq!(fx.state.len(), 1);
        let object = &fx.state.objects()[0];
        assert_eq!(object.kind, ObjectKind::Eraser);
        assert!(object.points.len() >= 2);
    }
}
