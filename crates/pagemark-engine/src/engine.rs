//! The drawing engine: composition root binding state, tools, interaction
//! and rendering behind the command surface the host consumes.

use crate::command::{Command, CommandResponse};
use crate::config::EngineConfig;
use crate::throttle::FrameThrottle;
use pagemark_core::{
    DrawOptions, DrawingState, Effects, Event, Interaction, ObjectKind, OptionsPatch, Phase,
    TextEditingState, ToolManager, Workspace,
};
use pagemark_render::{
    png_data_url, PixmapSurface, RenderContext, SceneRenderer, Surface, SurfaceError, TextOverlay,
};
use serde_json::json;
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("background capture failed: {0}")]
    Background(String),
}

/// Host-side screenshot capability for "with background" capture. The
/// engine never takes page pixels itself.
pub trait BackgroundSource {
    /// Straight-alpha RGBA pixels of the page beneath the overlay,
    /// with their dimensions.
    fn capture(&mut self) -> Result<(Vec<u8>, u32, u32), String>;
}

/// The annotation engine.
pub struct Engine {
    active: bool,
    state: DrawingState,
    text: TextEditingState,
    tools: ToolManager,
    interaction: Interaction,
    renderer: SceneRenderer,
    /// Committed objects; repainted only inside damage.
    static_surface: PixmapSurface,
    /// Per-frame chrome: preview, selection, caret.
    overlay_surface: PixmapSurface,
    /// Style applied to newly created objects.
    options: DrawOptions,
    redraw_throttle: FrameThrottle,
    move_sampler: FrameThrottle,
    needs_redraw: bool,
    background: Option<Box<dyn BackgroundSource>>,
}

impl Engine {
    /// Construct an engine against a viewport-sized surface. Surface
    /// allocation failure is fatal: there is nothing to draw on.
    pub fn new(width: u32, height: u32, config: EngineConfig) -> Result<Self, EngineError> {
        let static_surface = PixmapSurface::new(width, height)?;
        let overlay_surface = PixmapSurface::new(width, height)?;
        log::info!("annotation engine created ({width}x{height})");

        Ok(Self {
            active: true,
            state: DrawingState::new(),
            text: TextEditingState::new(),
            tools: ToolManager::new(),
            interaction: Interaction::new(),
            renderer: SceneRenderer::new(),
            static_surface,
            overlay_surface,
            options: DrawOptions::default(),
            redraw_throttle: FrameThrottle::from_millis(config.redraw_interval_ms),
            move_sampler: FrameThrottle::from_millis(config.pointer_sample_interval_ms),
            needs_redraw: true,
            background: None,
        })
    }

    /// Install the host's screenshot capability.
    pub fn set_background_source(&mut self, source: Box<dyn BackgroundSource>) {
        self.background = Some(source);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn mode(&self) -> ObjectKind {
        self.tools.mode()
    }

    pub fn options(&self) -> &DrawOptions {
        &self.options
    }

    pub fn static_surface(&self) -> &PixmapSurface {
        &self.static_surface
    }

    pub fn overlay_surface(&self) -> &PixmapSurface {
        &self.overlay_surface
    }

    /// Activate or deactivate the whole engine. Deactivation closes any
    /// open gesture or text edit so nothing stays half-open.
    pub fn toggle(&mut self) -> bool {
        if self.active {
            let effects = {
                let mut ws = Workspace {
                    state: &mut self.state,
                    text: &mut self.text,
                    tools: &self.tools,
                    options: &self.options,
                };
                self.interaction.cancel(&mut ws)
            };
            self.apply_effects(effects);
            self.active = false;
            log::info!("annotation engine deactivated");
        } else {
            self.active = true;
            self.renderer.mark_all_dirty();
            self.needs_redraw = true;
            log::info!("annotation engine activated");
        }
        self.active
    }

    /// Switch the drawing mode, closing any in-flight gesture first.
    pub fn set_mode(&mut self, mode: ObjectKind) {
        if self.interaction.phase() != Phase::Idle {
            let effects = {
                let mut ws = Workspace {
                    state: &mut self.state,
                    text: &mut self.text,
                    tools: &self.tools,
                    options: &self.options,
                };
                self.interaction.cancel(&mut ws)
            };
            self.apply_effects(effects);
        }
        if mode != ObjectKind::Select && self.state.selected_id().is_some() {
            self.state.clear_selection();
            self.needs_redraw = true;
        }
        self.tools.set_mode(mode);
        log::debug!("mode set to {mode:?}");
    }

    /// Apply an options patch to the current style, and to the selected
    /// object when there is one (with its own undo snapshot and bounds
    /// recomputation).
    pub fn set_options(&mut self, patch: &OptionsPatch) {
        patch.apply(&mut self.options);

        let Some(id) = self.state.selected_id() else {
            return;
        };
        self.state.push_undo();
        let Some(object) = self.state.object_mut(id) else {
            return;
        };
        let old_bounds = object.damage_bounds();
        patch.apply(&mut object.options);
        if let Some(tool) = self.tools.tool(object.kind) {
            object.bounds = tool.bounds(object);
        }
        let new_bounds = object.damage_bounds();
        self.state.mark_changed();
        self.renderer.mark_dirty(old_bounds);
        self.renderer.mark_dirty(new_bounds);
        self.needs_redraw = true;
    }

    /// Remove all objects. Returns whether anything changed.
    pub fn clear(&mut self) -> bool {
        let changed = self.state.clear_all();
        if changed {
            self.renderer.mark_all_dirty();
            self.needs_redraw = true;
        }
        changed
    }

    /// Delete the selected object. No-op without a selection.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.state.selected_id() else {
            return false;
        };
        let damage = self.state.object(id).map(|o| o.damage_bounds());
        if self.state.remove_object(id).is_some() {
            if let Some(damage) = damage {
                self.renderer.mark_dirty(damage);
            }
            self.needs_redraw = true;
            true
        } else {
            false
        }
    }

    /// Duplicate the selected object. No-op without a selection.
    pub fn duplicate_selected(&mut self) -> bool {
        match self.state.duplicate_selected() {
            Some(id) => {
                if let Some(object) = self.state.object(id) {
                    self.renderer.mark_dirty(object.damage_bounds());
                }
                self.needs_redraw = true;
                true
            }
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.state.undo();
        if changed {
            self.renderer.mark_all_dirty();
            self.needs_redraw = true;
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.state.redo();
        if changed {
            self.renderer.mark_all_dirty();
            self.needs_redraw = true;
        }
        changed
    }

    /// Resize both layers to the new viewport, preserving pixel content.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.static_surface.resize(width, height)?;
        self.overlay_surface.resize(width, height)?;
        self.renderer.mark_all_dirty();
        self.needs_redraw = true;
        Ok(())
    }

    /// Feed one input event through the interaction machine. Returns
    /// whether a repaint was scheduled. Events are ignored while inactive;
    /// pointer moves are sampled by the move throttle.
    pub fn handle_event(&mut self, event: Event) -> bool {
        if !self.active {
            return false;
        }
        if matches!(
            event,
            Event::PointerMove { .. } | Event::TouchMove { .. }
        ) && !self.move_sampler.ready()
        {
            return false;
        }

        let effects = {
            let mut ws = Workspace {
                state: &mut self.state,
                text: &mut self.text,
                tools: &self.tools,
                options: &self.options,
            };
            self.interaction.handle_event(event, &mut ws)
        };
        self.apply_effects(effects)
    }

    fn apply_effects(&mut self, effects: Effects) -> bool {
        if effects.is_none() {
            return false;
        }
        if effects.dirty_all {
            self.renderer.mark_all_dirty();
        }
        for rect in &effects.dirty {
            self.renderer.mark_dirty(*rect);
        }
        self.needs_redraw = true;
        true
    }

    /// Animation-frame tick: advances the caret blink and repaints when
    /// needed, subject to the redraw throttle. Returns whether a frame was
    /// painted.
    pub fn on_frame(&mut self) -> bool {
        if !self.active {
            return false;
        }
        if self.text.is_editing() && self.text.cursor_blink() {
            self.needs_redraw = true;
        }
        if self.needs_redraw && self.redraw_throttle.ready() {
            self.render_frame();
            self.needs_redraw = false;
            return true;
        }
        false
    }

    fn render_frame(&mut self) {
        let editing_id = self.text.editing_id();
        let active_id = editing_id.or(self.interaction.active_object(&self.state));

        let editing = match (editing_id, self.text.buffer(), self.text.cursor()) {
            (Some(id), Some(buffer), Some(cursor)) => {
                self.state.object(id).map(|object| TextOverlay {
                    object,
                    buffer,
                    cursor,
                    caret_visible: self.text.is_caret_visible(),
                })
            }
            _ => None,
        };

        let ctx = RenderContext {
            objects: self.state.objects(),
            tools: &self.tools,
            selected: if editing.is_some() {
                None
            } else {
                self.state.selected()
            },
            preview: self.interaction.draft(),
            active_id,
            editing,
        };
        self.renderer.render(
            &ctx,
            self.state.revision(),
            &mut self.static_surface,
            &mut self.overlay_surface,
        );
    }

    /// Export the committed composition as a PNG data URL. Editing chrome
    /// (selection box, handles, preview, caret) is never exported. With
    /// `include_background`, the host-captured page pixels are composited
    /// beneath the overlay.
    pub fn capture(&mut self, include_background: bool) -> Result<String, EngineError> {
        // Full repaint of committed content only
        self.renderer.mark_all_dirty();
        let ctx = RenderContext {
            objects: self.state.objects(),
            tools: &self.tools,
            selected: None,
            preview: None,
            active_id: None,
            editing: None,
        };
        self.renderer
            .render_static(&ctx, self.state.revision(), &mut self.static_surface);
        // Interactive layering may exclude a gesture-held object; force the
        // next frame to rebuild the static layer
        self.renderer.mark_all_dirty();
        self.needs_redraw = true;

        let png = if include_background {
            let source = self
                .background
                .as_mut()
                .ok_or_else(|| EngineError::Background("no background source".to_string()))?;
            let (rgba, width, height) = source.capture().map_err(EngineError::Background)?;
            let combined = self.static_surface.over_background(&rgba, width, height)?;
            combined.export_png()?
        } else {
            self.static_surface.export_png()?
        };
        Ok(png_data_url(&png))
    }

    /// Same bytes as [`Engine::capture`]; the host writes the file.
    pub fn download(&mut self, include_background: bool) -> Result<String, EngineError> {
        self.capture(include_background)
    }

    /// Execute a named command with a JSON payload. Never panics: unknown
    /// commands and failures come back as structured responses.
    pub fn execute(&mut self, name: &str, payload: &serde_json::Value) -> CommandResponse {
        match Command::parse(name, payload) {
            Ok(command) => self.run(command),
            Err(error) => CommandResponse::error(error.to_string()),
        }
    }

    /// Execute a parsed command.
    pub fn run(&mut self, command: Command) -> CommandResponse {
        match command {
            Command::Toggle => CommandResponse::ok_with(json!({"active": self.toggle()})),
            Command::SetMode(mode) => {
                self.set_mode(mode);
                CommandResponse::ok()
            }
            Command::SetOptions(patch) => {
                self.set_options(&patch);
                CommandResponse::ok()
            }
            Command::Clear => CommandResponse::ok_with(json!({"changed": self.clear()})),
            Command::DeleteSelected => {
                CommandResponse::ok_with(json!({"deleted": self.delete_selected()}))
            }
            Command::DuplicateSelected => {
                CommandResponse::ok_with(json!({"duplicated": self.duplicate_selected()}))
            }
            Command::Undo => CommandResponse::ok_with(json!({"changed": self.undo()})),
            Command::Redo => CommandResponse::ok_with(json!({"changed": self.redo()})),
            Command::Capture { include_background } => {
                match self.capture(include_background) {
                    Ok(url) => CommandResponse::ok_with(json!({"image": url})),
                    Err(error) => {
                        log::warn!("capture failed: {error}");
                        CommandResponse::error(error.to_string())
                    }
                }
            }
            Command::Download { include_background } => {
                match self.download(include_background) {
                    Ok(url) => CommandResponse::ok_with(json!({"image": url})),
                    Err(error) => {
                        log::warn!("download failed: {error}");
                        CommandResponse::error(error.to_string())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use pagemark_core::{Key, Modifiers};

    fn engine() -> Engine {
        Engine::new(800, 600, EngineConfig::unthrottled()).unwrap()
    }

    fn draw_rect(engine: &mut Engine, from: Point, to: Point) {
        engine.set_mode(ObjectKind::Rectangle);
        engine.handle_event(Event::PointerDown { position: from });
        engine.handle_event(Event::PointerMove { position: to });
        engine.handle_event(Event::PointerUp { position: to });
        engine.set_mode(ObjectKind::Select);
    }

    struct SolidBackground;

    impl BackgroundSource for SolidBackground {
        fn capture(&mut self) -> Result<(Vec<u8>, u32, u32), String> {
            Ok((vec![255u8; 800 * 600 * 4], 800, 600))
        }
    }

    #[test]
    fn test_zero_viewport_is_fatal() {
        assert!(Engine::new(0, 0, EngineConfig::default()).is_err());
    }

    #[test]
    fn test_toggle_lifecycle() {
        let mut engine = engine();
        assert!(engine.is_active());
        assert!(!engine.toggle());

        // Inactive engines ignore input
        engine.set_mode(ObjectKind::Rectangle);
        assert!(!engine.handle_event(Event::PointerDown {
            position: Point::new(10.0, 10.0),
        }));
        assert_eq!(engine.state().len(), 0);

        assert!(engine.toggle());
    }

    #[test]
    fn test_draw_and_frame() {
        let mut engine = engine();
        draw_rect(&mut engine, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        assert_eq!(engine.state().len(), 1);
        assert!(engine.on_frame());
        // Nothing pending afterwards
        assert!(!engine.on_frame());
    }

    #[test]
    fn test_unknown_command_is_structured_failure() {
        let mut engine = engine();
        let response = engine.execute("fillBucket", &json!({}));
        assert!(!response.is_ok());
    }

    #[test]
    fn test_command_round_trip() {
        let mut engine = engine();
        assert!(engine.execute("setMode", &json!({"mode": "rectangle"})).is_ok());
        assert_eq!(engine.mode(), ObjectKind::Rectangle);

        engine.handle_event(Event::PointerDown {
            position: Point::new(0.0, 0.0),
        });
        engine.handle_event(Event::PointerUp {
            position: Point::new(50.0, 50.0),
        });
        assert_eq!(engine.state().len(), 1);

        assert!(engine.execute("undo", &json!({})).is_ok());
        assert_eq!(engine.state().len(), 0);
        assert!(engine.execute("redo", &json!({})).is_ok());
        assert_eq!(engine.state().len(), 1);

        assert!(engine.execute("clear", &json!({})).is_ok());
        assert_eq!(engine.state().len(), 0);
    }

    #[test]
    fn test_undo_past_end_reports_no_change() {
        let mut engine = engine();
        assert!(!engine.undo());
        assert!(!engine.redo());
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let mut engine = engine();
        assert!(!engine.delete_selected());
        assert!(!engine.duplicate_selected());
    }

    #[test]
    fn test_capture_returns_data_url() {
        let mut engine = engine();
        draw_rect(&mut engine, Point::new(10.0, 10.0), Point::new(110.0, 60.0));

        let url = engine.capture(false).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_capture_with_background_requires_source() {
        let mut engine = engine();
        assert!(engine.capture(true).is_err());

        engine.set_background_source(Box::new(SolidBackground));
        let url = engine.capture(true).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_set_options_updates_selected_object() {
        let mut engine = engine();
        draw_rect(&mut engine, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        engine.handle_event(Event::PointerDown {
            position: Point::new(50.0, 50.0),
        });
        engine.handle_event(Event::PointerUp {
            position: Point::new(50.0, 50.0),
        });
        assert!(engine.state().selected_id().is_some());

        let patch = OptionsPatch {
            stroke_width: Some(9.0),
            ..Default::default()
        };
        engine.set_options(&patch);

        let object = engine.state().selected().unwrap();
        assert!((object.options.stroke_width - 9.0).abs() < f64::EPSILON);
        // The style edit is undoable
        assert!(engine.undo());
    }

    #[test]
    fn test_set_options_without_selection_touches_future_objects_only() {
        let mut engine = engine();
        draw_rect(&mut engine, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        let before = engine.state().objects()[0].options.stroke_width;

        let patch = OptionsPatch {
            stroke_width: Some(7.0),
            ..Default::default()
        };
        engine.set_options(&patch);

        // Existing object untouched
        let after = engine.state().objects()[0].options.stroke_width;
        assert!((before - after).abs() < f64::EPSILON);

        // New objects pick up the style
        draw_rect(&mut engine, Point::new(60.0, 60.0), Point::new(120.0, 120.0));
        assert!(
            (engine.state().objects()[1].options.stroke_width - 7.0).abs() < f64::EPSILON
        );
    }

    #[test]
    fn test_resize_marks_everything_dirty() {
        let mut engine = engine();
        draw_rect(&mut engine, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        engine.on_frame();

        engine.resize(1024, 768).unwrap();
        assert_eq!(engine.static_surface().width(), 1024);
        assert!(engine.on_frame());
    }

    #[test]
    fn test_text_flow_through_commands_and_events() {
        let mut engine = engine();
        assert!(engine.execute("setMode", &json!({"mode": "text"})).is_ok());
        engine.handle_event(Event::PointerDown {
            position: Point::new(40.0, 40.0),
        });
        for c in "Hi".chars() {
            engine.handle_event(Event::KeyDown {
                key: Key::Character(c),
                modifiers: Modifiers::default(),
            });
        }
        engine.handle_event(Event::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::default(),
        });

        assert_eq!(engine.state().len(), 1);
        assert_eq!(engine.state().objects()[0].text.as_deref(), Some("Hi"));
    }
}
