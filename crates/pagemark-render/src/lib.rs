//! Renderer and surface backends for the Pagemark annotation engine.

pub mod damage;
pub mod renderer;
pub mod surface;

pub use damage::{Damage, DamageTracker};
pub use renderer::{paint_object, selection_color, RenderContext, SceneRenderer, TextOverlay};
pub use surface::{
    png_data_url, DisplayItem, PixmapSurface, RecordingSurface, Surface, SurfaceError,
};
