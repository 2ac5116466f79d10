//! Pagemark Core Library
//!
//! Platform-agnostic object model, tool plugins and interaction logic for
//! the Pagemark in-page annotation engine.

pub mod geometry;
pub mod handles;
pub mod interaction;
pub mod manager;
pub mod object;
pub mod options;
pub mod paint;
pub mod state;
pub mod text_edit;
pub mod text_metrics;
pub mod tools;

pub use handles::{Corner, Edge, HandleKind, TransformHandle};
pub use interaction::{Effects, Event, Interaction, Key, Modifiers, Phase, Workspace};
pub use manager::ToolManager;
pub use object::{DrawingObject, ObjectId, ObjectKind, Transform2d};
pub use options::{DrawOptions, FontFamily, FontSpec, FontWeight, OptionsPatch, Rgba, TextAlign};
pub use paint::{Painter, TextRun};
pub use state::{DrawingState, MAX_UNDO_HISTORY, PASTE_OFFSET};
pub use text_edit::TextEditingState;
pub use tools::{hit_margin, Tool, ToolContext};
