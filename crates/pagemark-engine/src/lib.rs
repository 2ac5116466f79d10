//! Pagemark engine: the composition root and command surface.
//!
//! The host constructs an [`Engine`] against a viewport-sized surface,
//! forwards normalized commands and input events, drives animation frames,
//! and receives raster exports back. Everything else (toolbars, settings
//! persistence, message transport, screenshot capture) stays host-side.

pub mod command;
pub mod config;
pub mod engine;
pub mod throttle;

pub use command::{Command, CommandError, CommandResponse};
pub use config::EngineConfig;
pub use engine::{BackgroundSource, Engine, EngineError};
pub use throttle::FrameThrottle;
