//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for an engine instance. The defaults match the interactive
/// targets the engine is designed around.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Minimum milliseconds between repaints (16 ≈ 60 fps).
    pub redraw_interval_ms: u64,
    /// Minimum milliseconds between sampled pointer moves (8 ≈ 120 fps).
    pub pointer_sample_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            redraw_interval_ms: 16,
            pointer_sample_interval_ms: 8,
        }
    }
}

impl EngineConfig {
    /// A configuration with throttling disabled, for tests and headless use.
    pub fn unthrottled() -> Self {
        Self {
            redraw_interval_ms: 0,
            pointer_sample_interval_ms: 0,
        }
    }
}
