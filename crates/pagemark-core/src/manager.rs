//! Tool manager: the registry mapping modes to their plugins.

use crate::object::ObjectKind;
use crate::tools::{
    ArrowTool, CircleTool, EraserTool, HandDrawnTool, HighlighterTool, LineTool, PenTool,
    RectangleTool, SelectTool, StarTool, TextTool, Tool, TriangleTool,
};
use std::collections::HashMap;
use std::fmt;

/// Registry of tool plugins plus the currently active mode.
///
/// Pure dispatch: no behavior beyond lookup, so the interaction machine and
/// the renderer depend on an abstraction rather than a switch over modes.
pub struct ToolManager {
    tools: HashMap<ObjectKind, Box<dyn Tool>>,
    mode: ObjectKind,
}

impl ToolManager {
    /// Create a manager with every built-in tool registered.
    pub fn new() -> Self {
        let mut tools: HashMap<ObjectKind, Box<dyn Tool>> = HashMap::new();
        for tool in [
            Box::new(SelectTool) as Box<dyn Tool>,
            Box::new(PenTool),
            Box::new(HighlighterTool),
            Box::new(EraserTool),
            Box::new(LineTool),
            Box::new(ArrowTool),
            Box::new(RectangleTool),
            Box::new(CircleTool),
            Box::new(TriangleTool),
            Box::new(StarTool),
            Box::new(HandDrawnTool),
            Box::new(TextTool),
        ] {
            tools.insert(tool.kind(), tool);
        }
        Self {
            tools,
            mode: ObjectKind::default(),
        }
    }

    /// Look up the plugin for a mode.
    pub fn tool(&self, kind: ObjectKind) -> Option<&dyn Tool> {
        self.tools.get(&kind).map(|t| t.as_ref())
    }

    /// The plugin for the active mode.
    pub fn current(&self) -> &dyn Tool {
        self.tool(self.mode)
            .expect("every mode has a registered tool")
    }

    /// The active mode.
    pub fn mode(&self) -> ObjectKind {
        self.mode
    }

    /// Switch the active mode.
    pub fn set_mode(&mut self, mode: ObjectKind) {
        self.mode = mode;
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolManager")
            .field("mode", &self.mode)
            .field("tools", &self.tools.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_registered() {
        let manager = ToolManager::new();
        for &kind in ObjectKind::all() {
            assert!(manager.tool(kind).is_some(), "{kind:?} not registered");
        }
    }

    #[test]
    fn test_mode_switch() {
        let mut manager = ToolManager::new();
        assert_eq!(manager.mode(), ObjectKind::Select);

        manager.set_mode(ObjectKind::Rectangle);
        assert_eq!(manager.mode(), ObjectKind::Rectangle);
        assert_eq!(manager.current().kind(), ObjectKind::Rectangle);
    }

    #[test]
    fn test_drag_requirements() {
        let manager = ToolManager::new();
        assert!(manager.tool(ObjectKind::Rectangle).unwrap().requires_drag());
        assert!(!manager.tool(ObjectKind::Text).unwrap().requires_drag());
    }
}
