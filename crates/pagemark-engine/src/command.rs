//! The normalized command surface.
//!
//! The host UI forwards commands as a name plus a JSON payload; transport
//! (extension messaging, test harness, anything else) is the host's
//! concern. Unknown names and malformed payloads come back as structured
//! failures, never panics.

use pagemark_core::{ObjectKind, OptionsPatch};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Command parse errors.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("bad payload for {command}: {reason}")]
    BadPayload { command: String, reason: String },
}

/// A parsed engine command.
#[derive(Debug, Clone)]
pub enum Command {
    Toggle,
    SetMode(ObjectKind),
    SetOptions(OptionsPatch),
    Clear,
    DeleteSelected,
    DuplicateSelected,
    Undo,
    Redo,
    Capture { include_background: bool },
    Download { include_background: bool },
}

impl Command {
    /// Parse a command envelope.
    pub fn parse(name: &str, payload: &Value) -> Result<Self, CommandError> {
        let bad = |reason: String| CommandError::BadPayload {
            command: name.to_string(),
            reason,
        };

        match name {
            "toggle" => Ok(Command::Toggle),
            "setMode" => {
                let mode = payload
                    .get("mode")
                    .cloned()
                    .ok_or_else(|| bad("missing \"mode\"".to_string()))?;
                let mode: ObjectKind =
                    serde_json::from_value(mode).map_err(|e| bad(e.to_string()))?;
                Ok(Command::SetMode(mode))
            }
            "setOptions" => {
                // Accept both {"options": {...}} and a bare options object
                let options = payload.get("options").unwrap_or(payload).clone();
                let patch: OptionsPatch =
                    serde_json::from_value(options).map_err(|e| bad(e.to_string()))?;
                Ok(Command::SetOptions(patch))
            }
            "clear" => Ok(Command::Clear),
            "deleteSelected" => Ok(Command::DeleteSelected),
            "duplicateSelected" => Ok(Command::DuplicateSelected),
            "undo" => Ok(Command::Undo),
            "redo" => Ok(Command::Redo),
            "capture" => Ok(Command::Capture {
                include_background: include_background(payload),
            }),
            "download" => Ok(Command::Download {
                include_background: include_background(payload),
            }),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn include_background(payload: &Value) -> bool {
    payload
        .get("includeBackground")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Structured response sent back to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CommandResponse {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    Error {
        reason: String,
    },
}

impl CommandResponse {
    pub fn ok() -> Self {
        CommandResponse::Ok { data: None }
    }

    pub fn ok_with(data: Value) -> Self {
        CommandResponse::Ok { data: Some(data) }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        CommandResponse::Error {
            reason: reason.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CommandResponse::Ok { .. })
    }
}
