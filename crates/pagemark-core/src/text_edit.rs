//! Text editing state: the transient in-place edit buffer and cursor.

use crate::object::{DrawingObject, ObjectId};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Caret blink half-period.
pub const CARET_BLINK: Duration = Duration::from_millis(500);

/// An in-progress edit of one text object.
#[derive(Debug, Clone)]
struct EditSession {
    object_id: ObjectId,
    buffer: String,
    /// Character offset, clamped to `[0, buffer chars]`.
    cursor: usize,
}

/// Two-state machine: not editing / editing. While editing it owns a
/// mutable char buffer and cursor; the object's text is only written back
/// by `finish_editing`.
#[derive(Debug, Clone, Default)]
pub struct TextEditingState {
    session: Option<EditSession>,
    /// Blink clock; `None` while not editing so no loop leaks.
    blink_start: Option<Instant>,
    caret_visible: bool,
}

impl TextEditingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// The object being edited, if any.
    pub fn editing_id(&self) -> Option<ObjectId> {
        self.session.as_ref().map(|s| s.object_id)
    }

    pub fn buffer(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.buffer.as_str())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.cursor)
    }

    /// Begin editing: seed the buffer from the object's current text and
    /// place the cursor at the end.
    pub fn start_editing(&mut self, object: &DrawingObject) {
        let buffer = object.text.clone().unwrap_or_default();
        let cursor = buffer.chars().count();
        self.session = Some(EditSession {
            object_id: object.id(),
            buffer,
            cursor,
        });
        self.cursor_reset();
    }

    /// Complete the edit, returning the target object and final buffer.
    pub fn finish_editing(&mut self) -> Option<(ObjectId, String)> {
        self.disable_blink();
        self.session
            .take()
            .map(|session| (session.object_id, session.buffer))
    }

    /// Discard the edit without returning the buffer.
    pub fn cancel_editing(&mut self) -> Option<ObjectId> {
        self.disable_blink();
        self.session.take().map(|session| session.object_id)
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        if let Some(session) = &mut self.session {
            let byte = byte_offset(&session.buffer, session.cursor);
            session.buffer.insert(byte, c);
            session.cursor += 1;
        }
        self.cursor_reset();
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_backward(&mut self) {
        if let Some(session) = &mut self.session {
            if session.cursor > 0 {
                let byte = byte_offset(&session.buffer, session.cursor - 1);
                session.buffer.remove(byte);
                session.cursor -= 1;
            }
        }
        self.cursor_reset();
    }

    /// Delete the character after the cursor (delete key).
    pub fn delete_forward(&mut self) {
        if let Some(session) = &mut self.session {
            if session.cursor < session.buffer.chars().count() {
                let byte = byte_offset(&session.buffer, session.cursor);
                session.buffer.remove(byte);
            }
        }
        self.cursor_reset();
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(session) = &mut self.session {
            session.cursor = session.cursor.saturating_sub(1);
        }
        self.cursor_reset();
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(session) = &mut self.session {
            session.cursor = (session.cursor + 1).min(session.buffer.chars().count());
        }
        self.cursor_reset();
    }

    /// Move up one newline-delimited line, preserving the column when the
    /// target line is long enough.
    pub fn move_cursor_up(&mut self) {
        if let Some(session) = &mut self.session {
            let (line, column) = line_and_column(&session.buffer, session.cursor);
            if line > 0 {
                session.cursor = cursor_at(&session.buffer, line - 1, column);
            }
        }
        self.cursor_reset();
    }

    /// Move down one line, preserving the column when possible.
    pub fn move_cursor_down(&mut self) {
        if let Some(session) = &mut self.session {
            let lines = line_lengths(&session.buffer);
            let (line, column) = line_and_column(&session.buffer, session.cursor);
            if line + 1 < lines.len() {
                session.cursor = cursor_at(&session.buffer, line + 1, column);
            }
        }
        self.cursor_reset();
    }

    /// Move to the start of the current line.
    pub fn move_cursor_to_line_start(&mut self) {
        if let Some(session) = &mut self.session {
            let (line, _) = line_and_column(&session.buffer, session.cursor);
            session.cursor = cursor_at(&session.buffer, line, 0);
        }
        self.cursor_reset();
    }

    /// Move to the end of the current line.
    pub fn move_cursor_to_line_end(&mut self) {
        if let Some(session) = &mut self.session {
            let lines = line_lengths(&session.buffer);
            let (line, _) = line_and_column(&session.buffer, session.cursor);
            session.cursor = cursor_at(&session.buffer, line, lines[line]);
        }
        self.cursor_reset();
    }

    /// Reset the caret to visible and restart the blink clock.
    pub fn cursor_reset(&mut self) {
        if self.session.is_some() {
            self.blink_start = Some(Instant::now());
            self.caret_visible = true;
        }
    }

    /// Stop the blink clock.
    pub fn disable_blink(&mut self) {
        self.blink_start = None;
        self.caret_visible = false;
    }

    /// Advance the blink state. Call once per animation frame while editing;
    /// returns true when caret visibility changed and a repaint is needed.
    pub fn cursor_blink(&mut self) -> bool {
        let Some(start) = self.blink_start else {
            return false;
        };
        let elapsed = Instant::now().duration_since(start);
        let visible = (elapsed.as_millis() / CARET_BLINK.as_millis()) % 2 == 0;
        let changed = visible != self.caret_visible;
        self.caret_visible = visible;
        changed
    }

    pub fn is_caret_visible(&self) -> bool {
        self.caret_visible
    }
}

/// Byte offset of the `cursor`-th character.
fn byte_offset(buffer: &str, cursor: usize) -> usize {
    buffer
        .char_indices()
        .nth(cursor)
        .map(|(byte, _)| byte)
        .unwrap_or(buffer.len())
}

/// Character length of each newline-delimited line.
fn line_lengths(buffer: &str) -> Vec<usize> {
    buffer
        .split('\n')
        .map(|line| line.chars().count())
        .collect()
}

/// Line index and column of a character cursor.
fn line_and_column(buffer: &str, cursor: usize) -> (usize, usize) {
    let mut remaining = cursor;
    for (line, length) in line_lengths(buffer).iter().enumerate() {
        if remaining <= *length {
            return (line, remaining);
        }
        remaining -= length + 1;
    }
    (0, 0)
}

/// Character cursor at a line/column position, clamping the column to the
/// line length.
fn cursor_at(buffer: &str, line: usize, column: usize) -> usize {
    let lengths = line_lengths(buffer);
    let mut cursor = 0;
    for length in lengths.iter().take(line) {
        cursor += length + 1;
    }
    cursor + column.min(lengths.get(line).copied().unwrap_or(0))
}
