//! Drawing state: the canonical object list, selection, clipboard and
//! undo/redo history.

use crate::manager::ToolManager;
use crate::object::{DrawingObject, ObjectId};
use crate::tools::hit_margin;
use kurbo::{Point, Vec2};

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Offset applied to pasted and duplicated objects so copies never land
/// exactly on the original.
pub const PASTE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// A full deep copy of the object list.
type Snapshot = Vec<DrawingObject>;

/// Linear undo/redo history over full object-list snapshots.
///
/// A snapshot of the pre-mutation state is recorded before every structural
/// change. Any new push truncates the redo range; exceeding the cap evicts
/// the oldest snapshot.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pre-mutation snapshot.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);

        // New changes invalidate the redone-away future
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Step back. Returns the snapshot to restore, storing `current` for redo.
    pub fn undo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(snapshot)
    }

    /// Step forward. Returns the snapshot to restore, storing `current` for undo.
    pub fn redo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable snapshots.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }
}

/// Owns the object list and everything that refers into it.
#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    objects: Vec<DrawingObject>,
    /// Weak reference by id: removing the object clears the selection.
    selected: Option<ObjectId>,
    /// At most one deep-cloned object.
    clipboard: Option<DrawingObject>,
    history: History,
    /// Bumped whenever committed content changes; the renderer repaints its
    /// static layer when this moves.
    revision: u64,
}

impl DrawingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects in z-order (back to front).
    pub fn objects(&self) -> &[DrawingObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&DrawingObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut DrawingObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mark committed content as changed without a structural mutation
    /// (style edits, gesture commits).
    pub fn mark_changed(&mut self) {
        self.revision += 1;
    }

    /// Record the current state for undo (call before making changes).
    pub fn push_undo(&mut self) {
        self.history.push(self.objects.clone());
    }

    /// Commit a finished gesture: records the pre-gesture snapshot captured
    /// at gesture start as the single history entry for the whole drag.
    pub fn commit_gesture(&mut self, pre_gesture: Vec<DrawingObject>) {
        self.history.push(pre_gesture);
        self.mark_changed();
    }

    /// Take a deep copy of the object list (for gesture-start snapshots).
    pub fn snapshot(&self) -> Vec<DrawingObject> {
        self.objects.clone()
    }

    /// Add an object to the document.
    pub fn add_object(&mut self, object: DrawingObject) -> ObjectId {
        self.push_undo();
        let id = object.id();
        self.objects.push(object);
        self.mark_changed();
        id
    }

    /// Remove an object. Clears the selection if it referenced the object.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<DrawingObject> {
        let index = self.objects.iter().position(|o| o.id() == id)?;
        self.push_undo();
        let removed = self.objects.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.mark_changed();
        Some(removed)
    }

    /// Replace the whole object list.
    pub fn replace_objects(&mut self, objects: Vec<DrawingObject>) {
        self.push_undo();
        self.objects = objects;
        self.selected = None;
        self.mark_changed();
    }

    /// Remove all objects. Returns false when there was nothing to clear.
    pub fn clear_all(&mut self) -> bool {
        if self.objects.is_empty() {
            return false;
        }
        self.push_undo();
        self.objects.clear();
        self.selected = None;
        self.mark_changed();
        true
    }

    /// Undo the last change. Selection identity cannot be carried across a
    /// structural replacement, so it is always cleared.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.objects) {
            Some(snapshot) => {
                self.objects = snapshot;
                self.selected = None;
                self.mark_changed();
                true
            }
            None => {
                log::debug!("undo past the start of history");
                false
            }
        }
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.objects) {
            Some(snapshot) => {
                self.objects = snapshot;
                self.selected = None;
                self.mark_changed();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Select an object by id (no-op if it does not exist).
    pub fn select(&mut self, id: ObjectId) {
        if self.object(id).is_some() {
            self.selected = Some(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&DrawingObject> {
        self.selected.and_then(|id| self.object(id))
    }

    pub fn selected_mut(&mut self) -> Option<&mut DrawingObject> {
        let id = self.selected?;
        self.object_mut(id)
    }

    /// Topmost object at a point, walking front to back.
    pub fn object_at(&self, point: Point, tools: &ToolManager) -> Option<ObjectId> {
        self.objects.iter().rev().find_map(|object| {
            let tool = tools.tool(object.kind)?;
            tool.hit_test(point, object, hit_margin(&object.options))
                .then(|| object.id())
        })
    }

    /// Copy the selected object to the clipboard.
    pub fn copy_selected(&mut self) -> bool {
        match self.selected().cloned() {
            Some(object) => {
                self.clipboard = Some(object);
                true
            }
            None => false,
        }
    }

    /// Paste the clipboard object, offset so it never lands exactly on the
    /// source, with a fresh id. The paste becomes the selection.
    pub fn paste(&mut self) -> Option<ObjectId> {
        let mut object = self.clipboard.clone()?;
        object.regenerate_id();
        object.translate(PASTE_OFFSET);
        let id = self.add_object(object);
        self.selected = Some(id);
        Some(id)
    }

    /// Duplicate the selected object; the duplicate becomes the selection.
    pub fn duplicate_selected(&mut self) -> Option<ObjectId> {
        let mut copy = self.selected().cloned()?;
        copy.regenerate_id();
        copy.translate(PASTE_OFFSET);
        let id = self.add_object(copy);
        self.selected = Some(id);
        Some(id)
    }
}
