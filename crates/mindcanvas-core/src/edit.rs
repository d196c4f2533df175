//! Structural and textual edits.
//!
//! Every edit is a pure function from one [`MindMap`] to the next, so the caller can append the
//! result to history as a snapshot. Rejected edits return an [`EditError`] and leave the input
//! untouched.

use crate::EditError;
use crate::model::{MindMap, Node};
use chrono::{DateTime, Utc};

/// Label used when a node is added with blank text.
pub const DEFAULT_NODE_TEXT: &str = "新节点";

/// Result of deleting a subtree.
#[derive(Debug, Clone)]
pub struct Deletion {
    pub map: MindMap,
    /// The deleted node followed by its descendants, in pre-order.
    pub removed: Vec<String>,
}

impl MindMap {
    /// Appends a new default-styled child under `parent_id`.
    pub fn add_child(&self, parent_id: &str, id: &str, text: &str) -> Result<MindMap, EditError> {
        if !self.contains(parent_id) {
            return Err(EditError::UnknownNode(parent_id.to_string()));
        }
        if self.contains(id) {
            return Err(EditError::DuplicateId(id.to_string()));
        }

        let text = if text.trim().is_empty() {
            DEFAULT_NODE_TEXT
        } else {
            text
        };

        let mut next = self.clone();
        let mut node = Node::new(id, text, Some(parent_id.to_string()));
        node.notes = Some(String::new());
        next.insert_node(node);
        if let Some(parent) = next.node_mut(parent_id) {
            parent.children.push(id.to_string());
        }
        Ok(next)
    }

    /// Replaces `text` and `notes` of one node; every other field is kept.
    pub fn edit_node(&self, id: &str, text: &str, notes: &str) -> Result<MindMap, EditError> {
        let mut next = self.clone();
        let node = next
            .node_mut(id)
            .ok_or_else(|| EditError::UnknownNode(id.to_string()))?;
        node.text = text.to_string();
        node.notes = Some(notes.to_string());
        Ok(next)
    }

    /// Removes `id` and all of its descendants. The root is protected.
    pub fn delete_subtree(&self, id: &str) -> Result<Deletion, EditError> {
        if id == self.root_id() {
            return Err(EditError::RootProtected(id.to_string()));
        }
        let parent_id = self
            .get(id)
            .ok_or_else(|| EditError::UnknownNode(id.to_string()))?
            .parent_id
            .clone();

        let removed = self.descendant_closure(id);
        let mut next = self.clone();
        for victim in &removed {
            next.remove_node(victim);
        }
        if let Some(parent) = parent_id.as_deref().and_then(|p| next.node_mut(p)) {
            if let Some(pos) = parent.children.iter().position(|c| c == id) {
                parent.children.remove(pos);
            }
        }
        Ok(Deletion { map: next, removed })
    }

    /// Flips `collapsed` on exactly one node.
    pub fn toggle_collapsed(&self, id: &str) -> Result<MindMap, EditError> {
        let mut next = self.clone();
        let node = next
            .node_mut(id)
            .ok_or_else(|| EditError::UnknownNode(id.to_string()))?;
        node.collapsed = !node.collapsed;
        Ok(next)
    }
}

/// Wall clock used for node ids and export timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Hands out `node_<millis>` ids that strictly increase within a session, so an id is never
/// reused even after the node carrying it is deleted.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last_millis: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, clock: &Clock, taken: impl Fn(&str) -> bool) -> String {
        let mut millis = clock.now().timestamp_millis().max(self.last_millis + 1);
        loop {
            let id = format!("node_{millis}");
            if !taken(&id) {
                self.last_millis = millis;
                return id;
            }
            millis += 1;
        }
    }
}
