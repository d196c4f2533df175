use crate::model::MindMap;

/// Linear undo/redo over full snapshots of the node collection.
///
/// `snapshots[index]` is always the current state. Recording a new snapshot discards the redo
/// tail first.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<MindMap>,
    index: usize,
}

impl History {
    pub fn new(initial: MindMap) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &MindMap {
        &self.snapshots[self.index]
    }

    pub fn record(&mut self, snapshot: MindMap) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index += 1;
    }

    pub fn undo(&mut self) -> Option<&MindMap> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&MindMap> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
