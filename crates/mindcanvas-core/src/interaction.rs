//! Pointer interpretation and the canvas interaction state machine.
//!
//! [`Interaction`] owns the ephemeral selection, hover, pan-drag and dialog state. It never
//! touches the node collection or view transform directly: callers hit-test first, feed the
//! result in, and apply the returned [`Reaction`].

use crate::config::InteractionSettings;
use crate::geom::{Point, Vector};
use crate::model::MindMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Pan,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Auxiliary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Logical surface coordinates.
    pub position: Point,
    pub button: PointerButton,
    pub timestamp_ms: u64,
}

impl PointerEvent {
    pub fn primary(position: Point, timestamp_ms: u64) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionState {
    Idle,
    Panning,
    NodeHover,
    NodeSelected,
    EditingNode,
    ContextMenuOpen,
}

/// Text and notes being edited for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub node_id: String,
    pub text: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub node_id: String,
    pub position: Point,
}

/// An add-node dialog waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDraft {
    pub parent_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Edit,
    AddChild,
    ToggleCollapse,
    Delete,
}

impl MenuAction {
    /// Actions offered for `node_id`: collapse needs children, delete is hidden on the root.
    pub fn available(map: &MindMap, node_id: &str) -> Vec<MenuAction> {
        let Some(node) = map.get(node_id) else {
            return Vec::new();
        };
        let mut out = vec![MenuAction::Edit, MenuAction::AddChild];
        if node.has_children() {
            out.push(MenuAction::ToggleCollapse);
        }
        if node_id != map.root_id() {
            out.push(MenuAction::Delete);
        }
        out
    }
}

/// What the caller should do after feeding a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaction {
    Unchanged,
    /// Interaction state changed; redraw.
    Changed,
    /// Set the pan offset to this value and redraw.
    Pan(Vector),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanDrag {
    pointer_at_down: Point,
    offset_at_down: Vector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LastClick {
    node_id: String,
    at_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    settings: InteractionSettings,
    tool: Tool,
    hovered: Option<String>,
    selected: Option<String>,
    pan: Option<PanDrag>,
    menu: Option<ContextMenu>,
    editing: Option<EditBuffer>,
    add_draft: Option<AddDraft>,
    pending_delete: Option<String>,
    last_click: Option<LastClick>,
}

impl Interaction {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn state(&self) -> InteractionState {
        if self.editing.is_some() {
            InteractionState::EditingNode
        } else if self.menu.is_some() {
            InteractionState::ContextMenuOpen
        } else if self.pan.is_some() {
            InteractionState::Panning
        } else if self.hovered.is_some() {
            InteractionState::NodeHover
        } else if self.selected.is_some() {
            InteractionState::NodeSelected
        } else {
            InteractionState::Idle
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.editing.as_ref()
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        self.editing.as_mut()
    }

    pub fn add_draft(&self) -> Option<&AddDraft> {
        self.add_draft.as_ref()
    }

    pub fn add_draft_mut(&mut self) -> Option<&mut AddDraft> {
        self.add_draft.as_mut()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// True while a modal dialog (editor, add draft, delete confirmation) is open. Canvas pointer
    /// input is ignored meanwhile.
    pub fn is_modal(&self) -> bool {
        self.editing.is_some() || self.add_draft.is_some() || self.pending_delete.is_some()
    }

    /// Switches the tool. Choosing [`Tool::Add`] opens an add draft under the selection, or
    /// under the root when nothing is selected.
    pub fn set_tool(&mut self, tool: Tool, map: &MindMap) {
        self.tool = tool;
        self.pan = None;
        if tool == Tool::Add {
            let parent = self
                .selected
                .as_deref()
                .filter(|id| map.contains(id))
                .unwrap_or(map.root_id())
                .to_string();
            self.open_add_draft(parent);
        }
    }

    pub fn select(&mut self, node_id: Option<String>) {
        self.selected = node_id;
    }

    pub fn pointer_down(
        &mut self,
        event: PointerEvent,
        hit: Option<&str>,
        map: &MindMap,
        offset: Vector,
    ) -> Reaction {
        if event.button != PointerButton::Primary || self.is_modal() {
            return Reaction::Unchanged;
        }
        let closed_menu = self.menu.take().is_some();

        match self.tool {
            Tool::Pan => {
                self.pan = Some(PanDrag {
                    pointer_at_down: event.position,
                    offset_at_down: offset,
                });
                Reaction::Changed
            }
            Tool::Select => {
                self.selected = hit.map(str::to_string);
                let Some(id) = hit else {
                    self.last_click = None;
                    return Reaction::Changed;
                };
                let is_double = self.last_click.as_ref().is_some_and(|last| {
                    last.node_id == id
                        && event.timestamp_ms.saturating_sub(last.at_ms)
                            <= self.settings.double_click_ms
                });
                if is_double {
                    self.last_click = None;
                    self.open_editor(map, id);
                } else {
                    self.last_click = Some(LastClick {
                        node_id: id.to_string(),
                        at_ms: event.timestamp_ms,
                    });
                }
                Reaction::Changed
            }
            Tool::Add if closed_menu => Reaction::Changed,
            Tool::Add => Reaction::Unchanged,
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent, hit: Option<&str>) -> Reaction {
        if let Some(drag) = self.pan {
            return Reaction::Pan(drag.offset_at_down + (event.position - drag.pointer_at_down));
        }
        if self.tool != Tool::Select || self.is_modal() {
            return Reaction::Unchanged;
        }
        if self.hovered.as_deref() == hit {
            return Reaction::Unchanged;
        }
        self.hovered = hit.map(str::to_string);
        Reaction::Changed
    }

    pub fn pointer_up(&mut self) -> Reaction {
        match self.pan.take() {
            Some(_) => Reaction::Changed,
            None => Reaction::Unchanged,
        }
    }

    pub fn pointer_leave(&mut self) -> Reaction {
        let was_panning = self.pan.take().is_some();
        let was_hovering = self.hovered.take().is_some();
        if was_panning || was_hovering {
            Reaction::Changed
        } else {
            Reaction::Unchanged
        }
    }

    /// Secondary-button request at `position`: opens the menu over a node, closes it elsewhere.
    pub fn open_context_menu(&mut self, position: Point, hit: Option<&str>) -> Reaction {
        if self.is_modal() {
            return Reaction::Unchanged;
        }
        let next = hit.map(|id| ContextMenu {
            node_id: id.to_string(),
            position,
        });
        if next == self.menu {
            return Reaction::Unchanged;
        }
        self.menu = next;
        Reaction::Changed
    }

    pub fn close_context_menu(&mut self) -> Option<ContextMenu> {
        self.menu.take()
    }

    /// Loads `node_id`'s text and notes into the edit buffer.
    pub fn open_editor(&mut self, map: &MindMap, node_id: &str) -> bool {
        let Some(node) = map.get(node_id) else {
            return false;
        };
        self.menu = None;
        self.editing = Some(EditBuffer {
            node_id: node.id.clone(),
            text: node.text.clone(),
            notes: node.notes.clone().unwrap_or_default(),
        });
        true
    }

    pub fn take_edit_buffer(&mut self) -> Option<EditBuffer> {
        self.editing.take()
    }

    pub fn open_add_draft(&mut self, parent_id: String) {
        self.menu = None;
        self.add_draft = Some(AddDraft {
            parent_id,
            text: String::new(),
        });
    }

    pub fn take_add_draft(&mut self) -> Option<AddDraft> {
        self.add_draft.take()
    }

    pub fn request_delete(&mut self, node_id: String) {
        self.menu = None;
        self.pending_delete = Some(node_id);
    }

    pub fn take_pending_delete(&mut self) -> Option<String> {
        self.pending_delete.take()
    }

    /// Drops every reference to nodes that no longer exist in `map`.
    pub fn forget_missing(&mut self, map: &MindMap) {
        let prune = |slot: &mut Option<String>| {
            if slot.as_deref().is_some_and(|id| !map.contains(id)) {
                *slot = None;
            }
        };
        prune(&mut self.selected);
        prune(&mut self.hovered);
        prune(&mut self.pending_delete);
        if self.menu.as_ref().is_some_and(|m| !map.contains(&m.node_id)) {
            self.menu = None;
        }
        if self.editing.as_ref().is_some_and(|e| !map.contains(&e.node_id)) {
            self.editing = None;
        }
        if self
            .add_draft
            .as_ref()
            .is_some_and(|d| !map.contains(&d.parent_id))
        {
            self.add_draft = None;
        }
        if self
            .last_click
            .as_ref()
            .is_some_and(|c| !map.contains(&c.node_id))
        {
            self.last_click = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{point, vector};
    use crate::seed::demo_strategy_map;

    fn down(x: f64, y: f64, t: u64) -> PointerEvent {
        PointerEvent::primary(point(x, y), t)
    }

    #[test]
    fn select_then_double_click_opens_editor() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.pointer_down(down(0.0, 0.0, 1_000), Some("perf"), &map, vector(0.0, 0.0));
        assert_eq!(ix.selected(), Some("perf"));
        assert_eq!(ix.state(), InteractionState::NodeSelected);

        ix.pointer_down(down(0.0, 0.0, 1_300), Some("perf"), &map, vector(0.0, 0.0));
        assert_eq!(ix.state(), InteractionState::EditingNode);
        let buffer = ix.edit_buffer().unwrap();
        assert_eq!(buffer.node_id, "perf");
        assert_eq!(buffer.text, "性能测试");
    }

    #[test]
    fn slow_second_click_does_not_edit() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.pointer_down(down(0.0, 0.0, 0), Some("perf"), &map, vector(0.0, 0.0));
        ix.pointer_down(down(0.0, 0.0, 501), Some("perf"), &map, vector(0.0, 0.0));
        assert!(ix.edit_buffer().is_none());
    }

    #[test]
    fn click_on_empty_space_clears_selection() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.select(Some("root".into()));
        ix.pointer_down(down(5.0, 5.0, 0), None, &map, vector(0.0, 0.0));
        assert_eq!(ix.selected(), None);
        assert_eq!(ix.state(), InteractionState::Idle);
    }

    #[test]
    fn pan_drag_tracks_pointer_delta() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.set_tool(Tool::Pan, &map);
        ix.pointer_down(down(10.0, 10.0, 0), None, &map, vector(5.0, -5.0));
        assert_eq!(ix.state(), InteractionState::Panning);
        assert_eq!(
            ix.pointer_move(down(40.0, 0.0, 1), None),
            Reaction::Pan(vector(35.0, -15.0))
        );
        assert_eq!(ix.pointer_up(), Reaction::Changed);
        assert!(!ix.is_panning());
    }

    #[test]
    fn leave_ends_pan_and_clears_hover() {
        let mut ix = Interaction::default();
        ix.pointer_move(down(0.0, 0.0, 0), Some("func"));
        assert_eq!(ix.state(), InteractionState::NodeHover);
        assert_eq!(ix.pointer_leave(), Reaction::Changed);
        assert_eq!(ix.hovered(), None);
        assert_eq!(ix.pointer_leave(), Reaction::Unchanged);
    }

    #[test]
    fn hover_is_tracked_only_with_select_tool() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.set_tool(Tool::Pan, &map);
        assert_eq!(ix.pointer_move(down(0.0, 0.0, 0), Some("func")), Reaction::Unchanged);
        assert_eq!(ix.hovered(), None);
    }

    #[test]
    fn context_menu_opens_on_node_and_closes_elsewhere() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.open_context_menu(point(3.0, 4.0), Some("func"));
        assert_eq!(ix.state(), InteractionState::ContextMenuOpen);
        assert_eq!(ix.context_menu().unwrap().node_id, "func");

        ix.open_context_menu(point(3.0, 4.0), None);
        assert!(ix.context_menu().is_none());

        ix.open_context_menu(point(3.0, 4.0), Some("func"));
        ix.pointer_down(down(0.0, 0.0, 0), None, &map, vector(0.0, 0.0));
        assert!(ix.context_menu().is_none());
    }

    #[test]
    fn secondary_button_down_is_ignored() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        let event = PointerEvent {
            position: point(0.0, 0.0),
            button: PointerButton::Secondary,
            timestamp_ms: 0,
        };
        assert_eq!(
            ix.pointer_down(event, Some("func"), &map, vector(0.0, 0.0)),
            Reaction::Unchanged
        );
        assert_eq!(ix.selected(), None);
    }

    #[test]
    fn menu_actions_follow_node_shape() {
        let map = demo_strategy_map();
        assert_eq!(
            MenuAction::available(&map, "root"),
            [
                MenuAction::Edit,
                MenuAction::AddChild,
                MenuAction::ToggleCollapse
            ]
        );
        assert_eq!(
            MenuAction::available(&map, "ui"),
            [MenuAction::Edit, MenuAction::AddChild, MenuAction::Delete]
        );
        assert!(MenuAction::available(&map, "missing").is_empty());
    }

    #[test]
    fn add_tool_opens_draft_under_selection_or_root() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.set_tool(Tool::Add, &map);
        assert_eq!(ix.add_draft().unwrap().parent_id, "root");
        ix.take_add_draft();

        ix.select(Some("perf".into()));
        ix.set_tool(Tool::Add, &map);
        assert_eq!(ix.add_draft().unwrap().parent_id, "perf");
        assert!(ix.is_modal());
    }

    #[test]
    fn forget_missing_clears_stale_references() {
        let map = demo_strategy_map();
        let mut ix = Interaction::default();
        ix.select(Some("login".into()));
        ix.pointer_move(down(0.0, 0.0, 0), Some("upload"));
        let pruned = map.delete_subtree("func").unwrap().map;
        ix.forget_missing(&pruned);
        assert_eq!(ix.selected(), None);
        assert_eq!(ix.hovered(), None);
    }
}
