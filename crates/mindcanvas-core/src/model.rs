//! Mind-map node collection.
//!
//! Nodes live in an insertion-ordered arena keyed by id. Parent/child links are ids, never
//! references, so snapshots are plain clones and walks are explicit.

use crate::TreeError;
use crate::palette;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Rectangle,
    #[default]
    Rounded,
    Ellipse,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Outline-archive marker number (`priority-1` is the most urgent).
    pub fn marker_rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    #[serde(default)]
    pub shape: Shape,
}

impl NodeStyle {
    pub fn from_swatch(swatch: &palette::Swatch, shape: Shape) -> Self {
        Self {
            background_color: swatch.background.to_string(),
            text_color: swatch.text.to_string(),
            border_color: swatch.border.to_string(),
            shape,
        }
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self::from_swatch(&palette::ACCENT, Shape::Rounded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub text: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub icons: Vec<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, text: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            parent_id,
            children: Vec::new(),
            collapsed: false,
            notes: None,
            style: NodeStyle::default(),
            tags: Vec::new(),
            priority: None,
            progress: None,
            icons: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Notes with empty strings treated as absent.
    pub fn notes_text(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }
}

/// A validated, single-rooted tree of nodes.
///
/// Serializes as a flat array of nodes in insertion order; deserializing validates every
/// structural invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Node>", into = "Vec<Node>")]
pub struct MindMap {
    root: String,
    nodes: IndexMap<String, Node>,
}

impl MindMap {
    /// A map holding only a root node.
    pub fn with_root(root: Node) -> Self {
        let mut root = root;
        root.parent_id = None;
        root.children.clear();
        let id = root.id.clone();
        let mut nodes = IndexMap::new();
        nodes.insert(id.clone(), root);
        Self { root: id, nodes }
    }

    /// Builds a map from externally produced nodes, rejecting anything that is not a tree.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, TreeError> {
        let mut by_id: IndexMap<String, Node> = IndexMap::with_capacity(nodes.len());
        let mut root: Option<String> = None;
        for node in nodes {
            if node.parent_id.is_none() {
                if let Some(first) = &root {
                    return Err(TreeError::MultipleRoots {
                        first: first.clone(),
                        second: node.id,
                    });
                }
                root = Some(node.id.clone());
            }
            if by_id.contains_key(&node.id) {
                return Err(TreeError::DuplicateId(node.id));
            }
            by_id.insert(node.id.clone(), node);
        }
        let root = root.ok_or(TreeError::NoRoot)?;
        let map = Self {
            root,
            nodes: by_id,
        };
        map.validate()?;
        Ok(map)
    }

    /// Checks bidirectional parent/child consistency, dangling references, reachability and the
    /// progress range.
    pub fn validate(&self) -> Result<(), TreeError> {
        for node in self.nodes.values() {
            if let Some(progress) = node.progress.filter(|p| *p > 100) {
                return Err(TreeError::ProgressOutOfRange {
                    node: node.id.clone(),
                    progress,
                });
            }
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            for child_id in &node.children {
                if !seen.insert(child_id.as_str()) {
                    return Err(TreeError::DuplicateChild {
                        parent: node.id.clone(),
                        child: child_id.clone(),
                    });
                }
                let Some(child) = self.nodes.get(child_id) else {
                    return Err(TreeError::DanglingChild {
                        parent: node.id.clone(),
                        child: child_id.clone(),
                    });
                };
                if child.parent_id.as_deref() != Some(node.id.as_str()) {
                    return Err(TreeError::ParentMismatch {
                        child: child_id.clone(),
                        listed_under: node.id.clone(),
                        parent: child.parent_id.clone(),
                    });
                }
            }
            if let Some(parent_id) = &node.parent_id {
                let listed = self
                    .nodes
                    .get(parent_id)
                    .is_some_and(|p| p.children.iter().any(|c| c == &node.id));
                if !listed {
                    return Err(TreeError::NotListedByParent {
                        node: node.id.clone(),
                        parent: parent_id.clone(),
                    });
                }
            }
        }

        // Every node has exactly one listing parent at this point, so anything not reached from
        // the root sits on a cycle.
        let reachable = self.descendant_closure(&self.root);
        if reachable.len() != self.nodes.len() {
            let reached: FxHashSet<&str> = reachable.iter().map(String::as_str).collect();
            if let Some(stray) = self.nodes.keys().find(|id| !reached.contains(id.as_str())) {
                return Err(TreeError::Unreachable(stray.clone()));
            }
        }
        Ok(())
    }

    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn root(&self) -> &Node {
        &self.nodes[self.root.as_str()]
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a map keeps its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Resolvable children of `id`, in display order. Unknown ids are skipped.
    pub fn children_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Node> + use<'a> {
        let children = self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[]);
        children.iter().filter_map(|c| self.nodes.get(c))
    }

    /// `id` plus all transitive descendants, in pre-order. Empty if `id` is unknown.
    pub fn descendant_closure(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(id) {
            return out;
        }
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut stack: Vec<&str> = vec![id];
        while let Some(cur) = stack.pop() {
            if !visited.insert(cur) {
                continue;
            }
            let Some(node) = self.nodes.get(cur) else {
                continue;
            };
            out.push(node.id.clone());
            for child in node.children.iter().rev() {
                if self.nodes.contains_key(child) {
                    stack.push(child.as_str());
                }
            }
        }
        out
    }

    /// Number of edges between `id` and the root, if `id` exists.
    pub fn depth(&self, id: &str) -> Option<usize> {
        let mut depth = 0;
        let mut cur = self.nodes.get(id)?;
        while let Some(parent) = cur.parent_id.as_deref() {
            cur = self.nodes.get(parent)?;
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
        }
        Some(depth)
    }

    /// True when `id` is hidden because some strict ancestor is collapsed.
    pub fn is_hidden(&self, id: &str) -> bool {
        let mut cur = self.nodes.get(id);
        let mut steps = 0;
        while let Some(parent) = cur.and_then(|n| n.parent_id.as_deref()) {
            let Some(p) = self.nodes.get(parent) else {
                return false;
            };
            if p.collapsed {
                return true;
            }
            cur = Some(p);
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
        }
        false
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn remove_node(&mut self, id: &str) -> Option<Node> {
        self.nodes.shift_remove(id)
    }
}

impl TryFrom<Vec<Node>> for MindMap {
    type Error = TreeError;

    fn try_from(nodes: Vec<Node>) -> Result<Self, Self::Error> {
        Self::from_nodes(nodes)
    }
}

impl From<MindMap> for Vec<Node> {
    fn from(map: MindMap) -> Self {
        map.nodes.into_values().collect()
    }
}
