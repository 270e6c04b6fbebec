// Lazy-loading path tree with single selection.
// Nodes live in an arena and fetch their children the first time they are expanded.

use std::fmt;

use crate::error::Result;
use crate::hub::PathEntry;

use super::list::LoadingState;

/// Unique identifier for a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Load state of a node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// Children never fetched.
    Unloaded,
    /// Fetch in flight.
    Loading,
    /// Children fetched; may be empty.
    Loaded(Vec<NodeId>),
    /// Last fetch failed. Expanding again retries.
    Failed(String),
}

/// A directory on the service host.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub path: String,
    pub parent: Option<NodeId>,
    pub state: NodeState,
    /// Whether the UI shows this node open.
    pub expanded: bool,
}

impl TreeNode {
    /// Children once loaded. `None` distinguishes "never loaded" from "loaded, empty".
    pub fn children(&self) -> Option<&[NodeId]> {
        match &self.state {
            NodeState::Loaded(children) => Some(children),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == NodeState::Loading
    }

    /// Last component of the path, for display.
    pub fn label(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.path)
    }
}

/// A visible row when the tree is flattened for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub depth: usize,
}

/// Partially materialized path tree backed by on-demand path searches.
#[derive(Debug, Clone)]
pub struct SelectableLazyTree {
    base_path: String,
    nodes: Vec<TreeNode>,
    roots: LoadingState<Vec<NodeId>>,
    selected: Option<NodeId>,
    /// Node under the cursor. Its row index is derived from the visible rows.
    cursor: Option<NodeId>,
}

impl SelectableLazyTree {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            nodes: Vec::new(),
            roots: LoadingState::Idle,
            selected: None,
            cursor: None,
        }
    }

    /// Root nodes. Empty until the initial fetch succeeds.
    pub fn roots(&self) -> &[NodeId] {
        self.roots.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots_state(&self) -> &LoadingState<Vec<NodeId>> {
        &self.roots
    }

    /// Error from the initial fetch, if it failed.
    pub fn root_error(&self) -> Option<&str> {
        self.roots.error()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Every node is a directory; the expand affordance is always shown.
    pub fn is_leaf(&self, _id: NodeId) -> bool {
        false
    }

    /// Start the initial fetch. Returns the path to search, or None if the
    /// roots are already loading or loaded.
    pub fn begin_initialize(&mut self) -> Option<String> {
        match self.roots {
            LoadingState::Loading | LoadingState::Loaded(_) => None,
            LoadingState::Idle | LoadingState::Error(_) => {
                self.roots = LoadingState::Loading;
                Some(self.base_path.clone())
            }
        }
    }

    /// Apply the result of the initial fetch.
    pub fn complete_initialize(&mut self, result: Result<Vec<PathEntry>>) {
        if !self.roots.is_loading() {
            tracing::debug!("dropping root listing that is no longer awaited");
            return;
        }
        match result {
            Ok(entries) => {
                let ids = self.alloc(entries, None);
                self.cursor = ids.first().copied();
                self.roots = LoadingState::Loaded(ids);
            }
            Err(e) => {
                tracing::warn!(base_path = %self.base_path, error = %e, "failed to list base path");
                self.roots = LoadingState::Error(e.user_message());
            }
        }
    }

    /// Mark a node expanded. Returns the path to fetch when its children are
    /// not loaded and no fetch is already in flight.
    pub fn request_expand(&mut self, id: NodeId) -> Option<String> {
        let node = self.nodes.get_mut(id.0)?;
        node.expanded = true;
        match node.state {
            NodeState::Loaded(_) => {
                tracing::debug!(path = %node.path, "children cached");
                None
            }
            NodeState::Loading => None,
            NodeState::Unloaded | NodeState::Failed(_) => {
                node.state = NodeState::Loading;
                Some(node.path.clone())
            }
        }
    }

    /// Apply a fetch result for a node. Returns false if the node was not
    /// waiting for one.
    pub fn complete_expand(&mut self, id: NodeId, result: Result<Vec<PathEntry>>) -> bool {
        match self.nodes.get(id.0) {
            Some(node) if node.is_loading() => {}
            _ => {
                tracing::debug!(%id, "dropping listing for node that is not loading");
                return false;
            }
        }

        let state = match result {
            Ok(entries) => NodeState::Loaded(self.alloc(entries, Some(id))),
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to list node children");
                NodeState::Failed(e.user_message())
            }
        };
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.state = state;
        }
        true
    }

    /// Close a node. Never fetches and keeps cached children. A cursor on a
    /// hidden descendant moves up to the collapsed node.
    pub fn collapse(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        node.expanded = false;
        if self.cursor.is_some_and(|c| self.is_descendant(c, id)) {
            self.cursor = Some(id);
        }
    }

    /// Whether `id` sits strictly below `ancestor`.
    fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut parent = self.node(id).and_then(|n| n.parent);
        while let Some(p) = parent {
            if p == ancestor {
                return true;
            }
            parent = self.node(p).and_then(|n| n.parent);
        }
        false
    }

    /// Make `id` the single selected node.
    pub fn select(&mut self, id: NodeId) -> Option<&str> {
        let node = self.nodes.get(id.0)?;
        self.selected = Some(id);
        Some(&node.path)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.selected
            .and_then(|id| self.node(id))
            .map(|n| n.path.as_str())
    }

    /// Flatten expanded nodes into display rows, depth first.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<VisibleRow> = self
            .roots()
            .iter()
            .rev()
            .map(|&id| VisibleRow { id, depth: 0 })
            .collect();

        while let Some(row) = stack.pop() {
            rows.push(row);
            if let Some(node) = self.node(row.id) {
                if let (true, Some(children)) = (node.expanded, node.children()) {
                    stack.extend(children.iter().rev().map(|&id| VisibleRow {
                        id,
                        depth: row.depth + 1,
                    }));
                }
            }
        }
        rows
    }

    /// Index of the cursor within `visible_rows`.
    pub fn cursor(&self) -> usize {
        self.cursor_in(&self.visible_rows())
    }

    fn cursor_in(&self, rows: &[VisibleRow]) -> usize {
        self.cursor
            .and_then(|id| rows.iter().position(|r| r.id == id))
            .unwrap_or(0)
    }

    /// Node under the cursor.
    pub fn cursor_node(&self) -> Option<NodeId> {
        let rows = self.visible_rows();
        rows.get(self.cursor_in(&rows)).map(|row| row.id)
    }

    pub fn cursor_down(&mut self) {
        let rows = self.visible_rows();
        if let Some(row) = rows.get(self.cursor_in(&rows) + 1) {
            self.cursor = Some(row.id);
        }
    }

    pub fn cursor_up(&mut self) {
        let rows = self.visible_rows();
        let index = self.cursor_in(&rows).saturating_sub(1);
        if let Some(row) = rows.get(index) {
            self.cursor = Some(row.id);
        }
    }

    /// Move the cursor to a node's parent, if it has one.
    pub fn cursor_to_parent(&mut self) {
        if let Some(parent) = self
            .cursor_node()
            .and_then(|id| self.node(id))
            .and_then(|n| n.parent)
        {
            self.cursor = Some(parent);
        }
    }

    fn alloc(&mut self, entries: Vec<PathEntry>, parent: Option<NodeId>) -> Vec<NodeId> {
        entries
            .into_iter()
            .map(|entry| {
                let id = NodeId(self.nodes.len());
                self.nodes.push(TreeNode {
                    id,
                    path: entry.path,
                    parent,
                    state: NodeState::Unloaded,
                    expanded: false,
                });
                id
            })
            .collect()
    }
}
