use crate::graph::{ExpandState, NodeIndex, TreeModel};

/// Levels shown right after load: the root and its direct reports.
pub const INITIAL_VISIBLE_LEVELS: u32 = 2;

/// Expand/collapse operations. None of them re-run layout; callers render
/// afterwards.
impl TreeModel {
    pub fn is_expanded(&self, idx: NodeIndex) -> bool {
        self[idx].state == ExpandState::Expanded
    }

    /// Children currently drawn below `idx`; empty when collapsed.
    pub fn visible_children(&self, idx: NodeIndex) -> &[NodeIndex] {
        match self[idx].state {
            ExpandState::Expanded => self[idx].children.as_slice(),
            ExpandState::Collapsed => &[],
        }
    }

    /// Children held back while `idx` is collapsed; empty when expanded.
    pub fn hidden_children(&self, idx: NodeIndex) -> &[NodeIndex] {
        match self[idx].state {
            ExpandState::Expanded => &[],
            ExpandState::Collapsed => self[idx].children.as_slice(),
        }
    }

    /// True when every ancestor of `idx` is expanded.
    pub fn is_visible(&self, idx: NodeIndex) -> bool {
        self.ancestors(idx)
            .into_iter()
            .all(|ancestor| self.is_expanded(ancestor))
    }

    /// Visible nodes in pre-order.
    pub fn visible_nodes(&self) -> Vec<NodeIndex> {
        self.walk_preorder(self.root(), |node| match node.state {
            ExpandState::Expanded => node.children.as_slice(),
            ExpandState::Collapsed => &[],
        })
    }

    /// Visible `(parent, child)` links in the same order as `visible_nodes`.
    pub fn visible_edges(&self) -> Vec<(NodeIndex, NodeIndex)> {
        self.visible_nodes()
            .into_iter()
            .filter_map(|idx| self[idx].parent.map(|parent| (parent, idx)))
            .collect()
    }

    fn set_state(&mut self, idx: NodeIndex, state: ExpandState) {
        let node = &mut self[idx];
        if !node.children.is_empty() {
            node.state = state;
        }
    }

    /// Flips a single node. Returns false for leaves, which have nothing to show.
    pub fn toggle(&mut self, idx: NodeIndex) -> bool {
        if self[idx].is_leaf() {
            return false;
        }
        let next = match self[idx].state {
            ExpandState::Expanded => ExpandState::Collapsed,
            ExpandState::Collapsed => ExpandState::Expanded,
        };
        self.set_state(idx, next);
        true
    }

    /// Collapses `idx` and every node beneath it.
    pub fn collapse_subtree(&mut self, idx: NodeIndex) {
        for node in self.subtree(idx) {
            self.set_state(node, ExpandState::Collapsed);
        }
    }

    pub fn collapse_all(&mut self, idx: NodeIndex) {
        self.collapse_subtree(idx);
    }

    pub fn expand_all(&mut self, idx: NodeIndex) {
        for node in self.subtree(idx) {
            self.set_state(node, ExpandState::Expanded);
        }
    }

    /// Expands each strict ancestor so `idx` becomes visible. Other subtrees
    /// below those ancestors keep their own state.
    pub fn expand_ancestors(&mut self, idx: NodeIndex) {
        for ancestor in self.ancestors(idx) {
            self.set_state(ancestor, ExpandState::Expanded);
        }
    }

    /// Shows exactly `levels` levels below and including `idx` (1-based: with
    /// `levels == 2`, `idx` and its direct children).
    ///
    /// `idx` itself always ends up expanded.
    pub fn collapse_to_depth(&mut self, idx: NodeIndex, levels: u32) {
        let base = self[idx].depth;
        let cutoff = levels.saturating_sub(1);
        for node in self.subtree(idx) {
            let relative = self[node].depth - base;
            let state = if relative == 0 || relative < cutoff {
                ExpandState::Expanded
            } else {
                ExpandState::Collapsed
            };
            self.set_state(node, state);
        }
    }

    pub fn apply_initial_state(&mut self) {
        self.collapse_to_depth(self.root(), INITIAL_VISIBLE_LEVELS);
    }
}
