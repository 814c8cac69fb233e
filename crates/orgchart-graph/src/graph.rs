use crate::aggregate;
use crate::geometry::Vec2;
use orgchart_core::{EmployeeRecord, HierarchyError, NodeId, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a node's children are currently shown.
///
/// Leaves stay `Expanded`; collapsing only applies to nodes with children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExpandState {
    #[default]
    Expanded,
    Collapsed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub record: EmployeeRecord,
    pub parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) state: ExpandState,
    pub depth: u32,

    // Aggregates over the full hierarchy, independent of visibility
    pub direct_report_count: usize,
    pub total_descendant_count: usize,

    // Render frames
    pub position: Vec2,
    pub previous_position: Option<Vec2>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    /// Every child in display order, whether shown or hidden.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn state(&self) -> ExpandState {
        self.state
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena holding the employee tree. Built once per data load.
#[derive(Debug, Clone)]
pub struct TreeModel {
    nodes: Vec<TreeNode>,
    node_map: HashMap<NodeId, NodeIndex>,
    root: NodeIndex,
}

impl TreeModel {
    /// Builds the tree from raw payload records.
    ///
    /// Records without an id, or without a `parentId` key at all, are dropped.
    /// Children are ordered by name (case-insensitive) once, here; aggregates
    /// are computed and the initial visibility (root plus first level) is set.
    pub fn from_records(records: Vec<RawRecord>) -> Result<Self, HierarchyError> {
        let input_count = records.len();
        let records: Vec<EmployeeRecord> = records
            .into_iter()
            .filter_map(|raw| {
                let label = raw.id.clone();
                let record = EmployeeRecord::from_raw(raw);
                if record.is_none() {
                    tracing::debug!("Dropping record {:?}: missing id or parentId", label);
                }
                record
            })
            .collect();

        let mut positions: HashMap<NodeId, usize> = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if positions.insert(record.id.clone(), pos).is_some() {
                return Err(HierarchyError::DuplicateId(record.id.clone()));
            }
        }

        let roots: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.parent_id.is_none())
            .map(|(pos, _)| pos)
            .collect();
        let root_pos = match roots.as_slice() {
            [] => return Err(HierarchyError::NoRoot),
            [single] => *single,
            many => {
                return Err(HierarchyError::MultipleRoots {
                    ids: many.iter().map(|&pos| records[pos].id.clone()).collect(),
                });
            }
        };

        let mut children_of: HashMap<usize, Vec<usize>> = HashMap::new();
        for (pos, record) in records.iter().enumerate() {
            let Some(parent_id) = &record.parent_id else {
                continue;
            };
            let Some(&parent_pos) = positions.get(parent_id) else {
                return Err(HierarchyError::OrphanedParent {
                    id: record.id.clone(),
                    parent_id: parent_id.clone(),
                });
            };
            children_of.entry(parent_pos).or_default().push(pos);
        }

        for siblings in children_of.values_mut() {
            siblings.sort_by_cached_key(|&pos| {
                (records[pos].name.to_lowercase(), records[pos].id.clone())
            });
        }

        // Breadth-first allocation: a parent's index is always below its children's.
        let mut slots: Vec<Option<EmployeeRecord>> = records.into_iter().map(Some).collect();
        let mut nodes: Vec<TreeNode> = Vec::with_capacity(slots.len());
        let mut queue = VecDeque::from([(root_pos, None::<NodeIndex>, 0u32)]);

        while let Some((pos, parent, depth)) = queue.pop_front() {
            let Some(record) = slots[pos].take() else {
                continue;
            };
            let idx = NodeIndex(nodes.len());
            nodes.push(TreeNode {
                id: record.id.clone(),
                record,
                parent,
                children: Vec::new(),
                state: ExpandState::Expanded,
                depth,
                direct_report_count: 0,
                total_descendant_count: 0,
                position: Vec2::ZERO,
                previous_position: None,
            });
            if let Some(parent_idx) = parent {
                nodes[parent_idx.0].children.push(idx);
            }
            for &child_pos in children_of.get(&pos).map(Vec::as_slice).unwrap_or(&[]) {
                queue.push_back((child_pos, Some(idx), depth + 1));
            }
        }

        let unreachable: Vec<NodeId> = slots
            .into_iter()
            .flatten()
            .map(|record| record.id)
            .collect();
        if !unreachable.is_empty() {
            return Err(HierarchyError::Cycle { ids: unreachable });
        }

        let node_map = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), NodeIndex(i)))
            .collect();

        let mut model = Self {
            nodes,
            node_map,
            root: NodeIndex(0),
        };

        let totals = aggregate::compute(&model);
        model.apply_aggregates(&totals);
        model.apply_initial_state();

        tracing::info!(
            "Built org tree with {} nodes from {} records (root {})",
            model.len(),
            input_count,
            model[model.root].id
        );

        Ok(model)
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a built tree; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + use<> {
        (0..self.nodes.len()).map(NodeIndex)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).map(|idx| &self.nodes[idx.0])
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut chain = Vec::new();
        let mut current = self.nodes[idx.0].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes[parent.0].parent;
        }
        chain
    }

    /// Root to `idx`, both ends included.
    pub fn path_from_root(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut path = self.ancestors(idx);
        path.reverse();
        path.push(idx);
        path
    }

    /// `idx` and everything beneath it, pre-order, ignoring visibility.
    pub fn subtree(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.walk_preorder(idx, |node| node.children.as_slice())
    }

    /// Whole tree in pre-order (children before later siblings).
    pub fn preorder(&self) -> Vec<NodeIndex> {
        self.subtree(self.root)
    }

    pub(crate) fn walk_preorder<'a, F>(&'a self, start: NodeIndex, children: F) -> Vec<NodeIndex>
    where
        F: Fn(&'a TreeNode) -> &'a [NodeIndex],
    {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(children(&self.nodes[idx.0]).iter().rev().copied());
        }
        order
    }

    fn apply_aggregates(&mut self, totals: &[aggregate::Aggregates]) {
        for (node, totals) in self.nodes.iter_mut().zip(totals) {
            node.direct_report_count = totals.direct_report_count;
            node.total_descendant_count = totals.total_descendant_count;
        }
    }
}

impl Index<NodeIndex> for TreeModel {
    type Output = TreeNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl IndexMut<NodeIndex> for TreeModel {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index.0]
    }
}
