use crate::edge_router::{CubicBezier, EdgeRouter};
use crate::geometry::{Rect, Vec2};
use crate::graph::{NodeIndex, TreeModel};
use crate::layout::LayoutResult;
use orgchart_core::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    Enter,
    Update,
    Exit,
}

/// One node to animate from `from` to `to` (layout space).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTransition {
    pub id: NodeId,
    #[serde(skip)]
    pub index: NodeIndex,
    pub kind: TransitionKind,
    pub from: Vec2,
    pub to: Vec2,
    pub label: String,
    pub title: String,
    pub direct_report_count: usize,
    pub total_descendant_count: usize,
    /// Has children that are currently hidden.
    pub collapsed: bool,
}

/// One manager-to-report link, keyed by the report's id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeTransition {
    pub child: NodeId,
    pub parent: NodeId,
    pub kind: TransitionKind,
    pub from: CubicBezier,
    pub to: CubicBezier,
}

/// Everything a drawing surface needs for one animated update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderFrame {
    pub nodes: Vec<NodeTransition>,
    pub edges: Vec<EdgeTransition>,
    pub bounds: Rect,
    /// Add to every coordinate in this frame to get surface coordinates.
    pub offset: Vec2,
    pub canvas_size: Vec2,
    pub duration_ms: u64,
}

impl RenderFrame {
    pub fn node(&self, id: &str) -> Option<&NodeTransition> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }

    pub fn edge(&self, child: &str) -> Option<&EdgeTransition> {
        self.edges.iter().find(|edge| edge.child.as_str() == child)
    }

    pub fn nodes_of(&self, kind: TransitionKind) -> impl Iterator<Item = &NodeTransition> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    pub fn edges_of(&self, kind: TransitionKind) -> impl Iterator<Item = &EdgeTransition> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    nodes: Vec<(NodeId, NodeIndex, Vec2)>,
    edges: Vec<(NodeId, NodeId, CubicBezier)>,
}

/// Keeps the last drawn frame and classifies the next one against it.
#[derive(Debug, Clone)]
pub struct RenderDiffer {
    router: EdgeRouter,
    previous: Snapshot,
}

impl RenderDiffer {
    pub fn new(router: EdgeRouter) -> Self {
        Self {
            router,
            previous: Snapshot::default(),
        }
    }

    pub fn set_router(&mut self, router: EdgeRouter) {
        self.router = router;
    }

    /// Writes `layout` into the tree, builds the transition frame relative to
    /// `source` (the node whose change triggered the pass), and records the
    /// result as the baseline for the next call.
    pub fn reconcile(
        &mut self,
        model: &mut TreeModel,
        layout: &LayoutResult,
        source: NodeIndex,
    ) -> RenderFrame {
        for &idx in &layout.order {
            if let Some(pos) = layout.position(idx) {
                model[idx].position = pos;
            }
        }

        let source = if layout.positions.contains_key(&source) {
            source
        } else {
            tracing::warn!(
                "Transition source {} is not visible, animating from the root",
                model[source].id
            );
            model.root()
        };
        let previous_nodes: HashMap<&NodeId, Vec2> = self
            .previous
            .nodes
            .iter()
            .map(|(id, _, pos)| (id, *pos))
            .collect();

        // A source that was hidden last frame grows its reports from where it
        // is now, not from wherever it was last drawn.
        let source_now = model[source].position;
        let source_before = previous_nodes
            .get(&model[source].id)
            .copied()
            .unwrap_or(source_now);
        let previous_edges: HashMap<&NodeId, CubicBezier> = self
            .previous
            .edges
            .iter()
            .map(|(child, _, curve)| (child, *curve))
            .collect();

        let mut nodes = Vec::with_capacity(layout.order.len());
        let mut edges = Vec::with_capacity(layout.order.len());
        let mut current: HashSet<NodeId> = HashSet::with_capacity(layout.order.len());

        for &idx in &layout.order {
            let node = &model[idx];
            let (kind, from) = match previous_nodes.get(&node.id) {
                Some(&last) => (TransitionKind::Update, last),
                None => (TransitionKind::Enter, source_before),
            };
            nodes.push(self.node_transition(model, idx, kind, from, node.position));
            current.insert(node.id.clone());

            if let Some(parent) = node.parent {
                let to = self.router.route_link(model[parent].position, node.position);
                let (kind, from) = match previous_edges.get(&node.id) {
                    Some(&last) => (TransitionKind::Update, last),
                    None => (TransitionKind::Enter, CubicBezier::point(source_before)),
                };
                edges.push(EdgeTransition {
                    child: node.id.clone(),
                    parent: model[parent].id.clone(),
                    kind,
                    from,
                    to,
                });
            }
        }

        for (id, idx, last) in &self.previous.nodes {
            if !current.contains(id) && idx.0 < model.len() {
                let exit = self.node_transition(model, *idx, TransitionKind::Exit, *last, source_now);
                nodes.push(exit);
            }
        }
        for (child, parent, last) in &self.previous.edges {
            if !current.contains(child) {
                edges.push(EdgeTransition {
                    child: child.clone(),
                    parent: parent.clone(),
                    kind: TransitionKind::Exit,
                    from: *last,
                    to: CubicBezier::point(source_now),
                });
            }
        }

        tracing::debug!(
            "Reconciled frame from {}: {} nodes, {} edges",
            model[source].id,
            nodes.len(),
            edges.len()
        );

        self.commit(model, layout, &edges);

        RenderFrame {
            nodes,
            edges,
            bounds: layout.bounds,
            offset: layout.offset,
            canvas_size: layout.canvas_size,
            duration_ms: 0,
        }
    }

    fn node_transition(
        &self,
        model: &TreeModel,
        idx: NodeIndex,
        kind: TransitionKind,
        from: Vec2,
        to: Vec2,
    ) -> NodeTransition {
        let node = &model[idx];
        NodeTransition {
            id: node.id.clone(),
            index: idx,
            kind,
            from,
            to,
            label: node.name().to_string(),
            title: node.title().to_string(),
            direct_report_count: node.direct_report_count,
            total_descendant_count: node.total_descendant_count,
            collapsed: !model.hidden_children(idx).is_empty(),
        }
    }

    fn commit(&mut self, model: &mut TreeModel, layout: &LayoutResult, edges: &[EdgeTransition]) {
        let mut snapshot = Snapshot::default();
        for &idx in &layout.order {
            let node = &mut model[idx];
            node.previous_position = Some(node.position);
            snapshot.nodes.push((node.id.clone(), idx, node.position));
        }
        snapshot.edges = edges
            .iter()
            .filter(|edge| edge.kind != TransitionKind::Exit)
            .map(|edge| (edge.child.clone(), edge.parent.clone(), edge.to))
            .collect();
        self.previous = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::sample_model;
    use crate::layout::{Layouter, TreeLayouter};

    fn setup() -> (TreeModel, TreeLayouter, RenderDiffer) {
        let model = sample_model();
        let layouter = TreeLayouter::default();
        let differ = RenderDiffer::new(EdgeRouter::new(layouter.direction, layouter.node_size));
        (model, layouter, differ)
    }

    fn pass(
        model: &mut TreeModel,
        layouter: &TreeLayouter,
        differ: &mut RenderDiffer,
        source: NodeIndex,
    ) -> RenderFrame {
        let layout = layouter.execute(model);
        differ.reconcile(model, &layout, source)
    }

    #[test]
    fn first_frame_enters_from_root() {
        let (mut model, layouter, mut differ) = setup();
        let root = model.root();
        let frame = pass(&mut model, &layouter, &mut differ, root);

        assert_eq!(frame.nodes_of(TransitionKind::Enter).count(), 3);
        assert_eq!(frame.edges_of(TransitionKind::Enter).count(), 2);

        let root_pos = model[root].position;
        for node in &frame.nodes {
            assert_eq!(node.from, root_pos);
        }
        assert_eq!(model[root].previous_position, Some(root_pos));
    }

    #[test]
    fn expanding_grows_children_from_source_previous_position() {
        let (mut model, layouter, mut differ) = setup();
        let root = model.root();
        pass(&mut model, &layouter, &mut differ, root);

        let eng = model.index_of("vp-eng").unwrap();
        let eng_before = model[eng].position;
        model.toggle(eng);
        let frame = pass(&mut model, &layouter, &mut differ, eng);

        let entering: Vec<&str> = frame
            .nodes_of(TransitionKind::Enter)
            .map(|node| node.id.as_str())
            .collect();
        assert_eq!(entering, ["eng-2", "eng-1"]);
        for node in frame.nodes_of(TransitionKind::Enter) {
            assert_eq!(node.from, eng_before);
        }
        for edge in frame.edges_of(TransitionKind::Enter) {
            assert_eq!(edge.from, CubicBezier::point(eng_before));
            assert_eq!(edge.parent.as_str(), "vp-eng");
        }

        // The VP moved to stay centered over its reports.
        let eng_update = frame.node("vp-eng").unwrap();
        assert_eq!(eng_update.kind, TransitionKind::Update);
        assert_eq!(eng_update.from, eng_before);
        assert_eq!(eng_update.to, model[eng].position);
        assert!(!eng_update.collapsed);
    }

    #[test]
    fn collapsing_shrinks_children_into_source_current_position() {
        let (mut model, layouter, mut differ) = setup();
        let root = model.root();
        let eng = model.index_of("vp-eng").unwrap();
        model.toggle(eng);
        pass(&mut model, &layouter, &mut differ, root);

        let alan_before = model[model.index_of("eng-2").unwrap()].position;
        model.toggle(eng);
        let frame = pass(&mut model, &layouter, &mut differ, eng);

        let exiting: Vec<&NodeTransition> = frame.nodes_of(TransitionKind::Exit).collect();
        assert_eq!(exiting.len(), 2);
        let alan = frame.node("eng-2").unwrap();
        assert_eq!(alan.kind, TransitionKind::Exit);
        assert_eq!(alan.from, alan_before);
        assert_eq!(alan.to, model[eng].position);

        let edge = frame.edge("eng-2").unwrap();
        assert_eq!(edge.kind, TransitionKind::Exit);
        assert_eq!(edge.to, CubicBezier::point(model[eng].position));
        assert!(frame.node("vp-eng").unwrap().collapsed);

        // Exited nodes are gone from the next baseline.
        let frame = pass(&mut model, &layouter, &mut differ, root);
        assert!(frame.node("eng-2").is_none());
        assert_eq!(frame.nodes_of(TransitionKind::Update).count(), 3);
        assert_eq!(frame.edges_of(TransitionKind::Update).count(), 2);
    }

    #[test]
    fn source_hidden_last_frame_grows_from_current_position() {
        let (mut model, layouter, mut differ) = setup();
        let root = model.root();
        let eng = model.index_of("vp-eng").unwrap();
        let ops = model.index_of("vp-ops").unwrap();
        let ops_1 = model.index_of("ops-1").unwrap();
        let ken = model.index_of("ops-1a").unwrap();

        model.expand_ancestors(ken);
        pass(&mut model, &layouter, &mut differ, root);
        let stale = model[ops_1].position;

        model.toggle(ops);
        pass(&mut model, &layouter, &mut differ, ops);
        model.toggle(eng);
        pass(&mut model, &layouter, &mut differ, eng);

        // Reveal Ken again with his manager as the source, as search does.
        model.expand_ancestors(ken);
        let frame = pass(&mut model, &layouter, &mut differ, ops_1);

        let now = model[ops_1].position;
        assert_ne!(now, stale);
        let ken_enter = frame.node("ops-1a").unwrap();
        assert_eq!(ken_enter.kind, TransitionKind::Enter);
        assert_eq!(ken_enter.from, now);
        assert_eq!(frame.edge("ops-1a").unwrap().from, CubicBezier::point(now));
    }

    #[test]
    fn unchanged_pass_is_all_updates_in_place() {
        let (mut model, layouter, mut differ) = setup();
        let root = model.root();
        pass(&mut model, &layouter, &mut differ, root);
        let frame = pass(&mut model, &layouter, &mut differ, root);

        assert!(frame.nodes.iter().all(|node| node.kind == TransitionKind::Update));
        assert!(frame.nodes.iter().all(|node| node.from == node.to));
        assert!(frame.edges.iter().all(|edge| edge.from == edge.to));
    }

    #[test]
    fn hidden_source_falls_back_to_root() {
        let (mut model, layouter, mut differ) = setup();
        let hidden = model.index_of("ops-1a").unwrap();
        let frame = pass(&mut model, &layouter, &mut differ, hidden);
        let root_pos = model[model.root()].position;
        assert!(frame.nodes.iter().all(|node| node.from == root_pos));
    }

    #[test]
    fn frame_serializes_for_surfaces() {
        let (mut model, layouter, mut differ) = setup();
        let root = model.root();
        let frame = pass(&mut model, &layouter, &mut differ, root);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["nodes"][0]["id"], "ceo");
        assert_eq!(json["nodes"][0]["kind"], "Enter");
        assert!(json["nodes"][0].get("index").is_none());
    }
}
