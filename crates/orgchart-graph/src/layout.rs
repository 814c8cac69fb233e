use crate::geometry::{Rect, Vec2};
use crate::graph::{NodeIndex, TreeModel};
use orgchart_core::LayoutDirection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub trait Layouter {
    fn execute(&self, model: &TreeModel) -> LayoutResult;
}

/// Positions for one layout pass, in layout space (before `offset`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    /// Node centers, one per visible node.
    pub positions: HashMap<NodeIndex, Vec2>,
    /// Visible nodes in pre-order.
    pub order: Vec<NodeIndex>,
    /// Box around every visible node.
    pub bounds: Rect,
    /// Translation that puts `bounds.min` at (`margin`, `margin`).
    pub offset: Vec2,
    /// Drawing surface size needed to show everything with the margin.
    pub canvas_size: Vec2,
    pub node_size: Vec2,
}

impl LayoutResult {
    pub fn position(&self, idx: NodeIndex) -> Option<Vec2> {
        self.positions.get(&idx).copied()
    }

    /// Position on the drawing surface, offset applied.
    pub fn screen_position(&self, idx: NodeIndex) -> Option<Vec2> {
        self.position(idx).map(|pos| pos.offset_by(self.offset))
    }

    pub fn node_rect(&self, idx: NodeIndex) -> Option<Rect> {
        self.position(idx)
            .map(|center| Rect::from_center_size(center, self.node_size))
    }
}

/// Layered tree layout.
///
/// Depth maps to one axis at a fixed per-level spacing. Along the other axis
/// visible leaves take consecutive slots in display order and every expanded
/// parent sits at the mean of its children, so sibling subtrees never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeLayouter {
    pub direction: LayoutDirection,
    /// Width and height of one node box.
    pub node_size: Vec2,
    /// Gap between consecutive levels along the depth axis.
    pub level_gap: f32,
    /// Gap between neighbouring slots along the breadth axis.
    pub sibling_gap: f32,
    /// Padding kept around the content on the drawing surface.
    pub margin: f32,
}

impl Default for TreeLayouter {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::default(),
            node_size: Vec2::new(Self::DEFAULT_NODE_WIDTH, Self::DEFAULT_NODE_HEIGHT),
            level_gap: Self::DEFAULT_LEVEL_GAP,
            sibling_gap: Self::DEFAULT_SIBLING_GAP,
            margin: Self::DEFAULT_MARGIN,
        }
    }
}

impl TreeLayouter {
    pub const DEFAULT_NODE_WIDTH: f32 = 180.0;
    pub const DEFAULT_NODE_HEIGHT: f32 = 56.0;
    pub const DEFAULT_LEVEL_GAP: f32 = 80.0;
    pub const DEFAULT_SIBLING_GAP: f32 = 24.0;
    pub const DEFAULT_MARGIN: f32 = 40.0;

    fn breadth_extent(&self) -> f32 {
        match self.direction {
            LayoutDirection::Vertical => self.node_size.x,
            LayoutDirection::Horizontal => self.node_size.y,
        }
    }

    fn depth_extent(&self) -> f32 {
        match self.direction {
            LayoutDirection::Vertical => self.node_size.y,
            LayoutDirection::Horizontal => self.node_size.x,
        }
    }

    pub fn level_spacing(&self) -> f32 {
        self.depth_extent() + self.level_gap
    }

    pub fn slot_spacing(&self) -> f32 {
        self.breadth_extent() + self.sibling_gap
    }

    fn to_point(&self, breadth: f32, depth: f32) -> Vec2 {
        match self.direction {
            LayoutDirection::Vertical => Vec2::new(breadth, depth),
            LayoutDirection::Horizontal => Vec2::new(depth, breadth),
        }
    }

    fn assign_breadth(&self, model: &TreeModel, order: &[NodeIndex]) -> Vec<f32> {
        let mut breadth = vec![0.0f32; model.len()];
        let slot = self.slot_spacing();

        let mut next_slot = 0usize;
        for &idx in order {
            if model.visible_children(idx).is_empty() {
                breadth[idx.0] = next_slot as f32 * slot;
                next_slot += 1;
            }
        }

        // Reverse pre-order settles children before their parent.
        for &idx in order.iter().rev() {
            let children = model.visible_children(idx);
            if !children.is_empty() {
                let sum: f32 = children.iter().map(|child| breadth[child.0]).sum();
                breadth[idx.0] = sum / children.len() as f32;
            }
        }

        breadth
    }
}

impl Layouter for TreeLayouter {
    fn execute(&self, model: &TreeModel) -> LayoutResult {
        let order = model.visible_nodes();
        let breadth = self.assign_breadth(model, &order);
        let level = self.level_spacing();

        let mut positions = HashMap::with_capacity(order.len());
        let mut bounds: Option<Rect> = None;
        for &idx in &order {
            let pos = self.to_point(breadth[idx.0], model[idx].depth as f32 * level);
            let rect = Rect::from_center_size(pos, self.node_size);
            bounds = Some(bounds.map_or(rect, |acc| acc.union(&rect)));
            positions.insert(idx, pos);
        }

        let bounds = bounds.unwrap_or(Rect::NOTHING);
        let offset = Vec2::new(self.margin - bounds.min.x, self.margin - bounds.min.y);
        let canvas_size = Vec2::new(
            bounds.width() + 2.0 * self.margin,
            bounds.height() + 2.0 * self.margin,
        );

        tracing::debug!(
            "Laid out {} visible nodes, bounds {:?}",
            order.len(),
            bounds
        );

        LayoutResult {
            positions,
            order,
            bounds,
            offset,
            canvas_size,
            node_size: self.node_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{rec, sample_model};
    use crate::visibility::tests::tree_strategy;
    use proptest::prelude::*;

    fn layouter(direction: LayoutDirection) -> TreeLayouter {
        TreeLayouter {
            direction,
            node_size: Vec2::new(100.0, 40.0),
            level_gap: 60.0,
            sibling_gap: 20.0,
            margin: 30.0,
        }
    }

    #[test]
    fn hidden_subtrees_get_no_position() {
        let model = sample_model();
        let result = layouter(LayoutDirection::Vertical).execute(&model);

        assert_eq!(result.positions.len(), 3);
        assert!(result.position(model.index_of("eng-1").unwrap()).is_none());
    }

    #[test]
    fn parent_is_centered_over_children() {
        let mut model = sample_model();
        model.expand_all(model.root());
        let result = layouter(LayoutDirection::Vertical).execute(&model);

        let eng = model.index_of("vp-eng").unwrap();
        let alan = result.position(model.index_of("eng-2").unwrap()).unwrap();
        let barbara = result.position(model.index_of("eng-1").unwrap()).unwrap();
        let eng_pos = result.position(eng).unwrap();

        // Leaves take consecutive slots of width + gap.
        assert_eq!(alan.x, 0.0);
        assert_eq!(barbara.x, 120.0);
        assert_eq!(eng_pos.x, 60.0);

        // Depth axis: level * (height + level gap).
        assert_eq!(eng_pos.y, 100.0);
        assert_eq!(alan.y, 200.0);
    }

    #[test]
    fn horizontal_direction_swaps_axes() {
        let mut model = sample_model();
        model.expand_all(model.root());
        let vertical = layouter(LayoutDirection::Vertical).execute(&model);
        let horizontal = layouter(LayoutDirection::Horizontal).execute(&model);

        let ken = model.index_of("ops-1a").unwrap();
        let v = vertical.position(ken).unwrap();
        let h = horizontal.position(ken).unwrap();

        assert_eq!(v.y, 3.0 * 100.0);
        assert_eq!(h.x, 3.0 * 160.0);
        // Breadth slots use the node height when growing sideways.
        assert_eq!(horizontal.position(model.index_of("eng-1").unwrap()).unwrap().y, 60.0);
    }

    #[test]
    fn offset_and_canvas_include_margin() {
        let model = TreeModel::from_records(vec![rec("a", None, "A")]).unwrap();
        let result = layouter(LayoutDirection::Vertical).execute(&model);
        let root = model.root();

        assert_eq!(result.bounds.size(), Vec2::new(100.0, 40.0));
        assert_eq!(result.canvas_size, Vec2::new(160.0, 100.0));
        assert_eq!(result.screen_position(root), Some(Vec2::new(80.0, 50.0)));
    }

    proptest! {
        #[test]
        fn prop_layout_keeps_margin_and_avoids_overlap(model in tree_strategy(), horizontal in proptest::bool::ANY) {
            let mut model = model;
            model.expand_all(model.root());
            let direction = if horizontal { LayoutDirection::Horizontal } else { LayoutDirection::Vertical };
            let layouter = layouter(direction);
            let result = layouter.execute(&model);

            prop_assert_eq!(result.positions.len(), model.len());

            let rects: Vec<Rect> = result.order.iter().map(|&idx| result.node_rect(idx).unwrap()).collect();
            for rect in &rects {
                prop_assert!(rect.min.x + result.offset.x >= layouter.margin - 0.01);
                prop_assert!(rect.min.y + result.offset.y >= layouter.margin - 0.01);
                prop_assert!(rect.max.x + result.offset.x <= result.canvas_size.x - layouter.margin + 0.01);
                prop_assert!(rect.max.y + result.offset.y <= result.canvas_size.y - layouter.margin + 0.01);
            }
            for i in 0..rects.len() {
                for j in (i + 1)..rects.len() {
                    prop_assert!(!rects[i].intersects(&rects[j]), "{:?} overlaps {:?}", rects[i], rects[j]);
                }
            }
        }

        #[test]
        fn prop_depth_axis_is_monotonic(model in tree_strategy()) {
            let mut model = model;
            model.expand_all(model.root());
            let layouter = layouter(LayoutDirection::Vertical);
            let result = layouter.execute(&model);

            for (parent, child) in model.visible_edges() {
                let p = result.position(parent).unwrap();
                let c = result.position(child).unwrap();
                prop_assert!((c.y - p.y - layouter.level_spacing()).abs() < 0.01);
            }
        }
    }
}
