//! Report counts derived from the full hierarchy.
//!
//! Computed once per load. Collapse state is never consulted, so counts stay
//! the same no matter what is currently shown.

use crate::graph::TreeModel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub direct_report_count: usize,
    pub total_descendant_count: usize,
}

/// Bottom-up pass returning one entry per node, indexed by `NodeIndex`.
pub fn compute(model: &TreeModel) -> Vec<Aggregates> {
    let mut totals = vec![Aggregates::default(); model.len()];

    // Reverse pre-order reaches every child before its parent.
    for idx in model.preorder().into_iter().rev() {
        let node = &model[idx];
        let total_descendant_count = node
            .children()
            .iter()
            .map(|child| 1 + totals[child.0].total_descendant_count)
            .sum();
        totals[idx.0] = Aggregates {
            direct_report_count: node.children().len(),
            total_descendant_count,
        };
    }

    totals
}
