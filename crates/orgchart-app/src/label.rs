use orgchart_events::DetailPanel;
use orgchart_graph::{TreeNode, Vec2};

/// Text drawn inside a node box.
///
/// Managers get their report counts appended when `show_counts` is set,
/// e.g. `Ada Lovelace (2/5)`.
pub fn format_label(node: &TreeNode, show_counts: bool) -> String {
    if show_counts && !node.is_leaf() {
        format!(
            "{} ({}/{})",
            node.name(),
            node.direct_report_count,
            node.total_descendant_count
        )
    } else {
        node.name().to_string()
    }
}

pub fn detail_panel(node: &TreeNode, anchor: Vec2) -> DetailPanel {
    DetailPanel {
        id: node.id.clone(),
        name: node.name().to_string(),
        title: node.title().to_string(),
        direct_report_count: node.direct_report_count,
        total_descendant_count: node.total_descendant_count,
        attributes: node.record.attributes.clone(),
        x: anchor.x,
        y: anchor.y,
    }
}
