use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32String};
use orgchart_core::{NodeId, SearchError};
use orgchart_graph::{NodeIndex, TreeModel};
use std::collections::HashSet;

/// A located employee after the tree has been opened up to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub index: NodeIndex,
    pub id: NodeId,
    /// Root first, ending with the match.
    pub path: Vec<NodeIndex>,
}

impl SearchHit {
    /// The node whose position new siblings grow out of when revealed.
    pub fn transition_source(&self) -> NodeIndex {
        self.path
            .len()
            .checked_sub(2)
            .map(|parent| self.path[parent])
            .unwrap_or(self.index)
    }
}

pub struct SearchNavigator {
    matcher: Matcher,
}

impl Default for SearchNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchNavigator {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    /// First node in pre-order over the whole tree, hidden nodes included,
    /// whose name or id contains `query` ignoring case.
    pub fn find(&mut self, model: &TreeModel, query: &str) -> Option<NodeIndex> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let atom = Atom::new(
            query,
            CaseMatching::Ignore,
            Normalization::Never,
            AtomKind::Substring,
            false,
        );

        model.preorder().into_iter().find(|&idx| {
            let node = &model[idx];
            [node.name(), node.id.as_str()].into_iter().any(|haystack| {
                let haystack = Utf32String::from(haystack);
                atom.score(haystack.slice(..), &mut self.matcher).is_some()
            })
        })
    }

    /// Shows `target` with as little else as possible: every sibling subtree
    /// along the root path is folded away, then each ancestor opens one level.
    /// The target's own subtree keeps its state.
    pub fn reveal(model: &mut TreeModel, target: NodeIndex) -> Vec<NodeIndex> {
        let path = model.path_from_root(target);
        let keep: HashSet<NodeIndex> = path.iter().copied().collect();
        let ancestors = &path[..path.len().saturating_sub(1)];

        for &step in ancestors {
            let off_path: Vec<NodeIndex> = model[step]
                .children()
                .iter()
                .copied()
                .filter(|child| !keep.contains(child))
                .collect();
            for child in off_path {
                model.collapse_subtree(child);
            }
        }
        model.expand_ancestors(target);

        path
    }

    pub fn search(&mut self, model: &mut TreeModel, query: &str) -> Result<SearchHit, SearchError> {
        let Some(index) = self.find(model, query) else {
            tracing::debug!("Search for {:?} found nothing", query);
            return Err(SearchError::NotFound {
                query: query.trim().to_string(),
            });
        };

        let path = Self::reveal(model, index);
        let id = model[index].id.clone();
        tracing::debug!("Search for {:?} revealed {} at depth {}", query, id, path.len() - 1);

        Ok(SearchHit { index, id, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgchart_core::RawRecord;
    use proptest::prelude::*;

    fn model() -> TreeModel {
        TreeModel::from_records(vec![
            RawRecord::new("ceo", None, "Grace Hopper"),
            RawRecord::new("vp-eng", Some("ceo"), "Ada Lovelace"),
            RawRecord::new("vp-ops", Some("ceo"), "Linus Torvalds"),
            RawRecord::new("eng-1", Some("vp-eng"), "Barbara Liskov"),
            RawRecord::new("eng-2", Some("vp-eng"), "Alan Turing"),
            RawRecord::new("eng-2a", Some("eng-2"), "Edsger Dijkstra"),
            RawRecord::new("ops-1", Some("vp-ops"), "Margaret Hamilton"),
            RawRecord::new("ops-1a", Some("ops-1"), "Ken Thompson"),
        ])
        .unwrap()
    }

    fn visible_ids(model: &TreeModel) -> Vec<&str> {
        model
            .visible_nodes()
            .into_iter()
            .map(|idx| model[idx].id.as_str())
            .collect()
    }

    #[test]
    fn finds_by_name_ignoring_case() {
        let model = model();
        let mut navigator = SearchNavigator::new();
        let hit = navigator.find(&model, "  liskov ").unwrap();
        assert_eq!(model[hit].id.as_str(), "eng-1");
        let hit = navigator.find(&model, "alan turing").unwrap();
        assert_eq!(model[hit].id.as_str(), "eng-2");
    }

    #[test]
    fn finds_by_id() {
        let model = model();
        let mut navigator = SearchNavigator::new();
        let hit = navigator.find(&model, "OPS-1A").unwrap();
        assert_eq!(model[hit].name(), "Ken Thompson");
    }

    #[test]
    fn first_match_in_preorder_wins() {
        let model = model();
        let mut navigator = SearchNavigator::new();
        // The root is checked first.
        assert_eq!(navigator.find(&model, "a"), Some(model.root()));
        // "Barbara" and "Margaret" both match; engineering comes first.
        let hit = navigator.find(&model, "ar").unwrap();
        assert_eq!(model[hit].id.as_str(), "eng-1");
    }

    #[test]
    fn empty_or_unknown_query_leaves_tree_alone() {
        let mut model = model();
        let before = visible_ids(&model)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut navigator = SearchNavigator::new();

        assert_eq!(
            navigator.search(&mut model, "   "),
            Err(SearchError::NotFound {
                query: String::new()
            })
        );
        assert_eq!(
            navigator.search(&mut model, "nobody"),
            Err(SearchError::NotFound {
                query: "nobody".to_string()
            })
        );
        assert_eq!(visible_ids(&model), before);
    }

    #[test]
    fn hidden_match_is_revealed_with_path_expanded() {
        let mut model = model();
        let mut navigator = SearchNavigator::new();
        assert!(!model.is_visible(model.index_of("eng-2a").unwrap()));

        let hit = navigator.search(&mut model, "eng-2a").unwrap();
        assert_eq!(hit.id.as_str(), "eng-2a");
        assert_eq!(hit.path.len(), 4);
        assert_eq!(model[hit.transition_source()].id.as_str(), "eng-2");

        assert_eq!(
            visible_ids(&model),
            ["ceo", "vp-eng", "eng-2", "eng-2a", "eng-1", "vp-ops"]
        );
    }

    #[test]
    fn reveal_folds_previously_open_siblings() {
        let mut model = model();
        let root = model.root();
        model.expand_all(root);
        let mut navigator = SearchNavigator::new();

        navigator.search(&mut model, "Dijkstra").unwrap();

        let ops = model.index_of("vp-ops").unwrap();
        let ops_1 = model.index_of("ops-1").unwrap();
        assert!(!model.is_expanded(ops));
        assert!(!model.is_expanded(ops_1));
        assert!(!model.is_visible(model.index_of("ops-1a").unwrap()));
    }

    #[test]
    fn matched_manager_keeps_open_reports() {
        let mut model = model();
        let root = model.root();
        model.expand_all(root);
        let mut navigator = SearchNavigator::new();

        let hit = navigator.search(&mut model, "Ada Lovelace").unwrap();
        assert_eq!(hit.id.as_str(), "vp-eng");

        let eng_2 = model.index_of("eng-2").unwrap();
        assert!(model.is_expanded(hit.index));
        assert!(model.is_expanded(eng_2));
        assert!(model.is_visible(model.index_of("eng-2a").unwrap()));
        assert!(!model.is_expanded(model.index_of("vp-ops").unwrap()));
    }

    #[test]
    fn root_match_is_its_own_source() {
        let mut model = model();
        let mut navigator = SearchNavigator::new();
        let hit = navigator.search(&mut model, "grace").unwrap();
        assert_eq!(hit.index, model.root());
        assert_eq!(hit.transition_source(), model.root());
    }

    fn tree() -> impl Strategy<Value = TreeModel> {
        prop::collection::vec(any::<prop::sample::Index>(), 0..30).prop_map(|parents| {
            let mut records = vec![RawRecord::new("n0", None, "node 0")];
            for (i, parent) in parents.iter().enumerate() {
                let id = format!("n{}", i + 1);
                let parent = format!("n{}", parent.index(i + 1));
                let name = format!("node {}", i + 1);
                records.push(RawRecord::new(&id, Some(parent.as_str()), &name));
            }
            TreeModel::from_records(records).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_search_by_id_always_reveals_target(model in tree(), pick in any::<prop::sample::Index>()) {
            let mut model = model;
            let target = model.node_indices().nth(pick.index(model.len())).unwrap();
            let id = model[target].id.clone();

            // Exact ids can be prefixes of others ("n1" in "n12"), so search the
            // first pre-order match and check that one.
            let mut navigator = SearchNavigator::new();
            let hit = navigator.search(&mut model, id.as_str()).unwrap();

            prop_assert!(model.is_visible(hit.index));
            for ancestor in model.ancestors(hit.index) {
                prop_assert!(model.is_expanded(ancestor));
                for &child in model[ancestor].children() {
                    if !hit.path.contains(&child) {
                        prop_assert!(model.subtree(child).iter().all(|&n| model[n].is_leaf() || !model.is_expanded(n)));
                    }
                }
            }
        }
    }
}
