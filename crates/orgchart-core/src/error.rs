use crate::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// The employee payload could not be obtained or decoded.
#[derive(Error, Debug)]
pub enum DataFetchError {
    #[error("failed to read employee data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("employee data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("employee data contains no records")]
    Empty,
}

/// The records decoded fine but do not describe a single rooted tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("no root record found: exactly one record must have an empty parentId")]
    NoRoot,
    #[error("multiple root records found: {}", join_ids(.ids))]
    MultipleRoots { ids: Vec<NodeId> },
    #[error("duplicate record id: {0}")]
    DuplicateId(NodeId),
    #[error("record {id} references missing parent {parent_id}")]
    OrphanedParent { id: NodeId, parent_id: NodeId },
    #[error("records are not reachable from the root (parent cycle): {}", join_ids(.ids))]
    Cycle { ids: Vec<NodeId> },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("no employee matches \"{query}\"")]
    NotFound { query: String },
}

/// Either fatal initialization failure, kept apart so callers can show a
/// distinct message for each.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] DataFetchError),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
