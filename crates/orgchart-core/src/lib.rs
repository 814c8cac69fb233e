use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub mod error;
pub mod record;

pub use error::{DataFetchError, HierarchyError, LoadError, SearchError};
pub use record::{Dataset, EmployeeRecord, RawRecord, parse_timestamp};

/// Identity of an employee, taken verbatim from the input `id` field.
///
/// Stable across reloads of the same data set, so it doubles as the diff key
/// between render passes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which screen axis tree depth grows along.
///
/// `Vertical` grows top-down (depth on y, siblings spread along x),
/// `Horizontal` grows left-to-right (depth on x, siblings spread along y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayoutDirection {
    Horizontal,
    #[default]
    Vertical,
}
