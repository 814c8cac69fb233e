//! Interactive org chart controller.
//!
//! Wires the tree engine, search and event bus together behind
//! [`OrgChart`], and provides the settings file and data loading that a
//! front end needs.

mod chart;
mod label;
mod loader;
mod settings;

pub use chart::OrgChart;
pub use label::{detail_panel, format_label};
pub use loader::load_dataset_from_path;
pub use settings::ChartSettings;

pub use orgchart_core::{DataFetchError, HierarchyError, LoadError, NodeId, SearchError};
pub use orgchart_events::{Command, DetailPanel, Event, EventBus, EventListener};
pub use orgchart_graph::{RenderFrame, TransitionKind};
