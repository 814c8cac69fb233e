use crossbeam_channel::{Receiver, Sender, unbounded};
use orgchart_core::{LayoutDirection, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub mod telemetry;

/// User input accepted by the chart controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Flip one node between expanded and collapsed.
    ToggleNode { id: NodeId },
    ExpandAll,
    /// Return to the initial overview depth.
    CollapseAll,
    Search { query: String },
    HoverNode { id: NodeId },
    Unhover,
    SetLayoutDirection(LayoutDirection),
}

impl Command {
    /// Stable name used in telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToggleNode { .. } => "ToggleNode",
            Self::ExpandAll => "ExpandAll",
            Self::CollapseAll => "CollapseAll",
            Self::Search { .. } => "Search",
            Self::HoverNode { .. } => "HoverNode",
            Self::Unhover => "Unhover",
            Self::SetLayoutDirection(_) => "SetLayoutDirection",
        }
    }
}

/// Contents of the hover tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailPanel {
    pub id: NodeId,
    pub name: String,
    pub title: String,
    pub direct_report_count: usize,
    pub total_descendant_count: usize,
    /// Extra record fields, as found in the input.
    pub attributes: BTreeMap<String, Value>,
    /// Anchor on the drawing surface.
    pub x: f32,
    pub y: f32,
}

/// Signals for collaborators outside the engine: viewport, overlays, notices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    CenterViewport { x: f32, y: f32 },
    HighlightNode { id: NodeId, duration_ms: u64 },
    /// Transient, non-fatal message.
    ShowNotice { message: String },
    TooltipShow { panel: DetailPanel },
    TooltipHide,
    DataLoaded {
        node_count: usize,
        last_updated: Option<String>,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        tracing::trace!("Publishing {:?}", event);
        let _ = self.tx.send(event);
    }

    /// Hand every pending event to `listener`, oldest first.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Implemented by anything that reacts to chart events.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

impl EventListener for Vec<Event> {
    fn handle_event(&mut self, event: &Event) {
        self.push(event.clone());
    }
}
