use crate::label::{detail_panel, format_label};
use crate::loader::load_dataset_from_path;
use crate::settings::ChartSettings;
use chrono::{DateTime, Utc};
use orgchart_core::{Dataset, HierarchyError, LayoutDirection, LoadError, NodeId};
use orgchart_events::telemetry::CommandSpan;
use orgchart_events::{Command, Event, EventBus};
use orgchart_graph::{
    EdgeRouter, Layouter, LayoutResult, NodeIndex, RenderDiffer, RenderFrame, TreeLayouter,
    TreeModel,
};
use orgchart_search::SearchNavigator;
use std::path::Path;

/// Owns the tree and turns commands into render frames.
///
/// Every state change goes through [`OrgChart::dispatch`], which runs exactly
/// one visibility operation followed by one layout and one reconcile pass.
/// Signals for the viewport, highlight overlay, tooltip and notices are
/// published on the [`EventBus`].
pub struct OrgChart {
    model: TreeModel,
    settings: ChartSettings,
    layouter: TreeLayouter,
    differ: RenderDiffer,
    navigator: SearchNavigator,
    layout: LayoutResult,
    events: EventBus,
    last_updated: Option<DateTime<Utc>>,
}

impl OrgChart {
    pub fn load(path: &Path, settings: ChartSettings) -> Result<Self, LoadError> {
        let dataset = load_dataset_from_path(path)?;
        Ok(Self::from_dataset(dataset, settings)?)
    }

    pub fn from_json_str(json: &str, settings: ChartSettings) -> Result<Self, LoadError> {
        let dataset = Dataset::from_json_str(json)?;
        Ok(Self::from_dataset(dataset, settings)?)
    }

    pub fn from_dataset(dataset: Dataset, settings: ChartSettings) -> Result<Self, HierarchyError> {
        let mut model = TreeModel::from_records(dataset.records)?;
        let root = model.root();
        model.collapse_to_depth(root, settings.initial_visible_levels);

        let layouter = settings.layouter();
        let differ = RenderDiffer::new(router_for(&layouter));
        let events = EventBus::new();
        events.publish(Event::DataLoaded {
            node_count: model.len(),
            last_updated: dataset.last_updated.map(|ts| ts.to_rfc3339()),
        });

        Ok(Self {
            model,
            settings,
            layouter,
            differ,
            navigator: SearchNavigator::new(),
            layout: LayoutResult::default(),
            events,
            last_updated: dataset.last_updated,
        })
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// The most recent layout; empty before the first render.
    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    /// Lays out the current state with the root as the transition source.
    /// The first call produces the initial frame.
    pub fn render(&mut self) -> RenderFrame {
        let root = self.model.root();
        self.render_from(root)
    }

    /// Applies `command`. Returns the frame to animate when the drawing
    /// changed, `None` for hover commands and for commands that were ignored.
    pub fn dispatch(&mut self, command: Command) -> Option<RenderFrame> {
        let span = CommandSpan::begin(command.name());
        let root = self.model.root();

        let source = match &command {
            Command::ToggleNode { id } => {
                let Some(idx) = self.model.index_of(id.as_str()) else {
                    span.reject(format!("unknown node {id}"));
                    return None;
                };
                if !self.model.toggle(idx) {
                    span.reject(format!("{id} has no reports"));
                    return None;
                }
                idx
            }
            Command::ExpandAll => {
                self.model.expand_all(root);
                root
            }
            Command::CollapseAll => {
                self.model
                    .collapse_to_depth(root, self.settings.collapse_all_levels);
                root
            }
            Command::Search { query } => match self.navigator.search(&mut self.model, query) {
                Ok(hit) => {
                    let frame = self.render_from(hit.transition_source());
                    if let Some(center) = self.layout.screen_position(hit.index) {
                        self.events.publish(Event::CenterViewport {
                            x: center.x,
                            y: center.y,
                        });
                    }
                    self.events.publish(Event::HighlightNode {
                        id: hit.id,
                        duration_ms: self.settings.highlight_ms,
                    });
                    span.succeed();
                    return Some(frame);
                }
                Err(err) => {
                    self.events.publish(Event::ShowNotice {
                        message: err.to_string(),
                    });
                    span.reject(err.to_string());
                    return None;
                }
            },
            Command::HoverNode { id } => {
                self.hover(id, span);
                return None;
            }
            Command::Unhover => {
                self.events.publish(Event::TooltipHide);
                span.succeed();
                return None;
            }
            Command::SetLayoutDirection(direction) => {
                self.set_direction(*direction);
                root
            }
        };

        let frame = self.render_from(source);
        span.succeed();
        Some(frame)
    }

    fn hover(&mut self, id: &NodeId, span: CommandSpan) {
        let Some(idx) = self.model.index_of(id.as_str()) else {
            span.reject(format!("unknown node {id}"));
            return;
        };
        let Some(anchor) = self.layout.screen_position(idx) else {
            span.reject(format!("{id} is not on screen"));
            return;
        };
        let panel = detail_panel(&self.model[idx], anchor);
        self.events.publish(Event::TooltipShow { panel });
        span.succeed();
    }

    fn set_direction(&mut self, direction: LayoutDirection) {
        self.settings.direction = direction;
        self.layouter = self.settings.layouter();
        self.differ.set_router(router_for(&self.layouter));
    }

    fn render_from(&mut self, source: NodeIndex) -> RenderFrame {
        self.layout = self.layouter.execute(&self.model);
        let mut frame = self.differ.reconcile(&mut self.model, &self.layout, source);

        frame.duration_ms = self.settings.transition_ms;
        for node in &mut frame.nodes {
            node.label = format_label(&self.model[node.index], self.settings.show_report_counts);
        }
        frame
    }
}

fn router_for(layouter: &TreeLayouter) -> EdgeRouter {
    EdgeRouter::new(layouter.direction, layouter.node_size)
}
