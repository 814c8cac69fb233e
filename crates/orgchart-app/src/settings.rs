use orgchart_core::LayoutDirection;
use orgchart_graph::{INITIAL_VISIBLE_LEVELS, TreeLayouter, Vec2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub direction: LayoutDirection,
    pub node_width: f32,
    pub node_height: f32,
    pub level_gap: f32,
    pub sibling_gap: f32,
    pub margin: f32,

    /// Levels shown right after loading, root being level 1.
    pub initial_visible_levels: u32,
    /// Levels left open by the collapse-all command.
    pub collapse_all_levels: u32,

    /// Append "(direct/total)" report counts to node labels.
    pub show_report_counts: bool,
    pub transition_ms: u64,
    pub highlight_ms: u64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::default(),
            node_width: TreeLayouter::DEFAULT_NODE_WIDTH,
            node_height: TreeLayouter::DEFAULT_NODE_HEIGHT,
            level_gap: TreeLayouter::DEFAULT_LEVEL_GAP,
            sibling_gap: TreeLayouter::DEFAULT_SIBLING_GAP,
            margin: TreeLayouter::DEFAULT_MARGIN,
            initial_visible_levels: INITIAL_VISIBLE_LEVELS,
            collapse_all_levels: INITIAL_VISIBLE_LEVELS,
            show_report_counts: true,
            transition_ms: 750,
            highlight_ms: 2000,
        }
    }
}

impl ChartSettings {
    pub fn layouter(&self) -> TreeLayouter {
        TreeLayouter {
            direction: self.direction,
            node_size: Vec2::new(self.node_width, self.node_height),
            level_gap: self.level_gap,
            sibling_gap: self.sibling_gap,
            margin: self.margin,
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("orgchart").join("settings.json"))
    }

    /// Settings from the user config directory, or defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::info!("No config directory, using default settings");
                Self::default()
            }
        }
    }

    /// Settings from `path`. Missing or unreadable files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(settings) => {
                    tracing::debug!("Settings loaded: {:?}", settings);
                    settings.sanitized()
                }
                Err(e) => {
                    tracing::error!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent()
            && !dir.exists()
        {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
    }

    /// Clamp values that would break layout.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.node_width.is_nan() || self.node_width <= 0.0 {
            self.node_width = defaults.node_width;
        }
        if self.node_height.is_nan() || self.node_height <= 0.0 {
            self.node_height = defaults.node_height;
        }
        self.level_gap = self.level_gap.max(0.0);
        self.sibling_gap = self.sibling_gap.max(0.0);
        self.margin = self.margin.max(0.0);
        // The root always shows its direct reports.
        self.initial_visible_levels = self.initial_visible_levels.max(2);
        self.collapse_all_levels = self.collapse_all_levels.max(2);
        self
    }
}
