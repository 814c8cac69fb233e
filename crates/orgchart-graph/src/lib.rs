pub mod aggregate;
pub mod diff;
pub mod edge_router;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod visibility;

pub use aggregate::Aggregates;
pub use diff::{EdgeTransition, NodeTransition, RenderDiffer, RenderFrame, TransitionKind};
pub use edge_router::{CubicBezier, EdgeRouter};
pub use geometry::{Rect, Vec2};
pub use graph::{ExpandState, NodeIndex, TreeModel, TreeNode};
pub use layout::{LayoutResult, Layouter, TreeLayouter};
pub use visibility::INITIAL_VISIBLE_LEVELS;
