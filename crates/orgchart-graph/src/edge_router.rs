use crate::geometry::{Rect, Vec2};
use orgchart_core::LayoutDirection;
use serde::{Deserialize, Serialize};

/// A cubic bezier curve segment defined by four control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    /// Zero-length curve sitting on `point`; used as the collapsed form of a
    /// link while it grows out of, or shrinks into, a node.
    pub fn point(point: Vec2) -> Self {
        Self {
            start: point,
            control1: point,
            control2: point,
            end: point,
        }
    }

    /// Sample the curve at parameter t [0, 1]
    pub fn sample(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = self.start.x * mt3
            + 3.0 * self.control1.x * mt2 * t
            + 3.0 * self.control2.x * mt * t2
            + self.end.x * t3;
        let y = self.start.y * mt3
            + 3.0 * self.control1.y * mt2 * t
            + 3.0 * self.control2.y * mt * t2
            + self.end.y * t3;

        Vec2::new(x, y)
    }
}

/// Routes manager-to-report links.
///
/// Links leave the manager box on its far side along the depth axis, enter the
/// report box on its near side, and bend halfway between the two levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRouter {
    pub direction: LayoutDirection,
    pub node_size: Vec2,
}

impl EdgeRouter {
    pub fn new(direction: LayoutDirection, node_size: Vec2) -> Self {
        Self {
            direction,
            node_size,
        }
    }

    pub fn route_link(&self, parent: Vec2, child: Vec2) -> CubicBezier {
        let parent_rect = Rect::from_center_size(parent, self.node_size);
        let child_rect = Rect::from_center_size(child, self.node_size);

        match self.direction {
            LayoutDirection::Vertical => {
                let start = Vec2::new(parent.x, parent_rect.max.y);
                let end = Vec2::new(child.x, child_rect.min.y);
                let mid = (start.y + end.y) * 0.5;
                CubicBezier {
                    start,
                    control1: Vec2::new(start.x, mid),
                    control2: Vec2::new(end.x, mid),
                    end,
                }
            }
            LayoutDirection::Horizontal => {
                let start = Vec2::new(parent_rect.max.x, parent.y);
                let end = Vec2::new(child_rect.min.x, child.y);
                let mid = (start.x + end.x) * 0.5;
                CubicBezier {
                    start,
                    control1: Vec2::new(mid, start.y),
                    control2: Vec2::new(mid, end.y),
                    end,
                }
            }
        }
    }
}
