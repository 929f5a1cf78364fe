use crate::config::EditorConfig;
use crate::model::Node;

/// A position stored on a node. Relative to the owning container's origin
/// when the node has a parent, canvas-absolute otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsolutePoint {
    pub x: f32,
    pub y: f32,
}

/// A point relative to a container's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativePoint {
    pub x: f32,
    pub y: f32,
}

/// A raw screen pixel position, before viewport conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl AbsolutePoint {
    pub fn relative_to(self, container: AbsolutePoint) -> RelativePoint {
        RelativePoint {
            x: self.x - container.x,
            y: self.y - container.y,
        }
    }
}

impl RelativePoint {
    pub fn to_absolute(self, container: AbsolutePoint) -> AbsolutePoint {
        AbsolutePoint {
            x: container.x + self.x,
            y: container.y + self.y,
        }
    }
}

impl From<AbsolutePoint> for Point {
    fn from(p: AbsolutePoint) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<RelativePoint> for Point {
    fn from(p: RelativePoint) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// An axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Strict interior test: a point on the boundary is outside.
    pub fn contains_interior(&self, p: AbsolutePoint) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }

    /// Inclusive test, boundary counts as inside.
    pub fn contains(&self, p: AbsolutePoint) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Resolves a node's canvas position. Composition is exactly one level
/// deep: the parent's stored position is taken as-is, a grandparent is
/// never consulted. A dangling `parent_id` degrades to treating the stored
/// position as absolute.
pub fn absolute_position(node: &Node, nodes: &[Node]) -> AbsolutePoint {
    lift_to_absolute(node.position, node.parent_id.as_deref(), nodes)
}

/// Lifts a stored position into canvas coordinates against the parent's
/// current position.
pub fn lift_to_absolute(position: Point, parent_id: Option<&str>, nodes: &[Node]) -> AbsolutePoint {
    if let Some(parent_id) = parent_id {
        if let Some(parent) = nodes.iter().find(|n| n.id == parent_id) {
            return RelativePoint {
                x: position.x,
                y: position.y,
            }
            .to_absolute(AbsolutePoint {
                x: parent.position.x,
                y: parent.position.y,
            });
        }
    }
    AbsolutePoint {
        x: position.x,
        y: position.y,
    }
}

/// Inverse of [`lift_to_absolute`]: rewrites a canvas position into the
/// frame the node stores its position in.
pub fn lower_from_absolute(
    absolute: AbsolutePoint,
    parent_id: Option<&str>,
    nodes: &[Node],
) -> Point {
    if let Some(parent_id) = parent_id {
        if let Some(parent) = nodes.iter().find(|n| n.id == parent_id) {
            return absolute
                .relative_to(AbsolutePoint {
                    x: parent.position.x,
                    y: parent.position.y,
                })
                .into();
        }
    }
    absolute.into()
}

/// Explicit width/height if present, else the style-declared size, else
/// the kind-appropriate fallback.
pub fn effective_size(node: &Node, config: &EditorConfig) -> (f32, f32) {
    let (fallback_w, fallback_h) = if node.is_container() {
        (config.sizes.container_width, config.sizes.container_height)
    } else {
        (config.sizes.node_width, config.sizes.node_height)
    };
    let width = node.width.or(node.style_width).unwrap_or(fallback_w);
    let height = node.height.or(node.style_height).unwrap_or(fallback_h);
    (width, height)
}

/// The node's canvas-space bounding box.
pub fn absolute_rect(node: &Node, nodes: &[Node], config: &EditorConfig) -> Rect {
    let pos = absolute_position(node, nodes);
    let (width, height) = effective_size(node, config);
    Rect {
        x: pos.x,
        y: pos.y,
        width,
        height,
    }
}
