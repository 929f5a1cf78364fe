use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Default,
    Group,
    Application,
    Component,
    KafkaTopic,
    Drawing,
}

impl NodeKind {
    /// Group and application nodes are the only kinds that can own children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Group | Self::Application)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppType {
    Blue,
    Green,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Api,
    Service,
    Database,
    Other,
}

/// Per-kind node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Default {
        label: String,
    },
    Group {
        label: Option<String>,
    },
    Application {
        label: String,
        app_type: AppType,
    },
    Component {
        label: String,
        component_type: ComponentType,
    },
    KafkaTopic {
        label: Option<String>,
    },
    Drawing {
        svg_path: String,
        original_width: f32,
        original_height: f32,
        stroke_color: String,
        fill_color: String,
    },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Default { .. } => NodeKind::Default,
            Self::Group { .. } => NodeKind::Group,
            Self::Application { .. } => NodeKind::Application,
            Self::Component { .. } => NodeKind::Component,
            Self::KafkaTopic { .. } => NodeKind::KafkaTopic,
            Self::Drawing { .. } => NodeKind::Drawing,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Default { label } => Some(label),
            Self::Group { label } => label.as_deref(),
            Self::Application { label, .. } => Some(label),
            Self::Component { label, .. } => Some(label),
            Self::KafkaTopic { label } => label.as_deref(),
            Self::Drawing { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub data: NodeData,
    /// Relative to the parent container when `parent_id` is set, absolute
    /// otherwise.
    pub position: Point,
    pub parent_id: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    /// Style-declared size, consulted when no explicit size is set.
    pub style_width: Option<f32>,
    pub style_height: Option<f32>,
    pub selected: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, data: NodeData, position: Point) -> Self {
        Self {
            id: id.into(),
            data,
            position,
            parent_id: None,
            width: None,
            height: None,
            style_width: None,
            style_height: None,
            selected: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_style_size(mut self, width: f32, height: f32) -> Self {
        self.style_width = Some(width);
        self.style_height = Some(height);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Cft,
    Mq,
    Api,
    KafkaPub,
    KafkaSub,
    Manual,
    External,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeColor {
    Red,
    Grey,
    Turquoise,
    Purple,
    Yellow,
    Green,
}

impl EdgeColor {
    pub fn css(self) -> &'static str {
        match self {
            Self::Red => "#ef4444",
            Self::Grey => "#6b7280",
            Self::Turquoise => "#06b6d4",
            Self::Purple => "#8b5cf6",
            Self::Yellow => "#eab308",
            Self::Green => "#22c55e",
        }
    }
}

impl EdgeKind {
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Cft => "CFT Transfer",
            Self::Mq => "MQ Message Queue",
            Self::Api => "API Integration",
            Self::KafkaPub => "Kafka Publisher",
            Self::KafkaSub => "Kafka Subscriber",
            Self::Manual => "Manual Entry",
            Self::External => "External Entry",
            Self::Custom => "Custom Edge",
        }
    }

    pub fn color(self) -> EdgeColor {
        match self {
            Self::Cft | Self::KafkaSub => EdgeColor::Yellow,
            Self::Mq | Self::Manual | Self::Custom => EdgeColor::Grey,
            Self::Api => EdgeColor::Turquoise,
            Self::KafkaPub => EdgeColor::Purple,
            Self::External => EdgeColor::Green,
        }
    }

    pub fn stroke_width(self) -> f32 {
        match self {
            Self::KafkaPub => 4.0,
            _ => 2.0,
        }
    }

    pub fn has_start_marker(self) -> bool {
        false
    }

    pub fn has_end_marker(self) -> bool {
        true
    }

    pub fn has_center_label(self) -> bool {
        !matches!(self, Self::KafkaPub | Self::KafkaSub)
    }
}

/// Per-kind edge payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeData {
    Cft {
        from_job: Option<String>,
        to_job: Option<String>,
        from_path: Option<String>,
        to_path: Option<String>,
        center_label: Option<String>,
    },
    Api {
        endpoints: Vec<String>,
        center_label: Option<String>,
    },
    Plain {
        center_label: Option<String>,
    },
}

impl EdgeData {
    /// Default payload for a freshly created edge of the given kind,
    /// carrying the kind's default label.
    pub fn for_kind(kind: EdgeKind) -> Self {
        let center_label = Some(kind.default_label().to_string());
        match kind {
            EdgeKind::Cft => Self::Cft {
                from_job: None,
                to_job: None,
                from_path: None,
                to_path: None,
                center_label,
            },
            EdgeKind::Api => Self::Api {
                endpoints: Vec::new(),
                center_label,
            },
            _ => Self::Plain { center_label },
        }
    }

    pub fn center_label(&self) -> Option<&str> {
        match self {
            Self::Cft { center_label, .. }
            | Self::Api { center_label, .. }
            | Self::Plain { center_label } => center_label.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub data: EdgeData,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            data: EdgeData::for_kind(kind),
        }
    }
}

/// The whole node/edge collection. Mutated through whole-collection
/// operations so each editor event is one observable transition.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Removes a node and every edge referencing it as source or target.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        true
    }

    pub fn remove_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        self.edges.len() != before
    }

    pub fn children_of<'a>(&'a self, container_id: &'a str) -> impl Iterator<Item = &'a Node> {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(container_id))
    }

    pub fn top_level(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }

    /// Stable partition keeping containers ahead of every other node so
    /// container backgrounds never occlude children.
    pub fn sort_containers_first(&mut self) {
        self.nodes.sort_by_key(|n| !n.is_container());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagram_with_edges() -> Diagram {
        let mut diagram = Diagram::new();
        for id in ["a", "b", "c"] {
            diagram.add_node(Node::new(
                id,
                NodeData::Default { label: id.to_string() },
                Point::default(),
            ));
        }
        diagram.add_edge(Edge::new("e1", "a", "b", EdgeKind::Api));
        diagram.add_edge(Edge::new("e2", "b", "c", EdgeKind::Mq));
        diagram.add_edge(Edge::new("e3", "c", "a", EdgeKind::Cft));
        diagram
    }

    #[test]
    fn remove_node_cascades_incident_edges() {
        let mut diagram = diagram_with_edges();
        assert!(diagram.remove_node("a"));
        let remaining: Vec<&str> = diagram.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec!["e2"]);
    }

    #[test]
    fn remove_missing_node_is_a_no_op() {
        let mut diagram = diagram_with_edges();
        assert!(!diagram.remove_node("zz"));
        assert_eq!(diagram.edges.len(), 3);
    }

    #[test]
    fn containers_first_is_a_stable_partition() {
        let mut diagram = Diagram::new();
        diagram.add_node(Node::new("n1", NodeData::Default { label: "n1".into() }, Point::default()));
        diagram.add_node(Node::new("g1", NodeData::Group { label: None }, Point::default()));
        diagram.add_node(Node::new("n2", NodeData::Default { label: "n2".into() }, Point::default()));
        diagram.add_node(Node::new(
            "a1",
            NodeData::Application {
                label: "a1".into(),
                app_type: AppType::Blue,
            },
            Point::default(),
        ));
        diagram.sort_containers_first();
        let order: Vec<&str> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["g1", "a1", "n1", "n2"]);
    }

    #[test]
    fn edge_kinds_expose_fixed_default_labels() {
        assert_eq!(EdgeKind::Cft.default_label(), "CFT Transfer");
        assert_eq!(EdgeKind::Mq.default_label(), "MQ Message Queue");
        assert_eq!(EdgeKind::Api.default_label(), "API Integration");
        assert_eq!(EdgeKind::KafkaPub.default_label(), "Kafka Publisher");
        assert_eq!(EdgeKind::KafkaSub.default_label(), "Kafka Subscriber");
        assert_eq!(EdgeKind::Manual.default_label(), "Manual Entry");
        assert_eq!(EdgeKind::External.default_label(), "External Entry");
        assert_eq!(EdgeKind::Custom.default_label(), "Custom Edge");
    }

    #[test]
    fn edge_rendering_contract_per_kind() {
        assert_eq!(EdgeKind::Api.color(), EdgeColor::Turquoise);
        assert_eq!(EdgeKind::KafkaPub.stroke_width(), 4.0);
        assert_eq!(EdgeKind::Mq.stroke_width(), 2.0);
        assert!(EdgeKind::Cft.has_end_marker());
        assert!(!EdgeKind::Cft.has_start_marker());
        assert!(!EdgeKind::KafkaSub.has_center_label());
    }

    #[test]
    fn new_edge_carries_default_label_payload() {
        let edge = Edge::new("e", "a", "b", EdgeKind::External);
        assert_eq!(edge.data.center_label(), Some("External Entry"));
        let api = Edge::new("e2", "a", "b", EdgeKind::Api);
        assert!(matches!(api.data, EdgeData::Api { ref endpoints, .. } if endpoints.is_empty()));
    }
}
