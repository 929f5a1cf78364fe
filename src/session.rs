use std::collections::HashSet;

use thiserror::Error;

use crate::config::EditorConfig;
use crate::containment;
use crate::geometry::{
    AbsolutePoint, Point, Rect, absolute_rect, effective_size, lift_to_absolute,
    lower_from_absolute,
};
use crate::layout;
use crate::model::{Diagram, Edge, EdgeData, EdgeKind, Node, NodeData, NodeKind};
use crate::snap::{HelperGuide, compute_snap};

pub use crate::geometry::ScreenPoint;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown node id: {0}")]
    UnknownNode(String),
    #[error("no connection is pending")]
    NoPendingConnection,
}

/// A batched change event from the rendering framework.
#[derive(Debug, Clone)]
pub enum NodeChange {
    Position {
        id: String,
        /// In the node's own frame: container-relative when parented.
        position: Point,
        dragging: bool,
    },
    Select {
        id: String,
        selected: bool,
    },
}

/// Handle onto the rendering framework instance.
pub trait Viewport {
    fn fit_view(&mut self);
    fn screen_to_canvas(&self, point: ScreenPoint) -> AbsolutePoint;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSample {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
}

/// External stroke-to-outline service. Given the captured samples, returns
/// the outline polygon to fill.
pub trait StrokeShaper {
    fn outline(&self, samples: &[StrokeSample]) -> Vec<(f32, f32)>;
}

/// Pass-through shaper: the outline is the sampled polyline itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolylineShaper;

impl StrokeShaper for PolylineShaper {
    fn outline(&self, samples: &[StrokeSample]) -> Vec<(f32, f32)> {
        samples.iter().map(|s| (s.x, s.y)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Select,
    Draw,
    Erase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConnection {
    pub source: String,
    pub target: String,
}

/// The editor's event-handling component. Owns the diagram, the transient
/// helper guides, the selection, the connection/reconnection state and the
/// freehand capture state machine. All handlers run synchronously to
/// completion; each produces one observable diagram transition.
pub struct EditorSession {
    diagram: Diagram,
    config: EditorConfig,
    guides: Vec<HelperGuide>,
    selected_node: Option<String>,
    pending_connection: Option<PendingConnection>,
    reconnect_successful: bool,
    mode: Mode,
    pointer_active: bool,
    stroke_canvas: Vec<StrokeSample>,
    stroke_screen: Vec<StrokeSample>,
    viewport: Option<Box<dyn Viewport>>,
    shaper: Box<dyn StrokeShaper>,
    next_id: u64,
}

impl EditorSession {
    pub fn new(diagram: Diagram, config: EditorConfig) -> Self {
        Self {
            diagram,
            config,
            guides: Vec::new(),
            selected_node: None,
            pending_connection: None,
            reconnect_successful: true,
            mode: Mode::Select,
            pointer_active: false,
            stroke_canvas: Vec::new(),
            stroke_screen: Vec::new(),
            viewport: None,
            shaper: Box::new(PolylineShaper),
            next_id: 0,
        }
    }

    pub fn with_shaper(mut self, shaper: Box<dyn StrokeShaper>) -> Self {
        self.shaper = shaper;
        self
    }

    pub fn set_viewport(&mut self, viewport: Box<dyn Viewport>) {
        self.viewport = Some(viewport);
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn diagram_mut(&mut self) -> &mut Diagram {
        &mut self.diagram
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn guides(&self) -> &[HelperGuide] {
        &self.guides
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pending_connection(&self) -> Option<&PendingConnection> {
        self.pending_connection.as_ref()
    }

    /// Live screen-space polyline of the stroke being drawn, for preview.
    pub fn current_stroke_screen(&self) -> &[StrokeSample] {
        &self.stroke_screen
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Applies one batch of framework change events: snap each proposed
    /// position in absolute space, apply it, refresh the helper guides,
    /// then run containment for drag-finished nodes and restore the
    /// containers-first render order.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        let mut guides: Vec<HelperGuide> = Vec::new();
        let mut guide_ids: HashSet<String> = HashSet::new();
        let mut any_dragging = false;
        let mut drag_finished: Vec<String> = Vec::new();

        for change in changes {
            match change {
                NodeChange::Select { id, selected } => self.apply_select(id, *selected),
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => {
                    let Some(node) = self.diagram.node(id) else {
                        log::warn!("position change for unknown node {id}; skipping");
                        continue;
                    };
                    let parent_id = node.parent_id.clone();
                    let size = effective_size(node, &self.config);

                    let proposed =
                        lift_to_absolute(*position, parent_id.as_deref(), &self.diagram.nodes);
                    let result = compute_snap(
                        id,
                        proposed,
                        size,
                        &self.diagram.nodes,
                        *dragging,
                        &self.config,
                    );
                    let stored = lower_from_absolute(
                        result.position,
                        parent_id.as_deref(),
                        &self.diagram.nodes,
                    );
                    if let Some(node) = self.diagram.node_mut(id) {
                        node.position = stored;
                    }

                    if *dragging {
                        any_dragging = true;
                        for guide in result.guides {
                            if guide_ids.insert(guide.id.clone()) {
                                guides.push(guide);
                            }
                        }
                    } else {
                        drag_finished.push(id.clone());
                    }
                }
            }
        }

        self.guides = if any_dragging { guides } else { Vec::new() };

        if !drag_finished.is_empty() {
            for id in &drag_finished {
                containment::resolve_drop(&mut self.diagram, id, &self.config);
            }
            self.diagram.sort_containers_first();
        }
    }

    fn apply_select(&mut self, id: &str, selected: bool) {
        if selected {
            if self.diagram.node(id).is_none() {
                log::warn!("select change for unknown node {id}; skipping");
                return;
            }
            for node in &mut self.diagram.nodes {
                node.selected = node.id == id;
            }
            self.selected_node = Some(id.to_string());
        } else {
            if let Some(node) = self.diagram.node_mut(id) {
                node.selected = false;
            }
            if self.selected_node.as_deref() == Some(id) {
                self.selected_node = None;
            }
        }
    }

    /// Connection requests never create an edge directly; the pair is held
    /// until an edge kind is chosen.
    pub fn request_connection(&mut self, source: &str, target: &str) -> Result<(), EditorError> {
        if self.diagram.node(source).is_none() {
            return Err(EditorError::UnknownNode(source.to_string()));
        }
        if self.diagram.node(target).is_none() {
            return Err(EditorError::UnknownNode(target.to_string()));
        }
        self.pending_connection = Some(PendingConnection {
            source: source.to_string(),
            target: target.to_string(),
        });
        Ok(())
    }

    /// Completes the pending connection with the chosen edge kind and its
    /// default label. Returns the new edge's id.
    pub fn choose_edge_kind(&mut self, kind: EdgeKind) -> Result<String, EditorError> {
        let pending = self
            .pending_connection
            .take()
            .ok_or(EditorError::NoPendingConnection)?;
        let id = self.fresh_id("edge");
        self.diagram.add_edge(Edge {
            id: id.clone(),
            source: pending.source,
            target: pending.target,
            kind,
            data: EdgeData::for_kind(kind),
        });
        Ok(id)
    }

    pub fn cancel_connection(&mut self) {
        self.pending_connection = None;
    }

    pub fn on_reconnect_start(&mut self) {
        self.reconnect_successful = false;
    }

    /// Successful reconnect callback: rewires the edge to its new
    /// endpoints and marks the in-flight reconnection as landed.
    pub fn on_reconnect(&mut self, edge_id: &str, source: &str, target: &str) {
        if let Some(edge) = self.diagram.edges.iter_mut().find(|e| e.id == edge_id) {
            edge.source = source.to_string();
            edge.target = target.to_string();
        } else {
            log::warn!("reconnect success for unknown edge {edge_id}");
        }
        self.reconnect_successful = true;
    }

    /// A reconnection that ends without a success callback deletes the
    /// edge instead of leaving it dangling.
    pub fn on_reconnect_end(&mut self, edge_id: &str) {
        if !self.reconnect_successful {
            self.diagram.remove_edge(edge_id);
        }
        self.reconnect_successful = true;
    }

    /// Deletes the selected node, cascading to its incident edges.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_node.take() else {
            return false;
        };
        self.diagram.remove_node(&id)
    }

    pub fn fit_view(&mut self) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.fit_view();
        }
    }

    pub fn reorganize_groups(&mut self) {
        layout::pack_containers(&mut self.diagram, &self.config);
    }

    pub fn reorganize_all(&mut self) {
        layout::layout_all(&mut self.diagram, &self.config);
    }

    pub fn toggle_draw_mode(&mut self) {
        self.mode = if self.mode == Mode::Draw {
            Mode::Select
        } else {
            Mode::Draw
        };
        self.clear_stroke();
    }

    pub fn toggle_erase_mode(&mut self) {
        self.mode = if self.mode == Mode::Erase {
            Mode::Select
        } else {
            Mode::Erase
        };
        self.clear_stroke();
    }

    fn clear_stroke(&mut self) {
        self.pointer_active = false;
        self.stroke_canvas.clear();
        self.stroke_screen.clear();
    }

    fn to_canvas(&self, screen: ScreenPoint) -> AbsolutePoint {
        match &self.viewport {
            Some(viewport) => viewport.screen_to_canvas(screen),
            None => AbsolutePoint {
                x: screen.x,
                y: screen.y,
            },
        }
    }

    pub fn pointer_down(&mut self, screen: ScreenPoint) {
        match self.mode {
            Mode::Select => {}
            Mode::Erase => {
                self.pointer_active = true;
                let point = self.to_canvas(screen);
                self.erase_at(point);
            }
            Mode::Draw => {
                self.pointer_active = true;
                self.push_sample(screen);
            }
        }
    }

    pub fn pointer_move(&mut self, screen: ScreenPoint) {
        if !self.pointer_active {
            return;
        }
        match self.mode {
            Mode::Select => {}
            Mode::Erase => {
                let point = self.to_canvas(screen);
                self.erase_at(point);
            }
            Mode::Draw => self.push_sample(screen),
        }
    }

    /// Finishes a stroke. Strokes with fewer than two samples are
    /// discarded; otherwise a freehand-drawing node is created at the
    /// stroke's bounding box and its id returned.
    pub fn pointer_up(&mut self) -> Option<String> {
        if !self.pointer_active {
            return None;
        }
        self.pointer_active = false;

        if self.mode != Mode::Draw {
            self.clear_stroke();
            return None;
        }

        let samples = std::mem::take(&mut self.stroke_canvas);
        self.stroke_screen.clear();
        if samples.len() < 2 {
            return None;
        }

        let bounds = stroke_bounds(&samples, self.config.drawing.min_size);
        let outline = self.shaper.outline(&samples);
        let svg_path = svg_path_from_outline(&outline, &bounds);
        if svg_path.is_empty() {
            return None;
        }

        let id = self.fresh_id("drawing");
        let mut node = Node::new(
            id.clone(),
            NodeData::Drawing {
                svg_path,
                original_width: bounds.width,
                original_height: bounds.height,
                stroke_color: "#000000".to_string(),
                fill_color: "#000000".to_string(),
            },
            Point::new(bounds.x, bounds.y),
        );
        node.width = Some(bounds.width);
        node.height = Some(bounds.height);
        self.diagram.add_node(node);
        Some(id)
    }

    fn push_sample(&mut self, screen: ScreenPoint) {
        let canvas = self.to_canvas(screen);
        let pressure = self.config.drawing.pressure;
        self.stroke_canvas.push(StrokeSample {
            x: canvas.x,
            y: canvas.y,
            pressure,
        });
        self.stroke_screen.push(StrokeSample {
            x: screen.x,
            y: screen.y,
            pressure,
        });
    }

    fn erase_at(&mut self, point: AbsolutePoint) {
        let hit = self
            .diagram
            .nodes
            .iter()
            .find(|n| {
                n.kind() == NodeKind::Drawing
                    && absolute_rect(n, &self.diagram.nodes, &self.config).contains(point)
            })
            .map(|n| n.id.clone());
        if let Some(id) = hit {
            self.diagram.remove_node(&id);
            if self.selected_node.as_deref() == Some(&id) {
                self.selected_node = None;
            }
        }
    }
}

/// Bounding box of the captured samples, clamped to a minimum extent so
/// degenerate strokes still produce a usable node.
fn stroke_bounds(samples: &[StrokeSample], min_size: f32) -> Rect {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for sample in samples {
        min_x = min_x.min(sample.x);
        min_y = min_y.min(sample.y);
        max_x = max_x.max(sample.x);
        max_y = max_y.max(sample.y);
    }
    Rect {
        x: min_x,
        y: min_y,
        width: (max_x - min_x).max(min_size),
        height: (max_y - min_y).max(min_size),
    }
}

/// Builds a closed SVG path from the outline, with coordinates relative to
/// the stroke's bounding box.
fn svg_path_from_outline(outline: &[(f32, f32)], bounds: &Rect) -> String {
    let mut path = String::new();
    for (i, (x, y)) in outline.iter().enumerate() {
        let x = x - bounds.x;
        let y = y - bounds.y;
        if i == 0 {
            path.push_str(&format!("M {x} {y}"));
        } else {
            path.push_str(&format!(" L {x} {y}"));
        }
    }
    if !path.is_empty() {
        path.push_str(" Z");
    }
    path
}
