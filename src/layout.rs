use std::collections::HashSet;

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use crate::config::EditorConfig;
use crate::geometry::{Point, effective_size};
use crate::model::Diagram;

/// Repacks a container's direct children into a single row or column and
/// resizes the container to fit. Orientation follows the container's
/// current aspect ratio; children keep their visual order along the flow
/// axis. Deterministic and idempotent for unchanged children.
pub fn pack_container(diagram: &mut Diagram, container_id: &str, config: &EditorConfig) {
    let Some(container) = diagram.node(container_id) else {
        return;
    };
    if !container.is_container() {
        return;
    }
    let (container_w, container_h) = effective_size(container, config);
    let horizontal = container_w > container_h;

    struct Child {
        id: String,
        width: f32,
        height: f32,
        flow_pos: f32,
    }

    let mut children: Vec<Child> = diagram
        .children_of(container_id)
        .map(|n| {
            let (width, height) = effective_size(n, config);
            Child {
                id: n.id.clone(),
                width,
                height,
                flow_pos: if horizontal { n.position.x } else { n.position.y },
            }
        })
        .collect();
    if children.is_empty() {
        return;
    }
    children.sort_by(|a, b| a.flow_pos.total_cmp(&b.flow_pos));

    let pack = &config.pack;
    let max_width = children.iter().map(|c| c.width).fold(0.0_f32, f32::max);
    let max_height = children.iter().map(|c| c.height).fold(0.0_f32, f32::max);
    let total_width: f32 = children.iter().map(|c| c.width).sum();
    let total_height: f32 = children.iter().map(|c| c.height).sum();
    let total_spacing = (children.len() as f32 - 1.0) * pack.spacing;

    let (new_width, new_height);
    if horizontal {
        new_width = total_width + total_spacing + 2.0 * pack.side_margin;
        new_height = max_height + pack.top_margin + pack.bottom_margin;

        let mut cursor = pack.side_margin;
        for child in &children {
            let y = pack.top_margin + (max_height - child.height) / 2.0;
            if let Some(node) = diagram.node_mut(&child.id) {
                node.position = Point::new(cursor, y);
            }
            cursor += child.width + pack.spacing;
        }
    } else {
        new_width = max_width + 2.0 * pack.side_margin;
        new_height = total_height + total_spacing + pack.top_margin + pack.bottom_margin;

        let mut cursor = pack.top_margin;
        for child in &children {
            let x = pack.side_margin + (max_width - child.width) / 2.0;
            if let Some(node) = diagram.node_mut(&child.id) {
                node.position = Point::new(x, cursor);
            }
            cursor += child.height + pack.spacing;
        }
    }

    if let Some(container) = diagram.node_mut(container_id) {
        container.width = Some(new_width);
        container.height = Some(new_height);
    }
}

/// Runs [`pack_container`] on every container, independently.
pub fn pack_containers(diagram: &mut Diagram, config: &EditorConfig) {
    let container_ids: Vec<String> = diagram
        .nodes
        .iter()
        .filter(|n| n.is_container())
        .map(|n| n.id.clone())
        .collect();
    for id in &container_ids {
        pack_container(diagram, id, config);
    }
}

/// Full-diagram layout: packs every container, then arranges the
/// top-level nodes with a layered directed-graph layout driven by the
/// edges whose endpoints are both top-level. Re-applies the
/// containers-first render order afterwards.
pub fn layout_all(diagram: &mut Diagram, config: &EditorConfig) {
    pack_containers(diagram, config);

    let top_level_ids: Vec<String> = diagram.top_level().map(|n| n.id.clone()).collect();
    if !top_level_ids.is_empty() {
        assign_positions_layered(diagram, &top_level_ids, config);
    }

    diagram.sort_containers_first();
}

fn assign_positions_layered(
    diagram: &mut Diagram,
    layout_node_ids: &[String],
    config: &EditorConfig,
) -> bool {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some("TB".to_string());
    graph_config.align = Some("UL".to_string());
    graph_config.nodesep = Some(config.graph.node_spacing);
    graph_config.ranksep = Some(config.graph.rank_spacing);
    graph_config.marginx = Some(config.graph.margin_x);
    graph_config.marginy = Some(config.graph.margin_y);
    dagre_graph.set_graph(graph_config);

    for node_id in layout_node_ids {
        let Some(node) = diagram.node(node_id) else {
            continue;
        };
        let (width, height) = effective_size(node, config);
        let mut dagre_node = DagreNode::default();
        dagre_node.width = width;
        dagre_node.height = height;
        dagre_graph.set_node(node_id.clone(), Some(dagre_node));
    }

    let layout_set: HashSet<&str> = layout_node_ids.iter().map(String::as_str).collect();
    let mut edge_set: HashSet<(String, String)> = HashSet::new();
    for edge in &diagram.edges {
        // Edges with an endpoint inside a container do not influence
        // top-level placement.
        if !layout_set.contains(edge.source.as_str()) || !layout_set.contains(edge.target.as_str())
        {
            continue;
        }
        let from = edge.source.clone();
        let to = edge.target.clone();
        if !edge_set.insert((from.clone(), to.clone())) {
            continue;
        }
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(&from, &to, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut applied = false;
    for node_id in layout_node_ids {
        let Some(dagre_node) = dagre_graph.node(node_id) else {
            continue;
        };
        let (x, y) = (dagre_node.x, dagre_node.y);
        if let Some(node) = diagram.node_mut(node_id) {
            let (width, height) = effective_size(node, config);
            // dagre reports node centers; stored positions are top-left.
            node.position = Point::new(x - width / 2.0, y - height / 2.0);
            applied = true;
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeKind, Node, NodeData};

    fn group(id: &str, w: f32, h: f32) -> Node {
        Node::new(id, NodeData::Group { label: None }, Point::default()).with_size(w, h)
    }

    fn child(id: &str, parent: &str, x: f32, y: f32, w: f32, h: f32) -> Node {
        Node::new(id, NodeData::Component {
            label: id.to_string(),
            component_type: crate::model::ComponentType::Service,
        }, Point::new(x, y))
        .with_parent(parent)
        .with_size(w, h)
    }

    fn plain(id: &str) -> Node {
        Node::new(id, NodeData::Default { label: id.to_string() }, Point::default())
            .with_size(150.0, 40.0)
    }

    #[test]
    fn horizontal_packing_matches_reference_dimensions() {
        let mut diagram = Diagram::new();
        diagram.add_node(group("g", 200.0, 100.0));
        diagram.add_node(child("c1", "g", 0.0, 0.0, 50.0, 20.0));
        diagram.add_node(child("c2", "g", 10.0, 0.0, 60.0, 20.0));
        diagram.add_node(child("c3", "g", 20.0, 0.0, 40.0, 20.0));

        pack_container(&mut diagram, "g", &EditorConfig::default());

        let container = diagram.node("g").unwrap();
        // 50 + 60 + 40 + 2 gaps of 10 + 2 side margins of 10.
        assert_eq!(container.width, Some(190.0));
        // 20 + top 40 + bottom 10.
        assert_eq!(container.height, Some(70.0));

        assert_eq!(diagram.node("c1").unwrap().position, Point::new(10.0, 40.0));
        assert_eq!(diagram.node("c2").unwrap().position, Point::new(70.0, 40.0));
        assert_eq!(diagram.node("c3").unwrap().position, Point::new(140.0, 40.0));
    }

    #[test]
    fn vertical_packing_centers_on_widest_child() {
        let mut diagram = Diagram::new();
        diagram.add_node(group("g", 100.0, 300.0));
        diagram.add_node(child("c1", "g", 0.0, 50.0, 80.0, 30.0));
        diagram.add_node(child("c2", "g", 0.0, 10.0, 40.0, 20.0));

        pack_container(&mut diagram, "g", &EditorConfig::default());

        let container = diagram.node("g").unwrap();
        assert_eq!(container.width, Some(100.0)); // 80 + 2 * 10
        assert_eq!(container.height, Some(110.0)); // 20 + 30 + 10 + 40 + 10

        // c2 was above c1, so it packs first; narrow child is centered.
        assert_eq!(diagram.node("c2").unwrap().position, Point::new(30.0, 40.0));
        assert_eq!(diagram.node("c1").unwrap().position, Point::new(10.0, 70.0));
    }

    #[test]
    fn packing_is_idempotent() {
        let mut diagram = Diagram::new();
        diagram.add_node(group("g", 200.0, 100.0));
        diagram.add_node(child("c1", "g", 5.0, 0.0, 50.0, 20.0));
        diagram.add_node(child("c2", "g", 80.0, 0.0, 60.0, 25.0));

        let config = EditorConfig::default();
        pack_container(&mut diagram, "g", &config);
        let first = diagram.clone();
        pack_container(&mut diagram, "g", &config);

        for (a, b) in first.nodes.iter().zip(diagram.nodes.iter()) {
            assert_eq!(a.position, b.position, "node {} moved on repack", a.id);
            assert_eq!(a.width, b.width);
            assert_eq!(a.height, b.height);
        }
    }

    #[test]
    fn empty_container_is_left_untouched() {
        let mut diagram = Diagram::new();
        diagram.add_node(group("g", 200.0, 100.0));
        pack_container(&mut diagram, "g", &EditorConfig::default());
        let container = diagram.node("g").unwrap();
        assert_eq!(container.width, Some(200.0));
        assert_eq!(container.height, Some(100.0));
    }

    #[test]
    fn layered_layout_ranks_connected_chain_top_down() {
        let mut diagram = Diagram::new();
        diagram.add_node(plain("a"));
        diagram.add_node(plain("b"));
        diagram.add_node(plain("c"));
        diagram.add_edge(Edge::new("e1", "a", "b", EdgeKind::Api));
        diagram.add_edge(Edge::new("e2", "b", "c", EdgeKind::Api));

        layout_all(&mut diagram, &EditorConfig::default());

        let ya = diagram.node("a").unwrap().position.y;
        let yb = diagram.node("b").unwrap().position.y;
        let yc = diagram.node("c").unwrap().position.y;
        assert!(ya < yb, "a should rank above b ({ya} vs {yb})");
        assert!(yb < yc, "b should rank above c ({yb} vs {yc})");
    }

    #[test]
    fn edges_into_containers_do_not_affect_top_level_layout() {
        let mut diagram = Diagram::new();
        diagram.add_node(group("g", 200.0, 100.0));
        diagram.add_node(child("inner", "g", 0.0, 0.0, 50.0, 20.0));
        diagram.add_node(plain("a"));
        diagram.add_node(plain("b"));
        diagram.add_edge(Edge::new("e1", "a", "b", EdgeKind::Api));
        // One endpoint nested: excluded from the layout graph.
        diagram.add_edge(Edge::new("e2", "a", "inner", EdgeKind::Mq));

        layout_all(&mut diagram, &EditorConfig::default());

        let ya = diagram.node("a").unwrap().position.y;
        let yb = diagram.node("b").unwrap().position.y;
        assert!(ya < yb);
        // Nested child keeps a container-relative position.
        assert_eq!(diagram.node("inner").unwrap().parent_id.as_deref(), Some("g"));
    }

    #[test]
    fn layout_all_keeps_containers_first() {
        let mut diagram = Diagram::new();
        diagram.add_node(plain("a"));
        diagram.add_node(group("g", 200.0, 100.0));
        diagram.add_node(child("inner", "g", 0.0, 0.0, 50.0, 20.0));

        layout_all(&mut diagram, &EditorConfig::default());

        let first_non_container = diagram
            .nodes
            .iter()
            .position(|n| !n.is_container())
            .unwrap();
        assert!(
            diagram.nodes[first_non_container..]
                .iter()
                .all(|n| !n.is_container()),
            "containers must form a prefix of the collection"
        );
    }
}
