use crate::config::EditorConfig;
use crate::geometry::{AbsolutePoint, Rect, absolute_position, effective_size};
use crate::model::Diagram;

/// Decides container membership for a node that just finished dragging.
///
/// The node's absolute center is tested against every container's strict
/// interior; the first container in collection order wins. Entering a
/// container rewrites the position relative to it, leaving one promotes
/// the position back to absolute. Containers themselves never become
/// children of other containers, so a dragged container is left alone.
///
/// Returns true when the node was reparented either way.
pub fn resolve_drop(diagram: &mut Diagram, node_id: &str, config: &EditorConfig) -> bool {
    let Some(node) = diagram.node(node_id) else {
        log::warn!("containment skipped: node {node_id} not found in collection");
        return false;
    };
    if node.is_container() {
        return false;
    }

    let absolute = absolute_position(node, &diagram.nodes);
    let (width, height) = effective_size(node, config);
    let center = AbsolutePoint {
        x: absolute.x + width / 2.0,
        y: absolute.y + height / 2.0,
    };
    let current_parent = node.parent_id.clone();

    let target = diagram
        .nodes
        .iter()
        .find(|candidate| {
            if !candidate.is_container() || candidate.id == node_id {
                return false;
            }
            let (cw, ch) = effective_size(candidate, config);
            let rect = Rect {
                x: candidate.position.x,
                y: candidate.position.y,
                width: cw,
                height: ch,
            };
            rect.contains_interior(center)
        })
        .map(|container| (container.id.clone(), container.position));

    match target {
        Some((container_id, container_pos)) => {
            if current_parent.as_deref() == Some(container_id.as_str()) {
                return false;
            }
            if let Some(node) = diagram.node_mut(node_id) {
                node.parent_id = Some(container_id);
                node.position = AbsolutePoint {
                    x: absolute.x - container_pos.x,
                    y: absolute.y - container_pos.y,
                }
                .into();
            }
            true
        }
        None => {
            if current_parent.is_none() {
                return false;
            }
            if let Some(node) = diagram.node_mut(node_id) {
                node.parent_id = None;
                node.position = absolute.into();
            }
            true
        }
    }
}
