use std::collections::HashSet;

use crate::config::EditorConfig;
use crate::geometry::{AbsolutePoint, Rect, absolute_rect};
use crate::model::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// A transient alignment line shown while a node is dragged. Recomputed
/// from scratch every pointer move, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperGuide {
    pub id: String,
    pub orientation: Orientation,
    /// The shared x (vertical) or y (horizontal) coordinate.
    pub fixed: f32,
    /// Perpendicular extents to draw the line between.
    pub span: (f32, f32),
}

#[derive(Debug, Clone)]
pub struct SnapResult {
    pub position: AbsolutePoint,
    pub snapped_x: bool,
    pub snapped_y: bool,
    pub guides: Vec<HelperGuide>,
}

/// One anchor comparison: the dragging box's anchor, the candidate's
/// anchor, the x/y that would make them coincide, and the pair label used
/// in guide ids.
type AnchorCheck = (f32, f32, f32, &'static str);

fn x_checks(drag: &Rect, target: &Rect) -> [AnchorCheck; 5] {
    [
        (drag.left(), target.left(), target.left(), "left-left"),
        (
            drag.right(),
            target.right(),
            target.right() - drag.width,
            "right-right",
        ),
        (
            drag.center_x(),
            target.center_x(),
            target.center_x() - drag.width / 2.0,
            "center-center-x",
        ),
        (drag.left(), target.right(), target.right(), "left-right"),
        (
            drag.right(),
            target.left(),
            target.left() - drag.width,
            "right-left",
        ),
    ]
}

fn y_checks(drag: &Rect, target: &Rect) -> [AnchorCheck; 5] {
    [
        (drag.top(), target.top(), target.top(), "top-top"),
        (
            drag.bottom(),
            target.bottom(),
            target.bottom() - drag.height,
            "bottom-bottom",
        ),
        (
            drag.center_y(),
            target.center_y(),
            target.center_y() - drag.height / 2.0,
            "center-center-y",
        ),
        (drag.top(), target.bottom(), target.bottom(), "top-bottom"),
        (
            drag.bottom(),
            target.top(),
            target.top() - drag.height,
            "bottom-top",
        ),
    ]
}

/// Snaps a proposed drag position against every non-container sibling and,
/// while the drag is active, derives the alignment guides to display.
///
/// Matching is strict (`distance < threshold`) and first-match-wins per
/// axis in collection order, then check order. Guides are computed from
/// the already-snapped position and emitted for every matching pair, not
/// just the winner, deduplicated by dragging id, candidate id and pair
/// label.
pub fn compute_snap(
    dragging_id: &str,
    proposed: AbsolutePoint,
    size: (f32, f32),
    nodes: &[Node],
    dragging: bool,
    config: &EditorConfig,
) -> SnapResult {
    let threshold = config.snap.threshold;
    let (width, height) = size;
    let drag_rect = Rect {
        x: proposed.x,
        y: proposed.y,
        width,
        height,
    };

    let mut snapped = proposed;
    let mut snapped_x = false;
    let mut snapped_y = false;

    for node in nodes {
        if node.id == dragging_id || node.is_container() {
            continue;
        }
        let target = absolute_rect(node, nodes, config);

        for (origin, anchor, snap_to, _) in x_checks(&drag_rect, &target) {
            if (origin - anchor).abs() < threshold && !snapped_x {
                snapped.x = snap_to;
                snapped_x = true;
            }
        }
        for (origin, anchor, snap_to, _) in y_checks(&drag_rect, &target) {
            if (origin - anchor).abs() < threshold && !snapped_y {
                snapped.y = snap_to;
                snapped_y = true;
            }
        }
    }

    let mut guides = Vec::new();
    if dragging {
        let snapped_rect = Rect {
            x: snapped.x,
            y: snapped.y,
            width,
            height,
        };
        let mut seen: HashSet<String> = HashSet::new();

        for node in nodes {
            if node.id == dragging_id || node.is_container() {
                continue;
            }
            let target = absolute_rect(node, nodes, config);

            for (origin, anchor, _, label) in x_checks(&snapped_rect, &target) {
                if (origin - anchor).abs() < threshold {
                    let id = format!("v-{dragging_id}-{}-{label}", node.id);
                    if seen.insert(id.clone()) {
                        let lo = snapped_rect
                            .top()
                            .min(target.top())
                            .min(snapped_rect.bottom())
                            .min(target.bottom());
                        let hi = snapped_rect
                            .top()
                            .max(target.top())
                            .max(snapped_rect.bottom())
                            .max(target.bottom());
                        guides.push(HelperGuide {
                            id,
                            orientation: Orientation::Vertical,
                            fixed: anchor,
                            span: (lo, hi),
                        });
                    }
                }
            }
            for (origin, anchor, _, label) in y_checks(&snapped_rect, &target) {
                if (origin - anchor).abs() < threshold {
                    let id = format!("h-{dragging_id}-{}-{label}", node.id);
                    if seen.insert(id.clone()) {
                        let lo = snapped_rect
                            .left()
                            .min(target.left())
                            .min(snapped_rect.right())
                            .min(target.right());
                        let hi = snapped_rect
                            .left()
                            .max(target.left())
                            .max(snapped_rect.right())
                            .max(target.right());
                        guides.push(HelperGuide {
                            id,
                            orientation: Orientation::Horizontal,
                            fixed: anchor,
                            span: (lo, hi),
                        });
                    }
                }
            }
        }
    }

    SnapResult {
        position: snapped,
        snapped_x,
        snapped_y,
        guides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::NodeData;

    fn node(id: &str, x: f32, y: f32, w: f32, h: f32) -> Node {
        Node::new(id, NodeData::Default { label: id.to_string() }, Point::new(x, y))
            .with_size(w, h)
    }

    fn snap_at(x: f32, y: f32, nodes: &[Node], dragging: bool) -> SnapResult {
        compute_snap(
            "n1",
            AbsolutePoint { x, y },
            (100.0, 40.0),
            nodes,
            dragging,
            &EditorConfig::default(),
        )
    }

    #[test]
    fn snaps_strictly_inside_tolerance() {
        let nodes = vec![node("n1", 0.0, 0.0, 100.0, 40.0), node("n2", 103.0, 0.0, 100.0, 40.0)];

        // Far away: no anchor pair within tolerance.
        let result = snap_at(400.0, 300.0, &nodes, false);
        assert!(!result.snapped_x);
        assert_eq!(result.position.x, 400.0);

        // Exactly at the threshold: still no match.
        let result = snap_at(98.0, 300.0, &nodes, false);
        assert!(!result.snapped_x);
        assert_eq!(result.position.x, 98.0);

        // One unit closer: snaps left edge to left edge.
        let result = snap_at(99.0, 300.0, &nodes, false);
        assert!(result.snapped_x);
        assert_eq!(result.position.x, 103.0);
    }

    #[test]
    fn snap_emits_vertical_guide_at_shared_x() {
        let nodes = vec![node("n1", 0.0, 0.0, 100.0, 40.0), node("n2", 103.0, 0.0, 100.0, 40.0)];
        let result = snap_at(99.0, 300.0, &nodes, true);
        assert_eq!(result.position.x, 103.0);
        let verticals: Vec<&HelperGuide> = result
            .guides
            .iter()
            .filter(|g| g.orientation == Orientation::Vertical)
            .collect();
        assert!(!verticals.is_empty());
        let left_left = verticals
            .iter()
            .find(|g| g.id.ends_with("left-left"))
            .expect("left-left guide");
        assert_eq!(left_left.fixed, 103.0);
        // Span covers both boxes' vertical extents.
        assert_eq!(left_left.span, (0.0, 340.0));
    }

    #[test]
    fn first_match_wins_not_closest() {
        // n2's left edge is 4 away from the drag's left; n3's left edge is
        // only 1 away, but n2 comes first in collection order.
        let nodes = vec![
            node("n1", 0.0, 0.0, 100.0, 40.0),
            node("n2", 104.0, 200.0, 100.0, 40.0),
            node("n3", 101.0, 400.0, 100.0, 40.0),
        ];
        let result = snap_at(100.0, 600.0, &nodes, false);
        assert!(result.snapped_x);
        assert_eq!(result.position.x, 104.0);
    }

    #[test]
    fn container_nodes_are_not_snap_candidates() {
        let mut group = node("g", 103.0, 0.0, 100.0, 40.0);
        group.data = NodeData::Group { label: None };
        let nodes = vec![node("n1", 0.0, 0.0, 100.0, 40.0), group];
        let result = snap_at(99.0, 0.0, &nodes, false);
        assert!(!result.snapped_x);
    }

    #[test]
    fn guides_cover_every_matching_pair_after_snap() {
        // Identical box directly below: after snapping left-left, the
        // right-right and center pairs also coincide and each emits its
        // own guide.
        let nodes = vec![node("n1", 0.0, 0.0, 100.0, 40.0), node("n2", 103.0, 100.0, 100.0, 40.0)];
        let result = snap_at(99.0, 0.0, &nodes, true);
        assert_eq!(result.position.x, 103.0);
        let labels: Vec<&str> = result
            .guides
            .iter()
            .filter(|g| g.orientation == Orientation::Vertical)
            .map(|g| g.id.rsplit("n2-").next().unwrap())
            .collect();
        assert!(labels.contains(&"left-left"));
        assert!(labels.contains(&"right-right"));
        assert!(labels.contains(&"center-center-x"));
    }

    #[test]
    fn no_guides_when_not_dragging() {
        let nodes = vec![node("n1", 0.0, 0.0, 100.0, 40.0), node("n2", 103.0, 0.0, 100.0, 40.0)];
        let result = snap_at(99.0, 0.0, &nodes, false);
        assert!(result.guides.is_empty());
        assert!(result.snapped_x);
    }

    #[test]
    fn axes_snap_independently() {
        let nodes = vec![node("n1", 0.0, 0.0, 100.0, 40.0), node("n2", 103.0, 503.0, 100.0, 40.0)];
        let result = snap_at(99.0, 500.0, &nodes, false);
        assert!(result.snapped_x);
        assert!(result.snapped_y);
        assert_eq!(result.position.x, 103.0);
        assert_eq!(result.position.y, 503.0);
    }
}
