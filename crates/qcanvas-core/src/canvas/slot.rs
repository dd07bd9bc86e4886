//! Blank-slot search
//!
//! A slot is a blank edge pointing at a blank node. Documents can be
//! prepared with empty placeholders ahead of time; they are then filled in
//! edge order, one per commit.

use std::collections::HashMap;

use tracing::debug;

use super::Canvas;

/// Positions of a fillable (node, edge) pair inside a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Index into `Canvas::nodes`
    pub node: usize,
    /// Index into `Canvas::edges`
    pub edge: usize,
}

/// Find the first edge, in edge order, whose label is blank and whose target
/// node is blank
///
/// Edges pointing at ids that do not exist, or at non-blank nodes, are
/// skipped. Nodes without a string id can never be a target. When several
/// blank nodes share an id the first one wins.
pub fn find_slot(canvas: &Canvas) -> Option<Slot> {
    let mut blank_nodes: HashMap<&str, usize> = HashMap::new();
    for (index, node) in canvas.nodes.iter().enumerate() {
        if let Some(id) = node.id().filter(|_| node.is_blank()) {
            blank_nodes.entry(id).or_insert(index);
        }
    }

    if blank_nodes.is_empty() {
        return None;
    }

    let slot = canvas.edges.iter().enumerate().find_map(|(edge, e)| {
        let node = *blank_nodes.get(e.to_node()?)?;
        e.is_blank().then_some(Slot { node, edge })
    });

    if let Some(slot) = slot {
        debug!(
            node_id = canvas.nodes[slot.node].id(),
            edge_id = canvas.edges[slot.edge].id(),
            "Found blank slot"
        );
    }

    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Edge, Node, Side};

    fn blank(id: &str) -> Node {
        Node::new_text(id, 0, 0, 100, 100, "")
    }

    fn edge(id: &str, to: &str, label: &str) -> Edge {
        Edge::new(id, "root", Side::Bottom, to, Side::Top, label)
    }

    #[test]
    fn test_empty_canvas_has_no_slot() {
        assert_eq!(find_slot(&Canvas::new()), None);
    }

    #[test]
    fn test_single_slot() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(blank("n1"));
        canvas.edges.push(edge("e1", "n1", ""));

        assert_eq!(find_slot(&canvas), Some(Slot { node: 0, edge: 0 }));
    }

    #[test]
    fn test_earliest_edge_wins_over_node_order() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(blank("n1"));
        canvas.nodes.push(blank("n2"));
        canvas.edges.push(edge("e-late", "n2", ""));
        canvas.edges.push(edge("e-early", "n1", ""));

        // n2's edge is stored first, so it is chosen even though n1 comes first among nodes
        assert_eq!(find_slot(&canvas), Some(Slot { node: 1, edge: 0 }));
    }

    #[test]
    fn test_labelled_edge_is_skipped() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(blank("n1"));
        canvas.nodes.push(blank("n2"));
        canvas.edges.push(edge("e1", "n1", "already asked"));
        canvas.edges.push(edge("e2", "n2", "  "));

        assert_eq!(find_slot(&canvas), Some(Slot { node: 1, edge: 1 }));
    }

    #[test]
    fn test_filled_target_is_skipped() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(Node::new_text("n1", 0, 0, 1, 1, "answered"));
        canvas.edges.push(edge("e1", "n1", ""));

        assert_eq!(find_slot(&canvas), None);
    }

    #[test]
    fn test_dangling_reference_is_ignored() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(blank("n1"));
        canvas.edges.push(edge("e0", "ghost", ""));
        canvas.edges.push(edge("e1", "n1", ""));

        assert_eq!(find_slot(&canvas), Some(Slot { node: 0, edge: 1 }));
    }

    #[test]
    fn test_non_string_text_or_label_is_content() {
        let canvas: Canvas = serde_json::from_str(
            r#"{"nodes":[{"id":"n1","text":0},{"id":"n2"},{"text":""}],
                "edges":[{"id":"e1","toNode":"n1"},{"id":"e2","toNode":"n2","label":false},
                         {"id":"e3","toNode":"n2","label":null}]}"#,
        )
        .unwrap();

        assert_eq!(find_slot(&canvas), Some(Slot { node: 1, edge: 2 }));
    }

    #[test]
    fn test_duplicate_blank_ids_resolve_to_first() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(blank("dup"));
        canvas.nodes.push(blank("dup"));
        canvas.edges.push(edge("e1", "dup", ""));

        assert_eq!(find_slot(&canvas), Some(Slot { node: 0, edge: 0 }));
    }
}
