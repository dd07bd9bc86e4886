//! Canvas mutation: fill a blank slot or append a new card
//!
//! New cards form a vertical chain of 800x800 boxes. Each one is placed 150
//! units below the lowest `y` currently on the canvas and connected
//! bottom-to-top from the most recently added node, which is not necessarily
//! the geometrically lowest one.

use serde::Serialize;
use tracing::info;

use super::ids::{IdSource, fresh_id};
use super::slot::{Slot, find_slot};
use super::{Canvas, Edge, Node, Side, is_blank};
use crate::error::{Error, Result};

/// Width and height of every card this crate writes
pub const BOX_SIZE: i64 = 800;

/// Vertical distance between the lowest existing node and a new card
pub const VERTICAL_GAP: i64 = 150;

/// Width and height of the stub root created for an empty canvas
pub const STUB_SIZE: i64 = 1;

/// A validated question/answer pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaEntry {
    question: String,
    answer: String,
}

impl QaEntry {
    /// Validate a pair; both sides must contain something other than whitespace
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Result<Self> {
        let question = question.into();
        let answer = answer.into();

        match (is_blank(Some(&question)), is_blank(Some(&answer))) {
            (true, true) => Err(Error::MissingInput("question and answer are empty".to_string())),
            (true, false) => Err(Error::MissingInput("question is empty".to_string())),
            (false, true) => Err(Error::MissingInput("answer is empty".to_string())),
            (false, false) => Ok(Self { question, answer }),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// What a mutation did to the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    /// An existing blank slot was filled in place
    Filled { node_id: String, edge_id: String },
    /// A new node and edge were appended
    Appended {
        anchor_id: String,
        node_id: String,
        edge_id: String,
        stub_created: bool,
    },
}

impl Mutation {
    /// Id of the node now holding the answer
    pub fn node_id(&self) -> &str {
        match self {
            Self::Filled { node_id, .. } | Self::Appended { node_id, .. } => node_id,
        }
    }

    /// Id of the edge now holding the question
    pub fn edge_id(&self) -> &str {
        match self {
            Self::Filled { edge_id, .. } | Self::Appended { edge_id, .. } => edge_id,
        }
    }
}

/// Applies question/answer entries to a canvas
#[derive(Debug, Clone)]
pub struct GraphMutator<I> {
    ids: I,
}

impl<I: IdSource> GraphMutator<I> {
    pub fn new(ids: I) -> Self {
        Self { ids }
    }

    /// Validate the pair, then fill the first blank slot or append a new card
    ///
    /// On any error the canvas is left untouched.
    pub fn apply(&mut self, canvas: &mut Canvas, question: &str, answer: &str) -> Result<Mutation> {
        let entry = QaEntry::new(question, answer)?;
        self.apply_entry(canvas, &entry)
    }

    /// Fill the first blank slot or append a new card
    pub fn apply_entry(&mut self, canvas: &mut Canvas, entry: &QaEntry) -> Result<Mutation> {
        match find_slot(canvas) {
            Some(slot) => Ok(fill(canvas, slot, entry)),
            None => self.create_and_append(canvas, entry),
        }
    }

    /// Append a new answer node below everything else and link it from the
    /// last node
    ///
    /// A stub root is created first when there is no last node or it has no
    /// usable id. Fails with [`Error::UnsupportedDocument`], without changing
    /// the canvas, when the new card's `y` would not fit in an `i64`.
    pub fn create_and_append(&mut self, canvas: &mut Canvas, entry: &QaEntry) -> Result<Mutation> {
        let anchor = canvas.last_node().and_then(Node::id).map(str::to_string);

        // a stub sits at y = 0, so it can only raise the lowest edge
        let lowest = match anchor {
            Some(_) => canvas.max_y(),
            None => canvas.max_y().max(0),
        };
        let y = lowest.checked_add(VERTICAL_GAP).ok_or_else(|| {
            Error::UnsupportedDocument(format!(
                "no room below the lowest node (y = {}) for a new card",
                lowest
            ))
        })?;

        let (anchor_id, stub_created) = match anchor {
            Some(id) => (id, false),
            None => {
                let id = fresh_id(canvas, &mut self.ids);
                canvas
                    .nodes
                    .push(Node::new_text(id.clone(), 0, 0, STUB_SIZE, STUB_SIZE, ""));
                (id, true)
            }
        };

        let node_id = fresh_id(canvas, &mut self.ids);
        canvas.nodes.push(Node::new_text(
            node_id.clone(),
            0,
            y,
            BOX_SIZE,
            BOX_SIZE,
            entry.answer(),
        ));

        let edge_id = fresh_id(canvas, &mut self.ids);
        canvas.edges.push(Edge::new(
            edge_id.clone(),
            anchor_id.clone(),
            Side::Bottom,
            node_id.clone(),
            Side::Top,
            entry.question(),
        ));

        info!(
            anchor_id = %anchor_id,
            node_id = %node_id,
            edge_id = %edge_id,
            y,
            stub_created,
            "Appended new card"
        );

        Ok(Mutation::Appended {
            anchor_id,
            node_id,
            edge_id,
            stub_created,
        })
    }
}

impl Default for GraphMutator<super::RandomIds> {
    fn default() -> Self {
        Self::new(super::RandomIds)
    }
}

/// Write the answer into the slot's node (resized to a full card) and the
/// question into its edge label
pub fn fill(canvas: &mut Canvas, slot: Slot, entry: &QaEntry) -> Mutation {
    let node = &mut canvas.nodes[slot.node];
    node.set_text(entry.answer());
    node.set_size(BOX_SIZE, BOX_SIZE);
    let node_id = node.id().unwrap_or_default().to_string();

    let edge = &mut canvas.edges[slot.edge];
    edge.set_label(entry.question());
    let edge_id = edge.id().unwrap_or_default().to_string();

    info!(node_id = %node_id, edge_id = %edge_id, "Filled blank slot");

    Mutation::Filled { node_id, edge_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SequentialIds;

    fn mutator() -> GraphMutator<SequentialIds> {
        GraphMutator::new(SequentialIds::new("id"))
    }

    fn entry(q: &str, a: &str) -> QaEntry {
        QaEntry::new(q, a).unwrap()
    }

    fn geometry(node: &Node) -> (i64, i64, i64, i64) {
        (
            node.x().unwrap(),
            node.y().unwrap(),
            node.width().unwrap(),
            node.height().unwrap(),
        )
    }

    #[test]
    fn test_entry_validation() {
        assert!(matches!(QaEntry::new("", "a"), Err(Error::MissingInput(_))));
        assert!(matches!(QaEntry::new("q", " \n"), Err(Error::MissingInput(_))));
        assert!(matches!(QaEntry::new("", ""), Err(Error::MissingInput(_))));
        assert!(QaEntry::new("q", "a").is_ok());
    }

    #[test]
    fn test_append_on_empty_canvas_creates_stub_root() {
        let mut canvas = Canvas::new();
        let mutation = mutator()
            .create_and_append(&mut canvas, &entry("Q1", "A1"))
            .unwrap();

        assert_eq!(canvas.nodes.len(), 2);
        assert_eq!(canvas.edges.len(), 1);

        let stub = &canvas.nodes[0];
        assert_eq!(geometry(stub), (0, 0, 1, 1));
        assert_eq!(stub.text(), Some(""));
        assert_eq!(stub.kind(), Some("text"));

        let target = &canvas.nodes[1];
        assert_eq!(geometry(target), (0, 150, 800, 800));
        assert_eq!(target.text(), Some("A1"));

        let edge = &canvas.edges[0];
        assert_eq!(edge.from_node(), stub.id());
        assert_eq!(edge.to_node(), target.id());
        assert_eq!(edge.from_side(), Some("bottom"));
        assert_eq!(edge.to_side(), Some("top"));
        assert_eq!(edge.label(), Some("Q1"));

        assert_eq!(
            mutation,
            Mutation::Appended {
                anchor_id: "id1".to_string(),
                node_id: "id2".to_string(),
                edge_id: "id3".to_string(),
                stub_created: true,
            }
        );
    }

    #[test]
    fn test_append_anchors_to_last_node_not_lowest() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(Node::new_text("low", 0, 900, 800, 800, "deep"));
        canvas.nodes.push(Node::new_text("last", 500, 100, 800, 800, "recent"));

        let mutation = mutator()
            .create_and_append(&mut canvas, &entry("Q", "A"))
            .unwrap();

        let new_node = canvas.nodes.last().unwrap();
        assert_eq!(new_node.y(), Some(1050));
        assert_eq!(new_node.x(), Some(0));
        assert_eq!(canvas.edges[0].from_node(), Some("last"));
        assert!(matches!(mutation, Mutation::Appended { stub_created: false, .. }));
    }

    #[test]
    fn test_append_growth_with_existing_graph() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(Node::new_text("a", 0, 0, 800, 800, "one"));
        canvas.nodes.push(Node::new_text("b", 0, 150, 800, 800, "two"));
        canvas
            .edges
            .push(Edge::new("e", "a", Side::Bottom, "b", Side::Top, "first"));

        mutator().apply(&mut canvas, "Q", "A").unwrap();

        assert_eq!(canvas.nodes.len(), 3);
        assert_eq!(canvas.edges.len(), 2);
        assert_eq!(canvas.nodes[2].y(), Some(300));
    }

    #[test]
    fn test_append_below_extreme_y_fails_without_mutation() {
        for raw in ["9223372036854775807", "9223372036854775700", "1e300"] {
            let mut canvas: Canvas =
                serde_json::from_str(&format!(r#"{{"nodes":[{{"id":"deep","y":{}}}]}}"#, raw))
                    .unwrap();
            let before = canvas.clone();

            let err = mutator().apply(&mut canvas, "Q", "A").unwrap_err();

            assert!(matches!(err, Error::UnsupportedDocument(_)), "y = {}", raw);
            assert_eq!(canvas, before);
        }
    }

    #[test]
    fn test_append_just_below_limit_succeeds() {
        let mut canvas = Canvas::new();
        let y = i64::MAX - VERTICAL_GAP;
        canvas.nodes.push(Node::new_text("deep", 0, y, 800, 800, "x"));

        mutator().apply(&mut canvas, "Q", "A").unwrap();
        assert_eq!(canvas.nodes[1].y(), Some(i64::MAX));
    }

    #[test]
    fn test_last_node_without_id_gets_stub_anchor() {
        let mut canvas: Canvas =
            serde_json::from_str(r#"{"nodes":[{"type":"group","y":-500}]}"#).unwrap();

        let mutation = mutator().apply(&mut canvas, "Q", "A").unwrap();

        assert!(matches!(mutation, Mutation::Appended { stub_created: true, .. }));
        assert_eq!(canvas.nodes.len(), 3);
        assert_eq!(canvas.nodes[2].y(), Some(150));
        assert_eq!(canvas.edges[0].from_node(), canvas.nodes[1].id());
    }

    #[test]
    fn test_apply_fills_slot_without_growth() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(Node::new_text("n1", 40, 60, 200, 100, ""));
        canvas
            .edges
            .push(Edge::new("e1", "root", Side::Right, "n1", Side::Left, ""));

        let mutation = mutator().apply(&mut canvas, "Q2", "A2").unwrap();

        assert_eq!(
            mutation,
            Mutation::Filled {
                node_id: "n1".to_string(),
                edge_id: "e1".to_string()
            }
        );
        assert_eq!(canvas.nodes.len(), 1);
        assert_eq!(canvas.edges.len(), 1);

        let node = &canvas.nodes[0];
        assert_eq!(node.text(), Some("A2"));
        assert_eq!(geometry(node), (40, 60, 800, 800));
        assert_eq!(canvas.edges[0].label(), Some("Q2"));
        assert_eq!(canvas.edges[0].from_side(), Some("right"));
    }

    #[test]
    fn test_apply_rejects_blank_input_without_mutation() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(Node::new_text("n1", 0, 0, 1, 1, ""));
        canvas
            .edges
            .push(Edge::new("e1", "x", Side::Bottom, "n1", Side::Top, ""));
        let before = canvas.clone();

        let err = mutator().apply(&mut canvas, "Q", "   ").unwrap_err();

        assert!(matches!(err, Error::MissingInput(_)));
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_new_ids_avoid_existing_ones() {
        let mut canvas = Canvas::new();
        canvas.nodes.push(Node::new_text("id1", 0, 0, 1, 1, "taken"));

        mutator().apply(&mut canvas, "Q", "A").unwrap();

        let mut ids: Vec<&str> = canvas
            .nodes
            .iter()
            .filter_map(Node::id)
            .chain(canvas.edges.iter().filter_map(Edge::id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_mutation_accessors() {
        let filled = Mutation::Filled {
            node_id: "n".to_string(),
            edge_id: "e".to_string(),
        };
        assert_eq!(filled.node_id(), "n");
        assert_eq!(filled.edge_id(), "e");

        let json = serde_json::to_value(&filled).unwrap();
        assert_eq!(json["kind"], "filled");
    }
}
