//! Canvas document model
//!
//! A canvas is a JSON document holding an ordered list of nodes and an
//! ordered list of edges. Nodes and edges keep their JSON objects exactly as
//! read and expose the handful of fields this crate cares about through
//! accessors, so values it does not understand (an unusual `fromSide`,
//! fractional or quoted geometry, extra keys) are written back untouched.
//! Top-level keys other than `nodes` and `edges` are kept in `extra`.
//!
//! # Modules
//!
//! - `ids`: identifier generation
//! - `store`: parsing, serialization and loading from disk
//! - `slot`: the blank-slot finder
//! - `mutate`: fill / create-and-append

pub mod ids;
pub mod mutate;
pub mod slot;
pub mod store;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use ids::{IdSource, RandomIds, SequentialIds};
pub use mutate::{GraphMutator, Mutation, QaEntry};
pub use slot::{Slot, find_slot};
pub use store::{CanvasStore, Loaded, MalformedPolicy};

/// Node type tag for text cards
pub const TEXT_NODE: &str = "text";

/// Whether a text or label counts as blank (absent, empty or whitespace)
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

// Null counts as absent; any non-string value counts as content.
fn is_blank_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Read a coordinate leniently: integers as is, fractions rounded, numeric
/// strings parsed. Out-of-range values saturate.
fn coordinate(value: Option<&Value>) -> Option<i64> {
    let as_float = |f: f64| f.is_finite().then(|| f.round() as i64);
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(as_float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(as_float))
        }
        _ => None,
    }
}

/// A canvas document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<Node>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<Edge>,

    /// Top-level fields unknown to qcanvas
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Canvas {
    /// Create an empty canvas
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == Some(id))
    }

    /// Look up an edge by id
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id() == Some(id))
    }

    /// Whether any node or edge already uses `id`
    pub fn contains_id(&self, id: &str) -> bool {
        self.node(id).is_some() || self.edge(id).is_some()
    }

    /// Largest `y` across all nodes, 0 for an empty canvas
    ///
    /// A node whose `y` is missing or unreadable counts as 0.
    pub fn max_y(&self) -> i64 {
        self.nodes
            .iter()
            .map(|n| n.y().unwrap_or(0))
            .max()
            .unwrap_or(0)
    }

    /// Last node in document order
    pub fn last_node(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// A box on the canvas, kept as its JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node {
    fields: Map<String, Value>,
}

impl Node {
    /// Create a text node
    pub fn new_text(
        id: impl Into<String>,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        text: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.into()));
        fields.insert("x".to_string(), x.into());
        fields.insert("y".to_string(), y.into());
        fields.insert("width".to_string(), width.into());
        fields.insert("height".to_string(), height.into());
        fields.insert("type".to_string(), TEXT_NODE.into());
        fields.insert("text".to_string(), Value::String(text.into()));
        Self { fields }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// The `type` tag, if present
    pub fn kind(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.fields.get("text").and_then(Value::as_str)
    }

    pub fn x(&self) -> Option<i64> {
        coordinate(self.fields.get("x"))
    }

    pub fn y(&self) -> Option<i64> {
        coordinate(self.fields.get("y"))
    }

    pub fn width(&self) -> Option<i64> {
        coordinate(self.fields.get("width"))
    }

    pub fn height(&self) -> Option<i64> {
        coordinate(self.fields.get("height"))
    }

    /// Raw value of any field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A node is blank when its text is absent, null, empty or whitespace only
    pub fn is_blank(&self) -> bool {
        is_blank_value(self.fields.get("text"))
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.fields
            .insert("text".to_string(), Value::String(text.into()));
    }

    pub fn set_size(&mut self, width: i64, height: i64) {
        self.fields.insert("width".to_string(), width.into());
        self.fields.insert("height".to_string(), height.into());
    }
}

/// Which side of a node an edge attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed connection between two nodes, kept as its JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Edge {
    fields: Map<String, Value>,
}

impl Edge {
    /// Create an edge between two nodes
    pub fn new(
        id: impl Into<String>,
        from_node: impl Into<String>,
        from_side: Side,
        to_node: impl Into<String>,
        to_side: Side,
        label: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.into()));
        fields.insert("fromNode".to_string(), Value::String(from_node.into()));
        fields.insert("fromSide".to_string(), from_side.as_str().into());
        fields.insert("toNode".to_string(), Value::String(to_node.into()));
        fields.insert("toSide".to_string(), to_side.as_str().into());
        fields.insert("label".to_string(), Value::String(label.into()));
        Self { fields }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    pub fn from_node(&self) -> Option<&str> {
        self.fields.get("fromNode").and_then(Value::as_str)
    }

    pub fn to_node(&self) -> Option<&str> {
        self.fields.get("toNode").and_then(Value::as_str)
    }

    /// `fromSide` as written, including values other than the four sides
    pub fn from_side(&self) -> Option<&str> {
        self.fields.get("fromSide").and_then(Value::as_str)
    }

    pub fn to_side(&self) -> Option<&str> {
        self.fields.get("toSide").and_then(Value::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.fields.get("label").and_then(Value::as_str)
    }

    /// Raw value of any field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// An edge is blank when its label is absent, null, empty or whitespace only
    pub fn is_blank(&self) -> bool {
        is_blank_value(self.fields.get("label"))
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.fields
            .insert("label".to_string(), Value::String(label.into()));
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
