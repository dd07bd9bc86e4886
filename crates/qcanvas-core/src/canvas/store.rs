//! Canvas parsing, serialization and loading
//!
//! Loading never writes. A file that is not JSON at all, or whose top level
//! is not an object, is malformed; what happens then is governed by
//! [`MalformedPolicy`]. The default substitutes an empty canvas (the next save
//! then replaces the unreadable content), the strict policy reports
//! [`Error::MalformedDocument`] instead. A JSON object that does not have the
//! canvas shape (`nodes` not being a list, say) is [`Error::UnsupportedDocument`]
//! and is never replaced.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::Canvas;
use crate::error::{Error, Result};

/// What to do with a canvas file that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Start over from an empty canvas
    #[default]
    Recover,
    /// Report the error and leave the file alone
    Fail,
}

impl MalformedPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "recover" => Some(Self::Recover),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recover => "recover",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of loading a canvas from disk
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub canvas: Canvas,
    /// True when the file was unparseable and an empty canvas was substituted
    pub recovered: bool,
}

/// Parse canvas text
///
/// Syntax errors and non-object roots give [`Error::MalformedDocument`];
/// an object with `nodes` or `edges` of the wrong shape gives
/// [`Error::UnsupportedDocument`].
pub fn parse(text: &str) -> Result<Canvas> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::MalformedDocument(e.to_string()))?;

    if !value.is_object() {
        return Err(Error::MalformedDocument(format!(
            "expected a JSON object at the top level, found {}",
            kind_of(&value)
        )));
    }

    serde_json::from_value(value).map_err(|e| Error::UnsupportedDocument(e.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Encode a canvas as pretty-printed JSON
pub fn serialize(canvas: &Canvas) -> Result<String> {
    serde_json::to_string_pretty(canvas).map_err(|e| Error::Serialization(e.to_string()))
}

/// Reads canvas files according to a malformed-content policy
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasStore {
    policy: MalformedPolicy,
}

impl CanvasStore {
    pub fn new(policy: MalformedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    /// Load the canvas stored at `path`
    ///
    /// I/O failures and unsupported documents are always reported; only
    /// malformed documents are subject to the policy.
    pub fn load(&self, path: &Path) -> Result<Loaded> {
        let text = fs::read_to_string(path)?;

        match parse(&text) {
            Ok(canvas) => {
                debug!(
                    path = %path.display(),
                    nodes = canvas.nodes.len(),
                    edges = canvas.edges.len(),
                    "Loaded canvas"
                );
                Ok(Loaded {
                    canvas,
                    recovered: false,
                })
            }
            Err(e @ Error::MalformedDocument(_)) => match self.policy {
                MalformedPolicy::Recover => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Canvas is not parseable, starting from an empty canvas"
                    );
                    Ok(Loaded {
                        canvas: Canvas::new(),
                        recovered: true,
                    })
                }
                MalformedPolicy::Fail => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Serialize a canvas
    pub fn serialize(&self, canvas: &Canvas) -> Result<String> {
        serialize(canvas)
    }
}
