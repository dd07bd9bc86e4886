//! Trigger events and the input capability behind them
//!
//! Where the three strings come from (clipboard, hot keys, a prompt, command
//! line arguments) is platform business. The session only sees an
//! [`InputSource`].

use std::fmt;

use crate::error::{Error, Result};

/// An external event asking the session to do something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Capture the question
    Question,
    /// Capture the answer
    Answer,
    /// Write the captured pair into the document
    Commit,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Produces the session's inputs on demand
pub trait InputSource {
    fn question(&mut self) -> Result<String>;
    fn answer(&mut self) -> Result<String>;
    fn document_path(&mut self) -> Result<String>;
}

/// Fixed inputs, e.g. from command line arguments
#[derive(Debug, Clone, Default)]
pub struct StaticInput {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub document_path: Option<String>,
}

impl StaticInput {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        document_path: impl Into<String>,
    ) -> Self {
        Self {
            question: Some(question.into()),
            answer: Some(answer.into()),
            document_path: Some(document_path.into()),
        }
    }
}

impl InputSource for StaticInput {
    fn question(&mut self) -> Result<String> {
        self.question
            .clone()
            .ok_or_else(|| Error::MissingInput("no question available".to_string()))
    }

    fn answer(&mut self) -> Result<String> {
        self.answer
            .clone()
            .ok_or_else(|| Error::MissingInput("no answer available".to_string()))
    }

    fn document_path(&mut self) -> Result<String> {
        self.document_path
            .clone()
            .ok_or_else(|| Error::invalid_target("", "no document path available"))
    }
}
