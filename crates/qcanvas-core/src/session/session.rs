//! Session state and the commit pipeline

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use super::input::{InputSource, Trigger};
use super::target::resolve_target;
use crate::canvas::{CanvasStore, GraphMutator, IdSource, Mutation, QaEntry, RandomIds};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::locking::PathLock;
use crate::storage::AtomicWriter;

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Document that was written
    pub path: PathBuf,
    /// What changed
    pub mutation: Mutation,
    /// True when the previous content was unparseable and got replaced
    pub recovered: bool,
    /// Node count after the write
    pub nodes: usize,
    /// Edge count after the write
    pub edges: usize,
}

/// What handling a trigger produced
#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    QuestionCaptured(String),
    AnswerCaptured(String),
    Committed(Outcome),
}

/// Holds the captured question and answer between triggers and runs the
/// load, mutate, save pipeline on commit
///
/// The pair is complete once both are captured and neither is blank. A
/// successful commit clears it so the same entry cannot be written twice; a
/// failed commit keeps it so the next commit can retry.
#[derive(Debug)]
pub struct Session<I = RandomIds> {
    question: Option<String>,
    answer: Option<String>,
    extension: String,
    holder: String,
    store: CanvasStore,
    writer: AtomicWriter,
    lock: PathLock,
    mutator: GraphMutator<I>,
}

impl Session<RandomIds> {
    /// Session with default settings
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Session using the given configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            question: None,
            answer: None,
            extension: config.canvas.extension.clone(),
            holder: format!("qcanvas session (pid {})", std::process::id()),
            store: CanvasStore::new(config.canvas.on_malformed),
            writer: AtomicWriter::new(config.canvas.temp_suffix.clone()),
            lock: PathLock::new(config.lock.to_lock_config()),
            mutator: GraphMutator::new(RandomIds),
        }
    }
}

impl Default for Session<RandomIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IdSource> Session<I> {
    /// Replace the id source, keeping everything else
    pub fn with_ids<J: IdSource>(self, ids: J) -> Session<J> {
        Session {
            question: self.question,
            answer: self.answer,
            extension: self.extension,
            holder: self.holder,
            store: self.store,
            writer: self.writer,
            lock: self.lock,
            mutator: GraphMutator::new(ids),
        }
    }

    /// Describe the lock holder written into lock files
    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = holder.into();
        self
    }

    pub fn capture_question(&mut self, question: impl Into<String>) {
        let question = question.into();
        debug!(chars = question.chars().count(), "Captured question");
        self.question = Some(question);
    }

    pub fn capture_answer(&mut self, answer: impl Into<String>) {
        let answer = answer.into();
        debug!(chars = answer.chars().count(), "Captured answer");
        self.answer = Some(answer);
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Whether a commit would get past input validation
    pub fn is_complete(&self) -> bool {
        self.entry().is_ok()
    }

    /// Drop any captured input
    pub fn clear(&mut self) {
        self.question = None;
        self.answer = None;
    }

    fn entry(&self) -> Result<QaEntry> {
        match (&self.question, &self.answer) {
            (None, None) => Err(Error::MissingInput(
                "no question or answer captured".to_string(),
            )),
            (None, Some(_)) => Err(Error::MissingInput("no question captured".to_string())),
            (Some(_), None) => Err(Error::MissingInput("no answer captured".to_string())),
            (Some(q), Some(a)) => QaEntry::new(q.as_str(), a.as_str()),
        }
    }

    /// Write the captured pair into the document at `raw_path`
    ///
    /// Nothing is read when the input is incomplete or the target is invalid,
    /// and nothing is written unless the whole pipeline succeeds.
    pub fn commit(&mut self, raw_path: &str) -> Result<Outcome> {
        let entry = self.entry()?;
        let path = resolve_target(raw_path, &self.extension)?;

        let _guard = self.lock.acquire(&path, &self.holder)?;

        let loaded = self.store.load(&path)?;
        let mut canvas = loaded.canvas;

        let mutation = self.mutator.apply_entry(&mut canvas, &entry)?;
        let text = self.store.serialize(&canvas)?;
        self.writer.save(&path, &text)?;

        info!(
            path = %path.display(),
            node_id = %mutation.node_id(),
            edge_id = %mutation.edge_id(),
            recovered = loaded.recovered,
            "Canvas saved"
        );

        self.clear();

        Ok(Outcome {
            path,
            mutation,
            recovered: loaded.recovered,
            nodes: canvas.nodes.len(),
            edges: canvas.edges.len(),
        })
    }

    /// Handle one trigger, pulling its value from `input`
    pub fn handle(&mut self, trigger: Trigger, input: &mut dyn InputSource) -> Result<Handled> {
        debug!(trigger = %trigger, "Handling trigger");

        match trigger {
            Trigger::Question => {
                let question = input.question()?;
                self.capture_question(question.clone());
                Ok(Handled::QuestionCaptured(question))
            }
            Trigger::Answer => {
                let answer = input.answer()?;
                self.capture_answer(answer.clone());
                Ok(Handled::AnswerCaptured(answer))
            }
            Trigger::Commit => {
                // Check before asking for a path; acquiring one may be costly
                self.entry()?;
                let path = input.document_path()?;
                self.commit(&path).map(Handled::Committed)
            }
        }
    }
}
