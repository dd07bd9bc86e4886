//! Identifier generation for new nodes and edges

use uuid::Uuid;

use super::Canvas;

/// Length of generated identifiers, in hex characters
pub const ID_LEN: usize = 16;

const MAX_DRAWS: usize = 8;

/// Source of candidate identifiers
pub trait IdSource {
    /// Produce the next candidate id
    fn next_id(&mut self) -> String;
}

/// Random 16-hex-character ids cut from a v4 UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(ID_LEN);
        id
    }
}

/// Predictable ids (`prefix1`, `prefix2`, ...) for tests and reproducible output
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Draw an id that no node or edge in `canvas` uses yet
pub fn fresh_id<I: IdSource + ?Sized>(canvas: &Canvas, ids: &mut I) -> String {
    let mut candidate = ids.next_id();
    for _ in 1..MAX_DRAWS {
        if !canvas.contains_id(&candidate) {
            return candidate;
        }
        candidate = ids.next_id();
    }

    // The source keeps colliding; disambiguate the last draw instead.
    let base = candidate;
    let mut n = 1u64;
    loop {
        let id = format!("{}-{}", base, n);
        if !canvas.contains_id(&id) {
            return id;
        }
        n += 1;
    }
}
