//! source::memory
//!
//! In-memory commit source.

use std::collections::HashMap;

use super::CommitSource;
use crate::core::types::{Commit, Oid};

/// A commit source backed by a map.
///
/// # Example
///
/// ```
/// use lanegraph::source::{CommitSource, MemorySource};
///
/// let mut source = MemorySource::new();
/// let a = source.add_labeled("a", &[]);
/// let b = source.add_labeled("b", &[a]);
///
/// assert_eq!(source.commit(&b).unwrap().parents, vec![a]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    commits: HashMap<Oid, Commit>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a commit.
    pub fn insert(&mut self, commit: Commit) {
        self.commits.insert(commit.oid, commit);
    }

    /// Insert a commit with the given id and parents.
    pub fn add(&mut self, oid: Oid, parents: &[Oid]) -> Oid {
        self.insert(Commit::new(oid, parents.to_vec()));
        oid
    }

    /// Insert a commit whose id is derived from `label`, using `label` as
    /// its summary. Handy for hand-written histories.
    pub fn add_labeled(&mut self, label: &str, parents: &[Oid]) -> Oid {
        let oid = Self::oid_for(label);
        let mut commit = Commit::new(oid, parents.to_vec());
        commit.summary = label.to_string();
        self.insert(commit);
        oid
    }

    /// The id [`add_labeled`](Self::add_labeled) assigns to `label`.
    ///
    /// The label bytes are placed at the front of the id (truncated to 20
    /// bytes), so distinct short labels give distinct ids.
    pub fn oid_for(label: &str) -> Oid {
        let mut bytes = [0u8; Oid::LEN];
        for (slot, b) in bytes.iter_mut().zip(label.bytes()) {
            *slot = b;
        }
        // Keep labelled ids away from the zero sentinel.
        bytes[Oid::LEN - 1] = 0xff;
        Oid::from_bytes(bytes)
    }

    /// Number of commits held.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// True when no commits are held.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Remove a commit, turning it into a history boundary.
    pub fn remove(&mut self, oid: &Oid) -> Option<Commit> {
        self.commits.remove(oid)
    }
}

impl CommitSource for MemorySource {
    fn commit(&self, oid: &Oid) -> Option<Commit> {
        self.commits.get(oid).cloned()
    }
}

impl FromIterator<Commit> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Commit>>(iter: I) -> Self {
        Self {
            commits: iter.into_iter().map(|c| (c.oid, c)).collect(),
        }
    }
}
