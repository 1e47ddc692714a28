//! history::store
//!
//! The ordered list of history rows and its id index.
//!
//! # Architecture
//!
//! Entries live in an arena and are addressed by a stable [`EntryId`]. The
//! row order is a separate list of ids, so splicing a run into the middle of
//! history moves ids, not entries, and an id handed out before a splice still
//! names the same entry afterwards.
//!
//! # Invariants
//!
//! - Every commit id is indexed exactly once
//! - A commit precedes every one of its parents that is present
//! - Rows are only ever inserted; nothing is removed except by [`EntryStore::clear`]

use std::collections::HashMap;

use serde::Serialize;

use crate::core::types::{Commit, Oid};

/// One drawn segment on a history row.
///
/// A missing `child_index` means the segment ends at this row going up; a
/// missing `parent_index` means it ends here going down. With both set the
/// lane passes through the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HistoryLine {
    pub child_index: Option<u32>,
    pub parent_index: Option<u32>,
    pub color_index: u32,
}

/// Column and color of a commit's own node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dot {
    pub offset: u32,
    pub color: u32,
}

/// A history row: one commit plus the geometry layout produced for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitEntry {
    commit: Commit,
    lines: Vec<HistoryLine>,
    dot: Option<Dot>,
}

impl CommitEntry {
    /// Wrap a commit with no geometry yet.
    pub fn new(commit: Commit) -> Self {
        Self {
            commit,
            lines: Vec::new(),
            dot: None,
        }
    }

    pub fn commit(&self) -> &Commit {
        &self.commit
    }

    pub fn oid(&self) -> &Oid {
        &self.commit.oid
    }

    /// Lines appended by layout, in connection order.
    pub fn lines(&self) -> &[HistoryLine] {
        &self.lines
    }

    pub fn dot(&self) -> Option<Dot> {
        self.dot
    }

    pub fn dot_offset(&self) -> Option<u32> {
        self.dot.map(|d| d.offset)
    }

    pub fn dot_color_index(&self) -> Option<u32> {
        self.dot.map(|d| d.color)
    }

    /// Append layout output. The dot is only taken if none is set yet.
    pub(crate) fn apply_layout(&mut self, lines: Vec<HistoryLine>, dot: Option<Dot>) {
        self.lines.extend(lines);
        if self.dot.is_none() {
            self.dot = dot;
        }
    }
}

impl std::fmt::Display for CommitEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.commit.fmt(f)
    }
}

/// Stable handle to an entry in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

/// Ordered history rows plus the id→entry index.
#[derive(Debug, Default)]
pub struct EntryStore {
    arena: Vec<CommitEntry>,
    order: Vec<EntryId>,
    lookup: HashMap<Oid, EntryId>,
    generation: u64,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True if the commit has been indexed.
    pub fn contains(&self, oid: &Oid) -> bool {
        self.lookup.contains_key(oid)
    }

    /// Arena handle for an indexed commit.
    pub fn id_of(&self, oid: &Oid) -> Option<EntryId> {
        self.lookup.get(oid).copied()
    }

    /// Current row of a commit.
    ///
    /// This is a linear scan of the row order.
    pub fn position(&self, oid: &Oid) -> Option<usize> {
        let id = self.id_of(oid)?;
        self.order.iter().position(|row| *row == id)
    }

    /// The entry at a row.
    pub fn row(&self, row: usize) -> Option<&CommitEntry> {
        self.order.get(row).map(|id| &self.arena[id.0])
    }

    pub fn entry(&self, id: EntryId) -> &CommitEntry {
        &self.arena[id.0]
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut CommitEntry {
        &mut self.arena[id.0]
    }

    /// Entry for a commit id, if indexed.
    pub fn get(&self, oid: &Oid) -> Option<&CommitEntry> {
        self.id_of(oid).map(|id| self.entry(id))
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CommitEntry> + '_ {
        self.order.iter().map(move |id| &self.arena[id.0])
    }

    /// Arena handles in display order for rows `start..start + len`.
    pub fn row_ids(&self, start: usize, len: usize) -> &[EntryId] {
        let end = (start + len).min(self.order.len());
        &self.order[start.min(end)..end]
    }

    /// Insert a run of commits at `row`, indexing each one.
    ///
    /// Commits that are already indexed are skipped so the index stays
    /// one-to-one. Returns the number of rows inserted.
    pub fn insert_run(&mut self, row: usize, commits: Vec<Commit>) -> usize {
        let row = row.min(self.order.len());
        let mut ids = Vec::with_capacity(commits.len());
        for commit in commits {
            if self.lookup.contains_key(&commit.oid) {
                continue;
            }
            let id = EntryId(self.arena.len());
            self.lookup.insert(commit.oid, id);
            self.arena.push(CommitEntry::new(commit));
            ids.push(id);
        }
        let inserted = ids.len();
        self.order.splice(row..row, ids);
        inserted
    }

    /// Append a single commit as the last row.
    pub fn push(&mut self, commit: Commit) -> bool {
        let end = self.order.len();
        self.insert_run(end, vec![commit]) == 1
    }

    /// Drop every row and the index.
    ///
    /// Bumps the generation, invalidating every [`EntryId`] handed out so far.
    pub fn clear(&mut self) {
        self.order.clear();
        self.lookup.clear();
        self.arena.clear();
        self.generation += 1;
    }

    /// Number of times the store has been cleared.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
