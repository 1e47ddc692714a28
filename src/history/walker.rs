//! history::walker
//!
//! Extracts linear runs of history.
//!
//! A run starts at a commit that is not yet known and follows first parents
//! until it reaches a merge, a commit that is already known, or a parent the
//! source cannot resolve. Secondary parents found along the way are queued
//! rather than followed, so the assembler decides the order in which side
//! branches are explored.

use std::fmt;

use tracing::trace;

use crate::core::types::{Commit, Oid};
use crate::source::CommitSource;

/// A side branch found while walking, to be processed later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedBranch {
    /// First commit of the side branch
    pub commit: Commit,
    /// The commit whose parent it is; used as an insertion hint
    pub after: Commit,
}

/// The outcome of walking one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchResult {
    /// The run, newest first
    pub commits: Vec<Commit>,
    /// Side branches discovered in the run, in discovery order
    pub queue: Vec<QueuedBranch>,
}

impl BranchResult {
    /// The oldest commit of the run.
    pub fn last(&self) -> Option<&Commit> {
        self.commits.last()
    }
}

impl fmt::Display for BranchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.commits.first(), self.commits.last()) {
            (Some(first), Some(last)) => {
                write!(f, "{}..{}", first.oid.short(), last.oid.short())
            }
            _ => f.write_str("empty"),
        }
    }
}

/// Walk the run starting at `start`.
///
/// `is_known` reports ids that must not be walked into: commits that are
/// already in the store or already claimed by a run that has not been
/// spliced yet.
pub fn branch_entries<S, F>(source: &S, start: Commit, is_known: F) -> BranchResult
where
    S: CommitSource + ?Sized,
    F: Fn(&Oid) -> bool,
{
    let mut commits = vec![start];
    let mut queue = Vec::new();

    loop {
        let commit = &commits[commits.len() - 1];
        let Some(first_parent) = commit.first_parent().copied() else {
            break;
        };

        for parent in commit.parents.iter().skip(1) {
            if let Some(parent_commit) = source.commit(parent) {
                queue.push(QueuedBranch {
                    commit: parent_commit,
                    after: commit.clone(),
                });
            }
        }

        // Commits already walked in this run count as known too; this is what
        // stops a malformed cyclic chain.
        if is_known(&first_parent) || commits.iter().any(|c| c.oid == first_parent) {
            break;
        }
        let Some(parent_commit) = source.commit(&first_parent) else {
            break;
        };

        if commit.is_merge() {
            queue.push(QueuedBranch {
                commit: parent_commit,
                after: commit.clone(),
            });
            break;
        }

        commits.push(parent_commit);
    }

    let result = BranchResult { commits, queue };
    trace!(
        run = %result,
        queued = ?result
            .queue
            .iter()
            .map(|q| format!("{} > {}", q.commit.oid.short(), q.after.oid.short()))
            .collect::<Vec<_>>(),
        "walked run"
    );
    result
}
