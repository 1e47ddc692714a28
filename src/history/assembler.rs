//! history::assembler
//!
//! Builds the ordered history list from a commit source.
//!
//! # Architecture
//!
//! [`CommitHistory::process`] walks back from a commit, one run at a time,
//! and splices each run into the [`EntryStore`]. Side branches found by the
//! walker are explored before the run that found them is spliced, oldest run
//! first, so by the time a run is placed everything below it is already in
//! the list and it can be positioned above its parents.
//!
//! Exploration uses an explicit task stack instead of recursion, so history
//! depth is not limited by the call stack.
//!
//! # Invariants
//!
//! - A commit is never placed below one of its parents
//! - Processing a known commit is a no-op
//! - Cancellation leaves the store consistent: each splice is all-or-nothing

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use super::cancel::CancelToken;
use super::progress::ProgressSink;
use super::store::{CommitEntry, EntryStore};
use super::walker::{branch_entries, BranchResult};
use crate::core::types::{Commit, Oid};
use crate::source::CommitSource;

/// Tuning for the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Rows per layout batch; 0 lays out the whole store as one batch
    pub batch_size: usize,
    /// Generate lines on worker threads
    pub parallel: bool,
    /// Worker threads; 0 uses rayon's global pool
    pub threads: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            batch_size: 0,
            parallel: true,
            threads: 0,
        }
    }
}

/// Where a run ended up in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Right after the caller's hint commit, at this row
    AfterHint(usize),
    /// Right before its earliest known parent, at this row
    BeforeParent(usize),
    /// Right before the commit that queued its last side branch
    BeforeAnchor(usize),
    /// At the end of the list
    Appended(usize),
    /// The run was empty
    Skipped,
}

enum Task {
    Process { commit: Commit, after: Option<Commit> },
    Splice { result: BranchResult, after: Option<Commit> },
}

/// The commit history list.
///
/// Shared by reference between the thread that fills it, the thread that
/// lays it out and whoever wants to cancel either.
pub struct CommitHistory<S> {
    pub(super) source: S,
    pub(super) store: Mutex<EntryStore>,
    pub(super) cancel: CancelToken,
    pub(super) progress: Option<Arc<dyn ProgressSink>>,
    pub(super) options: LayoutOptions,
    pub(super) pool: Option<rayon::ThreadPool>,
}

impl<S: CommitSource> CommitHistory<S> {
    /// Create an empty history over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            store: Mutex::new(EntryStore::new()),
            cancel: CancelToken::new(),
            progress: None,
            options: LayoutOptions::default(),
            pool: None,
        }
    }

    /// Use an existing token, so one abort can stop several engines.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Report layout progress to `sink`.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    /// Set layout options.
    ///
    /// A dedicated thread pool is built when `threads` is non-zero. If that
    /// fails the global pool is used instead.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.pool = None;
        if options.parallel && options.threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .thread_name(|i| format!("lanegraph-layout-{i}"))
                .build()
            {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => warn!(error = %e, "failed to build layout pool, using global pool"),
            }
        }
        self.options = options;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    /// A handle to this history's cancellation token.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, EntryStore> {
        // A panic while holding the lock can only happen between complete
        // splices, so the store is still consistent.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// True if the commit is in the list.
    pub fn contains(&self, oid: &Oid) -> bool {
        self.lock().contains(oid)
    }

    /// Copy of the rows in display order.
    pub fn rows(&self) -> Vec<CommitEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Read the store without copying it. The store is locked for the
    /// duration of `f`.
    pub fn with_rows<R>(&self, f: impl FnOnce(&EntryStore) -> R) -> R {
        f(&self.lock())
    }

    /// Manually append a commit as the last row.
    pub fn append_commit(&self, commit: Commit) {
        self.lock().push(commit);
    }

    /// Clear the list. In-flight work is aborted first; the engine is ready
    /// for reuse afterwards.
    ///
    /// Work started before the reset stays stopped after the token is
    /// re-armed: processing and layout both end once they see the store's
    /// generation change.
    pub fn reset(&self) {
        self.abort();
        self.lock().clear();
        self.reset_abort();
    }

    /// Ask in-flight work to stop at its next checkpoint.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Re-arm after [`abort`](Self::abort).
    pub fn reset_abort(&self) {
        self.cancel.reset();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Look up `oid` and process it. Returns false if the source does not
    /// know the commit.
    pub fn process_oid(&self, oid: &Oid) -> bool {
        match self.source.commit(oid) {
            Some(commit) => {
                self.process(&commit, None);
                true
            }
            None => {
                debug!(oid = %oid.short(), "start commit not found");
                false
            }
        }
    }

    /// Add `commit` and all of its unknown ancestry to the list.
    ///
    /// `after` is a placement hint: the new rows go right after it when
    /// that does not put a commit below one of its parents.
    pub fn process(&self, commit: &Commit, after: Option<&Commit>) {
        let generation = self.lock().generation();
        let mut pending: HashSet<Oid> = HashSet::new();
        let mut tasks = vec![Task::Process {
            commit: commit.clone(),
            after: after.cloned(),
        }];

        while let Some(task) = tasks.pop() {
            if self.is_aborted() {
                debug!(remaining = tasks.len() + 1, "history processing aborted");
                break;
            }
            if self.lock().generation() != generation {
                debug!(remaining = tasks.len() + 1, "store was reset during processing");
                break;
            }
            match task {
                Task::Process { commit, after } => {
                    if pending.contains(&commit.oid) || self.contains(&commit.oid) {
                        continue;
                    }
                    let results = self.walk_chain(commit, &mut pending);

                    // Oldest run first; each run's side branches before the run.
                    let mut sequence = Vec::new();
                    for result in results.into_iter().rev() {
                        for queued in result.queue.iter().rev() {
                            sequence.push(Task::Process {
                                commit: queued.commit.clone(),
                                after: Some(queued.after.clone()),
                            });
                        }
                        sequence.push(Task::Splice {
                            result,
                            after: after.clone(),
                        });
                    }
                    tasks.extend(sequence.into_iter().rev());
                }
                Task::Splice { result, after } => {
                    for c in &result.commits {
                        pending.remove(&c.oid);
                    }
                    let run = result.to_string();
                    let mut store = self.lock();
                    if store.generation() != generation {
                        debug!(%run, "store was reset during processing");
                        break;
                    }
                    let placement = splice_run(&mut store, result, after.as_ref());
                    trace!(%run, ?placement, "spliced run");
                }
            }
        }
    }

    /// Walk runs back along first parents until the chain reaches known
    /// history, a root, or an unresolvable parent. Newest run first.
    fn walk_chain(&self, start: Commit, pending: &mut HashSet<Oid>) -> Vec<BranchResult> {
        let mut results = Vec::new();
        let mut next = Some(start);

        while let Some(commit) = next.take() {
            let result = branch_entries(&self.source, commit, |oid| {
                pending.contains(oid) || self.contains(oid)
            });
            pending.extend(result.commits.iter().map(|c| c.oid));

            next = result
                .last()
                .and_then(|last| last.first_parent())
                .filter(|oid| !pending.contains(*oid) && !self.contains(*oid))
                .and_then(|oid| self.source.commit(oid));
            results.push(result);
        }

        results
    }
}

impl<S> std::fmt::Debug for CommitHistory<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitHistory")
            .field("options", &self.options)
            .field("aborted", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Insert a walked run into the store.
///
/// The run goes above the earliest row holding one of its last commit's
/// parents, or right after `after` if that row is even higher. Without a
/// known parent it goes above the commit that queued its last side branch,
/// then after `after`, and finally at the end.
pub fn splice_run(store: &mut EntryStore, result: BranchResult, after: Option<&Commit>) -> Placement {
    let Some(last) = result.last() else {
        return Placement::Skipped;
    };

    let after_index = after.and_then(|c| store.position(&c.oid));
    let insert_before = last.parents.iter().filter_map(|p| store.position(p)).min();
    let anchor_index = result
        .queue
        .last()
        .and_then(|queued| store.position(&queued.after.oid));

    let placement = match (insert_before, anchor_index, after_index) {
        (Some(before), _, Some(after)) if after < before => Placement::AfterHint(after + 1),
        (Some(before), _, _) => Placement::BeforeParent(before),
        (None, Some(anchor), _) => Placement::BeforeAnchor(anchor),
        (None, None, Some(after)) => Placement::AfterHint(after + 1),
        (None, None, None) => Placement::Appended(store.len()),
    };

    let row = match placement {
        Placement::AfterHint(row)
        | Placement::BeforeParent(row)
        | Placement::BeforeAnchor(row)
        | Placement::Appended(row) => row,
        Placement::Skipped => return placement,
    };
    store.insert_run(row, result.commits);
    placement
}
