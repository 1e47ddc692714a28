//! history::batch
//!
//! Batched layout over the whole history list.
//!
//! Each batch copies its commits out of the store, runs the sequential
//! connection pass, then generates lines for every row on the rayon pool.
//! Workers write only to their own output slot; the slots are applied to
//! the store under the lock once the whole batch is done.
//!
//! Cancellation is checked before each batch and before each row's line
//! generation. A cancelled row gets no lines at all, never a partial set.
//! A run is tied to the store generation it started on: once the store is
//! reset, nothing more is applied and the run ends cancelled.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::assembler::CommitHistory;
use super::layout::{generate_connections, generate_lines, Connection, RowLayout};
use super::progress::{LayoutPass, Progress};
use crate::core::types::Commit;
use crate::source::CommitSource;

/// Summary of a layout run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayoutOutcome {
    /// Batches laid out completely
    pub batches: usize,
    /// Rows that received geometry
    pub rows: usize,
    /// The run stopped because of cancellation
    pub cancelled: bool,
}

impl<S: CommitSource> CommitHistory<S> {
    /// Lay out the list using the configured batch size.
    pub fn layout(&self) -> LayoutOutcome {
        self.connect_commits(self.options.batch_size)
    }

    /// Compute lines for every row, `batch_size` rows at a time (0 means one
    /// batch for the whole list).
    pub fn connect_commits(&self, batch_size: usize) -> LayoutOutcome {
        self.connect_commits_with(batch_size, |_| {})
    }

    /// Like [`connect_commits`](Self::connect_commits), calling
    /// `batch_notify` with the batch index after each batch is applied.
    pub fn connect_commits_with(
        &self,
        batch_size: usize,
        mut batch_notify: impl FnMut(usize),
    ) -> LayoutOutcome {
        let batch_size = match batch_size {
            0 => self.len().max(1),
            n => n,
        };
        let mut outcome = LayoutOutcome::default();
        let mut incoming: Vec<Connection> = Vec::new();
        let mut batch_start = 0;
        let generation = self.lock().generation();

        loop {
            if self.is_aborted() {
                debug!(batch_start, "layout aborted");
                outcome.cancelled = true;
                break;
            }

            let (ids, commits) = {
                let store = self.lock();
                if store.generation() != generation {
                    debug!(batch_start, "store was reset between batches");
                    outcome.cancelled = true;
                    break;
                }
                if batch_start >= store.len() {
                    break;
                }
                let ids = store.row_ids(batch_start, batch_size).to_vec();
                let commits: Vec<Commit> =
                    ids.iter().map(|id| store.entry(*id).commit().clone()).collect();
                (ids, commits)
            };
            let batch_index = batch_start / batch_size;

            let pass = generate_connections(commits.iter(), std::mem::take(&mut incoming), |row| {
                self.report(batch_size, batch_index, LayoutPass::Connections, row)
            });
            debug!(
                batch_index,
                rows = commits.len(),
                open_lanes = pass.residual.len(),
                "connections generated"
            );

            let slots = self.generate_batch_lines(batch_size, batch_index, &commits, &pass.snapshots);

            let mut laid_out = 0;
            {
                let mut store = self.lock();
                if store.generation() != generation {
                    debug!(batch_index, "store was reset during layout");
                    outcome.cancelled = true;
                    break;
                }
                for (id, slot) in ids.iter().zip(slots) {
                    if let Some(RowLayout { lines, dot }) = slot {
                        store.entry_mut(*id).apply_layout(lines, dot);
                        laid_out += 1;
                    }
                }
            }
            outcome.rows += laid_out;
            if laid_out < ids.len() {
                outcome.cancelled = true;
                break;
            }
            outcome.batches += 1;

            incoming = pass.residual;
            batch_start += ids.len();
            batch_notify(batch_index);
        }

        outcome
    }

    fn generate_batch_lines(
        &self,
        batch_size: usize,
        batch_index: usize,
        commits: &[Commit],
        snapshots: &[Vec<Connection>],
    ) -> Vec<Option<RowLayout>> {
        let mut slots: Vec<Option<RowLayout>> = vec![None; commits.len()];
        let fill = |row: usize, slot: &mut Option<RowLayout>, commit: &Commit, snapshot: &[Connection]| {
            if self.is_aborted() {
                return;
            }
            *slot = Some(generate_lines(&commit.oid, snapshot));
            self.report(batch_size, batch_index, LayoutPass::Lines, row);
        };

        if !self.options.parallel {
            for (row, ((slot, commit), snapshot)) in
                slots.iter_mut().zip(commits).zip(snapshots).enumerate()
            {
                fill(row, slot, commit, snapshot.as_slice());
            }
            return slots;
        }

        let run = |slots: &mut [Option<RowLayout>]| {
            slots
                .par_iter_mut()
                .zip(commits.par_iter())
                .zip(snapshots.par_iter())
                .enumerate()
                .for_each(|(row, ((slot, commit), snapshot))| fill(row, slot, commit, snapshot.as_slice()));
        };
        match &self.pool {
            Some(pool) => pool.install(|| run(&mut slots)),
            None => run(&mut slots),
        }
        slots
    }

    fn report(&self, batch_size: usize, batch_index: usize, pass: LayoutPass, row: usize) {
        if let Some(sink) = &self.progress {
            sink.report(Progress {
                batch_size,
                batch_index,
                pass,
                row,
            });
        }
    }
}
