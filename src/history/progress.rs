//! history::progress
//!
//! Layout progress reporting. Purely observational: sinks cannot influence
//! control flow.

use serde::Serialize;

/// The two layout passes run for every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LayoutPass {
    /// Sequential connection pass.
    Connections,
    /// Per-row line generation.
    Lines,
}

impl LayoutPass {
    /// Zero-based pass number.
    pub fn index(self) -> usize {
        match self {
            LayoutPass::Connections => 0,
            LayoutPass::Lines => 1,
        }
    }
}

/// One progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Rows per batch (the last batch may be shorter)
    pub batch_size: usize,
    /// Zero-based batch number
    pub batch_index: usize,
    pub pass: LayoutPass,
    /// Row within the batch
    pub row: usize,
}

/// Receives progress ticks. Called from worker threads during the line pass.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}
