//! history
//!
//! The commit history graph engine.
//!
//! # Architecture
//!
//! ```text
//! CommitSource -> walker -> assembler -> store -> layout -> rows + lines
//! ```
//!
//! - [`walker`] - Extracts linear runs and queues side branches
//! - [`assembler`] - [`CommitHistory`]: drives the walker and splices runs
//! - [`store`] - Ordered rows with an id index
//! - [`layout`] - Connection and line passes for one batch
//! - [`batch`] - Batched, parallel layout over the whole list
//! - [`cancel`] - Cooperative cancellation token
//! - [`progress`] - Layout progress reporting
//!
//! # Example
//!
//! ```
//! use lanegraph::history::CommitHistory;
//! use lanegraph::source::MemorySource;
//!
//! let mut source = MemorySource::new();
//! let a = source.add_labeled("a", &[]);
//! let b = source.add_labeled("b", &[a]);
//!
//! let history = CommitHistory::new(source);
//! history.process_oid(&b);
//! history.connect_commits(0);
//!
//! let rows = history.rows();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].dot_offset(), Some(0));
//! ```

pub mod assembler;
pub mod batch;
pub mod cancel;
pub mod layout;
pub mod progress;
pub mod store;
pub mod walker;

pub use assembler::{splice_run, CommitHistory, LayoutOptions, Placement};
pub use batch::LayoutOutcome;
pub use cancel::CancelToken;
pub use layout::{generate_connections, generate_lines, Connection, ConnectionPass, RowLayout};
pub use progress::{LayoutPass, Progress, ProgressSink};
pub use store::{CommitEntry, Dot, EntryId, EntryStore, HistoryLine};
pub use walker::{branch_entries, BranchResult, QueuedBranch};
