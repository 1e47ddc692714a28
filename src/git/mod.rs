//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`. The history engine sees a repository only as a
//! [`CommitSource`](crate::source::CommitSource), which [`Git`] implements.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Ref and revision resolution
//! - Ref enumeration for decorations
//! - Commit reads (parents, author, summary)
//!
//! # Example
//!
//! ```ignore
//! use lanegraph::git::Git;
//! use lanegraph::history::CommitHistory;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.resolve_ref("HEAD")?;
//!
//! let history = CommitHistory::new(git);
//! history.process_oid(&head);
//! history.layout();
//! ```

mod interface;

pub use interface::{Git, GitError};
