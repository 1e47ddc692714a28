//! source
//!
//! The commit source collaborator.
//!
//! # Architecture
//!
//! The history engine never reads repository objects itself. It asks a
//! [`CommitSource`] for commits by id. A lookup that fails for any reason
//! returns `None` and the engine treats it as a history boundary.
//!
//! Implementations:
//! - [`MemorySource`] - in-memory map, for synthetic histories and tests
//! - [`crate::git::Git`] - a git2-backed repository

mod memory;

pub use memory::MemorySource;

use std::sync::Arc;

use crate::core::types::{Commit, Oid};

/// Supplies commits by id.
///
/// Must be safe to call repeatedly while the assembler walks history, and
/// from more than one thread.
pub trait CommitSource: Send + Sync {
    /// Look up a commit. Unknown or unreachable ids yield `None`.
    fn commit(&self, oid: &Oid) -> Option<Commit>;
}

impl<T: CommitSource + ?Sized> CommitSource for &T {
    fn commit(&self, oid: &Oid) -> Option<Commit> {
        (**self).commit(oid)
    }
}

impl<T: CommitSource + ?Sized> CommitSource for Arc<T> {
    fn commit(&self, oid: &Oid) -> Option<Commit> {
        (**self).commit(oid)
    }
}

impl<T: CommitSource + ?Sized> CommitSource for Box<T> {
    fn commit(&self, oid: &Oid) -> Option<Commit> {
        (**self).commit(oid)
    }
}
