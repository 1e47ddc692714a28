//! git::interface
//!
//! Git interface implementation using git2.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref or revision does not exist
//! - [`GitError::ObjectNotFound`]: Object id does not name a commit
//! - [`GitError::InvalidOid`]: Malformed object id
//!
//! Lookups made on behalf of the history engine through [`CommitSource`]
//! never fail; every error becomes `None`, which the engine treats as a
//! history boundary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, trace};

use crate::core::types::{Commit, Oid, Signature, TypeError};
use crate::source::CommitSource;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => {
                if context.starts_with("refs/") || context == "HEAD" || !is_hex(context) {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec | git2::ErrorCode::Ambiguous => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
        }
    }
}

impl From<git2::Oid> for Oid {
    fn from(oid: git2::Oid) -> Self {
        let mut bytes = [0u8; Oid::LEN];
        bytes.copy_from_slice(&oid.as_bytes()[..Oid::LEN]);
        Oid::from_bytes(bytes)
    }
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_bytes(oid.as_bytes()).map_err(|e| GitError::from_git2(e, &oid.to_hex()))
}

/// The Git interface.
///
/// All repository reads go through here; nothing else in the crate imports
/// `git2`. The repository handle sits behind a mutex so one `Git` can be
/// shared with the history engine, which requires a `Sync` source.
pub struct Git {
    repo: Mutex<git2::Repository>,
    git_dir: PathBuf,
    work_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.git_dir)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository. Bare repositories are accepted.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        let git_dir = repo.path().to_path_buf();
        let work_dir = repo.workdir().map(Path::to_path_buf);
        debug!(git_dir = %git_dir.display(), "opened repository");

        Ok(Self {
            repo: Mutex::new(repo),
            git_dir,
            work_dir,
        })
    }

    /// Path to the .git directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Path to the working directory, `None` for a bare repository.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Directory that holds the repo config: the working directory, or the
    /// git dir's parent for a bare repository.
    pub fn config_root(&self) -> &Path {
        self.work_dir
            .as_deref()
            .or_else(|| self.git_dir.parent())
            .unwrap_or(self.git_dir.as_path())
    }

    fn repo(&self) -> MutexGuard<'_, git2::Repository> {
        self.repo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Resolve a ref to the commit it points at.
    ///
    /// This peels through symbolic refs and tags, so `HEAD` works too. An
    /// unborn `HEAD` is [`GitError::RefNotFound`].
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the ref doesn't exist
    pub fn resolve_ref(&self, refname: &str) -> Result<Oid, GitError> {
        let repo = self.repo();
        let reference = repo
            .find_reference(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;

        let commit = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, refname))?;

        Ok(commit.id().into())
    }

    /// Resolve a ref, returning None if it doesn't exist.
    pub fn try_resolve_ref(&self, refname: &str) -> Result<Option<Oid>, GitError> {
        match self.resolve_ref(refname) {
            Ok(oid) => Ok(Some(oid)),
            Err(GitError::RefNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve any revision expression (`main`, `HEAD~2`, `v1.0`, a hex
    /// prefix) to a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the revision does not resolve
    /// - [`GitError::InvalidOid`] if the expression is malformed or ambiguous
    pub fn resolve_revision(&self, spec: &str) -> Result<Oid, GitError> {
        let repo = self.repo();
        let object = repo
            .revparse_single(spec)
            .map_err(|e| GitError::from_git2(e, spec))?;

        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, spec))?;

        Ok(commit.id().into())
    }

    // =========================================================================
    // Ref Enumeration
    // =========================================================================

    /// List local branches with their tip commits, sorted by name.
    pub fn list_branches(&self) -> Result<Vec<(String, Oid)>, GitError> {
        let repo = self.repo();
        let branches = repo.branches(Some(git2::BranchType::Local))?;

        let mut result = Vec::new();
        for branch in branches {
            let (branch, _) = branch?;
            let name = match branch.name().ok().flatten() {
                Some(n) => n.to_string(),
                None => continue, // Skip non-UTF8 names
            };
            match branch.get().peel_to_commit() {
                Ok(commit) => result.push((name, commit.id().into())),
                Err(e) => trace!(branch = %name, error = %e, "skipping branch"),
            }
        }

        result.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(result)
    }

    /// Map every commit that a ref points at to the ref names pointing at it.
    ///
    /// Names are shorthands (`main`, `origin/main`, `v1.0`). Tags are peeled
    /// to their commit. Refs that do not lead to a commit are skipped. Each
    /// list is sorted.
    pub fn refs_index(&self) -> Result<HashMap<Oid, Vec<String>>, GitError> {
        let repo = self.repo();
        let mut index: HashMap<Oid, Vec<String>> = HashMap::new();

        for reference in repo.references()? {
            let reference = reference?;
            if reference.kind() == Some(git2::ReferenceType::Symbolic) {
                continue;
            }
            let name = match reference.shorthand() {
                Some(n) => n.to_string(),
                None => continue,
            };
            let oid = match reference.peel_to_commit() {
                Ok(commit) => Oid::from(commit.id()),
                Err(_) => continue,
            };
            index.entry(oid).or_default().push(name);
        }

        for names in index.values_mut() {
            names.sort();
        }
        debug!(commits = index.len(), "refs index built");
        Ok(index)
    }

    // =========================================================================
    // Commit Operations
    // =========================================================================

    /// Read a commit: its parents, author and summary.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<Commit, GitError> {
        let git_oid = to_git2(oid)?;
        let hex = oid.to_hex();
        let repo = self.repo();
        let commit = repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, &hex))?;

        let author = commit.author();
        let when = DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .with_timezone(&Utc);

        Ok(Commit {
            oid: *oid,
            parents: commit.parent_ids().map(Oid::from).collect(),
            signature: Signature {
                name: author.name().unwrap_or("").to_string(),
                email: author.email().unwrap_or("").to_string(),
                when,
            },
            summary: commit.summary().unwrap_or("").to_string(),
        })
    }
}

impl CommitSource for Git {
    fn commit(&self, oid: &Oid) -> Option<Commit> {
        match self.commit_info(oid) {
            Ok(commit) => Some(commit),
            Err(e) => {
                trace!(oid = %oid.short(), error = %e, "commit unavailable");
                None
            }
        }
    }
}
