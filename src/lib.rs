//! lanegraph - incremental commit history graphs
//!
//! lanegraph turns a commit DAG into a display list: every commit appears
//! once, above all of its parents, and every row carries the lane segments
//! and node position needed to draw the graph.
//!
//! # Architecture
//!
//! - [`history`] - The engine: branch walker, assembler, lane layout
//! - [`source`] - The commit source collaborator and an in-memory source
//! - [`git`] - Single interface for Git access; a git2-backed commit source
//! - [`core`] - Domain types and configuration
//! - [`cli`] - Command-line interface layer (`lg`)
//! - [`ui`] - User-facing output
//!
//! # Invariants
//!
//! 1. A commit id appears in the list at most once
//! 2. A commit precedes every one of its parents that is present
//! 3. A commit's dot position is set at most once
//! 4. Cancellation never leaves a row with a partial set of lines

pub mod cli;
pub mod core;
pub mod git;
pub mod history;
pub mod source;
pub mod ui;
