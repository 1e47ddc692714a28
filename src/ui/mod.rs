//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware message printing
//!
//! # Design
//!
//! Command handlers print through this module so `--quiet` and `--debug`
//! behave the same everywhere. Diagnostics for developers go through
//! `tracing` instead.

pub mod output;
