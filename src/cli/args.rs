//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lanegraph - commit history graphs with lane layout
#[derive(Parser, Debug)]
#[command(name = "lg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if lg was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Draw the commit graph
    #[command(
        name = "graph",
        long_about = "Draw the commit graph.\n\n\
            Walks history from HEAD (or the given revisions), orders the commits so \
            every commit comes before its parents, and lays out one lane per line of \
            development. Each row shows the commit's column, its lane segments, any \
            refs pointing at it and its summary.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Graph from HEAD
    lg graph

    # Graph every local branch
    lg graph --all

    # Two tips, first 50 rows, as JSON
    lg graph main feature --max-rows 50 --json

    # Large history: lay out 2000 rows per batch on 4 threads
    lg graph --batch-size 2000 --threads 4"
    )]
    Graph {
        /// Revisions to start from (default: HEAD)
        #[arg(value_name = "REV")]
        revs: Vec<String>,

        /// Start from every local branch tip
        #[arg(long, conflicts_with = "revs")]
        all: bool,

        /// Rows per layout batch (0 = whole history)
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,

        /// Worker threads for line generation (0 = default pool)
        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        /// Generate lines on the calling thread only
        #[arg(long)]
        sequential: bool,

        /// Stop printing after N rows
        #[arg(long, value_name = "N")]
        max_rows: Option<usize>,

        /// Output rows as JSON
        #[arg(long)]
        json: bool,

        /// Do not show ref names
        #[arg(long)]
        no_decorate: bool,
    },

    /// Show or change configuration
    #[command(
        name = "config",
        long_about = "Show or change lanegraph configuration.\n\n\
            Global configuration lives in ~/.lanegraph/config.toml (or \
            $LANEGRAPH_CONFIG). Repository configuration in \
            .git/lanegraph/config.toml overrides it key by key.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Show the effective configuration and where it came from
    lg config show

    # Get a specific value
    lg config get layout.batch_size

    # Set a value for this repository
    lg config set layout.threads 4"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for lg commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    lg completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    lg completion zsh >> ~/.zshrc

    # Fish
    lg completion fish > ~/.config/fish/completions/lg.fish

    # PowerShell
    lg completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration and its sources
    Show,
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value in the repository config
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
        /// Write the global config instead
        #[arg(long)]
        global: bool,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
