//! graph command - Draw the commit graph
//!
//! Resolves the starting tips, feeds them to [`CommitHistory`], runs the
//! batched layout and prints one row per commit.

use std::collections::HashMap;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use tracing::{debug, trace};

use crate::cli::Context;
use crate::core::config::schema::MAX_THREADS;
use crate::core::config::Config;
use crate::core::types::Oid;
use crate::git::Git;
use crate::history::{CommitEntry, CommitHistory, EntryStore, LayoutOutcome, Progress};
use crate::ui::output::{self, Verbosity};

/// Arguments of `lg graph`.
#[derive(Debug, Clone, Default)]
pub struct GraphArgs {
    pub revs: Vec<String>,
    pub all: bool,
    pub batch_size: Option<usize>,
    pub threads: Option<usize>,
    pub sequential: bool,
    pub max_rows: Option<usize>,
    pub json: bool,
    pub no_decorate: bool,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    entry: &'a CommitEntry,
    refs: &'a [String],
}

#[derive(Serialize)]
struct JsonGraph<'a> {
    outcome: LayoutOutcome,
    rows: Vec<JsonRow<'a>>,
}

/// Draw the commit graph.
pub fn graph(ctx: &Context, args: GraphArgs) -> Result<()> {
    let verbosity = ctx.verbosity();
    let cwd = ctx.cwd()?;
    let git = Git::open(&cwd).context("Failed to open repository")?;
    let config = Config::load(Some(git.config_root())).context("Failed to load config")?;

    let mut options = config.layout_options();
    if let Some(batch_size) = args.batch_size {
        options.batch_size = batch_size;
    }
    if let Some(threads) = args.threads {
        if threads > MAX_THREADS {
            bail!("--threads must be at most {}", MAX_THREADS);
        }
        options.threads = threads;
    }
    if args.sequential {
        options.parallel = false;
    }
    let max_rows = args.max_rows.or(config.max_rows());
    let decorate = config.decorate() && !args.no_decorate;

    let tips = resolve_tips(&git, &args)?;
    let refs = if decorate {
        git.refs_index().context("Failed to read refs")?
    } else {
        HashMap::new()
    };

    let history = CommitHistory::new(git)
        .with_options(options)
        .with_progress(|p: Progress| {
            trace!(batch = p.batch_index, pass = p.pass.index(), row = p.row, "layout progress");
        });

    for tip in &tips {
        if !history.process_oid(tip) {
            output::warn(format!("commit {} could not be read", tip.short()), verbosity);
        }
    }
    output::debug(format!("{} rows from {} tip(s)", history.len(), tips.len()), verbosity);

    let outcome = history.connect_commits_with(options.batch_size, |batch| {
        output::debug(format!("batch {} laid out", batch), verbosity);
    });
    if outcome.cancelled {
        output::warn("layout was cancelled; some rows have no lanes", verbosity);
    }

    let rendered = history.with_rows(|store| {
        if args.json {
            render_json(store, &refs, outcome, max_rows)
        } else {
            Ok(render_text(store, &refs, max_rows, verbosity))
        }
    })?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

fn resolve_tips(git: &Git, args: &GraphArgs) -> Result<Vec<Oid>> {
    let mut tips: Vec<Oid> = if args.all {
        let branches = git.list_branches().context("Failed to list branches")?;
        if branches.is_empty() {
            bail!("No local branches found");
        }
        branches.into_iter().map(|(_, oid)| oid).collect()
    } else if args.revs.is_empty() {
        match git.try_resolve_ref("HEAD").context("Failed to resolve HEAD")? {
            Some(head) => vec![head],
            None => {
                debug!("HEAD is unborn, nothing to draw");
                Vec::new()
            }
        }
    } else {
        args.revs
            .iter()
            .map(|rev| {
                git.resolve_revision(rev)
                    .with_context(|| format!("Failed to resolve revision '{}'", rev))
            })
            .collect::<Result<_>>()?
    };

    let mut seen = std::collections::HashSet::new();
    tips.retain(|oid| seen.insert(*oid));
    Ok(tips)
}

fn render_json(
    store: &EntryStore,
    refs: &HashMap<Oid, Vec<String>>,
    outcome: LayoutOutcome,
    max_rows: Option<usize>,
) -> Result<String> {
    let rows = store
        .iter()
        .take(max_rows.unwrap_or(usize::MAX))
        .map(|entry| JsonRow {
            entry,
            refs: refs.get(entry.oid()).map_or(&[][..], Vec::as_slice),
        })
        .collect();

    serde_json::to_string_pretty(&JsonGraph { outcome, rows }).context("Failed to serialize rows")
}

fn render_text(
    store: &EntryStore,
    refs: &HashMap<Oid, Vec<String>>,
    max_rows: Option<usize>,
    verbosity: Verbosity,
) -> String {
    let rows: Vec<&CommitEntry> = store.iter().take(max_rows.unwrap_or(usize::MAX)).collect();
    let width = rows.iter().map(|e| columns(e)).max().unwrap_or(0);
    let geometry = verbosity == Verbosity::Debug;

    rows.iter()
        .map(|entry| {
            let names = refs.get(entry.oid()).map_or(&[][..], Vec::as_slice);
            format_row(entry, names, width, geometry)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of lane columns a row touches.
fn columns(entry: &CommitEntry) -> usize {
    let lanes = entry
        .lines()
        .iter()
        .flat_map(|l| [l.child_index, l.parent_index])
        .flatten();
    lanes
        .chain(entry.dot_offset())
        .map(|c| c as usize + 1)
        .max()
        .unwrap_or(0)
}

/// Format one row: lane glyphs padded to `width` columns, short id, ref
/// decorations and summary. With `geometry` the raw dot and line triples
/// (`child>parent:color`, `-` for an open end) are appended.
pub fn format_row(entry: &CommitEntry, refs: &[String], width: usize, geometry: bool) -> String {
    let mut glyphs = vec![' '; width.max(columns(entry))];
    for line in entry.lines() {
        if let (Some(child), Some(_)) = (line.child_index, line.parent_index) {
            glyphs[child as usize] = '|';
        }
    }
    if let Some(offset) = entry.dot_offset() {
        glyphs[offset as usize] = '*';
    }
    let graph: String = glyphs.iter().flat_map(|g| [*g, ' ']).collect();

    let mut row = format!("{}{}", graph, entry.oid().short());
    if !refs.is_empty() {
        row.push_str(&format!(" ({})", refs.join(", ")));
    }
    if !entry.commit().summary.is_empty() {
        row.push(' ');
        row.push_str(&entry.commit().summary);
    }
    if geometry {
        let end = |i: Option<u32>| i.map_or_else(|| "-".to_string(), |i| i.to_string());
        let dot = entry
            .dot()
            .map_or_else(|| "-".to_string(), |d| format!("{}:{}", d.offset, d.color));
        let lines: Vec<String> = entry
            .lines()
            .iter()
            .map(|l| format!("{}>{}:{}", end(l.child_index), end(l.parent_index), l.color_index))
            .collect();
        row.push_str(&format!("  [dot {} | {}]", dot, lines.join(" ")));
    }
    row.trim_end().to_string()
}
