//! End-to-end scenarios for the history engine over in-memory histories.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use lanegraph::core::types::{Commit, Oid};
use lanegraph::history::{
    CancelToken, CommitHistory, Dot, HistoryLine, LayoutOptions, LayoutPass, Progress,
};
use lanegraph::source::{CommitSource, MemorySource};

fn line(child: Option<u32>, parent: Option<u32>, color: u32) -> HistoryLine {
    HistoryLine {
        child_index: child,
        parent_index: parent,
        color_index: color,
    }
}

fn order(history: &CommitHistory<MemorySource>) -> Vec<Oid> {
    history.rows().iter().map(|e| *e.oid()).collect()
}

/// A first-parent chain `c0 <- c1 <- ... <- c{len-1}`; returns the ids
/// oldest first.
fn chain(source: &mut MemorySource, len: usize) -> Vec<Oid> {
    let mut ids: Vec<Oid> = Vec::with_capacity(len);
    for i in 0..len {
        let parents: Vec<Oid> = ids.last().copied().into_iter().collect();
        ids.push(source.add_labeled(&format!("c{i}"), &parents));
    }
    ids
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn linear_history_has_one_lane() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 3);
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    let history = CommitHistory::new(source);
    history.process_oid(&c);
    let outcome = history.connect_commits(0);

    assert_eq!(order(&history), vec![c, b, a]);
    assert_eq!(outcome.rows, 3);

    let rows = history.rows();
    for entry in &rows {
        assert_eq!(entry.dot(), Some(Dot { offset: 0, color: 0 }));
        assert!(entry
            .lines()
            .iter()
            .all(|l| l.color_index == 0 && l.child_index.unwrap_or(0) == 0 && l.parent_index.unwrap_or(0) == 0));
    }
    assert_eq!(rows[0].lines(), &[line(None, Some(0), 0)]);
    assert_eq!(rows[1].lines(), &[line(Some(0), None, 0), line(None, Some(0), 0)]);
    assert_eq!(rows[2].lines(), &[line(Some(0), None, 0)]);
}

#[test]
fn merge_fan_in() {
    let mut source = MemorySource::new();
    let a = source.add_labeled("a", &[]);
    let b = source.add_labeled("b", &[a]);
    let c = source.add_labeled("c", &[a]);
    let d = source.add_labeled("d", &[b, c]);

    let history = CommitHistory::new(source);
    history.process_oid(&d);
    history.connect_commits(0);

    assert_eq!(order(&history), vec![d, b, c, a]);

    let rows = history.rows();
    let d_colors: Vec<u32> = rows[0].lines().iter().map(|l| l.color_index).collect();
    assert_eq!(d_colors, vec![0, 1]);
    assert_eq!(rows[0].dot(), Some(Dot { offset: 0, color: 0 }));
    assert_eq!(rows[1].dot(), Some(Dot { offset: 0, color: 0 }));
    assert_eq!(rows[2].dot(), Some(Dot { offset: 1, color: 1 }));
    assert_eq!(rows[3].dot(), Some(Dot { offset: 0, color: 0 }));
}

#[test]
fn octopus_merge_keeps_every_side_above_the_base() {
    let mut source = MemorySource::new();
    let base = source.add_labeled("base", &[]);
    let sides: Vec<Oid> = (0..4)
        .map(|i| source.add_labeled(&format!("side{i}"), &[base]))
        .collect();
    let merge = source.add_labeled("merge", &sides);

    let history = CommitHistory::new(source);
    history.process_oid(&merge);
    let rows = order(&history);

    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0], merge);
    assert_eq!(rows[5], base);
}

#[test]
fn tips_processed_in_sequence_share_history() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 4);
    let topic = source.add_labeled("topic", &[ids[1]]);

    let history = CommitHistory::new(source);
    history.process_oid(&ids[3]);
    history.process_oid(&topic);

    let rows = order(&history);
    assert_eq!(rows.len(), 5);
    let topic_row = rows.iter().position(|o| *o == topic).unwrap();
    let base_row = rows.iter().position(|o| *o == ids[1]).unwrap();
    assert!(topic_row < base_row);
}

#[test]
fn missing_parent_is_a_boundary() {
    let mut source = MemorySource::new();
    let ghost = MemorySource::oid_for("ghost");
    let a = source.add_labeled("a", &[ghost]);
    let b = source.add_labeled("b", &[a]);

    let history = CommitHistory::new(source);
    history.process_oid(&b);
    history.connect_commits(0);

    assert_eq!(order(&history), vec![b, a]);
    // a's lane toward the unknown parent stays open at the bottom
    assert_eq!(history.rows()[1].lines().last(), Some(&line(None, Some(0), 0)));
}

#[test]
fn unknown_start_commit_is_rejected() {
    let history = CommitHistory::new(MemorySource::new());
    assert!(!history.process_oid(&MemorySource::oid_for("nope")));
    assert!(history.is_empty());
}

#[test]
fn cyclic_input_terminates_without_duplicates() {
    let mut source = MemorySource::new();
    let a = MemorySource::oid_for("a");
    let b = MemorySource::oid_for("b");
    let c = MemorySource::oid_for("c");
    source.add(a, &[b]);
    source.add(b, &[c]);
    source.add(c, &[a]);

    let history = CommitHistory::new(source);
    history.process_oid(&a);

    let rows = order(&history);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], a);
}

#[test]
fn appended_commits_are_laid_out_too() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 2);

    let history = CommitHistory::new(source);
    history.process_oid(&ids[1]);
    history.append_commit(Commit::new(MemorySource::oid_for("loose"), vec![]));

    assert_eq!(history.len(), 3);
    assert_eq!(history.connect_commits(0).rows, 3);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn abort_after_batch_leaves_later_batches_empty() {
    const BATCH: usize = 5;
    let mut source = MemorySource::new();
    let ids = chain(&mut source, BATCH * 10);

    for k in [0, 3, 8] {
        let history = CommitHistory::new(source.clone());
        history.process_oid(ids.last().unwrap());

        let outcome = history.connect_commits_with(BATCH, |batch| {
            if batch == k {
                history.abort();
            }
        });

        assert!(outcome.cancelled);
        assert_eq!(outcome.batches, k + 1);
        for (row, entry) in history.rows().iter().enumerate() {
            let laid_out = row / BATCH <= k;
            assert_eq!(!entry.lines().is_empty(), laid_out, "row {row} after abort at {k}");
            assert_eq!(entry.dot().is_some(), laid_out, "row {row} after abort at {k}");
        }
    }
}

#[test]
fn abort_from_another_thread() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 200);
    let history = Arc::new(CommitHistory::new(source));
    history.process_oid(ids.last().unwrap());

    let token = history.cancel_token();
    let laid_out = Arc::new(AtomicUsize::new(0));
    let worker = {
        let history = history.clone();
        let laid_out = laid_out.clone();
        thread::spawn(move || {
            history.connect_commits_with(10, |_| {
                if laid_out.fetch_add(1, Ordering::SeqCst) == 2 {
                    token.cancel();
                }
            })
        })
    };
    let outcome = worker.join().unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.batches, 3);
    assert!(history.rows()[30..].iter().all(|e| e.lines().is_empty()));
}

#[test]
fn shared_token_stops_every_engine() {
    let token = CancelToken::new();
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 4);

    let first = CommitHistory::new(source.clone()).with_cancel_token(token.clone());
    let second = CommitHistory::new(source).with_cancel_token(token.clone());
    token.cancel();

    first.process_oid(&ids[3]);
    second.process_oid(&ids[3]);
    assert!(first.is_empty());
    assert!(second.is_empty());

    token.reset();
    first.process_oid(&ids[3]);
    assert_eq!(first.len(), 4);
}

#[test]
fn reset_clears_and_rearms() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 3);

    let history = CommitHistory::new(source);
    history.process_oid(&ids[2]);
    history.reset();

    assert!(history.is_empty());
    assert!(!history.is_aborted());

    history.process_oid(&ids[2]);
    assert_eq!(history.len(), 3);
}

/// Signals `entered` and waits for `release` the first time `gate` is looked
/// up, so a test can act while the engine is mid-walk.
struct GatedSource {
    inner: MemorySource,
    gate: Oid,
    entered: Mutex<Option<Sender<()>>>,
    release: Mutex<Receiver<()>>,
}

impl CommitSource for GatedSource {
    fn commit(&self, oid: &Oid) -> Option<Commit> {
        if *oid == self.gate {
            let entered = self.entered.lock().unwrap().take();
            if let Some(entered) = entered {
                entered.send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
            }
        }
        self.inner.commit(oid)
    }
}

#[test]
fn reset_during_processing_discards_remaining_runs() {
    // d = merge(b, c); c -> c2 -> a; b -> a
    let mut inner = MemorySource::new();
    let a = inner.add_labeled("a", &[]);
    let b = inner.add_labeled("b", &[a]);
    let c2 = inner.add_labeled("c2", &[a]);
    let c = inner.add_labeled("c", &[c2]);
    let d = inner.add_labeled("d", &[b, c]);

    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let history = CommitHistory::new(GatedSource {
        inner,
        gate: c2,
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(release_rx),
    });

    thread::scope(|scope| {
        let worker = scope.spawn(|| history.process_oid(&d));
        entered_rx.recv().unwrap();
        history.reset();
        release_tx.send(()).unwrap();
        assert!(worker.join().unwrap());
    });

    assert!(history.is_empty());
    assert!(!history.is_aborted());

    history.process_oid(&d);
    let rows: Vec<Oid> = history.rows().iter().map(|e| *e.oid()).collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.first(), Some(&d));
    assert_eq!(rows.last(), Some(&a));
}

#[test]
fn reset_during_line_pass_applies_nothing() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 8);
    let tip = *ids.last().unwrap();

    let (entered_tx, entered_rx) = channel::<()>();
    let (release_tx, release_rx) = channel::<()>();
    let entered = Mutex::new(Some(entered_tx));
    let release = Mutex::new(release_rx);
    let history = CommitHistory::new(source)
        .with_options(LayoutOptions {
            batch_size: 0,
            parallel: false,
            threads: 0,
        })
        .with_progress(move |p: Progress| {
            if p.pass != LayoutPass::Lines {
                return;
            }
            let first = entered.lock().unwrap().take();
            if let Some(first) = first {
                first.send(()).unwrap();
                release.lock().unwrap().recv().unwrap();
            }
        });
    history.process_oid(&tip);

    let outcome = thread::scope(|scope| {
        let worker = scope.spawn(|| history.layout());
        entered_rx.recv().unwrap();
        history.reset();
        history.process_oid(&tip);
        release_tx.send(()).unwrap();
        worker.join().unwrap()
    });

    assert!(outcome.cancelled);
    assert_eq!(outcome.batches, 0);
    assert_eq!(outcome.rows, 0);
    assert_eq!(history.len(), 8);
    assert!(history.rows().iter().all(|e| e.lines().is_empty() && e.dot().is_none()));

    assert_eq!(history.layout().rows, 8);
}

#[test]
fn reset_between_batches_stops_layout() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 6);
    let tip = *ids.last().unwrap();
    let history = CommitHistory::new(source);
    history.process_oid(&tip);

    let outcome = history.connect_commits_with(2, |_| {
        history.reset();
        history.process_oid(&tip);
    });

    assert!(outcome.cancelled);
    assert_eq!(outcome.batches, 1);
    assert!(history.rows().iter().all(|e| e.lines().is_empty()));
}

// =============================================================================
// Determinism and progress
// =============================================================================

#[test]
fn rebuilding_gives_identical_rows() {
    let build = || {
        let mut source = MemorySource::new();
        let a = source.add_labeled("a", &[]);
        let b = source.add_labeled("b", &[a]);
        let c = source.add_labeled("c", &[a]);
        let d = source.add_labeled("d", &[b, c]);
        let e = source.add_labeled("e", &[d]);
        let history = CommitHistory::new(source).with_options(LayoutOptions {
            batch_size: 2,
            parallel: true,
            threads: 4,
        });
        history.process_oid(&e);
        history.layout();
        history.rows()
    };

    assert_eq!(build(), build());
}

#[test]
fn progress_covers_both_passes_per_batch() {
    let mut source = MemorySource::new();
    let ids = chain(&mut source, 6);
    let seen: Arc<std::sync::Mutex<Vec<Progress>>> = Default::default();
    let sink = seen.clone();

    let history = CommitHistory::new(source)
        .with_progress(move |p: Progress| sink.lock().unwrap().push(p));
    history.process_oid(&ids[5]);
    history.connect_commits(4);

    let seen = seen.lock().unwrap();
    let count = |pass: LayoutPass, batch: usize| {
        seen.iter()
            .filter(|p| p.pass == pass && p.batch_index == batch)
            .count()
    };
    assert_eq!(count(LayoutPass::Connections, 0), 4);
    assert_eq!(count(LayoutPass::Lines, 0), 4);
    assert_eq!(count(LayoutPass::Connections, 1), 2);
    assert_eq!(count(LayoutPass::Lines, 1), 2);
    assert!(seen.iter().all(|p| p.batch_size == 4));
}
