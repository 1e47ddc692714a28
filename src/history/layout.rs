//! history::layout
//!
//! Lane geometry for history rows.
//!
//! # Passes
//!
//! Layout runs per batch of rows in two passes:
//!
//! 1. [`generate_connections`] walks the batch in order and tracks the open
//!    lanes (connections waiting for their parent row). Each row gets a
//!    snapshot of the lanes that are open when it is drawn. This pass is
//!    sequential because every row depends on the previous row's lanes.
//! 2. [`generate_lines`] turns one row's snapshot into [`HistoryLine`]s and
//!    the row's dot. Rows are independent here, so this pass can run on
//!    worker threads.
//!
//! Color indices restart at zero for every batch. They only need to be
//! distinct among the lanes active within a batch.

use std::collections::HashMap;

use serde::Serialize;

use super::store::{Dot, HistoryLine};
use crate::core::types::{Commit, Oid};

/// An open lane from a child row down to the row of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub parent_oid: Oid,
    pub child_oid: Oid,
    pub color_index: u32,
}

/// Output of the connection pass for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionPass {
    /// Open lanes seen by each row, in row order
    pub snapshots: Vec<Vec<Connection>>,
    /// Lanes still open after the last row, carried into the next batch
    pub residual: Vec<Connection>,
}

/// Run the sequential connection pass over `rows`.
///
/// `incoming` holds the lanes left open by the previous batch. `on_row` is
/// called with the row's offset in the batch after each row is done.
pub fn generate_connections<'a, I>(
    rows: I,
    incoming: Vec<Connection>,
    mut on_row: impl FnMut(usize),
) -> ConnectionPass
where
    I: IntoIterator<Item = &'a Commit>,
{
    let mut connections = incoming;
    let mut snapshots = Vec::new();
    let mut next_color: u32 = 0;
    let mut allocate = || {
        let color = next_color;
        next_color += 1;
        color
    };

    for (offset, commit) in rows.into_iter().enumerate() {
        let oid = commit.oid;
        let incoming_index = connections.iter().position(|c| c.parent_oid == oid);

        if let Some(first_parent) = commit.first_parent() {
            let color_index = match incoming_index {
                Some(index) => connections[index].color_index,
                None => allocate(),
            };
            let insert_at = incoming_index.map_or(connections.len(), |index| index + 1);
            connections.insert(
                insert_at,
                Connection {
                    parent_oid: *first_parent,
                    child_oid: oid,
                    color_index,
                },
            );
        }

        for parent in commit.parents.iter().skip(1) {
            connections.push(Connection {
                parent_oid: *parent,
                child_oid: oid,
                color_index: allocate(),
            });
        }

        snapshots.push(connections.clone());
        connections.retain(|c| c.parent_oid != oid);
        on_row(offset);
    }

    ConnectionPass {
        snapshots,
        residual: connections,
    }
}

/// Geometry computed for one row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowLayout {
    pub lines: Vec<HistoryLine>,
    pub dot: Option<Dot>,
}

/// Turn one row's connection snapshot into lines and a dot.
///
/// Each distinct parent in the snapshot (other than the row itself) gets a
/// column in first-seen order; that is where its lanes leave the row going
/// down. Child-side columns are handed out in connection order, except that
/// lanes sharing a parent share a column and color so they read as one
/// continuous lane.
pub fn generate_lines(oid: &Oid, connections: &[Connection]) -> RowLayout {
    let mut parent_outlets: Vec<Oid> = Vec::new();
    for connection in connections {
        if connection.parent_oid != *oid && !parent_outlets.contains(&connection.parent_oid) {
            parent_outlets.push(connection.parent_oid);
        }
    }

    let mut next_child_index: u32 = 0;
    let mut parent_lines: HashMap<Oid, (u32, u32)> = HashMap::new();
    let mut dot = None;
    let mut lines = Vec::with_capacity(connections.len());

    for connection in connections {
        let commit_is_parent = connection.parent_oid == *oid;
        let commit_is_child = connection.child_oid == *oid;
        let parent_index = if commit_is_parent {
            None
        } else {
            parent_outlets
                .iter()
                .position(|p| *p == connection.parent_oid)
                .map(|p| p as u32)
        };
        let mut child_index = (!commit_is_child).then_some(next_child_index);
        let mut color_index = connection.color_index;

        if dot.is_none() && (commit_is_parent || commit_is_child) {
            dot = Some(Dot {
                offset: next_child_index,
                color: color_index,
            });
        }

        match parent_lines.get(&connection.parent_oid) {
            Some(&(lane_child, lane_color)) => {
                if !commit_is_child {
                    child_index = Some(lane_child);
                    color_index = lane_color;
                } else if !commit_is_parent {
                    next_child_index += 1;
                }
            }
            None => {
                if !commit_is_child {
                    parent_lines.insert(connection.parent_oid, (next_child_index, color_index));
                }
                if !commit_is_parent {
                    next_child_index += 1;
                }
            }
        }

        lines.push(HistoryLine {
            child_index,
            parent_index,
            color_index,
        });
    }

    RowLayout { lines, dot }
}
