//! Pending-edit buffer
//!
//! Accumulates per-line partial edits between UI interaction and network
//! flush. Merging is field-wise last-write-wins: the buffer records the
//! desired end state per field, not a change log. Process-local only —
//! unflushed edits do not survive the view (best-effort by design).

use shared::models::CartLinePatch;
use std::collections::HashMap;

/// Buffered edits keyed by cart-line id
#[derive(Debug, Default)]
pub struct PendingEditBuffer {
    entries: HashMap<i64, CartLinePatch>,
}

impl PendingEditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `patch` into the buffered patch for `line_id`
    ///
    /// Fields present in `patch` win; fields absent keep their previously
    /// buffered value.
    pub fn record_edit(&mut self, line_id: i64, patch: CartLinePatch) {
        if patch.is_empty() {
            return;
        }
        self.entries.entry(line_id).or_default().merge(&patch);
    }

    /// Take all buffered patches, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<(i64, CartLinePatch)> {
        self.entries.drain().collect()
    }

    /// Re-merge a previously drained set back into the buffer
    ///
    /// Used when a flush fails so the edits are retried later. Edits buffered
    /// since the drain are newer and win field-wise.
    pub fn restore(&mut self, drained: Vec<(i64, CartLinePatch)>) {
        for (line_id, old_patch) in drained {
            match self.entries.remove(&line_id) {
                Some(newer) => {
                    let mut merged = old_patch;
                    merged.merge(&newer);
                    self.entries.insert(line_id, merged);
                }
                None => {
                    self.entries.insert(line_id, old_patch);
                }
            }
        }
    }

    /// Drop pending edits for a line (after it is removed from the cart)
    pub fn remove(&mut self, line_id: i64) -> Option<CartLinePatch> {
        self.entries.remove(&line_id)
    }

    /// Buffered patch for a line, if any
    pub fn get(&self, line_id: i64) -> Option<&CartLinePatch> {
        self.entries.get(&line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate buffered patches (used to overlay local edits on a server cart)
    pub fn iter(&self) -> impl Iterator<Item = (&i64, &CartLinePatch)> {
        self.entries.iter()
    }
}
