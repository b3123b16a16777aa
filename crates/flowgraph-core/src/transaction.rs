//! # Transaction Cursor
//!
//! Tracks the single open transaction of a graph.
//!
//! Transactions never nest. The cursor holds at most one transaction id;
//! `depth` only counts how many nested mutating calls are currently sharing
//! an implicit transaction, so the graph knows when the originating call has
//! fully unwound.

use crate::primitives::IMPLICIT_TRANSACTION;
/// What the graph must do when a mutating call enters or leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Emit `startTransaction` for an implicit transaction.
    Open,
    /// Emit `endTransaction` for an implicit transaction.
    Close,
    /// Nothing to announce.
    Nothing,
}

/// The transaction cursor owned by each graph instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionCursor {
    id: Option<String>,
    depth: u32,
}

impl TransactionCursor {
    /// Create a cursor with no open transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the open transaction, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Current nesting depth (0 when no transaction is open).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if a transaction is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.id.is_some()
    }

    /// Check if the open transaction was opened by the graph itself.
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.id.as_deref() == Some(IMPLICIT_TRANSACTION)
    }

    /// Mark `id` as the open transaction. The caller checks that none is open.
    pub(crate) fn open(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
        self.depth = 1;
    }

    /// Clear the open transaction and return its id.
    pub(crate) fn close(&mut self) -> Option<String> {
        self.depth = 0;
        self.id.take()
    }

    /// Account for a mutating call entering.
    ///
    /// Returns `Step::Open` when the caller must open an implicit transaction.
    pub(crate) fn enter(&mut self) -> Step {
        if !self.is_open() {
            Step::Open
        } else {
            if self.is_implicit() {
                self.depth = self.depth.saturating_add(1);
            }
            Step::Nothing
        }
    }

    /// Account for a mutating call leaving.
    ///
    /// Returns `Step::Close` once an implicit transaction has unwound.
    /// Explicit transactions are never closed here.
    pub(crate) fn leave(&mut self) -> Step {
        if !self.is_implicit() {
            return Step::Nothing;
        }
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            Step::Close
        } else {
            Step::Nothing
        }
    }
}
