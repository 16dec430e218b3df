//! Transactions and snapshot undo/redo.
//!
//! A transaction brackets one user gesture (press → release). The model
//! state is captured when the outermost transaction opens and again when it
//! commits, so undo/redo swaps whole snapshots in a single step instead of
//! replaying an inverse chain. Nested begins are counted; only the outermost
//! commit produces an undo entry.

use crate::design_model::TransactionId;
use crate::error::ModelError;

/// One undoable step.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    pub before: S,
    pub after: S,
    pub label: String,
}

/// Bookkeeping of begun/committed transactions, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub begun: u64,
    pub committed: u64,
}

#[derive(Debug)]
pub struct TransactionStack<S> {
    undo_stack: Vec<Snapshot<S>>,
    redo_stack: Vec<Snapshot<S>>,
    max_depth: usize,
    /// Open transactions, outermost first.
    open: Vec<(TransactionId, String)>,
    before: Option<S>,
    dirty: bool,
    next_id: u64,
    stats: TransactionStats,
}

impl<S: Clone> TransactionStack<S> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            open: Vec::new(),
            before: None,
            dirty: false,
            next_id: 1,
            stats: TransactionStats::default(),
        }
    }

    /// Open a transaction. `current` is captured only by the outermost one.
    pub fn begin(&mut self, label: &str, current: &S) -> TransactionId {
        let id = TransactionId(self.next_id);
        self.next_id += 1;
        if self.open.is_empty() {
            self.before = Some(current.clone());
            self.dirty = false;
            self.stats.begun += 1;
            log::debug!("begin transaction {} \"{label}\"", id.0);
        }
        self.open.push((id, label.to_string()));
        id
    }

    /// Record that the model changed. Outside a transaction the change is
    /// an implicit single-step edit and only invalidates redo.
    pub fn mark_dirty(&mut self) {
        if self.open.is_empty() {
            self.redo_stack.clear();
        } else {
            self.dirty = true;
        }
    }

    /// Close the innermost transaction, which must be `id`.
    pub fn commit(&mut self, id: TransactionId, current: &S) -> Result<(), ModelError> {
        match self.open.last() {
            None => return Err(ModelError::NoOpenTransaction),
            Some((open_id, _)) if *open_id != id => {
                return Err(ModelError::TransactionMismatch(id.0));
            }
            Some(_) => {}
        }
        let (_, label) = self.open.pop().ok_or(ModelError::NoOpenTransaction)?;
        if !self.open.is_empty() {
            return Ok(());
        }

        self.stats.committed += 1;
        log::debug!("commit transaction {} \"{label}\"", id.0);
        let before = self.before.take();
        if self.dirty
            && let Some(before) = before
        {
            self.undo_stack.push(Snapshot {
                before,
                after: current.clone(),
                label,
            });
            if self.undo_stack.len() > self.max_depth {
                self.undo_stack.remove(0);
            }
            self.redo_stack.clear();
        }
        self.dirty = false;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    /// Pop the last step; returns the state to restore and its label.
    pub fn undo(&mut self) -> Option<(S, String)> {
        if self.is_open() {
            log::warn!("undo requested while a transaction is open");
            return None;
        }
        let step = self.undo_stack.pop()?;
        let restore = (step.before.clone(), step.label.clone());
        self.redo_stack.push(step);
        Some(restore)
    }

    pub fn redo(&mut self) -> Option<(S, String)> {
        if self.is_open() {
            log::warn!("redo requested while a transaction is open");
            return None;
        }
        let step = self.redo_stack.pop()?;
        let restore = (step.after.clone(), step.label.clone());
        self.undo_stack.push(step);
        Some(restore)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn stats(&self) -> TransactionStats {
        self.stats
    }
}
