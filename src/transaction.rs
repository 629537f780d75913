// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Scoped transactions over a [`StateRoot`].
//!
//! A [`Transaction`] checks out the working copy of a root when it is created and resolves to
//! exactly one of commit or rollback when it ends:
//!
//! - **On creation**: the published value is cloned into a private working copy
//! - **During the scope**: writes through the transaction go to the working copy, which nobody
//!   else can observe
//! - **On scope exit**: the working copy is published and subscribers are notified, unless the
//!   transaction was cancelled or the thread is unwinding from a panic
//! - **On rollback**: the working copy is dropped; the published value was never touched
//!
//! The transaction exclusively borrows its root, so opening a second transaction on the same root
//! while one is alive does not compile.
//!
//! ```
//! use cowstate::{Outcome, StateRoot};
//!
//! let mut root = StateRoot::new(vec!["a".to_string()]);
//!
//! let mut tx = root.transaction();
//! tx.push("b".to_string());
//! if tx.len() > 1 {
//!     tx.cancel();
//! }
//! assert_eq!(tx.end(), Outcome::RolledBack);
//!
//! assert_eq!(root.detach().len(), 1);
//! ```

use crate::{StateRoot, TransactionError};
use std::{
    fmt,
    ops::{Deref, DerefMut},
    thread,
};

/// How a transaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The working copy was published and subscribers were notified.
    Committed,
    /// The working copy was discarded.
    RolledBack,
}

/// A scope-bound mutation session over the working copy of a [`StateRoot`].
///
/// Dereference the transaction to read or write the working copy. Dropping it commits, unless
/// [`Transaction::cancel`] was called or the drop happens during a panic unwind.
pub struct Transaction<'a, T> {
    root: &'a mut StateRoot<T>,
    cancelled: bool,
    ended: bool,
}

impl<'a, T> Transaction<'a, T> {
    pub(crate) fn begin(root: &'a mut StateRoot<T>) -> Result<Self, TransactionError>
    where
        T: Clone,
    {
        root.begin_transaction()?;
        Ok(Self {
            root,
            cancelled: false,
            ended: false,
        })
    }

    /// Marks the transaction for rollback.
    ///
    /// Has no effect until the transaction ends.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Ends the transaction now, committing unless it was cancelled.
    pub fn end(mut self) -> Outcome {
        let store = !self.cancelled;
        self.finish(store)
    }

    /// Ends the transaction now, discarding the working copy.
    pub fn rollback(mut self) -> Outcome {
        self.cancelled = true;
        self.finish(false)
    }

    fn finish(&mut self, store: bool) -> Outcome {
        self.ended = true;
        self.root.finish_transaction(store)
    }
}

impl<T> Deref for Transaction<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.root.working()
    }
}

impl<T: Clone> DerefMut for Transaction<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.root.working_mut()
    }
}

impl<T> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        let unwinding = thread::panicking();
        if unwinding {
            tracing::warn!("transaction scope is unwinding, rolling back");
        }
        self.finish(!self.cancelled && !unwinding);
    }
}

impl<T: fmt::Debug> fmt::Debug for Transaction<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("working", self.root.working())
            .field("cancelled", &self.cancelled)
            .finish()
    }
}
