// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The transactional root of a state tree.
//!
//! A [`StateRoot`] owns the top-level [`Node`] of a tree together with the *published* payload:
//! the snapshot that readers see. Mutation only happens inside a transaction, which works on a
//! private copy obtained through the node's write gate. Committing publishes that copy and
//! notifies subscribers; rolling back re-attaches the node to the published payload, so no undo
//! log is needed.
//!
//! ```
//! use cowstate::StateRoot;
//!
//! let mut root = StateRoot::new(5);
//! {
//!     let mut tx = root.transaction();
//!     *tx = 10;
//! } // committed on scope exit
//! assert_eq!(*root.detach(), 10);
//!
//! {
//!     let mut tx = root.transaction();
//!     *tx = 20;
//!     tx.cancel();
//! } // rolled back
//! assert_eq!(*root.detach(), 10);
//! ```

use crate::{
    Detached, Node, Outcome, Payload, Transaction, TransactionError,
    publisher::{Publisher, Subscriber, SubscriptionId},
};
use parking_lot::RwLock;
use std::{fmt, sync::Arc};

/// Whether a root currently has a working copy checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    InTransaction,
}

/// The published payload, shared with [`SnapshotReader`]s.
///
/// Only written at commit, by the thread that owns the root.
type PublishedSlot<T> = Arc<RwLock<Payload<T>>>;

/// Owns a state tree and serializes updates to it through transactions.
///
/// At most one transaction can be open at a time. The scoped [`StateRoot::transaction`] API makes
/// this a compile-time property, since the returned guard borrows the root mutably.
pub struct StateRoot<T> {
    node: Node<T>,
    published: PublishedSlot<T>,
    state: TransactionState,
    publisher: Publisher<T>,
}

impl<T> StateRoot<T> {
    /// Creates a root publishing `value`.
    pub fn new(value: T) -> Self {
        Self::from_node(Node::new(value))
    }

    /// Creates a root publishing the payload of `node`.
    ///
    /// # Panics
    ///
    /// If `node` has been emptied by [`Node::take`].
    #[track_caller]
    pub fn from_node(node: Node<T>) -> Self {
        let published = Arc::new(RwLock::new(node.payload().share()));
        Self {
            node,
            published,
            state: TransactionState::Idle,
            publisher: Publisher::new(),
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_in_transaction(&self) -> bool {
        self.state == TransactionState::InTransaction
    }

    /// Returns a snapshot of the last published value.
    ///
    /// While a transaction is open this is still the value from before it began.
    pub fn detach(&self) -> Detached<T> {
        Detached::from(self.detached_payload())
    }

    /// The payload of the last published value.
    pub fn detached_payload(&self) -> Payload<T> {
        self.published.read().share()
    }

    /// Returns a handle through which other threads can read the published value.
    pub fn reader(&self) -> SnapshotReader<T> {
        SnapshotReader {
            published: Arc::clone(&self.published),
        }
    }

    /// Registers `subscriber` to be called after every commit.
    pub fn subscribe<S>(&mut self, subscriber: S) -> SubscriptionId
    where
        S: Subscriber<T> + Send + 'static,
    {
        self.publisher.subscribe(Box::new(subscriber))
    }

    /// Removes a subscriber. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.publisher.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.publisher.len()
    }

    /// Checks out a working copy and returns it for mutation.
    ///
    /// The published payload is always shared by the root itself, so the working copy is a
    /// clone of it. Cloning a value made of nodes only shares their payloads.
    ///
    /// Every successful call must be paired with a call to [`StateRoot::end_transaction`].
    /// Prefer [`StateRoot::transaction`], which does this on scope exit.
    pub fn begin_transaction(&mut self) -> Result<&mut T, TransactionError>
    where
        T: Clone,
    {
        if self.is_in_transaction() {
            return Err(TransactionError::AlreadyInTransaction);
        }
        self.state = TransactionState::InTransaction;
        tracing::debug!("beginning transaction");
        Ok(self.node.get_mut())
    }

    /// Ends the open transaction, publishing the working copy if `store` is true and discarding
    /// it otherwise.
    pub fn end_transaction(&mut self, store: bool) -> Result<Outcome, TransactionError> {
        if !self.is_in_transaction() {
            return Err(TransactionError::NotInTransaction);
        }
        Ok(self.finish_transaction(store))
    }

    /// Opens a scoped transaction.
    ///
    /// # Panics
    ///
    /// If a transaction opened with [`StateRoot::begin_transaction`] is still open.
    #[track_caller]
    pub fn transaction(&mut self) -> Transaction<'_, T>
    where
        T: Clone,
    {
        match self.try_transaction() {
            Ok(tx) => tx,
            Err(e) => panic!("cannot open transaction: {e}"),
        }
    }

    /// Opens a scoped transaction, failing if one is already open.
    pub fn try_transaction(&mut self) -> Result<Transaction<'_, T>, TransactionError>
    where
        T: Clone,
    {
        Transaction::begin(self)
    }

    /// Runs `f` on the working copy inside a transaction.
    ///
    /// Commits if `f` returns `Ok`, rolls back if it returns `Err` or panics.
    #[track_caller]
    pub fn transact<R, E, F>(&mut self, f: F) -> Result<R, E>
    where
        T: Clone,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let mut tx = self.transaction();
        match f(&mut *tx) {
            Ok(r) => {
                tx.end();
                Ok(r)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    pub(crate) fn working(&self) -> &T {
        self.node.get()
    }

    pub(crate) fn working_mut(&mut self) -> &mut T
    where
        T: Clone,
    {
        self.node.get_mut()
    }

    /// Ends the open transaction. The caller guarantees that one is open.
    pub(crate) fn finish_transaction(&mut self, store: bool) -> Outcome {
        self.state = TransactionState::Idle;
        if store {
            *self.published.write() = self.node.payload().share();
            tracing::debug!(
                subscribers = self.publisher.len(),
                "transaction committed"
            );
            self.publisher.notify(self);
            Outcome::Committed
        } else {
            let published = self.published.read().share();
            self.node = Node::from_payload(published);
            tracing::debug!("transaction rolled back");
            Outcome::RolledBack
        }
    }
}

impl<T: Default> Default for StateRoot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateRoot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRoot")
            .field("state", &self.state)
            .field("published", &*self.detach())
            .field("subscribers", &self.publisher.len())
            .finish()
    }
}

/// Reads the published value of a [`StateRoot`] from anywhere.
///
/// Readers are cheap to clone and can be sent to other threads. A snapshot taken through a reader
/// always reflects a complete commit, never a transaction in progress.
pub struct SnapshotReader<T> {
    published: PublishedSlot<T>,
}

impl<T> SnapshotReader<T> {
    /// Returns a snapshot of the last published value.
    pub fn detach(&self) -> Detached<T> {
        Detached::from(self.published.read().share())
    }
}

impl<T> Clone for SnapshotReader<T> {
    fn clone(&self) -> Self {
        Self {
            published: Arc::clone(&self.published),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SnapshotReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnapshotReader").field(&*self.detach()).finish()
    }
}
