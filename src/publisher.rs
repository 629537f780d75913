// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Observe commits to a [`StateRoot`].
//!
//! Subscribers are called synchronously, on the committing thread, right after a transaction has
//! been published. They receive a shared reference to the root, so they can take snapshots with
//! [`StateRoot::detach`] but cannot open a new transaction from within the notification.
//!
//! Rolled-back transactions are never reported.

use crate::{Detached, StateRoot};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::{fmt, sync::Arc};

/// Receives a notification after every successful commit.
///
/// Implemented for every `Fn(&StateRoot<T>)`.
pub trait Subscriber<T> {
    fn on_commit(&self, root: &StateRoot<T>);
}

impl<T, F> Subscriber<T> for F
where
    F: Fn(&StateRoot<T>),
{
    fn on_commit(&self, root: &StateRoot<T>) {
        self(root)
    }
}

/// Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type BoxedSubscriber<T> = Box<dyn Subscriber<T> + Send>;

/// The ordered list of subscribers of one root.
pub(crate) struct Publisher<T> {
    next_id: u64,
    // most roots have one or two subscribers
    subscribers: SmallVec<[(SubscriptionId, BoxedSubscriber<T>); 2]>,
}

impl<T> Publisher<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: SmallVec::new(),
        }
    }

    pub(crate) fn subscribe(&mut self, subscriber: BoxedSubscriber<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        before != self.subscribers.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Calls every subscriber in subscription order.
    pub(crate) fn notify(&self, root: &StateRoot<T>) {
        for (_, subscriber) in &self.subscribers {
            subscriber.on_commit(root);
        }
    }
}

impl<T> fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// A subscriber that records a snapshot of every commit it sees.
///
/// Clones share the same record, so one copy can be subscribed while another is inspected. This
/// is mostly useful for tests.
pub struct RecordingSubscriber<T> {
    commits: Arc<Mutex<Vec<Detached<T>>>>,
}

impl<T> RecordingSubscriber<T> {
    pub fn new() -> Self {
        Self {
            commits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of commits observed so far.
    pub fn count(&self) -> usize {
        self.commits.lock().len()
    }

    /// The published snapshot of every observed commit, oldest first.
    pub fn snapshots(&self) -> Vec<Detached<T>> {
        self.commits.lock().clone()
    }

    pub fn last(&self) -> Option<Detached<T>> {
        self.commits.lock().last().cloned()
    }
}

impl<T> Default for RecordingSubscriber<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RecordingSubscriber<T> {
    fn clone(&self) -> Self {
        Self {
            commits: Arc::clone(&self.commits),
        }
    }
}

impl<T> Subscriber<T> for RecordingSubscriber<T> {
    fn on_commit(&self, root: &StateRoot<T>) {
        self.commits.lock().push(root.detach());
    }
}
