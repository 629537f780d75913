// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # cowstate: copy-on-write state with transactional updates
//!
//! This crate provides value handles that can be read freely and cheaply from many places, are
//! mutated through a single controlled write path that clones only when necessary, and are
//! published atomically so that readers never observe a partially mutated state.
//!
//! ## Handles
//!
//! Every handle references a [`Payload`]: one immutable, reference-counted instance of a value.
//! The unit of sharing is the whole payload; there is no structural sharing below it, other than
//! the sharing you get by building values out of nodes.
//!
//! - [`Node`]: a non-nullable owning handle. Reading never clones. Writing clones the value into a
//!   private payload first, unless the node is *unique*.
//! - [`OptNode`]: a nullable [`Node`]. Empty nodes are always unique.
//! - [`Leaf`] / [`OptLeaf`]: nodes without write access. Their value can only be replaced as a
//!   whole with `set`.
//! - [`Detached`] / [`OptDetached`]: read-only snapshots. Obtained with [`Node::detach`] and
//!   friends. A snapshot never changes, no matter what happens to the node it came from.
//!
//! ### Uniqueness
//!
//! An owning handle is *unique* when it may edit its payload in place without anyone else
//! noticing. Handles created from a value are unique. Cloning a handle shares its payload and
//! marks the clone as non-unique, so its first write clones. Taking a snapshot of a unique handle
//! also makes its next write clone, since the snapshot still references the old payload.
//!
//! Equality between handles of any kind is *shallow*: two handles are equal if they reference the
//! same payload instance.
//!
//! ```
//! use cowstate::Node;
//!
//! let mut node = Node::new(vec![1, 2, 3]);
//! let snapshot = node.detach();
//!
//! node.push(4); // clones, since `snapshot` references the current payload
//!
//! assert_eq!(*snapshot, [1, 2, 3]);
//! assert_eq!(*node, [1, 2, 3, 4]);
//! assert!(node != snapshot);
//! ```
//!
//! ## Transactions
//!
//! A [`StateRoot`] owns the top-level node of a state tree and the snapshot it has *published*.
//! Updates go through a [`Transaction`], which works on a private copy of the published value and
//! on scope exit either publishes it (a *commit*, after which subscribers are notified) or drops
//! it (a *rollback*). A transaction rolls back if it was cancelled, or if the scope is left by a
//! panic.
//!
//! ```
//! use cowstate::{RecordingSubscriber, StateRoot};
//!
//! let mut root = StateRoot::new(5);
//! let commits = RecordingSubscriber::new();
//! root.subscribe(commits.clone());
//!
//! {
//!     let mut tx = root.transaction();
//!     *tx = 10;
//! }
//! assert_eq!(*root.detach(), 10);
//! assert_eq!(commits.count(), 1);
//!
//! {
//!     let mut tx = root.transaction();
//!     *tx = 20;
//!     tx.cancel();
//! }
//! assert_eq!(*root.detach(), 10);
//! assert_eq!(commits.count(), 1);
//! ```
//!
//! ## Threads
//!
//! Payload reference counts are atomic, so snapshots can be sent to and read from other threads
//! while the owning thread keeps running transactions. A [`SnapshotReader`] lets other threads
//! fetch the latest published snapshot. A root itself only ever has one transaction open, and
//! that transaction runs on the thread that owns the root.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `trace` for copy-on-write clones and in-place writes,
//! `debug` for transaction boundaries, and `warn` for rollbacks forced by a panic.
//!
//! ## Features
//!
//! - `serde`: Provides `serde` support for all handle types. Handles serialize as the value they
//!   hold; deserializing creates fresh, unique payloads.
//! - `arbitrary`: Implements `quickcheck::Arbitrary` for the handle types, useful for
//!   property-based testing.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod detached;
pub use detached::{Detached, OptDetached};
mod error;
pub use error::TransactionError;
mod handle;
pub use handle::DataHolder;
mod macros;
mod node;
mod leaf;
pub use leaf::{Leaf, OptLeaf};
pub use node::{Node, OptNode};
mod payload;
pub use payload::Payload;
pub mod publisher;
pub use publisher::{RecordingSubscriber, Subscriber, SubscriptionId};
mod root;
pub use root::{SnapshotReader, StateRoot, TransactionState};
mod transaction;
pub use transaction::{Outcome, Transaction};

#[cfg(any(test, feature = "arbitrary"))]
mod arbitrary;

#[cfg(test)]
mod properties;
