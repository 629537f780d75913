// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Nodes whose value is only ever replaced as a whole.
//!
//! A [`Leaf`] is a [`Node`] without the write gate: it can be read, assigned a new value, moved
//! and detached, but there is no `&mut T` access. Small scalar state (a name, a counter, a flag)
//! is usually best kept in leaves, where an accidental in-place edit cannot happen.
//!
//! ```compile_fail
//! use cowstate::Leaf;
//!
//! let mut tags = Leaf::new(vec!["a"]);
//! tags.push("b"); // no DerefMut
//! ```
//!
//! ```
//! use cowstate::Leaf;
//!
//! let mut tags = Leaf::new(vec!["a"]);
//! let mut next = tags.to_vec();
//! next.push("b");
//! tags.set(next);
//! assert_eq!(*tags, ["a", "b"]);
//! ```

use crate::{
    detached::{Detached, OptDetached},
    handle::DataHolder,
    node::{Node, OptNode},
    payload::Payload,
};
use std::{fmt, ops::Deref};

/// A non-nullable handle whose value can only be replaced, never edited in place.
pub struct Leaf<T>(Node<T>);

impl<T> Leaf<T> {
    pub fn new(value: T) -> Self {
        Self(Node::new(value))
    }

    /// Creates a leaf that shares an existing payload. It is not unique.
    pub fn from_payload(payload: Payload<T>) -> Self {
        Self(Node::from_payload(payload))
    }

    pub fn is_unique(&self) -> bool {
        self.0.is_unique()
    }

    /// Whether the payload of this leaf has been moved out with [`Leaf::take`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Panics
    ///
    /// If the leaf has been emptied by [`Leaf::take`].
    #[track_caller]
    pub fn get(&self) -> &T {
        self.0.get()
    }

    /// # Panics
    ///
    /// If the leaf has been emptied by [`Leaf::take`].
    #[track_caller]
    pub fn payload(&self) -> &Payload<T> {
        self.0.payload()
    }

    /// Assigns a new value. See [`Node::set`].
    pub fn set(&mut self, value: impl Into<T>) {
        self.0.set(value);
    }

    /// Moves `other` into this leaf. See [`Node::assign`].
    pub fn assign(&mut self, other: Leaf<T>) {
        self.0.assign(other.0);
    }

    pub fn assign_from(&mut self, other: &mut Leaf<T>) {
        self.0.assign_from(&mut other.0);
    }

    /// Makes this leaf share the payload of `other`.
    pub fn attach_to(&mut self, other: &Leaf<T>) {
        self.0.attach_to(&other.0);
    }

    /// Moves the payload and uniqueness out into a new leaf, leaving `self` empty.
    pub fn take(&mut self) -> Leaf<T> {
        Self(self.0.take())
    }

    #[track_caller]
    pub fn detach(&self) -> Detached<T> {
        self.0.detach()
    }

    #[track_caller]
    pub fn into_value(self) -> T
    where
        T: Clone,
    {
        self.0.into_value()
    }
}

impl<T> Clone for Leaf<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Leaf<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> From<T> for Leaf<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Default> Default for Leaf<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> DataHolder<T> for Leaf<T> {
    fn payload(&self) -> Option<&Payload<T>> {
        DataHolder::payload(&self.0)
    }
}

impl<T: fmt::Debug> fmt::Debug for Leaf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Leaf").field(&self.0).finish()
    }
}

/// A nullable [`Leaf`].
pub struct OptLeaf<T>(OptNode<T>);

impl<T> OptLeaf<T> {
    pub fn new(value: T) -> Self {
        Self(OptNode::new(value))
    }

    pub const fn none() -> Self {
        Self(OptNode::none())
    }

    pub fn from_payload(payload: Payload<T>) -> Self {
        Self(OptNode::from_payload(payload))
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_unique(&self) -> bool {
        self.0.is_unique()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.get()
    }

    pub fn payload(&self) -> Option<&Payload<T>> {
        self.0.payload()
    }

    /// Assigns a new value, populating the leaf if it is empty.
    pub fn set(&mut self, value: impl Into<T>) {
        self.0.set(value);
    }

    pub fn reset(&mut self) {
        self.0.reset();
    }

    pub fn assign(&mut self, other: OptLeaf<T>) {
        self.0.assign(other.0);
    }

    pub fn assign_from(&mut self, other: &mut OptLeaf<T>) {
        self.0.assign_from(&mut other.0);
    }

    /// Makes this leaf share the payload of any other handle, or become empty if `other` is.
    pub fn attach_to<H>(&mut self, other: &H)
    where
        H: DataHolder<T> + ?Sized,
    {
        self.0.attach_to(other);
    }

    pub fn take(&mut self) -> OptLeaf<T> {
        Self(self.0.take())
    }

    /// Converts into a [`Leaf`], or `None` if empty.
    pub fn into_leaf(self) -> Option<Leaf<T>> {
        self.0.into_node().map(Leaf)
    }

    pub fn detach(&self) -> OptDetached<T> {
        self.0.detach()
    }
}

impl<T> Clone for OptLeaf<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for OptLeaf<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> Deref for OptLeaf<T> {
    type Target = T;

    /// # Panics
    ///
    /// If the leaf is empty.
    #[track_caller]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> From<Leaf<T>> for OptLeaf<T> {
    /// Takes over the payload and uniqueness of `leaf`.
    fn from(leaf: Leaf<T>) -> Self {
        Self(OptNode::from(leaf.0))
    }
}

impl<T> From<Option<T>> for OptLeaf<T> {
    fn from(value: Option<T>) -> Self {
        Self(OptNode::from(value))
    }
}

impl<T> DataHolder<T> for OptLeaf<T> {
    fn payload(&self) -> Option<&Payload<T>> {
        self.0.payload()
    }
}

impl<T: fmt::Debug> fmt::Debug for OptLeaf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptLeaf").field(&self.0).finish()
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{Leaf, OptLeaf};
    use crate::node::{Node, OptNode};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl<T: Serialize> Serialize for Leaf<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.0.serialize(serializer)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for Leaf<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Node::deserialize(deserializer).map(Leaf)
        }
    }

    impl<T: Serialize> Serialize for OptLeaf<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.0.serialize(serializer)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptLeaf<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            OptNode::deserialize(deserializer).map(OptLeaf)
        }
    }
}
