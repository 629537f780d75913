// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Owning, copy-on-write handles.
//!
//! [`Node`] always references a value; [`OptNode`] may be empty. Both follow the same rules:
//!
//! - reading never clones;
//! - writing clones the value into a fresh payload unless the handle is unique;
//! - cloning a handle shares the payload and marks the new handle as non-unique;
//! - there is no deep-copy assignment. Replacing the contents of a handle is done either with a
//!   value ([`Node::set`]) or by moving in another handle ([`Node::assign`]).
//!
//! Values held in nodes are usually structs whose fields are themselves nodes. Cloning such a
//! struct (which is what the write gate does when the outer node is shared) only shares the
//! inner payloads, so a write deep inside a tree clones exactly the path leading to it.
//!
//! ```
//! use cowstate::Node;
//!
//! #[derive(Clone)]
//! struct Settings {
//!     name: Node<String>,
//!     retries: Node<u32>,
//! }
//!
//! let mut a = Node::new(Settings {
//!     name: Node::new("primary".to_string()),
//!     retries: Node::new(3),
//! });
//! let b = a.clone();
//!
//! // `a` is shared with `b`, so this clones the outer struct, then the `retries` node.
//! a.retries.set(5u32);
//!
//! assert_eq!(*b.retries, 3);
//! assert_eq!(*a.retries, 5);
//! // the untouched field still references the same payload in both trees
//! assert!(a.name == b.name);
//! ```

use crate::{
    detached::{Detached, OptDetached},
    handle::{DataHolder, Handle},
    payload::Payload,
};
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

#[cold]
#[track_caller]
fn moved_out() -> ! {
    panic!("accessed a Node whose payload has been moved out")
}

#[cold]
#[track_caller]
fn empty_opt() -> ! {
    panic!("accessed an empty OptNode; check `is_some()` first")
}

/// A non-nullable, copy-on-write owning handle.
///
/// A `Node` created from a value is unique. A `Node` created with [`Clone::clone`] shares its
/// source's payload and is not unique, so the first write through it clones.
///
/// The only way to observe an empty `Node` is [`Node::take`], which moves the payload out and
/// leaves the source empty. Accessing an empty `Node` is a contract violation and panics.
pub struct Node<T> {
    handle: Handle<T>,
}

impl<T> Node<T> {
    /// Creates a node owning a newly allocated `value`.
    pub fn new(value: T) -> Self {
        Self {
            handle: Handle::construct(value),
        }
    }

    /// Creates a node that shares an existing payload.
    ///
    /// The node is not unique; its first write clones.
    pub fn from_payload(payload: Payload<T>) -> Self {
        Self {
            handle: Handle::shared(payload),
        }
    }

    /// Whether a write through this node would edit its payload in place.
    pub fn is_unique(&self) -> bool {
        self.handle.is_unique()
    }

    /// Whether the payload of this node has been moved out with [`Node::take`].
    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    /// Read access. Never clones.
    ///
    /// # Panics
    ///
    /// If the node has been emptied by [`Node::take`].
    #[track_caller]
    pub fn get(&self) -> &T {
        self.handle.get().unwrap_or_else(|| moved_out())
    }

    /// Write access. Clones the value into a private payload first unless this node is unique.
    ///
    /// # Panics
    ///
    /// If the node has been emptied by [`Node::take`].
    #[track_caller]
    pub fn get_mut(&mut self) -> &mut T
    where
        T: Clone,
    {
        self.handle.get_mut().unwrap_or_else(|| moved_out())
    }

    /// The payload referenced by this node.
    ///
    /// # Panics
    ///
    /// If the node has been emptied by [`Node::take`].
    #[track_caller]
    pub fn payload(&self) -> &Payload<T> {
        self.handle.payload().unwrap_or_else(|| moved_out())
    }

    /// Assigns a new value.
    ///
    /// A unique node overwrites its value in place. Otherwise a new payload is allocated for
    /// `value` and the node becomes unique.
    pub fn set(&mut self, value: impl Into<T>) {
        self.handle.set(value.into());
    }

    /// Moves `other` into this node.
    ///
    /// This is the only node-to-node assignment. A unique node simply absorbs `other`'s payload
    /// reference; a shared one is rebuilt as unique around it. No value is cloned.
    pub fn assign(&mut self, mut other: Node<T>) {
        self.assign_from(&mut other);
    }

    /// Like [`Node::assign`], but leaves `other` empty instead of consuming it.
    pub fn assign_from(&mut self, other: &mut Node<T>) {
        self.handle.checked_replace(&mut other.handle);
    }

    /// Makes this node share the payload of `other`.
    ///
    /// Used to splice an existing value into a new position without copying it. The node is no
    /// longer unique afterwards.
    pub fn attach_to(&mut self, other: &Node<T>) {
        self.handle.attach_to(other.handle.payload());
    }

    /// Moves the payload and uniqueness out into a new node, leaving `self` empty.
    pub fn take(&mut self) -> Node<T> {
        Node {
            handle: self.handle.take(),
        }
    }

    /// Returns a read-only snapshot of the current value.
    ///
    /// Subsequent writes through this node clone instead of mutating the snapshot.
    ///
    /// # Panics
    ///
    /// If the node has been emptied by [`Node::take`].
    #[track_caller]
    pub fn detach(&self) -> Detached<T> {
        Detached::from(self.payload().share())
    }

    /// Unwraps the value, cloning it if the payload is still shared.
    ///
    /// # Panics
    ///
    /// If the node has been emptied by [`Node::take`].
    #[track_caller]
    pub fn into_value(self) -> T
    where
        T: Clone,
    {
        let payload = self.handle.into_payload().unwrap_or_else(|| moved_out());
        match payload.try_unwrap() {
            Ok(value) => value,
            Err(shared) => T::clone(&shared),
        }
    }
}

impl<T> Clone for Node<T> {
    /// Shares the payload. The new node is not unique.
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.shallow_copy(),
        }
    }
}

impl<T> Deref for Node<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: Clone> DerefMut for Node<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T> From<T> for Node<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Default> Default for Node<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> DataHolder<T> for Node<T> {
    fn payload(&self) -> Option<&Payload<T>> {
        self.handle.payload()
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle.get() {
            Some(value) => f
                .debug_struct("Node")
                .field("unique", &self.is_unique())
                .field("value", value)
                .finish(),
            None => f.write_str("Node(<moved>)"),
        }
    }
}

/// A nullable, copy-on-write owning handle.
///
/// An empty `OptNode` is always unique since there is nothing to share. A non-empty clone is not
/// unique, as with [`Node`].
pub struct OptNode<T> {
    handle: Handle<T>,
}

impl<T> OptNode<T> {
    /// Creates a populated node owning a newly allocated `value`.
    pub fn new(value: T) -> Self {
        Self {
            handle: Handle::construct(value),
        }
    }

    /// Creates an empty node.
    pub const fn none() -> Self {
        Self {
            handle: Handle::empty(),
        }
    }

    /// Creates a node that shares an existing payload. It is not unique.
    pub fn from_payload(payload: Payload<T>) -> Self {
        Self {
            handle: Handle::shared(payload),
        }
    }

    pub fn is_some(&self) -> bool {
        !self.handle.is_empty()
    }

    pub fn is_none(&self) -> bool {
        self.handle.is_empty()
    }

    /// Whether a write through this node would edit its payload in place.
    pub fn is_unique(&self) -> bool {
        self.handle.is_unique()
    }

    /// Read access. Never clones.
    pub fn get(&self) -> Option<&T> {
        self.handle.get()
    }

    /// Write access. Clones the value into a private payload first unless this node is unique.
    pub fn get_mut(&mut self) -> Option<&mut T>
    where
        T: Clone,
    {
        self.handle.get_mut()
    }

    pub fn payload(&self) -> Option<&Payload<T>> {
        self.handle.payload()
    }

    /// Assigns a new value, populating the node if it is empty.
    pub fn set(&mut self, value: impl Into<T>) {
        self.handle.set(value.into());
    }

    /// Empties the node, releasing its payload reference.
    pub fn reset(&mut self) {
        self.handle.reset();
    }

    /// Moves `other` into this node. See [`Node::assign`].
    pub fn assign(&mut self, mut other: OptNode<T>) {
        self.assign_from(&mut other);
    }

    /// Like [`OptNode::assign`], but leaves `other` empty instead of consuming it.
    pub fn assign_from(&mut self, other: &mut OptNode<T>) {
        self.handle.checked_replace(&mut other.handle);
    }

    /// Makes this node share the payload of any other handle, or become empty if `other` is.
    ///
    /// A populated node is not unique afterwards.
    pub fn attach_to<H>(&mut self, other: &H)
    where
        H: DataHolder<T> + ?Sized,
    {
        self.handle.attach_to(other.payload());
    }

    /// Moves the payload and uniqueness out into a new node, leaving `self` empty.
    pub fn take(&mut self) -> OptNode<T> {
        OptNode {
            handle: self.handle.take(),
        }
    }

    /// Converts into a [`Node`], or `None` if empty.
    pub fn into_node(self) -> Option<Node<T>> {
        if self.is_some() {
            Some(Node {
                handle: self.handle,
            })
        } else {
            None
        }
    }

    /// Returns a read-only snapshot of the current value, which may be empty.
    pub fn detach(&self) -> OptDetached<T> {
        self.handle
            .payload()
            .map_or_else(OptDetached::none, |payload| {
                OptDetached::from(payload.share())
            })
    }
}

impl<T> Clone for OptNode<T> {
    /// Shares the payload. A populated copy is not unique; an empty one is.
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.shallow_copy(),
        }
    }
}

impl<T> Default for OptNode<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> Deref for OptNode<T> {
    type Target = T;

    /// # Panics
    ///
    /// If the node is empty.
    #[track_caller]
    fn deref(&self) -> &T {
        self.get().unwrap_or_else(|| empty_opt())
    }
}

impl<T: Clone> DerefMut for OptNode<T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut().unwrap_or_else(|| empty_opt())
    }
}

impl<T> From<Node<T>> for OptNode<T> {
    /// Takes over the payload and uniqueness of `node`.
    fn from(mut node: Node<T>) -> Self {
        let mut opt = Self::none();
        opt.handle.take_data(&mut node.handle);
        opt
    }
}

impl<T> From<Option<T>> for OptNode<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::none, Self::new)
    }
}

impl<T> DataHolder<T> for OptNode<T> {
    fn payload(&self) -> Option<&Payload<T>> {
        self.handle.payload()
    }
}

impl<T: fmt::Debug> fmt::Debug for OptNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle.get() {
            Some(value) => f
                .debug_struct("OptNode")
                .field("unique", &self.is_unique())
                .field("value", value)
                .finish(),
            None => f.write_str("OptNode(None)"),
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{Node, OptNode};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl<T: Serialize> Serialize for Node<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.get().serialize(serializer)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for Node<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            T::deserialize(deserializer).map(Node::new)
        }
    }

    impl<T: Serialize> Serialize for OptNode<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.get().serialize(serializer)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptNode<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Option::<T>::deserialize(deserializer).map(OptNode::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptr<T, H: DataHolder<T>>(h: &H) -> *const T {
        h.payload().unwrap().as_ptr()
    }

    #[test]
    fn new_node_is_unique() {
        let n = Node::new(1);
        assert!(n.is_unique());
        assert_eq!(*n, 1);
    }

    #[test]
    fn write_to_unique_keeps_identity() {
        let mut n = Node::new(vec![1]);
        let before = ptr(&n);
        n.push(2);
        assert_eq!(ptr(&n), before);
        assert_eq!(*n, vec![1, 2]);
    }

    #[test]
    fn clone_shares_and_is_not_unique() {
        let n = Node::new(String::from("a"));
        let c = n.clone();
        assert_eq!(ptr(&n), ptr(&c));
        assert!(!c.is_unique());
        assert!(n == c);
    }

    #[test]
    fn write_to_clone_copies() {
        let n = Node::new(vec![1]);
        let mut c = n.clone();
        c.push(2);
        assert_ne!(ptr(&n), ptr(&c));
        assert_eq!(*n, vec![1]);
        assert_eq!(*c, vec![1, 2]);
        assert!(c.is_unique());
    }

    #[test]
    fn take_empties_source() {
        let mut n = Node::new(4);
        let before = ptr(&n);
        let m = n.take();
        assert!(n.is_empty());
        assert!(m.is_unique());
        assert_eq!(ptr(&m), before);
    }

    #[test]
    #[should_panic(expected = "moved out")]
    fn reading_taken_node_panics() {
        let mut n = Node::new(4);
        let _m = n.take();
        let _value: i32 = *n;
    }

    #[test]
    fn set_unique_in_place() {
        let mut n = Node::new(1);
        let before = ptr(&n);
        n.set(2);
        assert_eq!(ptr(&n), before);
        assert_eq!(*n, 2);
    }

    #[test]
    fn set_shared_reallocates() {
        let mut n = Node::new(1);
        let c = n.clone();
        n.set(2);
        assert_ne!(ptr(&n), ptr(&c));
        assert!(n.is_unique());
        assert_eq!(*c, 1);
    }

    #[test]
    fn set_converts_value() {
        let mut n: Node<String> = Node::new(String::new());
        n.set("converted");
        assert_eq!(n.as_str(), "converted");
    }

    #[test]
    fn assign_moves_payload_without_cloning() {
        let mut dst = Node::new(1);
        let src = Node::new(2);
        let incoming = ptr(&src);
        dst.assign(src);
        assert_eq!(ptr(&dst), incoming);
        assert!(dst.is_unique());
    }

    #[test]
    fn assign_into_shared_destination() {
        let original = Node::new(1);
        let mut dst = original.clone();
        let mut src = Node::new(2);
        dst.assign_from(&mut src);
        assert!(src.is_empty());
        assert_eq!(*dst, 2);
        assert_eq!(*original, 1);
        assert!(dst.is_unique());
    }

    #[test]
    fn attach_to_splices_without_copy() {
        let a = Node::new(1);
        let mut b = Node::new(2);
        b.attach_to(&a);
        assert!(a == b);
        assert!(!b.is_unique());
    }

    #[test]
    fn detach_then_write_clones() {
        let mut n = Node::new(1);
        let d = n.detach();
        assert!(n == d);
        *n = 2;
        assert_eq!(*d, 1);
        assert_eq!(*n, 2);
        assert!(n != d);
    }

    #[test]
    fn nested_write_clones_only_the_path() {
        #[derive(Clone)]
        struct Pair {
            left: Node<u32>,
            right: Node<u32>,
        }
        let mut a = Node::new(Pair {
            left: Node::new(1),
            right: Node::new(2),
        });
        let b = a.clone();
        a.left.set(10u32);
        assert!(a.right == b.right);
        assert!(a.left != b.left);
        assert_eq!(*b.left, 1);
    }

    #[test]
    fn into_value_unwraps_or_clones() {
        let n = Node::new(String::from("x"));
        let c = n.clone();
        assert_eq!(n.into_value(), "x");
        assert_eq!(c.into_value(), "x");
    }

    #[test]
    fn empty_opt_node_is_unique() {
        let o = OptNode::<u8>::none();
        assert!(o.is_none());
        assert!(o.is_unique());
        assert!(o.clone().is_unique());
        assert_eq!(o.get(), None);
    }

    #[test]
    fn populated_opt_clone_is_not_unique() {
        let o = OptNode::new(1);
        let c = o.clone();
        assert!(!c.is_unique());
        assert!(o == c);
    }

    #[test]
    fn opt_node_reset_and_set() {
        let mut o = OptNode::new(1);
        o.reset();
        assert!(o.is_none());
        o.set(3);
        assert_eq!(o.get(), Some(&3));
        assert!(o.is_unique());
    }

    #[test]
    fn opt_node_from_node_takes_data() {
        let n = Node::new(5);
        let before = ptr(&n);
        let o = OptNode::from(n);
        assert_eq!(ptr(&o), before);
        assert!(o.is_unique());
        let back = o.into_node().unwrap();
        assert_eq!(*back, 5);
        assert!(OptNode::<u8>::none().into_node().is_none());
    }

    #[test]
    fn opt_node_write_on_shared_clones() {
        let o = OptNode::new(vec![1]);
        let mut c = o.clone();
        c.get_mut().unwrap().push(2);
        assert_eq!(o.get(), Some(&vec![1]));
        assert_eq!(c.get(), Some(&vec![1, 2]));
    }

    #[test]
    fn opt_node_detach() {
        let mut o = OptNode::new(1);
        let d = o.detach();
        assert_eq!(d.get(), Some(&1));
        o.reset();
        assert!(o.detach().is_none());
        assert_eq!(*d, 1);
    }

    #[test]
    #[should_panic(expected = "empty OptNode")]
    fn deref_empty_opt_node_panics() {
        let o = OptNode::<u8>::none();
        let _value: u8 = *o;
    }

    #[test]
    #[should_panic(expected = "empty OptNode")]
    fn write_through_empty_opt_node_panics() {
        let mut o = OptNode::<Vec<u8>>::none();
        assert_eq!(o.get_mut(), None);
        o.push(1);
    }

    #[test]
    fn opt_node_attaches_to_a_node() {
        let n = Node::new(String::from("shared"));
        let mut o = OptNode::<String>::none();
        o.attach_to(&n);
        assert!(o == n);
        assert!(!o.is_unique());

        o.get_mut().expect("attached").push_str(" and edited");
        assert_eq!(n.as_str(), "shared");
        assert_eq!(o.get().map(String::as_str), Some("shared and edited"));
    }

    #[test]
    fn opt_node_attaches_to_an_empty_source() {
        let mut o = OptNode::new(1);
        o.attach_to(&OptNode::<i32>::none());
        assert!(o.is_none());
        assert!(o.is_unique());

        let populated = OptNode::new(2);
        o.attach_to(&populated);
        assert!(o == populated);
        assert_eq!(o.get(), Some(&2));
    }

    #[test]
    fn opt_node_assign_from_empty_empties() {
        let mut o = OptNode::new(1);
        o.assign(OptNode::none());
        assert!(o.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_is_transparent() {
        let n = Node::new(vec![1, 2]);
        assert_eq!(serde_json::to_string(&n).unwrap(), "[1,2]");
        let back: Node<Vec<u8>> = serde_json::from_str("[3]").unwrap();
        assert!(back.is_unique());
        let o: OptNode<u8> = serde_json::from_str("null").unwrap();
        assert!(o.is_none());
    }
}
