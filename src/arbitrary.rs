// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! `quickcheck::Arbitrary` for the handle types.
//!
//! Generated owning handles are always fresh and unique; shrinking shrinks the held value and
//! wraps every candidate in a new payload.

use crate::{Detached, Leaf, Node, OptDetached, OptLeaf, OptNode, Payload};
use quickcheck::{Arbitrary, Gen};

impl<T: Arbitrary> Arbitrary for Node<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        Node::new(T::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.get().shrink().map(Node::new))
    }
}

impl<T: Arbitrary> Arbitrary for OptNode<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        OptNode::from(Option::<T>::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.get().cloned().shrink().map(OptNode::from))
    }
}

impl<T: Arbitrary> Arbitrary for Leaf<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        Leaf::new(T::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.get().shrink().map(Leaf::new))
    }
}

impl<T: Arbitrary> Arbitrary for OptLeaf<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        OptLeaf::from(Option::<T>::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.get().cloned().shrink().map(OptLeaf::from))
    }
}

impl<T: Arbitrary> Arbitrary for Detached<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        Detached::from(Payload::construct(T::arbitrary(g)))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(
            self.get()
                .shrink()
                .map(|value| Detached::from(Payload::construct(value))),
        )
    }
}

impl<T: Arbitrary> Arbitrary for OptDetached<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        OptDetached::from(Option::<T>::arbitrary(g).map(Payload::construct))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(
            self.get()
                .cloned()
                .shrink()
                .map(|value| OptDetached::from(value.map(Payload::construct))),
        )
    }
}
