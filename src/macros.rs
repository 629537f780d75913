// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Shallow equality between all handle kinds.
//!
//! Any two handles compare equal if they reference the same payload instance (or are both
//! empty). Values are never compared, so `Node::new(1) != Node::new(1)`.

use crate::{Detached, Leaf, Node, OptDetached, OptLeaf, OptNode};

macro_rules! shallow_eq {
    ($lhs:ident: $($rhs:ident),+) => {
        $(
            impl<T> PartialEq<$rhs<T>> for $lhs<T> {
                fn eq(&self, other: &$rhs<T>) -> bool {
                    $crate::handle::DataHolder::shallow_eq(self, other)
                }
            }
        )+

        impl<T> Eq for $lhs<T> {}
    };
}

shallow_eq!(Node: Node, OptNode, Leaf, OptLeaf, Detached, OptDetached);
shallow_eq!(OptNode: Node, OptNode, Leaf, OptLeaf, Detached, OptDetached);
shallow_eq!(Leaf: Node, OptNode, Leaf, OptLeaf, Detached, OptDetached);
shallow_eq!(OptLeaf: Node, OptNode, Leaf, OptLeaf, Detached, OptDetached);
shallow_eq!(Detached: Node, OptNode, Leaf, OptLeaf, Detached, OptDetached);
shallow_eq!(OptDetached: Node, OptNode, Leaf, OptLeaf, Detached, OptDetached);
