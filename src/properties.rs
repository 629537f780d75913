// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Property tests for the handle and transaction protocol.

use crate::{DataHolder, Node, Outcome, RecordingSubscriber, StateRoot};
use quickcheck::{Arbitrary, Gen};
use std::panic::{self, AssertUnwindSafe};

fn ptr<T, H: DataHolder<T>>(h: &H) -> *const T {
    h.payload().expect("handle is not empty").as_ptr()
}

#[quickcheck]
fn unique_write_keeps_identity(value: Vec<u8>, push: u8) {
    let mut n = Node::new(value);
    assert!(n.is_unique());
    let before = ptr(&n);
    n.push(push);
    assert_eq!(ptr(&n), before);
}

#[quickcheck]
fn shared_write_allocates_and_isolates(value: Vec<u8>, push: u8) {
    let n = Node::new(value.clone());
    let mut shared = n.clone();
    assert!(!shared.is_unique());
    shared.push(push);
    assert_ne!(ptr(&shared), ptr(&n));
    assert_eq!(*n, value);
    assert!(shared.is_unique());
}

#[quickcheck]
fn copy_shares_and_is_not_unique(n: Node<String>) {
    let copy = n.clone();
    assert!(copy == n);
    assert!(!copy.is_unique());
}

#[quickcheck]
fn take_moves_payload_and_uniqueness(n: Node<u32>, share_first: bool) {
    let mut n = n;
    let _keep = share_first.then(|| n.clone());
    let before = ptr(&n);
    let was_unique = n.is_unique();
    let moved = n.take();
    assert!(n.is_empty());
    assert_eq!(ptr(&moved), before);
    assert_eq!(moved.is_unique(), was_unique);
}

#[quickcheck]
fn detached_snapshot_never_changes(value: Vec<u8>, writes: Vec<u8>) {
    let mut n = Node::new(value.clone());
    let d = n.detach();
    for w in writes {
        if w % 2 == 0 {
            n.push(w);
        } else {
            n.set(vec![w]);
        }
    }
    assert_eq!(*d, value);
}

#[quickcheck]
fn commit_is_visible_and_notified_once(v0: u32, v1: u32) {
    let mut root = StateRoot::new(v0);
    let recorder = RecordingSubscriber::new();
    root.subscribe(recorder.clone());
    {
        let mut tx = root.transaction();
        *tx = v1;
    }
    assert_eq!(*root.detach(), v1);
    assert_eq!(recorder.count(), 1);
    assert!(recorder.last().expect("one commit") == root.detach());
}

fn write_then_panic(root: &mut StateRoot<u32>, value: u32) {
    let mut tx = root.transaction();
    *tx = value;
    panic!("aborting transaction");
}

#[quickcheck]
fn rollback_restores_and_stays_silent(v0: u32, v1: u32, unwind: bool) {
    let mut root = StateRoot::new(v0);
    let recorder = RecordingSubscriber::new();
    root.subscribe(recorder.clone());
    let before = root.detach();
    if unwind {
        let result = panic::catch_unwind(AssertUnwindSafe(|| write_then_panic(&mut root, v1)));
        assert!(result.is_err());
    } else {
        let mut tx = root.transaction();
        *tx = v1;
        tx.cancel();
    }
    let after = root.detach();
    assert_eq!(*after, v0);
    // no spurious clone was published
    assert!(after == before);
    assert_eq!(recorder.count(), 0);
}

/// One step of a random transaction history.
#[derive(Debug, Clone)]
struct Step {
    push: Vec<u8>,
    commit: bool,
}

impl Arbitrary for Step {
    fn arbitrary(g: &mut Gen) -> Self {
        Step {
            push: Vec::arbitrary(g),
            commit: bool::arbitrary(g),
        }
    }
}

#[quickcheck]
fn transaction_history_matches_model(initial: Vec<u8>, steps: Vec<Step>) {
    let mut root = StateRoot::new(initial.clone());
    let recorder = RecordingSubscriber::new();
    root.subscribe(recorder.clone());
    let mut model = initial;
    let mut commits = 0;
    for step in steps {
        let before = root.detach();
        let mut tx = root.transaction();
        tx.extend_from_slice(&step.push);
        if !step.commit {
            tx.cancel();
        }
        let outcome = tx.end();
        if step.commit {
            model.extend_from_slice(&step.push);
            commits += 1;
            assert_eq!(outcome, Outcome::Committed);
        } else {
            assert_eq!(outcome, Outcome::RolledBack);
            assert!(root.detach() == before);
        }
        assert_eq!(*root.detach(), model);
        assert_eq!(recorder.count(), commits);
    }
}
