//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use cowstate::{Node, OptNode};
use tracing_subscriber::EnvFilter;

/// Routes library logs to the test output. Set `RUST_LOG=cowstate=trace` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
pub struct Account {
    pub owner: Node<String>,
    pub balance: Node<i64>,
}

impl Account {
    pub fn new(owner: &str, balance: i64) -> Self {
        Self {
            owner: Node::new(owner.to_string()),
            balance: Node::new(balance),
        }
    }
}

/// A small application state: a named ledger with two accounts and an optional audit note.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub name: Node<String>,
    pub checking: Node<Account>,
    pub savings: Node<Account>,
    pub note: OptNode<String>,
}

impl Ledger {
    pub fn sample() -> Self {
        Self {
            name: Node::new("household".to_string()),
            checking: Node::new(Account::new("alice", 100)),
            savings: Node::new(Account::new("alice", 1_000)),
            note: OptNode::none(),
        }
    }
}
