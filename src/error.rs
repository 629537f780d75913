// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Errors reported by the low-level transaction API of [`StateRoot`](crate::StateRoot).

use thiserror::Error;

/// Misuse of [`StateRoot::begin_transaction`](crate::StateRoot::begin_transaction) and
/// [`StateRoot::end_transaction`](crate::StateRoot::end_transaction).
///
/// The scoped [`Transaction`](crate::Transaction) API cannot produce these: it borrows the root
/// mutably for its whole lifetime and ends exactly once.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A transaction was begun while another one is still open on the same root.
    #[error("a transaction is already open on this root")]
    AlreadyInTransaction,

    /// A transaction was ended while none is open.
    #[error("no transaction is open on this root")]
    NotInTransaction,
}
