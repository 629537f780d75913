// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Reference-counted storage for a single immutable value.
//!
//! A [`Payload`] is the unit of sharing for every handle in this crate. It is a thin wrapper
//! around [`Arc`], so increments and decrements of the count are atomic and a payload may be
//! handed to other threads whenever `T: Send + Sync`.
//!
//! Handles never hold on to a `&T` or `&mut T` beyond the borrow of the handle itself; the
//! accessors here exist so that [`Node`](crate::Node) and friends can implement their read and
//! write paths.

use std::{fmt, ops::Deref, sync::Arc};

/// A shared, reference-counted instance of `T`.
///
/// Cloning a `Payload` is a shallow share: it bumps the reference count and aliases the same
/// allocation. Use [`Payload::ptr_eq`] to check identity.
pub struct Payload<T> {
    inner: Arc<T>,
}

impl<T> Payload<T> {
    /// Allocates a brand-new payload holding `value`.
    pub fn construct(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Returns a new reference to the same instance.
    pub fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Returns true if `a` and `b` reference the same instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// The address of the shared instance, used as its identity.
    pub fn as_ptr(&self) -> *const T {
        Arc::as_ptr(&self.inner)
    }

    /// Number of live references to this instance.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns true if no other reference to this instance exists.
    ///
    /// Once this returns true it stays true for as long as the caller holds `&mut self`, since
    /// nobody else can share the instance anymore.
    pub fn is_exclusive(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    pub(crate) fn get(&self) -> &T {
        &self.inner
    }

    /// In-place access, only when nobody else can observe the instance.
    pub(crate) fn exclusive_mut(&mut self) -> Option<&mut T> {
        Arc::get_mut(&mut self.inner)
    }

    /// In-place access, cloning the instance first if it is aliased.
    pub(crate) fn make_mut(&mut self) -> &mut T
    where
        T: Clone,
    {
        Arc::make_mut(&mut self.inner)
    }

    /// Consumes the payload and returns the value if this was the last reference.
    pub fn try_unwrap(self) -> Result<T, Self> {
        Arc::try_unwrap(self.inner).map_err(|inner| Self { inner })
    }
}

impl<T> Clone for Payload<T> {
    fn clone(&self) -> Self {
        self.share()
    }
}

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> From<Arc<T>> for Payload<T> {
    fn from(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

impl<T> From<Payload<T>> for Arc<T> {
    fn from(payload: Payload<T>) -> Self {
        payload.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for Payload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("ptr", &self.as_ptr())
            .field("refs", &self.ref_count())
            .field("value", self.get())
            .finish()
    }
}
