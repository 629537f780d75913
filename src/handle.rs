// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The ownership bookkeeping shared by [`Node`](crate::Node) and [`OptNode`](crate::OptNode).
//!
//! A [`Handle`] couples an optional [`Payload`] with a *uniqueness* flag. The flag is a logical
//! token: it says that this handle may edit its payload in place without any other owning handle
//! noticing. It is set when a handle constructs or replaces its payload, and cleared when a handle
//! is created by sharing someone else's payload.
//!
//! The flag alone is not enough in safe Rust: a [`Detached`](crate::Detached) snapshot may still
//! alias a payload whose owner believes itself unique. In-place access therefore also requires the
//! payload to be exclusive, so taking a snapshot makes the owner's next write clone.
//!
//! Every mutating operation on the owning handle kinds goes through [`Handle::get_mut`] or
//! [`Handle::set`]; those are the only places where copy-on-write happens.

use crate::payload::Payload;
use std::{fmt, mem};

/// Types that hold a reference to a [`Payload`].
///
/// All handle kinds implement this, and equality between any two of them is *shallow*: two
/// handles are equal if they reference the same payload instance, regardless of whether the
/// values would compare equal.
pub trait DataHolder<T> {
    /// The payload currently referenced, if any.
    fn payload(&self) -> Option<&Payload<T>>;

    /// Returns true if both handles reference the same payload instance, or are both empty.
    fn shallow_eq<H>(&self, other: &H) -> bool
    where
        H: DataHolder<T> + ?Sized,
    {
        match (self.payload(), other.payload()) {
            (Some(a), Some(b)) => Payload::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Payload reference plus uniqueness flag.
pub(crate) struct Handle<T> {
    data: Option<Payload<T>>,
    unique: bool,
}

impl<T> Handle<T> {
    /// A handle with no payload. Empty handles are always unique.
    pub(crate) const fn empty() -> Self {
        Self {
            data: None,
            unique: true,
        }
    }

    /// A handle owning a freshly allocated payload.
    pub(crate) fn construct(value: T) -> Self {
        Self {
            data: Some(Payload::construct(value)),
            unique: true,
        }
    }

    /// A handle adopting `payload` without claiming ownership of it.
    pub(crate) fn shared(payload: Payload<T>) -> Self {
        Self {
            data: Some(payload),
            unique: false,
        }
    }

    /// Shares the payload of `self` into a new handle.
    ///
    /// The copy is never unique unless it is empty. The uniqueness of `self` is left alone;
    /// its next write will see the raised reference count and clone.
    pub(crate) fn shallow_copy(&self) -> Self {
        Self {
            data: self.data.clone(),
            unique: self.data.is_none(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Whether a write through this handle may edit the payload in place.
    pub(crate) fn is_unique(&self) -> bool {
        self.unique && self.data.as_ref().is_none_or(Payload::is_exclusive)
    }

    pub(crate) fn payload(&self) -> Option<&Payload<T>> {
        self.data.as_ref()
    }

    pub(crate) fn into_payload(self) -> Option<Payload<T>> {
        self.data
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Adopts `payload` by sharing it, or becomes empty if there is none.
    pub(crate) fn attach_to(&mut self, payload: Option<&Payload<T>>) {
        self.data = payload.map(Payload::share);
        // attached handles are not unique, unless there is nothing to share
        self.unique = self.data.is_none();
    }

    /// Moves the payload and uniqueness out of `self`, leaving it empty.
    pub(crate) fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Takes over the payload and uniqueness of `other`, leaving `other` empty.
    pub(crate) fn take_data(&mut self, other: &mut Handle<T>) {
        *self = other.take();
    }

    /// Installs a payload that nobody else owns. We are unique again.
    pub(crate) fn replace_with(&mut self, payload: Payload<T>) {
        self.data = Some(payload);
        self.unique = true;
    }

    /// Move-assignment between owning handles.
    ///
    /// A unique destination only held a private instance, so it can absorb `other`'s reference
    /// directly. Otherwise the destination is rebuilt as unique around that reference. Either way
    /// `other` is left empty.
    pub(crate) fn checked_replace(&mut self, other: &mut Handle<T>) {
        let incoming = other.take();
        match incoming.data {
            Some(payload) if self.unique => self.data = Some(payload),
            Some(payload) => self.replace_with(payload),
            None => *self = Self::empty(),
        }
    }

    /// Drops the payload reference.
    pub(crate) fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Assigns a new value, in place if unique, otherwise into a new payload.
    ///
    /// An empty handle gets a new payload.
    pub(crate) fn set(&mut self, value: T) {
        if self.unique
            && let Some(slot) = self.data.as_mut().and_then(Payload::exclusive_mut)
        {
            tracing::trace!("assigning value in place");
            *slot = value;
            return;
        }
        tracing::trace!("assigning value into a new payload");
        self.replace_with(Payload::construct(value));
    }

    /// The write gate.
    ///
    /// Clones the current value into a new payload if this handle is not unique, then returns
    /// mutable access to the (now private) instance. Returns `None` for an empty handle.
    pub(crate) fn get_mut(&mut self) -> Option<&mut T>
    where
        T: Clone,
    {
        if !self.is_unique()
            && let Some(current) = &self.data
        {
            tracing::trace!(
                refs = current.ref_count(),
                logically_unique = self.unique,
                "copy-on-write clone"
            );
            let fresh = Payload::construct(T::clone(current));
            self.replace_with(fresh);
        }
        // exclusive at this point, so make_mut never clones
        self.data.as_mut().map(Payload::make_mut)
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("unique", &self.unique)
            .field("data", &self.data)
            .finish()
    }
}
