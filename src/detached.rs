// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Read-only snapshots.
//!
//! A [`Detached`] holds a payload reference and nothing else. It cannot be written through, and
//! since the owning handles clone instead of writing into a payload that anyone else references,
//! the value seen through a snapshot never changes. Snapshots are `Send + Sync` whenever `T` is,
//! so they are the way to hand state to other threads.

use crate::{handle::DataHolder, payload::Payload};
use std::{fmt, ops::Deref};

#[cold]
#[track_caller]
fn empty_snapshot() -> ! {
    panic!("accessed an empty OptDetached; check `is_some()` first")
}

/// An immutable, never-empty snapshot.
pub struct Detached<T> {
    payload: Payload<T>,
}

impl<T> Detached<T> {
    pub fn get(&self) -> &T {
        &self.payload
    }

    pub fn payload(&self) -> &Payload<T> {
        &self.payload
    }

    pub fn into_payload(self) -> Payload<T> {
        self.payload
    }
}

impl<T> From<Payload<T>> for Detached<T> {
    fn from(payload: Payload<T>) -> Self {
        Self { payload }
    }
}

impl<T> Clone for Detached<T> {
    fn clone(&self) -> Self {
        Self {
            payload: self.payload.share(),
        }
    }
}

impl<T> Deref for Detached<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> DataHolder<T> for Detached<T> {
    fn payload(&self) -> Option<&Payload<T>> {
        Some(&self.payload)
    }
}

impl<T: fmt::Debug> fmt::Debug for Detached<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Detached").field(self.get()).finish()
    }
}

/// An immutable snapshot that may be empty.
pub struct OptDetached<T> {
    payload: Option<Payload<T>>,
}

impl<T> OptDetached<T> {
    pub const fn none() -> Self {
        Self { payload: None }
    }

    pub fn is_some(&self) -> bool {
        self.payload.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.payload.is_none()
    }

    pub fn get(&self) -> Option<&T> {
        self.payload.as_deref()
    }

    pub fn payload(&self) -> Option<&Payload<T>> {
        self.payload.as_ref()
    }

    /// Converts into a never-empty snapshot, or `None` if empty.
    pub fn into_detached(self) -> Option<Detached<T>> {
        self.payload.map(Detached::from)
    }
}

impl<T> Default for OptDetached<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> From<Payload<T>> for OptDetached<T> {
    fn from(payload: Payload<T>) -> Self {
        Self {
            payload: Some(payload),
        }
    }
}

impl<T> From<Option<Payload<T>>> for OptDetached<T> {
    fn from(payload: Option<Payload<T>>) -> Self {
        Self { payload }
    }
}

impl<T> From<Detached<T>> for OptDetached<T> {
    fn from(detached: Detached<T>) -> Self {
        Self::from(detached.into_payload())
    }
}

impl<T> From<&Detached<T>> for OptDetached<T> {
    fn from(detached: &Detached<T>) -> Self {
        Self::from(detached.payload().share())
    }
}

impl<T> Clone for OptDetached<T> {
    fn clone(&self) -> Self {
        Self {
            payload: self.payload.clone(),
        }
    }
}

impl<T> Deref for OptDetached<T> {
    type Target = T;

    /// # Panics
    ///
    /// If the snapshot is empty.
    #[track_caller]
    fn deref(&self) -> &T {
        self.get().unwrap_or_else(|| empty_snapshot())
    }
}

impl<T> DataHolder<T> for OptDetached<T> {
    fn payload(&self) -> Option<&Payload<T>> {
        self.payload.as_ref()
    }
}

impl<T: fmt::Debug> fmt::Debug for OptDetached<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("OptDetached").field(value).finish(),
            None => f.write_str("OptDetached(None)"),
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{Detached, OptDetached};
    use crate::payload::Payload;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl<T: Serialize> Serialize for Detached<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.get().serialize(serializer)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for Detached<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            T::deserialize(deserializer).map(|value| Detached::from(Payload::construct(value)))
        }
    }

    impl<T: Serialize> Serialize for OptDetached<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.get().serialize(serializer)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptDetached<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Option::<T>::deserialize(deserializer)
                .map(|value| OptDetached::from(value.map(Payload::construct)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    #[test]
    fn equality_is_identity() {
        let a = Detached::from(Payload::construct(1));
        let b = Detached::from(Payload::construct(1));
        assert!(a != b);
        assert!(a == a.clone());
    }

    #[test]
    fn detached_survives_source_write() {
        let mut n = Node::new(String::from("before"));
        let d = n.detach();
        n.push_str(" and after");
        assert_eq!(d.as_str(), "before");
        assert_eq!(n.as_str(), "before and after");
    }

    #[test]
    fn opt_detached_defaults_to_empty() {
        let d = OptDetached::<u8>::default();
        assert!(d.is_none());
        assert_eq!(d.get(), None);
        assert!(d.into_detached().is_none());
        assert!(OptDetached::<u8>::none() == OptDetached::<u8>::none());
    }

    #[test]
    fn opt_detached_from_detached_keeps_identity() {
        let d = Detached::from(Payload::construct(9));
        let o = OptDetached::from(&d);
        assert!(o == d);
        assert_eq!(*o, 9);
        let back = OptDetached::from(d.clone()).into_detached().unwrap();
        assert!(back == d);
    }

    #[test]
    #[should_panic(expected = "empty OptDetached")]
    fn deref_empty_opt_detached_panics() {
        let d = OptDetached::<u8>::none();
        let _value: u8 = *d;
    }

    #[test]
    fn snapshots_cross_threads() {
        let n = Node::new(vec![1, 2, 3]);
        let d = n.detach();
        let sum = std::thread::spawn(move || d.iter().sum::<i32>())
            .join()
            .unwrap();
        assert_eq!(sum, 6);
    }
}
