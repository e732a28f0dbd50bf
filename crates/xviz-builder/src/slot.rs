// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sub-builder binding lifecycle.
//!
//! A [`Slot`] records which item of a builder family is open. It owns no
//! data: edits go straight into the parent message through the handle that
//! [`Slot::data`] returns, so ending a slot is bookkeeping only.
//!
//! Every select operation calls [`Slot::open`], which ends the previous
//! binding before starting the new one. Combined with the `&mut` borrow a
//! sub-builder holds, at most one item per family is ever live.

use std::collections::BTreeMap;
use std::fmt::Debug;

use tracing::trace;

use crate::error::BuildError;

/// Keyed storage a slot can resolve its binding against.
pub trait Storage<K> {
    /// Item type.
    type Value;

    /// Returns the item for `key`, inserting a default one if absent.
    fn entry_mut(&mut self, key: &K) -> &mut Self::Value;
}

impl<V: Default> Storage<String> for BTreeMap<String, V> {
    type Value = V;

    fn entry_mut(&mut self, key: &String) -> &mut V {
        self.entry(key.clone()).or_default()
    }
}

impl<V: Default> Storage<usize> for Vec<V> {
    type Value = V;

    fn entry_mut(&mut self, key: &usize) -> &mut V {
        if *key >= self.len() {
            self.resize_with(key + 1, V::default);
        }
        &mut self[*key]
    }
}

/// Binding state of one builder family.
#[derive(Debug, Clone)]
pub struct Slot<K> {
    family: &'static str,
    bound: Option<K>,
}

impl<K: Clone + Debug> Slot<K> {
    /// Unbound slot for `family` (used in errors and traces).
    pub const fn new(family: &'static str) -> Self {
        Self { family, bound: None }
    }

    /// Binds the slot; fails if it is already bound.
    pub fn start(&mut self, key: K) -> Result<(), BuildError> {
        if let Some(current) = &self.bound {
            return Err(BuildError::AlreadyStarted { builder: self.family, key: format!("{current:?}") });
        }
        trace!(builder = self.family, ?key, "start");
        self.bound = Some(key);
        Ok(())
    }

    /// Releases the binding. A no-op when unbound.
    pub fn end(&mut self) -> Option<K> {
        let key = self.bound.take();
        if let Some(key) = &key {
            trace!(builder = self.family, ?key, "end");
        }
        key
    }

    /// `true` while bound.
    pub const fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Bound key.
    pub fn key(&self) -> Result<&K, BuildError> {
        self.bound.as_ref().ok_or(BuildError::NotStarted { builder: self.family })
    }

    /// Resolves the bound key against `storage`.
    pub fn data<'s, S: Storage<K>>(&self, storage: &'s mut S) -> Result<&'s mut S::Value, BuildError> {
        let key = self.key()?;
        Ok(storage.entry_mut(key))
    }

    /// Ends any previous binding, binds `key`, and returns its item
    /// (inserted if absent).
    pub fn open<'s, S: Storage<K>>(&mut self, key: K, storage: &'s mut S) -> Result<&'s mut S::Value, BuildError> {
        self.end();
        self.start(key)?;
        self.data(storage)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn end_is_idempotent_when_unbound() {
        let mut slot: Slot<String> = Slot::new("pose");
        assert_eq!(slot.end(), None);
        assert_eq!(slot.end(), None);
        assert!(!slot.is_bound());
    }

    #[test]
    fn double_start_is_rejected() {
        let mut slot = Slot::new("stream");
        slot.start("/a".to_string()).unwrap();
        let err = slot.start("/b".to_string()).unwrap_err();
        assert!(matches!(err, BuildError::AlreadyStarted { builder: "stream", .. }));
        assert_eq!(slot.key().unwrap(), "/a");
    }

    #[test]
    fn data_requires_binding() {
        let slot: Slot<String> = Slot::new("primitive");
        let mut storage: BTreeMap<String, u32> = BTreeMap::new();
        let err = slot.data(&mut storage).unwrap_err();
        assert!(matches!(err, BuildError::NotStarted { builder: "primitive" }));
        assert!(storage.is_empty());
    }

    #[test]
    fn open_rebinds_and_finds_existing_items() {
        let mut slot = Slot::new("pose");
        let mut storage: BTreeMap<String, u32> = BTreeMap::new();
        *slot.open("/a".to_string(), &mut storage).unwrap() = 7;
        *slot.open("/b".to_string(), &mut storage).unwrap() = 9;
        assert_eq!(*slot.open("/a".to_string(), &mut storage).unwrap(), 7);
        assert_eq!(storage.len(), 2);
        assert_eq!(slot.end(), Some("/a".to_string()));
    }

    #[test]
    fn vec_storage_appends_by_index() {
        let mut slot = Slot::new("time_series");
        let mut storage: Vec<u8> = vec![1];
        *slot.open(1, &mut storage).unwrap() = 2;
        assert_eq!(storage, vec![1, 2]);
    }
}
