// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable dict values and the dict property.
//!
//! Mirrors the list side: an [`ObservableDict`] is a shared string-keyed map
//! that notifies its owning property on mutation, coarsely
//! ([`Change::Reset`]) or granularly ([`Change::Dict`] carrying the operation
//! and the keys it touched).

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use hashbrown::HashMap;

use crate::error::{PropertyError, Result};
use crate::ops::{Change, DictOp, DictOpInfo};
use crate::property::{Property, PropertyBase, impl_property_config, shape_error};
use crate::storage::{Hook, Owner};
use crate::value::Value;

/// Notification granularity of a dict property.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DictMode {
    /// Every mutating call dispatches a [`Change::Reset`].
    #[default]
    Coarse,
    /// Mutating calls dispatch [`Change::Dict`] operation records; calls
    /// that change nothing dispatch nothing.
    Granular,
}

struct DictInner {
    entries: RefCell<HashMap<String, Value>>,
    mode: DictMode,
    hook: RefCell<Option<Hook>>,
}

/// A shared, observable string-keyed map of [`Value`]s.
#[derive(Clone)]
pub struct ObservableDict {
    inner: Rc<DictInner>,
}

impl ObservableDict {
    /// Creates a detached, empty coarse dict.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(HashMap::new(), DictMode::Coarse)
    }

    /// Creates a detached coarse dict from key/value pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self::with_mode(pairs.into_iter().collect(), DictMode::Coarse)
    }

    pub(crate) fn with_mode(entries: HashMap<String, Value>, mode: DictMode) -> Self {
        Self {
            inner: Rc::new(DictInner {
                entries: RefCell::new(entries),
                mode,
                hook: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn attach(&self, hook: Hook) {
        *self.inner.hook.borrow_mut() = Some(hook);
    }

    /// The notification mode this wrapper was created with.
    #[must_use]
    pub fn mode(&self) -> DictMode {
        self.inner.mode
    }

    /// The value under `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.entries.borrow().get(key).cloned()
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Returns `true` if the dict holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// A snapshot of the current keys, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.borrow().keys().cloned().collect()
    }

    /// A snapshot of the current entries.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.inner.entries.borrow().clone()
    }

    /// `info` is `None` when the call provably changed nothing; granular
    /// mode stays silent then, coarse mode reports every completed call.
    fn notify(&self, info: Option<DictOpInfo>) {
        let hook = self.inner.hook.borrow().clone();
        let Some(hook) = hook else {
            return;
        };
        match self.inner.mode {
            DictMode::Coarse => hook.dispatch(&Change::Reset),
            DictMode::Granular => {
                if let Some(info) = info {
                    hook.dispatch(&Change::Dict(info));
                }
            }
        }
    }

    /// Inserts or overwrites the entry under `key`. The operation record
    /// distinguishes a fresh insertion from an overwrite.
    pub fn set_item(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let existed = self
            .inner
            .entries
            .borrow_mut()
            .insert(key.clone(), value)
            .is_some();
        let op = if existed { DictOp::Set } else { DictOp::Add };
        self.notify(Some(DictOpInfo::single(op, key)));
    }

    /// Removes the entry under `key`.
    pub fn del_item(&self, key: &str) -> Result<()> {
        if self.inner.entries.borrow_mut().remove(key).is_none() {
            return Err(PropertyError::MissingKey(String::from(key)));
        }
        self.notify(Some(DictOpInfo::single(DictOp::DelItem, String::from(key))));
        Ok(())
    }

    /// Removes every entry. The operation record lists the removed keys.
    pub fn clear(&self) {
        let removed: Vec<String> = {
            let mut entries = self.inner.entries.borrow_mut();
            let keys = entries.keys().cloned().collect();
            entries.clear();
            keys
        };
        let info = (!removed.is_empty()).then(|| DictOpInfo::with_keys(DictOp::Clear, removed));
        self.notify(info);
    }

    /// Removes and returns the entry under `key`.
    pub fn pop(&self, key: &str) -> Result<Value> {
        let value = self
            .inner
            .entries
            .borrow_mut()
            .remove(key)
            .ok_or_else(|| PropertyError::MissingKey(String::from(key)))?;
        self.notify(Some(DictOpInfo::single(DictOp::Pop, String::from(key))));
        Ok(value)
    }

    /// Removes and returns the entry under `key`, or `default` (with no
    /// notification) when absent.
    pub fn pop_with_default(&self, key: &str, default: Value) -> Value {
        match self.inner.entries.borrow_mut().remove(key) {
            Some(value) => {
                self.notify(Some(DictOpInfo::single(DictOp::Pop, String::from(key))));
                value
            }
            None => default,
        }
    }

    /// Removes and returns an arbitrary entry.
    pub fn popitem(&self) -> Result<(String, Value)> {
        let key = {
            let entries = self.inner.entries.borrow();
            entries.keys().next().cloned()
        };
        let key = key.ok_or(PropertyError::EmptyCollection)?;
        let value = self
            .inner
            .entries
            .borrow_mut()
            .remove(&key)
            .ok_or(PropertyError::EmptyCollection)?;
        self.notify(Some(DictOpInfo::single(DictOp::DelItem, key.clone())));
        Ok((key, value))
    }

    /// Returns the value under `key`, inserting `default` first when absent.
    pub fn setdefault(&self, key: impl Into<String>, default: Value) -> Value {
        let key = key.into();
        let (value, inserted) = {
            let mut entries = self.inner.entries.borrow_mut();
            match entries.get(&key) {
                Some(existing) => (existing.clone(), false),
                None => {
                    entries.insert(key.clone(), default.clone());
                    (default, true)
                }
            }
        };
        let info = inserted.then(|| DictOpInfo::single(DictOp::SetDefault, key));
        self.notify(info);
        value
    }

    /// Merges `pairs` in, overwriting existing keys. The operation record
    /// lists only the newly-introduced keys.
    pub fn update(&self, pairs: impl IntoIterator<Item = (String, Value)>) {
        let (added, mutated) = {
            let mut entries = self.inner.entries.borrow_mut();
            let mut added = Vec::new();
            let mut mutated = false;
            for (key, value) in pairs {
                if entries.insert(key.clone(), value).is_none() {
                    added.push(key);
                }
                mutated = true;
            }
            (added, mutated)
        };
        let info = mutated.then(|| DictOpInfo::with_keys(DictOp::Update, added));
        self.notify(info);
    }

    /// Attribute-style write.
    ///
    /// In coarse mode, assigning null deletes the key (and errors when the
    /// key is absent); in granular mode, null is stored like any other
    /// value.
    pub fn set_attr(&self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        if self.inner.mode == DictMode::Coarse && value.is_null() {
            return self.del_item(&key);
        }
        self.set_item(key, value);
        Ok(())
    }

    /// Attribute-style read; absent keys are an error.
    pub fn get_attr(&self, key: &str) -> Result<Value> {
        self.get(key)
            .ok_or_else(|| PropertyError::MissingKey(String::from(key)))
    }
}

impl Default for ObservableDict {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ObservableDict {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
            || *self.inner.entries.borrow() == *other.inner.entries.borrow()
    }
}

impl fmt::Debug for ObservableDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableDict")
            .field("len", &self.len())
            .field("mode", &self.inner.mode)
            .finish()
    }
}

/// A property holding an observable string-keyed map.
///
/// Like the list side, every assignment snapshots the incoming dict into a
/// fresh wrapper attached to this (property, entity) pair.
pub struct DictProperty {
    base: PropertyBase,
    mode: DictMode,
}

impl DictProperty {
    /// Creates a coarse dict descriptor. Each entity receives its own copy
    /// of `default` at link time.
    #[must_use]
    pub fn new(default: ObservableDict) -> Self {
        Self {
            base: PropertyBase::new(Value::Dict(default)),
            mode: DictMode::Coarse,
        }
    }

    /// Selects the notification mode for the wrappers this property creates.
    #[must_use]
    pub fn mode(mut self, mode: DictMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Property for DictProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn convert(&self, owner: &Owner, value: Value) -> Result<Value> {
        let Value::Dict(dict) = value else {
            return Ok(value);
        };
        let fresh = ObservableDict::with_mode(dict.to_map(), self.mode);
        fresh.attach(Hook::new(&self.record(owner)?, owner));
        Ok(Value::Dict(fresh))
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        match value {
            Value::Dict(dict) if dict.mode() == self.mode => Ok(false),
            other => Err(shape_error(self.name(), "a dict", other)),
        }
    }
}

impl_property_config!(DictProperty);

impl fmt::Debug for DictProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictProperty")
            .field("base", &self.base)
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{changes, counter, new_owner};
    use alloc::string::ToString;
    use alloc::vec;

    fn linked(owner: &Owner, mode: DictMode) -> (DictProperty, ObservableDict) {
        let prop = DictProperty::new(ObservableDict::new()).mode(mode);
        prop.link(owner, "attrs").unwrap();
        let Value::Dict(dict) = prop.get(owner).unwrap() else {
            panic!("dict property must store a wrapped dict");
        };
        (prop, dict)
    }

    #[test]
    fn set_and_get_items() {
        let owner = new_owner();
        let (_, dict) = linked(&owner, DictMode::Coarse);

        dict.set_item("a", Value::Int(1));
        assert_eq!(dict.get("a"), Some(Value::Int(1)));
        assert_eq!(dict.len(), 1);
        assert!(dict.contains_key("a"));
        assert!(!dict.contains_key("b"));
    }

    #[test]
    fn granular_distinguishes_add_from_set() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Granular);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        dict.set_item("a", Value::Int(1));
        dict.set_item("a", Value::Int(2));

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        let first = log[0].dict_op().unwrap();
        assert_eq!(first.op, DictOp::Add);
        assert_eq!(first.keys.as_slice(), ["a".to_string()]);
        let second = log[1].dict_op().unwrap();
        assert_eq!(second.op, DictOp::Set);
    }

    #[test]
    fn del_item_and_missing_key() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Granular);
        dict.set_item("a", Value::Int(1));

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        dict.del_item("a").unwrap();
        assert!(matches!(
            dict.del_item("a"),
            Err(PropertyError::MissingKey(_))
        ));

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].dict_op().unwrap().op, DictOp::DelItem);
    }

    #[test]
    fn pop_variants() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Granular);
        dict.set_item("a", Value::Int(1));

        let (observer, count) = counter();
        prop.bind(&owner, observer).unwrap();

        assert_eq!(dict.pop("a").unwrap(), Value::Int(1));
        assert!(matches!(dict.pop("a"), Err(PropertyError::MissingKey(_))));
        assert_eq!(
            dict.pop_with_default("a", Value::Int(9)),
            Value::Int(9),
            "absent key falls back to the default"
        );
        assert_eq!(count.get(), 1, "only the successful pop notifies");
    }

    #[test]
    fn popitem_drains_and_notifies_per_entry() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Granular);
        dict.set_item("a", Value::Int(1));
        dict.set_item("b", Value::Int(2));

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        let (k1, _) = dict.popitem().unwrap();
        let (k2, _) = dict.popitem().unwrap();
        assert_ne!(k1, k2);
        assert!(dict.is_empty());
        assert!(matches!(dict.popitem(), Err(PropertyError::EmptyCollection)));

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert!(
            log.iter()
                .all(|change| change.dict_op().unwrap().op == DictOp::DelItem)
        );
    }

    #[test]
    fn setdefault_notifies_only_on_insertion() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Granular);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        assert_eq!(dict.setdefault("a", Value::Int(1)), Value::Int(1));
        assert_eq!(dict.setdefault("a", Value::Int(9)), Value::Int(1));

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].dict_op().unwrap().op, DictOp::SetDefault);
    }

    #[test]
    fn update_lists_only_new_keys() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Granular);
        dict.set_item("a", Value::Int(1));

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        dict.update(vec![
            ("a".to_string(), Value::Int(2)),
            ("b".to_string(), Value::Int(3)),
        ]);
        dict.update(vec![]);

        let log = log.borrow();
        assert_eq!(log.len(), 1, "empty update is silent");
        let info = log[0].dict_op().unwrap();
        assert_eq!(info.op, DictOp::Update);
        assert_eq!(info.keys.as_slice(), ["b".to_string()]);
    }

    #[test]
    fn clear_lists_removed_keys() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Granular);
        dict.set_item("a", Value::Int(1));
        dict.set_item("b", Value::Int(2));

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        dict.clear();
        dict.clear();

        let log = log.borrow();
        assert_eq!(log.len(), 1, "clearing an empty dict is silent");
        let info = log[0].dict_op().unwrap();
        assert_eq!(info.op, DictOp::Clear);
        assert_eq!(info.keys.len(), 2);
    }

    #[test]
    fn coarse_set_attr_null_deletes() {
        let owner = new_owner();
        let (_, dict) = linked(&owner, DictMode::Coarse);
        dict.set_item("a", Value::Int(1));

        dict.set_attr("a", Value::Null).unwrap();
        assert!(!dict.contains_key("a"));
        assert!(matches!(
            dict.set_attr("a", Value::Null),
            Err(PropertyError::MissingKey(_))
        ));
    }

    #[test]
    fn granular_set_attr_stores_null() {
        let owner = new_owner();
        let (_, dict) = linked(&owner, DictMode::Granular);
        dict.set_attr("a", Value::Null).unwrap();
        assert_eq!(dict.get("a"), Some(Value::Null));
        assert_eq!(dict.get_attr("a").unwrap(), Value::Null);
        assert!(matches!(
            dict.get_attr("b"),
            Err(PropertyError::MissingKey(_))
        ));
    }

    #[test]
    fn coarse_mutations_dispatch_reset() {
        let owner = new_owner();
        let (prop, dict) = linked(&owner, DictMode::Coarse);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        dict.set_item("a", Value::Int(1));
        dict.setdefault("a", Value::Int(9));

        let log = log.borrow();
        assert_eq!(log.len(), 2, "coarse reports every completed call");
        assert!(log.iter().all(|change| matches!(change, Change::Reset)));
    }

    #[test]
    fn assignment_rewraps_and_suppresses_equal_contents() {
        let owner = new_owner();
        let (prop, _) = linked(&owner, DictMode::Coarse);

        let (observer, count) = counter();
        prop.bind(&owner, observer).unwrap();

        let incoming = ObservableDict::from_pairs([("k".to_string(), Value::Int(1))]);
        assert!(prop.set(&owner, Value::Dict(incoming.clone())).unwrap());
        assert_eq!(count.get(), 1);

        // Stored wrapper is a fresh copy, not the incoming one.
        let Value::Dict(stored) = prop.get(&owner).unwrap() else {
            panic!("wrapped dict expected");
        };
        incoming.set_item("k", Value::Int(2));
        assert_eq!(stored.get("k"), Some(Value::Int(1)));

        // Equal contents: suppressed.
        let same = ObservableDict::from_pairs([("k".to_string(), Value::Int(1))]);
        assert!(!prop.set(&owner, Value::Dict(same)).unwrap());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn non_dict_assignment_is_rejected() {
        let owner = new_owner();
        let (prop, _) = linked(&owner, DictMode::Coarse);
        assert!(prop.set(&owner, Value::Int(1)).unwrap_err().is_invalid_value());
    }
}
