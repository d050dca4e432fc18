// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-entity property storage and the observer list.
//!
//! A property descriptor is shared by every entity of its owning type and
//! never holds entity state. All mutable per-entity state lives in a
//! [`PropertyStorage`] record: the current value, the bound observers, and a
//! closed set of variant-specific fields (numeric format tag, bound
//! overrides, option snapshot, composite constituents, alias staleness).
//!
//! Entities hold their records in a [`StorageMap`] keyed by resolved property
//! name — that by-name lookup is the entire contract this crate requires of
//! an entity model, expressed by the [`PropertyOwner`] trait.
//!
//! Records are `Rc<RefCell<_>>` because observer chains are re-entrant by
//! design: an observer may set another property (or the same one) while a
//! dispatch is in flight. Borrows are therefore never held across observer
//! invocation; see [`dispatch_record`].

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::numeric::BoundState;
use crate::ops::Change;
use crate::property::Property;
use crate::unit::Unit;
use crate::value::Value;

/// Inline capacity for the observer list. Most properties have no more than
/// a handful of observers bound.
const INLINE_OBSERVERS: usize = 4;

/// A shared handle to an entity, as seen by the property machinery.
pub type Owner = Rc<dyn PropertyOwner>;

/// The contract an entity model implements to host properties.
///
/// The entity owns one [`StorageMap`]; everything else (attribute-style
/// get/set syntax, construction, lifetime) is the entity model's business.
///
/// # Example
///
/// ```rust
/// use reactive_property::{PropertyOwner, StorageMap};
///
/// struct Widget {
///     props: StorageMap,
/// }
///
/// impl PropertyOwner for Widget {
///     fn storage_map(&self) -> &StorageMap {
///         &self.props
///     }
///
///     fn as_any(&self) -> &dyn core::any::Any {
///         self
///     }
/// }
/// ```
pub trait PropertyOwner: 'static {
    /// The entity's name-keyed record map.
    fn storage_map(&self) -> &StorageMap;

    /// Access to the concrete entity type, for downcasting in observers.
    fn as_any(&self) -> &dyn Any;
}

/// An observer callback handle.
///
/// Observers receive the entity, the property's current value, and the
/// [`Change`] event. Equality — used by bind/unbind deduplication — is `Rc`
/// pointer identity: two handles are equal only if they were cloned from the
/// same `Observer`.
#[derive(Clone)]
pub struct Observer {
    callback: Rc<dyn Fn(&Owner, &Value, &Change)>,
}

impl Observer {
    /// Wraps a callback into an observer handle.
    pub fn new(callback: impl Fn(&Owner, &Value, &Change) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self, owner: &Owner, value: &Value, change: &Change) {
        (self.callback)(owner, value, change);
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}

/// Composite state for reference-list properties: the constituent tuple and
/// the re-entrancy guard.
pub(crate) struct ReferenceState {
    /// Constituent descriptors, snapshotted at link time, in tuple order.
    pub(crate) constituents: Vec<Rc<dyn Property>>,
    /// Set while the composite is pushing values into its constituents, so
    /// the constituents' change triggers do not feed back into the composite.
    pub(crate) updating: bool,
}

impl fmt::Debug for ReferenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceState")
            .field("constituents", &self.constituents.len())
            .field("updating", &self.updating)
            .finish()
    }
}

/// Alias-property state: staleness of the cached value.
#[derive(Debug)]
pub(crate) struct AliasState {
    /// `true` when the cached value needs recomputation on next read.
    pub(crate) dirty: bool,
}

/// Per-(entity, property name) mutable state.
///
/// Created once when a property is linked to an entity and torn down with
/// the entity. Exactly one record exists per (entity, name) pair.
pub struct PropertyStorage {
    /// The current value. Always the converted/wrapped form.
    pub(crate) value: Value,
    /// Bound observers, in registration order, deduplicated by identity.
    pub(crate) observers: SmallVec<[Observer; INLINE_OBSERVERS]>,
    /// Numeric properties: the unit tag of the last unit-tagged assignment.
    pub(crate) format: Unit,
    /// Bounded numeric properties: per-instance bound overrides.
    pub(crate) bounds: BoundState,
    /// Option properties: snapshot of the permitted values.
    pub(crate) options: Vec<Value>,
    /// Reference-list properties: constituents plus re-entrancy guard.
    pub(crate) reference: Option<ReferenceState>,
    /// Alias properties: cache staleness.
    pub(crate) alias: Option<AliasState>,
}

impl PropertyStorage {
    /// Creates a record holding `value` with no observers and default
    /// variant state.
    #[must_use]
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            observers: SmallVec::new(),
            format: Unit::Px,
            bounds: BoundState::default(),
            options: Vec::new(),
            reference: None,
            alias: None,
        }
    }

    /// The current stored value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Number of bound observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Adds an observer unless an identical one is already bound.
    /// Returns `false` on duplicates.
    pub(crate) fn add_observer(&mut self, observer: Observer) -> bool {
        if self.observers.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Removes an observer. Absent observers are a no-op returning `false`.
    pub(crate) fn remove_observer(&mut self, observer: &Observer) -> bool {
        match self.observers.iter().position(|o| o == observer) {
            Some(idx) => {
                self.observers.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for PropertyStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStorage")
            .field("value", &self.value)
            .field("observers", &self.observers.len())
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// A shared record handle.
pub type Record = Rc<RefCell<PropertyStorage>>;

/// The name-keyed record map an entity embeds.
///
/// One record per property name, created at link time and persisting for the
/// entity's lifetime.
#[derive(Default)]
pub struct StorageMap {
    records: RefCell<HashMap<&'static str, Record>>,
}

impl StorageMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the record for a property name.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<Record> {
        self.records.borrow().get(name).cloned()
    }

    /// Returns `true` if a record exists for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.borrow().contains_key(name)
    }

    /// Number of linked properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Returns `true` if no property has been linked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Inserts a record under `name` if absent; returns the record that is
    /// in the map afterwards.
    pub(crate) fn insert_if_absent(&self, name: &'static str, record: Record) -> Record {
        self.records
            .borrow_mut()
            .entry(name)
            .or_insert(record)
            .clone()
    }
}

impl fmt::Debug for StorageMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.records.borrow().keys().copied().collect();
        f.debug_struct("StorageMap").field("names", &names).finish()
    }
}

/// Dispatches a change to every observer of `record`, in registration order.
///
/// The observer list and current value are cloned out before invocation so
/// that no borrow is held while observers run: observers are free to bind,
/// unbind, and set properties re-entrantly.
pub(crate) fn dispatch_record(record: &Record, owner: &Owner, change: &Change) {
    let (observers, value) = {
        let storage = record.borrow();
        if storage.observers.is_empty() {
            return;
        }
        (storage.observers.clone(), storage.value.clone())
    };
    for observer in &observers {
        observer.call(owner, &value, change);
    }
}

/// Back-references from an observable container to its owning (property,
/// entity) pair.
///
/// Both references are weak: a wrapper can never keep its entity alive, and
/// dispatch becomes a no-op once the entity (and with it the record) is
/// gone.
#[derive(Clone)]
pub(crate) struct Hook {
    record: Weak<RefCell<PropertyStorage>>,
    owner: Weak<dyn PropertyOwner>,
}

impl Hook {
    pub(crate) fn new(record: &Record, owner: &Owner) -> Self {
        Self {
            record: Rc::downgrade(record),
            owner: Rc::downgrade(owner),
        }
    }

    /// The record, if the entity still exists.
    pub(crate) fn record(&self) -> Option<Record> {
        self.record.upgrade()
    }

    /// The entity, if it still exists.
    pub(crate) fn owner(&self) -> Option<Owner> {
        self.owner.upgrade()
    }

    /// Dispatches through the owning property's observer list. No-op if the
    /// entity has expired.
    pub(crate) fn dispatch(&self, change: &Change) {
        let (Some(record), Some(owner)) = (self.record.upgrade(), self.owner.upgrade()) else {
            return;
        };
        dispatch_record(&record, &owner, change);
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("expired", &(self.record.upgrade().is_none()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;

    struct TestOwner {
        props: StorageMap,
    }

    impl TestOwner {
        fn shared() -> Owner {
            Rc::new(Self {
                props: StorageMap::new(),
            })
        }
    }

    impl PropertyOwner for TestOwner {
        fn storage_map(&self) -> &StorageMap {
            &self.props
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn new_record(value: Value) -> Record {
        Rc::new(RefCell::new(PropertyStorage::new(value)))
    }

    #[test]
    fn storage_map_insert_and_lookup() {
        let map = StorageMap::new();
        assert!(map.is_empty());
        assert!(map.record("x").is_none());

        let record = new_record(Value::Int(1));
        map.insert_if_absent("x", record.clone());
        assert!(map.contains("x"));
        assert_eq!(map.len(), 1);
        assert!(Rc::ptr_eq(&map.record("x").unwrap(), &record));

        // A second insert under the same name keeps the first record.
        let other = new_record(Value::Int(2));
        let kept = map.insert_if_absent("x", other);
        assert!(Rc::ptr_eq(&kept, &record));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn observer_identity_equality() {
        let a = Observer::new(|_, _, _| {});
        let b = Observer::new(|_, _, _| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn add_observer_deduplicates() {
        let mut storage = PropertyStorage::new(Value::Null);
        let obs = Observer::new(|_, _, _| {});
        assert!(storage.add_observer(obs.clone()));
        assert!(!storage.add_observer(obs.clone()));
        assert_eq!(storage.observer_count(), 1);

        assert!(storage.remove_observer(&obs));
        assert!(!storage.remove_observer(&obs));
        assert_eq!(storage.observer_count(), 0);
    }

    #[test]
    fn dispatch_invokes_in_registration_order() {
        let owner = TestOwner::shared();
        let record = new_record(Value::Int(7));

        let order = Rc::new(RefCell::new(vec![]));
        for tag in [1, 2, 3] {
            let order = order.clone();
            record
                .borrow_mut()
                .add_observer(Observer::new(move |_, value, _| {
                    assert_eq!(*value, Value::Int(7));
                    order.borrow_mut().push(tag);
                }));
        }

        dispatch_record(&record, &owner, &Change::Reset);
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn dispatch_without_observers_is_noop() {
        let owner = TestOwner::shared();
        let record = new_record(Value::Int(0));
        // Nothing to assert beyond "does not panic or borrow-conflict".
        dispatch_record(&record, &owner, &Change::Reset);
    }

    #[test]
    fn observers_may_rebind_reentrantly() {
        let owner = TestOwner::shared();
        let record = new_record(Value::Int(0));

        let record2 = record.clone();
        let fired = Rc::new(Cell::new(false));
        let fired2 = fired.clone();
        record
            .borrow_mut()
            .add_observer(Observer::new(move |_, _, _| {
                // Mutating the observer list mid-dispatch must not conflict.
                record2
                    .borrow_mut()
                    .add_observer(Observer::new(|_, _, _| {}));
                fired2.set(true);
            }));

        dispatch_record(&record, &owner, &Change::Reset);
        assert!(fired.get());
        assert_eq!(record.borrow().observer_count(), 2);
    }

    #[test]
    fn hook_dispatch_noops_after_entity_drop() {
        let owner = TestOwner::shared();
        let record = new_record(Value::Int(0));

        let count = Rc::new(Cell::new(0));
        let count2 = count.clone();
        record
            .borrow_mut()
            .add_observer(Observer::new(move |_, _, _| {
                count2.set(count2.get() + 1);
            }));

        let hook = Hook::new(&record, &owner);
        hook.dispatch(&Change::Reset);
        assert_eq!(count.get(), 1);

        drop(owner);
        hook.dispatch(&Change::Reset);
        assert_eq!(count.get(), 1, "expired hook must not dispatch");
    }
}
