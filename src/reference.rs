// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite properties that mirror a tuple of other properties.

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{PropertyError, Result};
use crate::list::{ListMode, ObservableList};
use crate::ops::Change;
use crate::property::{Property, PropertyBase, shape_error};
use crate::storage::{
    Hook, Observer, Owner, Record, ReferenceState, dispatch_record,
};
use crate::value::Value;

/// A composite property presenting a fixed tuple of constituent properties
/// as one list, in both directions: assigning through the composite writes
/// the constituents, and any constituent change refreshes the composite and
/// notifies its observers once.
///
/// The classic use is `pos = (x, y)`: observers of `pos` fire when `x`
/// changes, and `pos.set([3, 4])` writes `x` and `y`.
///
/// Linking order matters: every constituent must be linked to the entity
/// before [`Property::link`] runs for the composite, and
/// [`Property::link_deps`] must be called once afterwards to subscribe the
/// composite to its constituents.
pub struct ReferenceListProperty {
    base: PropertyBase,
    constituents: Vec<Rc<dyn Property>>,
}

impl ReferenceListProperty {
    /// Creates a composite over the given constituents, in tuple order.
    #[must_use]
    pub fn new(constituents: Vec<Rc<dyn Property>>) -> Self {
        Self {
            base: PropertyBase::new(Value::Null),
            constituents,
        }
    }

    /// Number of constituents.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.constituents.len()
    }

    fn wrapper(&self, owner: &Owner) -> Result<ObservableList> {
        match self.record(owner)?.borrow().value() {
            Value::List(list) => Ok(list.clone()),
            _ => Err(PropertyError::configuration(
                "reference list record does not hold a composite list",
            )),
        }
    }

    /// Writes one element through to the constituent at `index`.
    ///
    /// Equivalent to `set_item` on the stored list. Returns `true` if the
    /// composite value changed.
    pub fn set_item(&self, owner: &Owner, index: usize, value: Value) -> Result<bool> {
        self.wrapper(owner)?.write_through(index, alloc::vec![value])
    }

    fn incoming(&self, value: Value) -> Result<Vec<Value>> {
        let items = match value {
            Value::Tuple(items) => items,
            Value::List(list) => list.to_vec(),
            other => return Err(shape_error(self.name(), "a sequence", &other)),
        };
        if items.len() != self.constituents.len() {
            return Err(PropertyError::invalid(
                self.name(),
                format!(
                    "the length of a reference list is immutable: expected {} elements, got {}",
                    self.constituents.len(),
                    items.len()
                ),
            ));
        }
        Ok(items)
    }
}

impl Property for ReferenceListProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    /// Seeds the record with a write-through list mirroring the current
    /// constituent values, plus the constituent table and re-entrancy flag.
    fn init_storage(&self, owner: &Owner, record: &Record) -> Result<()> {
        let mut items = Vec::with_capacity(self.constituents.len());
        for constituent in &self.constituents {
            items.push(constituent.get(owner)?);
        }
        let list = ObservableList::with_mode(items, ListMode::Reference);
        list.attach(Hook::new(record, owner));
        let mut storage = record.borrow_mut();
        storage.value = Value::List(list);
        storage.reference = Some(ReferenceState {
            constituents: self.constituents.clone(),
            updating: false,
        });
        Ok(())
    }

    /// Subscribes the composite to each constituent, so constituent changes
    /// refresh the composite and notify its observers exactly once.
    fn link_deps(&self, owner: &Owner) -> Result<()> {
        let record = self.record(owner)?;
        for constituent in &self.constituents {
            let weak = Rc::downgrade(&record);
            let constituents = self.constituents.clone();
            let observer = Observer::new(move |owner: &Owner, _: &Value, _: &Change| {
                let Some(record) = weak.upgrade() else {
                    return;
                };
                {
                    let storage = record.borrow();
                    // The composite itself is pushing values; it will
                    // refresh and dispatch once when done.
                    if storage.reference.as_ref().is_some_and(|s| s.updating) {
                        return;
                    }
                }
                let mut fresh = Vec::with_capacity(constituents.len());
                for constituent in &constituents {
                    match constituent.get(owner) {
                        Ok(value) => fresh.push(value),
                        Err(_) => return,
                    }
                }
                let value = record.borrow().value.clone();
                let Value::List(wrapper) = value else {
                    return;
                };
                if wrapper.sync_items(fresh) {
                    dispatch_record(&record, owner, &Change::Reset);
                }
            });
            constituent.bind(owner, observer)?;
        }
        Ok(())
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        match value {
            Value::List(list) if list.len() == self.constituents.len() => Ok(false),
            other => Err(shape_error(self.name(), "a composite list", other)),
        }
    }

    /// Distributes a full tuple across the constituents and dispatches the
    /// composite once. The incoming length must match the arity.
    fn set(&self, owner: &Owner, value: Value) -> Result<bool> {
        let items = self.incoming(value)?;
        let wrapper = self.wrapper(owner)?;
        wrapper.write_through(0, items)
    }

    /// The composite list, refreshed from the constituents' current values.
    fn get(&self, owner: &Owner) -> Result<Value> {
        let wrapper = self.wrapper(owner)?;
        let mut fresh = Vec::with_capacity(self.constituents.len());
        for constituent in &self.constituents {
            fresh.push(constituent.get(owner)?);
        }
        wrapper.sync_items(fresh);
        Ok(Value::List(wrapper))
    }
}

impl fmt::Debug for ReferenceListProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceListProperty")
            .field("base", &self.base)
            .field("arity", &self.constituents.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::NumericProperty;
    use crate::testutil::{counter, new_owner};
    use alloc::vec;

    fn pos_setup(owner: &Owner) -> (Rc<NumericProperty>, Rc<NumericProperty>, ReferenceListProperty) {
        let x = Rc::new(NumericProperty::new(Value::Int(0)));
        let y = Rc::new(NumericProperty::new(Value::Int(0)));
        x.link(owner, "x").unwrap();
        y.link(owner, "y").unwrap();

        let constituents: Vec<Rc<dyn Property>> = vec![x.clone(), y.clone()];
        let pos = ReferenceListProperty::new(constituents);
        pos.link(owner, "pos").unwrap();
        pos.link_deps(owner).unwrap();
        (x, y, pos)
    }

    fn as_items(value: Value) -> Vec<Value> {
        let Value::List(list) = value else {
            panic!("composite list expected");
        };
        list.to_vec()
    }

    #[test]
    fn link_seeds_from_constituents() {
        let owner = new_owner();
        let (_, _, pos) = pos_setup(&owner);
        assert_eq!(
            as_items(pos.get(&owner).unwrap()),
            vec![Value::Int(0), Value::Int(0)]
        );
    }

    #[test]
    fn constituent_change_flows_into_the_composite() {
        let owner = new_owner();
        let (x, _, pos) = pos_setup(&owner);

        let (observer, count) = counter();
        pos.bind(&owner, observer).unwrap();

        x.set(&owner, Value::Int(7)).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(
            as_items(pos.get(&owner).unwrap()),
            vec![Value::Int(7), Value::Int(0)]
        );

        // Suppressed constituent change stays suppressed on the composite.
        x.set(&owner, Value::Int(7)).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn composite_assignment_writes_the_constituents() {
        let owner = new_owner();
        let (x, y, pos) = pos_setup(&owner);

        let (observer, count) = counter();
        pos.bind(&owner, observer).unwrap();

        assert!(pos.set(&owner, Value::Tuple(vec![Value::Int(3), Value::Int(4)])).unwrap());
        assert_eq!(x.get(&owner).unwrap(), Value::Int(3));
        assert_eq!(y.get(&owner).unwrap(), Value::Int(4));
        assert_eq!(count.get(), 1, "composite dispatches exactly once");
    }

    #[test]
    fn constituent_observers_fire_on_composite_assignment() {
        let owner = new_owner();
        let (x, _, pos) = pos_setup(&owner);

        let (observer, count) = counter();
        x.bind(&owner, observer).unwrap();

        pos.set(&owner, Value::Tuple(vec![Value::Int(3), Value::Int(4)])).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unchanged_assignment_is_suppressed() {
        let owner = new_owner();
        let (_, _, pos) = pos_setup(&owner);

        let (observer, count) = counter();
        pos.bind(&owner, observer).unwrap();

        assert!(!pos.set(&owner, Value::Tuple(vec![Value::Int(0), Value::Int(0)])).unwrap());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn length_is_immutable() {
        let owner = new_owner();
        let (_, _, pos) = pos_setup(&owner);

        let err = pos
            .set(&owner, Value::Tuple(vec![Value::Int(1)]))
            .unwrap_err();
        assert!(err.is_invalid_value());
        let err = pos.set(&owner, Value::Int(1)).unwrap_err();
        assert!(err.is_invalid_value());
    }

    #[test]
    fn element_write_updates_one_constituent() {
        let owner = new_owner();
        let (x, y, pos) = pos_setup(&owner);

        let (observer, count) = counter();
        pos.bind(&owner, observer).unwrap();

        assert!(pos.set_item(&owner, 1, Value::Int(9)).unwrap());
        assert_eq!(x.get(&owner).unwrap(), Value::Int(0));
        assert_eq!(y.get(&owner).unwrap(), Value::Int(9));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn constituent_validation_guards_the_composite() {
        let owner = new_owner();
        let (x, _, pos) = pos_setup(&owner);

        let err = pos
            .set(&owner, Value::Tuple(vec![Value::Bool(true), Value::Int(1)]))
            .unwrap_err();
        assert!(err.is_invalid_value());
        assert_eq!(x.get(&owner).unwrap(), Value::Int(0));
    }

    #[test]
    fn stored_list_rejects_length_changes() {
        let owner = new_owner();
        let (_, _, pos) = pos_setup(&owner);

        let Value::List(list) = pos.get(&owner).unwrap() else {
            panic!("composite list expected");
        };
        assert!(list.append(Value::Int(1)).is_err());
        assert!(list.pop().is_err());
    }
}
