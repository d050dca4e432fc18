// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Computed properties backed by getter/setter closures.

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{PropertyError, Result};
use crate::ops::Change;
use crate::property::{Property, PropertyBase};
use crate::storage::{AliasState, Observer, Owner, Record, dispatch_record};
use crate::value::Value;

/// Computes the alias value from the entity's other properties.
pub type AliasGetter = Rc<dyn Fn(&Owner) -> Value>;

/// Applies a written value to the underlying properties. Returns `true`
/// when the write changed the underlying state, which makes the alias
/// recompute and dispatch.
pub type AliasSetter = Rc<dyn Fn(&Owner, &Value) -> bool>;

/// A computed property.
///
/// The value is derived by a getter closure; writes are routed through an
/// optional setter closure (writing a setter-less alias is a configuration
/// error). Observers fire when a property named in
/// [`bind_to`](Self::bind_to) changes and the recomputed value differs from
/// the last one dispatched.
///
/// With [`cached`](Self::cached) enabled, reads reuse the stored value and
/// the getter runs only when a dependency has changed since.
///
/// # Example
///
/// ```ignore
/// let right = AliasProperty::new(|owner| { /* x + width */ })
///     .setter(|owner, value| { /* set x from value - width */ true })
///     .bind_to(["x", "width"])
///     .cached(true);
/// ```
pub struct AliasProperty {
    base: PropertyBase,
    getter: AliasGetter,
    setter: Option<AliasSetter>,
    dependencies: Vec<&'static str>,
    use_cache: bool,
}

impl AliasProperty {
    /// Creates a read-only alias computed by `getter`.
    #[must_use]
    pub fn new(getter: impl Fn(&Owner) -> Value + 'static) -> Self {
        Self {
            base: PropertyBase::new(Value::Null),
            getter: Rc::new(getter),
            setter: None,
            dependencies: Vec::new(),
            use_cache: false,
        }
    }

    /// Makes the alias writable through `setter`.
    #[must_use]
    pub fn setter(mut self, setter: impl Fn(&Owner, &Value) -> bool + 'static) -> Self {
        self.setter = Some(Rc::new(setter));
        self
    }

    /// Names the sibling properties whose changes recompute this alias.
    /// They must be linked before [`Property::link_deps`] runs.
    #[must_use]
    pub fn bind_to(mut self, names: impl IntoIterator<Item = &'static str>) -> Self {
        self.dependencies.extend(names);
        self
    }

    /// Enables caching: reads reuse the stored value until a dependency
    /// changes.
    #[must_use]
    pub fn cached(mut self, cached: bool) -> Self {
        self.use_cache = cached;
        self
    }
}

/// Recomputes the alias and stores it. Returns `true` if the stored value
/// changed. The staleness flag is cleared either way: the value is fresh
/// now.
fn refresh(record: &Record, getter: &AliasGetter, owner: &Owner) -> bool {
    let fresh = getter(owner);
    let mut storage = record.borrow_mut();
    if let Some(alias) = storage.alias.as_mut() {
        alias.dirty = false;
    }
    if storage.value == fresh {
        false
    } else {
        storage.value = fresh;
        true
    }
}

impl Property for AliasProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    /// Seeds the staleness flag and primes the stored value, which later
    /// dependency triggers compare against. Dependencies must already be
    /// linked, since the getter runs here.
    fn init_storage(&self, owner: &Owner, record: &Record) -> Result<()> {
        record.borrow_mut().alias = Some(AliasState { dirty: true });
        refresh(record, &self.getter, owner);
        Ok(())
    }

    /// Subscribes the alias to its named dependencies.
    fn link_deps(&self, owner: &Owner) -> Result<()> {
        let record = self.record(owner)?;
        for name in &self.dependencies {
            let dependency = owner.storage_map().record(name).ok_or_else(|| {
                PropertyError::configuration(format!(
                    "alias dependency '{name}' is not linked to this entity"
                ))
            })?;
            let weak = Rc::downgrade(&record);
            let getter = Rc::clone(&self.getter);
            let observer = Observer::new(move |owner: &Owner, _: &Value, _: &Change| {
                let Some(record) = weak.upgrade() else {
                    return;
                };
                if refresh(&record, &getter, owner) {
                    dispatch_record(&record, owner, &Change::Reset);
                }
            });
            dependency.borrow_mut().add_observer(observer);
        }
        Ok(())
    }

    /// Alias values are whatever the getter produced; no validation rule.
    fn check(&self, _owner: &Owner, _value: &Value) -> Result<bool> {
        Ok(true)
    }

    /// Routes the write through the setter; a `true` return recomputes the
    /// alias and dispatches unconditionally.
    fn set(&self, owner: &Owner, value: Value) -> Result<bool> {
        let Some(setter) = &self.setter else {
            return Err(PropertyError::configuration(format!(
                "alias property '{}' has no setter",
                self.name()
            )));
        };
        if !setter(owner, &value) {
            return Ok(false);
        }
        let record = self.record(owner)?;
        refresh(&record, &self.getter, owner);
        dispatch_record(&record, owner, &Change::Reset);
        Ok(true)
    }

    fn get(&self, owner: &Owner) -> Result<Value> {
        let record = self.record(owner)?;
        if !self.use_cache {
            return Ok((self.getter)(owner));
        }
        let dirty = record
            .borrow()
            .alias
            .as_ref()
            .is_none_or(|alias| alias.dirty);
        if dirty {
            refresh(&record, &self.getter, owner);
        }
        Ok(record.borrow().value.clone())
    }
}

impl fmt::Debug for AliasProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasProperty")
            .field("base", &self.base)
            .field("dependencies", &self.dependencies)
            .field("writable", &self.setter.is_some())
            .field("use_cache", &self.use_cache)
            .finish()
    }
}
