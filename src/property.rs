// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The property descriptor contract and base validation pipeline.
//!
//! A descriptor is constructed once, configured with builder-style calls,
//! and shared (via `Rc`) by every entity of its owning type. It holds only
//! configuration — default value, nullability, error recovery — never a
//! value for a specific entity. Entity state lives in the
//! [`PropertyStorage`] record created by [`Property::link`].
//!
//! The [`Property`] trait supplies the whole base pipeline as default
//! methods; specialized descriptors override exactly the hooks they need:
//! `convert` to normalize input shapes, `check` to add a validation rule,
//! `init_storage` to seed variant state, or `set`/`get` for derived values.
//!
//! `set` runs: convert → equality short-circuit → check → error recovery →
//! equality re-check → store → dispatch. Validation happens before any
//! storage mutation; a failed `set` never leaves a partial write behind.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::{OnceCell, RefCell};
use core::fmt;

use crate::error::{PropertyError, Result};
use crate::ops::Change;
use crate::storage::{Observer, Owner, PropertyStorage, Record, dispatch_record};
use crate::value::Value;

/// An error-recovery handler: maps a rejected value to a substitute.
pub type ErrorHandler = Rc<dyn Fn(&Value) -> Value>;

/// Shared descriptor configuration.
///
/// Immutable after construction apart from the name, which is resolved
/// exactly once at link time and never changes afterwards.
pub struct PropertyBase {
    pub(crate) default: Value,
    pub(crate) allow_none: bool,
    pub(crate) error_value: Option<Value>,
    pub(crate) error_handler: Option<ErrorHandler>,
    name: OnceCell<&'static str>,
}

impl PropertyBase {
    /// Creates configuration with the given default value.
    #[must_use]
    pub fn new(default: Value) -> Self {
        Self {
            default,
            allow_none: false,
            error_value: None,
            error_handler: None,
            name: OnceCell::new(),
        }
    }

    /// The default value assigned at link time (after conversion).
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether `Null` is a legal stored value.
    #[must_use]
    pub fn allows_none(&self) -> bool {
        self.allow_none
    }

    /// The resolved name, if the property has been linked.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.name.get().copied()
    }

    /// The resolved name, or `"?"` before linking. Used in error messages.
    #[must_use]
    pub fn name_or_unknown(&self) -> &'static str {
        self.name.get().copied().unwrap_or("?")
    }

    /// Resolves the name once. Re-resolving with the same name is a no-op;
    /// a different name is a configuration error.
    pub(crate) fn resolve_name(&self, name: &'static str) -> Result<()> {
        let resolved = self.name.get_or_init(|| name);
        if *resolved == name {
            Ok(())
        } else {
            Err(PropertyError::configuration(format!(
                "property already linked as '{resolved}', cannot relink as '{name}'"
            )))
        }
    }

    /// The base nullability rule shared by every descriptor.
    ///
    /// Returns `Ok(true)` when the value is `Null` and nulls are allowed —
    /// the "already fully validated" short-circuit subclass rules must
    /// honor. Returns `Ok(false)` when subclass rules should still run.
    pub fn check_none(&self, value: &Value) -> Result<bool> {
        if value.is_null() {
            if self.allow_none {
                Ok(true)
            } else {
                Err(PropertyError::invalid(
                    self.name_or_unknown(),
                    "null is not allowed",
                ))
            }
        } else {
            Ok(false)
        }
    }
}

// Manual Debug: the error handler is a closure with no Debug of its own.
impl fmt::Debug for PropertyBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBase")
            .field("default", &self.default)
            .field("allow_none", &self.allow_none)
            .field("error_value", &self.error_value)
            .field("has_error_handler", &self.error_handler.is_some())
            .field("name", &self.name.get())
            .finish()
    }
}

/// Generates the shared builder-style configuration methods on a concrete
/// descriptor struct with a `base: PropertyBase` field.
macro_rules! impl_property_config {
    ($ty:ty) => {
        impl $ty {
            /// Permits `Null` as a stored value.
            #[must_use]
            pub fn allow_none(mut self, allow: bool) -> Self {
                self.base.allow_none = allow;
                self
            }

            /// Substitute stored when validation fails. Re-validated before
            /// use; tried before the error handler.
            #[must_use]
            pub fn error_value(mut self, value: $crate::Value) -> Self {
                self.base.error_value = Some(value);
                self
            }

            /// Handler producing a substitute from a rejected value.
            /// Consulted when no error value is configured; its result is
            /// re-validated before use.
            #[must_use]
            pub fn error_handler(
                mut self,
                handler: impl Fn(&$crate::Value) -> $crate::Value + 'static,
            ) -> Self {
                self.base.error_handler = Some(alloc::rc::Rc::new(handler));
                self
            }
        }
    };
}
pub(crate) use impl_property_config;

/// The descriptor contract: validate, convert, get, set, bind, dispatch.
///
/// All methods have default implementations forming the base pipeline;
/// specialized descriptors override the hooks they need. Descriptors are
/// shared as `Rc<dyn Property>` and hold no per-entity state.
pub trait Property: 'static {
    /// The shared configuration record.
    fn base(&self) -> &PropertyBase;

    /// The resolved property name (`"?"` before linking).
    fn name(&self) -> &'static str {
        self.base().name_or_unknown()
    }

    /// Creates this property's storage record on `owner` under `name`.
    ///
    /// Idempotent: linking an already-linked (entity, name) pair leaves the
    /// existing record untouched. Resolves the descriptor name exactly once;
    /// a second link under a different name is a configuration error. The
    /// initial value is `convert(default)`; [`Property::init_storage`] then
    /// seeds variant-specific state.
    ///
    /// Must be called before any other operation on that entity.
    fn link(&self, owner: &Owner, name: &'static str) -> Result<()> {
        self.base().resolve_name(name)?;
        if owner.storage_map().contains(name) {
            return Ok(());
        }
        let record: Record = Rc::new(RefCell::new(PropertyStorage::new(Value::Null)));
        let record = owner.storage_map().insert_if_absent(name, record);
        let initial = self.convert(owner, self.base().default.clone())?;
        record.borrow_mut().value = initial;
        self.init_storage(owner, &record)
    }

    /// Hook for composite properties to subscribe to their constituents.
    /// No-op by default. Call after every involved property is linked.
    fn link_deps(&self, owner: &Owner) -> Result<()> {
        let _ = owner;
        Ok(())
    }

    /// Hook run at the end of [`Property::link`] to seed variant state on
    /// the fresh record. No-op by default.
    fn init_storage(&self, owner: &Owner, record: &Record) -> Result<()> {
        let _ = (owner, record);
        Ok(())
    }

    /// This property's storage record on `owner`.
    fn record(&self, owner: &Owner) -> Result<Record> {
        let name = self.base().name().ok_or_else(|| {
            PropertyError::configuration("property used before it was linked")
        })?;
        owner.storage_map().record(name).ok_or_else(|| {
            PropertyError::configuration(format!("property '{name}' is not linked to this entity"))
        })
    }

    /// Adds an observer. Binding an identical observer twice is a no-op;
    /// returns `false` in that case.
    fn bind(&self, owner: &Owner, observer: Observer) -> Result<bool> {
        Ok(self.record(owner)?.borrow_mut().add_observer(observer))
    }

    /// Removes an observer. Unbinding an absent observer is a no-op
    /// returning `false`.
    fn unbind(&self, owner: &Owner, observer: &Observer) -> Result<bool> {
        Ok(self.record(owner)?.borrow_mut().remove_observer(observer))
    }

    /// Normalizes an input shape before validation. Identity by default.
    fn convert(&self, owner: &Owner, value: Value) -> Result<Value> {
        let _ = owner;
        Ok(value)
    }

    /// Validates a converted value.
    ///
    /// `Ok(true)` means "fully validated, skip remaining rules" — the base
    /// rule returns it for a permitted `Null`. Overrides must call the base
    /// rule first and preserve that short-circuit:
    ///
    /// ```ignore
    /// fn check(&self, owner: &Owner, value: &Value) -> Result<bool> {
    ///     if self.base().check_none(value)? {
    ///         return Ok(true);
    ///     }
    ///     // ... own rule ...
    ///     Ok(false)
    /// }
    /// ```
    fn check(&self, owner: &Owner, value: &Value) -> Result<bool> {
        let _ = owner;
        self.base().check_none(value)
    }

    /// Attempts recovery after a `check` failure: the configured error
    /// value first, else the error handler's result, each re-validated. If
    /// neither is configured or the candidate fails validation, the
    /// original error propagates.
    fn recover(&self, owner: &Owner, failed: &Value, original: PropertyError) -> Result<Value> {
        let base = self.base();
        let candidate = if let Some(value) = &base.error_value {
            value.clone()
        } else if let Some(handler) = &base.error_handler {
            handler(failed)
        } else {
            return Err(original);
        };
        match self.check(owner, &candidate) {
            Ok(_) => Ok(candidate),
            Err(_) => Err(original),
        }
    }

    /// Assigns a value.
    ///
    /// Returns `Ok(false)` without dispatching when the converted value
    /// equals the stored one (including when error recovery lands on the
    /// stored value); returns `Ok(true)` after storing and dispatching
    /// exactly once otherwise.
    fn set(&self, owner: &Owner, value: Value) -> Result<bool> {
        let value = self.convert(owner, value)?;
        let record = self.record(owner)?;
        if record.borrow().value == value {
            return Ok(false);
        }
        let value = match self.check(owner, &value) {
            Ok(_) => value,
            Err(err) => self.recover(owner, &value, err)?,
        };
        {
            let mut storage = record.borrow_mut();
            if storage.value == value {
                return Ok(false);
            }
            storage.value = value;
        }
        self.dispatch(owner)?;
        Ok(true)
    }

    /// The current stored value, without validation.
    fn get(&self, owner: &Owner) -> Result<Value> {
        Ok(self.record(owner)?.borrow().value.clone())
    }

    /// Coarse notification of every bound observer with the current value.
    ///
    /// This is also the force-dispatch path: calling it directly notifies
    /// observers regardless of the change-suppression rule in `set`.
    fn dispatch(&self, owner: &Owner) -> Result<()> {
        dispatch_record(&self.record(owner)?, owner, &Change::Reset);
        Ok(())
    }

    /// Granular notification carrying an operation record.
    fn dispatch_with_op(&self, owner: &Owner, change: &Change) -> Result<()> {
        dispatch_record(&self.record(owner)?, owner, change);
        Ok(())
    }
}

/// The plain descriptor: accepts any value, subject only to the null rule.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use std::any::Any;
/// use reactive_property::{BaseProperty, Property, PropertyOwner, StorageMap, Value};
///
/// struct Widget {
///     props: StorageMap,
/// }
///
/// impl PropertyOwner for Widget {
///     fn storage_map(&self) -> &StorageMap {
///         &self.props
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let widget: Rc<dyn PropertyOwner> = Rc::new(Widget { props: StorageMap::new() });
/// let title = BaseProperty::new(Value::from("untitled"));
/// title.link(&widget, "title").unwrap();
///
/// assert_eq!(title.get(&widget).unwrap(), Value::from("untitled"));
/// assert!(title.set(&widget, Value::from("report")).unwrap());
/// assert!(!title.set(&widget, Value::from("report")).unwrap());
/// ```
pub struct BaseProperty {
    base: PropertyBase,
}

impl BaseProperty {
    /// Creates a descriptor with the given default value.
    #[must_use]
    pub fn new(default: Value) -> Self {
        Self {
            base: PropertyBase::new(default),
        }
    }
}

impl Property for BaseProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }
}

impl_property_config!(BaseProperty);

impl fmt::Debug for BaseProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseProperty")
            .field("base", &self.base)
            .finish()
    }
}

/// Formats the standard validation message for a shape mismatch.
pub(crate) fn shape_error(name: &'static str, expected: &str, got: &Value) -> PropertyError {
    PropertyError::invalid(
        name,
        format!("expected {expected}, got {got}", got = ShapeOf(got)),
    )
}

struct ShapeOf<'a>(&'a Value);

impl fmt::Display for ShapeOf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.0.shape_name(), self.0)
    }
}

/// Convenience for error messages that need an owned string.
pub(crate) fn value_repr(value: &Value) -> String {
    format!("{value:?}")
}
