// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar property variants: strings, booleans, opaque objects, and
//! option-constrained values.

use alloc::format;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::error::{PropertyError, Result};
use crate::property::{Property, PropertyBase, impl_property_config, shape_error, value_repr};
use crate::storage::{Owner, Record};
use crate::value::Value;

/// A property holding string values only.
pub struct StringProperty {
    base: PropertyBase,
}

impl StringProperty {
    /// Creates a string descriptor with the given default.
    #[must_use]
    pub fn new(default: Value) -> Self {
        Self {
            base: PropertyBase::new(default),
        }
    }
}

impl Property for StringProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        match value {
            Value::Str(_) => Ok(false),
            other => Err(shape_error(self.name(), "a string", other)),
        }
    }
}

impl_property_config!(StringProperty);

impl fmt::Debug for StringProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringProperty")
            .field("base", &self.base)
            .finish()
    }
}

/// A property holding `true` or `false`.
///
/// Only `Value::Bool` is accepted; numeric values are not coerced to their
/// truthiness.
pub struct BooleanProperty {
    base: PropertyBase,
}

impl BooleanProperty {
    /// Creates a boolean descriptor with the given default.
    #[must_use]
    pub fn new(default: bool) -> Self {
        Self {
            base: PropertyBase::new(Value::Bool(default)),
        }
    }
}

impl Property for BooleanProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        match value {
            Value::Bool(_) => Ok(false),
            other => Err(shape_error(self.name(), "a bool", other)),
        }
    }
}

impl_property_config!(BooleanProperty);

impl fmt::Debug for BooleanProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanProperty")
            .field("base", &self.base)
            .finish()
    }
}

/// A property holding arbitrary values, optionally constrained to a single
/// concrete payload type.
///
/// Without a type constraint any non-null value passes validation. With
/// [`of_type`](Self::of_type), only `Value::Object` payloads of that exact
/// type are accepted.
pub struct ObjectProperty {
    base: PropertyBase,
    required: Option<(TypeId, &'static str)>,
}

impl ObjectProperty {
    /// Creates an unconstrained object descriptor with the given default.
    #[must_use]
    pub fn new(default: Value) -> Self {
        Self {
            base: PropertyBase::new(default),
            required: None,
        }
    }

    /// Restricts accepted values to `Value::Object` payloads of type `T`.
    #[must_use]
    pub fn of_type<T: 'static>(mut self) -> Self {
        self.required = Some((TypeId::of::<T>(), core::any::type_name::<T>()));
        self
    }
}

impl Property for ObjectProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        if let Some((id, type_name)) = self.required {
            match value {
                Value::Object(payload) if (**payload).type_id() == id => Ok(false),
                other => Err(shape_error(self.name(), type_name, other)),
            }
        } else {
            Ok(false)
        }
    }
}

impl_property_config!(ObjectProperty);

impl fmt::Debug for ObjectProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectProperty")
            .field("base", &self.base)
            .field("required", &self.required.map(|(_, name)| name))
            .finish()
    }
}

/// A property whose value must be one of a fixed set of permitted values.
///
/// The permitted set is fixed at construction and snapshotted into each
/// entity's record at link time, queryable via [`options`](Self::options).
pub struct OptionProperty {
    base: PropertyBase,
    options: Vec<Value>,
}

impl OptionProperty {
    /// Creates an option descriptor. `default` should normally be a member
    /// of `options`; it is validated at link time like any other value.
    #[must_use]
    pub fn new(default: Value, options: Vec<Value>) -> Self {
        Self {
            base: PropertyBase::new(default),
            options,
        }
    }

    /// The permitted set, as snapshotted on `owner`'s record.
    pub fn options(&self, owner: &Owner) -> Result<Vec<Value>> {
        Ok(self.record(owner)?.borrow().options.clone())
    }
}

impl Property for OptionProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn init_storage(&self, _owner: &Owner, record: &Record) -> Result<()> {
        record.borrow_mut().options = self.options.clone();
        Ok(())
    }

    fn check(&self, owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        let record = self.record(owner)?;
        let storage = record.borrow();
        if storage.options.contains(value) {
            Ok(false)
        } else {
            let mut permitted = alloc::string::String::new();
            for (i, option) in storage.options.iter().enumerate() {
                if i > 0 {
                    permitted.push_str(", ");
                }
                permitted.push_str(&value_repr(option));
            }
            Err(PropertyError::invalid(
                self.name(),
                format!(
                    "{} is not a permitted value, expected one of [{permitted}]",
                    value_repr(value)
                ),
            ))
        }
    }
}

impl_property_config!(OptionProperty);

impl fmt::Debug for OptionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionProperty")
            .field("base", &self.base)
            .field("options", &self.options)
            .finish()
    }
}
