// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-length numeric list properties with broadcast assignment.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{PropertyError, Result};
use crate::list::{ListMode, ObservableList};
use crate::numeric::numeric_convert;
use crate::property::{Property, PropertyBase, impl_property_config, shape_error};
use crate::storage::{Hook, Owner};
use crate::value::Value;

/// A numeric list of fixed length (2 or 4) with broadcast assignment,
/// the shape used for paddings, margins, and border widths.
///
/// Accepted input shapes, for a property of length 4:
///
/// - a single numeric (or unit-tagged numeric) `x` → `[x, x, x, x]`;
/// - a 1-element sequence `[x]` → `[x, x, x, x]`;
/// - a 2-element sequence whose second element is a unit tag, i.e. a
///   `(magnitude, unit)` pair → the converted value, broadcast;
/// - any other 2-element sequence `[x, y]` → `[x, y, x, y]`;
/// - a 4-element sequence, taken as-is.
///
/// A length-2 property accepts the same shapes minus the 4-element one.
/// Each element is normalized exactly like a
/// [`NumericProperty`](crate::NumericProperty) value, so `"10pt"` strings
/// and `(10, "pt")` pairs resolve to pixels. The stored value is a coarse
/// [`ObservableList`].
pub struct VariableListProperty {
    base: PropertyBase,
    length: usize,
}

impl VariableListProperty {
    /// Creates a descriptor of the given length. Only lengths 2 and 4 are
    /// supported.
    pub fn new(default: Vec<Value>, length: usize) -> Result<Self> {
        if length != 2 && length != 4 {
            return Err(PropertyError::configuration(format!(
                "variable list length must be 2 or 4, got {length}"
            )));
        }
        Ok(Self {
            base: PropertyBase::new(Value::Tuple(default)),
            length,
        })
    }

    /// The fixed length of stored lists.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Expands an input to exactly `self.length` raw elements.
    fn expand(&self, owner: &Owner, items: Vec<Value>) -> Result<Vec<Value>> {
        match items.len() {
            1 => Ok(vec![items[0].clone(); self.length]),
            2 if matches!(items[1], Value::Str(_)) => {
                // A (magnitude, unit) pair: one converted value, broadcast.
                let converted = numeric_convert(self, owner, Value::Tuple(items))?;
                Ok(vec![converted; self.length])
            }
            2 if self.length == 2 => Ok(items),
            2 => Ok(vec![
                items[0].clone(),
                items[1].clone(),
                items[0].clone(),
                items[1].clone(),
            ]),
            4 if self.length == 4 => Ok(items),
            len => Err(PropertyError::invalid(
                self.name(),
                format!(
                    "expected 1, 2 or 4 elements for a length-{} list, got {len}",
                    self.length
                ),
            )),
        }
    }
}

impl Property for VariableListProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn convert(&self, owner: &Owner, value: Value) -> Result<Value> {
        let items = match value {
            Value::Tuple(items) => items,
            Value::List(list) => list.to_vec(),
            single @ (Value::Int(_) | Value::Float(_) | Value::Str(_)) => vec![single],
            other => return Ok(other),
        };
        let mut normalized = Vec::with_capacity(self.length);
        for item in self.expand(owner, items)? {
            let item = numeric_convert(self, owner, item)?;
            if !item.is_numeric() {
                return Err(shape_error(self.name(), "a numeric element", &item));
            }
            normalized.push(item);
        }
        let list = ObservableList::with_mode(normalized, ListMode::Coarse);
        list.attach(Hook::new(&self.record(owner)?, owner));
        Ok(Value::List(list))
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        match value {
            Value::List(list) if list.len() == self.length => Ok(false),
            other => Err(shape_error(
                self.name(),
                &format!("a numeric list of length {}", self.length),
                other,
            )),
        }
    }
}

impl_property_config!(VariableListProperty);

impl fmt::Debug for VariableListProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableListProperty")
            .field("base", &self.base)
            .field("length", &self.length)
            .finish()
    }
}
