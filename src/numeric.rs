// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric properties, with unit conversion and optional bounds.
//!
//! [`NumericProperty`] accepts three input shapes:
//!
//! - a plain number — `Value::Int(10)` or `Value::Float(1.5)`;
//! - a (magnitude, unit) pair — `Value::Tuple([10.into(), "pt".into()])`;
//! - a unit-suffixed string — `Value::Str("10pt")`, where the trailing two
//!   characters are one of the codes in [`Unit::ALL`].
//!
//! Unit-tagged shapes are resolved to pixels through the process-wide
//! [`metrics`](crate::unit::metrics) and the unit tag is remembered in the
//! entity's storage record, queryable via [`NumericProperty::format`].

use alloc::format;
use core::fmt;

use crate::error::{PropertyError, Result};
use crate::property::{Property, PropertyBase, impl_property_config, shape_error};
use crate::storage::{Owner, Record};
use crate::unit::{Unit, to_pixels};
use crate::value::Value;

/// Shared conversion for the three numeric input shapes.
///
/// Unit-tagged shapes record the resolved unit in `format` on the storage
/// record, which must already exist (conversion of unit-tagged defaults
/// happens after the record is created during link).
pub(crate) fn numeric_convert<P: Property + ?Sized>(
    property: &P,
    owner: &Owner,
    value: Value,
) -> Result<Value> {
    let name = property.name();
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value),
        Value::Tuple(items) => {
            if items.len() != 2 {
                return Err(PropertyError::invalid(
                    name,
                    format!(
                        "a unit-tagged numeric pair has exactly 2 elements, got {}",
                        items.len()
                    ),
                ));
            }
            let magnitude = items[0]
                .as_f64()
                .ok_or_else(|| shape_error(name, "a numeric magnitude", &items[0]))?;
            let tag = items[1]
                .as_str()
                .ok_or_else(|| shape_error(name, "a unit tag string", &items[1]))?;
            let unit = Unit::parse_for(name, tag)?;
            apply_unit(property, owner, magnitude, unit)
        }
        Value::Str(text) => {
            let (magnitude, unit) = parse_suffixed(name, &text)?;
            apply_unit(property, owner, magnitude, unit)
        }
        // Anything else flows through to `check`, which rejects it with the
        // property's standard message.
        other => Ok(other),
    }
}

/// Splits a `"10pt"`-style value into magnitude and unit.
fn parse_suffixed(name: &'static str, text: &str) -> Result<(f64, Unit)> {
    if text.len() < 3 || !text.is_char_boundary(text.len() - 2) {
        return Err(PropertyError::invalid(
            name,
            format!("'{text}' is not a unit-suffixed numeric"),
        ));
    }
    let (magnitude, suffix) = text.split_at(text.len() - 2);
    let unit = Unit::parse_for(name, suffix)?;
    let magnitude: f64 = magnitude.trim().parse().map_err(|_| {
        PropertyError::invalid(name, format!("'{magnitude}' is not a numeric magnitude"))
    })?;
    Ok((magnitude, unit))
}

fn apply_unit<P: Property + ?Sized>(
    property: &P,
    owner: &Owner,
    magnitude: f64,
    unit: Unit,
) -> Result<Value> {
    let record = property.record(owner)?;
    record.borrow_mut().format = unit;
    Ok(Value::Float(to_pixels(magnitude, unit)))
}

/// Shared numeric-kind validation used by the numeric descriptors.
pub(crate) fn check_numeric_kind(name: &'static str, value: &Value) -> Result<()> {
    if value.is_numeric() {
        Ok(())
    } else {
        Err(shape_error(name, "an int or float", value))
    }
}

/// A validated numeric attribute with unit conversion.
///
/// # Example
///
/// ```ignore
/// let width = NumericProperty::new(Value::Int(0));
/// width.link(&widget, "width")?;
/// width.set(&widget, Value::Tuple(vec![Value::Int(10), Value::from("pt")]))?;
/// assert_eq!(width.format(&widget)?, Unit::Pt);
/// ```
pub struct NumericProperty {
    base: PropertyBase,
}

impl NumericProperty {
    /// Creates a numeric descriptor with the given default.
    #[must_use]
    pub fn new(default: Value) -> Self {
        Self {
            base: PropertyBase::new(default),
        }
    }

    /// The unit tag of the last unit-tagged assignment on `owner`.
    ///
    /// `Px` means "unconverted": no unit-tagged value has been assigned.
    pub fn format(&self, owner: &Owner) -> Result<Unit> {
        Ok(self.record(owner)?.borrow().format)
    }
}

impl Property for NumericProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn convert(&self, owner: &Owner, value: Value) -> Result<Value> {
        numeric_convert(self, owner, value)
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        check_numeric_kind(self.name(), value)?;
        Ok(false)
    }
}

impl_property_config!(NumericProperty);

impl fmt::Debug for NumericProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericProperty")
            .field("base", &self.base)
            .finish()
    }
}

/// A bound endpoint, discriminated by numeric kind.
///
/// The kind controls comparison semantics: an `Int` bound compares against
/// integer values with exact integer comparison; mixed kinds compare as
/// floats.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Bound {
    /// An integer endpoint.
    Int(i64),
    /// A float endpoint.
    Float(f64),
}

impl Bound {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// `value < self`, under same-kind comparison rules.
    fn is_above(self, value: &Value) -> bool {
        match (value, self) {
            (Value::Int(v), Self::Int(m)) => *v < m,
            _ => value.as_f64().is_some_and(|v| v < self.as_f64()),
        }
    }

    /// `value > self`, under same-kind comparison rules.
    fn is_below(self, value: &Value) -> bool {
        match (value, self) {
            (Value::Int(v), Self::Int(m)) => *v > m,
            _ => value.as_f64().is_some_and(|v| v > self.as_f64()),
        }
    }
}

/// Per-record bound overrides, with each endpoint independently enabled.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoundState {
    /// Minimum endpoint, if enabled.
    pub min: Option<Bound>,
    /// Maximum endpoint, if enabled.
    pub max: Option<Bound>,
}

/// A numeric property constrained to a range.
///
/// Bounds exist at two levels: the descriptor-level defaults given at
/// construction, copied into each record at link time, and per-entity
/// overrides mutable through [`set_min`](Self::set_min) /
/// [`set_max`](Self::set_max). Changing a bound does **not** re-validate
/// the value already stored; the new bound applies from the next `set` on.
pub struct BoundedNumericProperty {
    base: PropertyBase,
    bounds: BoundState,
}

impl BoundedNumericProperty {
    /// Creates a bounded numeric descriptor. Either endpoint may be `None`.
    #[must_use]
    pub fn new(default: Value, min: Option<Bound>, max: Option<Bound>) -> Self {
        Self {
            base: PropertyBase::new(default),
            bounds: BoundState { min, max },
        }
    }

    /// The per-entity minimum endpoint.
    pub fn min(&self, owner: &Owner) -> Result<Option<Bound>> {
        Ok(self.record(owner)?.borrow().bounds.min)
    }

    /// The per-entity maximum endpoint.
    pub fn max(&self, owner: &Owner) -> Result<Option<Bound>> {
        Ok(self.record(owner)?.borrow().bounds.max)
    }

    /// Overrides the minimum endpoint for `owner` only. Does not
    /// re-validate the stored value.
    pub fn set_min(&self, owner: &Owner, min: Option<Bound>) -> Result<()> {
        self.record(owner)?.borrow_mut().bounds.min = min;
        Ok(())
    }

    /// Overrides the maximum endpoint for `owner` only. Does not
    /// re-validate the stored value.
    pub fn set_max(&self, owner: &Owner, max: Option<Bound>) -> Result<()> {
        self.record(owner)?.borrow_mut().bounds.max = max;
        Ok(())
    }

    /// The unit tag of the last unit-tagged assignment on `owner`.
    pub fn format(&self, owner: &Owner) -> Result<Unit> {
        Ok(self.record(owner)?.borrow().format)
    }
}

impl Property for BoundedNumericProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn init_storage(&self, _owner: &Owner, record: &Record) -> Result<()> {
        record.borrow_mut().bounds = self.bounds;
        Ok(())
    }

    fn convert(&self, owner: &Owner, value: Value) -> Result<Value> {
        numeric_convert(self, owner, value)
    }

    fn check(&self, owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        check_numeric_kind(self.name(), value)?;
        let bounds = self.record(owner)?.borrow().bounds;
        if let Some(min) = bounds.min
            && min.is_above(value)
        {
            return Err(PropertyError::invalid(
                self.name(),
                format!("value {value:?} is below the minimum bound {min:?}"),
            ));
        }
        if let Some(max) = bounds.max
            && max.is_below(value)
        {
            return Err(PropertyError::invalid(
                self.name(),
                format!("value {value:?} exceeds the maximum bound {max:?}"),
            ));
        }
        Ok(false)
    }
}

impl_property_config!(BoundedNumericProperty);

impl fmt::Debug for BoundedNumericProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedNumericProperty")
            .field("base", &self.base)
            .field("bounds", &self.bounds)
            .finish()
    }
}
