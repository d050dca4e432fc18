// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reactive Property: typed, observable attributes for entity models.
//!
//! This crate provides property descriptors that validate values at
//! assignment and notify observers on change. A descriptor is shared,
//! stateless configuration; each entity holds one storage record per linked
//! property, so thousands of entities share one descriptor per attribute.
//!
//! ## Core Concepts
//!
//! ### Descriptors and records
//!
//! A property type implements [`Property`]. The assignment pipeline is
//! shared: convert the input shape, suppress the write if it equals the
//! stored value, validate, optionally recover from a validation failure,
//! store, and dispatch observers exactly once.
//!
//! - [`BaseProperty`] — any value, subject only to the null rule
//! - [`NumericProperty`] / [`BoundedNumericProperty`] — numbers, with
//!   `(10, "pt")` and `"10pt"` unit shapes resolved through
//!   [`DisplayMetrics`]
//! - [`StringProperty`], [`BooleanProperty`], [`ObjectProperty`],
//!   [`OptionProperty`] — scalar variants
//! - [`ListProperty`] / [`DictProperty`] — observable containers, coarse or
//!   operation-granular notification
//! - [`VariableListProperty`] — fixed-length numeric lists with broadcast
//!   assignment
//! - [`ReferenceListProperty`] — a composite view over other properties
//! - [`AliasProperty`] — computed values with optional caching
//!
//! ### Entities
//!
//! An entity implements [`PropertyOwner`] by embedding a [`StorageMap`] and
//! is handled as `Rc<dyn PropertyOwner>`. Observable containers hold only
//! weak back-references, so a leaked list can never keep its entity alive.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use std::any::Any;
//! use reactive_property::{
//!     BoundedNumericProperty, Bound, Observer, Property, PropertyOwner,
//!     StorageMap, Value,
//! };
//!
//! struct Widget {
//!     props: StorageMap,
//! }
//!
//! impl PropertyOwner for Widget {
//!     fn storage_map(&self) -> &StorageMap {
//!         &self.props
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let widget: Rc<dyn PropertyOwner> = Rc::new(Widget { props: StorageMap::new() });
//!
//! let opacity = BoundedNumericProperty::new(
//!     Value::Float(1.0),
//!     Some(Bound::Float(0.0)),
//!     Some(Bound::Float(1.0)),
//! );
//! opacity.link(&widget, "opacity").unwrap();
//!
//! opacity.bind(&widget, Observer::new(|_, value, _| {
//!     println!("opacity is now {value:?}");
//! })).unwrap();
//!
//! assert!(opacity.set(&widget, Value::Float(0.5)).unwrap());
//! // Equal value: suppressed, observers stay silent.
//! assert!(!opacity.set(&widget, Value::Float(0.5)).unwrap());
//! // Out of bounds: rejected, stored value untouched.
//! assert!(opacity.set(&widget, Value::Float(2.0)).is_err());
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod alias;
mod dict;
mod error;
mod list;
mod numeric;
mod ops;
mod property;
mod reference;
mod simple;
mod storage;
mod unit;
mod value;
mod variable_list;

pub use alias::{AliasGetter, AliasProperty, AliasSetter};
pub use dict::{DictMode, DictProperty, ObservableDict};
pub use error::{PropertyError, Result};
pub use list::{ListMode, ListProperty, ObservableList};
pub use numeric::{Bound, BoundState, BoundedNumericProperty, NumericProperty};
pub use ops::{Change, DictOp, DictOpInfo, ListOp, ListOpInfo};
pub use property::{BaseProperty, ErrorHandler, Property, PropertyBase};
pub use reference::ReferenceListProperty;
pub use simple::{BooleanProperty, ObjectProperty, OptionProperty, StringProperty};
pub use storage::{Observer, Owner, PropertyOwner, PropertyStorage, Record, StorageMap};
pub use unit::{DisplayMetrics, Unit, install_metrics_source, metrics, to_pixels};
pub use value::Value;
pub use variable_list::VariableListProperty;
