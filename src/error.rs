// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for property validation and container operations.

use alloc::string::String;
use core::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, PropertyError>;

/// Errors produced by property validation, linking, and container operations.
///
/// Validation failures surface as [`PropertyError::InvalidValue`] and are
/// raised *before* any storage mutation: a failed `set` leaves the stored
/// value untouched. Misuse of the descriptor API itself (linking one
/// descriptor under two names, operating on an unlinked property, writing a
/// setter-less alias) surfaces as [`PropertyError::Configuration`].
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyError {
    /// A value failed a property's validation rule.
    InvalidValue {
        /// Resolved name of the property that rejected the value, or `"?"`
        /// when validation ran before the property was linked.
        property: &'static str,
        /// Human-readable description of the rule that was violated.
        message: String,
    },
    /// The descriptor or container API was used in an unsupported way.
    Configuration {
        /// Description of the misuse.
        message: String,
    },
    /// A dict operation referenced a key that is not present.
    MissingKey(String),
    /// A list operation referenced an index past the end.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The list length at the time of the operation.
        len: usize,
    },
    /// A pop-style operation ran against an empty collection.
    EmptyCollection,
}

impl PropertyError {
    /// Creates an [`PropertyError::InvalidValue`] for the given property name.
    #[must_use]
    pub fn invalid(property: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            property,
            message: message.into(),
        }
    }

    /// Creates a [`PropertyError::Configuration`] error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation failure (as opposed to API
    /// misuse or a container key error).
    #[must_use]
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { property, message } => {
                write!(f, "invalid value for property '{property}': {message}")
            }
            Self::Configuration { message } => {
                write!(f, "property configuration error: {message}")
            }
            Self::MissingKey(key) => write!(f, "key '{key}' not found"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::EmptyCollection => write!(f, "operation on empty collection"),
        }
    }
}

impl core::error::Error for PropertyError {}
