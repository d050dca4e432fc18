// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change events and operation records for granular dispatch.
//!
//! Observers receive a [`Change`] alongside every notification. Coarse
//! dispatch carries [`Change::Reset`] ("the value changed, no detail");
//! granular container dispatch carries an operation record describing the
//! exact mutation — the operation kind plus the affected index range or key
//! set. Both shapes are variants of the one sum type so observer interfaces
//! stay uniform.

use alloc::string::String;
use smallvec::SmallVec;

/// Mutating operations an observable list reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListOp {
    /// A single element was replaced.
    SetItem,
    /// A single element was removed.
    DelItem,
    /// A contiguous range was replaced.
    SetSlice,
    /// A contiguous range was removed.
    DelSlice,
    /// Elements were concatenated in place (`+=`).
    IAdd,
    /// The list was repeated in place (`*=`).
    IMul,
    /// One element was appended.
    Append,
    /// The first matching element was removed.
    Remove,
    /// One element was inserted.
    Insert,
    /// One element was removed and returned.
    Pop,
    /// Elements were appended from an iterator.
    Extend,
    /// A reorder is about to happen; observers may snapshot state.
    SortStart,
    /// The list was sorted.
    Sort,
    /// The list was reversed.
    Reverse,
    /// Several indices were removed in one operation.
    BatchDelete,
}

/// A list operation record: kind plus the affected index range, both ends
/// inclusive.
///
/// Indices refer to the list as the operation saw it: insertion-style
/// operations report where the new elements landed, deletion-style
/// operations report the pre-deletion positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ListOpInfo {
    /// The operation that happened.
    pub op: ListOp,
    /// First affected index.
    pub start: usize,
    /// Last affected index (inclusive).
    pub end: usize,
}

impl ListOpInfo {
    /// Creates a record for the inclusive range `start..=end`.
    #[must_use]
    pub fn new(op: ListOp, start: usize, end: usize) -> Self {
        Self { op, start, end }
    }
}

/// Mutating operations an observable dict reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DictOp {
    /// A key was introduced by `set_item`.
    Add,
    /// An existing key's value was replaced by `set_item`.
    Set,
    /// A key was removed.
    DelItem,
    /// The dict was cleared.
    Clear,
    /// A key was removed and returned.
    Pop,
    /// `setdefault` introduced a key.
    SetDefault,
    /// `update` merged entries; the key set lists only newly introduced keys.
    Update,
}

/// Inline capacity for the affected-key set; most dict operations touch one
/// or two keys.
const KEY_INLINE: usize = 2;

/// A dict operation record: kind plus the affected key set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictOpInfo {
    /// The operation that happened.
    pub op: DictOp,
    /// The keys the operation affected. For `Update` and `SetDefault` this
    /// lists only keys that were newly introduced.
    pub keys: SmallVec<[String; KEY_INLINE]>,
}

impl DictOpInfo {
    /// Creates a record affecting a single key.
    #[must_use]
    pub fn single(op: DictOp, key: String) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key);
        Self { op, keys }
    }

    /// Creates a record affecting the given keys.
    #[must_use]
    pub fn with_keys(op: DictOp, keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            op,
            keys: keys.into_iter().collect(),
        }
    }
}

/// The change event delivered to observers.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// Coarse notification: the value changed, no operation detail.
    Reset,
    /// A list mutation with operation detail.
    List(ListOpInfo),
    /// A dict mutation with operation detail.
    Dict(DictOpInfo),
}

impl Change {
    /// Returns the list op record, if this is a list change.
    #[must_use]
    pub fn list_op(&self) -> Option<&ListOpInfo> {
        match self {
            Self::List(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the dict op record, if this is a dict change.
    #[must_use]
    pub fn dict_op(&self) -> Option<&DictOpInfo> {
        match self {
            Self::Dict(info) => Some(info),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn list_op_info_range() {
        let info = ListOpInfo::new(ListOp::Extend, 0, 1);
        assert_eq!(info.op, ListOp::Extend);
        assert_eq!((info.start, info.end), (0, 1));
    }

    #[test]
    fn dict_op_info_keys() {
        let info = DictOpInfo::single(DictOp::Add, "k".to_string());
        assert_eq!(info.keys.as_slice(), ["k".to_string()]);

        let info = DictOpInfo::with_keys(DictOp::Update, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(info.keys.len(), 2);
    }

    #[test]
    fn change_accessors() {
        let change = Change::List(ListOpInfo::new(ListOp::Append, 3, 3));
        assert!(change.list_op().is_some());
        assert!(change.dict_op().is_none());
        assert!(Change::Reset.list_op().is_none());
    }
}
