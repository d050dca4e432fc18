// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable list values and the list property.
//!
//! An [`ObservableList`] is a shared, interior-mutable sequence. When a list
//! property adopts one (which happens on every assignment), the wrapper gains
//! a back-reference to the owning (property, entity) pair and every mutating
//! call notifies that property's observers.
//!
//! Notification granularity is per-property:
//!
//! - [`ListMode::Coarse`] reports every mutating call as [`Change::Reset`];
//! - [`ListMode::Granular`] reports a [`Change::List`] carrying the operation
//!   and the affected index span, and stays silent when a call provably
//!   changed nothing;
//! - [`ListMode::Reference`] is the write-through mode used by composite
//!   reference lists: element writes are routed into the constituent
//!   properties instead of the local buffer.

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::error::{PropertyError, Result};
use crate::ops::{Change, ListOp, ListOpInfo};
use crate::property::{Property, PropertyBase, impl_property_config, shape_error};
use crate::storage::{Hook, Owner};
use crate::value::Value;

/// Notification granularity of a list property.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ListMode {
    /// Every mutating call dispatches a [`Change::Reset`].
    #[default]
    Coarse,
    /// Mutating calls dispatch [`Change::List`] operation records; calls
    /// that change nothing dispatch nothing.
    Granular,
    /// Element writes are forwarded to constituent properties. Used by
    /// reference lists; the length is fixed.
    Reference,
}

struct ListInner {
    items: RefCell<Vec<Value>>,
    mode: ListMode,
    hook: RefCell<Option<Hook>>,
}

/// A shared, observable sequence of [`Value`]s.
///
/// Cloning shares the underlying buffer; observers receiving a list value
/// see live contents, not a snapshot.
#[derive(Clone)]
pub struct ObservableList {
    inner: Rc<ListInner>,
}

impl ObservableList {
    /// Creates a detached coarse list. Assigning it to a list property
    /// copies its contents into a fresh wrapper with that property's mode.
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self::with_mode(items, ListMode::Coarse)
    }

    pub(crate) fn with_mode(items: Vec<Value>, mode: ListMode) -> Self {
        Self {
            inner: Rc::new(ListInner {
                items: RefCell::new(items),
                mode,
                hook: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn attach(&self, hook: Hook) {
        *self.inner.hook.borrow_mut() = Some(hook);
    }

    /// The notification mode this wrapper was created with.
    #[must_use]
    pub fn mode(&self) -> ListMode {
        self.inner.mode
    }

    /// The element at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Returns `true` if the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// A snapshot of the current contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.borrow().clone()
    }

    /// Dispatches to the owning property, if attached.
    ///
    /// `info` is `None` when the call provably changed nothing; granular
    /// mode stays silent then, coarse mode reports every completed call.
    fn notify(&self, info: Option<ListOpInfo>) {
        let hook = self.inner.hook.borrow().clone();
        let Some(hook) = hook else {
            return;
        };
        match self.inner.mode {
            ListMode::Coarse => hook.dispatch(&Change::Reset),
            ListMode::Granular => {
                if let Some(info) = info {
                    hook.dispatch(&Change::List(info));
                }
            }
            // Reference writes funnel through write_through, which
            // dispatches on the composite itself.
            ListMode::Reference => {}
        }
    }

    fn out_of_range(&self, index: usize) -> PropertyError {
        PropertyError::IndexOutOfRange {
            index,
            len: self.len(),
        }
    }

    fn fixed_length(&self, op: &str) -> Result<()> {
        if self.inner.mode == ListMode::Reference {
            return Err(PropertyError::configuration(format!(
                "a reference list has a fixed length; '{op}' is not supported"
            )));
        }
        Ok(())
    }

    /// Replaces the element at `index`.
    ///
    /// In reference mode the write is forwarded to the constituent property
    /// at that position.
    pub fn set_item(&self, index: usize, value: Value) -> Result<()> {
        if self.inner.mode == ListMode::Reference {
            self.write_through(index, alloc::vec![value])?;
            return Ok(());
        }
        {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or(PropertyError::IndexOutOfRange { index, len })?;
            *slot = value;
        }
        self.notify(Some(ListOpInfo::new(ListOp::SetItem, index, index)));
        Ok(())
    }

    /// Removes the element at `index`.
    pub fn del_item(&self, index: usize) -> Result<()> {
        self.fixed_length("del_item")?;
        {
            let mut items = self.inner.items.borrow_mut();
            if index >= items.len() {
                let len = items.len();
                return Err(PropertyError::IndexOutOfRange { index, len });
            }
            items.remove(index);
        }
        self.notify(Some(ListOpInfo::new(ListOp::DelItem, index, index)));
        Ok(())
    }

    /// Replaces the range `[start, end)` with `values` (lengths may differ).
    ///
    /// The operation record spans the replaced range of the *original* list.
    /// In reference mode the writes are forwarded element-wise and the
    /// replacement length must match the range.
    pub fn set_slice(&self, start: usize, end: usize, values: Vec<Value>) -> Result<()> {
        if self.inner.mode == ListMode::Reference {
            if end.saturating_sub(start) != values.len() {
                return Err(PropertyError::configuration(
                    "a reference list has a fixed length; slice replacement must preserve it",
                ));
            }
            self.write_through(start, values)?;
            return Ok(());
        }
        {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            if start > end || end > len {
                return Err(PropertyError::IndexOutOfRange { index: end, len });
            }
            items.splice(start..end, values);
        }
        let span_end = if end > start { end - 1 } else { start };
        self.notify(Some(ListOpInfo::new(ListOp::SetSlice, start, span_end)));
        Ok(())
    }

    /// Removes the range `[start, end)`.
    pub fn del_slice(&self, start: usize, end: usize) -> Result<()> {
        self.fixed_length("del_slice")?;
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            if start > end || end > len {
                return Err(PropertyError::IndexOutOfRange { index: end, len });
            }
            items.drain(start..end).count()
        };
        let info = (removed > 0).then(|| ListOpInfo::new(ListOp::DelSlice, start, end - 1));
        self.notify(info);
        Ok(())
    }

    /// In-place concatenation (the `+=` shape).
    pub fn inplace_concat(&self, values: Vec<Value>) -> Result<()> {
        self.extend_with(values, ListOp::IAdd)
    }

    /// Appends each of `values`.
    pub fn extend(&self, values: Vec<Value>) -> Result<()> {
        self.extend_with(values, ListOp::Extend)
    }

    fn extend_with(&self, values: Vec<Value>, op: ListOp) -> Result<()> {
        self.fixed_length("extend")?;
        let span = {
            let mut items = self.inner.items.borrow_mut();
            let old_len = items.len();
            items.extend(values);
            (items.len() > old_len).then(|| (old_len, items.len() - 1))
        };
        self.notify(span.map(|(start, end)| ListOpInfo::new(op, start, end)));
        Ok(())
    }

    /// In-place repetition (the `*=` shape): the contents become `factor`
    /// copies of themselves. A factor of zero empties the list; its
    /// operation record spans the range that was removed.
    pub fn inplace_repeat(&self, factor: usize) -> Result<()> {
        self.fixed_length("inplace_repeat")?;
        let span = {
            let mut items = self.inner.items.borrow_mut();
            let old_len = items.len();
            match factor {
                1 => None,
                0 => {
                    items.clear();
                    (old_len > 0).then(|| (0, old_len - 1))
                }
                n => {
                    if old_len == 0 {
                        None
                    } else {
                        let copy = items.clone();
                        for _ in 1..n {
                            items.extend(copy.iter().cloned());
                        }
                        Some((0, items.len() - 1))
                    }
                }
            }
        };
        self.notify(span.map(|(start, end)| ListOpInfo::new(ListOp::IMul, start, end)));
        Ok(())
    }

    /// Appends a single element.
    pub fn append(&self, value: Value) -> Result<()> {
        self.fixed_length("append")?;
        let index = {
            let mut items = self.inner.items.borrow_mut();
            items.push(value);
            items.len() - 1
        };
        self.notify(Some(ListOpInfo::new(ListOp::Append, index, index)));
        Ok(())
    }

    /// Removes the first element equal to `value`. Returns `false` (with no
    /// notification) when no element matches.
    pub fn remove(&self, value: &Value) -> Result<bool> {
        self.fixed_length("remove")?;
        let index = {
            let mut items = self.inner.items.borrow_mut();
            match items.iter().position(|item| item == value) {
                Some(index) => {
                    items.remove(index);
                    Some(index)
                }
                None => None,
            }
        };
        match index {
            Some(index) => {
                self.notify(Some(ListOpInfo::new(ListOp::Remove, index, index)));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Inserts `value` before position `index` (`index == len` appends).
    pub fn insert(&self, index: usize, value: Value) -> Result<()> {
        self.fixed_length("insert")?;
        {
            let mut items = self.inner.items.borrow_mut();
            if index > items.len() {
                let len = items.len();
                return Err(PropertyError::IndexOutOfRange { index, len });
            }
            items.insert(index, value);
        }
        self.notify(Some(ListOpInfo::new(ListOp::Insert, index, index)));
        Ok(())
    }

    /// Removes and returns the last element.
    pub fn pop(&self) -> Result<Value> {
        self.fixed_length("pop")?;
        let len = self.len();
        if len == 0 {
            return Err(PropertyError::EmptyCollection);
        }
        self.pop_at(len - 1)
    }

    /// Removes and returns the element at `index`.
    pub fn pop_at(&self, index: usize) -> Result<Value> {
        self.fixed_length("pop")?;
        let value = {
            let mut items = self.inner.items.borrow_mut();
            if items.is_empty() {
                return Err(PropertyError::EmptyCollection);
            }
            if index >= items.len() {
                let len = items.len();
                return Err(PropertyError::IndexOutOfRange { index, len });
            }
            items.remove(index)
        };
        self.notify(Some(ListOpInfo::new(ListOp::Pop, index, index)));
        Ok(value)
    }

    /// Sorts ascending under the cross-shape total order of [`Value`].
    ///
    /// Two notifications: a pre-pass marker before the buffer is rearranged
    /// (so observers can capture the old order) and the completed operation,
    /// both spanning the whole list.
    pub fn sort(&self) -> Result<()> {
        self.rearrange(ListOp::Sort, |items| {
            items.sort_by(|a, b| a.total_cmp(b));
        })
    }

    /// Sorts descending.
    pub fn sort_descending(&self) -> Result<()> {
        self.rearrange(ListOp::Sort, |items| {
            items.sort_by(|a, b| b.total_cmp(a));
        })
    }

    /// Reverses the order of elements.
    pub fn reverse(&self) -> Result<()> {
        self.rearrange(ListOp::Reverse, |items| items.reverse())
    }

    fn rearrange(&self, op: ListOp, apply: impl FnOnce(&mut Vec<Value>)) -> Result<()> {
        self.fixed_length("sort")?;
        let len = self.len();
        if len < 2 {
            self.notify(None);
            return Ok(());
        }
        self.notify(Some(ListOpInfo::new(ListOp::SortStart, 0, len - 1)));
        apply(&mut self.inner.items.borrow_mut());
        self.notify(Some(ListOpInfo::new(op, 0, len - 1)));
        Ok(())
    }

    /// Removes every listed index in one pass, notifying once. Out-of-range
    /// and duplicate indices are ignored; the operation record spans the
    /// lowest through highest index actually removed.
    pub fn batch_delete(&self, mut indices: Vec<usize>) -> Result<()> {
        self.fixed_length("batch_delete")?;
        indices.sort_unstable();
        indices.dedup();
        let span = {
            let mut items = self.inner.items.borrow_mut();
            let mut removed_span: Option<(usize, usize)> = None;
            // Back to front so earlier removals do not shift later indices.
            for &index in indices.iter().rev() {
                if index < items.len() {
                    items.remove(index);
                    removed_span = Some(match removed_span {
                        Some((_, max)) => (index, max),
                        None => (index, index),
                    });
                }
            }
            removed_span
        };
        self.notify(span.map(|(start, end)| ListOpInfo::new(ListOp::BatchDelete, start, end)));
        Ok(())
    }

    /// Replaces the buffer without notifying. Returns `true` if the contents
    /// changed. Composite refresh paths dispatch on their own terms.
    pub(crate) fn sync_items(&self, fresh: Vec<Value>) -> bool {
        let mut items = self.inner.items.borrow_mut();
        if *items == fresh {
            return false;
        }
        *items = fresh;
        true
    }

    /// Routes `values` into the constituent properties starting at `start`,
    /// then refreshes the composite buffer and dispatches once. Returns
    /// `true` if the composite value changed.
    ///
    /// The record's re-entrancy flag is set for the duration of the
    /// constituent writes so their change triggers do not recompute the
    /// composite mid-update. If the flag is already set, a composite update
    /// is in flight above us and the write lands in the buffer directly.
    pub(crate) fn write_through(&self, start: usize, values: Vec<Value>) -> Result<bool> {
        let hook = self.inner.hook.borrow().clone();
        let Some(hook) = hook else {
            return Err(PropertyError::configuration(
                "reference list is not attached to a property",
            ));
        };
        let (Some(record), Some(owner)) = (hook.record(), hook.owner()) else {
            return Ok(false);
        };
        if values.is_empty() {
            return Ok(false);
        }
        if start + values.len() > self.len() {
            return Err(self.out_of_range(start + values.len() - 1));
        }
        let constituents = {
            let mut storage = record.borrow_mut();
            let Some(state) = storage.reference.as_mut() else {
                return Err(PropertyError::configuration(
                    "reference list record is missing its constituents",
                ));
            };
            if state.updating {
                drop(storage);
                let mut items = self.inner.items.borrow_mut();
                for (offset, value) in values.into_iter().enumerate() {
                    items[start + offset] = value;
                }
                return Ok(false);
            }
            state.updating = true;
            state.constituents.clone()
        };
        let mut outcome = Ok(());
        for (offset, value) in values.into_iter().enumerate() {
            if let Err(err) = constituents[start + offset].set(&owner, value) {
                outcome = Err(err);
                break;
            }
        }
        if let Some(state) = record.borrow_mut().reference.as_mut() {
            state.updating = false;
        }
        outcome?;
        let mut fresh = Vec::with_capacity(constituents.len());
        for constituent in &constituents {
            fresh.push(constituent.get(&owner)?);
        }
        if self.sync_items(fresh) {
            hook.dispatch(&Change::Reset);
            return Ok(true);
        }
        Ok(false)
    }
}

impl PartialEq for ObservableList {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) || *self.inner.items.borrow() == *other.inner.items.borrow()
    }
}

impl fmt::Debug for ObservableList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &*self.inner.items.borrow())
            .field("mode", &self.inner.mode)
            .finish()
    }
}

impl From<Vec<Value>> for ObservableList {
    fn from(items: Vec<Value>) -> Self {
        Self::new(items)
    }
}

/// A property holding an observable sequence.
///
/// Every assignment copies the incoming sequence (a tuple, a list, or a
/// snapshot of another observable list) into a fresh wrapper attached to
/// this (property, entity) pair — entities never share a buffer, and
/// mutating the wrapper in place notifies this property's observers.
pub struct ListProperty {
    base: PropertyBase,
    mode: ListMode,
}

impl ListProperty {
    /// Creates a coarse list descriptor. Each entity receives its own copy
    /// of `default` at link time.
    #[must_use]
    pub fn new(default: Vec<Value>) -> Self {
        Self {
            base: PropertyBase::new(Value::Tuple(default)),
            mode: ListMode::Coarse,
        }
    }

    /// Selects the notification mode for the wrappers this property creates.
    #[must_use]
    pub fn mode(mut self, mode: ListMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Property for ListProperty {
    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn convert(&self, owner: &Owner, value: Value) -> Result<Value> {
        let items = match value {
            Value::Tuple(items) => items,
            Value::List(list) => list.to_vec(),
            other => return Ok(other),
        };
        let list = ObservableList::with_mode(items, self.mode);
        list.attach(Hook::new(&self.record(owner)?, owner));
        Ok(Value::List(list))
    }

    fn check(&self, _owner: &Owner, value: &Value) -> Result<bool> {
        if self.base.check_none(value)? {
            return Ok(true);
        }
        match value {
            Value::List(list) if list.mode() == self.mode => Ok(false),
            other => Err(shape_error(self.name(), "a list", other)),
        }
    }
}

impl_property_config!(ListProperty);

impl fmt::Debug for ListProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListProperty")
            .field("base", &self.base)
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{changes, counter, new_owner};
    use alloc::vec;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    fn linked(owner: &Owner, mode: ListMode, default: &[i64]) -> (ListProperty, ObservableList) {
        let prop = ListProperty::new(ints(default)).mode(mode);
        prop.link(owner, "items").unwrap();
        let Value::List(list) = prop.get(owner).unwrap() else {
            panic!("list property must store a wrapped list");
        };
        (prop, list)
    }

    #[test]
    fn link_wraps_the_default() {
        let owner = new_owner();
        let (_, list) = linked(&owner, ListMode::Coarse, &[1, 2]);
        assert_eq!(list.to_vec(), ints(&[1, 2]));
        assert_eq!(list.mode(), ListMode::Coarse);
    }

    #[test]
    fn entities_do_not_share_the_default_buffer() {
        let prop = Rc::new(ListProperty::new(ints(&[1])));
        let a = new_owner();
        let b = new_owner();
        prop.link(&a, "items").unwrap();
        prop.link(&b, "items").unwrap();

        let Value::List(list_a) = prop.get(&a).unwrap() else {
            panic!("wrapped list expected");
        };
        list_a.append(Value::Int(2)).unwrap();

        let Value::List(list_b) = prop.get(&b).unwrap() else {
            panic!("wrapped list expected");
        };
        assert_eq!(list_b.to_vec(), ints(&[1]));
    }

    #[test]
    fn assignment_rewraps_and_suppresses_equal_contents() {
        let owner = new_owner();
        let (prop, _) = linked(&owner, ListMode::Coarse, &[1]);

        let (observer, count) = counter();
        prop.bind(&owner, observer).unwrap();

        assert!(prop.set(&owner, Value::Tuple(ints(&[2, 3]))).unwrap());
        assert_eq!(count.get(), 1);
        // Equal contents, fresh allocation: suppressed.
        assert!(!prop.set(&owner, Value::Tuple(ints(&[2, 3]))).unwrap());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn non_sequence_assignment_is_rejected() {
        let owner = new_owner();
        let (prop, _) = linked(&owner, ListMode::Coarse, &[]);
        assert!(prop.set(&owner, Value::Int(3)).unwrap_err().is_invalid_value());
    }

    #[test]
    fn coarse_mutations_dispatch_reset() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Coarse, &[1, 2, 3]);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        list.append(Value::Int(4)).unwrap();
        list.set_item(0, Value::Int(9)).unwrap();
        list.del_item(1).unwrap();
        assert_eq!(list.to_vec(), ints(&[9, 3, 4]));

        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|change| matches!(change, Change::Reset)));
    }

    #[test]
    fn granular_mutations_carry_operation_spans() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Granular, &[]);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        list.append(Value::Int(10)).unwrap();
        list.extend(ints(&[20, 30])).unwrap();
        list.insert(1, Value::Int(15)).unwrap();
        list.set_item(0, Value::Int(5)).unwrap();
        assert_eq!(list.to_vec(), ints(&[5, 15, 20, 30]));

        let log = log.borrow();
        let spans: Vec<_> = log
            .iter()
            .map(|change| {
                let info = change.list_op().expect("granular change");
                (info.op, info.start, info.end)
            })
            .collect();
        assert_eq!(
            spans,
            vec![
                (ListOp::Append, 0, 0),
                (ListOp::Extend, 1, 2),
                (ListOp::Insert, 1, 1),
                (ListOp::SetItem, 0, 0),
            ]
        );
    }

    #[test]
    fn granular_extend_from_empty_spans_new_elements() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Granular, &[]);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        list.extend(ints(&[7, 8])).unwrap();
        let log = log.borrow();
        let info = log[0].list_op().unwrap();
        assert_eq!((info.op, info.start, info.end), (ListOp::Extend, 0, 1));
    }

    #[test]
    fn granular_noop_calls_stay_silent() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Granular, &[1, 2]);

        let (observer, count) = counter();
        prop.bind(&owner, observer).unwrap();

        list.extend(vec![]).unwrap();
        list.inplace_repeat(1).unwrap();
        assert!(!list.remove(&Value::Int(99)).unwrap());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn coarse_reports_every_completed_call() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Coarse, &[1]);

        let (observer, count) = counter();
        prop.bind(&owner, observer).unwrap();

        list.extend(vec![]).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn inplace_repeat_spans() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Granular, &[1, 2]);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        list.inplace_repeat(3).unwrap();
        assert_eq!(list.len(), 6);
        list.inplace_repeat(0).unwrap();
        assert!(list.is_empty());

        let log = log.borrow();
        let info = log[0].list_op().unwrap();
        assert_eq!((info.op, info.start, info.end), (ListOp::IMul, 0, 5));
        let info = log[1].list_op().unwrap();
        assert_eq!((info.op, info.start, info.end), (ListOp::IMul, 0, 5));
    }

    #[test]
    fn sort_notifies_before_and_after() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Granular, &[3, 1, 2]);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        list.sort().unwrap();
        assert_eq!(list.to_vec(), ints(&[1, 2, 3]));

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        let first = log[0].list_op().unwrap();
        assert_eq!((first.op, first.start, first.end), (ListOp::SortStart, 0, 2));
        let second = log[1].list_op().unwrap();
        assert_eq!((second.op, second.start, second.end), (ListOp::Sort, 0, 2));
    }

    #[test]
    fn sort_descending_and_reverse() {
        let owner = new_owner();
        let (_, list) = linked(&owner, ListMode::Coarse, &[1, 3, 2]);
        list.sort_descending().unwrap();
        assert_eq!(list.to_vec(), ints(&[3, 2, 1]));
        list.reverse().unwrap();
        assert_eq!(list.to_vec(), ints(&[1, 2, 3]));
    }

    #[test]
    fn batch_delete_notifies_once() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Granular, &[10, 20, 30, 40, 50]);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        list.batch_delete(vec![4, 1, 2]).unwrap();
        assert_eq!(list.to_vec(), ints(&[10, 40]));

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        let info = log[0].list_op().unwrap();
        assert_eq!((info.op, info.start, info.end), (ListOp::BatchDelete, 1, 4));
    }

    #[test]
    fn slice_operations() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Granular, &[1, 2, 3, 4]);

        let (observer, log) = changes();
        prop.bind(&owner, observer).unwrap();

        list.set_slice(1, 3, ints(&[9])).unwrap();
        assert_eq!(list.to_vec(), ints(&[1, 9, 4]));
        list.del_slice(0, 2).unwrap();
        assert_eq!(list.to_vec(), ints(&[4]));

        let log = log.borrow();
        let info = log[0].list_op().unwrap();
        assert_eq!((info.op, info.start, info.end), (ListOp::SetSlice, 1, 2));
        let info = log[1].list_op().unwrap();
        assert_eq!((info.op, info.start, info.end), (ListOp::DelSlice, 0, 1));
    }

    #[test]
    fn pop_and_out_of_range_errors() {
        let owner = new_owner();
        let (_, list) = linked(&owner, ListMode::Coarse, &[1, 2]);

        assert_eq!(list.pop().unwrap(), Value::Int(2));
        assert_eq!(list.pop_at(0).unwrap(), Value::Int(1));
        assert!(matches!(list.pop(), Err(PropertyError::EmptyCollection)));
        assert!(matches!(
            list.set_item(0, Value::Int(1)),
            Err(PropertyError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn detached_list_mutations_do_not_panic() {
        let list = ObservableList::new(ints(&[1]));
        list.append(Value::Int(2)).unwrap();
        assert_eq!(list.to_vec(), ints(&[1, 2]));
    }

    #[test]
    fn mutation_after_entity_drop_is_silent() {
        let owner = new_owner();
        let (prop, list) = linked(&owner, ListMode::Coarse, &[1]);
        let (observer, count) = counter();
        prop.bind(&owner, observer).unwrap();

        drop(prop);
        drop(owner);
        list.append(Value::Int(2)).unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(list.to_vec(), ints(&[1, 2]));
    }
}
