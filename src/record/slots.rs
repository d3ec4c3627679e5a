//! Per-call scratch state and construction callbacks
//!
//! A [`SlotTable`] is created fresh for every decode call and discarded
//! when the call returns: one slot per property holding the
//! last-decoded value (or nothing), plus one presence flag per property
//! recording whether the property's key was observed at all. The flag
//! only ever changes the outcome for properties that differentiate
//! absent from null, but it is maintained unconditionally since doing
//! so is cheaper than asking.
//!
//! A [`RecordShape`] carries the target type's construction knowledge
//! into the reconciliation step as three callbacks, one per phase.
//! Generated code supplies them; the decode algorithm decides *which*
//! slots each phase may observe (see [`RecordAdapter`]) and the
//! callbacks merely move values from slots into the target type.
//!
//! [`RecordAdapter`]: crate::record::RecordAdapter

use std::any::Any;

use crate::error::{DecodeResult, InternalError};

/// Call-local decode scratch state: value slots plus presence flags.
///
/// Slot values are type-erased; the construction callbacks recover them
/// with [`take`](SlotTable::take) / [`take_required`](SlotTable::take_required),
/// which report a mismatch between the schema and the callback's
/// expectations as an [`InternalError`] rather than panicking.
pub struct SlotTable {
    slots: Vec<Option<Box<dyn Any + Send>>>,
    present: Vec<bool>,
}

impl SlotTable {
    pub(crate) fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self {
            slots,
            present: vec![false; len],
        }
    }

    /// Number of slots (always the schema's property count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` for a table over an empty schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` when slot `index` holds a decoded value.
    ///
    /// For a nullable property an explicit null *is* a decoded value
    /// (the slot holds a real `None`), so this is distinct from the
    /// presence flag only in pathological schemas.
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Returns `true` when the property's key was observed in the
    /// input, regardless of the decoded value.
    #[must_use]
    pub fn was_present(&self, index: usize) -> bool {
        self.present.get(index).copied().unwrap_or(false)
    }

    /// Removes and returns the value of slot `index`, if one was
    /// decoded (and not cleared by the phase gating).
    ///
    /// # Errors
    ///
    /// Fails with an [`InternalError`] if `index` is out of range or
    /// the slot holds a value of a type other than `F` — both indicate
    /// that the construction callbacks disagree with the schema they
    /// were generated against.
    pub fn take<F: Any>(&mut self, index: usize, property: &'static str) -> DecodeResult<Option<F>> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(InternalError::SlotIndexOutOfRange { index, len })?;
        match slot.take() {
            None => Ok(None),
            Some(value) => match value.downcast::<F>() {
                Ok(value) => Ok(Some(*value)),
                Err(_) => Err(InternalError::SlotTypeMismatch {
                    property,
                    expected: std::any::type_name::<F>(),
                }
                .into()),
            },
        }
    }

    /// Removes and returns the value of slot `index`, which must be
    /// filled.
    ///
    /// Intended for required constructor parameters: the decode
    /// algorithm has already rejected the input if a required slot is
    /// empty, so an empty slot here is an [`InternalError`], not a
    /// missing-property condition.
    pub fn take_required<F: Any>(
        &mut self,
        index: usize,
        property: &'static str,
    ) -> DecodeResult<F> {
        self.take::<F>(index, property)?
            .ok_or_else(|| InternalError::EmptyRequiredSlot { property }.into())
    }

    pub(crate) fn store(&mut self, index: usize, value: Box<dyn Any + Send>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(value);
        }
        if let Some(flag) = self.present.get_mut(index) {
            *flag = true;
        }
    }

    pub(crate) fn clear(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
    }
}

type ConstructFn<T> = Box<dyn Fn(&mut SlotTable) -> DecodeResult<T> + Send + Sync>;
type ReconstructFn<T> = Box<dyn Fn(T, &mut SlotTable) -> DecodeResult<T> + Send + Sync>;
type AssignFn<T> = Box<dyn Fn(&mut T, &mut SlotTable) -> DecodeResult<()> + Send + Sync>;

/// The target type's construction knowledge, one callback per
/// reconciliation phase.
///
/// * `construct` (required) invokes the type's constructor, pulling
///   every required constructor parameter out of the slot table and
///   letting the type's own defaults apply to everything it does not
///   pull.
/// * `reconstruct` (phase 2) rebuilds the phase-1 value **once** with
///   every defaulted constructor parameter whose slot survived the
///   presence gating — a single logical update, as demanded for
///   immutable target types. No validation happens here: every value
///   involved is already known-good.
/// * `assign` (phase 3) writes surviving non-constructor slots onto
///   the value by plain mutation.
///
/// The latter two are optional at the type level but demanded by
/// schema validation whenever the schema contains properties of the
/// corresponding class.
pub struct RecordShape<T> {
    construct: ConstructFn<T>,
    reconstruct: Option<ReconstructFn<T>>,
    assign: Option<AssignFn<T>>,
}

impl<T> RecordShape<T> {
    /// Constructs a shape from the phase-1 constructor callback.
    pub fn new(
        construct: impl Fn(&mut SlotTable) -> DecodeResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            construct: Box::new(construct),
            reconstruct: None,
            assign: None,
        }
    }

    /// Attaches the phase-2 reconstruction callback.
    #[must_use]
    pub fn with_reconstruct(
        mut self,
        reconstruct: impl Fn(T, &mut SlotTable) -> DecodeResult<T> + Send + Sync + 'static,
    ) -> Self {
        self.reconstruct = Some(Box::new(reconstruct));
        self
    }

    /// Attaches the phase-3 assignment callback.
    #[must_use]
    pub fn with_assign(
        mut self,
        assign: impl Fn(&mut T, &mut SlotTable) -> DecodeResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.assign = Some(Box::new(assign));
        self
    }

    pub(crate) fn construct(&self, slots: &mut SlotTable) -> DecodeResult<T> {
        (self.construct)(slots)
    }

    pub(crate) fn reconstruct(&self, value: T, slots: &mut SlotTable) -> DecodeResult<T> {
        match &self.reconstruct {
            Some(reconstruct) => reconstruct(value, slots),
            None => Ok(value),
        }
    }

    pub(crate) fn assign(&self, value: &mut T, slots: &mut SlotTable) -> DecodeResult<()> {
        match &self.assign {
            Some(assign) => assign(value, slots),
            None => Ok(()),
        }
    }

    pub(crate) fn has_reconstruct(&self) -> bool {
        self.reconstruct.is_some()
    }

    pub(crate) fn has_assign(&self) -> bool {
        self.assign.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn unset_slots_take_as_none() {
        let mut slots = SlotTable::new(2);
        assert!(!slots.is_set(0));
        assert!(!slots.was_present(0));
        assert_eq!(slots.take::<String>(0, "a").unwrap(), None);
    }

    #[test]
    fn stored_values_come_back_typed() {
        let mut slots = SlotTable::new(2);
        slots.store(1, Box::new(7i64));
        assert!(slots.is_set(1));
        assert!(slots.was_present(1));
        assert_eq!(slots.take::<i64>(1, "n").unwrap(), Some(7));
        // Taking consumes.
        assert_eq!(slots.take::<i64>(1, "n").unwrap(), None);
        assert!(slots.was_present(1));
    }

    #[test]
    fn type_mismatch_is_an_internal_error() {
        let mut slots = SlotTable::new(1);
        slots.store(0, Box::new(7i64));
        match slots.take::<String>(0, "n") {
            Err(DecodeError::Internal(_)) => {}
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[test]
    fn clear_resets_value_but_not_presence() {
        let mut slots = SlotTable::new(1);
        slots.store(0, Box::new(true));
        slots.clear(0);
        assert!(!slots.is_set(0));
        assert!(slots.was_present(0));
    }

    #[test]
    fn take_required_on_empty_slot_is_an_internal_error() {
        let mut slots = SlotTable::new(1);
        match slots.take_required::<bool>(0, "flag") {
            Err(DecodeError::Internal(_)) => {}
            other => panic!("expected internal error, got {:?}", other),
        }
    }
}
