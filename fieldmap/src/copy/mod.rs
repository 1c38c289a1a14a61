//! Value transfer along a built [`MappingRepresentation`](crate::MappingRepresentation).
//!
//! Only ever the first element of a collection takes part in a transfer.
//! Reads treat empty collections and absent pointers as "nothing here";
//! writes allocate them.

mod decode;
mod encode;

pub(crate) use decode::decode_record;
pub(crate) use encode::encode_record;

use crate::errors::MapError;
use crate::types::{Record, ReflectMut, ReflectRef, TypeDef, Value};

/// Record behind `value`, following present pointers only.
pub(crate) fn present_record(value: &dyn Value) -> Option<&dyn Record> {
    match value.reflect_ref() {
        ReflectRef::Record(record) => Some(record),
        ReflectRef::Pointer(pointer) => pointer.pointee().and_then(present_record),
        _ => None,
    }
}

pub(crate) fn present_record_mut(value: &mut dyn Value) -> Option<&mut dyn Record> {
    match value.reflect_mut() {
        ReflectMut::Record(record) => Some(record),
        ReflectMut::Pointer(pointer) => {
            if pointer.pointee().is_none() {
                return None;
            }
            present_record_mut(pointer.pointee_or_alloc())
        }
        _ => None,
    }
}

/// Record behind `value`, following present pointers and the first element of
/// a collection.
pub(crate) fn step_into_record(value: &dyn Value) -> Option<&dyn Record> {
    match value.reflect_ref() {
        ReflectRef::Record(record) => Some(record),
        ReflectRef::Pointer(pointer) => pointer.pointee().and_then(step_into_record),
        ReflectRef::Collection(collection) => collection.first().and_then(step_into_record),
        ReflectRef::Scalar(_) | ReflectRef::Map(_) => None,
    }
}

/// Writable record behind `value`, allocating absent pointers and a first
/// element for empty collections on the way.
pub(crate) fn record_for_write(value: &mut dyn Value) -> Option<&mut dyn Record> {
    match value.reflect_mut() {
        ReflectMut::Record(record) => Some(record),
        ReflectMut::Pointer(pointer) => record_for_write(pointer.pointee_or_alloc()),
        ReflectMut::Collection(collection) => record_for_write(collection.first_or_alloc()),
        ReflectMut::Scalar(_) | ReflectMut::Map(_) => None,
    }
}

/// Copies `source` into `slot`.
///
/// Same-typed values are cloned over. Otherwise a present source pointer is
/// unwrapped, and a destination pointer is allocated when its pointee has
/// the source's type. Returns false when the types cannot be reconciled, in
/// which case `slot` is untouched.
pub(crate) fn assign_value(slot: &mut dyn Value, source: &dyn Value) -> bool {
    if slot.assign(source) {
        return true;
    }
    if let ReflectRef::Pointer(pointer) = source.reflect_ref()
        && let Some(inner) = pointer.pointee()
    {
        return assign_value(slot, inner);
    }
    if !same_underlying(slot.value_type_def(), source.value_type_def()) {
        return false;
    }
    match slot.reflect_mut() {
        ReflectMut::Pointer(pointer) => assign_value(pointer.pointee_or_alloc(), source),
        _ => false,
    }
}

fn same_underlying(slot: TypeDef, source: TypeDef) -> bool {
    slot.deref_pointers() == source.deref_pointers()
}

pub(crate) fn missing_field(record: &dyn Record, index: usize) -> MapError {
    MapError::internal(format!(
        "record `{}` has no field at position {index}",
        record.value_type_def().type_name()
    ))
}
