use tracing::trace;

use super::{assign_value, missing_field, record_for_write, step_into_record};
use crate::errors::{MapError, MapResult};
use crate::representation::{FieldBinding, MappingRepresentation, SourceFieldMapping};
use crate::types::{Record, ReflectRef, Value};

/// Copies local values into `foreign` following `representation`, allocating
/// pointers and first collection elements on the foreign side as needed.
pub(crate) fn encode_record(
    representation: &MappingRepresentation,
    local: &dyn Record,
    foreign: &mut dyn Record,
) -> MapResult<()> {
    for mapping in &representation.fields {
        let value = local.field(mapping.index).ok_or_else(|| missing_field(local, mapping.index))?;

        match &mapping.binding {
            FieldBinding::Branch(nested) => {
                let Some(record) = step_into_record(value) else {
                    trace!(field = mapping.name, "nothing to encode below absent record");
                    continue;
                };
                encode_record(nested, record, foreign)?;
            }
            FieldBinding::Leaf(target) => {
                let Some(value) = present_value(value) else {
                    trace!(field = mapping.name, "skipping zero value");
                    continue;
                };
                write_foreign(foreign, &target.index_path, value, mapping)?;
            }
        }
    }
    Ok(())
}

/// Non-zero value to write, with one present pointer level unwrapped.
fn present_value(value: &dyn Value) -> Option<&dyn Value> {
    if value.is_zero() {
        return None;
    }
    match value.reflect_ref() {
        ReflectRef::Pointer(pointer) => pointer.pointee(),
        _ => Some(value),
    }
}

fn write_foreign(
    root: &mut dyn Record,
    index_path: &[usize],
    value: &dyn Value,
    mapping: &SourceFieldMapping,
) -> MapResult<()> {
    let Some((&last, parents)) = index_path.split_last() else {
        return Err(MapError::internal("empty index path"));
    };

    let mut current = root;
    for &index in parents {
        let owner = current.value_type_def().type_name();
        let Some(field) = current.field_mut(index) else {
            return Err(MapError::internal(format!("record `{owner}` has no field at position {index}")));
        };
        let Some(next) = record_for_write(field) else {
            return Err(MapError::internal(format!(
                "step {index} of `{owner}` does not lead to a record"
            )));
        };
        current = next;
    }

    let owner = current.value_type_def().type_name();
    let Some(slot) = current.field_mut(last) else {
        return Err(MapError::internal(format!("record `{owner}` has no field at position {last}")));
    };
    if assign_value(slot, value) {
        return Ok(());
    }
    Err(MapError::TypeMismatch {
        field: mapping.name,
        local: value.value_type_def().type_name(),
        foreign: slot.value_type_def().type_name(),
    })
}
