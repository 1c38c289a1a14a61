use tracing::trace;

use super::{assign_value, missing_field, record_for_write, step_into_record};
use crate::errors::{MapError, MapResult};
use crate::representation::{FieldBinding, MappingRepresentation};
use crate::types::{Record, Value};

/// Copies foreign values into `local` following `representation`.
///
/// Absent and zero foreign values are skipped, so whatever `local` already
/// holds for them is kept.
pub(crate) fn decode_record(
    representation: &MappingRepresentation,
    foreign: &dyn Record,
    local: &mut dyn Record,
) -> MapResult<()> {
    for mapping in &representation.fields {
        let local_type = local.value_type_def().type_name();
        let Some(slot) = local.field_mut(mapping.index) else {
            return Err(MapError::internal(format!(
                "record `{local_type}` has no field at position {}",
                mapping.index
            )));
        };

        match &mapping.binding {
            FieldBinding::Branch(nested) => {
                let Some(record) = record_for_write(slot) else {
                    return Err(MapError::internal(format!("field `{}` does not hold a record", mapping.name)));
                };
                decode_record(nested, foreign, record)?;
            }
            FieldBinding::Leaf(target) => {
                let Some(value) = read_foreign(foreign, &target.index_path)? else {
                    trace!(field = mapping.name, "no foreign value to decode");
                    continue;
                };
                if !assign_value(slot, value) {
                    return Err(MapError::TypeMismatch {
                        field: mapping.name,
                        local: slot.value_type_def().type_name(),
                        foreign: value.value_type_def().type_name(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Reads the field at `index_path` from `root`. `None` when a step on the
/// way is absent or the field holds its zero value.
pub(crate) fn read_foreign<'a>(root: &'a dyn Record, index_path: &[usize]) -> MapResult<Option<&'a dyn Value>> {
    let Some((&last, parents)) = index_path.split_last() else {
        return Err(MapError::internal("empty index path"));
    };

    let mut current = root;
    for &index in parents {
        let field = current.field(index).ok_or_else(|| missing_field(current, index))?;
        match step_into_record(field) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    let value = current.field(last).ok_or_else(|| missing_field(current, last))?;
    Ok((!value.is_zero()).then_some(value))
}
