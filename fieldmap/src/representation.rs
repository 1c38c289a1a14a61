//! Mapping representations and the introspector that builds them.
//!
//! A [`MappingRepresentation`] is the plan for one local record type against
//! one foreign root type: which local fields take part, and for each either
//! the nested plan of a record-valued field or the resolved location of the
//! foreign counterpart of a leaf field.

use std::any::TypeId;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::annotation::{FieldAnnotation, FieldPath};
use crate::cache::{MappingCache, RepresentationKey};
use crate::errors::{MapError, MapResult};
use crate::target::{TargetFieldDescriptor, resolve_target};
use crate::types::{FieldDef, FieldKind, RecordDef, TypeDef};

/// What a mapped local field is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "binding", content = "target", rename_all = "snake_case")]
pub enum FieldBinding {
    /// Record-valued field, copied through its own nested plan.
    Branch(Arc<MappingRepresentation>),
    /// Field copied as a whole to or from one foreign field.
    Leaf(Arc<TargetFieldDescriptor>),
}

/// One local field taking part in a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFieldMapping {
    /// Declaration position of the field on the local record.
    pub index: usize,
    pub name: &'static str,
    pub kind: FieldKind,
    pub annotation: FieldAnnotation,
    pub binding: FieldBinding,
}

impl SourceFieldMapping {
    pub fn is_branch(&self) -> bool {
        matches!(self.binding, FieldBinding::Branch(_))
    }
}

/// Field plan for one local record type against one foreign root type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRepresentation {
    pub local: &'static str,
    pub foreign_root: &'static str,
    pub fields: Vec<SourceFieldMapping>,
}

impl MappingRepresentation {
    pub fn field(&self, name: &str) -> Option<&SourceFieldMapping> {
        self.fields.iter().find(|mapping| mapping.name == name)
    }

    pub fn to_json_pretty(&self) -> MapResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| MapError::internal(format!("failed to serialize mapping representation: {err}")))
    }
}

/// Builds (or fetches) the top-level representation of `local` against
/// `foreign`. Both may be pointer types; they are dereferenced first.
pub fn introspect(cache: &MappingCache, local: TypeDef, foreign: TypeDef) -> MapResult<Arc<MappingRepresentation>> {
    let local = local.deref_pointers();
    let foreign = foreign.deref_pointers();
    let Some(local_def) = local.record_def() else {
        return Err(MapError::LocalNotRecord {
            found: local.type_name(),
        });
    };
    let Some(foreign_def) = foreign.record_def() else {
        return Err(MapError::ForeignNotRecord {
            found: foreign.type_name(),
        });
    };

    let mut introspector = Introspector {
        cache,
        foreign,
        foreign_def,
        visiting: Vec::new(),
    };
    let representation = introspector.describe(local, local_def, String::new(), &FieldPath::default())?;
    if representation.fields.is_empty() {
        return Err(MapError::NoMappedFields {
            local: local_def.name(),
            foreign: foreign_def.name(),
        });
    }
    Ok(representation)
}

struct Introspector<'c> {
    cache: &'c MappingCache,
    foreign: TypeDef,
    foreign_def: &'static RecordDef,
    visiting: Vec<TypeId>,
}

impl Introspector<'_> {
    fn describe(
        &mut self,
        local: TypeDef,
        def: &'static RecordDef,
        context: String,
        parent: &FieldPath,
    ) -> MapResult<Arc<MappingRepresentation>> {
        let key = RepresentationKey::new(local.type_id(), self.foreign.type_id(), context);
        if let Some(cached) = self.cache.representation(&key) {
            return Ok(cached);
        }
        if self.visiting.contains(&local.type_id()) {
            return Err(MapError::RecursiveRecord { record: def.name() });
        }

        self.visiting.push(local.type_id());
        let fields = self.map_fields(def, parent);
        self.visiting.pop();
        let fields = fields?;

        debug!(
            local = def.name(),
            foreign = self.foreign_def.name(),
            fields = fields.len(),
            "built mapping representation"
        );
        let representation = MappingRepresentation {
            local: def.name(),
            foreign_root: self.foreign_def.name(),
            fields,
        };
        Ok(self.cache.store_representation(key, representation))
    }

    fn map_fields(&mut self, def: &'static RecordDef, parent: &FieldPath) -> MapResult<Vec<SourceFieldMapping>> {
        let mut fields = Vec::with_capacity(def.fields().len());
        for (index, field) in def.fields().iter().enumerate() {
            if let Some(mapping) = self.map_field(index, field, parent)? {
                fields.push(mapping);
            }
        }
        Ok(fields)
    }

    fn map_field(
        &mut self,
        index: usize,
        field: &'static FieldDef,
        parent: &FieldPath,
    ) -> MapResult<Option<SourceFieldMapping>> {
        let annotation =
            FieldAnnotation::parse(field.annotation()).resolve_for(self.foreign_def.name(), field.name())?;
        if annotation.is_skipped() {
            return Ok(None);
        }

        let declared = field.type_def();
        let nested = declared.indirect_record();

        // Dismissed fields contribute no segment, so there is nothing to resolve.
        let (effective, target) = if annotation.path().is_dismiss() {
            if nested.is_none() {
                return Err(MapError::internal(format!(
                    "field `{}` dismisses its path but does not hold a record",
                    field.name()
                )));
            }
            (parent.clone(), None)
        } else {
            let effective = parent.joined(annotation.path());
            let target = resolve_target(self.cache, self.foreign, field.name(), &effective)?;
            (effective, Some(target))
        };

        let leaf = match (nested, target) {
            (Some(record), target) => {
                let Some(record_def) = record.record_def() else {
                    return Err(MapError::internal(format!("`{}` is not a record", record.type_name())));
                };
                let context = format!("{}@{}", field.name(), effective);
                let representation = self.describe(record, record_def, context, &effective)?;
                let annotation = annotation.with_target_type(target.map(|target| target.element.type_name()));
                return Ok(Some(SourceFieldMapping {
                    index,
                    name: field.name(),
                    kind: declared.kind(),
                    annotation: annotation.with_path(effective),
                    binding: FieldBinding::Branch(representation),
                }));
            }
            (None, Some(target)) => target,
            (None, None) => {
                return Err(MapError::internal(format!("field `{}` resolved to no target", field.name())));
            }
        };

        let local_element = declared.element();
        if local_element != leaf.element {
            return Err(MapError::TypeMismatch {
                field: field.name(),
                local: local_element.type_name(),
                foreign: leaf.element.type_name(),
            });
        }
        trace!(field = field.name(), path = %effective, "mapped leaf field");

        Ok(Some(SourceFieldMapping {
            index,
            name: field.name(),
            kind: declared.kind(),
            annotation: annotation
                .with_target_type(Some(leaf.element.type_name()))
                .with_path(effective),
            binding: FieldBinding::Leaf(leaf),
        }))
    }
}
