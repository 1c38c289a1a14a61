//! Resolution of annotation paths against a foreign record layout.

use std::sync::Arc;

use serde::Serialize;

use crate::annotation::FieldPath;
use crate::cache::{MappingCache, TargetKey};
use crate::errors::{MapError, MapResult};
use crate::types::{FieldKind, RecordDef, TypeDef};

/// Resolved location of a field inside a foreign root type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFieldDescriptor {
    pub foreign_root: &'static str,
    /// Field names from the foreign root down to the target field.
    pub path: Vec<&'static str>,
    /// Positional indices matching `path`, used to walk live instances.
    pub index_path: Vec<usize>,
    /// Kind of the target field's declared type.
    pub kind: FieldKind,
    /// Declared type with one collection or map level and pointers stripped.
    pub element: TypeDef,
}

/// Resolves `path` on the `foreign` record type for the local `field`.
///
/// Descriptors are memoized in `cache` under (foreign type, field, path).
pub fn resolve_target(
    cache: &MappingCache,
    foreign: TypeDef,
    field: &'static str,
    path: &FieldPath,
) -> MapResult<Arc<TargetFieldDescriptor>> {
    if path.is_empty() {
        return Err(MapError::EmptyPath { field });
    }
    let key = TargetKey::new(foreign.type_id(), field, path.to_string());
    if let Some(found) = cache.target(&key) {
        return Ok(found);
    }

    let Some(root) = foreign.record_def() else {
        return Err(MapError::ForeignNotRecord {
            found: foreign.type_name(),
        });
    };
    let mut walk = Walk {
        root,
        path,
        symbols: Vec::with_capacity(path.len()),
        indices: Vec::with_capacity(path.len()),
    };
    let descriptor = walk.descend(root, 0)?;
    Ok(cache.store_target(key, descriptor))
}

struct Walk<'p> {
    root: &'static RecordDef,
    path: &'p FieldPath,
    symbols: Vec<&'static str>,
    indices: Vec<usize>,
}

impl Walk<'_> {
    fn descend(&mut self, current: &'static RecordDef, depth: usize) -> MapResult<TargetFieldDescriptor> {
        let segment = &self.path.segments()[depth];
        let Some((index, field)) = current.position(segment.name()) else {
            return Err(self.missing());
        };
        self.symbols.push(field.name());
        self.indices.push(index);

        let declared = field.type_def();
        let element = declared.element();
        if depth + 1 == self.path.len() {
            return Ok(TargetFieldDescriptor {
                foreign_root: self.root.name(),
                path: std::mem::take(&mut self.symbols),
                index_path: std::mem::take(&mut self.indices),
                kind: declared.kind(),
                element,
            });
        }

        // Maps are opaque leaves, so only pointers and collections lead on.
        match declared.indirect_record().and_then(|record| record.record_def()) {
            Some(next) => self.descend(next, depth + 1),
            None => Err(self.missing()),
        }
    }

    fn missing(&self) -> MapError {
        MapError::ForeignFieldMissing {
            foreign: self.root.name(),
            path: self.path.to_string(),
        }
    }
}
