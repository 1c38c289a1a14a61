//! Public transfer entry points and the process-wide default mapper.

use std::sync::{Arc, OnceLock};

use crate::cache::MappingCache;
use crate::copy::{decode_record, encode_record, present_record, present_record_mut};
use crate::errors::{MapError, MapResult};
use crate::representation::{MappingRepresentation, introspect};
use crate::types::{TypeDef, Value};

/// Entry point for transfers between local and foreign records.
///
/// A mapper owns, or shares, the [`MappingCache`] its representations are
/// memoized in. Cloning a mapper shares the cache.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    cache: Arc<MappingCache>,
}

impl Mapper {
    /// Mapper with a private cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: Arc<MappingCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<MappingCache> {
        &self.cache
    }

    /// Copies the mapped fields of the foreign `source` into the local
    /// `destination`.
    ///
    /// Both sides must be a record or a present pointer to one. Zero and
    /// absent foreign values leave the destination as it was.
    pub fn decode(&self, source: &dyn Value, destination: &mut dyn Value) -> MapResult<()> {
        let foreign = present_record(source).ok_or_else(|| MapError::SourceShape {
            found: source.value_type_def().type_name(),
        })?;
        let found = destination.value_type_def().type_name();
        let local = present_record_mut(destination).ok_or(MapError::DestinationShape { found })?;

        let representation = self
            .introspect(local.value_type_def(), foreign.value_type_def())
            .map_err(|err| match err {
                MapError::LocalNotRecord { found } => MapError::DestinationShape { found },
                MapError::ForeignNotRecord { found } => MapError::SourceShape { found },
                other => other,
            })?;
        decode_record(&representation, foreign, local)
    }

    /// Copies the mapped fields of the local `source` into the foreign
    /// `destination`, allocating foreign pointers and collection elements on
    /// the way.
    pub fn encode(&self, source: &dyn Value, destination: &mut dyn Value) -> MapResult<()> {
        let local = present_record(source).ok_or_else(|| MapError::SourceShape {
            found: source.value_type_def().type_name(),
        })?;
        let found = destination.value_type_def().type_name();
        let foreign = present_record_mut(destination).ok_or(MapError::DestinationShape { found })?;

        let representation = self
            .introspect(local.value_type_def(), foreign.value_type_def())
            .map_err(|err| match err {
                MapError::LocalNotRecord { found } => MapError::SourceShape { found },
                MapError::ForeignNotRecord { found } => MapError::DestinationShape { found },
                other => other,
            })?;
        encode_record(&representation, local, foreign)
    }

    /// Builds the representation of `L` against `F` without copying anything.
    pub fn precompute<L: Value, F: Value>(&self) -> MapResult<Arc<MappingRepresentation>> {
        self.introspect(L::type_def(), F::type_def())
    }

    pub fn introspect(&self, local: TypeDef, foreign: TypeDef) -> MapResult<Arc<MappingRepresentation>> {
        introspect(&self.cache, local, foreign)
    }

    pub fn reset_cache(&self) {
        self.cache.clear();
    }
}

static GLOBAL: OnceLock<Mapper> = OnceLock::new();

/// Process-wide mapper backing the free functions.
pub fn global() -> &'static Mapper {
    GLOBAL.get_or_init(Mapper::new)
}

/// [`Mapper::decode`] on the [`global`] mapper.
pub fn decode(source: &dyn Value, destination: &mut dyn Value) -> MapResult<()> {
    global().decode(source, destination)
}

/// [`Mapper::encode`] on the [`global`] mapper.
pub fn encode(source: &dyn Value, destination: &mut dyn Value) -> MapResult<()> {
    global().encode(source, destination)
}

pub fn precompute<L: Value, F: Value>() -> MapResult<Arc<MappingRepresentation>> {
    global().precompute::<L, F>()
}

pub fn reset_cache() {
    global().reset_cache();
}
