//! fieldmap core library.
//!
//! Copies values between two independently defined record types, a *local*
//! type owned by the caller and a *foreign* type such as an API payload, by
//! following per-field path annotations instead of hand-written copy code.
//!
//! ```text
//! #[derive(Clone, Default, Record)]
//! struct Machine {
//!     #[fieldmap("metadata.name")]
//!     name: String,
//!     #[fieldmap("+,types<ApiObject:metadata.flag|Secondary:config_flag>")]
//!     flag: bool,
//! }
//!
//! fieldmap::decode(&api_object, &mut machine)?;   // foreign -> local
//! fieldmap::encode(&machine, &mut api_object)?;   // local -> foreign
//! ```
//!
//! The plan derived for a (local, foreign) type pair is memoized in a
//! [`MappingCache`], so repeated transfers skip the analysis.

extern crate self as fieldmap;

pub mod annotation;
pub mod cache;
mod copy;
pub mod errors;
pub mod mapper;
pub mod representation;
pub mod target;
pub mod types;

pub use annotation::{FieldAnnotation, FieldPath, PathSegment, TypeMatchRule};
pub use cache::{CacheStats, MappingCache};
pub use errors::*;
pub use fieldmap_macros::Record;
pub use mapper::{Mapper, decode, encode, global, precompute, reset_cache};
pub use representation::{FieldBinding, MappingRepresentation, SourceFieldMapping};
pub use target::TargetFieldDescriptor;
pub use types::{
    Collection, FieldDef, FieldKind, Pointer, Record, RecordDef, ReflectMut, ReflectRef, Shape, TypeDef, Value,
    assign_cloned,
};
