use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by introspection and transfers.
///
/// Every variant is terminal: the first error aborts the transfer and the
/// destination keeps whatever was written before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Destination is not a record or a present pointer to one.
    #[error("destination must be a record or a present pointer to a record, found `{found}`")]
    DestinationShape { found: &'static str },

    /// Source is an absent pointer, or not a record once dereferenced.
    #[error("source must be a record or a present pointer to a record, found `{found}`")]
    SourceShape { found: &'static str },

    /// Local side of an introspection is not a record type.
    #[error("local type must be a record or a pointer to a record, found `{found}`")]
    LocalNotRecord { found: &'static str },

    /// Foreign side of an introspection is not a record type.
    #[error("foreign type must be a record or a pointer to a record, found `{found}`")]
    ForeignNotRecord { found: &'static str },

    /// No field of the local type survived annotation filtering.
    #[error("could not find any mapped field on `{local}` for `{foreign}`")]
    NoMappedFields { local: &'static str, foreign: &'static str },

    /// A path segment does not name a field of the foreign type at that depth.
    #[error("field not found in path `{path}` on `{foreign}`")]
    ForeignFieldMissing { foreign: &'static str, path: String },

    /// A leaf field and its foreign counterpart hold different types.
    #[error("field type mismatch on `{field}`: `{foreign}` is not `{local}`")]
    TypeMismatch {
        field: &'static str,
        local: &'static str,
        foreign: &'static str,
    },

    /// A per-type override path was declared without the `+` primary path.
    #[error("main path of `{field}` should be '+' when using per-type path matching")]
    InvalidPerTypePath { field: &'static str },

    /// A field resolved to a path with no segments.
    #[error("empty field path on `{field}`")]
    EmptyPath { field: &'static str },

    /// A record reaches itself again while its mapping is being built.
    #[error("record `{record}` maps into itself")]
    RecursiveRecord { record: &'static str },

    /// Inconsistency between a built plan and the live values it walks.
    #[error("{message}")]
    Internal { message: Cow<'static, str> },
}

/// Class of a [`MapError`], for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DestinationShape,
    SourceShape,
    LocalNotRecord,
    ForeignNotRecord,
    NoMappedFields,
    ForeignFieldMissing,
    TypeMismatch,
    InvalidPerTypePath,
    EmptyPath,
    RecursiveRecord,
    Internal,
}

impl MapError {
    /// Class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::DestinationShape { .. } => ErrorKind::DestinationShape,
            MapError::SourceShape { .. } => ErrorKind::SourceShape,
            MapError::LocalNotRecord { .. } => ErrorKind::LocalNotRecord,
            MapError::ForeignNotRecord { .. } => ErrorKind::ForeignNotRecord,
            MapError::NoMappedFields { .. } => ErrorKind::NoMappedFields,
            MapError::ForeignFieldMissing { .. } => ErrorKind::ForeignFieldMissing,
            MapError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            MapError::InvalidPerTypePath { .. } => ErrorKind::InvalidPerTypePath,
            MapError::EmptyPath { .. } => ErrorKind::EmptyPath,
            MapError::RecursiveRecord { .. } => ErrorKind::RecursiveRecord,
            MapError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        MapError::Internal {
            message: message.into(),
        }
    }
}

/// Convenience alias for results produced by the mapper.
pub type MapResult<T> = Result<T, MapError>;
