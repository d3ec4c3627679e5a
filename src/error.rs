//! Error types used to report failure in decoding and encoding
//!
//! This module contains a hierarchy of types representing the specific
//! classes of error that may arise during a call to [`Adapter`] methods,
//! or to the methods of the stream traits [`TokenReader`] and
//! [`TokenWriter`] that adapters are driven by.
//!
//! # Layout
//!
//! The primary types are [`DecodeError`] and [`EncodeError`], with the
//! corresponding aliases [`DecodeResult<T>`] and [`EncodeResult<T>`].
//! Two refinement enums are shared between them: [`StructuralError`],
//! for token streams (or writer call sequences) that do not describe a
//! well-formed record, and [`InternalError`], for conditions that
//! indicate an implementation bug rather than bad input.
//!
//! A third top-level type, [`SchemaError`], covers failures during
//! schema construction. These are reported once, when an adapter is
//! built, and can never occur during a decode or encode call.
//!
//! All errors are local to a single decode/encode call: a failed call
//! leaves no shared state behind, and the same adapter may be reused
//! for subsequent calls.
//!
//! [`Adapter`]: crate::adapter::Adapter
//! [`TokenReader`]: crate::stream::TokenReader
//! [`TokenWriter`]: crate::stream::TokenWriter

use std::error::Error;
use std::fmt::{Display, Formatter, Result};

/// Type alias for `Result` with an error type of [`DecodeError`]
///
/// Most [`TokenReader`](crate::stream::TokenReader) methods, as well as
/// [`Adapter::decode`](crate::adapter::Adapter::decode) and the methods
/// of the slot-table scratch state, have a return type of
/// `DecodeResult<T>` for various `T`.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Type alias for `Result` with an error type of [`EncodeError`]
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Enumeration over all errors that may be encountered while decoding
/// a record from a token stream.
#[derive(Debug)]
pub enum DecodeError {
    /// The token stream did not contain a well-formed record.
    Structural(StructuralError),
    /// A non-nullable, non-defaulted property's key never appeared in
    /// the input record.
    ///
    /// Reported after the record's end marker has been consumed, before
    /// the target value is constructed; no partial value is returned.
    MissingRequiredProperty {
        name: &'static str,
        path: String,
    },
    /// A non-nullable property's value was an explicit null.
    ///
    /// Reported at the point of detection; no further keys are read.
    UnexpectedNullValue {
        name: &'static str,
        path: String,
    },
    /// Error class encountered when internal invariants are violated.
    Internal(InternalError),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            DecodeError::Structural(err) => Display::fmt(err, f),
            DecodeError::MissingRequiredProperty { name, path } => {
                write!(f, "required property `{}` is missing at {}", name, path)
            }
            DecodeError::UnexpectedNullValue { name, path } => {
                write!(
                    f,
                    "unexpected null for non-nullable property `{}` at {}",
                    name, path
                )
            }
            DecodeError::Internal(err) => Display::fmt(err, f),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecodeError::Structural(err) => Some(err),
            DecodeError::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StructuralError> for DecodeError {
    fn from(err: StructuralError) -> Self {
        Self::Structural(err)
    }
}

impl From<InternalError> for DecodeError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

/// Enumeration over all errors that may be encountered while encoding
/// a record into a token stream.
#[derive(Debug)]
pub enum EncodeError {
    /// Encode was invoked with no value on an adapter that has not been
    /// made null-tolerant (see [`NullSafe`](crate::adapter::NullSafe)).
    ///
    /// Reported before any output is written; encoding "no value at all"
    /// is the caller's decision, not the encoder's.
    NullTarget {
        type_name: &'static str,
    },
    /// The sequence of writer calls did not describe a well-formed record.
    Structural(StructuralError),
    /// Error class encountered when internal invariants are violated.
    Internal(InternalError),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            EncodeError::NullTarget { type_name } => {
                write!(
                    f,
                    "cannot encode absent value through non-null-tolerant adapter for {}",
                    type_name
                )
            }
            EncodeError::Structural(err) => Display::fmt(err, f),
            EncodeError::Internal(err) => Display::fmt(err, f),
        }
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncodeError::Structural(err) => Some(err),
            EncodeError::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StructuralError> for EncodeError {
    fn from(err: StructuralError) -> Self {
        Self::Structural(err)
    }
}

impl From<InternalError> for EncodeError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

/// Errors related to the shape of the token stream itself
///
/// A `StructuralError` indicates that the stream (or, on the encode
/// side, the sequence of writer calls) did not describe a well-formed
/// record: markers were missing or unbalanced, or a token of one kind
/// appeared where another was demanded.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralError {
    /// A token of kind `found` appeared where a token of kind
    /// `expected` was demanded.
    UnexpectedToken {
        expected: &'static str,
        found: String,
        path: String,
    },
    /// The stream ended while a token of kind `expected` was demanded.
    UnexpectedEnd {
        expected: &'static str,
        path: String,
    },
    /// A writer call was made that is not legal in the writer's current
    /// position, such as `write_key` outside an open record or
    /// `end_record` with no record open.
    MisplacedWrite {
        call: &'static str,
    },
    /// The stream held tokens beyond the end of the decoded record.
    ///
    /// Only reported by entry points that demand full consumption of
    /// their input (see the `check_stream_exhausted` feature).
    TrailingTokens {
        remaining: usize,
    },
}

impl Display for StructuralError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            StructuralError::UnexpectedToken {
                expected,
                found,
                path,
            } => {
                write!(f, "expected {} but found {} at {}", expected, found, path)
            }
            StructuralError::UnexpectedEnd { expected, path } => {
                write!(
                    f,
                    "expected {} but token stream was exhausted at {}",
                    expected, path
                )
            }
            StructuralError::MisplacedWrite { call } => {
                write!(f, "writer call `{}` is not legal in this position", call)
            }
            StructuralError::TrailingTokens { remaining } => {
                write!(
                    f,
                    "{} tokens left in stream after record was fully decoded",
                    remaining
                )
            }
        }
    }
}

impl Error for StructuralError {}

/// Implementation-internal errors
///
/// This error class represents certain 'impossible' cases, which signify
/// an implementation bug either in this crate or in generated code that
/// binds a schema against the wrong Rust types. Such cases do not merely
/// indicate that the input was malformed; they indicate that the schema
/// and the construction callbacks disagree with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalError {
    /// A slot held a value of a different type than the construction
    /// callback attempted to take out of it.
    SlotTypeMismatch {
        property: &'static str,
        expected: &'static str,
    },
    /// A required slot was empty when the constructor ran, despite the
    /// pre-construction check having passed.
    EmptyRequiredSlot {
        property: &'static str,
    },
    /// A slot index outside the schema was accessed by a construction
    /// callback.
    SlotIndexOutOfRange {
        index: usize,
        len: usize,
    },
    /// The shared delegate table's lock was poisoned by a panic in
    /// another thread.
    PoisonedRegistry,
    /// A delegate table entry existed under the queried key but held a
    /// delegate for a different value type.
    RegistryTypeConflict {
        value_type: &'static str,
    },
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            InternalError::SlotTypeMismatch { property, expected } => {
                write!(
                    f,
                    "BUG: slot for property `{}` does not hold a value of type {}",
                    property, expected
                )
            }
            InternalError::EmptyRequiredSlot { property } => {
                write!(
                    f,
                    "BUG: required slot for property `{}` was empty at construction",
                    property
                )
            }
            InternalError::SlotIndexOutOfRange { index, len } => {
                write!(
                    f,
                    "BUG: slot index {} out of range for schema of {} properties",
                    index, len
                )
            }
            InternalError::PoisonedRegistry => {
                write!(f, "BUG: adapter registry lock was poisoned")
            }
            InternalError::RegistryTypeConflict { value_type } => {
                write!(
                    f,
                    "BUG: registry entry does not hold an adapter for {}",
                    value_type
                )
            }
        }
    }
}

impl Error for InternalError {}

/// Errors reported while building a record schema
///
/// Schema construction happens once, before any decode or encode call;
/// none of these conditions can arise at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two properties in one schema declared the same wire key.
    DuplicateWireKey {
        key: &'static str,
    },
    /// The schema contains defaulted constructor-parameter properties
    /// but the shape supplies no reconstruction callback for them.
    MissingReconstructor {
        property: &'static str,
    },
    /// The schema contains non-constructor properties but the shape
    /// supplies no assignment callback for them.
    MissingAssigner {
        property: &'static str,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            SchemaError::DuplicateWireKey { key } => {
                write!(f, "duplicate wire key `{}` in record schema", key)
            }
            SchemaError::MissingReconstructor { property } => {
                write!(
                    f,
                    "property `{}` is a defaulted constructor parameter but the shape has no reconstruct callback",
                    property
                )
            }
            SchemaError::MissingAssigner { property } => {
                write!(
                    f,
                    "property `{}` is set outside the constructor but the shape has no assign callback",
                    property
                )
            }
        }
    }
}

impl Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_includes_name_and_path() {
        let err = DecodeError::MissingRequiredProperty {
            name: "name",
            path: "$".to_owned(),
        };
        assert_eq!(err.to_string(), "required property `name` is missing at $");

        let err = DecodeError::UnexpectedNullValue {
            name: "name",
            path: "$.name".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected null for non-nullable property `name` at $.name"
        );
    }

    #[test]
    fn structural_error_sources_through_decode_error() {
        let err = DecodeError::from(StructuralError::UnexpectedEnd {
            expected: "record start",
            path: "$".to_owned(),
        });
        assert!(err.source().is_some());
    }
}
