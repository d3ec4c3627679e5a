//! Token-stream abstraction consumed by adapters
//!
//! This module, along with its submodules, defines the narrow interface
//! through which adapters observe and produce the serialized form of a
//! record: an ordered stream of key/value tokens bracketed by record
//! markers. The tokenizer that produces such a stream from text or
//! binary input, and the writer that renders one back out, are external
//! collaborators; adapters only ever see the [`TokenReader`] and
//! [`TokenWriter`] traits defined here.
//!
//! # Layout
//!
//! The top level of this module defines the two stream traits. Two
//! sub-modules support them:
//!   * `token` defines the [`Token`] alphabet used by the in-memory
//!     reference streams.
//!   * `buffer` defines [`TokenVecReader`] and [`TokenBuffer`], the
//!     in-memory implementations of the reader and writer traits used
//!     by tests, benches, and the convenience entry points on
//!     [`Adapter`](crate::adapter::Adapter).
//!
//! # Model
//!
//! Reading is non-backtracking and zero-lookahead apart from the two
//! single-token peeks ([`TokenReader::has_next`] and
//! [`TokenReader::peek_null`]); a value can only be observed by
//! consuming it, and once consumed cannot be revisited. A reader is
//! positioned *outside* a record until [`begin_record`] is called, then
//! alternates between key position and value position until
//! [`end_record`]. Readers also maintain a human-readable location
//! (`$`, `$.field`, `$.outer.inner`) exposed through
//! [`path`](TokenReader::path), which the decode algorithm embeds in
//! its error values.
//!
//! [`begin_record`]: TokenReader::begin_record
//! [`end_record`]: TokenReader::end_record

pub mod buffer;
pub mod token;

pub use buffer::{TokenBuffer, TokenVecReader};
pub use token::Token;

use crate::error::{DecodeResult, EncodeResult};

/// Stateful pull-reader over one serialized record.
///
/// The decode algorithm drives a `TokenReader` through the sequence
/// `begin_record`, then a loop of `has_next`/`next_key` followed by
/// either a delegate's value reads or `skip_value`, then `end_record`.
/// Delegates use the `take_*` family to consume leaf values.
///
/// All methods that consume a token fail with a
/// [`StructuralError`](crate::error::StructuralError) when the next
/// token is not of the demanded kind, and leave the reader position
/// unspecified afterwards; a failed decode is abandoned, not resumed.
pub trait TokenReader {
    /// Consumes the begin-marker of a record.
    fn begin_record(&mut self) -> DecodeResult<()>;

    /// Consumes the end-marker of a record.
    fn end_record(&mut self) -> DecodeResult<()>;

    /// Returns `true` when the current record has at least one more
    /// key/value pair, without consuming anything.
    fn has_next(&mut self) -> DecodeResult<bool>;

    /// Consumes and returns the next wire key.
    fn next_key(&mut self) -> DecodeResult<String>;

    /// Consumes and discards one whole value, including all tokens of a
    /// nested record. Used for unmatched keys, which are skipped
    /// without invoking any delegate.
    fn skip_value(&mut self) -> DecodeResult<()>;

    /// Returns `true` when the next token is an explicit null, without
    /// consuming it.
    fn peek_null(&mut self) -> DecodeResult<bool>;

    /// Consumes an explicit null if one is next and returns whether it
    /// did so.
    fn take_null(&mut self) -> DecodeResult<bool>;

    /// Consumes a boolean value.
    fn take_bool(&mut self) -> DecodeResult<bool>;

    /// Consumes an integral value.
    fn take_i64(&mut self) -> DecodeResult<i64>;

    /// Consumes a floating-point value.
    fn take_f64(&mut self) -> DecodeResult<f64>;

    /// Consumes a string value.
    fn take_string(&mut self) -> DecodeResult<String>;

    /// Renders the reader's current location as a human-readable path
    /// rooted at `$`, e.g. `$.nickname` while positioned at the value
    /// of the `nickname` key.
    fn path(&self) -> String;
}

/// Stateful push-writer producing one serialized record.
///
/// The encode algorithm drives a `TokenWriter` through `begin_record`,
/// then for each property `write_key` followed by the delegate's value
/// writes, then `end_record`. Implementations are expected to reject
/// call sequences that do not describe a well-formed record with a
/// [`StructuralError`](crate::error::StructuralError).
pub trait TokenWriter {
    /// Writes the begin-marker of a record.
    fn begin_record(&mut self) -> EncodeResult<()>;

    /// Writes the end-marker of a record.
    fn end_record(&mut self) -> EncodeResult<()>;

    /// Writes a wire key; must be followed by exactly one value.
    fn write_key(&mut self, key: &str) -> EncodeResult<()>;

    /// Writes an explicit null value.
    fn write_null(&mut self) -> EncodeResult<()>;

    /// Writes a boolean value.
    fn write_bool(&mut self, value: bool) -> EncodeResult<()>;

    /// Writes an integral value.
    fn write_i64(&mut self, value: i64) -> EncodeResult<()>;

    /// Writes a floating-point value.
    fn write_f64(&mut self, value: f64) -> EncodeResult<()>;

    /// Writes a string value.
    fn write_string(&mut self, value: &str) -> EncodeResult<()>;
}
