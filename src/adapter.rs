//! Core of the record-transcoding API
//!
//! This module contains the definition of the [`Adapter`] trait, the
//! capability shared by every decoder/encoder in this crate. An adapter
//! is responsible for exactly one value type: it knows how to interpret
//! that type out of a token stream, and how to render a value of it
//! back into one.
//!
//! Adapters compose. The leaf adapters of [`prim`](crate::prim) handle
//! scalar token values, [`NullSafe`] lifts any adapter over `T` to one
//! over `Option<T>`, and [`RecordAdapter`](crate::record::RecordAdapter)
//! — which itself implements `Adapter` — handles whole records, so a
//! record adapter can serve as the delegate for a field whose type is
//! that record. Adapters are selected once, at schema-build time, and
//! held by reference (see [`registry`](crate::registry)); they are
//! never re-resolved during a decode or encode call.
//!
//! While the stream implementations and the record machinery may
//! change, `Adapter` exposes a comparatively stable API: the generated
//! code this runtime exists to support is written directly against it.

use cfg_if::cfg_if;

use crate::error::{DecodeResult, EncodeError, EncodeResult};
use crate::stream::{Token, TokenBuffer, TokenReader, TokenVecReader, TokenWriter};

/// Trait for types that can transcode one value type to and from a
/// key/value token stream.
///
/// Implementations are defined by the two required methods, [`decode`]
/// and [`encode`]; the remaining methods are conveniences layered on
/// top of them. The trait is object-safe, and delegates are typically
/// held as `Arc<dyn Adapter<Value = F>>`.
///
/// # Contract
///
/// * `decode` consumes exactly one value's worth of tokens from the
///   reader — no more, no fewer — or fails without returning a value.
/// * `encode` writes exactly one value's worth of tokens.
/// * Both methods are `&self`: an adapter holds no per-call state, so
///   one instance may serve concurrent calls on independent streams.
///
/// [`decode`]: Adapter::decode
/// [`encode`]: Adapter::encode
pub trait Adapter: Send + Sync {
    /// The value type this adapter transcodes.
    type Value;

    /// Consumes one value from the reader and interprets it.
    ///
    /// # Errors
    ///
    /// In most cases, the errors returned by this method are propagated
    /// from calls made to [`TokenReader`] methods. Composite adapters
    /// additionally mint their own errors for schema-level violations
    /// such as missing required properties.
    fn decode(&self, reader: &mut dyn TokenReader) -> DecodeResult<Self::Value>;

    /// Renders `value` into the writer as one value.
    fn encode(&self, writer: &mut dyn TokenWriter, value: &Self::Value) -> EncodeResult<()>;

    /// Renders an optional value, failing fast when no value is given.
    ///
    /// A bare adapter is not null-tolerant: encoding "no value at all"
    /// is the caller's decision, and an absent value here is reported
    /// as [`EncodeError::NullTarget`] before anything is written. Wrap
    /// the adapter in [`NullSafe`] to make absence encodable as an
    /// explicit null instead.
    fn encode_opt(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&Self::Value>,
    ) -> EncodeResult<()> {
        match value {
            Some(value) => self.encode(writer, value),
            None => Err(EncodeError::NullTarget {
                type_name: std::any::type_name::<Self::Value>(),
            }),
        }
    }

    /// Decodes one value from an in-memory token buffer.
    ///
    /// When the `check_stream_exhausted` feature is enabled, this
    /// method additionally demands that the buffer holds nothing beyond
    /// the decoded value, and reports leftovers as a
    /// [`StructuralError::TrailingTokens`](crate::error::StructuralError).
    fn decode_tokens(&self, tokens: Vec<Token>) -> DecodeResult<Self::Value> {
        let mut reader = TokenVecReader::new(tokens);
        let value = self.decode(&mut reader)?;
        cfg_if! {
            if #[cfg(feature = "check_stream_exhausted")] {
                if reader.remaining() != 0 {
                    return Err(crate::error::StructuralError::TrailingTokens {
                        remaining: reader.remaining(),
                    }
                    .into());
                }
            }
        }
        Ok(value)
    }

    /// Renders one value into a fresh in-memory token buffer.
    fn encode_to_tokens(&self, value: &Self::Value) -> EncodeResult<Vec<Token>> {
        let mut buffer = TokenBuffer::new();
        self.encode(&mut buffer, value)?;
        Ok(buffer.into_tokens())
    }

    /// Wraps this adapter so that explicit nulls decode to `None` and
    /// `None` encodes as an explicit null.
    fn null_safe(self) -> NullSafe<Self>
    where
        Self: Sized,
    {
        NullSafe::new(self)
    }
}

/// Null-tolerant lift of an adapter over `T` to one over `Option<T>`.
///
/// On decode, an explicit null in value position is consumed and
/// interpreted as `None`; anything else is handed to the inner adapter.
/// On encode, `None` is written as an explicit null. This is the form
/// in which the delegate of every nullable property is held: the
/// distinction between "key absent" and "key present with null" is then
/// carried by the slot machinery, not by the delegate.
#[derive(Debug, Clone, Copy)]
pub struct NullSafe<A> {
    inner: A,
}

impl<A> NullSafe<A> {
    /// Wraps `inner` in a null-tolerant shell.
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }

    /// Returns a reference to the wrapped adapter.
    pub const fn as_inner(&self) -> &A {
        &self.inner
    }

    /// Destructs the shell and returns the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: Adapter> Adapter for NullSafe<A> {
    type Value = Option<A::Value>;

    fn decode(&self, reader: &mut dyn TokenReader) -> DecodeResult<Self::Value> {
        if reader.take_null()? {
            Ok(None)
        } else {
            self.inner.decode(reader).map(Some)
        }
    }

    fn encode(&self, writer: &mut dyn TokenWriter, value: &Self::Value) -> EncodeResult<()> {
        match value {
            Some(value) => self.inner.encode(writer, value),
            None => writer.write_null(),
        }
    }
}
