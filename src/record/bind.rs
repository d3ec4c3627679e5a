//! Binding of a property schema to a concrete field of the target type
//!
//! A [`PropertySchema`] alone says nothing about Rust types; the
//! binding layer pairs it with the field's delegate and an accessor
//! into the target type, erasing the field type so that one record
//! adapter can hold bindings for heterogeneously-typed fields. The
//! erased surface is deliberately tiny: decode one value into a slot
//! box, or encode one field out of a borrowed record.

use std::any::Any;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::error::{DecodeResult, EncodeResult};
use crate::schema::PropertySchema;
use crate::stream::{TokenReader, TokenWriter};

/// Type-erased per-field codec: the delegate plus field access, with
/// the field's Rust type hidden behind the slot box.
pub trait PropertyCodec<T>: Send + Sync {
    /// Decodes one value through the field's delegate, boxed for slot
    /// storage.
    fn decode_slot(&self, reader: &mut dyn TokenReader) -> DecodeResult<Box<dyn Any + Send>>;

    /// Encodes the field's current value out of `record` through the
    /// field's delegate.
    fn encode_field(&self, writer: &mut dyn TokenWriter, record: &T) -> EncodeResult<()>;
}

/// The one concrete [`PropertyCodec`]: a shared delegate for the field
/// type `F` and a plain accessor function.
struct Binding<T, F> {
    delegate: Arc<dyn Adapter<Value = F>>,
    get: fn(&T) -> &F,
}

impl<T, F: Send + 'static> PropertyCodec<T> for Binding<T, F> {
    fn decode_slot(&self, reader: &mut dyn TokenReader) -> DecodeResult<Box<dyn Any + Send>> {
        let value = self.delegate.decode(reader)?;
        Ok(Box::new(value))
    }

    fn encode_field(&self, writer: &mut dyn TokenWriter, record: &T) -> EncodeResult<()> {
        self.delegate.encode(writer, (self.get)(record))
    }
}

/// One fully-bound property of a record schema: the structural
/// description plus the erased codec for its field.
pub struct RecordProperty<T> {
    schema: PropertySchema,
    codec: Box<dyn PropertyCodec<T>>,
}

impl<T: 'static> RecordProperty<T> {
    /// Binds `schema` to the field reached by `get`, transcoded through
    /// `delegate`.
    ///
    /// For a nullable property, `F` is an `Option` and `delegate` is
    /// the [`NullSafe`](crate::adapter::NullSafe) form of the base
    /// delegate, so an explicit null decodes into the slot as a real
    /// `None` value.
    pub fn bind<F: Send + 'static>(
        schema: PropertySchema,
        delegate: Arc<dyn Adapter<Value = F>>,
        get: fn(&T) -> &F,
    ) -> Self {
        Self {
            schema,
            codec: Box::new(Binding { delegate, get }),
        }
    }

    /// The structural description of this property.
    #[must_use]
    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub(crate) fn codec(&self) -> &dyn PropertyCodec<T> {
        self.codec.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prim::SHARED_I64;
    use crate::stream::{Token, TokenBuffer, TokenVecReader};

    struct Point {
        x: i64,
    }

    #[test]
    fn binding_decodes_into_slot_box() {
        let prop: RecordProperty<Point> = RecordProperty::bind(
            PropertySchema::new("x", "x").constructor_parameter(),
            SHARED_I64.clone(),
            |p| &p.x,
        );
        let mut reader = TokenVecReader::new(vec![Token::Int(9)]);
        let boxed = prop.codec().decode_slot(&mut reader).unwrap();
        assert_eq!(boxed.downcast::<i64>().map(|b| *b).ok(), Some(9));
    }

    #[test]
    fn binding_encodes_from_record_field() {
        let prop: RecordProperty<Point> = RecordProperty::bind(
            PropertySchema::new("x", "x").constructor_parameter(),
            SHARED_I64.clone(),
            |p| &p.x,
        );
        let mut buffer = TokenBuffer::new();
        prop.codec()
            .encode_field(&mut buffer, &Point { x: 4 })
            .unwrap();
        assert_eq!(buffer.into_tokens(), vec![Token::Int(4)]);
    }
}
