//! Assorted imports covering the surface a generated codec module
//! touches: the stream traits, the schema/binding/shape builders, the
//! leaf adapters, and the error aliases. Intended for wildcard import
//! at the top of generated files so that they stay free of `use`
//! churn when the runtime surface grows.

pub use crate::adapter::{Adapter, NullSafe};
pub use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult, SchemaError};
pub use crate::matcher::KeyMatcher;
pub use crate::prim::{
    BoolAdapter, F64Adapter, I64Adapter, StringAdapter, SHARED_BOOL, SHARED_F64, SHARED_I64,
    SHARED_STRING,
};
pub use crate::record::{RecordAdapter, RecordProperty, RecordShape, SlotTable};
pub use crate::registry::{AdapterRegistry, Qualifiers};
pub use crate::schema::PropertySchema;
pub use crate::stream::{Token, TokenBuffer, TokenReader, TokenVecReader, TokenWriter};
