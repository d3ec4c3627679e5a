pub mod adapter;
pub mod error;
pub mod matcher;
pub mod prelude;
pub mod prim;
pub mod record;
pub mod registry;
pub mod schema;
pub mod stream;

pub use crate::adapter::{Adapter, NullSafe};
pub use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult, SchemaError};
pub use crate::record::{RecordAdapter, RecordProperty, RecordShape, SlotTable};
pub use crate::registry::{AdapterRegistry, Qualifiers};
pub use crate::schema::PropertySchema;
pub use crate::stream::{Token, TokenBuffer, TokenReader, TokenVecReader, TokenWriter};
