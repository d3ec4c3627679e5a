//! Leaf adapters for scalar token values
//!
//! Every schema bottoms out in fields whose values are single tokens;
//! the unit structs here are the delegates for those fields. Each one
//! is stateless, so a single shared instance suffices for any number of
//! schemas — the `SHARED_*` statics below are the canonical instances
//! handed to the registry by generated code.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::adapter::Adapter;
use crate::error::{DecodeResult, EncodeResult};
use crate::stream::{TokenReader, TokenWriter};

/// Adapter for string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringAdapter;

impl Adapter for StringAdapter {
    type Value = String;

    fn decode(&self, reader: &mut dyn TokenReader) -> DecodeResult<String> {
        reader.take_string()
    }

    fn encode(&self, writer: &mut dyn TokenWriter, value: &String) -> EncodeResult<()> {
        writer.write_string(value)
    }
}

/// Adapter for integral values.
#[derive(Debug, Clone, Copy, Default)]
pub struct I64Adapter;

impl Adapter for I64Adapter {
    type Value = i64;

    fn decode(&self, reader: &mut dyn TokenReader) -> DecodeResult<i64> {
        reader.take_i64()
    }

    fn encode(&self, writer: &mut dyn TokenWriter, value: &i64) -> EncodeResult<()> {
        writer.write_i64(*value)
    }
}

/// Adapter for floating-point values.
#[derive(Debug, Clone, Copy, Default)]
pub struct F64Adapter;

impl Adapter for F64Adapter {
    type Value = f64;

    fn decode(&self, reader: &mut dyn TokenReader) -> DecodeResult<f64> {
        reader.take_f64()
    }

    fn encode(&self, writer: &mut dyn TokenWriter, value: &f64) -> EncodeResult<()> {
        writer.write_f64(*value)
    }
}

/// Adapter for boolean values.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolAdapter;

impl Adapter for BoolAdapter {
    type Value = bool;

    fn decode(&self, reader: &mut dyn TokenReader) -> DecodeResult<bool> {
        reader.take_bool()
    }

    fn encode(&self, writer: &mut dyn TokenWriter, value: &bool) -> EncodeResult<()> {
        writer.write_bool(*value)
    }
}

lazy_static! {
    /// Canonical shared instance of [`StringAdapter`].
    pub static ref SHARED_STRING: Arc<StringAdapter> = Arc::new(StringAdapter);
    /// Canonical shared instance of [`I64Adapter`].
    pub static ref SHARED_I64: Arc<I64Adapter> = Arc::new(I64Adapter);
    /// Canonical shared instance of [`F64Adapter`].
    pub static ref SHARED_F64: Arc<F64Adapter> = Arc::new(F64Adapter);
    /// Canonical shared instance of [`BoolAdapter`].
    pub static ref SHARED_BOOL: Arc<BoolAdapter> = Arc::new(BoolAdapter);
}
