//! In-memory token alphabet for the reference stream types
//!
//! A record, in serialized form, is a flat sequence of tokens: a begin
//! marker, alternating keys and values (where a value may itself be a
//! nested record), and an end marker. Real deployments drive the stream
//! traits with a textual or binary tokenizer; the [`Token`] type exists
//! so that schemas can be exercised, tested, and benchmarked without
//! one.

#[cfg(feature = "serde_impls")]
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One element of an in-memory token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Begin-marker of a record value.
    BeginRecord,
    /// End-marker of a record value.
    EndRecord,
    /// A wire key; always followed by exactly one value.
    Key(String),
    /// An explicit null value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// An integral value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    Str(String),
}

impl Token {
    /// Constructs a [`Token::Key`] from anything string-like.
    pub fn key(k: impl Into<String>) -> Self {
        Self::Key(k.into())
    }

    /// Constructs a [`Token::Str`] from anything string-like.
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Short human-readable name for the token's kind, used in
    /// structural error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::BeginRecord => "record start",
            Token::EndRecord => "record end",
            Token::Key(_) => "key",
            Token::Null => "null",
            Token::Bool(_) => "boolean value",
            Token::Int(_) => "integer value",
            Token::Float(_) => "float value",
            Token::Str(_) => "string value",
        }
    }

    /// Returns `true` for tokens that open or stand alone as a value,
    /// i.e. everything except keys and end-markers.
    pub fn starts_value(&self) -> bool {
        !matches!(self, Token::Key(_) | Token::EndRecord)
    }
}

#[cfg(feature = "serde_impls")]
impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Token", 2)?;
        s.serialize_field("kind", self.kind())?;
        match self {
            Token::Key(k) => s.serialize_field("value", k)?,
            Token::Bool(b) => s.serialize_field("value", b)?,
            Token::Int(i) => s.serialize_field("value", i)?,
            Token::Float(x) => s.serialize_field("value", x)?,
            Token::Str(v) => s.serialize_field("value", v)?,
            Token::BeginRecord | Token::EndRecord | Token::Null => {
                s.serialize_field("value", &())?
            }
        }
        s.end()
    }
}
