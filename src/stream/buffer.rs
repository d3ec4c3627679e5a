//! In-memory implementations of the stream traits
//!
//! [`TokenVecReader`] wraps an owned token buffer behind a consuming
//! cursor, and [`TokenBuffer`] collects written tokens while policing
//! the legality of the call sequence. Together they close the loop for
//! round-trip tests and benches, and back the convenience entry points
//! [`decode_tokens`](crate::adapter::Adapter::decode_tokens) and
//! [`encode_to_tokens`](crate::adapter::Adapter::encode_to_tokens).

use super::token::Token;
use super::{TokenReader, TokenWriter};
use crate::error::{DecodeError, DecodeResult, EncodeResult, StructuralError};

/// One open record on the reader's stack, carrying the key whose value
/// the reader is at (or just moved past).
#[derive(Debug, Default)]
struct Frame {
    current_key: Option<String>,
}

/// Reader over an owned, already-tokenized buffer.
///
/// Reading consumes the buffer front-to-back; tokens cannot be
/// revisited. The reader tracks one [`Frame`] per open record in order
/// to render its current location for error messages.
#[derive(Debug)]
pub struct TokenVecReader {
    tokens: Vec<Token>,
    pos: usize,
    frames: Vec<Frame>,
}

impl TokenVecReader {
    /// Constructs a reader positioned before the first token.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            frames: Vec::new(),
        }
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self, expected: &'static str) -> DecodeResult<Token> {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                let tok = tok.clone();
                self.pos += 1;
                Ok(tok)
            }
            None => Err(StructuralError::UnexpectedEnd {
                expected,
                path: self.path(),
            }
            .into()),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &Token) -> DecodeError {
        StructuralError::UnexpectedToken {
            expected,
            found: found.kind().to_owned(),
            path: self.path(),
        }
        .into()
    }
}

impl From<Vec<Token>> for TokenVecReader {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl TokenReader for TokenVecReader {
    fn begin_record(&mut self) -> DecodeResult<()> {
        match self.bump("record start")? {
            Token::BeginRecord => {
                self.frames.push(Frame::default());
                Ok(())
            }
            other => Err(self.mismatch("record start", &other)),
        }
    }

    fn end_record(&mut self) -> DecodeResult<()> {
        match self.bump("record end")? {
            Token::EndRecord => {
                self.frames.pop();
                Ok(())
            }
            other => Err(self.mismatch("record end", &other)),
        }
    }

    fn has_next(&mut self) -> DecodeResult<bool> {
        match self.peek_token() {
            Some(Token::EndRecord) => Ok(false),
            Some(_) => Ok(true),
            None => Err(StructuralError::UnexpectedEnd {
                expected: "key or record end",
                path: self.path(),
            }
            .into()),
        }
    }

    fn next_key(&mut self) -> DecodeResult<String> {
        match self.bump("key")? {
            Token::Key(key) => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.current_key = Some(key.clone());
                }
                Ok(key)
            }
            other => Err(self.mismatch("key", &other)),
        }
    }

    fn skip_value(&mut self) -> DecodeResult<()> {
        let mut depth = 0usize;
        loop {
            let tok = self.bump("value")?;
            match tok {
                Token::BeginRecord => depth += 1,
                Token::EndRecord => match depth {
                    0 => return Err(self.mismatch("value", &tok)),
                    1 => return Ok(()),
                    _ => depth -= 1,
                },
                Token::Key(_) => {
                    if depth == 0 {
                        return Err(self.mismatch("value", &tok));
                    }
                }
                _ => {
                    if depth == 0 {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn peek_null(&mut self) -> DecodeResult<bool> {
        Ok(matches!(self.peek_token(), Some(Token::Null)))
    }

    fn take_null(&mut self) -> DecodeResult<bool> {
        if matches!(self.peek_token(), Some(Token::Null)) {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn take_bool(&mut self) -> DecodeResult<bool> {
        match self.bump("boolean value")? {
            Token::Bool(b) => Ok(b),
            other => Err(self.mismatch("boolean value", &other)),
        }
    }

    fn take_i64(&mut self) -> DecodeResult<i64> {
        match self.bump("integer value")? {
            Token::Int(n) => Ok(n),
            other => Err(self.mismatch("integer value", &other)),
        }
    }

    fn take_f64(&mut self) -> DecodeResult<f64> {
        match self.bump("float value")? {
            Token::Float(x) => Ok(x),
            // Integral tokens widen losslessly enough for this leaf type.
            Token::Int(n) => Ok(n as f64),
            other => Err(self.mismatch("float value", &other)),
        }
    }

    fn take_string(&mut self) -> DecodeResult<String> {
        match self.bump("string value")? {
            Token::Str(s) => Ok(s),
            other => Err(self.mismatch("string value", &other)),
        }
    }

    fn path(&self) -> String {
        let mut out = String::from("$");
        for frame in &self.frames {
            if let Some(key) = &frame.current_key {
                out.push('.');
                out.push_str(key);
            }
        }
        out
    }
}

/// Collecting writer over a growable token buffer.
///
/// Every write is checked against the writer's current position, so a
/// generated encoder that mis-sequences its calls fails fast with a
/// [`StructuralError::MisplacedWrite`] instead of producing a stream
/// no reader could consume.
#[derive(Debug, Default)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
    depth: usize,
    expect_value: bool,
}

impl TokenBuffer {
    /// Constructs an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens written so far.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` when no tokens have been written.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns `true` when every opened record has been closed.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && !self.expect_value
    }

    /// Destructs the buffer into the token sequence it collected.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// A value write is legal as the payload of a pending key, or as
    /// the sole top-level element of the stream.
    fn value_position(&self) -> bool {
        self.expect_value || (self.depth == 0 && self.tokens.is_empty())
    }

    fn push_value(&mut self, call: &'static str, tok: Token) -> EncodeResult<()> {
        if !self.value_position() {
            return Err(StructuralError::MisplacedWrite { call }.into());
        }
        self.tokens.push(tok);
        self.expect_value = false;
        Ok(())
    }
}

impl TokenWriter for TokenBuffer {
    fn begin_record(&mut self) -> EncodeResult<()> {
        if !self.value_position() {
            return Err(StructuralError::MisplacedWrite {
                call: "begin_record",
            }
            .into());
        }
        self.tokens.push(Token::BeginRecord);
        self.depth += 1;
        self.expect_value = false;
        Ok(())
    }

    fn end_record(&mut self) -> EncodeResult<()> {
        if self.depth == 0 || self.expect_value {
            return Err(StructuralError::MisplacedWrite { call: "end_record" }.into());
        }
        self.tokens.push(Token::EndRecord);
        self.depth -= 1;
        Ok(())
    }

    fn write_key(&mut self, key: &str) -> EncodeResult<()> {
        if self.depth == 0 || self.expect_value {
            return Err(StructuralError::MisplacedWrite { call: "write_key" }.into());
        }
        self.tokens.push(Token::Key(key.to_owned()));
        self.expect_value = true;
        Ok(())
    }

    fn write_null(&mut self) -> EncodeResult<()> {
        self.push_value("write_null", Token::Null)
    }

    fn write_bool(&mut self, value: bool) -> EncodeResult<()> {
        self.push_value("write_bool", Token::Bool(value))
    }

    fn write_i64(&mut self, value: i64) -> EncodeResult<()> {
        self.push_value("write_i64", Token::Int(value))
    }

    fn write_f64(&mut self, value: f64) -> EncodeResult<()> {
        self.push_value("write_f64", Token::Float(value))
    }

    fn write_string(&mut self, value: &str) -> EncodeResult<()> {
        self.push_value("write_string", Token::Str(value.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, EncodeError};

    fn sample() -> Vec<Token> {
        vec![
            Token::BeginRecord,
            Token::key("name"),
            Token::str("Ann"),
            Token::key("meta"),
            Token::BeginRecord,
            Token::key("flag"),
            Token::Bool(true),
            Token::EndRecord,
            Token::EndRecord,
        ]
    }

    #[test]
    fn reader_walks_flat_keys() {
        let mut r = TokenVecReader::new(sample());
        r.begin_record().unwrap();
        assert!(r.has_next().unwrap());
        assert_eq!(r.next_key().unwrap(), "name");
        assert_eq!(r.path(), "$.name");
        assert_eq!(r.take_string().unwrap(), "Ann");
        assert_eq!(r.next_key().unwrap(), "meta");
        r.skip_value().unwrap();
        assert!(!r.has_next().unwrap());
        r.end_record().unwrap();
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn reader_path_descends_into_nested_records() {
        let mut r = TokenVecReader::new(sample());
        r.begin_record().unwrap();
        r.next_key().unwrap();
        r.take_string().unwrap();
        r.next_key().unwrap();
        r.begin_record().unwrap();
        r.next_key().unwrap();
        assert_eq!(r.path(), "$.meta.flag");
    }

    #[test]
    fn reader_rejects_missing_record_start() {
        let mut r = TokenVecReader::new(vec![Token::str("Ann")]);
        match r.begin_record() {
            Err(DecodeError::Structural(_)) => {}
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn skip_value_consumes_nested_record_entirely() {
        let mut r = TokenVecReader::new(sample());
        r.begin_record().unwrap();
        r.next_key().unwrap();
        r.skip_value().unwrap();
        r.next_key().unwrap();
        r.skip_value().unwrap();
        r.end_record().unwrap();
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn take_null_does_not_consume_other_values() {
        let mut r = TokenVecReader::new(vec![Token::Int(5)]);
        assert!(!r.take_null().unwrap());
        assert_eq!(r.take_i64().unwrap(), 5);
    }

    #[test]
    fn writer_round_trips_through_reader() {
        let mut w = TokenBuffer::new();
        w.begin_record().unwrap();
        w.write_key("age").unwrap();
        w.write_i64(41).unwrap();
        w.end_record().unwrap();
        assert!(w.is_balanced());

        let mut r = TokenVecReader::new(w.into_tokens());
        r.begin_record().unwrap();
        assert_eq!(r.next_key().unwrap(), "age");
        assert_eq!(r.take_i64().unwrap(), 41);
        r.end_record().unwrap();
    }

    #[test]
    fn writer_rejects_key_outside_record() {
        let mut w = TokenBuffer::new();
        match w.write_key("oops") {
            Err(EncodeError::Structural(_)) => {}
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn writer_rejects_dangling_key() {
        let mut w = TokenBuffer::new();
        w.begin_record().unwrap();
        w.write_key("k").unwrap();
        assert!(w.end_record().is_err());
    }
}
