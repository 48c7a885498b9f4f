//! Generic stream format for numeric tuples
//!
//! Text form: a tuple is written as its components in storage order between
//! parentheses, `(1 2 3)`; a list is its length followed by the parenthesised
//! values, `2((1 2 3) (4 5 6))`. Scalars are bare tokens.
//!
//! Binary form: the native-endian bytes of the contiguous component array, so
//! a list of tuples is read back with a single copy.
//!
//! Every read consumes exactly the tokens it declares, with one exception:
//! reading a [`Zero`] or [`One`] tag consumes nothing.

use crate::component::Cmpt;
use crate::tags::{One, Zero};
use crate::vector_space::{Kind, VectorSpace};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading a stream
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("unexpected end of input after {0} tokens")]
    UnexpectedEnd(usize),

    #[error("expected '{expected}', found '{found}' at token {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("cannot parse '{token}' as {type_name}")]
    Parse {
        token: String,
        type_name: &'static str,
    },

    #[error("trailing input '{0}'")]
    TrailingInput(String),

    #[error("binary payload of {bytes} bytes is not a whole number of {type_name} values")]
    BinarySize {
        bytes: usize,
        type_name: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Open,
    Close,
    Word(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Whitespace and parenthesis tokenizer over borrowed text
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    input: &'a str,
    pos: usize,
    consumed: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            consumed: 0,
        }
    }

    /// Number of tokens consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn scan(&self) -> Option<(Token<'a>, usize)> {
        let rest = &self.input[self.pos..];
        let first = rest.chars().next()?;
        match first {
            '(' => Some((Token::Open, 1)),
            ')' => Some((Token::Close, 1)),
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                    .unwrap_or(rest.len());
                Some((Token::Word(&rest[..end]), end))
            }
        }
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> Option<Token<'a>> {
        self.skip_whitespace();
        self.scan().map(|(t, _)| t)
    }

    /// Consume the next token
    pub fn next_token(&mut self) -> Result<Token<'a>, StreamError> {
        self.skip_whitespace();
        let (token, len) = self.scan().ok_or(StreamError::UnexpectedEnd(self.consumed))?;
        self.pos += len;
        self.consumed += 1;
        Ok(token)
    }

    /// Consume the next token and require it to be a word
    pub fn next_word(&mut self) -> Result<&'a str, StreamError> {
        let position = self.consumed;
        match self.next_token()? {
            Token::Word(w) => Ok(w),
            other => Err(StreamError::UnexpectedToken {
                expected: "word".to_string(),
                found: other.to_string(),
                position,
            }),
        }
    }

    /// Consume the next token and require it to equal `expected`
    pub fn expect(&mut self, expected: Token<'_>) -> Result<(), StreamError> {
        let position = self.consumed;
        let found = self.next_token()?;
        if found == expected {
            Ok(())
        } else {
            Err(StreamError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
                position,
            })
        }
    }

    /// Fail if any token remains
    pub fn finish(mut self) -> Result<(), StreamError> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            Err(StreamError::TrailingInput(self.input[self.pos..].to_string()))
        } else {
            Ok(())
        }
    }
}

/// Types that can be read from a [`TokenStream`]
pub trait ReadStream: Sized {
    fn read(ts: &mut TokenStream<'_>) -> Result<Self, StreamError>;
}

/// Types that can be written in the text stream format
pub trait WriteStream {
    fn write(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

macro_rules! impl_stream_cmpt {
    ($($t:ty),*) => {$(
        impl ReadStream for $t {
            fn read(ts: &mut TokenStream<'_>) -> Result<Self, StreamError> {
                let word = ts.next_word()?;
                word.parse::<$t>().map_err(|_| StreamError::Parse {
                    token: word.to_string(),
                    type_name: <$t as Cmpt>::TYPE_NAME,
                })
            }
        }

        impl WriteStream for $t {
            fn write(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                write!(out, "{}", self)
            }
        }
    )*};
}

impl_stream_cmpt!(f32, f64, i32, i64);

impl<K: Kind, C: Cmpt + ReadStream, const N: usize> ReadStream for VectorSpace<K, C, N> {
    fn read(ts: &mut TokenStream<'_>) -> Result<Self, StreamError> {
        ts.expect(Token::Open)?;
        let mut v = Self::ZERO;
        for c in v.iter_mut() {
            *c = C::read(ts)?;
        }
        ts.expect(Token::Close)?;
        Ok(v)
    }
}

impl<K: Kind, C: Cmpt, const N: usize> WriteStream for VectorSpace<K, C, N> {
    fn write(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", self)
    }
}

impl ReadStream for Zero {
    fn read(_: &mut TokenStream<'_>) -> Result<Self, StreamError> {
        Ok(Zero)
    }
}

impl ReadStream for One {
    fn read(_: &mut TokenStream<'_>) -> Result<Self, StreamError> {
        Ok(One)
    }
}

impl<T: ReadStream> ReadStream for Vec<T> {
    fn read(ts: &mut TokenStream<'_>) -> Result<Self, StreamError> {
        let len = read_len(ts)?;
        ts.expect(Token::Open)?;
        let mut values = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            values.push(T::read(ts)?);
        }
        ts.expect(Token::Close)?;
        Ok(values)
    }
}

impl<T: WriteStream> WriteStream for [T] {
    fn write(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}(", self.len())?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                out.write_char(' ')?;
            }
            value.write(out)?;
        }
        out.write_char(')')
    }
}

fn read_len(ts: &mut TokenStream<'_>) -> Result<usize, StreamError> {
    let word = ts.next_word()?;
    word.parse().map_err(|_| StreamError::Parse {
        token: word.to_string(),
        type_name: "label",
    })
}

/// Read one value from text, rejecting trailing input
pub fn read_str<T: ReadStream>(input: &str) -> Result<T, StreamError> {
    let mut ts = TokenStream::new(input);
    let value = T::read(&mut ts)?;
    ts.finish()?;
    Ok(value)
}

/// Write one value to a new string
pub fn write_string<T: WriteStream + ?Sized>(value: &T) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = value.write(&mut out);
    out
}

impl<K: Kind, C: Cmpt + ReadStream, const N: usize> FromStr for VectorSpace<K, C, N> {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        read_str(s)
    }
}

/// Write a slice of contiguous values in native-endian binary form
pub fn write_binary<T: bytemuck::Pod, W: io::Write>(
    values: &[T],
    writer: &mut W,
) -> Result<(), StreamError> {
    writer.write_all(bytemuck::cast_slice(values))?;
    Ok(())
}

/// Read values written by [`write_binary`]
pub fn read_binary<T: bytemuck::Pod>(bytes: &[u8]) -> Result<Vec<T>, StreamError> {
    let size = std::mem::size_of::<T>();
    if size == 0 || bytes.len() % size != 0 {
        return Err(StreamError::BinarySize {
            bytes: bytes.len(),
            type_name: std::any::type_name::<T>(),
        });
    }
    Ok(bytes
        .chunks_exact(size)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

impl<K: Kind, C: Cmpt + Serialize, const N: usize> Serialize for VectorSpace<K, C, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(N)?;
        for c in self.iter() {
            tuple.serialize_element(c)?;
        }
        tuple.end()
    }
}

struct TupleVisitor<K, C, const N: usize>(PhantomData<(K, C)>);

impl<'de, K: Kind, C: Cmpt + Deserialize<'de>, const N: usize> Visitor<'de>
    for TupleVisitor<K, C, N>
{
    type Value = VectorSpace<K, C, N>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} of {} components", K::NAME, N)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut v = VectorSpace::ZERO;
        for i in 0..N {
            v[i] = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        Ok(v)
    }
}

impl<'de, K: Kind, C: Cmpt + Deserialize<'de>, const N: usize> Deserialize<'de>
    for VectorSpace<K, C, N>
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_tuple(N, TupleVisitor(PhantomData))
    }
}
