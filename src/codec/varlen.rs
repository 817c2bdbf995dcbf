//! Built-in length-prefixed codecs.
//!
//! [`VarBytes`] and [`VarString`] carry their prefix width as a const
//! parameter, so `VarString<1>` is a short string with a one-byte length and
//! `VarBytes<4>` a blob with a `u32` length.  Plain `Vec<u8>` and `String`
//! use [`DEFAULT_PREFIX_WIDTH`].

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::{write_length_prefixed, LayoutError, VarCodec};

/// Prefix width used by `Vec<u8>` and `String`.
pub const DEFAULT_PREFIX_WIDTH: usize = 4;

/// Raw bytes behind a `W`-byte length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VarBytes<const W: usize>(pub Vec<u8>);

/// UTF-8 text behind a `W`-byte length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VarString<const W: usize>(pub String);

impl<const W: usize> VarCodec for VarBytes<W> {
    const PREFIX_WIDTH: usize = W;

    fn decode_content(content: &[u8], _declared_len: usize) -> Result<Self, LayoutError> {
        Ok(Self(content.to_vec()))
    }

    fn encode_var(&self, out: &mut Vec<u8>) -> Result<(), LayoutError> {
        write_length_prefixed(W, &self.0, out)
    }
}

impl<const W: usize> VarCodec for VarString<W> {
    const PREFIX_WIDTH: usize = W;

    fn decode_content(content: &[u8], _declared_len: usize) -> Result<Self, LayoutError> {
        Ok(Self(std::str::from_utf8(content)?.to_owned()))
    }

    fn encode_var(&self, out: &mut Vec<u8>) -> Result<(), LayoutError> {
        write_length_prefixed(W, self.0.as_bytes(), out)
    }
}

impl VarCodec for Vec<u8> {
    const PREFIX_WIDTH: usize = DEFAULT_PREFIX_WIDTH;

    fn decode_content(content: &[u8], _declared_len: usize) -> Result<Self, LayoutError> {
        Ok(content.to_vec())
    }

    fn encode_var(&self, out: &mut Vec<u8>) -> Result<(), LayoutError> {
        write_length_prefixed(Self::PREFIX_WIDTH, self, out)
    }
}

impl VarCodec for String {
    const PREFIX_WIDTH: usize = DEFAULT_PREFIX_WIDTH;

    fn decode_content(content: &[u8], _declared_len: usize) -> Result<Self, LayoutError> {
        Ok(std::str::from_utf8(content)?.to_owned())
    }

    fn encode_var(&self, out: &mut Vec<u8>) -> Result<(), LayoutError> {
        write_length_prefixed(Self::PREFIX_WIDTH, self.as_bytes(), out)
    }
}

// ── Conversions ──────────────────────────────────────────────────────────────

impl<const W: usize> Deref for VarBytes<W> {
    type Target = Vec<u8>;
    fn deref(&self) -> &Vec<u8> { &self.0 }
}

impl<const W: usize> DerefMut for VarBytes<W> {
    fn deref_mut(&mut self) -> &mut Vec<u8> { &mut self.0 }
}

impl<const W: usize> Deref for VarString<W> {
    type Target = String;
    fn deref(&self) -> &String { &self.0 }
}

impl<const W: usize> DerefMut for VarString<W> {
    fn deref_mut(&mut self) -> &mut String { &mut self.0 }
}

impl<const W: usize> From<Vec<u8>> for VarBytes<W> {
    fn from(v: Vec<u8>) -> Self { Self(v) }
}

impl<const W: usize> From<&[u8]> for VarBytes<W> {
    fn from(v: &[u8]) -> Self { Self(v.to_vec()) }
}

impl<const W: usize> From<String> for VarString<W> {
    fn from(s: String) -> Self { Self(s) }
}

impl<const W: usize> From<&str> for VarString<W> {
    fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl<const W: usize> fmt::Display for VarString<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
