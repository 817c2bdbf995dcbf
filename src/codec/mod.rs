//! Field codec capabilities: fixed-size and length-prefixed.
//!
//! # Capabilities
//! A field type takes part in a layout through exactly one of two traits:
//!   - [`FixedCodec`]: the binary form is always `WIDTH` bytes, whatever the
//!     value.
//!   - [`VarCodec`]: the binary form is a `PREFIX_WIDTH`-byte length prefix
//!     followed by that many content bytes.
//!
//! # Endianness
//! Every length prefix is an unsigned little-endian integer of exactly
//! `PREFIX_WIDTH` bytes (1..=8).  Built-in fixed-width numbers are
//! little-endian as well.  This is non-negotiable: [`read_length_prefix`] and
//! [`write_length_prefixed`] are the only places that touch prefix bytes.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

pub mod scalar;
pub mod varlen;

pub use varlen::{VarBytes, VarString, DEFAULT_PREFIX_WIDTH};

/// Largest prefix width an unsigned length can be read from.
pub const MAX_PREFIX_WIDTH: usize = 8;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The buffer (or a fixed slice) does not hold the bytes a field needs.
    #[error("Invalid length: needed {needed} bytes, {available} available")]
    InvalidLength { needed: usize, available: usize },
    #[error("Invalid length prefix width: {0} (must be 1..=8)")]
    InvalidLengthPrefixWidth(usize),
    /// Static width was requested for a layout with a variable-length field.
    #[error("Layout has no static width: field `{field}` is variable-length")]
    UnboundedLayout { field: &'static str },
    #[error("Field not found: {0}")]
    FieldNotFound(String),
    #[error("Field declared twice: {0}")]
    DuplicateField(&'static str),
    #[error("Field `{0}` has no binary codec and the layout rejects such fields")]
    UnsupportedField(&'static str),
    #[error("Content of {len} bytes does not fit a {width}-byte length prefix")]
    LengthPrefixOverflow { len: usize, width: usize },
    #[error("Declared content length {len} exceeds limit of {limit} bytes")]
    ContentTooLarge { len: usize, limit: usize },
    #[error("Invalid UTF-8 in string content: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),
}

// ── Capability traits ────────────────────────────────────────────────────────

/// A type whose binary form has a width known from the type alone.
pub trait FixedCodec: Sized {
    /// Exact number of bytes produced by `encode_fixed` and consumed by
    /// `decode_fixed`.
    const WIDTH: usize;

    /// Decode from a slice of exactly `WIDTH` bytes.
    fn decode_fixed(bytes: &[u8]) -> Result<Self, LayoutError>;

    /// Append exactly `WIDTH` bytes to `out`.
    fn encode_fixed(&self, out: &mut Vec<u8>);
}

/// A type stored as `length prefix ++ content`.
pub trait VarCodec: Sized {
    /// Bytes used for the content length.  Per type, never per value.
    const PREFIX_WIDTH: usize;

    /// Decode from the content bytes.  The layout decoder guarantees
    /// `content.len() == declared_len`.
    fn decode_content(content: &[u8], declared_len: usize) -> Result<Self, LayoutError>;

    /// Append the prefix and the content to `out`.
    fn encode_var(&self, out: &mut Vec<u8>) -> Result<(), LayoutError>;
}

// ── Length prefix convention ─────────────────────────────────────────────────

/// Reject prefix widths an unsigned 64-bit length cannot be read from.
#[inline]
pub fn check_prefix_width(width: usize) -> Result<usize, LayoutError> {
    if width == 0 || width > MAX_PREFIX_WIDTH {
        return Err(LayoutError::InvalidLengthPrefixWidth(width));
    }
    Ok(width)
}

/// Fail with `InvalidLength` unless `bytes` holds exactly `width` bytes.
#[inline]
pub fn check_exact(bytes: &[u8], width: usize) -> Result<(), LayoutError> {
    if bytes.len() != width {
        return Err(LayoutError::InvalidLength { needed: width, available: bytes.len() });
    }
    Ok(())
}

/// Interpret `prefix` as an unsigned little-endian content length.
pub fn read_length_prefix(prefix: &[u8]) -> Result<usize, LayoutError> {
    let width = check_prefix_width(prefix.len())?;
    let len = LittleEndian::read_uint(prefix, width);
    usize::try_from(len).map_err(|_| LayoutError::InvalidLength {
        needed:    usize::MAX,
        available: prefix.len(),
    })
}

/// Append `content.len()` as a `width`-byte little-endian prefix, then
/// `content` itself.
pub fn write_length_prefixed(width: usize, content: &[u8], out: &mut Vec<u8>) -> Result<(), LayoutError> {
    let width = check_prefix_width(width)?;
    let len = content.len() as u64;
    if width < MAX_PREFIX_WIDTH && len >> (width * 8) != 0 {
        return Err(LayoutError::LengthPrefixOverflow { len: content.len(), width });
    }
    let mut prefix = [0u8; MAX_PREFIX_WIDTH];
    LittleEndian::write_uint(&mut prefix[..width], len, width);
    out.reserve(width + content.len());
    out.extend_from_slice(&prefix[..width]);
    out.extend_from_slice(content);
    Ok(())
}
