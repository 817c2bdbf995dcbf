//! Built-in fixed-size codecs: integers, floats, `bool` and arrays.
//!
//! All multi-byte numbers are little-endian.

use std::mem::size_of;

use byteorder::{ByteOrder, LittleEndian};

use super::{check_exact, FixedCodec, LayoutError};

macro_rules! impl_fixed_le {
    ($($ty:ty => $read:ident, $write:ident;)*) => {$(
        impl FixedCodec for $ty {
            const WIDTH: usize = size_of::<$ty>();

            #[inline]
            fn decode_fixed(bytes: &[u8]) -> Result<Self, LayoutError> {
                check_exact(bytes, Self::WIDTH)?;
                Ok(LittleEndian::$read(bytes))
            }

            #[inline]
            fn encode_fixed(&self, out: &mut Vec<u8>) {
                let mut buf = [0u8; size_of::<$ty>()];
                LittleEndian::$write(&mut buf, *self);
                out.extend_from_slice(&buf);
            }
        }
    )*};
}

impl_fixed_le! {
    u16  => read_u16,  write_u16;
    u32  => read_u32,  write_u32;
    u64  => read_u64,  write_u64;
    u128 => read_u128, write_u128;
    i16  => read_i16,  write_i16;
    i32  => read_i32,  write_i32;
    i64  => read_i64,  write_i64;
    i128 => read_i128, write_i128;
    f32  => read_f32,  write_f32;
    f64  => read_f64,  write_f64;
}

impl FixedCodec for u8 {
    const WIDTH: usize = 1;

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Result<Self, LayoutError> {
        check_exact(bytes, 1)?;
        Ok(bytes[0])
    }

    #[inline]
    fn encode_fixed(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl FixedCodec for i8 {
    const WIDTH: usize = 1;

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Result<Self, LayoutError> {
        check_exact(bytes, 1)?;
        Ok(bytes[0] as i8)
    }

    #[inline]
    fn encode_fixed(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl FixedCodec for bool {
    const WIDTH: usize = 1;

    fn decode_fixed(bytes: &[u8]) -> Result<Self, LayoutError> {
        check_exact(bytes, 1)?;
        match bytes[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(LayoutError::InvalidValue("bool must be encoded as 0 or 1")),
        }
    }

    fn encode_fixed(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

/// Arrays are the element codec repeated `N` times, no prefix.
impl<T: FixedCodec, const N: usize> FixedCodec for [T; N] {
    const WIDTH: usize = T::WIDTH * N;

    fn decode_fixed(bytes: &[u8]) -> Result<Self, LayoutError> {
        check_exact(bytes, Self::WIDTH)?;
        // Zero-width elements each decode from an empty slice.
        let items = (0..N)
            .map(|i| T::decode_fixed(&bytes[i * T::WIDTH..(i + 1) * T::WIDTH]))
            .collect::<Result<Vec<T>, _>>()?;
        items
            .try_into()
            .map_err(|_| LayoutError::InvalidValue("array element count mismatch"))
    }

    fn encode_fixed(&self, out: &mut Vec<u8>) {
        out.reserve(Self::WIDTH);
        for item in self {
            item.encode_fixed(out);
        }
    }
}
