//! Field descriptors: one entry per declared field of a record type.
//!
//! A descriptor pairs the field name with a type-erased accessor pair for
//! the field's codec.  The capability (fixed, variable, opaque) is fixed
//! when the descriptor is built, so the layout walk only matches on
//! `FieldCodec` and never probes types at decode time.

use serde::{Deserialize, Serialize};

use crate::codec::{FixedCodec, LayoutError, VarCodec};
use crate::layout::BufferLayout;

pub(crate) type DecodeFixedFn<T> = Box<dyn Fn(&[u8], &mut T) -> Result<(), LayoutError> + Send + Sync>;
pub(crate) type DecodeVarFn<T>   = Box<dyn Fn(&[u8], usize, &mut T) -> Result<(), LayoutError> + Send + Sync>;
pub(crate) type EncodeFixedFn<T> = Box<dyn Fn(&T, &mut Vec<u8>) -> Result<(), LayoutError> + Send + Sync>;
pub(crate) type EncodeVarFn<T>   = Box<dyn Fn(&T, &mut Vec<u8>) -> Result<(), LayoutError> + Send + Sync>;

/// Binary capability of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Fixed,
    Variable,
    /// No binary representation.
    Opaque,
}

pub(crate) enum FieldCodec<T> {
    Fixed {
        width:  fn() -> Result<usize, LayoutError>,
        decode: DecodeFixedFn<T>,
        encode: EncodeFixedFn<T>,
    },
    Variable {
        prefix_width: usize,
        decode:       DecodeVarFn<T>,
        encode:       EncodeVarFn<T>,
    },
    Opaque,
}

/// A named field of `T` and how it maps onto bytes.
pub struct Field<T> {
    pub(crate) name:  &'static str,
    pub(crate) codec: FieldCodec<T>,
}

fn fixed_width<V: FixedCodec>() -> Result<usize, LayoutError> {
    Ok(V::WIDTH)
}

fn nested_width<V: BufferLayout>() -> Result<usize, LayoutError> {
    V::layout().static_width()
}

impl<T: 'static> Field<T> {
    pub(crate) fn fixed<V>(name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self
    where
        V: FixedCodec + 'static,
    {
        Self {
            name,
            codec: FieldCodec::Fixed {
                width:  fixed_width::<V>,
                decode: Box::new(move |bytes: &[u8], dst: &mut T| {
                    set(dst, V::decode_fixed(bytes)?);
                    Ok(())
                }),
                encode: Box::new(move |src: &T, out: &mut Vec<u8>| {
                    get(src).encode_fixed(out);
                    Ok(())
                }),
            },
        }
    }

    pub(crate) fn variable<V>(name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self
    where
        V: VarCodec + 'static,
    {
        Self {
            name,
            codec: FieldCodec::Variable {
                prefix_width: V::PREFIX_WIDTH,
                decode:       Box::new(move |content: &[u8], len: usize, dst: &mut T| {
                    set(dst, V::decode_content(content, len)?);
                    Ok(())
                }),
                encode:       Box::new(move |src: &T, out: &mut Vec<u8>| get(src).encode_var(out)),
            },
        }
    }

    pub(crate) fn nested<V>(name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self
    where
        V: BufferLayout,
    {
        Self {
            name,
            codec: FieldCodec::Fixed {
                width:  nested_width::<V>,
                decode: Box::new(move |bytes: &[u8], dst: &mut T| {
                    set(dst, V::layout().decode(bytes)?);
                    Ok(())
                }),
                encode: Box::new(move |src: &T, out: &mut Vec<u8>| V::layout().encode_into(get(src), out)),
            },
        }
    }

    pub(crate) fn opaque(name: &'static str) -> Self {
        Self { name, codec: FieldCodec::Opaque }
    }
}

impl<T> Field<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        match self.codec {
            FieldCodec::Fixed { .. }    => FieldKind::Fixed,
            FieldCodec::Variable { .. } => FieldKind::Variable,
            FieldCodec::Opaque          => FieldKind::Opaque,
        }
    }

    /// Width of a fixed-size field; `None` for other kinds.
    pub fn width(&self) -> Option<Result<usize, LayoutError>> {
        match &self.codec {
            FieldCodec::Fixed { width, .. } => Some(width()),
            _                               => None,
        }
    }

    /// Prefix width of a variable-length field; `None` for other kinds.
    pub fn prefix_width(&self) -> Option<usize> {
        match &self.codec {
            FieldCodec::Variable { prefix_width, .. } => Some(*prefix_width),
            _                                         => None,
        }
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

// ── Summaries ────────────────────────────────────────────────────────────────

/// Serializable view of one descriptor, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub name:         String,
    pub kind:         FieldKind,
    pub excluded:     bool,
    /// Fixed width, when it can be computed.
    pub width:        Option<usize>,
    pub prefix_width: Option<usize>,
}

/// Serializable view of a whole layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LayoutSummary {
    pub fields:       Vec<FieldSummary>,
    /// `None` when the layout holds a variable-length field.
    pub static_width: Option<usize>,
}

impl LayoutSummary {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
