//! Layout engine — descriptor table, decoder, encoder and static width.
//!
//! # Declaring a layout
//! A record type lists its fields once, in wire order, through
//! [`LayoutBuilder`].  Each field is declared with the capability of its
//! type; excluded names and the post-decode hook sit in the same
//! declaration.  The table is immutable once built and is normally kept in
//! a `OnceLock` behind [`BufferLayout::layout`].
//!
//! ```
//! use std::sync::OnceLock;
//! use bufferlayout::{BufferLayout, Layout, VarString};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Account {
//!     id:   u32,
//!     name: VarString<1>,
//! }
//!
//! impl BufferLayout for Account {
//!     fn layout() -> &'static Layout<Self> {
//!         static LAYOUT: OnceLock<Layout<Account>> = OnceLock::new();
//!         LAYOUT.get_or_init(|| {
//!             Layout::builder()
//!                 .fixed("id", |a: &Account| &a.id, |a, v| a.id = v)
//!                 .variable("name", |a: &Account| &a.name, |a, v| a.name = v)
//!                 .build()
//!         })
//!     }
//! }
//!
//! let account = Account { id: 7, name: "ok".into() };
//! let bytes = account.encode()?;
//! assert_eq!(bytes, [0x07, 0x00, 0x00, 0x00, 0x02, b'o', b'k']);
//! assert_eq!(Account::decode(&bytes)?, account);
//! # Ok::<(), bufferlayout::LayoutError>(())
//! ```
//!
//! # Decoding
//! A single cursor walks the buffer from offset 0.  Fixed fields consume
//! exactly their width; variable fields consume their prefix plus the length
//! it declares.  Every slice is bounds-checked before it is taken, so a
//! short buffer is an `InvalidLength` error, never a panic.  Excluded and
//! opaque fields do not move the cursor.  Trailing bytes after the last
//! field are left unread.
//!
//! # Encoding
//! The encoder appends fields in exactly the order the decoder reads them.

use std::any::type_name;
use std::collections::BTreeSet;

use crate::codec::{check_prefix_width, read_length_prefix, LayoutError, FixedCodec, VarCodec};
use crate::field::{Field, FieldCodec, FieldSummary, LayoutSummary};
use crate::options::{FieldPolicy, LayoutOptions};

/// Post-decode hook: fills in fields that are not drawn from the buffer.
pub type DecodeHook<T> = Box<dyn Fn(&Layout<T>, &mut T) -> Result<(), LayoutError> + Send + Sync>;

// ── BufferLayout ─────────────────────────────────────────────────────────────

/// A record type with a declared binary layout.
pub trait BufferLayout: Default + Sized + 'static {
    /// The type's descriptor table, built once.
    fn layout() -> &'static Layout<Self>;

    fn decode(buffer: &[u8]) -> Result<Self, LayoutError> {
        Self::layout().decode(buffer)
    }

    /// Decode from the head of `buffer`, also returning the bytes consumed.
    fn decode_prefix(buffer: &[u8]) -> Result<(Self, usize), LayoutError> {
        Self::layout().decode_prefix(buffer)
    }

    fn encode(&self) -> Result<Vec<u8>, LayoutError> {
        Self::layout().encode(self)
    }

    /// Total encoded width when every field is fixed-size.
    fn static_width() -> Result<usize, LayoutError> {
        Self::layout().static_width()
    }
}

// ── Layout ───────────────────────────────────────────────────────────────────

pub struct Layout<T> {
    fields:     Vec<Field<T>>,
    excluded:   BTreeSet<&'static str>,
    on_decoded: Option<DecodeHook<T>>,
    options:    LayoutOptions,
    /// Misconfiguration found by `build()`, reported by every operation.
    defect:     Option<LayoutError>,
}

impl<T: 'static> Layout<T> {
    pub fn builder() -> LayoutBuilder<T> {
        LayoutBuilder::new()
    }
}

impl<T> Layout<T> {
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Result<&Field<T>, LayoutError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| LayoutError::FieldNotFound(name.to_owned()))
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    pub fn excluded_field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.excluded.iter().copied()
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// `Err` if the declaration was inconsistent.
    pub fn validate(&self) -> Result<(), LayoutError> {
        match &self.defect {
            Some(e) => Err(e.clone()),
            None    => Ok(()),
        }
    }

    /// Sum of the widths of every non-excluded fixed field.
    ///
    /// Fails with `UnboundedLayout` as soon as a non-excluded variable-length
    /// field is met, wherever it sits.  Opaque fields contribute nothing.
    pub fn static_width(&self) -> Result<usize, LayoutError> {
        self.validate()?;
        let mut total = 0usize;
        for field in &self.fields {
            if self.is_excluded(field.name) {
                continue;
            }
            match &field.codec {
                FieldCodec::Fixed { width, .. } => total += width()?,
                FieldCodec::Variable { .. }     => {
                    return Err(LayoutError::UnboundedLayout { field: field.name });
                }
                FieldCodec::Opaque              => {}
            }
        }
        Ok(total)
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, LayoutError> {
        let mut out = Vec::with_capacity(self.static_width().unwrap_or(0));
        self.encode_into(value, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of `value` to `out`.  On error `out` is restored
    /// to its original length.
    pub fn encode_into(&self, value: &T, out: &mut Vec<u8>) -> Result<(), LayoutError> {
        let start = out.len();
        let result = self.encode_fields(value, out);
        if let Err(e) = &result {
            log::debug!("{}: encode aborted: {e}", type_name::<T>());
            out.truncate(start);
        }
        result
    }

    fn encode_fields(&self, value: &T, out: &mut Vec<u8>) -> Result<(), LayoutError> {
        self.validate()?;
        for field in &self.fields {
            if self.is_excluded(field.name) {
                continue;
            }
            match &field.codec {
                FieldCodec::Fixed { width, encode, .. } => {
                    // A nested record without a static width cannot be decoded back.
                    width()?;
                    encode(value, out)?;
                }
                FieldCodec::Variable { prefix_width, encode, .. } => {
                    check_prefix_width(*prefix_width)?;
                    encode(value, out)?;
                }
                FieldCodec::Opaque => {}
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> LayoutSummary {
        let fields = self.fields
            .iter()
            .map(|f| FieldSummary {
                name:         f.name.to_owned(),
                kind:         f.kind(),
                excluded:     self.is_excluded(f.name),
                width:        f.width().and_then(Result::ok),
                prefix_width: f.prefix_width(),
            })
            .collect();
        LayoutSummary { fields, static_width: self.static_width().ok() }
    }
}

impl<T: Default> Layout<T> {
    /// Decode a value from the head of `buffer`.  Trailing bytes are ignored.
    pub fn decode(&self, buffer: &[u8]) -> Result<T, LayoutError> {
        self.decode_prefix(buffer).map(|(value, _)| value)
    }

    /// Decode a value from the head of `buffer` and return it together with
    /// the final cursor position.
    pub fn decode_prefix(&self, buffer: &[u8]) -> Result<(T, usize), LayoutError> {
        self.decode_fields(buffer).map_err(|e| {
            log::debug!("{}: decode of {} bytes aborted: {e}", type_name::<T>(), buffer.len());
            e
        })
    }

    fn decode_fields(&self, buffer: &[u8]) -> Result<(T, usize), LayoutError> {
        self.validate()?;
        let mut value  = T::default();
        let mut cursor = 0usize;

        for field in &self.fields {
            if self.is_excluded(field.name) {
                continue;
            }
            match &field.codec {
                FieldCodec::Fixed { width, decode, .. } => {
                    let end   = span_end(cursor, width()?, buffer.len())?;
                    let bytes = &buffer[cursor..end];
                    log::trace!("{} @{cursor}: {} = {}", type_name::<T>(), field.name, hex::encode(bytes));
                    decode(bytes, &mut value)?;
                    cursor = end;
                }
                FieldCodec::Variable { prefix_width, decode, .. } => {
                    let width      = check_prefix_width(*prefix_width)?;
                    let prefix_end = span_end(cursor, width, buffer.len())?;
                    let len        = read_length_prefix(&buffer[cursor..prefix_end])?;
                    if let Some(limit) = self.options.max_content_len {
                        if len > limit {
                            return Err(LayoutError::ContentTooLarge { len, limit });
                        }
                    }
                    let end     = span_end(prefix_end, len, buffer.len())?;
                    let content = &buffer[prefix_end..end];
                    log::trace!(
                        "{} @{cursor}: {} [{len}] = {}",
                        type_name::<T>(), field.name, hex::encode(content)
                    );
                    decode(content, len, &mut value)?;
                    cursor = end;
                }
                FieldCodec::Opaque => {
                    log::debug!("{}: {} has no binary form, skipped", type_name::<T>(), field.name);
                }
            }
        }

        if let Some(hook) = &self.on_decoded {
            hook(self, &mut value)?;
        }
        Ok((value, cursor))
    }
}

/// End offset of `len` bytes starting at `start`, if they fit in `available`.
#[inline]
fn span_end(start: usize, len: usize, available: usize) -> Result<usize, LayoutError> {
    start
        .checked_add(len)
        .filter(|&end| end <= available)
        .ok_or(LayoutError::InvalidLength {
            needed:    len,
            available: available.saturating_sub(start),
        })
}

impl<T> std::fmt::Debug for Layout<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout")
            .field("fields", &self.fields)
            .field("excluded", &self.excluded)
            .field("on_decoded", &self.on_decoded.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ── LayoutBuilder ────────────────────────────────────────────────────────────

/// Declares the fields of `T` in wire order.
pub struct LayoutBuilder<T> {
    fields:     Vec<Field<T>>,
    excluded:   BTreeSet<&'static str>,
    on_decoded: Option<DecodeHook<T>>,
    options:    LayoutOptions,
}

impl<T: 'static> LayoutBuilder<T> {
    pub fn new() -> Self {
        Self {
            fields:     Vec::new(),
            excluded:   BTreeSet::new(),
            on_decoded: None,
            options:    LayoutOptions::default(),
        }
    }

    /// A field whose type has a fixed width.
    pub fn fixed<V>(mut self, name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self
    where
        V: FixedCodec + 'static,
    {
        self.fields.push(Field::fixed(name, get, set));
        self
    }

    /// A length-prefixed field.
    pub fn variable<V>(mut self, name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self
    where
        V: VarCodec + 'static,
    {
        self.fields.push(Field::variable(name, get, set));
        self
    }

    /// A field that is itself a record; its width is the static width of
    /// its own layout.
    pub fn nested<V>(mut self, name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self
    where
        V: BufferLayout,
    {
        self.fields.push(Field::nested(name, get, set));
        self
    }

    /// A declared field with no binary representation.
    pub fn opaque(mut self, name: &'static str) -> Self {
        self.fields.push(Field::opaque(name));
        self
    }

    /// Keep a declared field out of the buffer entirely.
    pub fn exclude(mut self, name: &'static str) -> Self {
        self.excluded.insert(name);
        self
    }

    /// Run `hook` once after every successful field walk in `decode`.
    pub fn on_decoded<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Layout<T>, &mut T) -> Result<(), LayoutError> + Send + Sync + 'static,
    {
        self.on_decoded = Some(Box::new(hook));
        self
    }

    pub fn options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Finish the declaration.  Inconsistencies are kept on the layout and
    /// returned by every decode, encode and width call.
    pub fn build(self) -> Layout<T> {
        let defect = self.find_defect();
        if let Some(e) = &defect {
            log::debug!("{}: layout declaration rejected: {e}", type_name::<T>());
        }
        Layout {
            fields:     self.fields,
            excluded:   self.excluded,
            on_decoded: self.on_decoded,
            options:    self.options,
            defect,
        }
    }

    /// Like `build`, but fails immediately on an inconsistent declaration.
    pub fn try_build(self) -> Result<Layout<T>, LayoutError> {
        let layout = self.build();
        layout.validate()?;
        Ok(layout)
    }

    fn find_defect(&self) -> Option<LayoutError> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.name) {
                return Some(LayoutError::DuplicateField(field.name));
            }
        }
        if let Some(name) = self.excluded.iter().find(|n| !seen.contains(*n)) {
            return Some(LayoutError::FieldNotFound((*name).to_owned()));
        }
        for field in self.fields.iter().filter(|f| !self.excluded.contains(f.name)) {
            if let FieldCodec::Fixed { width, .. } = &field.codec {
                if let Err(e) = width() {
                    return Some(e);
                }
            }
        }
        if self.options.unsupported_fields == FieldPolicy::Reject {
            let opaque = self.fields
                .iter()
                .find(|f| matches!(f.codec, FieldCodec::Opaque) && !self.excluded.contains(f.name));
            if let Some(field) = opaque {
                return Some(LayoutError::UnsupportedField(field.name));
            }
        }
        None
    }
}

impl<T: 'static> Default for LayoutBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
