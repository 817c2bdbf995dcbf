use serde::{Deserialize, Serialize};

/// What a layout does with a declared field that has neither a fixed-size
/// nor a length-prefixed codec and is not excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// The field contributes no bytes; the decode hook may fill it in.
    #[default]
    Skip,
    /// The layout is misconfigured; every operation fails with
    /// `UnsupportedField`.
    Reject,
}

/// Configuration for [`LayoutBuilder`](crate::layout::LayoutBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub unsupported_fields: FieldPolicy,
    /// Upper bound on any declared variable-length content, checked before
    /// the content is sliced out of the buffer.
    pub max_content_len:    Option<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            unsupported_fields: FieldPolicy::Skip,
            max_content_len:    None,
        }
    }
}

impl LayoutOptions {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
