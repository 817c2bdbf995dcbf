pub mod codec;
pub mod field;
pub mod layout;
pub mod options;

pub use codec::{FixedCodec, LayoutError, VarBytes, VarCodec, VarString};
pub use field::{Field, FieldKind, FieldSummary, LayoutSummary};
pub use layout::{BufferLayout, DecodeHook, Layout, LayoutBuilder};
pub use options::{FieldPolicy, LayoutOptions};
