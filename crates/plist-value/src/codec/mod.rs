//! Document codecs.
//!
//! The model crate only talks to [`DocumentCodec`]; [`JsonDocumentCodec`] is
//! the format used unless a locator is configured with another one.

mod json;
mod path;
mod types;

pub use json::{JsonDocumentCodec, DATE_KEY};
pub use types::{CodecError, DocumentCodec};
