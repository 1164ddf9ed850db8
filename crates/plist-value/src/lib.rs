//! Ordered document values and file codecs for plist-model.
//!
//! - [`Value`] / [`Dictionary`]: the in-memory document tree
//! - [`codec`]: the [`DocumentCodec`] seam and the JSON implementation
//!
//! # Example
//!
//! ```
//! use plist_model_value::{Dictionary, DocumentCodec, JsonDocumentCodec, Value};
//!
//! let mut doc = Dictionary::new();
//! doc.insert("counter".to_string(), Value::Integer(3));
//!
//! let codec = JsonDocumentCodec::new();
//! let bytes = codec.encode(&doc).unwrap();
//! assert_eq!(codec.decode(&bytes).unwrap(), doc);
//! ```

pub mod codec;
mod value;

pub use codec::{CodecError, DocumentCodec, JsonDocumentCodec};
pub use value::{Dictionary, Value, ValueKind};

/// Re-exported so downstream crates name the same date type.
pub use chrono::{DateTime, Utc};
