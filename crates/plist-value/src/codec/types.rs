//! Codec trait and error shared by every document format.

use crate::Dictionary;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document root must be a dictionary, found {0}")]
    InvalidRoot(&'static str),
    #[error("invalid date at {path}: {value:?}")]
    InvalidDate { path: String, value: String },
    #[error("null is not a document value (at {path})")]
    Null { path: String },
    #[error("non-finite real at {path} cannot be encoded")]
    NonFiniteReal { path: String },
    #[error("dictionary at {path} has only a `$date` string and would read back as a date")]
    ReservedDateKey { path: String },
    #[error("date at {path} has year {year}, outside 0000-9999")]
    DateOutOfRange { path: String, year: i32 },
}

/// A file format that can hold a whole document.
///
/// Implementations are shared between the caller and background save/load
/// tasks, so they take `&self` and must be `Send + Sync`.
pub trait DocumentCodec: Send + Sync {
    fn id(&self) -> &'static str;

    /// File extension (without the dot) used when a locator builds a path
    /// from a document name.
    fn extension(&self) -> &'static str;

    fn encode(&self, document: &Dictionary) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Dictionary, CodecError>;
}
