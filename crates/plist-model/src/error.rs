use std::io;
use std::path::PathBuf;

use plist_model_value::{CodecError, ValueKind};
use thiserror::Error;

use crate::field::FieldKind;

#[derive(Debug, Error)]
pub enum PlistError {
    #[error("document `{name}` cannot be located and has no bundled default")]
    Resolution { name: String },
    #[error("invalid document name {0:?}")]
    InvalidName(String),
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode { path: PathBuf, source: CodecError },
    #[error("failed to encode document: {0}")]
    Encode(#[source] CodecError),
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to copy bundled default {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("document at {} is read-only", .0.display())]
    ReadOnly(PathBuf),
    #[error("no declared field named `{0}`")]
    UnknownField(String),
    #[error("field `{key}` expects {expected}, got {found}")]
    FieldType {
        key: String,
        expected: FieldKind,
        found: ValueKind,
    },
    #[error("background task ended without a result")]
    TaskLost,
}
