//! Persistence controller: encode, write atomically, mark clean.

use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use plist_model_value::{Dictionary, DocumentCodec};
use tokio::sync::oneshot;

use crate::background::spawn_io;
use crate::dirty::SaveLedger;
use crate::error::PlistError;

/// Where and how one model's document is written.
#[derive(Clone)]
pub(crate) struct Persistence {
    path: PathBuf,
    codec: Arc<dyn DocumentCodec>,
    read_only: bool,
    ledger: Arc<SaveLedger>,
}

impl Persistence {
    pub(crate) fn new(
        path: PathBuf,
        codec: Arc<dyn DocumentCodec>,
        read_only: bool,
        ledger: Arc<SaveLedger>,
    ) -> Self {
        Self {
            path,
            codec,
            read_only,
            ledger,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn codec(&self) -> &Arc<dyn DocumentCodec> {
        &self.codec
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Write `document` as generation `generation`.
    ///
    /// Writes of one document are serialized. A snapshot no newer than what
    /// is already on disk is skipped and reported as success, which covers
    /// both a clean model and a background save overtaken by a later one.
    /// A read-only document only fails once it has unsaved edits.
    pub(crate) fn write(&self, document: &Dictionary, generation: u64) -> Result<(), PlistError> {
        if self.read_only {
            return self.refuse_edits(generation);
        }
        let _guard = self.ledger.lock_writes();
        if self.ledger.saved() >= generation && self.path.exists() {
            tracing::debug!(path = %self.path.display(), generation, "document already up to date");
            return Ok(());
        }
        let bytes = self.codec.encode(document).map_err(PlistError::Encode)?;
        write_atomically(&self.path, &bytes).map_err(|source| PlistError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.ledger.mark_saved(generation);
        tracing::debug!(
            path = %self.path.display(),
            generation,
            bytes = bytes.len(),
            "document written"
        );
        Ok(())
    }

    fn refuse_edits(&self, generation: u64) -> Result<(), PlistError> {
        if self.ledger.saved() >= generation {
            Ok(())
        } else {
            Err(PlistError::ReadOnly(self.path.clone()))
        }
    }

    /// Start writing a snapshot off the caller's thread.
    pub(crate) fn write_in_background(&self, snapshot: Dictionary, generation: u64) -> PendingSave {
        if self.read_only {
            return PendingSave::ready(self.refuse_edits(generation));
        }
        let this = self.clone();
        let rx = spawn_io(move || this.write(&snapshot, generation));
        PendingSave {
            state: PendingState::Running(rx),
            path: self.path.clone(),
        }
    }
}

/// Replace `path` with `bytes` so that readers see either the old file or
/// the complete new one.
///
/// The bytes go to a temporary file next to the target, are synced, and the
/// temporary is renamed over the target. Parent directories are created as
/// needed. On failure the temporary is removed when it drops.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".plist-model-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Read and decode the document at `path`. A missing file is an empty
/// document, not an error.
pub(crate) fn read_document(path: &Path, codec: &dyn DocumentCodec) -> Result<Dictionary, PlistError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no document on disk, starting empty");
            return Ok(Dictionary::new());
        }
        Err(source) => {
            return Err(PlistError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    codec.decode(&bytes).map_err(|source| PlistError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

// ── PendingSave ───────────────────────────────────────────────────────────

enum PendingState {
    Ready(Option<Result<(), PlistError>>),
    Running(oneshot::Receiver<Result<(), PlistError>>),
}

/// A background save in flight. Resolves to `true` on success.
///
/// The work is not tied to this value: dropping it without awaiting still
/// lets the write finish and mark the snapshot clean.
pub struct PendingSave {
    state: PendingState,
    path: PathBuf,
}

impl PendingSave {
    fn ready(result: Result<(), PlistError>) -> Self {
        let path = match &result {
            Err(PlistError::ReadOnly(path)) => path.clone(),
            _ => PathBuf::new(),
        };
        Self {
            state: PendingState::Ready(Some(result)),
            path,
        }
    }

    /// Wait for the save and return the error instead of a flag.
    pub async fn into_result(self) -> Result<(), PlistError> {
        match self.state {
            PendingState::Ready(result) => result.unwrap_or(Ok(())),
            PendingState::Running(rx) => rx.await.unwrap_or(Err(PlistError::TaskLost)),
        }
    }
}

impl Future for PendingSave {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        let result = match &mut self.state {
            PendingState::Ready(result) => result.take().unwrap_or(Ok(())),
            PendingState::Running(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(received) => received.unwrap_or(Err(PlistError::TaskLost)),
            },
        };
        match result {
            Ok(()) => Poll::Ready(true),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "background save failed");
                Poll::Ready(false)
            }
        }
    }
}
