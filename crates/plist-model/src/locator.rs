//! Document location: named documents to file paths.
//!
//! A [`DirectoryLocator`] keeps writable documents in one directory and
//! looks up read-only defaults in an ordered list of bundle directories. The
//! first time a writable document is asked for, its bundled default (if any)
//! is copied into the writable directory so later saves never touch the
//! bundle.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plist_model_value::{DocumentCodec, JsonDocumentCodec};

use crate::error::PlistError;

/// Name that, by default, resolves read-only from the bundle only.
pub const INFO_DOCUMENT_NAME: &str = "Info";

/// A resolved document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub read_only: bool,
}

impl Location {
    pub fn writable(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: false,
        }
    }

    pub fn read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: true,
        }
    }

    /// Location of a model with nowhere to persist to.
    pub fn detached() -> Self {
        Self::read_only(PathBuf::new())
    }

    pub fn is_detached(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

/// Resolves document names for the loader.
pub trait DocumentLocator: Send + Sync {
    /// Codec for documents this locator hands out.
    fn codec(&self) -> Arc<dyn DocumentCodec>;

    /// Path `name` would be saved to, or `None` for names that are invalid or
    /// never writable.
    fn writable_path(&self, name: &str) -> Option<PathBuf>;

    /// Read-only default shipped for `name`, if one exists.
    fn default_bundle_path(&self, name: &str) -> Option<PathBuf>;

    /// Resolve `name` to the file to load. A writable location whose file
    /// does not exist yet is a valid result: the document starts empty.
    fn resolve(&self, name: &str) -> Result<Location, PlistError>;

    /// Where a model for `name` lives when loading it failed.
    fn fallback(&self, name: &str) -> Location {
        self.writable_path(name)
            .map(Location::writable)
            .unwrap_or_else(Location::detached)
    }
}

/// Reject names that could escape the document directories.
pub fn validate_name(name: &str) -> Result<(), PlistError> {
    let bad = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.chars().any(char::is_control);
    if bad {
        return Err(PlistError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DirectoryLocator {
    writable_dir: PathBuf,
    bundle_dirs: Vec<PathBuf>,
    read_only_names: Vec<String>,
    codec: Arc<dyn DocumentCodec>,
}

impl std::fmt::Debug for DirectoryLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryLocator")
            .field("writable_dir", &self.writable_dir)
            .field("bundle_dirs", &self.bundle_dirs)
            .field("read_only_names", &self.read_only_names)
            .field("codec", &self.codec.id())
            .finish()
    }
}

impl DirectoryLocator {
    /// Documents are saved under `writable_dir`, encoded as JSON. `Info` is
    /// read-only.
    pub fn new(writable_dir: impl Into<PathBuf>) -> Self {
        Self {
            writable_dir: writable_dir.into(),
            bundle_dirs: Vec::new(),
            read_only_names: vec![INFO_DOCUMENT_NAME.to_string()],
            codec: Arc::new(JsonDocumentCodec::new()),
        }
    }

    /// Add a directory searched for bundled defaults, after the ones already
    /// added.
    pub fn with_bundle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundle_dirs.push(dir.into());
        self
    }

    /// Resolve `name` from the bundle only and refuse to save it.
    pub fn with_read_only_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.read_only_names.contains(&name) {
            self.read_only_names.push(name);
        }
        self
    }

    /// Make every name writable, including `Info`.
    pub fn without_read_only_names(mut self) -> Self {
        self.read_only_names.clear();
        self
    }

    pub fn with_codec(mut self, codec: impl DocumentCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        self.read_only_names.iter().any(|n| n == name)
    }

    fn file_name(&self, name: &str) -> String {
        format!("{name}.{}", self.codec.extension())
    }

    fn copy_default(&self, from: &Path, to: &Path) -> Result<(), PlistError> {
        let copy = || -> std::io::Result<()> {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(from, to)?;
            Ok(())
        };
        copy().map_err(|source| PlistError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;
        tracing::debug!(from = %from.display(), to = %to.display(), "copied bundled default");
        Ok(())
    }
}

impl DocumentLocator for DirectoryLocator {
    fn codec(&self) -> Arc<dyn DocumentCodec> {
        Arc::clone(&self.codec)
    }

    fn writable_path(&self, name: &str) -> Option<PathBuf> {
        if validate_name(name).is_err() || self.is_read_only(name) {
            return None;
        }
        Some(self.writable_dir.join(self.file_name(name)))
    }

    fn default_bundle_path(&self, name: &str) -> Option<PathBuf> {
        validate_name(name).ok()?;
        let file = self.file_name(name);
        self.bundle_dirs
            .iter()
            .map(|dir| dir.join(&file))
            .find(|path| path.is_file())
    }

    fn resolve(&self, name: &str) -> Result<Location, PlistError> {
        validate_name(name)?;
        if self.is_read_only(name) {
            return self
                .default_bundle_path(name)
                .map(Location::read_only)
                .ok_or_else(|| PlistError::Resolution {
                    name: name.to_string(),
                });
        }
        let writable = self.writable_dir.join(self.file_name(name));
        if writable.exists() {
            return Ok(Location::writable(writable));
        }
        if let Some(default) = self.default_bundle_path(name) {
            self.copy_default(&default, &writable)?;
        }
        Ok(Location::writable(writable))
    }
}
