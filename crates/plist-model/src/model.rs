//! [`PlistModel`]: a document, the file it belongs to, and its lifecycle.

use std::future::Future;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plist_model_value::{Dictionary, DocumentCodec, JsonDocumentCodec, Value};

use crate::error::PlistError;
use crate::field::FieldValue;
use crate::locator::Location;
use crate::persist::{read_document, PendingSave, Persistence};
use crate::resolver;
use crate::store::{DocumentStore, EnumerationOrder};

/// An ordered key/value document bound to a file.
///
/// Reads and writes go through the generic map operations below or through
/// typed accessors declared with [`plist_model!`](crate::plist_model). Both
/// share one [`DocumentStore`], so a write through either is visible to the
/// other immediately.
///
/// Dropping a dirty model saves it (best effort, failures are logged). Use
/// [`close`](Self::close) to find out whether that final save worked.
pub struct PlistModel {
    store: DocumentStore,
    persistence: Persistence,
    closed: bool,
}

impl std::fmt::Debug for PlistModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlistModel")
            .field("path", &self.persistence.path())
            .field("read_only", &self.persistence.is_read_only())
            .field("dirty", &self.is_dirty())
            .field("document", self.store.document())
            .finish()
    }
}

impl PlistModel {
    /// An empty, clean model that saves to `path` as JSON.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_document(
            Location::writable(path),
            Arc::new(JsonDocumentCodec::new()),
            Dictionary::new(),
        )
    }

    /// Wrap an already decoded document. The model starts clean.
    pub fn with_document(
        location: Location,
        codec: Arc<dyn DocumentCodec>,
        document: Dictionary,
    ) -> Self {
        let store = DocumentStore::from_document(document);
        let persistence = Persistence::new(
            location.path,
            codec,
            location.read_only,
            store.tracker().ledger(),
        );
        Self {
            store,
            persistence,
            closed: false,
        }
    }

    /// Load the document at `path`. A missing file gives an empty model;
    /// any other failure is returned.
    pub fn try_open(
        path: impl Into<PathBuf>,
        codec: Arc<dyn DocumentCodec>,
    ) -> Result<Self, PlistError> {
        let path = path.into();
        let document = read_document(&path, codec.as_ref())?;
        Ok(Self::with_document(Location::writable(path), codec, document))
    }

    /// Like [`try_open`](Self::try_open), but an unreadable or undecodable
    /// file gives an empty model that will overwrite it on save.
    pub fn open(path: impl Into<PathBuf>, codec: Arc<dyn DocumentCodec>) -> Self {
        let path = path.into();
        match Self::try_open(path.clone(), Arc::clone(&codec)) {
            Ok(model) => model,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "falling back to an empty document");
                Self::with_document(Location::writable(path), codec, Dictionary::new())
            }
        }
    }

    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    pub fn codec(&self) -> &Arc<dyn DocumentCodec> {
        self.persistence.codec()
    }

    /// Models resolved from a bundle-only location, and detached models,
    /// cannot be saved.
    pub fn is_read_only(&self) -> bool {
        self.persistence.is_read_only()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn document(&self) -> &Dictionary {
        self.store.document()
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    // ── Map view ──────────────────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        self.store.set(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.store.remove(key)
    }

    pub fn clear(&mut self) {
        self.store.clear()
    }

    /// Set every entry; returns how many changed the document.
    pub fn extend<I, K, V>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.store.extend(entries)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.store.keys()
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Value> + ExactSizeIterator {
        self.store.values()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Value)> + ExactSizeIterator {
        self.store.iter()
    }

    pub fn all_keys(&self) -> Vec<String> {
        self.store.all_keys()
    }

    pub fn all_values(&self) -> Vec<Value> {
        self.store.all_values()
    }

    pub fn for_each<F>(&self, visitor: F)
    where
        F: FnMut(&str, &Value) -> ControlFlow<()>,
    {
        self.store.for_each(visitor)
    }

    pub fn for_each_with<F>(&self, order: EnumerationOrder, visitor: F)
    where
        F: FnMut(&str, &Value) -> ControlFlow<()>,
    {
        self.store.for_each_with(order, visitor)
    }

    /// Typed read of any key, with the same coercion declared accessors use.
    pub fn get_as<T: FieldValue>(&self, key: &str) -> T::Read {
        resolver::read::<T>(&self.store, key)
    }

    /// Typed write of any key; `None` removes it.
    pub fn set_as<T: FieldValue>(&mut self, key: &str, value: impl Into<Option<T>>) -> bool {
        resolver::write::<T>(&mut self.store, key, value.into())
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Save synchronously. Returns `true` on success; on failure the model
    /// stays dirty so the save can be retried.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(path = %self.path().display(), error = %err, "save failed");
                false
            }
        }
    }

    pub fn try_save(&self) -> Result<(), PlistError> {
        self.persistence
            .write(self.store.document(), self.store.tracker().generation())
    }

    /// Save a snapshot of the current document off the caller's thread.
    ///
    /// The snapshot is taken now: edits made while the save is in flight are
    /// not written and keep the model dirty. Await the returned future for
    /// the result. Inside a tokio runtime the write runs on the blocking
    /// pool, elsewhere on a dedicated thread.
    pub fn save_in_background(&self) -> PendingSave {
        self.persistence.write_in_background(
            self.store.document().clone(),
            self.store.tracker().generation(),
        )
    }

    /// [`save_in_background`](Self::save_in_background), then call
    /// `completion` with the result from whichever task awaits the returned
    /// future.
    pub fn save_in_background_with<F>(&self, completion: F) -> impl Future<Output = ()>
    where
        F: FnOnce(bool),
    {
        let pending = self.save_in_background();
        async move { completion(pending.await) }
    }

    /// Save if dirty and release the model, reporting whether every edit
    /// reached disk. A clean model closes without writing; a dirty read-only
    /// model reports `false`.
    pub fn close(mut self) -> bool {
        self.closed = true;
        !self.is_dirty() || self.save()
    }
}

impl Drop for PlistModel {
    fn drop(&mut self) {
        if self.closed || !self.is_dirty() {
            return;
        }
        if self.is_read_only() {
            tracing::debug!(path = %self.path().display(), "discarding edits to read-only document");
            return;
        }
        if let Err(err) = self.try_save() {
            tracing::warn!(
                path = %self.path().display(),
                error = %err,
                "unsaved changes lost while dropping document"
            );
        }
    }
}

/// A model type declared with [`plist_model!`](crate::plist_model).
///
/// Every declared type is a thin wrapper around a [`PlistModel`], so the
/// loaders, persistence, and map view all come from here.
pub trait DocumentModel: From<PlistModel> + Sized {
    /// The declared accessors, in declaration order.
    const FIELDS: &'static [crate::resolver::FieldDecl];

    fn model(&self) -> &PlistModel;

    fn model_mut(&mut self) -> &mut PlistModel;

    fn into_model(self) -> PlistModel;

    fn field(name: &str) -> Option<&'static crate::resolver::FieldDecl> {
        crate::resolver::find_field(Self::FIELDS, name)
    }

    /// Read a declared accessor by name through its coercion. `Ok(None)`
    /// means the accessor would return its zero value.
    fn field_value(&self, name: &str) -> Result<Option<Value>, PlistError> {
        let decl = Self::field(name).ok_or_else(|| PlistError::UnknownField(name.to_string()))?;
        Ok((decl.read)(self.model().store(), decl.key))
    }

    /// Write a declared accessor by name. `None` removes its key.
    fn set_field_value(&mut self, name: &str, value: Option<Value>) -> Result<bool, PlistError> {
        let decl = Self::field(name).ok_or_else(|| PlistError::UnknownField(name.to_string()))?;
        (decl.write)(self.model_mut().store_mut(), decl.key, value)
    }

    fn load(name: &str, locator: &dyn crate::DocumentLocator) -> Self {
        crate::loader::load(name, locator).into()
    }

    fn try_load(name: &str, locator: &dyn crate::DocumentLocator) -> Result<Self, PlistError> {
        crate::loader::try_load(name, locator).map(Self::from)
    }

    fn load_in_background<L>(name: &str, locator: &L) -> crate::loader::PendingLoad<Self>
    where
        L: crate::DocumentLocator + Clone + 'static,
    {
        crate::loader::load_in_background(name, locator)
    }

    fn open(path: impl Into<PathBuf>, codec: Arc<dyn DocumentCodec>) -> Self {
        PlistModel::open(path, codec).into()
    }

    fn close(self) -> bool {
        self.into_model().close()
    }
}
