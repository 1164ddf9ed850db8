//! Loader: named document → populated model, synchronously or off-thread.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use plist_model_value::{Dictionary, DocumentCodec};
use tokio::sync::oneshot;

use crate::background::spawn_io;
use crate::error::PlistError;
use crate::locator::{DocumentLocator, Location};
use crate::model::PlistModel;
use crate::persist::read_document;

/// Resolve, read and decode `name`; any failure is returned.
pub fn try_load(name: &str, locator: &dyn DocumentLocator) -> Result<PlistModel, PlistError> {
    let location = locator.resolve(name)?;
    let codec = locator.codec();
    let document = read_document(&location.path, codec.as_ref())?;
    tracing::debug!(
        name,
        path = %location.path.display(),
        read_only = location.read_only,
        keys = document.len(),
        "document loaded"
    );
    Ok(PlistModel::with_document(location, codec, document))
}

/// Like [`try_load`], but a document that can't be located or decoded gives
/// an empty, clean model at the locator's fallback location.
pub fn load(name: &str, locator: &dyn DocumentLocator) -> PlistModel {
    match try_load(name, locator) {
        Ok(model) => model,
        Err(err) => {
            tracing::warn!(name, error = %err, "falling back to an empty document");
            empty_model(locator.fallback(name), locator.codec())
        }
    }
}

/// Run [`load`] off the caller's thread. The returned future resolves, in
/// the awaiting task, to the model converted into `M`.
pub fn load_in_background<M, L>(name: &str, locator: &L) -> PendingLoad<M>
where
    M: From<PlistModel>,
    L: DocumentLocator + Clone + 'static,
{
    let fallback = (locator.fallback(name), locator.codec());
    let name = name.to_string();
    let locator = locator.clone();
    let rx = spawn_io(move || load(&name, &locator));
    PendingLoad {
        rx,
        fallback: Some(fallback),
        _model: PhantomData,
    }
}

fn empty_model(location: Location, codec: Arc<dyn DocumentCodec>) -> PlistModel {
    PlistModel::with_document(location, codec, Dictionary::new())
}

/// A background load in flight.
///
/// Always resolves to a usable model: if the background work is lost, the
/// result is the same empty model [`load`] falls back to.
pub struct PendingLoad<M = PlistModel> {
    rx: oneshot::Receiver<PlistModel>,
    fallback: Option<(Location, Arc<dyn DocumentCodec>)>,
    _model: PhantomData<fn() -> M>,
}

impl<M: From<PlistModel>> Future for PendingLoad<M> {
    type Output = M;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<M> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(model)) => Poll::Ready(M::from(model)),
            Poll::Ready(Err(_)) => {
                tracing::warn!(error = %PlistError::TaskLost, "background load lost");
                let model = match self.fallback.take() {
                    Some((location, codec)) => empty_model(location, codec),
                    None => PlistModel::with_document(
                        Location::detached(),
                        Arc::new(plist_model_value::JsonDocumentCodec::new()),
                        Dictionary::new(),
                    ),
                };
                Poll::Ready(M::from(model))
            }
        }
    }
}

impl PlistModel {
    /// Load the document called `name`. Never fails: a document that can't
    /// be located or decoded gives an empty model.
    pub fn load(name: &str, locator: &dyn DocumentLocator) -> PlistModel {
        load(name, locator)
    }

    pub fn try_load(name: &str, locator: &dyn DocumentLocator) -> Result<PlistModel, PlistError> {
        try_load(name, locator)
    }

    pub fn load_in_background<L>(name: &str, locator: &L) -> PendingLoad<PlistModel>
    where
        L: DocumentLocator + Clone + 'static,
    {
        load_in_background(name, locator)
    }
}
