//! Typed, dirty-tracked documents persisted to files.
//!
//! A [`PlistModel`] is an ordered key/value document bound to a file. Model
//! types declared with [`plist_model!`] add typed accessors on top of the
//! same storage, and documents are found by name through a
//! [`DocumentLocator`].
//!
//! ```
//! use plist_model::{plist_model, DirectoryLocator, DocumentModel};
//!
//! plist_model! {
//!     pub struct Counter {
//!         count: i64 = "count",
//!     }
//! }
//!
//! # let dir = tempfile::TempDir::new().unwrap();
//! let locator = DirectoryLocator::new(dir.path());
//!
//! let mut counter = Counter::load("Counter", &locator);
//! counter.set_count(counter.count() + 1);
//! assert!(counter.save());
//! drop(counter);
//!
//! assert_eq!(Counter::load("Counter", &locator).count(), 1);
//! ```

mod background;
mod dirty;
mod error;
mod field;
mod info;
mod loader;
mod locator;
mod macros;
mod model;
mod persist;
pub mod resolver;
mod store;

pub use dirty::DirtyTracker;
pub use error::PlistError;
pub use field::{FieldKind, FieldValue};
pub use info::{InfoPlist, LaunchImage};
pub use loader::{load, load_in_background, try_load, PendingLoad};
pub use locator::{validate_name, DirectoryLocator, DocumentLocator, Location, INFO_DOCUMENT_NAME};
pub use model::{DocumentModel, PlistModel};
pub use persist::PendingSave;
pub use resolver::FieldDecl;
pub use store::{DocumentStore, EnumerationOrder};

pub use plist_model_value::{
    CodecError, DateTime, Dictionary, DocumentCodec, JsonDocumentCodec, Utc, Value, ValueKind,
};

#[doc(hidden)]
pub mod __private {
    pub use paste;
}
