//! Attribute resolution: routes declared accessors to the backing store.
//!
//! Generated accessors call [`read`] and [`write`] with the field's Rust type
//! and document key. [`FieldDecl`] carries monomorphized copies of the same
//! two functions so a model can also be driven by accessor name at runtime.

use plist_model_value::Value;

use crate::error::PlistError;
use crate::field::{FieldKind, FieldValue};
use crate::store::DocumentStore;

/// Typed read of `key`; absent or incompatible values yield the zero value.
pub fn read<T: FieldValue>(store: &DocumentStore, key: &str) -> T::Read {
    T::finish(store.get(key).and_then(T::coerce))
}

/// Typed write of `key`. `None` removes the key instead of storing a null.
///
/// Returns whether the store changed.
pub fn write<T: FieldValue>(store: &mut DocumentStore, key: &str, value: Option<T>) -> bool {
    match value {
        Some(value) => store.set(key, value.into_stored()),
        None => store.remove(key).is_some(),
    }
}

/// Untyped read through a field's coercion: the stored value converted to
/// the field's type, or `None` when the accessor would return its zero value.
pub fn read_value<T: FieldValue>(store: &DocumentStore, key: &str) -> Option<Value> {
    store
        .get(key)
        .and_then(T::coerce)
        .map(FieldValue::into_stored)
}

/// Untyped write through a field's coercion.
///
/// Fails with [`PlistError::FieldType`] when `value` can't be coerced to the
/// field's type; the store is left untouched in that case.
pub fn write_value<T: FieldValue>(
    store: &mut DocumentStore,
    key: &str,
    value: Option<Value>,
) -> Result<bool, PlistError> {
    let Some(value) = value else {
        return Ok(write::<T>(store, key, None));
    };
    match T::coerce(&value) {
        Some(coerced) => Ok(write(store, key, Some(coerced))),
        None => Err(PlistError::FieldType {
            key: key.to_string(),
            expected: T::KIND,
            found: value.kind(),
        }),
    }
}

pub type ReadFn = fn(&DocumentStore, &str) -> Option<Value>;
pub type WriteFn = fn(&mut DocumentStore, &str, Option<Value>) -> Result<bool, PlistError>;

/// One declared accessor of a model type.
///
/// `key` is the document key, spelled exactly as stored. Keys are never case
/// folded: `name` and `Name` are two different fields.
#[derive(Clone, Copy)]
pub struct FieldDecl {
    pub name: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
    pub read: ReadFn,
    pub write: WriteFn,
}

impl FieldDecl {
    pub const fn new<T: FieldValue>(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            kind: T::KIND,
            read: read_value::<T>,
            write: write_value::<T>,
        }
    }
}

impl std::fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Find a declared accessor by its Rust name, falling back to its document
/// key.
pub fn find_field<'a>(fields: &'a [FieldDecl], name: &str) -> Option<&'a FieldDecl> {
    fields
        .iter()
        .find(|f| f.name == name)
        .or_else(|| fields.iter().find(|f| f.key == name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_key_yields_zero() {
        let store = DocumentStore::new();
        assert_eq!(read::<i32>(&store, "counter"), 0);
        assert_eq!(read::<String>(&store, "name"), "");
        assert!(!read::<bool>(&store, "flag"));
    }

    #[test]
    fn write_none_removes() {
        let mut store = DocumentStore::new();
        write(&mut store, "name", Some("x".to_string()));
        assert_eq!(store.count(), 1);
        assert!(write::<String>(&mut store, "name", None));
        assert_eq!(store.count(), 0);
        assert!(!write::<String>(&mut store, "name", None));
    }

    #[test]
    fn dynamic_write_coerces_or_rejects() {
        let mut store = DocumentStore::new();
        assert!(write_value::<i32>(&mut store, "n", Some(Value::from("12"))).unwrap());
        assert_eq!(store.get("n"), Some(&Value::Integer(12)));

        let err = write_value::<i32>(&mut store, "n", Some(Value::Array(vec![]))).unwrap_err();
        assert!(matches!(err, PlistError::FieldType { expected: FieldKind::Integer, .. }));
        assert_eq!(store.get("n"), Some(&Value::Integer(12)));
    }

    #[test]
    fn dynamic_read_reports_coerced_value() {
        let mut store = DocumentStore::new();
        store.set("flag", "YES");
        assert_eq!(read_value::<bool>(&store, "flag"), Some(Value::Boolean(true)));
        assert_eq!(read_value::<String>(&store, "missing"), None);
    }

    #[test]
    fn find_field_prefers_rust_name_then_key() {
        const FIELDS: &[FieldDecl] = &[
            FieldDecl::new::<String>("name", "Name"),
            FieldDecl::new::<String>("lower_name", "name"),
        ];
        assert_eq!(find_field(FIELDS, "name").map(|f| f.key), Some("Name"));
        assert_eq!(find_field(FIELDS, "lower_name").map(|f| f.key), Some("name"));
        assert_eq!(find_field(FIELDS, "Name").map(|f| f.name), Some("name"));
        assert!(find_field(FIELDS, "other").is_none());
    }
}
