/// Declare a model type with typed accessors over a [`PlistModel`].
///
/// Each `field: Type = "Key"` line generates a getter `field()` returning
/// [`FieldValue::Read`](crate::FieldValue::Read) and a setter `set_field()`
/// taking the value or `None` (which removes `Key`). The type derefs to
/// [`PlistModel`], so the map operations and persistence are available
/// directly.
///
/// ```
/// use plist_model::{plist_model, DocumentModel, PlistModel, Value};
///
/// plist_model! {
///     /// Per-user preferences.
///     pub struct Settings {
///         /// Number of launches so far.
///         launches: i64 = "launches",
///         user_name: String = "UserName",
///     }
/// }
///
/// # let dir = tempfile::TempDir::new().unwrap();
/// let mut settings = Settings::from(PlistModel::new(dir.path().join("settings.json")));
/// settings.set_launches(settings.launches() + 1);
/// assert_eq!(settings.get("launches"), Some(&Value::Integer(1)));
/// assert_eq!(settings.user_name(), "");
/// assert_eq!(Settings::FIELDS.len(), 2);
/// assert!(settings.close());
/// ```
///
/// [`PlistModel`]: crate::PlistModel
#[macro_export]
macro_rules! plist_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty = $key:literal
            ),* $(,)?
        }
    ) => {
        $crate::__private::paste::paste! {
            $(#[$meta])*
            $vis struct $name {
                inner: $crate::PlistModel,
            }

            impl $name {
                $(
                    $(#[$fmeta])*
                    pub fn $field(&self) -> <$ty as $crate::FieldValue>::Read {
                        $crate::resolver::read::<$ty>(self.inner.store(), $key)
                    }

                    pub fn [<set_ $field>](
                        &mut self,
                        value: impl ::core::convert::Into<::core::option::Option<$ty>>,
                    ) -> bool {
                        $crate::resolver::write::<$ty>(self.inner.store_mut(), $key, value.into())
                    }
                )*

                /// Save if dirty and release the model, reporting whether
                /// every edit reached disk.
                pub fn close(self) -> bool {
                    self.inner.close()
                }

                pub fn into_model(self) -> $crate::PlistModel {
                    self.inner
                }
            }

            impl $crate::DocumentModel for $name {
                const FIELDS: &'static [$crate::FieldDecl] = &[
                    $( $crate::FieldDecl::new::<$ty>(::core::stringify!($field), $key), )*
                ];

                fn model(&self) -> &$crate::PlistModel {
                    &self.inner
                }

                fn model_mut(&mut self) -> &mut $crate::PlistModel {
                    &mut self.inner
                }

                fn into_model(self) -> $crate::PlistModel {
                    self.inner
                }
            }

            impl ::core::convert::From<$crate::PlistModel> for $name {
                fn from(inner: $crate::PlistModel) -> Self {
                    Self { inner }
                }
            }

            impl ::core::ops::Deref for $name {
                type Target = $crate::PlistModel;

                fn deref(&self) -> &$crate::PlistModel {
                    &self.inner
                }
            }

            impl ::core::ops::DerefMut for $name {
                fn deref_mut(&mut self) -> &mut $crate::PlistModel {
                    &mut self.inner
                }
            }

            impl ::core::fmt::Debug for $name {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.debug_struct(::core::stringify!($name))
                        .field("path", &self.inner.path())
                        .field("dirty", &self.inner.is_dirty())
                        $( .field(::core::stringify!($field), &self.$field()) )*
                        .finish()
                }
            }
        }
    };
}
