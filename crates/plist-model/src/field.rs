//! Typed views of document values.
//!
//! [`FieldValue`] is the per-type coercion used by declared accessors. Every
//! coercion is total: a stored value either converts, or the accessor
//! behaves as if the key were absent and returns the type's zero value.
//!
//! | Rust type        | Accepts stored                       | Zero          |
//! |------------------|--------------------------------------|---------------|
//! | integers         | integer, real, boolean, string       | `0`           |
//! | `f32` / `f64`    | real, integer, boolean, string       | `0.0`         |
//! | `bool`           | boolean, integer, real, string       | `false`       |
//! | `String`         | string                               | `""`          |
//! | `DateTime<Utc>`  | date                                 | `None`        |
//! | `Vec<Value>`     | array                                | `[]`          |
//! | `Dictionary`     | dictionary                           | `{}`          |
//! | `Value`          | anything                             | `None`        |
//!
//! Numeric and boolean fields are lenient because documents written by other
//! tools don't always agree with the declared types; structured fields are
//! not.

use plist_model_value::{DateTime, Dictionary, Utc, Value};

/// Declared type of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Real,
    Boolean,
    Date,
    Array,
    Dictionary,
    /// Any stored kind, returned as-is.
    Any,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Real => "real",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Array => "array",
            FieldKind::Dictionary => "dictionary",
            FieldKind::Any => "any",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Rust type that a declared accessor can read and write.
pub trait FieldValue: Sized {
    const KIND: FieldKind;

    /// What the getter returns: `Self` for types with a natural zero value,
    /// `Option<Self>` otherwise.
    type Read;

    /// Convert a stored value, or `None` if it has an incompatible kind.
    fn coerce(stored: &Value) -> Option<Self>;

    /// Fill in the zero value for an absent or incompatible key.
    fn finish(coerced: Option<Self>) -> Self::Read;

    fn into_stored(self) -> Value;
}

// ── Scalar parsing ────────────────────────────────────────────────────────

fn parse_i64(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    text.parse::<f64>().ok().and_then(real_to_i64)
}

fn real_to_i64(n: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if n.is_finite() && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n.trunc() as i64)
    } else {
        None
    }
}

/// Leading `y`/`t` (any case) is true; otherwise the sign and leading zeros
/// are skipped and a non-zero digit means true.
fn parse_bool(text: &str) -> bool {
    let text = text.trim_start();
    match text.chars().next() {
        Some('y' | 'Y' | 't' | 'T') => true,
        _ => text
            .trim_start_matches(['+', '-'])
            .trim_start_matches('0')
            .starts_with(|c: char| ('1'..='9').contains(&c)),
    }
}

fn stored_i64(stored: &Value) -> Option<i64> {
    match stored {
        Value::Integer(n) => Some(*n),
        Value::Real(n) => real_to_i64(*n),
        Value::Boolean(b) => Some(i64::from(*b)),
        Value::String(s) => parse_i64(s),
        _ => None,
    }
}

fn stored_f64(stored: &Value) -> Option<f64> {
    match stored {
        Value::Real(n) => Some(*n),
        Value::Integer(n) => Some(*n as f64),
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ── Implementations ───────────────────────────────────────────────────────

macro_rules! integer_field {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            const KIND: FieldKind = FieldKind::Integer;
            type Read = $ty;

            fn coerce(stored: &Value) -> Option<Self> {
                stored_i64(stored).and_then(|n| <$ty>::try_from(n).ok())
            }

            fn finish(coerced: Option<Self>) -> Self::Read {
                coerced.unwrap_or(0)
            }

            fn into_stored(self) -> Value {
                // Values past i64::MAX only exist for u64; store them as reals
                // rather than wrapping.
                match i64::try_from(self) {
                    Ok(n) => Value::Integer(n),
                    Err(_) => Value::Real(self as f64),
                }
            }
        }
    )*};
}

integer_field!(i32, i64, u32, u64);

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::Real;
    type Read = f64;

    fn coerce(stored: &Value) -> Option<Self> {
        stored_f64(stored)
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced.unwrap_or(0.0)
    }

    fn into_stored(self) -> Value {
        Value::Real(self)
    }
}

impl FieldValue for f32 {
    const KIND: FieldKind = FieldKind::Real;
    type Read = f32;

    fn coerce(stored: &Value) -> Option<Self> {
        stored_f64(stored).map(|n| n as f32)
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced.unwrap_or(0.0)
    }

    fn into_stored(self) -> Value {
        Value::Real(f64::from(self))
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;
    type Read = bool;

    fn coerce(stored: &Value) -> Option<Self> {
        match stored {
            Value::Boolean(b) => Some(*b),
            Value::Integer(n) => Some(*n != 0),
            Value::Real(n) => Some(*n != 0.0),
            Value::String(s) => Some(parse_bool(s)),
            _ => None,
        }
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced.unwrap_or(false)
    }

    fn into_stored(self) -> Value {
        Value::Boolean(self)
    }
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::String;
    type Read = String;

    fn coerce(stored: &Value) -> Option<Self> {
        stored.as_str().map(str::to_string)
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced.unwrap_or_default()
    }

    fn into_stored(self) -> Value {
        Value::String(self)
    }
}

impl FieldValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Date;
    type Read = Option<DateTime<Utc>>;

    fn coerce(stored: &Value) -> Option<Self> {
        stored.as_date().copied()
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced
    }

    fn into_stored(self) -> Value {
        Value::Date(self)
    }
}

impl FieldValue for Vec<Value> {
    const KIND: FieldKind = FieldKind::Array;
    type Read = Vec<Value>;

    fn coerce(stored: &Value) -> Option<Self> {
        stored.as_array().cloned()
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced.unwrap_or_default()
    }

    fn into_stored(self) -> Value {
        Value::Array(self)
    }
}

impl FieldValue for Dictionary {
    const KIND: FieldKind = FieldKind::Dictionary;
    type Read = Dictionary;

    fn coerce(stored: &Value) -> Option<Self> {
        stored.as_dictionary().cloned()
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced.unwrap_or_default()
    }

    fn into_stored(self) -> Value {
        Value::Dictionary(self)
    }
}

impl FieldValue for Value {
    const KIND: FieldKind = FieldKind::Any;
    type Read = Option<Value>;

    fn coerce(stored: &Value) -> Option<Self> {
        Some(stored.clone())
    }

    fn finish(coerced: Option<Self>) -> Self::Read {
        coerced
    }

    fn into_stored(self) -> Value {
        self
    }
}
