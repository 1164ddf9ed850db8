//! [`Value`]: the dynamically typed document value.
//!
//! A document is a [`Dictionary`] whose values form a finite tree of the
//! seven kinds below. There is no null kind: a missing key is how a document
//! says "absent".

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Insertion-ordered string-keyed mapping. The root of every document.
pub type Dictionary = IndexMap<String, Value>;

/// One node of a document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

/// Discriminant of a [`Value`], also used to describe declared field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Real,
    Boolean,
    Date,
    Array,
    Dictionary,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::Array => "array",
            ValueKind::Dictionary => "dictionary",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Real(_) => ValueKind::Real,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Date(_) => ValueKind::Date,
            Value::Array(_) => ValueKind::Array,
            Value::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(map) => Some(map),
            _ => None,
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Real(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Dictionary> for Value {
    fn from(map: Dictionary) -> Self {
        Value::Dictionary(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kind_matches_variant() {
        let date = Utc.with_ymd_and_hms(2014, 5, 1, 12, 0, 0).unwrap();
        let cases = vec![
            (Value::from("x"), ValueKind::String),
            (Value::from(3), ValueKind::Integer),
            (Value::from(0.5), ValueKind::Real),
            (Value::from(true), ValueKind::Boolean),
            (Value::from(date), ValueKind::Date),
            (Value::Array(vec![]), ValueKind::Array),
            (Value::Dictionary(Dictionary::new()), ValueKind::Dictionary),
        ];
        for (value, kind) in cases {
            assert_eq!(value.kind(), kind, "{value:?}");
        }
    }

    #[test]
    fn integer_and_real_are_distinct() {
        assert_ne!(Value::Integer(1), Value::Real(1.0));
        assert_eq!(Value::Integer(1).as_f64(), None);
    }
}
