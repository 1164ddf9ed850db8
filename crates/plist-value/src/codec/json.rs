//! JSON document codec.
//!
//! JSON has no date type, so dates use the Extended JSON convention: a
//! dictionary with the single key `$date` holding an RFC 3339 string.
//! Encoding refuses anything that would not read back as written: a
//! dictionary shaped like that wrapper, and dates outside years 0000-9999,
//! which RFC 3339 cannot spell.
//! Reals are written by `serde_json` with a fraction or exponent (`3.0`,
//! `1e300`), which keeps them distinct from integers on the way back in.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde_json::{Map, Number};

use super::path::Path;
use super::types::{CodecError, DocumentCodec};
use crate::{Dictionary, Value};

/// Key of the single-member object that carries a date.
pub const DATE_KEY: &str = "$date";

/// Years an RFC 3339 timestamp can carry.
const RFC3339_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

#[derive(Debug, Clone, Default)]
pub struct JsonDocumentCodec {
    pretty: bool,
}

impl JsonDocumentCodec {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Codec that writes indented, human-editable output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

}

impl DocumentCodec for JsonDocumentCodec {
    fn id(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, document: &Dictionary) -> Result<Vec<u8>, CodecError> {
        let mut path = Path::default();
        let root = serde_json::Value::Object(encode_dictionary(document, &mut path)?);
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&root)?
        } else {
            serde_json::to_vec(&root)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Dictionary, CodecError> {
        let root: serde_json::Value = serde_json::from_slice(bytes)?;
        let mut path = Path::default();
        match root {
            serde_json::Value::Object(map) => decode_dictionary(map, &mut path),
            other => Err(CodecError::InvalidRoot(json_type_name(&other))),
        }
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────

fn encode_dictionary(
    map: &Dictionary,
    path: &mut Path,
) -> Result<Map<String, serde_json::Value>, CodecError> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        path.push_key(key);
        let encoded = encode_value(value, path)?;
        path.pop();
        out.insert(key.clone(), encoded);
    }
    Ok(out)
}

fn encode_value(value: &Value, path: &mut Path) -> Result<serde_json::Value, CodecError> {
    Ok(match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(n) => serde_json::Value::Number(Number::from(*n)),
        Value::Real(n) => match Number::from_f64(*n) {
            Some(num) => serde_json::Value::Number(num),
            None => {
                return Err(CodecError::NonFiniteReal {
                    path: path.render(),
                })
            }
        },
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Date(d) => {
            if !RFC3339_YEARS.contains(&d.year()) {
                return Err(CodecError::DateOutOfRange {
                    path: path.render(),
                    year: d.year(),
                });
            }
            let mut wrapper = Map::with_capacity(1);
            wrapper.insert(
                DATE_KEY.to_string(),
                serde_json::Value::String(d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            );
            serde_json::Value::Object(wrapper)
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                out.push(encode_value(item, path)?);
                path.pop();
            }
            serde_json::Value::Array(out)
        }
        Value::Dictionary(map) => {
            if looks_like_date(map) {
                return Err(CodecError::ReservedDateKey {
                    path: path.render(),
                });
            }
            serde_json::Value::Object(encode_dictionary(map, path)?)
        }
    })
}

/// A nested dictionary that `decode_value` would take for a date wrapper.
fn looks_like_date(map: &Dictionary) -> bool {
    map.len() == 1 && matches!(map.get(DATE_KEY), Some(Value::String(_)))
}

// ── Decoding ──────────────────────────────────────────────────────────────

fn decode_dictionary(
    map: Map<String, serde_json::Value>,
    path: &mut Path,
) -> Result<Dictionary, CodecError> {
    let mut out = Dictionary::with_capacity(map.len());
    for (key, value) in map {
        // Documents written by other tools may carry explicit nulls; a
        // dictionary member set to null is the same as a missing member.
        if value.is_null() {
            continue;
        }
        path.push_key(&key);
        let decoded = decode_value(value, path)?;
        path.pop();
        out.insert(key, decoded);
    }
    Ok(out)
}

fn decode_value(value: serde_json::Value, path: &mut Path) -> Result<Value, CodecError> {
    Ok(match value {
        serde_json::Value::Null => {
            return Err(CodecError::Null {
                path: path.render(),
            })
        }
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            // u64 beyond i64::MAX and every float land here.
            None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                path.push_index(i);
                out.push(decode_value(item, path)?);
                path.pop();
            }
            Value::Array(out)
        }
        serde_json::Value::Object(map) => match date_member(&map) {
            Some(text) => Value::Date(parse_date(text, path)?),
            None => Value::Dictionary(decode_dictionary(map, path)?),
        },
    })
}

fn date_member(map: &Map<String, serde_json::Value>) -> Option<&str> {
    if map.len() != 1 {
        return None;
    }
    map.get(DATE_KEY).and_then(serde_json::Value::as_str)
}

fn parse_date(text: &str, path: &Path) -> Result<DateTime<Utc>, CodecError> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| CodecError::InvalidDate {
            path: path.render(),
            value: text.to_string(),
        })
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decode(text: &str) -> Result<Dictionary, CodecError> {
        JsonDocumentCodec::new().decode(text.as_bytes())
    }

    #[test]
    fn decodes_scalars_by_kind() {
        let doc = decode(r#"{"s":"x","i":3,"r":3.0,"b":true}"#).unwrap();
        assert_eq!(doc["s"], Value::String("x".into()));
        assert_eq!(doc["i"], Value::Integer(3));
        assert_eq!(doc["r"], Value::Real(3.0));
        assert_eq!(doc["b"], Value::Boolean(true));
    }

    #[test]
    fn preserves_member_order() {
        let doc = decode(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn decodes_date_wrapper() {
        let doc = decode(r#"{"d":{"$date":"2014-05-01T12:30:00Z"}}"#).unwrap();
        let expected = Utc.with_ymd_and_hms(2014, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(doc["d"], Value::Date(expected));
    }

    #[test]
    fn date_key_with_siblings_is_a_dictionary() {
        let doc = decode(r#"{"d":{"$date":"2014-05-01T12:30:00Z","x":1}}"#).unwrap();
        assert_eq!(doc["d"].kind(), crate::ValueKind::Dictionary);
    }

    #[test]
    fn rejects_malformed_date() {
        let err = decode(r#"{"a":[{"$date":"yesterday"}]}"#).unwrap_err();
        match err {
            CodecError::InvalidDate { path, value } => {
                assert_eq!(path, "/a/0");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn drops_null_members_but_rejects_null_items() {
        let doc = decode(r#"{"a":null,"b":1}"#).unwrap();
        assert_eq!(doc.len(), 1);
        assert!(matches!(
            decode(r#"{"a":[1,null]}"#),
            Err(CodecError::Null { .. })
        ));
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(decode("[1,2]"), Err(CodecError::InvalidRoot("array"))));
        assert!(matches!(decode("not json"), Err(CodecError::Json(_))));
        assert!(matches!(decode(""), Err(CodecError::Json(_))));
    }

    #[test]
    fn refuses_non_finite_reals() {
        let mut doc = Dictionary::new();
        doc.insert("bad".to_string(), Value::Real(f64::INFINITY));
        let err = JsonDocumentCodec::new().encode(&doc).unwrap_err();
        assert!(matches!(err, CodecError::NonFiniteReal { ref path } if path == "/bad"));
    }

    #[test]
    fn refuses_dictionary_shaped_like_a_date() {
        let mut meta = Dictionary::new();
        meta.insert(DATE_KEY.to_string(), Value::from("not a date"));
        let mut doc = Dictionary::new();
        doc.insert("meta".to_string(), Value::Dictionary(meta.clone()));
        let err = JsonDocumentCodec::new().encode(&doc).unwrap_err();
        assert!(matches!(err, CodecError::ReservedDateKey { ref path } if path == "/meta"));

        // Any sibling, or a non-string member, keeps it a plain dictionary.
        meta.insert("x".to_string(), Value::Integer(1));
        doc.insert("meta".to_string(), Value::Dictionary(meta));
        let codec = JsonDocumentCodec::new();
        assert_eq!(codec.decode(&codec.encode(&doc).unwrap()).unwrap(), doc);

        let mut numeric = Dictionary::new();
        numeric.insert(DATE_KEY.to_string(), Value::Integer(5));
        doc.insert("meta".to_string(), Value::Dictionary(numeric));
        assert_eq!(codec.decode(&codec.encode(&doc).unwrap()).unwrap(), doc);
    }

    #[test]
    fn refuses_dates_rfc3339_cannot_spell() {
        let codec = JsonDocumentCodec::new();
        for year in [10000, -1] {
            let mut doc = Dictionary::new();
            let date = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
            doc.insert("when".to_string(), Value::Array(vec![Value::Date(date)]));
            let err = codec.encode(&doc).unwrap_err();
            assert!(
                matches!(err, CodecError::DateOutOfRange { ref path, year: y } if path == "/when/0" && y == year),
                "{err:?}"
            );
        }

        let mut doc = Dictionary::new();
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        doc.insert("when".to_string(), Value::Date(last));
        assert_eq!(codec.decode(&codec.encode(&doc).unwrap()).unwrap(), doc);
    }

    #[test]
    fn real_keeps_its_kind_through_text() {
        let mut doc = Dictionary::new();
        doc.insert("r".to_string(), Value::Real(4.0));
        let bytes = JsonDocumentCodec::new().encode(&doc).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"r":4.0}"#);
    }

    #[test]
    fn pretty_output_is_indented() {
        let mut doc = Dictionary::new();
        doc.insert("a".to_string(), Value::Integer(1));
        let bytes = JsonDocumentCodec::pretty().encode(&doc).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "{\n  \"a\": 1\n}");
    }
}
