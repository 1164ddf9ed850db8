use std::ops::ControlFlow;

use chrono::{TimeZone, Utc};
use plist_model::{
    plist_model, DateTime, Dictionary, DocumentModel, EnumerationOrder, FieldKind, PlistError,
    PlistModel, Value,
};
use tempfile::TempDir;

plist_model! {
    /// Every supported accessor type, plus two keys that differ only in case.
    pub struct CustomModel {
        name: String = "name",
        upper_name: String = "Name",
        count: i64 = "count",
        small: i32 = "small",
        unsigned: u32 = "unsigned",
        ratio: f64 = "ratio",
        enabled: bool = "enabled",
        created: DateTime<Utc> = "created",
        tags: Vec<Value> = "tags",
        extra: Dictionary = "extra",
        anything: Value = "anything",
    }
}

fn model(dir: &TempDir) -> CustomModel {
    CustomModel::from(PlistModel::new(dir.path().join("custom.json")))
}

#[test]
fn map_writes_are_visible_through_accessors() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.set("Name", "X");
    assert_eq!(m.upper_name(), "X");
    m.set("count", 12);
    assert_eq!(m.count(), 12);
    m.set("tags", vec![Value::from("a")]);
    assert_eq!(m.tags(), vec![Value::from("a")]);
}

#[test]
fn accessor_writes_are_visible_through_map() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.set_upper_name("Y".to_string());
    assert_eq!(m.get("Name"), Some(&Value::from("Y")));
    m.set_enabled(true);
    assert_eq!(m.get("enabled"), Some(&Value::Boolean(true)));
    let when = Utc.with_ymd_and_hms(2014, 5, 1, 12, 0, 0).unwrap();
    m.set_created(when);
    assert_eq!(m.get("created"), Some(&Value::Date(when)));
    m.set_anything(Value::Real(0.5));
    assert_eq!(m.get("anything"), Some(&Value::Real(0.5)));
}

#[test]
fn never_set_accessors_return_zero_values() {
    let dir = TempDir::new().unwrap();
    let m = model(&dir);
    assert_eq!(m.name(), "");
    assert_eq!(m.count(), 0);
    assert_eq!(m.small(), 0);
    assert_eq!(m.unsigned(), 0);
    assert_eq!(m.ratio(), 0.0);
    assert!(!m.enabled());
    assert_eq!(m.created(), None);
    assert!(m.tags().is_empty());
    assert!(m.extra().is_empty());
    assert_eq!(m.anything(), None);
    assert!(!m.is_dirty());
}

#[test]
fn writing_none_removes_the_key() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.set_name("n".to_string());
    m.set_count(1);
    // The declared `count` accessor shadows the map's count.
    assert_eq!(m.model().count(), 2);

    assert!(m.set_name(None));
    assert_eq!(m.get("name"), None);
    assert_eq!(m.model().count(), 1);
    assert!(!m.set_name(None));
    assert_eq!(m.model().count(), 1);
}

#[test]
fn case_distinct_keys_stay_distinct() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.set_name("lower".to_string());
    m.set_upper_name("upper".to_string());
    assert_eq!(m.name(), "lower");
    assert_eq!(m.upper_name(), "upper");
    assert_eq!(m.all_keys(), ["name", "Name"]);
}

#[test]
fn scalar_accessors_coerce_foreign_representations() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.extend([
        ("count", Value::from("42")),
        ("small", Value::Real(3.9)),
        ("unsigned", Value::Integer(-5)),
        ("ratio", Value::from("0.25")),
        ("enabled", Value::from("YES")),
    ]);
    assert_eq!(m.count(), 42);
    assert_eq!(m.small(), 3);
    assert_eq!(m.unsigned(), 0);
    assert_eq!(m.ratio(), 0.25);
    assert!(m.enabled());

    m.set("enabled", 0);
    assert!(!m.enabled());
    m.set("ratio", true);
    assert_eq!(m.ratio(), 1.0);
}

#[test]
fn structured_accessors_treat_wrong_kinds_as_absent() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.extend([
        ("name", Value::Integer(5)),
        ("created", Value::from("2014-05-01T12:00:00Z")),
        ("tags", Value::from("a,b")),
        ("extra", Value::Array(vec![])),
    ]);
    assert_eq!(m.name(), "");
    assert_eq!(m.created(), None);
    assert!(m.tags().is_empty());
    assert!(m.extra().is_empty());
    // Reading never rewrites the stored value.
    assert_eq!(m.get("name"), Some(&Value::Integer(5)));
}

#[test]
fn dynamic_access_by_accessor_name_or_key() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);

    assert!(m.set_field_value("upper_name", Some(Value::from("by name"))).unwrap());
    assert_eq!(m.field_value("Name").unwrap(), Some(Value::from("by name")));
    assert_eq!(m.field_value("name").unwrap(), None);

    assert!(m.set_field_value("count", Some(Value::from("7"))).unwrap());
    assert_eq!(m.get("count"), Some(&Value::Integer(7)));

    let err = m
        .set_field_value("tags", Some(Value::from("not a list")))
        .unwrap_err();
    assert!(matches!(
        err,
        PlistError::FieldType { expected: FieldKind::Array, .. }
    ));

    assert!(m.set_field_value("count", None).unwrap());
    assert!(!m.contains_key("count"));

    assert!(matches!(
        m.set_field_value("nope", None),
        Err(PlistError::UnknownField(_))
    ));
}

#[test]
fn field_table_describes_every_accessor() {
    let kinds: Vec<_> = CustomModel::FIELDS.iter().map(|f| (f.key, f.kind)).collect();
    assert_eq!(kinds.len(), 11);
    assert_eq!(kinds[0], ("name", FieldKind::String));
    assert_eq!(kinds[1], ("Name", FieldKind::String));
    assert_eq!(kinds[7], ("created", FieldKind::Date));
    assert_eq!(kinds[10], ("anything", FieldKind::Any));
}

#[test]
fn enumeration_orders_and_early_stop() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.extend([("a", 1), ("b", 2), ("c", 3)]);

    let mut seen = Vec::new();
    m.for_each(|k, _| {
        seen.push(k.to_string());
        ControlFlow::Continue(())
    });
    assert_eq!(seen, ["a", "b", "c"]);

    seen.clear();
    m.for_each_with(EnumerationOrder::Reverse, |k, _| {
        seen.push(k.to_string());
        if k == "b" {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(seen, ["c", "b"]);

    let mut total = 0;
    m.for_each_with(EnumerationOrder::Unordered, |_, v| {
        total += v.as_i64().unwrap_or_default();
        ControlFlow::Continue(())
    });
    assert_eq!(total, 6);

    assert_eq!(m.values().next_back(), Some(&Value::Integer(3)));
    assert_eq!(
        m.all_values(),
        [Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );
}

#[test]
fn typed_access_to_undeclared_keys() {
    let dir = TempDir::new().unwrap();
    let mut m = model(&dir);
    m.set_as::<u64>("big", u64::MAX);
    assert_eq!(m.get("big").map(Value::kind), Some(plist_model::ValueKind::Real));
    m.set_as::<bool>("flag", true);
    assert!(m.get_as::<bool>("flag"));
    m.set_as::<bool>("flag", None);
    assert!(!m.contains_key("flag"));
}
