use super::*;
use crate::error::ErrorClass;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

fn field(null_to_empty: bool) -> JsonField {
    JsonField::builder("data")
        .db_column("meta_data")
        .null_to_empty(null_to_empty)
        .build()
        .expect("valid field")
}

#[test]
fn storage_column_defaults_to_logical_name() {
    let plain = JsonField::builder("meta").build().expect("valid field");
    assert_eq!(plain.name(), "meta");
    assert_eq!(plain.column(), "meta");

    let remapped = field(true);
    assert_eq!(remapped.name(), "data");
    assert_eq!(remapped.column(), "meta_data");
}

#[test]
fn stored_null_reads_as_configured_default() {
    let with_default = JsonField::builder("data")
        .default(json!({}))
        .null_to_empty(false)
        .build()
        .expect("valid field");

    assert_eq!(with_default.from_db(None).expect("read"), Some(json!({})));
    assert_eq!(field(true).from_db(None).expect("read"), Some(json!({})));
    assert_eq!(field(false).from_db(None).expect("read"), None);
}

#[test]
fn explicit_json_null_stays_null_without_coercion() {
    assert_eq!(field(false).from_db(Some("null")).expect("read"), Some(Value::Null));
    assert_eq!(field(true).from_db(Some("null")).expect("read"), Some(json!({})));
}

#[test]
fn writes_apply_the_null_policy() {
    let coerce = field(true);
    assert_eq!(coerce.to_db(None).expect("write"), Some("{}".to_string()));
    assert_eq!(coerce.to_db(Some(&Value::Null)).expect("write"), Some("{}".to_string()));

    let propagate = field(false);
    assert_eq!(propagate.to_db(None).expect("write"), None);
    assert_eq!(
        propagate.to_db(Some(&Value::Null)).expect("write"),
        Some("null".to_string())
    );
}

#[test]
fn write_then_read_round_trips() {
    let field = field(false);
    let value = json!({"user": {"name": "Alice", "tags": [1, 2.5, true, null]}});

    let stored = field.to_db(Some(&value)).expect("write");
    assert_eq!(field.from_db(stored.as_deref()).expect("read"), Some(value));
}

#[test]
fn corrupt_stored_text_is_a_corruption_error() {
    let err = field(true).from_db(Some("{broken")).expect_err("must fail");

    assert_eq!(err.class(), ErrorClass::Corruption);
    assert!(err.is_corruption());
    assert!(err.to_string().contains("meta_data"), "{err}");
    assert!(err.display_with_class().starts_with("codec:corruption: "));
}

#[test]
fn path_errors_classify_as_invalid_input() {
    let err = Error::from(field(true).extract("$.a[x]").expect_err("must fail"));

    assert_eq!(err.class(), ErrorClass::InvalidInput);
    assert_eq!(err.origin(), crate::error::ErrorOrigin::Path);
}

#[test]
fn unencodable_typed_values_are_serialization_errors() {
    let mut map = HashMap::new();
    map.insert((1, 2), "pair");

    let err = field(true).to_db_typed(&map).expect_err("must fail");
    assert_eq!(err.class(), ErrorClass::Unsupported);
    assert!(matches!(err, Error::Codec(CodecError::Serialize { .. })));
}

#[test]
fn typed_values_round_trip() {
    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Profile {
        name: String,
        age: u8,
    }

    let field = field(false);
    let profile = Profile {
        name: "Alice".to_string(),
        age: 30,
    };

    let stored = field.to_db_typed(&profile).expect("write");
    let read: Option<Profile> = field.from_db_typed(stored.as_deref()).expect("read");
    assert_eq!(read, Some(profile));

    let missing: Option<Profile> = field.from_db_typed(None).expect("read");
    assert_eq!(missing, None);
}

#[test]
fn custom_dumps_and_loads_are_used() {
    let field = JsonField::builder("data")
        .dumps(|value: &Value| serde_json::to_string_pretty(value).map_err(|e| e.to_string()))
        .loads(|text: &str| serde_json::from_str(text).map_err(|e| e.to_string()))
        .build()
        .expect("valid field");

    let stored = field.to_db(Some(&json!({"a": 1}))).expect("write");
    assert_eq!(stored.as_deref(), Some("{\n  \"a\": 1\n}"));
    assert_eq!(
        field.from_db(stored.as_deref()).expect("read"),
        Some(json!({"a": 1}))
    );
}

#[test]
fn failing_dumps_aborts_the_write() {
    let field = JsonField::builder("data")
        .dumps(|_: &Value| Err("refused".to_string()))
        .build()
        .expect("valid field");

    let err = field.to_db(Some(&json!(1))).expect_err("must fail");
    assert!(err.to_string().contains("refused"), "{err}");
}

#[test]
fn pre_encoded_text_is_reencoded_by_the_codec() {
    let field = field(true);

    assert_eq!(
        field.to_db_text(r#"{"b":1,  "a":{"d":0,"c":[]}}"#).expect("valid"),
        r#"{"a":{"c":[],"d":0},"b":1}"#
    );
    assert!(field.to_db_text("nope").is_err());
}

#[test]
fn pre_encoded_null_follows_the_null_policy() {
    let coerce = field(true);
    assert_eq!(coerce.to_db_text("null").expect("valid"), "{}");
    assert_eq!(
        coerce.to_db_text(" null ").expect("valid"),
        coerce.to_db(Some(&Value::Null)).expect("write").expect("stored")
    );

    assert_eq!(field(false).to_db_text("null").expect("valid"), "null");
}

#[test]
fn validate_input_accepts_values_and_json_text() {
    let field = field(true);

    assert_eq!(field.validate_input(json!([1])).expect("value"), json!([1]));
    assert_eq!(field.validate_input(r#"{"a":1}"#).expect("text"), json!({"a": 1}));
    assert!(field.validate_input("{").is_err());
}

#[test]
fn query_entry_points_use_storage_column() {
    let field = field(true);

    let sql = field.extract("$.user.name").expect("path").eq("Alice").to_sql().sql;
    assert!(sql.contains("\"meta_data\""), "{sql}");
    assert!(!sql.contains("\"data\""), "{sql}");

    let sql = field.contains_key("user.age").expect("path").to_sql().sql;
    assert_eq!(sql, r#"json_type("meta_data", '$.user.age') IS NOT NULL"#);

    assert_eq!(
        field.path_eq("$.a", 1).expect("path"),
        field.extract("a").expect("path").eq(1)
    );
}

#[test]
fn set_expr_encodes_with_field_codec() {
    let set = field(true).set_expr("$.tags", &json!(["x"])).expect("valid");

    assert_eq!(set.sql, r#"json_set("meta_data", '$.tags', json(?))"#);
    assert_eq!(
        set.params,
        vec![crate::predicate::SqlValue::Text(r#"["x"]"#.to_string())]
    );
}

#[test]
fn ddl_references_storage_column() {
    let field = field(true);

    assert_eq!(field.ddl_check_valid(), r#"json_valid("meta_data")"#);
    assert_eq!(
        field.column_ddl(true),
        r#""meta_data" TEXT CHECK (json_valid("meta_data"))"#
    );

    let stmt = create_json_index("users", &field, "$.user.name", &IndexOptions::default())
        .expect("valid spec");
    assert!(stmt.sql.contains(r#"json_extract("meta_data", '$.user.name')"#));
    assert!(!stmt.sql.contains("\"data\""), "{}", stmt.sql);
}

#[test]
fn invalid_paths_surface_from_index_generation() {
    let err = create_json_index("users", &field(true), "$.a[", &IndexOptions::default())
        .expect_err("must fail");

    assert!(matches!(err, Error::InvalidPath(PathError::UnterminatedBracket { .. })));
}

#[test]
fn empty_names_are_rejected_at_build() {
    assert!(JsonField::builder(" ").build().is_err());
    assert!(JsonField::builder("data").db_column("").build().is_err());
}

#[test]
fn descriptors_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JsonField>();

    let field = Arc::new(field(false));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let field = Arc::clone(&field);
            std::thread::spawn(move || {
                let stored = field.to_db(Some(&json!({ "n": i }))).expect("write");
                field.from_db(stored.as_deref()).expect("read")
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().expect("thread"), Some(json!({ "n": i })));
    }
}
