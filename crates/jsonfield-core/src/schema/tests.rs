use super::*;
use crate::{path::compile, predicate::ScalarHandle};
use std::collections::BTreeSet;

fn paths(exprs: &[&str]) -> Vec<StoragePath> {
    exprs
        .iter()
        .map(|expr| compile(*expr).expect("valid path"))
        .collect()
}

#[test]
fn check_fragment_references_storage_column() {
    assert_eq!(check_valid_fragment("meta_data"), r#"json_valid("meta_data")"#);
    assert_eq!(
        check_constraint("meta_data"),
        r#"CHECK (json_valid("meta_data"))"#
    );
}

#[test]
fn index_statement_uses_extraction_expression() {
    let stmt = create_index_statement(
        "users",
        "meta_data",
        &paths(&["$.user.name"]),
        &IndexOptions::default(),
    )
    .expect("valid spec");

    assert!(stmt.name.starts_with("users_meta_data_user_name_"), "{}", stmt.name);
    assert!(stmt.name.ends_with("_idx"), "{}", stmt.name);
    assert_eq!(
        stmt.sql,
        format!(
            r#"CREATE INDEX IF NOT EXISTS "{}" ON "users" (json_extract("meta_data", '$.user.name'))"#,
            stmt.name
        )
    );
}

#[test]
fn generation_is_idempotent() {
    let paths = paths(&["$.items[2].sku"]);
    let options = IndexOptions::default().unique(true);

    let first = create_index_statement("t", "doc", &paths, &options).expect("first");
    let second = create_index_statement("t", "doc", &paths, &options).expect("second");

    assert_eq!(first, second);
    assert!(first.name.starts_with("t_doc_items_2_sku_"), "{}", first.name);
    assert!(first.sql.starts_with("CREATE UNIQUE INDEX IF NOT EXISTS"));
}

#[test]
fn multiple_paths_make_a_composite_index() {
    let stmt = create_index_statement(
        "t",
        "doc",
        &paths(&["$.a", "$.b"]),
        &IndexOptions::default().name("by_a_b"),
    )
    .expect("valid spec");

    assert_eq!(stmt.name, "by_a_b");
    assert!(
        stmt.sql
            .ends_with(r#"(json_extract("doc", '$.a'), json_extract("doc", '$.b'))"#),
        "{}",
        stmt.sql
    );
}

#[test]
fn partial_index_predicate_is_inlined() {
    let active = ScalarHandle::new("doc", "$.active").expect("valid path");
    let stmt = create_index_statement(
        "t",
        "doc",
        &paths(&["$.email"]),
        &IndexOptions::default().where_clause(active.eq(true)),
    )
    .expect("valid spec");

    assert!(
        stmt.sql
            .ends_with(r#" WHERE json_type("doc", '$.active') IS 'true'"#),
        "{}",
        stmt.sql
    );
}

#[test]
fn default_names_sanitize_identifiers() {
    let name = default_index_name("my-table", "doc", &paths(&["$.\"first name\""]));

    assert!(name.starts_with("my_table_doc_first_name_"), "{name}");
    assert!(
        name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'),
        "{name}"
    );
}

#[test]
fn default_names_distinguish_lossy_prefixes() {
    let names = [
        default_index_name("t", "doc", &paths(&["$.a_b"])),
        default_index_name("t", "doc", &paths(&["$.a.b"])),
        default_index_name("t", "doc", &paths(&["$.a", "$.b"])),
        default_index_name("t", "doc", &paths(&["$.\"a-b\""])),
        default_index_name("t_doc", "a", &paths(&["$.b"])),
        default_index_name("t", "doc", &paths(&["$.items[2]"])),
        default_index_name("t", "doc", &paths(&["$.items.\"2\""])),
    ];

    let distinct: BTreeSet<_> = names.iter().collect();
    assert_eq!(distinct.len(), names.len(), "{names:?}");
}

#[test]
fn missing_paths_are_rejected() {
    let err = create_index_statement("t", "doc", &[], &IndexOptions::default())
        .expect_err("must fail");

    assert_eq!(
        err,
        IndexSpecError::NoPaths {
            table: "t".to_string(),
            column: "doc".to_string(),
        }
    );
}

#[test]
fn duplicate_paths_are_rejected() {
    let err = create_index_statement(
        "t",
        "doc",
        &paths(&["$.a", "a"]),
        &IndexOptions::default(),
    )
    .expect_err("must fail");

    assert!(matches!(err, IndexSpecError::DuplicatePath { .. }), "{err}");
}

#[test]
fn bad_names_and_identifiers_are_rejected() {
    let p = paths(&["$.a"]);

    assert!(matches!(
        create_index_statement("t", "doc", &p, &IndexOptions::default().name("  ")),
        Err(IndexSpecError::EmptyIdentifier { what: "index" })
    ));
    assert!(matches!(
        create_index_statement("t", "doc", &p, &IndexOptions::default().name("sqlite_x")),
        Err(IndexSpecError::InvalidName { .. })
    ));
    assert!(matches!(
        create_index_statement("", "doc", &p, &IndexOptions::default()),
        Err(IndexSpecError::EmptyIdentifier { what: "table" })
    ));
}

#[test]
fn batch_collapses_identical_definitions() {
    let spec = IndexSpec::new("t", "doc", paths(&["$.a"]));
    let statements = index_statements(&[spec.clone(), spec]).expect("valid batch");

    assert_eq!(statements.len(), 1);
}

#[test]
fn batch_keeps_lossy_prefix_definitions_apart() {
    let left = IndexSpec::new("t", "doc", paths(&["$.a_b"]));
    let right = IndexSpec::new("t", "doc", paths(&["$.a.b"]));
    let statements = index_statements(&[left, right]).expect("valid batch");

    assert_eq!(statements.len(), 2);
    assert_ne!(statements[0].name, statements[1].name);
}

#[test]
fn batch_rejects_one_supplied_name_for_two_definitions() {
    let left = IndexSpec::new("t", "doc", paths(&["$.a"]))
        .with_options(IndexOptions::default().name("by_key"));
    let right = IndexSpec::new("t", "doc", paths(&["$.b"]))
        .with_options(IndexOptions::default().name("by_key"));
    let err = index_statements(&[left, right]).expect_err("must fail");

    assert!(
        matches!(&err, IndexSpecError::NameCollision { name, .. } if name == "by_key"),
        "{err}"
    );
}

#[test]
fn batch_rejects_supplied_name_matching_a_derived_one() {
    let derived = IndexSpec::new("t", "doc", paths(&["$.a"]));
    let named = IndexSpec::new("t", "doc", paths(&["$.b"])).with_options(
        IndexOptions::default().name(default_index_name("t", "doc", &paths(&["$.a"]))),
    );

    assert!(matches!(
        index_statements(&[derived, named]),
        Err(IndexSpecError::NameCollision { .. })
    ));
}
