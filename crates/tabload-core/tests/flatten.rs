mod common;

use common::RecordingExecutor;
use tabload_core::flatten::{DfsExpansion, Element, FieldValue, FlattenOptions, TreeNode};
use tabload_core::prelude::*;

fn catalog() -> Element {
    Element::from_json_str(
        r#"{
            "tag": "{urn:shop}catalog",
            "children": [
                {"tag": "vendor", "text": "acme"},
                {"tag": "product", "children": [
                    {"tag": "sku", "text": "A-1"},
                    {"tag": "tag", "text": "red"},
                    {"tag": "tag", "text": "small"},
                    {"tag": "price", "attributes": {"currency": "EUR"}}
                ]},
                {"tag": "product", "children": [
                    {"tag": "sku", "text": "B-2"},
                    {"tag": "tag", "text": "blue"}
                ]}
            ]
        }"#,
    )
    .unwrap()
}

fn expansion() -> DfsExpansion {
    DfsExpansion::new(
        FlattenOptions::new()
            .duplicate_tag("tag")
            .with_attributes(true),
    )
}

#[test]
fn test_catalog_rows() {
    let tree = catalog();
    let rows = expansion().flatten(&tree).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].tags().collect::<Vec<_>>(),
        ["vendor", "sku", "tag", "tag_2", "price"]
    );
    assert_eq!(rows[0].group(), "sku");
    assert_eq!(rows[1].tags().collect::<Vec<_>>(), ["vendor", "sku", "tag"]);
    assert_eq!(rows[1].group(), "catalog");
    assert_eq!(
        rows[1].get("tag"),
        Some(&FieldValue::Text("blue".to_string()))
    );
}

#[test]
fn test_rows_as_json() {
    let tree = catalog();
    let rows = expansion().flatten(&tree).unwrap();
    assert_eq!(
        serde_json::Value::Object(rows[0].to_json()),
        serde_json::json!({
            "vendor": "acme",
            "sku": "A-1",
            "tag": "red",
            "tag_2": "small",
            "price": {"currency": "EUR"}
        })
    );
}

#[test]
fn test_flattening_is_repeatable() {
    let tree = catalog();
    let expansion = expansion();
    let first = expansion.flatten(&tree).unwrap();
    let second = expansion.flatten(&tree).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_elements_retained() {
    let tree = catalog();
    let rows = DfsExpansion::new(FlattenOptions::new().with_element(true))
        .flatten(&tree)
        .unwrap();
    match rows[0].get("sku") {
        Some(FieldValue::Node(node)) => assert_eq!(node.text(), Some("A-1")),
        other => panic!("Expected a node, got {other:?}"),
    }
}

#[test]
fn test_flattened_rows_load() {
    let tree = catalog();
    let records: Vec<Record> = expansion()
        .flatten(&tree)
        .unwrap()
        .iter()
        .map(|row| row.to_record())
        .collect();

    let options = WriteOptions::new("products").dialect(DialectKind::Sqlite);
    let writer = make_writer(options, records.into()).unwrap();
    assert_eq!(
        writer.statements().into_vec(),
        [
            "INSERT INTO \"products\" (\"vendor\", \"sku\", \"tag\", \"tag_2\", \"price\") \
             VALUES (?, ?, ?, ?, ?)"
        ]
    );

    let mut executor = RecordingExecutor::new();
    assert_eq!(writer.write(&mut executor).unwrap(), 2);
    assert_eq!(
        executor.bound[1],
        [
            SqlValue::from("acme"),
            SqlValue::from("B-2"),
            SqlValue::from("blue"),
            SqlValue::Null,
            SqlValue::Null,
        ]
    );
}

#[test]
fn test_malformed_root() {
    let tree = Element::new("");
    let err = expansion().flatten(&tree).unwrap_err();
    assert!(matches!(err, LoadError::MalformedTree(_)));
}
