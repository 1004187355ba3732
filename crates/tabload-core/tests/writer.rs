mod common;

use common::{people, person, Call, DriverError, RecordingExecutor};
use tabload_core::prelude::*;

fn batch(size: usize, commit_per_batch: bool) -> BatchSpec {
    BatchSpec::new(size, commit_per_batch).unwrap()
}

#[test]
fn test_insert_single_commit_after_last_batch() {
    let mut executor = RecordingExecutor::with_counts([Some(4), None, Some(2)]);
    let options = WriteOptions::new("people")
        .dialect(DialectKind::Sqlite)
        .batch(batch(4, false));

    let affected = load(&mut executor, people(10).into(), options).unwrap();

    assert_eq!(executor.batch_sizes(), [4, 4, 2]);
    assert_eq!(executor.commits(), 1);
    assert_eq!(executor.calls.last(), Some(&Call::Commit));
    assert_eq!(affected, 6);
}

#[test]
fn test_insert_commit_per_batch() {
    let mut executor = RecordingExecutor::new();
    let options = WriteOptions::new("people").batch(batch(4, true));

    let affected = load(&mut executor, people(10).into(), options).unwrap();

    assert_eq!(affected, 10);
    let template = "INSERT INTO \"people\" (\"id\", \"name\") VALUES (?, ?)".to_string();
    assert_eq!(
        executor.calls,
        [
            Call::ExecuteMany { sql: template.clone(), rows: 4 },
            Call::Commit,
            Call::ExecuteMany { sql: template.clone(), rows: 4 },
            Call::Commit,
            Call::ExecuteMany { sql: template, rows: 2 },
            Call::Commit,
        ]
    );
}

#[test]
fn test_rows_bound_in_order() {
    let mut executor = RecordingExecutor::new();
    let options = WriteOptions::new("people").batch(batch(3, true));

    load(&mut executor, people(5).into(), options).unwrap();

    let rows = people(5);
    assert_eq!(executor.bound, rows[1..]);
}

#[test]
fn test_empty_table_writes_nothing() {
    let mut executor = RecordingExecutor::new();
    let affected = load(&mut executor, people(0).into(), WriteOptions::new("people")).unwrap();
    assert_eq!(affected, 0);
    assert!(executor.calls.is_empty());
}

#[test]
fn test_upsert_without_conflict_key_fails_before_execution() {
    let mut executor = RecordingExecutor::new();
    let options = WriteOptions::new("people")
        .mode(WriteMode::Upsert)
        .dialect(DialectKind::MySql);

    let err = load(&mut executor, people(3).into(), options).unwrap_err();

    assert!(matches!(err, LoadError::Configuration(_)));
    assert!(executor.calls.is_empty());
}

#[test]
fn test_configuration_checked_before_input() {
    let ragged = vec![
        vec![SqlValue::from("id")],
        vec![SqlValue::Int(1), SqlValue::Int(2)],
    ];
    let options = WriteOptions::new("t").mode(WriteMode::Replace);
    let err = make_writer(options, ragged.clone().into()).unwrap_err();
    assert!(matches!(err, LoadError::Configuration(_)));

    let options = WriteOptions::new("t");
    let err = make_writer(options, ragged.into()).unwrap_err();
    assert!(matches!(err, LoadError::MalformedInput(_)));
}

#[test]
fn test_header_declared_without_rows() {
    let err = make_writer(WriteOptions::new("t"), Vec::<Vec<SqlValue>>::new().into()).unwrap_err();
    assert!(matches!(err, LoadError::Configuration(_)));
}

#[test]
fn test_upsert_commit_cadence() {
    let options = WriteOptions::new("people")
        .mode(WriteMode::Upsert)
        .dialect(DialectKind::Sqlite)
        .conflict_key(&["id"])
        .batch(batch(2, true));

    let mut executor = RecordingExecutor::new();
    let affected = load(&mut executor, people(5).into(), options.clone()).unwrap();
    assert_eq!(affected, 5);
    assert_eq!(executor.executed().len(), 5);
    assert_eq!(executor.commits(), 3);

    let mut executor = RecordingExecutor::new();
    load(&mut executor, people(4).into(), options.clone()).unwrap();
    assert_eq!(executor.commits(), 2);
    assert_eq!(executor.calls.last(), Some(&Call::Commit));

    let mut executor = RecordingExecutor::new();
    let options = options.batch(batch(2, false));
    load(&mut executor, people(5).into(), options).unwrap();
    assert_eq!(executor.commits(), 1);
}

#[test]
fn test_upsert_statements_executed() {
    let records = vec![person(1, "ann"), Record::new().with("id", 2)];
    let options = WriteOptions::new("people")
        .mode(WriteMode::Upsert)
        .dialect(DialectKind::MySql)
        .conflict_key(&["id"])
        .update_strategy(UpdateStrategy::Literal);

    let mut executor = RecordingExecutor::new();
    load(&mut executor, records.into(), options).unwrap();

    assert_eq!(
        executor.executed(),
        [
            "INSERT INTO `people` (`id`, `name`) VALUES (1, 'ann') \
             ON DUPLICATE KEY UPDATE `name` = 'ann'",
            "INSERT INTO `people` (`id`) VALUES (2) ON DUPLICATE KEY UPDATE `id` = `id`",
        ]
    );
}

#[test]
fn test_truncate_first() {
    let options = WriteOptions::new("people")
        .dialect(DialectKind::Sqlite)
        .truncate_first(true)
        .batch(batch(2, false));

    let mut executor = RecordingExecutor::new();
    load(&mut executor, people(3).into(), options.clone()).unwrap();
    assert_eq!(executor.calls[0], Call::Execute("DELETE FROM \"people\"".to_string()));
    assert_eq!(executor.batch_sizes(), [2, 1]);
    assert_eq!(executor.commits(), 1);

    let mut executor = RecordingExecutor::new();
    load(&mut executor, people(0).into(), options).unwrap();
    assert_eq!(
        executor.calls,
        [Call::Execute("DELETE FROM \"people\"".to_string()), Call::Commit]
    );

    let mut executor = RecordingExecutor::new();
    let options = WriteOptions::new("shop.people")
        .dialect(DialectKind::MySql)
        .truncate_first(true);
    load(&mut executor, people(1).into(), options).unwrap();
    assert_eq!(executor.executed(), ["TRUNCATE TABLE `shop`.`people`"]);
}

#[test]
fn test_create_table_before_truncate() {
    let options = WriteOptions::new("people")
        .dialect(DialectKind::Sqlite)
        .create_table(true)
        .truncate_first(true);

    let writer = make_writer(options.clone(), people(2).into()).unwrap();
    let create = "CREATE TABLE IF NOT EXISTS \"people\" (\"id\" INTEGER, \"name\" TEXT)";
    assert_eq!(writer.create_statement().as_deref(), Some(create));

    let mut executor = RecordingExecutor::new();
    writer.write(&mut executor).unwrap();
    assert_eq!(executor.executed(), [create, "DELETE FROM \"people\""]);
    assert_eq!(executor.commits(), 1);

    let upsert = options.mode(WriteMode::Upsert).conflict_key(&["id"]);
    let writer = make_writer(upsert, people(0).into()).unwrap();
    let mut executor = RecordingExecutor::new();
    writer.write(&mut executor).unwrap();
    assert_eq!(
        executor.calls,
        [
            // No rows to type from, so every column falls back to TEXT.
            Call::Execute(
                "CREATE TABLE IF NOT EXISTS \"people\" \
                 (\"id\" TEXT, \"name\" TEXT, PRIMARY KEY (\"id\"))"
                    .to_string()
            ),
            Call::Execute("DELETE FROM \"people\"".to_string()),
            Call::Commit,
        ]
    );
}

#[test]
fn test_create_table_needs_header() {
    let options = WriteOptions::new("points").with_header(false).create_table(true);
    let rows = vec![vec![SqlValue::Int(1)]];
    let err = make_writer(options.clone(), rows.into()).unwrap_err();
    assert!(matches!(err, LoadError::Configuration(_)));

    let rows = vec![vec![SqlValue::Int(1)]];
    let writer = make_writer(options.create_table(false), rows.into()).unwrap();
    assert!(writer.create_statement().is_none());
}

#[test]
fn test_execution_error_surfaces_verbatim() {
    let mut executor = RecordingExecutor::new().fail_on_call(2);
    let options = WriteOptions::new("people").batch(batch(2, true));

    let err = load(&mut executor, people(6).into(), options).unwrap_err();

    assert!(matches!(err, LoadError::Execution(_)));
    assert_eq!(err.to_string(), "connection lost");
    let source = err.execution_source().unwrap();
    assert!(source.downcast_ref::<DriverError>().is_some());
    assert_eq!(executor.commits(), 1);
    assert_eq!(executor.batch_sizes(), [2]);
}

#[test]
fn test_headerless_insert() {
    let rows = vec![
        vec![SqlValue::Float(1.5), SqlValue::Int(88)],
        vec![SqlValue::Float(2.5), SqlValue::Null],
    ];
    let options = WriteOptions::new("points")
        .mode(WriteMode::Replace)
        .dialect(DialectKind::MySql)
        .with_header(false);

    let writer = make_writer(options, rows.clone().into()).unwrap();
    assert_eq!(writer.statements().into_vec(), ["REPLACE INTO `points` VALUES (%s, %s)"]);

    let mut executor = RecordingExecutor::new();
    writer.write(&mut executor).unwrap();
    assert_eq!(executor.bound, rows);
}

#[test]
fn test_records_fill_missing_fields() {
    let records = vec![
        person(1, "ann"),
        Record::new().with("id", 2).with("age", 40),
    ];
    let mut executor = RecordingExecutor::new();
    let writer = make_writer(WriteOptions::new("people"), records.into()).unwrap();
    assert_eq!(
        writer.statements().into_vec(),
        ["INSERT INTO \"people\" (\"id\", \"name\", \"age\") VALUES (?, ?, ?)"]
    );
    writer.write(&mut executor).unwrap();
    assert_eq!(
        executor.bound,
        [
            vec![SqlValue::Int(1), SqlValue::from("ann"), SqlValue::Null],
            vec![SqlValue::Int(2), SqlValue::Null, SqlValue::Int(40)],
        ]
    );
}

#[test]
fn test_options_from_json_drive_writer() {
    let options = WriteOptions::from_json_str(
        r#"{"table_name": "people", "mode": "replace", "dialect": "sqlite",
            "batch": {"batch_size": 3}, "placeholder": "format"}"#,
    )
    .unwrap();
    let writer = make_writer(options, people(7).into()).unwrap();
    assert_eq!(
        writer.statements().into_vec(),
        ["REPLACE INTO \"people\" (\"id\", \"name\") VALUES (%s, %s)"]
    );

    let mut executor = RecordingExecutor::new();
    writer.write(&mut executor).unwrap();
    assert_eq!(executor.batch_sizes(), [3, 3, 1]);
    assert_eq!(executor.commits(), 3);
}
