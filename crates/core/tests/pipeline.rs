mod support;

use queryfn_core::prelude::*;
use support::ScriptedProbe;

#[tokio::test]
async fn minute_history_by_id() {
    let content = "--TYPE#int\n--DEFAULT#5\nselect * from minute_history where id = ${id}";
    let mut probe = ScriptedProbe::new().columns(
        "select * from minute_history where id = $1",
        &[("id", "INT4"), ("price", "FLOAT8"), ("at", "TIMESTAMP"), ("note", "TEXT")],
    );

    let descriptor = build("minuteHistory", content, &mut probe)
        .await
        .expect("build should succeed");

    assert_eq!(descriptor.sql, "select * from minute_history where id = $1");
    assert_eq!(
        descriptor.parameters,
        vec![Parameter {
            name: "id".to_string(),
            index: 0,
            total: 1,
            ty: TypeTag::Int,
            default: Value::Int(5),
        }]
    );
    assert_eq!(descriptor.kind, StatementKind::Select);
    assert!(descriptor.batch_result);
    assert!(!descriptor.batch_parameter);
    assert!(!descriptor.limited);

    assert_eq!(descriptor.result.name, "MinuteHistoryResult");
    let fields: Vec<(&str, TypeTag, usize, usize)> = descriptor
        .result
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.ty, f.index, f.total))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("id", TypeTag::Int, 0, 4),
            ("price", TypeTag::Double, 1, 4),
            ("at", TypeTag::Date, 2, 4),
            ("note", TypeTag::String, 3, 4),
        ]
    );

    // the probe bound the resolved default, not anything caller-supplied
    assert_eq!(probe.calls, vec![(descriptor.sql.clone(), vec![Value::Int(5)])]);
}

#[tokio::test]
async fn repeated_placeholders_bind_independently() {
    let content = "--TYPE#string,string\n--DEFAULT#a\\,b\nselect name from t where first = ${name} or last = ${name}";
    let mut probe = ScriptedProbe::new();

    let descriptor = build("byName", content, &mut probe).await.unwrap();

    assert_eq!(descriptor.sql, "select name from t where first = $1 or last = $2");
    assert_eq!(descriptor.parameters.len(), 2);
    assert_eq!(descriptor.parameters[0].name, "name");
    assert_eq!(descriptor.parameters[1].name, "name");
    assert_eq!(descriptor.parameters[0].index, 0);
    assert_eq!(descriptor.parameters[1].index, 1);
    assert_eq!(descriptor.parameters[0].default, Value::String("a,b".to_string()));
    assert_eq!(descriptor.parameters[1].default, Value::String("1".to_string()));
    assert_eq!(probe.calls[0].1.len(), 2);
}

#[tokio::test]
async fn limited_probe_appends_row_limit() {
    let content = "--OPTIONS#LIMIT\nselect id from big_table;";
    let mut probe = ScriptedProbe::new().columns("select id from big_table limit 1", &[("id", "INT8")]);

    let descriptor = build("scan", content, &mut probe).await.unwrap();

    assert!(descriptor.limited);
    // the stored SQL is untouched, only the probe is limited
    assert_eq!(descriptor.sql, "select id from big_table;");
    assert_eq!(descriptor.result.fields[0].ty, TypeTag::Long);
    assert_eq!(probe.calls[0].0, "select id from big_table limit 1");
}

#[tokio::test]
async fn non_select_is_probed_but_has_no_shape() {
    let content = "--TYPE#string,int\ninsert into t (name, age) values (${name}, ${age}) returning id";
    let mut probe = ScriptedProbe::new().columns(
        "insert into t (name, age) values ($1, $2) returning id",
        &[("id", "INT4")],
    );

    let descriptor = build("addPerson", content, &mut probe).await.unwrap();

    assert_eq!(descriptor.kind, StatementKind::Insert);
    assert!(descriptor.batch_parameter);
    assert!(!descriptor.batch_result);
    assert!(descriptor.result.is_empty());
    assert_eq!(probe.calls.len(), 1);
    assert_eq!(probe.calls[0].1, vec![Value::String("1".to_string()), Value::Int(1)]);
}

#[tokio::test]
async fn explicit_options_override_kind_and_batching() {
    let content = "--OPTIONS#update,BATCH_RESULT\nwith x as (select 1) update t set a = 1 returning a";
    let mut probe = ScriptedProbe::new();

    let descriptor = build("touch", content, &mut probe).await.unwrap();

    assert_eq!(descriptor.kind, StatementKind::Update);
    assert!(descriptor.batch_result);
    assert!(!descriptor.batch_parameter);
}

#[tokio::test]
async fn probe_failure_carries_driver_error() {
    let mut probe = ScriptedProbe::new().failure("select * from missing", "relation \"missing\" does not exist");

    let err = build("missing", "select * from missing", &mut probe).await.unwrap_err();

    match err {
        CompilerError::ProbeExecutionFailed { query, source } => {
            assert_eq!(query, "select * from missing");
            assert!(source.to_string().contains("does not exist"));
        }
        other => panic!("expected probe failure, got {other:?}"),
    }
}

#[tokio::test]
async fn text_errors_stop_before_the_probe() {
    let mut probe = ScriptedProbe::new();

    let malformed = build("bad", "--TYPE int\nselect 1", &mut probe).await.unwrap_err();
    assert!(matches!(malformed, CompilerError::MalformedAnnotation { .. }));

    let unsupported = build("bad", "truncate t", &mut probe).await.unwrap_err();
    assert!(matches!(unsupported, CompilerError::UnsupportedStatementKind(_)));

    assert!(probe.calls.is_empty());
}

#[tokio::test]
async fn failure_on_one_file_does_not_affect_the_next() {
    let mut probe = ScriptedProbe::new()
        .failure("select * from gone", "boom")
        .columns("select id from t", &[("id", "INT4")]);

    let first = build("gone", "select * from gone", &mut probe).await;
    let second = build("ids", "select id from t", &mut probe).await;

    assert!(first.is_err());
    let second = second.expect("second file should still compile");
    assert_eq!(second.result.fields.len(), 1);
}

#[tokio::test]
async fn fields_keep_the_driver_type() {
    let mut probe = ScriptedProbe::new().columns(
        "select * from ticks",
        &[("seen_at", "TIMESTAMPTZ"), ("day", "DATE"), ("small", "INT2"), ("total", "NUMERIC")],
    );

    let descriptor = build("ticks", "select * from ticks", &mut probe).await.unwrap();

    let fields: Vec<(&str, TypeTag, &str, bool)> = descriptor
        .result
        .fields
        .iter()
        .map(|f| (f.driver_type.as_str(), f.ty, f.rust_type(), f.decodes_exactly()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("TIMESTAMPTZ", TypeTag::Date, "chrono::DateTime<chrono::Utc>", true),
            ("DATE", TypeTag::Date, "chrono::NaiveDate", true),
            ("INT2", TypeTag::Int, "i16", true),
            ("NUMERIC", TypeTag::Double, "f64", false),
        ]
    );
}
