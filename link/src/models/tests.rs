use serde_json::json;

use super::*;

// ==================== ConnectionOptions Tests ====================

#[test]
fn test_connection_options_default() {
    let opts = ConnectionOptions::default();

    assert_eq!(opts.http_version, HttpVersion::Auto, "http_version should default to Auto");
    assert!(!opts.allow_http, "plaintext http should be refused by default");
}

#[test]
fn test_connection_options_deserialize_aliases() {
    let opts: ConnectionOptions =
        serde_json::from_value(json!({"http_version": "http/2", "allow_http": true})).unwrap();
    assert_eq!(opts.http_version, HttpVersion::Http2);
    assert!(opts.allow_http);

    let opts: ConnectionOptions = serde_json::from_value(json!({})).unwrap();
    assert_eq!(opts, ConnectionOptions::default());
}

// ==================== Header / Row Tests ====================

#[test]
fn test_header_wire_format() {
    let header: Header = serde_json::from_value(json!({
        "queryId": "transient_PUSH_TEST_1",
        "columnNames": ["D1", "D6"],
        "columnTypes": ["BOOLEAN", "DECIMAL(5, 2)"]
    }))
    .unwrap();

    assert_eq!(header.query_id.as_deref(), Some("transient_PUSH_TEST_1"));
    assert_eq!(header.len(), 2);
    assert_eq!(header.column_index("D6"), Some(1));
    assert_eq!(
        header.sql_types(),
        vec![SqlType::Boolean, SqlType::Decimal { precision: 5, scale: 2 }]
    );

    let back = serde_json::to_value(Header::new(vec!["A".into()], vec!["INT".into()])).unwrap();
    assert_eq!(back, json!({"columnNames": ["A"], "columnTypes": ["INT"]}));
}

#[test]
fn test_row_lookup_by_name() {
    let header = Header::new(vec!["ID".into(), "NAME".into()], vec!["INT".into(), "STRING".into()]);
    let row = Row::new(vec![KsqlValue::Number(7.0), KsqlValue::from("alice")]);

    assert_eq!(row.get_by_name(&header, "NAME").and_then(KsqlValue::as_str), Some("alice"));
    assert!(row.get_by_name(&header, "MISSING").is_none());

    let map = row.to_map(&header);
    assert_eq!(map.get("ID"), Some(&KsqlValue::Number(7.0)));
    assert_eq!(serde_json::to_value(&row).unwrap(), json!([7.0, "alice"]));
}

// ==================== KsqlValue Tests ====================

#[test]
fn test_ksql_value_from_json_nested() {
    let value = KsqlValue::from(json!({"tags": ["a", null], "n": 3, "ok": true}));

    let tags = value.get("tags").and_then(KsqlValue::as_list).unwrap();
    assert_eq!(tags, &[KsqlValue::from("a"), KsqlValue::Null]);
    assert_eq!(value.get("n"), Some(&KsqlValue::Number(3.0)));
    assert_eq!(value.get("ok").and_then(KsqlValue::as_bool), Some(true));
    assert_eq!(value.kind(), "map");
}

// ==================== Request / Response Tests ====================

#[test]
fn test_query_stream_request_serialization() {
    let body = QueryStreamRequest {
        sql: "SELECT * FROM s EMIT CHANGES;".into(),
        properties: Properties::new(),
    };
    assert_eq!(serde_json::to_value(&body).unwrap(), json!({"sql": "SELECT * FROM s EMIT CHANGES;"}));

    let query = QuerySql::new("SELECT 1;").with_property("auto.offset.reset", "earliest");
    let body = KsqlRequest {
        ksql: query.sql.clone(),
        streams_properties: query.properties.clone(),
    };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({"ksql": "SELECT 1;", "streamsProperties": {"auto.offset.reset": "earliest"}})
    );
}

#[test]
fn test_server_error_body_detection() {
    let typed = json!({"@type": "statement_error", "error_code": 40001, "message": "bad"});
    let body = ServerErrorBody::from_json(&typed).unwrap();
    assert_eq!(body.error_code, 40001);
    assert_eq!(body.type_name.as_deref(), Some("statement_error"));

    let untyped = json!({"error_code": 50000, "message": "boom"});
    assert_eq!(ServerErrorBody::from_json(&untyped).unwrap().message, "boom");

    assert!(ServerErrorBody::from_json(&json!({"queryId": "q"})).is_none());
    assert!(ServerErrorBody::from_json(&json!([1, 2])).is_none());
}

#[test]
fn test_exec_result_show_streams() {
    let results: Vec<ExecResult> = serde_json::from_value(json!([{
        "@type": "streams",
        "statementText": "SHOW STREAMS;",
        "streams": [{
            "type": "STREAM",
            "name": "KSQL_PROCESSING_LOG",
            "topic": "default_ksql_processing_log",
            "keyFormat": "KAFKA",
            "valueFormat": "JSON",
            "isWindowed": false
        }],
        "warnings": []
    }]))
    .unwrap();

    let streams = results[0].streams.as_ref().unwrap();
    assert_eq!(streams[0].name, "KSQL_PROCESSING_LOG");
    assert_eq!(streams[0].kind, "STREAM");
    assert!(results[0].tables.is_none());
}

#[test]
fn test_exec_result_command_status() {
    let result: ExecResult = serde_json::from_value(json!({
        "@type": "currentStatus",
        "statementText": "CREATE STREAM s (d1 BOOLEAN) WITH (kafka_topic='s', value_format='json', partitions=1);",
        "commandId": "stream/`S`/create",
        "commandStatus": {"status": "SUCCESS", "message": "Stream created", "queryId": null},
        "commandSequenceNumber": 2,
        "warnings": [{"message": "topic already exists"}]
    }))
    .unwrap();

    let status = result.command_status.unwrap();
    assert_eq!(status.status, "SUCCESS");
    assert!(status.query_id.is_none());
    assert_eq!(result.warnings.len(), 1);
}
