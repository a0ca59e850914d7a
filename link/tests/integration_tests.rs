//! Tests against a running ksqlDB server.
//!
//! Set `KSQLDB_SERVER_URL` (default `http://localhost:8088`). Every test
//! returns early when the server cannot be reached.
//!
//! Run with: cargo test -p ksql-link --test integration_tests -- --nocapture

mod common;

use common::init_logging;
use ksql_link::{
    CancellationToken, KsqlLinkClient, KsqlLinkTimeouts, KsqlValue, QuerySql, StmntSql,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::time::timeout;

fn server_url() -> String {
    std::env::var("KSQLDB_SERVER_URL").unwrap_or_else(|_| "http://localhost:8088".to_string())
}

fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("{}_{}", prefix, nanos % 1_000_000_000)
}

/// Client for the live server, or `None` when nothing is listening.
async fn live_client() -> Option<KsqlLinkClient> {
    init_logging();
    let client = KsqlLinkClient::builder()
        .base_url(server_url())
        .allow_http(true)
        .timeouts(KsqlLinkTimeouts::relaxed())
        .build()
        .ok()?;
    match client.show_streams().await {
        Ok(_) => Some(client),
        Err(e) => {
            eprintln!("Skipping: ksqlDB not reachable at {} ({})", server_url(), e);
            None
        },
    }
}

#[tokio::test]
async fn test_live_push_query_all_types() {
    let Some(client) = live_client().await else {
        return;
    };
    let stream = unique_name("KSQL_LINK_PUSH");

    client
        .exec(
            &StmntSql::new(
                "CREATE STREAM ${s} (d1 BOOLEAN, d2 VARCHAR, d3 INT, d4 BIGINT, d5 DOUBLE, d6 DECIMAL(5,2)) \
                 WITH (kafka_topic='${s}', value_format='JSON', partitions=1);",
            )
            .with_variable("s", &stream),
        )
        .await
        .expect("create stream");
    client
        .exec(
            &StmntSql::new("INSERT INTO ${s} (d1, d2, d3, d4, d5, d6) VALUES (true, 'varchar', 1, 10, 1.5, 10.50);")
                .with_variable("s", &stream),
        )
        .await
        .expect("insert row");

    let query = QuerySql::new("SELECT * FROM ${s} EMIT CHANGES LIMIT 1;")
        .with_variable("s", &stream)
        .with_property("auto.offset.reset", "earliest");
    let (header_tx, mut header_rx) = mpsc::channel(1);
    let (row_tx, mut row_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();

    let consumer = async {
        let header = header_rx.recv().await;
        let mut rows = Vec::new();
        while let Some(row) = row_rx.recv().await {
            rows.push(row);
        }
        (header, rows)
    };
    let (result, (header, rows)) = timeout(Duration::from_secs(60), async {
        tokio::join!(client.push(&cancel, &query, header_tx, row_tx), consumer)
    })
    .await
    .expect("push query did not finish");
    assert!(result.is_ok(), "push failed: {:?}", result);

    let header = header.expect("header");
    assert_eq!(header.column_names, vec!["D1", "D2", "D3", "D4", "D5", "D6"]);
    assert_eq!(
        header.column_types,
        vec!["BOOLEAN", "STRING", "INTEGER", "BIGINT", "DOUBLE", "DECIMAL(5, 2)"]
    );

    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].values(),
        &[
            KsqlValue::Bool(true),
            KsqlValue::String("varchar".to_string()),
            KsqlValue::Number(1.0),
            KsqlValue::Number(10.0),
            KsqlValue::Number(1.5),
            KsqlValue::Number(10.5),
        ]
    );

    let streams = client.show_streams().await.expect("show streams");
    assert!(streams.iter().any(|s| s.name.eq_ignore_ascii_case(&stream)));

    let _ = client
        .exec(&StmntSql::new("DROP STREAM IF EXISTS ${s} DELETE TOPIC;").with_variable("s", &stream))
        .await;
}

#[tokio::test]
async fn test_live_push_query_cancel() {
    let Some(client) = live_client().await else {
        return;
    };
    let stream = unique_name("KSQL_LINK_CANCEL");

    client
        .exec(
            &StmntSql::new(
                "CREATE STREAM ${s} (id INT) WITH (kafka_topic='${s}', value_format='JSON', partitions=1);",
            )
            .with_variable("s", &stream),
        )
        .await
        .expect("create stream");

    let mut handle = client.spawn_push(
        QuerySql::new("SELECT * FROM ${s} EMIT CHANGES;").with_variable("s", &stream),
        8,
    );
    let header = timeout(Duration::from_secs(30), handle.header())
        .await
        .expect("header timeout")
        .expect("header");
    assert_eq!(header.column_names, vec!["ID"]);

    handle.cancel();
    let joined = timeout(Duration::from_secs(10), handle.join()).await.expect("join timeout");
    assert!(joined.is_ok());

    let _ = client
        .exec(&StmntSql::new("DROP STREAM IF EXISTS ${s} DELETE TOPIC;").with_variable("s", &stream))
        .await;
}

#[tokio::test]
async fn test_live_invalid_query() {
    let Some(client) = live_client().await else {
        return;
    };
    let (header_tx, _header_rx) = mpsc::channel(1);
    let (row_tx, _row_rx) = mpsc::channel(1);
    let result = client
        .push(
            &CancellationToken::new(),
            &QuerySql::new("SELECT * FROM NO_SUCH_STREAM_XYZ EMIT CHANGES;"),
            header_tx,
            row_tx,
        )
        .await;
    assert!(result.is_err_and(|e| e.is_query_error()));
}
