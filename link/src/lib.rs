//! # ksql-link
//!
//! Async client for ksqlDB's SQL-over-HTTP API.
//!
//! The centerpiece is the push query pipeline: [`KsqlLinkClient::push`] opens
//! a `/query-stream` request, parses the response incrementally as it
//! arrives, decodes every column according to its declared SQL type, and
//! hands the header and rows to the caller through two channels while
//! honoring a [`CancellationToken`].
//!
//! ```rust,no_run
//! use ksql_link::{KsqlLinkClient, QuerySql};
//!
//! # async fn example() -> ksql_link::Result<()> {
//! let client = KsqlLinkClient::builder()
//!     .base_url("http://localhost:8088")
//!     .allow_http(true)
//!     .build()?;
//!
//! let query = QuerySql::new("SELECT * FROM ${stream} EMIT CHANGES LIMIT 1;")
//!     .with_variable("stream", "pageviews")
//!     .with_property("auto.offset.reset", "earliest");
//!
//! let mut push = client.spawn_push(query, 16);
//! let header = push.header().await;
//! let row = push.next_row().await;
//! println!("{:?} {:?}", header, row);
//! # Ok(())
//! # }
//! ```
//!
//! Statements and listings go through [`KsqlLinkClient::exec`],
//! [`KsqlLinkClient::show_streams`] and [`KsqlLinkClient::show_tables`].

pub mod auth;
pub mod client;
pub mod codec;
pub mod coerce;
pub mod error;
pub mod frame;
pub mod models;
pub mod push;
pub mod query;
pub mod statement;
pub mod timeouts;

pub use auth::AuthProvider;
pub use client::{KsqlLinkClient, KsqlLinkClientBuilder};
pub use codec::JsonFrameCodec;
pub use coerce::{coerce, coerce_str, RowDecoder};
pub use error::{KsqlLinkError, Result};
pub use frame::{Frame, FrameParser};
pub use models::{
    ConnectionOptions, ExecResult, Header, HttpVersion, KsqlValue, Properties, QuerySql, Row,
    SqlType, StmntSql, StreamInfo, TableInfo, Variables,
};
pub use push::{PushHandle, PushQueryDriver};
pub use query::QueryExecutor;
pub use statement::substitute_variables;
pub use timeouts::{KsqlLinkTimeouts, KsqlLinkTimeoutsBuilder};
pub use tokio_util::sync::CancellationToken;
