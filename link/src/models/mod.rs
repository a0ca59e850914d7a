//! Data models for ksql-link.
//!
//! Request bodies, response entities, and the decoded header/row/value types
//! delivered by push queries.

pub mod connection_options;
pub mod exec_result;
pub mod header;
pub mod http_version;
pub mod ksql_value;
pub mod query_request;
pub mod query_sql;
pub mod row;
pub mod server_error_body;
pub mod sql_type;
pub mod stmnt_sql;
pub mod stream_info;
pub mod table_info;

#[cfg(test)]
mod tests;

pub use connection_options::ConnectionOptions;
pub use exec_result::{CommandStatus, ExecResult, Warning};
pub use header::Header;
pub use http_version::HttpVersion;
pub use ksql_value::KsqlValue;
pub use query_request::{KsqlRequest, QueryStreamRequest};
pub use query_sql::{Properties, QuerySql, Variables};
pub use row::Row;
pub use server_error_body::ServerErrorBody;
pub use sql_type::{SqlType, StructField};
pub use stmnt_sql::StmntSql;
pub use stream_info::StreamInfo;
pub use table_info::TableInfo;
