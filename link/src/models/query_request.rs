use serde::{Deserialize, Serialize};

use super::query_sql::Properties;

/// Request body for the `/query-stream` endpoint.
///
/// `sql` is sent after variable substitution; it is never re-substituted
/// server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStreamRequest {
    pub sql: String,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// Request body for the `/ksql` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KsqlRequest {
    pub ksql: String,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub streams_properties: Properties,
}
