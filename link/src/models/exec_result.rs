use serde::{Deserialize, Serialize};

use super::stream_info::StreamInfo;
use super::table_info::TableInfo;

/// One entity of a `/ksql` response; the endpoint answers with a JSON array
/// holding one of these per executed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    /// Entity kind, e.g. `currentStatus`, `streams`, `tables`
    #[serde(rename = "@type")]
    pub type_name: String,

    pub statement_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_status: Option<CommandStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_sequence_number: Option<i64>,

    /// Present for `SHOW STREAMS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<Vec<StreamInfo>>,

    /// Present for `SHOW TABLES`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<TableInfo>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub message: String,
}
