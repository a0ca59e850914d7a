use serde::{Deserialize, Serialize};

use super::sql_type::SqlType;

/// Schema of a push query result, delivered exactly once before any row.
///
/// `column_names` and `column_types` correspond positionally; the
/// [`FrameParser`](crate::frame::FrameParser) refuses headers where their
/// lengths differ.
///
/// # Example (JSON representation)
///
/// ```json
/// {
///   "queryId": "transient_PUSH_TEST_2841",
///   "columnNames": ["D1", "D2"],
///   "columnTypes": ["BOOLEAN", "STRING"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Server-assigned id of the running query, when the engine reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,

    /// Column names in projection order, with server-assigned casing
    pub column_names: Vec<String>,

    /// Declared SQL type spellings, one per column
    pub column_types: Vec<String>,
}

impl Header {
    pub fn new(column_names: Vec<String>, column_types: Vec<String>) -> Self {
        Self {
            query_id: None,
            column_names,
            column_types,
        }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.column_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column_names.is_empty()
    }

    /// Parsed declared types, in column order.
    pub fn sql_types(&self) -> Vec<SqlType> {
        self.column_types.iter().map(|t| SqlType::parse(t)).collect()
    }

    /// Position of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }
}
