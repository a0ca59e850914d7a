use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Error entity the engine returns in place of a result.
///
/// # Example (JSON representation)
///
/// ```json
/// {
///   "@type": "statement_error",
///   "error_code": 40001,
///   "message": "line 1:10: Syntax Error",
///   "statementText": "SELECT * blabla;"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    pub error_code: i64,

    pub message: String,

    #[serde(rename = "statementText", default, skip_serializing_if = "Option::is_none")]
    pub statement_text: Option<String>,
}

impl ServerErrorBody {
    /// Recognize an error entity inside an arbitrary JSON object.
    ///
    /// Matches objects whose `@type` mentions `error`, or that carry both an
    /// `error_code` and a `message`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let obj = value.as_object()?;
        let typed_error = obj
            .get("@type")
            .and_then(JsonValue::as_str)
            .is_some_and(|t| t.contains("error"));
        let has_code = obj.contains_key("error_code") && obj.contains_key("message");
        if !typed_error && !has_code {
            return None;
        }

        Some(Self {
            type_name: obj.get("@type").and_then(JsonValue::as_str).map(str::to_string),
            error_code: obj.get("error_code").and_then(JsonValue::as_i64).unwrap_or_default(),
            message: obj
                .get("message")
                .and_then(JsonValue::as_str)
                .unwrap_or("unknown error")
                .to_string(),
            statement_text: obj
                .get("statementText")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
        })
    }
}
