use serde::{Deserialize, Serialize};

/// A stream as listed by `SHOW STREAMS;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub topic: String,
    pub key_format: String,
    pub value_format: String,
    #[serde(default)]
    pub is_windowed: bool,
}
