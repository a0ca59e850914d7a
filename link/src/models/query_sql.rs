use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Engine session properties, e.g. `auto.offset.reset = earliest`.
pub type Properties = HashMap<String, String>;

/// Values substituted for `${name}` placeholders before submission.
pub type Variables = HashMap<String, String>;

/// A push query to run against the `/query-stream` endpoint.
///
/// # Examples
///
/// ```rust
/// use ksql_link::QuerySql;
///
/// let query = QuerySql::new("SELECT * FROM ${stream_name} EMIT CHANGES LIMIT 1;")
///     .with_property("auto.offset.reset", "earliest")
///     .with_variable("stream_name", "pageviews");
///
/// assert_eq!(query.properties["auto.offset.reset"], "earliest");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySql {
    /// SQL text, possibly containing `${name}` placeholders
    pub sql: String,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default)]
    pub variables: Variables,
}

impl QuerySql {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}
