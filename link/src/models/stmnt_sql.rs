use serde::{Deserialize, Serialize};

use super::query_sql::{Properties, Variables};

/// A non-streaming statement (DDL, `INSERT`, `SHOW ...`) for the `/ksql` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmntSql {
    /// One or more `;`-terminated statements, possibly with `${name}` placeholders
    pub ksql: String,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default)]
    pub variables: Variables,
}

impl StmntSql {
    pub fn new(ksql: impl Into<String>) -> Self {
        Self {
            ksql: ksql.into(),
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
