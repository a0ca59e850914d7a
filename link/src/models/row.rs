use serde::Serialize;
use std::collections::HashMap;

use super::header::Header;
use super::ksql_value::KsqlValue;

/// One decoded result row, positionally aligned with the [`Header`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(pub Vec<KsqlValue>);

impl Row {
    pub fn new(values: Vec<KsqlValue>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KsqlValue> {
        self.0.get(index)
    }

    pub fn values(&self) -> &[KsqlValue] {
        &self.0
    }

    pub fn into_values(self) -> Vec<KsqlValue> {
        self.0
    }

    /// Look up a value by column name using the header it was decoded with.
    pub fn get_by_name(&self, header: &Header, name: &str) -> Option<&KsqlValue> {
        self.get(header.column_index(name)?)
    }

    /// Pair every value with its column name (for convenience)
    pub fn to_map(&self, header: &Header) -> HashMap<String, KsqlValue> {
        let mut map = HashMap::with_capacity(header.len());
        for (name, value) in header.column_names.iter().zip(self.0.iter()) {
            map.insert(name.clone(), value.clone());
        }
        map
    }
}

impl From<Vec<KsqlValue>> for Row {
    fn from(values: Vec<KsqlValue>) -> Self {
        Self(values)
    }
}
