//! Type-directed decoding of column values.
//!
//! The wire encodes every number the same way, so the declared column type
//! decides what a value becomes. All numeric SQL types collapse into
//! [`KsqlValue::Number`]. Decoding is total: a value that does not match its
//! declared type, or a type this crate does not know, passes through with a
//! structural conversion instead of failing the row.

use log::trace;
use serde_json::Value as JsonValue;

use crate::models::{Header, KsqlValue, Row, SqlType};

/// Decode one raw wire value according to its declared type.
pub fn coerce(declared: &SqlType, raw: JsonValue) -> KsqlValue {
    match (declared, raw) {
        (_, JsonValue::Null) => KsqlValue::Null,
        (SqlType::Boolean, JsonValue::Bool(b)) => KsqlValue::Bool(b),
        (
            SqlType::String | SqlType::Bytes | SqlType::Date | SqlType::Time | SqlType::Timestamp,
            JsonValue::String(s),
        ) => KsqlValue::String(s),
        (ty, JsonValue::Number(n)) if ty.is_numeric() => {
            n.as_f64().map(KsqlValue::Number).unwrap_or(KsqlValue::Null)
        },
        // Decimals may be serialized as strings to keep their precision
        (SqlType::Decimal { .. }, JsonValue::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) => KsqlValue::Number(n),
            Err(_) => KsqlValue::String(s),
        },
        (SqlType::Array(inner), JsonValue::Array(items)) => {
            KsqlValue::List(items.into_iter().map(|item| coerce(inner, item)).collect())
        },
        (SqlType::Map(_, value_type), JsonValue::Object(entries)) => KsqlValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| {
                    let v = coerce(value_type, v);
                    (k, v)
                })
                .collect(),
        ),
        (SqlType::Struct(fields), JsonValue::Object(entries)) => KsqlValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| {
                    let field = fields
                        .iter()
                        .find(|f| f.name == k)
                        .or_else(|| fields.iter().find(|f| f.name.eq_ignore_ascii_case(&k)));
                    let v = match field {
                        Some(field) => coerce(&field.data_type, v),
                        None => KsqlValue::from(v),
                    };
                    (k, v)
                })
                .collect(),
        ),
        (declared, raw) => {
            let value = KsqlValue::from(raw);
            if !matches!(declared, SqlType::Unknown(_)) {
                trace!("[KSQL_PUSH] {} column carried a {} value, kept as-is", declared, value.kind());
            }
            value
        },
    }
}

/// Decode one raw wire value from a declared type spelling.
pub fn coerce_str(declared: &str, raw: JsonValue) -> KsqlValue {
    coerce(&SqlType::parse(declared), raw)
}

/// Column decoder bound to one header; parses the declared types once.
#[derive(Debug, Clone)]
pub struct RowDecoder {
    types: Vec<SqlType>,
}

impl RowDecoder {
    pub fn new(header: &Header) -> Self {
        Self {
            types: header.sql_types(),
        }
    }

    pub fn arity(&self) -> usize {
        self.types.len()
    }

    /// Decode a raw row. Returns `None` when its length differs from the header.
    pub fn decode(&self, raw: Vec<JsonValue>) -> Option<Row> {
        if raw.len() != self.types.len() {
            return None;
        }
        let values = self
            .types
            .iter()
            .zip(raw)
            .map(|(ty, value)| coerce(ty, value))
            .collect();
        Some(Row::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_types_collapse_to_number() {
        assert_eq!(coerce_str("INT", json!(1)), KsqlValue::Number(1.0));
        assert_eq!(coerce_str("BIGINT", json!(10)), KsqlValue::Number(10.0));
        assert_eq!(coerce_str("DOUBLE", json!(1.5)), KsqlValue::Number(1.5));
        assert_eq!(coerce_str("DECIMAL(5, 2)", json!(10.50)), KsqlValue::Number(10.5));
        assert_eq!(coerce_str("DECIMAL(5, 2)", json!("10.50")), KsqlValue::Number(10.5));
    }

    #[test]
    fn test_scalar_passthrough() {
        assert_eq!(coerce_str("BOOLEAN", json!(true)), KsqlValue::Bool(true));
        assert_eq!(coerce_str("VARCHAR", json!("varchar")), KsqlValue::from("varchar"));
        assert_eq!(coerce_str("STRING", json!("s")), KsqlValue::from("s"));
        assert_eq!(coerce_str("TIMESTAMP", json!("2024-01-01T00:00:00.000")), KsqlValue::from("2024-01-01T00:00:00.000"));
    }

    #[test]
    fn test_null_wins_over_declared_type() {
        for ty in ["BOOLEAN", "STRING", "INT", "DECIMAL(5, 2)", "ARRAY<INT>", "MAP<STRING, INT>", "GEOMETRY"] {
            assert_eq!(coerce_str(ty, JsonValue::Null), KsqlValue::Null, "type {}", ty);
        }
    }

    #[test]
    fn test_structured_types_recurse() {
        let value = coerce_str("ARRAY<BIGINT>", json!([1, null, 3]));
        assert_eq!(
            value,
            KsqlValue::List(vec![KsqlValue::Number(1.0), KsqlValue::Null, KsqlValue::Number(3.0)])
        );

        let value = coerce_str("MAP<STRING, ARRAY<STRING>>", json!({"k": ["a"]}));
        assert_eq!(value.get("k"), Some(&KsqlValue::List(vec![KsqlValue::from("a")])));

        let value = coerce_str(
            "STRUCT<`CITY` STRING, `GEO` STRUCT<`LAT` DOUBLE>>",
            json!({"CITY": "Oslo", "GEO": {"LAT": 59.9}, "EXTRA": 1}),
        );
        assert_eq!(value.get("CITY"), Some(&KsqlValue::from("Oslo")));
        assert_eq!(value.get("GEO").and_then(|g| g.get("LAT")), Some(&KsqlValue::Number(59.9)));
        assert_eq!(value.get("EXTRA"), Some(&KsqlValue::Number(1.0)));
    }

    #[test]
    fn test_unknown_or_mismatched_types_pass_through() {
        assert_eq!(coerce_str("GEOMETRY", json!({"x": 1})), KsqlValue::from(json!({"x": 1})));
        assert_eq!(coerce_str("BOOLEAN", json!("yes")), KsqlValue::from("yes"));
        assert_eq!(coerce_str("INT", json!("7")), KsqlValue::from("7"));
        assert_eq!(coerce_str("DOUBLE", json!([1.5])).kind(), "list");
        assert_eq!(coerce_str("ARRAY<INT>", json!({"a": 1})).kind(), "map");
    }

    #[test]
    fn test_row_decoder_checks_arity() {
        let header = Header::new(
            vec!["A".into(), "B".into()],
            vec!["INT".into(), "STRING".into()],
        );
        let decoder = RowDecoder::new(&header);
        assert_eq!(decoder.arity(), 2);

        let row = decoder.decode(vec![json!(3), json!("x")]).unwrap();
        assert_eq!(row.values(), &[KsqlValue::Number(3.0), KsqlValue::from("x")]);
        assert!(decoder.decode(vec![json!(3)]).is_none());
    }
}
