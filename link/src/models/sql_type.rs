use std::fmt;

/// Declared SQL type of a result column, parsed from the spelling the engine
/// puts in the header (`"BIGINT"`, `"DECIMAL(5, 2)"`, `"MAP<STRING, ARRAY<INT>>"`).
///
/// Parsing is total: anything the grammar does not recognize becomes
/// [`SqlType::Unknown`] carrying the original spelling.
///
/// # Example
///
/// ```rust
/// use ksql_link::SqlType;
///
/// let ty = SqlType::parse("ARRAY<DECIMAL(10, 2)>");
/// assert_eq!(ty, SqlType::Array(Box::new(SqlType::Decimal { precision: 10, scale: 2 })));
/// assert_eq!(ty.to_string(), "ARRAY<DECIMAL(10, 2)>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    /// `VARCHAR` / `STRING`
    String,
    /// `INT` / `INTEGER`
    Integer,
    BigInt,
    Double,
    Decimal { precision: u32, scale: u32 },
    Bytes,
    Date,
    Time,
    Timestamp,
    Array(Box<SqlType>),
    Map(Box<SqlType>, Box<SqlType>),
    Struct(Vec<StructField>),
    Unknown(String),
}

/// One named field of a `STRUCT<...>` type or of a legacy header schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub data_type: SqlType,
}

impl SqlType {
    /// Parse a declared type spelling. Never fails.
    pub fn parse(spelling: &str) -> SqlType {
        let mut parser = TypeParser::new(spelling);
        match parser.parse_type() {
            Some(ty) if parser.at_end() => ty,
            _ => SqlType::Unknown(spelling.trim().to_string()),
        }
    }

    /// Parse a schema string of the form ``"`A` INTEGER, `B` STRING"``.
    ///
    /// Returns `None` when the string is not a well-formed field list.
    pub fn parse_schema(schema: &str) -> Option<Vec<StructField>> {
        let mut parser = TypeParser::new(schema);
        if parser.at_end() {
            return Some(Vec::new());
        }
        let fields = parser.parse_fields()?;
        parser.at_end().then_some(fields)
    }

    /// True for every type decoded into [`KsqlValue::Number`](super::KsqlValue::Number).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SqlType::Integer | SqlType::BigInt | SqlType::Double | SqlType::Decimal { .. }
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::String => write!(f, "STRING"),
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Double => write!(f, "DOUBLE"),
            SqlType::Decimal { precision, scale } => write!(f, "DECIMAL({}, {})", precision, scale),
            SqlType::Bytes => write!(f, "BYTES"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Time => write!(f, "TIME"),
            SqlType::Timestamp => write!(f, "TIMESTAMP"),
            SqlType::Array(inner) => write!(f, "ARRAY<{}>", inner),
            SqlType::Map(key, value) => write!(f, "MAP<{}, {}>", key, value),
            SqlType::Struct(fields) => {
                write!(f, "STRUCT<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "`{}` {}", field.name.replace('`', "``"), field.data_type)?;
                }
                write!(f, ">")
            },
            SqlType::Unknown(spelling) => write!(f, "{}", spelling),
        }
    }
}

/// Deepest `ARRAY`/`MAP`/`STRUCT` nesting accepted, same as serde_json's
/// recursion limit.
const MAX_TYPE_DEPTH: usize = 128;

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.input.len()
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn eat(&mut self, expected: char) -> Option<()> {
        if self.peek()? == expected {
            self.pos += expected.len_utf8();
            Some(())
        } else {
            None
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn number(&mut self) -> Option<u32> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let value = rest[..len].parse().ok()?;
        self.pos += len;
        Some(value)
    }

    fn quoted_name(&mut self) -> Option<String> {
        self.eat('`')?;
        let mut name = String::new();
        let mut chars = self.rest().char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            if c == '`' {
                if matches!(chars.peek(), Some((_, '`'))) {
                    chars.next();
                    name.push('`');
                    continue;
                }
                self.pos += offset + 1;
                return Some(name);
            }
            name.push(c);
        }
        None
    }

    fn parse_type(&mut self) -> Option<SqlType> {
        if self.depth >= MAX_TYPE_DEPTH {
            return None;
        }
        self.depth += 1;
        let ty = self.parse_type_inner();
        self.depth -= 1;
        ty
    }

    fn parse_type_inner(&mut self) -> Option<SqlType> {
        let start = self.pos;
        let word = self.ident()?;
        let ty = match word.to_ascii_uppercase().as_str() {
            "BOOLEAN" => SqlType::Boolean,
            "VARCHAR" | "STRING" => {
                self.skip_length();
                SqlType::String
            },
            "INT" | "INTEGER" => SqlType::Integer,
            "BIGINT" => SqlType::BigInt,
            "DOUBLE" => SqlType::Double,
            "BYTES" => SqlType::Bytes,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "TIMESTAMP" => SqlType::Timestamp,
            "DECIMAL" => {
                self.eat('(')?;
                let precision = self.number()?;
                self.eat(',')?;
                let scale = self.number()?;
                self.eat(')')?;
                SqlType::Decimal { precision, scale }
            },
            "ARRAY" => {
                self.eat('<')?;
                let inner = self.parse_type()?;
                self.eat('>')?;
                SqlType::Array(Box::new(inner))
            },
            "MAP" => {
                self.eat('<')?;
                let key = self.parse_type()?;
                self.eat(',')?;
                let value = self.parse_type()?;
                self.eat('>')?;
                SqlType::Map(Box::new(key), Box::new(value))
            },
            "STRUCT" => {
                self.eat('<')?;
                if self.eat('>').is_some() {
                    return Some(SqlType::Struct(Vec::new()));
                }
                let fields = self.parse_fields()?;
                self.eat('>')?;
                SqlType::Struct(fields)
            },
            _ => {
                self.skip_length();
                SqlType::Unknown(self.input[start..self.pos].trim().to_string())
            },
        };
        Some(ty)
    }

    fn parse_fields(&mut self) -> Option<Vec<StructField>> {
        let mut fields = Vec::new();
        loop {
            let name = if self.peek()? == '`' {
                self.quoted_name()?
            } else {
                self.ident()?.to_string()
            };
            let data_type = self.parse_type()?;
            fields.push(StructField { name, data_type });
            if self.eat(',').is_none() {
                return Some(fields);
            }
        }
    }

    /// Skip an optional `(n)` length suffix such as `VARCHAR(32)`.
    fn skip_length(&mut self) {
        let save = self.pos;
        if self.eat('(').is_some() && self.number().is_some() && self.eat(')').is_some() {
            return;
        }
        self.pos = save;
    }
}
