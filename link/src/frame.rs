//! Streaming frame parser for push query responses.
//!
//! Turns the incrementally arriving body into a forward-only sequence of
//! [`Frame`]s: one header, then rows, then either an end or an error frame.
//! Both the `/query-stream` layout (`[{header}, [row], ...]`) and the legacy
//! `/query` wrappers (`{"header": ...}`, `{"row": {"columns": ...}}`,
//! `{"finalMessage": ...}`) are understood.

use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::pin::Pin;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

use crate::codec::JsonFrameCodec;
use crate::error::{KsqlLinkError, Result};
use crate::models::{Header, ServerErrorBody, SqlType};

/// Boxed stream of decoded JSON values, one per frame.
pub type JsonValueStream = Pin<Box<dyn Stream<Item = Result<JsonValue>> + Send>>;

/// Keys of metadata objects interleaved with rows that carry no row data.
const METADATA_KEYS: &[&str] = &["continuationToken", "consistencyToken"];

/// One unit of the response stream.
#[derive(Debug)]
pub enum Frame {
    /// Always the first frame of a successful stream
    Header(Header),
    /// Raw wire values of one row, in column order
    Row(Vec<JsonValue>),
    /// The server closed the stream cleanly, with its final message if any
    End(Option<String>),
    /// Terminal failure; no frame follows
    Error(KsqlLinkError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    AwaitingHeader,
    Rows,
    Done,
}

/// Forward-only frame reader over one response body. Not restartable.
pub struct FrameParser {
    values: JsonValueStream,
    state: ParserState,
}

impl FrameParser {
    /// Parse an already-split stream of JSON values.
    pub fn new<S>(values: S) -> Self
    where
        S: Stream<Item = Result<JsonValue>> + Send + 'static,
    {
        Self {
            values: Box::pin(values),
            state: ParserState::AwaitingHeader,
        }
    }

    /// Parse a raw byte stream, splitting values with [`JsonFrameCodec`].
    pub fn from_byte_stream<S>(bytes: S, codec: JsonFrameCodec) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        Self::new(FramedRead::new(StreamReader::new(bytes), codec))
    }

    /// Parse a `reqwest` response body.
    pub fn from_response(response: reqwest::Response, codec: JsonFrameCodec) -> Self {
        let bytes = response.bytes_stream().map_err(std::io::Error::other);
        Self::from_byte_stream(bytes, codec)
    }

    /// True once an end or error frame has been produced.
    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Read the next frame, waiting for more bytes as needed.
    ///
    /// Returns `None` after the terminal end/error frame.
    pub async fn next(&mut self) -> Option<Frame> {
        if self.state == ParserState::Done {
            return None;
        }

        let frame = loop {
            let frame = match self.values.next().await {
                Some(Ok(value)) => self.classify(value),
                Some(Err(e)) => Some(Frame::Error(e)),
                None if self.state == ParserState::AwaitingHeader => {
                    Some(Frame::Error(KsqlLinkError::ConnectionError(
                        "stream closed before a header was received".to_string(),
                    )))
                },
                None => Some(Frame::End(None)),
            };
            if let Some(frame) = frame {
                break frame;
            }
        };

        self.state = match frame {
            Frame::Header(_) | Frame::Row(_) => ParserState::Rows,
            Frame::End(_) | Frame::Error(_) => ParserState::Done,
        };
        Some(frame)
    }

    /// Map one JSON value to a frame; `None` means the value is skipped.
    fn classify(&self, value: JsonValue) -> Option<Frame> {
        if let Some(body) = ServerErrorBody::from_json(&value) {
            return Some(Frame::Error(query_error(body)));
        }

        match (self.state, value) {
            (ParserState::AwaitingHeader, JsonValue::Object(obj)) => Some(parse_header(obj)),
            (ParserState::AwaitingHeader, other) => Some(Frame::Error(KsqlLinkError::ProtocolError(
                format!("expected a header object as first frame, got {}", kind_of(&other)),
            ))),
            (ParserState::Rows, JsonValue::Array(values)) => Some(Frame::Row(values)),
            (ParserState::Rows, JsonValue::Object(obj)) => parse_wrapped(obj),
            (_, other) => Some(Frame::Error(KsqlLinkError::ProtocolError(format!(
                "unexpected {} frame",
                kind_of(&other)
            )))),
        }
    }
}

fn query_error(body: ServerErrorBody) -> KsqlLinkError {
    KsqlLinkError::QueryError {
        error_code: body.error_code,
        message: body.message,
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn header_frame(header: Header) -> Frame {
    if header.column_names.len() != header.column_types.len() {
        return Frame::Error(KsqlLinkError::ProtocolError(format!(
            "header has {} column names but {} column types",
            header.column_names.len(),
            header.column_types.len()
        )));
    }
    Frame::Header(header)
}

fn parse_header(mut obj: JsonMap<String, JsonValue>) -> Frame {
    if obj.contains_key("columnNames") {
        return match serde_json::from_value::<Header>(JsonValue::Object(obj)) {
            Ok(header) => header_frame(header),
            Err(e) => Frame::Error(KsqlLinkError::ProtocolError(format!("invalid header: {}", e))),
        };
    }

    if let Some(JsonValue::Object(legacy)) = obj.remove("header") {
        let query_id = legacy.get("queryId").and_then(JsonValue::as_str).map(str::to_string);
        let schema = legacy.get("schema").and_then(JsonValue::as_str).unwrap_or_default();
        let Some(fields) = SqlType::parse_schema(schema) else {
            return Frame::Error(KsqlLinkError::ProtocolError(format!(
                "invalid header schema: {}",
                schema
            )));
        };
        let (column_names, column_types) = fields
            .into_iter()
            .map(|f| (f.name, f.data_type.to_string()))
            .unzip();
        return header_frame(Header {
            query_id,
            column_names,
            column_types,
        });
    }

    if let Some(message) = obj.remove("errorMessage") {
        return Frame::Error(legacy_error(message));
    }

    Frame::Error(KsqlLinkError::ProtocolError(
        "first frame does not carry columnNames/columnTypes".to_string(),
    ))
}

/// Object frames after the header: legacy row/final/error wrappers and
/// metadata tokens.
fn parse_wrapped(mut obj: JsonMap<String, JsonValue>) -> Option<Frame> {
    if let Some(row) = obj.remove("row") {
        return match row {
            JsonValue::Object(mut row) => match row.remove("columns") {
                Some(JsonValue::Array(columns)) => Some(Frame::Row(columns)),
                _ => Some(Frame::Error(KsqlLinkError::ProtocolError(
                    "row frame without columns".to_string(),
                ))),
            },
            _ => Some(Frame::Error(KsqlLinkError::ProtocolError(
                "row frame is not an object".to_string(),
            ))),
        };
    }

    if let Some(message) = obj.remove("errorMessage") {
        return Some(Frame::Error(legacy_error(message)));
    }

    if let Some(message) = obj.remove("finalMessage") {
        return Some(Frame::End(message.as_str().map(str::to_string)));
    }

    if METADATA_KEYS.iter().any(|k| obj.contains_key(*k)) {
        log::trace!("[KSQL_PUSH] Skipping metadata frame: {:?}", obj.keys().collect::<Vec<_>>());
        return None;
    }

    Some(Frame::Error(KsqlLinkError::ProtocolError(format!(
        "unrecognized frame with keys {:?}",
        obj.keys().collect::<Vec<_>>()
    ))))
}

fn legacy_error(message: JsonValue) -> KsqlLinkError {
    match ServerErrorBody::from_json(&message) {
        Some(body) => query_error(body),
        None => KsqlLinkError::QueryError {
            error_code: 0,
            message: message
                .get("message")
                .and_then(JsonValue::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| message.to_string()),
        },
    }
}
