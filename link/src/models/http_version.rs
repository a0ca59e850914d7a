use serde::{Deserialize, Serialize};

/// HTTP protocol version used for engine connections.
///
/// Push queries on `/query-stream` may require HTTP/2; over plaintext
/// `http://` that means prior-knowledge h2c.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HttpVersion {
    /// HTTP/1.1 only
    #[serde(rename = "http1", alias = "http/1.1", alias = "1.1")]
    Http1,

    /// HTTP/2 with prior knowledge
    #[serde(rename = "http2", alias = "http/2", alias = "2")]
    Http2,

    /// Let the client negotiate (ALPN over TLS, HTTP/1.1 otherwise)
    #[default]
    #[serde(rename = "auto")]
    Auto,
}
