use serde::{Deserialize, Serialize};

use super::http_version::HttpVersion;

/// Connection-level options for the HTTP client.
///
/// # Example
///
/// ```rust
/// use ksql_link::{ConnectionOptions, HttpVersion};
///
/// let options = ConnectionOptions::new()
///     .with_allow_http(true)
///     .with_http_version(HttpVersion::Http2);
/// assert!(options.allow_http);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// HTTP protocol version to use for connections
    /// Default: Auto
    #[serde(default)]
    pub http_version: HttpVersion,

    /// Permit plaintext `http://` base URLs
    /// Default: false, only `https://` is accepted
    #[serde(default)]
    pub allow_http: bool,
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_version(mut self, version: HttpVersion) -> Self {
        self.http_version = version;
        self
    }

    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }
}
