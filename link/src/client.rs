//! Main ksqlDB client with builder pattern.
//!
//! Provides the primary interface for connecting to a ksqlDB server, running
//! push queries, and executing statements.

use reqwest::Url;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    auth::AuthProvider,
    codec::DEFAULT_MAX_FRAME_BYTES,
    error::{KsqlLinkError, Result},
    models::{ConnectionOptions, ExecResult, Header, HttpVersion, QuerySql, Row, StmntSql, StreamInfo, TableInfo},
    push::{PushHandle, PushQueryDriver},
    query::QueryExecutor,
    timeouts::KsqlLinkTimeouts,
};

/// Main ksqlDB client.
///
/// Use [`KsqlLinkClientBuilder`] to construct instances with custom configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use ksql_link::{Header, KsqlLinkClient, QuerySql, Row};
/// use tokio::sync::mpsc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = KsqlLinkClient::builder()
///     .base_url("http://localhost:8088")
///     .allow_http(true)
///     .build()?;
///
/// let (header_tx, mut header_rx) = mpsc::channel::<Header>(1);
/// let (row_tx, mut row_rx) = mpsc::channel::<Row>(16);
/// let cancel = CancellationToken::new();
///
/// let consumer = tokio::spawn(async move {
///     if let Some(header) = header_rx.recv().await {
///         println!("columns: {:?}", header.column_names);
///     }
///     while let Some(row) = row_rx.recv().await {
///         println!("row: {:?}", row);
///     }
/// });
///
/// let query = QuerySql::new("SELECT * FROM pageviews EMIT CHANGES LIMIT 5;")
///     .with_property("auto.offset.reset", "earliest");
/// client.push(&cancel, &query, header_tx, row_tx).await?;
/// consumer.await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KsqlLinkClient {
    base_url: String,
    push_driver: PushQueryDriver,
    query_executor: QueryExecutor,
    timeouts: KsqlLinkTimeouts,
}

impl KsqlLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> KsqlLinkClientBuilder {
        KsqlLinkClientBuilder::new()
    }

    /// Run a push query, delivering the header on `header_tx` and rows on
    /// `row_tx` until the stream ends, an error occurs, or `cancel` fires.
    ///
    /// See [`PushQueryDriver::push`] for the full delivery contract.
    pub async fn push(
        &self,
        cancel: &CancellationToken,
        query: &QuerySql,
        header_tx: mpsc::Sender<Header>,
        row_tx: mpsc::Sender<Row>,
    ) -> Result<()> {
        self.push_driver.push(cancel, query, header_tx, row_tx).await
    }

    /// Run a push query on a background task; rows are buffered up to
    /// `channel_capacity`.
    pub fn spawn_push(&self, query: QuerySql, channel_capacity: usize) -> PushHandle {
        self.push_driver.spawn(query, channel_capacity)
    }

    /// Execute statements on the `/ksql` endpoint
    pub async fn exec(&self, stmnt: &StmntSql) -> Result<Vec<ExecResult>> {
        self.query_executor.exec(stmnt).await
    }

    /// List streams
    pub async fn show_streams(&self) -> Result<Vec<StreamInfo>> {
        self.query_executor.show_streams().await
    }

    /// List tables
    pub async fn show_tables(&self) -> Result<Vec<TableInfo>> {
        self.query_executor.show_tables().await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configured timeouts
    pub fn timeouts(&self) -> &KsqlLinkTimeouts {
        &self.timeouts
    }
}

/// Builder for configuring [`KsqlLinkClient`] instances.
pub struct KsqlLinkClientBuilder {
    base_url: Option<String>,
    auth: AuthProvider,
    timeouts: KsqlLinkTimeouts,
    connection_options: ConnectionOptions,
    max_frame_bytes: usize,
}

impl KsqlLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            auth: AuthProvider::none(),
            timeouts: KsqlLinkTimeouts::default(),
            connection_options: ConnectionOptions::default(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Set the base URL of the ksqlDB server, e.g. `https://ksqldb:8088`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set authentication provider directly
    pub fn auth(mut self, auth: AuthProvider) -> Self {
        self.auth = auth;
        self
    }

    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(AuthProvider::basic_auth(username, password))
    }

    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.auth(AuthProvider::bearer_token(token))
    }

    /// Set comprehensive timeout configuration for all operations
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ksql_link::{KsqlLinkClient, KsqlLinkTimeouts};
    ///
    /// # fn example() -> ksql_link::Result<()> {
    /// let client = KsqlLinkClient::builder()
    ///     .base_url("https://ksqldb.internal:8088")
    ///     .timeouts(KsqlLinkTimeouts::fast())
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn timeouts(mut self, timeouts: KsqlLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set connection options (HTTP version, plaintext policy)
    pub fn connection_options(mut self, options: ConnectionOptions) -> Self {
        self.connection_options = options;
        self
    }

    /// Permit a plaintext `http://` base URL
    pub fn allow_http(mut self, allow: bool) -> Self {
        self.connection_options.allow_http = allow;
        self
    }

    /// Shorthand for setting just the HTTP version
    ///
    /// - `HttpVersion::Http1` - HTTP/1.1 only
    /// - `HttpVersion::Http2` - HTTP/2 with prior knowledge (h2c over `http://`)
    /// - `HttpVersion::Auto` - negotiate (default)
    pub fn http_version(mut self, version: HttpVersion) -> Self {
        self.connection_options.http_version = version;
        self
    }

    /// Upper bound for a single frame of a push query response
    pub fn max_frame_bytes(mut self, bytes: usize) -> Self {
        self.max_frame_bytes = bytes;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<KsqlLinkClient> {
        let raw_url = self
            .base_url
            .ok_or_else(|| KsqlLinkError::ConfigurationError("base_url is required".into()))?;
        let base_url = validate_base_url(&raw_url, self.connection_options.allow_http)?;

        let mut client_builder = reqwest::Client::builder()
            .connect_timeout(self.timeouts.connection_timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90));

        // No client-wide timeout: push streams are open-ended, `/ksql`
        // requests set their own
        client_builder = match self.connection_options.http_version {
            HttpVersion::Http1 => {
                log::debug!("[CLIENT] Using HTTP/1.1 only");
                client_builder.http1_only()
            },
            HttpVersion::Http2 => {
                log::debug!("[CLIENT] Using HTTP/2 with prior knowledge");
                client_builder.http2_prior_knowledge()
            },
            HttpVersion::Auto => {
                log::debug!("[CLIENT] Using automatic HTTP version negotiation");
                client_builder
            },
        };

        let http_client = client_builder
            .build()
            .map_err(|e| KsqlLinkError::ConfigurationError(e.to_string()))?;

        let push_driver = PushQueryDriver::new(
            base_url.clone(),
            http_client.clone(),
            self.auth.clone(),
            self.timeouts.push_idle_timeout,
            self.max_frame_bytes,
        );
        let query_executor = QueryExecutor::new(
            base_url.clone(),
            http_client,
            self.auth,
            self.timeouts.request_timeout,
        );

        Ok(KsqlLinkClient {
            base_url,
            push_driver,
            query_executor,
            timeouts: self.timeouts,
        })
    }
}

/// Check scheme/host/plaintext policy and return the URL without a trailing `/`.
fn validate_base_url(raw: &str, allow_http: bool) -> Result<String> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        KsqlLinkError::ConfigurationError(format!("Invalid base_url '{}': {}", raw, e))
    })?;

    if url.host_str().is_none() {
        return Err(KsqlLinkError::ConfigurationError("base_url must include a host".to_string()));
    }

    match url.scheme() {
        "https" => {},
        "http" if allow_http => {},
        "http" => {
            return Err(KsqlLinkError::ConfigurationError(
                "Refusing plaintext http:// base_url; enable allow_http to permit it".to_string(),
            ));
        },
        other => {
            return Err(KsqlLinkError::ConfigurationError(format!(
                "Unsupported base_url scheme '{}'; expected http or https",
                other
            )));
        },
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(KsqlLinkError::ConfigurationError(
            "base_url must not include query parameters or fragments".to_string(),
        ));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
