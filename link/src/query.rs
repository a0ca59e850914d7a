//! Statement execution against the `/ksql` endpoint.
//!
//! Unlike push queries, these responses are a single complete JSON document
//! (an array with one entity per statement).

use log::{debug, warn};
use std::time::{Duration, Instant};

use crate::{
    auth::AuthProvider,
    error::{KsqlLinkError, Result},
    models::{ExecResult, KsqlRequest, ServerErrorBody, StmntSql, StreamInfo, TableInfo},
    statement::{preview, substitute_variables},
};

const KSQL_MEDIA_TYPE: &str = "application/vnd.ksql.v1+json";

/// Handles statement execution via HTTP.
#[derive(Clone)]
pub struct QueryExecutor {
    base_url: String,
    http_client: reqwest::Client,
    auth: AuthProvider,
    request_timeout: Duration,
}

impl QueryExecutor {
    pub(crate) fn new(
        base_url: String,
        http_client: reqwest::Client,
        auth: AuthProvider,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            http_client,
            auth,
            request_timeout,
        }
    }

    /// Execute one or more statements. Exactly one HTTP attempt is made.
    pub async fn exec(&self, stmnt: &StmntSql) -> Result<Vec<ExecResult>> {
        let request = KsqlRequest {
            ksql: substitute_variables(&stmnt.ksql, &stmnt.variables),
            streams_properties: stmnt.properties.clone(),
        };
        debug!(
            "[KSQL_EXEC] Executing: \"{}\" (len={})",
            preview(&request.ksql),
            request.ksql.len()
        );

        let url = format!("{}/ksql", self.base_url);
        let mut req_builder = self
            .http_client
            .post(&url)
            .header(reqwest::header::ACCEPT, KSQL_MEDIA_TYPE)
            .json(&request);
        if !self.request_timeout.is_zero() {
            req_builder = req_builder.timeout(self.request_timeout);
        }
        let req_builder = self.auth.apply_to_request(req_builder);

        let start = Instant::now();
        let response = req_builder.send().await.map_err(|e| {
            warn!("[KSQL_HTTP] POST {} failed: {} duration_ms={}", url, e, start.elapsed().as_millis());
            KsqlLinkError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            "[KSQL_HTTP] Response received: status={} bytes={} duration_ms={}",
            status,
            body.len(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let err = KsqlLinkError::from_response_body(status.as_u16(), &body);
            warn!("[KSQL_EXEC] Statement rejected: status={} error={}", status, err);
            return Err(err);
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        // Some statement failures come back as 200 with a single error entity
        if let Some(err) = ServerErrorBody::from_json(&value) {
            return Err(KsqlLinkError::QueryError {
                error_code: err.error_code,
                message: err.message,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// `SHOW STREAMS;`
    pub async fn show_streams(&self) -> Result<Vec<StreamInfo>> {
        let results = self.exec(&StmntSql::new("SHOW STREAMS;")).await?;
        Ok(results.into_iter().filter_map(|r| r.streams).flatten().collect())
    }

    /// `SHOW TABLES;`
    pub async fn show_tables(&self) -> Result<Vec<TableInfo>> {
        let results = self.exec(&StmntSql::new("SHOW TABLES;")).await?;
        Ok(results.into_iter().filter_map(|r| r.tables).flatten().collect())
    }
}
