//! Push query driver.
//!
//! Opens one `/query-stream` request, drives the [`FrameParser`] over its
//! body, decodes rows against the header, and hands header and rows to the
//! caller through two channels. The decode/deliver loop is the only writer to
//! both channels, and no row is sent until the consumer has received the
//! header, so the header is observed first however the two channels are
//! read. Rows keep the order the server produced them in.
//!
//! Cancellation is cooperative: the token is raced against every network wait
//! and every channel send, and a cancelled call returns `Ok(())`.

use log::{debug, warn};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    auth::AuthProvider,
    codec::JsonFrameCodec,
    coerce::RowDecoder,
    error::{KsqlLinkError, Result},
    frame::{Frame, FrameParser},
    models::{Header, QuerySql, QueryStreamRequest, Row},
    statement::{preview, substitute_variables},
};

/// Outcome of one blocking channel send.
enum Delivery {
    Delivered,
    Cancelled,
    ReceiverGone,
}

async fn deliver<T>(cancel: &CancellationToken, tx: &mpsc::Sender<T>, value: T) -> Delivery {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Delivery::Cancelled,
        sent = tx.send(value) => match sent {
            Ok(()) => Delivery::Delivered,
            Err(_) => Delivery::ReceiverGone,
        },
    }
}

/// Wait until the consumer has received everything queued on `tx`.
///
/// Holding every permit of the channel is only possible once it is empty.
async fn drained<T>(cancel: &CancellationToken, tx: &mpsc::Sender<T>) -> Delivery {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Delivery::Cancelled,
        permits = tx.reserve_many(tx.max_capacity()) => match permits {
            Ok(_) => Delivery::Delivered,
            Err(_) => Delivery::ReceiverGone,
        },
    }
}

/// Runs push queries over HTTP.
#[derive(Clone)]
pub struct PushQueryDriver {
    base_url: String,
    http_client: reqwest::Client,
    auth: AuthProvider,
    idle_timeout: Duration,
    max_frame_bytes: usize,
}

impl PushQueryDriver {
    pub(crate) fn new(
        base_url: String,
        http_client: reqwest::Client,
        auth: AuthProvider,
        idle_timeout: Duration,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            base_url,
            http_client,
            auth,
            idle_timeout,
            max_frame_bytes,
        }
    }

    /// Run one push query until the server ends the stream, an error occurs,
    /// or `cancel` fires.
    ///
    /// Sends the header exactly once on `header_tx`, then every row on
    /// `row_tx`. No row is sent until the consumer has received the header,
    /// so the consumer must read `header_tx`'s receiver (or drop it, which
    /// ends the query). Returns `Ok(())` on clean end of stream, on cancellation, and
    /// when the consumer drops a receiver. Connection and query errors raised
    /// before the stream opens are returned without any channel activity;
    /// values already delivered before a mid-stream error stay delivered.
    pub async fn push(
        &self,
        cancel: &CancellationToken,
        query: &QuerySql,
        header_tx: mpsc::Sender<Header>,
        row_tx: mpsc::Sender<Row>,
    ) -> Result<()> {
        let sql = substitute_variables(&query.sql, &query.variables);
        let request = QueryStreamRequest {
            sql,
            properties: query.properties.clone(),
        };
        debug!(
            "[KSQL_PUSH] Starting push query: \"{}\" (properties={})",
            preview(&request.sql),
            request.properties.len()
        );

        let started = Instant::now();
        let url = format!("{}/query-stream", self.base_url);
        let req_builder = self
            .http_client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request);
        let req_builder = self.auth.apply_to_request(req_builder);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[KSQL_PUSH] Cancelled before the stream opened");
                return Ok(());
            }
            sent = req_builder.send() => sent.map_err(|e| {
                warn!("[KSQL_HTTP] Failed to open {}: {}", url, e);
                KsqlLinkError::from(e)
            })?,
        };

        let status = response.status();
        debug!(
            "[KSQL_HTTP] Response received: status={} duration_ms={}",
            status,
            started.elapsed().as_millis()
        );
        if !status.is_success() {
            let text = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                text = response.text() => text.unwrap_or_else(|_| "Unknown error".to_string()),
            };
            let err = KsqlLinkError::from_response_body(status.as_u16(), &text);
            warn!("[KSQL_HTTP] Push query rejected: status={} error={}", status, err);
            return Err(err);
        }

        let mut parser =
            FrameParser::from_response(response, JsonFrameCodec::new(self.max_frame_bytes));
        let mut decoder: Option<RowDecoder> = None;
        let mut rows_delivered: u64 = 0;

        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("[KSQL_PUSH] Cancelled after {} rows", rows_delivered);
                    return Ok(());
                }
                frame = self.next_frame(&mut parser) => frame,
            };

            match frame {
                Some(Frame::Header(header)) => {
                    if decoder.is_some() {
                        return Err(KsqlLinkError::ProtocolError("duplicate header frame".to_string()));
                    }
                    debug!(
                        "[KSQL_PUSH] Header received: query_id={:?} columns={}",
                        header.query_id,
                        header.len()
                    );
                    decoder = Some(RowDecoder::new(&header));
                    if !Self::delivered(deliver(cancel, &header_tx, header).await, rows_delivered) {
                        return Ok(());
                    }
                    // No row may become visible while the header is still queued
                    if !Self::delivered(drained(cancel, &header_tx).await, rows_delivered) {
                        return Ok(());
                    }
                },
                Some(Frame::Row(raw)) => {
                    let decoder = decoder.as_ref().ok_or_else(|| {
                        KsqlLinkError::ProtocolError("row received before header".to_string())
                    })?;
                    let raw_len = raw.len();
                    let row = decoder.decode(raw).ok_or_else(|| {
                        KsqlLinkError::ProtocolError(format!(
                            "row has {} values but header declares {} columns",
                            raw_len,
                            decoder.arity()
                        ))
                    })?;
                    if !Self::delivered(deliver(cancel, &row_tx, row).await, rows_delivered) {
                        return Ok(());
                    }
                    rows_delivered += 1;
                },
                Some(Frame::End(message)) => {
                    debug!(
                        "[KSQL_PUSH] Stream ended: rows={} final_message={:?} total_ms={}",
                        rows_delivered,
                        message,
                        started.elapsed().as_millis()
                    );
                    return Ok(());
                },
                Some(Frame::Error(e)) => {
                    warn!("[KSQL_PUSH] Stream failed after {} rows: {}", rows_delivered, e);
                    return Err(e);
                },
                None => return Ok(()),
            }
        }
    }

    /// True when the send went through; logs why the loop stops otherwise.
    fn delivered(delivery: Delivery, rows_delivered: u64) -> bool {
        match delivery {
            Delivery::Delivered => true,
            Delivery::Cancelled => {
                debug!("[KSQL_PUSH] Cancelled while delivering, rows={}", rows_delivered);
                false
            },
            Delivery::ReceiverGone => {
                debug!("[KSQL_PUSH] Consumer dropped its receiver, closing stream");
                false
            },
        }
    }

    /// Next frame, bounded by the idle timeout when one is configured.
    async fn next_frame(&self, parser: &mut FrameParser) -> Option<Frame> {
        if self.idle_timeout.is_zero() {
            return parser.next().await;
        }
        match tokio::time::timeout(self.idle_timeout, parser.next()).await {
            Ok(frame) => frame,
            Err(_) => Some(Frame::Error(KsqlLinkError::TimeoutError(format!(
                "no data on push stream for {:?}",
                self.idle_timeout
            )))),
        }
    }

    /// Run [`push`](Self::push) on a background task and hand back the
    /// receiving ends.
    pub fn spawn(&self, query: QuerySql, channel_capacity: usize) -> PushHandle {
        let capacity = channel_capacity.max(1);
        let (header_tx, header_rx) = mpsc::channel(1);
        let (row_tx, row_rx) = mpsc::channel(capacity);
        let cancel = CancellationToken::new();
        let driver = self.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            driver.push(&task_cancel, &query, header_tx, row_tx).await
        });

        PushHandle {
            header_rx,
            row_rx,
            cancel,
            task,
        }
    }
}

/// A push query running on a background task.
///
/// Dropping the handle cancels the query.
///
/// # Examples
///
/// ```rust,no_run
/// use ksql_link::{KsqlLinkClient, QuerySql};
///
/// # async fn example() -> ksql_link::Result<()> {
/// let client = KsqlLinkClient::builder()
///     .base_url("http://localhost:8088")
///     .allow_http(true)
///     .build()?;
///
/// let mut push = client.spawn_push(QuerySql::new("SELECT * FROM pageviews EMIT CHANGES;"), 64);
/// if let Some(header) = push.header().await {
///     println!("columns: {:?}", header.column_names);
/// }
/// while let Some(row) = push.next_row().await {
///     println!("{:?}", row);
/// }
/// push.join().await?;
/// # Ok(())
/// # }
/// ```
pub struct PushHandle {
    header_rx: mpsc::Receiver<Header>,
    row_rx: mpsc::Receiver<Row>,
    cancel: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl PushHandle {
    /// Wait for the header. `None` if the query ended without one.
    pub async fn header(&mut self) -> Option<Header> {
        self.header_rx.recv().await
    }

    /// Wait for the next row. `None` once the query has ended.
    pub async fn next_row(&mut self) -> Option<Row> {
        self.row_rx.recv().await
    }

    /// Token that cancels this query.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop consuming, wait for the query to finish, and return its outcome.
    ///
    /// Values not yet received are discarded.
    pub async fn join(mut self) -> Result<()> {
        // Unblock a driver waiting on a full channel nobody will drain
        self.header_rx.close();
        self.row_rx.close();
        let task = &mut self.task;
        task.await
            .map_err(|e| KsqlLinkError::ConnectionError(format!("push task failed: {}", e)))?
    }
}

impl Drop for PushHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
