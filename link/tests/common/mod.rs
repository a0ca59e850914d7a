#![allow(dead_code)]
//! Scripted local HTTP/1.1 server for exercising the client without a
//! running ksqlDB.
//!
//! Each accepted connection consumes the next [`Script`]: the request is
//! recorded, then the response is written as a chunked body one [`Step`] at a
//! time so tests control exactly when each byte reaches the client.

use ksql_link::{KsqlLinkClient, KsqlLinkTimeouts};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One action of a scripted response body.
#[derive(Debug, Clone)]
pub enum Step {
    /// Write a chunk
    Chunk(String),
    /// Wait before the next step
    Pause(Duration),
    /// Keep the connection open until the client goes away
    Hold,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub status: u16,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn ok(steps: Vec<Step>) -> Self {
        Self { status: 200, steps }
    }

    /// Whole body in a single chunk.
    pub fn body(status: u16, body: &str) -> Self {
        Self {
            status,
            steps: vec![Step::Chunk(body.to_string())],
        }
    }
}

pub fn chunk(s: &str) -> Step {
    Step::Chunk(s.to_string())
}

pub fn pause_ms(ms: u64) -> Step {
    Step::Pause(Duration::from_millis(ms))
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnects: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn start(scripts: Vec<Script>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let disconnects = Arc::new(AtomicUsize::new(0));
        let scripts = Arc::new(Mutex::new(VecDeque::from(scripts)));

        let task_requests = Arc::clone(&requests);
        let task_disconnects = Arc::clone(&disconnects);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let script = scripts
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Script::body(500, "no script left"));
                let requests = Arc::clone(&task_requests);
                let disconnects = Arc::clone(&task_disconnects);
                tokio::spawn(async move {
                    serve(socket, script, requests, disconnects).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
            disconnects,
        }
    }

    pub fn client(&self) -> KsqlLinkClient {
        self.client_with_timeouts(KsqlLinkTimeouts::fast())
    }

    pub fn client_with_timeouts(&self, timeouts: KsqlLinkTimeouts) -> KsqlLinkClient {
        KsqlLinkClient::builder()
            .base_url(&self.base_url)
            .allow_http(true)
            .timeouts(timeouts)
            .build()
            .expect("build client")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until a held connection has been closed by the client.
    pub async fn wait_for_disconnect(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.disconnects.load(Ordering::SeqCst) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut tmp).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut tmp).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

async fn serve(
    mut socket: TcpStream,
    script: Script,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnects: Arc<AtomicUsize>,
) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    requests.lock().unwrap().push(request);

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        script.status,
        if script.status < 400 { "OK" } else { "Error" }
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }

    for step in script.steps {
        match step {
            Step::Chunk(data) => {
                if data.is_empty() {
                    continue;
                }
                let framed = format!("{:x}\r\n{}\r\n", data.len(), data);
                if socket.write_all(framed.as_bytes()).await.is_err() {
                    disconnects.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                let _ = socket.flush().await;
            },
            Step::Pause(d) => tokio::time::sleep(d).await,
            Step::Hold => {
                let mut tmp = [0u8; 1024];
                loop {
                    match socket.read(&mut tmp).await {
                        Ok(0) | Err(_) => {
                            disconnects.fetch_add(1, Ordering::SeqCst);
                            return;
                        },
                        Ok(_) => {},
                    }
                }
            },
        }
    }

    let _ = socket.write_all(b"0\r\n\r\n").await;
    let _ = socket.shutdown().await;
}

/// Body of a `/query-stream` header frame.
pub fn header_json(names: &[&str], types: &[&str]) -> String {
    serde_json::json!({
        "queryId": "transient_TEST_1",
        "columnNames": names,
        "columnTypes": types,
    })
    .to_string()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
