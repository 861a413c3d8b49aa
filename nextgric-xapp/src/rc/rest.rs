//! REST control endpoint
//!
//! A minimal HTTP/1.1 listener exposing a single route:
//!
//! ```text
//! POST /run  {"sst": ["1", "5"], "sd": ["000080", "000082"], "dedicated_ratio_prb": [10, 20]}
//! ```
//!
//! The three arrays describe one slice per index. Each request triggers one
//! Slice-level PRB quota control task on every connected node. Responses are
//! plain text.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use nextgric_common::RestConfig;
use nextgric_e2sm::rc::SlicePrbQuota;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::rc::runner::RcControlRunner;
use crate::tasks::{
    wait_for_shutdown, ShutdownReason, ShutdownReceiver, ShutdownSignal, Task, TaskError, TaskId,
};

const HEADER_END: &[u8] = b"\r\n\r\n";
const MAX_REQUEST_BYTES: usize = 64 * 1024;

pub const RUN_PATH: &str = "/run";
pub const TASK_EXECUTED: &str = "Task executed successfully\n";
pub const UNKNOWN_ENDPOINT: &str = "Unknown endpoint\nAvailable endpoints: ( /run )\n";

/// Rejections of a `/run` body. The message is the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid JSON structure\n")]
    InvalidJson,

    #[error(
        "Missing required arrays\n\
         All arrays must be provided: ( sst, sd, dedicated_ratio_prb )\n"
    )]
    MissingArrays,

    #[error(
        "Array lengths must match\n\
         sst, sd and dedicated_ratio_prb must have the same length\n"
    )]
    LengthMismatch,

    #[error("At least one slice must be provided\n")]
    Empty,
}

/// Parses a `/run` body into one quota per slice.
///
/// Min, max and dedicated ratio are all set to the dedicated ratio.
/// Scalars are coerced the lenient way: SST and SD accept any JSON value
/// and use its text, ratios accept numbers, booleans and numeric strings.
pub fn parse_run_request(body: &[u8]) -> Result<Vec<SlicePrbQuota>, RequestError> {
    let parsed: Value = serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;

    let array = |key: &str| parsed.get(key).and_then(Value::as_array);
    let (sst, sd, ratio) = match (array("sst"), array("sd"), array("dedicated_ratio_prb")) {
        (Some(sst), Some(sd), Some(ratio)) => (sst, sd, ratio),
        _ => return Err(RequestError::MissingArrays),
    };

    if sst.len() != sd.len() || sst.len() != ratio.len() {
        return Err(RequestError::LengthMismatch);
    }
    if sst.is_empty() {
        return Err(RequestError::Empty);
    }

    Ok(sst
        .iter()
        .zip(sd)
        .zip(ratio)
        .map(|((sst, sd), ratio)| {
            SlicePrbQuota::uniform(json_text(sst), json_text(sd), json_int(ratio))
        })
        .collect())
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_int(value: &Value) -> i64 {
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        Value::String(s) => leading_int(s),
        _ => 0,
    };
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX))
}

// Optional whitespace and sign followed by digits; anything else yields 0.
fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
    PayloadTooLarge,
    InternalServerError,
}

fn build_response(status: StatusCode, body: &str) -> Vec<u8> {
    build_response_with_content_type(status, body.as_bytes(), "text/plain")
}

fn build_response_with_content_type(
    status: StatusCode,
    body: &[u8],
    content_type: &str,
) -> Vec<u8> {
    let status_line = match status {
        StatusCode::Ok => "HTTP/1.1 200 OK",
        StatusCode::BadRequest => "HTTP/1.1 400 Bad Request",
        StatusCode::NotFound => "HTTP/1.1 404 Not Found",
        StatusCode::PayloadTooLarge => "HTTP/1.1 413 Payload Too Large",
        StatusCode::InternalServerError => "HTTP/1.1 500 Internal Server Error",
    };
    let mut response = Vec::new();
    response.extend_from_slice(status_line.as_bytes());
    response.extend_from_slice(format!("\r\nContent-Type: {content_type}\r\n").as_bytes());
    response.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    response.extend_from_slice(b"Connection: close\r\n");
    response.extend_from_slice(b"\r\n");
    response.extend_from_slice(body);
    response
}

pub fn find_header_end(request: &[u8]) -> Option<usize> {
    request.windows(HEADER_END.len()).position(|window| window == HEADER_END)
}

pub fn parse_content_length(headers: &[u8]) -> Option<usize> {
    let text = String::from_utf8_lossy(headers);
    for line in text.lines() {
        let lower = line.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("content-length:") {
            if let Ok(length) = rest.trim().parse::<usize>() {
                return Some(length);
            }
        }
    }
    None
}

fn parse_request_line(headers: &[u8]) -> Option<(String, String)> {
    let text = String::from_utf8_lossy(headers);
    let line = text.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    Some((method, path))
}

/// Handles one complete HTTP request and returns the raw response.
///
/// A schema violation while building the control request cannot be
/// answered meaningfully: it is reported as 500 and raises a fatal
/// shutdown.
pub async fn handle_http_request(
    runner: &RcControlRunner,
    signal: &ShutdownSignal,
    request: &[u8],
) -> Vec<u8> {
    let Some(header_end) = find_header_end(request) else {
        return build_response(StatusCode::BadRequest, "Malformed request\n");
    };
    let headers = &request[..header_end];
    let Some((method, path)) = parse_request_line(headers) else {
        return build_response(StatusCode::BadRequest, "Malformed request\n");
    };
    let path_only = path.split_once('?').map_or(path.as_str(), |(p, _)| p);

    if (method.as_str(), path_only) != ("POST", RUN_PATH) {
        debug!(%method, path = %path_only, "Unknown endpoint");
        return build_response(StatusCode::NotFound, UNKNOWN_ENDPOINT);
    }

    let body_start = header_end + HEADER_END.len();
    let body_end = match parse_content_length(headers) {
        Some(length) => (body_start + length).min(request.len()),
        None => request.len(),
    };
    let quotas = match parse_run_request(&request[body_start..body_end]) {
        Ok(quotas) => quotas,
        Err(e) => {
            warn!("Rejected /run request: {}", e.to_string().trim_end());
            return build_response(StatusCode::BadRequest, &e.to_string());
        }
    };

    info!(slices = quotas.len(), "Running RC control");
    match runner.run_slice_prb_quota(&quotas).await {
        Ok(outcome) => {
            debug!(
                attempted = outcome.attempted,
                failed = outcome.failed.len(),
                "RC control task done"
            );
            build_response(StatusCode::Ok, TASK_EXECUTED)
        }
        Err(e) => {
            error!("RC control request could not be built: {}", e);
            signal.trigger(ShutdownReason::Fatal(e.to_string()));
            build_response(StatusCode::InternalServerError, "Internal error\n")
        }
    }
}

/// Reads until the headers and the announced body are in.
async fn read_request(stream: &mut TcpStream) -> io::Result<Option<Vec<u8>>> {
    let mut buffer = Vec::new();
    loop {
        let mut chunk = [0_u8; 4096];
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(None);
        }
        if let Some(header_end) = find_header_end(&buffer) {
            match parse_content_length(&buffer[..header_end]) {
                Some(length) if buffer.len() < header_end + HEADER_END.len() + length => continue,
                _ => break,
            }
        }
    }
    Ok(Some(buffer))
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    runner: &RcControlRunner,
    signal: &ShutdownSignal,
) {
    let response = match read_request(&mut stream).await {
        Ok(Some(request)) if request.is_empty() => return,
        Ok(Some(request)) => handle_http_request(runner, signal, &request).await,
        Ok(None) => build_response(StatusCode::PayloadTooLarge, "Request too large\n"),
        Err(e) => {
            warn!(%peer, "REST read error: {}", e);
            return;
        }
    };
    if let Err(e) = stream.write_all(&response).await {
        warn!(%peer, "REST write error: {}", e);
    }
    let _ = stream.shutdown().await;
}

/// Bound REST listener.
pub struct RestServer {
    listener: TcpListener,
    runner: Arc<RcControlRunner>,
    signal: ShutdownSignal,
}

impl RestServer {
    pub async fn bind(
        addr: SocketAddr,
        runner: Arc<RcControlRunner>,
        signal: ShutdownSignal,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            runner,
            signal,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until shutdown. Each connection is served on its
    /// own task.
    pub async fn serve(self, mut shutdown: ShutdownReceiver) {
        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let runner = self.runner.clone();
                        let signal = self.signal.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, peer, &runner, &signal).await;
                        });
                    }
                    Err(e) => warn!("REST accept failed: {}", e),
                },
            }
        }
        info!("REST API stopped");
    }
}

/// Task serving the REST endpoint.
pub struct RestTask {
    config: RestConfig,
    runner: Arc<RcControlRunner>,
    signal: ShutdownSignal,
}

impl RestTask {
    pub fn new(config: RestConfig, runner: Arc<RcControlRunner>, signal: ShutdownSignal) -> Self {
        Self { config, runner, signal }
    }
}

#[async_trait::async_trait]
impl Task for RestTask {
    fn id(&self) -> TaskId {
        TaskId::Rest
    }

    // A failed bind leaves monitoring running.
    async fn run(&mut self, shutdown: ShutdownReceiver) -> Result<(), TaskError> {
        let addr = self.config.socket_addr();
        let server = RestServer::bind(addr, self.runner.clone(), self.signal.clone())
            .await
            .map_err(|e| TaskError::failed(TaskId::Rest, format!("failed to bind {addr}: {e}")))?;
        info!("REST API running on {}", addr);
        server.serve(shutdown).await;
        Ok(())
    }
}
