//! Shared test utilities
//!
//! Provides an in-process HTTP server that stands in for the synthesis,
//! chat and webhook providers and records every request it receives.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use pandu_voice::config::TtsConfig;
use pandu_voice::voice::RetryPolicy;
use pandu_voice::{SpeechSynthesizer, VoiceResponder};
use secrecy::SecretString;

/// Fake MP3 payload served on success
pub const FAKE_MP3: &[u8] = b"ID3\x04\x00fake-mpeg-frames";

/// A request seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    remaining_failures: Arc<AtomicUsize>,
    failure_status: StatusCode,
    status: StatusCode,
    body: Bytes,
}

/// Handle to a running mock server
#[derive(Clone)]
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Server answering every request with `status` and `body`
    pub async fn start(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::start_flaky(0, StatusCode::SERVICE_UNAVAILABLE, status, body).await
    }

    /// Server answering the first `failures` requests with `failure_status`
    pub async fn start_flaky(
        failures: usize,
        failure_status: StatusCode,
        status: StatusCode,
        body: impl Into<Bytes>,
    ) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            remaining_failures: Arc::new(AtomicUsize::new(failures)),
            failure_status,
            status,
            body: body.into(),
        };

        let router = Router::new().fallback(record).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock server crashed");
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("poisoned").clone()
    }
}

async fn record(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state
        .requests
        .lock()
        .expect("poisoned")
        .push(RecordedRequest {
            path: uri.path().to_string(),
            headers,
            body,
        });

    let failing = state
        .remaining_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();

    if failing {
        return (state.failure_status, "temporarily unavailable").into_response();
    }

    (state.status, state.body.clone()).into_response()
}

/// Base URL on which nothing is listening
pub async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no address");
    drop(listener);
    format!("http://{addr}")
}

/// Base URL that accepts connections and never answers
pub async fn silent_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    format!("http://{addr}")
}

/// Front for a mock server that hangs up on the first `drops` connections
///
/// Later connections are piped through to the upstream server.
pub struct DroppingProxy {
    pub base_url: String,
    connections: Arc<AtomicUsize>,
}

impl DroppingProxy {
    pub async fn start(drops: usize, upstream: &MockServer) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind proxy");
        let addr = listener.local_addr().expect("proxy has no address");
        let target = upstream.base_url.trim_start_matches("http://").to_string();

        let connections = Arc::new(AtomicUsize::new(0));
        let seen = connections.clone();

        tokio::spawn(async move {
            while let Ok((mut inbound, _)) = listener.accept().await {
                if seen.fetch_add(1, Ordering::SeqCst) < drops {
                    drop(inbound);
                    continue;
                }

                let target = target.clone();
                tokio::spawn(async move {
                    if let Ok(mut outbound) = tokio::net::TcpStream::connect(&target).await {
                        let _ = tokio::io::copy_bidirectional(&mut inbound, &mut outbound).await;
                    }
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            connections,
        }
    }

    /// Connections accepted so far, dropped ones included
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Synthesis settings pointed at `base_url`
pub fn tts_config(base_url: &str) -> TtsConfig {
    TtsConfig {
        base_url: base_url.to_string(),
        voice_id: "voice-test".to_string(),
        timeout: Duration::from_secs(5),
        ..TtsConfig::default()
    }
}

/// Quick retries so tests stay fast
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
    }
}

/// Synthesizer talking to `base_url`
pub fn synthesizer(base_url: &str, max_retries: u32) -> SpeechSynthesizer {
    SpeechSynthesizer::new(SecretString::from("sk_test".to_string()), tts_config(base_url))
        .expect("failed to build synthesizer")
        .with_retry_policy(fast_retry(max_retries))
}

/// Responder with keyword intents and log alerts, talking to `base_url`
pub fn responder(base_url: &str) -> VoiceResponder {
    VoiceResponder::new(synthesizer(base_url, 0))
}
