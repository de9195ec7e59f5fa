//! Remote text-completion requests.
//!
//! The endpoint contract is minimal: `GET <endpoint>?q=<prompt>` answers with
//! the reply as the plain response body. Requests run on a spawned task and
//! report back over an unbounded channel tagged with the request id so the UI
//! can ignore replies that no longer belong to the visible history.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::utils::url::normalize_endpoint;

pub const DEFAULT_ENDPOINT: &str = "https://walrus-app-hodhq.ondigitalocean.app/ultron";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionMessage {
    Reply(String),
    Error(String),
}

#[derive(Debug)]
pub enum CompletionError {
    /// The request could not be sent or the body could not be read.
    Transport(reqwest::Error),
    /// The endpoint answered with a non-success status.
    Status { status: StatusCode, body: String },
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Transport(err) => write!(f, "request failed: {err}"),
            CompletionError::Status { status, .. } => {
                write!(f, "endpoint returned {status}")
            }
        }
    }
}

impl StdError for CompletionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CompletionError::Transport(err) => Some(err),
            CompletionError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Transport(err)
    }
}

impl CompletionError {
    /// Render the error as chat text, with any response body in a fence.
    pub fn to_chat_text(&self) -> String {
        match self {
            CompletionError::Transport(err) => format_api_error(&err.to_string()),
            CompletionError::Status { status, body } => {
                let formatted = format_api_error(body);
                format!("[{status}] {formatted}")
            }
        }
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Backend that queries an HTTP endpoint with the prompt as `q`.
#[derive(Clone, Debug)]
pub struct HttpCompletionBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionBackend {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: normalize_endpoint(endpoint),
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        debug!(endpoint = %self.endpoint, chars = prompt.chars().count(), "sending prompt");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", prompt)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::Status { status, body });
        }

        let body = response.text().await?;
        info!(%status, bytes = body.len(), "reply received");
        Ok(body)
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Wrap an error body in a fenced block, pretty-printing JSON when possible.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "Error:\n```\n<empty>\n```".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            return match extract_error_summary(&json_value).filter(|s| !s.is_empty()) {
                Some(summary) => format!("Error: {}\n```json\n{}\n```", summary, pretty_json),
                None => format!("Error:\n```json\n{}\n```", pretty_json),
            };
        }
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        format!("Error:\n```xml\n{}\n```", trimmed)
    } else {
        format!("Error:\n```\n{}\n```", trimmed)
    }
}

/// Spawns completion requests and funnels their outcome into one channel.
#[derive(Clone)]
pub struct CompletionService {
    tx: mpsc::UnboundedSender<(CompletionMessage, u64)>,
    backend: Arc<dyn CompletionBackend>,
}

impl CompletionService {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<(CompletionMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, backend }, rx)
    }

    /// Start a request. Nothing is sent on the channel if `cancel_token`
    /// fires first.
    pub fn spawn_request(&self, prompt: String, request_id: u64, cancel_token: CancellationToken) {
        let tx = self.tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            tokio::select! {
                result = backend.complete(&prompt) => {
                    let message = match result {
                        Ok(text) => CompletionMessage::Reply(text),
                        Err(err) => {
                            error!(%err, request_id, "completion request failed");
                            CompletionMessage::Error(err.to_chat_text())
                        }
                    };
                    let _ = tx.send((message, request_id));
                }
                _ = cancel_token.cancelled() => {
                    debug!(request_id, "completion request cancelled");
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: CompletionMessage, request_id: u64) {
        let _ = self.tx.send((message, request_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{spawn_http_stub, FixedBackend};
    use std::time::Duration;

    #[test]
    fn format_api_error_prettifies_json_with_summary() {
        let raw = r#"{"error":{"message":"model   overloaded","type":"server_error"}}"#;
        let expected = r#"Error: model overloaded
```json
{
  "error": {
    "message": "model   overloaded",
    "type": "server_error"
  }
}
```"#;
        assert_eq!(format_api_error(raw), expected);
    }

    #[test]
    fn format_api_error_handles_json_without_summary() {
        let expected = "Error:\n```json\n{\n  \"status\": \"failed\"\n}\n```";
        assert_eq!(format_api_error(r#"{"status":"failed"}"#), expected);
    }

    #[test]
    fn format_api_error_handles_xml_plain_and_empty() {
        assert_eq!(
            format_api_error("<error>bad</error>"),
            "Error:\n```xml\n<error>bad</error>\n```"
        );
        assert_eq!(format_api_error("boom"), "Error:\n```\nboom\n```");
        assert_eq!(format_api_error("  "), "Error:\n```\n<empty>\n```");
    }

    #[tokio::test]
    async fn service_reports_reply_with_request_id() {
        let backend = Arc::new(FixedBackend::reply("42"));
        let (service, mut rx) = CompletionService::new(backend);
        service.spawn_request("meaning?".into(), 7, CancellationToken::new());

        let (message, id) = rx.recv().await.expect("message");
        assert_eq!(id, 7);
        assert_eq!(message, CompletionMessage::Reply("42".into()));
    }

    #[tokio::test]
    async fn service_reports_failures_as_chat_text() {
        let backend = Arc::new(FixedBackend::status(503, "down for maintenance"));
        let (service, mut rx) = CompletionService::new(backend);
        service.spawn_request("hi".into(), 1, CancellationToken::new());

        match rx.recv().await.expect("message") {
            (CompletionMessage::Error(text), 1) => {
                assert!(text.starts_with("[503 Service Unavailable]"), "{text}");
                assert!(text.contains("```\ndown for maintenance\n```"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_request_sends_nothing() {
        let backend = Arc::new(FixedBackend::reply("late").delayed(Duration::from_secs(5)));
        let (service, mut rx) = CompletionService::new(backend);
        let token = CancellationToken::new();
        service.spawn_request("hi".into(), 3, token.clone());
        token.cancel();

        let outcome = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(outcome.is_err(), "no message expected after cancel");
    }

    #[tokio::test]
    async fn http_backend_sends_prompt_as_query_parameter() {
        let stub = spawn_http_stub(200, "Hello from the endpoint").await;
        let backend = HttpCompletionBackend::new(&format!("{}/ultron/", stub.base_url));

        let reply = backend.complete("hello world & more").await.expect("reply");
        assert_eq!(reply, "Hello from the endpoint");

        let request_line = stub.request_line().await;
        assert!(
            request_line.starts_with("GET /ultron?q=hello+world+%26+more "),
            "{request_line}"
        );
    }

    #[tokio::test]
    async fn http_backend_maps_error_status() {
        let stub = spawn_http_stub(500, r#"{"error":"exploded"}"#).await;
        let backend = HttpCompletionBackend::new(&stub.base_url);

        match backend.complete("x").await {
            Err(CompletionError::Status { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, r#"{"error":"exploded"}"#);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_backend_reports_connection_failures() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let backend = HttpCompletionBackend::new(&format!("http://{addr}/ultron"));
        let err = backend.complete("x").await.expect_err("connection refused");
        assert!(matches!(err, CompletionError::Transport(_)));
        assert!(err.to_chat_text().starts_with("Error:\n```"));
    }
}
