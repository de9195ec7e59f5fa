use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::core::app::App;
use crate::core::completion::{CompletionBackend, CompletionError};
use crate::core::config::Config;
use crate::core::message::ChatEntry;

/// Backend answering every prompt with a canned outcome.
pub struct FixedBackend {
    outcome: Result<String, (u16, String)>,
    delay: Option<Duration>,
}

impl FixedBackend {
    pub fn reply(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            delay: None,
        }
    }

    pub fn status(code: u16, body: &str) -> Self {
        Self {
            outcome: Err((code, body.to_string())),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CompletionBackend for FixedBackend {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err((code, body)) => Err(CompletionError::Status {
                status: StatusCode::from_u16(*code).expect("valid status"),
                body: body.clone(),
            }),
        }
    }
}

/// One-shot HTTP server answering a single request with a fixed response.
pub struct HttpStub {
    pub base_url: String,
    request: oneshot::Receiver<String>,
}

impl HttpStub {
    /// First line of the request the stub received.
    pub async fn request_line(self) -> String {
        let raw = self.request.await.expect("stub saw a request");
        raw.lines().next().unwrap_or_default().to_string()
    }
}

pub async fn spawn_http_stub(status: u16, body: &str) -> HttpStub {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let (tx, rx) = oneshot::channel();
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    HttpStub {
        base_url: format!("http://{addr}"),
        request: rx,
    }
}

pub fn create_test_app() -> App {
    App::new(&Config::default(), None).expect("test app")
}

pub fn sample_entries() -> Vec<ChatEntry> {
    vec![
        ChatEntry::user("How do I print in Python?"),
        ChatEntry::bot("Use print:\n```python\nprint(\"hi\")\n```\nThat's it."),
        ChatEntry::user("And in Rust?"),
        ChatEntry::bot("```rust\nfn main() {\n    println!(\"hi\");\n}\n```"),
    ]
}
