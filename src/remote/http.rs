//! HTTP client for the remote todo API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::types::{ApiErrorBody, TodoRequest, TodoResponse};
use super::RemoteClient;
use crate::config::ApiConfig;
use crate::error::SyncError;

const TODOS_PATH: &str = "/api/todos";

/// reqwest-backed [`RemoteClient`].
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    client: Client,
    base_url: String,
}

impl HttpRemoteClient {
    /// Create a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `api` config section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, SyncError> {
        Self::new(&config.base_url, config.timeout())
    }

    fn todos_url(&self) -> String {
        format!("{}{TODOS_PATH}", self.base_url)
    }

    fn todo_url(&self, id: i64) -> String {
        format!("{}{TODOS_PATH}/{id}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SyncError> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SyncError> {
        let response = self.send(request).await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Err(SyncError::Remote {
                message: "Expected a response body but got 204 No Content".to_string(),
                status: status.as_u16(),
                code: None,
            });
        }

        response.json::<T>().await.map_err(|e| SyncError::Remote {
            message: format!("Invalid response body: {e}"),
            status: status.as_u16(),
            code: None,
        })
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn health_check(&self) -> bool {
        match self.send(self.client.get(self.todos_url())).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            },
        }
    }

    async fn create(&self, request: &TodoRequest) -> Result<TodoResponse, SyncError> {
        self.send_json(self.client.post(self.todos_url()).json(request))
            .await
    }

    async fn update(
        &self,
        remote_id: i64,
        request: &TodoRequest,
    ) -> Result<TodoResponse, SyncError> {
        self.send_json(self.client.put(self.todo_url(remote_id)).json(request))
            .await
    }

    async fn delete(&self, remote_id: i64) -> Result<(), SyncError> {
        self.send(self.client.delete(self.todo_url(remote_id)))
            .await
            .map(|_| ())
    }
}

fn transport_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::network("Request timeout", "TIMEOUT")
    } else if e.is_connect() || e.is_request() {
        SyncError::network("Network error - check connection", "NETWORK_ERROR")
    } else {
        SyncError::network(e.to_string(), "NETWORK_ERROR")
    }
}

/// Map a non-success response to `SyncError::Remote`.
///
/// The body may be `{message|error, code}` JSON or plain text.
fn api_error(status: StatusCode, body: &str) -> SyncError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_else(|_| ApiErrorBody {
        message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
        ..ApiErrorBody::default()
    });

    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .or(parsed.error)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    SyncError::Remote {
        message,
        status: status.as_u16(),
        code: parsed.code,
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serve a single canned response and hand back the raw request.
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = if body.is_empty() {
            format!("HTTP/1.1 {status_line}\r\nConnection: close\r\n\r\n")
        } else {
            format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        };

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&received) {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).into_owned()
        });

        (url, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn request() -> TodoRequest {
        TodoRequest {
            entity_id: 42,
            title: "x".to_string(),
            description: None,
            completed: None,
            priority: None,
            due_date: None,
            user_id: None,
            created_at: None,
        }
    }

    #[test]
    fn test_api_error_prefers_message() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"message":"title must not be blank","code":"VALIDATION"}"#,
        );
        match err {
            SyncError::Remote { message, status, code } => {
                assert_eq!(message, "title must not be blank");
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("VALIDATION"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_error_field_then_status() {
        let err = api_error(StatusCode::NOT_FOUND, r#"{"error":"Not Found"}"#);
        assert_eq!(err.to_string(), "Not Found");

        let err = api_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn test_api_error_plain_text_body() {
        let err = api_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded\n");
        assert!(matches!(
            err,
            SyncError::Remote { status: 500, ref message, .. } if message == "upstream exploded"
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpRemoteClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.todos_url(), "http://localhost:8080/api/todos");
        assert_eq!(client.todo_url(7), "http://localhost:8080/api/todos/7");
    }

    #[tokio::test]
    async fn test_health_check_false_when_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpRemoteClient::new(&format!("http://{addr}"), Duration::from_millis(500)).unwrap();
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_create_posts_json() {
        let (url, server) = serve_once("201 Created", r#"{"id":42,"title":"x","completed":false}"#).await;
        let client = HttpRemoteClient::new(&url, Duration::from_secs(5)).unwrap();

        let created = client.create(&request()).await.unwrap();
        assert_eq!(created.id, 42);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/todos HTTP/1.1"));
        assert!(raw.contains(r#""entityId":42"#));
    }

    #[tokio::test]
    async fn test_update_maps_error_response() {
        let (url, server) = serve_once("404 Not Found", r#"{"message":"Todo not found"}"#).await;
        let client = HttpRemoteClient::new(&url, Duration::from_secs(5)).unwrap();

        let err = client.update(7, &request()).await.unwrap_err();
        assert!(matches!(err, SyncError::Remote { status: 404, ref message, .. } if message == "Todo not found"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("PUT /api/todos/7 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let (url, server) = serve_once("204 No Content", "").await;
        let client = HttpRemoteClient::new(&url, Duration::from_secs(5)).unwrap();

        client.delete(3).await.unwrap();

        let raw = server.await.unwrap();
        assert!(raw.starts_with("DELETE /api/todos/3 HTTP/1.1"));
    }
}
