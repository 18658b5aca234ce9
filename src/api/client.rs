use std::time::Duration;

use reqwest::multipart;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::api::types::{ApiEnvelope, SUCCESS_CODE};
use crate::error::ClientError;

/// HTTP client for the remote student-tools backend.
///
/// Thin wrapper: the backend owns all the heavy lifting (file parsing,
/// auto-scheduling, course analysis); this client only ships requests,
/// attaches the bearer token, and maps failures into [`ClientError`].
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(base_url: String) -> Self {
        BackendClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .timeout(self.timeout);
        if let Some(token) = token {
            // The backend's auth filter expects the "Bearer " prefix.
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }

    /// Maps non-success HTTP statuses to the error taxonomy.
    fn intercept_status(status: StatusCode) -> Result<(), ClientError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(ClientError::SessionExpired),
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden),
            StatusCode::INTERNAL_SERVER_ERROR => Err(ClientError::ServerError),
            s => Err(ClientError::Transport(format!("unexpected status {}", s))),
        }
    }

    /// Unwraps the `{code, msg, data}` envelope, surfacing business errors.
    fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, ClientError> {
        if envelope.code != SUCCESS_CODE {
            return Err(ClientError::Remote {
                code: envelope.code,
                msg: if envelope.msg.is_empty() {
                    "unknown backend error".to_string()
                } else {
                    envelope.msg
                },
            });
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Malformed("success envelope without data".to_string()))
    }

    /// Like [`Self::unwrap_envelope`] but for endpoints whose success reply
    /// carries no data payload.
    fn check_envelope(envelope: ApiEnvelope<Value>) -> Result<(), ClientError> {
        if envelope.code != SUCCESS_CODE {
            return Err(ClientError::Remote {
                code: envelope.code,
                msg: if envelope.msg.is_empty() {
                    "unknown backend error".to_string()
                } else {
                    envelope.msg
                },
            });
        }
        Ok(())
    }

    async fn post_unit(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, path, token)
            .json(body)
            .send()
            .await?;
        Self::intercept_status(response.status())?;
        Self::check_envelope(response.json::<ApiEnvelope<Value>>().await?)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<T, ClientError> {
        let response = self
            .request(reqwest::Method::POST, path, token)
            .json(body)
            .send()
            .await?;
        Self::intercept_status(response.status())?;
        Self::unwrap_envelope(response.json::<ApiEnvelope<T>>().await?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let response = self.request(reqwest::Method::GET, path, token).send().await?;
        Self::intercept_status(response.status())?;
        Self::unwrap_envelope(response.json::<ApiEnvelope<T>>().await?)
    }

    // --- Auth ---

    /// Signs in and returns the opaque session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "username and password are required".to_string(),
            ));
        }
        self.post_json(
            "/api/auth/login",
            None,
            &json!({"username": username, "password": password}),
        )
        .await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "username and password are required".to_string(),
            ));
        }
        self.post_unit(
            "/api/auth/register",
            None,
            &json!({"username": username, "password": password}),
        )
        .await
    }

    // --- Scheduler tool ---

    /// Uploads schedule files to the remote parser.
    ///
    /// Returns the raw response body: the parse endpoint's payload shape has
    /// drifted across backend versions, so normalization is left to
    /// [`crate::api::types::normalize_pool_response`]. A non-200 business
    /// code is still surfaced as an error here.
    pub async fn parse_schedules(
        &self,
        token: Option<&str>,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<Value, ClientError> {
        if files.is_empty() {
            return Err(ClientError::Validation("no files selected".to_string()));
        }

        let mut form = multipart::Form::new();
        for (name, bytes) in files {
            form = form.part("files", multipart::Part::bytes(bytes).file_name(name));
        }

        let response = self
            .request(reqwest::Method::POST, "/api/tools/scheduler/parse", token)
            .multipart(form)
            .send()
            .await?;
        Self::intercept_status(response.status())?;

        let body: Value = response.json().await?;
        if let Some(code) = body.get("code").and_then(Value::as_i64) {
            if code != SUCCESS_CODE as i64 {
                let msg = body
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or("parse failed")
                    .to_string();
                return Err(ClientError::Remote {
                    code: code as i32,
                    msg,
                });
            }
        }
        Ok(body)
    }

    /// Ships an auto-schedule request; the algorithm runs entirely remotely.
    pub async fn auto_schedule(
        &self,
        token: Option<&str>,
        request: &Value,
    ) -> Result<Value, ClientError> {
        self.post_json("/api/tools/scheduler/auto-generate", token, request)
            .await
    }

    // --- Course analysis tool ---

    pub async fn analyze_course(
        &self,
        token: Option<&str>,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<Value, ClientError> {
        let form = multipart::Form::new()
            .part("files", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .request(reqwest::Method::POST, "/api/tools/course/analyze", token)
            .multipart(form)
            .send()
            .await?;
        Self::intercept_status(response.status())?;
        Self::unwrap_envelope(response.json::<ApiEnvelope<Value>>().await?)
    }

    // --- Community ---

    pub async fn tool_stats(&self, token: Option<&str>) -> Result<Value, ClientError> {
        self.get_json("/api/community/tools/stats", token).await
    }

    pub async fn report_tool_usage(
        &self,
        token: Option<&str>,
        code: &str,
    ) -> Result<(), ClientError> {
        self.post_unit(
            &format!("/api/community/tools/report/{}", code),
            token,
            &Value::Null,
        )
        .await
    }

    pub async fn list_feedback(&self, token: Option<&str>) -> Result<Value, ClientError> {
        self.get_json("/api/community/feedback/list", token).await
    }

    pub async fn submit_feedback(
        &self,
        token: Option<&str>,
        content: &str,
    ) -> Result<(), ClientError> {
        if content.trim().is_empty() {
            return Err(ClientError::Validation(
                "feedback content is required".to_string(),
            ));
        }
        self.post_unit(
            "/api/community/feedback/submit",
            token,
            &json!({"content": content}),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwrap_surfaces_business_errors() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(json!({"code": 500, "msg": "parse failed", "data": null}))
                .unwrap();
        match BackendClient::unwrap_envelope(envelope) {
            Err(ClientError::Remote { code, msg }) => {
                assert_eq!(code, 500);
                assert_eq!(msg, "parse failed");
            }
            other => panic!("expected remote error, got {:?}", other.err()),
        }
    }

    #[test]
    fn envelope_unwrap_returns_data_on_success() {
        let envelope: ApiEnvelope<String> =
            serde_json::from_value(json!({"code": 200, "msg": "ok", "data": "tok-123"})).unwrap();
        assert_eq!(BackendClient::unwrap_envelope(envelope).unwrap(), "tok-123");
    }

    #[test]
    fn status_interceptor_maps_auth_failures() {
        assert!(matches!(
            BackendClient::intercept_status(StatusCode::UNAUTHORIZED),
            Err(ClientError::SessionExpired)
        ));
        assert!(matches!(
            BackendClient::intercept_status(StatusCode::FORBIDDEN),
            Err(ClientError::Forbidden)
        ));
        assert!(BackendClient::intercept_status(StatusCode::OK).is_ok());
    }

    #[tokio::test]
    async fn empty_file_selection_is_rejected_before_any_request() {
        let client = BackendClient::new("http://localhost:9".to_string());
        match client.parse_schedules(None, Vec::new()).await {
            Err(ClientError::Validation(msg)) => assert_eq!(msg, "no files selected"),
            other => panic!("expected validation error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn report_tool_usage_posts_to_the_report_endpoint() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // One-shot canned backend: capture the request, answer a success
        // envelope.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut captured = String::new();
            let mut buf = vec![0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                captured.push_str(&String::from_utf8_lossy(&buf[..n]));
                // The request body is the JSON literal `null`.
                if captured.contains("\r\n\r\n") && captured.ends_with("null") {
                    break;
                }
            }
            let body = r#"{"code":200,"msg":"ok","data":null}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            captured
        });

        let client = BackendClient::new(format!("http://{}", addr));
        client
            .report_tool_usage(Some("tok-1"), "scheduler")
            .await
            .unwrap();

        let captured = server.await.unwrap().to_lowercase();
        assert!(captured.starts_with("post /api/community/tools/report/scheduler"));
        assert!(captured.contains("authorization: bearer tok-1"));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = BackendClient::new("http://localhost:8080/".to_string());
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
