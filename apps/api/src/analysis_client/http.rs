use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::analysis_client::{AnalysisClient, ClientError};
use crate::errors::ErrorEnvelope;
use crate::models::{AnalyzeResponse, Document, RefineRequest, RefineResponse};

/// Analysis and rewriting can take a while on the LLM backend.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Talks to a running `cvscan-api` over HTTP.
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Maps non-2xx responses to `ClientError::Server`, preferring the backend's
/// error envelope message over the raw body. A success body that does not
/// match `T` is a server fault too, reported under the response status.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    parse_body(status, body)
}

fn parse_body<T: DeserializeOwned>(status: StatusCode, body: String) -> Result<T, ClientError> {
    if !status.is_success() {
        return Err(ClientError::Server {
            status: status.as_u16(),
            message: server_message(body),
        });
    }
    serde_json::from_str(&body).map_err(|e| ClientError::Server {
        status: status.as_u16(),
        message: format!("invalid response body: {e}"),
    })
}

fn server_message(body: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(
        &self,
        document: &Document,
        job_description: &str,
    ) -> Result<AnalyzeResponse, ClientError> {
        let file = multipart::Part::bytes(document.bytes.to_vec())
            .file_name(document.file_name.clone());
        let form = multipart::Form::new()
            .part("file", file)
            .text("job_description", job_description.to_string());

        debug!("POST /analyze ({} bytes)", document.bytes.len());
        let response = self
            .client
            .post(self.url("/analyze"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        decode(response).await
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ClientError> {
        debug!("POST /refine ({} chars of feedback)", request.feedback.len());
        let response = self
            .client
            .post(self.url("/refine"))
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = HttpAnalysisClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/analyze"), "http://localhost:8000/analyze");
        assert_eq!(client.url("refine"), "http://localhost:8000/refine");
    }

    #[test]
    fn test_server_message_prefers_envelope() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"feedback cannot be empty"}}"#;
        assert_eq!(server_message(body.to_string()), "feedback cannot be empty");
        assert_eq!(server_message("Bad Gateway".to_string()), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) is not served in test environments.
        let client = HttpAnalysisClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .analyze(&Document::new("resume.txt", "John Doe"), "Python")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn test_malformed_success_body_is_server_error() {
        let err = parse_body::<RefineResponse>(StatusCode::OK, "<html>proxy</html>".to_string())
            .unwrap_err();
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 200);
                assert!(message.starts_with("invalid response body"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_status_uses_envelope() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"feedback cannot be empty"}}"#;
        let err = parse_body::<RefineResponse>(StatusCode::BAD_REQUEST, body.to_string())
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Server {
                status: 400,
                message: "feedback cannot be empty".to_string(),
            }
        );
    }

    #[test]
    fn test_success_body_decodes() {
        let body = r#"{"optimization":{"rewritten_text":"John Doe"}}"#;
        let parsed = parse_body::<RefineResponse>(StatusCode::OK, body.to_string()).unwrap();
        assert_eq!(parsed.optimization.rewritten_text, "John Doe");
    }
}
