//! Remote client: the single point of entry for all calls to the scoring/tailoring service.
//!
//! Every operation returns the raw JSON body; turning that into canonical values is the job
//! of `crate::normalize`. The liveness probe is the one exception: it never fails and
//! reports an unreachable service as `"DOWN"`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client, Response,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::EntityId;

pub mod payload;

pub use payload::{JobMetadata, ResumeFile};
use payload::TailorRequest;

const UPLOAD_RESUME_ROUTE: &str = "/api/resume/upload";
const SAVE_JOB_ROUTE: &str = "/api/job/upload";
const ATS_SCORE_ROUTE: &str = "/api/resume/ats-score";
const TAILOR_ROUTE: &str = "/api/resume/tailor";
const PING_ROUTE: &str = "/api/ai/ping";

/// Status reported by `ping` when the service cannot be reached.
pub const PING_DOWN: &str = "DOWN";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The remote operations the workflow depends on. Implement this to drive the
/// coordinator without a live service.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn upload_resume(&self, file: &ResumeFile) -> Result<Value, ClientError>;

    async fn save_job(&self, description: &str, metadata: &JobMetadata)
        -> Result<Value, ClientError>;

    async fn fetch_score(&self, resume_id: &EntityId, job_id: &EntityId)
        -> Result<Value, ClientError>;

    async fn tailor(&self, resume_id: &EntityId, job_id: &EntityId) -> Result<Value, ClientError>;

    /// Raw status string, or `PING_DOWN` on any failure.
    async fn ping(&self) -> String;
}

/// HTTP implementation of `RemoteService`. One fixed timeout applies to every request.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn try_ping(&self) -> Result<String, ClientError> {
        let response = self.client.get(self.url(PING_ROUTE)).send().await?;
        let body = read_body(response).await?;
        Ok(match body {
            Value::String(status) => status,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

#[async_trait]
impl RemoteService for RemoteClient {
    async fn upload_resume(&self, file: &ResumeFile) -> Result<Value, ClientError> {
        let part = Part::stream_with_length(file.bytes.clone(), file.bytes.len() as u64)
            .file_name(file.file_name.clone())
            .mime_str(file.content_type)?;
        let form = Form::new().part("file", part);

        debug!(
            file = %file.file_name,
            size = file.bytes.len(),
            "Uploading resume"
        );

        let response = self
            .client
            .post(self.url(UPLOAD_RESUME_ROUTE))
            .multipart(form)
            .send()
            .await?;

        read_body(response).await
    }

    async fn save_job(
        &self,
        description: &str,
        metadata: &JobMetadata,
    ) -> Result<Value, ClientError> {
        if description.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "job description is empty".to_string(),
            ));
        }

        debug!(chars = description.len(), "Saving job description");

        let response = self
            .client
            .post(self.url(SAVE_JOB_ROUTE))
            .header(CONTENT_TYPE, "text/plain")
            .query(&metadata.query_pairs()[..])
            .body(description.to_string())
            .send()
            .await?;

        read_body(response).await
    }

    async fn fetch_score(
        &self,
        resume_id: &EntityId,
        job_id: &EntityId,
    ) -> Result<Value, ClientError> {
        debug!(%resume_id, %job_id, "Fetching ATS score");

        let response = self
            .client
            .get(self.url(ATS_SCORE_ROUTE))
            .query(&[
                ("resumeId", resume_id.to_string()),
                ("jobId", job_id.to_string()),
            ])
            .send()
            .await?;

        read_body(response).await
    }

    async fn tailor(&self, resume_id: &EntityId, job_id: &EntityId) -> Result<Value, ClientError> {
        debug!(%resume_id, %job_id, "Requesting tailored resume");

        let response = self
            .client
            .post(self.url(TAILOR_ROUTE))
            .json(&TailorRequest { resume_id, job_id })
            .send()
            .await?;

        read_body(response).await
    }

    async fn ping(&self) -> String {
        match self.try_ping().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Liveness probe failed: {e}");
                PING_DOWN.to_string()
            }
        }
    }
}

/// Maps non-2xx responses to `ClientError::Api` and decodes success bodies.
async fn read_body(response: Response) -> Result<Value, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!("Service returned {}: {}", status, body);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(decode_body(&body))
}

/// JSON bodies are parsed; anything else is carried as a bare string.
fn decode_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Prefers the service's own `message` / `error` field over the raw body.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str))
    });

    match field {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => "Unknown error".to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Multipart, Query},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_service(router: Router) -> RemoteClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        RemoteClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap()
    }

    async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap();
            parts.push(json!({
                "name": name,
                "fileName": file_name,
                "contentType": content_type,
                "size": bytes.len(),
            }));
        }
        Json(json!({ "id": 11, "parts": parts }))
    }

    async fn echo_job(
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
        body: String,
    ) -> Json<Value> {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(json!({
            "jobId": 21,
            "params": params,
            "contentType": content_type,
            "description": body,
        }))
    }

    async fn echo_score(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({ "basicScore": 64, "params": params }))
    }

    async fn echo_tailor(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({ "received": body, "atsScore": 80, "tailoredText": "Rewritten" }))
    }

    fn service_router() -> Router {
        Router::new()
            .route(UPLOAD_RESUME_ROUTE, post(echo_upload))
            .route(SAVE_JOB_ROUTE, post(echo_job))
            .route(ATS_SCORE_ROUTE, get(echo_score))
            .route(TAILOR_ROUTE, post(echo_tailor))
            .route(PING_ROUTE, get(|| async { "OK - model reachable" }))
    }

    #[tokio::test]
    async fn test_upload_sends_single_file_part() {
        let client = spawn_service(service_router()).await;
        let file = ResumeFile::new("jane.pdf", b"%PDF-1.4 fake".to_vec()).unwrap();

        let body = client.upload_resume(&file).await.unwrap();

        assert_eq!(body["id"], 11);
        let parts = body["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["name"], "file");
        assert_eq!(parts[0]["fileName"], "jane.pdf");
        assert_eq!(parts[0]["contentType"], "application/pdf");
        assert_eq!(parts[0]["size"], 13);
    }

    #[tokio::test]
    async fn test_save_job_sends_plain_text_and_metadata_query() {
        let client = spawn_service(service_router()).await;
        let meta = JobMetadata {
            title: Some("Backend Engineer".to_string()),
            ..Default::default()
        };

        let body = client
            .save_job("Build services in Rust.", &meta)
            .await
            .unwrap();

        assert_eq!(body["description"], "Build services in Rust.");
        assert!(body["contentType"]
            .as_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(body["params"]["title"], "Backend Engineer");
        assert_eq!(body["params"]["company"], "Company");
        assert_eq!(body["params"]["location"], "");
        assert_eq!(body["params"]["employmentType"], "Full-time");
        assert_eq!(body["params"]["experienceLevel"], "Mid-level");
    }

    #[tokio::test]
    async fn test_save_job_rejects_blank_description_without_request() {
        // Nothing listens here; reaching the network would surface as Http, not InvalidInput.
        let client = RemoteClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client
            .save_job("  \n ", &JobMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_fetch_score_sends_ids_as_query() {
        let client = spawn_service(service_router()).await;
        let body = client
            .fetch_score(&EntityId::from(3), &EntityId::from("jd-9"))
            .await
            .unwrap();
        assert_eq!(body["params"]["resumeId"], "3");
        assert_eq!(body["params"]["jobId"], "jd-9");
    }

    #[tokio::test]
    async fn test_tailor_sends_json_ids_with_original_kind() {
        let client = spawn_service(service_router()).await;
        let body = client
            .tailor(&EntityId::from(3), &EntityId::from("jd-9"))
            .await
            .unwrap();
        assert_eq!(body["received"], json!({ "resumeId": 3, "jobId": "jd-9" }));
        assert_eq!(body["tailoredText"], "Rewritten");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_api_error() {
        let router = Router::new().route(
            TAILOR_ROUTE,
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "status": "error", "message": "Resume not found" })),
                )
            }),
        );
        let client = spawn_service(router).await;

        let err = client
            .tailor(&EntityId::from(1), &EntityId::from(2))
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Resume not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_text_success_body_is_kept_as_string() {
        let router = Router::new().route(TAILOR_ROUTE, post(|| async { "Just the resume" }));
        let client = spawn_service(router).await;

        let body = client
            .tailor(&EntityId::from(1), &EntityId::from(2))
            .await
            .unwrap();
        assert_eq!(body, Value::String("Just the resume".to_string()));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_http_error() {
        let router = Router::new().route(
            ATS_SCORE_ROUTE,
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "score": 1 }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client =
            RemoteClient::new(format!("http://{addr}"), Duration::from_millis(200)).unwrap();

        let err = client
            .fetch_score(&EntityId::from(1), &EntityId::from(2))
            .await
            .unwrap_err();
        match err {
            ClientError::Http(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ping_returns_status_text() {
        let client = spawn_service(service_router()).await;
        assert_eq!(client.ping().await, "OK - model reachable");
    }

    #[tokio::test]
    async fn test_ping_unreachable_returns_down() {
        let client = RemoteClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert_eq!(client.ping().await, PING_DOWN);
    }

    #[tokio::test]
    async fn test_ping_server_error_returns_down() {
        let router = Router::new().route(
            PING_ROUTE,
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let client = spawn_service(router).await;
        assert_eq!(client.ping().await, PING_DOWN);
    }

    #[test]
    fn test_error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"message":"Job not found"}"#), "Job not found");
        assert_eq!(error_message(r#"{"error":"Bad Request"}"#), "Bad Request");
        assert_eq!(error_message("gateway timeout\n"), "gateway timeout");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[test]
    fn test_decode_body_variants() {
        assert_eq!(decode_body(r#"{"id":1}"#), json!({ "id": 1 }));
        assert_eq!(decode_body("OK"), json!("OK"));
        assert_eq!(decode_body("   "), Value::Null);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RemoteClient::new("http://svc:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://svc:8080");
        assert_eq!(client.url(PING_ROUTE), "http://svc:8080/api/ai/ping");
    }
}
