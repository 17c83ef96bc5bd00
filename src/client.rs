//! HTTP transport and wire-protocol mapping for the inference backend.
//!
//! A single [`BackendClient`] is configured once with the backend base URL
//! and shared by the registry and chat subsystems. Requests default to JSON;
//! the upload call overrides the content type with a multipart form.
//!
//! # Endpoints
//!
//! | Method | Path | Body | Success shape |
//! |--------|------|------|---------------|
//! | `GET` | `/files` | — | array of `{id, uid, name, status}` |
//! | `POST` | `/upload` | multipart, field `file` | `{message, ...}` |
//! | `POST` | `/chat` | `{question, file_uid}` | `{answer, source?, page?}` or `{error}` |
//! | `DELETE` | `/delete-file/{uid}` | — | `{message}` or `{error}` |
//!
//! # Error Body Precedence
//!
//! Failure bodies may be a bare string, or an object with `error` or
//! `message` fields. One precedence rule applies everywhere:
//! `error` field → `message` field → raw body text → generic fallback.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{is_valid_uid, Citation, Document};

/// Guidance text for an empty-but-successful file listing.
pub const NO_FILES_NOTICE: &str = "No files found. Please upload a file.";

/// Shown when a 2xx chat response carries neither an answer nor an error.
pub const NO_ANSWER_TEXT: &str = "No answer received from the backend. Please try again.";

const FETCH_FILES_FALLBACK: &str = "Something went wrong while fetching files.";
const UPLOAD_FALLBACK: &str = "Something went wrong while uploading the file.";
const DELETE_FALLBACK: &str = "Something went wrong while deleting the file.";

fn chat_fallback(uid: &str) -> String {
    format!(
        "Something went wrong while sending the chat request for document '{}'.",
        uid
    )
}

/// A successful chat exchange: the answer text plus optional citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    pub answer: String,
    pub citation: Option<Citation>,
}

/// HTTP client bound to one backend base URL.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client from configuration.
    ///
    /// The underlying `reqwest::Client` carries the configured timeout and a
    /// JSON default content type; the multipart upload call overrides the
    /// content type per request.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the document listing.
    ///
    /// A successful empty listing — or the backend's 404-with-guidance
    /// response for an empty database — is reported as
    /// [`ApiError::EmptyResult`], which callers render as guidance rather
    /// than a failure.
    pub async fn list_files(&self) -> Result<Vec<Document>, ApiError> {
        let url = format!("{}/files", self.base_url);
        debug!(%url, "fetching file listing");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The backend answers 404 with a guidance message when the
            // listing is empty.
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::EmptyResult(error_text_from_body(
                &body,
                NO_FILES_NOTICE,
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Transport(error_text_from_body(
                &body,
                FETCH_FILES_FALLBACK,
            )));
        }

        let files: Vec<Document> = resp
            .json()
            .await
            .map_err(|_| ApiError::Malformed(FETCH_FILES_FALLBACK.to_string()))?;

        if files.is_empty() {
            return Err(ApiError::EmptyResult(NO_FILES_NOTICE.to_string()));
        }
        Ok(files)
    }

    /// Upload one file as a multipart form (field name `file`).
    ///
    /// Returns the backend's confirmation message.
    pub async fn upload_file(&self, name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let url = format!("{}/upload", self.base_url);
        debug!(%url, name, size = bytes.len(), "uploading file");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::Transport(error_text_from_body(
                &body,
                UPLOAD_FALLBACK,
            )));
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(v) => {
                if let Some(err) = v.get("error").and_then(|e| e.as_str()) {
                    return Err(ApiError::Backend(err.to_string()));
                }
                Ok(v.get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("File uploaded successfully.")
                    .to_string())
            }
            Err(_) => Ok("File uploaded successfully.".to_string()),
        }
    }

    /// Ask one question about one document.
    pub async fn chat(&self, question: &str, uid: &str) -> Result<ChatAnswer, ApiError> {
        if question.trim().is_empty() {
            return Err(ApiError::Validation("Missing 'question' field".to_string()));
        }
        if uid.is_empty() {
            return Err(ApiError::Validation("Missing 'file_uid' field".to_string()));
        }
        if !is_valid_uid(uid) {
            return Err(ApiError::Validation(format!(
                "Invalid document id: '{}'",
                uid
            )));
        }

        let url = format!("{}/chat", self.base_url);
        debug!(%url, uid, "sending chat request");

        let body = serde_json::json!({
            "question": question,
            "file_uid": uid,
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::Transport(error_text_from_body(
                &text,
                &chat_fallback(uid),
            )));
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(v) => chat_answer_from_value(&v),
            Err(_) => Err(ApiError::Malformed(NO_ANSWER_TEXT.to_string())),
        }
    }

    /// Delete a document by uid.
    ///
    /// Returns the backend's confirmation message.
    pub async fn delete_file(&self, uid: &str) -> Result<String, ApiError> {
        if !is_valid_uid(uid) {
            return Err(ApiError::Validation(format!(
                "Invalid document id: '{}'",
                uid
            )));
        }

        let url = format!("{}/delete-file/{}", self.base_url, uid);
        debug!(%url, "deleting file");

        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::Transport(error_text_from_body(
                &body,
                DELETE_FALLBACK,
            )));
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(v) => {
                if let Some(err) = v.get("error").and_then(|e| e.as_str()) {
                    return Err(ApiError::Backend(err.to_string()));
                }
                Ok(v.get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("File deleted successfully.")
                    .to_string())
            }
            Err(_) => Ok("File deleted successfully.".to_string()),
        }
    }
}

/// Interpret a 2xx chat response body.
///
/// `answer` present → success; a citation is attached only when both the
/// `source` and `page` keys are present (`page` may be JSON null).
/// `error` present → backend-reported failure, passed through verbatim.
/// Neither → malformed-response condition.
fn chat_answer_from_value(v: &Value) -> Result<ChatAnswer, ApiError> {
    if let Some(answer) = v.get("answer").and_then(|a| a.as_str()) {
        let citation = match (v.get("source"), v.get("page")) {
            (Some(Value::String(source)), Some(page)) => Some(Citation {
                source: source.clone(),
                page: page.as_str().map(|p| p.to_string()),
            }),
            _ => None,
        };
        return Ok(ChatAnswer {
            answer: answer.to_string(),
            citation,
        });
    }
    if let Some(err) = v.get("error").and_then(|e| e.as_str()) {
        return Err(ApiError::Backend(err.to_string()));
    }
    Err(ApiError::Malformed(NO_ANSWER_TEXT.to_string()))
}

/// Resolve the user-facing message for a failure body.
///
/// Precedence: `error` field → `message` field → raw body text → fallback.
fn error_text_from_body(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            if let Some(e) = map.get("error").and_then(|v| v.as_str()) {
                return e.to_string();
            }
            if let Some(m) = map.get("message").and_then(|v| v.as_str()) {
                return m.to_string();
            }
            trimmed.to_string()
        }
        Ok(Value::String(s)) => s,
        _ => trimmed.to_string(),
    }
}
