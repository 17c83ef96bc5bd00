//! Core data models for the document registry and chat transcripts.

use serde::Deserialize;
use std::fmt;

/// One uploaded document as reported by the backend's `/files` listing.
///
/// The lifecycle (`Uploaded → Processing → Completed`/`Failed`) is observed,
/// never caused, by this client; `status` only ever reflects the last polled
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub id: i64,
    /// Opaque backend-assigned identifier, used as the chat/delete key.
    pub uid: String,
    /// Display name (original filename).
    pub name: String,
    pub status: DocumentStatus,
}

/// Processing status of a document.
///
/// This is an open string enum: the backend may report values this client
/// does not know about, which are carried verbatim in [`DocumentStatus::Other`]
/// and rendered as a neutral state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl From<String> for DocumentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Uploaded" => DocumentStatus::Uploaded,
            "Processing" => DocumentStatus::Processing,
            "Completed" => DocumentStatus::Completed,
            "Failed" => DocumentStatus::Failed,
            _ => DocumentStatus::Other(s),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::Uploaded => write!(f, "Uploaded"),
            DocumentStatus::Processing => write!(f, "Processing"),
            DocumentStatus::Completed => write!(f, "Completed"),
            DocumentStatus::Failed => write!(f, "Failed"),
            DocumentStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Who produced a transcript entry. Fixed at creation, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Ai,
    Error,
}

/// Source/page metadata attached to an AI answer when the backend supplies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub source: String,
    /// The backend sends `null` for pageless sources.
    pub page: Option<String>,
}

/// One entry in a conversation transcript.
///
/// The transcript is append-only: entries are never edited or removed, and
/// insertion order is the only ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Only ever present on [`Role::Ai`] entries.
    pub citation: Option<Citation>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            citation: None,
        }
    }

    pub fn ai(text: impl Into<String>, citation: Option<Citation>) -> Self {
        Self {
            role: Role::Ai,
            text: text.into(),
            citation,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Error,
            text: text.into(),
            citation: None,
        }
    }
}

/// Check a document uid against the backend's identifier format
/// (`^[A-Za-z0-9-]+$`).
pub fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty() && uid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
