//! Chat session state machine.
//!
//! A [`ChatSession`] is scoped to exactly one document uid and owns an
//! append-only transcript plus a one-permit busy guard:
//!
//! ```text
//! IDLE (busy = false) ──send(non-empty)──▶ SENDING (busy = true)
//! SENDING ──call completes (any outcome)──▶ IDLE
//! ```
//!
//! Every `send` that passes the guard appends exactly one user entry and
//! exactly one reply entry (ai or error), in that order, and clears the busy
//! flag exactly once on every path. No failure escapes to the caller: every
//! outcome — including local validation failures that never reach the
//! backend — becomes a transcript entry, and the session returns to a
//! continuable idle state.

use std::sync::Arc;

use crate::client::{BackendClient, ChatAnswer};
use crate::error::ApiError;
use crate::models::{is_valid_uid, Message};

/// What `send` did with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was accepted; the transcript gained a user entry and a reply.
    Sent,
    /// Whitespace-only input; no transcript mutation, no backend call.
    EmptyInput,
    /// A request was already outstanding; no transcript mutation, no call.
    Busy,
}

enum Begin {
    Accepted(String),
    Rejected(SendOutcome),
}

/// One conversation about one document.
pub struct ChatSession {
    client: Arc<BackendClient>,
    file_uid: String,
    transcript: Vec<Message>,
    busy: bool,
    pending: Option<String>,
}

impl ChatSession {
    pub fn new(client: Arc<BackendClient>, file_uid: impl Into<String>) -> Self {
        Self {
            client,
            file_uid: file_uid.into(),
            transcript: Vec::new(),
            busy: false,
            pending: None,
        }
    }

    pub fn file_uid(&self) -> &str {
        &self.file_uid
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// True exactly while a chat request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Send one question and append the outcome to the transcript.
    pub async fn send(&mut self, raw: &str) -> SendOutcome {
        let question = match self.begin(raw) {
            Begin::Accepted(q) => q,
            Begin::Rejected(outcome) => return outcome,
        };

        // The bound uid is validated locally; a malformed identifier never
        // reaches the backend.
        let result = if self.file_uid.is_empty() {
            Err(ApiError::Validation("Missing 'file_uid' field".to_string()))
        } else if !is_valid_uid(&self.file_uid) {
            Err(ApiError::Validation(format!(
                "Invalid document id: '{}'",
                self.file_uid
            )))
        } else {
            self.client.chat(&question, &self.file_uid).await
        };

        self.finish(result);
        SendOutcome::Sent
    }

    /// Guarded IDLE → SENDING transition.
    ///
    /// On acceptance the trimmed question is already part of the transcript
    /// and the busy permit is taken; [`finish`](Self::finish) must follow.
    fn begin(&mut self, raw: &str) -> Begin {
        if self.busy {
            return Begin::Rejected(SendOutcome::Busy);
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Begin::Rejected(SendOutcome::EmptyInput);
        }
        self.transcript.push(Message::user(trimmed));
        self.busy = true;
        Begin::Accepted(trimmed.to_string())
    }

    /// SENDING → IDLE transition; unconditional on every outcome.
    fn finish(&mut self, result: Result<ChatAnswer, ApiError>) {
        let reply = match result {
            Ok(answer) => Message::ai(answer.answer, answer.citation),
            Err(e) => Message::error(e.message().to_string()),
        };
        self.transcript.push(reply);
        self.busy = false;
    }

    /// Pre-fill pending input with a suggested prompt. No transcript effect.
    pub fn select_suggested_prompt(&mut self, text: impl Into<String>) {
        self.pending = Some(text.into());
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Consume the pending input, if any.
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Citation, Role};

    fn session(uid: &str) -> ChatSession {
        // Port 9 is discard; nothing in these tests performs a request.
        let config = Config::from_base_url("http://127.0.0.1:9");
        let client = Arc::new(BackendClient::new(&config).unwrap());
        ChatSession::new(client, uid)
    }

    #[tokio::test]
    async fn test_whitespace_only_input_is_rejected_silently() {
        let mut s = session("abc-123");
        assert_eq!(s.send("").await, SendOutcome::EmptyInput);
        assert_eq!(s.send("   ").await, SendOutcome::EmptyInput);
        assert_eq!(s.send("\n\t ").await, SendOutcome::EmptyInput);
        assert!(s.transcript().is_empty());
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn test_empty_uid_short_circuits_without_backend() {
        let mut s = session("");
        assert_eq!(s.send("hello").await, SendOutcome::Sent);
        let t = s.transcript();
        assert_eq!(t.len(), 2);
        assert_eq!(t[0], Message::user("hello"));
        assert_eq!(t[1].role, Role::Error);
        assert_eq!(t[1].text, "Missing 'file_uid' field");
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn test_malformed_uid_short_circuits_without_backend() {
        let mut s = session("not a uid!");
        assert_eq!(s.send("hello").await, SendOutcome::Sent);
        let t = s.transcript();
        assert_eq!(t.len(), 2);
        assert_eq!(t[1].role, Role::Error);
        assert!(t[1].text.contains("not a uid!"));
    }

    #[tokio::test]
    async fn test_busy_guard_rejects_second_send() {
        let mut s = session("abc-123");

        // Take the permit by hand to simulate an outstanding call.
        match s.begin("first question") {
            Begin::Accepted(_) => {}
            Begin::Rejected(_) => panic!("first begin should be accepted"),
        }
        assert!(s.is_busy());
        assert_eq!(s.transcript().len(), 1);

        // While busy, a send is a no-op: no transcript mutation, no call.
        assert_eq!(s.send("second question").await, SendOutcome::Busy);
        assert_eq!(s.transcript().len(), 1);
        assert!(s.is_busy());

        s.finish(Ok(ChatAnswer {
            answer: "done".to_string(),
            citation: None,
        }));
        assert!(!s.is_busy());
        assert_eq!(s.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_finish_clears_busy_on_failure_too() {
        let mut s = session("abc-123");
        match s.begin("q") {
            Begin::Accepted(_) => {}
            Begin::Rejected(_) => panic!("begin should be accepted"),
        }
        s.finish(Err(ApiError::Transport("connection reset".to_string())));
        assert!(!s.is_busy());
        assert_eq!(s.transcript().last().unwrap().role, Role::Error);
        assert_eq!(s.transcript().last().unwrap().text, "connection reset");
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let mut s = session("");
        s.send("  what is this?  \n").await;
        assert_eq!(s.transcript()[0].text, "what is this?");
    }

    #[test]
    fn test_citation_attaches_to_ai_entry_only() {
        let mut s = session("abc-123");
        match s.begin("where?") {
            Begin::Accepted(_) => {}
            Begin::Rejected(_) => panic!("begin should be accepted"),
        }
        s.finish(Ok(ChatAnswer {
            answer: "Page three.".to_string(),
            citation: Some(Citation {
                source: "S".to_string(),
                page: Some("3".to_string()),
            }),
        }));

        let t = s.transcript();
        assert_eq!(t[0].citation, None);
        assert_eq!(t[1].citation.as_ref().unwrap().source, "S");
        assert_eq!(t[1].citation.as_ref().unwrap().page.as_deref(), Some("3"));
    }

    #[test]
    fn test_suggested_prompt_has_no_transcript_effect() {
        let mut s = session("abc-123");
        s.select_suggested_prompt("Explain the privacy clause.");
        assert!(s.transcript().is_empty());
        assert_eq!(s.pending(), Some("Explain the privacy clause."));
        assert_eq!(
            s.take_pending().as_deref(),
            Some("Explain the privacy clause.")
        );
        assert_eq!(s.pending(), None);
    }
}
