//! # Clause Chat
//!
//! A terminal client for uploading Terms & Conditions documents to a remote
//! RAG backend, tracking their asynchronous processing status, and holding a
//! multi-turn question-answer conversation about a single document.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      ┌───────────────┐
//! │  Registry    │      │  Chat Session │
//! │  (poller)    │      │ (orchestrator)│
//! └──────┬───────┘      └───────┬───────┘
//!        │                      │
//!        └──────────┬───────────┘
//!                   ▼
//!            ┌─────────────┐        ┌──────────┐
//!            │  Transport  │──HTTP─▶│  Backend │
//!            │  (reqwest)  │        │  (RAG)   │
//!            └─────────────┘        └──────────┘
//! ```
//!
//! Two independent subsystems share one configured HTTP client:
//!
//! - The **document registry** keeps a local list of uploaded documents in
//!   sync with the backend on a fixed polling interval, and refreshes
//!   immediately after a successful upload.
//! - The **chat session** owns an append-only conversation transcript and a
//!   one-permit busy guard, and maps every possible backend outcome to a
//!   transcript entry. Nothing in a session is fatal; every failure leaves
//!   the session idle and continuable.
//!
//! ## Quick Start
//!
//! ```bash
//! clq files                 # list uploaded documents and their status
//! clq upload ./terms.pdf    # upload a PDF and refresh the list
//! clq watch                 # live view, refreshed every poll interval
//! clq chat <uid>            # interactive Q&A about one document
//! clq delete <uid>          # remove a document from the backend
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Documents, transcript messages, citations |
//! | [`error`] | Error taxonomy for backend interactions |
//! | [`client`] | HTTP transport and wire-protocol mapping |
//! | [`registry`] | Document registry and polling loop |
//! | [`session`] | Chat session state machine |
//! | [`prompts`] | Suggested starter prompts |

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod registry;
pub mod session;
