//! # abstract-annotator
//!
//! A web service for browsing a conference abstract export, narrowing it
//! with keyword filters, and annotating each selected abstract with an
//! LLM answer to a single free-text question.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────┐
//!            │   CSV export     │
//!            └────────┬─────────┘
//!                     │ load once, normalize columns
//!                     ▼
//!            ┌──────────────────┐
//!            │   Arc<Table>     │  immutable, shared by all requests
//!            └────────┬─────────┘
//!                     │ search terms, include-empty flag
//!                     ▼
//!            ┌──────────────────┐
//!            │  Filter engine   │  mask + matched keywords per row
//!            └───┬──────────┬───┘
//!                │          │
//!       page     │          │ selected rows + question
//!                ▼          ▼
//!     ┌──────────────┐  ┌─────────────────────┐
//!     │  Paginator   │  │ Annotation manager  │
//!     └──────────────┘  │  batches × workers  │
//!                       │  Answerer per row   │
//!                       └──────────┬──────────┘
//!                                  │ progress, final TableView
//!                                  ▼
//!                       ┌─────────────────────┐
//!                       │    Result store     │  swept after retention
//!                       └──────────┬──────────┘
//!                                  │
//!                                  ▼
//!                       ┌─────────────────────┐
//!                       │  Chunked CSV export │
//!                       └─────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, data path, and LLM settings
//! - [`table`] - Abstract records, derived rows, and the CSV loader
//! - [`search::filter`] - Case-insensitive multi-term keyword filter
//! - [`search::paginate`] - 1-based page slicing
//! - [`llm::answer`] - The `Answerer` seam: dry-run and chat-completion implementations
//! - [`annotate`] - Background annotation jobs and the expiring result store
//! - [`export`] - Streaming CSV download bodies
//! - [`models`] - Request and response types of the HTTP API
//! - [`api`] - Axum handlers and the route table
//! - [`state`] - Shared application state

pub mod annotate;
pub mod api;
pub mod config;
pub mod export;
pub mod llm;
pub mod models;
pub mod search;
pub mod state;
pub mod table;
