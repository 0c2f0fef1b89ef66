//! `monday-cli` is a rate-limited, retrying client for the monday.com GraphQL API.
//!
//! Every request goes through one pipeline, [`MondayClient::execute`]:
//! - a sliding-window [`RateLimiter`] admits the attempt
//! - the query is POSTed and the outcome classified into a [`MondayError`]
//! - [`RetryPolicy`] repeats network failures and HTTP 429 with exponential backoff
//!
//! Convenience operations (items, boards, workspaces, docs, status columns) are built
//! on top of `execute`.

mod classify;
mod client;
mod config;
mod docs;
mod error;
mod options;
mod rate_limit;
mod retry;
mod wire;

pub mod queries;
pub mod status;

pub use classify::{classify, parse_retry_after, Outcome, DEFAULT_RETRY_AFTER_SECS};
pub use client::{
    BoardFilter, BoardState, ItemBoard, MondayClient, WorkspaceFilter, WorkspaceMembership,
    COMPLEXITY_WARNING_THRESHOLD, DEFAULT_API_URL, USER_AGENT,
};
pub use config::{ConfigError, Settings};
pub use docs::DocContent;
pub use error::{ErrorKind, MondayError};
pub use options::ClientOptions;
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use status::{ColumnSummary, StatusColumn, StatusOption};
pub use wire::ComplexityBudget;

pub type Result<T> = std::result::Result<T, MondayError>;
