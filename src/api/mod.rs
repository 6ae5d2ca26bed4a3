//! API client module for docvault.
//!
//! Provides the authenticated HTTP client (token injection, single-flight
//! refresh, one retry), request/response types matching the backend API, and
//! one module per backend area: auth, folders, documents, share links and
//! search.

pub mod auth;
pub mod client;
pub mod documents;
pub mod error;
pub mod folders;
pub mod progress;
pub mod refresh;
pub mod request;
pub mod search;
pub mod share;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, RefreshError};
pub use progress::UploadProgress;
pub use request::{FormField, OutboundRequest};

/// Percent-encode one path segment (ids come from user input on the CLI).
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
