//! Error types shared across configuration, the API client and page sync.

use std::path::PathBuf;

/// Malformed or incomplete sync configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The configuration file could not be read.
  #[error("failed to read configuration file {path}")]
  Read {
    /// Path that was read.
    path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    source: std::io::Error,
  },

  /// The configuration is not valid JSON for the expected schema.
  #[error("invalid configuration JSON")]
  Json(#[from] serde_json::Error),

  /// A field has a missing or unusable value.
  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Neither a personal access token nor a user/password pair is configured.
#[derive(Debug, thiserror::Error)]
#[error("no credentials configured: set personalAccessToken, or both user and pass")]
pub struct AuthError;

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// The requested resource does not exist (HTTP 404).
  #[error("Confluence API returned 404 Not Found: {body}")]
  NotFound {
    /// Response body returned with the 404.
    body: String,
  },

  /// The server returned a non-success status other than 404.
  #[error("Confluence API returned error {status} {status_text}: {body}")]
  Status {
    /// HTTP status code.
    status: u16,
    /// Canonical reason phrase for the status.
    status_text: String,
    /// Raw response body.
    body: String,
  },

  /// The request could not be sent or the response could not be read.
  #[error("failed to send request to Confluence API")]
  Transport(#[source] reqwest::Error),

  /// The response body was not the expected JSON.
  #[error("failed to parse {what} response from Confluence API")]
  Decode {
    /// Description of the expected payload.
    what: &'static str,
    /// Underlying decoding failure.
    #[source]
    source: reqwest::Error,
  },

  /// The HTTP client could not be built.
  #[error("failed to create HTTP client")]
  Client(#[source] reqwest::Error),

  /// Invalid client options, such as a zero rate limit.
  #[error("invalid client options: {0}")]
  Options(String),
}

impl ApiError {
  /// True when the error means the resource does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(self, ApiError::NotFound { .. })
  }

  /// HTTP status associated with the error, if any.
  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::NotFound { .. } => Some(404),
      ApiError::Status { status, .. } => Some(*status),
      _ => None,
    }
  }
}

/// Failure of a single page sync.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
  /// The local source file is missing or unreadable.
  #[error("file not found: {}", path.display())]
  FileNotFound {
    /// Resolved path of the source file.
    path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    source: std::io::Error,
  },

  /// The source could not be converted to storage format.
  #[error("failed to convert {}: {message}", path.display())]
  Conversion {
    /// Path of the source file.
    path: PathBuf,
    /// Description of the problem.
    message: String,
  },

  /// A remote call failed.
  #[error(transparent)]
  Remote(#[from] ApiError),

  /// The converted body could not be written to the preview cache.
  #[error("failed to write preview to {}", path.display())]
  Cache {
    /// Path that was written.
    path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    source: std::io::Error,
  },

  /// The remote page was returned without its version number.
  #[error("Confluence returned page {page_id} without a version number")]
  MissingVersion {
    /// Remote page id.
    page_id: String,
  },

  /// The page task panicked or was aborted.
  #[error("sync task for page {page_id} did not complete: {message}")]
  Task {
    /// Page the task was syncing.
    page_id: String,
    /// Join failure description.
    message: String,
  },
}

/// A fail-fast batch stopped at the first failing page.
#[derive(Debug, thiserror::Error)]
#[error("sync of page {page_id} ({}) failed", file.display())]
pub struct BatchError {
  /// Page mapping id of the failing page.
  pub page_id: String,
  /// Source file of the failing page.
  pub file: PathBuf,
  /// The page's failure.
  #[source]
  pub source: SyncError,
}

/// Render an error and its `source()` chain, one cause per line.
///
/// Used in debug mode to surface the full context of a failure.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
  let mut out = error.to_string();
  let mut current = error.source();
  while let Some(cause) = current {
    out.push_str("\n  caused by: ");
    out.push_str(&cause.to_string());
    current = cause.source();
  }
  out
}
