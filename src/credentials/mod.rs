//! Credentials for authenticating against Confluence.
//!
//! Two schemes are supported:
//!
//! - **Personal access token**, sent as `Authorization: Bearer <token>`. This
//!   is preferred whenever a token is configured.
//! - **User and password** (or Atlassian Cloud API token used as the
//!   password), sent as HTTP Basic auth.
//!
//! Resolution fails with [`AuthError`](crate::error::AuthError) when neither
//! scheme has non-empty values.

mod types;

pub use types::Credentials;
