//! Strongly typed credentials and header construction.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::AuthError;

/// Resolved authentication method for the Confluence API.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
  /// Personal access token, sent with the Bearer scheme.
  Token(String),
  /// Username and password, sent with the Basic scheme.
  Basic {
    /// The username (email address on Atlassian Cloud).
    username: String,
    /// The password or API token.
    password: String,
  },
}

impl Credentials {
  /// Pick the credentials to use from the configured values.
  ///
  /// A non-empty token wins over a user/password pair. A pair is used only
  /// when both halves are non-empty.
  ///
  /// # Errors
  /// Returns [`AuthError`] when no method resolves to non-empty values.
  pub fn resolve(token: Option<&str>, username: Option<&str>, password: Option<&str>) -> Result<Self, AuthError> {
    let non_empty = |value: Option<&str>| value.filter(|v| !v.trim().is_empty()).map(str::to_string);

    if let Some(token) = non_empty(token) {
      return Ok(Self::Token(token));
    }

    match (non_empty(username), non_empty(password)) {
      (Some(username), Some(password)) => Ok(Self::Basic { username, password }),
      _ => Err(AuthError),
    }
  }

  /// Value for the `Authorization` header.
  pub fn header_value(&self) -> String {
    match self {
      Self::Token(token) => format!("Bearer {token}"),
      Self::Basic { username, password } => {
        let credentials = format!("{username}:{password}");
        format!("Basic {}", BASE64.encode(credentials.as_bytes()))
      }
    }
  }

  /// Short name of the scheme, for logs.
  pub fn scheme(&self) -> &'static str {
    match self {
      Self::Token(_) => "bearer",
      Self::Basic { .. } => "basic",
    }
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
      Self::Basic { username, .. } => f
        .debug_struct("Basic")
        .field("username", username)
        .field("password", &"<redacted>")
        .finish(),
    }
  }
}
