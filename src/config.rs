//! Sync configuration: the JSON file, command-line overrides and validation.
//!
//! A configuration file looks like this:
//!
//! ```json
//! {
//!   "baseUrl": "https://confluence.example.com",
//!   "personalAccessToken": "…",
//!   "prefix": "<p><em>Generated from git, do not edit.</em></p>",
//!   "fileRoot": "docs",
//!   "pages": [
//!     { "pageId": "123456", "file": "guide.md" },
//!     { "pageId": "new-faq", "file": "faq.md", "title": "FAQ", "spaceKey": "DOCS", "parentId": "123456" }
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::credentials::Credentials;
use crate::error::{AuthError, ConfigError};

/// Default directory for preview output.
pub const DEFAULT_CACHE_PATH: &str = "build";

/// One local file mapped to one Confluence page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMapping {
  /// Remote page id, or a placeholder key for a page that does not exist yet.
  pub page_id: String,
  /// Source file, relative to the configured file root.
  pub file: PathBuf,
  /// Page title; defaults to the file name without its extension.
  #[serde(default)]
  pub title: Option<String>,
  /// Space to create the page in. Only needed for new pages.
  #[serde(default)]
  pub space_key: Option<String>,
  /// Parent page for new pages.
  #[serde(default)]
  pub parent_id: Option<String>,
}

impl PageMapping {
  /// Title to use when the mapping has none of its own.
  pub fn default_title(&self) -> String {
    self
      .file
      .file_stem()
      .or_else(|| self.file.file_name())
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.page_id.clone())
  }

  /// File name the preview of this page is written to under the cache path.
  ///
  /// Characters that are unsafe in file names are replaced with `_`.
  pub fn preview_file_name(&self) -> String {
    let sanitized: String = self
      .page_id
      .chars()
      .map(|c| {
        if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
          c
        } else {
          '_'
        }
      })
      .collect();

    let stem = match sanitized.trim_matches('.') {
      "" => "page",
      trimmed => trimmed,
    };
    format!("{stem}.storage.xml")
  }

  /// Configured title, falling back to [`default_title`](Self::default_title).
  pub fn resolved_title(&self) -> String {
    self
      .title
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_string)
      .unwrap_or_else(|| self.default_title())
  }
}

/// Global settings shared by every page in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
  /// Confluence base URL; the REST API lives under `{baseUrl}/rest/api`.
  #[serde(default)]
  pub base_url: String,
  /// Username for Basic auth.
  #[serde(default)]
  pub user: Option<String>,
  /// Password or API token for Basic auth.
  #[serde(default)]
  pub pass: Option<String>,
  /// Personal access token for Bearer auth; preferred over `user`/`pass`.
  #[serde(default)]
  pub personal_access_token: Option<String>,
  /// Directory preview output is written to.
  #[serde(default = "default_cache_path")]
  pub cache_path: PathBuf,
  /// Storage-format text prepended to every synced body.
  #[serde(default)]
  pub prefix: Option<String>,
  /// Skip TLS certificate verification.
  #[serde(default)]
  pub insecure: bool,
  /// Skip the local unchanged-content check in preview mode.
  #[serde(default)]
  pub force: bool,
  /// Directory page files are resolved against; defaults to the working
  /// directory.
  #[serde(default)]
  pub file_root: Option<PathBuf>,
  /// Pages to sync.
  #[serde(default)]
  pub pages: Vec<PageMapping>,
}

fn default_cache_path() -> PathBuf {
  PathBuf::from(DEFAULT_CACHE_PATH)
}

/// Values supplied on the command line or through the environment that take
/// precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
  pub base_url: Option<String>,
  pub user: Option<String>,
  pub pass: Option<String>,
  pub personal_access_token: Option<String>,
  pub file_root: Option<PathBuf>,
  pub prefix: Option<String>,
  pub insecure: bool,
  pub force: bool,
}

impl SyncConfig {
  /// Parse a configuration from JSON text without validating it.
  ///
  /// # Errors
  /// Returns [`ConfigError::Json`] when the text is not a valid configuration
  /// object.
  pub fn from_json(text: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(text)?)
  }

  /// Read and parse a configuration file without validating it.
  ///
  /// # Errors
  /// Returns [`ConfigError::Read`] when the file cannot be read and
  /// [`ConfigError::Json`] when it cannot be parsed.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_json(&text)?;
    debug!(path = %path.display(), pages = config.pages.len(), "Loaded configuration");
    Ok(config)
  }

  /// Apply command-line overrides on top of the file values.
  ///
  /// Boolean flags can only switch a setting on.
  pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
    if let Some(url) = &overrides.base_url {
      self.base_url = url.clone();
    }
    if let Some(user) = &overrides.user {
      self.user = Some(user.clone());
    }
    if let Some(pass) = &overrides.pass {
      self.pass = Some(pass.clone());
    }
    if let Some(token) = &overrides.personal_access_token {
      self.personal_access_token = Some(token.clone());
    }
    if let Some(root) = &overrides.file_root {
      self.file_root = Some(root.clone());
    }
    if let Some(prefix) = &overrides.prefix {
      self.prefix = Some(prefix.clone());
    }
    self.insecure |= overrides.insecure;
    self.force |= overrides.force;
  }

  /// Check the configuration before any remote call is made.
  ///
  /// # Errors
  /// Returns [`ConfigError::Invalid`] describing the first problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let base_url = self.base_url.trim();
    if base_url.is_empty() {
      return Err(invalid("baseUrl is required"));
    }

    let parsed = Url::parse(base_url).map_err(|e| invalid(format!("baseUrl is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(invalid(format!(
        "baseUrl must use http or https, got '{}'",
        parsed.scheme()
      )));
    }

    let has = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    if !has(&self.personal_access_token) && has(&self.user) != has(&self.pass) {
      return Err(invalid("user and pass must be provided together"));
    }

    if self.pages.is_empty() {
      return Err(invalid("pages must contain at least one entry"));
    }

    let mut seen = HashSet::new();
    let mut previews: HashMap<String, &str> = HashMap::new();
    for (index, page) in self.pages.iter().enumerate() {
      if page.page_id.trim().is_empty() {
        return Err(invalid(format!("pages[{index}].pageId is required")));
      }
      if page.file.as_os_str().is_empty() {
        return Err(invalid(format!("pages[{index}].file is required")));
      }
      if !seen.insert(page.page_id.as_str()) {
        return Err(invalid(format!(
          "pages[{index}].pageId '{}' is listed more than once",
          page.page_id
        )));
      }
      // Case-insensitive file systems would merge names differing only in case.
      if let Some(other) = previews.insert(page.preview_file_name().to_lowercase(), page.page_id.as_str()) {
        return Err(invalid(format!(
          "pages[{index}].pageId '{}' maps to the same preview file as '{other}'",
          page.page_id
        )));
      }
    }

    Ok(())
  }

  /// Resolve the authentication method for the API client.
  ///
  /// # Errors
  /// Returns [`AuthError`] when neither a token nor a user/pass pair is set.
  pub fn credentials(&self) -> Result<Credentials, AuthError> {
    Credentials::resolve(
      self.personal_access_token.as_deref(),
      self.user.as_deref(),
      self.pass.as_deref(),
    )
  }

  /// Directory that page files are resolved against.
  pub fn resolved_file_root(&self) -> PathBuf {
    match &self.file_root {
      Some(root) if !root.as_os_str().is_empty() => root.clone(),
      _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
  }
}

fn invalid(message: impl Into<String>) -> ConfigError {
  ConfigError::Invalid(message.into())
}
