//! Page synchronization: the per-page state machine and the batch runner.
//!
//! A run reads each mapped file, converts it to storage format, looks up the
//! target page and then creates or updates it. [`PageSyncer`] drives one page;
//! [`BatchRunner`] runs every configured page concurrently and gathers the
//! outcomes.

use std::path::PathBuf;

mod batch;
mod outcome;
mod page;

pub use batch::BatchRunner;
pub use outcome::{BatchReport, PageOutcome, SyncAction, SyncStatus, SyncSuccess};
pub use page::{PageSyncer, SyncState};

use crate::config::{SyncConfig, DEFAULT_CACHE_PATH};
use crate::convert::ConvertOptions;

/// Read-only settings shared by every page sync in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
  /// Directory page files are resolved against.
  pub file_root: PathBuf,
  /// Text prepended to every converted body.
  pub prefix: Option<String>,
  /// Directory preview output is written to.
  pub cache_path: PathBuf,
  /// Skip the unchanged-content check in preview mode.
  pub force: bool,
  /// Preview only: never create or update pages.
  pub dry_run: bool,
  /// Include full error cause chains in outcomes.
  pub debug: bool,
  /// Converter options.
  pub convert: ConvertOptions,
}

impl Default for SyncSettings {
  fn default() -> Self {
    Self {
      file_root: PathBuf::from("."),
      prefix: None,
      cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
      force: false,
      dry_run: false,
      debug: false,
      convert: ConvertOptions::default(),
    }
  }
}

impl SyncSettings {
  /// Build the settings for a run from a validated configuration.
  pub fn from_config(config: &SyncConfig) -> Self {
    Self {
      file_root: config.resolved_file_root(),
      prefix: config.prefix.clone().filter(|p| !p.is_empty()),
      cache_path: config.cache_path.clone(),
      force: config.force,
      ..Self::default()
    }
  }

  #[must_use]
  pub fn dry_run(mut self, enabled: bool) -> Self {
    self.dry_run = enabled;
    self
  }

  #[must_use]
  pub fn debug(mut self, enabled: bool) -> Self {
    self.debug = enabled;
    self
  }

  #[must_use]
  pub fn convert_options(mut self, options: ConvertOptions) -> Self {
    self.convert = options;
    self
  }
}
