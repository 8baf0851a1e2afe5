//! Per-page and per-batch results.

use std::fmt;
use std::path::PathBuf;

use crate::config::PageMapping;
use crate::error::{SyncError, error_chain};

/// What a page sync did, or would do in preview mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
  /// A new page was created.
  Created,
  /// An existing page was updated.
  Updated,
  /// Preview: the remote body already matches.
  Unchanged,
  /// Preview: the page does not exist and would be created.
  WouldCreate,
  /// Preview: the page exists and would be updated.
  WouldUpdate,
}

impl SyncAction {
  /// Lowercase name used in outputs.
  pub fn as_str(&self) -> &'static str {
    match self {
      SyncAction::Created => "created",
      SyncAction::Updated => "updated",
      SyncAction::Unchanged => "unchanged",
      SyncAction::WouldCreate => "would-create",
      SyncAction::WouldUpdate => "would-update",
    }
  }
}

impl fmt::Display for SyncAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Details of a page sync that reached `Succeeded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSuccess {
  /// What happened.
  pub action: SyncAction,
  /// Id of the remote page; for creates this is the id Confluence assigned.
  pub remote_id: Option<String>,
  /// Title of the page.
  pub title: String,
  /// Version reported by Confluence after the write, or the observed version
  /// in preview mode.
  pub version: Option<u64>,
}

/// Terminal status of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
  Success,
  Failed,
}

impl SyncStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      SyncStatus::Success => "success",
      SyncStatus::Failed => "failed",
    }
  }
}

impl fmt::Display for SyncStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Observable result of syncing one page mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
  /// Page id from the mapping.
  pub page_id: String,
  /// Source file from the mapping.
  pub file: PathBuf,
  /// Title, known on success.
  pub title: Option<String>,
  /// Remote page id, known on success.
  pub remote_id: Option<String>,
  /// What happened, known on success.
  pub action: Option<SyncAction>,
  /// Remote version, when known.
  pub version: Option<u64>,
  /// Error message on failure.
  pub error: Option<String>,
  /// Error with its full cause chain, populated in debug mode.
  pub error_detail: Option<String>,
}

impl PageOutcome {
  /// Build the outcome of a page sync.
  ///
  /// # Arguments
  /// * `mapping` - The page mapping that was synced.
  /// * `result` - Result of the sync.
  /// * `debug` - Include the full error cause chain on failure.
  pub fn from_result(mapping: &PageMapping, result: &Result<SyncSuccess, SyncError>, debug: bool) -> Self {
    let mut outcome = Self {
      page_id: mapping.page_id.clone(),
      file: mapping.file.clone(),
      title: None,
      remote_id: None,
      action: None,
      version: None,
      error: None,
      error_detail: None,
    };

    match result {
      Ok(success) => {
        outcome.title = Some(success.title.clone());
        outcome.remote_id = success.remote_id.clone();
        outcome.action = Some(success.action);
        outcome.version = success.version;
      }
      Err(err) => {
        outcome.error = Some(err.to_string());
        if debug {
          outcome.error_detail = Some(error_chain(err));
        }
      }
    }

    outcome
  }

  pub fn status(&self) -> SyncStatus {
    if self.error.is_some() {
      SyncStatus::Failed
    } else {
      SyncStatus::Success
    }
  }

  pub fn is_success(&self) -> bool {
    self.status() == SyncStatus::Success
  }

  /// Id to report for the page: the remote id when known, otherwise the
  /// mapping's id.
  pub fn reported_page_id(&self) -> &str {
    self.remote_id.as_deref().unwrap_or(&self.page_id)
  }
}

/// Outcomes of a whole batch, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
  pub outcomes: Vec<PageOutcome>,
  pub succeeded: usize,
  pub failed: usize,
}

impl BatchReport {
  /// Build a report and count successes and failures.
  pub fn new(outcomes: Vec<PageOutcome>) -> Self {
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    let failed = outcomes.len() - succeeded;
    Self {
      outcomes,
      succeeded,
      failed,
    }
  }

  /// True when every page succeeded.
  pub fn is_success(&self) -> bool {
    self.failed == 0
  }
}

#[cfg(test)]
mod tests {
  use std::io;

  use super::*;

  fn mapping() -> PageMapping {
    PageMapping {
      page_id: "placeholder".to_string(),
      file: PathBuf::from("a.md"),
      title: None,
      space_key: None,
      parent_id: None,
    }
  }

  #[test]
  fn test_success_outcome() {
    let result = Ok(SyncSuccess {
      action: SyncAction::Created,
      remote_id: Some("987".to_string()),
      title: "A".to_string(),
      version: Some(1),
    });
    let outcome = PageOutcome::from_result(&mapping(), &result, false);
    assert_eq!(outcome.status(), SyncStatus::Success);
    assert_eq!(outcome.reported_page_id(), "987");
    assert_eq!(outcome.action, Some(SyncAction::Created));
  }

  #[test]
  fn test_failed_outcome_detail_only_in_debug() {
    let result = Err(SyncError::FileNotFound {
      path: PathBuf::from("/root/a.md"),
      source: io::Error::new(io::ErrorKind::NotFound, "gone"),
    });

    let outcome = PageOutcome::from_result(&mapping(), &result, false);
    assert_eq!(outcome.status(), SyncStatus::Failed);
    assert_eq!(outcome.error.as_deref(), Some("file not found: /root/a.md"));
    assert!(outcome.error_detail.is_none());
    assert_eq!(outcome.reported_page_id(), "placeholder");

    let outcome = PageOutcome::from_result(&mapping(), &result, true);
    assert!(outcome.error_detail.unwrap().contains("caused by: gone"));
  }

  #[test]
  fn test_batch_report_counts() {
    let ok = PageOutcome::from_result(
      &mapping(),
      &Ok(SyncSuccess {
        action: SyncAction::Updated,
        remote_id: None,
        title: "A".to_string(),
        version: None,
      }),
      false,
    );
    let failed = PageOutcome {
      error: Some("boom".to_string()),
      ..ok.clone()
    };

    let report = BatchReport::new(vec![ok.clone(), failed, ok]);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.is_success());
    assert!(BatchReport::new(Vec::new()).is_success());
  }
}
