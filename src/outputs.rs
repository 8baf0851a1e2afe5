//! Process outputs written as `key=value` lines.
//!
//! The format matches the `GITHUB_OUTPUT` file used by GitHub Actions, so a
//! workflow step can read `status`, `page-id`, `page-title`, `file-path` and
//! `error` after a run. Multi-line values use the heredoc form
//! (`key<<DELIMITER`).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::BatchError;
use crate::sync::{BatchReport, PageOutcome, SyncStatus};

/// Delimiter for multi-line values.
const HEREDOC_DELIMITER: &str = "CONFLUENCE_SYNC_EOF";

/// Collect the outputs for a finished batch.
///
/// A single page uses the plain keys. With several pages every key gets the
/// page's index as a suffix, and aggregate `status`, `succeeded` and `failed`
/// keys are added.
pub fn batch_outputs(report: &BatchReport) -> Vec<(String, String)> {
  if let [outcome] = report.outcomes.as_slice() {
    return page_outputs(outcome, "");
  }

  let mut outputs = Vec::new();
  for (index, outcome) in report.outcomes.iter().enumerate() {
    outputs.extend(page_outputs(outcome, &format!("-{index}")));
  }

  let status = if report.is_success() {
    SyncStatus::Success
  } else {
    SyncStatus::Failed
  };
  outputs.push(("status".to_string(), status.to_string()));
  outputs.push(("succeeded".to_string(), report.succeeded.to_string()));
  outputs.push(("failed".to_string(), report.failed.to_string()));
  outputs
}

/// Outputs for a fail-fast batch that stopped at `error`.
pub fn abort_outputs(error: &BatchError) -> Vec<(String, String)> {
  vec![
    ("status".to_string(), SyncStatus::Failed.to_string()),
    ("page-id".to_string(), error.page_id.clone()),
    ("file-path".to_string(), error.file.display().to_string()),
    ("error".to_string(), error.source.to_string()),
  ]
}

fn page_outputs(outcome: &PageOutcome, suffix: &str) -> Vec<(String, String)> {
  let mut outputs = vec![
    (format!("status{suffix}"), outcome.status().to_string()),
    (format!("page-id{suffix}"), outcome.reported_page_id().to_string()),
  ];
  if let Some(title) = &outcome.title {
    outputs.push((format!("page-title{suffix}"), title.clone()));
  }
  outputs.push((format!("file-path{suffix}"), outcome.file.display().to_string()));
  if let Some(error) = &outcome.error {
    outputs.push((format!("error{suffix}"), error.clone()));
  }
  outputs
}

/// Render outputs in `GITHUB_OUTPUT` syntax.
pub fn format_outputs(outputs: &[(String, String)]) -> String {
  let mut text = String::new();
  for (key, value) in outputs {
    if value.contains('\n') {
      text.push_str(&format!("{key}<<{HEREDOC_DELIMITER}\n{value}\n{HEREDOC_DELIMITER}\n"));
    } else {
      text.push_str(&format!("{key}={value}\n"));
    }
  }
  text
}

/// Append outputs to `path`, creating the file if needed.
///
/// # Errors
/// Returns an error if the file cannot be opened or written.
pub fn write_outputs(path: &Path, outputs: &[(String, String)]) -> Result<()> {
  let mut file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("Failed to open output file {}", path.display()))?;

  file
    .write_all(format_outputs(outputs).as_bytes())
    .with_context(|| format!("Failed to write outputs to {}", path.display()))?;

  Ok(())
}
