//! The per-page sync state machine.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{Instrument, debug, info, info_span, warn};

use super::SyncSettings;
use super::outcome::{PageOutcome, SyncAction, SyncSuccess};
use crate::config::PageMapping;
use crate::confluence::{ConfluenceApi, NewPage, Page, PageUpdate};
use crate::convert::ContentType;
use crate::error::{ApiError, SyncError};

/// States a page passes through while it is synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
  Init,
  ReadingFile,
  FileMissing,
  Converting,
  FetchingRemote,
  RemoteFound,
  RemoteNotFound,
  Creating,
  Updating,
  Succeeded,
  Failed,
}

impl fmt::Display for SyncState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      SyncState::Init => "init",
      SyncState::ReadingFile => "reading-file",
      SyncState::FileMissing => "file-missing",
      SyncState::Converting => "converting",
      SyncState::FetchingRemote => "fetching-remote",
      SyncState::RemoteFound => "remote-found",
      SyncState::RemoteNotFound => "remote-not-found",
      SyncState::Creating => "creating",
      SyncState::Updating => "updating",
      SyncState::Succeeded => "succeeded",
      SyncState::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Syncs single page mappings against a Confluence API.
pub struct PageSyncer<'a> {
  api: &'a dyn ConfluenceApi,
  settings: &'a SyncSettings,
}

impl<'a> PageSyncer<'a> {
  #[must_use]
  pub fn new(api: &'a dyn ConfluenceApi, settings: &'a SyncSettings) -> Self {
    Self { api, settings }
  }

  /// Sync one page mapping.
  ///
  /// All log output for the page is emitted inside a `page` span carrying the
  /// page id and file, so concurrent syncs stay distinguishable.
  ///
  /// # Errors
  /// Returns the [`SyncError`] that moved the page to `Failed`.
  pub async fn sync(&self, mapping: &PageMapping) -> Result<SyncSuccess, SyncError> {
    let span = info_span!("page", page_id = %mapping.page_id, file = %mapping.file.display());

    async {
      transition(SyncState::Init);
      let result = self.run(mapping).await;
      match &result {
        Ok(success) => {
          transition(SyncState::Succeeded);
          info!(action = %success.action, title = %success.title, "Page synced");
        }
        Err(err) => {
          transition(SyncState::Failed);
          warn!(error = %err, "Page sync failed");
        }
      }
      result
    }
    .instrument(span)
    .await
  }

  /// Sync one page mapping and turn the result into an outcome.
  pub async fn sync_outcome(&self, mapping: &PageMapping) -> PageOutcome {
    let result = self.sync(mapping).await;
    PageOutcome::from_result(mapping, &result, self.settings.debug)
  }

  async fn run(&self, mapping: &PageMapping) -> Result<SyncSuccess, SyncError> {
    transition(SyncState::ReadingFile);
    let path = self.settings.file_root.join(&mapping.file);
    let source = read_source(&path).await?;

    transition(SyncState::Converting);
    let body = self.convert(&mapping.file, &source);
    debug!(bytes = body.len(), "Converted page body");

    transition(SyncState::FetchingRemote);
    let remote = match self.api.get_page(&mapping.page_id).await {
      Ok(page) => {
        transition(SyncState::RemoteFound);
        Some(page)
      }
      Err(ApiError::NotFound { .. }) => {
        transition(SyncState::RemoteNotFound);
        None
      }
      Err(err) => return Err(err.into()),
    };

    if self.settings.dry_run {
      return self.preview(mapping, &body, remote.as_ref()).await;
    }

    match remote {
      Some(page) => self.update(mapping, body, &page).await,
      None => self.create(mapping, body).await,
    }
  }

  /// Convert the source and prepend the configured prefix.
  fn convert(&self, file: &Path, source: &str) -> String {
    let content_type = ContentType::from_path(file);
    debug!(content_type = %content_type, "Converting source");

    let converted = content_type.convert_with_options(source, &self.settings.convert);
    match &self.settings.prefix {
      Some(prefix) => format!("{prefix}{converted}"),
      None => converted,
    }
  }

  async fn create(&self, mapping: &PageMapping, body: String) -> Result<SyncSuccess, SyncError> {
    transition(SyncState::Creating);
    if mapping.space_key.is_none() {
      warn!("No spaceKey configured for new page; Confluence will likely reject the create");
    }

    let new_page = NewPage {
      title: mapping.resolved_title(),
      space_key: mapping.space_key.clone(),
      parent_id: mapping.parent_id.clone(),
      body,
    };
    let created = self.api.create_page(&new_page).await?;
    debug!(remote_id = %created.id, "Created page");

    Ok(SyncSuccess {
      action: SyncAction::Created,
      remote_id: Some(created.id.clone()),
      version: created.version_number(),
      title: created.title,
    })
  }

  async fn update(&self, mapping: &PageMapping, body: String, remote: &Page) -> Result<SyncSuccess, SyncError> {
    transition(SyncState::Updating);
    let observed_version = remote.version_number().ok_or_else(|| SyncError::MissingVersion {
      page_id: remote.id.clone(),
    })?;

    let update = PageUpdate {
      page_id: remote.id.clone(),
      title: mapping.resolved_title(),
      body,
      observed_version,
    };
    debug!(observed_version, "Updating page");
    let updated = self.api.update_page(&update).await?;

    Ok(SyncSuccess {
      action: SyncAction::Updated,
      remote_id: Some(updated.id.clone()),
      version: updated.version_number(),
      title: updated.title,
    })
  }

  /// Report what a sync would do without writing to Confluence.
  ///
  /// The converted body is saved under the cache path for inspection.
  async fn preview(&self, mapping: &PageMapping, body: &str, remote: Option<&Page>) -> Result<SyncSuccess, SyncError> {
    let cache_file = self.write_preview(mapping, body).await?;
    info!(path = %cache_file.display(), "Wrote preview");

    let Some(remote) = remote else {
      if mapping.space_key.is_none() {
        warn!("No spaceKey configured for new page; a real sync would likely fail");
      }
      return Ok(SyncSuccess {
        action: SyncAction::WouldCreate,
        remote_id: None,
        title: mapping.resolved_title(),
        version: None,
      });
    };

    let action = if !self.settings.force && remote.storage_value() == Some(body) {
      SyncAction::Unchanged
    } else {
      SyncAction::WouldUpdate
    };

    Ok(SyncSuccess {
      action,
      remote_id: Some(remote.id.clone()),
      title: mapping.resolved_title(),
      version: remote.version_number(),
    })
  }

  async fn write_preview(&self, mapping: &PageMapping, body: &str) -> Result<PathBuf, SyncError> {
    let dir = &self.settings.cache_path;
    let path = dir.join(mapping.preview_file_name());
    let cache_err = |source| SyncError::Cache {
      path: path.clone(),
      source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(cache_err)?;
    tokio::fs::write(&path, body).await.map_err(cache_err)?;
    Ok(path)
  }
}

fn transition(state: SyncState) {
  debug!(state = %state, "State transition");
}

/// Read the source file, failing before any remote call when it is missing.
async fn read_source(path: &Path) -> Result<String, SyncError> {
  match tokio::fs::read_to_string(path).await {
    Ok(source) => Ok(source),
    Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(SyncError::Conversion {
      path: path.to_path_buf(),
      message: "file is not valid UTF-8".to_string(),
    }),
    Err(source) => {
      transition(SyncState::FileMissing);
      Err(SyncError::FileNotFound {
        path: path.to_path_buf(),
        source,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_state_names() {
    assert_eq!(SyncState::RemoteNotFound.to_string(), "remote-not-found");
    assert_eq!(SyncState::FetchingRemote.to_string(), "fetching-remote");
  }
}
