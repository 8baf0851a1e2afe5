//! Concurrent execution of page syncs.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream::FuturesUnordered;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use super::SyncSettings;
use super::outcome::{BatchReport, PageOutcome, SyncSuccess};
use super::page::PageSyncer;
use crate::config::PageMapping;
use crate::confluence::ConfluenceApi;
use crate::error::{BatchError, SyncError};

type SyncTask = JoinHandle<Result<SyncSuccess, SyncError>>;

/// Runs one [`PageSyncer`] task per page mapping.
///
/// Every page task is spawned up front. In collect-all mode (the default) the
/// runner waits for all of them and reports each outcome. With
/// [`stop_on_first_failure`](Self::stop_on_first_failure) the runner returns as
/// soon as one page fails; the remaining tasks are detached and keep running
/// to completion, but their outcomes are not reported.
pub struct BatchRunner {
  api: Arc<dyn ConfluenceApi>,
  settings: Arc<SyncSettings>,
  stop_on_first_failure: bool,
}

impl BatchRunner {
  #[must_use]
  pub fn new(api: Arc<dyn ConfluenceApi>, settings: SyncSettings) -> Self {
    Self {
      api,
      settings: Arc::new(settings),
      stop_on_first_failure: false,
    }
  }

  #[must_use]
  pub fn stop_on_first_failure(mut self, enabled: bool) -> Self {
    self.stop_on_first_failure = enabled;
    self
  }

  /// Sync every page mapping.
  ///
  /// # Returns
  /// A report with one outcome per mapping, in the order given.
  ///
  /// # Errors
  /// Only in fail-fast mode: a [`BatchError`] for the first page that failed.
  pub async fn run(&self, pages: &[PageMapping]) -> Result<BatchReport, BatchError> {
    info!(
      pages = pages.len(),
      fail_fast = self.stop_on_first_failure,
      dry_run = self.settings.dry_run,
      "Starting sync"
    );

    let tasks: Vec<SyncTask> = pages.iter().map(|mapping| self.spawn(mapping.clone())).collect();

    let report = if self.stop_on_first_failure {
      self.run_fail_fast(pages, tasks).await?
    } else {
      self.run_collect_all(pages, tasks).await
    };

    info!(succeeded = report.succeeded, failed = report.failed, "Sync finished");
    Ok(report)
  }

  fn spawn(&self, mapping: PageMapping) -> SyncTask {
    let api = Arc::clone(&self.api);
    let settings = Arc::clone(&self.settings);

    tokio::spawn(async move { PageSyncer::new(api.as_ref(), settings.as_ref()).sync(&mapping).await })
  }

  async fn run_collect_all(&self, pages: &[PageMapping], tasks: Vec<SyncTask>) -> BatchReport {
    let results = join_all(tasks).await;

    let outcomes = pages
      .iter()
      .zip(results)
      .map(|(mapping, joined)| {
        let result = flatten_join(mapping, joined);
        PageOutcome::from_result(mapping, &result, self.settings.debug)
      })
      .collect();

    BatchReport::new(outcomes)
  }

  async fn run_fail_fast(&self, pages: &[PageMapping], tasks: Vec<SyncTask>) -> Result<BatchReport, BatchError> {
    let mut pending: FuturesUnordered<_> = tasks
      .into_iter()
      .enumerate()
      .map(|(index, task)| async move { (index, task.await) })
      .collect();

    let mut results: Vec<Option<Result<SyncSuccess, SyncError>>> = pages.iter().map(|_| None).collect();

    while let Some((index, joined)) = pending.next().await {
      let mapping = &pages[index];
      match flatten_join(mapping, joined) {
        Ok(success) => results[index] = Some(Ok(success)),
        Err(source) => {
          debug!(
            page_id = %mapping.page_id,
            in_flight = pending.len(),
            "Stopping at first failure; remaining pages keep running detached"
          );
          return Err(BatchError {
            page_id: mapping.page_id.clone(),
            file: mapping.file.clone(),
            source,
          });
        }
      }
    }

    let outcomes = pages
      .iter()
      .zip(results)
      .filter_map(|(mapping, result)| {
        result.map(|result| PageOutcome::from_result(mapping, &result, self.settings.debug))
      })
      .collect();

    Ok(BatchReport::new(outcomes))
  }
}

/// Fold a task join failure into the page's own result.
fn flatten_join(
  mapping: &PageMapping,
  joined: Result<Result<SyncSuccess, SyncError>, JoinError>,
) -> Result<SyncSuccess, SyncError> {
  joined.unwrap_or_else(|err| {
    Err(SyncError::Task {
      page_id: mapping.page_id.clone(),
      message: err.to_string(),
    })
  })
}
