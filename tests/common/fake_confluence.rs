//! Fake Confluence API client for testing
//!
//! Keeps pages in memory, records every call it receives and can be told to
//! fail specific operations, so sync behavior can be checked without a
//! network.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use confluence_sync::confluence::{ConfluenceApi, NewPage, Page, PageUpdate, Space};
use confluence_sync::error::ApiError;

/// A call received by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  GetPage(String),
  CreatePage(NewPage),
  UpdatePage(PageUpdate),
  GetSpace(String),
}

#[derive(Default)]
struct State {
  pages: HashMap<String, Page>,
  calls: Vec<Call>,
  next_id: u64,
}

/// A fake Confluence client backed by an in-memory page map.
#[derive(Default)]
pub struct FakeConfluenceClient {
  state: Mutex<State>,
  /// Page ids whose lookup fails with the given HTTP status.
  get_failures: HashMap<String, u16>,
  /// Page ids whose update is rejected as a version conflict.
  update_conflicts: HashSet<String>,
}

impl FakeConfluenceClient {
  /// Create a new fake client with no pages
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a page from a JSON value
  pub fn with_page_json(self, json: serde_json::Value) -> Self {
    let page: Page = serde_json::from_value(json).expect("fixture must be a valid page");
    self.with_page(page)
  }

  /// Add a pre-constructed Page object
  pub fn with_page(self, page: Page) -> Self {
    self.state.lock().unwrap().pages.insert(page.id.clone(), page);
    self
  }

  /// Make `get_page` for `page_id` fail with `status`.
  pub fn failing_get(mut self, page_id: &str, status: u16) -> Self {
    self.get_failures.insert(page_id.to_string(), status);
    self
  }

  /// Reject updates of `page_id` with 409 Conflict.
  pub fn conflicting_update(mut self, page_id: &str) -> Self {
    self.update_conflicts.insert(page_id.to_string());
    self
  }

  /// Every call received so far, in order.
  pub fn calls(&self) -> Vec<Call> {
    self.state.lock().unwrap().calls.clone()
  }

  /// Calls that would change Confluence.
  pub fn writes(&self) -> Vec<Call> {
    self
      .calls()
      .into_iter()
      .filter(|call| matches!(call, Call::CreatePage(_) | Call::UpdatePage(_)))
      .collect()
  }

  /// Current state of a stored page.
  pub fn page(&self, page_id: &str) -> Option<Page> {
    self.state.lock().unwrap().pages.get(page_id).cloned()
  }

  fn record(&self, call: Call) {
    self.state.lock().unwrap().calls.push(call);
  }
}

fn status_error(status: u16, status_text: &str, body: &str) -> ApiError {
  ApiError::Status {
    status,
    status_text: status_text.to_string(),
    body: body.to_string(),
  }
}

fn stored_page(id: String, title: String, version: u64, body: &str) -> Page {
  serde_json::from_value(serde_json::json!({
    "id": id,
    "type": "page",
    "status": "current",
    "title": title,
    "version": { "number": version },
    "body": { "storage": { "value": body, "representation": "storage" } }
  }))
  .expect("constructed page must deserialize")
}

#[async_trait]
impl ConfluenceApi for FakeConfluenceClient {
  async fn get_page(&self, page_id: &str) -> Result<Page, ApiError> {
    self.record(Call::GetPage(page_id.to_string()));

    if let Some(&status) = self.get_failures.get(page_id) {
      return Err(status_error(status, "Injected Failure", "{}"));
    }

    self
      .state
      .lock()
      .unwrap()
      .pages
      .get(page_id)
      .cloned()
      .ok_or_else(|| ApiError::NotFound {
        body: format!(r#"{{"message":"No content found with id: {page_id}"}}"#),
      })
  }

  async fn create_page(&self, page: &NewPage) -> Result<Page, ApiError> {
    self.record(Call::CreatePage(page.clone()));

    if page.space_key.as_deref().unwrap_or_default().is_empty() {
      return Err(status_error(400, "Bad Request", r#"{"message":"Space key is required"}"#));
    }

    let mut state = self.state.lock().unwrap();
    state.next_id += 1;
    let id = format!("{}", 1000 + state.next_id);
    let created = stored_page(id.clone(), page.title.clone(), 1, &page.body);
    state.pages.insert(id, created.clone());
    Ok(created)
  }

  async fn update_page(&self, update: &PageUpdate) -> Result<Page, ApiError> {
    self.record(Call::UpdatePage(update.clone()));

    if self.update_conflicts.contains(&update.page_id) {
      return Err(status_error(409, "Conflict", r#"{"message":"Version must be incremented"}"#));
    }

    let mut state = self.state.lock().unwrap();
    let current = state
      .pages
      .get(&update.page_id)
      .and_then(Page::version_number)
      .ok_or_else(|| ApiError::NotFound { body: String::new() })?;
    if current != update.observed_version {
      return Err(status_error(409, "Conflict", "stale version"));
    }

    let updated = stored_page(
      update.page_id.clone(),
      update.title.clone(),
      update.observed_version + 1,
      &update.body,
    );
    state.pages.insert(update.page_id.clone(), updated.clone());
    Ok(updated)
  }

  async fn get_space(&self, space_key: &str) -> Result<Space, ApiError> {
    self.record(Call::GetSpace(space_key.to_string()));
    Ok(Space {
      id: None,
      key: space_key.to_string(),
      name: space_key.to_string(),
      space_type: Some("global".to_string()),
    })
  }
}
