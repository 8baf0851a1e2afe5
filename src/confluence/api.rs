//! Trait definitions for interacting with Confluence.

use async_trait::async_trait;

use super::models::{NewPage, Page, PageUpdate, Space};
use crate::error::ApiError;

/// Trait for Confluence API operations (enables testing with fake
/// implementations).
///
/// Implementations must be safe to share between concurrently running page
/// syncs.
#[async_trait]
pub trait ConfluenceApi: Send + Sync {
  /// Fetch a page by ID with its storage body, version and space expanded.
  ///
  /// # Arguments
  /// * `page_id` - Unique Confluence identifier for the page to retrieve.
  ///
  /// # Errors
  /// Returns [`ApiError::NotFound`] when the page does not exist, and another
  /// [`ApiError`] variant for any other failure.
  async fn get_page(&self, page_id: &str) -> Result<Page, ApiError>;

  /// Create a new page.
  ///
  /// # Returns
  /// The page as stored by Confluence, including its assigned id.
  async fn create_page(&self, page: &NewPage) -> Result<Page, ApiError>;

  /// Replace the title and body of an existing page.
  ///
  /// The request is made against `update.observed_version`; Confluence
  /// rejects it when the page changed in the meantime.
  async fn update_page(&self, update: &PageUpdate) -> Result<Page, ApiError>;

  /// Fetch space metadata by key.
  async fn get_space(&self, space_key: &str) -> Result<Space, ApiError>;
}
