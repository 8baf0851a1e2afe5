//! HTTP client implementation for talking to the Confluence REST API.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, trace};

use super::api::ConfluenceApi;
use super::models::{CreatePageRequest, NewPage, Page, PageUpdate, Space, UpdatePageRequest};
use crate::credentials::Credentials;
use crate::error::ApiError;

/// Fields expanded when fetching a page.
const PAGE_EXPAND: &str = "body.storage,version,space";

/// Transport options for [`ConfluenceClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
  /// Request timeout in seconds.
  pub timeout_secs: u64,
  /// Maximum requests per second across all concurrent page syncs.
  pub rate_limit: usize,
  /// Skip TLS certificate verification.
  pub insecure: bool,
}

impl Default for ClientOptions {
  fn default() -> Self {
    Self {
      timeout_secs: 30,
      rate_limit: 10,
      insecure: false,
    }
  }
}

/// Confluence API client.
#[derive(Clone)]
pub struct ConfluenceClient {
  base_url: String,
  credentials: Credentials,
  client: reqwest::Client,
  rate_limiter: Arc<RequestRateLimiter>,
}

/// Simple fixed-window rate limiter to cap the number of requests per interval.
#[derive(Debug)]
struct RequestRateLimiter {
  max_requests: usize,
  window: Duration,
  timestamps: Mutex<VecDeque<Instant>>,
}

impl RequestRateLimiter {
  /// Create a rate limiter with a fixed window.
  ///
  /// # Arguments
  /// * `max_requests` - Maximum number of requests permitted within the window.
  /// * `window` - Duration of the request window used to enforce throttling.
  fn new(max_requests: usize, window: Duration) -> Self {
    Self {
      max_requests,
      window,
      timestamps: Mutex::new(VecDeque::with_capacity(max_requests)),
    }
  }

  /// Wait until the caller can perform another request without exceeding the
  /// rate limit.
  async fn acquire(&self) {
    loop {
      let mut timestamps = self.timestamps.lock().await;
      let now = Instant::now();

      while let Some(earliest) = timestamps.front()
        && now.duration_since(*earliest) >= self.window
      {
        timestamps.pop_front();
      }

      if timestamps.len() < self.max_requests {
        timestamps.push_back(now);
        return;
      }

      let Some(&earliest) = timestamps.front() else {
        timestamps.push_back(now);
        return;
      };

      let wait_duration = self.window.saturating_sub(now.duration_since(earliest));
      drop(timestamps);

      if !wait_duration.is_zero() {
        trace!(?wait_duration, "Rate limit reached, waiting");
        sleep(wait_duration).await;
      }
    }
  }
}

impl ConfluenceClient {
  /// Create a new Confluence client.
  ///
  /// # Arguments
  /// * `base_url` - Base URL of the Confluence instance; the REST API is
  ///   expected under `{base_url}/rest/api`.
  /// * `credentials` - Resolved authentication method.
  /// * `options` - Timeout, rate limit and TLS settings.
  ///
  /// # Errors
  /// Returns an error if the rate limit is zero or if the underlying
  /// `reqwest::Client` cannot be built.
  pub fn new(base_url: impl Into<String>, credentials: Credentials, options: ClientOptions) -> Result<Self, ApiError> {
    if options.rate_limit == 0 {
      return Err(ApiError::Options(
        "rate limit must be at least 1 request per second".to_string(),
      ));
    }

    let base_url = base_url.into().trim_end_matches('/').to_string();

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(options.timeout_secs))
      .danger_accept_invalid_certs(options.insecure)
      .user_agent(format!(
        "confluence-sync/{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("TARGET")
      ))
      .build()
      .map_err(ApiError::Client)?;

    debug!(base_url = %base_url, scheme = credentials.scheme(), insecure = options.insecure, "Created Confluence client");

    Ok(Self {
      base_url,
      credentials,
      client,
      rate_limiter: Arc::new(RequestRateLimiter::new(options.rate_limit, Duration::from_secs(1))),
    })
  }

  /// Root of the REST API.
  fn api_url(&self) -> String {
    format!("{}/rest/api", self.base_url)
  }

  /// Start a request with the auth and JSON headers every call carries.
  async fn request(&self, method: Method, url: &str) -> RequestBuilder {
    self.rate_limiter.acquire().await;
    trace!(%method, url, "Confluence API request");

    self
      .client
      .request(method, url)
      .header(AUTHORIZATION, self.credentials.header_value())
      .header(CONTENT_TYPE, "application/json")
      .header(ACCEPT, "application/json")
  }

  /// Send a request and decode a successful JSON response.
  async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &'static str) -> Result<T, ApiError> {
    let response = request.send().await.map_err(ApiError::Transport)?;
    let response = check_status(response).await?;
    response
      .json::<T>()
      .await
      .map_err(|source| ApiError::Decode { what, source })
  }
}

/// Turn a non-success response into a typed error.
async fn check_status(response: Response) -> Result<Response, ApiError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response
    .text()
    .await
    .unwrap_or_else(|_| String::from("(no error details)"));

  if status == StatusCode::NOT_FOUND {
    return Err(ApiError::NotFound { body });
  }

  Err(ApiError::Status {
    status: status.as_u16(),
    status_text: status.canonical_reason().unwrap_or_default().to_string(),
    body,
  })
}

#[async_trait]
impl ConfluenceApi for ConfluenceClient {
  async fn get_page(&self, page_id: &str) -> Result<Page, ApiError> {
    let url = format!("{}/content/{}?expand={}", self.api_url(), page_id, PAGE_EXPAND);
    let request = self.request(Method::GET, &url).await;
    self.send_json(request, "page").await
  }

  async fn create_page(&self, page: &NewPage) -> Result<Page, ApiError> {
    let url = format!("{}/content", self.api_url());
    let request = self
      .request(Method::POST, &url)
      .await
      .json(&CreatePageRequest::from(page));
    self.send_json(request, "created page").await
  }

  async fn update_page(&self, update: &PageUpdate) -> Result<Page, ApiError> {
    let url = format!("{}/content/{}", self.api_url(), update.page_id);
    let request = self
      .request(Method::PUT, &url)
      .await
      .json(&UpdatePageRequest::from(update));
    self.send_json(request, "updated page").await
  }

  async fn get_space(&self, space_key: &str) -> Result<Space, ApiError> {
    let url = format!("{}/space/{}", self.api_url(), space_key);
    let request = self.request(Method::GET, &url).await;
    self.send_json(request, "space").await
  }
}
