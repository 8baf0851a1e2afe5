//! Data transfer objects exchanged with the Confluence REST API.

use serde::{Deserialize, Serialize};

/// Confluence page metadata and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
  /// Unique identifier assigned by Confluence.
  pub id: String,
  /// Human-readable title displayed in the UI.
  pub title: String,
  #[serde(rename = "type", default = "default_content_type")]
  /// Content type (typically `"page"`).
  pub page_type: String,
  /// Publication status such as `"current"`.
  #[serde(default)]
  pub status: Option<String>,
  /// Version information, present when `version` is expanded.
  #[serde(default)]
  pub version: Option<Version>,
  /// Body content, present when `body.storage` is expanded.
  #[serde(default)]
  pub body: Option<PageBody>,
  /// Space the page lives in, present when `space` is expanded.
  #[serde(default)]
  pub space: Option<PageSpace>,
  #[serde(rename = "_links", default)]
  /// Useful hyperlinks, including the canonical UI URL.
  pub links: Option<PageLinks>,
}

impl Page {
  /// Storage-format body of the page, if it was returned.
  pub fn storage_value(&self) -> Option<&str> {
    self
      .body
      .as_ref()
      .and_then(|b| b.storage.as_ref())
      .map(|s| s.value.as_str())
  }

  /// Current version number, if it was returned.
  pub fn version_number(&self) -> Option<u64> {
    self.version.as_ref().map(|v| v.number)
  }
}

fn default_content_type() -> String {
  "page".to_string()
}

/// Page version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
  /// Monotonically increasing version number maintained by Confluence.
  pub number: u64,
  /// Optional version comment.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageBody {
  /// Confluence storage-format XHTML representation.
  #[serde(default)]
  pub storage: Option<StorageFormat>,
}

/// Storage format (Confluence's internal format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageFormat {
  /// Raw XHTML markup.
  pub value: String,
  /// Representation name (always `"storage"` for writes).
  pub representation: String,
}

impl StorageFormat {
  /// Wrap a storage-format string for sending to the API.
  pub fn storage(value: impl Into<String>) -> Self {
    Self {
      value: value.into(),
      representation: "storage".to_string(),
    }
  }
}

/// Space reference embedded in a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpace {
  /// Short key that uniquely identifies the space.
  pub key: String,
  /// Human-readable space name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
}

/// Page links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLinks {
  #[serde(rename = "webui", default)]
  /// Path to the page within the Confluence web UI.
  pub web_ui: Option<String>,
  #[serde(rename = "self", default)]
  /// Fully qualified API endpoint for the resource.
  pub self_link: Option<String>,
}

/// Space metadata returned by `GET /space/{key}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
  /// Numeric identifier.
  #[serde(default)]
  pub id: Option<u64>,
  /// Short key that uniquely identifies the space.
  pub key: String,
  /// Human-readable space name.
  pub name: String,
  #[serde(rename = "type", default)]
  /// Space classification such as `"global"` or `"personal"`.
  pub space_type: Option<String>,
}

/// Reference to an ancestor page when creating content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancestor {
  pub id: String,
}

/// Reference to the space a new page is created in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRef {
  pub key: String,
}

/// Body wrapper used in write requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteBody {
  pub storage: StorageFormat,
}

/// Request body for `POST /content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePageRequest {
  #[serde(rename = "type")]
  pub content_type: String,
  pub title: String,
  pub space: SpaceRef,
  pub body: WriteBody,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ancestors: Option<Vec<Ancestor>>,
}

/// Request body for `PUT /content/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePageRequest {
  pub id: String,
  #[serde(rename = "type")]
  pub content_type: String,
  pub title: String,
  pub body: WriteBody,
  pub version: VersionRef,
}

/// Version carried by an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
  pub number: u64,
}

/// Everything needed to create a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
  /// Title of the new page.
  pub title: String,
  /// Space key; the API rejects the request when it is missing.
  pub space_key: Option<String>,
  /// Optional parent page id.
  pub parent_id: Option<String>,
  /// Storage-format body.
  pub body: String,
}

impl From<&NewPage> for CreatePageRequest {
  fn from(page: &NewPage) -> Self {
    Self {
      content_type: "page".to_string(),
      title: page.title.clone(),
      space: SpaceRef {
        key: page.space_key.clone().unwrap_or_default(),
      },
      body: WriteBody {
        storage: StorageFormat::storage(page.body.clone()),
      },
      ancestors: page.parent_id.as_ref().map(|id| vec![Ancestor { id: id.clone() }]),
    }
  }
}

/// Everything needed to update an existing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate {
  /// Id of the page being replaced.
  pub page_id: String,
  /// New title.
  pub title: String,
  /// New storage-format body.
  pub body: String,
  /// Version number observed when the page was fetched.
  pub observed_version: u64,
}

impl From<&PageUpdate> for UpdatePageRequest {
  fn from(update: &PageUpdate) -> Self {
    Self {
      id: update.page_id.clone(),
      content_type: "page".to_string(),
      title: update.title.clone(),
      body: WriteBody {
        storage: StorageFormat::storage(update.body.clone()),
      },
      // Confluence accepts a write only when it proposes the next version.
      version: VersionRef {
        number: update.observed_version + 1,
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_page_deserializes_expanded_fields() {
    let page: Page = serde_json::from_value(json!({
      "id": "42",
      "type": "page",
      "status": "current",
      "title": "Guide",
      "version": { "number": 7 },
      "body": { "storage": { "value": "<p>x</p>", "representation": "storage" } },
      "space": { "key": "DOCS", "name": "Documentation" }
    }))
    .unwrap();

    assert_eq!(page.version_number(), Some(7));
    assert_eq!(page.storage_value(), Some("<p>x</p>"));
    assert_eq!(page.space.unwrap().key, "DOCS");
  }

  #[test]
  fn test_page_tolerates_missing_expansions() {
    let page: Page = serde_json::from_value(json!({ "id": "1", "title": "Bare" })).unwrap();
    assert_eq!(page.page_type, "page");
    assert!(page.version_number().is_none());
    assert!(page.storage_value().is_none());
  }

  #[test]
  fn test_create_request_shape() {
    let new_page = NewPage {
      title: "Guide".to_string(),
      space_key: Some("DOCS".to_string()),
      parent_id: Some("99".to_string()),
      body: "<p>x</p>".to_string(),
    };
    let value = serde_json::to_value(CreatePageRequest::from(&new_page)).unwrap();
    assert_eq!(
      value,
      json!({
        "type": "page",
        "title": "Guide",
        "space": { "key": "DOCS" },
        "body": { "storage": { "value": "<p>x</p>", "representation": "storage" } },
        "ancestors": [{ "id": "99" }]
      })
    );
  }

  #[test]
  fn test_create_request_omits_ancestors_without_parent() {
    let new_page = NewPage {
      title: "Guide".to_string(),
      space_key: None,
      parent_id: None,
      body: String::new(),
    };
    let value = serde_json::to_value(CreatePageRequest::from(&new_page)).unwrap();
    assert!(value.get("ancestors").is_none());
    assert_eq!(value["space"]["key"], "");
  }

  #[test]
  fn test_update_request_proposes_next_version() {
    let update = PageUpdate {
      page_id: "42".to_string(),
      title: "Guide".to_string(),
      body: "<p>y</p>".to_string(),
      observed_version: 7,
    };
    let value = serde_json::to_value(UpdatePageRequest::from(&update)).unwrap();
    assert_eq!(
      value,
      json!({
        "id": "42",
        "type": "page",
        "title": "Guide",
        "body": { "storage": { "value": "<p>y</p>", "representation": "storage" } },
        "version": { "number": 8 }
      })
    );
  }
}
