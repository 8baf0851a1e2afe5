//! Test fixtures for Confluence API responses
//!
//! Sample data shaped like `GET /rest/api/content/{id}?expand=body.storage,version,space`
//! responses.

use serde_json::json;

/// A page with its storage body, version and space expanded.
pub fn page_json(id: &str, title: &str, version: u64, body: &str) -> serde_json::Value {
  json!({
    "id": id,
    "type": "page",
    "status": "current",
    "title": title,
    "version": { "number": version, "message": "" },
    "body": {
      "storage": {
        "value": body,
        "representation": "storage"
      }
    },
    "space": {
      "key": "DOCS",
      "name": "Documentation"
    },
    "_links": {
      "webui": format!("/spaces/DOCS/pages/{id}"),
      "self": format!("https://confluence.example.com/rest/api/content/{id}")
    }
  })
}

/// The "Getting Started Guide" page used across tests.
pub fn sample_page_response() -> serde_json::Value {
  page_json(
    "123456",
    "Getting Started Guide",
    7,
    "<h1>Getting Started</h1>\n<p>Welcome to our documentation!</p>\n",
  )
}

/// A page returned without its version expansion.
pub fn page_without_version_response() -> serde_json::Value {
  json!({
    "id": "555",
    "type": "page",
    "title": "Versionless",
    "body": { "storage": { "value": "<p>old</p>", "representation": "storage" } }
  })
}

/// Space metadata for `GET /rest/api/space/DOCS`.
pub fn sample_space_response() -> serde_json::Value {
  json!({
    "id": 98306,
    "key": "DOCS",
    "name": "Documentation",
    "type": "global"
  })
}
