//! Confluence module providing the API abstraction, the HTTP client and the
//! data models exchanged with the REST API.

pub mod api;
pub mod client;
pub mod models;

pub use api::ConfluenceApi;
pub use client::{ClientOptions, ConfluenceClient};
pub use models::{
  Ancestor, CreatePageRequest, NewPage, Page, PageBody, PageLinks, PageSpace, PageUpdate, Space, SpaceRef,
  StorageFormat, UpdatePageRequest, Version, VersionRef, WriteBody,
};
