//! confluence-sync - Publish local files to Confluence pages
//!
//! This is the main entry point for the CLI application.

#[tokio::main]
async fn main() {
  confluence_sync::cli::run().await;
}
