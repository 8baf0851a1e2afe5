//! Conversion of local source files into Confluence storage format.
//!
//! Every converter is a pure function from source text to storage-format
//! text. The content type of a file is picked from its extension and
//! dispatched through [`ContentType::convert`].
//!
//! # Architecture
//!
//! - [`plain`] - Plain text paragraphs and line breaks
//! - [`html`] - HTML fragments passed through (optionally wrapped)
//! - [`markdown`] - CommonMark/GFM rendered with `pulldown-cmark`
//! - [`normalize`] - Rewrites `<pre><code>` blocks into Confluence code macros
//! - [`html_entities`] - Entity decoding and CDATA escaping for code bodies
//!
//! # Example
//!
//! ```
//! use confluence_sync::convert::ContentType;
//!
//! let storage = ContentType::PlainText.convert("First\n\nSecond");
//! assert_eq!(storage, "<p>First</p><p>Second</p>");
//! ```

use std::path::Path;

pub mod html;
pub mod html_entities;
pub mod markdown;
pub mod normalize;
pub mod plain;

pub use normalize::{NormalizeOptions, normalize_code_blocks, normalize_code_blocks_with_options};

/// Options shared by all converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertOptions {
  /// Emit the language of fenced code blocks on the Confluence code macro.
  pub emit_code_language: bool,
}

/// Source formats understood by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
  /// CommonMark with GitHub extensions.
  Markdown,
  /// HTML fragment that is already close to storage format.
  Html,
  /// Anything else; treated as paragraphs of plain text.
  #[default]
  PlainText,
}

impl ContentType {
  /// Pick the content type for a file from its extension.
  ///
  /// `.md`/`.markdown` map to Markdown and `.html`/`.htm` to HTML, ignoring
  /// case. Any other extension, or none at all, falls back to plain text.
  pub fn from_path(path: &Path) -> Self {
    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
      Some("md" | "markdown") => ContentType::Markdown,
      Some("html" | "htm") => ContentType::Html,
      _ => ContentType::PlainText,
    }
  }

  /// Short lowercase name used in logs.
  pub fn as_str(&self) -> &'static str {
    match self {
      ContentType::Markdown => "markdown",
      ContentType::Html => "html",
      ContentType::PlainText => "plain",
    }
  }

  /// Convert `source` into storage format using the converter for this type.
  ///
  /// Plain text is split into paragraphs and HTML is passed through unwrapped,
  /// which is how files are published during a sync.
  pub fn convert(&self, source: &str) -> String {
    self.convert_with_options(source, &ConvertOptions::default())
  }

  /// Convert `source` into storage format using the provided options.
  pub fn convert_with_options(&self, source: &str, options: &ConvertOptions) -> String {
    match self {
      ContentType::Markdown => markdown::markdown_to_storage_with_options(
        source,
        &NormalizeOptions {
          emit_language: options.emit_code_language,
        },
      ),
      ContentType::Html => html::html_to_storage(source, false),
      ContentType::PlainText => plain::text_to_storage(source, true),
    }
  }
}

impl std::fmt::Display for ContentType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Convert a file's contents into storage format based on its path.
///
/// # Arguments
/// * `path` - Path of the source file; only the extension is inspected.
/// * `source` - The file contents.
/// * `options` - Converter options.
///
/// # Returns
/// The storage-format body for the file.
pub fn convert_file_contents(path: &Path, source: &str, options: &ConvertOptions) -> String {
  ContentType::from_path(path).convert_with_options(source, options)
}
