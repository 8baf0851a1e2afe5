//! HTML to storage format.

/// Convert an HTML fragment into storage format.
///
/// The fragment is not validated; callers are expected to supply well-formed
/// XHTML. With `wrap` enabled the whole fragment is placed inside a single
/// `<p>` element, otherwise it is returned unchanged.
pub fn html_to_storage(html: &str, wrap: bool) -> String {
  if wrap { format!("<p>{html}</p>") } else { html.to_string() }
}
