//! Plain text to storage format.

/// Line break element used inside paragraphs.
const LINE_BREAK: &str = "<br/>";

/// Convert plain text into storage-format paragraphs.
///
/// With `split_paragraphs` enabled the text is split on blank lines (`"\n\n"`),
/// each paragraph is trimmed, empty paragraphs are dropped, remaining newlines
/// become `<br/>` and every paragraph is wrapped in `<p>`. When nothing
/// survives a single `<p></p>` is returned so the page body is never empty.
///
/// With `split_paragraphs` disabled the whole input is wrapped verbatim in one
/// paragraph and every newline becomes `<br/>`.
///
/// # Examples
///
/// ```
/// use confluence_sync::convert::plain::text_to_storage;
///
/// assert_eq!(text_to_storage("A\n\nB", true), "<p>A</p><p>B</p>");
/// assert_eq!(text_to_storage("A\n\nB", false), "<p>A<br/><br/>B</p>");
/// ```
pub fn text_to_storage(text: &str, split_paragraphs: bool) -> String {
  if !split_paragraphs {
    return format!("<p>{}</p>", text.replace('\n', LINE_BREAK));
  }

  let paragraphs: Vec<String> = text
    .split("\n\n")
    .map(str::trim)
    .filter(|paragraph| !paragraph.is_empty())
    .map(|paragraph| format!("<p>{}</p>", paragraph.replace('\n', LINE_BREAK)))
    .collect();

  if paragraphs.is_empty() {
    return "<p></p>".to_string();
  }

  paragraphs.concat()
}
