//! Entity decoding and CDATA escaping for code block bodies.
//!
//! Code emitted by the Markdown renderer is HTML-escaped. Confluence code
//! macros carry their body in a CDATA section, so the escaping has to be
//! undone before the text is embedded, and any CDATA terminator inside the
//! code has to be split so the section is not closed early.

/// CDATA terminator sequence.
const CDATA_END: &str = "]]>";

/// Replacement that closes the current CDATA section after `]]` and reopens a
/// new one before `>`.
const CDATA_END_ESCAPED: &str = "]]]]><![CDATA[>";

/// Decode the entities produced when HTML-escaping code.
///
/// Decoding happens in a fixed order with `&amp;` handled last, so that an
/// escaped entity such as `&amp;lt;` becomes the literal text `&lt;` rather
/// than being decoded twice into `<`.
///
/// # Examples
///
/// ```
/// use confluence_sync::convert::html_entities::decode_code_entities;
///
/// assert_eq!(decode_code_entities("a &lt; b &amp;&amp; c"), "a < b && c");
/// assert_eq!(decode_code_entities("&amp;lt;"), "&lt;");
/// ```
pub fn decode_code_entities(text: &str) -> String {
  text
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&amp;", "&")
}

/// Make `text` safe to embed inside a single `<![CDATA[...]]>` section.
///
/// Every `]]>` is split across two adjacent CDATA sections. Once parsed, the
/// concatenated sections read back as the original text.
pub fn escape_cdata(text: &str) -> String {
  text.replace(CDATA_END, CDATA_END_ESCAPED)
}
