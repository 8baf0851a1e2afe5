//! Rewrites generic HTML code blocks into Confluence code macros.
//!
//! The Markdown renderer emits fenced code as `<pre><code>` elements with the
//! body HTML-escaped. Confluence expects a `code` structured macro whose body
//! is plain text in a CDATA section, so each block is located, decoded,
//! trimmed and re-emitted. Everything outside code blocks is left untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use super::html_entities::{decode_code_entities, escape_cdata};

/// Matches one `<pre><code ...>...</code></pre>` span, non-greedy across lines.
static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)<pre><code([^>]*)>(.*?)</code></pre>").expect("code block pattern is valid")
});

/// Extracts the language from a `class="language-xyz"` attribute.
static LANGUAGE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"class="language-([^"\s]+)""#).expect("language pattern is valid"));

/// Options that control code macro output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
  /// Emit the fenced block's language as an `ac:parameter` on the macro.
  pub emit_language: bool,
}

/// Rewrite every `<pre><code>` block in `html` into a Confluence code macro.
///
/// # Examples
///
/// ```
/// use confluence_sync::convert::normalize_code_blocks;
///
/// let html = "<pre><code class=\"language-sh\">\necho &quot;hi&quot;\n</code></pre>";
/// assert_eq!(
///   normalize_code_blocks(html),
///   "<ac:structured-macro ac:name=\"code\"><ac:plain-text-body><![CDATA[echo \"hi\"]]></ac:plain-text-body></ac:structured-macro>"
/// );
/// ```
pub fn normalize_code_blocks(html: &str) -> String {
  normalize_code_blocks_with_options(html, &NormalizeOptions::default())
}

/// Rewrite every `<pre><code>` block using the provided options.
///
/// # Arguments
/// * `html` - Generic HTML as produced by the Markdown renderer.
/// * `options` - Output flags, such as whether to emit the language.
///
/// # Returns
/// The HTML with each code block replaced by a `code` structured macro.
pub fn normalize_code_blocks_with_options(html: &str, options: &NormalizeOptions) -> String {
  CODE_BLOCK_RE
    .replace_all(html, |caps: &Captures| {
      let language = LANGUAGE_RE
        .captures(&caps[1])
        .and_then(|lang| lang.get(1))
        .map(|lang| lang.as_str());
      trace!(language = language.unwrap_or(""), "Rewriting code block");

      let language = if options.emit_language { language } else { None };
      code_macro(&caps[2], language)
    })
    .into_owned()
}

/// Build the macro markup for one escaped code body.
fn code_macro(escaped_code: &str, language: Option<&str>) -> String {
  let decoded = decode_code_entities(escaped_code);
  let trimmed = decoded.trim_matches(|c| matches!(c, '\n' | '\r'));

  let mut out = String::from(r#"<ac:structured-macro ac:name="code">"#);
  if let Some(language) = language {
    out.push_str(r#"<ac:parameter ac:name="language">"#);
    out.push_str(language);
    out.push_str("</ac:parameter>");
  }
  out.push_str("<ac:plain-text-body><![CDATA[");
  out.push_str(&escape_cdata(trimmed));
  out.push_str("]]></ac:plain-text-body></ac:structured-macro>");
  out
}
