//! Markdown to storage format.
//!
//! Parsing and HTML rendering are delegated to `pulldown-cmark` with the
//! GitHub extensions enabled. Soft line breaks stay plain newlines, bare
//! `http(s)://` URLs in text become links, and the rendered HTML is passed
//! through [`normalize_code_blocks`](super::normalize_code_blocks) so fenced
//! code turns into Confluence code macros.

use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html};
use regex::Regex;

use super::normalize::{NormalizeOptions, normalize_code_blocks_with_options};

/// Bare URL in running text. The URL (group 1) must start the text or follow
/// whitespace or an opening delimiter.
static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:^|[\s(*_~])(https?://[^\s<>]+)").expect("bare url pattern is valid")
});

/// Parser options: tables, strikethrough, task lists and the other GFM bits.
fn parser_options() -> Options {
  Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_GFM
}

/// Convert Markdown into Confluence storage format.
///
/// # Examples
///
/// ```
/// use confluence_sync::convert::markdown::markdown_to_storage;
///
/// let storage = markdown_to_storage("# Title\n\nSome ~~old~~ text");
/// assert_eq!(storage, "<h1>Title</h1>\n<p>Some <del>old</del> text</p>\n");
/// ```
pub fn markdown_to_storage(markdown: &str) -> String {
  markdown_to_storage_with_options(markdown, &NormalizeOptions::default())
}

/// Convert Markdown into storage format with explicit code macro options.
pub fn markdown_to_storage_with_options(markdown: &str, options: &NormalizeOptions) -> String {
  normalize_code_blocks_with_options(&markdown_to_html(markdown), options)
}

/// Render Markdown to generic HTML without any Confluence-specific rewriting.
pub fn markdown_to_html(markdown: &str) -> String {
  let parser = TextMergeStream::new(Parser::new_ext(markdown, parser_options()));
  let events = autolink_bare_urls(parser);

  let mut output = String::with_capacity(markdown.len() + markdown.len() / 2);
  html::push_html(&mut output, events.into_iter());
  output
}

/// Wrap bare URLs found in text events with link events.
///
/// Text inside existing links, images and code blocks is left alone.
fn autolink_bare_urls<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
  let mut output = Vec::new();
  let mut link_depth = 0usize;
  let mut image_depth = 0usize;
  let mut in_code_block = false;

  for event in events {
    match event {
      Event::Start(Tag::Link { .. }) => link_depth += 1,
      Event::End(TagEnd::Link) => link_depth = link_depth.saturating_sub(1),
      Event::Start(Tag::Image { .. }) => image_depth += 1,
      Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
      Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
      Event::End(TagEnd::CodeBlock) => in_code_block = false,
      Event::Text(ref text) if link_depth == 0 && image_depth == 0 && !in_code_block => {
        if BARE_URL_RE.is_match(text) {
          push_linked_text(text, &mut output);
          continue;
        }
      }
      _ => {}
    }
    output.push(event);
  }

  output
}

/// Split `text` into plain text and link events.
fn push_linked_text<'a>(text: &str, output: &mut Vec<Event<'a>>) {
  let mut cursor = 0;

  for caps in BARE_URL_RE.captures_iter(text) {
    let Some(found) = caps.get(1) else {
      continue;
    };
    let url = trim_trailing_punctuation(found.as_str());
    if url.is_empty() {
      continue;
    }

    if found.start() > cursor {
      output.push(Event::Text(CowStr::from(text[cursor..found.start()].to_string())));
    }

    output.push(Event::Start(Tag::Link {
      link_type: LinkType::Autolink,
      dest_url: CowStr::from(url.to_string()),
      title: CowStr::Borrowed(""),
      id: CowStr::Borrowed(""),
    }));
    output.push(Event::Text(CowStr::from(url.to_string())));
    output.push(Event::End(TagEnd::Link));

    cursor = found.start() + url.len();
  }

  if cursor < text.len() {
    output.push(Event::Text(CowStr::from(text[cursor..].to_string())));
  }
}

/// Drop sentence punctuation that follows a URL, and closing parentheses
/// that have no opening partner inside the URL.
fn trim_trailing_punctuation(url: &str) -> &str {
  let mut trimmed = url;
  loop {
    let Some(last) = trimmed.chars().last() else {
      return trimmed;
    };

    let drop = match last {
      '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '*' | '_' | '~' => true,
      ')' => trimmed.matches(')').count() > trimmed.matches('(').count(),
      _ => false,
    };

    if !drop {
      return trimmed;
    }
    trimmed = &trimmed[..trimmed.len() - last.len_utf8()];
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_heading_and_paragraph() {
    let output = markdown_to_storage("# Title\n\nHello *world* and **bold**");
    insta::assert_snapshot!(output, @r"
    <h1>Title</h1>
    <p>Hello <em>world</em> and <strong>bold</strong></p>
    ");
  }

  #[test]
  fn test_soft_breaks_are_not_converted_to_br() {
    let output = markdown_to_storage("line one\nline two");
    assert_eq!(output, "<p>line one\nline two</p>\n");
    assert!(!output.contains("<br"));
  }

  #[test]
  fn test_fenced_code_becomes_code_macro() {
    let output = markdown_to_storage("Intro\n\n```rust\nfn main() {\n    println!(\"<hi>\");\n}\n```\n");
    assert_eq!(
      output,
      "<p>Intro</p>\n<ac:structured-macro ac:name=\"code\"><ac:plain-text-body><![CDATA[fn main() {\n    println!(\"<hi>\");\n}]]></ac:plain-text-body></ac:structured-macro>\n"
    );
  }

  #[test]
  fn test_two_fenced_blocks_produce_two_macros() {
    let output = markdown_to_storage("```\n\n\nfirst\n\n```\n\ntext\n\n```sh\nsecond &amp; more\n```\n");
    assert_eq!(output.matches("<ac:structured-macro ac:name=\"code\">").count(), 2);
    assert!(output.contains("<![CDATA[first]]>"));
    // Markdown source `&amp;` is escaped once by the renderer and decoded once here.
    assert!(output.contains("<![CDATA[second &amp; more]]>"));
    assert!(!output.contains("<pre>"));
  }

  #[test]
  fn test_inline_code_is_left_as_html() {
    let output = markdown_to_storage("Use `a < b` here");
    assert_eq!(output, "<p>Use <code>a &lt; b</code> here</p>\n");
  }

  #[test]
  fn test_tables_are_rendered() {
    let output = markdown_to_storage("| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert!(output.contains("<table>"));
    assert!(output.contains("<th>a</th>"));
    assert!(output.contains("<td>2</td>"));
  }

  #[test]
  fn test_strikethrough_and_task_lists() {
    let output = markdown_to_storage("~~gone~~\n\n- [x] done\n- [ ] todo\n");
    assert!(output.contains("<del>gone</del>"));
    assert!(output.contains("type=\"checkbox\""));
  }

  #[test]
  fn test_bare_urls_are_autolinked() {
    let output = markdown_to_storage("See https://example.com/docs. Thanks");
    assert_eq!(
      output,
      "<p>See <a href=\"https://example.com/docs\">https://example.com/docs</a>. Thanks</p>\n"
    );
  }

  #[test]
  fn test_urls_inside_words_are_not_linked() {
    let output = markdown_to_storage("foohttps://x.io and (https://y.io)");
    assert_eq!(
      output,
      "<p>foohttps://x.io and (<a href=\"https://y.io\">https://y.io</a>)</p>\n"
    );
  }

  #[test]
  fn test_existing_links_are_not_double_linked() {
    let output = markdown_to_storage("[https://example.com](https://example.com)");
    assert_eq!(output.matches("<a ").count(), 1);
  }

  #[test]
  fn test_urls_in_code_blocks_stay_literal() {
    let output = markdown_to_storage("```\ncurl https://example.com\n```\n");
    assert!(!output.contains("<a "));
    assert!(output.contains("<![CDATA[curl https://example.com]]>"));
  }

  #[test]
  fn test_trim_trailing_punctuation() {
    assert_eq!(trim_trailing_punctuation("https://a.io/x)."), "https://a.io/x");
    assert_eq!(
      trim_trailing_punctuation("https://en.wikipedia.org/wiki/Rust_(language)"),
      "https://en.wikipedia.org/wiki/Rust_(language)"
    );
    assert_eq!(trim_trailing_punctuation("https://a.io/?q=1"), "https://a.io/?q=1");
  }
}
