//! `confluence-sync version`: build metadata embedded by `build.rs`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::color::ColorScheme;

/// Build metadata captured at compile time.
#[derive(Debug, Serialize)]
struct BuildInfo {
  version: &'static str,
  git_commit: &'static str,
  build_timestamp: String,
  target: &'static str,
  rust_version: &'static str,
}

impl BuildInfo {
  fn current() -> Self {
    Self {
      version: env!("CARGO_PKG_VERSION"),
      git_commit: option_env!("GIT_HASH").unwrap_or("unknown"),
      build_timestamp: format_timestamp(env!("BUILD_TIMESTAMP")),
      target: env!("TARGET"),
      rust_version: env!("RUSTC_VERSION"),
    }
  }
}

/// Print version information.
///
/// # Arguments
/// * `json` - Emit a JSON document instead of styled text.
/// * `short` - Print only the package version.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) fn handle_version_command(json: bool, short: bool, colors: &ColorScheme) {
  let info = BuildInfo::current();

  if short {
    println!("{}", info.version);
    return;
  }

  if json {
    match serde_json::to_string_pretty(&info) {
      Ok(text) => println!("{text}"),
      Err(e) => eprintln!("{} {e}", colors.error("Error:")),
    }
    return;
  }

  println!("{} {}", colors.emphasis("confluence-sync"), colors.number(info.version));
  println!("{}: {}", colors.emphasis("Git commit"), colors.code(info.git_commit));
  println!("{}: {}", colors.emphasis("Built"), colors.dimmed(&info.build_timestamp));
  println!("{}: {}", colors.emphasis("Target"), info.target);
  println!("{}: {}", colors.emphasis("Rust version"), info.rust_version);
}

/// Render Unix epoch seconds as a UTC timestamp, or return the input
/// unchanged when it is not a number.
fn format_timestamp(timestamp: &str) -> String {
  timestamp
    .parse::<i64>()
    .ok()
    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    .unwrap_or_else(|| timestamp.to_string())
}
