//! `confluence-sync convert`: preview the storage format of a local file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::Cli;
use crate::convert::{ContentType, convert_file_contents};

/// Convert `file` and print the storage-format body to stdout.
///
/// The `--prefix` flag is applied the same way a sync applies it. No
/// configuration file or network access is needed.
///
/// # Errors
/// Returns an error when the file cannot be read.
pub(crate) fn handle_convert_command(file: &Path, cli: &Cli) -> Result<()> {
  let source = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
  debug!(file = %file.display(), content_type = %ContentType::from_path(file), "Converting file");

  println!("{}", render(file, &source, cli.config.prefix.as_deref(), cli));
  Ok(())
}

fn render(file: &Path, source: &str, prefix: Option<&str>, cli: &Cli) -> String {
  let converted = convert_file_contents(file, source, &cli.convert_options());
  format!("{}{converted}", prefix.unwrap_or_default())
}
