//! Command-line interface definitions for confluence-sync.
//!
//! Running without a subcommand performs a sync using the JSON configuration
//! file; flags and environment variables override values from the file.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::color::ColorScheme;
use crate::commands::completions::handle_completions_command;
use crate::commands::convert::handle_convert_command;
use crate::commands::sync::handle_sync_command;
use crate::commands::version::handle_version_command;
use crate::config::ConfigOverrides;
use crate::confluence::ClientOptions;
use crate::convert::ConvertOptions;

/// Exit code for invalid arguments or configuration.
pub const EXIT_INVALID_CONFIG: i32 = 4;

/// confluence-sync - Publish local files to Confluence pages
#[derive(Debug, Parser)]
#[command(
  name = "confluence-sync",
  version,
  about = "Publish local Markdown, HTML and text files to Confluence pages",
  long_about = "A command-line tool that converts local Markdown, HTML and plain text files into\n\
                Confluence storage format and creates or updates the mapped pages.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute (defaults to `sync`)
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Configuration options
  #[command(flatten)]
  pub config: ConfigOptions,

  /// Authentication options
  #[command(flatten)]
  pub auth: AuthOptions,

  /// Sync options
  #[command(flatten)]
  pub sync: SyncOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,

  /// Performance options
  #[command(flatten)]
  pub performance: PerformanceOptions,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
  /// Sync every configured page (the default)
  Sync,

  /// Print the storage format a local file converts to, without contacting
  /// Confluence
  Convert {
    /// Markdown, HTML or plain text file to convert
    #[arg(value_name = "FILE")]
    file: PathBuf,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Normalize a URL by adding https:// if no scheme is present
fn normalize_url(url: &str) -> Result<String, String> {
  let trimmed = url.trim();

  let candidate = if trimmed.contains("://") {
    trimmed.to_string()
  } else {
    format!("https://{trimmed}")
  };

  let parsed = Url::parse(&candidate).map_err(|e| format!("Invalid URL: {e}"))?;

  let mut url_str = parsed.to_string();
  if url_str.ends_with('/') && url_str.len() > 1 {
    url_str.pop();
  }

  Ok(url_str)
}

/// Configuration file options
#[derive(Debug, Parser)]
pub struct ConfigOptions {
  /// Path to the JSON sync configuration
  #[arg(
    short,
    long,
    env = "CONFLUENCE_SYNC_CONFIG",
    default_value = "confluence-sync.json",
    value_name = "FILE"
  )]
  pub config: PathBuf,

  /// Directory page files are resolved against (overrides `fileRoot`)
  #[arg(long, value_name = "DIR")]
  pub file_root: Option<PathBuf>,

  /// Storage-format text prepended to every page body (overrides `prefix`)
  #[arg(long, global = true, value_name = "TEXT")]
  pub prefix: Option<String>,
}

/// Authentication options
#[derive(Debug, Parser)]
pub struct AuthOptions {
  /// Confluence base URL (overrides `baseUrl`)
  #[arg(long, env = "CONFLUENCE_URL", value_name = "URL", value_parser = normalize_url)]
  pub url: Option<String>,

  /// Confluence username (overrides `user`)
  #[arg(long, env = "CONFLUENCE_USER", value_name = "USER")]
  pub user: Option<String>,

  /// Confluence password or API token (overrides `pass`)
  #[arg(long, env = "CONFLUENCE_PASS", value_name = "PASSWORD", hide_env_values = true)]
  pub pass: Option<String>,

  /// Personal access token, preferred over user/password (overrides
  /// `personalAccessToken`)
  #[arg(long, env = "CONFLUENCE_TOKEN", value_name = "TOKEN", hide_env_values = true)]
  pub token: Option<String>,
}

/// Sync options
#[derive(Debug, Parser)]
pub struct SyncOptions {
  /// Show what would change without creating or updating pages
  #[arg(long)]
  pub dry_run: bool,

  /// In dry-run mode, report pages as changed even when the body is identical
  #[arg(long)]
  pub force: bool,

  /// Stop reporting at the first failed page instead of syncing all pages
  #[arg(long)]
  pub fail_fast: bool,

  /// Skip TLS certificate verification
  #[arg(long)]
  pub insecure: bool,

  /// Emit fenced code block languages on Confluence code macros
  #[arg(long, global = true)]
  pub emit_code_language: bool,

  /// Append `key=value` results to this file
  #[arg(long, env = "GITHUB_OUTPUT", value_name = "FILE")]
  pub output_file: Option<PathBuf>,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Include full error cause chains in failure reports
  #[arg(long, global = true)]
  pub debug: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

/// Performance options
#[derive(Debug, Parser)]
pub struct PerformanceOptions {
  /// Max requests per second
  #[arg(long, default_value = "10", value_name = "N")]
  pub rate_limit: usize,

  /// Request timeout in seconds
  #[arg(long, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.performance.rate_limit == 0 {
      return Err("--rate-limit must be at least 1 request per second".to_string());
    }

    if self.performance.timeout == 0 {
      return Err("--timeout must be at least 1 second".to_string());
    }

    if self.sync.force && !self.sync.dry_run {
      tracing::debug!("--force only changes dry-run reporting; real syncs always update");
    }

    Ok(())
  }

  /// Configuration values supplied through flags or the environment.
  pub fn overrides(&self) -> ConfigOverrides {
    ConfigOverrides {
      base_url: self.auth.url.clone(),
      user: self.auth.user.clone(),
      pass: self.auth.pass.clone(),
      personal_access_token: self.auth.token.clone(),
      file_root: self.config.file_root.clone(),
      prefix: self.config.prefix.clone(),
      insecure: self.sync.insecure,
      force: self.sync.force,
    }
  }

  /// Transport options for the API client.
  pub fn client_options(&self, insecure: bool) -> ClientOptions {
    ClientOptions {
      timeout_secs: self.performance.timeout,
      rate_limit: self.performance.rate_limit,
      insecure,
    }
  }

  /// Converter options.
  pub fn convert_options(&self) -> ConvertOptions {
    ConvertOptions {
      emit_code_language: self.sync.emit_code_language,
    }
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command.
pub async fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(EXIT_INVALID_CONFIG);
  }

  match cli.command {
    None | Some(Command::Sync) => {
      let code = handle_sync_command(&cli, &colors).await;
      if code != 0 {
        process::exit(code);
      }
    }
    Some(Command::Convert { ref file }) => {
      if let Err(e) = handle_convert_command(file, &cli) {
        eprintln!("{} {:#}", colors.error("Error:"), e);
        process::exit(1);
      }
    }
    Some(Command::Version { json, short }) => {
      handle_version_command(json, short, &colors);
    }
    Some(Command::Completions { shell }) => {
      handle_completions_command(shell);
    }
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["confluence-sync"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
  }

  #[test]
  fn test_defaults() {
    let cli = parse(&["--config", "sync.json"]);
    assert!(cli.command.is_none());
    assert_eq!(cli.config.config, PathBuf::from("sync.json"));
    assert!(!cli.sync.dry_run);
    assert!(!cli.sync.fail_fast);
    assert_eq!(cli.performance.rate_limit, 10);
    assert_eq!(cli.performance.timeout, 30);
    assert!(cli.validate().is_ok());
  }

  #[test]
  fn test_validation_rejects_zero_rate_limit() {
    let cli = parse(&["--rate-limit", "0"]);
    assert!(cli.validate().unwrap_err().contains("--rate-limit"));
  }

  #[test]
  fn test_validation_rejects_zero_timeout() {
    let cli = parse(&["--timeout", "0"]);
    assert!(cli.validate().unwrap_err().contains("--timeout"));
  }

  #[test]
  fn test_overrides_from_flags() {
    let cli = parse(&[
      "--url",
      "confluence.example.com",
      "--token",
      "pat",
      "--file-root",
      "docs",
      "--prefix",
      "<p>x</p>",
      "--insecure",
      "--force",
      "--dry-run",
    ]);
    let overrides = cli.overrides();
    assert_eq!(overrides.base_url.as_deref(), Some("https://confluence.example.com"));
    assert_eq!(overrides.personal_access_token.as_deref(), Some("pat"));
    assert_eq!(overrides.file_root, Some(PathBuf::from("docs")));
    assert_eq!(overrides.prefix.as_deref(), Some("<p>x</p>"));
    assert!(overrides.insecure);
    assert!(overrides.force);
    assert!(cli.client_options(true).insecure);
  }

  #[test]
  fn test_convert_subcommand_accepts_global_flags() {
    let cli = parse(&["convert", "README.md", "--prefix", "<p>p</p>", "--emit-code-language"]);
    match cli.command {
      Some(Command::Convert { ref file }) => assert_eq!(file, &PathBuf::from("README.md")),
      ref other => panic!("unexpected command: {other:?}"),
    }
    assert_eq!(cli.config.prefix.as_deref(), Some("<p>p</p>"));
    assert!(cli.convert_options().emit_code_language);
  }

  #[test]
  fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["confluence-sync", "-q", "-v"]).is_err());
  }

  #[test]
  fn test_url_normalization_adds_https_when_missing() {
    assert_eq!(
      normalize_url("confluence.example.com").unwrap(),
      "https://confluence.example.com"
    );
  }

  #[test]
  fn test_url_normalization_preserves_scheme_and_path() {
    assert_eq!(normalize_url("http://localhost:8090").unwrap(), "http://localhost:8090");
    assert_eq!(
      normalize_url("https://example.com/confluence/").unwrap(),
      "https://example.com/confluence"
    );
  }
}
