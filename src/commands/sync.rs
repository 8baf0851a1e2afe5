//! `confluence-sync sync`: publish every configured page.

use std::sync::Arc;

use tracing::debug;

use crate::cli::{Cli, EXIT_INVALID_CONFIG};
use crate::color::ColorScheme;
use crate::config::SyncConfig;
use crate::confluence::ConfluenceClient;
use crate::error::{BatchError, error_chain};
use crate::outputs::{abort_outputs, batch_outputs, write_outputs};
use crate::sync::{BatchReport, BatchRunner, PageOutcome, SyncSettings, SyncStatus};

/// Exit code when at least one page failed.
const EXIT_PAGE_FAILED: i32 = 1;

/// Exit code when no usable credentials were supplied.
const EXIT_AUTH: i32 = 2;

/// Load the configuration, sync every page and report the results.
///
/// # Returns
/// The process exit code: `0` when every page succeeded, `1` when a page
/// failed, `2` for missing credentials and `4` for an invalid configuration.
pub(crate) async fn handle_sync_command(cli: &Cli, colors: &ColorScheme) -> i32 {
  let mut config = match SyncConfig::load(&cli.config.config) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{} {}", colors.error("Error:"), e);
      return EXIT_INVALID_CONFIG;
    }
  };
  config.apply_overrides(&cli.overrides());

  if let Err(e) = config.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    return EXIT_INVALID_CONFIG;
  }

  let credentials = match config.credentials() {
    Ok(credentials) => credentials,
    Err(e) => {
      eprintln!("{} {}", colors.error("Error:"), e);
      return EXIT_AUTH;
    }
  };

  let client = match ConfluenceClient::new(&config.base_url, credentials, cli.client_options(config.insecure)) {
    Ok(client) => client,
    Err(e) => {
      eprintln!("{} {}", colors.error("Error:"), e);
      return EXIT_PAGE_FAILED;
    }
  };

  let settings = SyncSettings::from_config(&config)
    .dry_run(cli.sync.dry_run)
    .debug(cli.behavior.debug)
    .convert_options(cli.convert_options());

  if !cli.behavior.quiet {
    print_header(&config, &settings, colors);
  }

  let runner = BatchRunner::new(Arc::new(client), settings).stop_on_first_failure(cli.sync.fail_fast);

  let (outputs, code) = match runner.run(&config.pages).await {
    Ok(report) => {
      if !cli.behavior.quiet {
        print_report(&report, cli.behavior.debug, colors);
      }
      let code = if report.is_success() { 0 } else { EXIT_PAGE_FAILED };
      (batch_outputs(&report), code)
    }
    Err(err) => {
      print_abort(&err, cli.behavior.debug, colors);
      (abort_outputs(&err), EXIT_PAGE_FAILED)
    }
  };

  if let Some(path) = &cli.sync.output_file {
    debug!(path = %path.display(), "Writing outputs");
    if let Err(e) = write_outputs(path, &outputs) {
      eprintln!("{} {:#}", colors.error("Error:"), e);
      return EXIT_PAGE_FAILED;
    }
  }

  code
}

fn print_header(config: &SyncConfig, settings: &SyncSettings, colors: &ColorScheme) {
  println!("{} {}", colors.progress("→"), colors.info("Syncing pages"));
  println!("  {}: {}", colors.emphasis("Confluence"), colors.link(&config.base_url));
  println!("  {}: {}", colors.emphasis("Pages"), colors.number(config.pages.len()));
  println!("  {}: {}", colors.emphasis("File root"), colors.path(settings.file_root.display()));
  if settings.dry_run {
    println!(
      "\n{} {}",
      colors.warning("⚠"),
      colors.warning(format!(
        "DRY RUN: no pages will be changed; previews go to {}",
        settings.cache_path.display()
      ))
    );
  }
}

fn print_report(report: &BatchReport, debug: bool, colors: &ColorScheme) {
  println!();
  for outcome in &report.outcomes {
    print_outcome(outcome, debug, colors);
  }

  let summary = format!("{} succeeded, {} failed", report.succeeded, report.failed);
  if report.is_success() {
    println!("\n{} {}", colors.success("✓"), colors.success(summary));
  } else {
    println!("\n{} {}", colors.error("✗"), colors.error(summary));
  }
}

fn print_outcome(outcome: &PageOutcome, debug: bool, colors: &ColorScheme) {
  let marker = colors.status_marker(outcome.status());
  match outcome.status() {
    SyncStatus::Success => {
      let action = outcome.action.map(|a| a.to_string()).unwrap_or_default();
      println!(
        "{marker} {} {} {}",
        colors.code(action),
        colors.emphasis(outcome.title.as_deref().unwrap_or_default()),
        colors.dimmed(format!("({}, {})", outcome.reported_page_id(), outcome.file.display()))
      );
      if let Some(version) = outcome.version {
        println!("    {}: {}", colors.emphasis("Version"), colors.number(version));
      }
    }
    SyncStatus::Failed => {
      println!(
        "{marker} {} {}",
        colors.number(&outcome.page_id),
        colors.path(outcome.file.display())
      );
      let detail = if debug {
        outcome.error_detail.as_deref().or(outcome.error.as_deref())
      } else {
        outcome.error.as_deref()
      };
      if let Some(detail) = detail {
        println!("    {}: {}", colors.emphasis("Error"), colors.error(detail));
      }
    }
  }
}

fn print_abort(err: &BatchError, debug: bool, colors: &ColorScheme) {
  eprintln!("{} {}", colors.error("✗"), colors.error(err));
  let detail = if debug { error_chain(&err.source) } else { err.source.to_string() };
  eprintln!("  {}: {}", colors.emphasis("Error"), detail);
}
