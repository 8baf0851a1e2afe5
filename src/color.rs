//! Color utilities for terminal output
//!
//! Semantic styles for the sync summary, respecting the `--color` preference
//! and whether stdout is a terminal.

use std::fmt::Display;

use owo_colors::{OwoColorize, Style};

use crate::cli::ColorOption;
use crate::sync::SyncStatus;

/// Color scheme for the application
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Create a new color scheme based on user preference and terminal
  /// capabilities
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => {
        use std::io::IsTerminal;
        std::io::stdout().is_terminal()
      }
    };

    Self { enabled }
  }

  /// Check if colors are enabled
  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  fn paint<T: Display>(&self, text: T, style: Style) -> String {
    if self.enabled {
      format!("{}", text.style(style))
    } else {
      text.to_string()
    }
  }

  /// Style for success messages (green)
  pub fn success<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().green())
  }

  /// Style for error messages (bright red)
  pub fn error<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_red().bold())
  }

  /// Style for warning messages (yellow)
  pub fn warning<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().yellow())
  }

  /// Style for info messages (cyan)
  pub fn info<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().cyan())
  }

  /// Style for emphasis/important text (bright white, bold)
  pub fn emphasis<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_white().bold())
  }

  /// Style for URLs and links (blue, underlined)
  pub fn link<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().blue().underline())
  }

  /// Style for file paths (magenta)
  pub fn path<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().magenta())
  }

  /// Style for numbers and metrics (bright blue)
  pub fn number<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_blue())
  }

  /// Style for commands and code (bright green)
  pub fn code<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_green())
  }

  /// Style for dimmed/secondary text (gray)
  pub fn dimmed<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().dimmed())
  }

  /// Style for progress indicators (bright cyan)
  pub fn progress<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_cyan())
  }

  /// Status marker for a page result (✓ or ✗)
  pub fn status_marker(&self, status: SyncStatus) -> String {
    match status {
      SyncStatus::Success => self.success("✓"),
      SyncStatus::Failed => self.error("✗"),
    }
  }
}
