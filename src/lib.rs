//! Confluence sync library
//!
//! This library converts local Markdown, HTML and plain text files into
//! Confluence storage format and creates or updates the mapped pages.

pub mod cli;
pub mod color;
pub mod commands;
pub mod config;
pub mod confluence;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod outputs;
pub mod sync;
