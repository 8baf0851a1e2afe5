//! CLI subcommand handlers.
//!
//! Each subcommand lives in its own module, keeping `cli.rs` limited to
//! argument definitions and dispatch.

pub mod completions;
pub mod convert;
pub mod sync;
pub mod version;
