//! # crudkit CLI
//!
//! Command-line tools for descriptor files.
//!
//! ## Commands
//!
//! - `check` - Validate descriptor files against the descriptor contract
//! - `render` - Preview the form, search panel and table of a file as text
//! - `info` - Summarize a descriptor file
//! - `new` - Write a sample descriptor file to start from
//!

pub mod commands;
pub mod logging;

pub use crudkit_core;
pub use crudkit_descriptor;
pub use crudkit_ui;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");
