//! # crudkit Core
//!
//! Core types, traits, and error handling for crudkit.
//!
//! This crate provides the building blocks shared by the descriptor model
//! and the view controllers:
//!
//! - **Types**: dynamic values, `FieldPath`, `GridSpan`, `RowId`, `Control`
//! - **Traits**: `Validatable`, `Keyed`, `Persistable`
//! - **Errors**: unified error handling with `CrudError` and `CrudResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CrudError, CrudResult, ResultExt};
pub use traits::{Keyed, Persistable, Validatable, first_duplicate_key};
pub use types::{
    Control, FieldPath, GridSpan, Record, RowId, Value, display_text, is_blank, is_empty_filter,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
