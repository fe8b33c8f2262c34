//! # crudkit Descriptor Model
//!
//! Declarative descriptions of admin screens:
//!
//! - **Fields**: form inputs with kinds, options, rules and grid spans
//! - **Rules**: ordered validation constraints
//! - **Columns**: list columns with optional formatters
//! - **Actions**: row and batch actions with host handlers
//! - **Search fields**: filters of a search panel
//! - **Config**: form, search panel and table options
//! - **Validation**: descriptor-list contract checks
//! - **Serialization**: descriptor files
//!
//! ## Example
//!
//! ```rust,ignore
//! use crudkit_descriptor::prelude::*;
//!
//! let fields = vec![
//!     FieldDescriptor::text("username", "Username").required().with_span(12),
//!     FieldDescriptor::text("email", "Email").with_rule(ValidationRule::email()),
//! ];
//! validate_fields(&fields)?;
//! ```

pub mod action;
pub mod column;
pub mod config;
pub mod field;
pub mod presets;
pub mod rules;
pub mod search;
pub mod serialization;
pub mod validation;

pub use action::{
    ActionStyle, BatchActionDescriptor, BatchHandler, CommonActions, ConfirmPrompt, Emphasis,
    HandlerResult, RowActionDescriptor, RowHandler,
};
pub use column::{CellFormatter, ColumnDescriptor};
pub use config::{FormConfig, Pagination, SearchPanelConfig, TableConfig, ToolbarConfig};
pub use field::{FieldDescriptor, FieldKind, FieldOption};
pub use presets::{CommonFields, CommonSearchFields, status_options};
pub use rules::{CustomRule, ValidationRule};
pub use search::{SearchFieldDescriptor, SearchFieldKind};
pub use serialization::{
    DescriptorFile, default_file_name, is_descriptor_file, load_descriptors,
    load_descriptors_from_string, save_descriptors,
};
pub use validation::{
    ValidationError, ValidationErrorCode, ValidationResult, ValidationWarning,
    ValidationWarningCode, check_batch_actions, check_columns, check_fields, check_row_actions,
    check_search_fields, validate_fields, validate_search_fields, validate_table,
};

/// Current schema version of descriptor files
pub const SCHEMA_VERSION: u32 = 1;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::*;
    pub use crate::column::*;
    pub use crate::config::*;
    pub use crate::field::*;
    pub use crate::presets::*;
    pub use crate::rules::*;
    pub use crate::search::*;
    pub use crate::validation::{validate_fields, validate_search_fields, validate_table};
    pub use crate::SCHEMA_VERSION;
    pub use crudkit_core::{Control, CrudError, CrudResult, FieldPath, GridSpan, Record, RowId, Value};
}
