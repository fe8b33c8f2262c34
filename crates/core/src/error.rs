//! Error types for crudkit
//!
//! Expected user-input problems (a failed validation rule) are data, not
//! errors. `CrudError` covers descriptor-contract violations, which must fail
//! at construction time, misuse of a controller operation, and the I/O and
//! serialization failures of descriptor files.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for crudkit
#[derive(Debug, Error)]
pub enum CrudError {
    // ========================================================================
    // Descriptor Contract Violations
    // ========================================================================
    /// Two data fields share a name
    #[error("Duplicate field name: '{0}' already exists")]
    DuplicateField(String),

    /// One data field's path lies inside another's, e.g. `settings` and
    /// `settings.email`
    #[error("Field '{child}' is nested inside field '{parent}'")]
    OverlappingField { parent: String, child: String },

    /// Two columns share a key
    #[error("Duplicate column key: '{0}' already exists")]
    DuplicateColumn(String),

    /// Two row or batch actions share a key
    #[error("Duplicate action key: '{0}' already exists")]
    DuplicateAction(String),

    /// An option-bearing field kind has no options
    #[error("Field '{field}' of kind '{kind}' requires at least one option")]
    MissingOptions { field: String, kind: String },

    /// Grid span outside 1..=24
    #[error("Invalid grid span {span}: must be between 1 and 24")]
    InvalidGridSpan { span: u8 },

    /// A field path that is empty or has an empty segment
    #[error("Invalid field path: '{0}'")]
    InvalidFieldPath(String),

    /// A validation rule that cannot be evaluated (e.g. a bad regex)
    #[error("Invalid rule on field '{field}': {message}")]
    InvalidRule { field: String, message: String },

    /// A descriptor that is structurally invalid for another reason
    #[error("Invalid descriptor '{name}': {message}")]
    InvalidDescriptor { name: String, message: String },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// No data field with this path
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// No column with this key
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// No row or batch action with this key
    #[error("Action not found: {0}")]
    ActionNotFound(String),

    /// No loaded row with this identifier
    #[error("Row not found: {0}")]
    RowNotFound(String),

    /// No render strategy registered for a field kind
    #[error("No widget registered for field kind '{0}'")]
    UnregisteredWidget(String),

    // ========================================================================
    // Row Data Errors
    // ========================================================================
    /// A row is missing its identifier
    #[error("Row {index} has no '{row_key}' identifier")]
    MissingRowId { index: usize, row_key: String },

    /// Two rows share an identifier
    #[error("Duplicate row identifier: '{0}'")]
    DuplicateRowId(String),

    // ========================================================================
    // Controller Misuse
    // ========================================================================
    /// A confirmation prompt is open and blocks other actions
    #[error("A confirmation prompt for '{0}' is already open")]
    ConfirmationPending(String),

    /// `confirm`/`dismiss` without an open prompt
    #[error("No confirmation prompt is open")]
    NoPendingConfirmation,

    /// A batch action was invoked with nothing selected
    #[error("Batch action '{0}' requires a non-empty selection")]
    EmptySelection(String),

    /// A toolbar affordance that was configured off
    #[error("Toolbar affordance '{0}' is disabled")]
    AffordanceDisabled(String),

    /// Sorting requested on a column that is not sortable
    #[error("Column '{0}' is not sortable")]
    NotSortable(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Invalid descriptor file format
    #[error("Invalid descriptor file format: {0}")]
    InvalidDescriptorFormat(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl CrudError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        CrudError::Validation(msg.into())
    }

    /// Create an invalid rule error
    pub fn invalid_rule(field: impl Into<String>, msg: impl Into<String>) -> Self {
        CrudError::InvalidRule {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid descriptor error
    pub fn invalid_descriptor(name: impl Into<String>, msg: impl Into<String>) -> Self {
        CrudError::InvalidDescriptor {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        CrudError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        CrudError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a descriptor-contract violation
    pub fn is_descriptor_violation(&self) -> bool {
        matches!(
            self,
            CrudError::DuplicateField(_)
                | CrudError::OverlappingField { .. }
                | CrudError::DuplicateColumn(_)
                | CrudError::DuplicateAction(_)
                | CrudError::MissingOptions { .. }
                | CrudError::InvalidGridSpan { .. }
                | CrudError::InvalidFieldPath(_)
                | CrudError::InvalidRule { .. }
                | CrudError::InvalidDescriptor { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CrudError::FieldNotFound(_)
                | CrudError::ColumnNotFound(_)
                | CrudError::ActionNotFound(_)
                | CrudError::RowNotFound(_)
                | CrudError::UnregisteredWidget(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            CrudError::Io(_) | CrudError::FileRead { .. } | CrudError::FileWrite { .. }
        )
    }
}

/// Result type alias using CrudError
pub type CrudResult<T> = Result<T, CrudError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> CrudResult<T>;
}

impl<T, E: Into<CrudError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> CrudResult<T> {
        self.map_err(|e| {
            let err: CrudError = e.into();
            CrudError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_field_message() {
        let err = CrudError::DuplicateField("email".to_string());
        assert!(err.is_descriptor_violation());
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Duplicate field name: 'email' already exists"
        );
    }

    #[test]
    fn test_missing_options_message() {
        let err = CrudError::MissingOptions {
            field: "role".to_string(),
            kind: "single_select".to_string(),
        };
        assert!(err.is_descriptor_violation());
        assert_eq!(
            err.to_string(),
            "Field 'role' of kind 'single_select' requires at least one option"
        );
    }

    #[test]
    fn test_not_found_errors() {
        let err = CrudError::RowNotFound("42".to_string());
        assert!(err.is_not_found());
        assert!(!err.is_descriptor_violation());
        assert_eq!(err.to_string(), "Row not found: 42");
    }

    #[test]
    fn test_controller_misuse_is_neither() {
        let err = CrudError::EmptySelection("batch_delete".to_string());
        assert!(!err.is_not_found());
        assert!(!err.is_descriptor_violation());
        assert_eq!(
            err.to_string(),
            "Batch action 'batch_delete' requires a non-empty selection"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = CrudError::with_context("Loading descriptors", "Permission denied");
        assert_eq!(err.to_string(), "Loading descriptors: Permission denied");
    }

    #[test]
    fn test_result_ext_wraps_io() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.with_context("Reading users.json").unwrap_err();
        assert_eq!(err.to_string(), "Reading users.json: IO error: missing");
    }

    #[test]
    fn test_io_error_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CrudError = io_err.into();
        assert!(err.is_io());
    }
}
