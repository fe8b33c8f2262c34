//! Descriptor-list validation
//!
//! Controllers call the `validate_*` helpers at construction and fail fast
//! with the first contract violation. Tooling (the `crudkit check` command)
//! uses the `check_*` functions instead to get a full report with coded
//! errors and non-fatal warnings.

use crate::action::{BatchActionDescriptor, RowActionDescriptor};
use crate::column::ColumnDescriptor;
use crate::field::FieldDescriptor;
use crate::search::SearchFieldDescriptor;
use crudkit_core::{CrudError, CrudResult, FieldPath, Keyed, Validatable};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// ValidationResult
// ============================================================================

/// Report of a descriptor-list check
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Contract violations; any one of them rejects the list
    pub errors: Vec<ValidationError>,

    /// Suspicious but accepted descriptors
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// An empty report
    pub fn ok() -> Self {
        Self::default()
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Whether the checked list is accepted
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Fail with the first error, if any
    pub fn into_result(self) -> CrudResult<()> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error.error),
            None => Ok(()),
        }
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    DuplicateField,
    /// One field path is a prefix of another
    OverlappingField,
    DuplicateColumn,
    DuplicateAction,
    DuplicateSearchField,
    MissingOptions,
    InvalidSpan,
    InvalidPath,
    InvalidRule,
    InvalidDescriptor,
}

impl ValidationErrorCode {
    fn for_error(error: &CrudError) -> Self {
        match error {
            CrudError::DuplicateField(_) => Self::DuplicateField,
            CrudError::OverlappingField { .. } => Self::OverlappingField,
            CrudError::DuplicateColumn(_) => Self::DuplicateColumn,
            CrudError::DuplicateAction(_) => Self::DuplicateAction,
            CrudError::MissingOptions { .. } => Self::MissingOptions,
            CrudError::InvalidGridSpan { .. } => Self::InvalidSpan,
            CrudError::InvalidFieldPath(_) => Self::InvalidPath,
            CrudError::InvalidRule { .. } => Self::InvalidRule,
            _ => Self::InvalidDescriptor,
        }
    }
}

/// A contract violation found in a descriptor list
#[derive(Debug)]
pub struct ValidationError {
    pub code: ValidationErrorCode,

    /// Location, e.g. `fields[2]`
    pub path: String,

    pub error: CrudError,
}

impl ValidationError {
    /// Wrap a contract violation found at `path`
    pub fn new(path: impl Into<String>, error: CrudError) -> Self {
        Self {
            code: ValidationErrorCode::for_error(&error),
            path: path.into(),
            error,
        }
    }

    /// Override the derived code
    pub fn with_code(mut self, code: ValidationErrorCode) -> Self {
        self.code = code;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.error)
    }
}

// ============================================================================
// ValidationWarning
// ============================================================================

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    /// `depends_on` names a field that is not declared
    UnknownDependency,
    /// A field depends on itself
    SelfDependency,
    /// `MatchesField` names a field that is not declared
    UnknownMatchField,
    /// A hidden field can never fail its required rule
    HiddenRequired,
}

/// A non-fatal issue
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub code: ValidationWarningCode,
    pub message: String,
    pub path: String,
}

impl ValidationWarning {
    /// Create a new warning
    pub fn new(
        code: ValidationWarningCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.message)
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Validate each item, then report keys that occur more than once
fn check_keyed<T, F>(items: &[T], list: &str, duplicate: F) -> ValidationResult
where
    T: Validatable + Keyed,
    F: Fn(String) -> CrudError,
{
    let mut result = ValidationResult::ok();
    let mut seen = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        let path = format!("{}[{}]", list, index);
        if let Err(e) = item.validate() {
            result.add_error(ValidationError::new(path.clone(), e));
        }
        if let Some(key) = item.unique_key()
            && !seen.insert(key.clone())
        {
            result.add_error(ValidationError::new(path, duplicate(key)));
        }
    }

    result
}

/// Whether `parent`'s segments start `child`'s and `child` is longer
fn is_strict_prefix(parent: &FieldPath, child: &FieldPath) -> bool {
    let (parent, child) = (parent.segments(), child.segments());
    parent.len() < child.len() && child.starts_with(parent)
}

/// Check a form's field list
pub fn check_fields(fields: &[FieldDescriptor]) -> ValidationResult {
    let mut result = check_keyed(fields, "fields", CrudError::DuplicateField);

    let declared: HashSet<&FieldPath> = fields
        .iter()
        .filter(|f| f.carries_data())
        .map(|f| &f.name)
        .collect();

    for (index, field) in fields.iter().enumerate() {
        if !field.carries_data() {
            continue;
        }
        let overlapping = fields[..index].iter().filter(|f| f.carries_data()).find(|f| {
            is_strict_prefix(&f.name, &field.name) || is_strict_prefix(&field.name, &f.name)
        });
        if let Some(other) = overlapping {
            let (parent, child) = if is_strict_prefix(&other.name, &field.name) {
                (other.name.dotted(), field.name.dotted())
            } else {
                (field.name.dotted(), other.name.dotted())
            };
            result.add_error(ValidationError::new(
                format!("fields[{}]", index),
                CrudError::OverlappingField { parent, child },
            ));
        }
    }

    for (index, field) in fields.iter().enumerate() {
        if !field.carries_data() {
            continue;
        }
        let path = format!("fields[{}]", index);

        for dep in &field.depends_on {
            if dep == &field.name {
                result.add_warning(ValidationWarning::new(
                    ValidationWarningCode::SelfDependency,
                    &path,
                    format!("'{}' depends on itself", field.name),
                ));
            } else if !declared.contains(dep) {
                result.add_warning(ValidationWarning::new(
                    ValidationWarningCode::UnknownDependency,
                    &path,
                    format!("'{}' depends on undeclared field '{}'", field.name, dep),
                ));
            }
        }

        for target in field.rules.iter().filter_map(|r| r.referenced_field()) {
            if !declared.contains(target) {
                result.add_warning(ValidationWarning::new(
                    ValidationWarningCode::UnknownMatchField,
                    &path,
                    format!("'{}' must match undeclared field '{}'", field.name, target),
                ));
            }
        }

        if field.hidden && field.effective_rules().iter().any(|r| r.is_required()) {
            result.add_warning(ValidationWarning::new(
                ValidationWarningCode::HiddenRequired,
                &path,
                format!("'{}' is hidden, so its required rule is never checked", field.name),
            ));
        }
    }

    result
}

/// Check a table's column list
pub fn check_columns(columns: &[ColumnDescriptor]) -> ValidationResult {
    check_keyed(columns, "columns", CrudError::DuplicateColumn)
}

/// Check a table's row actions
pub fn check_row_actions(actions: &[RowActionDescriptor]) -> ValidationResult {
    check_keyed(actions, "row_actions", CrudError::DuplicateAction)
}

/// Check a table's batch actions
pub fn check_batch_actions(actions: &[BatchActionDescriptor]) -> ValidationResult {
    check_keyed(actions, "batch_actions", CrudError::DuplicateAction)
}

/// Check a search panel's filters
pub fn check_search_fields(fields: &[SearchFieldDescriptor]) -> ValidationResult {
    let mut result = check_keyed(fields, "search_fields", CrudError::DuplicateField);
    for error in &mut result.errors {
        if error.code == ValidationErrorCode::DuplicateField {
            error.code = ValidationErrorCode::DuplicateSearchField;
        }
    }
    result
}

// ============================================================================
// Fail-fast helpers
// ============================================================================

/// First contract violation of a field list
pub fn validate_fields(fields: &[FieldDescriptor]) -> CrudResult<()> {
    check_fields(fields).into_result()
}

/// First contract violation of a table definition
pub fn validate_table(
    columns: &[ColumnDescriptor],
    row_actions: &[RowActionDescriptor],
    batch_actions: &[BatchActionDescriptor],
) -> CrudResult<()> {
    let mut result = check_columns(columns);
    result.merge(check_row_actions(row_actions));
    result.merge(check_batch_actions(batch_actions));
    result.into_result()
}

/// First contract violation of a filter list
pub fn validate_search_fields(fields: &[SearchFieldDescriptor]) -> CrudResult<()> {
    check_search_fields(fields).into_result()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FieldOption};
    use crate::rules::ValidationRule;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_fields_pass() {
        let fields = vec![
            FieldDescriptor::text("username", "Username").required(),
            FieldDescriptor::section_break("Settings"),
            FieldDescriptor::toggle("settings.email", "Email"),
            FieldDescriptor::section_break("Settings"),
        ];
        let result = check_fields(&fields);
        assert!(result.is_valid());
        assert!(!result.has_warnings());
        assert!(validate_fields(&fields).is_ok());
    }

    #[test]
    fn test_nested_field_inside_data_field_is_rejected() {
        let fields = vec![
            FieldDescriptor::text("settings", "Settings"),
            FieldDescriptor::text("email", "Email"),
            FieldDescriptor::toggle("settings.email", "Email"),
        ];
        let result = check_fields(&fields);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ValidationErrorCode::OverlappingField);
        assert_eq!(result.errors[0].path, "fields[2]");
        assert!(matches!(
            validate_fields(&fields),
            Err(CrudError::OverlappingField { ref parent, ref child })
                if parent == "settings" && child == "settings.email"
        ));

        // Order does not matter
        let reversed = vec![
            FieldDescriptor::toggle("settings.email", "Email"),
            FieldDescriptor::text("settings", "Settings"),
        ];
        assert!(validate_fields(&reversed).is_err());

        // Siblings sharing a parent, or a shared name prefix, are fine
        let siblings = vec![
            FieldDescriptor::toggle("settings.email", "Email"),
            FieldDescriptor::toggle("settings.sms", "SMS"),
            FieldDescriptor::text("settingsNote", "Note"),
        ];
        assert!(validate_fields(&siblings).is_ok());
    }

    #[test]
    fn test_duplicate_field_fails_fast() {
        let fields = vec![
            FieldDescriptor::text("email", "Email"),
            FieldDescriptor::text("email", "Email 2"),
        ];
        let result = check_fields(&fields);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ValidationErrorCode::DuplicateField);
        assert_eq!(result.errors[0].path, "fields[1]");

        let err = validate_fields(&fields).unwrap_err();
        assert!(matches!(err, CrudError::DuplicateField(name) if name == "email"));
    }

    #[test]
    fn test_all_errors_are_reported() {
        let fields = vec![
            FieldDescriptor::new("role", "Role", FieldKind::RadioGroup),
            FieldDescriptor::text("code", "Code").with_rule(ValidationRule::pattern("[")),
            FieldDescriptor::text("wide", "Wide").with_span(25),
        ];
        let codes: Vec<_> = check_fields(&fields).errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ValidationErrorCode::MissingOptions,
                ValidationErrorCode::InvalidRule,
                ValidationErrorCode::InvalidSpan,
            ]
        );
    }

    #[test]
    fn test_dependency_warnings() {
        let fields = vec![
            FieldDescriptor::secret("password", "Password"),
            FieldDescriptor::secret("confirm", "Confirm")
                .with_rule(ValidationRule::matches_field("passwd"))
                .depends_on("password")
                .depends_on("missing")
                .depends_on("confirm"),
            FieldDescriptor::text("token", "Token").required().hidden(),
        ];
        let result = check_fields(&fields);
        assert!(result.is_valid());
        let codes: Vec<_> = result.warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            vec![
                ValidationWarningCode::UnknownDependency,
                ValidationWarningCode::SelfDependency,
                ValidationWarningCode::UnknownMatchField,
                ValidationWarningCode::HiddenRequired,
            ]
        );
    }

    #[test]
    fn test_duplicate_column_and_action_keys() {
        let columns = vec![
            ColumnDescriptor::new("Name", "name"),
            ColumnDescriptor::new("Name again", "name"),
        ];
        assert!(matches!(
            validate_table(&columns, &[], &[]),
            Err(CrudError::DuplicateColumn(_))
        ));

        let actions = vec![
            RowActionDescriptor::new("edit", "Edit", |_| Ok(())),
            RowActionDescriptor::new("edit", "Edit", |_| Ok(())),
        ];
        assert!(matches!(
            validate_table(&[], &actions, &[]),
            Err(CrudError::DuplicateAction(key)) if key == "edit"
        ));
    }

    #[test]
    fn test_search_field_checks() {
        let fields = vec![
            SearchFieldDescriptor::text("keyword", "Keyword"),
            SearchFieldDescriptor::text("keyword", "Again"),
            SearchFieldDescriptor::select("status", "Status", [FieldOption::new("On", 1)]),
        ];
        let result = check_search_fields(&fields);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].code,
            ValidationErrorCode::DuplicateSearchField
        );
        assert_eq!(
            result.errors[0].to_string(),
            "[search_fields[1]] Duplicate field name: 'keyword' already exists"
        );
    }
}
