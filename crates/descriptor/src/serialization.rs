//! Descriptor files
//!
//! A descriptor file is a JSON document holding the declarative part of one
//! admin screen: form fields, search filters, list columns and the view
//! options. Closures (formatters, custom rules, action handlers) are host
//! code and never serialized; the host attaches them after loading.

use crate::SCHEMA_VERSION;
use crate::column::ColumnDescriptor;
use crate::config::{FormConfig, SearchPanelConfig, TableConfig};
use crate::field::FieldDescriptor;
use crate::search::SearchFieldDescriptor;
use crate::validation::{ValidationResult, check_columns, check_fields, check_search_fields};
use crudkit_core::{CrudError, CrudResult, Persistable, Value};
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Constants
// ============================================================================

/// File extension of descriptor files
pub const DESCRIPTOR_EXTENSION: &str = "json";

// ============================================================================
// DescriptorFile
// ============================================================================

/// One screen's descriptors and options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorFile {
    /// Schema version for migration purposes
    pub schema_version: u32,

    pub title: String,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,

    #[serde(default)]
    pub search_fields: Vec<SearchFieldDescriptor>,

    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,

    #[serde(default)]
    pub form: FormConfig,

    #[serde(default)]
    pub search: SearchPanelConfig,

    #[serde(default)]
    pub table: TableConfig,
}

impl DescriptorFile {
    /// Create an empty descriptor file at the current schema version
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            title: title.into(),
            fields: Vec::new(),
            search_fields: Vec::new(),
            columns: Vec::new(),
            form: FormConfig::default(),
            search: SearchPanelConfig::default(),
            table: TableConfig::default(),
        }
    }

    /// Set the form fields
    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    /// Set the search filters
    pub fn with_search_fields(mut self, fields: Vec<SearchFieldDescriptor>) -> Self {
        self.search_fields = fields;
        self
    }

    /// Set the list columns
    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    /// Check every descriptor list
    pub fn check(&self) -> ValidationResult {
        let mut result = check_fields(&self.fields);
        result.merge(check_search_fields(&self.search_fields));
        result.merge(check_columns(&self.columns));
        result
    }

    /// Whether the file was written by an older schema
    pub fn needs_migration(&self) -> bool {
        self.schema_version < SCHEMA_VERSION
    }

    /// Bring the file to the current schema version
    pub fn migrate(&mut self) {
        // Version 1 is the only schema so far.
        self.schema_version = SCHEMA_VERSION;
    }
}

impl Persistable for DescriptorFile {
    fn file_extension() -> &'static str {
        DESCRIPTOR_EXTENSION
    }

    fn schema_version() -> u32 {
        SCHEMA_VERSION
    }
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a descriptor file, creating parent directories
pub fn save_descriptors(file: &DescriptorFile, path: impl AsRef<Path>) -> CrudResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| CrudError::FileWrite {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    file.save_to_file(path)
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load and version-check a descriptor file
pub fn load_descriptors(path: impl AsRef<Path>) -> CrudResult<DescriptorFile> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| CrudError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    load_descriptors_from_string(&json)
}

/// Parse and version-check a descriptor document
pub fn load_descriptors_from_string(json: &str) -> CrudResult<DescriptorFile> {
    let raw: Value = serde_json::from_str(json)?;

    let found = raw
        .get("schema_version")
        .and_then(Value::as_u64)
        .ok_or_else(|| CrudError::InvalidDescriptorFormat("missing schema_version".to_string()))?;

    if found > u64::from(SCHEMA_VERSION) {
        return Err(CrudError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION,
            found: u32::try_from(found).unwrap_or(u32::MAX),
        });
    }

    let mut file: DescriptorFile = serde_json::from_value(raw)
        .map_err(|e| CrudError::InvalidDescriptorFormat(e.to_string()))?;
    if file.needs_migration() {
        file.migrate();
    }
    Ok(file)
}

// ============================================================================
// Helpers
// ============================================================================

/// Whether a path looks like a descriptor file
pub fn is_descriptor_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
}

/// Default file name for a screen title, e.g. `user_management.json`
pub fn default_file_name(title: &str) -> String {
    let stem = title.to_snake_case();
    let stem = if stem.is_empty() { "screen".to_string() } else { stem };
    format!("{}.{}", stem, DESCRIPTOR_EXTENSION)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{CommonFields, CommonSearchFields};
    use crate::rules::ValidationRule;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> DescriptorFile {
        DescriptorFile::new("User Management")
            .with_fields(vec![CommonFields::name(), CommonFields::status()])
            .with_search_fields(vec![CommonSearchFields::keyword()])
            .with_columns(vec![ColumnDescriptor::new("Name", "name").sortable()])
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("screens").join("users.json");

        save_descriptors(&sample(), &path).unwrap();
        let loaded = load_descriptors(&path).unwrap();

        assert_eq!(loaded.title, "User Management");
        assert_eq!(loaded.fields, sample().fields);
        assert_eq!(loaded.search_fields, sample().search_fields);
        assert_eq!(loaded.columns.len(), 1);
        assert!(loaded.columns[0].sortable);
        assert!(loaded.check().is_valid());
    }

    #[test]
    fn test_custom_rules_are_left_out_of_saved_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let file = DescriptorFile::new("Users").with_fields(vec![
            FieldDescriptor::text("name", "Name")
                .with_rule(ValidationRule::custom("no_admin", |v, _| v != "admin"))
                .with_rule(ValidationRule::max_length(20)),
            FieldDescriptor::text("nickname", "Nickname")
                .with_rule(ValidationRule::custom("no_spaces", |v, _| v != " ")),
        ]);

        save_descriptors(&file, &path).unwrap();
        let loaded = load_descriptors(&path).unwrap();

        assert_eq!(loaded.fields.len(), 2);
        assert_eq!(loaded.fields[0].rules.len(), 1);
        assert!(!loaded.fields[0].rules[0].is_custom());
        assert!(loaded.fields[1].rules.is_empty());
        assert!(loaded.check().is_valid());
    }

    #[test]
    fn test_minimal_document_uses_defaults() {
        let file = load_descriptors_from_string(r#"{"schema_version": 1, "title": "Empty"}"#)
            .unwrap();
        assert!(file.fields.is_empty());
        assert_eq!(file.search.max_visible, 3);
        assert_eq!(file.table.row_key, "id");
    }

    #[test]
    fn test_future_schema_is_rejected() {
        let err = load_descriptors_from_string(r#"{"schema_version": 99, "title": "x"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            CrudError::SchemaVersionMismatch { expected: 1, found: 99 }
        ));
    }

    #[test]
    fn test_missing_schema_version() {
        let err = load_descriptors_from_string(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, CrudError::InvalidDescriptorFormat(_)));
    }

    #[test]
    fn test_old_schema_is_migrated() {
        let file = load_descriptors_from_string(r#"{"schema_version": 0, "title": "x"}"#).unwrap();
        assert_eq!(file.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_invalid_field_reported_by_check() {
        let json = json!({
            "schema_version": 1,
            "title": "Bad",
            "fields": [
                {"name": "role", "label": "Role", "kind": "single_select"},
                {"name": "role", "label": "Role", "kind": "text"}
            ]
        });
        let file = load_descriptors_from_string(&json.to_string()).unwrap();
        assert_eq!(file.check().errors.len(), 2);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = load_descriptors("/definitely/not/here.json").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_file_name_helpers() {
        assert_eq!(default_file_name("User Management"), "user_management.json");
        assert_eq!(default_file_name(""), "screen.json");
        assert!(is_descriptor_file("a/b/users.JSON"));
        assert!(!is_descriptor_file("users.toml"));
    }
}
