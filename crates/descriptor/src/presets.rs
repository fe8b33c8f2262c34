//! Ready-made field and filter descriptors for common admin screens

use crate::field::{FieldDescriptor, FieldKind, FieldOption};
use crate::rules::ValidationRule;
use crate::search::SearchFieldDescriptor;

/// The usual active / disabled status choices
pub fn status_options() -> Vec<FieldOption> {
    vec![
        FieldOption::new("Active", 1),
        FieldOption::new("Disabled", 0),
    ]
}

// ============================================================================
// Form fields
// ============================================================================

/// Preset form fields
pub struct CommonFields;

impl CommonFields {
    /// Required name, 2 to 50 characters
    pub fn name() -> FieldDescriptor {
        FieldDescriptor::text("name", "Name")
            .required()
            .with_rule(ValidationRule::required().with_message("Please enter Name"))
            .with_rule(ValidationRule::length(Some(2), Some(50)))
            .with_span(12)
    }

    /// Free-form description, at most 500 characters
    pub fn description() -> FieldDescriptor {
        FieldDescriptor::multiline("description", "Description")
            .with_rows(4)
            .with_bounds(None, Some(500.0))
            .with_rule(ValidationRule::max_length(500))
    }

    /// Active / disabled radio group
    pub fn status() -> FieldDescriptor {
        FieldDescriptor::radio("status", "Status", status_options())
            .required()
            .with_span(12)
    }

    /// Read-only creation time
    pub fn created_at() -> FieldDescriptor {
        FieldDescriptor::date("created_at", "Created At")
            .with_time()
            .disabled()
            .with_span(12)
    }

    /// Avatar image upload
    pub fn avatar() -> FieldDescriptor {
        FieldDescriptor::new("avatar", "Avatar", FieldKind::FileUpload)
            .with_help("PNG or JPEG, at most 2 MB")
    }

    /// Labelled divider
    pub fn divider(label: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::section_break(label)
    }
}

// ============================================================================
// Search fields
// ============================================================================

/// Preset search filters
pub struct CommonSearchFields;

impl CommonSearchFields {
    /// Free-text keyword filter
    pub fn keyword() -> SearchFieldDescriptor {
        SearchFieldDescriptor::text("keyword", "Keyword")
            .with_placeholder("Search by name or description")
    }

    /// Status filter
    pub fn status() -> SearchFieldDescriptor {
        SearchFieldDescriptor::select("status", "Status", status_options())
    }

    /// Creation date range filter
    pub fn date_range() -> SearchFieldDescriptor {
        SearchFieldDescriptor::date_range("dateRange", "Created")
    }

    /// Category filter over host-supplied choices
    pub fn category(options: impl IntoIterator<Item = FieldOption>) -> SearchFieldDescriptor {
        SearchFieldDescriptor::select("category", "Category", options)
    }

    /// Owner filter over host-supplied choices
    pub fn user(options: impl IntoIterator<Item = FieldOption>) -> SearchFieldDescriptor {
        SearchFieldDescriptor::select("userId", "User", options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{check_fields, check_search_fields};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_preset_fields_are_valid() {
        let fields = vec![
            CommonFields::name(),
            CommonFields::divider("More"),
            CommonFields::description(),
            CommonFields::status(),
            CommonFields::created_at(),
            CommonFields::avatar(),
        ];
        let result = check_fields(&fields);
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn test_preset_name_rules() {
        let name = CommonFields::name();
        let rules = name.effective_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[1].check(Some(&json!("A")), &json!({})),
            Err("Length must be between 2 and 50 characters".to_string())
        );
    }

    #[test]
    fn test_preset_search_fields_are_valid() {
        let fields = vec![
            CommonSearchFields::keyword(),
            CommonSearchFields::status(),
            CommonSearchFields::date_range(),
            CommonSearchFields::category([FieldOption::new("Books", "books")]),
            CommonSearchFields::user([FieldOption::new("Al", 1)]),
        ];
        assert!(check_search_fields(&fields).is_valid());
    }
}
