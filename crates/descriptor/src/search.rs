//! Search filter descriptors

use crate::field::{FieldDescriptor, FieldKind, FieldOption};
use crudkit_core::{CrudError, CrudResult, GridSpan, Keyed, Validatable};
use serde::{Deserialize, Serialize};

/// The four filter kinds a search panel supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFieldKind {
    Text,
    Select,
    Date,
    DateRange,
}

impl SearchFieldKind {
    /// The form field kind that renders this filter
    pub fn field_kind(&self) -> FieldKind {
        match self {
            SearchFieldKind::Text => FieldKind::Text,
            SearchFieldKind::Select => FieldKind::SingleSelect,
            SearchFieldKind::Date => FieldKind::Date,
            SearchFieldKind::DateRange => FieldKind::DateRange,
        }
    }
}

fn default_search_span() -> GridSpan {
    GridSpan::raw(8)
}

fn default_true() -> bool {
    true
}

/// Describes one filter of a search panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: SearchFieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default = "default_search_span")]
    pub span: GridSpan,
    #[serde(default = "default_true")]
    pub allow_clear: bool,
}

impl SearchFieldDescriptor {
    /// Create a filter of the given kind
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: SearchFieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            placeholder: None,
            options: Vec::new(),
            span: default_search_span(),
            allow_clear: true,
        }
    }

    /// Free-text filter
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, SearchFieldKind::Text)
    }

    /// Drop-down filter
    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = FieldOption>,
    ) -> Self {
        let mut field = Self::new(name, label, SearchFieldKind::Select);
        field.options = options.into_iter().collect();
        field
    }

    /// Date-range filter
    pub fn date_range(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, SearchFieldKind::DateRange)
    }

    /// Set the placeholder
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Set the grid span
    pub fn with_span(mut self, span: u8) -> Self {
        self.span = GridSpan::raw(span);
        self
    }

    /// Hide the clear affordance
    pub fn no_clear(mut self) -> Self {
        self.allow_clear = false;
        self
    }

    /// Placeholder with the kind's default
    pub fn display_placeholder(&self) -> String {
        match (&self.placeholder, self.kind) {
            (Some(text), _) => text.clone(),
            (None, SearchFieldKind::Text) => format!("Please enter {}", self.label),
            (None, _) => format!("Please select {}", self.label),
        }
    }

    /// The equivalent form field, so filters render through the same widgets
    pub fn to_field_descriptor(&self) -> FieldDescriptor {
        let mut field = FieldDescriptor::new(
            self.name.as_str(),
            self.label.clone(),
            self.kind.field_kind(),
        )
        .with_options(self.options.clone())
        .with_placeholder(self.display_placeholder());
        field.span = self.span;
        field
    }
}

impl Validatable for SearchFieldDescriptor {
    fn validate(&self) -> CrudResult<()> {
        if self.name.trim().is_empty() {
            return Err(CrudError::InvalidFieldPath(self.name.clone()));
        }
        self.span.validate()?;
        if self.kind == SearchFieldKind::Select && self.options.is_empty() {
            return Err(CrudError::MissingOptions {
                field: self.name.clone(),
                kind: "select".to_string(),
            });
        }
        Ok(())
    }
}

impl Keyed for SearchFieldDescriptor {
    fn unique_key(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let field = SearchFieldDescriptor::text("keyword", "Keyword");
        assert_eq!(field.span.get(), 8);
        assert!(field.allow_clear);
        assert_eq!(field.display_placeholder(), "Please enter Keyword");

        let range = SearchFieldDescriptor::date_range("created", "Created");
        assert_eq!(range.display_placeholder(), "Please select Created");
    }

    #[test]
    fn test_to_field_descriptor() {
        let field = SearchFieldDescriptor::select(
            "status",
            "Status",
            [FieldOption::new("Active", 1), FieldOption::new("Disabled", 0)],
        )
        .with_span(6)
        .to_field_descriptor();
        assert_eq!(field.kind, FieldKind::SingleSelect);
        assert_eq!(field.span.get(), 6);
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.placeholder.as_deref(), Some("Please select Status"));
    }

    #[test]
    fn test_select_requires_options() {
        let field = SearchFieldDescriptor::new("status", "Status", SearchFieldKind::Select);
        assert!(matches!(
            field.validate(),
            Err(CrudError::MissingOptions { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let bad = serde_json::from_value::<SearchFieldDescriptor>(json!({
            "name": "x", "label": "X", "kind": "toggle"
        }));
        assert!(bad.is_err());

        let ok: SearchFieldDescriptor = serde_json::from_value(json!({
            "name": "x", "label": "X", "kind": "date"
        }))
        .unwrap();
        assert_eq!(ok.span.get(), 8);
        assert!(ok.allow_clear);
    }
}
