//! Form field descriptors
//!
//! A `FieldDescriptor` describes one input of a generated form: its path in
//! the value object, its kind (which selects the widget), options for the
//! choice kinds, validation rules and grid placement.

use crate::rules::ValidationRule;
use crudkit_core::{
    CrudError, CrudResult, FieldPath, GridSpan, Keyed, Validatable, Value,
};
use heck::ToTitleCase;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// FieldKind
// ============================================================================

/// Closed set of field kinds; each maps to exactly one widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    MultilineText,
    SecretText,
    Number,
    SingleSelect,
    MultiSelect,
    RadioGroup,
    CheckboxGroup,
    Toggle,
    Date,
    DateRange,
    Time,
    FileUpload,
    SectionBreak,
}

impl FieldKind {
    /// Every kind, in declaration order
    pub const ALL: [FieldKind; 14] = [
        FieldKind::Text,
        FieldKind::MultilineText,
        FieldKind::SecretText,
        FieldKind::Number,
        FieldKind::SingleSelect,
        FieldKind::MultiSelect,
        FieldKind::RadioGroup,
        FieldKind::CheckboxGroup,
        FieldKind::Toggle,
        FieldKind::Date,
        FieldKind::DateRange,
        FieldKind::Time,
        FieldKind::FileUpload,
        FieldKind::SectionBreak,
    ];

    /// Kinds that must carry at least one option
    pub fn requires_options(&self) -> bool {
        matches!(
            self,
            FieldKind::SingleSelect
                | FieldKind::MultiSelect
                | FieldKind::RadioGroup
                | FieldKind::CheckboxGroup
        )
    }

    /// Whether the kind holds a value (everything but section breaks)
    pub fn carries_data(&self) -> bool {
        !matches!(self, FieldKind::SectionBreak)
    }

    /// Whether the synthesized required message says "select" rather than "enter"
    pub fn is_picker(&self) -> bool {
        self.requires_options()
            || matches!(
                self,
                FieldKind::Date | FieldKind::DateRange | FieldKind::Time | FieldKind::FileUpload
            )
    }

    /// Snake-case identifier, as used in descriptor files
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::MultilineText => "multiline_text",
            FieldKind::SecretText => "secret_text",
            FieldKind::Number => "number",
            FieldKind::SingleSelect => "single_select",
            FieldKind::MultiSelect => "multi_select",
            FieldKind::RadioGroup => "radio_group",
            FieldKind::CheckboxGroup => "checkbox_group",
            FieldKind::Toggle => "toggle",
            FieldKind::Date => "date",
            FieldKind::DateRange => "date_range",
            FieldKind::Time => "time",
            FieldKind::FileUpload => "file_upload",
            FieldKind::SectionBreak => "section_break",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::MultilineText => "Multiline Text",
            FieldKind::SecretText => "Password",
            FieldKind::Number => "Number",
            FieldKind::SingleSelect => "Select",
            FieldKind::MultiSelect => "Multi Select",
            FieldKind::RadioGroup => "Radio Group",
            FieldKind::CheckboxGroup => "Checkbox Group",
            FieldKind::Toggle => "Switch",
            FieldKind::Date => "Date",
            FieldKind::DateRange => "Date Range",
            FieldKind::Time => "Time",
            FieldKind::FileUpload => "Upload",
            FieldKind::SectionBreak => "Divider",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// FieldOption
// ============================================================================

/// One choice of an option-bearing field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl FieldOption {
    /// Create an enabled option
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            disabled: false,
        }
    }

    /// Mark the option as not selectable
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

// ============================================================================
// FieldDescriptor
// ============================================================================

fn default_rows() -> u16 {
    4
}

/// Describes one input of a generated form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Path of the value inside the form's value object
    pub name: FieldPath,

    /// Label shown next to the input
    #[serde(default)]
    pub label: String,

    /// Selects the widget
    pub kind: FieldKind,

    /// Synthesizes a `Required` rule when no explicit rules are given
    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub disabled: bool,

    /// Suppresses rendering and validation; the value is kept
    #[serde(default)]
    pub hidden: bool,

    /// Choices for option-bearing kinds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,

    /// Ordered validation rules
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "crate::rules::serialize_rules"
    )]
    pub rules: Vec<ValidationRule>,

    /// Width on the 24-unit grid
    #[serde(default)]
    pub span: GridSpan,

    /// Fields whose changes re-validate this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<FieldPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Lower bound for numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound for numbers, max length for multiline text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Visible rows of a multiline input
    #[serde(default = "default_rows")]
    pub rows: u16,

    /// Display format of date and time pickers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Whether a date picker also picks a time
    #[serde(default)]
    pub show_time: bool,
}

impl FieldDescriptor {
    /// Create a field of the given kind
    pub fn new(name: impl Into<FieldPath>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            disabled: false,
            hidden: false,
            options: Vec::new(),
            rules: Vec::new(),
            span: GridSpan::FULL,
            depends_on: Vec::new(),
            help_text: None,
            tooltip: None,
            placeholder: None,
            min: None,
            max: None,
            rows: default_rows(),
            format: None,
            show_time: false,
        }
    }

    /// Single-line text input
    pub fn text(name: impl Into<FieldPath>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    /// Multi-line text input
    pub fn multiline(name: impl Into<FieldPath>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::MultilineText)
    }

    /// Masked text input
    pub fn secret(name: impl Into<FieldPath>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::SecretText)
    }

    /// Numeric input
    pub fn number(name: impl Into<FieldPath>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    /// Drop-down with one selection
    pub fn select(
        name: impl Into<FieldPath>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = FieldOption>,
    ) -> Self {
        Self::new(name, label, FieldKind::SingleSelect).with_options(options)
    }

    /// Radio buttons
    pub fn radio(
        name: impl Into<FieldPath>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = FieldOption>,
    ) -> Self {
        Self::new(name, label, FieldKind::RadioGroup).with_options(options)
    }

    /// On/off switch
    pub fn toggle(name: impl Into<FieldPath>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Toggle)
    }

    /// Date picker
    pub fn date(name: impl Into<FieldPath>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    /// A labelled divider; carries no data and gets a generated unique name
    pub fn section_break(label: impl Into<String>) -> Self {
        let name = format!("section_{}", Uuid::new_v4().simple());
        Self::new(FieldPath::new(name), label, FieldKind::SectionBreak)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Mark the field as hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Add a validation rule
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replace the options
    pub fn with_options(mut self, options: impl IntoIterator<Item = FieldOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    /// Set the grid span; checked when the descriptor list is validated
    pub fn with_span(mut self, span: u8) -> Self {
        self.span = GridSpan::raw(span);
        self
    }

    /// Re-validate this field whenever `other` changes
    pub fn depends_on(mut self, other: impl Into<FieldPath>) -> Self {
        self.depends_on.push(other.into());
        self
    }

    /// Set the help text
    pub fn with_help(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Set the tooltip
    pub fn with_tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = Some(text.into());
        self
    }

    /// Set the placeholder
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Set numeric bounds
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the visible rows of a multiline input
    pub fn with_rows(mut self, rows: u16) -> Self {
        self.rows = rows;
        self
    }

    /// Set the date or time display format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Let a date picker pick a time as well
    pub fn with_time(mut self) -> Self {
        self.show_time = true;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether the field holds a value
    pub fn carries_data(&self) -> bool {
        self.kind.carries_data()
    }

    /// The label, or a title-cased leaf segment when no label was given
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            self.name.leaf().to_title_case()
        } else {
            self.label.clone()
        }
    }

    /// Placeholder text, falling back to the kind's prompt
    pub fn display_placeholder(&self) -> String {
        match &self.placeholder {
            Some(text) => text.clone(),
            None => self.prompt(),
        }
    }

    fn prompt(&self) -> String {
        let verb = if self.kind.is_picker() { "select" } else { "enter" };
        format!("Please {} {}", verb, self.display_label())
    }

    /// Explicit rules, or a synthesized `Required` rule when none are given
    /// and the field is required
    pub fn effective_rules(&self) -> Vec<ValidationRule> {
        if self.rules.is_empty() && self.required {
            vec![ValidationRule::required().with_message(self.prompt())]
        } else {
            self.rules.clone()
        }
    }

    /// Date or time display format with the kind's default
    pub fn display_format(&self) -> &str {
        match (&self.format, self.kind) {
            (Some(format), _) => format,
            (None, FieldKind::Time) => "%H:%M:%S",
            (None, _) if self.show_time => "%Y-%m-%d %H:%M:%S",
            (None, _) => "%Y-%m-%d",
        }
    }

    /// Label of the option whose value equals `value`
    pub fn option_label(&self, value: &Value) -> Option<&str> {
        self.options
            .iter()
            .find(|o| &o.value == value)
            .map(|o| o.label.as_str())
    }
}

impl Validatable for FieldDescriptor {
    fn validate(&self) -> CrudResult<()> {
        self.name.validate()?;
        self.span.validate()?;

        if !self.carries_data() {
            return Ok(());
        }

        if self.kind.requires_options() && self.options.is_empty() {
            return Err(CrudError::MissingOptions {
                field: self.name.dotted(),
                kind: self.kind.to_string(),
            });
        }

        for rule in &self.rules {
            rule.validate_definition()
                .map_err(|msg| CrudError::invalid_rule(self.name.dotted(), msg))?;
        }

        for dep in &self.depends_on {
            dep.validate()?;
        }

        Ok(())
    }
}

impl Keyed for FieldDescriptor {
    fn unique_key(&self) -> Option<String> {
        self.carries_data().then(|| self.name.dotted())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crudkit_core::first_duplicate_key;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn role_options() -> Vec<FieldOption> {
        vec![
            FieldOption::new("Admin", "admin"),
            FieldOption::new("User", "user"),
        ]
    }

    #[test]
    fn test_builder_defaults() {
        let field = FieldDescriptor::text("username", "Username").required();
        assert_eq!(field.kind, FieldKind::Text);
        assert!(field.required);
        assert_eq!(field.span, GridSpan::FULL);
        assert_eq!(field.rows, 4);
        assert!(field.validate().is_ok());
    }

    #[test]
    fn test_synthesized_required_rule() {
        let field = FieldDescriptor::text("username", "Username").required();
        let rules = field.effective_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].error_message(), "Please enter Username");

        let role = FieldDescriptor::select("role", "Role", role_options()).required();
        assert_eq!(
            role.effective_rules()[0].error_message(),
            "Please select Role"
        );
    }

    #[test]
    fn test_explicit_rules_win_over_required_flag() {
        let field = FieldDescriptor::text("email", "Email")
            .required()
            .with_rule(ValidationRule::email());
        assert_eq!(field.effective_rules(), vec![ValidationRule::email()]);
    }

    #[test]
    fn test_select_without_options_is_rejected() {
        let field = FieldDescriptor::new("role", "Role", FieldKind::SingleSelect);
        let err = field.validate().unwrap_err();
        assert!(matches!(err, CrudError::MissingOptions { .. }));
    }

    #[test]
    fn test_bad_span_and_regex_are_rejected() {
        assert!(FieldDescriptor::text("a", "A").with_span(0).validate().is_err());
        let err = FieldDescriptor::text("a", "A")
            .with_rule(ValidationRule::pattern("("))
            .validate()
            .unwrap_err();
        assert!(matches!(err, CrudError::InvalidRule { .. }));
    }

    #[test]
    fn test_section_breaks_are_unique_and_unkeyed() {
        let a = FieldDescriptor::section_break("Basics");
        let b = FieldDescriptor::section_break("Basics");
        assert_ne!(a.name, b.name);
        assert!(a.name.leaf().starts_with("section_"));
        assert_eq!(a.unique_key(), None);
        assert_eq!(first_duplicate_key(&[a, b]), None);
    }

    #[test]
    fn test_duplicate_names_detected() {
        let fields = [
            FieldDescriptor::text("email", "Email"),
            FieldDescriptor::text("email", "Email again"),
        ];
        assert_eq!(first_duplicate_key(&fields), Some("email".to_string()));
    }

    #[test]
    fn test_display_label_falls_back_to_leaf() {
        let field = FieldDescriptor::new("settings.email_notification", "", FieldKind::Toggle);
        assert_eq!(field.display_label(), "Email Notification");
        assert_eq!(field.display_placeholder(), "Please enter Email Notification");
    }

    #[test]
    fn test_display_format_defaults() {
        assert_eq!(FieldDescriptor::date("d", "D").display_format(), "%Y-%m-%d");
        assert_eq!(
            FieldDescriptor::date("d", "D").with_time().display_format(),
            "%Y-%m-%d %H:%M:%S"
        );
        assert_eq!(
            FieldDescriptor::new("t", "T", FieldKind::Time).display_format(),
            "%H:%M:%S"
        );
    }

    #[test]
    fn test_option_label() {
        let field = FieldDescriptor::radio("role", "Role", role_options());
        assert_eq!(field.option_label(&json!("user")), Some("User"));
        assert_eq!(field.option_label(&json!("guest")), None);
    }

    #[test]
    fn test_serde_minimal_document() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "name": ["settings", "sms"],
            "label": "SMS",
            "kind": "toggle",
            "span": 12
        }))
        .unwrap();
        assert_eq!(field.name, FieldPath::new("settings.sms"));
        assert_eq!(field.span.get(), 12);
        assert_eq!(field.rows, 4);

        let bad = serde_json::from_value::<FieldDescriptor>(json!({
            "name": "x", "kind": "text", "span": 40
        }));
        assert!(bad.is_err());
    }
}
