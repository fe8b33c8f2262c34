//! Validation rules attached to field descriptors
//!
//! Rules are evaluated in order against a field's current value; the first
//! failing rule supplies the field's error message. Every rule except
//! `Required` passes on a blank value, so optional fields are only checked
//! once something has been entered.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use crudkit_core::{FieldPath, Value, display_text, is_blank};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern is a valid regex")
});

// ============================================================================
// CustomRule
// ============================================================================

/// Host predicate: `(value, all_form_values) -> passes`
pub type CustomCheck = Rc<dyn Fn(&Value, &Value) -> bool>;

/// A host-supplied rule; not serializable
#[derive(Clone)]
pub struct CustomRule {
    /// Rule name, used in the default message
    pub name: String,
    /// The predicate
    pub check: CustomCheck,
    /// Message override
    pub message: Option<String>,
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.message == other.message
            && Rc::ptr_eq(&self.check, &other.check)
    }
}

// ============================================================================
// ValidationRule
// ============================================================================

/// One constraint on a field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Value must not be blank
    Required {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Character count (strings) or element count (lists)
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Numeric bounds
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Regex match
    Pattern {
        regex: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// E-mail address
    Email {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// http(s) URL
    Url {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Value must equal one of a fixed set
    OneOf {
        values: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Value must equal another field's current value
    MatchesField {
        field: FieldPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A `[start, end]` date range must be ordered
    DateOrder {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Host predicate
    #[serde(skip)]
    Custom(CustomRule),
}

/// Serialize a rule list, leaving out host predicates
pub(crate) fn serialize_rules<S>(rules: &[ValidationRule], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(rules.iter().filter(|rule| !rule.is_custom()))
}

impl ValidationRule {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Value must be present
    pub fn required() -> Self {
        Self::Required { message: None }
    }

    /// Minimum length
    pub fn min_length(min: usize) -> Self {
        Self::length(Some(min), None)
    }

    /// Maximum length
    pub fn max_length(max: usize) -> Self {
        Self::length(None, Some(max))
    }

    /// Length bounds
    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self::Length {
            min,
            max,
            message: None,
        }
    }

    /// Numeric bounds
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Range {
            min,
            max,
            message: None,
        }
    }

    /// Regex match
    pub fn pattern(regex: impl Into<String>) -> Self {
        Self::Pattern {
            regex: regex.into(),
            message: None,
        }
    }

    /// E-mail address
    pub fn email() -> Self {
        Self::Email { message: None }
    }

    /// http(s) URL
    pub fn url() -> Self {
        Self::Url { message: None }
    }

    /// One of a fixed set of values
    pub fn one_of(values: impl IntoIterator<Item = Value>) -> Self {
        Self::OneOf {
            values: values.into_iter().collect(),
            message: None,
        }
    }

    /// Equal to another field's value
    pub fn matches_field(field: impl Into<FieldPath>) -> Self {
        Self::MatchesField {
            field: field.into(),
            message: None,
        }
    }

    /// Ordered date range
    pub fn date_order() -> Self {
        Self::DateOrder { message: None }
    }

    /// Host predicate over `(value, all_form_values)`
    pub fn custom(name: impl Into<String>, check: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self::Custom(CustomRule {
            name: name.into(),
            check: Rc::new(check),
            message: None,
        })
    }

    /// Override the error message
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        let slot = match &mut self {
            Self::Required { message }
            | Self::Length { message, .. }
            | Self::Range { message, .. }
            | Self::Pattern { message, .. }
            | Self::Email { message }
            | Self::Url { message }
            | Self::OneOf { message, .. }
            | Self::MatchesField { message, .. }
            | Self::DateOrder { message } => message,
            Self::Custom(rule) => &mut rule.message,
        };
        *slot = Some(text.into());
        self
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Whether this is a host predicate; those are never serialized
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Whether this is the presence rule
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required { .. })
    }

    /// Fields this rule reads besides its own
    pub fn referenced_field(&self) -> Option<&FieldPath> {
        match self {
            Self::MatchesField { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Evaluate against a value; `all_values` is the whole form value object
    pub fn check(&self, value: Option<&Value>, all_values: &Value) -> Result<(), String> {
        if self.is_required() {
            return if is_blank(value) {
                Err(self.error_message())
            } else {
                Ok(())
            };
        }

        let value = match value {
            Some(v) if !is_blank(Some(v)) => v,
            _ => return Ok(()),
        };

        let passes = match self {
            Self::Required { .. } => true,
            Self::Length { min, max, .. } => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::Array(items) => items.len(),
                    other => display_text(Some(other)).chars().count(),
                };
                min.is_none_or(|m| len >= m) && max.is_none_or(|m| len <= m)
            }
            Self::Range { min, max, .. } => match as_number(value) {
                Some(n) => min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m),
                None => false,
            },
            Self::Pattern { regex, .. } => Regex::new(regex)
                .map(|re| re.is_match(&display_text(Some(value))))
                .unwrap_or(false),
            Self::Email { .. } => value.as_str().is_some_and(|s| EMAIL_RE.is_match(s)),
            Self::Url { .. } => value.as_str().is_some_and(|s| URL_RE.is_match(s)),
            Self::OneOf { values, .. } => values.contains(value),
            Self::MatchesField { field, .. } => field.lookup(all_values) == Some(value),
            Self::DateOrder { .. } => date_range_ordered(value),
            Self::Custom(rule) => (rule.check)(value, all_values),
        };

        if passes {
            Ok(())
        } else {
            Err(self.error_message())
        }
    }

    /// Check the rule definition itself (bad regex, inverted bounds)
    pub fn validate_definition(&self) -> Result<(), String> {
        match self {
            Self::Pattern { regex, .. } => Regex::new(regex)
                .map(|_| ())
                .map_err(|e| format!("invalid pattern '{}': {}", regex, e)),
            Self::Length {
                min: Some(min),
                max: Some(max),
                ..
            } if min > max => Err(format!("length bounds are inverted ({} > {})", min, max)),
            Self::Range {
                min: Some(min),
                max: Some(max),
                ..
            } if min > max => Err(format!("range bounds are inverted ({} > {})", min, max)),
            Self::MatchesField { field, .. } => field.validate().map_err(|e| e.to_string()),
            _ => Ok(()),
        }
    }

    /// Message reported when the rule fails
    pub fn error_message(&self) -> String {
        match self {
            Self::Required { message: Some(m) }
            | Self::Length { message: Some(m), .. }
            | Self::Range { message: Some(m), .. }
            | Self::Pattern { message: Some(m), .. }
            | Self::Email { message: Some(m) }
            | Self::Url { message: Some(m) }
            | Self::OneOf { message: Some(m), .. }
            | Self::MatchesField { message: Some(m), .. }
            | Self::DateOrder { message: Some(m) } => m.clone(),
            Self::Custom(CustomRule {
                message: Some(m), ..
            }) => m.clone(),

            Self::Required { .. } => "This field is required".to_string(),
            Self::Length { min, max, .. } => match (min, max) {
                (Some(min), Some(max)) => {
                    format!("Length must be between {} and {} characters", min, max)
                }
                (Some(min), None) => format!("Minimum length is {} characters", min),
                (None, Some(max)) => format!("Maximum length is {} characters", max),
                (None, None) => "Invalid length".to_string(),
            },
            Self::Range { min, max, .. } => match (min, max) {
                (Some(min), Some(max)) => format!("Value must be between {} and {}", min, max),
                (Some(min), None) => format!("Minimum value is {}", min),
                (None, Some(max)) => format!("Maximum value is {}", max),
                (None, None) => "Must be a number".to_string(),
            },
            Self::Pattern { .. } => "Does not match the required format".to_string(),
            Self::Email { .. } => "Must be a valid email address".to_string(),
            Self::Url { .. } => "Must be a valid URL".to_string(),
            Self::OneOf { values, .. } => format!(
                "Must be one of: {}",
                values
                    .iter()
                    .map(|v| display_text(Some(v)))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::MatchesField { field, .. } => format!("Must match {}", field),
            Self::DateOrder { .. } => "Start date must not be after end date".to_string(),
            Self::Custom(rule) => format!("Failed validation: {}", rule.name),
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { .. } => write!(f, "required"),
            Self::Length { min, max, .. } => write!(f, "length({:?}, {:?})", min, max),
            Self::Range { min, max, .. } => write!(f, "range({:?}, {:?})", min, max),
            Self::Pattern { regex, .. } => write!(f, "pattern({})", regex),
            Self::Email { .. } => write!(f, "email"),
            Self::Url { .. } => write!(f, "url"),
            Self::OneOf { values, .. } => write!(f, "one_of({:?})", values),
            Self::MatchesField { field, .. } => write!(f, "matches({})", field),
            Self::DateOrder { .. } => write!(f, "date_order"),
            Self::Custom(rule) => write!(f, "custom({})", rule.name),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a date or date-time string in the formats the date widgets emit
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn date_range_ordered(value: &Value) -> bool {
    let Some([start, end]) = value.as_array().map(Vec::as_slice) else {
        return false;
    };
    match (
        start.as_str().and_then(parse_date),
        end.as_str().and_then(parse_date),
    ) {
        (Some(start), Some(end)) => start <= end,
        _ => false,
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

    fn check(rule: &ValidationRule, value: Value) -> Result<(), String> {
        rule.check(Some(&value), &json!({}))
    }

    #[test]
    fn test_required_rejects_blank() {
        let rule = ValidationRule::required().with_message("Please enter Name");
        assert_eq!(
            rule.check(None, &json!({})),
            Err("Please enter Name".to_string())
        );
        assert!(check(&rule, json!("")).is_err());
        assert!(check(&rule, json!([])).is_err());
        assert!(check(&rule, json!(false)).is_ok());
        assert!(check(&rule, json!("Al")).is_ok());
    }

    #[test]
    fn test_optional_rules_skip_blank() {
        assert!(check(&ValidationRule::email(), json!("")).is_ok());
        assert!(ValidationRule::min_length(3).check(None, &json!({})).is_ok());
    }

    #[test]
    fn test_length_counts_chars_and_items() {
        let rule = ValidationRule::length(Some(2), Some(20));
        assert!(check(&rule, json!("Al")).is_ok());
        assert!(check(&rule, json!("A")).is_err());
        assert!(check(&rule, json!("日本")).is_ok());
        assert!(check(&ValidationRule::max_length(1), json!(["a", "b"])).is_err());
    }

    #[test]
    fn test_range_accepts_numeric_strings() {
        let rule = ValidationRule::range(Some(0.0), Some(120.0));
        assert!(check(&rule, json!(42)).is_ok());
        assert!(check(&rule, json!("42")).is_ok());
        assert!(check(&rule, json!(121)).is_err());
        assert!(check(&rule, json!("abc")).is_err());
    }

    #[test]
    fn test_email_and_url() {
        assert!(check(&ValidationRule::email(), json!("al@example.com")).is_ok());
        assert_eq!(
            check(&ValidationRule::email(), json!("not-an-email")),
            Err("Must be a valid email address".to_string())
        );
        assert!(check(&ValidationRule::url(), json!("https://example.com/a")).is_ok());
        assert!(check(&ValidationRule::url(), json!("example.com")).is_err());
    }

    #[test]
    fn test_pattern() {
        let rule = ValidationRule::pattern(r"^1[3-9]\d{9}$").with_message("Invalid phone");
        assert!(check(&rule, json!("13800138001")).is_ok());
        assert_eq!(check(&rule, json!("123")), Err("Invalid phone".to_string()));
    }

    #[test]
    fn test_one_of() {
        let rule = ValidationRule::one_of([json!("admin"), json!("user")]);
        assert!(check(&rule, json!("admin")).is_ok());
        assert_eq!(
            check(&rule, json!("root")),
            Err("Must be one of: admin, user".to_string())
        );
    }

    #[test]
    fn test_matches_field_reads_other_value() {
        let rule = ValidationRule::matches_field("password");
        let values = json!({"password": "s3cret"});
        assert!(rule.check(Some(&json!("s3cret")), &values).is_ok());
        assert_eq!(
            rule.check(Some(&json!("other")), &values),
            Err("Must match password".to_string())
        );
    }

    #[test]
    fn test_date_order() {
        let rule = ValidationRule::date_order();
        assert!(check(&rule, json!(["2024-01-01", "2024-02-01"])).is_ok());
        assert!(check(&rule, json!(["2024-03-01", "2024-02-01"])).is_err());
        assert!(check(&rule, json!(["2024-03-01"])).is_err());
        assert!(check(&rule, json!(["2024-01-01 10:00:00", "2024-01-01T11:00:00Z"])).is_ok());
    }

    #[test]
    fn test_custom_rule() {
        let rule = ValidationRule::custom("even", |v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
        assert!(check(&rule, json!(4)).is_ok());
        assert_eq!(check(&rule, json!(3)), Err("Failed validation: even".to_string()));
    }

    #[test]
    fn test_validate_definition() {
        assert!(ValidationRule::pattern("[a-").validate_definition().is_err());
        assert!(ValidationRule::length(Some(5), Some(2)).validate_definition().is_err());
        assert!(ValidationRule::range(Some(1.0), None).validate_definition().is_ok());
    }

    #[test]
    fn test_serde_shape() {
        let rule = ValidationRule::length(Some(2), Some(20)).with_message("2-20 characters");
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            json!({"rule": "length", "min": 2, "max": 20, "message": "2-20 characters"})
        );
        let back: ValidationRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);

        let custom = ValidationRule::custom("x", |_, _| true);
        assert!(serde_json::to_value(&custom).is_err());
    }
}
