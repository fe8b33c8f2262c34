//! Core value types for crudkit
//!
//! Field and row values are dynamic JSON values. This module adds the small
//! typed wrappers the controllers share: segmented field paths, grid spans,
//! row identifiers, and the controlled/uncontrolled flag.

use crate::error::{CrudError, CrudResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Map;
use std::fmt;
use std::str::FromStr;

/// A field or cell value
pub type Value = serde_json::Value;

/// One row of list data
pub type Record = Map<String, Value>;

// ============================================================================
// Value helpers
// ============================================================================

/// Whether a value counts as "not present" for a required rule.
///
/// Absent, `null`, the empty string and the empty list are blank. `false`
/// and `0` are present.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Whether a search filter value is dropped from a search payload.
///
/// Only absent, `null` and the empty string are dropped; an empty list is
/// forwarded as-is.
pub fn is_empty_filter(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Plain display text for a value: strings unquoted, `null` empty
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// FieldPath
// ============================================================================

/// Segmented key of a field, e.g. `settings.emailNotification`.
///
/// Used both to look a value up inside a nested value object and to rebuild
/// the nested object on submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Build a path from a dotted string without checking it.
    ///
    /// Use [`FieldPath::validate`] (or [`FieldPath::parse`]) before relying on
    /// it; descriptor lists are checked when handed to a controller.
    pub fn new(dotted: impl AsRef<str>) -> Self {
        Self(dotted.as_ref().split('.').map(str::to_string).collect())
    }

    /// Parse and validate a dotted path
    pub fn parse(dotted: impl AsRef<str>) -> CrudResult<Self> {
        let path = Self::new(dotted);
        path.validate()?;
        Ok(path)
    }

    /// Build a path from explicit segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Reject empty paths and empty segments
    pub fn validate(&self) -> CrudResult<()> {
        if self.0.is_empty() || self.0.iter().any(|s| s.trim().is_empty()) {
            return Err(CrudError::InvalidFieldPath(self.dotted()));
        }
        Ok(())
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether the path targets a nested value
    pub fn is_nested(&self) -> bool {
        self.0.len() > 1
    }

    /// Last segment (the leaf key)
    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Dotted representation
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }

    /// Look the path up inside a nested value
    pub fn lookup<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.0
            .iter()
            .try_fold(root, |cursor, segment| cursor.as_object()?.get(segment))
    }

    /// Look the path up inside a row
    pub fn lookup_record<'v>(&self, record: &'v Record) -> Option<&'v Value> {
        let (first, rest) = self.0.split_first()?;
        rest.iter()
            .try_fold(record.get(first)?, |cursor, segment| {
                cursor.as_object()?.get(segment)
            })
    }

    /// Write a value at the path, creating intermediate objects
    pub fn insert(&self, root: &mut Value, value: Value) {
        let Some((last, parents)) = self.0.split_last() else {
            return;
        };

        let mut cursor = root;
        for segment in parents {
            cursor = ensure_object(cursor)
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(cursor).insert(last.clone(), value);
    }

    /// Remove the value at the path, leaving parents in place
    pub fn remove(&self, root: &mut Value) -> Option<Value> {
        let (last, parents) = self.0.split_last()?;

        let mut cursor = root;
        for segment in parents {
            cursor = cursor.as_object_mut()?.get_mut(segment)?;
        }
        cursor.as_object_mut()?.remove(last)
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

impl FromStr for FieldPath {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::new(dotted)
    }
}

impl From<String> for FieldPath {
    fn from(dotted: String) -> Self {
        Self::new(dotted)
    }
}

impl<const N: usize> From<[&str; N]> for FieldPath {
    fn from(segments: [&str; N]) -> Self {
        Self::from_segments(segments)
    }
}

/// Single segments serialize as a string, nested paths as a segment list
impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.len() == 1 {
            serializer.serialize_str(&self.0[0])
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Dotted(String),
            Segments(Vec<String>),
        }

        let path = match Repr::deserialize(deserializer)? {
            Repr::Dotted(s) => FieldPath::new(s),
            Repr::Segments(segments) => FieldPath::from_segments(segments),
        };
        path.validate().map_err(serde::de::Error::custom)?;
        Ok(path)
    }
}

// ============================================================================
// GridSpan
// ============================================================================

/// Width of an item on the 24-unit row grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridSpan(u8);

impl GridSpan {
    /// Units in one grid row
    pub const COLUMNS: u8 = 24;

    /// Full-width span
    pub const FULL: GridSpan = GridSpan(24);

    /// Create a checked span
    pub fn new(span: u8) -> CrudResult<Self> {
        let span = Self(span);
        span.validate()?;
        Ok(span)
    }

    /// Create a span without checking; builders use this and descriptor
    /// lists are checked when handed to a controller
    pub fn raw(span: u8) -> Self {
        Self(span)
    }

    /// Reject spans outside 1..=24
    pub fn validate(&self) -> CrudResult<()> {
        if (1..=Self::COLUMNS).contains(&self.0) {
            Ok(())
        } else {
            Err(CrudError::InvalidGridSpan { span: self.0 })
        }
    }

    /// Span width in grid units
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for GridSpan {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<u8> for GridSpan {
    type Error = CrudError;

    fn try_from(span: u8) -> Result<Self, Self::Error> {
        Self::new(span)
    }
}

impl From<GridSpan> for u8 {
    fn from(span: GridSpan) -> Self {
        span.0
    }
}

// ============================================================================
// RowId
// ============================================================================

/// Identifier of one row in a list view
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    /// Create a row identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract an identifier from a row value; strings and numbers qualify
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Extract the identifier stored under `row_key`
    pub fn from_record(record: &Record, row_key: &str) -> Option<Self> {
        record.get(row_key).and_then(Self::from_value)
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Control
// ============================================================================

/// Ownership of a UI flag.
///
/// A `Controlled` flag belongs to the host: the component reads it and never
/// changes it. An `Uncontrolled` flag belongs to the component and only the
/// component's own transitions change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Control<T> {
    /// Host-owned value
    Controlled(T),
    /// Component-owned value with its current state
    Uncontrolled(T),
}

impl<T: Copy> Control<T> {
    /// Current value
    pub fn get(&self) -> T {
        match self {
            Control::Controlled(v) | Control::Uncontrolled(v) => *v,
        }
    }

    /// Whether the host owns the flag
    pub fn is_controlled(&self) -> bool {
        matches!(self, Control::Controlled(_))
    }

    /// Update from a component transition; ignored when controlled
    pub fn update_internal(&mut self, value: T) -> bool {
        match self {
            Control::Uncontrolled(v) => {
                *v = value;
                true
            }
            Control::Controlled(_) => false,
        }
    }

    /// Update from the host; ignored when uncontrolled
    pub fn update_from_host(&mut self, value: T) -> bool {
        match self {
            Control::Controlled(v) => {
                *v = value;
                true
            }
            Control::Uncontrolled(_) => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
