//! List column descriptors

use crudkit_core::{
    CrudError, CrudResult, FieldPath, Keyed, Record, Validatable, Value, display_text,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Cell formatter: `(value, row, row_index) -> text`
pub type CellFormatter = Rc<dyn Fn(&Value, &Record, usize) -> String>;

static NULL: Value = Value::Null;

/// Describes one column of a list view
#[derive(Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub title: String,

    /// Path of the cell value inside a row
    pub data_path: FieldPath,

    /// Unique key; defaults to the dotted data path
    #[serde(default)]
    pub key: String,

    /// Width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default)]
    pub sortable: bool,

    #[serde(default)]
    pub filterable: bool,

    /// Optional formatter; not serialized
    #[serde(skip)]
    pub formatter: Option<CellFormatter>,
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("title", &self.title)
            .field("data_path", &self.data_path)
            .field("key", &self.key)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl ColumnDescriptor {
    /// Create a column reading `data_path`
    pub fn new(title: impl Into<String>, data_path: impl Into<FieldPath>) -> Self {
        let data_path = data_path.into();
        Self {
            title: title.into(),
            key: data_path.dotted(),
            data_path,
            width: None,
            sortable: false,
            filterable: false,
            formatter: None,
        }
    }

    /// Override the key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the width in pixels
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Mark the column as sortable
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark the column as filterable
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Set the cell formatter
    pub fn with_formatter(
        mut self,
        formatter: impl Fn(&Value, &Record, usize) -> String + 'static,
    ) -> Self {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    /// Format through a value-to-label table; unmapped values show as-is
    pub fn mapped<I, L>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (Value, L)>,
        L: Into<String>,
    {
        let table: Vec<(Value, String)> = pairs.into_iter().map(|(v, l)| (v, l.into())).collect();
        self.with_formatter(move |value, _, _| {
            table
                .iter()
                .find(|(v, _)| v == value)
                .map(|(_, label)| label.clone())
                .unwrap_or_else(|| display_text(Some(value)))
        })
    }

    /// The key, falling back to the data path when empty
    pub fn effective_key(&self) -> String {
        if self.key.is_empty() {
            self.data_path.dotted()
        } else {
            self.key.clone()
        }
    }

    /// Raw cell value; `null` when the path is absent
    pub fn cell_value<'r>(&self, row: &'r Record) -> &'r Value {
        self.data_path.lookup_record(row).unwrap_or(&NULL)
    }

    /// Rendered cell text
    pub fn cell_text(&self, row: &Record, index: usize) -> String {
        let value = self.cell_value(row);
        match &self.formatter {
            Some(format) => format(value, row, index),
            None => display_text(Some(value)),
        }
    }
}

impl Validatable for ColumnDescriptor {
    fn validate(&self) -> CrudResult<()> {
        self.data_path.validate()?;
        if self.effective_key().trim().is_empty() {
            return Err(CrudError::invalid_descriptor(
                &self.title,
                "column key cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Keyed for ColumnDescriptor {
    fn unique_key(&self) -> Option<String> {
        Some(self.effective_key())
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

    fn row(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_key_defaults_to_path() {
        let column = ColumnDescriptor::new("City", "profile.city");
        assert_eq!(column.key, "profile.city");
        assert_eq!(column.with_key("city").effective_key(), "city");
    }

    #[test]
    fn test_cell_text_without_formatter() {
        let r = row(json!({"name": "Al", "age": 30, "profile": {"city": "Oslo"}, "note": null}));
        assert_eq!(ColumnDescriptor::new("Name", "name").cell_text(&r, 0), "Al");
        assert_eq!(ColumnDescriptor::new("Age", "age").cell_text(&r, 0), "30");
        assert_eq!(
            ColumnDescriptor::new("City", "profile.city").cell_text(&r, 0),
            "Oslo"
        );
        assert_eq!(ColumnDescriptor::new("Note", "note").cell_text(&r, 0), "");
        assert_eq!(ColumnDescriptor::new("Zip", "zip").cell_text(&r, 0), "");
    }

    #[test]
    fn test_formatter_gets_row_and_index() {
        let column = ColumnDescriptor::new("No.", "name")
            .with_formatter(|v, row, i| format!("{}:{}:{}", i + 1, display_text(Some(v)), row.len()));
        let r = row(json!({"name": "Al", "id": 1}));
        assert_eq!(column.cell_text(&r, 2), "3:Al:2");
    }

    #[test]
    fn test_mapped_formatter() {
        let column = ColumnDescriptor::new("Status", "status")
            .mapped([(json!(1), "Active"), (json!(0), "Disabled")]);
        assert_eq!(column.cell_text(&row(json!({"status": 1})), 0), "Active");
        assert_eq!(column.cell_text(&row(json!({"status": 7})), 0), "7");
    }

    #[test]
    fn test_serde_skips_formatter() {
        let column = ColumnDescriptor::new("Status", "status").sortable().mapped([(json!(1), "On")]);
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(
            json,
            json!({"title": "Status", "data_path": "status", "key": "status", "sortable": true, "filterable": false})
        );

        let back: ColumnDescriptor =
            serde_json::from_value(json!({"title": "Email", "data_path": "email"})).unwrap();
        assert_eq!(back.effective_key(), "email");
        assert!(back.formatter.is_none());
    }
}
