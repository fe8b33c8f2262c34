//! Row and batch action descriptors
//!
//! Handlers are host code. They return `HandlerResult` so a controller can
//! report success or failure; controllers never retry them.

use crudkit_core::{CrudError, CrudResult, Keyed, Record, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Result of a host action handler
pub type HandlerResult = anyhow::Result<()>;

/// Handler for one row
pub type RowHandler = Rc<dyn Fn(&Record) -> HandlerResult>;

/// Handler for a set of selected rows
pub type BatchHandler = Rc<dyn Fn(&[Record]) -> HandlerResult>;

// ============================================================================
// Style
// ============================================================================

/// Visual weight of an action trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Primary,
    Default,
    Dashed,
    #[default]
    Text,
    Link,
}

/// Presentation of an action trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionStyle {
    #[serde(default)]
    pub emphasis: Emphasis,
    /// Destructive styling
    #[serde(default)]
    pub danger: bool,
}

// ============================================================================
// ConfirmPrompt
// ============================================================================

/// Texts of the blocking prompt shown before a confirmed action runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub description: String,
    pub ok_text: String,
    pub cancel_text: String,
}

impl Default for ConfirmPrompt {
    fn default() -> Self {
        Self {
            title: "Confirm".to_string(),
            description: "This action cannot be undone. Continue?".to_string(),
            ok_text: "OK".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }
}

impl ConfirmPrompt {
    /// Prompt with a custom description
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// RowActionDescriptor
// ============================================================================

/// An action offered on every row
#[derive(Clone)]
pub struct RowActionDescriptor {
    pub key: String,
    pub label: String,
    pub style: ActionStyle,
    /// Gate the handler behind a confirmation prompt
    pub requires_confirmation: bool,
    pub confirm: ConfirmPrompt,
    /// Opaque to this crate; evaluated by the host
    pub permission: Option<String>,
    pub handler: RowHandler,
}

impl fmt::Debug for RowActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowActionDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("style", &self.style)
            .field("requires_confirmation", &self.requires_confirmation)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

impl RowActionDescriptor {
    /// Create an unconfirmed row action
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(&Record) -> HandlerResult + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            style: ActionStyle::default(),
            requires_confirmation: false,
            confirm: ConfirmPrompt::default(),
            permission: None,
            handler: Rc::new(handler),
        }
    }

    /// Require confirmation before the handler runs
    pub fn confirmed(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Require confirmation with custom prompt texts
    pub fn with_confirm(mut self, prompt: ConfirmPrompt) -> Self {
        self.requires_confirmation = true;
        self.confirm = prompt;
        self
    }

    /// Use destructive styling
    pub fn danger(mut self) -> Self {
        self.style.danger = true;
        self
    }

    /// Set the emphasis
    pub fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        self.style.emphasis = emphasis;
        self
    }

    /// Attach a permission tag
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Run the handler
    pub fn invoke(&self, row: &Record) -> HandlerResult {
        (self.handler)(row)
    }
}

impl Validatable for RowActionDescriptor {
    fn validate(&self) -> CrudResult<()> {
        if self.key.trim().is_empty() {
            return Err(CrudError::invalid_descriptor(
                &self.label,
                "action key cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Keyed for RowActionDescriptor {
    fn unique_key(&self) -> Option<String> {
        Some(self.key.clone())
    }
}

// ============================================================================
// BatchActionDescriptor
// ============================================================================

/// An action over the current selection
#[derive(Clone)]
pub struct BatchActionDescriptor {
    pub key: String,
    pub label: String,
    pub permission: Option<String>,
    pub handler: BatchHandler,
}

impl fmt::Debug for BatchActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchActionDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

impl BatchActionDescriptor {
    /// Create a batch action
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(&[Record]) -> HandlerResult + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            permission: None,
            handler: Rc::new(handler),
        }
    }

    /// Attach a permission tag
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Run the handler
    pub fn invoke(&self, rows: &[Record]) -> HandlerResult {
        (self.handler)(rows)
    }
}

impl Validatable for BatchActionDescriptor {
    fn validate(&self) -> CrudResult<()> {
        if self.key.trim().is_empty() {
            return Err(CrudError::invalid_descriptor(
                &self.label,
                "batch action key cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Keyed for BatchActionDescriptor {
    fn unique_key(&self) -> Option<String> {
        Some(self.key.clone())
    }
}

// ============================================================================
// Presets
// ============================================================================

/// The usual view / edit / delete actions
pub struct CommonActions;

impl CommonActions {
    /// Open the detail view
    pub fn view(handler: impl Fn(&Record) -> HandlerResult + 'static) -> RowActionDescriptor {
        RowActionDescriptor::new("view", "View", handler).with_emphasis(Emphasis::Link)
    }

    /// Open the edit form
    pub fn edit(handler: impl Fn(&Record) -> HandlerResult + 'static) -> RowActionDescriptor {
        RowActionDescriptor::new("edit", "Edit", handler).with_emphasis(Emphasis::Link)
    }

    /// Delete the row; destructive and confirmed
    pub fn delete(handler: impl Fn(&Record) -> HandlerResult + 'static) -> RowActionDescriptor {
        RowActionDescriptor::new("delete", "Delete", handler)
            .with_emphasis(Emphasis::Link)
            .danger()
            .with_confirm(ConfirmPrompt::with_description(
                "Delete this record? This action cannot be undone.",
            ))
    }

    /// Delete every selected row
    pub fn batch_delete(
        handler: impl Fn(&[Record]) -> HandlerResult + 'static,
    ) -> BatchActionDescriptor {
        BatchActionDescriptor::new("batch_delete", "Delete", handler)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn test_delete_preset_is_confirmed_and_danger() {
        let delete = CommonActions::delete(|_| Ok(()));
        assert!(delete.requires_confirmation);
        assert!(delete.style.danger);
        assert_eq!(delete.confirm.ok_text, "OK");

        let edit = CommonActions::edit(|_| Ok(()));
        assert!(!edit.requires_confirmation);
    }

    #[test]
    fn test_delete_key_alone_does_not_confirm() {
        let action = RowActionDescriptor::new("delete", "Delete", |_| Ok(()));
        assert!(!action.requires_confirmation);
    }

    #[test]
    fn test_invoke_passes_row() {
        let seen = Rc::new(Cell::new(0));
        let sink = seen.clone();
        let action = RowActionDescriptor::new("view", "View", move |row| {
            sink.set(row.len());
            Ok(())
        });
        let mut row = Record::new();
        row.insert("id".into(), 1.into());
        action.invoke(&row).unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_batch_handler_error_surfaces() {
        let action = BatchActionDescriptor::new("archive", "Archive", |rows| {
            anyhow::ensure!(!rows.is_empty(), "nothing to archive");
            Ok(())
        });
        let err = action.invoke(&[]).unwrap_err();
        assert_eq!(err.to_string(), "nothing to archive");
    }

    #[test]
    fn test_empty_key_is_invalid() {
        assert!(RowActionDescriptor::new(" ", "X", |_| Ok(())).validate().is_err());
        assert!(BatchActionDescriptor::new("", "X", |_| Ok(())).validate().is_err());
    }
}
