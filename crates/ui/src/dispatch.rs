//! Action dispatch contract
//!
//! The boundary between the intents a view declares and the host code that
//! carries them out. Controllers fire these callbacks synchronously and never
//! wait on whatever asynchronous effect the host starts from them.

use crudkit_core::{FieldPath, Record, Value};
use std::fmt;

// ============================================================================
// Intents
// ============================================================================

/// Intents a list or form view can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionIntent {
    View,
    Edit,
    Delete,
    BatchDelete,
    Refresh,
    Export,
    Create,
}

impl ActionIntent {
    /// Conventional action key
    pub fn key(&self) -> &'static str {
        match self {
            ActionIntent::View => "view",
            ActionIntent::Edit => "edit",
            ActionIntent::Delete => "delete",
            ActionIntent::BatchDelete => "batch_delete",
            ActionIntent::Refresh => "refresh",
            ActionIntent::Export => "export",
            ActionIntent::Create => "create",
        }
    }

    /// Intent for a conventional action key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "view" => Some(ActionIntent::View),
            "edit" => Some(ActionIntent::Edit),
            "delete" => Some(ActionIntent::Delete),
            "batch_delete" => Some(ActionIntent::BatchDelete),
            "refresh" => Some(ActionIntent::Refresh),
            "export" => Some(ActionIntent::Export),
            "create" => Some(ActionIntent::Create),
            _ => None,
        }
    }

    /// Whether the intent targets rows rather than the toolbar
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            ActionIntent::View | ActionIntent::Edit | ActionIntent::Delete | ActionIntent::BatchDelete
        )
    }
}

impl fmt::Display for ActionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Failing messages of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub name: FieldPath,
    pub errors: Vec<String>,
}

/// Payload of a failed submit
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    /// Current form values
    pub values: Value,
    /// Every failing field, in descriptor order
    pub error_fields: Vec<FieldError>,
}

impl ErrorInfo {
    /// Whether `name` failed
    pub fn contains(&self, name: &FieldPath) -> bool {
        self.error_fields.iter().any(|e| &e.name == name)
    }

    /// Messages of `name`
    pub fn messages(&self, name: &FieldPath) -> &[String] {
        self.error_fields
            .iter()
            .find(|e| &e.name == name)
            .map(|e| e.errors.as_slice())
            .unwrap_or_default()
    }
}

/// Result of running a host action handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Handler returned `Ok`
    Completed,
    /// Handler returned an error; the message is kept for display
    Failed(String),
    /// A confirmation prompt was opened; nothing ran yet
    AwaitingConfirmation,
}

impl ActionOutcome {
    /// Convert a handler result
    pub fn from_result(result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => ActionOutcome::Completed,
            Err(e) => ActionOutcome::Failed(format!("{:#}", e)),
        }
    }
}

/// Column sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "▲"),
            SortDirection::Descending => write!(f, "▼"),
        }
    }
}

/// Page or page-size change requested by the pager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub current: u32,
    pub page_size: u32,
}

// ============================================================================
// Callbacks
// ============================================================================

/// `(values)` after a passing submit
pub type FinishHandler = Box<dyn FnMut(&Value)>;
/// `(error_info)` after a failing submit
pub type FinishFailedHandler = Box<dyn FnMut(&ErrorInfo)>;
/// `(filters)` for searches and column filters
pub type FilterHandler = Box<dyn FnMut(&Record)>;
/// `(text)` for the table's keyword box
pub type KeywordHandler = Box<dyn FnMut(&str)>;
/// No payload
pub type NotifyHandler = Box<dyn FnMut()>;
/// `(column_key, direction)`; `None` clears sorting
pub type SortHandler = Box<dyn FnMut(&str, Option<SortDirection>)>;
/// `(change)` from the pager
pub type PageHandler = Box<dyn FnMut(PageChange)>;

/// Form callbacks
#[derive(Default)]
pub struct FormCallbacks {
    pub on_finish: Option<FinishHandler>,
    pub on_finish_failed: Option<FinishFailedHandler>,
}

impl FormCallbacks {
    /// Set `on_finish`
    pub fn on_finish(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    /// Set `on_finish_failed`
    pub fn on_finish_failed(mut self, f: impl FnMut(&ErrorInfo) + 'static) -> Self {
        self.on_finish_failed = Some(Box::new(f));
        self
    }
}

/// Search panel callbacks
#[derive(Default)]
pub struct SearchCallbacks {
    pub on_search: Option<FilterHandler>,
    pub on_reset: Option<NotifyHandler>,
}

impl SearchCallbacks {
    /// Set `on_search`
    pub fn on_search(mut self, f: impl FnMut(&Record) + 'static) -> Self {
        self.on_search = Some(Box::new(f));
        self
    }

    /// Set `on_reset`
    pub fn on_reset(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_reset = Some(Box::new(f));
        self
    }
}

/// Table toolbar and pager callbacks
#[derive(Default)]
pub struct TableCallbacks {
    pub on_search: Option<KeywordHandler>,
    pub on_filter: Option<FilterHandler>,
    pub on_refresh: Option<NotifyHandler>,
    pub on_create: Option<NotifyHandler>,
    pub on_export: Option<NotifyHandler>,
    pub on_sort: Option<SortHandler>,
    pub on_page_change: Option<PageHandler>,
}

impl TableCallbacks {
    /// Set `on_search`
    pub fn on_search(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_search = Some(Box::new(f));
        self
    }

    /// Set `on_filter`
    pub fn on_filter(mut self, f: impl FnMut(&Record) + 'static) -> Self {
        self.on_filter = Some(Box::new(f));
        self
    }

    /// Set `on_refresh`
    pub fn on_refresh(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_refresh = Some(Box::new(f));
        self
    }

    /// Set `on_create`
    pub fn on_create(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_create = Some(Box::new(f));
        self
    }

    /// Set `on_export`
    pub fn on_export(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_export = Some(Box::new(f));
        self
    }

    /// Set `on_sort`
    pub fn on_sort(mut self, f: impl FnMut(&str, Option<SortDirection>) + 'static) -> Self {
        self.on_sort = Some(Box::new(f));
        self
    }

    /// Set `on_page_change`
    pub fn on_page_change(mut self, f: impl FnMut(PageChange) + 'static) -> Self {
        self.on_page_change = Some(Box::new(f));
        self
    }
}
