//! View options
//!
//! Plain option structs for the three controllers. All of them deserialize
//! from partial documents, filling in the defaults below.

use crudkit_core::Control;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

// ============================================================================
// Form
// ============================================================================

/// Form view options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub submit_text: String,
    pub reset_text: String,
    pub show_reset: bool,
    /// Submit-disabling flag
    pub loading: Control<bool>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            submit_text: "Submit".to_string(),
            reset_text: "Reset".to_string(),
            show_reset: true,
            loading: Control::Controlled(false),
        }
    }
}

// ============================================================================
// Search panel
// ============================================================================

/// Search panel options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPanelConfig {
    /// Fields shown while collapsed
    pub max_visible: usize,
    pub show_collapse: bool,
    pub collapse: Control<bool>,
    /// Field cleared by the keyword clear affordance
    pub keyword_field: Option<String>,
    pub search_text: String,
    pub reset_text: String,
    /// Disables the search trigger
    pub loading: bool,
}

impl Default for SearchPanelConfig {
    fn default() -> Self {
        Self {
            max_visible: 3,
            show_collapse: true,
            collapse: Control::Uncontrolled(true),
            keyword_field: None,
            search_text: "Search".to_string(),
            reset_text: "Reset".to_string(),
            loading: false,
        }
    }
}

// ============================================================================
// Table
// ============================================================================

/// Toolbar affordances; each can be switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarConfig {
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default = "default_true")]
    pub refreshable: bool,
    #[serde(default = "default_true")]
    pub exportable: bool,
    #[serde(default = "default_true")]
    pub creatable: bool,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            searchable: true,
            filterable: true,
            refreshable: true,
            exportable: true,
            creatable: true,
        }
    }
}

/// Page echo: the host owns it, the table shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: 10,
            total: 0,
        }
    }
}

impl Pagination {
    /// Number of pages, at least one
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }

    /// Summary line, e.g. `Total 42 items`
    pub fn summary(&self) -> String {
        format!("Total {} items", self.total)
    }
}

/// Table view options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Row field holding the unique identifier
    pub row_key: String,
    pub title: Option<String>,
    pub toolbar: ToolbarConfig,
    /// Create button text
    pub create_text: String,
    pub loading: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_key: "id".to_string(),
            title: None,
            toolbar: ToolbarConfig::default(),
            create_text: "Create".to_string(),
            loading: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
