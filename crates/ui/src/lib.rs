//! # crudkit UI
//!
//! View controllers for declarative admin screens.
//!
//! Hosts hand descriptors to a controller and get back render requests and
//! dispatched intents. Controllers own transient UI state only; data loading
//! and persistence stay with the host.
//!
//! ## Views
//!
//! - [`FormRenderer`]: field descriptors to a validated form
//! - [`SearchPanelController`]: collapsible filter bar
//! - [`TableController`]: rows, selection, confirmed actions, toolbar and pager
//!
//! Widgets are resolved through a [`WidgetRegistry`]. The [`text`] toolkit
//! renders to plain text; the `desktop` feature adds Dioxus components.

// ============================================================================
// Modules
// ============================================================================

pub mod dispatch;
pub mod form;
pub mod layout;
pub mod search;
pub mod state;
pub mod table;
pub mod text;
pub mod widget;

#[cfg(feature = "desktop")]
pub mod app;
#[cfg(feature = "desktop")]
pub mod components;

// ============================================================================
// Re-exports
// ============================================================================

pub use crudkit_core;
pub use crudkit_descriptor;

pub use dispatch::{
    ActionIntent, ActionOutcome, ErrorInfo, FieldError, FormCallbacks, PageChange,
    SearchCallbacks, SortDirection, TableCallbacks,
};
pub use form::{FormOptions, FormRenderer, SubmitOutcome};
pub use layout::pack_rows;
pub use search::{SearchOptions, SearchPanelController};
pub use state::{FormState, SearchState, SelectionState};
pub use table::{
    ActionTrigger, BatchTrigger, ColumnRole, ColumnView, PendingConfirmation, RowView,
    TableController, TableOptions,
};
pub use text::{TextRegistry, TextToolkit, render_form, render_search, render_table};
pub use widget::{RenderStrategy, RenderedField, WidgetRegistry, WidgetRequest};

#[cfg(feature = "desktop")]
pub use app::{CrudScreen, ScreenFactory, launch};

// ============================================================================
// Constants
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name
pub const NAME: &str = "crudkit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "crudkit");
    }
}
