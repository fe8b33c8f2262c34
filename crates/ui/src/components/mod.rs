//! # UI Components
//!
//! Dioxus rendering of the view controllers. Each view takes its controller
//! as a `Signal` and writes every user interaction back into it.
//!
//! ```text
//! CrudScreen
//! ├── SearchPanelView
//! ├── DataTable
//! │   └── ConfirmDialog (while a prompt is open)
//! └── FormView
//! ```

pub mod confirm_dialog;
pub mod form_view;
pub mod inputs;
pub mod search_view;
pub mod table_view;
pub mod widgets;

pub use confirm_dialog::ConfirmDialog;
pub use form_view::FormView;
pub use inputs::{
    Checkbox, ChoiceGroup, FieldShell, NumberInput, Select, SelectOption, TextArea, TextInput,
    Toggle,
};
pub use search_view::SearchPanelView;
pub use table_view::DataTable;
pub use widgets::{DesktopRegistry, desktop_registry};
