//! Table controller
//!
//! Merges column descriptors with row and batch actions into a list view.
//! Owns row selection, the confirmation gate of confirmed row actions, and
//! the toolbar and pager forwarding. Rows, pagination and loading are always
//! supplied by the host.

use crate::dispatch::{
    ActionIntent, ActionOutcome, PageChange, SortDirection, TableCallbacks,
};
use crate::state::SelectionState;
use crudkit_core::{CrudError, CrudResult, Record, RowId, Value, is_empty_filter};
use crudkit_descriptor::{
    ActionStyle, BatchActionDescriptor, ColumnDescriptor, ConfirmPrompt, Pagination,
    RowActionDescriptor, TableConfig, validate_table,
};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Key of the synthesized actions column
pub const ACTIONS_COLUMN_KEY: &str = "actions";

/// Width of the actions column for `count` row actions
pub fn actions_column_width(count: usize) -> u32 {
    60 * count as u32 + 40
}

/// Construction options of a table
#[derive(Default)]
pub struct TableOptions {
    pub config: TableConfig,
    pub row_actions: Vec<RowActionDescriptor>,
    pub batch_actions: Vec<BatchActionDescriptor>,
    pub pagination: Option<Pagination>,
    pub callbacks: TableCallbacks,
}

// ============================================================================
// View models
// ============================================================================

/// Where a rendered column comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Data,
    Actions,
}

/// One rendered column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub key: String,
    pub title: String,
    pub width: Option<u32>,
    pub sortable: bool,
    pub filterable: bool,
    pub role: ColumnRole,
    /// Current sort of this column
    pub sort: Option<SortDirection>,
}

/// A row action trigger
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTrigger {
    pub key: String,
    pub label: String,
    pub style: ActionStyle,
    pub requires_confirmation: bool,
    pub permission: Option<String>,
}

/// One rendered row
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: RowId,
    pub index: usize,
    pub selected: bool,
    /// Cell text per data column
    pub cells: Vec<String>,
    pub actions: Vec<ActionTrigger>,
}

/// A batch action trigger, offered while rows are selected
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTrigger {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub permission: Option<String>,
}

impl BatchTrigger {
    /// Label with the selection count, e.g. `Delete (3)`
    pub fn text(&self) -> String {
        format!("{} ({})", self.label, self.count)
    }
}

/// An open confirmation prompt
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub action_key: String,
    pub row_id: RowId,
    /// Row as it was when the trigger was invoked
    pub row: Record,
    pub prompt: ConfirmPrompt,
}

// ============================================================================
// TableController
// ============================================================================

/// List view controller
pub struct TableController {
    id: Uuid,
    columns: Vec<ColumnDescriptor>,
    row_actions: Vec<RowActionDescriptor>,
    batch_actions: Vec<BatchActionDescriptor>,
    config: TableConfig,
    rows: Vec<(RowId, Record)>,
    selection: SelectionState,
    pending: Option<PendingConfirmation>,
    search_text: String,
    filters: Record,
    sort: Option<(String, SortDirection)>,
    pagination: Option<Pagination>,
    callbacks: TableCallbacks,
}

impl TableController {
    /// Create a table; fails on descriptor-contract violations
    pub fn new(columns: Vec<ColumnDescriptor>, options: TableOptions) -> CrudResult<Self> {
        validate_table(&columns, &options.row_actions, &options.batch_actions)?;
        if options.config.row_key.trim().is_empty() {
            return Err(CrudError::invalid_descriptor(
                "table",
                "row key cannot be empty",
            ));
        }

        let id = Uuid::new_v4();
        debug!(
            view = %id,
            columns = columns.len(),
            row_actions = options.row_actions.len(),
            batch_actions = options.batch_actions.len(),
            "table created"
        );

        Ok(Self {
            id,
            columns,
            row_actions: options.row_actions,
            batch_actions: options.batch_actions,
            config: options.config,
            rows: Vec::new(),
            selection: SelectionState::new(),
            pending: None,
            search_text: String::new(),
            filters: Record::new(),
            sort: None,
            pagination: options.pagination,
            callbacks: options.callbacks,
        })
    }

    /// View instance id, included in log events
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Table options
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Whether rows can be selected (some batch action exists)
    pub fn selectable(&self) -> bool {
        !self.batch_actions.is_empty()
    }

    // ========================================================================
    // Rows
    // ========================================================================

    /// Replace the loaded rows.
    ///
    /// Every row needs a unique identifier under the row key; on failure the
    /// previous rows stay loaded. Selected rows that are gone are dropped,
    /// kept ones get fresh snapshots.
    pub fn set_rows(&mut self, rows: Vec<Record>) -> CrudResult<()> {
        let mut seen = HashSet::new();
        let mut loaded = Vec::with_capacity(rows.len());

        for (index, record) in rows.into_iter().enumerate() {
            let id = RowId::from_record(&record, &self.config.row_key).ok_or_else(|| {
                CrudError::MissingRowId {
                    index,
                    row_key: self.config.row_key.clone(),
                }
            })?;
            if !seen.insert(id.clone()) {
                return Err(CrudError::DuplicateRowId(id.to_string()));
            }
            loaded.push((id, record));
        }

        self.rows = loaded;
        let dropped = self
            .selection
            .retain_loaded(self.rows.iter().map(|(id, row)| (id, row)));
        if self
            .pending
            .as_ref()
            .is_some_and(|p| !self.rows.iter().any(|(id, _)| id == &p.row_id))
        {
            warn!(view = %self.id, "confirmation prompt closed: its row is gone");
            self.pending = None;
        }
        debug!(view = %self.id, rows = self.rows.len(), dropped, "rows replaced");
        Ok(())
    }

    /// Loaded rows, in order
    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter().map(|(_, row)| row)
    }

    /// Number of loaded rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, id: &RowId) -> CrudResult<&Record> {
        self.rows
            .iter()
            .find(|(row_id, _)| row_id == id)
            .map(|(_, row)| row)
            .ok_or_else(|| CrudError::RowNotFound(id.to_string()))
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Caller columns in order, then the actions column when row actions exist
    pub fn columns(&self) -> Vec<ColumnView> {
        let mut views: Vec<ColumnView> = self
            .columns
            .iter()
            .map(|c| {
                let key = c.effective_key();
                let sort = self
                    .sort
                    .as_ref()
                    .filter(|(sorted, _)| sorted == &key)
                    .map(|(_, dir)| *dir);
                ColumnView {
                    key,
                    title: c.title.clone(),
                    width: c.width,
                    sortable: c.sortable,
                    filterable: c.filterable,
                    role: ColumnRole::Data,
                    sort,
                }
            })
            .collect();

        if !self.row_actions.is_empty() {
            views.push(ColumnView {
                key: ACTIONS_COLUMN_KEY.to_string(),
                title: "Actions".to_string(),
                width: Some(actions_column_width(self.row_actions.len())),
                sortable: false,
                filterable: false,
                role: ColumnRole::Actions,
                sort: None,
            });
        }
        views
    }

    fn triggers(&self) -> Vec<ActionTrigger> {
        self.row_actions
            .iter()
            .map(|a| ActionTrigger {
                key: a.key.clone(),
                label: a.label.clone(),
                style: a.style,
                requires_confirmation: a.requires_confirmation,
                permission: a.permission.clone(),
            })
            .collect()
    }

    /// Cell texts, selection marks and action triggers of every loaded row
    pub fn render_rows(&self) -> Vec<RowView> {
        let triggers = self.triggers();
        self.rows
            .iter()
            .enumerate()
            .map(|(index, (id, row))| RowView {
                id: id.clone(),
                index,
                selected: self.selection.contains(id),
                cells: self.columns.iter().map(|c| c.cell_text(row, index)).collect(),
                actions: triggers.clone(),
            })
            .collect()
    }

    // ========================================================================
    // Row actions
    // ========================================================================

    fn row_action(&self, key: &str) -> CrudResult<&RowActionDescriptor> {
        self.row_actions
            .iter()
            .find(|a| a.key == key)
            .ok_or_else(|| CrudError::ActionNotFound(key.to_string()))
    }

    fn ensure_no_prompt(&self) -> CrudResult<()> {
        match &self.pending {
            Some(p) => Err(CrudError::ConfirmationPending(p.action_key.clone())),
            None => Ok(()),
        }
    }

    fn run_row_action(&self, action: &RowActionDescriptor, row_id: &RowId, row: &Record) -> ActionOutcome {
        let intent = ActionIntent::from_key(&action.key);
        info!(view = %self.id, action = %action.key, ?intent, row = %row_id, "row action dispatched");
        let outcome = ActionOutcome::from_result(action.invoke(row));
        if let ActionOutcome::Failed(message) = &outcome {
            warn!(view = %self.id, action = %action.key, row = %row_id, error = %message, "row action failed");
        }
        outcome
    }

    /// Invoke a row action; confirmed actions open a prompt instead of running
    pub fn trigger_row_action(&mut self, row_id: &RowId, action_key: &str) -> CrudResult<ActionOutcome> {
        self.ensure_no_prompt()?;
        let action = self.row_action(action_key)?;
        let row = self.row(row_id)?;

        if action.requires_confirmation {
            let pending = PendingConfirmation {
                action_key: action.key.clone(),
                row_id: row_id.clone(),
                row: row.clone(),
                prompt: action.confirm.clone(),
            };
            debug!(view = %self.id, action = action_key, row = %row_id, "confirmation opened");
            self.pending = Some(pending);
            return Ok(ActionOutcome::AwaitingConfirmation);
        }

        Ok(self.run_row_action(action, row_id, row))
    }

    /// The open confirmation prompt, if any
    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    /// Confirm the open prompt: run its handler once with the original row
    pub fn confirm(&mut self) -> CrudResult<ActionOutcome> {
        let pending = self.pending.take().ok_or(CrudError::NoPendingConfirmation)?;
        let action = self.row_action(&pending.action_key)?;
        Ok(self.run_row_action(action, &pending.row_id, &pending.row))
    }

    /// Dismiss the open prompt without running anything
    pub fn dismiss(&mut self) -> CrudResult<()> {
        let pending = self.pending.take().ok_or(CrudError::NoPendingConfirmation)?;
        debug!(view = %self.id, action = %pending.action_key, row = %pending.row_id, "confirmation dismissed");
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Toggle one loaded row; returns whether it is selected afterwards.
    /// Fails with `AffordanceDisabled` when the table has no batch actions.
    pub fn toggle_row(&mut self, id: &RowId) -> CrudResult<bool> {
        self.ensure_enabled(self.selectable(), "selection")?;
        let row = self.row(id)?.clone();
        let selected = self.selection.toggle(id.clone(), &row);
        debug!(view = %self.id, row = %id, selected, count = self.selection.len(), "selection changed");
        Ok(selected)
    }

    /// Select or clear every loaded row. Selecting is a no-op on a table
    /// without batch actions.
    pub fn set_all_selected(&mut self, selected: bool) {
        if selected && !self.selectable() {
            warn!(view = %self.id, "select-all ignored, table has no batch actions");
            return;
        }
        if selected {
            for (id, row) in &self.rows {
                self.selection.select(id.clone(), row);
            }
        } else {
            self.selection.clear();
        }
        debug!(view = %self.id, count = self.selection.len(), "selection changed");
    }

    /// Whether every loaded row is selected
    pub fn is_all_selected(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|(id, _)| self.selection.contains(id))
    }

    /// Flip the select-all box; returns whether everything is selected afterwards
    pub fn toggle_all(&mut self) -> bool {
        let select = !self.is_all_selected();
        self.set_all_selected(select);
        self.is_all_selected()
    }

    /// Current selection
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    // ========================================================================
    // Batch actions
    // ========================================================================

    /// Batch triggers; empty while nothing is selected
    pub fn batch_triggers(&self) -> Vec<BatchTrigger> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        self.batch_actions
            .iter()
            .map(|a| BatchTrigger {
                key: a.key.clone(),
                label: a.label.clone(),
                count: self.selection.len(),
                permission: a.permission.clone(),
            })
            .collect()
    }

    /// Run a batch action over snapshots of the selected rows, then clear the
    /// selection whatever the handler returned
    pub fn run_batch_action(&mut self, key: &str) -> CrudResult<ActionOutcome> {
        self.ensure_no_prompt()?;
        let action = self
            .batch_actions
            .iter()
            .find(|a| a.key == key)
            .ok_or_else(|| CrudError::ActionNotFound(key.to_string()))?;
        if self.selection.is_empty() {
            return Err(CrudError::EmptySelection(key.to_string()));
        }

        let snapshots = self.selection.snapshots();
        info!(view = %self.id, action = key, rows = snapshots.len(), "batch action dispatched");
        let outcome = ActionOutcome::from_result(action.invoke(&snapshots));
        if let ActionOutcome::Failed(message) = &outcome {
            warn!(view = %self.id, action = key, error = %message, "batch action failed");
        }

        self.selection.clear();
        debug!(view = %self.id, "selection cleared after batch action");
        Ok(outcome)
    }

    // ========================================================================
    // Toolbar
    // ========================================================================

    fn ensure_enabled(&self, enabled: bool, affordance: &str) -> CrudResult<()> {
        if enabled {
            Ok(())
        } else {
            Err(CrudError::AffordanceDisabled(affordance.to_string()))
        }
    }

    /// Forward the keyword box text
    pub fn search(&mut self, text: &str) -> CrudResult<()> {
        self.ensure_enabled(self.config.toolbar.searchable, "search")?;
        self.search_text = text.to_string();
        info!(view = %self.id, "table search dispatched");
        if let Some(on_search) = self.callbacks.on_search.as_mut() {
            on_search(text);
        }
        Ok(())
    }

    /// Clearing the keyword box searches with empty text
    pub fn clear_search(&mut self) -> CrudResult<()> {
        self.search("")
    }

    /// Current keyword box text
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Set a toolbar or column filter and forward all current filters.
    ///
    /// Keys naming a column need that column to be filterable; any other key
    /// (e.g. `dateRange`) is a toolbar filter. An empty value drops the key.
    pub fn filter(&mut self, key: &str, value: Value) -> CrudResult<Record> {
        match self.columns.iter().find(|c| c.effective_key() == key) {
            Some(column) => self.ensure_enabled(column.filterable, key)?,
            None => self.ensure_enabled(self.config.toolbar.filterable, "filter")?,
        }

        if is_empty_filter(Some(&value)) {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value);
        }
        info!(view = %self.id, filter = key, "table filter dispatched");
        if let Some(on_filter) = self.callbacks.on_filter.as_mut() {
            on_filter(&self.filters);
        }
        Ok(self.filters.clone())
    }

    /// Current filters
    pub fn filters(&self) -> &Record {
        &self.filters
    }

    fn notify(&mut self, enabled: bool, intent: ActionIntent) -> CrudResult<()> {
        self.ensure_enabled(enabled, intent.key())?;
        info!(view = %self.id, %intent, "toolbar action dispatched");
        let handler = match intent {
            ActionIntent::Refresh => self.callbacks.on_refresh.as_mut(),
            ActionIntent::Create => self.callbacks.on_create.as_mut(),
            ActionIntent::Export => self.callbacks.on_export.as_mut(),
            _ => None,
        };
        if let Some(handler) = handler {
            handler();
        }
        Ok(())
    }

    /// Forward the refresh button
    pub fn refresh(&mut self) -> CrudResult<()> {
        self.notify(self.config.toolbar.refreshable, ActionIntent::Refresh)
    }

    /// Forward the create button
    pub fn create(&mut self) -> CrudResult<()> {
        self.notify(self.config.toolbar.creatable, ActionIntent::Create)
    }

    /// Forward the export button
    pub fn export(&mut self) -> CrudResult<()> {
        self.notify(self.config.toolbar.exportable, ActionIntent::Export)
    }

    /// Route a toolbar intent to its affordance
    pub fn dispatch(&mut self, intent: ActionIntent) -> CrudResult<()> {
        match intent {
            ActionIntent::Refresh => self.refresh(),
            ActionIntent::Create => self.create(),
            ActionIntent::Export => self.export(),
            other => Err(CrudError::ActionNotFound(other.key().to_string())),
        }
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// Cycle a sortable column: ascending, descending, unsorted
    pub fn sort(&mut self, column_key: &str) -> CrudResult<Option<SortDirection>> {
        let column = self
            .columns
            .iter()
            .find(|c| c.effective_key() == column_key)
            .ok_or_else(|| CrudError::ColumnNotFound(column_key.to_string()))?;
        if !column.sortable {
            return Err(CrudError::NotSortable(column_key.to_string()));
        }

        let next = match &self.sort {
            Some((key, SortDirection::Ascending)) if key == column_key => {
                Some(SortDirection::Descending)
            }
            Some((key, SortDirection::Descending)) if key == column_key => None,
            _ => Some(SortDirection::Ascending),
        };
        self.sort = next.map(|dir| (column_key.to_string(), dir));

        info!(view = %self.id, column = column_key, direction = ?next, "sort dispatched");
        if let Some(on_sort) = self.callbacks.on_sort.as_mut() {
            on_sort(column_key, next);
        }
        Ok(next)
    }

    /// Current sort column and direction
    pub fn sort_state(&self) -> Option<(&str, SortDirection)> {
        self.sort.as_ref().map(|(key, dir)| (key.as_str(), *dir))
    }

    // ========================================================================
    // Pagination / Loading
    // ========================================================================

    /// Host update of the pager echo
    pub fn set_pagination(&mut self, pagination: Option<Pagination>) {
        self.pagination = pagination;
    }

    /// Pager echo as last supplied by the host
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Forward a page or page-size change; the stored echo is left alone
    pub fn change_page(&mut self, current: u32, page_size: u32) {
        let change = PageChange { current, page_size };
        info!(view = %self.id, current, page_size, "page change dispatched");
        if let Some(on_page_change) = self.callbacks.on_page_change.as_mut() {
            on_page_change(change);
        }
    }

    /// Host update of the loading indicator
    pub fn set_loading(&mut self, loading: bool) {
        self.config.loading = loading;
    }

    /// Whether the loading indicator is shown
    pub fn loading(&self) -> bool {
        self.config.loading
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TableCallbacks;
    use crudkit_descriptor::{CommonActions, ToolbarConfig};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn users() -> Vec<Record> {
        vec![
            record(json!({"id": 1, "name": "Alice", "status": 1})),
            record(json!({"id": 2, "name": "Bob", "status": 0})),
            record(json!({"id": 3, "name": "Cy", "status": 1})),
        ]
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("Name", "name").sortable().filterable(),
            ColumnDescriptor::new("Status", "status").mapped([(json!(1), "Active"), (json!(0), "Disabled")]),
        ]
    }

    fn table(log: &Log, batch_fails: bool) -> TableController {
        let view_log = log.clone();
        let delete_log = log.clone();
        let batch_log = log.clone();
        let refresh_log = log.clone();
        let page_log = log.clone();

        let mut table = TableController::new(
            columns(),
            TableOptions {
                row_actions: vec![
                    CommonActions::view(move |row| {
                        view_log.borrow_mut().push(format!("view:{}", row["id"]));
                        Ok(())
                    }),
                    CommonActions::delete(move |row| {
                        delete_log.borrow_mut().push(format!("delete:{}", row["id"]));
                        Ok(())
                    }),
                ],
                batch_actions: vec![CommonActions::batch_delete(move |rows| {
                    batch_log.borrow_mut().push(format!("batch:{}", rows.len()));
                    anyhow::ensure!(!batch_fails, "server refused");
                    Ok(())
                })],
                pagination: Some(Pagination {
                    current: 1,
                    page_size: 10,
                    total: 3,
                }),
                callbacks: TableCallbacks::default()
                    .on_refresh(move || refresh_log.borrow_mut().push("refresh".into()))
                    .on_page_change(move |c| {
                        page_log
                            .borrow_mut()
                            .push(format!("page:{}:{}", c.current, c.page_size))
                    }),
                ..Default::default()
            },
        )
        .unwrap();
        table.set_rows(users()).unwrap();
        table
    }

    fn id(n: i64) -> RowId {
        RowId::new(n.to_string())
    }

    #[test]
    fn test_columns_with_actions_column() {
        let log = Log::default();
        let table = table(&log, false);
        let columns = table.columns();
        let keys: Vec<_> = columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "status", "actions"]);
        assert_eq!(columns[2].width, Some(160));
        assert_eq!(columns[2].role, ColumnRole::Actions);
    }

    #[test]
    fn test_no_actions_column_without_row_actions() {
        let table = TableController::new(columns(), TableOptions::default()).unwrap();
        assert_eq!(table.columns().len(), 2);
        assert!(!table.selectable());
    }

    #[test]
    fn test_render_rows() {
        let log = Log::default();
        let table = table(&log, false);
        let rows = table.render_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cells, vec!["Bob", "Disabled"]);
        assert_eq!(rows[1].actions.len(), 2);
        assert!(rows[1].actions[1].requires_confirmation);
    }

    #[test]
    fn test_unconfirmed_action_runs_immediately() {
        let log = Log::default();
        let mut table = table(&log, false);
        let outcome = table.trigger_row_action(&id(2), "view").unwrap();
        assert_eq!(outcome, ActionOutcome::Completed);
        assert_eq!(*log.borrow(), vec!["view:2"]);
    }

    #[test]
    fn test_dismiss_never_runs_handler() {
        let log = Log::default();
        let mut table = table(&log, false);

        let outcome = table.trigger_row_action(&id(1), "delete").unwrap();
        assert_eq!(outcome, ActionOutcome::AwaitingConfirmation);
        assert_eq!(table.pending_confirmation().unwrap().row_id, id(1));

        table.dismiss().unwrap();
        assert!(table.pending_confirmation().is_none());
        assert!(log.borrow().is_empty());
        assert!(matches!(table.confirm(), Err(CrudError::NoPendingConfirmation)));
    }

    #[test]
    fn test_confirm_runs_handler_once_with_original_row() {
        let log = Log::default();
        let mut table = table(&log, false);

        table.trigger_row_action(&id(3), "delete").unwrap();
        assert!(matches!(
            table.trigger_row_action(&id(1), "view"),
            Err(CrudError::ConfirmationPending(key)) if key == "delete"
        ));

        assert_eq!(table.confirm().unwrap(), ActionOutcome::Completed);
        assert_eq!(*log.borrow(), vec!["delete:3"]);
        assert!(table.confirm().is_err());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unknown_row_or_action() {
        let log = Log::default();
        let mut table = table(&log, false);
        assert!(matches!(
            table.trigger_row_action(&id(9), "view"),
            Err(CrudError::RowNotFound(_))
        ));
        assert!(matches!(
            table.trigger_row_action(&id(1), "archive"),
            Err(CrudError::ActionNotFound(_))
        ));
    }

    #[test]
    fn test_batch_action_clears_selection_on_success() {
        let log = Log::default();
        let mut table = table(&log, false);
        assert!(table.batch_triggers().is_empty());

        table.toggle_row(&id(1)).unwrap();
        table.toggle_row(&id(3)).unwrap();
        let triggers = table.batch_triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].text(), "Delete (2)");

        assert_eq!(table.run_batch_action("batch_delete").unwrap(), ActionOutcome::Completed);
        assert_eq!(*log.borrow(), vec!["batch:2"]);
        assert!(table.selection().is_empty());
    }

    #[test]
    fn test_batch_action_clears_selection_on_failure() {
        let log = Log::default();
        let mut table = table(&log, true);
        table.set_all_selected(true);
        assert_eq!(table.selection().len(), 3);

        let outcome = table.run_batch_action("batch_delete").unwrap();
        assert_eq!(outcome, ActionOutcome::Failed("server refused".into()));
        assert!(table.selection().is_empty());
        assert!(matches!(
            table.run_batch_action("batch_delete"),
            Err(CrudError::EmptySelection(_))
        ));
    }

    #[test]
    fn test_batch_handler_gets_snapshots() {
        let seen: Rc<RefCell<Vec<Record>>> = Rc::default();
        let sink = seen.clone();
        let mut table = TableController::new(
            columns(),
            TableOptions {
                batch_actions: vec![BatchActionDescriptor::new("export", "Export", move |rows| {
                    sink.borrow_mut().extend_from_slice(rows);
                    Ok(())
                })],
                ..Default::default()
            },
        )
        .unwrap();
        table.set_rows(users()).unwrap();
        table.toggle_row(&id(2)).unwrap();
        table.run_batch_action("export").unwrap();
        assert_eq!(*seen.borrow(), vec![users()[1].clone()]);
    }

    #[test]
    fn test_toggle_all() {
        let log = Log::default();
        let mut table = table(&log, false);
        table.toggle_row(&id(1)).unwrap();
        assert!(!table.is_all_selected());
        assert!(table.toggle_all());
        assert_eq!(table.selection().len(), 3);
        assert!(!table.toggle_all());
        assert!(table.selection().is_empty());
    }

    #[test]
    fn test_selection_requires_batch_actions() {
        let mut table = TableController::new(columns(), TableOptions::default()).unwrap();
        table.set_rows(users()).unwrap();
        assert!(!table.selectable());

        let err = table.toggle_row(&id(1)).unwrap_err();
        assert!(matches!(err, CrudError::AffordanceDisabled(ref a) if a == "selection"));
        table.set_all_selected(true);
        assert!(!table.toggle_all());
        assert!(table.selection().is_empty());
        assert!(table.batch_triggers().is_empty());
    }

    #[test]
    fn test_set_rows_drops_missing_selection() {
        let log = Log::default();
        let mut table = table(&log, false);
        table.toggle_row(&id(1)).unwrap();
        table.toggle_row(&id(2)).unwrap();

        table
            .set_rows(vec![
                record(json!({"id": 2, "name": "Bobby", "status": 0})),
                record(json!({"id": 4, "name": "Di", "status": 1})),
            ])
            .unwrap();

        assert_eq!(table.selection().len(), 1);
        assert!(table.selection().contains(&id(2)));
        assert_eq!(table.selection().snapshots()[0]["name"], json!("Bobby"));
    }

    #[test]
    fn test_set_rows_rejects_bad_ids() {
        let log = Log::default();
        let mut table = table(&log, false);
        let err = table
            .set_rows(vec![record(json!({"name": "no id"}))])
            .unwrap_err();
        assert!(matches!(err, CrudError::MissingRowId { index: 0, .. }));

        let err = table
            .set_rows(vec![record(json!({"id": 1})), record(json!({"id": 1}))])
            .unwrap_err();
        assert!(matches!(err, CrudError::DuplicateRowId(_)));
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_toolbar_forwarding_and_disabled() {
        let log = Log::default();
        let mut table = table(&log, false);
        table.refresh().unwrap();
        table.dispatch(ActionIntent::Refresh).unwrap();
        assert_eq!(*log.borrow(), vec!["refresh", "refresh"]);
        assert!(table.dispatch(ActionIntent::Delete).is_err());

        let mut locked = TableController::new(
            columns(),
            TableOptions {
                config: TableConfig {
                    toolbar: ToolbarConfig {
                        exportable: false,
                        ..Default::default()
                    },
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matches!(locked.export(), Err(CrudError::AffordanceDisabled(_))));
        assert!(locked.create().is_ok());
    }

    #[test]
    fn test_filters_accumulate() {
        let filters: Rc<RefCell<Vec<Value>>> = Rc::default();
        let sink = filters.clone();
        let mut table = TableController::new(
            columns(),
            TableOptions {
                callbacks: TableCallbacks::default()
                    .on_filter(move |f| sink.borrow_mut().push(Value::Object(f.clone()))),
                ..Default::default()
            },
        )
        .unwrap();

        table.filter("name", json!("al")).unwrap();
        table.filter("dateRange", json!(["2024-01-01", "2024-01-31"])).unwrap();
        assert!(matches!(
            table.filter("status", json!(1)),
            Err(CrudError::AffordanceDisabled(_))
        ));
        assert_eq!(
            filters.borrow().last(),
            Some(&json!({"name": "al", "dateRange": ["2024-01-01", "2024-01-31"]}))
        );

        let current = table.filter("name", json!("")).unwrap();
        assert_eq!(
            Value::Object(current),
            json!({"dateRange": ["2024-01-01", "2024-01-31"]})
        );
    }

    #[test]
    fn test_search_and_clear() {
        let texts: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = texts.clone();
        let mut table = TableController::new(
            columns(),
            TableOptions {
                callbacks: TableCallbacks::default()
                    .on_search(move |t| sink.borrow_mut().push(t.to_string())),
                ..Default::default()
            },
        )
        .unwrap();
        table.search("ali").unwrap();
        table.clear_search().unwrap();
        assert_eq!(*texts.borrow(), vec!["ali", ""]);
        assert_eq!(table.search_text(), "");
    }

    #[test]
    fn test_sort_cycle() {
        let sorts: Rc<RefCell<Vec<Option<SortDirection>>>> = Rc::default();
        let sink = sorts.clone();
        let mut table = TableController::new(
            columns(),
            TableOptions {
                callbacks: TableCallbacks::default()
                    .on_sort(move |_, dir| sink.borrow_mut().push(dir)),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(table.sort("name").unwrap(), Some(SortDirection::Ascending));
        assert_eq!(table.columns()[0].sort, Some(SortDirection::Ascending));
        assert_eq!(table.sort("name").unwrap(), Some(SortDirection::Descending));
        assert_eq!(table.sort("name").unwrap(), None);
        assert_eq!(table.sort_state(), None);
        assert_eq!(sorts.borrow().len(), 3);

        assert!(matches!(table.sort("status"), Err(CrudError::NotSortable(_))));
        assert!(matches!(table.sort("nope"), Err(CrudError::ColumnNotFound(_))));
    }

    #[test]
    fn test_page_change_forwarded_verbatim() {
        let log = Log::default();
        let mut table = table(&log, false);
        table.change_page(2, 20);
        assert_eq!(*log.borrow(), vec!["page:2:20"]);
        assert_eq!(table.pagination().unwrap().current, 1);

        table.set_pagination(Some(Pagination {
            current: 2,
            page_size: 20,
            total: 3,
        }));
        assert_eq!(table.pagination().unwrap().page_size, 20);
    }

    #[test]
    fn test_duplicate_column_keys_fail_fast() {
        let result = TableController::new(
            vec![ColumnDescriptor::new("A", "a"), ColumnDescriptor::new("B", "a")],
            TableOptions::default(),
        );
        assert!(matches!(result, Err(CrudError::DuplicateColumn(_))));
    }

    proptest! {
        #[test]
        fn prop_batch_action_always_clears_selection(
            picks in proptest::collection::vec(any::<bool>(), 3),
            fails in any::<bool>(),
        ) {
            let log = Log::default();
            let mut table = table(&log, fails);
            for (n, pick) in picks.iter().enumerate() {
                if *pick {
                    table.toggle_row(&id(n as i64 + 1)).unwrap();
                }
            }
            let count = picks.iter().filter(|p| **p).count();
            prop_assert_eq!(table.selection().len(), count);

            let result = table.run_batch_action("batch_delete");
            prop_assert!(table.selection().is_empty());
            if count == 0 {
                prop_assert!(matches!(result, Err(CrudError::EmptySelection(_))));
                prop_assert!(log.borrow().is_empty());
            } else {
                let outcome = result.unwrap();
                prop_assert_eq!(matches!(outcome, ActionOutcome::Failed(_)), fails);
                prop_assert_eq!(log.borrow().clone(), vec![format!("batch:{}", count)]);
            }
        }
    }
}
