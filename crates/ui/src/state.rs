//! Controller-local state records
//!
//! Each view owns exactly one of these records. They hold no descriptors and
//! fire no callbacks; the controllers drive them through the transition
//! methods below.

use crudkit_core::{Control, FieldPath, Record, RowId, Value, is_empty_filter};
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// Form State
// ============================================================================

/// Current values and validation errors of a form
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// Nested value object
    values: Value,
    /// Current error per field path; absent when valid
    errors: BTreeMap<FieldPath, String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl FormState {
    /// Create a state seeded with `initial`; non-object values seed an empty form
    pub fn new(initial: Value) -> Self {
        let values = if initial.is_object() {
            initial
        } else {
            Value::Object(Default::default())
        };
        Self {
            values,
            errors: BTreeMap::new(),
        }
    }

    /// Whole value object
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Value at `path`
    pub fn value(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.values)
    }

    /// Store a value; returns false when it equals the current one
    pub fn set(&mut self, path: &FieldPath, value: Value) -> bool {
        if self.value(path) == Some(&value) {
            return false;
        }
        path.insert(&mut self.values, value);
        true
    }

    /// Current error at `path`
    pub fn error(&self, path: &FieldPath) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// All current errors
    pub fn errors(&self) -> &BTreeMap<FieldPath, String> {
        &self.errors
    }

    /// Record or clear the error at `path`
    pub fn set_error(&mut self, path: &FieldPath, error: Option<String>) {
        match error {
            Some(message) => {
                self.errors.insert(path.clone(), message);
            }
            None => {
                self.errors.remove(path);
            }
        }
    }

    /// Drop every error
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Drop errors of paths `keep` rejects
    pub fn retain_errors(&mut self, keep: impl Fn(&FieldPath) -> bool) {
        self.errors.retain(|path, _| keep(path));
    }

    /// Whether there are no errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// Search State
// ============================================================================

/// Filter values and collapse flag of a search panel
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    values: Record,
    collapsed: Control<bool>,
}

impl SearchState {
    /// Create an empty state with the given collapse ownership
    pub fn new(collapsed: Control<bool>) -> Self {
        Self {
            values: Record::new(),
            collapsed,
        }
    }

    /// All values, including those of fields currently hidden by collapse
    pub fn values(&self) -> &Record {
        &self.values
    }

    /// Value of one filter
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Store a filter value
    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Clear one filter; returns whether it held a value
    pub fn remove(&mut self, name: &str) -> bool {
        self.values.remove(name).is_some()
    }

    /// Clear every filter
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Values with absent, null and empty-string entries dropped
    pub fn trimmed(&self) -> Record {
        self.values
            .iter()
            .filter(|(_, v)| !is_empty_filter(Some(*v)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Current collapse flag
    pub fn collapsed(&self) -> bool {
        self.collapsed.get()
    }

    /// Whether the host owns the collapse flag
    pub fn is_collapse_controlled(&self) -> bool {
        self.collapsed.is_controlled()
    }

    /// Flip the flag; no-op when the host owns it
    pub fn toggle_collapsed(&mut self) -> bool {
        let next = !self.collapsed.get();
        self.collapsed.update_internal(next)
    }

    /// Host update; no-op when the panel owns the flag
    pub fn set_collapsed(&mut self, collapsed: bool) -> bool {
        self.collapsed.update_from_host(collapsed)
    }
}

// ============================================================================
// Selection State
// ============================================================================

/// Selected row identifiers plus snapshots of the selected rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    ids: HashSet<RowId>,
    /// Snapshots in selection order
    rows: Vec<(RowId, Record)>,
}

impl SelectionState {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a row is selected
    pub fn contains(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add a row; no-op when already selected
    pub fn select(&mut self, id: RowId, row: &Record) {
        if self.ids.insert(id.clone()) {
            self.rows.push((id, row.clone()));
        }
    }

    /// Remove a row
    pub fn deselect(&mut self, id: &RowId) {
        if self.ids.remove(id) {
            self.rows.retain(|(selected, _)| selected != id);
        }
    }

    /// Toggle a row; returns whether it is selected afterwards
    pub fn toggle(&mut self, id: RowId, row: &Record) -> bool {
        if self.contains(&id) {
            self.deselect(&id);
            false
        } else {
            self.select(id, row);
            true
        }
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.ids.clear();
        self.rows.clear();
    }

    /// Selected identifiers in selection order
    pub fn ids(&self) -> impl Iterator<Item = &RowId> {
        self.rows.iter().map(|(id, _)| id)
    }

    /// Snapshots of the selected rows, in selection order
    pub fn snapshots(&self) -> Vec<Record> {
        self.rows.iter().map(|(_, row)| row.clone()).collect()
    }

    /// Keep only rows still present in `loaded`, refreshing their snapshots.
    /// Returns how many selected rows were dropped.
    pub fn retain_loaded<'a>(
        &mut self,
        loaded: impl IntoIterator<Item = (&'a RowId, &'a Record)>,
    ) -> usize {
        let loaded: BTreeMap<&RowId, &Record> = loaded.into_iter().collect();
        let before = self.ids.len();

        self.rows.retain_mut(|(id, row)| match loaded.get(&*id) {
            Some(fresh) => {
                *row = (*fresh).clone();
                true
            }
            None => false,
        });
        self.ids = self.rows.iter().map(|(id, _)| id.clone()).collect();

        before - self.ids.len()
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

    fn row(id: i64, name: &str) -> Record {
        serde_json::from_value(json!({"id": id, "name": name})).unwrap()
    }

    #[test]
    fn test_form_state_set_and_errors() {
        let mut state = FormState::new(json!({"name": "Al"}));
        let name = FieldPath::new("name");
        let nested = FieldPath::new("settings.email");

        assert!(!state.set(&name, json!("Al")));
        assert!(state.set(&nested, json!(true)));
        assert_eq!(state.values(), &json!({"name": "Al", "settings": {"email": true}}));

        state.set_error(&name, Some("too short".into()));
        assert_eq!(state.error(&name), Some("too short"));
        assert!(!state.is_valid());
        state.set_error(&name, None);
        assert!(state.is_valid());
    }

    #[test]
    fn test_form_state_rejects_non_object_seed() {
        assert_eq!(FormState::new(json!(3)).values(), &json!({}));
    }

    #[test]
    fn test_search_state_trimmed() {
        let mut state = SearchState::new(Control::Uncontrolled(true));
        state.set("keyword", json!("alice"));
        state.set("status", json!(""));
        state.set("role", json!(null));
        state.set("tags", json!([]));

        let trimmed = state.trimmed();
        assert_eq!(
            Value::Object(trimmed),
            json!({"keyword": "alice", "tags": []})
        );
        assert_eq!(state.values().len(), 4);
    }

    #[test]
    fn test_search_state_collapse_modes() {
        let mut owned = SearchState::new(Control::Uncontrolled(true));
        assert!(owned.toggle_collapsed());
        assert!(!owned.collapsed());
        assert!(!owned.set_collapsed(true));

        let mut pinned = SearchState::new(Control::Controlled(true));
        assert!(!pinned.toggle_collapsed());
        assert!(pinned.collapsed());
        assert!(pinned.set_collapsed(false));
        assert!(!pinned.collapsed());
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = SelectionState::new();
        let a = row(1, "a");
        let b = row(2, "b");

        assert!(selection.toggle(RowId::new("1"), &a));
        assert!(selection.toggle(RowId::new("2"), &b));
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.snapshots(), vec![a.clone(), b.clone()]);

        assert!(!selection.toggle(RowId::new("1"), &a));
        assert_eq!(selection.snapshots(), vec![b]);
        assert!(!selection.contains(&RowId::new("1")));
    }

    #[test]
    fn test_selection_retain_loaded() {
        let mut selection = SelectionState::new();
        selection.select(RowId::new("1"), &row(1, "old"));
        selection.select(RowId::new("2"), &row(2, "b"));

        let fresh = row(1, "new");
        let id = RowId::new("1");
        let dropped = selection.retain_loaded([(&id, &fresh)]);

        assert_eq!(dropped, 1);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.snapshots(), vec![fresh]);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![&id]);
    }
}
