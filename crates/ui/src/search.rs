//! Search panel controller
//!
//! A collapsible filter bar over search field descriptors. Values of fields
//! hidden by collapsing stay in [`SearchState`] and are still part of the
//! next search payload.

use crate::dispatch::SearchCallbacks;
use crate::layout::pack_rows;
use crate::state::SearchState;
use crate::widget::{RenderedField, WidgetRegistry, WidgetRequest};
use crudkit_core::{CrudError, CrudResult, FieldPath, Record, Value};
use crudkit_descriptor::{
    FieldDescriptor, SearchFieldDescriptor, SearchFieldKind, SearchPanelConfig,
    validate_search_fields,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Construction options of a search panel
#[derive(Default)]
pub struct SearchOptions {
    pub config: SearchPanelConfig,
    pub callbacks: SearchCallbacks,
}

/// Search panel view controller
pub struct SearchPanelController {
    id: Uuid,
    fields: Vec<SearchFieldDescriptor>,
    /// Form-field equivalents, rendered through the widget registry
    widgets: Vec<FieldDescriptor>,
    config: SearchPanelConfig,
    state: SearchState,
    callbacks: SearchCallbacks,
}

impl SearchPanelController {
    /// Create a panel; fails on descriptor-contract violations
    pub fn new(fields: Vec<SearchFieldDescriptor>, options: SearchOptions) -> CrudResult<Self> {
        validate_search_fields(&fields)?;
        if let Some(keyword) = &options.config.keyword_field
            && !fields.iter().any(|f| &f.name == keyword)
        {
            return Err(CrudError::invalid_descriptor(
                keyword,
                "keyword field is not one of the search fields",
            ));
        }

        let id = Uuid::new_v4();
        let widgets = fields.iter().map(|f| f.to_field_descriptor()).collect();
        debug!(view = %id, fields = fields.len(), "search panel created");

        Ok(Self {
            id,
            fields,
            widgets,
            state: SearchState::new(options.config.collapse),
            config: options.config,
            callbacks: options.callbacks,
        })
    }

    /// View instance id, included in log events
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Panel options
    pub fn config(&self) -> &SearchPanelConfig {
        &self.config
    }

    /// All filter descriptors
    pub fn fields(&self) -> &[SearchFieldDescriptor] {
        &self.fields
    }

    fn field(&self, name: &str) -> CrudResult<&SearchFieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| CrudError::FieldNotFound(name.to_string()))
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Set a filter value, visible or not
    pub fn set_value(&mut self, name: &str, value: Value) -> CrudResult<()> {
        self.field(name)?;
        self.state.set(name, value);
        debug!(view = %self.id, field = name, "filter changed");
        Ok(())
    }

    /// Current value of a filter
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.state.value(name)
    }

    /// All filter values, untrimmed
    pub fn values(&self) -> &Record {
        self.state.values()
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    fn hides_fields(&self) -> bool {
        self.config.show_collapse && self.fields.len() > self.config.max_visible
    }

    /// Whether the expand/collapse toggle is offered
    pub fn collapse_toggle_visible(&self) -> bool {
        self.hides_fields()
    }

    /// Current collapse flag
    pub fn collapsed(&self) -> bool {
        self.state.collapsed()
    }

    /// Fields that render right now, in descriptor order
    pub fn visible_fields(&self) -> &[SearchFieldDescriptor] {
        if self.collapsed() && self.hides_fields() {
            &self.fields[..self.config.max_visible]
        } else {
            &self.fields
        }
    }

    /// Whether a filter renders right now
    pub fn is_visible(&self, name: &str) -> bool {
        self.visible_fields().iter().any(|f| f.name == name)
    }

    /// Flip the collapse flag; returns false when the host owns it
    pub fn toggle_collapsed(&mut self) -> bool {
        let changed = self.state.toggle_collapsed();
        if changed {
            debug!(view = %self.id, collapsed = self.collapsed(), "collapse toggled");
        } else {
            warn!(view = %self.id, "collapse toggle ignored: collapse is controlled");
        }
        changed
    }

    /// Host update of a controlled collapse flag
    pub fn set_collapsed(&mut self, collapsed: bool) -> bool {
        let changed = self.state.set_collapsed(collapsed);
        if !changed {
            warn!(view = %self.id, "set_collapsed ignored: collapse is uncontrolled");
        }
        changed
    }

    // ========================================================================
    // Search / Reset
    // ========================================================================

    fn emit_search(&mut self, filters: &Record) {
        info!(view = %self.id, filters = filters.len(), "search dispatched");
        if let Some(on_search) = self.callbacks.on_search.as_mut() {
            on_search(filters);
        }
    }

    /// Dispatch every non-empty value; `None` while loading
    pub fn search(&mut self) -> Option<Record> {
        if self.config.loading {
            warn!(view = %self.id, "search ignored while loading");
            return None;
        }
        let filters = self.state.trimmed();
        self.emit_search(&filters);
        Some(filters)
    }

    /// The filter the keyword clear affordance targets
    pub fn keyword_field(&self) -> Option<&str> {
        if let Some(name) = &self.config.keyword_field {
            return Some(name.as_str());
        }
        self.fields
            .iter()
            .find(|f| f.name == "keyword")
            .or_else(|| self.fields.iter().find(|f| f.kind == SearchFieldKind::Text))
            .map(|f| f.name.as_str())
    }

    /// Clear the keyword and search right away with what remains
    pub fn clear_keyword(&mut self) -> CrudResult<Record> {
        let name = self
            .keyword_field()
            .map(str::to_string)
            .ok_or_else(|| CrudError::FieldNotFound("keyword".to_string()))?;

        self.state.remove(&name);
        debug!(view = %self.id, field = %name, "keyword cleared");

        let filters = self.state.trimmed();
        self.emit_search(&filters);
        Ok(filters)
    }

    /// Clear everything, notify `on_reset`, then search with no filters
    pub fn reset(&mut self) {
        self.state.clear();
        debug!(view = %self.id, "filters reset");
        if let Some(on_reset) = self.callbacks.on_reset.as_mut() {
            on_reset();
        }
        self.emit_search(&Record::new());
    }

    /// Disable or enable the search trigger
    pub fn set_loading(&mut self, loading: bool) {
        self.config.loading = loading;
    }

    /// Whether the search trigger is disabled
    pub fn loading(&self) -> bool {
        self.config.loading
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// One widget request per visible filter
    pub fn render<O, S>(
        &self,
        registry: &WidgetRegistry<O, S>,
        mut sink_for: impl FnMut(&FieldPath) -> S,
    ) -> CrudResult<Vec<RenderedField<O>>> {
        let visible = self.visible_fields().len();
        self.widgets[..visible]
            .iter()
            .map(|field| {
                let sink = sink_for(&field.name);
                let request = WidgetRequest {
                    field,
                    value: self.state.value(&field.name.dotted()),
                    error: None,
                    disabled: false,
                    on_change: &sink,
                };
                Ok(RenderedField {
                    name: field.name.clone(),
                    span: field.span,
                    output: registry.render(&request)?,
                })
            })
            .collect()
    }

    /// Visible filters packed into grid rows
    pub fn layout(&self) -> Vec<Vec<&SearchFieldDescriptor>> {
        pack_rows(self.visible_fields().iter().map(|f| (f.span, f)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crudkit_core::Control;
    use crudkit_descriptor::FieldOption;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        searches: Vec<Value>,
        resets: usize,
        order: Vec<&'static str>,
    }

    fn status() -> SearchFieldDescriptor {
        SearchFieldDescriptor::select("status", "Status", [FieldOption::new("Active", 1)])
    }

    fn role() -> SearchFieldDescriptor {
        SearchFieldDescriptor::select("role", "Role", [FieldOption::new("Admin", "admin")])
    }

    fn panel(
        fields: Vec<SearchFieldDescriptor>,
        config: SearchPanelConfig,
        calls: &Rc<RefCell<Calls>>,
    ) -> SearchPanelController {
        let searched = calls.clone();
        let reset = calls.clone();
        SearchPanelController::new(
            fields,
            SearchOptions {
                config,
                callbacks: SearchCallbacks::default()
                    .on_search(move |f| {
                        let mut calls = searched.borrow_mut();
                        calls.searches.push(Value::Object(f.clone()));
                        calls.order.push("search");
                    })
                    .on_reset(move || {
                        let mut calls = reset.borrow_mut();
                        calls.resets += 1;
                        calls.order.push("reset");
                    }),
            },
        )
        .unwrap()
    }

    fn four_fields() -> Vec<SearchFieldDescriptor> {
        vec![
            SearchFieldDescriptor::text("keyword", "Keyword"),
            status(),
            role(),
            SearchFieldDescriptor::date_range("dateRange", "Created"),
        ]
    }

    #[test]
    fn test_three_fields_at_threshold() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut panel = panel(
            vec![SearchFieldDescriptor::text("keyword", "Keyword"), status(), role()],
            SearchPanelConfig::default(),
            &calls,
        );

        assert!(!panel.collapse_toggle_visible());
        assert_eq!(panel.visible_fields().len(), 3);
        panel.toggle_collapsed();
        assert_eq!(panel.visible_fields().len(), 3);

        panel.set_value("keyword", json!("alice")).unwrap();
        panel.set_value("status", json!("")).unwrap();
        let payload = panel.search().unwrap();

        assert_eq!(Value::Object(payload), json!({"keyword": "alice"}));
        assert_eq!(calls.borrow().searches, vec![json!({"keyword": "alice"})]);
    }

    #[test]
    fn test_collapsed_hides_but_keeps_values() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut panel = panel(four_fields(), SearchPanelConfig::default(), &calls);

        assert!(panel.collapsed());
        assert!(panel.collapse_toggle_visible());
        panel.set_value("dateRange", json!(["2024-01-01", "2024-01-31"])).unwrap();
        assert!(!panel.is_visible("dateRange"));
        assert!(panel.is_visible("role"));

        let payload = panel.search().unwrap();
        assert_eq!(payload.get("dateRange"), Some(&json!(["2024-01-01", "2024-01-31"])));

        assert!(panel.toggle_collapsed());
        assert!(panel.is_visible("dateRange"));
        assert_eq!(panel.value("dateRange"), Some(&json!(["2024-01-01", "2024-01-31"])));
    }

    #[test]
    fn test_no_collapse_toggle_shows_all() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let config = SearchPanelConfig {
            show_collapse: false,
            ..Default::default()
        };
        let panel = panel(four_fields(), config, &calls);
        assert!(!panel.collapse_toggle_visible());
        assert_eq!(panel.visible_fields().len(), 4);
    }

    #[test]
    fn test_controlled_collapse_ignores_toggle() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let config = SearchPanelConfig {
            collapse: Control::Controlled(true),
            ..Default::default()
        };
        let mut panel = panel(four_fields(), config, &calls);

        assert!(!panel.toggle_collapsed());
        assert!(panel.collapsed());
        assert!(panel.set_collapsed(false));
        assert_eq!(panel.visible_fields().len(), 4);
    }

    #[test]
    fn test_reset_order() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut panel = panel(four_fields(), SearchPanelConfig::default(), &calls);
        panel.set_value("keyword", json!("bob")).unwrap();

        panel.reset();
        let calls = calls.borrow();
        assert_eq!(calls.resets, 1);
        assert_eq!(calls.order, vec!["reset", "search"]);
        assert_eq!(calls.searches, vec![json!({})]);
        assert!(panel.values().is_empty());
    }

    #[test]
    fn test_clear_keyword_searches_immediately() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut panel = panel(four_fields(), SearchPanelConfig::default(), &calls);
        panel.set_value("keyword", json!("bob")).unwrap();
        panel.set_value("status", json!(1)).unwrap();

        let payload = panel.clear_keyword().unwrap();
        assert_eq!(Value::Object(payload), json!({"status": 1}));
        assert_eq!(calls.borrow().searches.len(), 1);
        assert_eq!(panel.value("keyword"), None);
    }

    #[test]
    fn test_keyword_field_fallbacks() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let panel_a = panel(
            vec![status(), SearchFieldDescriptor::text("q", "Query")],
            SearchPanelConfig::default(),
            &calls,
        );
        assert_eq!(panel_a.keyword_field(), Some("q"));

        let mut panel_b = panel(vec![status()], SearchPanelConfig::default(), &calls);
        assert!(panel_b.clear_keyword().is_err());

        let bad = SearchPanelController::new(
            vec![status()],
            SearchOptions {
                config: SearchPanelConfig {
                    keyword_field: Some("missing".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_loading_suppresses_search() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut panel = panel(four_fields(), SearchPanelConfig::default(), &calls);
        panel.set_loading(true);
        assert_eq!(panel.search(), None);
        assert!(calls.borrow().searches.is_empty());
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut panel = panel(four_fields(), SearchPanelConfig::default(), &calls);
        assert!(matches!(
            panel.set_value("nope", json!(1)),
            Err(CrudError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_render_visible_only() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let panel = panel(four_fields(), SearchPanelConfig::default(), &calls);
        let registry = crate::text::TextToolkit::registry();
        let rendered = panel.render(&registry, |_| ()).unwrap();
        assert_eq!(rendered.len(), 3);
        assert_eq!(panel.layout().len(), 1);
    }

    fn filter_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            Just(json!("")),
            "[a-z ]{1,8}".prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_search_sends_only_non_empty_values(
            values in proptest::collection::vec(filter_value(), 4),
        ) {
            let calls = Rc::new(RefCell::new(Calls::default()));
            let mut panel = panel(four_fields(), SearchPanelConfig::default(), &calls);
            let names = ["keyword", "status", "role", "dateRange"];
            for (name, value) in names.iter().zip(&values) {
                panel.set_value(name, value.clone()).unwrap();
            }

            let payload = panel.search().unwrap();
            let expected: Record = names
                .iter()
                .zip(&values)
                .filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect();
            prop_assert_eq!(&payload, &expected);
            prop_assert_eq!(calls.borrow().searches.clone(), vec![Value::Object(expected)]);
            prop_assert_eq!(panel.values().len(), 4);
        }
    }
}
