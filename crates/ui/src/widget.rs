//! Widget capability contract
//!
//! Controllers never build widgets themselves. For every visible field they
//! issue a `WidgetRequest` and a `WidgetRegistry` resolves it to exactly one
//! render strategy, chosen by the field's kind. A toolkit is a registry with
//! a strategy for every kind; adding a kind is one more `register` call.

use crudkit_core::{CrudError, CrudResult, FieldPath, GridSpan, Value};
use crudkit_descriptor::{FieldDescriptor, FieldKind};
use std::collections::HashMap;

/// Request to render one field bound to its current value
pub struct WidgetRequest<'a, S: ?Sized = ()> {
    pub field: &'a FieldDescriptor,
    pub value: Option<&'a Value>,
    /// Current validation error
    pub error: Option<&'a str>,
    pub disabled: bool,
    /// Toolkit-specific change sink
    pub on_change: &'a S,
}

impl<S: ?Sized> WidgetRequest<'_, S> {
    /// Label followed by a marker when the field is required
    pub fn label(&self) -> String {
        let mut label = self.field.display_label();
        if self.field.required || self.field.rules.iter().any(|r| r.is_required()) {
            label.push('*');
        }
        label
    }
}

/// A render strategy for one field kind
pub type RenderStrategy<O, S> = Box<dyn Fn(&WidgetRequest<'_, S>) -> O>;

/// Maps each field kind to one render strategy
pub struct WidgetRegistry<O, S: ?Sized = ()> {
    strategies: HashMap<FieldKind, RenderStrategy<O, S>>,
}

impl<O, S: ?Sized> Default for WidgetRegistry<O, S> {
    fn default() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }
}

impl<O, S: ?Sized> WidgetRegistry<O, S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the strategy for `kind`, replacing any previous one
    pub fn register(
        &mut self,
        kind: FieldKind,
        strategy: impl Fn(&WidgetRequest<'_, S>) -> O + 'static,
    ) -> &mut Self {
        self.strategies.insert(kind, Box::new(strategy));
        self
    }

    /// Builder form of [`WidgetRegistry::register`]
    pub fn with(
        mut self,
        kind: FieldKind,
        strategy: impl Fn(&WidgetRequest<'_, S>) -> O + 'static,
    ) -> Self {
        self.register(kind, strategy);
        self
    }

    /// Whether `kind` has a strategy
    pub fn supports(&self, kind: FieldKind) -> bool {
        self.strategies.contains_key(&kind)
    }

    /// Kinds without a strategy
    pub fn missing_kinds(&self) -> Vec<FieldKind> {
        FieldKind::ALL
            .into_iter()
            .filter(|kind| !self.supports(*kind))
            .collect()
    }

    /// Resolve and run the strategy for the request's kind
    pub fn render(&self, request: &WidgetRequest<'_, S>) -> CrudResult<O> {
        let strategy = self
            .strategies
            .get(&request.field.kind)
            .ok_or_else(|| CrudError::UnregisteredWidget(request.field.kind.to_string()))?;
        Ok(strategy(request))
    }
}

/// One rendered field, placed on the grid
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField<O> {
    pub name: FieldPath,
    pub span: GridSpan,
    pub output: O,
}

// ============================================================================
// Tests
// ============================================================================
