//! Form renderer
//!
//! Turns an ordered list of field descriptors into a validated input surface.
//! The renderer owns a [`FormState`] and exposes the transitions a form view
//! needs: value changes with dependent re-validation, submit, reset and the
//! loading gate.

use crate::dispatch::{ErrorInfo, FieldError, FormCallbacks};
use crate::layout::pack_rows;
use crate::state::FormState;
use crate::widget::{RenderedField, WidgetRegistry, WidgetRequest};
use crudkit_core::{CrudError, CrudResult, FieldPath, Value};
use crudkit_descriptor::{FieldDescriptor, FormConfig, validate_fields};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Construction options of a form
#[derive(Default)]
pub struct FormOptions {
    pub config: FormConfig,
    /// Initial values; also what `reset` restores
    pub initial_values: Option<Value>,
    pub callbacks: FormCallbacks,
}

/// What a submit attempt did
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Every visible field passed; `on_finish` got these values
    Submitted(Value),
    /// At least one field failed; `on_finish_failed` got this payload
    Rejected(ErrorInfo),
    /// The loading flag blocked the attempt; no callback ran
    Suppressed,
}

/// Form view controller
pub struct FormRenderer {
    id: Uuid,
    fields: Vec<FieldDescriptor>,
    config: FormConfig,
    initial: Value,
    state: FormState,
    callbacks: FormCallbacks,
}

impl FormRenderer {
    /// Create a form; fails on descriptor-contract violations
    pub fn new(fields: Vec<FieldDescriptor>, options: FormOptions) -> CrudResult<Self> {
        validate_fields(&fields)?;

        let initial = options
            .initial_values
            .unwrap_or_else(|| Value::Object(Default::default()));
        let id = Uuid::new_v4();
        debug!(view = %id, fields = fields.len(), "form created");

        Ok(Self {
            id,
            fields,
            config: options.config,
            state: FormState::new(initial.clone()),
            initial,
            callbacks: options.callbacks,
        })
    }

    /// View instance id, included in log events
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Form options
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// All descriptors, hidden ones included
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Replace the descriptor list for a new render pass; values are kept
    pub fn set_fields(&mut self, fields: Vec<FieldDescriptor>) -> CrudResult<()> {
        validate_fields(&fields)?;
        self.fields = fields;

        let visible: Vec<FieldPath> = self.visible_fields().map(|f| f.name.clone()).collect();
        self.state.retain_errors(|path| visible.contains(path));
        debug!(view = %self.id, fields = self.fields.len(), "form fields replaced");
        Ok(())
    }

    /// Data fields that render and validate
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.hidden)
    }

    fn data_field(&self, path: &FieldPath) -> CrudResult<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.carries_data() && &f.name == path)
            .ok_or_else(|| CrudError::FieldNotFound(path.dotted()))
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Replace the initial values and reset the form to them
    pub fn set_initial_values(&mut self, values: Value) {
        self.initial = values;
        self.reset();
    }

    /// Set one field's value.
    ///
    /// Validates the field itself, then every visible field that lists it in
    /// `depends_on`. Returns the re-validated paths; an unchanged value
    /// validates nothing.
    pub fn set_value(&mut self, path: &FieldPath, value: Value) -> CrudResult<Vec<FieldPath>> {
        let field_hidden = self.data_field(path)?.hidden;

        if !self.state.set(path, value) {
            return Ok(Vec::new());
        }
        debug!(view = %self.id, field = %path, "value changed");

        let mut targets = Vec::new();
        if !field_hidden {
            targets.push(path.clone());
        }
        targets.extend(
            self.visible_fields()
                .filter(|f| f.carries_data() && &f.name != path && f.depends_on.contains(path))
                .map(|f| f.name.clone()),
        );

        for target in &targets {
            self.validate_field(target)?;
        }
        Ok(targets)
    }

    /// Current value of a field
    pub fn value(&self, path: &FieldPath) -> Option<&Value> {
        self.state.value(path)
    }

    /// The whole value object, hidden fields included
    pub fn values(&self) -> &Value {
        self.state.values()
    }

    /// Values that a submit would send: visible data fields that were set,
    /// nested per path
    pub fn submit_values(&self) -> Value {
        let mut out = Value::Object(Default::default());
        for field in self.visible_fields().filter(|f| f.carries_data()) {
            if let Some(value) = self.state.value(&field.name) {
                field.name.insert(&mut out, value.clone());
            }
        }
        out
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// First failing rule's message for `field`
    fn check(&self, field: &FieldDescriptor) -> Option<String> {
        let value = self.state.value(&field.name);
        field
            .effective_rules()
            .iter()
            .find_map(|rule| rule.check(value, self.state.values()).err())
    }

    /// Validate one field and store the result
    pub fn validate_field(&mut self, path: &FieldPath) -> CrudResult<Option<String>> {
        let field = self.data_field(path)?;
        let error = if field.hidden { None } else { self.check(field) };
        self.state.set_error(path, error.clone());
        Ok(error)
    }

    /// Current error of a field
    pub fn error(&self, path: &FieldPath) -> Option<&str> {
        self.state.error(path)
    }

    /// Every field with a current error, in descriptor order
    pub fn errors(&self) -> Vec<FieldError> {
        self.fields
            .iter()
            .filter_map(|f| {
                self.state.error(&f.name).map(|e| FieldError {
                    name: f.name.clone(),
                    errors: vec![e.to_string()],
                })
            })
            .collect()
    }

    // ========================================================================
    // Submit / Reset
    // ========================================================================

    /// Validate every visible field and dispatch the result
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.submit_enabled() {
            warn!(view = %self.id, "submit ignored while loading");
            return SubmitOutcome::Suppressed;
        }

        let results: Vec<(FieldPath, Option<String>)> = self
            .visible_fields()
            .filter(|f| f.carries_data())
            .map(|f| (f.name.clone(), self.check(f)))
            .collect();

        self.state.clear_errors();
        let mut error_fields = Vec::new();
        for (path, error) in results {
            if let Some(message) = error {
                self.state.set_error(&path, Some(message.clone()));
                error_fields.push(FieldError {
                    name: path,
                    errors: vec![message],
                });
            }
        }

        if error_fields.is_empty() {
            let values = self.submit_values();
            info!(view = %self.id, "form submitted");
            if let Some(on_finish) = self.callbacks.on_finish.as_mut() {
                on_finish(&values);
            }
            if self.config.loading.update_internal(true) {
                debug!(view = %self.id, "form pending");
            }
            SubmitOutcome::Submitted(values)
        } else {
            let info = ErrorInfo {
                values: self.state.values().clone(),
                error_fields,
            };
            info!(view = %self.id, failed = info.error_fields.len(), "form rejected");
            if let Some(on_finish_failed) = self.callbacks.on_finish_failed.as_mut() {
                on_finish_failed(&info);
            }
            SubmitOutcome::Rejected(info)
        }
    }

    /// Restore the initial values and clear errors; fires no callback
    pub fn reset(&mut self) {
        self.state = FormState::new(self.initial.clone());
        debug!(view = %self.id, "form reset");
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Host update of a controlled loading flag; ignored when the form owns it
    pub fn set_loading(&mut self, loading: bool) {
        if !self.config.loading.update_from_host(loading) {
            warn!(view = %self.id, "set_loading ignored: loading is uncontrolled");
        }
    }

    /// Clear the pending flag of an uncontrolled form after the host's effect finished
    pub fn settle(&mut self) {
        if self.config.loading.update_internal(false) {
            debug!(view = %self.id, "form settled");
        }
    }

    /// Whether the loading flag is set
    pub fn loading(&self) -> bool {
        self.config.loading.get()
    }

    /// Whether the submit trigger is enabled
    pub fn submit_enabled(&self) -> bool {
        !self.loading()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// One widget request per visible descriptor, in order.
    ///
    /// `sink_for` builds the toolkit's change sink for a field.
    pub fn render<O, S>(
        &self,
        registry: &WidgetRegistry<O, S>,
        mut sink_for: impl FnMut(&FieldPath) -> S,
    ) -> CrudResult<Vec<RenderedField<O>>> {
        self.visible_fields()
            .map(|field| {
                let sink = sink_for(&field.name);
                let request = WidgetRequest {
                    field,
                    value: self.state.value(&field.name),
                    error: self.state.error(&field.name),
                    disabled: field.disabled,
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

    /// Visible descriptors packed into grid rows
    pub fn layout(&self) -> Vec<Vec<&FieldDescriptor>> {
        pack_rows(self.visible_fields().map(|f| (f.span, f)))
    }
}

// ============================================================================
// Tests
// ============================================================================
