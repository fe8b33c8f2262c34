//! # Form View Component
//!
//! Draws a [`FormRenderer`] on the 24-unit grid and routes widget changes and
//! button presses back into it.

use std::rc::Rc;

use dioxus::prelude::*;
use tracing::warn;

use crudkit_core::{FieldPath, GridSpan, Value};

use super::widgets::desktop_registry;
use crate::form::FormRenderer;
use crate::layout::pack_rows;

#[derive(Props, Clone, PartialEq)]
pub struct FormViewProps {
    pub form: Signal<FormRenderer>,
}

/// Descriptor-driven form
#[component]
pub fn FormView(props: FormViewProps) -> Element {
    let form = props.form;
    let registry = use_hook(|| Rc::new(desktop_registry()));

    let state = form.read();
    let rendered = state.render(registry.as_ref(), move |path: &FieldPath| {
        let path = path.clone();
        let mut form = form;
        EventHandler::new(move |value: Value| {
            if let Err(e) = form.write().set_value(&path, value) {
                warn!(field = %path, error = %e, "change ignored");
            }
        })
    });
    let config = state.config().clone();
    let submit_enabled = state.submit_enabled();
    drop(state);

    let rows = match rendered {
        Ok(fields) => pack_rows(fields.into_iter().map(|f| (f.span, (f.span, f.output)))),
        Err(e) => {
            return rsx! {
                div { class: "p-4 text-sm text-rose-400", "Cannot render form: {e}" }
            };
        }
    };

    rsx! {
        form {
            class: "crud-form space-y-4",
            onsubmit: move |e| {
                e.prevent_default();
                let mut form = form;
                form.write().submit();
            },

            for (i, row) in rows.into_iter().enumerate() {
                div {
                    key: "{i}",
                    class: "flex gap-4",
                    for (span, output) in row {
                        div { style: "{span_style(span)}", {output} }
                    }
                }
            }

            div {
                class: "flex gap-3 pt-2",
                button {
                    r#type: "submit",
                    class: "px-4 py-2 rounded-lg bg-indigo-600 hover:bg-indigo-700 text-white disabled:opacity-50 disabled:cursor-not-allowed",
                    disabled: !submit_enabled,
                    if submit_enabled { "{config.submit_text}" } else { "⏳ {config.submit_text}" }
                }
                if config.show_reset {
                    button {
                        r#type: "button",
                        class: "px-4 py-2 rounded-lg bg-slate-700 hover:bg-slate-600",
                        onclick: move |_| {
                            let mut form = form;
                            form.write().reset();
                        },
                        "{config.reset_text}"
                    }
                }
            }
        }
    }
}

/// Flex width of a cell spanning `span` of 24 units
pub(crate) fn span_style(span: GridSpan) -> String {
    let percent = f64::from(span.get()) * 100.0 / f64::from(GridSpan::COLUMNS);
    format!("flex: 0 0 {:.4}%; max-width: {:.4}%;", percent, percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_style() {
        assert_eq!(span_style(GridSpan::raw(12)), "flex: 0 0 50.0000%; max-width: 50.0000%;");
        assert!(span_style(GridSpan::raw(24)).contains("100.0000%"));
    }
}
