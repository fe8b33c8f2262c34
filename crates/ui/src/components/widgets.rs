//! Desktop widget registry
//!
//! Maps every field kind onto the input components. Change sinks are
//! `EventHandler<Value>`s bound by the view to its controller.

use dioxus::prelude::*;

use crudkit_core::{Value, display_text};
use crudkit_descriptor::{FieldDescriptor, FieldKind};

use super::inputs::{
    ChoiceGroup, FieldShell, NumberInput, Select, SelectOption, TextArea, TextInput, Toggle,
};
use crate::widget::{WidgetRegistry, WidgetRequest};

/// Registry of desktop widgets
pub type DesktopRegistry = WidgetRegistry<Element, EventHandler<Value>>;

type Request<'a> = WidgetRequest<'a, EventHandler<Value>>;

/// Registry covering every field kind
pub fn desktop_registry() -> DesktopRegistry {
    DesktopRegistry::new()
        .with(FieldKind::Text, |req| text_like(req, "text"))
        .with(FieldKind::SecretText, |req| text_like(req, "password"))
        .with(FieldKind::Time, |req| text_like(req, "time"))
        .with(FieldKind::Date, |req| {
            let input_type = if req.field.show_time { "datetime-local" } else { "date" };
            text_like(req, input_type)
        })
        .with(FieldKind::MultilineText, multiline)
        .with(FieldKind::Number, number)
        .with(FieldKind::SingleSelect, |req| select(req, false))
        .with(FieldKind::MultiSelect, |req| select(req, true))
        .with(FieldKind::RadioGroup, |req| choices(req, false))
        .with(FieldKind::CheckboxGroup, |req| choices(req, true))
        .with(FieldKind::Toggle, toggle)
        .with(FieldKind::DateRange, date_range)
        .with(FieldKind::FileUpload, file_upload)
        .with(FieldKind::SectionBreak, section_break)
}

fn shell(req: &Request<'_>, input: Element) -> Element {
    rsx! {
        FieldShell {
            label: Some(req.label()),
            tooltip: req.field.tooltip.clone(),
            error: req.error.map(str::to_string),
            help_text: req.field.help_text.clone(),
            {input}
        }
    }
}

fn text_like(req: &Request<'_>, input_type: &str) -> Element {
    let sink = *req.on_change;
    let input = rsx! {
        TextInput {
            value: display_text(req.value),
            placeholder: Some(req.field.display_placeholder()),
            has_error: req.error.is_some(),
            disabled: req.disabled,
            input_type: input_type.to_string(),
            on_change: move |text: String| sink.call(Value::String(text)),
        }
    };
    shell(req, input)
}

fn multiline(req: &Request<'_>) -> Element {
    let sink = *req.on_change;
    let input = rsx! {
        TextArea {
            value: display_text(req.value),
            placeholder: Some(req.field.display_placeholder()),
            rows: req.field.rows,
            has_error: req.error.is_some(),
            disabled: req.disabled,
            on_change: move |text: String| sink.call(Value::String(text)),
        }
    };
    shell(req, input)
}

fn number(req: &Request<'_>) -> Element {
    let sink = *req.on_change;
    let input = rsx! {
        NumberInput {
            value: req.value.and_then(Value::as_f64),
            placeholder: Some(req.field.display_placeholder()),
            min: req.field.min,
            max: req.field.max,
            has_error: req.error.is_some(),
            disabled: req.disabled,
            on_change: move |n: Option<f64>| {
                sink.call(n.map(Value::from).unwrap_or(Value::Null))
            },
        }
    };
    shell(req, input)
}

/// Options keyed by their position, so any JSON value can be an option
fn indexed_options(field: &FieldDescriptor) -> Vec<SelectOption> {
    field
        .options
        .iter()
        .enumerate()
        .map(|(i, o)| SelectOption {
            value: i.to_string(),
            label: o.label.clone(),
            disabled: o.disabled,
        })
        .collect()
}

/// Positions of the options matching the current value
fn selected_indexes(field: &FieldDescriptor, value: Option<&Value>) -> Vec<String> {
    let matches = |candidate: &Value| match value {
        Some(Value::Array(items)) => items.contains(candidate),
        Some(current) => current == candidate,
        None => false,
    };
    field
        .options
        .iter()
        .enumerate()
        .filter(|(_, o)| matches(&o.value))
        .map(|(i, _)| i.to_string())
        .collect()
}

/// Value for a new selection of option positions
fn selection_value(field: &FieldDescriptor, picked: &[String], multiple: bool) -> Value {
    let values: Vec<Value> = picked
        .iter()
        .filter_map(|i| i.parse::<usize>().ok())
        .filter_map(|i| field.options.get(i))
        .map(|o| o.value.clone())
        .collect();
    if multiple {
        Value::Array(values)
    } else {
        values.into_iter().next().unwrap_or(Value::Null)
    }
}

fn select(req: &Request<'_>, multiple: bool) -> Element {
    let sink = *req.on_change;
    let field = req.field.clone();
    let input = rsx! {
        Select {
            selected: selected_indexes(req.field, req.value),
            options: indexed_options(req.field),
            placeholder: Some(req.field.display_placeholder()),
            multiple,
            has_error: req.error.is_some(),
            disabled: req.disabled,
            on_change: move |picked: Vec<String>| {
                sink.call(selection_value(&field, &picked, multiple))
            },
        }
    };
    shell(req, input)
}

fn choices(req: &Request<'_>, multiple: bool) -> Element {
    let sink = *req.on_change;
    let field = req.field.clone();
    let input = rsx! {
        ChoiceGroup {
            selected: selected_indexes(req.field, req.value),
            options: indexed_options(req.field),
            multiple,
            disabled: req.disabled,
            on_change: move |picked: Vec<String>| {
                sink.call(selection_value(&field, &picked, multiple))
            },
        }
    };
    shell(req, input)
}

fn toggle(req: &Request<'_>) -> Element {
    let sink = *req.on_change;
    let input = rsx! {
        Toggle {
            checked: req.value.and_then(Value::as_bool).unwrap_or(false),
            disabled: req.disabled,
            on_change: move |on: bool| sink.call(Value::Bool(on)),
        }
    };
    shell(req, input)
}

fn date_range(req: &Request<'_>) -> Element {
    let sink = *req.on_change;
    let bounds: [String; 2] = match req.value.and_then(Value::as_array).map(Vec::as_slice) {
        Some([start, end]) => [display_text(Some(start)), display_text(Some(end))],
        _ => Default::default(),
    };
    let [start, end] = bounds.clone();
    let input_type = if req.field.show_time { "datetime-local" } else { "date" };

    let input = rsx! {
        div {
            class: "flex items-center gap-2",
            TextInput {
                value: start,
                input_type: input_type.to_string(),
                has_error: req.error.is_some(),
                disabled: req.disabled,
                on_change: {
                    let end = bounds[1].clone();
                    move |text: String| sink.call(Value::from(vec![text, end.clone()]))
                },
            }
            span { class: "text-slate-500", "~" }
            TextInput {
                value: end,
                input_type: input_type.to_string(),
                has_error: req.error.is_some(),
                disabled: req.disabled,
                on_change: {
                    let start = bounds[0].clone();
                    move |text: String| sink.call(Value::from(vec![start.clone(), text]))
                },
            }
        }
    };
    shell(req, input)
}

fn file_upload(req: &Request<'_>) -> Element {
    let sink = *req.on_change;
    let count = req.value.and_then(Value::as_array).map_or(0, Vec::len);
    let input = rsx! {
        div {
            class: "flex items-center gap-3",
            input {
                r#type: "file",
                class: "text-sm text-slate-300",
                disabled: req.disabled,
                onchange: move |e| {
                    let path = e.value();
                    if !path.is_empty() {
                        sink.call(Value::from(vec![path]));
                    }
                },
            }
            span { class: "text-xs text-slate-500", "{count} file(s)" }
        }
    };
    shell(req, input)
}

fn section_break(req: &Request<'_>) -> Element {
    let label = req.field.display_label();
    rsx! {
        div {
            class: "flex items-center gap-3 my-2",
            div { class: "flex-1 h-px bg-slate-700" }
            span { class: "text-xs font-semibold uppercase tracking-wide text-slate-400", "{label}" }
            div { class: "flex-1 h-px bg-slate-700" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudkit_descriptor::FieldOption;
    use serde_json::json;

    fn status() -> FieldDescriptor {
        FieldDescriptor::select(
            "status",
            "Status",
            [FieldOption::new("Active", 1), FieldOption::new("Disabled", 0)],
        )
    }

    #[test]
    fn test_registry_covers_every_kind() {
        assert!(desktop_registry().missing_kinds().is_empty());
    }

    #[test]
    fn test_selected_indexes() {
        let field = status();
        assert_eq!(selected_indexes(&field, Some(&json!(0))), vec!["1"]);
        assert_eq!(selected_indexes(&field, Some(&json!([1, 0]))), vec!["0", "1"]);
        assert!(selected_indexes(&field, None).is_empty());
    }

    #[test]
    fn test_selection_value() {
        let field = status();
        assert_eq!(selection_value(&field, &["1".into()], false), json!(0));
        assert_eq!(selection_value(&field, &[], false), Value::Null);
        assert_eq!(selection_value(&field, &["0".into(), "1".into()], true), json!([1, 0]));
    }
}
