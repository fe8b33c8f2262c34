//! # Input Components
//!
//! Styled input primitives the desktop widget registry builds on. Every
//! input sits in a [`FieldShell`] that draws the label, the required marker,
//! and the error or help line below it.

use dioxus::prelude::*;

// ============================================================================
// Field Shell
// ============================================================================

/// Label, error and help text shared by every input
#[derive(Props, Clone, PartialEq)]
pub struct FieldShellProps {
    /// Label text, already carrying the required marker
    #[props(default)]
    pub label: Option<String>,

    #[props(default)]
    pub tooltip: Option<String>,

    /// Error message (shows error state)
    #[props(default)]
    pub error: Option<String>,

    #[props(default)]
    pub help_text: Option<String>,

    pub children: Element,
}

/// Wrapper drawing label and feedback around an input
#[component]
pub fn FieldShell(props: FieldShellProps) -> Element {
    rsx! {
        div {
            class: "input-group",

            if let Some(label) = &props.label {
                label {
                    class: "block text-sm font-medium text-slate-300 mb-1.5",
                    title: props.tooltip.clone().unwrap_or_default(),
                    if let Some(text) = label.strip_suffix('*') {
                        "{text}"
                        span { class: "text-rose-400 ml-0.5", "*" }
                    } else {
                        "{label}"
                    }
                }
            }

            {props.children}

            if let Some(error) = &props.error {
                p { class: "mt-1 text-xs text-rose-400", "{error}" }
            } else if let Some(help) = &props.help_text {
                p { class: "mt-1 text-xs text-slate-500", "{help}" }
            }
        }
    }
}

// ============================================================================
// Text Input Component
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct TextInputProps {
    pub value: String,

    #[props(default)]
    pub placeholder: Option<String>,

    #[props(default = false)]
    pub has_error: bool,

    #[props(default = false)]
    pub disabled: bool,

    /// Input type (text, password, date, time)
    #[props(default = "text".to_string())]
    pub input_type: String,

    #[props(default)]
    pub on_change: EventHandler<String>,

    #[props(default)]
    pub on_enter: EventHandler<String>,
}

/// Single-line input
#[component]
pub fn TextInput(props: TextInputProps) -> Element {
    let input_class = build_input_class(props.has_error, props.disabled);

    rsx! {
        input {
            class: "{input_class}",
            r#type: "{props.input_type}",
            value: "{props.value}",
            placeholder: props.placeholder.as_deref().unwrap_or(""),
            disabled: props.disabled,
            oninput: move |e| props.on_change.call(e.value()),
            onkeydown: move |e| {
                if e.key() == Key::Enter {
                    props.on_enter.call(props.value.clone());
                }
            },
        }
    }
}

// ============================================================================
// Text Area Component
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct TextAreaProps {
    pub value: String,

    #[props(default)]
    pub placeholder: Option<String>,

    /// Number of visible rows
    #[props(default = 4)]
    pub rows: u16,

    #[props(default = false)]
    pub has_error: bool,

    #[props(default = false)]
    pub disabled: bool,

    #[props(default)]
    pub on_change: EventHandler<String>,
}

/// Multi-line input
#[component]
pub fn TextArea(props: TextAreaProps) -> Element {
    let mut class = build_input_class(props.has_error, props.disabled);
    class.push_str(" resize-y");

    rsx! {
        textarea {
            class: "{class}",
            rows: "{props.rows}",
            placeholder: props.placeholder.as_deref().unwrap_or(""),
            disabled: props.disabled,
            oninput: move |e| props.on_change.call(e.value()),
            "{props.value}"
        }
    }
}

// ============================================================================
// Number Input Component
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct NumberInputProps {
    /// Current value; `None` renders an empty box
    pub value: Option<f64>,

    #[props(default)]
    pub placeholder: Option<String>,

    #[props(default)]
    pub min: Option<f64>,

    #[props(default)]
    pub max: Option<f64>,

    #[props(default = false)]
    pub has_error: bool,

    #[props(default = false)]
    pub disabled: bool,

    /// Called with the parsed number, or `None` when the box is cleared
    #[props(default)]
    pub on_change: EventHandler<Option<f64>>,
}

/// Numeric input, clamped to its bounds
#[component]
pub fn NumberInput(props: NumberInputProps) -> Element {
    let input_class = build_input_class(props.has_error, props.disabled);
    let shown = props.value.map(|v| v.to_string()).unwrap_or_default();

    rsx! {
        input {
            class: "{input_class}",
            r#type: "number",
            value: "{shown}",
            placeholder: props.placeholder.as_deref().unwrap_or(""),
            disabled: props.disabled,
            min: props.min.map(|v| v.to_string()),
            max: props.max.map(|v| v.to_string()),
            oninput: move |e| {
                let raw = e.value();
                if raw.trim().is_empty() {
                    props.on_change.call(None);
                } else if let Ok(v) = raw.parse::<f64>() {
                    props.on_change.call(Some(clamp_value(v, props.min, props.max)));
                }
            },
        }
    }
}

// ============================================================================
// Select Component
// ============================================================================

/// One entry of a select, radio or checkbox group
#[derive(Clone, PartialEq, Debug)]
pub struct SelectOption {
    /// Option value as sent back through `on_change`
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct SelectProps {
    /// Selected values; at most one unless `multiple`
    pub selected: Vec<String>,

    pub options: Vec<SelectOption>,

    #[props(default)]
    pub placeholder: Option<String>,

    #[props(default = false)]
    pub multiple: bool,

    #[props(default = false)]
    pub has_error: bool,

    #[props(default = false)]
    pub disabled: bool,

    /// Called with the full new selection
    #[props(default)]
    pub on_change: EventHandler<Vec<String>>,
}

/// Drop-down with one or many selections
#[component]
pub fn Select(props: SelectProps) -> Element {
    let mut class = build_input_class(props.has_error, props.disabled);
    class.push_str(" appearance-none pr-10 cursor-pointer");
    let nothing_selected = props.selected.is_empty();

    rsx! {
        select {
            class: "{class}",
            multiple: props.multiple,
            disabled: props.disabled,
            onchange: move |e| {
                let value = e.value();
                if props.multiple {
                    let mut next = props.selected.clone();
                    match next.iter().position(|v| v == &value) {
                        Some(i) => {
                            next.remove(i);
                        }
                        None => next.push(value),
                    }
                    props.on_change.call(next);
                } else if value.is_empty() {
                    props.on_change.call(Vec::new());
                } else {
                    props.on_change.call(vec![value]);
                }
            },

            if !props.multiple {
                option {
                    value: "",
                    selected: nothing_selected,
                    class: "text-slate-400",
                    {props.placeholder.clone().unwrap_or_default()}
                }
            }

            for option in &props.options {
                option {
                    key: "{option.value}",
                    value: "{option.value}",
                    disabled: option.disabled,
                    selected: props.selected.contains(&option.value),
                    "{option.label}"
                }
            }
        }
    }
}

// ============================================================================
// Choice Group Component
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct ChoiceGroupProps {
    pub selected: Vec<String>,

    pub options: Vec<SelectOption>,

    /// Checkbox group when set, radio group otherwise
    #[props(default = false)]
    pub multiple: bool,

    #[props(default = false)]
    pub disabled: bool,

    #[props(default)]
    pub on_change: EventHandler<Vec<String>>,
}

/// Radio or checkbox group
#[component]
pub fn ChoiceGroup(props: ChoiceGroupProps) -> Element {
    let input_type = if props.multiple { "checkbox" } else { "radio" };

    rsx! {
        div {
            class: "flex flex-wrap gap-4",
            for option in props.options.iter() {
                label {
                    key: "{option.value}",
                    class: "inline-flex items-center gap-2 text-sm text-slate-200 cursor-pointer",
                    class: if props.disabled || option.disabled { "opacity-50 cursor-not-allowed" } else { "" },
                    input {
                        r#type: input_type,
                        checked: props.selected.contains(&option.value),
                        disabled: props.disabled || option.disabled,
                        onchange: {
                            let value = option.value.clone();
                            let selected = props.selected.clone();
                            let multiple = props.multiple;
                            move |_| props.on_change.call(toggle_choice(&selected, &value, multiple))
                        },
                    }
                    "{option.label}"
                }
            }
        }
    }
}

// ============================================================================
// Checkbox Component
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct CheckboxProps {
    pub checked: bool,

    #[props(default)]
    pub label: Option<String>,

    #[props(default = false)]
    pub disabled: bool,

    /// Partial selection mark
    #[props(default = false)]
    pub indeterminate: bool,

    #[props(default)]
    pub on_change: EventHandler<bool>,
}

/// Checkbox used for row selection
#[component]
pub fn Checkbox(props: CheckboxProps) -> Element {
    rsx! {
        label {
            class: "inline-flex items-center gap-2 cursor-pointer",
            class: if props.disabled { "opacity-50 cursor-not-allowed" } else { "" },
            input {
                r#type: "checkbox",
                class: if props.indeterminate { "accent-indigo-400" } else { "accent-indigo-600" },
                checked: props.checked,
                disabled: props.disabled,
                onchange: move |_| {
                    if !props.disabled {
                        props.on_change.call(!props.checked);
                    }
                },
            }
            if let Some(label) = &props.label {
                span { class: "text-sm text-slate-200", "{label}" }
            }
        }
    }
}

// ============================================================================
// Toggle Component
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct ToggleProps {
    pub checked: bool,

    #[props(default = false)]
    pub disabled: bool,

    #[props(default)]
    pub on_change: EventHandler<bool>,
}

/// Switch-style boolean input
#[component]
pub fn Toggle(props: ToggleProps) -> Element {
    let track = if props.checked { "bg-indigo-600" } else { "bg-slate-600" };
    let thumb = if props.checked { "translate-x-5" } else { "translate-x-0" };

    rsx! {
        button {
            r#type: "button",
            class: "relative inline-flex w-10 h-5 rounded-full transition-colors {track}",
            class: if props.disabled { "opacity-50 cursor-not-allowed" } else { "" },
            disabled: props.disabled,
            onclick: move |_| props.on_change.call(!props.checked),
            span {
                class: "inline-block w-4 h-4 mt-0.5 ml-0.5 rounded-full bg-white transition-transform {thumb}",
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Build input class string
fn build_input_class(has_error: bool, disabled: bool) -> String {
    let mut classes = vec![
        "w-full",
        "px-3",
        "py-2",
        "bg-slate-800",
        "border",
        "rounded-lg",
        "text-sm",
        "text-slate-100",
        "placeholder-slate-500",
        "focus:outline-none",
        "focus:ring-2",
    ];

    if has_error {
        classes.extend(["border-rose-500", "focus:ring-rose-500/30"]);
    } else {
        classes.extend(["border-slate-700", "focus:ring-indigo-500/30"]);
    }
    if disabled {
        classes.extend(["opacity-50", "cursor-not-allowed"]);
    }

    classes.join(" ")
}

/// Clamp a value between optional min and max
fn clamp_value(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let mut result = value;
    if let Some(min) = min {
        result = result.max(min);
    }
    if let Some(max) = max {
        result = result.min(max);
    }
    result
}

/// Selection after clicking `value` in a radio or checkbox group
fn toggle_choice(selected: &[String], value: &str, multiple: bool) -> Vec<String> {
    if !multiple {
        return vec![value.to_string()];
    }
    if selected.iter().any(|v| v == value) {
        selected.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut next = selected.to_vec();
        next.push(value.to_string());
        next
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_input_class() {
        let class = build_input_class(false, false);
        assert!(class.contains("border-slate-700"));
        assert!(!class.contains("opacity-50"));

        let class = build_input_class(true, true);
        assert!(class.contains("border-rose-500"));
        assert!(class.contains("cursor-not-allowed"));
    }

    #[test]
    fn test_clamp_value() {
        assert_eq!(clamp_value(-5.0, Some(0.0), Some(10.0)), 0.0);
        assert_eq!(clamp_value(15.0, Some(0.0), Some(10.0)), 10.0);
        assert_eq!(clamp_value(5.0, None, None), 5.0);
    }

    #[test]
    fn test_toggle_choice() {
        let selected = vec!["a".to_string()];
        assert_eq!(toggle_choice(&selected, "b", false), vec!["b"]);
        assert_eq!(toggle_choice(&selected, "b", true), vec!["a", "b"]);
        assert!(toggle_choice(&selected, "a", true).is_empty());
    }
}
