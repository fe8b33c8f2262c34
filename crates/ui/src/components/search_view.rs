//! # Search Panel Component

use std::rc::Rc;

use dioxus::prelude::*;
use tracing::warn;

use crudkit_core::{FieldPath, Value};

use super::form_view::span_style;
use super::widgets::desktop_registry;
use crate::layout::pack_rows;
use crate::search::SearchPanelController;

#[derive(Props, Clone, PartialEq)]
pub struct SearchPanelViewProps {
    pub panel: Signal<SearchPanelController>,
}

/// Collapsible filter bar
#[component]
pub fn SearchPanelView(props: SearchPanelViewProps) -> Element {
    let panel = props.panel;
    let registry = use_hook(|| Rc::new(desktop_registry()));

    let state = panel.read();
    let rendered = state.render(registry.as_ref(), move |path: &FieldPath| {
        let name = path.dotted();
        let mut panel = panel;
        EventHandler::new(move |value: Value| {
            if let Err(e) = panel.write().set_value(&name, value) {
                warn!(filter = %name, error = %e, "filter change ignored");
            }
        })
    });
    let config = state.config().clone();
    let show_toggle = state.collapse_toggle_visible();
    let collapsed = state.collapsed();
    drop(state);

    let rows = match rendered {
        Ok(fields) => pack_rows(fields.into_iter().map(|f| (f.span, (f.span, f.output)))),
        Err(e) => {
            return rsx! {
                div { class: "p-4 text-sm text-rose-400", "Cannot render search panel: {e}" }
            };
        }
    };

    rsx! {
        div {
            class: "search-panel p-4 mb-4 rounded-xl bg-slate-800/60 border border-slate-700",

            for (i, row) in rows.into_iter().enumerate() {
                div {
                    key: "{i}",
                    class: "flex gap-4 mb-3",
                    for (span, output) in row {
                        div { style: "{span_style(span)}", {output} }
                    }
                }
            }

            div {
                class: "flex justify-end items-center gap-3",
                button {
                    r#type: "button",
                    class: "px-4 py-2 rounded-lg bg-indigo-600 hover:bg-indigo-700 text-white disabled:opacity-50",
                    disabled: config.loading,
                    onclick: move |_| {
                        let mut panel = panel;
                        panel.write().search();
                    },
                    "{config.search_text}"
                }
                button {
                    r#type: "button",
                    class: "px-4 py-2 rounded-lg bg-slate-700 hover:bg-slate-600",
                    onclick: move |_| {
                        let mut panel = panel;
                        panel.write().reset();
                    },
                    "{config.reset_text}"
                }
                if show_toggle {
                    button {
                        r#type: "button",
                        class: "text-sm text-indigo-400 hover:text-indigo-300",
                        onclick: move |_| {
                            let mut panel = panel;
                            panel.write().toggle_collapsed();
                        },
                        if collapsed { "Expand ▾" } else { "Collapse ▴" }
                    }
                }
            }
        }
    }
}
