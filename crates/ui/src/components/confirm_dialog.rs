//! # Confirm Dialog Component
//!
//! Modal prompt shown while a confirmed row action waits for the user.
//! Nothing runs until the OK button is pressed.

use dioxus::prelude::*;

use crudkit_descriptor::ConfirmPrompt;

#[derive(Props, Clone, PartialEq)]
pub struct ConfirmDialogProps {
    pub prompt: ConfirmPrompt,

    /// Destructive styling for the OK button
    #[props(default = false)]
    pub danger: bool,

    /// Row summary shown under the description
    #[props(default)]
    pub item: Option<String>,

    #[props(default)]
    pub on_confirm: EventHandler<()>,

    #[props(default)]
    pub on_cancel: EventHandler<()>,
}

/// Confirmation prompt for a pending row action
#[component]
pub fn ConfirmDialog(props: ConfirmDialogProps) -> Element {
    let ok_class = if props.danger {
        "bg-red-600 hover:bg-red-700"
    } else {
        "bg-indigo-600 hover:bg-indigo-700"
    };
    let prompt = &props.prompt;

    rsx! {
        div {
            class: "fixed inset-0 z-50 flex items-center justify-center bg-black/60",
            onclick: move |_| props.on_cancel.call(()),

            div {
                class: "confirm-dialog w-full max-w-md p-6 rounded-xl bg-slate-800 border border-slate-700 shadow-xl",
                onclick: move |e| e.stop_propagation(),

                div {
                    class: "flex items-start gap-4 mb-6",

                    if props.danger {
                        div {
                            class: "flex-shrink-0 w-12 h-12 rounded-full bg-red-500/20 flex items-center justify-center",
                            span { class: "text-2xl", "⚠️" }
                        }
                    }

                    div {
                        class: "flex-1",
                        h2 {
                            class: "text-lg font-bold mb-2",
                            class: if props.danger { "text-red-400" } else { "text-slate-100" },
                            "{prompt.title}"
                        }
                        p { class: "text-slate-300", "{prompt.description}" }
                    }
                }

                if let Some(item) = &props.item {
                    div {
                        class: "mb-4 p-3 bg-slate-700/50 rounded-lg border border-slate-600 text-sm",
                        span { class: "text-slate-400 mr-2", "Item:" }
                        span { class: "font-medium text-white", "{item}" }
                    }
                }

                div {
                    class: "flex justify-end gap-3",

                    button {
                        r#type: "button",
                        class: "px-4 py-2 bg-slate-700 hover:bg-slate-600 rounded-lg transition-colors",
                        onclick: move |_| props.on_cancel.call(()),
                        "{prompt.cancel_text}"
                    }

                    button {
                        r#type: "button",
                        class: "px-4 py-2 rounded-lg transition-colors text-white {ok_class}",
                        onclick: move |_| props.on_confirm.call(()),
                        "{prompt.ok_text}"
                    }
                }
            }
        }
    }
}
