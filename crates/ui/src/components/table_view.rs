//! # Data Table Component
//!
//! Toolbar, selectable rows with action links, the pager and the confirm
//! prompt, all driven by a [`TableController`].

use dioxus::prelude::*;
use tracing::warn;

use crudkit_core::{CrudResult, RowId, display_text};

use super::confirm_dialog::ConfirmDialog;
use super::inputs::Checkbox;
use crate::dispatch::ActionOutcome;
use crate::table::{ColumnRole, TableController};

const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

#[derive(Props, Clone, PartialEq)]
pub struct DataTableProps {
    pub table: Signal<TableController>,
}

/// Log controller refusals; the view has nowhere else to surface them
fn report<T>(operation: &str, result: CrudResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(operation, error = %e, "table operation rejected");
            None
        }
    }
}

fn report_outcome(operation: &str, result: CrudResult<ActionOutcome>) {
    if let Some(ActionOutcome::Failed(message)) = report(operation, result) {
        warn!(operation, error = %message, "action handler failed");
    }
}

/// Descriptor-driven list view
#[component]
pub fn DataTable(props: DataTableProps) -> Element {
    let mut table = props.table;
    let mut search_text = use_signal(String::new);

    let state = table.read();
    let columns = state.columns();
    let rows = state.render_rows();
    let config = state.config().clone();
    let batch = state.batch_triggers();
    let selectable = state.selectable();
    let all_selected = state.is_all_selected();
    let some_selected = !state.selection().is_empty();
    let pagination = state.pagination().copied();
    let pending = state.pending_confirmation().cloned();
    let pending_danger = pending.as_ref().is_some_and(|p| {
        rows.iter()
            .flat_map(|r| r.actions.iter())
            .any(|a| a.key == p.action_key && a.style.danger)
    });
    drop(state);

    let data_columns: Vec<_> = columns.iter().filter(|c| c.role == ColumnRole::Data).cloned().collect();
    let has_actions = columns.iter().any(|c| c.role == ColumnRole::Actions);
    let toolbar = config.toolbar;

    rsx! {
        div {
            class: "data-table rounded-xl bg-slate-800/60 border border-slate-700",

            // Toolbar
            div {
                class: "flex items-center gap-2 p-3 border-b border-slate-700",

                if let Some(title) = &config.title {
                    h2 { class: "font-semibold mr-4", "{title}" }
                }

                if toolbar.creatable {
                    button {
                        class: "px-3 py-1.5 rounded-lg bg-indigo-600 hover:bg-indigo-700 text-white text-sm",
                        onclick: move |_| { report("create", table.write().create()); },
                        "+ {config.create_text}"
                    }
                }

                for trigger in batch {
                    button {
                        key: "{trigger.key}",
                        class: "px-3 py-1.5 rounded-lg bg-red-600/80 hover:bg-red-600 text-white text-sm",
                        onclick: {
                            let key = trigger.key.clone();
                            move |_| report_outcome("batch", table.write().run_batch_action(&key))
                        },
                        "{trigger.text()}"
                    }
                }

                div { class: "flex-1" }

                if toolbar.searchable {
                    input {
                        class: "px-3 py-1.5 rounded-lg bg-slate-900 border border-slate-700 text-sm",
                        r#type: "search",
                        placeholder: "Search",
                        value: "{search_text}",
                        oninput: move |e| {
                            let text = e.value();
                            if text.is_empty() {
                                report("search", table.write().clear_search());
                            }
                            search_text.set(text);
                        },
                        onkeydown: move |e| {
                            if e.key() == Key::Enter {
                                let text = search_text.read().clone();
                                report("search", table.write().search(&text));
                            }
                        },
                    }
                }
                if toolbar.refreshable {
                    button {
                        class: "px-2 py-1.5 rounded-lg hover:bg-slate-700 text-sm",
                        title: "Refresh",
                        onclick: move |_| { report("refresh", table.write().refresh()); },
                        "⟳"
                    }
                }
                if toolbar.exportable {
                    button {
                        class: "px-2 py-1.5 rounded-lg hover:bg-slate-700 text-sm",
                        title: "Export",
                        onclick: move |_| { report("export", table.write().export()); },
                        "⤓"
                    }
                }
            }

            // Rows
            table {
                class: "w-full text-sm",
                thead {
                    tr {
                        class: "text-left text-slate-400 border-b border-slate-700",
                        if selectable {
                            th {
                                class: "w-10 px-3 py-2",
                                Checkbox {
                                    checked: all_selected,
                                    indeterminate: some_selected && !all_selected,
                                    on_change: move |_| { table.write().toggle_all(); },
                                }
                            }
                        }
                        for column in data_columns.iter().cloned() {
                            th {
                                key: "{column.key}",
                                class: "px-3 py-2 font-medium",
                                class: if column.sortable { "cursor-pointer select-none hover:text-slate-200" } else { "" },
                                style: column.width.map(|w| format!("width: {}px;", w)).unwrap_or_default(),
                                onclick: {
                                    let key = column.key.clone();
                                    move |_| {
                                        if column.sortable {
                                            report("sort", table.write().sort(&key));
                                        }
                                    }
                                },
                                "{column.title}"
                                if let Some(dir) = column.sort {
                                    span { class: "ml-1 text-indigo-400", "{dir}" }
                                }
                            }
                        }
                        if has_actions {
                            th { class: "px-3 py-2 font-medium", "Actions" }
                        }
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td {
                                class: "px-3 py-8 text-center text-slate-500",
                                colspan: "{columns.len() + 1}",
                                if config.loading { "Loading…" } else { "No data" }
                            }
                        }
                    }
                    for row in rows.into_iter() {
                        tr {
                            key: "{row.id}",
                            class: "border-b border-slate-700/50 hover:bg-slate-700/30",
                            class: if row.selected { "bg-indigo-600/10" } else { "" },
                            if selectable {
                                td {
                                    class: "px-3 py-2",
                                    Checkbox {
                                        checked: row.selected,
                                        on_change: {
                                            let id = row.id.clone();
                                            move |_| { report("select", table.write().toggle_row(&id)); }
                                        },
                                    }
                                }
                            }
                            for (i, cell) in row.cells.iter().enumerate() {
                                td { key: "{i}", class: "px-3 py-2", "{cell}" }
                            }
                            if has_actions {
                                td {
                                    class: "px-3 py-2 space-x-3",
                                    for action in row.actions.iter() {
                                        button {
                                            key: "{action.key}",
                                            class: "hover:underline",
                                            class: if action.style.danger { "text-red-400" } else { "text-indigo-400" },
                                            onclick: {
                                                let id: RowId = row.id.clone();
                                                let key = action.key.clone();
                                                move |_| report_outcome("row action", table.write().trigger_row_action(&id, &key))
                                            },
                                            "{action.label}"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            // Pager
            if let Some(page) = pagination {
                div {
                    class: "flex items-center justify-end gap-3 p-3 text-sm text-slate-400",
                    span { "{page.summary()}" }
                    button {
                        class: "px-2 disabled:opacity-40",
                        disabled: page.current <= 1,
                        onclick: move |_| table.write().change_page(page.current.saturating_sub(1).max(1), page.page_size),
                        "‹"
                    }
                    span { "{page.current} / {page.page_count()}" }
                    button {
                        class: "px-2 disabled:opacity-40",
                        disabled: u64::from(page.current) >= page.page_count(),
                        onclick: move |_| table.write().change_page(page.current + 1, page.page_size),
                        "›"
                    }
                    select {
                        class: "bg-slate-900 border border-slate-700 rounded px-2 py-1",
                        onchange: move |e| {
                            if let Ok(size) = e.value().parse::<u32>() {
                                table.write().change_page(1, size);
                            }
                        },
                        for size in PAGE_SIZES {
                            option {
                                value: "{size}",
                                selected: size == page.page_size,
                                "{size} / page"
                            }
                        }
                    }
                }
            }

            if let Some(pending) = pending {
                ConfirmDialog {
                    prompt: pending.prompt.clone(),
                    danger: pending_danger,
                    item: pending.row.get("name").or_else(|| pending.row.get("title")).map(|v| display_text(Some(v))),
                    on_confirm: move |_| report_outcome("confirm", table.write().confirm()),
                    on_cancel: move |_| { report("dismiss", table.write().dismiss()); },
                }
            }
        }
    }
}

