//! Desktop launcher
//!
//! Hosts one admin screen (search panel, table and form, each optional) in a
//! Dioxus desktop window. Controllers are built inside the window by a host
//! supplied factory, since their handlers are not `Send`.

use dioxus::prelude::*;

use crate::components::{DataTable, FormView, SearchPanelView};
use crate::form::FormRenderer;
use crate::search::SearchPanelController;
use crate::table::TableController;

/// Controllers making up one screen
#[derive(Default)]
pub struct CrudScreen {
    pub title: String,
    pub search: Option<SearchPanelController>,
    pub table: Option<TableController>,
    pub form: Option<FormRenderer>,
}

/// Builds the screen once the window runtime exists
pub type ScreenFactory = fn() -> CrudScreen;

#[derive(Clone, Copy)]
struct Factory(ScreenFactory);

#[derive(Clone)]
struct ScreenSignals {
    title: String,
    search: Option<Signal<SearchPanelController>>,
    table: Option<Signal<TableController>>,
    form: Option<Signal<FormRenderer>>,
}

/// Root component
#[component]
fn App() -> Element {
    let factory = use_context::<Factory>();
    let screen = use_hook(move || {
        let CrudScreen {
            title,
            search,
            table,
            form,
        } = (factory.0)();
        tracing::info!(
            search = search.is_some(),
            table = table.is_some(),
            form = form.is_some(),
            "screen built"
        );
        ScreenSignals {
            title,
            search: search.map(Signal::new),
            table: table.map(Signal::new),
            form: form.map(Signal::new),
        }
    });

    rsx! {
        div {
            class: "app-container min-h-screen bg-slate-900 text-slate-100 p-6 space-y-6",

            if !screen.title.is_empty() {
                h1 { class: "text-2xl font-bold", "{screen.title}" }
            }
            if let Some(panel) = screen.search {
                SearchPanelView { panel }
            }
            if let Some(table) = screen.table {
                DataTable { table }
            }
            if let Some(form) = screen.form {
                div {
                    class: "max-w-3xl p-6 rounded-xl bg-slate-800/60 border border-slate-700",
                    FormView { form }
                }
            }
        }
    }
}

/// Open a desktop window showing the screen built by `factory`
pub fn launch(window_title: &str, factory: ScreenFactory) {
    tracing::info!("Starting {} v{}", crate::NAME, crate::VERSION);

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(
                    dioxus::desktop::WindowBuilder::new()
                        .with_title(window_title)
                        .with_resizable(true)
                        .with_inner_size(dioxus::desktop::LogicalSize::new(1280.0, 860.0))
                        .with_min_inner_size(dioxus::desktop::LogicalSize::new(800.0, 600.0)),
                )
                .with_menu(None),
        )
        .with_context(Factory(factory))
        .launch(App);
}
