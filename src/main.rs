//! crudkit demo
//!
//! Drives a user-management screen through the view controllers. The console
//! walkthrough plays a scripted session against an in-memory host and prints
//! the text rendering after every step. Built with `--features desktop`, the
//! `--desktop` flag opens the same screen in a window instead.

mod host;

use anyhow::{Context, Result, bail};
use crudkit_core::{FieldPath, Record, RowId, Value};
use crudkit_descriptor::prelude::*;
use crudkit_ui::{
    ActionOutcome, FormCallbacks, FormOptions, FormRenderer, SearchCallbacks, SearchOptions,
    SearchPanelController, SubmitOutcome, TableCallbacks, TableController, TableOptions,
    render_form, render_search, render_table,
};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::host::{HostIntent, HostResult, Query, UserStore, apply, run_effect};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!();
    println!("╔═══════════════════════════════════════════════╗");
    println!("║   {} v{:<38}║", crudkit_ui::NAME, crudkit_ui::VERSION);
    println!("║   Declarative admin screens                   ║");
    println!("╚═══════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "desktop")]
    if std::env::args().any(|arg| arg == "--desktop") {
        crudkit_ui::launch("crudkit demo", desktop_screen);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the runtime")?;
    runtime.block_on(walkthrough())
}

// ============================================================================
// Screen
// ============================================================================

struct Screen {
    search: SearchPanelController,
    table: TableController,
    form: FormRenderer,
}

fn roles() -> Vec<FieldOption> {
    vec![
        FieldOption::new("Administrator", "admin"),
        FieldOption::new("Editor", "editor"),
        FieldOption::new("Viewer", "viewer"),
    ]
}

fn row_id(row: &Record) -> Result<RowId> {
    RowId::from_record(row, "id").context("row has no id")
}

/// Build the three controllers; every intent goes to `sink`
fn build_screen(sink: impl Fn(HostIntent) + Clone + 'static) -> Result<Screen> {
    let search = {
        let on_search = sink.clone();
        SearchPanelController::new(
            vec![
                CommonSearchFields::keyword(),
                CommonSearchFields::status(),
                SearchFieldDescriptor::select("role", "Role", roles()),
            ],
            SearchOptions {
                config: SearchPanelConfig {
                    max_visible: 2,
                    keyword_field: Some("keyword".to_string()),
                    ..SearchPanelConfig::default()
                },
                callbacks: SearchCallbacks::default()
                    .on_search(move |filters| on_search(HostIntent::Search(filters.clone())))
                    .on_reset(|| info!("search filters cleared")),
            },
        )?
    };

    let table = {
        let edit = sink.clone();
        let delete = sink.clone();
        let batch = sink.clone();
        let (keyword, filter, refresh, create, export, sort, page) = (
            sink.clone(),
            sink.clone(),
            sink.clone(),
            sink.clone(),
            sink.clone(),
            sink.clone(),
            sink.clone(),
        );
        TableController::new(
            vec![
                ColumnDescriptor::new("Name", "name").sortable().filterable(),
                ColumnDescriptor::new("Email", "email").with_width(220),
                ColumnDescriptor::new("Role", "role")
                    .filterable()
                    .mapped(roles().into_iter().map(|o| (o.value, o.label))),
                ColumnDescriptor::new("Status", "status")
                    .mapped([(json!(1), "Active"), (json!(0), "Disabled")]),
                ColumnDescriptor::new("Created", "created_at").sortable(),
            ],
            TableOptions {
                config: TableConfig {
                    title: Some("Users".to_string()),
                    ..TableConfig::default()
                },
                row_actions: vec![
                    CommonActions::edit(move |row| {
                        edit(HostIntent::Edit(row_id(row)?));
                        Ok(())
                    }),
                    CommonActions::delete(move |row| {
                        delete(HostIntent::Delete(row_id(row)?));
                        Ok(())
                    }),
                ],
                batch_actions: vec![CommonActions::batch_delete(move |rows| {
                    let ids = rows.iter().map(row_id).collect::<Result<Vec<_>>>()?;
                    batch(HostIntent::BatchDelete(ids));
                    Ok(())
                })],
                pagination: None,
                callbacks: TableCallbacks::default()
                    .on_search(move |text| keyword(HostIntent::Keyword(text.to_string())))
                    .on_filter(move |filters| filter(HostIntent::Search(filters.clone())))
                    .on_refresh(move || refresh(HostIntent::Refresh))
                    .on_create(move || create(HostIntent::Create))
                    .on_export(move || export(HostIntent::Export))
                    .on_sort(move |key, direction| sort(HostIntent::Sort(key.to_string(), direction)))
                    .on_page_change(move |change| page(HostIntent::Page(change))),
            },
        )?
    };

    let form = {
        let save = sink;
        FormRenderer::new(
            vec![
                CommonFields::name(),
                FieldDescriptor::text("email", "Email")
                    .required()
                    .with_rule(ValidationRule::email())
                    .with_span(12),
                FieldDescriptor::select("role", "Role", roles())
                    .required()
                    .with_span(12),
                CommonFields::status(),
                CommonFields::divider("Settings"),
                FieldDescriptor::toggle("settings.emailNotification", "Email notifications"),
            ],
            FormOptions {
                config: FormConfig {
                    submit_text: "Save".to_string(),
                    ..FormConfig::default()
                },
                initial_values: Some(json!({"status": 1})),
                callbacks: FormCallbacks::default()
                    .on_finish(move |values| save(HostIntent::Save(values.clone())))
                    .on_finish_failed(|failed| {
                        warn!(fields = failed.error_fields.len(), "form rejected")
                    }),
            },
        )?
    };

    Ok(Screen {
        search,
        table,
        form,
    })
}

#[cfg(feature = "desktop")]
fn desktop_screen() -> crudkit_ui::CrudScreen {
    match build_screen(|intent| info!(?intent, "intent")) {
        Ok(screen) => crudkit_ui::CrudScreen {
            title: "User Management".to_string(),
            search: Some(screen.search),
            table: Some(screen.table),
            form: Some(screen.form),
        },
        Err(e) => {
            tracing::error!("failed to build the screen: {e:#}");
            crudkit_ui::CrudScreen::default()
        }
    }
}

// ============================================================================
// Host loop
// ============================================================================

struct Host {
    store: UserStore,
    query: Query,
    /// Row being edited by the form, if any
    editing: Option<RowId>,
    intents: mpsc::UnboundedReceiver<HostIntent>,
    results_tx: mpsc::UnboundedSender<HostResult>,
    results: mpsc::UnboundedReceiver<HostResult>,
}

impl Host {
    /// Start an effect for every queued intent, then apply their results
    async fn settle(&mut self, screen: &mut Screen) -> Result<()> {
        let mut pending = 0;
        while let Ok(mut intent) = self.intents.try_recv() {
            apply(&mut self.query, &intent);
            if let HostIntent::Save(Value::Object(values)) = &mut intent
                && let Some(id) = self.editing.take()
            {
                values.insert("id".to_string(), json!(id.as_str()));
            }
            if !matches!(
                intent,
                HostIntent::Create | HostIntent::Edit(_) | HostIntent::Export
            ) {
                screen.table.set_loading(true);
                screen.search.set_loading(true);
            }
            tokio::spawn(run_effect(
                self.store.clone(),
                intent,
                self.query.clone(),
                self.results_tx.clone(),
            ));
            pending += 1;
        }

        for _ in 0..pending {
            let Some(result) = self.results.recv().await else {
                bail!("effect channel closed");
            };
            self.apply_result(screen, result)?;
        }
        Ok(())
    }

    fn apply_result(&mut self, screen: &mut Screen, result: HostResult) -> Result<()> {
        match result {
            HostResult::Loaded { rows, total } => {
                screen.table.set_rows(rows)?;
                screen.table.set_pagination(Some(Pagination {
                    current: self.query.page.current,
                    page_size: self.query.page.page_size,
                    total,
                }));
                screen.table.set_loading(false);
                screen.search.set_loading(false);
            }
            HostResult::OpenForm(record) => {
                self.editing = record.as_ref().and_then(|r| RowId::from_record(r, "id"));
                let values = record.map(Value::Object).unwrap_or_else(|| json!({"status": 1}));
                screen.form.set_initial_values(values);
            }
            HostResult::Exported(data) => {
                println!("exported {} bytes", data.len());
            }
        }
        Ok(())
    }
}

fn step(title: &str) {
    println!();
    println!("── {} {}", title, "─".repeat(50usize.saturating_sub(title.len())));
}

/// Scripted session against the in-memory host
async fn walkthrough() -> Result<()> {
    let (intent_tx, intents) = mpsc::unbounded_channel();
    let (results_tx, results) = mpsc::unbounded_channel();
    let mut screen = build_screen(move |intent| {
        if intent_tx.send(intent).is_err() {
            warn!("host stopped; intent dropped");
        }
    })?;
    let mut host = Host {
        store: UserStore::seeded(),
        query: Query::default(),
        editing: None,
        intents,
        results_tx,
        results,
    };

    step("Initial load");
    screen.table.refresh()?;
    host.settle(&mut screen).await?;
    println!("{}", render_search(&screen.search)?);
    println!("{}", render_table(&screen.table));

    step("Filter by role");
    screen.search.set_value("role", json!("viewer"))?;
    screen.search.search();
    host.settle(&mut screen).await?;
    println!("{}", render_table(&screen.table));

    step("Reset filters, sort by name descending");
    screen.search.reset();
    host.settle(&mut screen).await?;
    screen.table.sort("name")?;
    screen.table.sort("name")?;
    host.settle(&mut screen).await?;
    println!("{}", render_table(&screen.table));

    step("Delete with confirmation");
    let first = screen
        .table
        .render_rows()
        .first()
        .map(|row| row.id.clone())
        .context("table is empty")?;
    if screen.table.trigger_row_action(&first, "delete")? == ActionOutcome::AwaitingConfirmation
        && let Some(pending) = screen.table.pending_confirmation()
    {
        println!("? {} ({})", pending.prompt.title, pending.prompt.description);
    }
    let outcome = screen.table.confirm()?;
    info!(?outcome, "confirmed");
    host.settle(&mut screen).await?;
    println!("{}", render_table(&screen.table));

    step("Batch delete");
    let ids: Vec<RowId> = screen.table.render_rows().iter().take(2).map(|r| r.id.clone()).collect();
    for id in &ids {
        screen.table.toggle_row(id)?;
    }
    println!("{}", render_table(&screen.table));
    screen.table.run_batch_action("batch_delete")?;
    host.settle(&mut screen).await?;
    println!("{}", render_table(&screen.table));

    step("Create");
    screen.table.create()?;
    host.settle(&mut screen).await?;
    let name = FieldPath::from("name");
    let email = FieldPath::from("email");
    screen.form.set_value(&name, json!("Alan Turing"))?;
    screen.form.set_value(&email, json!("alan-at-example"))?;
    if let SubmitOutcome::Rejected(failed) = screen.form.submit() {
        println!("{}", render_form(&screen.form)?);
        println!("rejected: {} field(s)", failed.error_fields.len());
    }
    screen.form.set_value(&email, json!("alan@example.com"))?;
    screen.form.set_value(&FieldPath::from("role"), json!("editor"))?;
    screen.form.submit();
    host.settle(&mut screen).await?;
    println!("{}", render_table(&screen.table));

    step("Edit");
    let target = screen
        .table
        .render_rows()
        .last()
        .map(|row| row.id.clone())
        .context("table is empty")?;
    screen.table.trigger_row_action(&target, "edit")?;
    host.settle(&mut screen).await?;
    screen.form.set_value(&FieldPath::from("status"), json!(0))?;
    println!("{}", render_form(&screen.form)?);
    screen.form.submit();
    host.settle(&mut screen).await?;

    step("Keyword search, export");
    screen.table.search("example")?;
    host.settle(&mut screen).await?;
    screen.table.export()?;
    host.settle(&mut screen).await?;
    println!("{}", render_table(&screen.table));

    Ok(())
}
