//! Plain-text toolkit
//!
//! A widget registry that renders each field as one line of text, plus
//! whole-view renderers built on it. Used by the CLI preview and by tests.

use crate::form::FormRenderer;
use crate::layout::pack_rows;
use crate::search::SearchPanelController;
use crate::table::{ColumnRole, TableController};
use crate::widget::{RenderedField, WidgetRegistry, WidgetRequest};
use crudkit_core::{CrudResult, Value, display_text, is_blank};
use crudkit_descriptor::FieldKind;

/// Registry rendering fields to text lines
pub type TextRegistry = WidgetRegistry<String>;

/// Text rendering toolkit
pub struct TextToolkit;

impl TextToolkit {
    /// Registry with a text strategy for every field kind
    pub fn registry() -> TextRegistry {
        TextRegistry::new()
            .with(FieldKind::Text, |req| line(req, plain(req)))
            .with(FieldKind::MultilineText, |req| line(req, plain(req)))
            .with(FieldKind::Number, |req| line(req, plain(req)))
            .with(FieldKind::Date, |req| line(req, plain(req)))
            .with(FieldKind::Time, |req| line(req, plain(req)))
            .with(FieldKind::SecretText, |req| line(req, secret(req)))
            .with(FieldKind::SingleSelect, |req| line(req, selected(req)))
            .with(FieldKind::MultiSelect, |req| line(req, selected(req)))
            .with(FieldKind::RadioGroup, |req| line(req, choices(req, "(•)", "( )")))
            .with(FieldKind::CheckboxGroup, |req| line(req, choices(req, "[x]", "[ ]")))
            .with(FieldKind::Toggle, |req| {
                let on = req.value.and_then(Value::as_bool).unwrap_or(false);
                line(req, if on { "[on]" } else { "[off]" }.to_string())
            })
            .with(FieldKind::DateRange, |req| line(req, date_range(req)))
            .with(FieldKind::FileUpload, |req| {
                let count = req.value.and_then(Value::as_array).map_or(0, Vec::len);
                line(req, format!("{} file(s)", count))
            })
            .with(FieldKind::SectionBreak, |req| {
                format!("── {} ──", req.field.display_label())
            })
    }
}

fn line(req: &WidgetRequest<'_>, body: String) -> String {
    let mut out = format!("{}: {}", req.label(), body);
    if req.disabled {
        out.push_str(" (disabled)");
    }
    if let Some(error) = req.error {
        out.push_str("\n  ! ");
        out.push_str(error);
    }
    out
}

fn placeholder(req: &WidgetRequest<'_>) -> String {
    format!("<{}>", req.field.display_placeholder())
}

fn plain(req: &WidgetRequest<'_>) -> String {
    if is_blank(req.value) {
        placeholder(req)
    } else {
        display_text(req.value)
    }
}

fn secret(req: &WidgetRequest<'_>) -> String {
    match req.value.and_then(Value::as_str) {
        Some(s) if !s.is_empty() => "*".repeat(s.chars().count()),
        _ => placeholder(req),
    }
}

fn option_text(req: &WidgetRequest<'_>, value: &Value) -> String {
    req.field
        .option_label(value)
        .map(str::to_string)
        .unwrap_or_else(|| display_text(Some(value)))
}

fn selected(req: &WidgetRequest<'_>) -> String {
    match req.value {
        _ if is_blank(req.value) => placeholder(req),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| option_text(req, v))
            .collect::<Vec<_>>()
            .join(", "),
        Some(value) => option_text(req, value),
        None => placeholder(req),
    }
}

fn choices(req: &WidgetRequest<'_>, on: &str, off: &str) -> String {
    let is_chosen = |value: &Value| match req.value {
        Some(Value::Array(items)) => items.contains(value),
        Some(current) => current == value,
        None => false,
    };
    req.field
        .options
        .iter()
        .map(|o| {
            let mark = if is_chosen(&o.value) { on } else { off };
            format!("{} {}", mark, o.label)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn date_range(req: &WidgetRequest<'_>) -> String {
    match req.value.and_then(Value::as_array).map(Vec::as_slice) {
        Some([start, end]) => format!("[{} ~ {}]", display_text(Some(start)), display_text(Some(end))),
        _ => placeholder(req),
    }
}

fn grid(fields: Vec<RenderedField<String>>) -> Vec<String> {
    pack_rows(fields.into_iter().map(|f| (f.span, f.output)))
        .into_iter()
        .map(|row| row.join(" | "))
        .collect()
}

/// Form as text: one line per grid row, then the buttons
pub fn render_form(form: &FormRenderer) -> CrudResult<String> {
    let registry = TextToolkit::registry();
    let mut lines = grid(form.render(&registry, |_| ())?);

    let config = form.config();
    let mut buttons = format!("[{}]", config.submit_text);
    if !form.submit_enabled() {
        buttons.push_str(" (loading)");
    }
    if config.show_reset {
        buttons.push_str(&format!(" [{}]", config.reset_text));
    }
    lines.push(buttons);
    Ok(lines.join("\n"))
}

/// Search panel as text: visible filters, then the buttons
pub fn render_search(panel: &SearchPanelController) -> CrudResult<String> {
    let registry = TextToolkit::registry();
    let mut lines = grid(panel.render(&registry, |_| ())?);

    let config = panel.config();
    let mut buttons = format!("[{}] [{}]", config.search_text, config.reset_text);
    if panel.collapse_toggle_visible() {
        buttons.push_str(if panel.collapsed() { " Expand ▾" } else { " Collapse ▴" });
    }
    lines.push(buttons);
    Ok(lines.join("\n"))
}

/// Table as text: toolbar, header, rows and the pager summary
pub fn render_table(table: &TableController) -> String {
    let columns = table.columns();
    let rows = table.render_rows();
    let mut lines = Vec::new();

    if let Some(title) = &table.config().title {
        lines.push(title.clone());
    }

    let toolbar = &table.config().toolbar;
    let mut tools = Vec::new();
    if toolbar.creatable {
        tools.push(format!("[+ {}]", table.config().create_text));
    }
    for trigger in table.batch_triggers() {
        tools.push(format!("[{}]", trigger.text()));
    }
    if toolbar.searchable {
        tools.push(format!("[search: {}]", table.search_text()));
    }
    if toolbar.refreshable {
        tools.push("[refresh]".to_string());
    }
    if toolbar.exportable {
        tools.push("[export]".to_string());
    }
    if !tools.is_empty() {
        lines.push(tools.join(" "));
    }

    let mut table_rows: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    table_rows.push(
        columns
            .iter()
            .map(|c| match c.sort {
                Some(dir) => format!("{} {}", c.title, dir),
                None => c.title.clone(),
            })
            .collect(),
    );
    for row in &rows {
        let mut cells = row.cells.clone();
        if columns.iter().any(|c| c.role == ColumnRole::Actions) {
            let actions: Vec<&str> = row.actions.iter().map(|a| a.label.as_str()).collect();
            cells.push(actions.join(" "));
        }
        table_rows.push(cells);
    }

    let widths: Vec<usize> = (0..columns.len())
        .map(|i| {
            table_rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let selectable = table.selectable();
    for (index, cells) in table_rows.iter().enumerate() {
        let mark = match index {
            _ if !selectable => "",
            0 if table.is_all_selected() => "[x] ",
            0 => "[ ] ",
            i if rows[i - 1].selected => "[x] ",
            _ => "[ ] ",
        };
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        lines.push(format!("{}{}", mark, padded.join(" | ").trim_end()));
    }
    if rows.is_empty() {
        lines.push("No data".to_string());
    }

    if let Some(pagination) = table.pagination() {
        lines.push(format!(
            "{}  page {}/{}  {} / page",
            pagination.summary(),
            pagination.current,
            pagination.page_count(),
            pagination.page_size
        ));
    }
    if table.loading() {
        lines.push("(loading)".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormOptions;
    use crate::table::TableOptions;
    use crudkit_core::{FieldPath, Record};
    use crudkit_descriptor::{
        ColumnDescriptor, CommonActions, FieldDescriptor, FieldOption, Pagination,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render_one(field: &FieldDescriptor, value: Option<&Value>, error: Option<&str>) -> String {
        let registry = TextToolkit::registry();
        registry
            .render(&WidgetRequest {
                field,
                value,
                error,
                disabled: field.disabled,
                on_change: &(),
            })
            .unwrap()
    }

    #[test]
    fn test_registry_covers_every_kind() {
        assert!(TextToolkit::registry().missing_kinds().is_empty());
    }

    #[test]
    fn test_text_and_placeholder() {
        let field = FieldDescriptor::text("name", "Name").required();
        assert_eq!(render_one(&field, None, None), "Name*: <Please enter Name>");
        assert_eq!(render_one(&field, Some(&json!("Ada")), None), "Name*: Ada");
        assert_eq!(
            render_one(&field, None, Some("Please enter Name")),
            "Name*: <Please enter Name>\n  ! Please enter Name"
        );
    }

    #[test]
    fn test_secret_is_masked() {
        let field = FieldDescriptor::secret("password", "Password");
        assert_eq!(render_one(&field, Some(&json!("hunter2")), None), "Password: *******");
    }

    #[test]
    fn test_choice_kinds() {
        let options = [FieldOption::new("Active", 1), FieldOption::new("Disabled", 0)];
        let select = FieldDescriptor::select("status", "Status", options.clone());
        assert_eq!(render_one(&select, Some(&json!(0)), None), "Status: Disabled");

        let radio = FieldDescriptor::radio("status", "Status", options);
        assert_eq!(render_one(&radio, Some(&json!(1)), None), "Status: (•) Active  ( ) Disabled");

        let toggle = FieldDescriptor::toggle("notify", "Notify").disabled();
        assert_eq!(render_one(&toggle, Some(&json!(true)), None), "Notify: [on] (disabled)");
    }

    #[test]
    fn test_date_range_and_section() {
        let range = FieldDescriptor::new("period", "Period", FieldKind::DateRange);
        assert_eq!(
            render_one(&range, Some(&json!(["2024-01-01", "2024-01-31"])), None),
            "Period: [2024-01-01 ~ 2024-01-31]"
        );
        assert_eq!(render_one(&FieldDescriptor::section_break("Advanced"), None, None), "── Advanced ──");
    }

    #[test]
    fn test_render_form_rows() {
        let form = FormRenderer::new(
            vec![
                FieldDescriptor::text("first", "First").with_span(12),
                FieldDescriptor::text("last", "Last").with_span(12),
                FieldDescriptor::text("email", "Email"),
            ],
            FormOptions {
                initial_values: Some(json!({"first": "Ada"})),
                ..Default::default()
            },
        )
        .unwrap();

        let text = render_form(&form).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "First: Ada | Last: <Please enter Last>");
        assert_eq!(lines[1], "Email: <Please enter Email>");
        assert_eq!(lines[2], "[Submit] [Reset]");
        assert_eq!(form.value(&FieldPath::new("first")), Some(&json!("Ada")));
    }

    #[test]
    fn test_render_table() {
        let mut table = TableController::new(
            vec![ColumnDescriptor::new("Name", "name")],
            TableOptions {
                row_actions: vec![CommonActions::edit(|_| Ok(()))],
                batch_actions: vec![CommonActions::batch_delete(|_| Ok(()))],
                pagination: Some(Pagination {
                    current: 1,
                    page_size: 10,
                    total: 2,
                }),
                ..Default::default()
            },
        )
        .unwrap();
        let rows: Vec<Record> = vec![
            serde_json::from_value(json!({"id": 1, "name": "Alice"})).unwrap(),
            serde_json::from_value(json!({"id": 2, "name": "Bob"})).unwrap(),
        ];
        table.set_rows(rows).unwrap();
        table.toggle_row(&"2".into()).unwrap();

        let text = render_table(&table);
        assert!(text.contains("[Delete (1)]"));
        assert!(text.contains("[ ] Name  | Actions"));
        assert!(text.contains("[x] Bob   | Edit"));
        assert!(text.ends_with("Total 2 items  page 1/1  10 / page"));
    }
}
