//! Command implementations.
//!
//! Everything here returns data or text; `main` decides how it is printed
//! and which exit code it maps to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use crudkit_core::{CrudResult, Record, Value};
use crudkit_descriptor::{
    ColumnDescriptor, CommonFields, CommonSearchFields, DescriptorFile, FieldDescriptor,
    FieldOption, Pagination, SearchFieldDescriptor, ValidationRule, default_file_name,
    is_descriptor_file, load_descriptors, save_descriptors,
};
use crudkit_ui::{
    FormOptions, FormRenderer, SearchOptions, SearchPanelController, SubmitOutcome,
    TableController, TableOptions, render_form, render_search, render_table,
};
use tracing::{debug, info};
use walkdir::WalkDir;

// ============================================================================
// check
// ============================================================================

/// Check result of one descriptor file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Expand files and directories into the descriptor files they name.
///
/// Directories are walked recursively; only `.json` files are picked up
/// there. Files named explicitly are taken as given.
pub fn collect_descriptor_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry
                    .with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && is_descriptor_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            bail!("path not found: {}", path.display());
        }
    }
    files.sort();
    files.dedup();
    debug!(count = files.len(), "collected descriptor files");
    Ok(files)
}

/// Load and check one file.
///
/// Loading problems and descriptor-contract violations become errors. A file
/// that passes the list checks is also handed to the three controllers, so
/// options that only they reject (an unknown keyword field, an empty row
/// key) are reported too.
pub fn check_file(path: &Path) -> FileReport {
    let mut report = FileReport {
        path: path.to_path_buf(),
        ..FileReport::default()
    };

    let file = match load_descriptors(path) {
        Ok(file) => file,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };

    let result = file.check();
    report.errors.extend(result.errors.iter().map(ToString::to_string));
    report
        .warnings
        .extend(result.warnings.iter().map(ToString::to_string));

    if report.errors.is_empty()
        && let Err(e) = Views::build(&file, ViewInputs::default())
    {
        report.errors.push(e.to_string());
    }

    debug!(
        path = %path.display(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "checked descriptor file"
    );
    report
}

// ============================================================================
// render
// ============================================================================

/// Which views `render` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Form,
    Search,
    Table,
    All,
}

impl ViewKind {
    fn includes(self, other: ViewKind) -> bool {
        self == ViewKind::All || self == other
    }
}

/// Host data fed into the controllers
#[derive(Debug, Clone, Default)]
pub struct ViewInputs {
    /// Initial form values
    pub values: Option<Value>,
    pub rows: Vec<Record>,
}

impl ViewInputs {
    /// Read the optional `--values` and `--rows` JSON files
    pub fn load(values: Option<&Path>, rows: Option<&Path>) -> Result<Self> {
        let values = values.map(read_json).transpose()?;
        let rows = match rows.map(read_json).transpose()? {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(record) => Ok(record),
                    _ => bail!("row {} is not a JSON object", index),
                })
                .collect::<Result<_>>()?,
            Some(_) => bail!("rows file must hold a JSON array of objects"),
        };
        Ok(Self { values, rows })
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// The three controllers of a descriptor file
pub struct Views {
    pub form: FormRenderer,
    pub search: SearchPanelController,
    pub table: TableController,
}

impl Views {
    /// Build every controller, failing on the first rejected descriptor
    pub fn build(file: &DescriptorFile, inputs: ViewInputs) -> CrudResult<Self> {
        let form = FormRenderer::new(
            file.fields.clone(),
            FormOptions {
                config: file.form.clone(),
                initial_values: inputs.values,
                ..FormOptions::default()
            },
        )?;

        let search = SearchPanelController::new(
            file.search_fields.clone(),
            SearchOptions {
                config: file.search.clone(),
                ..SearchOptions::default()
            },
        )?;

        let mut table = TableController::new(
            file.columns.clone(),
            TableOptions {
                config: file.table.clone(),
                ..TableOptions::default()
            },
        )?;
        let total = inputs.rows.len() as u64;
        table.set_rows(inputs.rows)?;
        table.set_pagination(Some(Pagination {
            total,
            ..Pagination::default()
        }));

        Ok(Self {
            form,
            search,
            table,
        })
    }
}

/// Options of the `render` command
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub file: &'a Path,
    pub view: ViewKind,
    pub values: Option<&'a Path>,
    pub rows: Option<&'a Path>,
    /// Also run a submit attempt and print its outcome
    pub submit: bool,
}

/// Render the requested views of a descriptor file as text
pub fn render(request: RenderRequest<'_>) -> Result<String> {
    let file = load_descriptors(request.file)
        .with_context(|| format!("failed to load {}", request.file.display()))?;
    let inputs = ViewInputs::load(request.values, request.rows)?;
    let mut views = Views::build(&file, inputs)
        .with_context(|| format!("invalid descriptors in {}", request.file.display()))?;

    let mut sections = Vec::new();
    if request.view.includes(ViewKind::Search) && !file.search_fields.is_empty() {
        sections.push(format!("== Search ==\n{}", render_search(&views.search)?));
    }
    if request.view.includes(ViewKind::Table) && !file.columns.is_empty() {
        sections.push(format!("== Table ==\n{}", render_table(&views.table)));
    }
    if request.view.includes(ViewKind::Form) && !file.fields.is_empty() {
        sections.push(format!("== Form ==\n{}", render_form(&views.form)?));
        if request.submit {
            let outcome = views.form.submit();
            sections.push(format!("== Submit ==\n{}", describe_outcome(&outcome)?));
        }
    }

    info!(
        file = %request.file.display(),
        sections = sections.len(),
        "rendered descriptor file"
    );
    Ok(sections.join("\n\n"))
}

fn describe_outcome(outcome: &SubmitOutcome) -> Result<String> {
    Ok(match outcome {
        SubmitOutcome::Submitted(values) => {
            format!("submitted\n{}", serde_json::to_string_pretty(values)?)
        }
        SubmitOutcome::Rejected(info) => {
            let lines: Vec<String> = info
                .error_fields
                .iter()
                .map(|field| format!("  {}: {}", field.name, field.errors.join("; ")))
                .collect();
            format!("rejected\n{}", lines.join("\n"))
        }
        SubmitOutcome::Suppressed => "suppressed (loading)".to_string(),
    })
}

// ============================================================================
// info
// ============================================================================

/// Summarize a descriptor file
pub fn info(path: &Path) -> Result<String> {
    let file =
        load_descriptors(path).with_context(|| format!("failed to load {}", path.display()))?;

    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    for field in &file.fields {
        *kinds.entry(field.kind.as_str()).or_default() += 1;
    }
    let kinds = kinds
        .iter()
        .map(|(kind, count)| format!("{} x{}", kind, count))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = vec![
        format!("Title:          {}", file.title),
        format!("Schema version: {}", file.schema_version),
        format!("Form fields:    {}", file.fields.len()),
    ];
    if !kinds.is_empty() {
        out.push(format!("  kinds:        {}", kinds));
    }
    let required = file.fields.iter().filter(|f| f.required).count();
    out.push(format!("  required:     {}", required));
    out.push(format!("Search fields:  {}", file.search_fields.len()));
    if let Some(keyword) = &file.search.keyword_field {
        out.push(format!("  keyword:      {}", keyword));
    }
    out.push(format!("Columns:        {}", file.columns.len()));
    let sortable = file.columns.iter().filter(|c| c.sortable).count();
    out.push(format!("  sortable:     {}", sortable));
    out.push(format!("Row key:        {}", file.table.row_key));
    Ok(out.join("\n"))
}

// ============================================================================
// new
// ============================================================================

/// A user-management screen to start from
pub fn sample_descriptor(title: &str) -> DescriptorFile {
    let roles = vec![
        FieldOption::new("Administrator", "admin"),
        FieldOption::new("Editor", "editor"),
        FieldOption::new("Viewer", "viewer"),
    ];

    let fields: Vec<FieldDescriptor> = vec![
        CommonFields::name(),
        FieldDescriptor::text("email", "Email")
            .required()
            .with_rule(ValidationRule::email())
            .with_span(12),
        FieldDescriptor::select("role", "Role", roles.clone())
            .required()
            .with_span(12),
        CommonFields::status(),
        CommonFields::divider("Settings"),
        FieldDescriptor::toggle("settings.emailNotification", "Email notifications")
            .with_span(12),
        CommonFields::description(),
    ];

    let search_fields: Vec<SearchFieldDescriptor> = vec![
        CommonSearchFields::keyword(),
        CommonSearchFields::status(),
        SearchFieldDescriptor::select("role", "Role", roles),
        CommonSearchFields::date_range(),
    ];

    let columns = vec![
        ColumnDescriptor::new("Name", "name").sortable().filterable(),
        ColumnDescriptor::new("Email", "email").with_width(220),
        ColumnDescriptor::new("Role", "role"),
        ColumnDescriptor::new("Status", "status"),
        ColumnDescriptor::new("Created", "created_at").sortable(),
    ];

    let mut file = DescriptorFile::new(title)
        .with_fields(fields)
        .with_search_fields(search_fields)
        .with_columns(columns);
    file.search.keyword_field = Some("keyword".to_string());
    file.table.title = Some(title.to_string());
    file
}

/// Write the sample descriptor for `title` into `dir`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn create_descriptor(title: &str, dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(default_file_name(title));
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    save_descriptors(&sample_descriptor(title), &path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "created descriptor file");
    Ok(path)
}
