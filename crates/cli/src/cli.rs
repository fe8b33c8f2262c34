//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use crudkit_cli::commands::ViewKind;

#[derive(Parser)]
#[command(
    name = "crudkit",
    version,
    about = "crudkit - check and preview declarative admin screens",
    long_about = "Work with crudkit descriptor files.\n\n\
                  A descriptor file declares the form fields, search filters and\n\
                  table columns of one admin screen."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate descriptor files and directories of them.
    Check(CheckArgs),

    /// Preview the views of a descriptor file as text.
    Render(RenderArgs),

    /// Summarize a descriptor file.
    Info(InfoArgs),

    /// Write a sample descriptor file.
    New(NewArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Files or directories to check.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Treat warnings as failures.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser)]
pub struct RenderArgs {
    /// Descriptor file to render.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// View to render.
    #[arg(long, value_enum, default_value = "all")]
    pub view: ViewArg,

    /// JSON object with initial form values.
    #[arg(long, value_name = "FILE")]
    pub values: Option<PathBuf>,

    /// JSON array of table rows.
    #[arg(long, value_name = "FILE")]
    pub rows: Option<PathBuf>,

    /// Attempt a submit and print the outcome.
    #[arg(long)]
    pub submit: bool,
}

#[derive(Parser)]
pub struct InfoArgs {
    /// Descriptor file to summarize.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct NewArgs {
    /// Screen title; also names the file.
    #[arg(value_name = "TITLE")]
    pub title: String,

    /// Directory to write into.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ViewArg {
    Form,
    Search,
    Table,
    All,
}

impl From<ViewArg> for ViewKind {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Form => ViewKind::Form,
            ViewArg::Search => ViewKind::Search,
            ViewArg::Table => ViewKind::Table,
            ViewArg::All => ViewKind::All,
        }
    }
}
