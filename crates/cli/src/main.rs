//! crudkit CLI.

use clap::Parser;
use colored::Colorize;
use crudkit_cli::commands::{
    FileReport, RenderRequest, check_file, collect_descriptor_files, create_descriptor, info,
    render,
};
use crudkit_cli::logging::init_logging;
use std::io::{self, IsTerminal};

mod cli;

use crate::cli::{CheckArgs, Cli, Command};

fn main() {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    let with_ansi = !cli.no_color && io::stderr().is_terminal();
    if let Err(error) = init_logging(cli.verbose, with_ansi) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }

    let exit_code = match run(cli.command) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: Command) -> anyhow::Result<i32> {
    match command {
        Command::Check(args) => run_check(&args),
        Command::Render(args) => {
            let text = render(RenderRequest {
                file: &args.file,
                view: args.view.into(),
                values: args.values.as_deref(),
                rows: args.rows.as_deref(),
                submit: args.submit,
            })?;
            println!("{text}");
            Ok(0)
        }
        Command::Info(args) => {
            println!("{}", info(&args.file)?);
            Ok(0)
        }
        Command::New(args) => {
            let path = create_descriptor(&args.title, &args.dir, args.force)?;
            println!("{} {}", "Created".green().bold(), path.display());
            Ok(0)
        }
    }
}

fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let files = collect_descriptor_files(&args.paths)?;
    let reports: Vec<FileReport> = files.iter().map(|path| check_file(path)).collect();

    for report in &reports {
        print_report(report);
    }

    let errors: usize = reports.iter().map(|r| r.errors.len()).sum();
    let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();
    let summary = format!(
        "Checked {} file(s): {} error(s), {} warning(s)",
        reports.len(),
        errors,
        warnings
    );
    if errors > 0 {
        println!("{}", summary.red().bold());
    } else if warnings > 0 {
        println!("{}", summary.yellow().bold());
    } else {
        println!("{}", summary.green().bold());
    }

    let failed = errors > 0 || (args.strict && warnings > 0);
    Ok(if failed { 1 } else { 0 })
}

fn print_report(report: &FileReport) {
    let path = report.path.display();
    if report.is_valid() {
        println!("{} {}", "✓".green(), path);
    } else {
        println!("{} {}", "✗".red(), path);
    }
    for error in &report.errors {
        println!("  {} {}", "error:".red(), error);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
}
