//! `conan-scan`: analyze Conan 2 projects and report their metadata.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and initialize logging ([`logging`]).
//! 2. Load config ([`config::load_config`]) and merge CLI options into it.
//! 3. Check the installed Conan version ([`tool::CommandLineTool::check_version`]).
//! 4. Find definition files ([`detector::find_definition_files`]).
//! 5. Resolve each one independently ([`analyzer::conan::Conan2`]): run
//!    `conan graph info`, decode the graph ([`graph`]), project the root node.
//! 6. Render the requested report ([`report`]).
//! 7. Exit `0` (all analyzed) or `1` (nothing found or at least one failure).

mod analyzer;
mod cli;
mod config;
mod detector;
mod graph;
mod logging;
mod models;
mod report;
mod tool;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use analyzer::conan::{Conan2, OPTION_LOCKFILE_NAME};
use analyzer::PackageManager;
use cli::{Cli, ReportFormat};
use config::{load_config, parse_option};
use detector::find_definition_files;
use report::terminal::Failure;
use tool::CommandLineTool;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());
    let analysis_root = if path.is_file() {
        path.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| path.clone())
    } else {
        path.clone()
    };

    let mut config = load_config(&analysis_root, cli.config.as_deref())?;
    for raw in &cli.options {
        let (key, value) = parse_option(raw)?;
        config.conan.options.insert(key, value);
    }
    if let Some(lockfile) = &cli.lockfile {
        config
            .conan
            .options
            .insert(OPTION_LOCKFILE_NAME.to_string(), lockfile.clone());
    }
    if let Some(command) = &cli.conan {
        config.conan.command = command.clone();
    }

    let conan = Conan2::new(&analysis_root, config.conan.options).with_command(config.conan.command);

    if cli.skip_version_check || config.conan.skip_version_check {
        warn!("skipping Conan version check");
    } else {
        let version = conan.check_version(Some(&analysis_root))?;
        info!(%version, "using Conan");
    }

    let definition_files = find_definition_files(&path, conan.definition_file_patterns())?;
    if definition_files.is_empty() {
        eprintln!("No Conan definition files found in {}", path.display());
        std::process::exit(1);
    }

    let mut results = Vec::new();
    let mut failures = Vec::new();

    for definition_file in &definition_files {
        match conan.resolve_dependencies(definition_file) {
            Ok(project_results) => results.extend(project_results),
            Err(e) => {
                error!(file = %definition_file.display(), error = %format!("{e:#}"), "analysis failed");
                failures.push(Failure {
                    definition_file,
                    message: format!("{e:#}"),
                });
            }
        }
    }

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&results, &failures, &path, cli.quiet);
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    if !failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
