use std::collections::BTreeSet;
use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::ProjectAnalyzerResult;

/// A definition file that could not be analyzed, with the rendered error chain.
pub struct Failure<'a> {
    pub definition_file: &'a Path,
    pub message: String,
}

/// Render a colored terminal report.
pub fn render(results: &[ProjectAnalyzerResult], failures: &[Failure<'_>], path: &Path, quiet: bool) {
    let packages: usize = results.iter().map(|r| r.packages.len()).sum();

    if quiet {
        println!(
            "Projects: {}  Packages: {}  Failed: {}",
            results.len().to_string().green(),
            packages,
            failures.len().to_string().red(),
        );
        return;
    }

    println!("\n {} v{}", "conan-scan".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Scanning: {}\n", path.display());

    if !results.is_empty() {
        println!(" {} Projects:\n", "[OK]".green().bold());
        println!("{}", project_table(results));
        println!();
    }

    if !failures.is_empty() {
        println!(" {} Definition files that could not be analyzed:\n", "[ERROR]".red().bold());
        for failure in failures {
            println!("   {} {}", "✗".red(), failure.definition_file.display());
            for line in failure.message.lines() {
                println!("     {}", line.dimmed());
            }
        }
        println!();
    }

    println!(
        " {} projects, {} packages, {} failed",
        results.len(),
        packages,
        failures.len()
    );
}

fn project_table(results: &[ProjectAnalyzerResult]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Definition file").add_attribute(Attribute::Bold),
            Cell::new("Project").add_attribute(Attribute::Bold),
            Cell::new("Licenses").add_attribute(Attribute::Bold),
            Cell::new("Authors").add_attribute(Attribute::Bold),
            Cell::new("Homepage").add_attribute(Attribute::Bold),
            Cell::new("VCS").add_attribute(Attribute::Bold),
        ]);

    for result in results {
        let project = &result.project;
        let licenses = join_or_dash(&project.declared_licenses);
        let licenses_color = if project.declared_licenses.is_empty() {
            Color::DarkGrey
        } else {
            Color::Green
        };

        table.add_row(vec![
            Cell::new(&project.definition_file_path),
            Cell::new(project.id.to_string()),
            Cell::new(licenses).fg(licenses_color),
            Cell::new(join_or_dash(&project.authors)),
            Cell::new(or_dash(&project.homepage_url)),
            Cell::new(if project.vcs.is_empty() { "-" } else { project.vcs.url.as_str() }),
        ]);
    }

    table
}

fn join_or_dash(values: &BTreeSet<String>) -> String {
    let joined = values
        .iter()
        .filter(|v| !v.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    or_dash(&joined).to_string()
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
