//! polymesh check command - check a finalized mesh for topology problems.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use polymesh::PolyMesh;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct CheckResult {
    path: String,
    valid: bool,
    issues: Vec<IssueInfo>,
}

#[derive(Serialize)]
struct IssueInfo {
    category: String,
    message: String,
    severity: String,
}

fn issue(category: &str, message: String, severity: &str) -> IssueInfo {
    IssueInfo {
        category: category.to_string(),
        message,
        severity: severity.to_string(),
    }
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh =
        PolyMesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let report = mesh.validate();
    let mut issues = Vec::new();

    if report.owner_length_mismatch {
        issues.push(issue(
            "arrays",
            "Owner or neighbour array length does not match the faces".to_string(),
            "error",
        ));
    }
    if report.out_of_range_cells > 0 {
        issues.push(issue(
            "arrays",
            format!(
                "{} owner/neighbour entries name a cell outside [0, {})",
                report.out_of_range_cells, report.cell_count
            ),
            "error",
        ));
    }
    if report.upper_triangular_violations > 0 {
        issues.push(issue(
            "ordering",
            format!(
                "{} internal faces have owner >= neighbour",
                report.upper_triangular_violations
            ),
            "error",
        ));
    }
    if report.multiply_connected_pairs > 0 {
        issues.push(issue(
            "topology",
            format!(
                "{} cell pairs share more than one face",
                report.multiply_connected_pairs
            ),
            "error",
        ));
    }
    if report.uncovered_boundary_faces > 0 {
        issues.push(issue(
            "boundary",
            format!(
                "{} boundary faces belong to no patch",
                report.uncovered_boundary_faces
            ),
            "warning",
        ));
    }
    if let Some(msg) = &report.boundary_contiguity {
        issues.push(issue("boundary", msg.clone(), "warning"));
    }

    let result = CheckResult {
        path: input.display().to_string(),
        valid: report.is_valid(),
        issues,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Topology Check".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());

                if result.valid {
                    println!("  {}: {}", "Status".cyan(), "Valid".green().bold());
                } else {
                    println!("  {}: {}", "Status".cyan(), "Issues found".red().bold());
                }

                if !result.issues.is_empty() {
                    println!("\n{}", "Issues:".bold());
                    for issue in &result.issues {
                        let icon = match issue.severity.as_str() {
                            "error" => "✗".red(),
                            "warning" => "⚠".yellow(),
                            _ => "ℹ".blue(),
                        };
                        println!("  {} [{}] {}", icon, issue.category, issue.message);
                    }
                }
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}
