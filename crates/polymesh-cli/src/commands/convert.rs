//! polymesh convert command - build a finalized mesh from reader output.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use polymesh::{ConvertParams, IssueSeverity, RawMesh, TopologyIssue};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

/// Command-line settings layered over the parameter file.
pub struct Overrides<'a> {
    pub config: Option<&'a Path>,
    pub scale: Option<f64>,
    pub face_ref_base: Option<i64>,
    pub no_repair: bool,
    pub no_checks: bool,
}

impl Overrides<'_> {
    fn params(&self) -> Result<ConvertParams> {
        let mut params = match self.config {
            Some(path) => ConvertParams::from_json_file(path)
                .with_context(|| format!("Failed to load parameters from {:?}", path))?,
            None => ConvertParams::default(),
        };

        if let Some(scale) = self.scale {
            params.scale = scale;
        }
        if let Some(base) = self.face_ref_base {
            params.face_ref_base = base;
        }
        if self.no_repair {
            params.repair_multiply_connected = false;
        }
        if self.no_checks {
            params.validate_input = false;
            params.check_boundary_contiguity = false;
        }
        Ok(params)
    }
}

#[derive(Serialize)]
struct ConvertResult {
    input: String,
    output: String,
    points: usize,
    faces: usize,
    internal_faces: usize,
    cells: usize,
    patches: usize,
    flipped_faces: usize,
    multiply_connected_pairs: usize,
    faces_removed: usize,
    unresolved_pairs: usize,
    issues: Vec<IssueInfo>,
}

#[derive(Serialize)]
struct IssueInfo {
    code: &'static str,
    severity: String,
    message: String,
    suggestion: &'static str,
}

impl From<&TopologyIssue> for IssueInfo {
    fn from(issue: &TopologyIssue) -> Self {
        Self {
            code: issue.code(),
            severity: issue.severity().to_string(),
            message: issue.to_string(),
            suggestion: issue.suggestion(),
        }
    }
}

pub fn run(input: &Path, output_path: &Path, overrides: Overrides<'_>, cli: &Cli) -> Result<()> {
    let params = overrides.params()?;

    let raw =
        RawMesh::load(input).with_context(|| format!("Failed to load raw mesh from {:?}", input))?;
    let input_faces = raw.face_count();

    let conversion = raw.convert(&params).with_context(|| "Conversion failed")?;
    let mesh = &conversion.mesh;

    mesh.save(output_path)
        .with_context(|| format!("Failed to save mesh to {:?}", output_path))?;

    let result = ConvertResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        points: mesh.point_count(),
        faces: mesh.face_count(),
        internal_faces: mesh.internal_face_count(),
        cells: mesh.cell_count,
        patches: mesh.patches.len(),
        flipped_faces: conversion.flipped_face_count,
        multiply_connected_pairs: conversion.bad_pairs().len(),
        faces_removed: conversion.removed_face_count(),
        unresolved_pairs: conversion.repair.unresolved_pairs().count(),
        issues: conversion.issues.iter().map(IssueInfo::from).collect(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Converted {} to {}", input.display(), output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!(
                    "  {}: {} → {} ({} internal)",
                    "Faces".cyan(),
                    input_faces,
                    result.faces,
                    result.internal_faces
                );
                println!("  {}: {}", "Cells".cyan(), result.cells);
                println!("  {}: {}", "Patches".cyan(), result.patches);
                if result.flipped_faces > 0 {
                    println!("  {}: {}", "Flipped faces".cyan(), result.flipped_faces);
                }
                if result.multiply_connected_pairs > 0 {
                    println!(
                        "  {}: {} pairs, {} faces merged away",
                        "Repairs".green(),
                        result.multiply_connected_pairs,
                        result.faces_removed
                    );
                }
                if result.unresolved_pairs > 0 {
                    output::warning(
                        &format!(
                            "{} pairs still multiply connected; inspect the mesh manually",
                            result.unresolved_pairs
                        ),
                        cli.quiet,
                    );
                }
                if !result.issues.is_empty() {
                    println!("\n{}", "Issues:".bold());
                    for (issue, info) in conversion.issues.iter().zip(&result.issues) {
                        let icon = match issue.severity() {
                            IssueSeverity::Error => "✗".red(),
                            IssueSeverity::Warning => "⚠".yellow(),
                            IssueSeverity::Info => "ℹ".blue(),
                        };
                        println!("  {} [{}] {}", icon, info.code, info.message);
                        println!("      {}", info.suggestion.dimmed());
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(config: Option<&Path>) -> Overrides<'_> {
        Overrides {
            config,
            scale: None,
            face_ref_base: None,
            no_repair: false,
            no_checks: false,
        }
    }

    #[test]
    fn test_defaults_without_config() {
        assert_eq!(overrides(None).params().unwrap(), ConvertParams::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"scale": 0.001, "face_ref_base": 0}"#).unwrap();

        let mut o = overrides(Some(&path));
        o.face_ref_base = Some(1);
        o.no_checks = true;
        let params = o.params().unwrap();

        assert_eq!(params.scale, 0.001);
        assert_eq!(params.face_ref_base, 1);
        assert!(!params.validate_input);
        assert!(!params.check_boundary_contiguity);
        assert!(params.repair_multiply_connected);
    }

    #[test]
    fn test_issue_info_carries_code_and_suggestion() {
        let issue = TopologyIssue::EmptyPatch {
            name: "inlet".to_string(),
        };
        let info = IssueInfo::from(&issue);
        assert_eq!(info.code, "MESH-5003");
        assert_eq!(info.severity, "info");
        assert!(info.message.contains("inlet"));
        assert_eq!(info.suggestion, issue.suggestion());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(overrides(Some(Path::new("/nonexistent/params.json"))).params().is_err());
    }
}
