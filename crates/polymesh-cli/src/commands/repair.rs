//! polymesh repair command - merge duplicate faces of a finalized mesh.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use polymesh::{BadCellPair, PolyMesh};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct RepairResult {
    input: String,
    output: String,
    success: bool,
    input_faces: usize,
    output_faces: usize,
    internal_faces: usize,
    multiply_connected_pairs: usize,
    faces_removed: usize,
    unresolved: Vec<BadCellPair>,
}

pub fn run(input: &Path, output_path: &Path, cli: &Cli) -> Result<()> {
    let mut mesh =
        PolyMesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let input_faces = mesh.face_count();

    let summary = mesh
        .repair_multiply_connected()
        .with_context(|| "Repair operation failed")?;

    mesh.save(output_path)
        .with_context(|| format!("Failed to save repaired mesh to {:?}", output_path))?;

    let unresolved: Vec<BadCellPair> = summary.unresolved_pairs().collect();
    let result = RepairResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        success: unresolved.is_empty(),
        input_faces,
        output_faces: mesh.face_count(),
        internal_faces: mesh.internal_face_count(),
        multiply_connected_pairs: summary.bad_pairs.len(),
        faces_removed: summary.removed_face_count,
        unresolved,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Repaired mesh saved to {}", output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!(
                    "  {}: {} → {} faces",
                    "Faces".cyan(),
                    result.input_faces,
                    result.output_faces
                );
                if result.multiply_connected_pairs > 0 {
                    println!(
                        "  {}: {} pairs, {} faces merged away",
                        "Repairs".green(),
                        result.multiply_connected_pairs,
                        result.faces_removed
                    );
                } else {
                    println!("  {}: none needed", "Repairs".green());
                }
                for pair in &result.unresolved {
                    output::warning(
                        &format!("cells {} still share more than one face", pair),
                        cli.quiet,
                    );
                }
            }
        }
    }

    Ok(())
}
