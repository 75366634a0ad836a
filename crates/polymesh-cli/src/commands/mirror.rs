//! polymesh mirror command - remove the seam of a mirrored mesh.

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use nalgebra::{Point3, Vector3};
use polymesh::{MirrorCleanupParams, PolyMesh};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct MirrorResult {
    input: String,
    output: String,
    input_cells: usize,
    output_cells: usize,
    input_faces: usize,
    output_faces: usize,
    seam_faces_removed: usize,
    interior_faces_removed: usize,
    cells_merged: usize,
    faces_merged: usize,
}

fn triple(name: &str, values: &[f64]) -> Result<[f64; 3]> {
    match values {
        &[x, y, z] => Ok([x, y, z]),
        _ => bail!("--{} expects three comma-separated values, got {}", name, values.len()),
    }
}

pub fn run(
    input: &Path,
    output_path: &Path,
    point: &[f64],
    normal: &[f64],
    tolerance: f64,
    cli: &Cli,
) -> Result<()> {
    let [px, py, pz] = triple("point", point)?;
    let [nx, ny, nz] = triple("normal", normal)?;
    let params = MirrorCleanupParams {
        point: Point3::new(px, py, pz),
        normal: Vector3::new(nx, ny, nz),
        tolerance,
    };

    let mut mesh =
        PolyMesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let (input_cells, input_faces) = (mesh.cell_count, mesh.face_count());

    let cleanup = mesh
        .clean_up_mirrored(&params)
        .with_context(|| "Mirror cleanup failed")?;

    mesh.save(output_path)
        .with_context(|| format!("Failed to save mesh to {:?}", output_path))?;

    let result = MirrorResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        input_cells,
        output_cells: mesh.cell_count,
        input_faces,
        output_faces: mesh.face_count(),
        seam_faces_removed: cleanup.seam_faces_removed,
        interior_faces_removed: cleanup.interior_faces_removed,
        cells_merged: cleanup.cells_merged,
        faces_merged: cleanup.repair.removed_face_count,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                if result.seam_faces_removed == 0 {
                    output::warning("no internal faces found on the mirror plane", cli.quiet);
                }
                output::success(
                    &format!("Cleaned mesh saved to {}", output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!(
                    "  {}: {} → {}",
                    "Cells".cyan(),
                    result.input_cells,
                    result.output_cells
                );
                println!(
                    "  {}: {} → {}",
                    "Faces".cyan(),
                    result.input_faces,
                    result.output_faces
                );
                println!(
                    "  {}: {} seam, {} interior, {} merged",
                    "Removed".green(),
                    result.seam_faces_removed,
                    result.interior_faces_removed,
                    result.faces_merged
                );
            }
        }
    }

    Ok(())
}
