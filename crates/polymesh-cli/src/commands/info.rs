//! polymesh info command - display mesh statistics.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use polymesh::PolyMesh;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct MeshInfo {
    path: String,
    points: usize,
    faces: usize,
    internal_faces: usize,
    boundary_faces: usize,
    cells: usize,
    face_vertices: usize,
    patches: Vec<PatchInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
}

#[derive(Serialize)]
struct PatchInfo {
    name: String,
    start: usize,
    size: usize,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh =
        PolyMesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let bounds = mesh.bounds().map(|(min, max)| {
        let dims = max - min;
        BoundsInfo {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
            dimensions: [dims.x, dims.y, dims.z],
        }
    });

    let info = MeshInfo {
        path: input.display().to_string(),
        points: mesh.point_count(),
        faces: mesh.face_count(),
        internal_faces: mesh.internal_face_count(),
        boundary_faces: mesh.boundary_face_count(),
        cells: mesh.cell_count,
        face_vertices: mesh.face_vertex_count(),
        patches: mesh
            .patches
            .iter()
            .map(|p| PatchInfo {
                name: p.name.clone(),
                start: p.start,
                size: p.size,
            })
            .collect(),
        bounds,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Mesh Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Points".cyan(), info.points);
                println!(
                    "  {}: {} ({} internal, {} boundary)",
                    "Faces".cyan(),
                    info.faces,
                    info.internal_faces,
                    info.boundary_faces
                );
                println!("  {}: {}", "Cells".cyan(), info.cells);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: {:.4} x {:.4} x {:.4}",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1],
                        b.dimensions[2]
                    );
                }

                if !info.patches.is_empty() {
                    println!("  {}:", "Patches".cyan());
                    for p in &info.patches {
                        println!("    {} [{}, {}) {} faces", p.name, p.start, p.start + p.size, p.size);
                    }
                }
            }
        }
    }

    Ok(())
}
