//! JSON interchange for raw and finalized meshes.
//!
//! Reading the source mesh format and writing solver meshes are handled by
//! external tools; these files are the hand-off between them and this crate.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::types::{PolyMesh, RawMesh};

fn load_json<T: DeserializeOwned>(path: &Path) -> MeshResult<T> {
    let file = File::open(path).map_err(|e| MeshError::io_read(path, e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| MeshError::parse_error(path, e.to_string()))
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|e| {
        MeshError::io_write(path, std::io::Error::other(e))
    })?;
    writer.flush().map_err(|e| MeshError::io_write(path, e))
}

/// Load reader output from a JSON file.
pub fn load_raw_mesh(path: impl AsRef<Path>) -> MeshResult<RawMesh> {
    let path = path.as_ref();
    info!("Loading raw mesh from {:?}", path);
    let raw: RawMesh = load_json(path)?;
    debug!(
        points = raw.point_count(),
        faces = raw.face_count(),
        cells = raw.cell_count(),
        boundaries = raw.boundaries.len(),
        "Loaded raw mesh"
    );
    Ok(raw)
}

/// Save reader output to a JSON file.
pub fn save_raw_mesh(raw: &RawMesh, path: impl AsRef<Path>) -> MeshResult<()> {
    let path = path.as_ref();
    info!("Saving raw mesh to {:?}", path);
    save_json(raw, path)
}

/// Load a finalized mesh from a JSON file.
pub fn load_poly_mesh(path: impl AsRef<Path>) -> MeshResult<PolyMesh> {
    let path = path.as_ref();
    info!("Loading mesh from {:?}", path);
    let mesh: PolyMesh = load_json(path)?;

    if mesh.owner.len() != mesh.faces.len() || mesh.neighbour.len() > mesh.faces.len() {
        return Err(MeshError::parse_error(
            path,
            format!(
                "{} faces but {} owners and {} neighbours",
                mesh.faces.len(),
                mesh.owner.len(),
                mesh.neighbour.len()
            ),
        ));
    }

    debug!(
        points = mesh.point_count(),
        faces = mesh.face_count(),
        cells = mesh.cell_count,
        "Loaded mesh"
    );
    Ok(mesh)
}

/// Save a finalized mesh to a JSON file.
pub fn save_poly_mesh(mesh: &PolyMesh, path: impl AsRef<Path>) -> MeshResult<()> {
    let path = path.as_ref();
    info!("Saving mesh to {:?}", path);
    save_json(mesh, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundaryPatch, Face, RawBoundary};
    use nalgebra::Point3;
    use tempfile::tempdir;

    #[test]
    fn test_raw_mesh_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.json");
        let raw = RawMesh {
            points: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)],
            faces: vec![Face::from([0, 1, 0])],
            cells: vec![vec![1, -1]],
            boundaries: vec![RawBoundary {
                name: "inlet".into(),
                faces: vec![1],
            }],
        };
        save_raw_mesh(&raw, &path).unwrap();
        assert_eq!(load_raw_mesh(&path).unwrap(), raw);
    }

    #[test]
    fn test_raw_mesh_json_layout() {
        let json = r#"{
            "points": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
            "faces": [[0, 1, 2]],
            "cells": [[1], [-1]]
        }"#;
        let raw: RawMesh = serde_json::from_str(json).unwrap();
        assert_eq!(raw.faces[0], Face::from([0, 1, 2]));
        assert!(raw.boundaries.is_empty());
    }

    #[test]
    fn test_poly_mesh_length_check() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.json");
        let mesh = PolyMesh {
            points: vec![Point3::origin(); 3],
            faces: vec![Face::from([0, 1, 2])],
            owner: vec![],
            neighbour: vec![],
            cell_count: 1,
            patches: vec![BoundaryPatch::new("wall", 0, 1)],
        };
        save_poly_mesh(&mesh, &path).unwrap();
        let err = load_poly_mesh(&path).unwrap_err();
        assert!(matches!(err, MeshError::ParseError { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_raw_mesh("/nonexistent/raw.json").unwrap_err();
        assert!(matches!(err, MeshError::IoRead { .. }));
    }
}
