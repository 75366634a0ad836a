//! Input validation and topology reporting.

use hashbrown::HashMap;
use nalgebra::Point3;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::boundary::check_boundary_contiguity;
use crate::error::{MeshError, MeshResult};
use crate::types::{Face, PolyMesh, RawMesh};

/// Check that every face refers only to existing points.
pub fn check_point_indices(points: &[Point3<f64>], faces: &[Face]) -> MeshResult<()> {
    let point_count = points.len();
    for (face_index, face) in faces.iter().enumerate() {
        if let Some(&point_index) = face.as_slice().iter().find(|&&p| p as usize >= point_count) {
            return Err(MeshError::InvalidPointIndex {
                face_index,
                point_index,
                point_count,
            });
        }
    }
    Ok(())
}

/// Validate raw reader output before topology construction.
///
/// This function checks:
/// - The mesh has points, faces and cells
/// - Point coordinates are finite
/// - Every face has at least three points
/// - Face point indices are within bounds
///
/// Face references are checked later by the builder, which knows the
/// numbering convention.
pub fn validate_raw_mesh(raw: &RawMesh) -> MeshResult<()> {
    if raw.points.is_empty() || raw.faces.is_empty() || raw.cells.is_empty() {
        return Err(MeshError::empty_mesh(format!(
            "{} points, {} faces, {} cells",
            raw.point_count(),
            raw.face_count(),
            raw.cell_count()
        )));
    }

    for (point_index, p) in raw.points.iter().enumerate() {
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(MeshError::InvalidCoordinate {
                    point_index,
                    coordinate,
                    value,
                });
            }
        }
    }

    if let Some((face_index, face)) = raw.faces.iter().enumerate().find(|(_, f)| f.len() < 3) {
        return Err(MeshError::DegenerateFace {
            face_index,
            vertex_count: face.len(),
        });
    }

    check_point_indices(&raw.points, &raw.faces)?;

    debug!("Raw mesh validation passed");
    Ok(())
}

/// Topology report for a finalized mesh.
#[derive(Debug, Clone, Serialize)]
pub struct TopologyReport {
    pub point_count: usize,
    pub face_count: usize,
    pub internal_face_count: usize,
    pub boundary_face_count: usize,
    pub cell_count: usize,
    pub patch_count: usize,

    /// Bounding box as (min_corner, max_corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,

    /// `owner` does not have one entry per face.
    pub owner_length_mismatch: bool,

    /// Faces referencing a cell id at or above `cell_count`.
    pub out_of_range_cells: usize,

    /// Internal faces with `owner >= neighbour`.
    pub upper_triangular_violations: usize,

    /// Cell pairs sharing more than one internal face.
    pub multiply_connected_pairs: usize,

    /// Boundary faces not covered by any patch.
    pub uncovered_boundary_faces: usize,

    /// Description of the boundary numbering problem, if any.
    pub boundary_contiguity: Option<String>,
}

impl TopologyReport {
    /// Check if the mesh is fit for a solver.
    pub fn is_valid(&self) -> bool {
        !self.owner_length_mismatch
            && self.out_of_range_cells == 0
            && self.upper_triangular_violations == 0
            && self.multiply_connected_pairs == 0
            && self.uncovered_boundary_faces == 0
            && self.boundary_contiguity.is_none()
    }
}

fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "NO" }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Points: {}", self.point_count)?;
        writeln!(
            f,
            "  Faces: {} ({} internal, {} boundary)",
            self.face_count, self.internal_face_count, self.boundary_face_count
        )?;
        writeln!(f, "  Cells: {}", self.cell_count)?;
        writeln!(f, "  Patches: {}", self.patch_count)?;

        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }

        if self.owner_length_mismatch {
            writeln!(f, "  Owner array: NO (length does not match faces)")?;
        }
        if self.out_of_range_cells > 0 {
            writeln!(f, "  Out-of-range cell ids: {}", self.out_of_range_cells)?;
        }

        writeln!(
            f,
            "  Upper triangular: {} (violations: {})",
            yes_no(self.upper_triangular_violations == 0),
            self.upper_triangular_violations
        )?;
        writeln!(
            f,
            "  Singly connected: {} (multiply connected pairs: {})",
            yes_no(self.multiply_connected_pairs == 0),
            self.multiply_connected_pairs
        )?;
        writeln!(
            f,
            "  Boundary covered: {} (uncovered faces: {})",
            yes_no(self.uncovered_boundary_faces == 0),
            self.uncovered_boundary_faces
        )?;
        match &self.boundary_contiguity {
            None => writeln!(f, "  Boundary contiguous: yes")?,
            Some(msg) => writeln!(f, "  Boundary contiguous: NO ({})", msg)?,
        }
        writeln!(f, "  Valid: {}", yes_no(self.is_valid()))?;

        Ok(())
    }
}

/// Inspect a finalized mesh and return a report.
///
/// Pairs are counted with a hash map independently of
/// [`CellAdjacency`](crate::CellAdjacency), so the report can cross-check the
/// repair pass.
pub fn validate_topology(mesh: &PolyMesh) -> TopologyReport {
    let face_count = mesh.face_count();
    let internal = mesh.internal_face_count().min(mesh.owner.len());
    let owner_length_mismatch = mesh.owner.len() != face_count || internal != mesh.neighbour.len();

    let out_of_range_cells = mesh
        .owner
        .iter()
        .chain(&mesh.neighbour)
        .filter(|&&c| c >= mesh.cell_count)
        .count();

    let mut pair_faces: HashMap<(usize, usize), usize> = HashMap::with_capacity(internal);
    let mut upper_triangular_violations = 0;
    for (&o, &n) in mesh.owner.iter().zip(&mesh.neighbour) {
        if o >= n {
            upper_triangular_violations += 1;
        }
        *pair_faces.entry((o.min(n), o.max(n))).or_insert(0) += 1;
    }
    let multiply_connected_pairs = pair_faces.values().filter(|&&n| n > 1).count();

    let mut covered = vec![false; face_count];
    for patch in &mesh.patches {
        for f in patch.range() {
            if let Some(c) = covered.get_mut(f) {
                *c = true;
            }
        }
    }
    let uncovered_boundary_faces = covered
        .get(internal..)
        .map_or(0, |b| b.iter().filter(|&&c| !c).count());

    let mut sorted = mesh.patches.clone();
    sorted.sort_by_key(|p| p.start);
    let boundary_contiguity = check_boundary_contiguity(&sorted, internal, face_count)
        .map(|issue| issue.to_string());

    TopologyReport {
        point_count: mesh.point_count(),
        face_count,
        internal_face_count: mesh.internal_face_count(),
        boundary_face_count: mesh.boundary_face_count(),
        cell_count: mesh.cell_count,
        patch_count: mesh.patches.len(),
        bounds: mesh.bounds(),
        owner_length_mismatch,
        out_of_range_cells,
        upper_triangular_violations,
        multiply_connected_pairs,
        uncovered_boundary_faces,
        boundary_contiguity,
    }
}

/// Log a summary of a topology report.
pub fn log_topology_report(report: &TopologyReport) {
    info!(
        "Mesh: {} points, {} faces ({} internal), {} cells, {} patches",
        report.point_count,
        report.face_count,
        report.internal_face_count,
        report.cell_count,
        report.patch_count
    );

    if report.is_valid() {
        info!("Mesh topology is consistent");
        return;
    }
    if report.upper_triangular_violations > 0 {
        warn!(
            "Not upper triangular: {} internal faces",
            report.upper_triangular_violations
        );
    }
    if report.multiply_connected_pairs > 0 {
        warn!(
            "Multiply connected: {} cell pairs",
            report.multiply_connected_pairs
        );
    }
    if report.uncovered_boundary_faces > 0 {
        warn!(
            "Boundary faces without patch: {}",
            report.uncovered_boundary_faces
        );
    }
    if let Some(msg) = &report.boundary_contiguity {
        warn!("{}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundaryPatch;

    fn raw_triangle() -> RawMesh {
        RawMesh {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![Face::from([0, 1, 2])],
            cells: vec![vec![1]],
            boundaries: vec![],
        }
    }

    #[test]
    fn test_valid_raw_mesh() {
        assert!(validate_raw_mesh(&raw_triangle()).is_ok());
    }

    #[test]
    fn test_empty_raw_mesh() {
        let err = validate_raw_mesh(&RawMesh::default()).unwrap_err();
        assert!(matches!(err, MeshError::EmptyMesh { .. }));
    }

    #[test]
    fn test_nan_coordinate() {
        let mut raw = raw_triangle();
        raw.points[1].y = f64::NAN;
        let err = validate_raw_mesh(&raw).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidCoordinate {
                point_index: 1,
                coordinate: "y",
                ..
            }
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let mut raw = raw_triangle();
        raw.faces.push(Face::from([0, 1]));
        let err = validate_raw_mesh(&raw).unwrap_err();
        assert!(matches!(
            err,
            MeshError::DegenerateFace {
                face_index: 1,
                vertex_count: 2
            }
        ));
    }

    #[test]
    fn test_point_index_out_of_range() {
        let mut raw = raw_triangle();
        raw.faces[0] = Face::from([0, 1, 7]);
        let err = validate_raw_mesh(&raw).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidPointIndex {
                face_index: 0,
                point_index: 7,
                point_count: 3
            }
        ));
    }

    fn poly() -> PolyMesh {
        PolyMesh {
            points: vec![Point3::origin(); 4],
            faces: vec![
                Face::from([0, 1, 2]),
                Face::from([0, 2, 3]),
                Face::from([0, 1, 3]),
            ],
            owner: vec![0, 0, 1],
            neighbour: vec![1, 1],
            cell_count: 2,
            patches: vec![BoundaryPatch::new("wall", 2, 1)],
        }
    }

    #[test]
    fn test_report_counts_multiply_connected() {
        let report = validate_topology(&poly());
        assert_eq!(report.internal_face_count, 2);
        assert_eq!(report.multiply_connected_pairs, 1);
        assert_eq!(report.upper_triangular_violations, 0);
        assert!(report.boundary_contiguity.is_none());
        assert!(!report.is_valid());
        assert!(report.to_string().contains("multiply connected pairs: 1"));
    }

    #[test]
    fn test_report_flags_ordering_and_coverage() {
        let mut mesh = poly();
        mesh.neighbour = vec![1, 0];
        mesh.owner[1] = 1;
        mesh.patches.clear();
        let report = validate_topology(&mesh);
        assert_eq!(report.upper_triangular_violations, 1);
        assert_eq!(report.uncovered_boundary_faces, 1);
        assert!(report.boundary_contiguity.is_some());
    }
}
