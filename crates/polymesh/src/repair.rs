//! Multiply-connected cell repair over a finalized mesh.
//!
//! One pass runs adjacency indexing, bad-pair detection, face merging and
//! compaction in that order. A single pass removes every duplicate connection
//! except those the merger deliberately skips.

use serde::Serialize;
use tracing::{info, warn};

use crate::adjacency::CellAdjacency;
use crate::compact::{FaceRemap, compact_faces};
use crate::detect::{BadCellPair, find_multiply_connected_cells};
use crate::error::{MeshResult, TopologyIssue};
use crate::merge::{PairRepair, merge_multiply_connected};
use crate::types::PolyMesh;

/// Diagnostics from one repair pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairSummary {
    /// Pairs found before merging.
    pub bad_pairs: Vec<BadCellPair>,
    pub repairs: Vec<PairRepair>,
    pub removed_face_count: usize,
    #[serde(skip)]
    pub issues: Vec<TopologyIssue>,
}

impl RepairSummary {
    /// True if nothing needed repair.
    pub fn is_clean(&self) -> bool {
        self.bad_pairs.is_empty()
    }

    /// Pairs that still share more than one face after the pass.
    pub fn unresolved_pairs(&self) -> impl Iterator<Item = BadCellPair> + '_ {
        self.repairs
            .iter()
            .filter(|r| !r.is_complete())
            .map(|r| r.pair)
    }
}

impl std::fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Repair Summary:")?;
        writeln!(f, "  Multiply connected pairs: {}", self.bad_pairs.len())?;
        writeln!(f, "  Faces removed: {}", self.removed_face_count)?;
        write!(
            f,
            "  Unresolved pairs: {}",
            self.unresolved_pairs().count()
        )
    }
}

/// Find and merge duplicate faces between multiply-connected cells.
///
/// `mesh` must have internal faces first with `owner < neighbour`. A fatal
/// merge error leaves the mesh unchanged. Face ids in the returned repairs
/// and issues index the compacted mesh.
///
/// # Example
///
/// ```
/// use polymesh::{PolyMesh, repair_multiply_connected};
///
/// let mut mesh = PolyMesh::default();
/// let summary = repair_multiply_connected(&mut mesh).unwrap();
/// assert!(summary.is_clean());
/// ```
pub fn repair_multiply_connected(mesh: &mut PolyMesh) -> MeshResult<RepairSummary> {
    let adjacency = CellAdjacency::from_mesh(mesh);
    let bad_pairs = find_multiply_connected_cells(&adjacency);

    if bad_pairs.is_empty() {
        return Ok(RepairSummary::default());
    }

    info!(
        "Found {} pair(s) of multiply connected cells, attempting correction",
        bad_pairs.len()
    );

    let mut merged = merge_multiply_connected(mesh, &adjacency, &bad_pairs)?;
    let removed_face_count = compact_faces(mesh, &merged.keep)?;

    let remap = FaceRemap::from_keep(&merged.keep);
    for repair in &mut merged.repairs {
        repair.renumber(&remap);
    }
    for issue in &mut merged.issues {
        if let TopologyIssue::MergeSkipped {
            recipient, donor, ..
        } = issue
        {
            *recipient = remap.apply(*recipient);
            *donor = remap.apply(*donor);
        }
    }

    if !merged.issues.is_empty() {
        warn!(
            "{} duplicate face(s) could not be merged; manual mesh inspection is required",
            merged.issues.len()
        );
    }

    info!(
        "Repair complete: removed {} face(s), {} internal faces remain",
        removed_face_count,
        mesh.internal_face_count()
    );

    Ok(RepairSummary {
        bad_pairs,
        repairs: merged.repairs,
        removed_face_count,
        issues: merged.issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::SkipReason;
    use crate::types::{BoundaryPatch, Face};
    use nalgebra::Point3;

    /// Split-base pyramids after topology construction.
    fn split_pyramid_mesh() -> PolyMesh {
        PolyMesh {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.5, 0.5, 1.0),
                Point3::new(0.5, 0.5, -1.0),
            ],
            faces: vec![
                Face::from([0, 2, 3]),
                Face::from([0, 1, 2]),
                Face::from([0, 3, 5]),
                Face::from([3, 2, 5]),
                Face::from([2, 1, 5]),
                Face::from([1, 0, 5]),
                Face::from([3, 0, 4]),
                Face::from([2, 3, 4]),
                Face::from([1, 2, 4]),
                Face::from([0, 1, 4]),
            ],
            owner: vec![0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
            neighbour: vec![1, 1],
            cell_count: 2,
            patches: vec![
                BoundaryPatch::new("bottom", 2, 4),
                BoundaryPatch::new("top", 6, 4),
            ],
        }
    }

    #[test]
    fn test_repair_merges_split_base() {
        let mut mesh = split_pyramid_mesh();
        let summary = repair_multiply_connected(&mut mesh).unwrap();

        assert_eq!(summary.bad_pairs, vec![BadCellPair::new(0, 1)]);
        assert_eq!(summary.removed_face_count, 1);
        assert_eq!(summary.unresolved_pairs().count(), 0);
        assert_eq!(mesh.faces[0], Face::from([2, 3, 0, 1]));
        assert_eq!(mesh.face_count(), 9);
        assert_eq!(mesh.neighbour, vec![1]);
        assert_eq!(mesh.patches[0], BoundaryPatch::new("bottom", 1, 4));
        assert_eq!(mesh.patches[1], BoundaryPatch::new("top", 5, 4));
    }

    #[test]
    fn test_skipped_donor_reported_in_compacted_numbering() {
        // Face 1 shares edge 0-1 with face 0; face 2 only touches point 2.
        let mut mesh = PolyMesh {
            points: vec![Point3::origin(); 7],
            faces: vec![
                Face::from([0, 1, 2, 3]),
                Face::from([1, 0, 4]),
                Face::from([2, 5, 6]),
                Face::from([0, 3, 6]),
                Face::from([1, 4, 5]),
            ],
            owner: vec![0, 0, 0, 0, 1],
            neighbour: vec![1, 1, 1],
            cell_count: 2,
            patches: vec![BoundaryPatch::new("wall", 3, 2)],
        };

        let summary = repair_multiply_connected(&mut mesh).unwrap();
        assert_eq!(summary.removed_face_count, 1);
        assert_eq!(mesh.internal_face_count(), 2);

        let repair = &summary.repairs[0];
        assert_eq!(repair.removed, vec![1]);
        assert_eq!(repair.recipient, 0);
        assert_eq!(repair.faces, vec![0, 1]);
        assert_eq!(
            repair.skipped,
            vec![(1, SkipReason::SingleVertexContact { vertex: 2 })]
        );
        assert_eq!(mesh.faces[0], repair.merged_face);

        let [TopologyIssue::MergeSkipped {
            recipient, donor, ..
        }] = summary.issues.as_slice()
        else {
            panic!("expected one skipped merge, got {:?}", summary.issues);
        };
        assert_eq!((*recipient, *donor), (0, 1));
        assert_eq!(mesh.faces[*donor], Face::from([2, 5, 6]));
        assert_eq!((mesh.owner[*donor], mesh.neighbour[*donor]), (0, 1));
        assert_eq!(mesh.patches[0], BoundaryPatch::new("wall", 2, 2));
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut mesh = split_pyramid_mesh();
        repair_multiply_connected(&mut mesh).unwrap();
        let again = repair_multiply_connected(&mut mesh).unwrap();
        assert!(again.is_clean());
    }

    #[test]
    fn test_summary_display() {
        let mut mesh = split_pyramid_mesh();
        let summary = repair_multiply_connected(&mut mesh).unwrap();
        let text = summary.to_string();
        assert!(text.contains("Multiply connected pairs: 1"));
        assert!(text.contains("Faces removed: 1"));
    }
}
