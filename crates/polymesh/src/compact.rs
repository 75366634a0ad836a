//! Removal of merged-away faces.

use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::types::PolyMesh;

/// Old-to-new face numbering for a keep mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRemap {
    // removed_before[f] = removed faces with index < f
    removed_before: Vec<usize>,
}

impl FaceRemap {
    pub fn from_keep(keep: &[bool]) -> Self {
        let mut removed_before = Vec::with_capacity(keep.len() + 1);
        let mut removed = 0usize;
        for &k in keep {
            removed_before.push(removed);
            if !k {
                removed += 1;
            }
        }
        removed_before.push(removed);
        Self { removed_before }
    }

    pub fn removed_count(&self) -> usize {
        self.removed_before.last().copied().unwrap_or(0)
    }

    /// Index of `face` after compaction.
    ///
    /// For a removed face this is the index of the next surviving face.
    /// Positions past the end map to the compacted length.
    pub fn apply(&self, face: usize) -> usize {
        let last = self.removed_before.len() - 1;
        face - self.removed_before[face.min(last)]
    }
}

/// Remove every face whose `keep` entry is `false`.
///
/// Faces, owner and neighbour are compacted in one stable pass. Each patch
/// start moves down by the number of removed faces before it. Only internal
/// faces may be removed.
///
/// Returns the number of faces removed.
pub fn compact_faces(mesh: &mut PolyMesh, keep: &[bool]) -> MeshResult<usize> {
    let face_count = mesh.faces.len();
    if keep.len() != face_count {
        return Err(MeshError::invalid_topology(format!(
            "face mask has {} entries but mesh has {} faces",
            keep.len(),
            face_count
        )));
    }

    let internal = mesh.internal_face_count();
    if let Some(face) = keep[internal..].iter().position(|&k| !k) {
        return Err(MeshError::invalid_topology(format!(
            "boundary face {} cannot be removed by compaction",
            internal + face
        )));
    }

    let remap = FaceRemap::from_keep(keep);
    let removed = remap.removed_count();
    if removed == 0 {
        return Ok(0);
    }

    let mut mask = keep.iter();
    mesh.faces.retain(|_| mask.next().copied().unwrap_or(true));
    let mut mask = keep.iter();
    mesh.owner.retain(|_| mask.next().copied().unwrap_or(true));
    let mut mask = keep.iter();
    mesh.neighbour.retain(|_| mask.next().copied().unwrap_or(true));

    for patch in &mut mesh.patches {
        patch.start = remap.apply(patch.start);
    }

    debug!(
        removed,
        faces = mesh.faces.len(),
        internal_faces = mesh.internal_face_count(),
        "Compacted face arrays"
    );

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundaryPatch, Face};

    fn mesh() -> PolyMesh {
        PolyMesh {
            points: Vec::new(),
            faces: (0..6).map(|i| Face::from([i, i + 1, i + 2])).collect(),
            owner: vec![0, 0, 0, 1, 0, 1],
            neighbour: vec![1, 1, 2, 2],
            cell_count: 3,
            patches: vec![BoundaryPatch::new("a", 4, 1), BoundaryPatch::new("b", 5, 1)],
        }
    }

    #[test]
    fn test_compact_removes_and_shifts() {
        let mut m = mesh();
        let removed = compact_faces(&mut m, &[true, false, true, true, true, true]).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(m.face_count(), 5);
        assert_eq!(m.internal_face_count(), 3);
        assert_eq!(m.owner, vec![0, 0, 1, 0, 1]);
        assert_eq!(m.neighbour, vec![1, 2, 2]);
        assert_eq!(m.faces[1], Face::from([2, 3, 4]));
        assert_eq!(m.patches[0].start, 3);
        assert_eq!(m.patches[1].start, 4);
    }

    #[test]
    fn test_compact_noop() {
        let mut m = mesh();
        let before = m.clone();
        assert_eq!(compact_faces(&mut m, &[true; 6]).unwrap(), 0);
        assert_eq!(m, before);
    }

    #[test]
    fn test_remap_follows_removed_faces() {
        let remap = FaceRemap::from_keep(&[true, false, true, false, true]);
        assert_eq!(remap.removed_count(), 2);
        assert_eq!(remap.apply(0), 0);
        assert_eq!(remap.apply(2), 1);
        assert_eq!(remap.apply(4), 2);
        assert_eq!(remap.apply(5), 3);
    }

    #[test]
    fn test_wrong_mask_length_rejected() {
        let mut m = mesh();
        assert!(compact_faces(&mut m, &[true; 5]).is_err());
    }

    #[test]
    fn test_boundary_face_removal_rejected() {
        let mut m = mesh();
        let err = compact_faces(&mut m, &[true, true, true, true, false, true]).unwrap_err();
        assert!(err.to_string().contains("boundary face 4"));
    }
}
