//! Boundary patch construction and contiguity checks.

use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult, TopologyIssue};
use crate::types::{BoundaryPatch, FaceRefConvention, RawBoundary};

/// Map reader boundary lists through the face reversal and build patches.
///
/// Each face id `x` becomes `face_count - 1 - x` and the list is reversed,
/// mirroring what the builder does to the face array. A patch starts at its
/// lowest mapped face. Patches are returned sorted by start.
pub(crate) fn build_patches(
    boundaries: &[RawBoundary],
    convention: FaceRefConvention,
    face_count: usize,
    issues: &mut Vec<TopologyIssue>,
) -> MeshResult<Vec<BoundaryPatch>> {
    let mut patches = Vec::with_capacity(boundaries.len());

    for boundary in boundaries {
        let mut mapped = boundary
            .faces
            .iter()
            .map(|&value| {
                convention
                    .decode_index(value, face_count)
                    .map(|face| face_count - 1 - face)
                    .ok_or_else(|| MeshError::InvalidBoundaryFace {
                        patch: boundary.name.clone(),
                        value,
                        face_count,
                    })
            })
            .collect::<MeshResult<Vec<usize>>>()?;
        mapped.reverse();

        let (Some(&first), Some(&last)) = (mapped.first(), mapped.last()) else {
            let issue = TopologyIssue::EmptyPatch {
                name: boundary.name.clone(),
            };
            warn!("{}", issue);
            issues.push(issue);
            continue;
        };

        // Either direction is a run; the patch starts at its lowest face.
        let ascending = mapped.windows(2).all(|w| w[1] == w[0] + 1);
        let descending = mapped.windows(2).all(|w| w[0] == w[1] + 1);
        let start = mapped.iter().copied().min().unwrap_or(first);

        if !ascending && !descending {
            let issue = TopologyIssue::NonContiguousPatch {
                name: boundary.name.clone(),
                first,
                last,
                size: mapped.len(),
            };
            warn!("{}", issue);
            issues.push(issue);
        }

        debug!(
            patch = %boundary.name,
            start,
            size = mapped.len(),
            "Mapped boundary patch"
        );
        patches.push(BoundaryPatch::new(boundary.name.clone(), start, mapped.len()));
    }

    patches.sort_by_key(|p| p.start);
    Ok(patches)
}

/// Check that boundary faces fill exactly `[internal_faces, face_count)`.
///
/// `patches` must be sorted by start. Returns the issue describing the
/// mismatch, or `None` if the numbering is as expected.
pub fn check_boundary_contiguity(
    patches: &[BoundaryPatch],
    internal_faces: usize,
    face_count: usize,
) -> Option<TopologyIssue> {
    let expected_last = face_count.checked_sub(1).filter(|&l| l >= internal_faces);

    let (actual_first, actual_last) = match (patches.first(), patches.last()) {
        (Some(first), Some(last)) => (Some(first.start), last.end().checked_sub(1)),
        _ => (None, None),
    };

    let ok = match actual_first {
        Some(first) => first == internal_faces && actual_last == face_count.checked_sub(1),
        None => face_count == internal_faces,
    };

    if ok {
        None
    } else {
        Some(TopologyIssue::BoundaryNotContiguous {
            expected_first: internal_faces,
            expected_last,
            actual_first,
            actual_last,
        })
    }
}
