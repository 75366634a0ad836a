//! Owner/neighbour topology construction from signed cell-face references.
//!
//! Cells are visited in reverse input order so that, once every per-face array
//! is reversed at the end, internal faces come first and `owner < neighbour`
//! holds for each of them. The first cell to reference a face becomes its
//! owner; the face is flipped if that cell sees it pointing inward. The second
//! cell becomes the neighbour.

use tracing::{debug, info, warn};

use crate::boundary::{build_patches, check_boundary_contiguity};
use crate::error::{MeshError, MeshResult, TopologyIssue};
use crate::types::{FaceRefConvention, Orientation, PolyMesh, RawMesh};

/// Final id of the cell at input position `input` in a mesh of `cell_count` cells.
///
/// The mapping is an involution: applying it twice gives back the input.
#[inline]
pub fn renumbered_cell(cell_count: usize, input: usize) -> usize {
    cell_count - 1 - input
}

/// Builds a [`PolyMesh`] from a [`RawMesh`].
///
/// # Example
///
/// ```
/// use polymesh::{Face, OrientedTopologyBuilder, RawMesh};
/// use nalgebra::Point3;
///
/// // Two triangles glued back to back: the shared face is internal.
/// let raw = RawMesh {
///     points: vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     faces: vec![Face::from([0, 1, 2])],
///     cells: vec![vec![-1], vec![1]],
///     boundaries: vec![],
/// };
///
/// let topo = OrientedTopologyBuilder::new().build(raw).unwrap();
/// assert_eq!(topo.mesh.internal_face_count(), 1);
/// assert_eq!((topo.mesh.owner[0], topo.mesh.neighbour[0]), (0, 1));
/// ```
#[derive(Debug, Clone)]
pub struct OrientedTopologyBuilder {
    convention: FaceRefConvention,
    check_boundary_contiguity: bool,
}

impl Default for OrientedTopologyBuilder {
    fn default() -> Self {
        Self {
            convention: FaceRefConvention::default(),
            check_boundary_contiguity: true,
        }
    }
}

/// Result of topology construction.
#[derive(Debug, Clone)]
pub struct OrientedTopology {
    pub mesh: PolyMesh,
    /// Number of faces whose winding was reversed.
    pub flipped_faces: usize,
    /// Non-fatal problems found while building.
    pub issues: Vec<TopologyIssue>,
}

impl OrientedTopology {
    /// Input position of the cell with final id `cell`.
    #[inline]
    pub fn original_cell(&self, cell: usize) -> usize {
        renumbered_cell(self.mesh.cell_count, cell)
    }
}

#[derive(Clone, Copy)]
struct Incidence {
    cell: usize,
    orientation: Orientation,
}

impl OrientedTopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different face reference numbering convention.
    pub fn with_convention(mut self, convention: FaceRefConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Enable or disable the global boundary contiguity check.
    pub fn check_boundary_contiguity(mut self, enabled: bool) -> Self {
        self.check_boundary_contiguity = enabled;
        self
    }

    /// Build the oriented topology, consuming the raw mesh.
    pub fn build(&self, raw: RawMesh) -> MeshResult<OrientedTopology> {
        let RawMesh {
            points,
            mut faces,
            cells,
            boundaries,
        } = raw;
        let face_count = faces.len();
        let cell_count = cells.len();
        let mut issues = Vec::new();

        let mut owner: Vec<Option<Incidence>> = vec![None; face_count];
        let mut neighbour: Vec<Option<Incidence>> = vec![None; face_count];
        let mut internal_faces = 0usize;
        let mut flipped_faces = 0usize;

        for (input, refs) in cells.iter().enumerate().rev() {
            let cell = renumbered_cell(cell_count, input);

            for &value in refs {
                let face_ref = self.convention.decode(value, face_count).ok_or(
                    MeshError::InvalidFaceReference {
                        cell: input,
                        value,
                        face_count,
                    },
                )?;
                let f = face_ref.face;
                let here = Incidence {
                    cell,
                    orientation: face_ref.orientation,
                };

                match (owner[f], neighbour[f]) {
                    (None, _) => {
                        owner[f] = Some(here);
                        if face_ref.orientation == Orientation::Inward {
                            faces[f].flip();
                            flipped_faces += 1;
                        }
                    }
                    (Some(first), None) if first.cell == cell => {
                        let issue = TopologyIssue::DuplicateFaceReference { cell: input, face: f };
                        warn!("{}", issue);
                        issues.push(issue);
                    }
                    (Some(first), None) => {
                        neighbour[f] = Some(here);
                        internal_faces += 1;
                        if first.orientation == here.orientation {
                            let issue = TopologyIssue::InconsistentOrientation { face: f };
                            warn!("{}", issue);
                            issues.push(issue);
                        }
                    }
                    (Some(first), Some(second)) => {
                        let issue = if first.cell == cell || second.cell == cell {
                            TopologyIssue::DuplicateFaceReference { cell: input, face: f }
                        } else {
                            TopologyIssue::FaceOverReferenced { face: f, cell: input }
                        };
                        warn!("{}", issue);
                        issues.push(issue);
                    }
                }
            }
        }

        info!(internal_faces, flipped_faces, "Computed owner/neighbour");

        faces.reverse();
        owner.reverse();
        neighbour.reverse();

        let owner = owner
            .into_iter()
            .enumerate()
            .map(|(f, o)| {
                o.map(|inc| inc.cell).ok_or(MeshError::OrphanFace {
                    // Report the face in reader numbering.
                    face: face_count - 1 - f,
                })
            })
            .collect::<MeshResult<Vec<usize>>>()?;

        let neighbour = truncate_neighbours(neighbour, internal_faces)?;

        let patches = build_patches(&boundaries, self.convention, face_count, &mut issues)?;

        if self.check_boundary_contiguity {
            if let Some(issue) = check_boundary_contiguity(&patches, internal_faces, face_count) {
                warn!("{}", issue);
                issues.push(issue);
            }
        }

        debug!(
            faces = face_count,
            cells = cell_count,
            patches = patches.len(),
            issues = issues.len(),
            "Topology construction finished"
        );

        Ok(OrientedTopology {
            mesh: PolyMesh {
                points,
                faces,
                owner,
                neighbour,
                cell_count,
                patches,
            },
            flipped_faces,
            issues,
        })
    }
}

/// Cut the per-face neighbour slots down to the internal range.
///
/// Every face before `internal_faces` must have a neighbour and no face after
/// it may have one.
fn truncate_neighbours(
    neighbour: Vec<Option<Incidence>>,
    internal_faces: usize,
) -> MeshResult<Vec<usize>> {
    if let Some(face) = neighbour[internal_faces..].iter().position(Option::is_some) {
        return Err(MeshError::InternalFaceOrdering {
            face: internal_faces + face,
            internal_faces,
        });
    }

    neighbour
        .into_iter()
        .take(internal_faces)
        .enumerate()
        .map(|(face, n)| {
            n.map(|inc| inc.cell)
                .ok_or(MeshError::InternalFaceOrdering {
                    face,
                    internal_faces,
                })
        })
        .collect()
}
