//! Removal of the seam left behind by mirroring a mesh.
//!
//! Mirroring a half-model produces a layer of internal faces on the mirror
//! plane that splits every cell touching it in two. Cleanup merges the two
//! halves of each split cell, drops the seam, and then repairs the
//! multiply-connected pairs that the merge inevitably creates.

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compact::compact_faces;
use crate::error::{MeshError, MeshResult};
use crate::repair::{RepairSummary, repair_multiply_connected};
use crate::types::PolyMesh;
use crate::validate::check_point_indices;

/// A plane given by a point and a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorPlane {
    point: Point3<f64>,
    normal: Unit<Vector3<f64>>,
}

impl MirrorPlane {
    /// Create a plane, normalizing `normal`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidMirrorPlane`] if the normal is zero or any
    /// component is not finite.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> MeshResult<Self> {
        if !point.coords.iter().chain(normal.iter()).all(|c| c.is_finite()) {
            return Err(MeshError::InvalidMirrorPlane {
                details: format!("non-finite point {} or normal {}", point, normal),
            });
        }
        let normal = Unit::try_new(normal, f64::EPSILON).ok_or_else(|| {
            MeshError::InvalidMirrorPlane {
                details: "normal has zero length".to_string(),
            }
        })?;
        Ok(Self { point, normal })
    }

    #[inline]
    pub fn point(&self) -> Point3<f64> {
        self.point
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal.into_inner()
    }

    /// Signed distance of `p` from the plane.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.point).dot(&self.normal)
    }
}

/// Parameters for [`clean_up_mirrored_mesh`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorCleanupParams {
    /// A point on the mirror plane.
    pub point: Point3<f64>,
    /// Plane normal; need not be unit length.
    pub normal: Vector3<f64>,
    /// Tolerance for both the parallel test and the on-plane test.
    ///
    /// Default: `1e-8`
    pub tolerance: f64,
}

impl Default for MirrorCleanupParams {
    fn default() -> Self {
        Self {
            point: Point3::origin(),
            normal: Vector3::z(),
            tolerance: 1e-8,
        }
    }
}

impl MirrorCleanupParams {
    /// Plane through `point` with `normal`, default tolerance.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal,
            ..Default::default()
        }
    }

    pub fn plane(&self) -> MeshResult<MirrorPlane> {
        MirrorPlane::new(self.point, self.normal)
    }
}

/// Outcome of mirror-seam cleanup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MirrorCleanupResult {
    /// Internal faces on the plane that were removed.
    pub seam_faces_removed: usize,
    /// Internal faces dropped because both sides ended up in one cell.
    pub interior_faces_removed: usize,
    /// Cells absorbed into their seam partner.
    pub cells_merged: usize,
    pub repair: RepairSummary,
}

/// Internal faces lying on `plane` with normal parallel to it.
pub fn find_seam_faces(mesh: &PolyMesh, plane: &MirrorPlane, tolerance: f64) -> Vec<usize> {
    (0..mesh.internal_face_count())
        .filter(|&f| {
            let face = &mesh.faces[f];
            let area = face.area_vector(&mesh.points);
            let mag = area.norm();
            if mag <= f64::EPSILON {
                return false;
            }
            let parallel = ((area / mag).dot(&plane.normal).abs() - 1.0).abs() < tolerance;
            parallel && plane.signed_distance(&face.centre(&mesh.points)).abs() < tolerance
        })
        .collect()
}

/// Disjoint-set forest where the smallest id is always the root.
struct CellUnion {
    parent: Vec<usize>,
}

impl CellUnion {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut c: usize) -> usize {
        while self.parent[c] != c {
            self.parent[c] = self.parent[self.parent[c]];
            c = self.parent[c];
        }
        c
    }

    /// Returns true if two distinct sets were joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let (lo, hi) = (ra.min(rb), ra.max(rb));
        self.parent[hi] = lo;
        true
    }
}

/// Merge the cells split by the mirror plane and remove the seam.
///
/// Seam faces are found geometrically, each seam neighbour cell is merged into
/// its owner, the surviving cells are renumbered densely in ascending order,
/// and finally the multiply-connected repair pass runs on the result.
///
/// # Example
///
/// ```no_run
/// use polymesh::{MirrorCleanupParams, clean_up_mirrored_mesh, load_poly_mesh};
/// use nalgebra::{Point3, Vector3};
///
/// let mut mesh = load_poly_mesh("mirrored.json").unwrap();
/// let params = MirrorCleanupParams::new(Point3::origin(), Vector3::y());
/// let result = clean_up_mirrored_mesh(&mut mesh, &params).unwrap();
/// println!("removed {} seam faces", result.seam_faces_removed);
/// ```
pub fn clean_up_mirrored_mesh(
    mesh: &mut PolyMesh,
    params: &MirrorCleanupParams,
) -> MeshResult<MirrorCleanupResult> {
    if !(params.tolerance.is_finite() && params.tolerance > 0.0) {
        return Err(MeshError::invalid_parameter(
            "tolerance",
            format!("must be positive and finite, got {}", params.tolerance),
        ));
    }
    let plane = params.plane()?;
    check_point_indices(&mesh.points, &mesh.faces)?;

    let seam = find_seam_faces(mesh, &plane, params.tolerance);
    info!(
        "Found {} internal face(s) on the mirror plane",
        seam.len()
    );
    if seam.is_empty() {
        return Ok(MirrorCleanupResult::default());
    }

    let cell_count = mesh
        .owner
        .iter()
        .chain(&mesh.neighbour)
        .map(|&c| c + 1)
        .max()
        .unwrap_or(0)
        .max(mesh.cell_count);

    let mut cells = CellUnion::new(cell_count);
    let cells_merged = seam
        .iter()
        .filter(|&&f| cells.union(mesh.owner[f], mesh.neighbour[f]))
        .count();

    // Dense ascending renumbering of the surviving roots.
    let mut label = vec![usize::MAX; cell_count];
    let mut next = 0;
    for c in 0..cell_count {
        if cells.find(c) == c {
            label[c] = next;
            next += 1;
        }
    }
    let new_label = |cells: &mut CellUnion, c: usize| label[cells.find(c)];

    let mut keep = vec![true; mesh.faces.len()];
    for &f in &seam {
        keep[f] = false;
    }

    let mut interior_faces_removed = 0;
    for f in 0..mesh.faces.len() {
        mesh.owner[f] = new_label(&mut cells, mesh.owner[f]);
        if !mesh.is_internal(f) {
            continue;
        }
        mesh.neighbour[f] = new_label(&mut cells, mesh.neighbour[f]);

        if !keep[f] {
            continue;
        }
        if mesh.owner[f] == mesh.neighbour[f] {
            keep[f] = false;
            interior_faces_removed += 1;
        } else if mesh.owner[f] > mesh.neighbour[f] {
            std::mem::swap(&mut mesh.owner[f], &mut mesh.neighbour[f]);
            mesh.faces[f].flip();
        }
    }
    mesh.cell_count = next;

    let removed = compact_faces(mesh, &keep)?;
    debug!(
        removed,
        cells = mesh.cell_count,
        "Removed seam and interior faces"
    );

    let repair = repair_multiply_connected(mesh)?;

    info!(
        "Mirror cleanup: {} seam face(s), {} cell(s) merged, {} face(s) merged away",
        seam.len(),
        cells_merged,
        repair.removed_face_count
    );

    Ok(MirrorCleanupResult {
        seam_faces_removed: seam.len(),
        interior_faces_removed,
        cells_merged,
        repair,
    })
}
