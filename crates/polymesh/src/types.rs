//! Core mesh data types.
//!
//! [`RawMesh`] is what an upstream reader hands over: points, unoriented
//! polygons and per-cell signed face references. [`PolyMesh`] is the
//! finalized owner/neighbour topology produced by
//! [`OrientedTopologyBuilder`](crate::OrientedTopologyBuilder).

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A polygonal face: an ordered ring of point indices.
///
/// The winding determines the implied normal (right-hand rule).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face(Vec<u32>);

impl Face {
    /// Create a face from a ring of point indices.
    #[inline]
    pub fn new(points: Vec<u32>) -> Self {
        Self(points)
    }

    /// Number of vertices in the ring.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the ring has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The point indices in winding order.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Consume the face and return its point indices.
    #[inline]
    pub fn into_inner(self) -> Vec<u32> {
        self.0
    }

    /// Reverse the winding in place.
    ///
    /// The first vertex is kept in place, so `[a, b, c, d]` becomes
    /// `[a, d, c, b]`.
    pub fn flip(&mut self) {
        if self.0.len() > 2 {
            self.0[1..].reverse();
        }
    }

    /// Return a copy with reversed winding.
    pub fn flipped(&self) -> Self {
        let mut face = self.clone();
        face.flip();
        face
    }

    /// Rotate the ring so the vertex at `mid` becomes the first one.
    pub fn rotate_left(&mut self, mid: usize) {
        if !self.0.is_empty() {
            let n = self.0.len();
            self.0.rotate_left(mid % n);
        }
    }

    /// True if the ring contains `point`.
    #[inline]
    pub fn contains(&self, point: u32) -> bool {
        self.0.contains(&point)
    }

    /// Iterate over directed edges `(a, b)`, closing the ring.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (self.0[i], self.0[(i + 1) % n]))
    }

    /// First point index that occurs more than once in the ring, if any.
    pub fn repeated_vertex(&self) -> Option<u32> {
        let mut seen = hashbrown::HashSet::with_capacity(self.0.len());
        self.0.iter().copied().find(|&v| !seen.insert(v))
    }

    /// Area vector (normal scaled by area) of the polygon.
    ///
    /// Uses a fan of triangles around the vertex average so that non-planar
    /// polygons get a well-defined result. Point indices must be valid.
    pub fn area_vector(&self, points: &[Point3<f64>]) -> Vector3<f64> {
        match self.0.len() {
            0..=2 => Vector3::zeros(),
            3 => {
                let a = points[self.0[0] as usize];
                let b = points[self.0[1] as usize];
                let c = points[self.0[2] as usize];
                0.5 * (b - a).cross(&(c - a))
            }
            _ => {
                let avg = self.vertex_average(points);
                self.edges()
                    .map(|(a, b)| {
                        let pa = points[a as usize];
                        let pb = points[b as usize];
                        0.5 * (pa - avg).cross(&(pb - avg))
                    })
                    .sum()
            }
        }
    }

    /// Area-weighted centre of the polygon. Point indices must be valid.
    pub fn centre(&self, points: &[Point3<f64>]) -> Point3<f64> {
        if self.0.is_empty() {
            return Point3::origin();
        }
        let avg = self.vertex_average(points);
        if self.0.len() == 3 {
            return avg;
        }

        let mut weighted = Vector3::zeros();
        let mut total = 0.0;
        for (a, b) in self.edges() {
            let pa = points[a as usize];
            let pb = points[b as usize];
            let area = 0.5 * (pa - avg).cross(&(pb - avg)).norm();
            let centroid = (avg.coords + pa.coords + pb.coords) / 3.0;
            weighted += area * centroid;
            total += area;
        }

        if total > f64::EPSILON {
            Point3::from(weighted / total)
        } else {
            avg
        }
    }

    fn vertex_average(&self, points: &[Point3<f64>]) -> Point3<f64> {
        let sum: Vector3<f64> = self.0.iter().map(|&i| points[i as usize].coords).sum();
        Point3::from(sum / self.0.len() as f64)
    }
}

impl From<Vec<u32>> for Face {
    fn from(points: Vec<u32>) -> Self {
        Self(points)
    }
}

impl<const N: usize> From<[u32; N]> for Face {
    fn from(points: [u32; N]) -> Self {
        Self(points.to_vec())
    }
}

impl std::ops::Index<usize> for Face {
    type Output = u32;

    #[inline]
    fn index(&self, index: usize) -> &u32 {
        &self.0[index]
    }
}

/// Direction of a face's stored normal relative to a referencing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Stored normal points out of the cell.
    Outward,
    /// Stored normal points into the cell.
    Inward,
}

/// A decoded cell-to-face reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    /// Zero-based face index.
    pub face: usize,
    /// Orientation of the stored face relative to the cell.
    pub orientation: Orientation,
}

/// Numeric convention for signed face references.
///
/// A wire value `v` names face `|v| - base`; a negative value means the
/// stored normal points into the referencing cell. The default base is 1,
/// which keeps face 0 representable as inward (`-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRefConvention {
    pub base: i64,
}

impl Default for FaceRefConvention {
    fn default() -> Self {
        Self { base: 1 }
    }
}

impl FaceRefConvention {
    pub fn new(base: i64) -> Self {
        Self { base }
    }

    /// Decode a signed wire value. Returns `None` if it names no face in
    /// `0..face_count`.
    pub fn decode(&self, value: i64, face_count: usize) -> Option<FaceRef> {
        let orientation = if value < 0 {
            Orientation::Inward
        } else {
            Orientation::Outward
        };
        let index = value.checked_abs()?.checked_sub(self.base)?;
        let face = usize::try_from(index).ok().filter(|&f| f < face_count)?;
        Some(FaceRef { face, orientation })
    }

    /// Decode an unsigned boundary face value. Returns `None` if negative or
    /// out of range.
    pub fn decode_index(&self, value: i64, face_count: usize) -> Option<usize> {
        let index = value.checked_sub(self.base)?;
        usize::try_from(index).ok().filter(|&f| f < face_count)
    }

    /// Encode a face reference back to its wire value.
    pub fn encode(&self, face_ref: FaceRef) -> i64 {
        let magnitude = face_ref.face as i64 + self.base;
        match face_ref.orientation {
            Orientation::Outward => magnitude,
            Orientation::Inward => -magnitude,
        }
    }
}

/// A named list of boundary faces as supplied by the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBoundary {
    pub name: String,
    /// Face ids in the reader's numbering (same base as cell references).
    pub faces: Vec<i64>,
}

/// Raw connectivity handed over by an upstream mesh reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMesh {
    pub points: Vec<Point3<f64>>,
    pub faces: Vec<Face>,
    /// Per cell, signed face references.
    pub cells: Vec<Vec<i64>>,
    #[serde(default)]
    pub boundaries: Vec<RawBoundary>,
}

impl RawMesh {
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Scale all points uniformly around the origin.
    pub fn scale(&mut self, factor: f64) {
        for p in &mut self.points {
            p.coords *= factor;
        }
    }
}

/// A contiguous run of boundary faces in a finalized mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPatch {
    pub name: String,
    pub start: usize,
    pub size: usize,
}

impl BoundaryPatch {
    pub fn new(name: impl Into<String>, start: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            start,
            size,
        }
    }

    /// One past the last face of the patch.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.size
    }

    /// Face index range covered by the patch.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

/// A finalized polyhedral mesh in owner/neighbour form.
///
/// Internal faces come first, so `neighbour.len()` is the internal face
/// count and `neighbour[f]` pairs with `owner[f]` for every internal face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyMesh {
    pub points: Vec<Point3<f64>>,
    pub faces: Vec<Face>,
    pub owner: Vec<usize>,
    pub neighbour: Vec<usize>,
    pub cell_count: usize,
    #[serde(default)]
    pub patches: Vec<BoundaryPatch>,
}

impl PolyMesh {
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn internal_face_count(&self) -> usize {
        self.neighbour.len()
    }

    #[inline]
    pub fn boundary_face_count(&self) -> usize {
        self.faces.len().saturating_sub(self.neighbour.len())
    }

    #[inline]
    pub fn is_internal(&self, face: usize) -> bool {
        face < self.neighbour.len()
    }

    /// Axis-aligned bounding box, or `None` if there are no points.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.points.first()?;
        Some(self.points[1..].iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }

    /// Total number of face-vertex entries.
    pub fn face_vertex_count(&self) -> usize {
        self.faces.iter().map(Face::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_face_flip_keeps_first_vertex() {
        let mut face = Face::from([0, 1, 2, 3]);
        face.flip();
        assert_eq!(face.as_slice(), &[0, 3, 2, 1]);
        assert_eq!(face.flipped(), Face::from([0, 1, 2, 3]));
    }

    #[test]
    fn test_face_rotate_and_edges() {
        let mut face = Face::from([4, 5, 6]);
        face.rotate_left(4);
        assert_eq!(face.as_slice(), &[5, 6, 4]);
        let edges: Vec<_> = face.edges().collect();
        assert_eq!(edges, vec![(5, 6), (6, 4), (4, 5)]);
    }

    #[test]
    fn test_repeated_vertex() {
        assert_eq!(Face::from([1, 2, 3, 4]).repeated_vertex(), None);
        assert_eq!(Face::from([1, 2, 3, 2, 5]).repeated_vertex(), Some(2));
    }

    #[test]
    fn test_area_vector_and_centre() {
        let points = unit_square();
        let face = Face::from([0, 1, 2, 3]);
        let area = face.area_vector(&points);
        assert_relative_eq!(area.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(area.x, 0.0, epsilon = 1e-12);

        let reversed = face.flipped().area_vector(&points);
        assert_relative_eq!(reversed.z, -1.0, epsilon = 1e-12);

        let centre = face.centre(&points);
        assert_relative_eq!(centre.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(centre.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_area() {
        let points = unit_square();
        let tri = Face::from([0, 1, 2]);
        assert_relative_eq!(tri.area_vector(&points).norm(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_decode_default_base() {
        let conv = FaceRefConvention::default();
        assert_eq!(
            conv.decode(1, 3),
            Some(FaceRef {
                face: 0,
                orientation: Orientation::Outward
            })
        );
        assert_eq!(
            conv.decode(-3, 3),
            Some(FaceRef {
                face: 2,
                orientation: Orientation::Inward
            })
        );
        assert_eq!(conv.decode(0, 3), None);
        assert_eq!(conv.decode(4, 3), None);
        assert_eq!(conv.decode(i64::MIN, 3), None);
    }

    #[test]
    fn test_decode_zero_base() {
        let conv = FaceRefConvention::new(0);
        assert_eq!(conv.decode(0, 2).map(|r| r.face), Some(0));
        assert_eq!(
            conv.decode(-1, 2).map(|r| r.orientation),
            Some(Orientation::Inward)
        );
        assert_eq!(conv.decode_index(-1, 2), None);
        assert_eq!(conv.decode_index(1, 2), Some(1));
    }

    #[test]
    fn test_encode_inverts_decode() {
        let conv = FaceRefConvention::default();
        for value in [1, -1, 7, -7] {
            let decoded = conv.decode(value, 10).unwrap();
            assert_eq!(conv.encode(decoded), value);
        }
    }

    #[test]
    fn test_raw_mesh_scale() {
        let mut raw = RawMesh {
            points: unit_square(),
            ..Default::default()
        };
        raw.scale(2.0);
        assert_relative_eq!(raw.points[2].x, 2.0);
        assert_relative_eq!(raw.points[2].y, 2.0);
    }

    #[test]
    fn test_polymesh_counts_and_bounds() {
        let mesh = PolyMesh {
            points: unit_square(),
            faces: vec![Face::from([0, 1, 2]), Face::from([0, 2, 3])],
            owner: vec![0, 0],
            neighbour: vec![1],
            cell_count: 2,
            patches: vec![BoundaryPatch::new("wall", 1, 1)],
        };
        assert_eq!(mesh.internal_face_count(), 1);
        assert_eq!(mesh.boundary_face_count(), 1);
        assert!(mesh.is_internal(0));
        assert!(!mesh.is_internal(1));
        assert_eq!(mesh.face_vertex_count(), 6);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.x, 0.0);
        assert_relative_eq!(max.y, 1.0);
        assert_eq!(mesh.patches[0].range(), 1..2);
    }
}
