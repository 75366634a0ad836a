//! Cell-to-cell adjacency derived from owner/neighbour arrays.

use rayon::prelude::*;
use tracing::debug;

use crate::types::PolyMesh;

/// Per-cell sorted neighbour lists with the connecting internal faces.
///
/// For every cell, `neighbours(c)` is sorted ascending and keeps duplicates;
/// `faces(c)[i]` is the internal face that links `c` to `neighbours(c)[i]`.
/// Entries with the same neighbour are ordered by face id, so the structure
/// is fully deterministic.
#[derive(Debug, Clone, Default)]
pub struct CellAdjacency {
    neighbours: Vec<Vec<usize>>,
    faces: Vec<Vec<usize>>,
}

impl CellAdjacency {
    /// Build from owner/neighbour arrays.
    ///
    /// Only the first `neighbour.len()` entries of `owner` are used. The cell
    /// count grows past `cell_count` if a face references a larger id.
    pub fn build(owner: &[usize], neighbour: &[usize], cell_count: usize) -> Self {
        let n_cells = owner[..neighbour.len().min(owner.len())]
            .iter()
            .chain(neighbour)
            .map(|&c| c + 1)
            .max()
            .unwrap_or(0)
            .max(cell_count);

        let mut links: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n_cells];
        for (face, (&o, &n)) in owner.iter().zip(neighbour).enumerate() {
            links[o].push((n, face));
            links[n].push((o, face));
        }

        links.par_iter_mut().for_each(|l| l.sort_unstable());

        let (neighbours, faces): (Vec<Vec<usize>>, Vec<Vec<usize>>) = links
            .into_par_iter()
            .map(|l| -> (Vec<usize>, Vec<usize>) { l.into_iter().unzip() })
            .unzip();

        debug!(
            cells = n_cells,
            internal_faces = neighbour.len(),
            "Built cell adjacency"
        );

        Self { neighbours, faces }
    }

    /// Build from a finalized mesh.
    pub fn from_mesh(mesh: &PolyMesh) -> Self {
        Self::build(&mesh.owner, &mesh.neighbour, mesh.cell_count)
    }

    /// Number of cells indexed.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Sorted neighbour ids of `cell`, duplicates retained.
    #[inline]
    pub fn neighbours(&self, cell: usize) -> &[usize] {
        self.neighbours.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Internal faces of `cell`, parallel to [`neighbours`](Self::neighbours).
    #[inline]
    pub fn faces(&self, cell: usize) -> &[usize] {
        self.faces.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of internal faces touching `cell`.
    #[inline]
    pub fn degree(&self, cell: usize) -> usize {
        self.neighbours(cell).len()
    }

    /// All internal faces connecting cells `a` and `b`, ascending.
    pub fn faces_between(&self, a: usize, b: usize) -> &[usize] {
        let nbrs = self.neighbours(a);
        let lo = nbrs.partition_point(|&n| n < b);
        let hi = nbrs.partition_point(|&n| n <= b);
        &self.faces(a)[lo..hi]
    }

    /// Iterate over `(cell, neighbours)` for every cell.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.neighbours.iter().map(Vec::as_slice).enumerate()
    }

    pub(crate) fn par_neighbour_lists(&self) -> impl IndexedParallelIterator<Item = &Vec<usize>> {
        self.neighbours.par_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours_sorted_with_duplicates() {
        // Cell 0 touches 2, then 1 twice.
        let owner = [0, 0, 0, 1];
        let neighbour = [2, 1, 1, 2];
        let adj = CellAdjacency::build(&owner, &neighbour, 3);

        assert_eq!(adj.cell_count(), 3);
        assert_eq!(adj.neighbours(0), &[1, 1, 2]);
        assert_eq!(adj.faces(0), &[1, 2, 0]);
        assert_eq!(adj.neighbours(1), &[0, 0, 2]);
        assert_eq!(adj.faces(1), &[1, 2, 3]);
        assert_eq!(adj.neighbours(2), &[0, 1]);
        assert_eq!(adj.degree(2), 2);
    }

    #[test]
    fn test_faces_between() {
        let owner = [0, 0, 0, 1];
        let neighbour = [2, 1, 1, 2];
        let adj = CellAdjacency::build(&owner, &neighbour, 3);

        assert_eq!(adj.faces_between(0, 1), &[1, 2]);
        assert_eq!(adj.faces_between(1, 0), &[1, 2]);
        assert_eq!(adj.faces_between(0, 2), &[0]);
        assert!(adj.faces_between(2, 2).is_empty());
        assert!(adj.faces_between(9, 0).is_empty());
    }

    #[test]
    fn test_boundary_owners_ignored() {
        // Faces 1 and 2 are boundary faces owned by cell 5.
        let owner = [0, 5, 5];
        let neighbour = [1];
        let adj = CellAdjacency::build(&owner, &neighbour, 0);
        assert_eq!(adj.cell_count(), 2);
        assert!(adj.neighbours(5).is_empty());
    }

    #[test]
    fn test_cell_count_grows_to_fit() {
        let adj = CellAdjacency::build(&[0], &[4], 2);
        assert_eq!(adj.cell_count(), 5);
        assert_eq!(adj.neighbours(4), &[0]);
        assert!(adj.neighbours(2).is_empty());
    }
}
