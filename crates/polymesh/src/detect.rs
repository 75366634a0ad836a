//! Detection of multiply-connected cell pairs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adjacency::CellAdjacency;

/// Two cells connected by more than one internal face, with `lo < hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BadCellPair {
    pub lo: usize,
    pub hi: usize,
}

impl BadCellPair {
    /// Create a pair from two cell ids in either order.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }
}

impl std::fmt::Display for BadCellPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}

/// Find every cell pair that shares more than one internal face.
///
/// Consecutive equal entries in a cell's sorted neighbour list mark a
/// duplicate connection. The result is sorted and free of duplicates.
pub fn find_multiply_connected_cells(adjacency: &CellAdjacency) -> Vec<BadCellPair> {
    let mut pairs: Vec<BadCellPair> = adjacency
        .par_neighbour_lists()
        .enumerate()
        .flat_map_iter(|(cell, nbrs)| {
            nbrs.windows(2)
                .filter(|w| w[0] == w[1])
                .map(move |w| BadCellPair::new(cell, w[1]))
        })
        .collect();

    pairs.sort_unstable();
    pairs.dedup();

    if pairs.is_empty() {
        debug!("No multiply connected cells found");
    } else {
        info!(
            pairs = pairs.len(),
            "Found pair(s) of multiply connected cells"
        );
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_ordered() {
        assert_eq!(BadCellPair::new(5, 2), BadCellPair { lo: 2, hi: 5 });
        assert_eq!(BadCellPair::new(2, 5).to_string(), "(2, 5)");
    }

    #[test]
    fn test_detects_duplicate_connection_once() {
        let owner = [0, 0, 0, 1];
        let neighbour = [2, 1, 1, 2];
        let adj = CellAdjacency::build(&owner, &neighbour, 3);
        assert_eq!(
            find_multiply_connected_cells(&adj),
            vec![BadCellPair::new(0, 1)]
        );
    }

    #[test]
    fn test_triple_connection_reported_once() {
        let owner = [0, 0, 0];
        let neighbour = [1, 1, 1];
        let adj = CellAdjacency::build(&owner, &neighbour, 2);
        assert_eq!(find_multiply_connected_cells(&adj).len(), 1);
    }

    #[test]
    fn test_pairs_sorted() {
        let owner = [2, 2, 0, 0];
        let neighbour = [3, 3, 1, 1];
        let adj = CellAdjacency::build(&owner, &neighbour, 4);
        assert_eq!(
            find_multiply_connected_cells(&adj),
            vec![BadCellPair::new(0, 1), BadCellPair::new(2, 3)]
        );
    }

    #[test]
    fn test_chain_has_no_pairs() {
        let n = 101;
        let owner: Vec<usize> = (0..n - 1).collect();
        let neighbour: Vec<usize> = (1..n).collect();
        let adj = CellAdjacency::build(&owner, &neighbour, n);
        assert!(find_multiply_connected_cells(&adj).is_empty());
    }
}
