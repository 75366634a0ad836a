//! Merging duplicate faces between multiply-connected cell pairs.
//!
//! When two cells share several internal faces, the faces are stitched into
//! one polygon by walking their vertex rings. Both faces have the same
//! orientation (owner to neighbour), so a shared edge appears as `(a, b)` in
//! one ring and `(b, a)` in the other:
//!
//! ```text
//! 1 -- 2 -- 3        1 -- 2 -- 3
//! |    |    |   ->   |         |
//! 4 -- 5 -- 6        4 -- 5 -- 6
//! ```
//!
//! Faces that only touch at a single vertex are never merged; the result is
//! reported as [`MergeOutcome::Skipped`] and the faces stay as they are.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adjacency::CellAdjacency;
use crate::compact::FaceRemap;
use crate::detect::BadCellPair;
use crate::error::{MeshError, MeshResult, TopologyIssue};
use crate::types::{Face, PolyMesh};

/// Why a donor face was left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The faces meet at one vertex only, not along an edge.
    SingleVertexContact { vertex: u32 },
    /// Splicing would produce a ring that visits `vertex` twice.
    NonSimpleResult { vertex: u32 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SingleVertexContact { vertex } => {
                write!(f, "faces touch only at point {}", vertex)
            }
            SkipReason::NonSimpleResult { vertex } => {
                write!(f, "merged face would repeat point {}", vertex)
            }
        }
    }
}

/// Result of merging one donor face into a recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(Face),
    Skipped(SkipReason),
}

/// First `(recipient_index, donor_index)` at which both rings hold the same point.
pub fn find_matching_vertex(recipient: &Face, donor: &Face) -> Option<(usize, usize)> {
    recipient
        .as_slice()
        .iter()
        .enumerate()
        .find_map(|(ri, v)| {
            donor
                .as_slice()
                .iter()
                .position(|d| d == v)
                .map(|di| (ri, di))
        })
}

/// Merge `donor` into `recipient` along their shared edge.
///
/// Returns `None` if the rings share no point at all. On a shared edge the
/// merged ring has `|recipient| + |donor| - 2` vertices.
pub fn combine_faces(recipient: &Face, donor: &Face) -> Option<MergeOutcome> {
    let (mut ri, mut di) = find_matching_vertex(recipient, donor)?;
    let (nr, nd) = (recipient.len(), donor.len());

    // The match may be either end of the shared edge; anchor on the one that
    // the recipient reaches second.
    let next_r = (ri + 1) % nr;
    let prev_d = (di + nd - 1) % nd;
    if recipient[next_r] == donor[prev_d] {
        ri = next_r;
        di = prev_d;
    }

    let mut r = recipient.clone();
    r.rotate_left(ri);
    let mut d = donor.clone();
    d.rotate_left(di + 1);

    // r starts and d ends at the anchor.
    if r[nr - 1] != d[0] {
        return Some(MergeOutcome::Skipped(SkipReason::SingleVertexContact {
            vertex: r[0],
        }));
    }

    let interior = d.as_slice().get(1..nd.saturating_sub(1)).unwrap_or(&[]);
    let mut ring = r.into_inner();
    ring.extend_from_slice(interior);
    let merged = Face::new(ring);

    if let Some(vertex) = merged.repeated_vertex() {
        return Some(MergeOutcome::Skipped(SkipReason::NonSimpleResult { vertex }));
    }

    Some(MergeOutcome::Merged(merged))
}

/// What happened to the duplicate faces of one cell pair.
///
/// Face ids index the face list the pair was merged in. After
/// [`repair_multiply_connected`](crate::repair_multiply_connected) they index
/// the compacted mesh, except `removed`, which keeps the ids the donors had.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRepair {
    pub pair: BadCellPair,
    /// Internal faces from `pair.lo` to `pair.hi`, ascending.
    pub faces: Vec<usize>,
    /// The surviving face (lowest id).
    pub recipient: usize,
    /// New ring of the recipient.
    pub merged_face: Face,
    /// Donors merged away, in merge order.
    pub removed: Vec<usize>,
    /// Donors left in place.
    pub skipped: Vec<(usize, SkipReason)>,
}

impl PairRepair {
    /// True if every donor was merged.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Move surviving face ids to their compacted positions.
    ///
    /// `faces` drops the merged-away donors.
    pub fn renumber(&mut self, remap: &FaceRemap) {
        let removed = &self.removed;
        self.faces.retain(|f| !removed.contains(f));
        for face in &mut self.faces {
            *face = remap.apply(*face);
        }
        self.recipient = remap.apply(self.recipient);
        for (donor, _) in &mut self.skipped {
            *donor = remap.apply(*donor);
        }
    }
}

/// Merge the duplicate faces of a single cell pair.
///
/// Donors are merged left to right. A donor that cannot be merged yet (it may
/// only touch a face that a later donor supplies) is retried in another pass,
/// until a pass makes no progress. A donor that still shares no point with the
/// recipient is fatal.
pub fn merge_pair(
    faces: &[Face],
    owner: &[usize],
    neighbour: &[usize],
    adjacency: &CellAdjacency,
    pair: BadCellPair,
) -> MeshResult<PairRepair> {
    let candidates: Vec<usize> = adjacency
        .faces_between(pair.lo, pair.hi)
        .iter()
        .copied()
        .filter(|&f| owner[f] == pair.lo && neighbour[f] == pair.hi)
        .collect();

    let [recipient_id, donors @ ..] = candidates.as_slice() else {
        return Err(MeshError::invalid_topology(format!(
            "cells {} have no internal face with owner {}",
            pair, pair.lo
        )));
    };
    if donors.is_empty() {
        return Err(MeshError::invalid_topology(format!(
            "cells {} are reported as multiply connected but only face {} runs from owner to neighbour",
            pair, recipient_id
        )));
    }
    let recipient_id = *recipient_id;

    debug!(pair = %pair, faces = ?candidates, "Correcting faces");

    let mut recipient = faces[recipient_id].clone();
    let mut removed = Vec::with_capacity(donors.len());
    let mut pending: Vec<usize> = donors.to_vec();

    let blocked = loop {
        let mut blocked: Vec<(usize, Option<SkipReason>)> = Vec::new();
        for &donor in &pending {
            match combine_faces(&recipient, &faces[donor]) {
                Some(MergeOutcome::Merged(face)) => {
                    recipient = face;
                    removed.push(donor);
                }
                Some(MergeOutcome::Skipped(reason)) => blocked.push((donor, Some(reason))),
                None => blocked.push((donor, None)),
            }
        }

        let progress = blocked.len() < pending.len();
        if blocked.is_empty() || !progress {
            break blocked;
        }
        pending = blocked.iter().map(|&(d, _)| d).collect();
    };

    let skipped = blocked
        .into_iter()
        .map(|(donor, reason)| {
            reason.map(|r| (donor, r)).ok_or(MeshError::DisjointDuplicateFaces {
                pair,
                recipient: recipient_id,
                donor,
            })
        })
        .collect::<MeshResult<Vec<_>>>()?;

    Ok(PairRepair {
        pair,
        faces: candidates,
        recipient: recipient_id,
        merged_face: recipient,
        removed,
        skipped,
    })
}

/// Outcome of merging over all bad pairs.
#[derive(Debug, Clone, Default)]
pub struct FaceMergeResult {
    /// Per face: `true` = keep, `false` = merged away.
    pub keep: Vec<bool>,
    pub repairs: Vec<PairRepair>,
    pub removed_count: usize,
    pub issues: Vec<TopologyIssue>,
}

/// Merge duplicate faces for every pair and write the merged rings into `mesh`.
///
/// On error `mesh` is not modified.
///
/// Pairs are independent (a face connects exactly one pair), so they are
/// evaluated in parallel against the unmodified face list and then applied
/// in pair order. The face arrays are not shrunk; use the returned `keep`
/// mask with [`compact_faces`](crate::compact_faces).
pub fn merge_multiply_connected(
    mesh: &mut PolyMesh,
    adjacency: &CellAdjacency,
    pairs: &[BadCellPair],
) -> MeshResult<FaceMergeResult> {
    let results: Vec<MeshResult<PairRepair>> = pairs
        .par_iter()
        .map(|&pair| merge_pair(&mesh.faces, &mesh.owner, &mesh.neighbour, adjacency, pair))
        .collect();
    // First error in pair order, before anything is written.
    let results = results.into_iter().collect::<MeshResult<Vec<_>>>()?;

    let mut keep = vec![true; mesh.faces.len()];
    let mut repairs = Vec::with_capacity(results.len());
    let mut issues = Vec::new();
    let mut removed_count = 0;

    for repair in results {
        if !repair.removed.is_empty() {
            mesh.faces[repair.recipient] = repair.merged_face.clone();
        }
        for &donor in &repair.removed {
            keep[donor] = false;
        }
        removed_count += repair.removed.len();

        for &(donor, reason) in &repair.skipped {
            let issue = TopologyIssue::MergeSkipped {
                pair: repair.pair,
                recipient: repair.recipient,
                donor,
                reason,
            };
            warn!("{}", issue);
            issues.push(issue);
        }

        repairs.push(repair);
    }

    info!(
        pairs = pairs.len(),
        removed = removed_count,
        skipped = issues.len(),
        "Merged duplicate faces"
    );

    Ok(FaceMergeResult {
        keep,
        repairs,
        removed_count,
        issues,
    })
}
