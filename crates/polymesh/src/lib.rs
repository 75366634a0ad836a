//! Polyhedral mesh topology construction and multiply-connected cell repair.
//!
//! This crate turns raw element connectivity (cells as signed lists of face
//! references, faces as point rings) into a finalized owner/neighbour mesh,
//! then detects and repairs cell pairs that share more than one face.
//!
//! # Pipeline
//!
//! | Stage | Type / function | Input → output |
//! |-------|-----------------|----------------|
//! | Orientation | [`OrientedTopologyBuilder`] | [`RawMesh`] → [`PolyMesh`] |
//! | Adjacency | [`CellAdjacency`] | owner/neighbour → sorted per-cell neighbour lists |
//! | Detection | [`find_multiply_connected_cells`] | adjacency → [`BadCellPair`]s |
//! | Merging | [`merge_multiply_connected`] | bad pairs → merged faces + keep mask |
//! | Compaction | [`compact_faces`] | keep mask → shrunk arrays, shifted patches |
//!
//! [`repair_multiply_connected`] runs the last four stages on any finalized
//! mesh; [`convert_mesh`] runs everything from raw input.
//!
//! # Conventions
//!
//! - Cells in the output are numbered in reverse input order: input cell `i`
//!   becomes `n_cells - 1 - i`. This yields `owner < neighbour` for every
//!   internal face.
//! - Internal faces come first; `neighbour.len()` is the internal face count.
//! - A face's point ring follows the right-hand rule; its normal points from
//!   owner to neighbour.
//! - Signed face references name face `|v| - base` (default base 1); negative
//!   values mean the stored normal points into the referencing cell.
//!
//! # Quick Start
//!
//! ```no_run
//! use polymesh::{ConvertParams, RawMesh, PolyMesh};
//!
//! let raw = RawMesh::load("case.raw.json").unwrap();
//! let result = polymesh::convert_mesh(raw, &ConvertParams::default()).unwrap();
//!
//! println!("{} pair(s) repaired", result.bad_pairs().len());
//! println!("{}", result.mesh.validate());
//! result.mesh.save("case.mesh.json").unwrap();
//! ```
//!
//! # Error Handling
//!
//! Fatal conditions return [`MeshError`]; non-fatal ones are collected as
//! [`TopologyIssue`]s on the result.
//!
//! ```
//! use polymesh::{ConvertParams, MeshError, RawMesh, convert_mesh};
//!
//! match convert_mesh(RawMesh::default(), &ConvertParams::default()) {
//!     Ok(result) => println!("{} warnings", result.issues.len()),
//!     Err(MeshError::EmptyMesh { details }) => println!("nothing to do: {}", details),
//!     Err(e) => println!("[{}] {}", e.code(), e),
//! }
//! ```

mod adjacency;
mod boundary;
mod compact;
mod detect;
mod error;
mod merge;
mod mirror;
mod orient;
mod pipeline;
pub mod tracing_ext;
mod types;

pub mod io;
pub mod repair;
pub mod validate;

pub use error::{
    ErrorCode, IssueSeverity, MeshError, MeshLocation, MeshResult, RecoverySuggestion,
    TopologyIssue,
};

pub use types::{
    BoundaryPatch, Face, FaceRef, FaceRefConvention, Orientation, PolyMesh, RawBoundary, RawMesh,
};

pub use adjacency::CellAdjacency;
pub use boundary::check_boundary_contiguity;
pub use compact::{FaceRemap, compact_faces};
pub use detect::{BadCellPair, find_multiply_connected_cells};
pub use merge::{
    FaceMergeResult, MergeOutcome, PairRepair, SkipReason, combine_faces, find_matching_vertex,
    merge_multiply_connected, merge_pair,
};
pub use mirror::{
    MirrorCleanupParams, MirrorCleanupResult, MirrorPlane, clean_up_mirrored_mesh,
    find_seam_faces,
};
pub use orient::{OrientedTopology, OrientedTopologyBuilder, renumbered_cell};
pub use pipeline::{ConversionResult, ConvertParams, convert_mesh};
pub use repair::{RepairSummary, repair_multiply_connected};

pub use io::{load_poly_mesh, load_raw_mesh, save_poly_mesh, save_raw_mesh};
pub use validate::{TopologyReport, validate_raw_mesh, validate_topology};

pub use tracing_ext::{OperationTimer, log_conversion_result, log_mesh_stats};

// Convenience methods on RawMesh
impl RawMesh {
    /// Load reader output from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        io::load_raw_mesh(path)
    }

    /// Save to a JSON file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> MeshResult<()> {
        io::save_raw_mesh(self, path)
    }

    /// Convert with the given parameters.
    pub fn convert(self, params: &ConvertParams) -> MeshResult<ConversionResult> {
        pipeline::convert_mesh(self, params)
    }
}

// Convenience methods on PolyMesh
impl PolyMesh {
    /// Load a finalized mesh from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        io::load_poly_mesh(path)
    }

    /// Save to a JSON file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> MeshResult<()> {
        io::save_poly_mesh(self, path)
    }

    /// Inspect the topology and return a report.
    pub fn validate(&self) -> TopologyReport {
        validate::validate_topology(self)
    }

    /// Build the cell adjacency index.
    pub fn adjacency(&self) -> CellAdjacency {
        CellAdjacency::from_mesh(self)
    }

    /// Merge duplicate faces between multiply-connected cells.
    pub fn repair_multiply_connected(&mut self) -> MeshResult<RepairSummary> {
        repair::repair_multiply_connected(self)
    }

    /// Remove the seam left by mirroring and repair the result.
    pub fn clean_up_mirrored(
        &mut self,
        params: &MirrorCleanupParams,
    ) -> MeshResult<MirrorCleanupResult> {
        mirror::clean_up_mirrored_mesh(self, params)
    }
}
