//! End-to-end conversion from reader output to a finalized mesh.
//!
//! # Example
//!
//! ```no_run
//! use polymesh::{ConvertParams, convert_mesh, load_raw_mesh, save_poly_mesh};
//!
//! let raw = load_raw_mesh("case.raw.json").unwrap();
//! let result = convert_mesh(raw, &ConvertParams::default()).unwrap();
//!
//! for issue in &result.issues {
//!     eprintln!("warning: {}", issue);
//! }
//! save_poly_mesh(&result.mesh, "case.mesh.json").unwrap();
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::detect::BadCellPair;
use crate::error::{MeshError, MeshResult, TopologyIssue};
use crate::merge::PairRepair;
use crate::orient::{OrientedTopology, OrientedTopologyBuilder};
use crate::repair::{RepairSummary, repair_multiply_connected};
use crate::tracing_ext::{OperationTimer, log_conversion_result, log_mesh_stats};
use crate::types::{FaceRefConvention, PolyMesh, RawMesh};
use crate::validate::validate_raw_mesh;

/// Configuration for [`convert_mesh`].
///
/// # Example
///
/// ```
/// use polymesh::ConvertParams;
///
/// let params = ConvertParams {
///     scale: 0.001, // mm to m
///     ..Default::default()
/// };
/// assert!(params.repair_multiply_connected);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertParams {
    /// Uniform scale applied to all points before building.
    ///
    /// Default: `1.0`
    pub scale: f64,

    /// Numeric base of signed face references (and boundary face lists).
    ///
    /// Default: `1`
    pub face_ref_base: i64,

    /// Merge duplicate faces between multiply-connected cells.
    ///
    /// Default: `true`
    pub repair_multiply_connected: bool,

    /// Warn if boundary faces do not directly follow the internal faces.
    ///
    /// Default: `true`
    pub check_boundary_contiguity: bool,

    /// Reject empty meshes, non-finite coordinates, degenerate faces and
    /// out-of-range point indices before building.
    ///
    /// Default: `true`
    pub validate_input: bool,
}

impl Default for ConvertParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            face_ref_base: 1,
            repair_multiply_connected: true,
            check_boundary_contiguity: true,
            validate_input: true,
        }
    }
}

impl ConvertParams {
    /// Skip input validation and the boundary contiguity check.
    ///
    /// Useful for trusted input where speed matters.
    pub fn unchecked() -> Self {
        Self {
            check_boundary_contiguity: false,
            validate_input: false,
            ..Default::default()
        }
    }

    /// Build the topology only, leaving multiply-connected cells as they are.
    pub fn without_repair() -> Self {
        Self {
            repair_multiply_connected: false,
            ..Default::default()
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> MeshResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MeshError::invalid_parameter(
                "scale",
                format!("must be positive and finite, got {}", self.scale),
            ));
        }
        if self.face_ref_base < 0 {
            return Err(MeshError::invalid_parameter(
                "face_ref_base",
                format!("must not be negative, got {}", self.face_ref_base),
            ));
        }
        Ok(())
    }

    /// Parse parameters from a JSON string. Missing fields take defaults.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Load parameters from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MeshError::io_read(path, e))?;
        Self::from_json(&text).map_err(|e| MeshError::parse_error(path, e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A finalized mesh plus everything that happened on the way.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub mesh: PolyMesh,
    /// Faces reversed because their owner saw them pointing inward.
    pub flipped_face_count: usize,
    /// Repair diagnostics (empty if repair was disabled).
    pub repair: RepairSummary,
    /// All non-fatal issues from building and repair, in order.
    pub issues: Vec<TopologyIssue>,
}

impl ConversionResult {
    /// Multiply-connected pairs found before repair.
    pub fn bad_pairs(&self) -> &[BadCellPair] {
        &self.repair.bad_pairs
    }

    pub fn repairs(&self) -> &[PairRepair] {
        &self.repair.repairs
    }

    pub fn removed_face_count(&self) -> usize {
        self.repair.removed_face_count
    }

    /// True if no warnings were raised.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Convert reader output to a finalized mesh.
///
/// Runs input validation, scaling, topology construction and the
/// multiply-connected repair pass as configured. Any fatal condition aborts
/// the whole conversion.
pub fn convert_mesh(mut raw: RawMesh, params: &ConvertParams) -> MeshResult<ConversionResult> {
    params.validate()?;
    let _timer = OperationTimer::with_context("convert_mesh", raw.face_count(), raw.cell_count());

    if params.validate_input {
        validate_raw_mesh(&raw)?;
    }

    if params.scale != 1.0 {
        info!("Scaling points by {}", params.scale);
        raw.scale(params.scale);
    }

    let OrientedTopology {
        mut mesh,
        flipped_faces,
        mut issues,
    } = OrientedTopologyBuilder::new()
        .with_convention(FaceRefConvention::new(params.face_ref_base))
        .check_boundary_contiguity(params.check_boundary_contiguity)
        .build(raw)?;
    log_mesh_stats(&mesh, "after topology construction");

    let mut repair = if params.repair_multiply_connected {
        repair_multiply_connected(&mut mesh)?
    } else {
        RepairSummary::default()
    };
    issues.extend(repair.issues.drain(..));

    let result = ConversionResult {
        mesh,
        flipped_face_count: flipped_faces,
        repair,
        issues,
    };
    log_conversion_result(&result);
    Ok(result)
}
