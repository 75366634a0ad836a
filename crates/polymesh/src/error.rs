//! Error types for topology construction and repair with rich diagnostics.
//!
//! Two kinds of problems are reported by this crate:
//!
//! - [`MeshError`]: fatal, structural conditions. Construction aborts and no
//!   partial mesh is handed back.
//! - [`TopologyIssue`]: non-fatal conditions (suspicious boundary numbering,
//!   skipped merges). These are accumulated and returned with the result so the
//!   caller can decide whether to proceed.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `MESH-XXXX`:
//! - `MESH-1xxx`: I/O errors (file reading, writing, parsing)
//! - `MESH-2xxx`: Input validation errors (references, coordinates)
//! - `MESH-3xxx`: Topology errors (ordering, orphan faces, merge failures)
//! - `MESH-4xxx`: Parameter errors
//! - `MESH-5xxx`: Non-fatal [`TopologyIssue`]s (boundary numbering, skipped merges)
//!
//! # Example
//!
//! ```
//! use polymesh::{ErrorCode, MeshError};
//!
//! let err = MeshError::invalid_face_reference(3, 42, 10);
//! assert_eq!(err.code(), ErrorCode::InvalidFaceReference);
//! assert_eq!(err.code().as_str(), "MESH-2001");
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::detect::BadCellPair;
use crate::merge::SkipReason;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `MESH-XXXX` where:
/// - 1xxx = I/O errors
/// - 2xxx = Input validation errors
/// - 3xxx = Topology errors
/// - 4xxx = Parameter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // I/O errors (1xxx)
    /// MESH-1001: Failed to read file
    IoRead = 1001,
    /// MESH-1002: Failed to write file
    IoWrite = 1002,
    /// MESH-1003: Failed to parse file
    ParseError = 1003,

    // Input validation errors (2xxx)
    /// MESH-2001: Cell references a face that does not exist
    InvalidFaceReference = 2001,
    /// MESH-2002: Face references a point that does not exist
    InvalidPointIndex = 2002,
    /// MESH-2003: Point has NaN or Infinity coordinate
    InvalidCoordinate = 2003,
    /// MESH-2004: Face has fewer than three points
    DegenerateFace = 2004,
    /// MESH-2005: Boundary list references a face that does not exist
    InvalidBoundaryFace = 2005,
    /// MESH-2006: Mesh has no points, faces or cells
    EmptyMesh = 2006,

    // Topology errors (3xxx)
    /// MESH-3001: Face is not referenced by any cell
    OrphanFace = 3001,
    /// MESH-3002: Internal and boundary faces are interleaved
    InternalFaceOrdering = 3002,
    /// MESH-3003: Duplicate faces between a cell pair share no vertex
    DisjointDuplicateFaces = 3003,
    /// MESH-3004: Generic topology inconsistency
    InvalidTopology = 3004,

    // Parameter errors (4xxx)
    /// MESH-4001: Mirror plane is malformed
    InvalidMirrorPlane = 4001,
    /// MESH-4002: Parameter value is out of range
    InvalidParameter = 4002,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `MESH-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "MESH-1001",
            ErrorCode::IoWrite => "MESH-1002",
            ErrorCode::ParseError => "MESH-1003",
            ErrorCode::InvalidFaceReference => "MESH-2001",
            ErrorCode::InvalidPointIndex => "MESH-2002",
            ErrorCode::InvalidCoordinate => "MESH-2003",
            ErrorCode::DegenerateFace => "MESH-2004",
            ErrorCode::InvalidBoundaryFace => "MESH-2005",
            ErrorCode::EmptyMesh => "MESH-2006",
            ErrorCode::OrphanFace => "MESH-3001",
            ErrorCode::InternalFaceOrdering => "MESH-3002",
            ErrorCode::DisjointDuplicateFaces => "MESH-3003",
            ErrorCode::InvalidTopology => "MESH-3004",
            ErrorCode::InvalidMirrorPlane => "MESH-4001",
            ErrorCode::InvalidParameter => "MESH-4002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for mesh errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the mesh from the originating mesher.
    ReexportMesh,
    /// Check the source mesh for specific problems.
    CheckSourceMesh { checks: Vec<String> },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// Manual intervention is required.
    ManualIntervention { description: String },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportMesh => {
                write!(f, "Try re-exporting the mesh from the original mesher")
            }
            RecoverySuggestion::CheckSourceMesh { checks } => {
                write!(f, "Check the source mesh for: {}", checks.join(", "))
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::ManualIntervention { description } => {
                write!(f, "{}", description)
            }
            RecoverySuggestion::None => {
                write!(f, "No automatic recovery available")
            }
        }
    }
}

/// Location information for mesh errors.
#[derive(Debug, Clone)]
pub enum MeshLocation {
    /// A specific point.
    Point { index: usize },
    /// A specific face.
    Face { index: usize },
    /// A specific cell (input numbering).
    Cell { index: usize },
    /// The interface between two cells.
    CellPair { lo: usize, hi: usize },
    /// A named boundary patch.
    Patch { name: String },
    /// A file on disk.
    File { path: PathBuf },
}

impl std::fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshLocation::Point { index } => write!(f, "point {}", index),
            MeshLocation::Face { index } => write!(f, "face {}", index),
            MeshLocation::Cell { index } => write!(f, "cell {}", index),
            MeshLocation::CellPair { lo, hi } => {
                write!(f, "interface between cells {} and {}", lo, hi)
            }
            MeshLocation::Patch { name } => write!(f, "boundary patch '{}'", name),
            MeshLocation::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Fatal errors that abort topology construction or repair.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Error reading from a file.
    #[error("failed to read mesh from {path}")]
    #[diagnostic(
        code(polymesh::io::read),
        help("Check that the file exists and is readable")
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write mesh to {path}")]
    #[diagnostic(
        code(polymesh::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing the interchange file.
    #[error("failed to parse mesh from {path}: {details}")]
    #[diagnostic(
        code(polymesh::parse::error),
        help("The file must be a JSON document produced by the mesh reader")
    )]
    ParseError { path: PathBuf, details: String },

    /// Mesh has no usable content.
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(polymesh::validation::empty),
        help("The mesh must have at least one point, one face and one cell")
    )]
    EmptyMesh { details: String },

    /// A cell references a face that does not exist.
    #[error(
        "invalid face reference: cell {cell} references {value}, but mesh only has {face_count} faces"
    )]
    #[diagnostic(
        code(polymesh::validation::face_reference),
        help("Check the face numbering base (`face_ref_base`) matches the source format")
    )]
    InvalidFaceReference {
        cell: usize,
        value: i64,
        face_count: usize,
    },

    /// A face references a point that does not exist.
    #[error(
        "invalid point index: face {face_index} references point {point_index}, but mesh only has {point_count} points"
    )]
    #[diagnostic(
        code(polymesh::validation::point_index),
        help("The face connectivity does not match the coordinate arrays")
    )]
    InvalidPointIndex {
        face_index: usize,
        point_index: u32,
        point_count: usize,
    },

    /// A point has a NaN or infinite coordinate.
    #[error("invalid coordinate at point {point_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(polymesh::validation::coordinate),
        help("Check for numerical issues in the source data")
    )]
    InvalidCoordinate {
        point_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// A face has fewer than three points.
    #[error("degenerate face {face_index}: only {vertex_count} points")]
    #[diagnostic(
        code(polymesh::validation::degenerate_face),
        help("Every face must be a polygon with at least three points")
    )]
    DegenerateFace {
        face_index: usize,
        vertex_count: usize,
    },

    /// A boundary list references a face that does not exist.
    #[error(
        "invalid boundary face: patch '{patch}' references {value}, but mesh only has {face_count} faces"
    )]
    #[diagnostic(
        code(polymesh::validation::boundary_face),
        help("Boundary face lists must use the same numbering base as the cell references")
    )]
    InvalidBoundaryFace {
        patch: String,
        value: i64,
        face_count: usize,
    },

    /// A face is not referenced by any cell.
    #[error("face {face} is not referenced by any cell")]
    #[diagnostic(
        code(polymesh::topology::orphan_face),
        help("Every face must bound at least one cell")
    )]
    OrphanFace { face: usize },

    /// Internal and boundary faces are interleaved after renumbering.
    #[error(
        "face {face} breaks internal-first ordering ({internal_faces} internal faces expected before any boundary face)"
    )]
    #[diagnostic(
        code(polymesh::topology::ordering),
        help(
            "The source mesh does not number its faces with boundary faces before internal ones. Run mesh checks in the originating mesher."
        )
    )]
    InternalFaceOrdering { face: usize, internal_faces: usize },

    /// Two faces between the same cell pair share no vertex.
    #[error(
        "faces {recipient} and {donor} both connect cells {pair} but share no vertex"
    )]
    #[diagnostic(
        code(polymesh::topology::disjoint_duplicates),
        help("The cell connectivity is corrupt; re-export the mesh")
    )]
    DisjointDuplicateFaces {
        pair: BadCellPair,
        recipient: usize,
        donor: usize,
    },

    /// Generic topology inconsistency.
    #[error("invalid mesh topology: {details}")]
    #[diagnostic(
        code(polymesh::topology::invalid),
        help("Run `polymesh check` for a detailed report")
    )]
    InvalidTopology { details: String },

    /// The mirror plane cannot be used.
    #[error("invalid mirror plane: {details}")]
    #[diagnostic(
        code(polymesh::params::mirror_plane),
        help("The plane normal must be a finite, non-zero vector")
    )]
    InvalidMirrorPlane { details: String },

    /// A parameter is out of range.
    #[error("invalid parameter {name}: {details}")]
    #[diagnostic(code(polymesh::params::invalid))]
    InvalidParameter { name: &'static str, details: String },
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::IoRead { .. } => ErrorCode::IoRead,
            MeshError::IoWrite { .. } => ErrorCode::IoWrite,
            MeshError::ParseError { .. } => ErrorCode::ParseError,
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::InvalidFaceReference { .. } => ErrorCode::InvalidFaceReference,
            MeshError::InvalidPointIndex { .. } => ErrorCode::InvalidPointIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::DegenerateFace { .. } => ErrorCode::DegenerateFace,
            MeshError::InvalidBoundaryFace { .. } => ErrorCode::InvalidBoundaryFace,
            MeshError::OrphanFace { .. } => ErrorCode::OrphanFace,
            MeshError::InternalFaceOrdering { .. } => ErrorCode::InternalFaceOrdering,
            MeshError::DisjointDuplicateFaces { .. } => ErrorCode::DisjointDuplicateFaces,
            MeshError::InvalidTopology { .. } => ErrorCode::InvalidTopology,
            MeshError::InvalidMirrorPlane { .. } => ErrorCode::InvalidMirrorPlane,
            MeshError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            MeshError::IoRead { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            MeshError::IoWrite { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            MeshError::ParseError { .. } => RecoverySuggestion::ReexportMesh,
            MeshError::EmptyMesh { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["mesh has cells".into(), "correct zone was exported".into()],
            },
            MeshError::InvalidFaceReference { .. } | MeshError::InvalidBoundaryFace { .. } => {
                RecoverySuggestion::AdjustParameters {
                    parameters: vec![("face_ref_base".into(), "0 or 1".into())],
                }
            }
            MeshError::InvalidPointIndex { .. }
            | MeshError::InvalidCoordinate { .. }
            | MeshError::DegenerateFace { .. } => RecoverySuggestion::ReexportMesh,
            MeshError::OrphanFace { .. } | MeshError::InternalFaceOrdering { .. } => {
                RecoverySuggestion::CheckSourceMesh {
                    checks: vec!["face numbering".into(), "cell connectivity".into()],
                }
            }
            MeshError::DisjointDuplicateFaces { .. } => RecoverySuggestion::ManualIntervention {
                description: "Inspect the cells around the reported interface in the source mesh"
                    .into(),
            },
            MeshError::InvalidTopology { .. } => RecoverySuggestion::None,
            MeshError::InvalidMirrorPlane { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![("normal".into(), "a non-zero vector".into())],
            },
            MeshError::InvalidParameter { name, .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![((*name).into(), "a value in range".into())],
            },
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<MeshLocation> {
        match self {
            MeshError::IoRead { path, .. }
            | MeshError::IoWrite { path, .. }
            | MeshError::ParseError { path, .. } => Some(MeshLocation::File { path: path.clone() }),
            MeshError::InvalidFaceReference { cell, .. } => {
                Some(MeshLocation::Cell { index: *cell })
            }
            MeshError::InvalidPointIndex { face_index, .. }
            | MeshError::DegenerateFace { face_index, .. } => Some(MeshLocation::Face {
                index: *face_index,
            }),
            MeshError::InvalidCoordinate { point_index, .. } => Some(MeshLocation::Point {
                index: *point_index,
            }),
            MeshError::InvalidBoundaryFace { patch, .. } => Some(MeshLocation::Patch {
                name: patch.clone(),
            }),
            MeshError::OrphanFace { face } | MeshError::InternalFaceOrdering { face, .. } => {
                Some(MeshLocation::Face { index: *face })
            }
            MeshError::DisjointDuplicateFaces { pair, .. } => Some(MeshLocation::CellPair {
                lo: pair.lo,
                hi: pair.hi,
            }),
            _ => None,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        MeshError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MeshError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create an InvalidFaceReference error.
    pub fn invalid_face_reference(cell: usize, value: i64, face_count: usize) -> Self {
        MeshError::InvalidFaceReference {
            cell,
            value,
            face_count,
        }
    }

    /// Create an InvalidTopology error.
    pub fn invalid_topology(details: impl Into<String>) -> Self {
        MeshError::InvalidTopology {
            details: details.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: &'static str, details: impl Into<String>) -> Self {
        MeshError::InvalidParameter {
            name,
            details: details.into(),
        }
    }
}

/// A non-fatal topology issue.
///
/// Unlike [`MeshError`], these never stop processing. They are collected and
/// returned alongside the result.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyIssue {
    /// Boundary faces do not occupy exactly the range after the internal faces.
    BoundaryNotContiguous {
        expected_first: usize,
        expected_last: Option<usize>,
        actual_first: Option<usize>,
        actual_last: Option<usize>,
    },
    /// A single patch's faces are not a contiguous run.
    NonContiguousPatch {
        name: String,
        first: usize,
        last: usize,
        size: usize,
    },
    /// A boundary list with no faces was dropped.
    EmptyPatch { name: String },
    /// A cell lists the same face twice.
    DuplicateFaceReference { cell: usize, face: usize },
    /// A face is referenced by more than two cells.
    FaceOverReferenced { face: usize, cell: usize },
    /// Both cells of an internal face claim the same normal direction.
    InconsistentOrientation { face: usize },
    /// Duplicate faces between a cell pair could not be merged.
    MergeSkipped {
        pair: BadCellPair,
        recipient: usize,
        donor: usize,
        reason: SkipReason,
    },
}

impl TopologyIssue {
    /// Returns a severity level for the issue.
    pub fn severity(&self) -> IssueSeverity {
        match self {
            TopologyIssue::BoundaryNotContiguous { .. } => IssueSeverity::Warning,
            TopologyIssue::NonContiguousPatch { .. } => IssueSeverity::Warning,
            TopologyIssue::EmptyPatch { .. } => IssueSeverity::Info,
            TopologyIssue::DuplicateFaceReference { .. } => IssueSeverity::Warning,
            TopologyIssue::FaceOverReferenced { .. } => IssueSeverity::Warning,
            TopologyIssue::InconsistentOrientation { .. } => IssueSeverity::Warning,
            TopologyIssue::MergeSkipped { .. } => IssueSeverity::Warning,
        }
    }

    /// Returns an issue code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            TopologyIssue::BoundaryNotContiguous { .. } => "MESH-5001",
            TopologyIssue::NonContiguousPatch { .. } => "MESH-5002",
            TopologyIssue::EmptyPatch { .. } => "MESH-5003",
            TopologyIssue::DuplicateFaceReference { .. } => "MESH-5004",
            TopologyIssue::FaceOverReferenced { .. } => "MESH-5005",
            TopologyIssue::InconsistentOrientation { .. } => "MESH-5006",
            TopologyIssue::MergeSkipped { .. } => "MESH-5007",
        }
    }

    /// Returns a recovery suggestion.
    pub fn suggestion(&self) -> &'static str {
        match self {
            TopologyIssue::BoundaryNotContiguous { .. } => {
                "Run mesh checks in both the mesher and the solver to make sure the mesh is correct"
            }
            TopologyIssue::NonContiguousPatch { .. } => {
                "Split the patch in the mesher so each boundary zone is numbered contiguously"
            }
            TopologyIssue::EmptyPatch { .. } => "Remove the empty boundary zone from the export",
            TopologyIssue::DuplicateFaceReference { .. }
            | TopologyIssue::FaceOverReferenced { .. } => {
                "Check the source mesh for non-manifold cells"
            }
            TopologyIssue::InconsistentOrientation { .. } => {
                "Check the sign convention of the cell-face connectivity"
            }
            TopologyIssue::MergeSkipped { .. } => {
                "Inspect the mesh manually around the reported cells"
            }
        }
    }
}

/// Severity levels for topology issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    /// Informational, no action needed.
    Info,
    /// Warning, mesh may have issues.
    Warning,
    /// Error, mesh is invalid.
    Error,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IssueSeverity::Info => "info",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        })
    }
}

fn fmt_bound(value: Option<usize>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

impl std::fmt::Display for TopologyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyIssue::BoundaryNotContiguous {
                expected_first,
                expected_last,
                actual_first,
                actual_last,
            } => {
                write!(
                    f,
                    "boundary faces are not contiguous: expected range [{}, {}], found [{}, {}]; \
                     something is wrong with the face numbering in the original mesh",
                    expected_first,
                    fmt_bound(*expected_last),
                    fmt_bound(*actual_first),
                    fmt_bound(*actual_last)
                )
            }
            TopologyIssue::NonContiguousPatch {
                name,
                first,
                last,
                size,
            } => {
                write!(
                    f,
                    "patch '{}' is not contiguous: range [{}, {}] holds only {} faces",
                    name, first, last, size
                )
            }
            TopologyIssue::EmptyPatch { name } => {
                write!(f, "patch '{}' has no faces and was dropped", name)
            }
            TopologyIssue::DuplicateFaceReference { cell, face } => {
                write!(f, "cell {} references face {} more than once", cell, face)
            }
            TopologyIssue::FaceOverReferenced { face, cell } => {
                write!(
                    f,
                    "face {} is referenced by a third cell ({}); extra reference ignored",
                    face, cell
                )
            }
            TopologyIssue::InconsistentOrientation { face } => {
                write!(
                    f,
                    "face {} has the same orientation sign in both of its cells",
                    face
                )
            }
            TopologyIssue::MergeSkipped {
                pair,
                recipient,
                donor,
                reason,
            } => {
                write!(
                    f,
                    "cells {} are multiply connected through faces {} and {}, which were left in place ({}); manual mesh inspection is required",
                    pair, recipient, donor, reason
                )
            }
        }
    }
}
