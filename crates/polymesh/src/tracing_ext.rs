//! Tracing extensions for mesh operations.
//!
//! The library only emits events; applications choose how to collect them.
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=polymesh=debug shows per-pair merge detail
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: Every [`TopologyIssue`](crate::TopologyIssue), skipped merges
//! - **INFO**: Stage summaries (internal faces, bad pairs, removed faces), timing
//! - **DEBUG**: Per-pair merge detail, intermediate counts
//! - **TRACE**: Detailed mesh state dumps

use std::time::Instant;
use tracing::{Span, debug, info, trace};

use crate::pipeline::ConversionResult;
use crate::types::PolyMesh;

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust,ignore
/// use polymesh::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("mesh_operation", operation = name);
        debug!(target: "polymesh::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with face and cell counts attached to the span.
    pub fn with_context(name: &'static str, face_count: usize, cell_count: usize) -> Self {
        let span = tracing::info_span!(
            "mesh_operation",
            operation = name,
            faces = face_count,
            cells = cell_count
        );
        debug!(
            target: "polymesh::timing",
            operation = name,
            faces = face_count,
            cells = cell_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "polymesh::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &PolyMesh, context: &str) {
    debug!(
        target: "polymesh::mesh_state",
        context = context,
        points = mesh.point_count(),
        faces = mesh.face_count(),
        internal_faces = mesh.internal_face_count(),
        cells = mesh.cell_count,
        patches = mesh.patches.len(),
        "Mesh state"
    );

    trace!(
        target: "polymesh::mesh_state",
        context = context,
        face_vertices = mesh.face_vertex_count(),
        patches = ?mesh.patches.iter().map(|p| (&p.name, p.start, p.size)).collect::<Vec<_>>(),
        "Detailed mesh state"
    );
}

/// Log the diagnostics of a conversion.
pub fn log_conversion_result(result: &ConversionResult) {
    info!(
        target: "polymesh::convert",
        faces = result.mesh.face_count(),
        internal_faces = result.mesh.internal_face_count(),
        cells = result.mesh.cell_count,
        flipped_faces = result.flipped_face_count,
        bad_pairs = result.bad_pairs().len(),
        removed_faces = result.removed_face_count(),
        issues = result.issues.len(),
        "Conversion completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("test_operation");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
    }

    #[test]
    fn test_log_mesh_stats() {
        let mesh = PolyMesh::default();
        // Just verify it doesn't panic
        log_mesh_stats(&mesh, "test");
        let timer = OperationTimer::with_context("ctx", 0, 0);
        let _entered = timer.span().enter();
    }
}
