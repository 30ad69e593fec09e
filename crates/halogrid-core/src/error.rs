//! Error types shared across the halogrid crates.

use thiserror::Error;

/// Result type for halogrid operations.
pub type Result<T> = std::result::Result<T, HaloGridError>;

/// Errors surfaced by geometry checks, backends, and transports.
///
/// Geometry and size mismatches are contract violations and are raised at
/// the call boundary; non-convergence is *not* an error (see
/// [`SolveStatus`](crate::solver::SolveStatus)).
#[derive(Debug, Error)]
pub enum HaloGridError {
    /// Zero cell counts or non-positive spacing at construction.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Extents disagree between two participants of one solve.
    #[error("geometry mismatch: expected {expected:?}, got {actual:?}")]
    GeometryMismatch {
        /// Expected `[nz, ny, nx]` extents.
        expected: [usize; 3],
        /// Actual `[nz, ny, nx]` extents.
        actual: [usize; 3],
    },

    /// A face buffer has the wrong number of elements.
    #[error("face buffer size mismatch: expected {expected}, got {actual}")]
    FaceSizeMismatch {
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },

    /// Buffer allocation failed.
    #[error("allocation of {size} bytes failed: {reason}")]
    AllocationFailed {
        /// Requested size in bytes.
        size: usize,
        /// Underlying failure description.
        reason: String,
    },

    /// Accelerator device error.
    #[error("device error: {0}")]
    DeviceError(String),

    /// Kernel compilation error.
    #[error("kernel compile error: {0}")]
    CompileError(String),

    /// Kernel launch error.
    #[error("kernel launch error: {0}")]
    LaunchError(String),

    /// The halo transport failed to deliver a face buffer.
    #[error("halo exchange error: {0}")]
    ExchangeError(String),
}
