//! # halogrid-core
//!
//! Core types for grid-decomposed Jacobi relaxation: subdomain geometry,
//! scalar fields, per-face boundary (halo) buffers, the backend seam, and
//! the iteration driver.
//!
//! A solve is assembled from three pieces:
//!
//! - a [`RelaxBackend`] that owns the iterate and source buffers and runs
//!   the face-copy and stencil kernels (host and CUDA implementations live
//!   in `halogrid-cpu` and `halogrid-cuda`),
//! - a [`HaloExchange`] transport that moves extracted face buffers between
//!   neighboring subdomains once per iteration,
//! - the [`JacobiSolver`] driver that sequences extraction, exchange,
//!   injection, the stencil sweep, and the convergence check.
//!
//! ## Example
//!
//! ```ignore
//! use halogrid_core::prelude::*;
//! use halogrid_cpu::CpuBackend;
//!
//! let geom = GridGeometry::single_layer(64, 64, 1.0, 1.0)?;
//! let mut backend = CpuBackend::new(&geom)?;
//! backend.load(&x0, &b)?;
//!
//! let config = SolverConfig::default().with_tolerance(1e-5);
//! let mut solver = JacobiSolver::new(backend, NoNeighbors, config)?;
//! let report = solver.solve()?;
//! println!("{:?} after {} sweeps", report.status, report.iterations);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod boundary;
pub mod error;
pub mod face;
pub mod field;
pub mod geometry;
pub mod solver;
pub mod transport;

/// Re-exports for convenient access.
pub mod prelude {
    pub use crate::backend::{RelaxBackend, StencilMode};
    pub use crate::boundary::{BoundarySet, FaceStorage, HostBoundarySet, HostFaceBuffer};
    pub use crate::error::{HaloGridError, Result};
    pub use crate::face::{Face, FacePlane, FaceSet, FaceSpec};
    pub use crate::field::Field;
    pub use crate::geometry::GridGeometry;
    pub use crate::solver::{JacobiSolver, SolveReport, SolveStatus, SolverConfig};
    pub use crate::transport::{ChannelExchange, HaloExchange, NoNeighbors};
}

pub use prelude::*;
