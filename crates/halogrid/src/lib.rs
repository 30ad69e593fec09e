//! # halogrid
//!
//! Discretized 3D Poisson solving by Jacobi relaxation over a rectangular
//! grid decomposed into one subdomain per compute unit. Each subdomain owns
//! its iterate and source buffers and refreshes its boundary layer once per
//! sweep by extracting face planes, shipping them through a pluggable halo
//! transport, and injecting the neighbor data it receives.
//!
//! This crate is the facade: it re-exports the core types, the host
//! backend, and (behind the `cuda` feature) the CUDA backend.
//!
//! ## Example
//!
//! ```rust
//! use halogrid::prelude::*;
//!
//! # fn main() -> halogrid::Result<()> {
//! let geom = GridGeometry::single_layer(32, 32, 1.0, 1.0)?;
//! let mut x = Field::zeros(geom);
//! x.fill_boundary(1.0);
//! let b = Field::zeros(geom);
//!
//! let backend = CpuBackend::from_problem(&x, &b)?;
//! let config = SolverConfig::default().with_stencil(StencilMode::TwoDim);
//! let mut solver = JacobiSolver::new(backend, NoNeighbors, config)?;
//! let report = solver.solve()?;
//! assert_eq!(report.status, SolveStatus::Converged);
//! # Ok(())
//! # }
//! ```

pub use halogrid_core::{
    backend, boundary, error, face, field, geometry, solver, transport,
};

pub use halogrid_core::{
    BoundarySet, ChannelExchange, Face, FacePlane, FaceSet, FaceSpec, FaceStorage, Field,
    GridGeometry, HaloExchange, HaloGridError, HostBoundarySet, HostFaceBuffer, JacobiSolver,
    NoNeighbors, RelaxBackend, Result, SolveReport, SolveStatus, SolverConfig, StencilMode,
};

pub use halogrid_cpu::CpuBackend;

#[cfg(feature = "cuda")]
pub use halogrid_cuda::{CudaBackend, DeviceBoundarySet, DeviceFaceBuffer};

/// Re-exports for convenient access.
pub mod prelude {
    pub use halogrid_core::prelude::*;
    pub use halogrid_cpu::CpuBackend;

    #[cfg(feature = "cuda")]
    pub use halogrid_cuda::{CudaBackend, DeviceBoundarySet, DeviceFaceBuffer};
}
