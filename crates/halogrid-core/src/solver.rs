//! The Jacobi relaxation driver.

use tracing::{debug, info, trace};

use crate::backend::{RelaxBackend, StencilMode};
use crate::boundary::{BoundarySet, HostBoundarySet};
use crate::error::Result;
use crate::face::FacePlane;
use crate::field::Field;
use crate::transport::HaloExchange;

/// Iteration budget, tolerance, and stencil choice for one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of sweeps before giving up.
    pub max_iter: u32,
    /// Convergence threshold on the max-change metric.
    pub tolerance: f32,
    /// Stencil dimensionality.
    pub stencil: StencilMode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 10_000,
            tolerance: 1e-4,
            stencil: StencilMode::default(),
        }
    }
}

impl SolverConfig {
    /// Config with every knob explicit.
    pub fn new(max_iter: u32, tolerance: f32, stencil: StencilMode) -> Self {
        Self {
            max_iter,
            tolerance,
            stencil,
        }
    }

    /// Replace the iteration budget.
    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Replace the convergence threshold.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replace the stencil choice.
    pub fn with_stencil(mut self, stencil: StencilMode) -> Self {
        self.stencil = stencil;
        self
    }
}

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The change metric dropped below the configured tolerance.
    Converged,
    /// The iteration budget ran out; the best-effort iterate is still
    /// available. Reported, not raised: the caller decides whether to retry
    /// with a larger budget or a looser tolerance.
    MaxIterExceeded,
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Why the loop stopped.
    pub status: SolveStatus,
    /// Sweeps actually run.
    pub iterations: u32,
    /// Final max-change metric; infinite if no sweep ran.
    pub residual: f32,
}

/// Drives the relaxation loop over a backend and a transport.
///
/// Per iteration: refresh halos (extract → exchange → inject), apply the
/// stencil producing the next iterate, read back the convergence metric,
/// swap. The halo refresh happening *before* the stencil reads the iterate
/// is the loop invariant that keeps a decomposed solve equal to its
/// monolithic counterpart.
pub struct JacobiSolver<B, E> {
    backend: B,
    exchange: E,
    config: SolverConfig,
    send: HostBoundarySet,
    recv: HostBoundarySet,
}

impl<B: RelaxBackend, E: HaloExchange> JacobiSolver<B, E> {
    /// Assemble a solver; the host staging sets are sized from the
    /// backend's geometry.
    pub fn new(backend: B, exchange: E, config: SolverConfig) -> Result<Self> {
        let geom = *backend.geometry();
        Ok(Self {
            backend,
            exchange,
            config,
            send: BoundarySet::host(&geom)?,
            recv: BoundarySet::host(&geom)?,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Borrow the backend mutably (problem setup between solves).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Run the relaxation loop to a terminal state.
    ///
    /// With `max_iter == 0` this returns immediately with
    /// [`SolveStatus::MaxIterExceeded`] and the iterate untouched.
    pub fn solve(&mut self) -> Result<SolveReport> {
        let SolverConfig {
            max_iter,
            tolerance,
            stencil,
        } = self.config;
        info!(max_iter, tolerance, ?stencil, "starting Jacobi relaxation");

        let mut iterations = 0u32;
        let mut residual = f32::INFINITY;
        let status = loop {
            if iterations >= max_iter {
                break SolveStatus::MaxIterExceeded;
            }
            self.refresh_halos()?;
            residual = self.backend.step(stencil)?;
            self.backend.swap();
            iterations += 1;
            trace!(iterations, residual, "sweep complete");
            if residual < tolerance {
                break SolveStatus::Converged;
            }
        };

        info!(?status, iterations, residual, "relaxation finished");
        Ok(SolveReport {
            status,
            iterations,
            residual,
        })
    }

    /// Extract halo planes, run the transport, inject received faces into
    /// the iterate's boundary layer. Must complete before the sweep reads
    /// the iterate.
    fn refresh_halos(&mut self) -> Result<()> {
        let wanted = self.exchange.connected();
        if wanted.is_empty() {
            return Ok(());
        }
        self.backend.extract(wanted, FacePlane::Halo)?;
        self.backend.download_send(&mut self.send)?;
        let received = self.exchange.exchange(&self.send, &mut self.recv)?;
        debug!(faces = received.len(), "halo refresh");
        if !received.is_empty() {
            self.backend.upload_recv(&self.recv)?;
            self.backend.inject(received)?;
        }
        Ok(())
    }

    /// Download the current iterate.
    pub fn solution(&self) -> Result<Field> {
        let mut out = Field::zeros(*self.backend.geometry());
        self.backend.solution(&mut out)?;
        Ok(out)
    }

    /// Tear the solver apart, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}
