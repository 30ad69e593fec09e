//! Minimal single-subdomain demo: relax a Laplace problem with a unit
//! Dirichlet ring until convergence and print the report.
//!
//! Run with `RUST_LOG=halogrid_core=debug` for per-solve tracing.

use halogrid::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let geom = GridGeometry::single_layer(128, 128, 1.0, 1.0)?;
    let mut x = Field::zeros(geom);
    x.fill_boundary(1.0);
    let b = Field::zeros(geom);

    let backend = CpuBackend::from_problem(&x, &b)?;
    let config = SolverConfig::default()
        .with_stencil(StencilMode::TwoDim)
        .with_max_iter(50_000)
        .with_tolerance(1e-6);
    let mut solver = JacobiSolver::new(backend, NoNeighbors, config)?;

    let report = solver.solve()?;
    let out = solver.solution()?;
    let center = out.at(geom.nx / 2, geom.ny / 2, 0);

    println!(
        "{:?} after {} sweeps (residual {:.3e}), center value {:.6}",
        report.status, report.iterations, report.residual, center
    );
    Ok(())
}
