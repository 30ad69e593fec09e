//! Two-subdomain solves over the in-process channel transport.
//!
//! These exercise the loop invariant that matters most in a decomposed
//! solve: the boundary layer must be refreshed from the neighbor once per
//! sweep, before the stencil reads the iterate. Both subdomains start with
//! zeroed interface ghosts, so the asserted steady states are reachable
//! only if the per-iteration exchange actually delivers data.

use std::thread;

use halogrid::prelude::*;

const NY: usize = 6;
const NX: usize = 6;
/// The two subdomains abut with a one-cell ghost layer each: A owns global
/// columns 0..=4, B owns 5..=9, and each carries the neighbor's adjacent
/// column as its ghost.
const GLOBAL_NX: usize = 10;

fn run_subdomain(
    mut x: Field,
    b: Field,
    exchange: ChannelExchange,
    max_iter: u32,
) -> (SolveReport, Field) {
    x.geometry().ensure_same_extents(b.geometry()).unwrap();
    let backend = CpuBackend::from_problem(&x, &b).unwrap();
    // Tolerance zero: both peers run the full budget in lockstep, so
    // neither stops exchanging while the other still expects a message.
    let config = SolverConfig::new(max_iter, 0.0, StencilMode::TwoDim);
    let mut solver = JacobiSolver::new(backend, exchange, config).unwrap();
    let report = solver.solve().unwrap();
    (report, solver.solution().unwrap())
}

#[test]
fn split_laplace_matches_the_uniform_steady_state() {
    let geom = GridGeometry::single_layer(NY, NX, 1.0, 1.0).unwrap();

    // Unit Dirichlet data on the physical ring only; the interface columns
    // (A East, B West) start at zero and are fed by the exchange.
    let mut xa = Field::zeros(geom);
    let mut xb = Field::zeros(geom);
    for x in 0..NX {
        for f in [&mut xa, &mut xb] {
            f.set(x, 0, 0, 1.0);
            f.set(x, NY - 1, 0, 1.0);
        }
    }
    for y in 0..NY {
        xa.set(0, y, 0, 1.0);
        xb.set(NX - 1, y, 0, 1.0);
    }

    let mut ex_a = ChannelExchange::new();
    let mut ex_b = ChannelExchange::new();
    ChannelExchange::link(&mut ex_a, Face::East, &mut ex_b);

    let b = Field::zeros(geom);
    let (bb, ba) = (b.clone(), b);
    let ha = thread::spawn(move || run_subdomain(xa, ba, ex_a, 500));
    let hb = thread::spawn(move || run_subdomain(xb, bb, ex_b, 500));
    let (report_a, out_a) = ha.join().unwrap();
    let (report_b, out_b) = hb.join().unwrap();

    assert_eq!(report_a.status, SolveStatus::MaxIterExceeded);
    assert_eq!(report_b.status, SolveStatus::MaxIterExceeded);
    assert!(report_a.residual < 1e-4, "residual {}", report_a.residual);
    assert!(report_b.residual < 1e-4, "residual {}", report_b.residual);

    for out in [&out_a, &out_b] {
        for y in 1..NY - 1 {
            for x in 1..NX - 1 {
                assert!(
                    (out.at(x, y, 0) - 1.0).abs() < 1e-3,
                    "cell ({x},{y}) = {}",
                    out.at(x, y, 0)
                );
            }
        }
    }
}

#[test]
fn split_solve_reproduces_a_gradient_across_the_interface() {
    let geom = GridGeometry::single_layer(NY, NX, 1.0, 1.0).unwrap();

    // Dirichlet data u(gx, y) = gx on the physical ring; the harmonic
    // interior is the same linear ramp, which crosses the interface with a
    // nonzero slope. A maps local x to global x, B to x + NX - 2.
    let ramp = |gx: usize| gx as f32;
    let mut xa = Field::zeros(geom);
    let mut xb = Field::zeros(geom);
    for x in 0..NX {
        xa.set(x, 0, 0, ramp(x));
        xa.set(x, NY - 1, 0, ramp(x));
        xb.set(x, 0, 0, ramp(x + NX - 2));
        xb.set(x, NY - 1, 0, ramp(x + NX - 2));
    }
    for y in 0..NY {
        xa.set(0, y, 0, ramp(0));
        xb.set(NX - 1, y, 0, ramp(GLOBAL_NX - 1));
    }

    let mut ex_a = ChannelExchange::new();
    let mut ex_b = ChannelExchange::new();
    ChannelExchange::link(&mut ex_a, Face::East, &mut ex_b);

    let b = Field::zeros(geom);
    let (bb, ba) = (b.clone(), b);
    let ha = thread::spawn(move || run_subdomain(xa, ba, ex_a, 800));
    let hb = thread::spawn(move || run_subdomain(xb, bb, ex_b, 800));
    let (_, out_a) = ha.join().unwrap();
    let (_, out_b) = hb.join().unwrap();

    for y in 1..NY - 1 {
        for x in 1..NX - 1 {
            assert!(
                (out_a.at(x, y, 0) - ramp(x)).abs() < 1e-2,
                "A cell ({x},{y}) = {}, want {}",
                out_a.at(x, y, 0),
                ramp(x)
            );
            assert!(
                (out_b.at(x, y, 0) - ramp(x + NX - 2)).abs() < 1e-2,
                "B cell ({x},{y}) = {}, want {}",
                out_b.at(x, y, 0),
                ramp(x + NX - 2)
            );
        }
    }
}
