//! # halogrid-cpu
//!
//! Host backend for halogrid: the same face-copy and Jacobi-sweep
//! operations as the CUDA backend, run on the CPU with rayon. Serves as the
//! reference implementation for the test suite and as the fallback when no
//! accelerator is present.

pub mod backend;
pub mod stencil;

pub use backend::CpuBackend;
