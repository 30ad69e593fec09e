//! Jacobi sweep kernels and face-plane copies for host memory.

use rayon::prelude::*;

use halogrid_core::{FaceSpec, GridGeometry};

/// Copy the plane described by `spec` out of `src` into the face buffer
/// `dst` (`dst[u + v*nu] = src[base + u*su + v*sv]`).
///
/// Contiguous planes (Top/Bottom) collapse to a single memcpy; the strided
/// faces gather row-parallel.
pub fn gather(src: &[f32], spec: &FaceSpec, dst: &mut [f32]) {
    debug_assert_eq!(dst.len(), spec.len());
    if spec.is_contiguous() {
        dst.copy_from_slice(&src[spec.base..spec.base + spec.len()]);
        return;
    }
    dst.par_chunks_mut(spec.nu).enumerate().for_each(|(v, row)| {
        let row_base = spec.base + v * spec.sv;
        for (u, out) in row.iter_mut().enumerate() {
            *out = src[row_base + u * spec.su];
        }
    });
}

/// Inverse of [`gather`]: write the face buffer `src` into the plane of
/// `dst` described by `spec`.
pub fn scatter(dst: &mut [f32], spec: &FaceSpec, src: &[f32]) {
    debug_assert_eq!(src.len(), spec.len());
    if spec.is_contiguous() {
        dst[spec.base..spec.base + spec.len()].copy_from_slice(src);
        return;
    }
    for v in 0..spec.nv {
        let row_base = spec.base + v * spec.sv;
        for u in 0..spec.nu {
            dst[row_base + u * spec.su] = src[u + v * spec.nu];
        }
    }
}

/// One five-point Jacobi sweep applied to every z-slice independently,
/// returning the maximum absolute cell change.
///
/// Interior cells take the dy²/dx²-weighted neighbor average offset by the
/// source term; boundary cells (the x/y ring of each slice) are copied
/// unchanged.
pub fn step_2d(geom: &GridGeometry, x: &[f32], xnew: &mut [f32], b: &[f32]) -> f32 {
    let GridGeometry { ny, nx, .. } = *geom;
    let plane = nx * ny;
    let dx2 = geom.dx * geom.dx;
    let dy2 = geom.dy * geom.dy;
    let denom = 2.0 * (dx2 + dy2);

    xnew.copy_from_slice(x);
    if nx < 3 || ny < 3 {
        return 0.0;
    }
    xnew.par_chunks_mut(plane)
        .enumerate()
        .map(|(z, slab)| {
            let base = z * plane;
            let mut local = 0.0f32;
            for y in 1..ny - 1 {
                for ix in 1..nx - 1 {
                    let i = y * nx + ix;
                    let g = base + i;
                    let v = ((x[g - 1] + x[g + 1]) * dy2 + (x[g - nx] + x[g + nx]) * dx2
                        - b[g] * dx2 * dy2)
                        / denom;
                    let d = (v - x[g]).abs();
                    if d > local {
                        local = d;
                    }
                    slab[i] = v;
                }
            }
            local
        })
        .reduce(|| 0.0, f32::max)
}

/// One seven-point Jacobi sweep coupling all three axes, returning the
/// maximum absolute cell change. Boundary cells of all six faces are copied
/// unchanged.
pub fn step_3d(geom: &GridGeometry, x: &[f32], xnew: &mut [f32], b: &[f32]) -> f32 {
    let GridGeometry { nz, ny, nx, .. } = *geom;
    let plane = nx * ny;
    let dx2 = geom.dx * geom.dx;
    let dy2 = geom.dy * geom.dy;
    let dz2 = geom.dz * geom.dz;
    // Weight of each neighbor pair is the product of the other two squared
    // spacings; reduces to the 2D form as dz grows.
    let wx = dy2 * dz2;
    let wy = dx2 * dz2;
    let wz = dx2 * dy2;
    let denom = 2.0 * (wx + wy + wz);
    let rhs = dx2 * dy2 * dz2;

    xnew.copy_from_slice(x);
    if nx < 3 || ny < 3 || nz < 3 {
        return 0.0;
    }
    xnew.par_chunks_mut(plane)
        .enumerate()
        .map(|(z, slab)| {
            if z == 0 || z == nz - 1 {
                return 0.0;
            }
            let base = z * plane;
            let mut local = 0.0f32;
            for y in 1..ny - 1 {
                for ix in 1..nx - 1 {
                    let i = y * nx + ix;
                    let g = base + i;
                    let v = ((x[g - 1] + x[g + 1]) * wx
                        + (x[g - nx] + x[g + nx]) * wy
                        + (x[g - plane] + x[g + plane]) * wz
                        - b[g] * rhs)
                        / denom;
                    let d = (v - x[g]).abs();
                    if d > local {
                        local = d;
                    }
                    slab[i] = v;
                }
            }
            local
        })
        .reduce(|| 0.0, f32::max)
}
