//! CUDA kernel source, compiled with NVRTC at backend creation.
//!
//! One `extract_plane`/`inject_plane` pair serves all six faces: the host
//! side passes the base offset and strides of the face descriptor, so the
//! strided West/East and North/South gathers and the contiguous Top/Bottom
//! planes share a single kernel body. The sweep kernels fold the
//! convergence metric into a block-level tree reduction followed by one
//! atomic per block; non-negative floats compare correctly as unsigned
//! bit patterns, so `atomicMax` on the bits yields the float maximum.

/// Threads per block for the sweep kernels (8×8×4); the in-kernel
/// reduction is sized to match.
pub const SWEEP_BLOCK: (u32, u32, u32) = (8, 8, 4);

/// Threads per block for the face-copy kernels (16×16).
pub const FACE_BLOCK: (u32, u32) = (16, 16);

/// Kernel source for face copies and Jacobi sweeps.
pub const KERNEL_SRC: &str = r#"
// Face copy: dst[u + v*nu] = src[base + u*su + v*sv].
// Covers all six faces; the caller supplies the plane descriptor.
extern "C" __global__ void extract_plane(
    const float* __restrict__ src,
    float* __restrict__ dst,
    unsigned long long base,
    unsigned long long su,
    unsigned long long sv,
    unsigned int nu,
    unsigned int nv
) {
    unsigned int u = blockIdx.x * blockDim.x + threadIdx.x;
    unsigned int v = blockIdx.y * blockDim.y + threadIdx.y;
    if (u >= nu || v >= nv) {
        return;
    }
    dst[u + (unsigned long long)v * nu] = src[base + u * su + v * sv];
}

// Inverse face copy: dst[base + u*su + v*sv] = src[u + v*nu].
extern "C" __global__ void inject_plane(
    float* __restrict__ dst,
    const float* __restrict__ src,
    unsigned long long base,
    unsigned long long su,
    unsigned long long sv,
    unsigned int nu,
    unsigned int nv
) {
    unsigned int u = blockIdx.x * blockDim.x + threadIdx.x;
    unsigned int v = blockIdx.y * blockDim.y + threadIdx.y;
    if (u >= nu || v >= nv) {
        return;
    }
    dst[base + u * su + v * sv] = src[u + (unsigned long long)v * nu];
}

// Block-level max reduction followed by one atomic per block.
// Requires a 256-thread block; |val| >= 0 so unsigned bit compare works.
__device__ void reduce_max_delta(float delta, unsigned int tid, float* sdata, float* max_delta) {
    sdata[tid] = delta;
    __syncthreads();
    #pragma unroll
    for (unsigned int s = 128; s > 0; s >>= 1) {
        if (tid < s) {
            sdata[tid] = fmaxf(sdata[tid], sdata[tid + s]);
        }
        __syncthreads();
    }
    if (tid == 0) {
        atomicMax((unsigned int*)max_delta, __float_as_uint(sdata[0]));
    }
}

// Five-point Jacobi sweep applied to every z-slice independently.
// Boundary cells of each slice pass through unchanged.
extern "C" __global__ void jacobi_step_2d(
    const float* __restrict__ x,
    float* __restrict__ xnew,
    const float* __restrict__ b,
    unsigned int nx,
    unsigned int ny,
    unsigned int nz,
    float dx,
    float dy,
    float* max_delta
) {
    __shared__ float sdata[256];
    unsigned int ix = blockIdx.x * blockDim.x + threadIdx.x;
    unsigned int iy = blockIdx.y * blockDim.y + threadIdx.y;
    unsigned int iz = blockIdx.z * blockDim.z + threadIdx.z;
    unsigned int tid = (threadIdx.z * blockDim.y + threadIdx.y) * blockDim.x + threadIdx.x;

    float delta = 0.0f;
    if (ix < nx && iy < ny && iz < nz) {
        unsigned long long idx =
            (unsigned long long)iz * nx * ny + (unsigned long long)iy * nx + ix;
        float v = x[idx];
        if (ix > 0 && ix < nx - 1 && iy > 0 && iy < ny - 1) {
            float dx2 = dx * dx;
            float dy2 = dy * dy;
            v = ((x[idx - 1] + x[idx + 1]) * dy2
               + (x[idx - nx] + x[idx + nx]) * dx2
               - b[idx] * dx2 * dy2) / (2.0f * (dx2 + dy2));
            delta = fabsf(v - x[idx]);
        }
        xnew[idx] = v;
    }
    reduce_max_delta(delta, tid, sdata, max_delta);
}

// Seven-point Jacobi sweep coupling all three axes.
extern "C" __global__ void jacobi_step_3d(
    const float* __restrict__ x,
    float* __restrict__ xnew,
    const float* __restrict__ b,
    unsigned int nx,
    unsigned int ny,
    unsigned int nz,
    float dx,
    float dy,
    float dz,
    float* max_delta
) {
    __shared__ float sdata[256];
    unsigned int ix = blockIdx.x * blockDim.x + threadIdx.x;
    unsigned int iy = blockIdx.y * blockDim.y + threadIdx.y;
    unsigned int iz = blockIdx.z * blockDim.z + threadIdx.z;
    unsigned int tid = (threadIdx.z * blockDim.y + threadIdx.y) * blockDim.x + threadIdx.x;

    float delta = 0.0f;
    if (ix < nx && iy < ny && iz < nz) {
        unsigned long long plane = (unsigned long long)nx * ny;
        unsigned long long idx = iz * plane + (unsigned long long)iy * nx + ix;
        float v = x[idx];
        if (ix > 0 && ix < nx - 1 && iy > 0 && iy < ny - 1 && iz > 0 && iz < nz - 1) {
            float dx2 = dx * dx;
            float dy2 = dy * dy;
            float dz2 = dz * dz;
            float wx = dy2 * dz2;
            float wy = dx2 * dz2;
            float wz = dx2 * dy2;
            v = ((x[idx - 1] + x[idx + 1]) * wx
               + (x[idx - nx] + x[idx + nx]) * wy
               + (x[idx - plane] + x[idx + plane]) * wz
               - b[idx] * dx2 * dy2 * dz2) / (2.0f * (wx + wy + wz));
            delta = fabsf(v - x[idx]);
        }
        xnew[idx] = v;
    }
    reduce_max_delta(delta, tid, sdata, max_delta);
}
"#;
