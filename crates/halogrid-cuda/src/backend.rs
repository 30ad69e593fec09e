//! CUDA implementation of the backend seam.

use std::sync::Arc;

use cudarc::driver::{
    CudaContext, CudaFunction, CudaModule, CudaSlice, CudaStream, LaunchConfig, PushKernelArg,
};
use tracing::info;

use halogrid_core::{
    BoundarySet, FacePlane, FaceSet, FaceSpec, FaceStorage, Field, GridGeometry, HaloGridError,
    HostBoundarySet, RelaxBackend, Result, StencilMode,
};

use crate::kernels::{FACE_BLOCK, KERNEL_SRC, SWEEP_BLOCK};

/// Device-resident face buffer; the storage capability used by
/// [`BoundarySet`] for GPU residency.
pub struct DeviceFaceBuffer {
    stream: Arc<CudaStream>,
    buf: CudaSlice<f32>,
}

impl DeviceFaceBuffer {
    pub(crate) fn slice(&self) -> &CudaSlice<f32> {
        &self.buf
    }

    pub(crate) fn slice_mut(&mut self) -> &mut CudaSlice<f32> {
        &mut self.buf
    }
}

fn alloc_zeroed(stream: &Arc<CudaStream>, len: usize) -> Result<CudaSlice<f32>> {
    let mut buf = unsafe { stream.alloc::<f32>(len) }.map_err(|e| {
        HaloGridError::AllocationFailed {
            size: len * std::mem::size_of::<f32>(),
            reason: e.to_string(),
        }
    })?;
    let zeros = vec![0.0f32; len];
    stream
        .memcpy_htod(&zeros, &mut buf)
        .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
    Ok(buf)
}

impl FaceStorage for DeviceFaceBuffer {
    type Ctx = Arc<CudaStream>;

    fn allocate(ctx: &Self::Ctx, len: usize) -> Result<Self> {
        Ok(DeviceFaceBuffer {
            stream: ctx.clone(),
            buf: alloc_zeroed(ctx, len)?,
        })
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn copy_to_host(&self, dst: &mut [f32]) -> Result<()> {
        if dst.len() != self.buf.len() {
            return Err(HaloGridError::FaceSizeMismatch {
                expected: self.buf.len(),
                actual: dst.len(),
            });
        }
        self.stream
            .memcpy_dtoh(&self.buf, dst)
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        self.stream
            .synchronize()
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        Ok(())
    }

    fn copy_from_host(&mut self, src: &[f32]) -> Result<()> {
        if src.len() != self.buf.len() {
            return Err(HaloGridError::FaceSizeMismatch {
                expected: self.buf.len(),
                actual: src.len(),
            });
        }
        self.stream
            .memcpy_htod(src, &mut self.buf)
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))
    }
}

/// Device-resident boundary set.
pub type DeviceBoundarySet = BoundarySet<DeviceFaceBuffer>;

/// Backend keeping the iterate, source term, and face buffers in device
/// memory. Kernels are NVRTC-compiled at creation; face copies and sweeps
/// run on one stream, so they are ordered before any host readback of the
/// extracted buffers.
pub struct CudaBackend {
    #[allow(dead_code)]
    ctx: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    #[allow(dead_code)]
    module: Arc<CudaModule>,
    fn_extract: CudaFunction,
    fn_inject: CudaFunction,
    fn_step_2d: CudaFunction,
    fn_step_3d: CudaFunction,
    geom: GridGeometry,
    x: CudaSlice<f32>,
    xnew: CudaSlice<f32>,
    b: CudaSlice<f32>,
    send: DeviceBoundarySet,
    recv: DeviceBoundarySet,
    max_delta: CudaSlice<f32>,
}

impl CudaBackend {
    /// Compile the kernels on device `ordinal` and allocate all buffers,
    /// zero-initialized, for `geom`.
    pub fn new(ordinal: usize, geom: &GridGeometry) -> Result<Self> {
        let ctx =
            CudaContext::new(ordinal).map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        let stream = ctx.default_stream();

        let ptx = cudarc::nvrtc::compile_ptx(KERNEL_SRC)
            .map_err(|e| HaloGridError::CompileError(e.to_string()))?;
        let module = ctx
            .load_module(ptx)
            .map_err(|e| HaloGridError::CompileError(e.to_string()))?;
        let load = |name: &str| -> Result<CudaFunction> {
            module
                .load_function(name)
                .map_err(|e| HaloGridError::CompileError(e.to_string()))
        };
        let fn_extract = load("extract_plane")?;
        let fn_inject = load("inject_plane")?;
        let fn_step_2d = load("jacobi_step_2d")?;
        let fn_step_3d = load("jacobi_step_3d")?;

        let n = geom.len();
        let x = alloc_zeroed(&stream, n)?;
        let xnew = alloc_zeroed(&stream, n)?;
        let b = alloc_zeroed(&stream, n)?;
        let send = DeviceBoundarySet::new(&stream, geom)?;
        let recv = DeviceBoundarySet::new(&stream, geom)?;
        let max_delta = alloc_zeroed(&stream, 1)?;

        info!(
            ordinal,
            cells = n,
            "CUDA backend ready ({}x{}x{})",
            geom.nz,
            geom.ny,
            geom.nx
        );
        Ok(Self {
            ctx,
            stream,
            module,
            fn_extract,
            fn_inject,
            fn_step_2d,
            fn_step_3d,
            geom: *geom,
            x,
            xnew,
            b,
            send,
            recv,
            max_delta,
        })
    }

    /// The receive-side device boundary set (diagnostics).
    pub fn recv_set(&self) -> &DeviceBoundarySet {
        &self.recv
    }

    /// The send-side device boundary set (diagnostics).
    pub fn send_set(&self) -> &DeviceBoundarySet {
        &self.send
    }

    fn face_launch(spec: &FaceSpec) -> LaunchConfig {
        let (bx, by) = FACE_BLOCK;
        LaunchConfig {
            block_dim: (bx, by, 1),
            grid_dim: (
                (spec.nu as u32).div_ceil(bx),
                (spec.nv as u32).div_ceil(by),
                1,
            ),
            shared_mem_bytes: 0,
        }
    }

    fn sweep_launch(&self) -> LaunchConfig {
        let (bx, by, bz) = SWEEP_BLOCK;
        LaunchConfig {
            block_dim: (bx, by, bz),
            grid_dim: (
                (self.geom.nx as u32).div_ceil(bx),
                (self.geom.ny as u32).div_ceil(by),
                (self.geom.nz as u32).div_ceil(bz),
            ),
            shared_mem_bytes: 0,
        }
    }
}

impl RelaxBackend for CudaBackend {
    fn geometry(&self) -> &GridGeometry {
        &self.geom
    }

    fn load(&mut self, x: &Field, b: &Field) -> Result<()> {
        self.geom.ensure_same_extents(x.geometry())?;
        self.geom.ensure_same_extents(b.geometry())?;
        self.stream
            .memcpy_htod(x.as_slice(), &mut self.x)
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        self.stream
            .memcpy_htod(b.as_slice(), &mut self.b)
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        Ok(())
    }

    fn extract(&mut self, faces: FaceSet, plane: FacePlane) -> Result<()> {
        for face in faces.iter() {
            let spec = FaceSpec::new(face, plane, &self.geom);
            if spec.is_contiguous() {
                // Top/Bottom planes are one linear range: a plain
                // device-to-device copy, no kernel needed.
                let src = self.x.slice(spec.base..spec.base + spec.len());
                self.stream
                    .memcpy_dtod(&src, self.send.face_mut(face).slice_mut())
                    .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
                continue;
            }
            let cfg = Self::face_launch(&spec);
            let (base, su, sv) = (spec.base as u64, spec.su as u64, spec.sv as u64);
            let (nu, nv) = (spec.nu as u32, spec.nv as u32);
            unsafe {
                self.stream
                    .launch_builder(&self.fn_extract)
                    .arg(&self.x)
                    .arg(self.send.face(face).slice())
                    .arg(&base)
                    .arg(&su)
                    .arg(&sv)
                    .arg(&nu)
                    .arg(&nv)
                    .launch(cfg)
                    .map_err(|e| HaloGridError::LaunchError(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn inject(&mut self, faces: FaceSet) -> Result<()> {
        for face in faces.iter() {
            let spec = FaceSpec::new(face, FacePlane::Edge, &self.geom);
            let cfg = Self::face_launch(&spec);
            let (base, su, sv) = (spec.base as u64, spec.su as u64, spec.sv as u64);
            let (nu, nv) = (spec.nu as u32, spec.nv as u32);
            unsafe {
                self.stream
                    .launch_builder(&self.fn_inject)
                    .arg(&self.x)
                    .arg(self.recv.face(face).slice())
                    .arg(&base)
                    .arg(&su)
                    .arg(&sv)
                    .arg(&nu)
                    .arg(&nv)
                    .launch(cfg)
                    .map_err(|e| HaloGridError::LaunchError(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn download_send(&self, dst: &mut HostBoundarySet) -> Result<()> {
        dst.copy_from(&self.send)
    }

    fn upload_recv(&mut self, src: &HostBoundarySet) -> Result<()> {
        self.recv.copy_from(src)
    }

    fn step(&mut self, mode: StencilMode) -> Result<f32> {
        let zero = vec![0.0f32];
        self.stream
            .memcpy_htod(&zero, &mut self.max_delta)
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;

        let cfg = self.sweep_launch();
        let (nx, ny, nz) = (
            self.geom.nx as u32,
            self.geom.ny as u32,
            self.geom.nz as u32,
        );
        let (dx, dy, dz) = (self.geom.dx, self.geom.dy, self.geom.dz);
        unsafe {
            match mode {
                StencilMode::TwoDim => self
                    .stream
                    .launch_builder(&self.fn_step_2d)
                    .arg(&self.x)
                    .arg(&self.xnew)
                    .arg(&self.b)
                    .arg(&nx)
                    .arg(&ny)
                    .arg(&nz)
                    .arg(&dx)
                    .arg(&dy)
                    .arg(&self.max_delta)
                    .launch(cfg),
                StencilMode::ThreeDim => self
                    .stream
                    .launch_builder(&self.fn_step_3d)
                    .arg(&self.x)
                    .arg(&self.xnew)
                    .arg(&self.b)
                    .arg(&nx)
                    .arg(&ny)
                    .arg(&nz)
                    .arg(&dx)
                    .arg(&dy)
                    .arg(&dz)
                    .arg(&self.max_delta)
                    .launch(cfg),
            }
            .map_err(|e| HaloGridError::LaunchError(e.to_string()))?;
        }

        // Blocking readback: device work must drain before the host can
        // branch on the metric.
        let mut out = vec![0.0f32];
        self.stream
            .memcpy_dtoh(&self.max_delta, &mut out)
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        self.stream
            .synchronize()
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        Ok(out[0])
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.x, &mut self.xnew);
    }

    fn solution(&self, out: &mut Field) -> Result<()> {
        self.geom.ensure_same_extents(out.geometry())?;
        self.stream
            .memcpy_dtoh(&self.x, out.as_mut_slice())
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        self.stream
            .synchronize()
            .map_err(|e| HaloGridError::DeviceError(e.to_string()))?;
        Ok(())
    }
}
