//! Boundary (halo) buffer sets.
//!
//! A [`BoundarySet`] owns six flat buffers, one per face, sized for one
//! geometry. Memory residency is a storage *capability* selected at
//! construction: the generic parameter supplies allocation and host-copy
//! operations, so host and device sets share one structure instead of an
//! inheritance pair.

use crate::error::{HaloGridError, Result};
use crate::face::Face;
use crate::geometry::GridGeometry;

/// Storage capability for one face buffer.
///
/// Implementations provide allocation plus element-for-element copies to
/// and from host memory; that is enough to stage any cross-residency
/// transfer. Host storage lives here, device storage in the backend crates.
pub trait FaceStorage: Sized {
    /// Residency context needed to allocate: unit for host buffers, a
    /// device stream for accelerator buffers.
    type Ctx;

    /// Allocate a zero-initialized buffer of `len` elements.
    fn allocate(ctx: &Self::Ctx, len: usize) -> Result<Self>;

    /// Element count.
    fn len(&self) -> usize;

    /// Paired with [`len`](Self::len).
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy into a host slice of identical length.
    fn copy_to_host(&self, dst: &mut [f32]) -> Result<()>;

    /// Overwrite from a host slice of identical length.
    fn copy_from_host(&mut self, src: &[f32]) -> Result<()>;
}

/// Host-resident face buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostFaceBuffer(Vec<f32>);

impl HostFaceBuffer {
    /// Buffer contents.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Mutable buffer contents.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.0
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(HaloGridError::FaceSizeMismatch { expected, actual })
    }
}

impl FaceStorage for HostFaceBuffer {
    type Ctx = ();

    fn allocate(_ctx: &(), len: usize) -> Result<Self> {
        Ok(HostFaceBuffer(vec![0.0; len]))
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn copy_to_host(&self, dst: &mut [f32]) -> Result<()> {
        check_len(self.0.len(), dst.len())?;
        dst.copy_from_slice(&self.0);
        Ok(())
    }

    fn copy_from_host(&mut self, src: &[f32]) -> Result<()> {
        check_len(self.0.len(), src.len())?;
        self.0.copy_from_slice(src);
        Ok(())
    }
}

/// Six per-face buffers bound to one geometry and one memory residency.
///
/// Buffer sizes are fixed by the geometry: `north`/`south` hold `nx*nz`
/// elements, `west`/`east` hold `ny*nz`, `top`/`bottom` hold `nx*ny`.
/// There are no partial or ragged faces.
#[derive(Debug)]
pub struct BoundarySet<S> {
    nz: usize,
    ny: usize,
    nx: usize,
    north: S,
    south: S,
    west: S,
    east: S,
    top: S,
    bottom: S,
}

/// Host-resident boundary set, the staging format consumed by transports.
pub type HostBoundarySet = BoundarySet<HostFaceBuffer>;

impl<S: FaceStorage> BoundarySet<S> {
    /// Allocate all six buffers, zero-initialized, sized for `geom`.
    pub fn new(ctx: &S::Ctx, geom: &GridGeometry) -> Result<Self> {
        Ok(BoundarySet {
            nz: geom.nz,
            ny: geom.ny,
            nx: geom.nx,
            north: S::allocate(ctx, geom.face_len(Face::North))?,
            south: S::allocate(ctx, geom.face_len(Face::South))?,
            west: S::allocate(ctx, geom.face_len(Face::West))?,
            east: S::allocate(ctx, geom.face_len(Face::East))?,
            top: S::allocate(ctx, geom.face_len(Face::Top))?,
            bottom: S::allocate(ctx, geom.face_len(Face::Bottom))?,
        })
    }

    /// Extents as `[nz, ny, nx]`.
    pub fn extents(&self) -> [usize; 3] {
        [self.nz, self.ny, self.nx]
    }

    /// Element count of one face buffer.
    pub fn face_len(&self, face: Face) -> usize {
        match face {
            Face::North | Face::South => self.nx * self.nz,
            Face::West | Face::East => self.ny * self.nz,
            Face::Top | Face::Bottom => self.nx * self.ny,
        }
    }

    /// The buffer for `face`.
    pub fn face(&self, face: Face) -> &S {
        match face {
            Face::North => &self.north,
            Face::South => &self.south,
            Face::West => &self.west,
            Face::East => &self.east,
            Face::Top => &self.top,
            Face::Bottom => &self.bottom,
        }
    }

    /// The mutable buffer for `face`.
    pub fn face_mut(&mut self, face: Face) -> &mut S {
        match face {
            Face::North => &mut self.north,
            Face::South => &mut self.south,
            Face::West => &mut self.west,
            Face::East => &mut self.east,
            Face::Top => &mut self.top,
            Face::Bottom => &mut self.bottom,
        }
    }

    /// Whole-set copy from `from`, element for element, across residencies.
    ///
    /// Staged through host memory; backends add same-residency fast paths
    /// where the device supports direct copies. Fails fast if any face size
    /// differs.
    pub fn copy_from<T: FaceStorage>(&mut self, from: &BoundarySet<T>) -> Result<()> {
        if self.extents() != from.extents() {
            return Err(HaloGridError::GeometryMismatch {
                expected: self.extents(),
                actual: from.extents(),
            });
        }
        let mut staging = Vec::new();
        for face in Face::ALL {
            staging.resize(self.face_len(face), 0.0);
            from.face(face).copy_to_host(&mut staging)?;
            self.face_mut(face).copy_from_host(&staging)?;
        }
        Ok(())
    }
}

impl HostBoundarySet {
    /// Allocate a host-resident set sized for `geom`.
    pub fn host(geom: &GridGeometry) -> Result<Self> {
        Self::new(&(), geom)
    }
}
