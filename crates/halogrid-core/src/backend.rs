//! The seam between the iteration driver and a compute backend.

use crate::boundary::HostBoundarySet;
use crate::error::Result;
use crate::face::{FacePlane, FaceSet};
use crate::field::Field;
use crate::geometry::GridGeometry;

/// Stencil dimensionality.
///
/// The boundary machinery is fully 3D either way; this selects whether the
/// relaxation couples z-neighbors. It is an explicit configuration choice,
/// never inferred from the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StencilMode {
    /// Five-point stencil applied to every z-slice independently; Top and
    /// Bottom faces participate in halo exchange but not in the update.
    TwoDim,
    /// Seven-point stencil with a `dz`-weighted z-neighbor term.
    #[default]
    ThreeDim,
}

/// A compute backend owning the iterate, source-term, and face buffers of
/// one subdomain.
///
/// All buffers are bound to a single [`GridGeometry`]; implementations are
/// free to keep them in host or device memory. Within one iteration the
/// driver calls, in order: [`extract`](Self::extract) →
/// [`download_send`](Self::download_send) → (transport) →
/// [`upload_recv`](Self::upload_recv) → [`inject`](Self::inject) →
/// [`step`](Self::step) → [`swap`](Self::swap). Implementations must order
/// the face copies before the transport reads the downloaded buffers; the
/// residual returned by `step` is a blocking device-to-host readback.
pub trait RelaxBackend {
    /// The geometry every buffer of this backend is bound to.
    fn geometry(&self) -> &GridGeometry;

    /// Upload the initial iterate and source term.
    fn load(&mut self, x: &Field, b: &Field) -> Result<()>;

    /// Populate the send set's buffers for `faces` from the selected plane
    /// of the current iterate. Faces not requested are left untouched; the
    /// iterate is never mutated.
    fn extract(&mut self, faces: FaceSet, plane: FacePlane) -> Result<()>;

    /// Write the receive set's buffers for `faces` into the edge planes of
    /// the current iterate.
    fn inject(&mut self, faces: FaceSet) -> Result<()>;

    /// Snapshot the send set into a host-resident set for the transport.
    fn download_send(&self, dst: &mut HostBoundarySet) -> Result<()>;

    /// Upload transport-received host data into the receive set.
    fn upload_recv(&mut self, src: &HostBoundarySet) -> Result<()>;

    /// One Jacobi sweep producing the next iterate from the current one,
    /// returning the maximum absolute cell change.
    fn step(&mut self, mode: StencilMode) -> Result<f32>;

    /// Make the freshly computed iterate current.
    fn swap(&mut self);

    /// Download the current iterate into `out`.
    fn solution(&self, out: &mut Field) -> Result<()>;
}
