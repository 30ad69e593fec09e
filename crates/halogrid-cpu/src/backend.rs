//! Host implementation of the backend seam.

use halogrid_core::{
    BoundarySet, FacePlane, FaceSet, FaceSpec, Field, GridGeometry, HostBoundarySet,
    RelaxBackend, Result, StencilMode,
};

use crate::stencil;

/// Backend keeping the iterate, source term, and face buffers in host
/// memory, with rayon-parallel sweeps and face gathers.
pub struct CpuBackend {
    geom: GridGeometry,
    x: Field,
    xnew: Field,
    b: Field,
    send: HostBoundarySet,
    recv: HostBoundarySet,
}

impl CpuBackend {
    /// Zero-initialized backend for `geom`.
    pub fn new(geom: &GridGeometry) -> Result<Self> {
        Ok(Self {
            geom: *geom,
            x: Field::zeros(*geom),
            xnew: Field::zeros(*geom),
            b: Field::zeros(*geom),
            send: BoundarySet::host(geom)?,
            recv: BoundarySet::host(geom)?,
        })
    }

    /// Backend pre-loaded with an initial iterate and source term.
    pub fn from_problem(x: &Field, b: &Field) -> Result<Self> {
        x.geometry().ensure_same_extents(b.geometry())?;
        let mut backend = Self::new(x.geometry())?;
        backend.load(x, b)?;
        Ok(backend)
    }

    /// The current iterate (tests and diagnostics).
    pub fn iterate(&self) -> &Field {
        &self.x
    }

    /// The send-side boundary set (tests and diagnostics).
    pub fn send_set(&self) -> &HostBoundarySet {
        &self.send
    }

    /// The receive-side boundary set, which an in-process exchange may fill
    /// directly.
    pub fn recv_set_mut(&mut self) -> &mut HostBoundarySet {
        &mut self.recv
    }
}

impl RelaxBackend for CpuBackend {
    fn geometry(&self) -> &GridGeometry {
        &self.geom
    }

    fn load(&mut self, x: &Field, b: &Field) -> Result<()> {
        self.geom.ensure_same_extents(x.geometry())?;
        self.geom.ensure_same_extents(b.geometry())?;
        self.x.as_mut_slice().copy_from_slice(x.as_slice());
        self.b.as_mut_slice().copy_from_slice(b.as_slice());
        Ok(())
    }

    fn extract(&mut self, faces: FaceSet, plane: FacePlane) -> Result<()> {
        for face in faces.iter() {
            let spec = FaceSpec::new(face, plane, &self.geom);
            stencil::gather(
                self.x.as_slice(),
                &spec,
                self.send.face_mut(face).as_mut_slice(),
            );
        }
        Ok(())
    }

    fn inject(&mut self, faces: FaceSet) -> Result<()> {
        for face in faces.iter() {
            let spec = FaceSpec::new(face, FacePlane::Edge, &self.geom);
            stencil::scatter(
                self.x.as_mut_slice(),
                &spec,
                self.recv.face(face).as_slice(),
            );
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
        let delta = match mode {
            StencilMode::TwoDim => stencil::step_2d(
                &self.geom,
                self.x.as_slice(),
                self.xnew.as_mut_slice(),
                self.b.as_slice(),
            ),
            StencilMode::ThreeDim => stencil::step_3d(
                &self.geom,
                self.x.as_slice(),
                self.xnew.as_mut_slice(),
                self.b.as_slice(),
            ),
        };
        Ok(delta)
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.x, &mut self.xnew);
    }

    fn solution(&self, out: &mut Field) -> Result<()> {
        self.geom.ensure_same_extents(out.geometry())?;
        out.as_mut_slice().copy_from_slice(self.x.as_slice());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halogrid_core::Face;

    fn layered_field(geom: &GridGeometry) -> Field {
        let mut f = Field::zeros(*geom);
        f.fill_with(|_, _, z| z as f32);
        f
    }

    #[test]
    fn extracts_first_and_last_layers() {
        let geom = GridGeometry::new(4, 3, 5, 1.0, 1.0, 1.0).unwrap();
        let mut backend = CpuBackend::new(&geom).unwrap();
        backend
            .load(&layered_field(&geom), &Field::zeros(geom))
            .unwrap();
        backend
            .extract(Face::Bottom | Face::Top, FacePlane::Edge)
            .unwrap();
        assert!(backend
            .send_set()
            .face(Face::Bottom)
            .as_slice()
            .iter()
            .all(|&v| v == 0.0));
        assert!(backend
            .send_set()
            .face(Face::Top)
            .as_slice()
            .iter()
            .all(|&v| v == 3.0));
    }

    #[test]
    fn west_east_extraction_encodes_coordinates() {
        let geom = GridGeometry::new(3, 4, 5, 1.0, 1.0, 1.0).unwrap();
        let mut backend = CpuBackend::new(&geom).unwrap();
        let mut f = Field::zeros(geom);
        // Value encodes (x, y, z) uniquely.
        f.fill_with(|x, y, z| (x * 100 + y * 10 + z) as f32);
        backend.load(&f, &Field::zeros(geom)).unwrap();
        backend
            .extract(Face::West | Face::East, FacePlane::Edge)
            .unwrap();
        let west = backend.send_set().face(Face::West).as_slice();
        let east = backend.send_set().face(Face::East).as_slice();
        for z in 0..geom.nz {
            for y in 0..geom.ny {
                let i = y + z * geom.ny;
                assert_eq!(west[i], (y * 10 + z) as f32);
                assert_eq!(east[i], (400 + y * 10 + z) as f32);
            }
        }
    }

    #[test]
    fn north_south_extraction_gathers_constant_y_planes() {
        let geom = GridGeometry::new(3, 4, 5, 1.0, 1.0, 1.0).unwrap();
        let mut backend = CpuBackend::new(&geom).unwrap();
        let mut f = Field::zeros(geom);
        f.fill_with(|x, y, z| (x * 100 + y * 10 + z) as f32);
        backend.load(&f, &Field::zeros(geom)).unwrap();
        backend
            .extract(Face::North | Face::South, FacePlane::Edge)
            .unwrap();
        let south = backend.send_set().face(Face::South).as_slice();
        let north = backend.send_set().face(Face::North).as_slice();
        for z in 0..geom.nz {
            for x in 0..geom.nx {
                let i = x + z * geom.nx;
                assert_eq!(south[i], (x * 100 + z) as f32);
                assert_eq!(north[i], (x * 100 + 30 + z) as f32);
            }
        }
    }

    #[test]
    fn extraction_is_idempotent_and_read_only() {
        let geom = GridGeometry::new(3, 4, 5, 1.0, 1.0, 1.0).unwrap();
        let mut backend = CpuBackend::new(&geom).unwrap();
        let f = layered_field(&geom);
        backend.load(&f, &Field::zeros(geom)).unwrap();
        backend.extract(FaceSet::all(), FacePlane::Edge).unwrap();
        let first: Vec<Vec<f32>> = Face::ALL
            .iter()
            .map(|&face| backend.send_set().face(face).as_slice().to_vec())
            .collect();
        backend.extract(FaceSet::all(), FacePlane::Edge).unwrap();
        for (i, &face) in Face::ALL.iter().enumerate() {
            assert_eq!(backend.send_set().face(face).as_slice(), &first[i][..]);
        }
        assert_eq!(backend.iterate().as_slice(), f.as_slice());
    }

    #[test]
    fn unrequested_faces_stay_untouched() {
        let geom = GridGeometry::new(3, 4, 5, 1.0, 1.0, 1.0).unwrap();
        let mut backend = CpuBackend::new(&geom).unwrap();
        backend
            .load(&Field::filled(geom, 2.0), &Field::zeros(geom))
            .unwrap();
        backend.extract(Face::West.into(), FacePlane::Edge).unwrap();
        assert!(backend
            .send_set()
            .face(Face::West)
            .as_slice()
            .iter()
            .all(|&v| v == 2.0));
        assert!(backend
            .send_set()
            .face(Face::East)
            .as_slice()
            .iter()
            .all(|&v| v == 0.0));
    }

    #[test]
    fn injection_writes_edge_planes() {
        let geom = GridGeometry::single_layer(4, 4, 1.0, 1.0).unwrap();
        let mut backend = CpuBackend::new(&geom).unwrap();
        backend
            .recv_set_mut()
            .face_mut(Face::East)
            .as_mut_slice()
            .fill(5.0);
        backend.inject(Face::East.into()).unwrap();
        for y in 0..geom.ny {
            assert_eq!(backend.iterate().at(geom.nx - 1, y, 0), 5.0);
        }
        // Cells off the East edge are untouched.
        assert_eq!(backend.iterate().at(0, 0, 0), 0.0);
    }

    #[test]
    fn load_rejects_foreign_geometry() {
        let geom = GridGeometry::new(2, 3, 4, 1.0, 1.0, 1.0).unwrap();
        let other = GridGeometry::new(2, 3, 5, 1.0, 1.0, 1.0).unwrap();
        let mut backend = CpuBackend::new(&geom).unwrap();
        assert!(backend
            .load(&Field::zeros(other), &Field::zeros(geom))
            .is_err());
    }
}
