//! Face identifiers, face sets, and the descriptor driving the face-copy
//! kernels.

use std::ops::{BitOr, BitOrAssign};

use crate::geometry::GridGeometry;

/// One planar boundary of a 3D rectangular subdomain.
///
/// The discriminants are the wire encoding used when keying transport
/// requests, chosen so faces combine into a bit mask (see [`FaceSet`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    /// The `y = ny-1` plane.
    North = 1 << 0,
    /// The `y = 0` plane.
    South = 1 << 1,
    /// The `x = 0` plane.
    West = 1 << 2,
    /// The `x = nx-1` plane.
    East = 1 << 3,
    /// The `z = nz-1` plane.
    Top = 1 << 4,
    /// The `z = 0` plane.
    Bottom = 1 << 5,
}

impl Face {
    /// All six faces, in wire-encoding order.
    pub const ALL: [Face; 6] = [
        Face::North,
        Face::South,
        Face::West,
        Face::East,
        Face::Top,
        Face::Bottom,
    ];

    /// Bit-flag value of this face.
    #[inline]
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// The face a neighboring subdomain sees across this one.
    pub fn opposite(self) -> Face {
        match self {
            Face::North => Face::South,
            Face::South => Face::North,
            Face::West => Face::East,
            Face::East => Face::West,
            Face::Top => Face::Bottom,
            Face::Bottom => Face::Top,
        }
    }
}

impl BitOr for Face {
    type Output = FaceSet;

    fn bitor(self, rhs: Face) -> FaceSet {
        FaceSet(self.bit() | rhs.bit())
    }
}

/// A set of faces, stored as the bit-flag encoding.
///
/// This is a capability set, not a hierarchy: transports and extraction
/// requests are keyed by whichever faces are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceSet(u8);

impl FaceSet {
    /// The empty set.
    pub const EMPTY: FaceSet = FaceSet(0);

    /// All six faces.
    pub fn all() -> FaceSet {
        FaceSet(0b11_1111)
    }

    /// Raw bit mask.
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Reconstruct from a bit mask; unknown bits are dropped.
    pub fn from_bits(bits: u8) -> FaceSet {
        FaceSet(bits & 0b11_1111)
    }

    /// Add a face.
    pub fn insert(&mut self, face: Face) {
        self.0 |= face.bit();
    }

    /// Membership test.
    #[inline]
    pub fn contains(self, face: Face) -> bool {
        self.0 & face.bit() != 0
    }

    /// Whether no face is present.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of faces present.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the contained faces in wire-encoding order.
    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl From<Face> for FaceSet {
    fn from(face: Face) -> FaceSet {
        FaceSet(face.bit())
    }
}

impl BitOr<Face> for FaceSet {
    type Output = FaceSet;

    fn bitor(self, rhs: Face) -> FaceSet {
        FaceSet(self.0 | rhs.bit())
    }
}

impl BitOr for FaceSet {
    type Output = FaceSet;

    fn bitor(self, rhs: FaceSet) -> FaceSet {
        FaceSet(self.0 | rhs.0)
    }
}

impl BitOrAssign<Face> for FaceSet {
    fn bitor_assign(&mut self, rhs: Face) {
        self.insert(rhs);
    }
}

impl FromIterator<Face> for FaceSet {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> FaceSet {
        let mut set = FaceSet::EMPTY;
        for face in iter {
            set.insert(face);
        }
        set
    }
}

/// Which plane of the field a face copy touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacePlane {
    /// The outermost plane: the boundary layer itself. This is where
    /// physical Dirichlet values live and where received neighbor data is
    /// injected.
    #[default]
    Edge,
    /// One plane inward: the outermost *computed* plane, i.e. the data a
    /// neighboring subdomain needs for its ghost layer.
    Halo,
}

/// Strided description of one face plane of a field.
///
/// The destination face buffer is indexed `u + v*nu`; the corresponding
/// source cell is `base + u*su + v*sv`. One copy routine parameterized by
/// this descriptor replaces six hand-maintained per-face kernel bodies
/// while preserving each face's distinct memory-access pattern: Top and
/// Bottom planes come out contiguous (`su == 1`, rows abutting), the other
/// four are strided gathers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceSpec {
    /// Source offset of the `(u, v) = (0, 0)` element.
    pub base: usize,
    /// Source stride per `u` step.
    pub su: usize,
    /// Source stride per `v` step.
    pub sv: usize,
    /// Face extent along `u`.
    pub nu: usize,
    /// Face extent along `v`.
    pub nv: usize,
}

impl FaceSpec {
    /// Descriptor for `face` of a field with geometry `geom`.
    ///
    /// For [`FacePlane::Halo`] the plane sits one cell inward, clamped for
    /// degenerate single-plane axes.
    pub fn new(face: Face, plane: FacePlane, geom: &GridGeometry) -> FaceSpec {
        let GridGeometry { nz, ny, nx, .. } = *geom;
        let plane_xy = nx * ny;
        let inset = match plane {
            FacePlane::Edge => 0,
            FacePlane::Halo => 1,
        };
        match face {
            Face::West => FaceSpec {
                base: inset.min(nx - 1),
                su: nx,
                sv: plane_xy,
                nu: ny,
                nv: nz,
            },
            Face::East => FaceSpec {
                base: (nx - 1) - inset.min(nx - 1),
                su: nx,
                sv: plane_xy,
                nu: ny,
                nv: nz,
            },
            Face::South => FaceSpec {
                base: inset.min(ny - 1) * nx,
                su: 1,
                sv: plane_xy,
                nu: nx,
                nv: nz,
            },
            Face::North => FaceSpec {
                base: ((ny - 1) - inset.min(ny - 1)) * nx,
                su: 1,
                sv: plane_xy,
                nu: nx,
                nv: nz,
            },
            Face::Bottom => FaceSpec {
                base: inset.min(nz - 1) * plane_xy,
                su: 1,
                sv: nx,
                nu: nx,
                nv: ny,
            },
            Face::Top => FaceSpec {
                base: ((nz - 1) - inset.min(nz - 1)) * plane_xy,
                su: 1,
                sv: nx,
                nu: nx,
                nv: ny,
            },
        }
    }

    /// Face buffer element count.
    pub fn len(&self) -> usize {
        self.nu * self.nv
    }

    /// Paired with [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the source plane is one contiguous memory range, in which
    /// case the copy degenerates to a linear memcpy.
    pub fn is_contiguous(&self) -> bool {
        self.su == 1 && (self.nv <= 1 || self.sv == self.nu)
    }
}
