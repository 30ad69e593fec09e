//! Cross-subdomain halo transport.
//!
//! The solver core never talks to a message layer directly; it hands a
//! host-resident snapshot of the extracted faces to a [`HaloExchange`] and
//! gets back whichever neighbor faces arrived. `NoNeighbors` covers the
//! single-subdomain case, `ChannelExchange` wires subdomains together
//! in-process over paired mpsc channels; an MPI-class transport plugs in
//! behind the same trait.

use std::sync::mpsc::{Receiver, Sender};

use crate::boundary::HostBoundarySet;
use crate::error::{HaloGridError, Result};
use crate::face::{Face, FaceSet};

/// Point-to-point halo transport, keyed by face.
///
/// Called once per iteration with the freshly extracted send set. An
/// implementation must fill `recv` with the matching neighbor's
/// opposite-face buffer for every face that has a neighbor, and report the
/// faces it filled; faces on the physical domain boundary are skipped.
/// Receiving is a blocking synchronization point: the solver does not
/// advance to the next sweep until the returned faces are complete.
pub trait HaloExchange {
    /// Faces that have a neighbor behind this transport.
    fn connected(&self) -> FaceSet;

    /// Ship `send`, fill `recv`, return the faces actually received.
    fn exchange(&mut self, send: &HostBoundarySet, recv: &mut HostBoundarySet)
        -> Result<FaceSet>;
}

/// Every face is a physical domain boundary; nothing is exchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNeighbors;

impl HaloExchange for NoNeighbors {
    fn connected(&self) -> FaceSet {
        FaceSet::EMPTY
    }

    fn exchange(
        &mut self,
        _send: &HostBoundarySet,
        _recv: &mut HostBoundarySet,
    ) -> Result<FaceSet> {
        Ok(FaceSet::EMPTY)
    }
}

struct Link {
    face: Face,
    tx: Sender<Vec<f32>>,
    rx: Receiver<Vec<f32>>,
}

/// In-process transport over paired mpsc channels, one pair per connected
/// face.
///
/// All sends are issued before any receive so two peers exchanging in
/// lockstep cannot deadlock. The sender side is buffered; the receive is
/// the blocking point.
#[derive(Default)]
pub struct ChannelExchange {
    links: Vec<Link>,
}

impl ChannelExchange {
    /// Transport with no links; add them with [`connect`](Self::connect) or
    /// [`link`](Self::link).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a neighbor behind `face`: extracted `face` buffers go out
    /// through `tx`, ghost data for `face` arrives on `rx`.
    pub fn connect(&mut self, face: Face, tx: Sender<Vec<f32>>, rx: Receiver<Vec<f32>>) {
        self.links.push(Link { face, tx, rx });
    }

    /// Wire `a`'s `face` to `b`'s opposite face with a fresh channel pair.
    pub fn link(a: &mut ChannelExchange, face: Face, b: &mut ChannelExchange) {
        let (tx_ab, rx_ab) = std::sync::mpsc::channel();
        let (tx_ba, rx_ba) = std::sync::mpsc::channel();
        a.connect(face, tx_ab, rx_ba);
        b.connect(face.opposite(), tx_ba, rx_ab);
    }
}

impl HaloExchange for ChannelExchange {
    fn connected(&self) -> FaceSet {
        self.links.iter().map(|l| l.face).collect()
    }

    fn exchange(
        &mut self,
        send: &HostBoundarySet,
        recv: &mut HostBoundarySet,
    ) -> Result<FaceSet> {
        for link in &self.links {
            let data = send.face(link.face).as_slice().to_vec();
            link.tx.send(data).map_err(|_| {
                HaloGridError::ExchangeError(format!("peer behind {:?} hung up", link.face))
            })?;
        }
        let mut received = FaceSet::EMPTY;
        for link in &self.links {
            let data = link.rx.recv().map_err(|_| {
                HaloGridError::ExchangeError(format!("peer behind {:?} hung up", link.face))
            })?;
            let buf = recv.face_mut(link.face);
            if data.len() != buf.as_slice().len() {
                return Err(HaloGridError::FaceSizeMismatch {
                    expected: buf.as_slice().len(),
                    actual: data.len(),
                });
            }
            buf.as_mut_slice().copy_from_slice(&data);
            received.insert(link.face);
        }
        Ok(received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridGeometry;

    #[test]
    fn no_neighbors_receives_nothing() {
        let g = GridGeometry::new(2, 2, 2, 1.0, 1.0, 1.0).unwrap();
        let send = HostBoundarySet::host(&g).unwrap();
        let mut recv = HostBoundarySet::host(&g).unwrap();
        let got = NoNeighbors.exchange(&send, &mut recv).unwrap();
        assert!(got.is_empty());
        assert!(NoNeighbors.connected().is_empty());
    }

    #[test]
    fn linked_pair_swaps_opposite_faces() {
        let g = GridGeometry::single_layer(3, 4, 1.0, 1.0).unwrap();
        let mut left = ChannelExchange::new();
        let mut right = ChannelExchange::new();
        ChannelExchange::link(&mut left, Face::East, &mut right);
        assert_eq!(left.connected(), Face::East.into());
        assert_eq!(right.connected(), Face::West.into());

        let mut send_l = HostBoundarySet::host(&g).unwrap();
        send_l.face_mut(Face::East).as_mut_slice().fill(7.0);
        let mut send_r = HostBoundarySet::host(&g).unwrap();
        send_r.face_mut(Face::West).as_mut_slice().fill(9.0);

        let mut recv_l = HostBoundarySet::host(&g).unwrap();
        let mut recv_r = HostBoundarySet::host(&g).unwrap();
        // Both peers send before either blocks on receive, so a single
        // thread can drive the pair.
        let got_l = left.exchange(&send_l, &mut recv_l).unwrap();
        let got_r = right.exchange(&send_r, &mut recv_r).unwrap();

        assert_eq!(got_l, Face::East.into());
        assert_eq!(got_r, Face::West.into());
        assert!(recv_l.face(Face::East).as_slice().iter().all(|&v| v == 9.0));
        assert!(recv_r.face(Face::West).as_slice().iter().all(|&v| v == 7.0));
    }

    #[test]
    fn hung_up_peer_is_an_exchange_error() {
        let g = GridGeometry::single_layer(3, 4, 1.0, 1.0).unwrap();
        let mut left = ChannelExchange::new();
        {
            let mut right = ChannelExchange::new();
            ChannelExchange::link(&mut left, Face::East, &mut right);
        }
        let send = HostBoundarySet::host(&g).unwrap();
        let mut recv = HostBoundarySet::host(&g).unwrap();
        assert!(matches!(
            left.exchange(&send, &mut recv),
            Err(HaloGridError::ExchangeError(_))
        ));
    }
}
