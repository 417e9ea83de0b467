// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Two-phase (size-then-payload) six-neighbor exchange protocol
//! (spec.md §4.3).
//!
//! A send on face `f` always carries wire tag `f` (spec.md §4.3: `sf2b`
//! is the identity). The matching receive is filed into this rank's own
//! face-`f` buffer but must be posted with `send_tag =
//! GridView::paired_face(f)`, since the peer across that face sent it
//! tagged with *their* local face index — the opposite face on the same
//! axis.

use pic_wire::{FaceBuffer, Injector};
use pic_wire::transport::MessagePassing;

use crate::error::ProtocolError;
use crate::grid::GridView;
use crate::marshal::Marshaller;

/// Per-face send/receive record counts from one [`exchange_step`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExchangeCounts {
    /// Records sent on each face (`0` for faces that are not shared
    /// remotely).
    pub sent: [u32; 6],
    /// Records received on each face.
    pub received: [u32; 6],
}

/// Runs one full size-then-payload exchange across every face that is
/// `SHARED_REMOTELY` in `grid`, using `send_lists[face]` as the outgoing
/// injectors for that face.
///
/// Returns the decoded injectors received on each face alongside
/// [`ExchangeCounts`]. Faces that are not shared remotely are left
/// empty.
///
/// # Errors
/// Returns [`ProtocolError::Framing`] if a received face message's
/// declared count does not match its payload length.
pub fn exchange_step<T: MessagePassing>(
    transport: &mut T,
    grid: &GridView<'_>,
    marshaller: &mut Marshaller,
    send_lists: &[Vec<Injector>; 6],
) -> Result<([Vec<Injector>; 6], ExchangeCounts), ProtocolError> {
    let mut counts = ExchangeCounts::default();

    for face in 0..6 {
        if !grid.is_shared_remotely(face) {
            continue;
        }
        marshaller.pack_send(face, &send_lists[face]);
        counts.sent[face] = marshaller.send_count(face)?;
    }

    // Phase 1: exchange record counts.
    for face in 0..6 {
        if !grid.is_shared_remotely(face) {
            continue;
        }
        let Some(peer) = grid.peer_rank(face) else {
            continue;
        };
        let recv_tag = GridView::paired_face(face) as i32;

        transport.size_send_buffer(face as i32, 4);
        transport.send_buffer(face as i32)[0..4]
            .copy_from_slice(&FaceBuffer::encode_count(counts.sent[face]));
        transport.begin_send(face as i32, 4, peer);

        transport.size_recv_buffer(face as i32, 4);
        transport.begin_recv(face as i32, 4, peer, recv_tag);
    }
    for face in 0..6 {
        if !grid.is_shared_remotely(face) {
            continue;
        }
        transport.end_send(face as i32);
        transport.end_recv(face as i32);
        counts.received[face] = FaceBuffer::decode_count(transport.recv_buffer(face as i32))?;
        marshaller.ensure_recv_capacity(face, counts.received[face] as usize);
    }

    // Phase 2: exchange the framed payload.
    for face in 0..6 {
        if !grid.is_shared_remotely(face) {
            continue;
        }
        let Some(peer) = grid.peer_rank(face) else {
            continue;
        };
        let recv_tag = GridView::paired_face(face) as i32;
        let send_bytes = marshaller.send_bytes(face).to_vec();
        let recv_len = pic_wire::HEADER_LEN + counts.received[face] as usize * pic_wire::INJECTOR_LEN;

        transport.size_send_buffer(face as i32, send_bytes.len());
        transport.send_buffer(face as i32)[..send_bytes.len()].copy_from_slice(&send_bytes);
        transport.begin_send(face as i32, send_bytes.len(), peer);

        transport.size_recv_buffer(face as i32, recv_len);
        transport.begin_recv(face as i32, recv_len, peer, recv_tag);
    }

    let mut received: [Vec<Injector>; 6] = Default::default();
    for (face, slot) in received.iter_mut().enumerate() {
        if !grid.is_shared_remotely(face) {
            continue;
        }
        transport.end_send(face as i32);
        transport.end_recv(face as i32);
        let bytes = transport.recv_buffer(face as i32).to_vec();
        marshaller.recv_bytes_mut(face).clear();
        marshaller.recv_bytes_mut(face).extend_from_slice(&bytes);
        *slot = marshaller.unpack_recv(face)?;
    }

    Ok((received, counts))
}
