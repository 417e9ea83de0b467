// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-face buffer ownership and the persistent overflow list (spec.md
//! §4.3, §5, §9).

use pic_wire::{FaceBuffer, FramingError, Injector};

use crate::error::ProtocolError;

/// Owns the six per-face send/receive wire buffers and the persistent
/// local overflow buffer (`cmlist`) that custom boundary handlers append
/// reinjected particles into.
///
/// The overflow buffer is attached to this subsystem's lifetime (spec.md
/// §9: an owned buffer, not global state) and grows monotonically across
/// steps — `pic_core::species::grow_capacity`'s geometric policy governs
/// its capacity the same way it governs a [`crate::Species`]'s mover
/// array.
#[derive(Debug, Default)]
pub struct Marshaller {
    send: [FaceBuffer; 6],
    recv: [FaceBuffer; 6],
    cmlist: Vec<Injector>,
}

impl Marshaller {
    /// Creates a marshaller with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs `injectors` into the send buffer for `face`.
    pub fn pack_send(&mut self, face: usize, injectors: &[Injector]) {
        self.send[face].pack(injectors);
    }

    /// Raw bytes of the send buffer for `face`, ready for
    /// `MessagePassing::begin_send`.
    #[must_use]
    pub fn send_bytes(&self, face: usize) -> &[u8] {
        self.send[face].as_bytes()
    }

    /// Declared record count of the send buffer for `face`.
    pub fn send_count(&self, face: usize) -> Result<u32, FramingError> {
        self.send[face].peek_count()
    }

    /// Ensures the receive buffer for `face` can hold `count` injectors.
    pub fn ensure_recv_capacity(&mut self, face: usize, count: usize) {
        self.recv[face].ensure_capacity(count);
    }

    /// Mutable raw bytes of the receive buffer for `face`, for a
    /// transport to fill in.
    pub fn recv_bytes_mut(&mut self, face: usize) -> &mut Vec<u8> {
        self.recv[face].as_bytes_mut()
    }

    /// Unpacks the injectors received on `face`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Framing`] if the buffer's declared count
    /// does not match its payload length.
    pub fn unpack_recv(&self, face: usize) -> Result<Vec<Injector>, ProtocolError> {
        self.recv[face].unpack().map_err(ProtocolError::Framing)
    }

    /// Appends an injector to the persistent local overflow buffer.
    pub fn push_overflow(&mut self, injector: Injector) {
        self.cmlist.push(injector);
    }

    /// Mutable access to the persistent local overflow buffer, for a
    /// [`crate::CmCursor`] to wrap.
    pub fn overflow_mut(&mut self) -> &mut Vec<Injector> {
        &mut self.cmlist
    }

    /// Number of injectors currently queued in the overflow buffer.
    #[must_use]
    pub fn overflow_len(&self) -> usize {
        self.cmlist.len()
    }

    /// Drains and returns the overflow buffer, ready for reinjection
    /// (spec.md §4.4: the local overflow source feeds into the same
    /// reinjection pass as the six remote faces).
    pub fn drain_overflow(&mut self) -> Vec<Injector> {
        std::mem::take(&mut self.cmlist)
    }
}
