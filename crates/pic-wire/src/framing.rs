// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-face message framing (spec.md §4.3, §6).
//!
//! Wire format per face message: `[u32 count][12 bytes reserved][count ×
//! Injector]`. The size-phase message is a bare 4-byte little-endian
//! count with no header.

use crate::injector::{Injector, INJECTOR_LEN};

/// Length in bytes of the payload-message header (`count` + reserved).
pub const HEADER_LEN: usize = 16;

/// Errors produced while decoding a face message.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FramingError {
    /// Buffer is shorter than [`HEADER_LEN`].
    #[error("face buffer too short for header: {len} bytes, need at least {HEADER_LEN}")]
    HeaderTooShort {
        /// Actual buffer length.
        len: usize,
    },
    /// The declared count does not match the remaining payload length.
    #[error("face buffer payload size mismatch: header declares {declared} records ({expected_bytes} bytes), buffer holds {actual_bytes} bytes of payload")]
    PayloadSizeMismatch {
        /// Count declared in the header.
        declared: u32,
        /// Bytes the declared count implies.
        expected_bytes: usize,
        /// Bytes actually present after the header.
        actual_bytes: usize,
    },
    /// A 4-byte size-phase message was the wrong length.
    #[error("size message must be exactly 4 bytes, got {len}")]
    BadSizeMessageLen {
        /// Actual length received.
        len: usize,
    },
}

/// An owned, reusable per-face wire buffer.
///
/// One `FaceBuffer` is associated with one send or receive direction for
/// one of the six faces. The marshaller resizes it on demand; this type
/// does not know anything about *which* face it belongs to or whether it
/// is a send or receive buffer — that bookkeeping lives in
/// `pic_core::marshal`.
#[derive(Debug, Clone, Default)]
pub struct FaceBuffer {
    bytes: Vec<u8>,
}

impl FaceBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Encodes a bare 4-byte little-endian count (size-phase message).
    #[must_use]
    pub fn encode_count(count: u32) -> [u8; 4] {
        count.to_le_bytes()
    }

    /// Decodes a bare 4-byte little-endian count (size-phase message).
    pub fn decode_count(bytes: &[u8]) -> Result<u32, FramingError> {
        let arr: [u8; 4] = bytes
            .try_into()
            .map_err(|_| FramingError::BadSizeMessageLen { len: bytes.len() })?;
        Ok(u32::from_le_bytes(arr))
    }

    /// Resizes the buffer to exactly fit `header + capacity` injectors,
    /// never shrinking below what it already holds (spec.md §4.2:
    /// "reallocating if short; never shrinking").
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let needed = HEADER_LEN + capacity * INJECTOR_LEN;
        if self.bytes.len() < needed {
            self.bytes.resize(needed, 0);
        }
    }

    /// Packs the header + injector payload into this buffer, truncating
    /// (not shrinking capacity) to the exact size required.
    pub fn pack(&mut self, injectors: &[Injector]) {
        let needed = HEADER_LEN + injectors.len() * INJECTOR_LEN;
        if self.bytes.len() < needed {
            self.bytes.resize(needed, 0);
        }
        self.bytes[0..4].copy_from_slice(&(injectors.len() as u32).to_le_bytes());
        self.bytes[4..HEADER_LEN].fill(0);
        for (slot, inj) in self.bytes[HEADER_LEN..needed]
            .chunks_exact_mut(INJECTOR_LEN)
            .zip(injectors)
        {
            slot.copy_from_slice(&inj.to_bytes());
        }
        self.bytes.truncate(needed);
    }

    /// Reads the header count without touching the payload.
    pub fn peek_count(&self) -> Result<u32, FramingError> {
        if self.bytes.len() < HEADER_LEN {
            return Err(FramingError::HeaderTooShort {
                len: self.bytes.len(),
            });
        }
        Ok(u32::from_le_bytes([
            self.bytes[0],
            self.bytes[1],
            self.bytes[2],
            self.bytes[3],
        ]))
    }

    /// Decodes the full header + payload into a vector of injectors.
    pub fn unpack(&self) -> Result<Vec<Injector>, FramingError> {
        let declared = self.peek_count()?;
        let expected_bytes = declared as usize * INJECTOR_LEN;
        let actual_bytes = self.bytes.len() - HEADER_LEN;
        if actual_bytes < expected_bytes {
            return Err(FramingError::PayloadSizeMismatch {
                declared,
                expected_bytes,
                actual_bytes,
            });
        }
        let payload = &self.bytes[HEADER_LEN..HEADER_LEN + expected_bytes];
        Ok(payload
            .chunks_exact(INJECTOR_LEN)
            .map(|chunk| {
                let arr: [u8; INJECTOR_LEN] = chunk
                    .try_into()
                    .unwrap_or_else(|_| [0u8; INJECTOR_LEN]);
                Injector::from_bytes(arr)
            })
            .collect())
    }

    /// Raw bytes of the buffer, for handing to a transport's send call.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable raw bytes, for a transport to fill in on receive.
    pub fn as_bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }
}
