// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Request/response schema and transport seam for the paired P2P I/O
//! server (spec.md §4.5, §6).

use bytemuck::{Pod, Zeroable};

/// Discriminates the kind of request sent to the I/O server.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum P2pTag {
    /// Open a file for reading.
    OpenRead = 0,
    /// Open a file for writing (truncating).
    OpenWrite = 1,
    /// Open a file for append-writing.
    OpenWriteAppend = 2,
    /// Read a block.
    Read = 3,
    /// Write a block.
    Write = 4,
    /// Close the file.
    Close = 5,
}

impl P2pTag {
    /// Decodes a raw byte into a `P2pTag`, if it is one of the known values.
    #[must_use]
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::OpenRead),
            1 => Some(Self::OpenWrite),
            2 => Some(Self::OpenWriteAppend),
            3 => Some(Self::Read),
            4 => Some(Self::Write),
            5 => Some(Self::Close),
            _ => None,
        }
    }
}

/// Fixed-size request header: `{tag, subtag, count, id}` (spec.md §6),
/// optionally followed by a `count`-byte payload (e.g. a filename for
/// the open requests).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct P2pRequest {
    /// Request kind, as a raw `P2pTag` discriminant.
    pub tag: u8,
    /// Secondary discriminant (reserved for future sub-requests; `0` today).
    pub subtag: u8,
    /// Reserved padding, aligning `count` to a 4-byte boundary. Must be zero.
    pub reserved: [u8; 2],
    /// Byte count of the optional payload that follows this header.
    pub count: u32,
    /// Caller-assigned request id, echoed back by the peer's response.
    pub id: u32,
}

const _: () = assert!(core::mem::size_of::<P2pRequest>() == 12);

impl P2pRequest {
    /// Builds a request header.
    #[must_use]
    pub fn new(tag: P2pTag, subtag: u8, count: u32, id: u32) -> Self {
        Self {
            tag: tag as u8,
            subtag,
            reserved: [0; 2],
            count,
            id,
        }
    }
}

/// Opaque handle to an outstanding non-blocking P2P transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct P2pRequestId(pub u64);

/// Transport seam for the paired request/response I/O server
/// (spec.md §4.5, §6). `pic_core::p2p_io` drives this trait through the
/// double-buffered block-stream state machine; it never calls more than
/// one outstanding transfer per buffer slot.
pub trait P2pTransport {
    /// Posts a request header (and, for open requests, the caller sends
    /// the payload separately via [`P2pTransport::send`]).
    fn post(&mut self, request: P2pRequest);
    /// Blocking send of a payload matching the most recent `post`.
    fn send(&mut self, bytes: &[u8]);
    /// Blocking receive of exactly `buf.len()` bytes.
    fn recv(&mut self, buf: &mut [u8]);
    /// Posts a non-blocking send; returns a handle to await later.
    fn begin_send(&mut self, bytes: &[u8]) -> P2pRequestId;
    /// Waits for the send identified by `id` to complete.
    fn end_send(&mut self, id: P2pRequestId);
    /// Posts a non-blocking receive of `len` bytes; returns a handle.
    fn begin_recv(&mut self, len: usize) -> P2pRequestId;
    /// Waits for the receive identified by `id`, returning its bytes.
    fn end_recv(&mut self, id: P2pRequestId) -> Vec<u8>;
}
