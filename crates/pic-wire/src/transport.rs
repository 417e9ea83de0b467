// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The `MessagePassing` transport seam (spec.md §6).
//!
//! `pic-core`'s exchange protocol is written against this trait rather
//! than any concrete networking stack, so the core stays a pure,
//! single-threaded scan over buffers (spec.md §5) regardless of what
//! actually moves bytes between ranks. A non-blocking `begin_*` call is
//! always paired with a matching `end_*` wait; the core never holds more
//! than one outstanding pair per tag at a time.

/// Non-blocking point-to-point message passing over per-tag buffers.
///
/// Tags are per-face boundary codes (spec.md §4.3): a send on face `f`
/// uses tag `sf2b[f]`, and the matching receive on the peer uses the
/// same tag so sends and receives line up without an explicit rendezvous
/// handshake.
pub trait MessagePassing {
    /// This rank's index in the communicator.
    fn rank(&self) -> i32;
    /// Total number of ranks in the communicator.
    fn nproc(&self) -> i32;

    /// Ensures the send buffer for `tag` can hold at least `bytes`.
    fn size_send_buffer(&mut self, tag: i32, bytes: usize);
    /// Mutable access to the send buffer for `tag`, for packing.
    fn send_buffer(&mut self, tag: i32) -> &mut [u8];
    /// Ensures the receive buffer for `tag` can hold at least `bytes`.
    fn size_recv_buffer(&mut self, tag: i32, bytes: usize);
    /// Read access to the receive buffer for `tag`, after `end_recv`.
    fn recv_buffer(&self, tag: i32) -> &[u8];

    /// Posts a non-blocking send of the first `bytes` of the send buffer
    /// for `tag` to `dest`, using `tag` as the wire tag.
    fn begin_send(&mut self, tag: i32, bytes: usize, dest: i32);
    /// Waits for the outstanding send on `tag` to complete.
    fn end_send(&mut self, tag: i32);
    /// Posts a non-blocking receive of `bytes` into the receive buffer
    /// for `tag`, expecting a message from `src` tagged `send_tag`.
    fn begin_recv(&mut self, tag: i32, bytes: usize, src: i32, send_tag: i32);
    /// Waits for the outstanding receive on `tag` to complete.
    fn end_recv(&mut self, tag: i32);
}
