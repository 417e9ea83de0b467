// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fatal error kinds (spec.md §7). Soft errors (unclassified mover
//! interactions) do not get a variant here — they are logged via
//! `tracing::warn!` in [`crate::mover_scan`] and handled by falling
//! through to absorption, per spec.md §7's "Unclassified interaction"
//! kind.

use pic_wire::FramingError;

/// Configuration errors: invariant violations detectable when a
/// [`crate::GridView`] is built, before any step runs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A face is both `SHARED_REMOTELY` and carries a custom boundary
    /// handler (spec.md §1 Non-goal (i), §7).
    #[error("face {face} is both shared-remotely (rank {rank}) and has a custom handler (slot {slot})")]
    SharedFaceWithCustomHandler {
        /// Face index (0..6).
        face: usize,
        /// Peer rank the face's boundary code resolves to.
        rank: i32,
        /// Custom-handler slot the same boundary code also resolves to.
        slot: usize,
    },
    /// A boundary code is outside `[-nb-3, nproc)`, i.e. neither a valid
    /// rank nor a valid custom-handler slot.
    #[error("boundary code {code} for face {face} is out of range (nproc={nproc}, handlers={handlers})")]
    BoundaryCodeOutOfRange {
        /// Face index (0..6).
        face: usize,
        /// The offending boundary code.
        code: i64,
        /// Number of ranks in the communicator.
        nproc: i32,
        /// Number of registered custom-boundary handlers.
        handlers: usize,
    },
    /// A species id is outside `[0, 64)` (spec.md §3, §7).
    #[error("species id {species_id} is out of range [0, 64)")]
    SpeciesIdOutOfRange {
        /// The offending species id.
        species_id: u32,
    },
}

/// Protocol errors: invariant violations detected while unpacking
/// exchange messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// An injector arrived carrying an `sp_id` with no corresponding
    /// registered species (spec.md §4.4, §7).
    #[error("injector arrived with unknown species id {species_id}")]
    UnknownSpeciesId {
        /// The offending species id.
        species_id: u32,
    },
    /// A face message's declared count did not match its payload size.
    #[error("face message framing error: {0}")]
    Framing(#[from] FramingError),
}

/// Errors surfaced by the P2P bulk I/O policy.
#[derive(Debug, thiserror::Error)]
pub enum P2pError {
    /// The remote I/O server rejected the open request (spec.md §7:
    /// "open failure returns a failure status").
    #[error("open failed for {mode:?} on the I/O server")]
    OpenFailed {
        /// The mode that was requested when the open failed.
        mode: &'static str,
    },
}
