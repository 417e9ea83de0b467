// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Neighbor-table sentinel values (spec.md §3, §6).

/// Sentinel values a neighbor-table entry can carry, in addition to
/// ordinary local/remote cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinel;

impl Sentinel {
    /// Marks a cell as pure absorption: the incident particle is
    /// destroyed and its charge deposited.
    pub const ABSORB: i64 = -1;
    /// Reserved: reflecting boundary. Not dispatched by the mover scan
    /// today (spec.md §6); carried as a distinct value so custom-handler
    /// slot decoding skips it, matching the original's `-nn-3` offset.
    pub const REFLECT: i64 = -2;
}

/// Returns `true` if `nn` encodes a custom-boundary-handler slot (i.e. it
/// is negative and not one of the two reserved sentinels).
#[must_use]
pub fn is_custom_handler(nn: i64) -> bool {
    nn < 0 && nn != Sentinel::ABSORB && nn != Sentinel::REFLECT
}

/// Decodes a custom-handler neighbor code into its registry slot index.
///
/// Per spec.md §3: `nn < 0` and not a reserved sentinel → `-nn-3` is the
/// index into the custom-boundary handler array. Returns `None` if `nn`
/// does not encode a custom-handler slot.
#[must_use]
pub fn custom_handler_slot(nn: i64) -> Option<usize> {
    if !is_custom_handler(nn) {
        return None;
    }
    let slot = -nn - 3;
    usize::try_from(slot).ok()
}
