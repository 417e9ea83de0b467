// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The `Injector` wire record (spec.md §3, §6).
//!
//! A self-contained migration record: full particle fields + residual
//! displacement + species tag. `#[repr(C)]` with an explicit reserved
//! padding field so the byte layout is part of the type definition, not
//! an accident of the compiler's alignment choice (spec.md §9: "Manual
//! pointer arithmetic → typed indices" / "Reinterpret-cast of injector
//! into particle+mover").

use bytemuck::{Pod, Zeroable};

/// Size in bytes of one [`Injector`] record. Part of the wire format —
/// changing it is a breaking change to the per-face message layout.
pub const INJECTOR_LEN: usize = 56;

/// Fixed-size, byte-exact migration record exchanged between ranks.
///
/// Field order is load-bearing: it is the wire order documented in
/// spec.md §6. Little-endian on every platform this crate targets (all
/// current supported targets are little-endian; a true byte-exact
/// cross-architecture format would additionally need explicit
/// byte-swapping accessors, which this crate does not provide since
/// spec.md §6 assumes a homogeneous-architecture deployment).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Injector {
    /// Residual logical x-displacement, reflected across the crossed axis.
    pub dx: f32,
    /// Residual logical y-displacement.
    pub dy: f32,
    /// Residual logical z-displacement.
    pub dz: f32,
    /// Reserved padding aligning `i` to an 8-byte boundary. Must be zero.
    pub reserved0: [u8; 4],
    /// Destination local cell index (`nn - range[peer]`), already
    /// translated into the receiver's local index space before send.
    pub i: i64,
    /// x-momentum.
    pub ux: f32,
    /// y-momentum.
    pub uy: f32,
    /// z-momentum.
    pub uz: f32,
    /// Charge.
    pub q: f32,
    /// Residual mover x-displacement (distinct from `dx`: this is the
    /// *remaining* motion to replay via `CellAdvance`, not the particle's
    /// logical coordinate).
    pub dispx: f32,
    /// Residual mover y-displacement.
    pub dispy: f32,
    /// Residual mover z-displacement.
    pub dispz: f32,
    /// Species tag. Invariant: `0 <= sp_id < 64` (spec.md §3).
    pub sp_id: u32,
}

const _: () = assert!(core::mem::size_of::<Injector>() == INJECTOR_LEN);

impl Injector {
    /// Maximum valid species tag, exclusive (spec.md §3: `0 <= sp_id < 64`).
    pub const MAX_SPECIES: u32 = 64;

    /// Builds an injector record field-by-field.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        dx: f32,
        dy: f32,
        dz: f32,
        i: i64,
        ux: f32,
        uy: f32,
        uz: f32,
        q: f32,
        dispx: f32,
        dispy: f32,
        dispz: f32,
        sp_id: u32,
    ) -> Self {
        Self {
            dx,
            dy,
            dz,
            reserved0: [0; 4],
            i,
            ux,
            uy,
            uz,
            q,
            dispx,
            dispy,
            dispz,
            sp_id,
        }
    }

    /// Returns `true` if `sp_id` falls within the valid species range.
    #[must_use]
    pub fn has_valid_species(&self) -> bool {
        self.sp_id < Self::MAX_SPECIES
    }

    /// Encodes this record as its wire bytes (little-endian, no copy of
    /// padding semantics beyond what `Pod` already guarantees is zeroed
    /// by the constructor).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; INJECTOR_LEN] {
        bytemuck::cast(*self)
    }

    /// Decodes a record from exactly [`INJECTOR_LEN`] bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; INJECTOR_LEN]) -> Self {
        bytemuck::cast(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injector_is_pod_and_stable_size() {
        fn assert_pod<T: Pod>() {}
        assert_pod::<Injector>();
        assert_eq!(core::mem::size_of::<Injector>(), 56);
    }

    #[test]
    fn byte_round_trip_preserves_fields() {
        let inj = Injector::new(-1.0, 0.25, 0.0, 42, 0.1, 0.2, 0.3, 1.0, 0.4, 0.5, 0.6, 7);
        let bytes = inj.to_bytes();
        let back = Injector::from_bytes(bytes);
        assert_eq!(inj, back);
    }

    #[test]
    fn species_validity() {
        let mut inj = Injector::new(0.0, 0.0, 0.0, 0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 63);
        assert!(inj.has_valid_species());
        inj.sp_id = 64;
        assert!(!inj.has_valid_species());
    }
}
