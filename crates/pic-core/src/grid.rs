// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only grid/topology view (spec.md §2, §3, §6).
//!
//! [`GridView`] is a borrowed, read-only window over the caller-owned
//! neighbor table, global range table, and per-face boundary-code /
//! custom-handler maps. It is built once per step by [`GridViewBuilder`],
//! which performs the *Configuration error* checks from spec.md §7
//! eagerly so the mover scan and exchange protocol never have to handle
//! an invalid topology mid-step.

use crate::error::ConfigError;
use pic_wire::Sentinel;

/// Classification of a neighbor-table entry for one mover's crossed face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborClass {
    /// `nn == ABSORB_SENTINEL`: destroy the particle, deposit its charge.
    Absorb,
    /// `nn` is a local cell index (spec.md §3: "shouldn't appear in a
    /// boundary interaction; treated as internal"). Per spec.md §9 Open
    /// Questions, callers must guarantee this does not arise; we still
    /// classify it so the mover scan can fall through to the documented
    /// soft-error path instead of panicking.
    Internal,
    /// `nn` addresses a cell owned by a remote rank. `local_index` is
    /// already translated into the destination's local index space.
    Remote {
        /// Destination rank.
        peer: i32,
        /// Local cell index on the destination rank.
        local_index: i64,
    },
    /// `nn` encodes a custom-boundary-handler slot.
    CustomHandler {
        /// Index into the handler registry.
        slot: usize,
    },
    /// Neither a recognized sentinel, a local/remote index, nor a valid
    /// handler slot. Spec.md §7's "Unclassified interaction" soft error.
    Unclassified,
}

/// Read-only view over the simulation grid's topology.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    nx: i64,
    ny: i64,
    nz: i64,
    rdx: f32,
    rdy: f32,
    rdz: f32,
    neighbor: &'a [i64],
    rangel: i64,
    rangeh: i64,
    range: &'a [i64],
    bc: [i64; 6],
    custom_handler_faces: [bool; 6],
    num_handlers: usize,
    rank: i32,
    nproc: i32,
}

impl<'a> GridView<'a> {
    /// Cell count on the x axis (interior, excluding ghost padding).
    #[must_use]
    pub fn nx(&self) -> i64 {
        self.nx
    }
    /// Cell count on the y axis.
    #[must_use]
    pub fn ny(&self) -> i64 {
        self.ny
    }
    /// Cell count on the z axis.
    #[must_use]
    pub fn nz(&self) -> i64 {
        self.nz
    }
    /// Inverse cell width on x.
    #[must_use]
    pub fn rdx(&self) -> f32 {
        self.rdx
    }
    /// Inverse cell width on y.
    #[must_use]
    pub fn rdy(&self) -> f32 {
        self.rdy
    }
    /// Inverse cell width on z.
    #[must_use]
    pub fn rdz(&self) -> f32 {
        self.rdz
    }
    /// Lower bound (inclusive) of this rank's owned cell-index range.
    #[must_use]
    pub fn rangel(&self) -> i64 {
        self.rangel
    }
    /// Upper bound (inclusive) of this rank's owned cell-index range.
    #[must_use]
    pub fn rangeh(&self) -> i64 {
        self.rangeh
    }
    /// This rank's index in the communicator.
    #[must_use]
    pub fn rank(&self) -> i32 {
        self.rank
    }
    /// Total number of ranks in the communicator.
    #[must_use]
    pub fn nproc(&self) -> i32 {
        self.nproc
    }
    /// Number of registered custom-boundary handlers.
    #[must_use]
    pub fn num_handlers(&self) -> usize {
        self.num_handlers
    }

    /// The paired inward face for `face` on the same axis: `(face+3)%6`
    /// (spec.md §4.3: `sf2b` is the identity, `rf2b` is this mapping).
    #[must_use]
    pub fn paired_face(face: usize) -> usize {
        (face + 3) % 6
    }

    /// Returns `true` if `face`'s boundary code designates a rank other
    /// than this one in `[0, nproc)` (spec.md §3 "Send-side face maps").
    #[must_use]
    pub fn is_shared_remotely(&self, face: usize) -> bool {
        let code = self.bc[face];
        (0..i64::from(self.nproc)).contains(&code) && code != i64::from(self.rank)
    }

    /// The peer rank for `face`, if it is shared remotely.
    #[must_use]
    pub fn peer_rank(&self, face: usize) -> Option<i32> {
        if self.is_shared_remotely(face) {
            // Bounds were checked against `nproc` (an i32) above.
            i32::try_from(self.bc[face]).ok()
        } else {
            None
        }
    }

    /// The global range-table base for `peer`.
    #[must_use]
    pub fn range_base(&self, peer: i32) -> i64 {
        self.range[peer as usize]
    }

    /// Raw neighbor-table entry for `cell`'s `face`.
    #[must_use]
    pub fn neighbor_code(&self, cell: i64, face: usize) -> i64 {
        self.neighbor[(6 * cell) as usize + face]
    }

    /// Classifies a raw neighbor-table code (spec.md §3).
    #[must_use]
    pub fn classify(&self, nn: i64) -> NeighborClass {
        if nn == Sentinel::ABSORB {
            return NeighborClass::Absorb;
        }
        if (self.rangel..=self.rangeh).contains(&nn) {
            return NeighborClass::Internal;
        }
        let rangem = self.range[self.nproc as usize];
        if (0..self.rangel).contains(&nn) || (self.rangeh + 1..=rangem).contains(&nn) {
            if let Some(peer) = self.owning_rank(nn) {
                return NeighborClass::Remote {
                    peer,
                    local_index: nn - self.range[peer as usize],
                };
            }
            return NeighborClass::Unclassified;
        }
        if let Some(slot) = pic_wire::custom_handler_slot(nn) {
            if slot < self.num_handlers {
                return NeighborClass::CustomHandler { slot };
            }
        }
        NeighborClass::Unclassified
    }

    fn owning_rank(&self, global_index: i64) -> Option<i32> {
        for r in 0..self.nproc {
            let lo = self.range[r as usize];
            let hi = self.range[(r + 1) as usize];
            if (lo..hi).contains(&global_index) {
                return Some(r);
            }
        }
        None
    }
}

/// Builder that assembles a [`GridView`] from caller-owned slices,
/// validating the configuration-error invariants of spec.md §7 eagerly.
#[derive(Debug, Clone)]
pub struct GridViewBuilder<'a> {
    nx: i64,
    ny: i64,
    nz: i64,
    rdx: f32,
    rdy: f32,
    rdz: f32,
    neighbor: &'a [i64],
    rangel: i64,
    rangeh: i64,
    range: &'a [i64],
    bc: [i64; 6],
    custom_handler_faces: [bool; 6],
    num_handlers: usize,
    rank: i32,
    nproc: i32,
}

/// Errors that abort building a [`GridView`] (wraps [`ConfigError`] with
/// no additional context today; kept distinct so callers can match on a
/// build-specific type if the set of build-time checks grows).
pub type GridBuildError = ConfigError;

impl<'a> GridViewBuilder<'a> {
    /// Starts a builder with the grid's geometric parameters.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        nx: i64,
        ny: i64,
        nz: i64,
        rdx: f32,
        rdy: f32,
        rdz: f32,
        neighbor: &'a [i64],
        rangel: i64,
        rangeh: i64,
        range: &'a [i64],
        rank: i32,
        nproc: i32,
    ) -> Self {
        Self {
            nx,
            ny,
            nz,
            rdx,
            rdy,
            rdz,
            neighbor,
            rangel,
            rangeh,
            range,
            bc: [0; 6],
            custom_handler_faces: [false; 6],
            num_handlers: 0,
            rank,
            nproc,
        }
    }

    /// Sets the per-face boundary code (spec.md §3 "Send-side face maps").
    #[must_use]
    pub fn with_boundary_code(mut self, face: usize, code: i64) -> Self {
        self.bc[face] = code;
        self
    }

    /// Marks `face` as carrying a registered custom boundary handler.
    #[must_use]
    pub fn with_custom_handler_face(mut self, face: usize, handler: bool) -> Self {
        self.custom_handler_faces[face] = handler;
        self
    }

    /// Sets the number of registered custom-boundary handlers.
    #[must_use]
    pub fn with_num_handlers(mut self, n: usize) -> Self {
        self.num_handlers = n;
        self
    }

    /// Validates and builds the [`GridView`].
    ///
    /// # Errors
    /// Returns [`ConfigError::SharedFaceWithCustomHandler`] if a face is
    /// simultaneously `SHARED_REMOTELY` and flagged as carrying a custom
    /// handler (spec.md §1 Non-goal (i)), or
    /// [`ConfigError::BoundaryCodeOutOfRange`] if a face's boundary code
    /// is neither a valid rank, a recognized sentinel, nor a valid
    /// handler slot.
    pub fn build(self) -> Result<GridView<'a>, ConfigError> {
        for face in 0..6 {
            let code = self.bc[face];
            let is_shared = (0..i64::from(self.nproc)).contains(&code) && code != i64::from(self.rank);
            if is_shared && self.custom_handler_faces[face] {
                return Err(ConfigError::SharedFaceWithCustomHandler {
                    face,
                    rank: i32::try_from(code).unwrap_or(self.rank),
                    slot: face,
                });
            }
            let is_valid_rank = (0..i64::from(self.nproc)).contains(&code);
            let is_sentinel = code == Sentinel::ABSORB || code == Sentinel::REFLECT;
            let is_handler_slot = pic_wire::custom_handler_slot(code)
                .is_some_and(|slot| slot < self.num_handlers);
            if !is_valid_rank && !is_sentinel && !is_handler_slot {
                return Err(ConfigError::BoundaryCodeOutOfRange {
                    face,
                    code,
                    nproc: self.nproc,
                    handlers: self.num_handlers,
                });
            }
        }
        Ok(GridView {
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            rdx: self.rdx,
            rdy: self.rdy,
            rdz: self.rdz,
            neighbor: self.neighbor,
            rangel: self.rangel,
            rangeh: self.rangeh,
            range: self.range,
            bc: self.bc,
            custom_handler_faces: self.custom_handler_faces,
            num_handlers: self.num_handlers,
            rank: self.rank,
            nproc: self.nproc,
        })
    }
}
