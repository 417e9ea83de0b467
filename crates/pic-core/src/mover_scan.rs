// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reverse-order mover scan and face-crossing dispatch (spec.md §4.2).
//!
//! Movers are walked from the end of the array backward. This is not an
//! arbitrary choice: [`crate::Species::swap_remove_mover`] and
//! [`crate::Species::swap_remove_particle`] both swap the removed slot
//! with the array's current last element. Scanning in decreasing order
//! of `ParticleMover::i` guarantees that whichever mover is being
//! resolved right now references the single largest live particle index
//! that still has a pending mover — so the particle swapped into its
//! slot can never be one another not-yet-processed mover still points
//! at. Callers must append movers in increasing `.i` order (the natural
//! order they're discovered in during the push phase) for this to hold.

use pic_wire::{custom_handler_slot, Injector, Sentinel};
use rand::RngCore;

use crate::accumulator::{Accumulator, CellAdvance};
use crate::boundary::{BoundaryRegistry, CmCursor};
use crate::deposit::{accumulate_rhob, Field};
use crate::grid::{GridView, NeighborClass};
use crate::species::Species;

/// Tallies of how movers resolved during one [`scan`] call. Diagnostic
/// only — nothing downstream depends on these counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoverScanCounts {
    /// Particles absorbed (including the unclassified-interaction
    /// fallthrough, per spec.md §7).
    pub absorbed: usize,
    /// Particles that migrated to a remote rank.
    pub migrated: usize,
    /// Particles dispatched to a custom boundary handler.
    pub custom_handled: usize,
    /// Interactions that could not be classified (logged, then
    /// absorbed).
    pub unclassified: usize,
}

/// Walks `species`'s mover array in reverse, resolving each pending face
/// crossing by classifying the crossed face's neighbor-table entry and
/// dispatching to one of absorb / remote migration / custom handler /
/// unclassified-soft-error (spec.md §4.2).
///
/// Movers whose [`CellAdvance::advance_in_cell`] call returns `None`
/// (fully advanced within their current cell) are simply retired.
/// Migrating particles are encoded as [`Injector`] records appended to
/// `send_lists[face]`, for [`crate::exchange_step`] to pack and send.
/// Custom-handler interactions may append one reinjected particle to
/// `overflow` via a [`CmCursor`].
#[allow(clippy::too_many_arguments)]
pub fn scan<A: CellAdvance>(
    species: &mut Species,
    grid: &GridView<'_>,
    field: &mut Field,
    accumulator: &mut Accumulator,
    registry: &mut BoundaryRegistry,
    send_lists: &mut [Vec<Injector>; 6],
    overflow: &mut Vec<Injector>,
    advancer: &mut A,
    rng: &mut dyn RngCore,
) -> MoverScanCounts {
    let mut counts = MoverScanCounts::default();
    let mut i = species.nm();
    while i > 0 {
        i -= 1;
        let mut mover = species.movers()[i];
        let particle_idx = mover.i as usize;
        let mut particle = species.particles()[particle_idx];

        let Some(face) = advancer.advance_in_cell(&mut particle, &mut mover, accumulator, grid)
        else {
            species.particles_mut()[particle_idx] = particle;
            species.swap_remove_mover(i);
            continue;
        };
        species.particles_mut()[particle_idx] = particle;

        let cell = particle.i;
        let nn = grid.neighbor_code(cell, face);
        match grid.classify(nn) {
            NeighborClass::Absorb => {
                accumulate_rhob(field, grid, cell, particle.dx, particle.dy, particle.dz, particle.q);
                species.swap_remove_particle(particle_idx);
                counts.absorbed += 1;
            }
            NeighborClass::Remote { local_index, .. } => {
                let injector = Injector::new(
                    particle.dx,
                    particle.dy,
                    particle.dz,
                    local_index,
                    particle.ux,
                    particle.uy,
                    particle.uz,
                    particle.q,
                    mover.dispx,
                    mover.dispy,
                    mover.dispz,
                    species.id(),
                );
                send_lists[face].push(injector);
                species.swap_remove_particle(particle_idx);
                counts.migrated += 1;
            }
            NeighborClass::CustomHandler { slot } => {
                if let Some(handler) = registry.get_mut(slot) {
                    let mut cursor = CmCursor::new(overflow);
                    handler.handle(
                        &mut particle, &mover, face, species, field, accumulator, grid,
                        &mut cursor, rng,
                    );
                    species.particles_mut()[particle_idx] = particle;
                    counts.custom_handled += 1;
                } else {
                    tracing::warn!(
                        species_id = species.id(),
                        slot,
                        "custom handler slot decoded with no registered handler, absorbing"
                    );
                    accumulate_rhob(field, grid, cell, particle.dx, particle.dy, particle.dz, particle.q);
                    species.swap_remove_particle(particle_idx);
                    counts.unclassified += 1;
                }
            }
            NeighborClass::Internal | NeighborClass::Unclassified => {
                tracing::warn!(
                    species_id = species.id(),
                    cell,
                    face,
                    nn,
                    custom_slot = custom_handler_slot(nn).map_or(-1, |s| s as i64),
                    absorb_sentinel = Sentinel::ABSORB,
                    "unclassified boundary interaction, absorbing"
                );
                accumulate_rhob(field, grid, cell, particle.dx, particle.dy, particle.dz, particle.q);
                species.swap_remove_particle(particle_idx);
                counts.unclassified += 1;
            }
        }
        species.swap_remove_mover(i);
    }
    counts
}
