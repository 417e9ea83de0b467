// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reinjection of migrated and locally-overflowed particles (spec.md
//! §4.4).
//!
//! Seven sources feed one reinjection pass: the six remote faces'
//! received [`Injector`] records plus the local overflow buffer
//! (`cmlist`) that custom boundary handlers appended to. A count pass
//! over all seven sources reserves each touched species' particle
//! storage once, under the geometric growth policy of
//! [`crate::species::grow_capacity`], before any particle is pushed —
//! avoiding the repeated-reallocation pattern a naive push-as-you-go
//! pass would hit. Particles are then replayed in reverse source order
//! through [`CellAdvance`], mirroring the reverse-order convention
//! [`crate::mover_scan`] uses for the same reason: newly reinjected
//! particles may immediately re-cross a face, and any such mover is left
//! for the next step's ordinary mover scan to resolve rather than
//! recursing here.

use pic_wire::Injector;

use crate::accumulator::{Accumulator, CellAdvance};
use crate::error::ProtocolError;
use crate::grid::GridView;
use crate::species::{grow_capacity, Particle, ParticleMover, Species, SPECIES_TABLE_LEN};

/// Tallies from one [`reinject`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReinjectCounts {
    /// Particles reinjected and fully settled within their cell.
    pub settled: usize,
    /// Particles reinjected but still crossing a face; left as a
    /// pending mover for the next step's scan.
    pub pending: usize,
}

/// Reinjects every particle carried by `received`'s six per-face
/// injector lists and `overflow`'s local list into `species_table`.
///
/// # Errors
/// Returns [`ProtocolError::UnknownSpeciesId`] if an injector names a
/// species with no corresponding live entry in `species_table` (spec.md
/// §4.4, §7).
pub fn reinject<A: CellAdvance>(
    species_table: &mut [Option<Species>; SPECIES_TABLE_LEN],
    received: &[Vec<Injector>; 6],
    overflow: &[Injector],
    grid: &GridView<'_>,
    accumulator: &mut Accumulator,
    advancer: &mut A,
) -> Result<ReinjectCounts, ProtocolError> {
    let mut per_species_new = [0usize; SPECIES_TABLE_LEN];
    let sources: [&[Injector]; 7] = [
        &received[0],
        &received[1],
        &received[2],
        &received[3],
        &received[4],
        &received[5],
        overflow,
    ];
    for source in sources {
        for injector in source {
            let sp = injector.sp_id as usize;
            if sp >= SPECIES_TABLE_LEN || species_table[sp].is_none() {
                return Err(ProtocolError::UnknownSpeciesId {
                    species_id: injector.sp_id,
                });
            }
            per_species_new[sp] += 1;
        }
    }
    for (sp, count) in per_species_new.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        if let Some(species) = species_table[sp].as_mut() {
            let np_target = grow_capacity(species.np()).max(species.np() + count);
            species.reserve_particles(np_target.saturating_sub(species.np()));
            let nm_target = grow_capacity(species.nm()).max(species.nm() + count);
            species.reserve_movers(nm_target.saturating_sub(species.nm()));
        }
    }

    let mut counts = ReinjectCounts::default();
    let mut ordered: Vec<&Injector> = sources.into_iter().flatten().collect();
    ordered.reverse();
    for injector in ordered {
        let sp = injector.sp_id as usize;
        let Some(species) = species_table[sp].as_mut() else {
            continue;
        };
        let particle = Particle {
            dx: injector.dx,
            dy: injector.dy,
            dz: injector.dz,
            i: injector.i,
            ux: injector.ux,
            uy: injector.uy,
            uz: injector.uz,
            q: injector.q,
        };
        let particle_idx = species.push_particle(particle);
        let mut mover = ParticleMover {
            dispx: injector.dispx,
            dispy: injector.dispy,
            dispz: injector.dispz,
            i: particle_idx as i64,
        };
        let mut replayed = species.particles()[particle_idx];
        match advancer.advance_in_cell(&mut replayed, &mut mover, accumulator, grid) {
            None => {
                species.particles_mut()[particle_idx] = replayed;
                counts.settled += 1;
            }
            Some(_face) => {
                species.particles_mut()[particle_idx] = replayed;
                species.push_mover(mover);
                counts.pending += 1;
            }
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::ScriptedCellAdvance;
    use crate::grid::GridViewBuilder;

    fn empty_table() -> [Option<Species>; SPECIES_TABLE_LEN] {
        std::array::from_fn(|_| None)
    }

    #[test]
    fn settles_particle_with_no_further_crossing() {
        let neighbor = vec![0i64; 6];
        let range = vec![0, 1];
        let grid = GridViewBuilder::new(1, 1, 1, 1.0, 1.0, 1.0, &neighbor, 0, 0, &range, 0, 1)
            .build()
            .unwrap();
        let mut accumulator = Accumulator::new(27);
        let mut advancer = ScriptedCellAdvance::new([None]);

        let mut table = empty_table();
        table[2] = Some(Species::new(2));
        let received: [Vec<Injector>; 6] = Default::default();
        let overflow = vec![Injector::new(
            0.0, 0.0, 0.0, 0, 0.0, 0.0, 0.0, 1.0, 0.1, 0.0, 0.0, 2,
        )];

        let counts = reinject(&mut table, &received, &overflow, &grid, &mut accumulator, &mut advancer)
            .unwrap();
        assert_eq!(counts.settled, 1);
        assert_eq!(counts.pending, 0);
        assert_eq!(table[2].as_ref().unwrap().np(), 1);
        assert_eq!(table[2].as_ref().unwrap().nm(), 0);
    }

    #[test]
    fn unknown_species_id_is_rejected() {
        let neighbor = vec![0i64; 6];
        let range = vec![0, 1];
        let grid = GridViewBuilder::new(1, 1, 1, 1.0, 1.0, 1.0, &neighbor, 0, 0, &range, 0, 1)
            .build()
            .unwrap();
        let mut accumulator = Accumulator::new(27);
        let mut advancer = ScriptedCellAdvance::new([]);

        let mut table = empty_table();
        let received: [Vec<Injector>; 6] = Default::default();
        let overflow = vec![Injector::new(
            0.0, 0.0, 0.0, 0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 9,
        )];

        let err = reinject(&mut table, &received, &overflow, &grid, &mut accumulator, &mut advancer)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownSpeciesId { species_id: 9 }));
    }

    #[test]
    fn still_crossing_particle_is_left_as_a_pending_mover() {
        let neighbor = vec![0i64; 6];
        let range = vec![0, 1];
        let grid = GridViewBuilder::new(1, 1, 1, 1.0, 1.0, 1.0, &neighbor, 0, 0, &range, 0, 1)
            .build()
            .unwrap();
        let mut accumulator = Accumulator::new(27);
        let mut advancer = ScriptedCellAdvance::new([Some(0)]);

        let mut table = empty_table();
        table[0] = Some(Species::new(0));
        let mut received: [Vec<Injector>; 6] = Default::default();
        received[3] = vec![Injector::new(
            0.0, 0.0, 0.0, 0, 0.0, 0.0, 0.0, 1.0, 0.2, 0.0, 0.0, 0,
        )];
        let overflow = Vec::new();

        let counts = reinject(&mut table, &received, &overflow, &grid, &mut accumulator, &mut advancer)
            .unwrap();
        assert_eq!(counts.pending, 1);
        assert_eq!(table[0].as_ref().unwrap().nm(), 1);
    }
}
