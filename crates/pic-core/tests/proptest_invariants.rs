// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property-based coverage of spec.md §8's P1-P7 invariants.

use pic_core::p2p_io::{BlockPlan, ByteSwap, NoSwap, Swap};
use pic_core::{accumulate_rhob, Field, GridViewBuilder, Particle, Species};
use proptest::prelude::*;

fn grid_dims() -> (i64, i64, i64) {
    (4, 4, 4)
}

proptest! {
    /// P5: a single particle's deposit sums to exactly its charge when
    /// it lands away from any domain boundary face (no edge-doubling).
    #[test]
    fn interior_deposit_sums_to_charge(
        dx in -0.999f32..0.999,
        dy in -0.999f32..0.999,
        dz in -0.999f32..0.999,
        q in -5.0f32..5.0,
    ) {
        let (nx, ny, nz) = grid_dims();
        let neighbor = vec![0i64; 6];
        let range = vec![0, 1];
        let grid = GridViewBuilder::new(nx, ny, nz, 1.0, 1.0, 1.0, &neighbor, 0, 0, &range, 0, 1)
            .build()
            .unwrap();
        let mut field = Field::new(nx, ny, nz);

        // Cell (2,2,2): interior on a 4-cell-per-axis grid (boundary
        // faces are at ix/iy/iz == 1 or == nx/ny/nz).
        let sy = nx + 2;
        let sz = (nx + 2) * (ny + 2);
        let cell = 2 + 2 * sy + 2 * sz;

        accumulate_rhob(&mut field, &grid, cell, dx, dy, dz, q);

        let sx = 1;
        let total: f32 = [
            cell, cell + sx, cell + sy, cell + sx + sy,
            cell + sz, cell + sx + sz, cell + sy + sz, cell + sx + sy + sz,
        ]
        .iter()
        .map(|&v| field.rhob(v as usize))
        .sum();
        prop_assert!((total - q).abs() < 1e-3);
    }

    /// P3: the geometric mover-capacity growth policy is strictly
    /// monotone and never shrinks.
    #[test]
    fn grow_capacity_is_monotone(n in 0usize..1_000_000) {
        let next = pic_core::grow_capacity(n);
        prop_assert!(next > n);
    }

    /// P2: pushing `n` particles then removing a random subset by
    /// swap-remove leaves the species array exactly as compact as the
    /// surviving count — no gaps, `np()` always matches the live set.
    #[test]
    fn species_array_stays_compact_under_swap_remove(
        n in 1usize..64,
        removals in proptest::collection::vec(0usize..64, 0..32),
    ) {
        let mut species = Species::new(0);
        for i in 0..n {
            species.push_particle(Particle {
                dx: 0.0, dy: 0.0, dz: 0.0, i: i as i64,
                ux: 0.0, uy: 0.0, uz: 0.0, q: 1.0,
            });
        }
        let mut alive = n;
        for r in removals {
            if alive == 0 {
                break;
            }
            let idx = r % alive;
            species.swap_remove_particle(idx);
            alive -= 1;
        }
        prop_assert_eq!(species.np(), alive);
        prop_assert_eq!(species.particles().len(), alive);
    }

    /// P7: a block plan never under-covers its total, and a full block
    /// plus a remainder block always exactly reconstitutes it, even when
    /// the total straddles a block boundary.
    #[test]
    fn block_plan_covers_total_across_any_boundary(
        total in 0u64..10_000,
        block_len in 1u64..512,
    ) {
        let plan = BlockPlan::new(total, block_len);
        prop_assert_eq!(plan.full_blocks * block_len + plan.remainder, total);
        prop_assert!(plan.total_blocks() * block_len >= total);
    }

    /// P6: applying the byte-swap policy twice is the identity transform,
    /// so a write-then-read round trip through a byte-order-mismatched
    /// pair of hosts recovers the original elements.
    #[test]
    fn double_byte_swap_is_identity(a in any::<u32>(), b in any::<u32>()) {
        let mut data = [a, b];
        let original = data;
        ByteSwap::apply(&mut data);
        ByteSwap::apply(&mut data);
        prop_assert_eq!(data, original);

        let mut untouched = [a, b];
        NoSwap::apply(&mut untouched);
        prop_assert_eq!(untouched, [a, b]);
    }
}
