// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trilinear charge deposition onto the bound-charge grid (spec.md §4.1).
//!
//! Ported from `accumulate_rhob` in the original VPIC source this design
//! was distilled from: the same `w0..w7` intermediate ordering (so the
//! floating-point rounding matches exactly), the same edge-doubling rule
//! at domain boundary faces, and the same three-stride corner layout.

use crate::grid::GridView;

/// The bound/free charge-density grid a particle deposits onto.
///
/// Both arrays are ghost-padded: `(nx+2) * (ny+2) * (nz+2)` cells, with
/// physical cells occupying indices `1..=nx` (etc.) on each axis.
#[derive(Debug, Clone)]
pub struct Field {
    nx: i64,
    ny: i64,
    nz: i64,
    rhob: Vec<f32>,
    rhof: Vec<f32>,
}

impl Field {
    /// Allocates a zeroed field for a grid of `nx * ny * nz` physical cells.
    #[must_use]
    pub fn new(nx: i64, ny: i64, nz: i64) -> Self {
        let n = ((nx + 2) * (ny + 2) * (nz + 2)).max(0) as usize;
        Self {
            nx,
            ny,
            nz,
            rhob: vec![0.0; n],
            rhof: vec![0.0; n],
        }
    }

    /// Bound charge density at ghost-padded cell index `v`.
    #[must_use]
    pub fn rhob(&self, v: usize) -> f32 {
        self.rhob[v]
    }

    /// Free charge density at ghost-padded cell index `v`.
    #[must_use]
    pub fn rhof(&self, v: usize) -> f32 {
        self.rhof[v]
    }

    /// Free charge density, mutably.
    pub fn rhof_mut(&mut self, v: usize) -> &mut f32 {
        &mut self.rhof[v]
    }

    fn strides(&self) -> (i64, i64, i64) {
        (1, self.nx + 2, (self.nx + 2) * (self.ny + 2))
    }

    fn decompose(&self, v: i64) -> (i64, i64, i64) {
        let sy = self.nx + 2;
        let sz = self.ny + 2;
        let mut j = v / sy;
        let i = v - j * sy;
        let k = j / sz;
        j -= k * sz;
        (i, j, k)
    }
}

/// Deposits a particle's charge `qsp` onto `field`'s bound-charge grid
/// via trilinear weighting, with edge-doubling on domain boundary faces
/// (spec.md §4.1).
///
/// `cell`, `dx`, `dy`, `dz` are the particle's ghost-padded cell index
/// and logical position within it, in `[-1, 1]` (spec.md §3's
/// `Particle` fields).
pub fn accumulate_rhob(
    field: &mut Field,
    grid: &GridView<'_>,
    cell: i64,
    dx: f32,
    dy: f32,
    dz: f32,
    qsp: f32,
) {
    let w0 = dx;
    let w1 = dy;

    let w7 = (1.0 + w0) * (1.0 + w1);
    let w6 = (1.0 - w0) * (1.0 + w1);
    let w5 = (1.0 + w0) * (1.0 - w1);
    let w4 = (1.0 - w0) * (1.0 - w1);

    let mut w0 = w4 * (1.0 - dz);
    let mut w1 = w5 * (1.0 - dz);
    let mut w2 = w6 * (1.0 - dz);
    let mut w3 = w7 * (1.0 - dz);
    let mut w4 = w4 * (1.0 + dz);
    let mut w5 = w5 * (1.0 + dz);
    let mut w6 = w6 * (1.0 + dz);
    let mut w7 = w7 * (1.0 + dz);

    let w = 0.125 * qsp * grid.rdx() * grid.rdy() * grid.rdz();
    w0 *= w;
    w1 *= w;
    w2 *= w;
    w3 *= w;
    w4 *= w;
    w5 *= w;
    w6 *= w;
    w7 *= w;

    let (ix, iy, iz) = field.decompose(cell);
    if ix == 1 {
        w0 *= 2.0;
        w2 *= 2.0;
        w4 *= 2.0;
        w6 *= 2.0;
    }
    if ix == grid.nx() {
        w1 *= 2.0;
        w3 *= 2.0;
        w5 *= 2.0;
        w7 *= 2.0;
    }
    if iy == 1 {
        w0 *= 2.0;
        w1 *= 2.0;
        w4 *= 2.0;
        w5 *= 2.0;
    }
    if iy == grid.ny() {
        w2 *= 2.0;
        w3 *= 2.0;
        w6 *= 2.0;
        w7 *= 2.0;
    }
    if iz == 1 {
        w0 *= 2.0;
        w1 *= 2.0;
        w2 *= 2.0;
        w3 *= 2.0;
    }
    if iz == grid.nz() {
        w4 *= 2.0;
        w5 *= 2.0;
        w6 *= 2.0;
        w7 *= 2.0;
    }

    let (sx, sy, sz) = field.strides();
    let v = cell as usize;
    field.rhob[v] += w0;
    field.rhob[(cell + sx) as usize] += w1;
    field.rhob[(cell + sy) as usize] += w2;
    field.rhob[(cell + sx + sy) as usize] += w3;
    field.rhob[(cell + sz) as usize] += w4;
    field.rhob[(cell + sx + sz) as usize] += w5;
    field.rhob[(cell + sy + sz) as usize] += w6;
    field.rhob[(cell + sx + sy + sz) as usize] += w7;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridViewBuilder;

    fn grid_4x4x4<'a>(neighbor: &'a [i64], range: &'a [i64]) -> GridViewBuilder<'a> {
        GridViewBuilder::new(4, 4, 4, 1.0, 1.0, 1.0, neighbor, 0, 124, range, 0, 1)
    }

    #[test]
    fn centered_particle_sums_to_total_charge() {
        let neighbor = vec![0i64; 6];
        let range = vec![0, 125];
        let grid = grid_4x4x4(&neighbor, &range).build().unwrap();
        let mut field = Field::new(4, 4, 4);
        // Cell (2,2,2) in ghost-padded coordinates: not on any boundary face.
        let sy = 4 + 2;
        let sz = (4 + 2) * (4 + 2);
        let cell = 2 + 2 * sy + 2 * sz;
        accumulate_rhob(&mut field, &grid, cell, 0.0, 0.0, 0.0, 2.0);
        let sx = 1;
        let total: f32 = [
            cell,
            cell + sx,
            cell + sy,
            cell + sx + sy,
            cell + sz,
            cell + sx + sz,
            cell + sy + sz,
            cell + sx + sy + sz,
        ]
        .iter()
        .map(|&v| field.rhob(v as usize))
        .sum();
        assert!((total - 2.0).abs() < 1e-5);
    }

    #[test]
    fn boundary_cell_doubles_affected_corners() {
        let neighbor = vec![0i64; 6];
        let range = vec![0, 125];
        let grid = grid_4x4x4(&neighbor, &range).build().unwrap();
        let mut field = Field::new(4, 4, 4);
        let sy = 4 + 2;
        let sz = (4 + 2) * (4 + 2);
        // ix == 1: a low-x boundary cell.
        let cell = 1 + 2 * sy + 2 * sz;
        accumulate_rhob(&mut field, &grid, cell, 0.0, 0.0, 0.0, 1.0);
        let sx = 1;
        assert!((field.rhob(cell as usize) - 0.25).abs() < 1e-6);
        assert!((field.rhob((cell + sx) as usize) - 0.125).abs() < 1e-6);
    }
}
