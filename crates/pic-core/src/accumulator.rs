// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Current-density accumulation and the in-cell advancement seam
//! (spec.md §6 "external collaborators").
//!
//! `move_p` (advance one particle within its current cell, depositing
//! current as it goes, and report whether it crossed a face) is an
//! external collaborator per spec.md §6 — the pusher and field solver
//! live outside this crate. [`CellAdvance`] is the trait boundary that
//! lets [`crate::mover_scan`] drive that advancement without depending
//! on a concrete pusher, grounded on the same seam the original exposes
//! (`move_p(sp->p, &sp->pm[sp->nm], a0, g)`).

use crate::grid::GridView;
use crate::species::{Particle, ParticleMover};

/// Per-cell current-density accumulation buffer.
///
/// Mirrors the original's `accumulator_t`: each cell holds four corner
/// stencil values per current component (`jx`, `jy`, `jz`), accumulated
/// as particles move through it within a step.
#[derive(Debug, Clone)]
pub struct Accumulator {
    ncells: usize,
    jx: Vec<[f32; 4]>,
    jy: Vec<[f32; 4]>,
    jz: Vec<[f32; 4]>,
}

impl Accumulator {
    /// Allocates a zeroed accumulator for `ncells` ghost-padded cells.
    #[must_use]
    pub fn new(ncells: usize) -> Self {
        Self {
            ncells,
            jx: vec![[0.0; 4]; ncells],
            jy: vec![[0.0; 4]; ncells],
            jz: vec![[0.0; 4]; ncells],
        }
    }

    /// Number of cells this accumulator covers.
    #[must_use]
    pub fn ncells(&self) -> usize {
        self.ncells
    }

    /// Adds `value` to the `corner`-th (`0..4`) stencil entry of `jx` at `cell`.
    pub fn add_jx(&mut self, cell: usize, corner: usize, value: f32) {
        self.jx[cell][corner] += value;
    }

    /// Adds `value` to the `corner`-th (`0..4`) stencil entry of `jy` at `cell`.
    pub fn add_jy(&mut self, cell: usize, corner: usize, value: f32) {
        self.jy[cell][corner] += value;
    }

    /// Adds `value` to the `corner`-th (`0..4`) stencil entry of `jz` at `cell`.
    pub fn add_jz(&mut self, cell: usize, corner: usize, value: f32) {
        self.jz[cell][corner] += value;
    }

    /// Reads back the `jx` stencil for `cell`.
    #[must_use]
    pub fn jx(&self, cell: usize) -> [f32; 4] {
        self.jx[cell]
    }

    /// Reads back the `jy` stencil for `cell`.
    #[must_use]
    pub fn jy(&self, cell: usize) -> [f32; 4] {
        self.jy[cell]
    }

    /// Reads back the `jz` stencil for `cell`.
    #[must_use]
    pub fn jz(&self, cell: usize) -> [f32; 4] {
        self.jz[cell]
    }
}

/// Advances a particle within its current cell.
///
/// Implementations push the particle along `mover`'s remaining
/// displacement, depositing current into `accumulator`, and either
/// consume the displacement entirely (returning `None`, the particle
/// stays in its cell and the mover is retired) or exhaust the cell
/// first, reporting which of the six local faces (spec.md §3: 0..6) it
/// exited through so [`crate::mover_scan`] can look up that face's
/// neighbor-table entry and dispatch accordingly.
pub trait CellAdvance {
    /// Advances `particle` along `mover` within `grid`, depositing
    /// current into `accumulator`. Returns `Some(face)` if the particle
    /// crossed cell face `face` and the mover still needs dispatching.
    fn advance_in_cell(
        &mut self,
        particle: &mut Particle,
        mover: &mut ParticleMover,
        accumulator: &mut Accumulator,
        grid: &GridView<'_>,
    ) -> Option<usize>;
}

/// A [`CellAdvance`] test double that always fully consumes the mover's
/// displacement in one step and never reports a face crossing.
///
/// Exercises [`crate::mover_scan`] and [`crate::reinject`] without a
/// real pusher/field-solver wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCellAdvance;

impl CellAdvance for NullCellAdvance {
    fn advance_in_cell(
        &mut self,
        particle: &mut Particle,
        mover: &mut ParticleMover,
        _accumulator: &mut Accumulator,
        _grid: &GridView<'_>,
    ) -> Option<usize> {
        particle.dx += mover.dispx;
        particle.dy += mover.dispy;
        particle.dz += mover.dispz;
        mover.dispx = 0.0;
        mover.dispy = 0.0;
        mover.dispz = 0.0;
        None
    }
}

/// A [`CellAdvance`] test double that replays a fixed sequence of
/// outcomes, one per call, then falls back to fully consuming the
/// mover. Lets tests drive [`crate::mover_scan`] through a specific face
/// crossing without a real pusher.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCellAdvance {
    outcomes: std::collections::VecDeque<Option<usize>>,
}

impl ScriptedCellAdvance {
    /// Builds a scripted advancer from a sequence of outcomes.
    #[must_use]
    pub fn new(outcomes: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
        }
    }
}

impl CellAdvance for ScriptedCellAdvance {
    fn advance_in_cell(
        &mut self,
        particle: &mut Particle,
        mover: &mut ParticleMover,
        _accumulator: &mut Accumulator,
        _grid: &GridView<'_>,
    ) -> Option<usize> {
        match self.outcomes.pop_front() {
            Some(Some(face)) => Some(face),
            Some(None) | None => {
                particle.dx += mover.dispx;
                particle.dy += mover.dispy;
                particle.dz += mover.dispz;
                mover.dispx = 0.0;
                mover.dispy = 0.0;
                mover.dispz = 0.0;
                None
            }
        }
    }
}
