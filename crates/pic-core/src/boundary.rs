// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Custom boundary-handler seam (spec.md §3, §4.2, §1 Non-goal (ii)).

use pic_wire::Injector;
use rand::RngCore;

use crate::accumulator::Accumulator;
use crate::deposit::Field;
use crate::grid::GridView;
use crate::species::{Particle, ParticleMover, Species};

/// Write cursor into a species' local overflow buffer (`cmlist`), handed
/// to a [`BoundaryHandler`] so it can emit a reinjected particle.
///
/// Enforces spec.md §1 Non-goal (ii): "handlers emit at most one
/// injector per incident particle". A second call to
/// [`CmCursor::try_push`] within the same interaction is rejected rather
/// than silently accepted.
#[derive(Debug)]
pub struct CmCursor<'a> {
    cmlist: &'a mut Vec<Injector>,
    used: bool,
}

impl<'a> CmCursor<'a> {
    /// Wraps a species' persistent overflow buffer for one interaction.
    pub fn new(cmlist: &'a mut Vec<Injector>) -> Self {
        Self { cmlist, used: false }
    }

    /// Appends `injector` to the overflow buffer, unless this cursor has
    /// already been used once. Returns `true` if the injector was
    /// accepted.
    pub fn try_push(&mut self, injector: Injector) -> bool {
        if self.used {
            return false;
        }
        self.cmlist.push(injector);
        self.used = true;
        true
    }

    /// `true` if a handler already emitted an injector through this cursor.
    #[must_use]
    pub fn has_emitted(&self) -> bool {
        self.used
    }
}

/// A custom boundary-condition handler, dispatched by
/// [`crate::mover_scan`] when a particle crosses into a neighbor-table
/// slot classified as [`crate::grid::NeighborClass::CustomHandler`].
pub trait BoundaryHandler {
    /// Handles one particle's incident crossing of `face`.
    ///
    /// `particle` and `mover` describe the incident crossing; the
    /// implementation may mutate `particle` in place (e.g. reflect its
    /// momentum), deposit into `field`/`accumulator`, and emit at most
    /// one reinjected particle via `cursor`.
    #[allow(clippy::too_many_arguments)]
    fn handle(
        &mut self,
        particle: &mut Particle,
        mover: &ParticleMover,
        face: usize,
        species: &Species,
        field: &mut Field,
        accumulator: &mut Accumulator,
        grid: &GridView<'_>,
        cursor: &mut CmCursor<'_>,
        rng: &mut dyn RngCore,
    );
}

/// Registry of custom boundary handlers, indexed by the slot decoded
/// from a neighbor-table entry (`pic_wire::custom_handler_slot`).
#[derive(Default)]
pub struct BoundaryRegistry {
    handlers: Vec<Box<dyn BoundaryHandler>>,
}

impl BoundaryRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`, returning its slot index.
    pub fn register(&mut self, handler: Box<dyn BoundaryHandler>) -> usize {
        self.handlers.push(handler);
        self.handlers.len() - 1
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Looks up the handler at `slot`, mutably.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut dyn BoundaryHandler> {
        self.handlers.get_mut(slot).map(Box::as_mut)
    }
}
