// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! pic-core: particle boundary-exchange core for a domain-decomposed,
//! multi-species particle-in-cell simulation.
//!
//! Each rank runs single-threaded; concurrency is across ranks via
//! asynchronous message passing (see [`pic_wire::transport`]). A full
//! step is: mover scan → {deposit, per-face send buffers, local
//! overflow buffer} → exchange protocol → reinjection. See the crate's
//! `DESIGN.md` for how each module here grounds in the original VPIC
//! source this design was distilled from.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod accumulator;
mod boundary;
mod deposit;
mod error;
mod exchange;
mod grid;
mod marshal;
/// In-cell advancement seam and the mover-scan face dispatch table.
pub mod mover_scan;
/// Double-buffered block I/O against a paired P2P server.
pub mod p2p_io;
mod reinject;
mod species;

pub use accumulator::{Accumulator, CellAdvance, NullCellAdvance, ScriptedCellAdvance};
pub use boundary::{BoundaryHandler, BoundaryRegistry, CmCursor};
pub use deposit::{accumulate_rhob, Field};
pub use error::{ConfigError, P2pError, ProtocolError};
pub use exchange::{exchange_step, ExchangeCounts};
pub use grid::{GridBuildError, GridView, GridViewBuilder, NeighborClass};
pub use marshal::Marshaller;
pub use reinject::{reinject, ReinjectCounts};
pub use species::{grow_capacity, Particle, ParticleMover, Species, SPECIES_TABLE_LEN};
