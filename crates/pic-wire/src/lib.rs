// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! pic-wire: wire schema for the particle boundary-exchange core.
//!
//! This crate defines the byte-exact `Injector` record, the per-face
//! framing used to carry it between ranks, the sentinel constants that
//! classify a neighbor-table entry, and the transport seams
//! (`MessagePassing`, `P2pTransport`) that let `pic-core` stay agnostic
//! of whatever messaging layer a caller wires in. The boundary-handler
//! callback seam lives in `pic-core` instead, since its signature closes
//! over `pic-core`'s own particle/field/grid types.
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
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod framing;
mod injector;
/// Request/response schema for the P2P bulk I/O server protocol.
pub mod p2p_proto;
mod sentinel;
/// Transport seams: `MessagePassing` for the six-neighbor exchange.
pub mod transport;

pub use framing::{FaceBuffer, FramingError, HEADER_LEN};
pub use injector::{Injector, INJECTOR_LEN};
pub use sentinel::{custom_handler_slot, is_custom_handler, Sentinel};
