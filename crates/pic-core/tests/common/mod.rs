// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared fixtures for `pic-core` integration tests: a trivial
//! in-process `MessagePassing` double so exchange tests don't need real
//! sockets.

use pic_wire::transport::MessagePassing;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// An in-process loopback transport. Construct one per rank, sharing the
/// same `bus`, to exercise a two-rank exchange in a single test thread.
pub struct LoopbackTransport {
    rank: i32,
    nproc: i32,
    send_bufs: [Vec<u8>; 6],
    recv_bufs: [Vec<u8>; 6],
    bus: Rc<RefCell<HashMap<(i32, i32, i32), Vec<u8>>>>,
}

impl LoopbackTransport {
    /// Builds a transport for `rank` of `nproc`, sharing `bus` with its peers.
    #[must_use]
    pub fn new(rank: i32, nproc: i32, bus: Rc<RefCell<HashMap<(i32, i32, i32), Vec<u8>>>>) -> Self {
        Self {
            rank,
            nproc,
            send_bufs: Default::default(),
            recv_bufs: Default::default(),
            bus,
        }
    }

    /// A fresh, empty shared message bus for a set of loopback ranks.
    #[must_use]
    pub fn new_bus() -> Rc<RefCell<HashMap<(i32, i32, i32), Vec<u8>>>> {
        Rc::new(RefCell::new(HashMap::new()))
    }
}

impl MessagePassing for LoopbackTransport {
    fn rank(&self) -> i32 {
        self.rank
    }
    fn nproc(&self) -> i32 {
        self.nproc
    }
    fn size_send_buffer(&mut self, tag: i32, bytes: usize) {
        self.send_bufs[tag as usize].resize(bytes, 0);
    }
    fn send_buffer(&mut self, tag: i32) -> &mut [u8] {
        &mut self.send_bufs[tag as usize]
    }
    fn size_recv_buffer(&mut self, tag: i32, bytes: usize) {
        self.recv_bufs[tag as usize].resize(bytes, 0);
    }
    fn recv_buffer(&self, tag: i32) -> &[u8] {
        &self.recv_bufs[tag as usize]
    }
    fn begin_send(&mut self, tag: i32, bytes: usize, dest: i32) {
        self.bus
            .borrow_mut()
            .insert((self.rank, dest, tag), self.send_bufs[tag as usize][..bytes].to_vec());
    }
    fn end_send(&mut self, _tag: i32) {}
    fn begin_recv(&mut self, tag: i32, bytes: usize, src: i32, send_tag: i32) {
        if let Some(msg) = self.bus.borrow_mut().remove(&(src, self.rank, send_tag)) {
            let n = bytes.min(msg.len());
            self.recv_bufs[tag as usize][..n].copy_from_slice(&msg[..n]);
        }
    }
    fn end_recv(&mut self, _tag: i32) {}
}
