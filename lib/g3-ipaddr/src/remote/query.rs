/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::io;
use std::net::IpAddr;
use std::os::fd::RawFd;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use c_ares::{Channel, HostResults, SOCKET_BAD, Socket};
use log::{debug, trace};
use tokio::time::Instant;

use crate::{AddressFamily, ResolverContext};

/// How long to wait on one socket before letting c-ares look at the others
/// and at its own retransmission timers.
const PROCESS_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryEntry {
    Entry(IpAddr),
    /// No entry available yet, wait for the poll fd to become readable.
    Again,
    /// No more entries.
    Done,
}

/// An in-flight address lookup.
///
/// The query is closed when dropped.
pub trait AddrQuery {
    fn next_entry(&mut self) -> io::Result<QueryEntry>;

    /// The fd to wait on after [`QueryEntry::Again`] is returned.
    ///
    /// It may change between two calls of `next_entry`, and is negative if
    /// the query has nothing to wait on but time.
    fn poll_fd(&self) -> RawFd;

    /// When the query should be polled again even if the fd is not readable.
    fn retry_at(&self) -> Option<Instant> {
        None
    }
}

impl<T: AddrQuery + ?Sized> AddrQuery for &mut T {
    fn next_entry(&mut self) -> io::Result<QueryEntry> {
        (**self).next_entry()
    }

    fn poll_fd(&self) -> RawFd {
        (**self).poll_fd()
    }

    fn retry_at(&self) -> Option<Instant> {
        (**self).retry_at()
    }
}

#[derive(Clone, Copy)]
struct SocketInterest {
    socket: Socket,
    readable: bool,
    writable: bool,
}

#[derive(Default)]
struct QueryState {
    sockets: Vec<SocketInterest>,
    answers: VecDeque<IpAddr>,
    pending: usize,
}

impl QueryState {
    fn update_socket(&mut self, socket: Socket, readable: bool, writable: bool) {
        if !readable && !writable {
            self.sockets.retain(|s| s.socket != socket);
            return;
        }
        match self.sockets.iter_mut().find(|s| s.socket == socket) {
            Some(s) => {
                s.readable = readable;
                s.writable = writable;
            }
            None => self.sockets.push(SocketInterest {
                socket,
                readable,
                writable,
            }),
        }
    }

    fn finish_lookup(&mut self, host: &str, r: c_ares::Result<HostResults>) {
        self.pending = self.pending.saturating_sub(1);
        match r {
            Ok(results) => {
                let before = self.answers.len();
                self.answers.extend(results.addresses());
                trace!(
                    "lookup of {host} got {} addresses",
                    self.answers.len() - before
                );
            }
            // NODATA, NXDOMAIN, SERVFAIL and timeouts all mean not found here
            Err(e) => debug!("lookup of {host} failed: {e}"),
        }
    }
}

/// Address lookup driven by a c-ares channel.
///
/// The channel reads resolv.conf and the hosts table as set in the
/// [`ResolverContext`], and asks for each family of the resolve mode in
/// parallel. Names found in the hosts table are returned without any network
/// query. Dropping the query destroys the channel and cancels every lookup
/// still in flight.
pub struct CAresAddrQuery {
    channel: Channel,
    state: Arc<Mutex<QueryState>>,
    host: String,
    families: Vec<AddressFamily>,
    started: bool,
    retry_at: Option<Instant>,
}

impl CAresAddrQuery {
    pub(crate) fn open(
        ctx: &ResolverContext,
        host: &str,
        families: &[AddressFamily],
    ) -> io::Result<Self> {
        let state = Arc::new(Mutex::new(QueryState::default()));
        let socket_state = Arc::clone(&state);
        let channel = ctx
            .new_channel(move |socket, readable, writable| {
                trace!("c-ares socket {socket} readable: {readable} writable: {writable}");
                if let Ok(mut state) = socket_state.lock() {
                    state.update_socket(socket, readable, writable);
                }
            })
            .map_err(|e| io::Error::other(format!("failed to create c-ares channel: {e}")))?;

        Ok(CAresAddrQuery {
            channel,
            state,
            host: host.to_string(),
            families: families.to_vec(),
            started: false,
            retry_at: None,
        })
    }

    fn lock_state(&self) -> io::Result<MutexGuard<'_, QueryState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("c-ares query state poisoned"))
    }

    fn start(&mut self) -> io::Result<()> {
        self.lock_state()?.pending = self.families.len();
        for family in self.families.clone() {
            trace!("start {family} lookup of {}", self.host);
            let state = Arc::clone(&self.state);
            let host = self.host.clone();
            // hosts table hits call back before this returns
            self.channel
                .get_host_by_name(&self.host, family.into(), move |r| {
                    if let Ok(mut state) = state.lock() {
                        state.finish_lookup(&host, r);
                    }
                });
        }
        Ok(())
    }

    fn process(&mut self) -> io::Result<()> {
        let sockets = self.lock_state()?.sockets.clone();
        if sockets.is_empty() {
            // only run the timers
            self.channel.process_fd(SOCKET_BAD, SOCKET_BAD);
            return Ok(());
        }
        for s in sockets {
            let read_fd = if s.readable { s.socket } else { SOCKET_BAD };
            let write_fd = if s.writable { s.socket } else { SOCKET_BAD };
            self.channel.process_fd(read_fd, write_fd);
        }
        Ok(())
    }
}

impl AddrQuery for CAresAddrQuery {
    fn next_entry(&mut self) -> io::Result<QueryEntry> {
        if self.started {
            self.process()?;
        } else {
            self.started = true;
            self.start()?;
        }

        let mut state = self.lock_state()?;
        if let Some(ip) = state.answers.pop_front() {
            return Ok(QueryEntry::Entry(ip));
        }
        if state.pending == 0 {
            return Ok(QueryEntry::Done);
        }
        drop(state);
        self.retry_at = Some(Instant::now() + PROCESS_INTERVAL);
        Ok(QueryEntry::Again)
    }

    fn poll_fd(&self) -> RawFd {
        let Ok(state) = self.state.lock() else {
            return -1;
        };
        state
            .sockets
            .iter()
            .find(|s| s.readable)
            .or_else(|| state.sockets.first())
            .map(|s| s.socket)
            .unwrap_or(-1)
    }

    fn retry_at(&self) -> Option<Instant> {
        self.retry_at
    }
}
