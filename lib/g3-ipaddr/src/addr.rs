/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::mem;
use std::net::{IpAddr, SocketAddr};

use socket2::SockAddr;

use crate::AddressFamily;

// the raw storage handed to the OS must hold either variant
const _: () =
    assert!(mem::size_of::<libc::sockaddr_storage>() >= mem::size_of::<libc::sockaddr_in>());
const _: () =
    assert!(mem::size_of::<libc::sockaddr_storage>() >= mem::size_of::<libc::sockaddr_in6>());

/// A resolved IPv4 or IPv6 socket address.
///
/// Values are only produced by the resolve functions of this crate, so the
/// family tag is always valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IpAddress {
    inner: SocketAddr,
}

impl IpAddress {
    /// Longest textual form of either family, without the terminating nul.
    ///
    /// Same as `INET6_ADDRSTRLEN - 1`.
    pub const MAX_STR_LEN: usize = 45;

    pub(crate) fn new(inner: SocketAddr) -> Self {
        IpAddress { inner }
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::from(&self.inner)
    }

    /// Size of the underlying `sockaddr_in` / `sockaddr_in6`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> libc::socklen_t {
        let size = match self.inner {
            SocketAddr::V4(_) => mem::size_of::<libc::sockaddr_in>(),
            SocketAddr::V6(_) => mem::size_of::<libc::sockaddr_in6>(),
        };
        size as libc::socklen_t
    }

    /// The raw socket address to be passed to `bind` / `connect`.
    pub fn sock_addr(&self) -> SockAddr {
        SockAddr::from(self.inner)
    }

    #[inline]
    pub fn socket_addr(&self) -> SocketAddr {
        self.inner
    }

    #[inline]
    pub fn ip(&self) -> IpAddr {
        self.inner.ip()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.inner.port()
    }

    #[inline]
    pub fn set_port(&mut self, port: u16) {
        self.inner.set_port(port);
    }
}

impl From<IpAddress> for SocketAddr {
    fn from(addr: IpAddress) -> Self {
        addr.inner
    }
}

impl From<&IpAddress> for SockAddr {
    fn from(addr: &IpAddress) -> Self {
        addr.sock_addr()
    }
}

/// Numeric presentation of the host part only, like `inet_ntop`.
impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            SocketAddr::V4(a) => fmt::Display::fmt(a.ip(), f),
            SocketAddr::V6(a) => fmt::Display::fmt(a.ip(), f),
        }
    }
}
