/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::SocketAddr;

use socket2::Domain;

/// The family tag carried by every resolved [`IpAddress`](crate::IpAddress).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// The `sa_family` value found in the raw sockaddr of this family.
    pub fn as_raw(&self) -> libc::sa_family_t {
        match self {
            AddressFamily::Ipv4 => libc::AF_INET as libc::sa_family_t,
            AddressFamily::Ipv6 => libc::AF_INET6 as libc::sa_family_t,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AddressFamily> for Domain {
    fn from(v: AddressFamily) -> Self {
        match v {
            AddressFamily::Ipv4 => Domain::IPV4,
            AddressFamily::Ipv6 => Domain::IPV6,
        }
    }
}

// A records for IPv4, AAAA records for IPv6
impl From<AddressFamily> for c_ares::AddressFamily {
    fn from(v: AddressFamily) -> Self {
        match v {
            AddressFamily::Ipv4 => c_ares::AddressFamily::INET,
            AddressFamily::Ipv6 => c_ares::AddressFamily::INET6,
        }
    }
}

impl From<&SocketAddr> for AddressFamily {
    fn from(addr: &SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(_) => AddressFamily::Ipv4,
            SocketAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}
