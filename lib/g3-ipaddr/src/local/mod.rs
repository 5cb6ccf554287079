/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use log::debug;

use crate::{AddrError, AddressFamily, IpAddress, ResolveMode};

mod ifaddrs;
pub use ifaddrs::InterfaceAddrs;

fn wildcard(port: u16, mode: ResolveMode) -> IpAddress {
    let ip = match mode.wildcard_family() {
        AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    IpAddress::new(SocketAddr::new(ip, port))
}

/// Find the address of interface `name` that `mode` selects.
///
/// Interfaces commonly carry several addresses of one family (secondary
/// IPv4 addresses, IPv6 link local plus global). The first one reported for
/// each family is used and the others are skipped, never an error.
fn select_interface_addr<'a, I>(addrs: I, name: &str, mode: ResolveMode) -> Option<SocketAddr>
where
    I: IntoIterator<Item = (&'a str, SocketAddr)>,
{
    let mut v4: Option<SocketAddr> = None;
    let mut v6: Option<SocketAddr> = None;
    for (if_name, addr) in addrs {
        if if_name != name {
            continue;
        }
        let slot = match addr {
            SocketAddr::V4(_) => &mut v4,
            SocketAddr::V6(_) => &mut v6,
        };
        if let Some(first) = slot {
            debug!(
                "interface {name} has more than one address of the same family, \
                 keep {first}, skip {addr}"
            );
            continue;
        }
        *slot = Some(addr);
        if v4.is_some() && v6.is_some() {
            break;
        }
    }
    mode.select(v4, v6)
}

/// Resolve a local address to bind to.
///
/// Without a name the wildcard address of the family implied by `mode` is
/// returned. Otherwise the name is parsed as a literal address first, and
/// then looked up as the name of a local network interface.
pub fn resolve_local<P: TryInto<u16>>(
    name: Option<&str>,
    port: P,
    mode: ResolveMode,
) -> Result<IpAddress, AddrError> {
    let port = crate::checked_port(port)?;
    let Some(name) = name else {
        return Ok(wildcard(port, mode));
    };
    if let Some(ip) = crate::literal::parse_ip(name, mode) {
        return Ok(IpAddress::new(SocketAddr::new(ip, port)));
    }

    debug!("{name} is not a literal address, try it as a local interface name");
    let ifaddrs = InterfaceAddrs::load()?;
    let mut addr = select_interface_addr(ifaddrs.iter(), name, mode)
        .ok_or_else(|| AddrError::NoSuchDevice(name.to_string()))?;
    addr.set_port(port);
    Ok(IpAddress::new(addr))
}
