/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use crate::{AddrError, AddressFamily, IpAddress, ResolveMode};

fn parse_family(text: &str, family: AddressFamily) -> Option<IpAddr> {
    match family {
        AddressFamily::Ipv4 => Ipv4Addr::from_str(text).ok().map(IpAddr::V4),
        AddressFamily::Ipv6 => Ipv6Addr::from_str(text).ok().map(IpAddr::V6),
    }
}

pub(crate) fn parse_ip(text: &str, mode: ResolveMode) -> Option<IpAddr> {
    mode.families()
        .iter()
        .find_map(|family| parse_family(text, *family))
}

/// Parse a numeric IPv4 / IPv6 address, trying the families allowed by `mode`
/// in its preferred order.
pub fn parse_literal<P: TryInto<u16>>(
    text: &str,
    port: P,
    mode: ResolveMode,
) -> Result<IpAddress, AddrError> {
    let port = crate::checked_port(port)?;
    let ip = parse_ip(text, mode).ok_or(AddrError::InvalidArgument("not a literal address"))?;
    Ok(IpAddress::new(SocketAddr::new(ip, port)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_quad() {
        for s in ["0.0.0.0", "127.0.0.1", "192.168.10.254", "255.255.255.255"] {
            let addr = parse_literal(s, 80, ResolveMode::Unspecified).unwrap();
            assert_eq!(addr.family(), AddressFamily::Ipv4);
            assert_eq!(addr.port(), 80);
            assert_eq!(addr.to_string(), s);
        }
    }

    #[test]
    fn colon_form() {
        for s in ["::", "::1", "fe80::1", "2001:db8:0:1::53", "::ffff:10.0.0.1"] {
            let addr = parse_literal(s, 53, ResolveMode::ForceIpv6).unwrap();
            assert_eq!(addr.family(), AddressFamily::Ipv6);
            assert_eq!(addr.port(), 53);

            let e = parse_literal(s, 53, ResolveMode::ForceIpv4).unwrap_err();
            assert!(matches!(e, AddrError::InvalidArgument(_)));

            let addr = parse_literal(s, 53, ResolveMode::PreferIpv4).unwrap();
            assert_eq!(addr.family(), AddressFamily::Ipv6);
        }
    }

    #[test]
    fn force_ipv6_rejects_ipv4() {
        let e = parse_literal("10.1.1.1", 80, ResolveMode::ForceIpv6).unwrap_err();
        assert!(matches!(e, AddrError::InvalidArgument(_)));

        let addr = parse_literal("10.1.1.1", 80, ResolveMode::PreferIpv6).unwrap();
        assert_eq!(addr.family(), AddressFamily::Ipv4);
    }

    #[test]
    fn not_literal() {
        for s in ["", "localhost", "1.2.3", "1.2.3.4.5", "01.2.3.4", "fe80::1%lo", "[::1]"] {
            for mode in [
                ResolveMode::Unspecified,
                ResolveMode::ForceIpv4,
                ResolveMode::ForceIpv6,
                ResolveMode::PreferIpv4,
                ResolveMode::PreferIpv6,
            ] {
                let e = parse_literal(s, 80, mode).unwrap_err();
                assert!(matches!(e, AddrError::InvalidArgument(_)), "{s} {mode}");
            }
        }
    }

    #[test]
    fn port_range() {
        for mode in [
            ResolveMode::Unspecified,
            ResolveMode::ForceIpv4,
            ResolveMode::ForceIpv6,
            ResolveMode::PreferIpv4,
            ResolveMode::PreferIpv6,
        ] {
            assert!(matches!(
                parse_literal("127.0.0.1", -1, mode),
                Err(AddrError::InvalidArgument(_))
            ));
            assert!(matches!(
                parse_literal("::1", 65536, mode),
                Err(AddrError::InvalidArgument(_))
            ));
        }
        let addr = parse_literal("127.0.0.1", 65535u32, ResolveMode::ForceIpv4).unwrap();
        assert_eq!(addr.port(), 65535);
        let addr = parse_literal("127.0.0.1", 0i64, ResolveMode::ForceIpv4).unwrap();
        assert_eq!(addr.port(), 0);
    }
}
