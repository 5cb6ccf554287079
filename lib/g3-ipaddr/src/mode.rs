/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use crate::AddressFamily;

/// Address family selection policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ResolveMode {
    /// Legacy default, same as [`ResolveMode::PreferIpv4`].
    #[default]
    Unspecified,
    ForceIpv4,
    ForceIpv6,
    PreferIpv4,
    PreferIpv6,
}

impl ResolveMode {
    /// Families to try, in order.
    pub fn families(&self) -> &'static [AddressFamily] {
        match self {
            ResolveMode::ForceIpv4 => &[AddressFamily::Ipv4],
            ResolveMode::ForceIpv6 => &[AddressFamily::Ipv6],
            ResolveMode::Unspecified | ResolveMode::PreferIpv4 => {
                &[AddressFamily::Ipv4, AddressFamily::Ipv6]
            }
            ResolveMode::PreferIpv6 => &[AddressFamily::Ipv6, AddressFamily::Ipv4],
        }
    }

    /// Family of the wildcard address used when binding without a name.
    pub fn wildcard_family(&self) -> AddressFamily {
        match self {
            ResolveMode::ForceIpv6 | ResolveMode::PreferIpv6 => AddressFamily::Ipv6,
            _ => AddressFamily::Ipv4,
        }
    }

    /// Pick one of the IPv4 / IPv6 candidates.
    pub fn select<T>(&self, v4: Option<T>, v6: Option<T>) -> Option<T> {
        match self {
            ResolveMode::ForceIpv4 => v4,
            ResolveMode::ForceIpv6 => v6,
            ResolveMode::Unspecified | ResolveMode::PreferIpv4 => v4.or(v6),
            ResolveMode::PreferIpv6 => v6.or(v4),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveMode::Unspecified => "unspecified",
            ResolveMode::ForceIpv4 => "ipv4",
            ResolveMode::ForceIpv6 => "ipv6",
            ResolveMode::PreferIpv4 => "prefer_ipv4",
            ResolveMode::PreferIpv6 => "prefer_ipv6",
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolveMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "unspecified" | "default" => Ok(ResolveMode::Unspecified),
            "ipv4" | "ipv4_only" | "force_ipv4" => Ok(ResolveMode::ForceIpv4),
            "ipv6" | "ipv6_only" | "force_ipv6" => Ok(ResolveMode::ForceIpv6),
            "prefer_ipv4" | "ipv4_first" => Ok(ResolveMode::PreferIpv4),
            "prefer_ipv6" | "ipv6_first" => Ok(ResolveMode::PreferIpv6),
            _ => Err(()),
        }
    }
}
