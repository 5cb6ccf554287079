/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Resolve endpoint descriptions into family tagged socket addresses.
//!
//! An endpoint may be given as a literal IPv4 / IPv6 address, a local
//! network interface name (for binding), or a host name (for connecting).
//! The selection between IPv4 and IPv6 results is driven by [`ResolveMode`].

mod error;
pub use error::AddrError;

mod family;
pub use family::AddressFamily;

mod addr;
pub use addr::IpAddress;

mod mode;
pub use mode::ResolveMode;

mod literal;
pub use literal::parse_literal;

mod local;
pub use local::{InterfaceAddrs, resolve_local};

pub mod context;
pub use context::{ResolverContext, ResolverContextConfig, ResolverContextError};

mod remote;
pub use remote::{AddrQuery, CAresAddrQuery, QueryEntry, resolve_remote, wait_readable};

pub(crate) fn checked_port<P: TryInto<u16>>(port: P) -> Result<u16, AddrError> {
    port.try_into()
        .map_err(|_| AddrError::InvalidArgument("port out of range"))
}
