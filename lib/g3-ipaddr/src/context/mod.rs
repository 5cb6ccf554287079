/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use c_ares::{Channel, Options, Socket};
use thiserror::Error;

mod config;
pub use config::ResolverContextConfig;

#[cfg(feature = "yaml")]
mod yaml;

use crate::{AddressFamily, CAresAddrQuery};

#[derive(Error, Debug)]
pub enum ResolverContextError {
    #[error("path {} is not valid utf-8", .0.display())]
    InvalidPath(PathBuf),
    #[error("failed to init c-ares channel: {0}")]
    Init(#[from] c_ares::Error),
}

/// DNS configuration shared by all remote resolutions.
///
/// The system files (resolv.conf and the hosts table) are read by c-ares
/// each time a query is opened, the explicit settings here override what
/// they contain. The context is read only once built, so one value can be
/// shared (e.g. in an `Arc`) by all tasks of the process.
#[derive(Clone, Debug)]
pub struct ResolverContext {
    config: ResolverContextConfig,
    resolv_conf: Option<String>,
    hosts: Option<String>,
}

impl ResolverContext {
    /// Load the context from the system configuration files.
    pub fn load_local() -> Result<Self, ResolverContextError> {
        ResolverContextConfig::default().build()
    }

    #[inline]
    pub fn resolv_conf_path(&self) -> Option<&str> {
        self.resolv_conf.as_deref()
    }

    #[inline]
    pub fn hosts_path(&self) -> Option<&str> {
        self.hosts.as_deref()
    }

    /// Name servers to query instead of the ones in resolv.conf.
    #[inline]
    pub fn hints(&self) -> &[SocketAddr] {
        &self.config.servers
    }

    /// Start an address lookup for `host`, asking for each of `families`.
    pub fn open_query(
        &self,
        host: &str,
        families: &[AddressFamily],
    ) -> io::Result<CAresAddrQuery> {
        CAresAddrQuery::open(self, host, families)
    }

    pub(crate) fn new_channel<F>(&self, socket_state: F) -> c_ares::Result<Channel>
    where
        F: FnMut(Socket, bool, bool) + Send + 'static,
    {
        let config = &self.config;

        let mut opts = Options::new();
        opts.set_socket_state_callback(socket_state);
        if let Some(timeout) = config.timeout {
            let ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            opts.set_timeout(ms);
        }
        if let Some(attempts) = config.attempts {
            opts.set_tries(u32::try_from(attempts).unwrap_or(u32::MAX));
        }
        if let Some(ndots) = config.ndots {
            opts.set_ndots(u32::try_from(ndots).unwrap_or(u32::MAX));
        }
        if let Some(search) = &config.search {
            let domains: Vec<&str> = search.iter().map(String::as_str).collect();
            opts.set_domains(&domains);
        }
        if config.rotate {
            opts.set_rotate();
        }
        if let Some(path) = &self.resolv_conf {
            opts.set_resolvconf_path(path);
        }
        if let Some(path) = &self.hosts {
            opts.set_hosts_path(path);
        }

        let mut channel = Channel::with_options(opts)?;
        if !config.servers.is_empty() {
            let servers: Vec<String> = config.servers.iter().map(|s| s.to_string()).collect();
            let servers: Vec<&str> = servers.iter().map(String::as_str).collect();
            channel.set_servers(&servers)?;
        }
        Ok(channel)
    }
}
