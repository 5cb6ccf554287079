/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;

use super::{ResolverContext, ResolverContextError};

const DNS_PORT: u16 = 53;

/// Settings for a [`ResolverContext`].
///
/// Every field left unset takes the value from resolv.conf, or the c-ares
/// default if resolv.conf has none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolverContextConfig {
    pub(super) resolv_conf: Option<PathBuf>,
    pub(super) hosts: Option<PathBuf>,
    pub(super) servers: Vec<SocketAddr>,
    pub(super) search: Option<Vec<String>>,
    pub(super) timeout: Option<Duration>,
    pub(super) attempts: Option<usize>,
    pub(super) ndots: Option<usize>,
    pub(super) rotate: bool,
}

impl ResolverContextConfig {
    pub fn set_resolv_conf_path<P: AsRef<Path>>(&mut self, path: P) {
        self.resolv_conf = Some(path.as_ref().to_path_buf());
    }

    pub fn set_hosts_path<P: AsRef<Path>>(&mut self, path: P) {
        self.hosts = Some(path.as_ref().to_path_buf());
    }

    /// Query this server instead of the ones in resolv.conf.
    pub fn add_server(&mut self, addr: SocketAddr) {
        if !self.servers.contains(&addr) {
            self.servers.push(addr);
        }
    }

    /// Parse "ip", "ip:port" or "[ipv6]:port".
    pub fn add_server_str(&mut self, s: &str) -> anyhow::Result<()> {
        let s = s.trim();
        let addr = if let Ok(addr) = SocketAddr::from_str(s) {
            addr
        } else if let Ok(ip) = IpAddr::from_str(s) {
            SocketAddr::new(ip, DNS_PORT)
        } else {
            return Err(anyhow!("invalid name server address {s}"));
        };
        self.add_server(addr);
        Ok(())
    }

    /// Search suffixes used instead of the ones in resolv.conf.
    pub fn add_search_domain(&mut self, domain: &str) -> anyhow::Result<()> {
        let domain = domain.trim().trim_end_matches('.');
        if domain.is_empty() || domain.contains(char::is_whitespace) {
            return Err(anyhow!("invalid search domain {domain}"));
        }
        let search = self.search.get_or_insert_with(Vec::new);
        if !search.iter().any(|d| d.eq_ignore_ascii_case(domain)) {
            search.push(domain.to_string());
        }
        Ok(())
    }

    /// Timeout of the first try, c-ares doubles it on each retry round.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn set_attempts(&mut self, attempts: usize) {
        self.attempts = Some(attempts.max(1));
    }

    pub fn set_ndots(&mut self, ndots: usize) {
        self.ndots = Some(ndots);
    }

    /// Pick name servers round robin instead of always starting from the first.
    pub fn set_rotate(&mut self, rotate: bool) {
        self.rotate = rotate;
    }

    pub fn build(&self) -> Result<ResolverContext, ResolverContextError> {
        let resolv_conf = self.resolv_conf.as_deref().map(utf8_path).transpose()?;
        let hosts = self.hosts.as_deref().map(utf8_path).transpose()?;

        let ctx = ResolverContext {
            config: self.clone(),
            resolv_conf,
            hosts,
        };
        // fail early on a broken environment instead of on the first query
        ctx.new_channel(|_, _, _| {})?;
        Ok(ctx)
    }
}

fn utf8_path(path: &Path) -> Result<String, ResolverContextError> {
    path.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ResolverContextError::InvalidPath(path.to_path_buf()))
}
