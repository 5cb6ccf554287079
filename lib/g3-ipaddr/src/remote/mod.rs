/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use log::debug;
use tokio::time::Instant;

use crate::literal::parse_ip;
use crate::{AddrError, IpAddress, ResolveMode, ResolverContext, checked_port};

mod query;
pub use query::{AddrQuery, CAresAddrQuery, QueryEntry};

mod wait;
pub use wait::wait_readable;

/// Resolve `host` to a single address, querying DNS if it is not a literal.
///
/// Literal addresses are returned without any lookup, even if `deadline` has
/// already passed. Otherwise the current task is suspended until the query
/// ends or `deadline` is reached, and the query is always closed on return.
///
/// # Panics
///
/// A lookup panics if it runs outside of a tokio runtime, or inside one
/// built without the IO and time drivers (see
/// `tokio::runtime::Builder::enable_io` and `enable_time`).
pub async fn resolve_remote<P: TryInto<u16>>(
    ctx: &ResolverContext,
    host: &str,
    port: P,
    mode: ResolveMode,
    deadline: Option<Instant>,
) -> Result<IpAddress, AddrError> {
    let port = checked_port(port)?;
    if host.is_empty() {
        return Err(AddrError::InvalidArgument("empty host"));
    }

    if let Some(ip) = parse_ip(host, mode) {
        return Ok(IpAddress::new(SocketAddr::new(ip, port)));
    }
    if IpAddr::from_str(host).is_ok() {
        // a literal of a family excluded by mode, no lookup would change that
        return Err(AddrError::AddressNotAvailable);
    }

    debug!("start remote resolution of {host} in mode {mode}");
    let query = ctx.open_query(host, mode.families())?;
    let ip = drive_query(query, mode, deadline).await?;
    debug!("{host} resolved to {ip}");
    Ok(IpAddress::new(SocketAddr::new(ip, port)))
}

/// Suspend until `deadline` when the query has no fd to wait on.
async fn wait_time(deadline: Option<Instant>) -> Result<(), AddrError> {
    let Some(deadline) = deadline else {
        return Err(AddrError::Io(io::Error::other(
            "address query has neither fd nor retry time",
        )));
    };
    if deadline <= Instant::now() {
        return Err(AddrError::Timeout);
    }
    tokio::time::sleep_until(deadline).await;
    Err(AddrError::Timeout)
}

pub(crate) async fn drive_query<Q: AddrQuery>(
    mut query: Q,
    mode: ResolveMode,
    deadline: Option<Instant>,
) -> Result<IpAddr, AddrError> {
    let mut v4: Option<Ipv4Addr> = None;
    let mut v6: Option<Ipv6Addr> = None;

    loop {
        match query.next_entry() {
            Ok(QueryEntry::Entry(IpAddr::V4(ip))) => {
                if v4.is_none() {
                    v4 = Some(ip);
                }
            }
            Ok(QueryEntry::Entry(IpAddr::V6(ip))) => {
                if v6.is_none() {
                    v6 = Some(ip);
                }
            }
            Ok(QueryEntry::Again) => {
                let wait_until = match (deadline, query.retry_at()) {
                    (Some(d), Some(r)) => Some(d.min(r)),
                    (d, r) => d.or(r),
                };
                let fd = query.poll_fd();
                let waited = if fd >= 0 {
                    wait_readable(fd, wait_until).await
                } else {
                    wait_time(wait_until).await
                };
                match waited {
                    Ok(_) => {}
                    Err(AddrError::Timeout) => {
                        if deadline.is_some_and(|d| d <= Instant::now()) {
                            return Err(AddrError::Timeout);
                        }
                        // poll again so the query can run its retransmission timers
                    }
                    Err(e) => return Err(e),
                }
                continue;
            }
            Ok(QueryEntry::Done) => break,
            Err(e) => {
                // treated the same as no more entries
                debug!("address query failed: {e}");
                break;
            }
        }
        if v4.is_some() && v6.is_some() {
            break;
        }
    }
    drop(query);

    mode.select(v4.map(Into::into), v6.map(Into::into))
        .ok_or(AddrError::AddressNotAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;
    use std::net::UdpSocket;
    use std::os::fd::{AsRawFd, RawFd};
    use std::path::Path;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::ResolverContextConfig;

    struct FakeQuery {
        steps: VecDeque<io::Result<QueryEntry>>,
        socket: Option<UdpSocket>,
        retry_at: Option<Instant>,
        polled: usize,
    }

    impl FakeQuery {
        fn new(steps: Vec<io::Result<QueryEntry>>) -> Self {
            FakeQuery {
                steps: steps.into(),
                socket: Some(UdpSocket::bind("127.0.0.1:0").unwrap()),
                retry_at: None,
                polled: 0,
            }
        }
    }

    impl AddrQuery for FakeQuery {
        fn next_entry(&mut self) -> io::Result<QueryEntry> {
            self.polled += 1;
            self.steps.pop_front().unwrap_or(Ok(QueryEntry::Done))
        }

        fn poll_fd(&self) -> RawFd {
            self.socket.as_ref().map(|s| s.as_raw_fd()).unwrap_or(-1)
        }

        fn retry_at(&self) -> Option<Instant> {
            self.retry_at
        }
    }

    fn v4() -> IpAddr {
        IpAddr::from_str("192.0.2.1").unwrap()
    }

    fn v6() -> IpAddr {
        IpAddr::from_str("2001:db8::1").unwrap()
    }

    fn both() -> Vec<io::Result<QueryEntry>> {
        vec![
            Ok(QueryEntry::Entry(v6())),
            Ok(QueryEntry::Entry(IpAddr::from_str("2001:db8::2").unwrap())),
            Ok(QueryEntry::Entry(v4())),
            Ok(QueryEntry::Done),
        ]
    }

    #[tokio::test]
    async fn select_by_mode() {
        let ip = drive_query(FakeQuery::new(both()), ResolveMode::PreferIpv4, None)
            .await
            .unwrap();
        assert_eq!(ip, v4());
        let ip = drive_query(FakeQuery::new(both()), ResolveMode::PreferIpv6, None)
            .await
            .unwrap();
        assert_eq!(ip, v6());
        let ip = drive_query(FakeQuery::new(both()), ResolveMode::Unspecified, None)
            .await
            .unwrap();
        assert_eq!(ip, v4());

        let only_v6 = vec![Ok(QueryEntry::Entry(v6()))];
        let r = drive_query(FakeQuery::new(only_v6), ResolveMode::ForceIpv4, None).await;
        assert!(matches!(r, Err(AddrError::AddressNotAvailable)));
        let only_v6 = vec![Ok(QueryEntry::Entry(v6()))];
        let ip = drive_query(FakeQuery::new(only_v6), ResolveMode::PreferIpv4, None)
            .await
            .unwrap();
        assert_eq!(ip, v6());
    }

    #[tokio::test]
    async fn stop_when_both_found() {
        let mut steps = both();
        steps.insert(3, Err(io::Error::other("should not be polled")));
        let mut query = FakeQuery::new(steps);
        let ip = drive_query(&mut query, ResolveMode::ForceIpv6, None)
            .await
            .unwrap();
        assert_eq!(ip, v6());
        assert_eq!(query.polled, 3);
    }

    #[tokio::test]
    async fn error_as_not_found() {
        let steps = vec![
            Ok(QueryEntry::Entry(v4())),
            Err(io::Error::other("server failure")),
        ];
        let ip = drive_query(FakeQuery::new(steps), ResolveMode::PreferIpv6, None)
            .await
            .unwrap();
        assert_eq!(ip, v4());

        let steps = vec![Err(io::Error::other("server failure"))];
        let r = drive_query(FakeQuery::new(steps), ResolveMode::PreferIpv6, None).await;
        assert!(matches!(r, Err(AddrError::AddressNotAvailable)));
    }

    #[tokio::test]
    async fn wait_and_timeout() {
        let steps = vec![Ok(QueryEntry::Again)];
        let deadline = Instant::now() + Duration::from_millis(30);
        let r = drive_query(FakeQuery::new(steps), ResolveMode::PreferIpv4, Some(deadline)).await;
        assert!(matches!(r, Err(AddrError::Timeout)));

        let steps = vec![Ok(QueryEntry::Again)];
        let r = drive_query(FakeQuery::new(steps), ResolveMode::PreferIpv4, Some(Instant::now()))
            .await;
        assert!(matches!(r, Err(AddrError::Timeout)));
    }

    #[tokio::test]
    async fn poll_again_at_retry_time() {
        let steps = vec![
            Ok(QueryEntry::Again),
            Ok(QueryEntry::Again),
            Ok(QueryEntry::Entry(v4())),
        ];
        let mut query = FakeQuery::new(steps);
        query.retry_at = Some(Instant::now() + Duration::from_millis(10));
        let deadline = Instant::now() + Duration::from_secs(5);
        let ip = drive_query(&mut query, ResolveMode::PreferIpv4, Some(deadline))
            .await
            .unwrap();
        assert_eq!(ip, v4());
        assert_eq!(query.polled, 4);
    }

    #[tokio::test]
    async fn wait_without_fd() {
        let steps = vec![Ok(QueryEntry::Again), Ok(QueryEntry::Entry(v6()))];
        let mut query = FakeQuery::new(steps);
        query.socket = None;
        query.retry_at = Some(Instant::now() + Duration::from_millis(10));
        let ip = drive_query(&mut query, ResolveMode::PreferIpv4, None)
            .await
            .unwrap();
        assert_eq!(ip, v6());

        let mut query = FakeQuery::new(vec![Ok(QueryEntry::Again)]);
        query.socket = None;
        let deadline = Instant::now() + Duration::from_millis(10);
        let r = drive_query(&mut query, ResolveMode::PreferIpv4, Some(deadline)).await;
        assert!(matches!(r, Err(AddrError::Timeout)));

        let mut query = FakeQuery::new(vec![Ok(QueryEntry::Again)]);
        query.socket = None;
        let r = drive_query(&mut query, ResolveMode::PreferIpv4, None).await;
        assert!(matches!(r, Err(AddrError::Io(_))));
    }

    fn context(dir: &Path, hosts: &str) -> ResolverContext {
        let hosts_path = dir.join("hosts");
        fs::write(&hosts_path, hosts).unwrap();
        let mut config = ResolverContextConfig::default();
        config.set_resolv_conf_path(dir.join("resolv.conf"));
        config.set_hosts_path(hosts_path);
        // nothing listens here, any network query would time out
        config.add_server_str("127.0.0.1:9").unwrap();
        config.build().unwrap()
    }

    #[tokio::test]
    async fn literal_without_lookup() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), "");

        let addr = resolve_remote(
            &ctx,
            "127.0.0.1",
            80,
            ResolveMode::Unspecified,
            Some(Instant::now()),
        )
        .await
        .unwrap();
        assert_eq!(addr.socket_addr(), SocketAddr::from_str("127.0.0.1:80").unwrap());

        let r = resolve_remote(&ctx, "::1", 80, ResolveMode::ForceIpv4, None).await;
        assert!(matches!(r, Err(AddrError::AddressNotAvailable)));
    }

    #[tokio::test]
    async fn invalid_argument() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), "");
        let r = resolve_remote(&ctx, "", 80, ResolveMode::Unspecified, None).await;
        assert!(matches!(r, Err(AddrError::InvalidArgument(_))));
        let r = resolve_remote(&ctx, "localhost", 70000, ResolveMode::Unspecified, None).await;
        assert!(matches!(r, Err(AddrError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn from_host_table() {
        let dir = TempDir::new().unwrap();
        let ctx = context(
            dir.path(),
            "2001:db8::1 db.example.net\n192.0.2.1 db.example.net\n",
        );
        let addr = resolve_remote(&ctx, "db.example.net", 5432, ResolveMode::PreferIpv6, None)
            .await
            .unwrap();
        assert_eq!(addr.ip(), v6());
        assert_eq!(addr.port(), 5432);

        let addr = resolve_remote(&ctx, "db.example.net", 5432, ResolveMode::ForceIpv4, None)
            .await
            .unwrap();
        assert_eq!(addr.ip(), v4());
    }
}
