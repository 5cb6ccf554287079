/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::os::fd::RawFd;

use log::trace;
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;
use tokio::time::Instant;

use crate::AddrError;

/// Suspend the current task until `fd` becomes readable or `deadline` expires.
///
/// The fd is registered with the runtime for this wait only, so a later
/// call never reuses the readiness state of a closed or replaced fd. An
/// already expired deadline fails without registering the fd.
///
/// # Panics
///
/// Unless the deadline has already expired, panics if called outside of a
/// tokio runtime, or inside one built without the IO and time drivers (see
/// `tokio::runtime::Builder::enable_io` and `enable_time`).
pub async fn wait_readable(fd: RawFd, deadline: Option<Instant>) -> Result<(), AddrError> {
    if deadline.is_some_and(|d| d <= Instant::now()) {
        return Err(AddrError::Timeout);
    }

    let async_fd = AsyncFd::with_interest(fd, Interest::READABLE)?;
    trace!("wait for fd {fd} to be readable");
    let ready = async { async_fd.readable().await.map(|_guard| ()) };
    let r = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, ready).await {
            Ok(r) => r,
            Err(_) => return Err(AddrError::Timeout),
        },
        None => ready.await,
    };
    r.map_err(AddrError::Io)
}
