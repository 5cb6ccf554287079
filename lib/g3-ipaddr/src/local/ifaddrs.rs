/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::ffi::CStr;
use std::io;
use std::marker::PhantomData;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::ptr;

/// Snapshot of the addresses of all local network interfaces.
///
/// The list returned by `getifaddrs` is released on drop.
pub struct InterfaceAddrs {
    head: *mut libc::ifaddrs,
}

impl InterfaceAddrs {
    pub fn load() -> io::Result<Self> {
        let mut head: *mut libc::ifaddrs = ptr::null_mut();
        let r = unsafe { libc::getifaddrs(&mut head) };
        if r != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(InterfaceAddrs { head })
    }

    /// Iterate over all IPv4 / IPv6 interface addresses, the port is always 0.
    pub fn iter(&self) -> InterfaceAddrIter<'_> {
        InterfaceAddrIter {
            next: self.head,
            _marker: PhantomData,
        }
    }
}

impl Drop for InterfaceAddrs {
    fn drop(&mut self) {
        if !self.head.is_null() {
            unsafe { libc::freeifaddrs(self.head) };
            self.head = ptr::null_mut();
        }
    }
}

pub struct InterfaceAddrIter<'a> {
    next: *mut libc::ifaddrs,
    _marker: PhantomData<&'a InterfaceAddrs>,
}

impl<'a> Iterator for InterfaceAddrIter<'a> {
    type Item = (&'a str, SocketAddr);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.next.is_null() {
            let ifa = unsafe { &*self.next };
            self.next = ifa.ifa_next;

            if ifa.ifa_name.is_null() || ifa.ifa_addr.is_null() {
                continue;
            }
            let Ok(name) = unsafe { CStr::from_ptr(ifa.ifa_name) }.to_str() else {
                continue;
            };
            if let Some(addr) = unsafe { sockaddr_to_std(ifa.ifa_addr) } {
                return Some((name, addr));
            }
        }
        None
    }
}

/// # Safety
///
/// `sa` should point to a valid socket address whose real size matches its family.
unsafe fn sockaddr_to_std(sa: *const libc::sockaddr) -> Option<SocketAddr> {
    let family = unsafe { (*sa).sa_family } as libc::c_int;
    match family {
        libc::AF_INET => {
            let sin = unsafe { &*(sa as *const libc::sockaddr_in) };
            let ip = Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr));
            Some(SocketAddr::V4(SocketAddrV4::new(ip, 0)))
        }
        libc::AF_INET6 => {
            let sin6 = unsafe { &*(sa as *const libc::sockaddr_in6) };
            let ip = Ipv6Addr::from(sin6.sin6_addr.s6_addr);
            Some(SocketAddr::V6(SocketAddrV6::new(
                ip,
                0,
                sin6.sin6_flowinfo,
                sin6.sin6_scope_id,
            )))
        }
        _ => None,
    }
}
