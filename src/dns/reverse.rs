// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reverse-mapping names.

use std::fmt::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::constants::{IPV4_REVERSE_SUFFIX, IPV6_REVERSE_SUFFIX};

/// Parse `input` as an IPv4 or IPv6 address literal.
#[must_use]
pub fn address_literal(input: &str) -> Option<IpAddr> {
    let trimmed = input.trim();
    // Zone ids ("fe80::1%eth0") are not part of the address
    let without_zone = trimmed.split('%').next().unwrap_or(trimmed);
    without_zone.parse().ok()
}

/// Reverse-mapping name for an address, without a trailing dot.
///
/// ```
/// use ddns_sync::dns::reverse::reverse_name;
///
/// assert_eq!(
///     reverse_name(&"198.51.100.9".parse().unwrap()),
///     "9.100.51.198.in-addr.arpa"
/// );
/// ```
#[must_use]
pub fn reverse_name(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => reverse_name_v4(v4),
        IpAddr::V6(v6) => reverse_name_v6(v6),
    }
}

fn reverse_name_v4(ip: &Ipv4Addr) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{d}.{c}.{b}.{a}.{IPV4_REVERSE_SUFFIX}")
}

fn reverse_name_v6(ip: &Ipv6Addr) -> String {
    let mut name = String::with_capacity(72);
    for byte in ip.octets().iter().rev() {
        // Low nibble first, since the whole address is reversed nibble-wise
        let _ = write!(name, "{:x}.{:x}.", byte & 0x0f, byte >> 4);
    }
    name.push_str(IPV6_REVERSE_SUFFIX);
    name
}

#[cfg(test)]
#[path = "reverse_tests.rs"]
mod reverse_tests;
