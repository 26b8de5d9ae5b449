// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Address discovery for runs without explicit or DHCP-supplied addresses.
//!
//! The reconciler never parses command output. Discovery backends return a
//! structured [`DiscoveredInterface`]; [`IpCommandDiscovery`] builds one from
//! iproute2's one-line output.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::net::IpAddr;
use tracing::debug;

use crate::constants::IP_BINARY;
use crate::identity::{Identity, Ipv6Origin};

/// A publishable address found on an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredAddress {
    pub ip: IpAddr,
    pub prefix_len: u8,
    pub origin: Ipv6Origin,
}

/// An interface and its publishable addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredInterface {
    pub name: String,
    pub addresses: Vec<DiscoveredAddress>,
}

impl DiscoveredInterface {
    /// Add every discovered address to `identity`, without a lease TTL.
    pub fn apply_to(&self, identity: &mut Identity) {
        for address in &self.addresses {
            identity.add_address(address.ip, None, address.origin);
        }
    }
}

/// Finds the interface to publish and its addresses.
#[async_trait]
pub trait AddressDiscovery: Send + Sync {
    /// Discover addresses on `interface`, or on the default-route interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform tooling fails or no interface is found.
    async fn discover(&self, interface: Option<&str>) -> Result<DiscoveredInterface>;
}

/// Linux discovery through `ip -o`.
#[derive(Debug, Clone)]
pub struct IpCommandDiscovery {
    binary: String,
}

impl Default for IpCommandDiscovery {
    fn default() -> Self {
        Self {
            binary: IP_BINARY.to_string(),
        }
    }
}

impl IpCommandDiscovery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!("Running {} {}", self.binary, args.join(" "));
        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.binary))?;
        if !output.status.success() {
            anyhow::bail!(
                "{} {} failed: {}",
                self.binary,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn default_interface(&self) -> Result<String> {
        for family in ["-4", "-6"] {
            let routes = self.run(&[family, "-o", "route", "show", "default"]).await?;
            if let Some(dev) = parse_default_route(&routes) {
                return Ok(dev);
            }
        }
        anyhow::bail!("No default route found")
    }
}

#[async_trait]
impl AddressDiscovery for IpCommandDiscovery {
    async fn discover(&self, interface: Option<&str>) -> Result<DiscoveredInterface> {
        let name = match interface {
            Some(name) => name.to_string(),
            None => self.default_interface().await?,
        };
        let listing = self
            .run(&["-o", "addr", "show", "dev", &name, "scope", "global"])
            .await?;
        let addresses = parse_addresses(&listing);
        debug!("Discovered {} address(es) on {}", addresses.len(), name);
        Ok(DiscoveredInterface { name, addresses })
    }
}

/// Fixed addresses, for callers that already know them.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    interface: DiscoveredInterface,
}

impl StaticDiscovery {
    #[must_use]
    pub fn new(interface: DiscoveredInterface) -> Self {
        Self { interface }
    }
}

#[async_trait]
impl AddressDiscovery for StaticDiscovery {
    async fn discover(&self, _interface: Option<&str>) -> Result<DiscoveredInterface> {
        Ok(self.interface.clone())
    }
}

/// Interface of the first `default ... dev IFACE` route.
#[must_use]
pub fn parse_default_route(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.trim_start().starts_with("default"))
        .find_map(|line| {
            let mut words = line.split_whitespace();
            words.find(|w| *w == "dev")?;
            words.next().map(str::to_string)
        })
}

/// Publishable addresses from `ip -o addr show` output.
///
/// Temporary, deprecated, tentative, link-local, loopback and unique-local
/// addresses are skipped. A `/128` IPv6 address came from DHCPv6; anything
/// else from SLAAC.
#[must_use]
pub fn parse_addresses(output: &str) -> Vec<DiscoveredAddress> {
    let mut addresses = Vec::new();

    for line in output.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(pos) = words.iter().position(|w| *w == "inet" || *w == "inet6") else {
            continue;
        };
        let Some((addr, prefix)) = words.get(pos + 1).and_then(|c| c.split_once('/')) else {
            continue;
        };
        let (Ok(ip), Ok(prefix_len)) = (addr.parse::<IpAddr>(), prefix.parse::<u8>()) else {
            continue;
        };

        if words
            .iter()
            .any(|w| matches!(*w, "temporary" | "deprecated" | "tentative" | "dadfailed"))
        {
            debug!("Skipping {} ({})", ip, line.trim());
            continue;
        }
        if !is_publishable(&ip) {
            debug!("Skipping non-global address {}", ip);
            continue;
        }

        let origin = match ip {
            IpAddr::V6(_) if prefix_len == 128 => Ipv6Origin::Dhcpv6,
            _ => Ipv6Origin::Slaac,
        };
        addresses.push(DiscoveredAddress {
            ip,
            prefix_len,
            origin,
        });
    }

    addresses
}

fn is_publishable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => !(v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            let link_local = first & 0xffc0 == 0xfe80;
            let unique_local = first & 0xfe00 == 0xfc00;
            !(v6.is_loopback() || v6.is_unspecified() || link_local || unique_local)
        }
    }
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod discovery_tests;
