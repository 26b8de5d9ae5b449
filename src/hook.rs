// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DHCP client hook input.
//!
//! dhclient-style hooks describe the event through environment variables.
//! [`HookEvent`] captures the ones that matter for publishing the host:
//!
//! | Variable              | Meaning                                  |
//! |-----------------------|------------------------------------------|
//! | `reason`              | Event, e.g. `BOUND`, `RENEW6`, `EXPIRE`  |
//! | `interface`           | Interface the event applies to           |
//! | `new_ip_address`      | Leased IPv4 address                      |
//! | `new_dhcp_lease_time` | IPv4 lease time in seconds               |
//! | `new_host_name`       | Host name offered by the server          |
//! | `new_domain_name`     | Domain (or search list) offered          |
//! | `new_fqdn_fqdn`       | FQDN from the client FQDN option         |
//! | `new_ip6_address`     | Leased IPv6 address                      |
//! | `new_preferred_life`  | IPv6 preferred lifetime                  |
//! | `new_max_life`        | IPv6 valid lifetime                      |

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{debug, info};

use crate::constants::{MAX_RECORD_TTL_SECS, UPDATE_TRIGGERING_REASONS};
use crate::errors::ConfigError;
use crate::identity::{Identity, Ipv6Origin};

/// A DHCP client event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookEvent {
    pub reason: String,
    pub interface: Option<String>,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv4_ttl: Option<u32>,
    pub ipv6: Option<Ipv6Addr>,
    pub ipv6_ttl: Option<u32>,
    pub host_name: Option<String>,
    pub domain: Option<String>,
}

impl HookEvent {
    /// Build an event from hook variables.
    ///
    /// `reason` and `interface` given on the command line override the
    /// corresponding variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an address or lifetime variable is malformed.
    pub fn from_vars<I, K, V>(
        vars: I,
        reason: Option<&str>,
        interface: Option<&str>,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string());

        let ipv4 = get("new_ip_address")
            .map(|v| parse_addr::<Ipv4Addr>(&v))
            .transpose()?;
        let ipv6 = get("new_ip6_address")
            .map(|v| parse_addr::<Ipv6Addr>(strip_prefix_len(&v)))
            .transpose()?;
        let ipv4_ttl = get("new_dhcp_lease_time")
            .map(|v| parse_lifetime(&v))
            .transpose()?
            .flatten();
        let ipv6_ttl = match get("new_preferred_life")
            .map(|v| parse_lifetime(&v))
            .transpose()?
            .flatten()
        {
            Some(ttl) => Some(ttl),
            None => get("new_max_life")
                .map(|v| parse_lifetime(&v))
                .transpose()?
                .flatten(),
        };

        // The FQDN option is authoritative over the plain host name
        let host_name = get("new_fqdn_fqdn").or_else(|| get("new_host_name"));
        // Take the first entry of a search list
        let domain = get("new_domain_name")
            .and_then(|d| d.split_whitespace().next().map(str::to_string));

        let event = Self {
            reason: reason
                .map(str::to_string)
                .or_else(|| get("reason"))
                .unwrap_or_default()
                .to_ascii_uppercase(),
            interface: interface.map(str::to_string).or_else(|| get("interface")),
            ipv4,
            ipv4_ttl,
            ipv6,
            ipv6_ttl,
            host_name,
            domain,
        };
        debug!("Hook event: {:?}", event);
        Ok(event)
    }

    /// Build an event from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an address or lifetime variable is malformed.
    pub fn from_env(reason: Option<&str>, interface: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars(), reason, interface)
    }

    /// Whether this event should publish addresses.
    ///
    /// Other reasons (`EXPIRE`, `RELEASE`, `PREINIT`, ...) end the run early.
    #[must_use]
    pub fn triggers_update(&self) -> bool {
        let triggers = UPDATE_TRIGGERING_REASONS.contains(&self.reason.as_str());
        if !triggers {
            info!(
                "Hook reason '{}' on {} does not trigger an update",
                self.reason,
                self.interface.as_deref().unwrap_or("unknown interface")
            );
        }
        triggers
    }

    /// Whether the event carried any address.
    #[must_use]
    pub fn has_addresses(&self) -> bool {
        self.ipv4.is_some() || self.ipv6.is_some()
    }

    /// Add the event's addresses to `identity`. DHCP-supplied IPv6 addresses
    /// are tagged [`Ipv6Origin::Dhcpv6`].
    pub fn apply_to(&self, identity: &mut Identity) {
        if let Some(ip) = self.ipv4 {
            identity.add_ipv4(ip, self.ipv4_ttl);
        }
        if let Some(ip) = self.ipv6 {
            identity.add_ipv6(ip, self.ipv6_ttl, Ipv6Origin::Dhcpv6);
        }
    }
}

fn parse_addr<A: std::str::FromStr>(value: &str) -> Result<A, ConfigError> {
    value.parse::<A>().map_err(|_| ConfigError::InvalidAddress {
        value: value.to_string(),
        reason: "not a valid address in hook environment".to_string(),
    })
}

fn strip_prefix_len(value: &str) -> &str {
    value.split_once('/').map_or(value, |(addr, _)| addr)
}

/// Seconds to a TTL. Zero means no lifetime; the infinite lease value is
/// clamped to the largest TTL.
fn parse_lifetime(value: &str) -> Result<Option<u32>, ConfigError> {
    let secs = value.parse::<u64>().map_err(|_| ConfigError::InvalidTtl {
        value: value.to_string(),
        reason: "lease lifetime must be a number of seconds".to_string(),
    })?;
    if secs == 0 {
        return Ok(None);
    }
    Ok(Some(
        u32::try_from(secs.min(u64::from(MAX_RECORD_TTL_SECS))).unwrap_or(MAX_RECORD_TTL_SECS),
    ))
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod hook_tests;
