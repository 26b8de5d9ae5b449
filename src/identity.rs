// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Host identity: the name and addresses that DNS should publish.

use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::{info, warn};

use crate::constants::{MIN_FQDN_LABELS, RESERVED_LOCAL_SUFFIX};
use crate::errors::IdentityError;

/// How an IPv6 address was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ipv6Origin {
    /// Assigned by a DHCPv6 server
    Dhcpv6,
    /// Stateless address autoconfiguration
    Slaac,
}

/// A desired address with the TTL derived from its lease, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressEntry<A> {
    pub ip: A,
    pub ttl: Option<u32>,
}

/// A desired IPv6 address tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipv6Entry {
    pub ip: Ipv6Addr,
    pub ttl: Option<u32>,
    pub origin: Ipv6Origin,
}

/// Validated host identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    fqdn: String,
    v4: Vec<AddressEntry<Ipv4Addr>>,
    v6: Vec<Ipv6Entry>,
}

impl Identity {
    /// Build an identity from a validated FQDN and no addresses.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] if the FQDN is not publishable.
    pub fn new(fqdn: &str) -> Result<Self, IdentityError> {
        Ok(Self {
            fqdn: validate_fqdn(fqdn)?,
            v4: Vec::new(),
            v6: Vec::new(),
        })
    }

    /// Build an identity from a host name and an optional domain.
    ///
    /// A host name that already contains a dot is taken as fully qualified when
    /// no domain is given.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] if no FQDN can be formed or it is not publishable.
    pub fn from_parts(host: &str, domain: Option<&str>) -> Result<Self, IdentityError> {
        let host = host.trim().trim_end_matches('.');
        if host.is_empty() {
            return Err(IdentityError::MissingHostName);
        }
        let domain = domain
            .map(|d| d.trim().trim_matches('.'))
            .filter(|d| !d.is_empty());

        let fqdn = match domain {
            // A qualified host name already inside the domain is left alone
            Some(d) if host.ends_with(&format!(".{d}")) => host.to_string(),
            Some(d) => {
                let short = host.split('.').next().unwrap_or(host);
                format!("{short}.{d}")
            }
            None if host.contains('.') => host.to_string(),
            None => {
                return Err(IdentityError::MissingDomain {
                    host: host.to_string(),
                })
            }
        };

        Self::new(&fqdn)
    }

    /// Add an IPv4 address, ignoring duplicates.
    pub fn add_ipv4(&mut self, ip: Ipv4Addr, ttl: Option<u32>) {
        if !self.v4.iter().any(|e| e.ip == ip) {
            self.v4.push(AddressEntry { ip, ttl });
        }
    }

    /// Add an IPv6 address, ignoring duplicates.
    pub fn add_ipv6(&mut self, ip: Ipv6Addr, ttl: Option<u32>, origin: Ipv6Origin) {
        if !self.v6.iter().any(|e| e.ip == ip) {
            self.v6.push(Ipv6Entry { ip, ttl, origin });
        }
    }

    /// Add an address of either family.
    pub fn add_address(&mut self, ip: IpAddr, ttl: Option<u32>, origin: Ipv6Origin) {
        match ip {
            IpAddr::V4(v4) => self.add_ipv4(v4, ttl),
            IpAddr::V6(v6) => self.add_ipv6(v6, ttl, origin),
        }
    }

    /// Fully qualified name, without a trailing dot.
    #[must_use]
    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    /// First label of the FQDN.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.fqdn.split('.').next().unwrap_or(&self.fqdn)
    }

    /// Everything after the first label.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.fqdn.split_once('.').map_or("", |(_, d)| d)
    }

    /// Desired IPv4 addresses in insertion order.
    #[must_use]
    pub fn ipv4(&self) -> &[AddressEntry<Ipv4Addr>] {
        &self.v4
    }

    /// Desired IPv6 addresses, DHCPv6-assigned first, then SLAAC, each in insertion order.
    #[must_use]
    pub fn ipv6(&self) -> Vec<&Ipv6Entry> {
        let dhcp = self.v6.iter().filter(|e| e.origin == Ipv6Origin::Dhcpv6);
        let slaac = self.v6.iter().filter(|e| e.origin == Ipv6Origin::Slaac);
        dhcp.chain(slaac).collect()
    }

    /// The single IPv6 address to use when only one is wanted.
    ///
    /// DHCPv6 addresses win over SLAAC; ties go to the first one added. More
    /// than one candidate is reported as a notice.
    #[must_use]
    pub fn primary_ipv6(&self) -> Option<&Ipv6Entry> {
        let ordered = self.ipv6();
        if ordered.len() > 1 {
            info!(
                "{} candidate IPv6 addresses for {}, using {}",
                ordered.len(),
                self.fqdn,
                ordered[0].ip
            );
        }
        ordered.first().copied()
    }

    /// Whether there is nothing to publish.
    #[must_use]
    pub fn has_addresses(&self) -> bool {
        !self.v4.is_empty() || !self.v6.is_empty()
    }
}

/// Normalise and validate an FQDN.
///
/// # Errors
///
/// Returns an [`IdentityError`] if the name has fewer than two labels, contains
/// an empty or oversized label, or ends in the reserved `.local` suffix.
pub fn validate_fqdn(fqdn: &str) -> Result<String, IdentityError> {
    let normalized = fqdn.trim().trim_end_matches('.').to_ascii_lowercase();

    if normalized.is_empty() {
        return Err(IdentityError::MissingHostName);
    }

    let labels: Vec<&str> = normalized.split('.').collect();
    if labels.len() < MIN_FQDN_LABELS {
        return Err(IdentityError::TooFewLabels {
            fqdn: normalized,
            min_labels: MIN_FQDN_LABELS,
        });
    }

    if let Some(bad) = labels.iter().find(|l| l.is_empty() || l.len() > 63) {
        return Err(IdentityError::MalformedName {
            reason: if bad.is_empty() {
                "empty label".to_string()
            } else {
                format!("label '{bad}' is longer than 63 characters")
            },
            fqdn: normalized,
        });
    }

    if normalized.len() > 253 {
        return Err(IdentityError::MalformedName {
            fqdn: normalized,
            reason: "name is longer than 253 characters".to_string(),
        });
    }

    if labels.last() == Some(&RESERVED_LOCAL_SUFFIX) {
        warn!("Refusing to publish link-local name {}", normalized);
        return Err(IdentityError::ReservedSuffix {
            fqdn: normalized,
            suffix: RESERVED_LOCAL_SUFFIX.to_string(),
        });
    }

    Ok(normalized)
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod identity_tests;
