// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Immutable run configuration.
//!
//! A run is parameterised by two value objects built once from the command line:
//! a [`Policy`] that drives reconciliation decisions and an [`UpdateTarget`]
//! that tells the update executor where and how to send transactions.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_RECORD_TTL_SECS, DNS_PORT};
use crate::errors::ConfigError;
use crate::tsig::TsigKeyData;

/// Reconciliation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    /// Delete and re-add every matching record even when it is fresh
    pub force: bool,
    /// Matching records with a TTL below this floor are refreshed
    pub min_ttl: Option<u32>,
    /// TTL for added records, overriding lease-derived and observed TTLs
    pub explicit_ttl: Option<u32>,
    /// Echo transactions instead of sending them
    pub dry_run: bool,
}

impl Policy {
    /// Whether a matching record with the given TTL can be left in place.
    #[must_use]
    pub fn keeps(&self, observed_ttl: u32) -> bool {
        if self.force {
            return false;
        }
        !matches!(self.min_ttl, Some(floor) if observed_ttl < floor)
    }

    /// TTL to publish: explicit override, else lease TTL, else the TTL of the
    /// first matching observed record, else the default.
    #[must_use]
    pub fn resolve_ttl(&self, lease_ttl: Option<u32>, observed_ttl: Option<u32>) -> u32 {
        self.explicit_ttl
            .or(lease_ttl)
            .or(observed_ttl)
            .unwrap_or(DEFAULT_RECORD_TTL_SECS)
    }
}

/// Transport used for update transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Udp,
    Tcp,
}

/// How update transactions are authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Unsigned updates
    #[default]
    None,
    /// Kerberos GSS-TSIG (RFC 3645)
    GssTsig,
    /// GSS-TSIG in the pre-standard form older Windows servers expect
    GssTsigLegacy,
    /// Shared-key TSIG loaded from a BIND key file
    Tsig {
        /// Path of the key file
        key_file: PathBuf,
        /// Parsed key material
        key: TsigKeyData,
    },
}

impl AuthMode {
    /// Whether Kerberos credentials must be acquired before updating.
    #[must_use]
    pub fn requires_credentials(&self) -> bool {
        matches!(self, Self::GssTsig | Self::GssTsigLegacy)
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::GssTsig => write!(f, "gss-tsig"),
            Self::GssTsigLegacy => write!(f, "gss-tsig-legacy"),
            Self::Tsig { key, .. } => write!(f, "tsig ({})", key.name),
        }
    }
}

/// Where and how update transactions are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    /// Server pinned by the operator; disables SOA discovery when set
    pub server: Option<String>,
    /// Local address to send updates from
    pub source_address: Option<IpAddr>,
    /// UDP or TCP
    pub transport: Transport,
    /// Authentication mode
    pub auth: AuthMode,
    /// Upper bound for each query and update transaction
    pub timeout: Duration,
}

impl Default for UpdateTarget {
    fn default() -> Self {
        Self {
            server: None,
            source_address: None,
            transport: Transport::Udp,
            auth: AuthMode::None,
            timeout: Duration::from_secs(DEFAULT_DNS_TIMEOUT_SECS),
        }
    }
}

/// Turn a server given as `ip`, `ip:port` or `[v6]:port` into a socket address.
///
/// Host names are not resolved here; SOA masters are resolved by the lookup layer.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidAddress`] if the value is neither form.
pub fn parse_server_addr(server: &str) -> Result<SocketAddr, ConfigError> {
    let trimmed = server.trim();
    if let Ok(addr) = trimmed.parse::<SocketAddr>() {
        return Ok(addr);
    }
    trimmed
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| ConfigError::InvalidAddress {
            value: server.to_string(),
            reason: "expected an IP address with optional port".to_string(),
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
