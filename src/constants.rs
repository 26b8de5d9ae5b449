// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for ddns-sync.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries and dynamic updates
pub const DNS_PORT: u16 = 53;

/// TTL used for added records when no explicit or lease-derived TTL is known (1 hour)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 3600;

/// Largest TTL permitted by RFC 2181 (2^31 - 1)
pub const MAX_RECORD_TTL_SECS: u32 = 2_147_483_647;

/// TSIG fudge time in seconds (allows for clock skew)
pub const TSIG_FUDGE_TIME_SECS: u64 = 300;

/// Default timeout for a single query or update transaction
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 10;

/// Suffix of the IPv4 reverse-mapping tree
pub const IPV4_REVERSE_SUFFIX: &str = "in-addr.arpa";

/// Suffix of the IPv6 reverse-mapping tree
pub const IPV6_REVERSE_SUFFIX: &str = "ip6.arpa";

// ============================================================================
// Identity Constants
// ============================================================================

/// Link-local (mDNS) domain that must never be published or trusted
pub const RESERVED_LOCAL_SUFFIX: &str = "local";

/// Minimum number of labels in a publishable FQDN
pub const MIN_FQDN_LABELS: usize = 2;

// ============================================================================
// DHCP Hook Constants
// ============================================================================

/// dhclient reasons that mean the interface has (new) addresses to publish
pub const UPDATE_TRIGGERING_REASONS: &[&str] = &[
    "BOUND", "RENEW", "REBIND", "REBOOT", "BOUND6", "RENEW6", "REBIND6", "INFORM6",
];

// ============================================================================
// External Tool Constants
// ============================================================================

/// Binary used for GSS-TSIG and key-file authenticated updates
pub const NSUPDATE_BINARY: &str = "nsupdate";

/// Binary used to obtain Kerberos credentials from a keytab
pub const KINIT_BINARY: &str = "kinit";

/// Binary used to discover the default interface and its addresses
pub const IP_BINARY: &str = "ip";

// ============================================================================
// Logging Constants
// ============================================================================

/// Default log filter when neither `RUST_LOG` nor `-v` is given
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable selecting the log output format (`text` or `json`)
pub const LOG_FORMAT_ENV: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
