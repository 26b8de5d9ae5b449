// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # ddns-sync - keep a host's DNS records in sync with its addresses
//!
//! ddns-sync publishes a host's forward (A/AAAA) and reverse (PTR) records
//! using RFC 2136 dynamic updates. It is meant to run once per trigger: from a
//! DHCP client hook, a timer, or by hand.
//!
//! ## Overview
//!
//! A run:
//!
//! 1. Derives the host identity (FQDN plus IPv4/IPv6 addresses with lease TTLs)
//! 2. Locates the authoritative master of each affected zone by walking SOA records
//! 3. Observes what is currently published
//! 4. Plans the minimal set of deletions and additions per record relationship
//! 5. Applies each operation in order; a failed update never stops the run
//!
//! ## Modules
//!
//! - [`identity`] - validated host identity
//! - [`hook`] - DHCP client hook environment
//! - [`discovery`] - interface address discovery
//! - [`dns`] - query client, reverse names and SOA walk
//! - [`reconcile`] - the planning engine and run driver
//! - [`update`] - update executors (dry run, hickory, nsupdate) and credentials
//! - [`tsig`] - shared-key TSIG support
//! - [`cli`] / [`runner`] - command line and run orchestration
//!
//! ## Example
//!
//! ```rust
//! use ddns_sync::config::Policy;
//! use ddns_sync::dns::{DnsRecord, RecordType};
//! use ddns_sync::reconcile::plan::{plan_quadrant, DesiredValue, Quadrant};
//!
//! let observed = vec![DnsRecord::new("h.example.com", 300, RecordType::A, "198.51.100.1")];
//! let desired = vec![DesiredValue::new("198.51.100.9", Some(3600))];
//!
//! let plan = plan_quadrant(
//!     Quadrant::NameToA,
//!     "h.example.com",
//!     &desired,
//!     &observed,
//!     &Policy::default(),
//! );
//!
//! let ops: Vec<String> = plan.operations.iter().map(ToString::to_string).collect();
//! assert_eq!(
//!     ops,
//!     vec![
//!         "DELETE h.example.com A 198.51.100.1",
//!         "ADD h.example.com 3600 A 198.51.100.9",
//!     ]
//! );
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod dns;
pub mod duration;
pub mod errors;
pub mod hook;
pub mod identity;
pub mod reconcile;
pub mod runner;
pub mod tsig;
pub mod update;

#[cfg(test)]
mod testing;
