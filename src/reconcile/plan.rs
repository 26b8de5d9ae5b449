// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pure reconciliation planning.
//!
//! Each quadrant (name→A, name→AAAA, IPv4→PTR, IPv6→PTR) is planned by a single
//! fold over the observed records:
//!
//! 1. A record whose value is desired and whose TTL passes the [`Policy`] is kept.
//! 2. Every other record is deleted: stale values, and desired values that are
//!    forced or whose TTL fell below the floor.
//! 3. Every desired value without a kept record is added.
//!
//! Deletions come before additions, in observed-record order.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::net::IpAddr;
use tracing::debug;

use crate::config::Policy;
use crate::dns::{canonical_name, DnsRecord, RecordType};

/// One of the four record relationships kept in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quadrant {
    NameToA,
    NameToAaaa,
    Ipv4ToPtr,
    Ipv6ToPtr,
}

impl Quadrant {
    /// Record type managed in this quadrant.
    #[must_use]
    pub fn record_type(self) -> RecordType {
        match self {
            Self::NameToA => RecordType::A,
            Self::NameToAaaa => RecordType::AAAA,
            Self::Ipv4ToPtr | Self::Ipv6ToPtr => RecordType::PTR,
        }
    }

    /// Whether values are target names rather than addresses.
    #[must_use]
    pub fn is_reverse(self) -> bool {
        matches!(self, Self::Ipv4ToPtr | Self::Ipv6ToPtr)
    }

    /// Compare an observed value with a desired one.
    ///
    /// Addresses compare by parsed value so `2001:0db8::1` matches `2001:db8::1`;
    /// PTR targets compare by canonical name.
    #[must_use]
    pub fn values_match(self, observed: &str, desired: &str) -> bool {
        if self.is_reverse() {
            return canonical_name(observed) == canonical_name(desired);
        }
        match (observed.parse::<IpAddr>(), desired.parse::<IpAddr>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => observed == desired,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NameToA => "name->A",
            Self::NameToAaaa => "name->AAAA",
            Self::Ipv4ToPtr => "ipv4->PTR",
            Self::Ipv6ToPtr => "ipv6->PTR",
        };
        f.write_str(label)
    }
}

/// Add or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpKind {
    Add,
    Delete,
}

/// A single record change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub kind: OpKind,
    pub name: String,
    /// Only set for additions
    pub ttl: Option<u32>,
    pub record_type: RecordType,
    pub value: String,
}

impl Operation {
    #[must_use]
    pub fn add(name: &str, ttl: u32, record_type: RecordType, value: &str) -> Self {
        Self {
            kind: OpKind::Add,
            name: name.to_string(),
            ttl: Some(ttl),
            record_type,
            value: value.to_string(),
        }
    }

    /// Delete exactly the observed record's value.
    #[must_use]
    pub fn delete(record: &DnsRecord) -> Self {
        Self {
            kind: OpKind::Delete,
            name: record.name.clone(),
            ttl: None,
            record_type: record.record_type,
            value: record.value.clone(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.ttl) {
            (OpKind::Add, Some(ttl)) => write!(
                f,
                "ADD {} {} {} {}",
                self.name, ttl, self.record_type, self.value
            ),
            (OpKind::Add, None) => write!(f, "ADD {} {} {}", self.name, self.record_type, self.value),
            (OpKind::Delete, _) => write!(
                f,
                "DELETE {} {} {}",
                self.name, self.record_type, self.value
            ),
        }
    }
}

/// A value that should be published, with the TTL its lease implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredValue {
    pub value: String,
    pub lease_ttl: Option<u32>,
}

impl DesiredValue {
    #[must_use]
    pub fn new(value: impl Into<String>, lease_ttl: Option<u32>) -> Self {
        Self {
            value: value.into(),
            lease_ttl,
        }
    }
}

/// Outcome of planning one owner name in one quadrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuadrantPlan {
    pub quadrant: Quadrant,
    pub owner: String,
    /// Matching, fresh records left untouched
    pub kept: Vec<DnsRecord>,
    /// Records deleted because their value is no longer desired
    pub stale: Vec<DnsRecord>,
    /// Records deleted because they are forced or below the TTL floor
    pub refreshed: Vec<DnsRecord>,
    /// Deletions in observed order, then additions in desired order
    pub operations: Vec<Operation>,
}

impl QuadrantPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Plan one quadrant for one owner name.
///
/// `owner` is the FQDN for forward quadrants and the reverse-mapping name for
/// reverse quadrants. `desired` may hold several values (multiple IPv6
/// addresses); an empty `desired` removes every observed record.
#[must_use]
pub fn plan_quadrant(
    quadrant: Quadrant,
    owner: &str,
    desired: &[DesiredValue],
    observed: &[DnsRecord],
    policy: &Policy,
) -> QuadrantPlan {
    let record_type = quadrant.record_type();
    let mut kept = Vec::new();
    let mut stale = Vec::new();
    let mut refreshed = Vec::new();
    let mut deletes = Vec::new();
    let mut kept_values: HashSet<usize> = HashSet::new();
    // First matching record per desired value supplies the fallback TTL
    let mut observed_ttls: HashMap<usize, u32> = HashMap::new();

    for record in observed.iter().filter(|r| r.record_type == record_type) {
        let matched = desired
            .iter()
            .position(|d| quadrant.values_match(&record.value, &d.value));

        match matched {
            Some(index) => {
                observed_ttls.entry(index).or_insert(record.ttl);
                if policy.keeps(record.ttl) {
                    debug!("[{}] kept {}", quadrant, record);
                    kept_values.insert(index);
                    kept.push(record.clone());
                    continue;
                }
                debug!(
                    "[{}] refreshing {} (force={}, min_ttl={:?})",
                    quadrant, record, policy.force, policy.min_ttl
                );
                refreshed.push(record.clone());
            }
            None => {
                debug!("[{}] stale {}", quadrant, record);
                stale.push(record.clone());
            }
        }
        deletes.push(Operation::delete(record));
    }

    let mut operations = deletes;
    for (index, value) in desired.iter().enumerate() {
        if kept_values.contains(&index) {
            continue;
        }
        let ttl = policy.resolve_ttl(value.lease_ttl, observed_ttls.get(&index).copied());
        debug!(
            "[{}] adding {} {} {} {}",
            quadrant, owner, ttl, record_type, value.value
        );
        operations.push(Operation::add(owner, ttl, record_type, &value.value));
    }

    QuadrantPlan {
        quadrant,
        owner: owner.to_string(),
        kept,
        stale,
        refreshed,
        operations,
    }
}

/// Plan removal of PTR records that still point at `fqdn` from an address the
/// host no longer holds.
///
/// PTRs naming other hosts are left alone.
#[must_use]
pub fn plan_stale_reverse(
    quadrant: Quadrant,
    owner: &str,
    fqdn: &str,
    observed: &[DnsRecord],
) -> QuadrantPlan {
    let stale: Vec<DnsRecord> = observed
        .iter()
        .filter(|r| r.record_type == RecordType::PTR && quadrant.values_match(&r.value, fqdn))
        .cloned()
        .collect();

    for record in &stale {
        debug!("[{}] stale reverse {}", quadrant, record);
    }

    QuadrantPlan {
        quadrant,
        owner: owner.to_string(),
        kept: Vec::new(),
        operations: stale.iter().map(Operation::delete).collect(),
        refreshed: Vec::new(),
        stale,
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod plan_tests;
