// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed DNS records as seen by the reconciliation engine.

use serde::Serialize;
use std::fmt;

use crate::constants::RESERVED_LOCAL_SUFFIX;

/// Record types the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    A,
    AAAA,
    PTR,
    CNAME,
    TXT,
    SOA,
}

impl RecordType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::PTR => "PTR",
            Self::CNAME => "CNAME",
            Self::TXT => "TXT",
            Self::SOA => "SOA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record class. Only the Internet class is ever published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum RecordClass {
    #[default]
    IN,
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IN")
    }
}

/// An observed DNS record.
///
/// Names are stored lowercase without a trailing dot. For PTR and SOA records
/// `value` holds the canonical target name, for A/AAAA the address text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DnsRecord {
    pub name: String,
    pub ttl: u32,
    pub class: RecordClass,
    pub record_type: RecordType,
    pub value: String,
}

impl DnsRecord {
    /// Build a record, canonicalising the owner name and, for name-valued
    /// types, the value.
    #[must_use]
    pub fn new(name: &str, ttl: u32, record_type: RecordType, value: &str) -> Self {
        let value = match record_type {
            RecordType::PTR | RecordType::CNAME | RecordType::SOA => canonical_name(value),
            _ => value.trim().to_string(),
        };
        Self {
            name: canonical_name(name),
            ttl,
            class: RecordClass::IN,
            record_type,
            value,
        }
    }

    /// Whether this is a PTR pointing into the link-local domain.
    ///
    /// Some resolvers synthesise `.local` PTR answers; those never describe
    /// published data.
    #[must_use]
    pub fn is_link_local_ptr(&self) -> bool {
        self.record_type == RecordType::PTR
            && self.value.rsplit('.').next() == Some(RESERVED_LOCAL_SUFFIX)
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.ttl, self.class, self.record_type, self.value
        )
    }
}

/// Lowercase a domain name and strip any trailing dot.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}
