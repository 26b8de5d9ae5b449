// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS lookups used to observe published state.
//!
//! - [`record`] - typed records handed to the reconciliation engine
//! - [`reverse`] - reverse-mapping names for addresses
//! - [`query`] - the query client ([`DnsLookup`]) and its hickory implementation
//! - [`soa`] - zone authority discovery by walking SOA records

pub mod query;
pub mod record;
pub mod reverse;
pub mod soa;

pub use query::{resolve_server, DnsLookup, HickoryLookup};
pub use record::{canonical_name, DnsRecord, RecordClass, RecordType};
pub use reverse::{address_literal, reverse_name};
pub use soa::{SoaResolver, ZoneAuthority};
