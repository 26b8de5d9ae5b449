// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS query client.
//!
//! [`DnsLookup::lookup`] is the raw, fallible transport. [`DnsLookup::query`]
//! layers the behaviour the engine relies on over it:
//!
//! - address literals are rewritten to their reverse-mapping name and default to PTR
//! - a host name with no requested type is queried for A and then AAAA
//! - failures (timeouts, SERVFAIL, NXDOMAIN) become an empty answer
//! - answers for other owners (CNAME chains) and `.local` PTR targets are dropped

use anyhow::{Context, Result};
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{DNSClass, Name, RData, Record};
use hickory_client::udp::UdpClientConnection;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::record::{canonical_name, DnsRecord, RecordType};
use super::reverse::{address_literal, reverse_name};
use crate::config::parse_server_addr;
use crate::constants::DNS_PORT;

/// Source of DNS answers.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Query `name` for one record type, optionally against a specific server.
    ///
    /// `None` means the default resolver. An empty vector means the name has
    /// no records of that type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be answered.
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        server: Option<&str>,
    ) -> Result<Vec<DnsRecord>>;

    /// Query with address-literal rewriting and failure-as-absence semantics.
    async fn query(
        &self,
        name: &str,
        record_type: Option<RecordType>,
        server: Option<&str>,
    ) -> Vec<DnsRecord> {
        let (qname, types) = match address_literal(name) {
            Some(ip) => (
                reverse_name(&ip),
                vec![record_type.unwrap_or(RecordType::PTR)],
            ),
            None => (
                canonical_name(name),
                record_type.map_or_else(|| vec![RecordType::A, RecordType::AAAA], |t| vec![t]),
            ),
        };

        let mut records = Vec::new();
        for rtype in types {
            match self.lookup(&qname, rtype, server).await {
                Ok(answers) => {
                    for record in answers {
                        if record.record_type != rtype || record.name != qname {
                            continue;
                        }
                        if record.is_link_local_ptr() {
                            debug!("Ignoring link-local PTR answer {}", record);
                            continue;
                        }
                        records.push(record);
                    }
                }
                Err(e) => {
                    debug!("{} lookup for {} returned nothing: {:#}", rtype, qname, e);
                }
            }
        }
        records
    }
}

/// Query client backed by hickory-client over UDP.
#[derive(Debug, Clone)]
pub struct HickoryLookup {
    default_server: SocketAddr,
    timeout: Duration,
}

impl HickoryLookup {
    /// Create a client that uses `default_server` when no server is pinned.
    #[must_use]
    pub fn new(default_server: SocketAddr, timeout: Duration) -> Self {
        Self {
            default_server,
            timeout,
        }
    }

    /// Create a client using the first name server from the system resolver
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the system configuration cannot be read or lists no servers.
    pub fn from_system_conf(timeout: Duration) -> Result<Self> {
        let (config, _opts) = hickory_resolver::system_conf::read_system_conf()
            .context("Failed to read system resolver configuration")?;
        let server = config
            .name_servers()
            .first()
            .map(|ns| ns.socket_addr)
            .context("System resolver configuration lists no name servers")?;
        debug!("Using system resolver {}", server);
        Ok(Self::new(server, timeout))
    }

    /// Server used when none is pinned.
    #[must_use]
    pub fn default_server(&self) -> SocketAddr {
        self.default_server
    }
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        server: Option<&str>,
    ) -> Result<Vec<DnsRecord>> {
        let name_str = name.to_string();
        let server_str = server.map(str::to_string);
        let default_server = self.default_server;
        let timeout = self.timeout;

        // hickory's SyncClient blocks, keep it off the runtime threads
        tokio::task::spawn_blocking(move || {
            let server_addr = match server_str {
                Some(s) => resolve_server(&s)?,
                None => default_server,
            };

            let conn = UdpClientConnection::with_timeout(server_addr, timeout)
                .context("Failed to create UDP connection for query")?;
            let client = SyncClient::new(conn);

            let fqdn = Name::from_str(&format!("{}.", name_str.trim_end_matches('.')))
                .with_context(|| format!("Invalid query name: {name_str}"))?;

            let response = client
                .query(&fqdn, DNSClass::IN, to_hickory_type(record_type))
                .with_context(|| {
                    format!("Failed to query {record_type} for {fqdn} at {server_addr}")
                })?;

            match response.response_code() {
                ResponseCode::NoError | ResponseCode::NXDomain => {}
                code => anyhow::bail!("{server_addr} answered {record_type} query for {fqdn} with {code:?}"),
            }

            Ok(response.answers().iter().filter_map(from_hickory_record).collect())
        })
        .await
        .context("DNS query task failed")?
    }
}

/// Resolve a server given as an address or host name to a socket address.
///
/// # Errors
///
/// Returns an error if a host name cannot be resolved.
pub fn resolve_server(server: &str) -> Result<SocketAddr> {
    if let Ok(addr) = parse_server_addr(server) {
        return Ok(addr);
    }
    let host = server.trim().trim_end_matches('.');
    (host, DNS_PORT)
        .to_socket_addrs()
        .with_context(|| format!("Failed to resolve server {host}"))?
        .next()
        .with_context(|| format!("Server {host} has no addresses"))
}

pub(crate) fn to_hickory_type(record_type: RecordType) -> hickory_client::rr::RecordType {
    use hickory_client::rr::RecordType as H;
    match record_type {
        RecordType::A => H::A,
        RecordType::AAAA => H::AAAA,
        RecordType::PTR => H::PTR,
        RecordType::CNAME => H::CNAME,
        RecordType::TXT => H::TXT,
        RecordType::SOA => H::SOA,
    }
}

/// Convert a hickory record, dropping types the engine does not model.
pub(crate) fn from_hickory_record(record: &Record) -> Option<DnsRecord> {
    let (record_type, value) = match record.data()? {
        RData::A(a) => (RecordType::A, a.to_string()),
        RData::AAAA(aaaa) => (RecordType::AAAA, aaaa.to_string()),
        RData::PTR(ptr) => (RecordType::PTR, ptr.to_string()),
        RData::CNAME(cname) => (RecordType::CNAME, cname.to_string()),
        RData::TXT(txt) => (RecordType::TXT, txt.to_string()),
        RData::SOA(soa) => (RecordType::SOA, soa.mname().to_string()),
        _ => return None,
    };
    Some(DnsRecord::new(
        &record.name().to_string(),
        record.ttl(),
        record_type,
        &value,
    ))
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod query_tests;
