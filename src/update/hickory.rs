// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-process RFC 2136 updates via hickory-client.
//!
//! Supports unsigned and shared-key TSIG transactions over UDP or TCP.
//! GSS-TSIG is not available here; use the nsupdate executor for it.
//! Requests must carry the zone found by the SOA walk.

use anyhow::{Context, Result};
use async_trait::async_trait;
use hickory_client::client::{Client, ClientConnection, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::rdata::PTR;
use hickory_client::rr::{DNSClass, Name, RData, Record};
use hickory_client::tcp::TcpClientConnection;
use hickory_client::udp::UdpClientConnection;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{UpdateExecutor, UpdateRequest};
use crate::config::{AuthMode, Transport, UpdateTarget};
use crate::dns::{resolve_server, RecordType};
use crate::errors::{ConfigError, UpdateError};
use crate::reconcile::plan::{OpKind, Operation};
use crate::tsig::{create_tsig_signer, TsigKeyData};

/// Sends update transactions directly with hickory's synchronous client.
#[derive(Debug, Clone)]
pub struct HickoryUpdateExecutor {
    default_server: SocketAddr,
    key: Option<TsigKeyData>,
    timeout: Duration,
}

impl HickoryUpdateExecutor {
    /// Build an executor for `target`. Requests without a server go to
    /// `default_server`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedAuth`] for GSS-TSIG modes.
    pub fn new(target: &UpdateTarget, default_server: SocketAddr) -> Result<Self, ConfigError> {
        let key = match &target.auth {
            AuthMode::None => None,
            AuthMode::Tsig { key, .. } => Some(key.clone()),
            mode @ (AuthMode::GssTsig | AuthMode::GssTsigLegacy) => {
                return Err(ConfigError::UnsupportedAuth {
                    mode: mode.to_string(),
                    executor: "hickory".to_string(),
                })
            }
        };
        Ok(Self {
            default_server,
            key,
            timeout: target.timeout,
        })
    }

    /// Whether transactions will be TSIG-signed.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.key.is_some()
    }
}

#[async_trait]
impl UpdateExecutor for HickoryUpdateExecutor {
    fn name(&self) -> &'static str {
        "hickory"
    }

    async fn apply(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        let owner = request.owner().unwrap_or_default().to_string();
        if request.zone.is_none() {
            return Err(UpdateError::UnknownZone { name: owner });
        }
        let request = request.clone();
        let default_server = self.default_server;
        let key = self.key.clone();
        let timeout = self.timeout;

        // hickory's SyncClient blocks, keep it off the runtime threads
        let outcome = tokio::task::spawn_blocking(move || {
            send_request(&request, default_server, key.as_ref(), timeout)
        })
        .await
        .context("DNS update task failed");

        match outcome {
            Ok(Ok(Sent { server, rcode: ResponseCode::NoError })) => {
                info!("Update for {} accepted by {}", owner, server);
                Ok(())
            }
            Ok(Ok(Sent { server, rcode })) => {
                error!(
                    "DNS UPDATE rejected by server {} for {} with response code: {:?}",
                    server, owner, rcode
                );
                Err(UpdateError::Rejected {
                    name: owner,
                    server: server.to_string(),
                    rcode: format!("{rcode:?}"),
                })
            }
            Ok(Err(e)) | Err(e) => Err(UpdateError::ExecutorFailed {
                name: owner,
                reason: format!("{e:#}"),
            }),
        }
    }
}

struct Sent {
    server: SocketAddr,
    rcode: ResponseCode,
}

fn send_request(
    request: &UpdateRequest,
    default_server: SocketAddr,
    key: Option<&TsigKeyData>,
    timeout: Duration,
) -> Result<Sent> {
    let server = match &request.server {
        Some(s) => resolve_server(s)?,
        None => default_server,
    };
    let bind_addr = request.source_address.map(|ip| SocketAddr::new(ip, 0));
    let zone = absolute_name(request.zone.as_deref().context("Update request has no zone")?)?;

    debug!(
        "Sending {} operation(s) for zone {} to {} over {:?}",
        request.operations.len(),
        zone,
        server,
        request.transport
    );

    let rcode = match request.transport {
        Transport::Udp => {
            let conn = UdpClientConnection::with_bind_addr_and_timeout(server, bind_addr, timeout)
                .context("Failed to create UDP connection")?;
            send_with(conn, key, &zone, &request.operations)?
        }
        Transport::Tcp => {
            let conn = TcpClientConnection::with_bind_addr_and_timeout(server, bind_addr, timeout)
                .context("Failed to create TCP connection")?;
            send_with(conn, key, &zone, &request.operations)?
        }
    };
    Ok(Sent { server, rcode })
}

/// Send each operation as its own message, stopping at the first rejection.
fn send_with<CC: ClientConnection>(
    conn: CC,
    key: Option<&TsigKeyData>,
    zone: &Name,
    operations: &[Operation],
) -> Result<ResponseCode> {
    let client = match key {
        Some(key) => SyncClient::with_tsigner(conn, create_tsig_signer(key)?),
        None => SyncClient::new(conn),
    };

    for op in operations {
        let record = to_record(op)?;
        let response = match op.kind {
            OpKind::Add => client.append(record, zone.clone(), false),
            OpKind::Delete => client.delete_by_rdata(record, zone.clone()),
        }
        .with_context(|| format!("Failed to send DNS UPDATE: {op}"))?;

        let rcode = response.response_code();
        if rcode != ResponseCode::NoError {
            return Ok(rcode);
        }
    }
    Ok(ResponseCode::NoError)
}

/// Build the hickory record for an operation.
pub(crate) fn to_record(op: &Operation) -> Result<Record> {
    let name = absolute_name(&op.name)?;
    let rdata = match op.record_type {
        RecordType::A => {
            let ip = Ipv4Addr::from_str(&op.value)
                .with_context(|| format!("Invalid IPv4 address: {}", op.value))?;
            RData::A(ip.into())
        }
        RecordType::AAAA => {
            let ip = Ipv6Addr::from_str(&op.value)
                .with_context(|| format!("Invalid IPv6 address: {}", op.value))?;
            RData::AAAA(ip.into())
        }
        RecordType::PTR => RData::PTR(PTR(absolute_name(&op.value)?)),
        other => anyhow::bail!("Record type {other} cannot be updated"),
    };

    let mut record = Record::from_rdata(name, op.ttl.unwrap_or(0), rdata);
    record.set_dns_class(DNSClass::IN);
    Ok(record)
}

fn absolute_name(name: &str) -> Result<Name> {
    let trimmed = name.trim_end_matches('.');
    Name::from_str(&format!("{trimmed}.")).with_context(|| format!("Invalid DNS name: {name}"))
}

#[cfg(test)]
#[path = "hickory_tests.rs"]
mod hickory_tests;
