// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dynamic update executors (RFC 2136).
//!
//! The reconciler never talks to a server itself. It hands each planned
//! [`Operation`] to an [`UpdateExecutor`] wrapped in an [`UpdateRequest`]
//! that also names the target server, zone, source address and transport.
//!
//! Executors:
//! - [`dry_run::DryRunExecutor`] - echoes the transaction, contacts nothing
//! - [`hickory::HickoryUpdateExecutor`] - unsigned or TSIG-signed updates via hickory-client
//! - [`nsupdate::NsupdateExecutor`] - drives `nsupdate`, the only path for GSS-TSIG

pub mod credentials;
pub mod dry_run;
pub mod hickory;
pub mod nsupdate;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Write;
use std::net::{IpAddr, SocketAddr};
use tracing::info;

use crate::config::{parse_server_addr, Transport, UpdateTarget};
use crate::dns::RecordType;
use crate::errors::{ConfigError, UpdateError};
use crate::reconcile::plan::{OpKind, Operation};

/// A single update transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    /// `None` means the executor's default server
    pub server: Option<String>,
    /// Zone to update; `None` when no SOA was found
    pub zone: Option<String>,
    pub source_address: Option<IpAddr>,
    #[serde(skip)]
    pub transport: Transport,
    pub operations: Vec<Operation>,
}

impl UpdateRequest {
    /// Owner name of the first directive.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.operations.first().map(|op| op.name.as_str())
    }

    /// Render the transaction as an nsupdate script.
    ///
    /// ```text
    /// server 192.0.2.53 53
    /// zone example.com.
    /// update delete h.example.com. IN A 198.51.100.1
    /// update add h.example.com. 3600 IN A 198.51.100.9
    /// send
    /// ```
    #[must_use]
    pub fn to_nsupdate_script(&self) -> String {
        let mut script = String::new();

        if let Some(server) = &self.server {
            match parse_server_addr(server) {
                Ok(addr) => {
                    let _ = writeln!(script, "server {} {}", addr.ip(), addr.port());
                }
                Err(_) => {
                    let _ = writeln!(script, "server {}", server.trim_end_matches('.'));
                }
            }
        }
        if let Some(source) = &self.source_address {
            let _ = writeln!(script, "local {source}");
        }
        if let Some(zone) = &self.zone {
            let _ = writeln!(script, "zone {}", absolute(zone));
        }

        for op in &self.operations {
            let value = if op.record_type == RecordType::PTR {
                absolute(&op.value)
            } else {
                op.value.clone()
            };
            match (op.kind, op.ttl) {
                (OpKind::Add, Some(ttl)) => {
                    let _ = writeln!(
                        script,
                        "update add {} {} IN {} {}",
                        absolute(&op.name),
                        ttl,
                        op.record_type,
                        value
                    );
                }
                (OpKind::Add, None) => {
                    let _ = writeln!(
                        script,
                        "update add {} IN {} {}",
                        absolute(&op.name),
                        op.record_type,
                        value
                    );
                }
                (OpKind::Delete, _) => {
                    let _ = writeln!(
                        script,
                        "update delete {} IN {} {}",
                        absolute(&op.name),
                        op.record_type,
                        value
                    );
                }
            }
        }
        script.push_str("send\n");
        script
    }
}

/// Applies update transactions.
///
/// A failed transaction is reported as an [`UpdateError`]; callers log it and
/// carry on with the next one.
#[async_trait]
pub trait UpdateExecutor: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Apply one transaction.
    ///
    /// # Errors
    ///
    /// Returns an [`UpdateError`] if the transaction was not applied.
    async fn apply(&self, request: &UpdateRequest) -> Result<(), UpdateError>;
}

/// Pick the executor for a run.
///
/// Dry runs echo only. GSS-TSIG needs `nsupdate`; everything else is sent
/// in-process, with `default_server` used when no server is known.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the target cannot be served by any executor.
pub fn select_executor(
    dry_run: bool,
    target: &UpdateTarget,
    default_server: SocketAddr,
) -> Result<Box<dyn UpdateExecutor>, ConfigError> {
    let executor: Box<dyn UpdateExecutor> = if dry_run {
        Box::new(dry_run::DryRunExecutor::new(true))
    } else if target.auth.requires_credentials() {
        Box::new(nsupdate::NsupdateExecutor::new(target))
    } else {
        Box::new(hickory::HickoryUpdateExecutor::new(target, default_server)?)
    };
    info!("Using {} update executor", executor.name());
    Ok(executor)
}

/// Append the root label if missing.
fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
