// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! One complete run: identity, credentials, reconciliation, report.
//!
//! Identity comes from, in order of precedence:
//! 1. `--ipv4`/`--ipv6` on the command line
//! 2. the DHCP hook environment
//! 3. discovery on the default-route (or `--interface`) interface
//!
//! The host name comes from `--name`, the hook, or the system host name.
//!
//! A run whose identity ends up with no addresses at all stops before any
//! lookup and leaves published records in place.

use anyhow::Context;
use serde::Serialize;
use std::fmt::Write;
use std::net::Ipv6Addr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cli::{IdentitySource, OutputFormat, RunConfig};
use crate::dns::{resolve_server, DnsLookup, HickoryLookup};
use crate::discovery::{AddressDiscovery, IpCommandDiscovery};
use crate::errors::{IdentityError, SyncError};
use crate::hook::HookEvent;
use crate::identity::{Identity, Ipv6Origin};
use crate::reconcile::{OperationState, Reconciler, RunReport};
use crate::update::credentials::{ensure_credentials, CredentialProvider};
use crate::update::{select_executor, UpdateExecutor};

const HOSTNAME_FILES: [&str; 2] = ["/proc/sys/kernel/hostname", "/etc/hostname"];

/// Identity and report of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub identity: Identity,
    /// Preferred IPv6 address for consumers that want exactly one
    pub primary_ipv6: Option<Ipv6Addr>,
    pub report: RunReport,
}

/// Collaborators a run talks to.
pub struct Collaborators<'a, L: DnsLookup + ?Sized> {
    pub lookup: &'a L,
    pub executor: &'a dyn UpdateExecutor,
    pub discovery: &'a dyn AddressDiscovery,
    pub credentials: Option<&'a dyn CredentialProvider>,
}

/// Run with real collaborators.
///
/// Returns `Ok(None)` when a hook event does not call for an update or the
/// host has no addresses.
///
/// # Errors
///
/// Returns a fatal [`SyncError`] if the identity, configuration or required
/// credentials are unusable. Failed updates are reported, not returned.
pub async fn run(config: RunConfig) -> Result<Option<RunOutcome>, SyncError> {
    let event = hook_event(&config.identity)?;
    if event.as_ref().is_some_and(|e| !e.triggers_update()) {
        return Ok(None);
    }

    let lookup = build_lookup(config.resolver.as_deref(), config.target.timeout)?;
    let executor = select_executor(
        config.policy.dry_run,
        &config.target,
        lookup.default_server(),
    )?;
    let discovery = IpCommandDiscovery::new();

    let collaborators = Collaborators {
        lookup: &lookup,
        executor: executor.as_ref(),
        discovery: &discovery,
        credentials: config
            .credentials
            .as_ref()
            .map(|c| c as &dyn CredentialProvider),
    };
    execute(&config, event.as_ref(), &collaborators).await
}

/// Run against the given collaborators.
///
/// # Errors
///
/// See [`run`].
pub async fn execute<L: DnsLookup + ?Sized>(
    config: &RunConfig,
    event: Option<&HookEvent>,
    collaborators: &Collaborators<'_, L>,
) -> Result<Option<RunOutcome>, SyncError> {
    if event.is_some_and(|e| !e.triggers_update()) {
        return Ok(None);
    }

    let identity =
        build_identity(&config.identity, event, collaborators.discovery, system_hostname).await?;
    if !identity.has_addresses() {
        warn!(
            "No addresses found for {}, leaving DNS untouched",
            identity.fqdn()
        );
        return Ok(None);
    }

    ensure_credentials(
        collaborators.credentials,
        &config.target.auth,
        config.policy.dry_run,
    )
    .await?;

    let reconciler = Reconciler::new(
        collaborators.lookup,
        collaborators.executor,
        config.policy,
        &config.target,
    );
    let report = reconciler.run(&identity).await;
    let primary_ipv6 = identity.primary_ipv6().map(|entry| entry.ip);
    Ok(Some(RunOutcome {
        identity,
        primary_ipv6,
        report,
    }))
}

/// Read the hook environment when running as a DHCP hook.
///
/// # Errors
///
/// Returns a configuration error for malformed hook variables.
pub fn hook_event(source: &IdentitySource) -> Result<Option<HookEvent>, SyncError> {
    source
        .hook
        .as_ref()
        .map(|args| HookEvent::from_env(args.reason.as_deref(), args.interface.as_deref()))
        .transpose()
        .map_err(SyncError::from)
}

/// Assemble the identity from flags, hook event, discovery and host name.
///
/// # Errors
///
/// Returns an [`IdentityError`] if no valid FQDN can be formed, or an error
/// if discovery fails.
pub async fn build_identity(
    source: &IdentitySource,
    event: Option<&HookEvent>,
    discovery: &dyn AddressDiscovery,
    hostname: impl Fn() -> Option<String>,
) -> Result<Identity, SyncError> {
    let host = source
        .name
        .clone()
        .or_else(|| event.and_then(|e| e.host_name.clone()))
        .or_else(hostname)
        .ok_or(IdentityError::MissingHostName)?;
    let domain = source
        .domain
        .clone()
        .or_else(|| event.and_then(|e| e.domain.clone()));

    let mut identity = Identity::from_parts(&host, domain.as_deref())?;

    if source.has_explicit_addresses() {
        // Operator-assigned addresses rank with DHCPv6 ones
        for ip in &source.ipv4 {
            identity.add_ipv4(*ip, None);
        }
        for ip in &source.ipv6 {
            identity.add_ipv6(*ip, None, Ipv6Origin::Dhcpv6);
        }
    } else if let Some(event) = event.filter(|e| e.has_addresses()) {
        event.apply_to(&mut identity);
    } else {
        let interface = source
            .interface
            .as_deref()
            .or_else(|| event.and_then(|e| e.interface.as_deref()));
        let found = discovery
            .discover(interface)
            .await
            .context("Address discovery failed")?;
        debug!("Using addresses discovered on {}", found.name);
        found.apply_to(&mut identity);
    }

    info!(
        "Identity {} (host {}, domain {}): {} IPv4, {} IPv6 address(es)",
        identity.fqdn(),
        identity.short_name(),
        identity.domain(),
        identity.ipv4().len(),
        identity.ipv6().len()
    );
    Ok(identity)
}

/// The system host name, if one is set.
#[must_use]
pub fn system_hostname() -> Option<String> {
    HOSTNAME_FILES.iter().find_map(|path| {
        std::fs::read_to_string(path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "localhost" && s != "(none)")
    })
}

fn build_lookup(resolver: Option<&str>, timeout: Duration) -> Result<HickoryLookup, SyncError> {
    let lookup = match resolver {
        Some(server) => HickoryLookup::new(resolve_server(server)?, timeout),
        None => HickoryLookup::from_system_conf(timeout)?,
    };
    Ok(lookup)
}

/// Render the outcome for stdout.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(outcome: &RunOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(outcome).context("Failed to serialize run report")
        }
        OutputFormat::Text => Ok(render_text(outcome)),
    }
}

fn render_text(outcome: &RunOutcome) -> String {
    let report = &outcome.report;
    let mut out = String::new();

    if report.is_noop() {
        let _ = writeln!(out, "{}: up to date", outcome.identity.fqdn());
        return out;
    }

    let _ = writeln!(
        out,
        "{}: {} applied, {} failed",
        outcome.identity.fqdn(),
        report.applied(),
        report.failed()
    );
    for outcome in &report.outcomes {
        match &outcome.state {
            OperationState::Applied => {
                let _ = writeln!(out, "  {}", outcome.operation);
            }
            OperationState::Failed { reason } => {
                let _ = writeln!(out, "  {} FAILED: {}", outcome.operation, reason);
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod runner_tests;
