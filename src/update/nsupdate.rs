// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! nsupdate command executor.
//!
//! Pipes each transaction into BIND's `nsupdate` utility. This is the only
//! executor that can authenticate with GSS-TSIG, since `nsupdate` negotiates
//! the security context with the Kerberos ticket in the caller's cache.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use super::{UpdateExecutor, UpdateRequest};
use crate::config::{AuthMode, Transport, UpdateTarget};
use crate::constants::NSUPDATE_BINARY;
use crate::errors::UpdateError;

/// Response codes `nsupdate` reports on stderr when a server rejects an update.
const REJECTION_RCODES: [&str; 8] = [
    "REFUSED", "NOTAUTH", "SERVFAIL", "NOTZONE", "FORMERR", "NXDOMAIN", "YXDOMAIN", "NXRRSET",
];

/// Drives the `nsupdate` binary.
#[derive(Debug, Clone)]
pub struct NsupdateExecutor {
    binary: String,
    args: Vec<String>,
}

impl NsupdateExecutor {
    /// Create an executor for `target` using the `nsupdate` on `PATH`.
    #[must_use]
    pub fn new(target: &UpdateTarget) -> Self {
        Self::with_binary(NSUPDATE_BINARY, target)
    }

    /// Create an executor that runs `binary` instead of `nsupdate`.
    #[must_use]
    pub fn with_binary(binary: &str, target: &UpdateTarget) -> Self {
        let args = build_args(&target.auth, target.transport, target.timeout);
        info!(
            "Creating nsupdate executor ({} {}) with auth: {}",
            binary,
            args.join(" "),
            target.auth
        );
        Self {
            binary: binary.to_string(),
            args,
        }
    }

    /// Command-line arguments passed on every invocation.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    async fn execute(&self, script: &str) -> Result<std::process::Output> {
        debug!("Executing nsupdate commands:\n{}", script);

        let mut child = tokio::process::Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(script.as_bytes())
                .await
                .context("Failed to write to nsupdate stdin")?;
            stdin.flush().await.context("Failed to flush stdin")?;
        }

        child
            .wait_with_output()
            .await
            .context("Failed to wait for nsupdate")
    }
}

#[async_trait]
impl UpdateExecutor for NsupdateExecutor {
    fn name(&self) -> &'static str {
        "nsupdate"
    }

    async fn apply(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        let owner = request.owner().unwrap_or_default().to_string();
        let start = Instant::now();

        let output = self
            .execute(&request.to_nsupdate_script())
            .await
            .map_err(|e| UpdateError::ExecutorFailed {
                name: owner.clone(),
                reason: format!("{e:#}"),
            })?;

        if output.status.success() {
            debug!(
                "nsupdate completed successfully in {:.3}s",
                start.elapsed().as_secs_f64()
            );
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("nsupdate failed: {}", parse_nsupdate_error(&stderr));
        Err(classify_failure(&owner, request.server.as_deref(), &stderr))
    }
}

/// Arguments for an authentication mode, transport and timeout.
#[must_use]
pub fn build_args(auth: &AuthMode, transport: Transport, timeout: Duration) -> Vec<String> {
    let mut args = Vec::new();
    match auth {
        AuthMode::None => {}
        AuthMode::GssTsig => args.push("-g".to_string()),
        AuthMode::GssTsigLegacy => args.push("-o".to_string()),
        AuthMode::Tsig { key_file, .. } => {
            args.push("-k".to_string());
            args.push(key_file.display().to_string());
        }
    }
    if transport == Transport::Tcp {
        args.push("-v".to_string());
    }
    let secs = timeout.as_secs();
    if secs > 0 {
        args.push("-t".to_string());
        args.push(secs.to_string());
    }
    args
}

/// Map nsupdate stderr to an [`UpdateError`], keeping the response code when
/// the server reported one.
#[must_use]
pub fn classify_failure(owner: &str, server: Option<&str>, stderr: &str) -> UpdateError {
    match REJECTION_RCODES.iter().find(|code| stderr.contains(*code)) {
        Some(code) => UpdateError::Rejected {
            name: owner.to_string(),
            server: server.unwrap_or("default server").to_string(),
            rcode: (*code).to_string(),
        },
        None => UpdateError::ExecutorFailed {
            name: owner.to_string(),
            reason: parse_nsupdate_error(stderr),
        },
    }
}

/// Parse nsupdate error messages into human-readable format.
#[must_use]
pub fn parse_nsupdate_error(stderr: &str) -> String {
    if stderr.contains("REFUSED") {
        "Zone refused the update (check allow-update configuration)".to_string()
    } else if stderr.contains("NOTAUTH") {
        "Not authorized (check TSIG key or Kerberos ticket)".to_string()
    } else if stderr.contains("SERVFAIL") {
        "Server failure".to_string()
    } else if stderr.contains("NOTZONE") {
        "Zone not found on server".to_string()
    } else if stderr.contains("FORMERR") {
        "Format error (check record syntax)".to_string()
    } else if stderr.contains("NXDOMAIN") {
        "Domain name does not exist".to_string()
    } else if stderr.contains("timed out") {
        "Timed out waiting for the server".to_string()
    } else {
        stderr.trim().to_string()
    }
}

#[cfg(test)]
#[path = "nsupdate_tests.rs"]
mod nsupdate_tests;
