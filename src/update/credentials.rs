// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kerberos credential acquisition for GSS-TSIG.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::{debug, info, warn};

use crate::config::AuthMode;
use crate::constants::KINIT_BINARY;
use crate::errors::CredentialError;

/// Obtains a Kerberos ticket before GSS-TSIG updates are sent.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Acquire credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError`] if no ticket could be obtained.
    async fn acquire(&self) -> Result<(), CredentialError>;
}

/// Runs `kinit -k [-t keytab] principal`.
#[derive(Debug, Clone)]
pub struct KinitCredentials {
    binary: String,
    keytab: Option<PathBuf>,
    principal: String,
}

impl KinitCredentials {
    #[must_use]
    pub fn new(keytab: Option<PathBuf>, principal: &str) -> Self {
        Self {
            binary: KINIT_BINARY.to_string(),
            keytab,
            principal: principal.to_string(),
        }
    }

    /// Use `binary` instead of the `kinit` on `PATH`.
    #[must_use]
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }

    /// Arguments passed to `kinit`.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-k".to_string()];
        if let Some(keytab) = &self.keytab {
            args.push("-t".to_string());
            args.push(keytab.display().to_string());
        }
        args.push(self.principal.clone());
        args
    }
}

#[async_trait]
impl CredentialProvider for KinitCredentials {
    async fn acquire(&self) -> Result<(), CredentialError> {
        let args = self.args();
        debug!("Running {} {}", self.binary, args.join(" "));

        let output = tokio::process::Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CredentialError::AcquisitionFailed {
                principal: self.principal.clone(),
                reason: format!("failed to run {}: {e}", self.binary),
            })?;

        if !output.status.success() {
            return Err(CredentialError::AcquisitionFailed {
                principal: self.principal.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!("Acquired Kerberos ticket for {}", self.principal);
        Ok(())
    }
}

/// Acquire credentials when the run needs them.
///
/// Nothing happens for unsigned or shared-key runs, for dry runs, or when no
/// provider is configured (an existing ticket cache is used as is).
///
/// # Errors
///
/// Returns the provider's [`CredentialError`]; callers treat it as fatal.
pub async fn ensure_credentials(
    provider: Option<&dyn CredentialProvider>,
    auth: &AuthMode,
    dry_run: bool,
) -> Result<(), CredentialError> {
    if !auth.requires_credentials() {
        return Ok(());
    }
    if dry_run {
        debug!("Dry run, skipping credential acquisition");
        return Ok(());
    }
    match provider {
        Some(provider) => provider.acquire().await,
        None => {
            warn!("No keytab or principal configured, relying on the existing ticket cache");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
