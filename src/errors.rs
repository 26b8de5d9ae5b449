// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for ddns-sync.
//!
//! This module provides specialized error types for:
//! - Host identity derivation (FQDN validation, reserved suffixes)
//! - Run configuration (TTL specifications, server addresses, TSIG keys)
//! - Dynamic update transactions
//! - Kerberos credential acquisition for GSS-TSIG
//!
//! Identity and configuration errors are fatal and abort a run before any
//! DNS mutation. Update errors are never fatal to the run. Credential errors
//! are fatal only when authenticated updates are actually required.

use thiserror::Error;

/// Errors raised while deriving or validating the host identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No host name could be determined from flags, hook environment or the system
    #[error("No host name available (pass --name or run from a DHCP hook)")]
    MissingHostName,

    /// No domain could be determined and the host name is not fully qualified
    #[error("No domain available for host '{host}' (pass --domain)")]
    MissingDomain {
        /// The short host name that lacked a domain
        host: String,
    },

    /// The FQDN has fewer labels than a publishable name requires
    #[error("FQDN '{fqdn}' must contain at least {min_labels} labels")]
    TooFewLabels {
        /// The rejected name
        fqdn: String,
        /// Minimum label count
        min_labels: usize,
    },

    /// The FQDN lies in the link-local (mDNS) domain
    #[error("FQDN '{fqdn}' ends in reserved suffix '.{suffix}'")]
    ReservedSuffix {
        /// The rejected name
        fqdn: String,
        /// The reserved suffix that matched
        suffix: String,
    },

    /// The FQDN contains an empty or otherwise malformed label
    #[error("FQDN '{fqdn}' is malformed: {reason}")]
    MalformedName {
        /// The rejected name
        fqdn: String,
        /// Explanation of what is invalid
        reason: String,
    },
}

/// Errors in the run configuration supplied by flags or environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A TTL specification could not be parsed or is out of range
    #[error("Invalid TTL specification '{value}': {reason}")]
    InvalidTtl {
        /// The raw specification
        value: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A server or source address could not be parsed
    #[error("Invalid address '{value}': {reason}")]
    InvalidAddress {
        /// The raw address
        value: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Shared-key TSIG was requested without a usable key
    #[error("TSIG key unusable: {reason}")]
    InvalidTsigKey {
        /// Explanation of what is invalid
        reason: String,
    },

    /// An option was given without another option it depends on
    #[error("Option '{option}' requires '{requires}'")]
    MissingOption {
        /// The option that was given
        option: String,
        /// The option it depends on
        requires: String,
    },

    /// The selected executor cannot perform the requested authentication
    #[error("Authentication mode '{mode}' is not supported by the {executor} executor")]
    UnsupportedAuth {
        /// Authentication mode name
        mode: String,
        /// Executor name
        executor: String,
    },
}

/// Errors from a single dynamic update transaction.
///
/// These are always non-fatal: the run logs them and carries on with the
/// remaining operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// The server answered the update with a non-success response code
    #[error("Update for '{name}' rejected by {server} with response code {rcode}")]
    Rejected {
        /// Owner name of the update
        name: String,
        /// Server that rejected the update
        server: String,
        /// Response code reported by the server
        rcode: String,
    },

    /// No SOA was found for the owner, so the zone to update is unknown
    #[error("Update for '{name}' has no known zone: no SOA record found")]
    UnknownZone {
        /// Owner name of the update
        name: String,
    },

    /// The update could not be delivered or the executor failed
    #[error("Update for '{name}' failed: {reason}")]
    ExecutorFailed {
        /// Owner name of the update
        name: String,
        /// Specific reason for the failure
        reason: String,
    },
}

/// Errors from Kerberos credential acquisition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The credential tool exited unsuccessfully or could not be started
    #[error("Failed to acquire Kerberos credentials for '{principal}': {reason}")]
    AcquisitionFailed {
        /// Principal the ticket was requested for
        principal: String,
        /// Specific reason for the failure
        reason: String,
    },
}

/// Composite error type covering every error a run can surface.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// Host identity could not be derived
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Run configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A single update transaction failed
    #[error(transparent)]
    Update(#[from] UpdateError),

    /// Kerberos credentials could not be obtained
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Generic error for failures that don't fit other categories
    #[error("ddns-sync failed: {0}")]
    Generic(String),
}

impl SyncError {
    /// Returns true if this error must abort the run before any update is applied.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Identity(_) | Self::Config(_) | Self::Credential(_) | Self::Generic(_) => true,
            Self::Update(_) => false,
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Update(_) => 0,
            Self::Identity(_) => 2,
            Self::Config(_) => 3,
            Self::Credential(_) => 4,
            Self::Generic(_) => 1,
        }
    }
}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        // Preserve typed errors that were wrapped with context on the way up
        if let Some(e) = err.downcast_ref::<IdentityError>() {
            return Self::Identity(e.clone());
        }
        if let Some(e) = err.downcast_ref::<ConfigError>() {
            return Self::Config(e.clone());
        }
        if let Some(e) = err.downcast_ref::<CredentialError>() {
            return Self::Credential(e.clone());
        }
        Self::Generic(format!("{err:#}"))
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
