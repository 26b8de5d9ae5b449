// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line interface.
//!
//! Flags are parsed with clap and turned into an immutable [`RunConfig`]
//! before anything touches the network. Every flag can also be set through a
//! `DDNS_SYNC_*` environment variable.

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{AuthMode, Policy, Transport, UpdateTarget};
use crate::constants::DEFAULT_DNS_TIMEOUT_SECS;
use crate::duration::parse_ttl;
use crate::errors::ConfigError;
use crate::tsig::load_key_file;
use crate::update::credentials::KinitCredentials;

/// Authentication for update transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    /// Unsigned updates
    None,
    /// Kerberos GSS-TSIG (via nsupdate)
    GssTsig,
    /// GSS-TSIG for older Windows DNS servers (via nsupdate)
    GssTsigLegacy,
    /// Shared-key TSIG from --key-file
    Tsig,
}

/// Report format written to stdout after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Keep a host's A, AAAA and PTR records in sync with its addresses.
#[derive(Parser, Debug, Clone)]
#[command(name = "ddns-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host name to publish (defaults to the system host name)
    #[arg(short, long, env = "DDNS_SYNC_NAME")]
    pub name: Option<String>,

    /// Domain appended to a short host name
    #[arg(short, long, env = "DDNS_SYNC_DOMAIN")]
    pub domain: Option<String>,

    /// IPv4 address to publish (repeatable); disables discovery
    #[arg(long = "ipv4", value_name = "ADDR")]
    pub ipv4: Vec<Ipv4Addr>,

    /// IPv6 address to publish (repeatable); disables discovery
    #[arg(long = "ipv6", value_name = "ADDR")]
    pub ipv6: Vec<Ipv6Addr>,

    /// Run as a DHCP client hook, reading new_* variables from the environment
    #[arg(long, num_args = 0..=2, value_names = ["REASON", "INTERFACE"])]
    pub hook: Option<Vec<String>>,

    /// Interface to discover addresses on (defaults to the default-route interface)
    #[arg(short, long, env = "DDNS_SYNC_INTERFACE")]
    pub interface: Option<String>,

    /// TTL for added records, e.g. 3600, 90m, 1h
    #[arg(short, long, env = "DDNS_SYNC_TTL")]
    pub ttl: Option<String>,

    /// Refresh matching records whose TTL is below this value
    #[arg(long, env = "DDNS_SYNC_MIN_TTL")]
    pub min_ttl: Option<String>,

    /// Delete and re-add every record even when it is current
    #[arg(short, long, env = "DDNS_SYNC_FORCE")]
    pub force: bool,

    /// Print the update transactions instead of sending them
    #[arg(long, env = "DDNS_SYNC_DRY_RUN")]
    pub dry_run: bool,

    /// Send every update to this server instead of the zone master
    #[arg(short, long, env = "DDNS_SYNC_SERVER")]
    pub server: Option<String>,

    /// Local address to send updates from
    #[arg(long, env = "DDNS_SYNC_SOURCE")]
    pub source: Option<IpAddr>,

    /// Use TCP for updates
    #[arg(long, env = "DDNS_SYNC_TCP")]
    pub tcp: bool,

    /// Update authentication
    #[arg(long, value_enum, env = "DDNS_SYNC_AUTH")]
    pub auth: Option<AuthArg>,

    /// BIND key file for shared-key TSIG
    #[arg(short = 'k', long, env = "DDNS_SYNC_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Keytab used to obtain a Kerberos ticket for GSS-TSIG
    #[arg(long, env = "DDNS_SYNC_KEYTAB")]
    pub keytab: Option<PathBuf>,

    /// Kerberos principal for GSS-TSIG
    #[arg(long, env = "DDNS_SYNC_PRINCIPAL")]
    pub principal: Option<String>,

    /// Resolver for lookups (defaults to the system resolver)
    #[arg(long, env = "DDNS_SYNC_RESOLVER")]
    pub resolver: Option<String>,

    /// Seconds to wait for each query and update
    #[arg(long, env = "DDNS_SYNC_TIMEOUT", default_value_t = DEFAULT_DNS_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "DDNS_SYNC_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Reason and interface given to `--hook`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookArgs {
    pub reason: Option<String>,
    pub interface: Option<String>,
}

/// Where the host's name and addresses come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySource {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub ipv4: Vec<Ipv4Addr>,
    pub ipv6: Vec<Ipv6Addr>,
    pub hook: Option<HookArgs>,
    pub interface: Option<String>,
}

impl IdentitySource {
    /// Whether addresses were given on the command line.
    #[must_use]
    pub fn has_explicit_addresses(&self) -> bool {
        !self.ipv4.is_empty() || !self.ipv6.is_empty()
    }
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub identity: IdentitySource,
    pub policy: Policy,
    pub target: UpdateTarget,
    pub resolver: Option<String>,
    pub credentials: Option<KinitCredentials>,
    pub output: OutputFormat,
}

impl Cli {
    /// Log filter implied by `-v` when `RUST_LOG` is unset.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => crate::constants::DEFAULT_LOG_LEVEL,
            1 => "info",
            _ => "debug",
        }
    }

    /// Reconciliation policy from the flags.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTtl`] for a malformed TTL.
    pub fn policy(&self) -> Result<Policy, ConfigError> {
        Ok(Policy {
            force: self.force,
            min_ttl: self.min_ttl.as_deref().map(parse_ttl).transpose()?,
            explicit_ttl: self.ttl.as_deref().map(parse_ttl).transpose()?,
            dry_run: self.dry_run,
        })
    }

    /// Authentication mode from `--auth` and `--key-file`.
    ///
    /// A key file without `--auth` implies shared-key TSIG.
    ///
    /// # Errors
    ///
    /// Returns an error if TSIG is requested without a readable key file.
    pub fn auth_mode(&self) -> Result<AuthMode> {
        let auth = match (self.auth, &self.key_file) {
            (Some(auth), _) => auth,
            (None, Some(_)) => AuthArg::Tsig,
            (None, None) => AuthArg::None,
        };
        Ok(match auth {
            AuthArg::None => AuthMode::None,
            AuthArg::GssTsig => AuthMode::GssTsig,
            AuthArg::GssTsigLegacy => AuthMode::GssTsigLegacy,
            AuthArg::Tsig => {
                let key_file = self.key_file.clone().ok_or_else(|| ConfigError::InvalidTsigKey {
                    reason: "--auth tsig requires --key-file".to_string(),
                })?;
                let key = load_key_file(&key_file)?;
                AuthMode::Tsig { key_file, key }
            }
        })
    }

    /// Update target from the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the authentication settings are unusable.
    pub fn update_target(&self) -> Result<UpdateTarget> {
        Ok(UpdateTarget {
            server: self.server.clone(),
            source_address: self.source,
            transport: if self.tcp {
                Transport::Tcp
            } else {
                Transport::Udp
            },
            auth: self.auth_mode()?,
            timeout: Duration::from_secs(self.timeout),
        })
    }

    /// Validate the flags into a [`RunConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TTLs or authentication settings.
    pub fn into_run_config(self) -> Result<RunConfig> {
        let policy = self.policy()?;
        let target = self.update_target()?;

        let credentials = match (&self.keytab, &self.principal) {
            (_, Some(principal)) => Some(KinitCredentials::new(self.keytab.clone(), principal)),
            (Some(_), None) => {
                return Err(ConfigError::MissingOption {
                    option: "--keytab".to_string(),
                    requires: "--principal".to_string(),
                }
                .into())
            }
            (None, None) => None,
        };

        let hook = self.hook.map(|args| {
            let mut args = args.into_iter();
            HookArgs {
                reason: args.next(),
                interface: args.next(),
            }
        });

        Ok(RunConfig {
            identity: IdentitySource {
                name: self.name,
                domain: self.domain,
                ipv4: self.ipv4,
                ipv6: self.ipv6,
                hook,
                interface: self.interface,
            },
            policy,
            target,
            resolver: self.resolver,
            credentials,
            output: self.output,
        })
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
