// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared-key TSIG support.
//!
//! Loads BIND9-style key files and turns them into hickory `TSigner`s for
//! signing dynamic update transactions.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hickory_client::rr::rdata::tsig::TsigAlgorithm;
use hickory_client::rr::Name;
use hickory_proto::rr::dnssec::tsig::TSigner;
use std::path::Path;
use std::str::FromStr;

use crate::constants::TSIG_FUDGE_TIME_SECS;
use crate::errors::ConfigError;

/// HMAC algorithm of a shared TSIG key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl HmacAlgorithm {
    /// Algorithm name as written in BIND key files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HmacMd5 => "hmac-md5",
            Self::HmacSha1 => "hmac-sha1",
            Self::HmacSha224 => "hmac-sha224",
            Self::HmacSha256 => "hmac-sha256",
            Self::HmacSha384 => "hmac-sha384",
            Self::HmacSha512 => "hmac-sha512",
        }
    }
}

impl FromStr for HmacAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Key files sometimes carry the legacy ".sig-alg.reg.int." suffix for MD5
        let normalized = s.trim().trim_end_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "hmac-md5" | "hmac-md5.sig-alg.reg.int" => Ok(Self::HmacMd5),
            "hmac-sha1" => Ok(Self::HmacSha1),
            "hmac-sha224" => Ok(Self::HmacSha224),
            "hmac-sha256" => Ok(Self::HmacSha256),
            "hmac-sha384" => Ok(Self::HmacSha384),
            "hmac-sha512" => Ok(Self::HmacSha512),
            _ => Err(ConfigError::InvalidTsigKey {
                reason: format!(
                    "unsupported algorithm '{s}'. Supported algorithms: hmac-md5, hmac-sha1, \
                     hmac-sha224, hmac-sha256, hmac-sha384, hmac-sha512"
                ),
            }),
        }
    }
}

/// Shared TSIG key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsigKeyData {
    /// Key name as configured on the server
    pub name: String,
    /// HMAC algorithm
    pub algorithm: HmacAlgorithm,
    /// Base64-encoded secret
    pub secret: String,
}

/// Parse a BIND9 key file.
///
/// Expected format:
/// ```text
/// key "ddns-key" {
///     algorithm hmac-sha256;
///     secret "base64secret==";
/// };
/// ```
///
/// # Errors
///
/// Returns an error if the file format is invalid or required fields are missing.
pub fn parse_key_file(content: &str) -> Result<TsigKeyData, ConfigError> {
    let missing = |what: &str| ConfigError::InvalidTsigKey {
        reason: format!("failed to parse {what} from key file"),
    };

    let name = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("key"))
        .and_then(|line| line.split('"').nth(1))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing("key name"))?
        .to_string();

    let algorithm = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("algorithm"))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(|s| s.trim_end_matches(';'))
        .ok_or_else(|| missing("algorithm"))?
        .parse::<HmacAlgorithm>()?;

    let secret = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("secret"))
        .and_then(|line| line.split('"').nth(1))
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| missing("secret"))?
        .to_string();

    if BASE64.decode(&secret).is_err() {
        return Err(ConfigError::InvalidTsigKey {
            reason: format!("secret for key '{name}' is not valid base64"),
        });
    }

    Ok(TsigKeyData {
        name,
        algorithm,
        secret,
    })
}

/// Read and parse a BIND9 key file from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid key file.
pub fn load_key_file(path: &Path) -> Result<TsigKeyData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read TSIG key file {}", path.display()))?;
    parse_key_file(&content)
        .with_context(|| format!("Invalid TSIG key file {}", path.display()))
}

/// Create a TSIG signer from key data.
///
/// # Errors
///
/// Returns an error if the key name or secret is invalid.
pub fn create_tsig_signer(key_data: &TsigKeyData) -> Result<TSigner> {
    let algorithm = match key_data.algorithm {
        HmacAlgorithm::HmacMd5 => TsigAlgorithm::HmacMd5,
        HmacAlgorithm::HmacSha1 => TsigAlgorithm::HmacSha1,
        HmacAlgorithm::HmacSha224 => TsigAlgorithm::HmacSha224,
        HmacAlgorithm::HmacSha256 => TsigAlgorithm::HmacSha256,
        HmacAlgorithm::HmacSha384 => TsigAlgorithm::HmacSha384,
        HmacAlgorithm::HmacSha512 => TsigAlgorithm::HmacSha512,
    };

    let key_bytes = BASE64
        .decode(&key_data.secret)
        .context("Failed to decode TSIG key")?;

    let signer = TSigner::new(
        key_bytes,
        algorithm,
        Name::from_str(&key_data.name).context("Invalid TSIG key name")?,
        u16::try_from(TSIG_FUDGE_TIME_SECS).unwrap_or(300),
    )
    .context("Failed to create TSIG signer")?;

    Ok(signer)
}

#[cfg(test)]
#[path = "tsig_tests.rs"]
mod tsig_tests;
