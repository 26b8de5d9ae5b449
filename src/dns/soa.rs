// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone authority discovery.
//!
//! Finds the primary master of the zone containing a name by querying SOA at
//! the name and then at each ancestor, most specific first. Forward and
//! reverse names are resolved independently because they usually live in
//! different zones with different masters.
//!
//! A pinned server replaces the master: no master is looked up, but the walk
//! still runs against the pinned server to learn which zone an update
//! belongs to.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::query::DnsLookup;
use super::record::{canonical_name, RecordType};

/// The zone a name belongs to and that zone's primary master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneAuthority {
    pub zone: String,
    pub master: String,
}

/// SOA walker with a cache that lives for a single run.
pub struct SoaResolver<'a, L: DnsLookup + ?Sized> {
    lookup: &'a L,
    pinned_server: Option<String>,
    cache: HashMap<String, Option<ZoneAuthority>>,
}

impl<'a, L: DnsLookup + ?Sized> SoaResolver<'a, L> {
    /// Create a resolver. With a pinned server, SOA queries go to that server.
    pub fn new(lookup: &'a L, pinned_server: Option<String>) -> Self {
        Self {
            lookup,
            pinned_server,
            cache: HashMap::new(),
        }
    }

    /// Find the zone containing `name` and its master.
    ///
    /// Returns `None` when no SOA is found before the labels run out.
    pub async fn resolve_authority(&mut self, name: &str) -> Option<ZoneAuthority> {
        let mut candidate = canonical_name(name);

        while !candidate.is_empty() {
            if let Some(cached) = self.cache.get(&candidate) {
                if cached.is_some() {
                    return cached.clone();
                }
            } else {
                let answers = self
                    .lookup
                    .query(
                        &candidate,
                        Some(RecordType::SOA),
                        self.pinned_server.as_deref(),
                    )
                    .await;
                let authority = answers.into_iter().next().map(|soa| ZoneAuthority {
                    zone: candidate.clone(),
                    master: soa.value,
                });
                self.cache.insert(candidate.clone(), authority.clone());
                if let Some(authority) = authority {
                    debug!(
                        "Zone for {} is {} (master {})",
                        name, authority.zone, authority.master
                    );
                    return Some(authority);
                }
            }

            candidate = match candidate.split_once('.') {
                Some((_, parent)) => parent.to_string(),
                None => String::new(),
            };
        }

        debug!("No SOA found for {}", name);
        None
    }

    /// Server that updates for `name` should go to, with the zone if known.
    ///
    /// The pinned server always wins over the zone master.
    pub async fn route_for(&mut self, name: &str) -> UpdateRoute {
        let authority = self.resolve_authority(name).await;
        let zone = authority.as_ref().map(|a| a.zone.clone());

        match (&self.pinned_server, authority) {
            (Some(server), _) => UpdateRoute {
                server: Some(server.clone()),
                zone,
            },
            (None, Some(authority)) => UpdateRoute {
                server: Some(authority.master),
                zone,
            },
            (None, None) => UpdateRoute::default(),
        }
    }
}

/// Destination of the queries and updates for one owner name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateRoute {
    /// `None` means the default resolver
    pub server: Option<String>,
    /// `None` when no SOA was found for the owner
    pub zone: Option<String>,
}

#[cfg(test)]
#[path = "soa_tests.rs"]
mod soa_tests;
