// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests.
//!
//! [`SimulatedServer`] is an in-memory authoritative server: updates applied
//! through it are visible to later lookups, so whole runs can be chained.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use ddns_sync::dns::{DnsLookup, DnsRecord, RecordType};
use ddns_sync::errors::UpdateError;
use ddns_sync::reconcile::plan::OpKind;
use ddns_sync::update::{UpdateExecutor, UpdateRequest};
use std::sync::Mutex;

/// In-memory zone data shared by lookups and updates.
#[derive(Default)]
pub struct SimulatedServer {
    records: Mutex<Vec<DnsRecord>>,
    refused_owners: Vec<String>,
    updates: Mutex<usize>,
}

impl SimulatedServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record.
    pub fn with_record(self, name: &str, ttl: u32, record_type: RecordType, value: &str) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.push(DnsRecord::new(name, ttl, record_type, value));
        }
        self
    }

    /// Refuse updates whose owner is `name`.
    pub fn refusing(mut self, name: &str) -> Self {
        self.refused_owners.push(name.to_string());
        self
    }

    pub fn records(&self, name: &str, record_type: RecordType) -> Vec<DnsRecord> {
        self.records
            .lock()
            .map(|r| {
                r.iter()
                    .filter(|rec| rec.name == name && rec.record_type == record_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().map(|u| *u).unwrap_or_default()
    }
}

#[async_trait]
impl DnsLookup for SimulatedServer {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        _server: Option<&str>,
    ) -> Result<Vec<DnsRecord>> {
        Ok(self.records(name, record_type))
    }
}

#[async_trait]
impl UpdateExecutor for SimulatedServer {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn apply(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        let owner = request.owner().unwrap_or_default().to_string();
        if self.refused_owners.contains(&owner) {
            return Err(UpdateError::Rejected {
                name: owner,
                server: "simulated".to_string(),
                rcode: "REFUSED".to_string(),
            });
        }

        let mut records = self.records.lock().map_err(|_| UpdateError::ExecutorFailed {
            name: owner.clone(),
            reason: "zone lock poisoned".to_string(),
        })?;
        for op in &request.operations {
            match op.kind {
                OpKind::Add => records.push(DnsRecord::new(
                    &op.name,
                    op.ttl.unwrap_or_default(),
                    op.record_type,
                    &op.value,
                )),
                OpKind::Delete => records.retain(|r| {
                    !(r.name == op.name && r.record_type == op.record_type && r.value == op.value)
                }),
            }
        }
        if let Ok(mut updates) = self.updates.lock() {
            *updates += 1;
        }
        Ok(())
    }
}
