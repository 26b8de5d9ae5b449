// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory fakes for unit tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::dns::{DnsLookup, DnsRecord, RecordType};
use crate::errors::UpdateError;
use crate::update::{UpdateExecutor, UpdateRequest};

/// A query issued against [`FakeLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub name: String,
    pub record_type: RecordType,
    pub server: Option<String>,
}

/// Canned DNS answers keyed by owner name and type.
#[derive(Default)]
pub struct FakeLookup {
    answers: HashMap<(String, RecordType), Vec<DnsRecord>>,
    failures: HashSet<(String, RecordType)>,
    calls: Mutex<Vec<LookupCall>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `name`/`record_type` with `records`.
    pub fn with_records(mut self, name: &str, record_type: RecordType, records: Vec<DnsRecord>) -> Self {
        self.answers
            .insert((name.to_string(), record_type), records);
        self
    }

    /// Publish an SOA for `zone` whose master is `master`.
    pub fn with_soa(self, zone: &str, master: &str) -> Self {
        let soa = DnsRecord::new(zone, 3600, RecordType::SOA, master);
        self.with_records(zone, RecordType::SOA, vec![soa])
    }

    /// Make queries for `name`/`record_type` fail.
    pub fn failing(mut self, name: &str, record_type: RecordType) -> Self {
        self.failures.insert((name.to_string(), record_type));
        self
    }

    pub fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls_of_type(&self, record_type: RecordType) -> Vec<LookupCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.record_type == record_type)
            .collect()
    }
}

#[async_trait]
impl DnsLookup for FakeLookup {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        server: Option<&str>,
    ) -> Result<Vec<DnsRecord>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(LookupCall {
                name: name.to_string(),
                record_type,
                server: server.map(str::to_string),
            });
        }
        let key = (name.to_string(), record_type);
        if self.failures.contains(&key) {
            anyhow::bail!("SERVFAIL for {name} {record_type}");
        }
        Ok(self.answers.get(&key).cloned().unwrap_or_default())
    }
}

/// Executor that records every request and fails the ones it is told to.
#[derive(Default)]
pub struct RecordingExecutor {
    requests: Mutex<Vec<UpdateRequest>>,
    fail_names: HashSet<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request whose first operation names `name`.
    pub fn failing_for(mut self, name: &str) -> Self {
        self.fail_names.insert(name.to_string());
        self
    }

    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UpdateExecutor for RecordingExecutor {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn apply(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let owner = request.owner().unwrap_or_default();
        if self.fail_names.contains(owner) {
            return Err(UpdateError::ExecutorFailed {
                name: owner.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Shorthand for an observed record.
pub fn rec(name: &str, ttl: u32, record_type: RecordType, value: &str) -> DnsRecord {
    DnsRecord::new(name, ttl, record_type, value)
}
