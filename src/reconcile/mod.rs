// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation engine.
//!
//! A run observes the records currently published for the host, plans each
//! quadrant with [`plan::plan_quadrant`], then applies the resulting
//! operations one at a time.
//!
//! ## Routing
//!
//! The forward zone of the FQDN and the reverse zone of every address are
//! located independently through the SOA walk, since they may have different
//! masters. Queries and updates for an owner name go to its zone master, or
//! to the default resolver when no SOA was found. A pinned server replaces
//! the master; the walk still runs against it to name each update's zone.
//!
//! ## Concurrency
//!
//! The engine keeps no state between runs and provides no mutual exclusion.
//! Two runs racing for the same host (a DHCP renewal firing during a manual
//! run) must be serialized by the caller.

pub mod plan;

use serde::Serialize;
use std::net::IpAddr;
use tracing::{debug, info, warn};

use crate::config::{Policy, UpdateTarget};
use crate::dns::soa::{SoaResolver, UpdateRoute};
use crate::dns::{reverse_name, DnsLookup, RecordType};
use crate::identity::Identity;
use crate::update::{UpdateExecutor, UpdateRequest};
use plan::{plan_quadrant, plan_stale_reverse, DesiredValue, Operation, Quadrant, QuadrantPlan};

/// A quadrant plan together with where its operations are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledPlan {
    pub plan: QuadrantPlan,
    pub route: UpdateRoute,
}

/// Final state of one applied operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OperationState {
    Applied,
    Failed { reason: String },
}

/// An operation and what became of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub operation: Operation,
    #[serde(flatten)]
    pub state: OperationState,
}

/// Everything a run planned and applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub plans: Vec<ScheduledPlan>,
    pub outcomes: Vec<OperationOutcome>,
}

impl RunReport {
    /// All planned operations in application order.
    #[must_use]
    pub fn operations(&self) -> Vec<&Operation> {
        self.plans
            .iter()
            .flat_map(|p| p.plan.operations.iter())
            .collect()
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == OperationState::Applied)
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.applied()
    }

    /// True when DNS already matched the identity.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.plans.iter().all(|p| p.plan.is_empty())
    }
}

/// Drives one reconciliation run.
pub struct Reconciler<'a, L: DnsLookup + ?Sized, U: UpdateExecutor + ?Sized> {
    lookup: &'a L,
    executor: &'a U,
    policy: Policy,
    target: &'a UpdateTarget,
}

impl<'a, L: DnsLookup + ?Sized, U: UpdateExecutor + ?Sized> Reconciler<'a, L, U> {
    #[must_use]
    pub fn new(lookup: &'a L, executor: &'a U, policy: Policy, target: &'a UpdateTarget) -> Self {
        Self {
            lookup,
            executor,
            policy,
            target,
        }
    }

    /// Observe DNS and plan every quadrant for `identity`.
    ///
    /// Forward quadrants come first, then one reverse plan per desired address,
    /// then cleanup of PTRs left behind by addresses the host no longer holds.
    pub async fn plan(&self, identity: &Identity) -> Vec<ScheduledPlan> {
        let fqdn = identity.fqdn();
        let mut soa = SoaResolver::new(self.lookup, self.target.server.clone());
        let mut plans = Vec::new();

        let forward_route = soa.route_for(fqdn).await;
        debug!(
            "Forward route for {}: server={:?} zone={:?}",
            fqdn, forward_route.server, forward_route.zone
        );

        let desired_v4: Vec<DesiredValue> = identity
            .ipv4()
            .iter()
            .map(|e| DesiredValue::new(e.ip.to_string(), e.ttl))
            .collect();
        let desired_v6: Vec<DesiredValue> = identity
            .ipv6()
            .iter()
            .map(|e| DesiredValue::new(e.ip.to_string(), e.ttl))
            .collect();

        for (quadrant, desired) in [
            (Quadrant::NameToA, &desired_v4),
            (Quadrant::NameToAaaa, &desired_v6),
        ] {
            let observed = self
                .lookup
                .query(
                    fqdn,
                    Some(quadrant.record_type()),
                    forward_route.server.as_deref(),
                )
                .await;
            plans.push(ScheduledPlan {
                plan: plan_quadrant(quadrant, fqdn, desired, &observed, &self.policy),
                route: forward_route.clone(),
            });
        }

        let reverse_targets = identity
            .ipv4()
            .iter()
            .map(|e| (IpAddr::V4(e.ip), e.ttl))
            .chain(identity.ipv6().iter().map(|e| (IpAddr::V6(e.ip), e.ttl)))
            .collect::<Vec<_>>();

        for (ip, ttl) in reverse_targets {
            let quadrant = reverse_quadrant(&ip);
            let owner = reverse_name(&ip);
            let route = soa.route_for(&owner).await;
            let observed = self
                .lookup
                .query(&owner, Some(RecordType::PTR), route.server.as_deref())
                .await;
            let desired = [DesiredValue::new(fqdn, ttl)];
            plans.push(ScheduledPlan {
                plan: plan_quadrant(quadrant, &owner, &desired, &observed, &self.policy),
                route,
            });
        }

        // Addresses dropped from the forward side may still own a PTR to us
        let mut departed: Vec<IpAddr> = Vec::new();
        for ip in plans
            .iter()
            .filter(|p| !p.plan.quadrant.is_reverse())
            .flat_map(|p| p.plan.stale.iter())
            .filter_map(|r| r.value.parse::<IpAddr>().ok())
        {
            if !departed.contains(&ip) {
                departed.push(ip);
            }
        }

        for ip in departed {
            let quadrant = reverse_quadrant(&ip);
            let owner = reverse_name(&ip);
            let route = soa.route_for(&owner).await;
            let observed = self
                .lookup
                .query(&owner, Some(RecordType::PTR), route.server.as_deref())
                .await;
            let plan = plan_stale_reverse(quadrant, &owner, fqdn, &observed);
            if !plan.is_empty() {
                plans.push(ScheduledPlan { plan, route });
            }
        }

        plans
    }

    /// Apply every planned operation in order.
    ///
    /// A failed operation is logged and the run moves on to the next one.
    pub async fn apply(&self, plans: Vec<ScheduledPlan>) -> RunReport {
        let mut outcomes = Vec::new();

        for scheduled in &plans {
            for op in &scheduled.plan.operations {
                let request = UpdateRequest {
                    server: scheduled.route.server.clone(),
                    zone: scheduled.route.zone.clone(),
                    source_address: self.target.source_address,
                    transport: self.target.transport,
                    operations: vec![op.clone()],
                };

                info!("[{}] {}", scheduled.plan.quadrant, op);
                let state = match self.executor.apply(&request).await {
                    Ok(()) => OperationState::Applied,
                    Err(e) => {
                        warn!(
                            "[{}] {} failed via {}: {}",
                            scheduled.plan.quadrant,
                            op,
                            self.executor.name(),
                            e
                        );
                        OperationState::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                outcomes.push(OperationOutcome {
                    operation: op.clone(),
                    state,
                });
            }
        }

        RunReport { plans, outcomes }
    }

    /// Plan and apply.
    pub async fn run(&self, identity: &Identity) -> RunReport {
        let plans = self.plan(identity).await;
        let report = self.apply(plans).await;
        info!(
            "Reconciled {}: {} applied, {} failed",
            identity.fqdn(),
            report.applied(),
            report.failed()
        );
        report
    }
}

fn reverse_quadrant(ip: &IpAddr) -> Quadrant {
    match ip {
        IpAddr::V4(_) => Quadrant::Ipv4ToPtr,
        IpAddr::V6(_) => Quadrant::Ipv6ToPtr,
    }
}
