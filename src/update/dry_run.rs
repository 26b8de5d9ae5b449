// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dry-run executor.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

use super::{UpdateExecutor, UpdateRequest};
use crate::errors::UpdateError;

/// Echoes each transaction as an nsupdate script instead of sending it.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    echo: bool,
    transactions: Mutex<Vec<String>>,
}

impl DryRunExecutor {
    /// Create an executor. With `echo` set, scripts are also printed to stdout.
    #[must_use]
    pub fn new(echo: bool) -> Self {
        Self {
            echo,
            transactions: Mutex::new(Vec::new()),
        }
    }

    /// Scripts of every transaction seen so far.
    #[must_use]
    pub fn transactions(&self) -> Vec<String> {
        self.transactions
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UpdateExecutor for DryRunExecutor {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn apply(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        let script = request.to_nsupdate_script();
        info!("Dry run, not sending:\n{}", script.trim_end());
        if self.echo {
            print!("{script}");
        }
        if let Ok(mut transactions) = self.transactions.lock() {
            transactions.push(script);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "dry_run_tests.rs"]
mod dry_run_tests;
