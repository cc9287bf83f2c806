// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory DNS backend.
//!
//! Holds records in a process-local map, implementing the exact
//! [`Provider`] error contract (create conflicts, update/delete of missing
//! records fail with not-found). Useful for local development without a
//! real backend and as the reference implementation for contract tests.

use crate::dns::{Provider, Record};
use crate::dns_errors::ProviderError;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Registry factory for the `"memory"` provider name. Ignores all settings.
///
/// # Errors
///
/// Never fails; the signature matches [`crate::dns::registry::ProviderFactory`].
pub fn factory(_settings: &HashMap<String, String>) -> Result<Box<dyn Provider>> {
    Ok(Box::new(MemoryProvider::new()))
}

/// DNS provider that stores records in memory.
///
/// Keys are `(hostname, record type)` pairs, compared case-insensitively
/// with a single trailing dot stripped.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    records: RwLock<HashMap<(String, String), Record>>,
}

impl MemoryProvider {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(hostname: &str, record_type: &str) -> (String, String) {
        let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
        (
            hostname.to_ascii_lowercase(),
            record_type.to_ascii_lowercase(),
        )
    }

    /// Current value for a record, if present. Test and debugging helper.
    pub async fn value_of(&self, hostname: &str, record_type: &str) -> Option<String> {
        self.records
            .read()
            .await
            .get(&Self::key(hostname, record_type))
            .map(|r| r.value.clone())
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    async fn exists(&self, hostname: &str, record_type: &str) -> Result<bool, ProviderError> {
        Ok(self
            .records
            .read()
            .await
            .contains_key(&Self::key(hostname, record_type)))
    }

    async fn create(&self, record: &Record) -> Result<(), ProviderError> {
        let key = Self::key(&record.hostname, &record.record_type);
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(ProviderError::Conflict {
                hostname: record.hostname.clone(),
                record_type: record.record_type.clone(),
            });
        }
        records.insert(key, record.clone());
        info!(hostname = %record.hostname, value = %record.value, "memory: record created");
        Ok(())
    }

    async fn update(&self, record: &Record) -> Result<(), ProviderError> {
        let key = Self::key(&record.hostname, &record.record_type);
        let mut records = self.records.write().await;
        if !records.contains_key(&key) {
            return Err(ProviderError::NotFound {
                hostname: record.hostname.clone(),
                record_type: record.record_type.clone(),
            });
        }
        records.insert(key, record.clone());
        info!(hostname = %record.hostname, value = %record.value, "memory: record updated");
        Ok(())
    }

    async fn delete(&self, hostname: &str, record_type: &str) -> Result<(), ProviderError> {
        let mut records = self.records.write().await;
        if records.remove(&Self::key(hostname, record_type)).is_none() {
            return Err(ProviderError::NotFound {
                hostname: hostname.to_string(),
                record_type: record_type.to_string(),
            });
        }
        info!(hostname, record_type, "memory: record deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
