// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS backend abstraction: the record model, the provider capability
//! contract, and the provider registry.
//!
//! The reconciler depends only on the [`Provider`] trait, never on a
//! concrete backend. Backends implement the four mutation primitives;
//! [`Provider::upsert`] is a provided composite and the only operation with
//! unconditional idempotence guaranteed by contract.
//!
//! # Available backends
//!
//! - [`opnsense`] - OPNsense Unbound host overrides via the firewall's HTTP API
//! - [`memory`] - in-process store for local development and tests

use crate::dns_errors::ProviderError;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub mod memory;
pub mod opnsense;
pub mod registry;

pub use registry::{default_registry, ProviderRegistry};

/// One DNS address mapping under management.
///
/// Records are constructed fresh by the reconciler for every mutation call
/// and never persisted by the operator itself; persistence is the backend's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Fully-qualified hostname, e.g. "app.example.com"
    pub hostname: String,

    /// Record type tag, e.g. "A". Opaque to the core so backends can
    /// extend it.
    pub record_type: String,

    /// The value the name should resolve to (an address string).
    pub value: String,

    /// Time-to-live in seconds; 0 means "use the backend default".
    pub ttl: u32,

    /// Backend-specific metadata (e.g. a free-text description), carried
    /// opaquely by the core and interpreted only by the backend.
    pub meta: BTreeMap<String, String>,
}

impl Record {
    /// Build an address record for a hostname and target value.
    #[must_use]
    pub fn address(hostname: &str, value: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            record_type: crate::constants::RECORD_TYPE_A.to_string(),
            value: value.to_string(),
            ttl: 0,
            meta: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry, builder-style.
    #[must_use]
    pub fn with_meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }
}

/// Capability contract every DNS backend must satisfy.
///
/// All operations may perform network I/O and block for the duration of one
/// reconciliation pass; none are assumed cheap. Implementations must be
/// internally thread-safe: the operator calls a single provider instance
/// concurrently from passes for different resource keys.
///
/// # Error semantics
///
/// - `exists` must reflect the backend's current authoritative state with
///   no caching across calls.
/// - `create` fails with [`ProviderError::Conflict`] if a matching record
///   already exists (backend-dependent); it is not retried internally.
/// - `update` and `delete` fail with [`ProviderError::NotFound`] if no
///   matching record exists.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Check whether a record for the hostname and type exists on the backend.
    async fn exists(&self, hostname: &str, record_type: &str) -> Result<bool, ProviderError>;

    /// Create a new record.
    async fn create(&self, record: &Record) -> Result<(), ProviderError>;

    /// Update an existing record.
    async fn update(&self, record: &Record) -> Result<(), ProviderError>;

    /// Delete the record for the hostname and type.
    async fn delete(&self, hostname: &str, record_type: &str) -> Result<(), ProviderError>;

    /// Create the record if absent, update it if present.
    ///
    /// This composite is idempotent regardless of prior state: calling it
    /// twice leaves exactly one record carrying the latest value.
    async fn upsert(&self, record: &Record) -> Result<(), ProviderError> {
        if self.exists(&record.hostname, &record.record_type).await? {
            self.update(record).await
        } else {
            self.create(record).await
        }
    }
}

/// Split an FQDN into its first label and the remaining domain.
///
/// A single trailing dot is stripped first. Names without a dot come back
/// with an empty domain part.
///
/// # Example
///
/// ```rust
/// use gwdns::dns::split_hostname;
///
/// assert_eq!(split_hostname("app.example.com"), ("app", "example.com"));
/// assert_eq!(split_hostname("sub.app.example.com"), ("sub", "app.example.com"));
/// assert_eq!(split_hostname("localhost"), ("localhost", ""));
/// ```
#[must_use]
pub fn split_hostname(fqdn: &str) -> (&str, &str) {
    let fqdn = fqdn.strip_suffix('.').unwrap_or(fqdn);
    match fqdn.split_once('.') {
        Some((host, domain)) => (host, domain),
        None => (fqdn, ""),
    }
}
