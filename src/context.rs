// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context passed to the controller.
//!
//! The reconciler receives an `Arc<Context>` holding its collaborators: the
//! Kubernetes client, the immutable domain map, the DNS provider, and the
//! upsert-mode flag. Everything here is read-only after startup, so the
//! context is freely shared across concurrent reconciliation passes.

use crate::config::DomainMap;
use crate::dns::Provider;
use kube::Client;

/// Collaborators shared by all reconciliation passes.
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Static hostname-to-target table, loaded once at startup
    pub domain_map: DomainMap,

    /// The configured DNS backend
    pub provider: Box<dyn Provider>,

    /// When true, records are unconditionally reconciled (create-or-update);
    /// when false, only missing records are created.
    pub upsert: bool,
}

impl Context {
    /// Build a context from its collaborators.
    #[must_use]
    pub fn new(client: Client, domain_map: DomainMap, provider: Box<dyn Provider>, upsert: bool) -> Self {
        Self {
            client,
            domain_map,
            provider,
            upsert,
        }
    }
}
