// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name-keyed registry of DNS provider factories.
//!
//! The registry is an explicit instance built once during process
//! construction and injected where needed; providers do not self-register
//! through global state, so there is no hidden import-order dependence.
//! After startup the registry is read-only.

use crate::dns::Provider;
use crate::dns_errors::RegistryError;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Constructor function a backend contributes to the registry.
///
/// Receives the opaque settings map from the provider config and returns a
/// ready-to-use provider instance.
pub type ProviderFactory = fn(&HashMap<String, String>) -> Result<Box<dyn Provider>>;

/// Process-wide mapping of provider names to their factories.
///
/// Construct with [`ProviderRegistry::new`] and populate via
/// [`ProviderRegistry::register`], or use [`default_registry`] which knows
/// all built-in backends.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory under a name.
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered. Duplicate registration is a
    /// programming error, not a recoverable runtime condition.
    pub fn register(&mut self, name: &str, factory: ProviderFactory) {
        assert!(
            self.factories.insert(name.to_string(), factory).is_none(),
            "DNS provider '{name}' already registered"
        );
        debug!(provider = name, "registered DNS provider");
    }

    /// Construct the named provider from its settings.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnsupportedProvider`] (listing the
    /// registered names for diagnosis) when the name is unknown, or the
    /// factory's own error when construction fails.
    pub fn create(
        &self,
        name: &str,
        settings: &HashMap<String, String>,
    ) -> Result<Box<dyn Provider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnsupportedProvider {
                name: name.to_string(),
                registered: self.names(),
            })?;
        factory(settings).with_context(|| format!("constructing DNS provider '{name}'"))
    }

    /// Names currently registered, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

/// Build a registry containing every built-in backend.
#[must_use]
pub fn default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register("opnsense", crate::dns::opnsense::factory);
    registry.register("memory", crate::dns::memory::factory);
    registry
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
