// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for DNS provider operations and configuration loading.
//!
//! This module provides specialized error types for:
//! - DNS backend mutation failures (create, update, delete, exists)
//! - Provider registry lookups
//! - Static configuration loading (domain map, provider settings)
//!
//! The reconciler mostly only distinguishes "the call failed" from "it
//! succeeded", but a few variants carry protocol meaning: [`ProviderError::NotFound`]
//! during cleanup is treated as convergence, and [`ConfigError`] /
//! [`RegistryError::UnsupportedProvider`] are fatal at startup.

use thiserror::Error;

/// Errors that can occur during DNS backend operations.
///
/// Every variant preserves the operation and the record identity it targeted
/// so failures can be diagnosed from logs and status output alone.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A mutation targeted a record that does not exist on the backend.
    ///
    /// Returned by `update` and `delete` when no matching record is found.
    /// During deletion cleanup this is treated as success: the record is
    /// already in the desired (absent) state.
    #[error("no DNS record found for '{hostname}' ({record_type})")]
    NotFound {
        /// The fully-qualified hostname that was targeted
        hostname: String,
        /// The record type, e.g. "A"
        record_type: String,
    },

    /// A record matching the hostname and type already exists.
    ///
    /// Returned by `create` on backends that reject duplicate records.
    #[error("a DNS record already exists for '{hostname}' ({record_type})")]
    Conflict {
        /// The fully-qualified hostname that was targeted
        hostname: String,
        /// The record type, e.g. "A"
        record_type: String,
    },

    /// Required provider settings are missing or malformed.
    ///
    /// Raised by provider constructors; fatal at startup.
    #[error("invalid provider settings: {reason}")]
    InvalidSettings {
        /// Explanation of what is missing or malformed
        reason: String,
    },

    /// The backend answered but the response was not what the API contract promises.
    #[error("unexpected response from backend during {operation} for '{hostname}': {reason}")]
    UnexpectedResponse {
        /// The operation being performed, e.g. "addHostOverride"
        operation: String,
        /// The fully-qualified hostname that was targeted
        hostname: String,
        /// What was wrong with the response
        reason: String,
    },

    /// Network or transport-level failure talking to the backend.
    ///
    /// The reconciler aborts the current pass and relies on external
    /// re-scheduling; no automatic retry happens at this layer.
    #[error("transport error during {operation} for '{hostname}': {source}")]
    Transport {
        /// The operation being performed, e.g. "searchHostOverride"
        operation: String,
        /// The fully-qualified hostname that was targeted
        hostname: String,
        /// The underlying transport failure
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    /// Whether this error means the targeted record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the provider registry.
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    /// The configured provider name has no registered factory.
    ///
    /// The listed names are diagnostic output only, not a stability contract.
    #[error("unsupported DNS provider: '{name}' (registered: {registered:?})")]
    UnsupportedProvider {
        /// The provider name that was requested
        name: String,
        /// Names currently present in the registry
        registered: Vec<String>,
    },
}

/// Errors loading static configuration at startup.
///
/// These are fatal: the process should exit rather than loop a failing
/// reconciliation pass against bad configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("reading {path}: {source}")]
    Io {
        /// Path that failed to read
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed as YAML.
    #[error("parsing {path}: {source}")]
    Parse {
        /// Path that failed to parse
        path: String,
        /// Underlying YAML failure
        #[source]
        source: serde_yaml::Error,
    },

    /// A required field is missing from the configuration.
    #[error("{path}: missing required field '{field}'")]
    MissingField {
        /// Path of the offending file
        path: String,
        /// Name of the missing field
        field: String,
    },
}

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;
