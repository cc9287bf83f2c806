// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the gwdns operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Lifecycle Protocol Constants
// ============================================================================

/// Finalizer placed on `HTTPRoute` resources with outstanding DNS cleanup obligations.
///
/// While present, Kubernetes blocks deletion of the route until the operator
/// has removed every DNS record it created for the route's hostnames.
pub const CLEANUP_FINALIZER: &str = "gwdns.dev/cleanup";

/// Annotation holding the JSON-encoded list of hostnames synchronized on the
/// last successful reconciliation pass.
///
/// Persisting the set on the route itself means removed hostnames can be
/// detected across process restarts and by any operator replica.
pub const MANAGED_HOSTNAMES_ANNOTATION: &str = "gwdns.dev/managed-hostnames";

// ============================================================================
// DNS Constants
// ============================================================================

/// Record type written for every synchronized hostname.
pub const RECORD_TYPE_A: &str = "A";

/// Description attached to records so operators can identify gwdns-managed
/// entries in the backend UI.
pub const MANAGED_BY_DESCRIPTION: &str = "managed by gwdns";

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Environment variable overriding the domain map file location
pub const DOMAIN_MAP_PATH_ENV: &str = "DOMAIN_MAP_PATH";

/// Default domain map file location
pub const DEFAULT_DOMAIN_MAP_PATH: &str = "configs/domain-map.yaml";

/// Environment variable overriding the provider config file location
pub const DNS_PROVIDER_PATH_ENV: &str = "DNS_PROVIDER_PATH";

/// Default provider config file location
pub const DEFAULT_DNS_PROVIDER_PATH: &str = "configs/dns-provider.yaml";

// ============================================================================
// Controller Timing Constants
// ============================================================================

/// Steady-state requeue interval after a successful reconciliation (seconds)
pub const REQUEUE_AFTER_SUCCESS_SECS: u64 = 300;

/// Requeue interval after a failed reconciliation (seconds)
pub const REQUEUE_AFTER_ERROR_SECS: u64 = 30;

/// Default bind address for the metrics and health probe server
pub const DEFAULT_PROBE_ADDR: &str = "0.0.0.0:8080";
