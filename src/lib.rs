// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # gwdns - Gateway API DNS Sync Operator for Kubernetes
//!
//! gwdns is a Kubernetes operator written in Rust that watches Gateway API
//! `HTTPRoute` resources and keeps an external DNS backend synchronized
//! with their declared hostnames.
//!
//! ## Overview
//!
//! For every hostname on a watched route that resolves through the static
//! domain map, gwdns maintains an address record in the configured DNS
//! backend. Hostnames removed from a route, and routes that are deleted,
//! have their records cleaned up: a finalizer guarantees that DNS cleanup
//! happens before Kubernetes completes the route's deletion, and the set of
//! hostnames synchronized on the last pass is persisted on the route so
//! removals are detected even across operator restarts.
//!
//! ## Modules
//!
//! - [`crd`] - typed access to Gateway API `HTTPRoute` resources
//! - [`config`] - domain map and DNS provider configuration
//! - [`dns`] - the record model, provider contract, registry, and backends
//! - [`managed_set`] - previous/current hostname set tracking
//! - [`reconcilers`] - the `HTTPRoute` state machine and conflict-retry policy
//! - [`context`] - shared collaborators for reconciliation passes
//! - [`metrics`] - Prometheus metrics and probe endpoints
//!
//! ## Example
//!
//! ```rust
//! use gwdns::config::DomainMap;
//!
//! let map = DomainMap::from_yaml(concat!(
//!     "\"*.example.com\": 10.0.0.1\n",
//!     "\"app2.example.com\": 10.0.0.2\n",
//! ))
//! .unwrap();
//!
//! // Exact entries win over wildcards.
//! assert_eq!(map.lookup("app1.example.com"), Some("10.0.0.1"));
//! assert_eq!(map.lookup("app2.example.com"), Some("10.0.0.2"));
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod dns;
pub mod dns_errors;
pub mod managed_set;
pub mod metrics;
pub mod reconcilers;
