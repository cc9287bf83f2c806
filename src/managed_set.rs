// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tracking of which hostnames were synchronized on the previous pass.
//!
//! The reconciler persists the hostname list it last synchronized as a JSON
//! array in an annotation on the `HTTPRoute` itself. Comparing that
//! previous set against the currently-declared hostnames yields the
//! hostnames whose records must be deleted: they no longer appear in the
//! spec, so the spec alone cannot tell us about them.
//!
//! A missing or unparsable annotation reads as the empty set; it is never
//! an error, since the first pass for a route legitimately has no history.

use crate::constants::MANAGED_HOSTNAMES_ANNOTATION;
use crate::crd::HTTPRoute;
use kube::ResourceExt;
use std::collections::HashSet;
use tracing::debug;

/// Read the previously-synchronized hostname set from the route's annotation.
///
/// Returns the empty set when the annotation is absent or does not parse as
/// a JSON string array.
#[must_use]
pub fn managed_hostnames(route: &HTTPRoute) -> Vec<String> {
    let Some(raw) = route.annotations().get(MANAGED_HOSTNAMES_ANNOTATION) else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(hostnames) => hostnames,
        Err(e) => {
            debug!(
                route = %route.name_any(),
                error = %e,
                "managed-hostnames annotation is unparsable, treating as empty"
            );
            Vec::new()
        }
    }
}

/// Encode a hostname list for storage in the annotation.
#[must_use]
pub fn encode_managed_hostnames(hostnames: &[String]) -> String {
    // A Vec<String> never fails to serialize
    serde_json::to_string(hostnames).unwrap_or_else(|_| "[]".to_string())
}

/// Hostnames present in `previous` but absent from `current`.
///
/// Order follows `previous`, giving deterministic cleanup ordering in logs
/// and tests. Duplicate entries within either list are collapsed; the
/// inputs are conceptually sets.
#[must_use]
pub fn removed_hostnames(previous: &[String], current: &[String]) -> Vec<String> {
    let current: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    previous
        .iter()
        .filter(|h| !current.contains(h.as_str()) && seen.insert(h.as_str()))
        .cloned()
        .collect()
}

/// Whether two hostname lists are equal as sets.
///
/// Order and duplicates are ignored; only membership matters.
#[must_use]
pub fn sets_equal(a: &[String], b: &[String]) -> bool {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a == b
}

#[cfg(test)]
#[path = "managed_set_tests.rs"]
mod managed_set_tests;
