// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed access to Gateway API `HTTPRoute` resources.
//!
//! gwdns watches `HTTPRoute` objects served by the cluster's Gateway API
//! installation (`gateway.networking.k8s.io/v1`). The CRD is owned by the
//! Gateway API project, not by this operator, so this module models only the
//! fields the operator consumes: the declared hostnames and, for logging,
//! the parent gateway references. Unknown fields are ignored on read, and
//! the operator never writes the spec back; all its writes are
//! metadata-only merge patches (finalizers and annotations), so partial
//! modeling cannot clobber server-side state.
//!
//! # Example
//!
//! ```rust
//! use gwdns::crd::HTTPRouteSpec;
//!
//! let spec = HTTPRouteSpec {
//!     hostnames: vec!["app.example.com".to_string()],
//!     parent_refs: vec![],
//! };
//! assert_eq!(spec.hostnames.len(), 1);
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference from an `HTTPRoute` to the Gateway it attaches to.
///
/// Carried for diagnostics only; gwdns does not resolve gateways.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    /// Name of the referenced Gateway.
    pub name: String,

    /// Namespace of the referenced Gateway, when different from the route's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Listener section of the Gateway the route attaches to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
}

/// The subset of the `HTTPRoute` spec consumed by gwdns.
///
/// `hostnames` is the desired state this operator reconciles: every listed
/// hostname that resolves through the domain map gets an address record in
/// the DNS backend.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1",
    kind = "HTTPRoute",
    namespaced,
    doc = "HTTPRoute is the Gateway API route resource whose hostnames gwdns synchronizes into the DNS backend. The CRD itself is installed by the Gateway API project."
)]
#[serde(rename_all = "camelCase")]
pub struct HTTPRouteSpec {
    /// Hostnames the route serves (e.g., "app.example.com").
    ///
    /// These are the hostnames synchronized into DNS. An empty list means
    /// the route has no DNS footprint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,

    /// Gateways this route attaches to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_refs: Vec<ParentReference>,
}

/// One-line human-readable summary of a route for log output.
///
/// e.g. `default/my-route hostnames=[app.example.com] parents=[gw]`
#[must_use]
pub fn format_route(route: &HTTPRoute) -> String {
    use kube::ResourceExt;

    let parents: Vec<&str> = route
        .spec
        .parent_refs
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    format!(
        "{}/{} hostnames={:?} parents={:?}",
        route.namespace().unwrap_or_default(),
        route.name_any(),
        route.spec.hostnames,
        parents
    )
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
