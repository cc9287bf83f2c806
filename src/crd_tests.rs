// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the HTTPRoute typed resource

#[cfg(test)]
mod tests {
    use crate::crd::{format_route, HTTPRoute, HTTPRouteSpec, ParentReference};
    use serde_json::json;

    #[test]
    fn test_deserializes_full_manifest_ignoring_unmodeled_fields() {
        // Real HTTPRoute objects carry rules, filters, and status; only the
        // fields gwdns consumes need to parse.
        let route: HTTPRoute = serde_json::from_value(json!({
            "apiVersion": "gateway.networking.k8s.io/v1",
            "kind": "HTTPRoute",
            "metadata": { "name": "web", "namespace": "default" },
            "spec": {
                "hostnames": ["app.example.com", "www.example.com"],
                "parentRefs": [{ "name": "gw", "sectionName": "https" }],
                "rules": [{ "backendRefs": [{ "name": "web-svc", "port": 80 }] }]
            },
            "status": { "parents": [] }
        }))
        .expect("manifest should deserialize");

        assert_eq!(
            route.spec.hostnames,
            vec!["app.example.com", "www.example.com"]
        );
        assert_eq!(route.spec.parent_refs.len(), 1);
        assert_eq!(route.spec.parent_refs[0].name, "gw");
        assert_eq!(
            route.spec.parent_refs[0].section_name.as_deref(),
            Some("https")
        );
    }

    #[test]
    fn test_hostnames_default_to_empty() {
        let route: HTTPRoute = serde_json::from_value(json!({
            "apiVersion": "gateway.networking.k8s.io/v1",
            "kind": "HTTPRoute",
            "metadata": { "name": "bare" },
            "spec": {}
        }))
        .unwrap();

        assert!(route.spec.hostnames.is_empty());
        assert!(route.spec.parent_refs.is_empty());
    }

    #[test]
    fn test_format_route_summarizes_hostnames_and_parents() {
        let mut route = HTTPRoute::new(
            "web",
            HTTPRouteSpec {
                hostnames: vec!["app.example.com".to_string()],
                parent_refs: vec![ParentReference {
                    name: "gw".to_string(),
                    namespace: None,
                    section_name: None,
                }],
            },
        );
        route.metadata.namespace = Some("default".to_string());

        let summary = format_route(&route);
        assert!(summary.contains("default/web"));
        assert!(summary.contains("app.example.com"));
        assert!(summary.contains("gw"));
    }
}
