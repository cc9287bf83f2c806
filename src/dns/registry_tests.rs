// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the provider registry

#[cfg(test)]
mod tests {
    use crate::dns::registry::{default_registry, ProviderRegistry};
    use crate::dns_errors::RegistryError;
    use std::collections::HashMap;

    #[test]
    fn test_default_registry_knows_builtin_providers() {
        let registry = default_registry();
        assert_eq!(registry.names(), vec!["memory", "opnsense"]);
    }

    #[test]
    fn test_create_memory_provider() {
        let registry = default_registry();
        let provider = registry.create("memory", &HashMap::new());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_create_unknown_provider_lists_registered_names() {
        let registry = default_registry();
        let err = registry.create("route53", &HashMap::new()).err().unwrap();

        let registry_err = err
            .downcast_ref::<RegistryError>()
            .expect("should be a RegistryError");
        match registry_err {
            RegistryError::UnsupportedProvider { name, registered } => {
                assert_eq!(name, "route53");
                assert_eq!(registered, &vec!["memory".to_string(), "opnsense".to_string()]);
            }
        }
    }

    #[test]
    fn test_factory_failure_is_surfaced() {
        let registry = default_registry();
        // opnsense requires base_url, api_key, api_secret
        let err = registry.create("opnsense", &HashMap::new()).err().unwrap();
        assert!(err.to_string().contains("opnsense"));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut registry = ProviderRegistry::new();
        registry.register("memory", crate::dns::memory::factory);
        registry.register("memory", crate::dns::memory::factory);
    }
}
