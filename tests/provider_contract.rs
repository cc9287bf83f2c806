// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Black-box contract tests for DNS providers.
//!
//! Exercises the full record lifecycle through the public registry and
//! provider API, using the in-memory backend as the reference
//! implementation of the provider contract.

use gwdns::dns::memory::MemoryProvider;
use gwdns::dns::{default_registry, Provider, Record};
use std::collections::HashMap;

#[tokio::test]
async fn test_registry_provider_record_lifecycle() {
    let registry = default_registry();
    let provider = registry
        .create("memory", &HashMap::new())
        .expect("memory provider should construct from empty settings");

    assert!(!provider.exists("web.example.com", "A").await.unwrap());

    provider
        .create(&Record::address("web.example.com", "1.1.1.1"))
        .await
        .unwrap();
    assert!(provider.exists("web.example.com", "A").await.unwrap());

    provider
        .update(&Record::address("web.example.com", "1.1.1.2"))
        .await
        .unwrap();

    provider.delete("web.example.com", "A").await.unwrap();
    assert!(!provider.exists("web.example.com", "A").await.unwrap());
}

#[tokio::test]
async fn test_upsert_converges_regardless_of_prior_state() {
    let provider = MemoryProvider::new();

    // absent: upsert creates
    provider
        .upsert(&Record::address("web.example.com", "1.1.1.1"))
        .await
        .unwrap();
    assert_eq!(
        provider.value_of("web.example.com", "A").await.as_deref(),
        Some("1.1.1.1")
    );

    // present: upsert updates in place
    provider
        .upsert(&Record::address("web.example.com", "1.1.1.2"))
        .await
        .unwrap();
    assert_eq!(provider.len().await, 1);
    assert_eq!(
        provider.value_of("web.example.com", "A").await.as_deref(),
        Some("1.1.1.2")
    );
}

#[tokio::test]
async fn test_record_metadata_survives_storage() {
    let provider = MemoryProvider::new();
    let record = Record::address("web.example.com", "1.1.1.1")
        .with_meta("description", "managed by gwdns");

    provider.create(&record).await.unwrap();
    assert!(provider.exists("web.example.com", "A").await.unwrap());
}
