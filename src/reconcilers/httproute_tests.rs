// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the DNS synchronization core of the HTTPRoute reconciler

#[cfg(test)]
mod tests {
    use crate::config::DomainMap;
    use crate::dns::memory::MemoryProvider;
    use crate::dns::{Provider, Record};
    use crate::dns_errors::ProviderError;
    use crate::reconcilers::sync_hostnames;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider double that records the order of mutation calls while
    /// delegating to an in-memory backend.
    #[derive(Default)]
    struct RecordingProvider {
        inner: MemoryProvider,
        ops: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn record(&self, op: &str, hostname: &str) {
            self.ops.lock().unwrap().push(format!("{op} {hostname}"));
        }

        fn ops(&self) -> Vec<String> {
            self.ops.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        async fn exists(&self, hostname: &str, record_type: &str) -> Result<bool, ProviderError> {
            self.record("exists", hostname);
            self.inner.exists(hostname, record_type).await
        }

        async fn create(&self, record: &Record) -> Result<(), ProviderError> {
            self.record("create", &record.hostname);
            self.inner.create(record).await
        }

        async fn update(&self, record: &Record) -> Result<(), ProviderError> {
            self.record("update", &record.hostname);
            self.inner.update(record).await
        }

        async fn delete(&self, hostname: &str, record_type: &str) -> Result<(), ProviderError> {
            self.record("delete", hostname);
            self.inner.delete(hostname, record_type).await
        }

        async fn upsert(&self, record: &Record) -> Result<(), ProviderError> {
            self.record("upsert", &record.hostname);
            self.inner.upsert(record).await
        }
    }

    /// Provider double whose deletes always fail with a backend error.
    #[derive(Default)]
    struct FailingDeleteProvider {
        creates: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Provider for FailingDeleteProvider {
        async fn exists(&self, _hostname: &str, _record_type: &str) -> Result<bool, ProviderError> {
            Ok(false)
        }

        async fn create(&self, record: &Record) -> Result<(), ProviderError> {
            self.creates.lock().unwrap().push(record.hostname.clone());
            Ok(())
        }

        async fn update(&self, _record: &Record) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn delete(&self, hostname: &str, _record_type: &str) -> Result<(), ProviderError> {
            Err(ProviderError::UnexpectedResponse {
                operation: "delHostOverride".to_string(),
                hostname: hostname.to_string(),
                reason: "backend unavailable".to_string(),
            })
        }
    }

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn domain_map() -> DomainMap {
        DomainMap::from_entries([("*.a.com".to_string(), "10.0.0.1".to_string())])
    }

    #[tokio::test]
    async fn test_removed_hostname_deleted_before_new_created() {
        let provider = RecordingProvider::default();
        provider
            .inner
            .create(&Record::address("old.a.com", "10.0.0.1"))
            .await
            .unwrap();

        sync_hostnames(
            &provider,
            &domain_map(),
            false,
            &hosts(&["old.a.com"]),
            &hosts(&["new.a.com"]),
        )
        .await
        .unwrap();

        let ops = provider.ops();
        let delete_pos = ops.iter().position(|op| op == "delete old.a.com").unwrap();
        let create_pos = ops.iter().position(|op| op == "create new.a.com").unwrap();
        assert!(
            delete_pos < create_pos,
            "stale record must be deleted before new records are written: {ops:?}"
        );
    }

    #[tokio::test]
    async fn test_unmapped_hostnames_are_skipped() {
        let provider = RecordingProvider::default();

        sync_hostnames(
            &provider,
            &domain_map(),
            false,
            &[],
            &hosts(&["app.other.org"]),
        )
        .await
        .unwrap();

        assert!(
            provider.ops().is_empty(),
            "hostnames outside the domain map must not touch the backend"
        );
    }

    #[tokio::test]
    async fn test_non_upsert_mode_leaves_existing_records_alone() {
        let provider = RecordingProvider::default();
        provider
            .inner
            .create(&Record::address("app.a.com", "9.9.9.9"))
            .await
            .unwrap();

        sync_hostnames(&provider, &domain_map(), false, &[], &hosts(&["app.a.com"]))
            .await
            .unwrap();

        // Documented default behavior: drift is not corrected.
        assert_eq!(
            provider.inner.value_of("app.a.com", "A").await.as_deref(),
            Some("9.9.9.9")
        );
        assert!(provider.ops().iter().all(|op| !op.starts_with("create")));
    }

    #[tokio::test]
    async fn test_upsert_mode_corrects_drift() {
        let provider = RecordingProvider::default();
        provider
            .inner
            .create(&Record::address("app.a.com", "9.9.9.9"))
            .await
            .unwrap();

        sync_hostnames(&provider, &domain_map(), true, &[], &hosts(&["app.a.com"]))
            .await
            .unwrap();

        assert_eq!(
            provider.inner.value_of("app.a.com", "A").await.as_deref(),
            Some("10.0.0.1")
        );
    }

    #[tokio::test]
    async fn test_delete_of_absent_record_counts_as_success() {
        let provider = RecordingProvider::default();

        // previous claims a record the backend no longer has
        sync_hostnames(
            &provider,
            &domain_map(),
            false,
            &hosts(&["gone.a.com"]),
            &[],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_failed_delete_aborts_the_pass() {
        let provider = FailingDeleteProvider::default();

        let err = sync_hostnames(
            &provider,
            &domain_map(),
            false,
            &hosts(&["dead.a.com"]),
            &hosts(&["new.a.com"]),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("dead.a.com"));
        assert!(
            provider.creates.lock().unwrap().is_empty(),
            "no creations may happen after a failed deletion"
        );
    }

    #[tokio::test]
    async fn test_new_hostname_created_with_managed_description() {
        let provider = RecordingProvider::default();

        sync_hostnames(&provider, &domain_map(), false, &[], &hosts(&["app.a.com"]))
            .await
            .unwrap();

        assert_eq!(
            provider.inner.value_of("app.a.com", "A").await.as_deref(),
            Some("10.0.0.1")
        );
    }
}
