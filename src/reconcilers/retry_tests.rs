// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the conflict-retry policy

#[cfg(test)]
mod tests {
    use crate::reconcilers::retry::{is_conflict, retry_on_conflict, CONFLICT_RETRY_ATTEMPTS};
    use kube::core::response::StatusSummary;
    use kube::core::Status;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn conflict() -> kube::Error {
        kube::Error::Api(Box::new(Status {
            status: Some(StatusSummary::Failure),
            message: "the object has been modified".to_string(),
            reason: "Conflict".to_string(),
            code: 409,
            details: None,
            metadata: None,
        }))
    }

    fn forbidden() -> kube::Error {
        kube::Error::Api(Box::new(Status {
            status: Some(StatusSummary::Failure),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
            details: None,
            metadata: None,
        }))
    }

    #[test]
    fn test_is_conflict_classification() {
        assert!(is_conflict(&conflict()));
        assert!(!is_conflict(&forbidden()));
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result = retry_on_conflict(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<u32, kube::Error>(n) }
            },
            "test write",
        )
        .await
        .unwrap();

        assert_eq!(result, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_converges_after_conflicts_within_budget() {
        // Fails with Conflict exactly N-1 times, then succeeds.
        let calls = AtomicU32::new(0);
        let result = retry_on_conflict(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < CONFLICT_RETRY_ATTEMPTS {
                        Err(conflict())
                    } else {
                        Ok(n)
                    }
                }
            },
            "test write",
        )
        .await
        .unwrap();

        assert_eq!(result, CONFLICT_RETRY_ATTEMPTS);
        assert_eq!(calls.load(Ordering::SeqCst), CONFLICT_RETRY_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_fails_the_pass() {
        let calls = AtomicU32::new(0);
        let err = retry_on_conflict(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), kube::Error>(conflict()) }
            },
            "test write",
        )
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), CONFLICT_RETRY_ATTEMPTS);
        assert!(err.to_string().contains("test write"));
    }

    #[tokio::test]
    async fn test_non_conflict_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let err = retry_on_conflict(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), kube::Error>(forbidden()) }
            },
            "test write",
        )
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "no retry on client errors");
        assert!(err.to_string().contains("test write"));
    }
}
