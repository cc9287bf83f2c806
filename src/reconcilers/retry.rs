// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Optimistic-concurrency conflict retry for resource writes.
//!
//! Other actors (status writers, users) may modify an `HTTPRoute` between
//! our read and write, so every state-mutating write goes through a bounded
//! retry loop: re-fetch the resource, re-apply the intended mutation to the
//! fresh copy, attempt the write, and repeat on HTTP 409 up to a fixed
//! budget. Exceeding the budget surfaces as a pass failure and the external
//! scheduler retries the whole pass.
//!
//! Only 409 Conflict is retried here. Other API errors fail the pass
//! immediately; transient backend failures are handled by re-scheduling,
//! not by this loop.

use anyhow::{Context, Result};
use kube::api::{Patch, PatchParams};
use kube::{Api, Resource, ResourceExt};
use rand::RngExt;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum write attempts per mutation, the first try included.
pub const CONFLICT_RETRY_ATTEMPTS: u32 = 5;

/// Base delay before the first retry; doubles each attempt.
const RETRY_BASE_DELAY_MILLIS: u64 = 50;

/// Randomization factor applied to retry delays (±10%).
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Whether a Kubernetes API error is an optimistic-concurrency conflict.
#[must_use]
pub fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 409)
}

/// Delay before the given retry attempt, exponentially grown with jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base = RETRY_BASE_DELAY_MILLIS * 2u64.saturating_pow(attempt.saturating_sub(1));
    let base = base as f64;
    let delta = base * RANDOMIZATION_FACTOR;
    let jittered = rand::rng().random_range((base - delta)..=(base + delta));
    Duration::from_millis(jittered.max(0.0) as u64)
}

/// Run a write operation, retrying on 409 Conflict up to the retry budget.
///
/// The operation is responsible for re-fetching fresh state on each call;
/// this function only classifies errors and paces the retries.
///
/// # Errors
///
/// Returns the operation's error when it is not a conflict, or the final
/// conflict error once the budget is exhausted.
pub async fn retry_on_conflict<T, F, Fut>(mut operation: F, operation_name: &str) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, kube::Error>>,
{
    for attempt in 1..=CONFLICT_RETRY_ATTEMPTS {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt, "write succeeded after conflict retries"
                    );
                }
                return Ok(value);
            }
            Err(e) if is_conflict(&e) && attempt < CONFLICT_RETRY_ATTEMPTS => {
                let delay = backoff_delay(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    retry_after = ?delay,
                    "resource modified concurrently, refetching and retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("{operation_name}: write failed after {attempt} attempt(s)")
                });
            }
        }
    }
    anyhow::bail!("{operation_name}: conflict retry budget exhausted")
}

/// Apply a metadata mutation to a resource under the conflict-retry policy.
///
/// Each attempt re-fetches the resource and passes the fresh copy to
/// `build`, which returns the desired `metadata` content (e.g. a finalizers
/// list or annotations map) or `None` when the fresh copy already carries
/// the intended state. The patch embeds the fresh `resourceVersion`, so a
/// concurrent writer causes a 409 and another round instead of a blind
/// overwrite.
///
/// # Errors
///
/// Returns an error when the re-fetch fails, the write fails with a
/// non-conflict error, or the conflict budget is exhausted.
pub async fn patch_metadata_with_retry<T>(
    api: &Api<T>,
    name: &str,
    operation_name: &str,
    build: impl Fn(&T) -> Option<serde_json::Value>,
) -> Result<()>
where
    T: Resource<DynamicType = ()>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
{
    retry_on_conflict(
        || async {
            let fresh = api.get(name).await?;
            let Some(metadata) = build(&fresh) else {
                debug!(
                    operation = operation_name,
                    name, "resource already in desired state, skipping write"
                );
                return Ok(());
            };

            let mut patch = json!({ "metadata": metadata });
            patch["metadata"]["resourceVersion"] = json!(fresh.resource_version());
            api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
                .await?;
            Ok(())
        },
        operation_name,
    )
    .await
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
