// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `HTTPRoute` resources.
//!
//! Each pass runs one of three branches:
//!
//! - **Deleting** - the route carries a deletion timestamp. If our cleanup
//!   finalizer is present, delete the record for every hostname still
//!   declared on the spec, then remove the finalizer so Kubernetes can
//!   finish the deletion. Without the finalizer this is a terminal no-op.
//! - **Unmanaged** - no finalizer yet. Add it and return; DNS work is
//!   deferred to the next pass so acquiring the cleanup obligation and
//!   applying state stay separate steps.
//! - **Active** - the steady state. Delete records for hostnames removed
//!   since the last pass, create or upsert records for current hostnames
//!   that resolve through the domain map, then persist the new managed set.
//!
//! Any provider failure aborts the pass with nothing persisted, so a rerun
//! from scratch is always safe. Deletions are always processed before
//! creations within a pass: when a hostname moves between domain-map
//! targets, the stale record must be gone before the new one is written.

use crate::constants::{
    CLEANUP_FINALIZER, MANAGED_HOSTNAMES_ANNOTATION, MANAGED_BY_DESCRIPTION, RECORD_TYPE_A,
    REQUEUE_AFTER_SUCCESS_SECS,
};
use crate::context::Context as Ctx;
use crate::crd::{format_route, HTTPRoute};
use crate::managed_set;
use crate::metrics;
use crate::config::DomainMap;
use crate::dns::{Provider, Record};
use crate::reconcilers::retry::patch_metadata_with_retry;
use anyhow::{Context, Result};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Whether the route carries our cleanup finalizer.
fn has_cleanup_finalizer(route: &HTTPRoute) -> bool {
    route.finalizers().iter().any(|f| f == CLEANUP_FINALIZER)
}

/// Reconcile one `HTTPRoute`.
///
/// Returns the requeue action for the controller: `await_change` after
/// lifecycle writes (the write itself triggers the next pass) and a long
/// periodic requeue in the steady state.
///
/// # Errors
///
/// Any provider or API failure aborts the pass; the controller's error
/// policy schedules the retry.
pub async fn reconcile_httproute(ctx: Arc<Ctx>, route: Arc<HTTPRoute>) -> Result<Action> {
    let namespace = route.namespace().unwrap_or_default();
    let name = route.name_any();
    let api: Api<HTTPRoute> = Api::namespaced(ctx.client.clone(), &namespace);

    debug!(route = %format_route(&route), "reconciling HTTPRoute");

    if route.metadata.deletion_timestamp.is_some() {
        return handle_deletion(&ctx, &api, &route).await;
    }

    if !has_cleanup_finalizer(&route) {
        // Acquire the cleanup obligation first; DNS work waits for the
        // next pass triggered by this write.
        patch_metadata_with_retry(&api, &name, "add cleanup finalizer", |fresh| {
            if has_cleanup_finalizer(fresh) {
                return None;
            }
            let mut finalizers = fresh.finalizers().to_vec();
            finalizers.push(CLEANUP_FINALIZER.to_string());
            Some(json!({ "finalizers": finalizers }))
        })
        .await?;
        info!(route = %name, namespace = %namespace, "added cleanup finalizer");
        return Ok(Action::await_change());
    }

    let previous = managed_set::managed_hostnames(&route);
    let current = route.spec.hostnames.clone();

    sync_hostnames(
        ctx.provider.as_ref(),
        &ctx.domain_map,
        ctx.upsert,
        &previous,
        &current,
    )
    .await?;

    if managed_set::sets_equal(&previous, &current) {
        debug!(route = %name, "managed hostname set unchanged, skipping annotation write");
    } else {
        let encoded = managed_set::encode_managed_hostnames(&current);
        patch_metadata_with_retry(&api, &name, "persist managed hostnames", |fresh| {
            let mut annotations = fresh.annotations().clone();
            annotations.insert(MANAGED_HOSTNAMES_ANNOTATION.to_string(), encoded.clone());
            Some(json!({ "annotations": annotations }))
        })
        .await?;
        info!(route = %name, hostnames = ?current, "persisted managed hostname set");
    }

    Ok(Action::requeue(Duration::from_secs(
        REQUEUE_AFTER_SUCCESS_SECS,
    )))
}

/// Deletion branch: clean up every record for the route's last-declared
/// hostnames, then release the finalizer.
///
/// The finalizer is only removed after every deletion has succeeded, so a
/// mid-list failure leaves the obligation in place and the whole branch is
/// retried wholesale. A record that is already gone counts as success, so
/// retries converge even when earlier attempts deleted part of the list.
async fn handle_deletion(ctx: &Ctx, api: &Api<HTTPRoute>, route: &HTTPRoute) -> Result<Action> {
    let namespace = route.namespace().unwrap_or_default();
    let name = route.name_any();

    if !has_cleanup_finalizer(route) {
        debug!(route = %name, "no cleanup obligations, nothing to do");
        return Ok(Action::await_change());
    }

    info!(route = %name, namespace = %namespace, "deleting DNS records for HTTPRoute");
    for hostname in &route.spec.hostnames {
        delete_record(ctx.provider.as_ref(), hostname)
            .await
            .with_context(|| format!("deleting DNS record for '{hostname}'"))?;
    }

    patch_metadata_with_retry(api, &name, "remove cleanup finalizer", |fresh| {
        if !has_cleanup_finalizer(fresh) {
            return None;
        }
        let finalizers: Vec<String> = fresh
            .finalizers()
            .iter()
            .filter(|f| f.as_str() != CLEANUP_FINALIZER)
            .cloned()
            .collect();
        Some(json!({ "finalizers": finalizers }))
    })
    .await?;
    info!(route = %name, namespace = %namespace, "removed cleanup finalizer");

    Ok(Action::await_change())
}

/// Delete the address record for a hostname, treating "already absent" as
/// success.
async fn delete_record(provider: &dyn Provider, hostname: &str) -> Result<()> {
    match provider.delete(hostname, RECORD_TYPE_A).await {
        Ok(()) => {
            metrics::record_dns_operation("delete", true);
            info!(hostname, "deleted DNS record");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            metrics::record_dns_operation("delete", true);
            debug!(hostname, "DNS record already absent");
            Ok(())
        }
        Err(e) => {
            metrics::record_dns_operation("delete", false);
            Err(e.into())
        }
    }
}

/// Drive the DNS backend from the previous and current hostname sets.
///
/// Removed hostnames are deleted first, in `previous` order; current
/// hostnames are then resolved through the domain map and created or
/// upserted. Hostnames without a domain-map entry are skipped, not errors:
/// routes may legitimately carry hostnames outside the managed domains.
///
/// # Errors
///
/// The first provider failure aborts the whole pass; there is no
/// partial-success bookkeeping, so the rerun repeats every step.
pub async fn sync_hostnames(
    provider: &dyn Provider,
    domain_map: &DomainMap,
    upsert: bool,
    previous: &[String],
    current: &[String],
) -> Result<()> {
    for hostname in managed_set::removed_hostnames(previous, current) {
        info!(hostname = %hostname, "hostname removed from HTTPRoute, deleting DNS record");
        delete_record(provider, &hostname)
            .await
            .with_context(|| format!("deleting removed DNS record for '{hostname}'"))?;
    }

    for hostname in current {
        let Some(target) = domain_map.lookup(hostname) else {
            debug!(hostname, "no domain mapping found for hostname, skipping");
            continue;
        };
        debug!(hostname, target, "resolved hostname");

        let record =
            Record::address(hostname, target).with_meta("description", MANAGED_BY_DESCRIPTION);

        if upsert {
            match provider.upsert(&record).await {
                Ok(()) => {
                    metrics::record_dns_operation("upsert", true);
                    info!(hostname, target, "upserted DNS record");
                }
                Err(e) => {
                    metrics::record_dns_operation("upsert", false);
                    return Err(e)
                        .with_context(|| format!("upserting DNS record for '{hostname}'"));
                }
            }
            continue;
        }

        // Non-upsert path: only create when missing. An existing record is
        // left untouched even if its target has drifted.
        let exists = provider
            .exists(hostname, RECORD_TYPE_A)
            .await
            .with_context(|| format!("checking DNS record for '{hostname}'"))?;
        if exists {
            debug!(hostname, "DNS record already exists, skipping");
            continue;
        }
        match provider.create(&record).await {
            Ok(()) => {
                metrics::record_dns_operation("create", true);
                info!(hostname, target, "created DNS record");
            }
            Err(e) => {
                metrics::record_dns_operation("create", false);
                return Err(e).with_context(|| format!("creating DNS record for '{hostname}'"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "httproute_tests.rs"]
mod httproute_tests;
