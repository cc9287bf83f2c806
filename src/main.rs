// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use futures::StreamExt;
use gwdns::config::{DomainMap, ProviderConfig};
use gwdns::constants::{DEFAULT_PROBE_ADDR, REQUEUE_AFTER_ERROR_SECS};
use gwdns::context::Context;
use gwdns::crd::HTTPRoute;
use gwdns::dns::default_registry;
use gwdns::metrics;
use gwdns::reconcilers::reconcile_httproute;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("gwdns-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (text or json)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting gwdns operator");

    // Static configuration is loaded once; failures here are fatal rather
    // than looping a failing reconciliation pass against bad config.
    let domain_map = DomainMap::load()?;
    info!(
        entries = domain_map.len(),
        patterns = ?domain_map.patterns(),
        "loaded domain map"
    );

    let provider_cfg = ProviderConfig::load()?;
    info!(
        provider = %provider_cfg.provider,
        upsert = provider_cfg.upsert,
        "loaded DNS provider config"
    );

    // Explicit registration during process construction; no global
    // init-time self-registration.
    let registry = default_registry();
    debug!(registered = ?registry.names(), "built provider registry");
    let provider = registry.create(&provider_cfg.provider, &provider_cfg.settings)?;

    let probe_addr =
        std::env::var("PROBE_ADDR").unwrap_or_else(|_| DEFAULT_PROBE_ADDR.to_string());
    tokio::spawn(async move {
        if let Err(e) = metrics::serve(&probe_addr).await {
            error!("metrics server exited: {e:?}");
        }
    });

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let ctx = Arc::new(Context::new(
        client.clone(),
        domain_map,
        provider,
        provider_cfg.upsert,
    ));

    run_httproute_controller(client, ctx).await
}

/// Run the `HTTPRoute` controller until it exits.
async fn run_httproute_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    info!("Starting HTTPRoute controller");

    let api = Api::<HTTPRoute>::all(client);

    Controller::new(api, Config::default())
        .run(reconcile_httproute_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    anyhow::bail!("HTTPRoute controller exited unexpectedly")
}

async fn reconcile_httproute_wrapper(
    route: Arc<HTTPRoute>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    match reconcile_httproute(ctx, Arc::clone(&route)).await {
        Ok(action) => {
            metrics::record_reconciliation(true, started.elapsed());
            info!("Successfully reconciled HTTPRoute: {}", route.name_any());
            Ok(action)
        }
        Err(e) => {
            metrics::record_reconciliation(false, started.elapsed());
            error!("Failed to reconcile HTTPRoute {}: {e:?}", route.name_any());
            Err(e.into())
        }
    }
}

fn error_policy(
    _route: Arc<HTTPRoute>,
    _err: &ReconcileError,
    _ctx: Arc<Context>,
) -> Action {
    Action::requeue(Duration::from_secs(REQUEUE_AFTER_ERROR_SECS))
}
