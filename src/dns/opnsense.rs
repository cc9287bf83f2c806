// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! OPNsense Unbound DNS backend.
//!
//! Manages Unbound "host override" entries through the OPNsense firewall's
//! HTTP API. Every mutation is followed by a `reconfigure` call so the
//! running Unbound instance picks up the change.
//!
//! # Settings
//!
//! | key               | required | default | meaning                              |
//! |-------------------|----------|---------|--------------------------------------|
//! | `base_url`        | yes      |         | e.g. `https://firewall.local/api`    |
//! | `api_key`         | yes      |         | OPNsense API key                     |
//! | `api_secret`      | yes      |         | OPNsense API secret                  |
//! | `default_ttl`     | no       | 300     | TTL used when a record carries ttl=0 |
//! | `skip_tls_verify` | no       | false   | disable certificate verification     |

use crate::dns::{split_hostname, Provider, Record};
use crate::dns_errors::ProviderError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

const SEARCH_PATH: &str = "unbound/settings/searchHostOverride";
const ADD_PATH: &str = "unbound/settings/addHostOverride";
const SET_PATH: &str = "unbound/settings/setHostOverride";
const DEL_PATH: &str = "unbound/settings/delHostOverride";
const RECONFIGURE_PATH: &str = "unbound/service/reconfigure";

const DEFAULT_TTL_SECS: u32 = 300;

/// Registry factory for the `"opnsense"` provider name.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidSettings`] when required settings are
/// missing or malformed.
pub fn factory(settings: &HashMap<String, String>) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OpnsenseProvider::new(settings)?))
}

/// DNS provider backed by OPNsense Unbound host overrides.
#[derive(Debug, Clone)]
pub struct OpnsenseProvider {
    base_url: String,
    api_key: String,
    api_secret: String,
    default_ttl: u32,
    client: reqwest::Client,
}

/// One host override row from `searchHostOverride`.
#[derive(Debug, Deserialize)]
struct HostRow {
    uuid: String,
    hostname: String,
    domain: String,
    rr: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    rows: Vec<HostRow>,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct ReconfigureResponse {
    #[serde(default)]
    status: String,
}

impl OpnsenseProvider {
    /// Build a provider from the opaque settings map.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidSettings`] when `base_url`, `api_key`
    /// or `api_secret` are missing, `base_url` is not a valid URL, or
    /// `default_ttl` is not a number.
    pub fn new(settings: &HashMap<String, String>) -> Result<Self, ProviderError> {
        let required = |key: &str| -> Result<String, ProviderError> {
            settings
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| ProviderError::InvalidSettings {
                    reason: format!("opnsense: missing required setting '{key}'"),
                })
        };

        let base_url = required("base_url")?;
        Url::parse(&base_url).map_err(|e| ProviderError::InvalidSettings {
            reason: format!("opnsense: invalid base_url '{base_url}': {e}"),
        })?;
        let api_key = required("api_key")?;
        let api_secret = required("api_secret")?;

        let default_ttl = match settings.get("default_ttl") {
            Some(v) => v.parse().map_err(|_| ProviderError::InvalidSettings {
                reason: format!("opnsense: invalid default_ttl '{v}'"),
            })?,
            None => DEFAULT_TTL_SECS,
        };

        let skip_tls_verify = settings.get("skip_tls_verify").map(String::as_str) == Some("true");
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_tls_verify)
            .build()
            .map_err(|e| ProviderError::InvalidSettings {
                reason: format!("opnsense: building HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_secret,
            default_ttl,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn transport(operation: &str, hostname: &str, source: reqwest::Error) -> ProviderError {
        ProviderError::Transport {
            operation: operation.to_string(),
            hostname: hostname.to_string(),
            source,
        }
    }

    fn unexpected(operation: &str, hostname: &str, reason: String) -> ProviderError {
        ProviderError::UnexpectedResponse {
            operation: operation.to_string(),
            hostname: hostname.to_string(),
            reason,
        }
    }

    /// Search for an existing host override matching hostname and record type.
    ///
    /// Returns the override UUID, or `None` if nothing matches. Matching is
    /// case-insensitive on host, domain, and record type.
    async fn find_override(
        &self,
        fqdn: &str,
        record_type: &str,
    ) -> Result<Option<String>, ProviderError> {
        let resp = self
            .client
            .get(self.url(SEARCH_PATH))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(|e| Self::transport(SEARCH_PATH, fqdn, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::unexpected(
                SEARCH_PATH,
                fqdn,
                format!("status {status}"),
            ));
        }

        let search: SearchResponse = resp
            .json()
            .await
            .map_err(|e| Self::transport(SEARCH_PATH, fqdn, e))?;

        let (host, domain) = split_hostname(fqdn);
        Ok(search
            .rows
            .into_iter()
            .find(|row| {
                row.hostname.eq_ignore_ascii_case(host)
                    && row.domain.eq_ignore_ascii_case(domain)
                    && row.rr.eq_ignore_ascii_case(record_type)
            })
            .map(|row| row.uuid))
    }

    /// POST a JSON body and decode the standard `{result, uuid}` envelope,
    /// checking the result against `expected`.
    async fn post_save(
        &self,
        path: &str,
        hostname: &str,
        body: &serde_json::Value,
        expected: &str,
    ) -> Result<SaveResponse, ProviderError> {
        let resp = self
            .client
            .post(self.url(path))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(body)
            .send()
            .await
            .map_err(|e| Self::transport(path, hostname, e))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(Self::unexpected(
                path,
                hostname,
                format!("status {status}: {detail}"),
            ));
        }

        let saved: SaveResponse = resp
            .json()
            .await
            .map_err(|e| Self::transport(path, hostname, e))?;
        if saved.result != expected {
            return Err(Self::unexpected(
                path,
                hostname,
                format!("result '{}' (expected '{expected}')", saved.result),
            ));
        }
        Ok(saved)
    }

    /// Tell OPNsense to apply pending Unbound changes.
    async fn reconfigure(&self, hostname: &str) -> Result<(), ProviderError> {
        let resp = self
            .client
            .post(self.url(RECONFIGURE_PATH))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| Self::transport(RECONFIGURE_PATH, hostname, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::unexpected(
                RECONFIGURE_PATH,
                hostname,
                format!("status {status}"),
            ));
        }

        let result: ReconfigureResponse = resp
            .json()
            .await
            .map_err(|e| Self::transport(RECONFIGURE_PATH, hostname, e))?;
        debug!(status = %result.status, "unbound reconfigure completed");
        Ok(())
    }

    /// Build the JSON body for add/set host override calls.
    fn host_body(&self, record: &Record) -> serde_json::Value {
        let (host, domain) = split_hostname(&record.hostname);
        let description = record.meta.get("description").cloned().unwrap_or_default();
        let ttl = if record.ttl == 0 {
            self.default_ttl
        } else {
            record.ttl
        };
        json!({
            "host": {
                "enabled": "1",
                "hostname": host,
                "domain": domain,
                "rr": record.record_type,
                "server": record.value,
                "ttl": ttl.to_string(),
                "description": description,
                "mxprio": "",
                "mx": "",
            }
        })
    }
}

#[async_trait]
impl Provider for OpnsenseProvider {
    async fn exists(&self, hostname: &str, record_type: &str) -> Result<bool, ProviderError> {
        debug!(hostname, record_type, "checking if host override exists");
        Ok(self.find_override(hostname, record_type).await?.is_some())
    }

    async fn create(&self, record: &Record) -> Result<(), ProviderError> {
        info!(
            hostname = %record.hostname,
            record_type = %record.record_type,
            value = %record.value,
            "creating host override"
        );

        let saved = self
            .post_save(ADD_PATH, &record.hostname, &self.host_body(record), "saved")
            .await?;
        info!(uuid = %saved.uuid, "host override created");
        self.reconfigure(&record.hostname).await
    }

    async fn update(&self, record: &Record) -> Result<(), ProviderError> {
        info!(
            hostname = %record.hostname,
            record_type = %record.record_type,
            value = %record.value,
            "updating host override"
        );

        let uuid = self
            .find_override(&record.hostname, &record.record_type)
            .await?
            .ok_or_else(|| ProviderError::NotFound {
                hostname: record.hostname.clone(),
                record_type: record.record_type.clone(),
            })?;

        self.post_save(
            &format!("{SET_PATH}/{uuid}"),
            &record.hostname,
            &self.host_body(record),
            "saved",
        )
        .await?;
        info!(uuid = %uuid, "host override updated");
        self.reconfigure(&record.hostname).await
    }

    async fn delete(&self, hostname: &str, record_type: &str) -> Result<(), ProviderError> {
        info!(hostname, record_type, "deleting host override");

        let uuid = self
            .find_override(hostname, record_type)
            .await?
            .ok_or_else(|| ProviderError::NotFound {
                hostname: hostname.to_string(),
                record_type: record_type.to_string(),
            })?;

        self.post_save(
            &format!("{DEL_PATH}/{uuid}"),
            hostname,
            &json!({}),
            "deleted",
        )
        .await?;
        info!(uuid = %uuid, "host override deleted");
        self.reconfigure(hostname).await
    }
}

#[cfg(test)]
#[path = "opnsense_tests.rs"]
mod opnsense_tests;
