// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Static configuration loaded once at startup: the domain map and the
//! DNS provider settings.
//!
//! Both files are plain YAML. The domain map is a flat mapping of domain
//! patterns to record targets; the provider config names a registered DNS
//! backend and carries its opaque connection settings.
//!
//! Neither structure is mutated after load. [`DomainMap::lookup`] is a pure
//! function and safe for unbounded concurrent callers.

use crate::constants::{
    DEFAULT_DNS_PROVIDER_PATH, DEFAULT_DOMAIN_MAP_PATH, DNS_PROVIDER_PATH_ENV, DOMAIN_MAP_PATH_ENV,
};
use crate::dns_errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Maps domain patterns to the record target (load balancer IP) hostnames
/// under that pattern should resolve to.
///
/// Patterns are either bare domains (`"example.com"`) or wildcards
/// (`"*.example.com"`). Entries are lowercased at load; lookups are
/// case-insensitive.
#[derive(Debug, Clone)]
pub struct DomainMap {
    entries: HashMap<String, String>,
}

impl DomainMap {
    /// Load the domain map from the path in `DOMAIN_MAP_PATH`, defaulting to
    /// `configs/domain-map.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(DOMAIN_MAP_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_DOMAIN_MAP_PATH.to_string());
        Self::load_from_path(&path)
    }

    /// Load the domain map from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&data).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse a domain map from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns the underlying YAML error if the document is not a flat
    /// string-to-string mapping.
    pub fn from_yaml(data: &str) -> Result<Self, serde_yaml::Error> {
        let raw: HashMap<String, String> = serde_yaml::from_str(data)?;
        Ok(Self::from_entries(raw))
    }

    /// Build a domain map from already-parsed entries.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = entries
            .into_iter()
            .map(|(pattern, target)| (pattern.to_ascii_lowercase(), target))
            .collect();
        Self { entries }
    }

    /// Resolve a hostname to its record target.
    ///
    /// The walk starts at the full hostname and strips one label per step,
    /// so the most specific applicable entry always wins:
    ///
    /// 1. An exact entry for the current name wins outright.
    /// 2. Otherwise a wildcard entry `"*." + parent` matches.
    /// 3. Otherwise the first label is stripped and the walk continues.
    ///
    /// A wildcard `"*.example.com"` matches strict sub-labels only, never
    /// the bare `example.com`. A single trailing dot on the hostname is
    /// ignored, as is letter case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gwdns::config::DomainMap;
    ///
    /// let map = DomainMap::from_yaml("\"*.example.com\": 10.0.0.1\n").unwrap();
    /// assert_eq!(map.lookup("app.example.com"), Some("10.0.0.1"));
    /// assert_eq!(map.lookup("example.com"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, hostname: &str) -> Option<&str> {
        let normalized = hostname
            .strip_suffix('.')
            .unwrap_or(hostname)
            .to_ascii_lowercase();

        let mut current = normalized.as_str();
        loop {
            if let Some(target) = self.entries.get(current) {
                return Some(target);
            }
            let Some((_, parent)) = current.split_once('.') else {
                return None;
            };
            if let Some(target) = self.entries.get(&format!("*.{parent}")) {
                return Some(target);
            }
            current = parent;
        }
    }

    /// All configured patterns, for startup logging.
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of configured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// DNS provider selection and connection settings.
///
/// `settings` is opaque to the operator core: values are forwarded to the
/// provider factory unmodified, after `${ENV_VAR}` placeholder expansion.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Name of the registered provider to construct (e.g. "opnsense").
    /// Defaulted on parse so a missing key surfaces as
    /// [`ConfigError::MissingField`] rather than a generic parse error.
    #[serde(default)]
    pub provider: String,

    /// When true, every pass unconditionally reconciles records
    /// (create-or-update). When false, existing records are left untouched
    /// and only missing ones are created.
    #[serde(default)]
    pub upsert: bool,

    /// Provider-specific connection settings, passed through to the factory.
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

impl ProviderConfig {
    /// Load the provider config from the path in `DNS_PROVIDER_PATH`,
    /// defaulting to `configs/dns-provider.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the `provider` field is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(DNS_PROVIDER_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_DNS_PROVIDER_PATH.to_string());
        Self::load_from_path(&path)
    }

    /// Load the provider config from a YAML file at the given path.
    ///
    /// Setting values may reference environment variables as `${NAME}`;
    /// references are expanded at load so secrets can be injected via the
    /// pod environment instead of being written into the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the `provider` field is missing or empty.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut cfg: Self =
            serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        if cfg.provider.is_empty() {
            return Err(ConfigError::MissingField {
                path: path.display().to_string(),
                field: "provider".to_string(),
            });
        }

        for value in cfg.settings.values_mut() {
            *value = expand_env(value);
        }

        Ok(cfg)
    }
}

/// Expand `${NAME}` environment-variable references in a string.
///
/// Unset variables expand to the empty string; anything that is not a
/// well-formed `${NAME}` reference is left as-is.
#[must_use]
pub fn expand_env(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                out.push_str(&std::env::var(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference, keep it literal
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
