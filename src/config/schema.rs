//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key in `[routing.subdomains]` that stands for "no subdomain" (the apex).
pub const APEX_KEY: &str = "@";

/// Table target meaning "leave the default route table in place".
pub const DEFER_TARGET: &str = "default";

/// Root configuration for the subdomain router.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Registered site (base domain and www handling).
    pub site: SiteConfig,

    /// Subdomain to route table mapping.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// The registered site every Host header is compared against.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Base domain, e.g. "example.com".
    pub domain: String,

    /// Strip a leading "www." from `domain` before comparing hosts.
    pub remove_www_from_domain: bool,

    /// Scheme used when building absolute URLs without an explicit one.
    pub default_url_scheme: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: "example.com".to_string(),
            remove_www_from_domain: false,
            default_url_scheme: "http".to_string(),
        }
    }
}

/// Subdomain routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Name of the route table used when no override applies.
    pub default_table: String,

    /// Key consulted when the subdomain itself has no entry.
    pub wildcard: String,

    /// Redirect `/path` to `/path/` when only the latter exists.
    pub append_slash: bool,

    /// Subdomain label (or `@` / the wildcard key) to route table name.
    pub subdomains: BTreeMap<String, String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_table: "root".to_string(),
            wildcard: "*".to_string(),
            append_slash: true,
            subdomains: BTreeMap::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
