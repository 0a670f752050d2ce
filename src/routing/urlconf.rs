//! Subdomain to route table mapping.
//!
//! # Responsibilities
//! - Hold the static map from subdomain key to route table target
//! - Resolve a request's subdomain to an override, if any
//!
//! # Lookup Order
//! ```text
//! subdomain (or the apex key "@" when absent)
//!     → exact entry?      yes → target
//!     → wildcard entry?   yes → target
//!     → no override
//! target "default" → no override
//! ```
//!
//! # Design Decisions
//! - Built once at startup, immutable at runtime (shared via Arc)
//! - Keys are lower-cased on construction, matching parsed labels

use std::collections::HashMap;

use crate::config::schema::{RoutingConfig, APEX_KEY, DEFER_TARGET};

/// What a subdomain key maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableTarget {
    /// Serve the request from the named route table.
    Table(String),
    /// Leave the default route table in place.
    Defer,
}

impl From<&str> for TableTarget {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value == DEFER_TARGET {
            TableTarget::Defer
        } else {
            TableTarget::Table(value.to_string())
        }
    }
}

/// Static map from subdomain label to route table.
#[derive(Debug, Clone)]
pub struct UrlConfMap {
    entries: HashMap<String, TableTarget>,
    wildcard: String,
}

impl UrlConfMap {
    /// Create an empty map using `wildcard` as the fallback key.
    pub fn new(wildcard: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            wildcard: wildcard.into(),
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        config
            .subdomains
            .iter()
            .fold(Self::new(config.wildcard.clone()), |map, (key, target)| {
                map.with_entry(key, TableTarget::from(target.as_str()))
            })
    }

    /// Map the apex (no subdomain) to `target`.
    pub fn with_apex(self, target: impl Into<TableTarget>) -> Self {
        self.with_entry(APEX_KEY, target)
    }

    /// Map the wildcard key to `target`.
    pub fn with_wildcard(self, target: impl Into<TableTarget>) -> Self {
        let key = self.wildcard.clone();
        self.with_entry(&key, target)
    }

    /// Map a subdomain label (or a marker key) to `target`.
    pub fn with_entry(mut self, key: &str, target: impl Into<TableTarget>) -> Self {
        let key = if key == self.wildcard {
            key.to_string()
        } else {
            key.to_lowercase()
        };
        self.entries.insert(key, target.into());
        self
    }

    /// The entry for `subdomain`, falling back to the wildcard entry.
    pub fn lookup(&self, subdomain: Option<&str>) -> Option<&TableTarget> {
        let key = subdomain.unwrap_or(APEX_KEY);
        self.entries
            .get(key)
            .or_else(|| self.entries.get(&self.wildcard))
    }

    /// The route table overriding the default for `subdomain`, if any.
    pub fn resolve(&self, subdomain: Option<&str>) -> Option<&str> {
        match self.lookup(subdomain)? {
            TableTarget::Table(name) => Some(name.as_str()),
            TableTarget::Defer => None,
        }
    }

    /// Every table name referenced by the map.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.entries.values().filter_map(|target| match target {
            TableTarget::Table(name) => Some(name.as_str()),
            TableTarget::Defer => None,
        })
    }

    pub fn wildcard(&self) -> &str {
        &self.wildcard
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for UrlConfMap {
    fn default() -> Self {
        Self::new(RoutingConfig::default().wildcard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_map() -> UrlConfMap {
        UrlConfMap::default()
            .with_apex("marketing")
            .with_entry("www", "marketing")
            .with_entry("api", "api")
    }

    #[test]
    fn test_resolve_entries() {
        let map = example_map();
        assert_eq!(map.resolve(None), Some("marketing"));
        assert_eq!(map.resolve(Some("www")), Some("marketing"));
        assert_eq!(map.resolve(Some("api")), Some("api"));
        assert_eq!(map.resolve(Some("subdomain")), None);
    }

    #[test]
    fn test_wildcard_fallback() {
        let map = example_map().with_wildcard("tenants");
        assert_eq!(map.resolve(Some("acme")), Some("tenants"));
        assert_eq!(map.resolve(Some("api")), Some("api"));

        let map = UrlConfMap::default().with_wildcard("tenants");
        // The apex also falls back to the wildcard when it has no entry.
        assert_eq!(map.resolve(None), Some("tenants"));
    }

    #[test]
    fn test_defer_marker() {
        let map = example_map()
            .with_wildcard("tenants")
            .with_entry("status", DEFER_TARGET);
        assert_eq!(map.lookup(Some("status")), Some(&TableTarget::Defer));
        assert_eq!(map.resolve(Some("status")), None);

        // An explicit defer wildcard means unlisted subdomains keep the default.
        let map = example_map().with_wildcard(TableTarget::Defer);
        assert_eq!(map.resolve(Some("other")), None);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let map = UrlConfMap::default().with_entry("API", "api");
        assert_eq!(map.resolve(Some("api")), Some("api"));
    }

    #[test]
    fn test_from_config() {
        let mut config = RoutingConfig::default();
        config.wildcard = "_".into();
        config.subdomains.insert("@".into(), "marketing".into());
        config.subdomains.insert("api".into(), "api".into());
        config.subdomains.insert("_".into(), "default".into());

        let map = UrlConfMap::from_config(&config);
        assert_eq!(map.len(), 3);
        assert_eq!(map.wildcard(), "_");
        assert_eq!(map.resolve(None), Some("marketing"));
        assert_eq!(map.resolve(Some("blog")), None);

        let mut tables: Vec<_> = map.tables().collect();
        tables.sort_unstable();
        assert_eq!(tables, vec!["api", "marketing"]);
    }
}
