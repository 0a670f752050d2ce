//! Live view of the registered site.
//!
//! The base domain is read on every request and may be changed while the
//! server runs (config reload or an explicit `set_domain`). Readers take a
//! lock-free snapshot; writers replace the whole snapshot atomically.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::SiteConfig;
use crate::routing::host;

/// Immutable snapshot of the site settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Registered base domain as configured.
    pub domain: String,
    /// Strip a leading "www." from `domain` before comparing hosts.
    pub remove_www: bool,
    /// Scheme for absolute URLs built without an explicit one.
    pub default_scheme: String,
}

impl Site {
    pub fn new(domain: impl Into<String>, remove_www: bool) -> Self {
        Self {
            domain: domain.into(),
            remove_www,
            default_scheme: "http".to_string(),
        }
    }

    /// The domain hosts are actually compared against.
    pub fn effective_domain(&self) -> String {
        host::effective_domain(&self.domain, self.remove_www)
    }
}

impl From<&SiteConfig> for Site {
    fn from(config: &SiteConfig) -> Self {
        Self {
            domain: config.domain.clone(),
            remove_www: config.remove_www_from_domain,
            default_scheme: config.default_url_scheme.clone(),
        }
    }
}

/// Shared, swappable handle to the current [`Site`].
#[derive(Debug, Clone)]
pub struct SiteHandle {
    inner: Arc<ArcSwap<Site>>,
}

impl SiteHandle {
    pub fn new(site: Site) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(site)),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<Site> {
        self.inner.load_full()
    }

    /// Replace the whole snapshot.
    pub fn replace(&self, site: Site) {
        let previous = self.inner.swap(Arc::new(site));
        let current = self.inner.load();
        if previous.domain != current.domain || previous.remove_www != current.remove_www {
            tracing::info!(
                old_domain = %previous.domain,
                new_domain = %current.domain,
                remove_www = current.remove_www,
                "Site settings updated"
            );
        }
    }

    /// Change only the registered domain.
    pub fn set_domain(&self, domain: impl Into<String>) {
        let mut site = (*self.load()).clone();
        site.domain = domain.into();
        self.replace(site);
    }
}

impl From<&SiteConfig> for SiteHandle {
    fn from(config: &SiteConfig) -> Self {
        Self::new(Site::from(config))
    }
}
