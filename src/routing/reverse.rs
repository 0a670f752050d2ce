//! Subdomain-aware URL construction.
//!
//! Given a route name and a subdomain, resolve the route table that subdomain
//! is served from and build an absolute URL on the registered site:
//!
//! ```text
//! reverse("user", Some("api"), [("id", "7")], None)
//!     → urlconf map: "api" → table "api"
//!     → table "api": "user" = "/users/{id}" → "/users/7"
//!     → "http://api.example.com/users/7"
//! ```

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::config::site::SiteHandle;
use crate::routing::host::is_valid_label;
use crate::routing::table::{RouteTable, RouteTables};
use crate::routing::urlconf::UrlConfMap;

/// Error type for URL reversal.
#[derive(Debug, Error)]
pub enum ReverseError {
    #[error("no route named `{name}` in table `{table}`")]
    UnknownRoute { table: String, name: String },

    #[error("missing value for path parameter `{0}`")]
    MissingParam(String),

    #[error("invalid value `{value}` for path parameter `{name}`")]
    InvalidParam { name: String, value: String },

    #[error("invalid subdomain `{0}`")]
    InvalidSubdomain(String),

    #[error("unsupported URL scheme `{0}`")]
    Scheme(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Builds URLs against the route table each subdomain is served from.
#[derive(Debug, Clone)]
pub struct UrlReverser {
    site: SiteHandle,
    urlconfs: Arc<UrlConfMap>,
    tables: Arc<RouteTables>,
}

impl UrlReverser {
    pub fn new(site: SiteHandle, urlconfs: Arc<UrlConfMap>, tables: Arc<RouteTables>) -> Self {
        Self {
            site,
            urlconfs,
            tables,
        }
    }

    /// The route table requests for `subdomain` are dispatched to.
    pub fn table_for(&self, subdomain: Option<&str>) -> &RouteTable {
        self.tables.select(self.urlconfs.resolve(subdomain))
    }

    /// Absolute URL of route `name` on `subdomain` (or the apex).
    ///
    /// `scheme` defaults to the site's configured scheme. The subdomain must
    /// be a dotted sequence of host labels.
    pub fn reverse(
        &self,
        name: &str,
        subdomain: Option<&str>,
        params: &[(&str, &str)],
        scheme: Option<&str>,
    ) -> Result<String, ReverseError> {
        if let Some(label) = subdomain {
            if !is_valid_label(label) {
                return Err(ReverseError::InvalidSubdomain(label.to_string()));
            }
        }
        let subdomain = subdomain.map(str::to_lowercase);
        let path = self
            .table_for(subdomain.as_deref())
            .reverse(name, params)?;

        let site = self.site.load();
        let domain = site.effective_domain();
        let host = match subdomain {
            Some(label) => format!("{label}.{domain}"),
            None => domain,
        };

        build_url(scheme.unwrap_or(&site.default_scheme), &host, &path)
    }

    /// Path of route `name` within the table that served the current request.
    pub fn reverse_path(
        &self,
        active_table: &str,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ReverseError> {
        self.tables.select(Some(active_table)).reverse(name, params)
    }
}

fn build_url(scheme: &str, host: &str, path: &str) -> Result<String, ReverseError> {
    if !matches!(scheme, "http" | "https") {
        return Err(ReverseError::Scheme(scheme.to_string()));
    }
    let mut url = Url::parse(&format!("{scheme}://{host}"))?;
    url.set_path(path);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::site::Site;
    use axum::routing::get;

    fn reverser(site: Site) -> UrlReverser {
        let root = RouteTable::new("root")
            .route("/", "home", get(|| async { "root" }))
            .unwrap();
        let marketing = RouteTable::new("marketing")
            .route("/", "home", get(|| async { "marketing" }))
            .unwrap()
            .route("/pricing/", "pricing", get(|| async { "pricing" }))
            .unwrap();
        let api = RouteTable::new("api")
            .route("/users/{id}", "user", get(|| async { "user" }))
            .unwrap();

        let tables = RouteTables::from_tables("root", vec![root, marketing, api]).unwrap();
        let urlconfs = UrlConfMap::default()
            .with_apex("marketing")
            .with_entry("www", "marketing")
            .with_entry("api", "api");

        UrlReverser::new(SiteHandle::new(site), Arc::new(urlconfs), Arc::new(tables))
    }

    #[test]
    fn test_reverse_per_subdomain() {
        let urls = reverser(Site::new("example.com", false));

        assert_eq!(
            urls.reverse("pricing", None, &[], None).unwrap(),
            "http://example.com/pricing/"
        );
        assert_eq!(
            urls.reverse("pricing", Some("www"), &[], Some("https")).unwrap(),
            "https://www.example.com/pricing/"
        );
        assert_eq!(
            urls.reverse("user", Some("API"), &[("id", "7")], None).unwrap(),
            "http://api.example.com/users/7"
        );
        // Unlisted subdomains use the default table.
        assert_eq!(
            urls.reverse("home", Some("blog"), &[], None).unwrap(),
            "http://blog.example.com/"
        );
    }

    #[test]
    fn test_reverse_uses_effective_domain() {
        let urls = reverser(Site::new("www.example.com", true));
        assert_eq!(
            urls.reverse("home", None, &[], None).unwrap(),
            "http://example.com/"
        );

        urls.site.set_domain("example.org");
        assert_eq!(
            urls.reverse("user", Some("api"), &[("id", "1")], None).unwrap(),
            "http://api.example.org/users/1"
        );
    }

    #[test]
    fn test_reverse_errors() {
        let urls = reverser(Site::new("example.com", false));
        // "user" only exists in the api table.
        assert!(matches!(
            urls.reverse("user", None, &[("id", "1")], None),
            Err(ReverseError::UnknownRoute { .. })
        ));
        assert!(matches!(
            urls.reverse("home", None, &[], Some("ftp")),
            Err(ReverseError::Scheme(_))
        ));
    }

    #[test]
    fn test_reverse_rejects_bad_subdomains() {
        let urls = reverser(Site::new("example.com", false));
        for label in ["x/y", "evil.com#", "user@evil.com", "a:80", "", "a..b", "a b"] {
            assert!(
                matches!(
                    urls.reverse("user", Some(label), &[("id", "1")], None),
                    Err(ReverseError::InvalidSubdomain(l)) if l == label
                ),
                "label {label:?}"
            );
        }
        assert_eq!(
            urls.reverse("home", Some("eu.api"), &[], None).unwrap(),
            "http://eu.api.example.com/"
        );
    }

    #[test]
    fn test_relative_and_absolute_paths_agree() {
        let urls = reverser(Site::new("example.com", false));
        let path = urls.reverse_path("api", "user", &[("id", "a?b#c d")]).unwrap();
        assert_eq!(path, "/users/a%3Fb%23c%20d");
        assert_eq!(
            urls.reverse("user", Some("api"), &[("id", "a?b#c d")], None).unwrap(),
            format!("http://api.example.com{path}")
        );
    }

    #[test]
    fn test_reverse_path_in_active_table() {
        let urls = reverser(Site::new("example.com", false));
        assert_eq!(urls.reverse_path("api", "user", &[("id", "3")]).unwrap(), "/users/3");
        assert_eq!(urls.reverse_path("marketing", "pricing", &[]).unwrap(), "/pricing/");
        assert_eq!(urls.table_for(Some("www")).name(), "marketing");
    }
}
