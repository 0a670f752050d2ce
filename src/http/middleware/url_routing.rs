//! Subdomain URL routing middleware.
//!
//! Does everything [`SubdomainLayer`](super::subdomain::SubdomainLayer) does,
//! then looks the subdomain up in the [`UrlConfMap`] and, on a hit, records a
//! [`RouteTableOverride`] for the table dispatcher.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::config::site::SiteHandle;
use crate::http::middleware::subdomain::annotate;
use crate::routing::urlconf::UrlConfMap;

/// Route table that replaces the default one for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTableOverride(pub String);

impl RouteTableOverride {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Layer attaching [`Subdomain`](super::subdomain::Subdomain) and, when the
/// subdomain map says so, a [`RouteTableOverride`].
#[derive(Debug, Clone)]
pub struct SubdomainRoutingLayer {
    site: SiteHandle,
    urlconfs: Arc<UrlConfMap>,
}

impl SubdomainRoutingLayer {
    pub fn new(site: SiteHandle, urlconfs: Arc<UrlConfMap>) -> Self {
        Self { site, urlconfs }
    }
}

impl<S> Layer<S> for SubdomainRoutingLayer {
    type Service = SubdomainRoutingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SubdomainRoutingService {
            inner,
            site: self.site.clone(),
            urlconfs: self.urlconfs.clone(),
        }
    }
}

/// Service produced by [`SubdomainRoutingLayer`].
#[derive(Debug, Clone)]
pub struct SubdomainRoutingService<S> {
    inner: S,
    site: SiteHandle,
    urlconfs: Arc<UrlConfMap>,
}

impl<S, B> Service<Request<B>> for SubdomainRoutingService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let subdomain = annotate(&mut req, &self.site);

        if let Some(table) = self.urlconfs.resolve(subdomain.as_deref()) {
            tracing::debug!(
                subdomain = subdomain.as_deref().unwrap_or("@"),
                table = %table,
                "Route table overridden by subdomain"
            );
            req.extensions_mut()
                .insert(RouteTableOverride(table.to_string()));
        }

        self.inner.call(req)
    }
}
