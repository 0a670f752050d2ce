//! Subdomain middleware.
//! Attaches the parsed subdomain of every request as a [`Subdomain`] extension.

use std::task::{Context, Poll};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use tower::{Layer, Service};

use crate::config::site::SiteHandle;
use crate::http::request::request_host;
use crate::routing::host::parse_subdomain;

/// Subdomain of the current request; `None` for the apex or a foreign host.
///
/// Also usable as an extractor in handlers behind [`SubdomainLayer`] or
/// [`SubdomainRoutingLayer`](super::url_routing::SubdomainRoutingLayer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subdomain(pub Option<String>);

impl Subdomain {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Subdomain
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Subdomain>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Subdomain middleware is not installed",
        ))
    }
}

/// Parse the request's host against the current site and record the result.
pub(crate) fn annotate<B>(req: &mut Request<B>, site: &SiteHandle) -> Option<String> {
    let site = site.load();
    let subdomain = parse_subdomain(
        request_host(req).unwrap_or_default(),
        &site.domain,
        site.remove_www,
    );
    req.extensions_mut().insert(Subdomain(subdomain.clone()));
    subdomain
}

/// Layer attaching [`Subdomain`] to each request.
#[derive(Debug, Clone)]
pub struct SubdomainLayer {
    site: SiteHandle,
}

impl SubdomainLayer {
    pub fn new(site: SiteHandle) -> Self {
        Self { site }
    }
}

impl<S> Layer<S> for SubdomainLayer {
    type Service = SubdomainService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SubdomainService {
            inner,
            site: self.site.clone(),
        }
    }
}

/// Service produced by [`SubdomainLayer`].
#[derive(Debug, Clone)]
pub struct SubdomainService<S> {
    inner: S,
    site: SiteHandle,
}

impl<S, B> Service<Request<B>> for SubdomainService<S>
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
        annotate(&mut req, &self.site);
        self.inner.call(req)
    }
}
