//! Route table dispatch.
//!
//! # Responsibilities
//! - Pick the route table for a request (override, else default)
//! - Redirect `/path` to `/path/` when only the latter exists in that table
//! - Record the table that served the request for URL construction
//! - Hand the request to the table's router
//!
//! # Design Decisions
//! - An override naming an unregistered table falls back to the default
//! - Slash redirects are 301 and only for GET/HEAD, like a permanent move
//! - The table's own router answers 404/405
//! - Redirect URLs use the request's scheme when absolute, else the site's
//!   default scheme

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use tower::{Service, ServiceExt};

use crate::config::site::SiteHandle;
use crate::http::middleware::url_routing::RouteTableOverride;
use crate::http::request::request_host;
use crate::observability::metrics;
use crate::routing::table::{RouteTable, RouteTables};

/// Name of the route table that served the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRouteTable(pub String);

impl ActiveRouteTable {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Terminal service dispatching requests to the selected route table.
#[derive(Debug, Clone)]
pub struct TableDispatch {
    tables: Arc<RouteTables>,
    site: SiteHandle,
    append_slash: bool,
}

impl TableDispatch {
    pub fn new(tables: Arc<RouteTables>, site: SiteHandle, append_slash: bool) -> Self {
        Self {
            tables,
            site,
            append_slash,
        }
    }
}

impl Service<Request<Body>> for TableDispatch {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let table = self.tables.select(
            req.extensions()
                .get::<RouteTableOverride>()
                .map(RouteTableOverride::name),
        );
        metrics::record_table_selected(table.name());

        if self.append_slash {
            let site = self.site.load();
            if let Some(location) = slash_redirect_location(table, &req, &site.default_scheme) {
                tracing::debug!(table = %table.name(), location = %location, "Appending slash");
                metrics::record_slash_redirect(table.name());
                let response =
                    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
                return Box::pin(async move { Ok(response) });
            }
        }

        req.extensions_mut()
            .insert(ActiveRouteTable(table.name().to_string()));
        let router = table.router();
        Box::pin(async move { router.oneshot(req).await })
    }
}

/// Where to redirect when `path` misses but `path/` exists in `table`.
fn slash_redirect_location<B>(
    table: &RouteTable,
    req: &Request<B>,
    default_scheme: &str,
) -> Option<String> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return None;
    }

    let path = req.uri().path();
    if path.ends_with('/') || table.matches(path) {
        return None;
    }

    let slashed = format!("{path}/");
    if !table.matches(&slashed) {
        return None;
    }

    let mut location = match request_host(req) {
        Some(host) => {
            let scheme = req.uri().scheme_str().unwrap_or(default_scheme);
            format!("{scheme}://{host}{slashed}")
        }
        None => slashed,
    };
    if let Some(query) = req.uri().query() {
        location.push('?');
        location.push_str(query);
    }
    Some(location)
}
