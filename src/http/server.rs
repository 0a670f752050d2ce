//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the middleware stack around the table dispatcher
//! - Check the subdomain map against the registered route tables
//! - Bind server to listener
//! - Apply live site changes from config reloads
//! - Shut down gracefully

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::{Extension, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RouterConfig, Site, SiteHandle};
use crate::http::dispatch::TableDispatch;
use crate::http::middleware::SubdomainRoutingLayer;
use crate::http::request::{request_host, request_id, X_REQUEST_ID};
use crate::routing::{RouteTableError, RouteTables, UrlConfMap, UrlReverser};

/// Error type for server construction and operation.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("route tables: {0}")]
    Routes(#[from] RouteTableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server dispatching requests by subdomain.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    site: SiteHandle,
    reverser: UrlReverser,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and tables.
    pub fn new(config: RouterConfig, tables: RouteTables) -> Result<Self, ServerError> {
        if tables.default_table().name() != config.routing.default_table {
            return Err(RouteTableError::MissingDefault(config.routing.default_table.clone()).into());
        }

        let urlconfs = Arc::new(UrlConfMap::from_config(&config.routing));
        tables.check_targets(&urlconfs)?;

        let site = SiteHandle::from(&config.site);
        let tables = Arc::new(tables);
        let reverser = UrlReverser::new(site.clone(), urlconfs.clone(), tables.clone());

        tracing::info!(
            domain = %config.site.domain,
            remove_www = config.site.remove_www_from_domain,
            default_table = %config.routing.default_table,
            tables = ?tables.names().collect::<Vec<_>>(),
            subdomain_entries = urlconfs.len(),
            "Route tables registered"
        );

        let dispatch = TableDispatch::new(tables, site.clone(), config.routing.append_slash);
        let router = Self::build_router(&config, &site, urlconfs, &reverser, dispatch);

        Ok(Self {
            router,
            config,
            site,
            reverser,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &RouterConfig,
        site: &SiteHandle,
        urlconfs: Arc<UrlConfMap>,
        reverser: &UrlReverser,
        dispatch: TableDispatch,
    ) -> Router {
        Router::new()
            .fallback_service(dispatch)
            .layer(Extension(reverser.clone()))
            .layer(SubdomainRoutingLayer::new(site.clone(), urlconfs))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    host = request_host(req).unwrap_or("-"),
                    request_id = request_id(req).unwrap_or("-"),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations arriving on `config_updates` replace the live site
    /// settings; routing changes need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let site = self.site.clone();
        let routing = self.config.routing.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                site.replace(Site::from(&new_config.site));
                if new_config.routing != routing {
                    tracing::warn!("Routing configuration changed; restart to apply it");
                }
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The complete request handling stack, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Live site settings shared with the middleware.
    pub fn site(&self) -> &SiteHandle {
        &self.site
    }

    /// URL builder bound to this server's tables and site.
    pub fn reverser(&self) -> &UrlReverser {
        &self.reverser
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}
