//! Subdomain-aware request routing for axum services.
//!
//! Parses the subdomain out of each request's Host header, attaches it to the
//! request, and lets a static map from subdomain to route table pick which
//! router serves the request.

pub mod config;
pub mod demo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{RouterConfig, Site, SiteHandle};
pub use http::{HttpServer, Subdomain, SubdomainLayer, SubdomainRoutingLayer};
pub use lifecycle::Shutdown;
pub use routing::{parse_subdomain, RouteTable, RouteTables, UrlConfMap, UrlReverser};
