//! Shared utilities for integration tests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use subdomain_router::demo::{demo_config, demo_tables};
use subdomain_router::{HttpServer, RouterConfig};

/// The demo site on `example.com`.
pub fn example_config() -> RouterConfig {
    let mut config = demo_config();
    config.site.domain = "example.com".into();
    config
}

pub fn build_server(config: RouterConfig) -> HttpServer {
    let tables = demo_tables(&config.routing.default_table).unwrap();
    HttpServer::new(config, tables).unwrap()
}

/// Host for `subdomain` on the site's domain, or the domain itself.
pub fn host_for(domain: &str, subdomain: Option<&str>) -> String {
    match subdomain {
        Some(sub) => format!("{sub}.{domain}"),
        None => domain.to_string(),
    }
}

/// Response as seen by a client.
#[allow(dead_code)]
pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub request_id: Option<String>,
    pub body: String,
}

/// Send `GET path` with the given Host through `app`.
pub async fn get(app: &Router, host: &str, path: &str) -> Reply {
    let req = Request::builder()
        .uri(path)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();

    let status = res.status();
    let header_str = |name: &str| {
        res.headers()
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    };
    let location = header_str("location");
    let request_id = header_str("x-request-id");
    let body = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();

    Reply {
        status,
        location,
        request_id,
        body: String::from_utf8(body.to_vec()).unwrap(),
    }
}
