//! Demo site served by the binary: a marketing site on the apex and `www`,
//! an API on `api`, and the default table for every other subdomain.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::config::RouterConfig;
use crate::http::{ActiveRouteTable, Subdomain};
use crate::routing::{ReverseError, RouteTable, RouteTableError, RouteTables, UrlReverser};

/// Configuration mapping the demo subdomains to their tables.
pub fn demo_config() -> RouterConfig {
    let mut config = RouterConfig::default();
    let subdomains = &mut config.routing.subdomains;
    subdomains.insert("@".into(), "marketing".into());
    subdomains.insert("www".into(), "marketing".into());
    subdomains.insert("api".into(), "api".into());
    config
}

/// The demo tables; the catch-all table is registered as `default_table`.
pub fn demo_tables(default_table: &str) -> Result<RouteTables, RouteTableError> {
    let root = RouteTable::new(default_table)
        .route("/", "home", get(home))?
        .route("/example/", "example", get(example))?;

    let marketing = RouteTable::new("marketing")
        .route("/", "home", get(home))?
        .route("/pricing/", "pricing", get(|| async { "Plans start at zero." }))?
        .route("/example/", "example", get(example))?;

    let api = RouteTable::new("api")
        .route("/", "index", get(api_index))?
        .route("/users/{id}", "user", get(api_user))?
        .route("/example/", "example", get(example))?;

    RouteTables::from_tables(default_table, [root, marketing, api])
}

async fn home(
    Subdomain(subdomain): Subdomain,
    Extension(active): Extension<ActiveRouteTable>,
) -> String {
    format!(
        "table: {}, subdomain: {}",
        active.name(),
        subdomain.as_deref().unwrap_or("(none)")
    )
}

async fn example(Extension(active): Extension<ActiveRouteTable>) -> String {
    format!("example page from the {} table", active.name())
}

async fn api_index(
    Extension(urls): Extension<UrlReverser>,
    Extension(active): Extension<ActiveRouteTable>,
) -> Result<Json<Value>, StatusCode> {
    let user_path = link(urls.reverse_path(active.name(), "user", &[("id", "1")]))?;
    let user_url = link(urls.reverse("user", Some("api"), &[("id", "1")], None))?;
    let pricing_url = link(urls.reverse("pricing", None, &[], None))?;

    Ok(Json(json!({
        "table": active.name(),
        "links": {
            "user": user_path,
            "user_absolute": user_url,
            "pricing": pricing_url,
        },
    })))
}

fn link(result: Result<String, ReverseError>) -> Result<String, StatusCode> {
    result.map_err(|e| {
        tracing::error!(error = %e, "Failed to build URL");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn api_user(Path(id): Path<String>, Subdomain(subdomain): Subdomain) -> Json<Value> {
    Json(json!({ "id": id, "subdomain": subdomain }))
}
