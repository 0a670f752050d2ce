//! End-to-end tests of subdomain parsing and route table selection.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;
use tokio::sync::mpsc;

use subdomain_router::lifecycle::Shutdown;

mod common;

#[tokio::test]
async fn test_url_routing() {
    let server = common::build_server(common::example_config());
    let app = server.router();

    let table = |reply: &common::Reply| {
        reply.body.split(',').next().unwrap_or_default().to_string()
    };

    let apex = common::get(&app, "example.com", "/").await;
    assert_eq!(apex.status, StatusCode::OK);
    assert_eq!(table(&apex), "table: marketing");
    assert_eq!(apex.body, "table: marketing, subdomain: (none)");

    let www = common::get(&app, "www.example.com", "/").await;
    assert_eq!(www.body, "table: marketing, subdomain: www");

    let api = common::get(&app, "api.example.com", "/users/9").await;
    assert_eq!(api.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&api.body).unwrap();
    assert_eq!(json["id"], "9");
    assert_eq!(json["subdomain"], "api");

    // Falls through to the default table.
    let other = common::get(&app, "another.subdomain.example.com", "/").await;
    assert_eq!(other.body, "table: root, subdomain: another.subdomain");
}

#[tokio::test]
async fn test_case_insensitive_subdomain() {
    let app = common::build_server(common::example_config()).router();

    let upper = common::get(&app, "WWW.example.com", "/").await;
    assert_eq!(upper.body, "table: marketing, subdomain: www");

    let mixed = common::get(&app, "www.EXAMPLE.com:8080", "/").await;
    assert_eq!(mixed.body, "table: marketing, subdomain: www");
}

#[tokio::test]
async fn test_appends_slash() {
    let app = common::build_server(common::example_config()).router();

    for subdomain in [None, Some("api"), Some("wildcard")] {
        let host = common::host_for("example.com", subdomain);
        let reply = common::get(&app, &host, "/example").await;

        assert_eq!(reply.status, StatusCode::MOVED_PERMANENTLY, "host {host}");
        assert_eq!(
            reply.location.as_deref(),
            Some(format!("http://{host}/example/").as_str())
        );
    }
}

#[tokio::test]
async fn test_foreign_host_keeps_serving() {
    let app = common::build_server(common::example_config()).router();

    let reply = common::get(&app, "unrelated.org", "/").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "table: marketing, subdomain: (none)");
}

#[tokio::test]
async fn test_www_domain_settings() {
    let mut config = common::example_config();
    config.site.domain = "www.example.com".into();
    let server = common::build_server(config);
    let app = server.router();

    let body = |reply: common::Reply| reply.body;

    assert_eq!(
        body(common::get(&app, "www.example.com", "/").await),
        "table: marketing, subdomain: (none)"
    );
    assert_eq!(
        body(common::get(&app, "subdomain.www.example.com", "/").await),
        "table: root, subdomain: subdomain"
    );

    // Switching www stripping on at runtime changes how hosts are read.
    let mut site = (*server.site().load()).clone();
    site.remove_www = true;
    server.site().replace(site);

    assert_eq!(
        body(common::get(&app, "www.example.com", "/").await),
        "table: marketing, subdomain: www"
    );
    assert_eq!(
        body(common::get(&app, "subdomain.example.com", "/").await),
        "table: root, subdomain: subdomain"
    );
    assert_eq!(
        body(common::get(&app, "subdomain.www.example.com", "/").await),
        "table: root, subdomain: subdomain.www"
    );
}

#[tokio::test]
async fn test_reverse_urls_follow_override() {
    let server = common::build_server(common::example_config());
    let app = server.router();

    let reply = common::get(&app, "api.example.com", "/").await;
    let json: Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json["table"], "api");
    assert_eq!(json["links"]["user"], "/users/1");
    assert_eq!(json["links"]["user_absolute"], "http://api.example.com/users/1");
    assert_eq!(json["links"]["pricing"], "http://example.com/pricing/");

    server.site().set_domain("example.net");
    assert_eq!(
        server.reverser().reverse("pricing", Some("www"), &[], Some("https")).unwrap(),
        "https://www.example.net/pricing/"
    );
}

#[tokio::test]
async fn test_request_id_is_set() {
    let app = common::build_server(common::example_config()).router();
    let reply = common::get(&app, "example.com", "/").await;
    let id = reply.request_id.expect("x-request-id header");
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_live_server_with_reload() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr: SocketAddr = listener.local_addr().unwrap();

    let mut config = common::example_config();
    config.listener.bind_address = server_addr.to_string();
    let server = common::build_server(config.clone());

    let shutdown = Shutdown::new();
    let (update_tx, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, config_updates, server_shutdown).await });

    tokio::time::sleep(Duration::from_millis(200)).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{server_addr}/"))
        .header("Host", "www.example.com")
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "table: marketing, subdomain: www");

    // Re-point the site at another domain, as a config reload would.
    config.site.domain = "example.org".into();
    update_tx.send(config).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client
        .get(format!("http://{server_addr}/example"))
        .header("Host", "api.example.org")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 301);
    assert_eq!(
        res.headers().get("location").unwrap(),
        "http://api.example.org/example/"
    );

    let res = client
        .get(format!("http://{server_addr}/"))
        .header("Host", "www.example.com")
        .send()
        .await
        .unwrap();
    // No longer under the registered domain: served like the apex.
    assert_eq!(res.text().await.unwrap(), "table: marketing, subdomain: (none)");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(matches!(result, Ok(Ok(Ok(())))));
}
