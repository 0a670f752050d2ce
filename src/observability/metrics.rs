//! Metrics collection and exposition.
//!
//! # Metrics
//! - `subdomain_requests_total` (counter): requests by route table served
//! - `subdomain_foreign_hosts_total` (counter): hosts outside the site domain
//! - `subdomain_slash_redirects_total` (counter): append-slash redirects
//!
//! Without an installed recorder the macros are no-ops.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_table_selected(table: &str) {
    counter!("subdomain_requests_total", "table" => table.to_string()).increment(1);
}

pub fn record_foreign_host() {
    counter!("subdomain_foreign_hosts_total").increment(1);
}

pub fn record_slash_redirect(table: &str) {
    counter!("subdomain_slash_redirects_total", "table" => table.to_string()).increment(1);
}
