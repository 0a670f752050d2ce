//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware/ (subdomain, route table override)
//!     → dispatch.rs (append slash, selected table's router)
//!     → handler
//! ```

pub mod dispatch;
pub mod middleware;
pub mod request;
pub mod server;

pub use dispatch::{ActiveRouteTable, TableDispatch};
pub use middleware::{RouteTableOverride, Subdomain, SubdomainLayer, SubdomainRoutingLayer};
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerError};
