//! Request middleware.
//!
//! # Data Flow
//! ```text
//! Request
//!     → subdomain.rs   (Host → Subdomain extension)
//!     → url_routing.rs (Subdomain → RouteTableOverride extension)
//!     → table dispatcher
//! ```

pub mod subdomain;
pub mod url_routing;

pub use subdomain::{Subdomain, SubdomainLayer, SubdomainService};
pub use url_routing::{RouteTableOverride, SubdomainRoutingLayer, SubdomainRoutingService};
