//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (Host header)
//!     → host.rs (subdomain label or none)
//!     → urlconf.rs (label → route table override, wildcard fallback)
//!     → table.rs (selected table serves the request)
//!
//! URL construction:
//!     reverse.rs (route name + subdomain → table → absolute URL)
//! ```
//!
//! # Design Decisions
//! - Tables and the subdomain map are built at startup, immutable at runtime
//! - Deterministic: same host always selects the same table
//! - An unrecognised host is not an error; it keeps the default table

pub mod host;
pub mod reverse;
pub mod table;
pub mod urlconf;

pub use host::{match_host, parse_subdomain, HostMatch};
pub use reverse::{ReverseError, UrlReverser};
pub use table::{RouteTable, RouteTableError, RouteTables};
pub use urlconf::{TableTarget, UrlConfMap};
