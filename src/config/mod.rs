//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → [site] becomes a SiteHandle shared by the middleware
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → SiteHandle::replace (atomic swap of the site snapshot)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the site section is live; the routing map is fixed at startup

pub mod loader;
pub mod schema;
pub mod site;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ListenerConfig, ObservabilityConfig, RouterConfig, RoutingConfig, SiteConfig, TimeoutConfig,
    APEX_KEY, DEFER_TARGET,
};
pub use site::{Site, SiteHandle};
pub use watcher::ConfigWatcher;
