//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the site domain and URL scheme
//! - Validate subdomain keys and table names in the routing map
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Whether mapped tables exist is checked later, against the registered tables

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{RouterConfig, APEX_KEY};
use crate::routing::host::is_valid_label;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("site.domain must not be empty")]
    EmptyDomain,

    #[error("site.domain `{0}` must be a bare host name (no scheme, port or path)")]
    DomainNotBare(String),

    #[error("site.default_url_scheme `{0}` must be http or https")]
    Scheme(String),

    #[error("routing.default_table must not be empty")]
    EmptyDefaultTable,

    #[error("routing.wildcard must not be empty")]
    EmptyWildcard,

    #[error("routing.wildcard `{0}` collides with the apex key")]
    WildcardIsApex(String),

    #[error("routing.subdomains key `{0}` is not a valid subdomain label")]
    SubdomainKey(String),

    #[error("routing.subdomains[`{0}`] has an empty table name")]
    EmptyTarget(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.log_format `{0}` must be pretty or json")]
    LogFormat(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let domain = config.site.domain.trim();
    if domain.is_empty() {
        errors.push(ValidationError::EmptyDomain);
    } else if domain.contains(['/', ':', ' ']) {
        errors.push(ValidationError::DomainNotBare(config.site.domain.clone()));
    }

    if !matches!(config.site.default_url_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::Scheme(config.site.default_url_scheme.clone()));
    }

    if config.routing.default_table.is_empty() {
        errors.push(ValidationError::EmptyDefaultTable);
    }

    let wildcard = config.routing.wildcard.as_str();
    if wildcard.is_empty() {
        errors.push(ValidationError::EmptyWildcard);
    } else if wildcard == APEX_KEY {
        errors.push(ValidationError::WildcardIsApex(wildcard.to_string()));
    }

    for (key, target) in &config.routing.subdomains {
        if key != APEX_KEY && key != wildcard && !is_valid_label(key) {
            errors.push(ValidationError::SubdomainKey(key.clone()));
        }
        if target.trim().is_empty() {
            errors.push(ValidationError::EmptyTarget(key.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::LogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.site.domain = "http://example.com".into();
        config.site.default_url_scheme = "ftp".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Scheme("ftp".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
    }

    #[test]
    fn test_subdomain_keys() {
        let mut config = RouterConfig::default();
        config.routing.subdomains.insert("@".into(), "marketing".into());
        config.routing.subdomains.insert("*".into(), "default".into());
        config.routing.subdomains.insert("eu.api".into(), "api".into());
        assert!(validate_config(&config).is_ok());

        config.routing.subdomains.insert("bad..key".into(), "api".into());
        config.routing.subdomains.insert("blank".into(), " ".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::SubdomainKey("bad..key".into()),
                ValidationError::EmptyTarget("blank".into()),
            ]
        );
    }

    #[test]
    fn test_wildcard_cannot_be_apex() {
        let mut config = RouterConfig::default();
        config.routing.wildcard = "@".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::WildcardIsApex("@".into())]
        );
    }
}
