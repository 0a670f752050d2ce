//! Host header parsing.
//!
//! # Responsibilities
//! - Normalize the Host header (case, port suffix, trailing root dot)
//! - Compare it against the registered base domain
//! - Produce the subdomain label, or nothing
//!
//! # Design Decisions
//! - Host matching is case-insensitive (per HTTP spec); labels are lower-case
//! - Anything after the first `:` of a non-bracketed host is a port and is
//!   ignored, so "api.example.com:8080" → "api"
//! - A host outside the registered domain is not an error: it is logged and
//!   treated as having no subdomain
//! - No regex, no allocation beyond the lower-cased copies

use crate::observability::metrics;

/// Outcome of comparing a host against the registered domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMatch {
    /// The host is the base domain itself.
    Apex,
    /// The host is `<label>.<base domain>`; the label is lower-case.
    Subdomain(String),
    /// The host does not belong to the base domain.
    Foreign,
}

impl HostMatch {
    pub fn into_subdomain(self) -> Option<String> {
        match self {
            HostMatch::Subdomain(label) => Some(label),
            HostMatch::Apex | HostMatch::Foreign => None,
        }
    }
}

/// Remove a `:port` suffix. Bracketed IPv6 literals keep their brackets.
///
/// The port is not checked: a host name cannot contain `:`, so whatever
/// follows it is dropped.
pub fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split_once(':').map_or(host, |(name, _)| name)
}

/// Dotted sequence of non-empty labels made of alphanumerics, `-` and `_`.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

/// The domain hosts are compared against: lower-cased, and without its
/// leading "www." when `remove_www` is set.
pub fn effective_domain(domain: &str, remove_www: bool) -> String {
    let domain = normalize(domain);
    if remove_www {
        if let Some(rest) = domain.strip_prefix("www.") {
            return rest.to_string();
        }
    }
    domain
}

fn normalize(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_lowercase()
}

/// Compare `host` against `domain` without side effects.
pub fn match_host(host: &str, domain: &str, remove_www: bool) -> HostMatch {
    let domain = effective_domain(domain, remove_www);
    if domain.is_empty() {
        return HostMatch::Foreign;
    }

    let host = normalize(strip_port(host.trim()));
    if host == domain {
        return HostMatch::Apex;
    }

    match host
        .strip_suffix(domain.as_str())
        .and_then(|prefix| prefix.strip_suffix('.'))
    {
        Some(label) if !label.is_empty() => HostMatch::Subdomain(label.to_string()),
        _ => HostMatch::Foreign,
    }
}

/// Subdomain label of `host` relative to `domain`.
///
/// Emits a warning when the host is not under the registered domain.
pub fn parse_subdomain(host: &str, domain: &str, remove_www: bool) -> Option<String> {
    match match_host(host, domain, remove_www) {
        HostMatch::Foreign => {
            tracing::warn!(
                host = %host,
                domain = %domain,
                remove_www,
                "Host does not match the registered domain"
            );
            metrics::record_foreign_host();
            None
        }
        other => other.into_subdomain(),
    }
}
