//! Named route tables.
//!
//! # Responsibilities
//! - Pair an axum `Router` with an index of its named routes
//! - Answer "does this path exist?" for append-slash handling
//! - Turn a route name plus parameters back into a path
//! - Register tables by name, with one designated default
//!
//! # Design Decisions
//! - Paths use axum's syntax (`/users/{id}`, `/files/{*path}`); the index is a
//!   `matchit` tree, the same matcher axum routes with
//! - Registration errors are returned, never panicked on
//! - Tables are immutable once the server is built (shared via Arc)

use std::collections::HashMap;

use axum::routing::MethodRouter;
use axum::Router;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;

use crate::routing::reverse::ReverseError;
use crate::routing::urlconf::UrlConfMap;

/// Error type for route table construction.
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("route path `{0}` must start with `/`")]
    Path(String),

    #[error("route `{path}` in table `{table}`: {source}")]
    Insert {
        table: String,
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("duplicate route name `{name}` in table `{table}`")]
    DuplicateName { table: String, name: String },

    #[error("duplicate route table `{0}`")]
    DuplicateTable(String),

    #[error("default route table `{0}` is not registered")]
    MissingDefault(String),

    #[error("subdomain map references unknown route tables: {}", .0.join(", "))]
    UnknownTables(Vec<String>),
}

/// A named set of URL-to-handler mappings.
pub struct RouteTable {
    name: String,
    router: Router,
    index: matchit::Router<String>,
    patterns: HashMap<String, String>,
}

impl RouteTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            router: Router::new(),
            index: matchit::Router::new(),
            patterns: HashMap::new(),
        }
    }

    /// Add a named route.
    pub fn route(
        mut self,
        path: &str,
        name: &str,
        method_router: MethodRouter,
    ) -> Result<Self, RouteTableError> {
        if !path.starts_with('/') {
            return Err(RouteTableError::Path(path.to_string()));
        }
        if self.patterns.contains_key(name) {
            return Err(RouteTableError::DuplicateName {
                table: self.name.clone(),
                name: name.to_string(),
            });
        }

        self.index
            .insert(path, name.to_string())
            .map_err(|source| RouteTableError::Insert {
                table: self.name.clone(),
                path: path.to_string(),
                source,
            })?;
        self.patterns.insert(name.to_string(), path.to_string());
        self.router = self.router.route(path, method_router);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The router serving this table.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Whether `path` matches one of this table's routes.
    pub fn matches(&self, path: &str) -> bool {
        self.index.at(path).is_ok()
    }

    /// Name of the route matching `path`.
    pub fn route_name(&self, path: &str) -> Option<&str> {
        self.index.at(path).ok().map(|m| m.value.as_str())
    }

    /// Path pattern registered under `name`.
    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    /// Build the path of route `name`, filling `{param}` segments.
    pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ReverseError> {
        let pattern = self
            .pattern(name)
            .ok_or_else(|| ReverseError::UnknownRoute {
                table: self.name.clone(),
                name: name.to_string(),
            })?;
        fill_pattern(pattern, params)
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .finish()
    }
}

/// Bytes escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a parameter value. Catch-all values keep their `/`.
fn encode_param(value: &str, catch_all: bool) -> String {
    if catch_all {
        value
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/")
    } else {
        utf8_percent_encode(value, SEGMENT).to_string()
    }
}

fn fill_pattern(pattern: &str, params: &[(&str, &str)]) -> Result<String, ReverseError> {
    let mut path = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                path.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                path.push('}');
            }
            '{' => {
                let param: String = chars.by_ref().take_while(|&c| c != '}').collect();
                let (catch_all, key) = match param.strip_prefix('*') {
                    Some(key) => (true, key),
                    None => (false, param.as_str()),
                };
                let value = params
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| ReverseError::MissingParam(key.to_string()))?;
                if value.is_empty() {
                    return Err(ReverseError::InvalidParam {
                        name: key.to_string(),
                        value: value.to_string(),
                    });
                }
                path.push_str(&encode_param(value, catch_all));
            }
            other => path.push(other),
        }
    }

    Ok(path)
}

/// Registry of route tables with a designated default.
#[derive(Debug)]
pub struct RouteTables {
    default: RouteTable,
    others: HashMap<String, RouteTable>,
}

impl RouteTables {
    /// Registry holding only `default`.
    pub fn new(default: RouteTable) -> Self {
        Self {
            default,
            others: HashMap::new(),
        }
    }

    /// Registry from a list of tables, one of which is named `default`.
    pub fn from_tables(
        default: &str,
        tables: impl IntoIterator<Item = RouteTable>,
    ) -> Result<Self, RouteTableError> {
        let mut default_table = None;
        let mut others = HashMap::new();

        for table in tables {
            if table.name == default {
                if default_table.replace(table).is_some() {
                    return Err(RouteTableError::DuplicateTable(default.to_string()));
                }
            } else if others.contains_key(&table.name) {
                return Err(RouteTableError::DuplicateTable(table.name));
            } else {
                others.insert(table.name.clone(), table);
            }
        }

        let default = default_table
            .ok_or_else(|| RouteTableError::MissingDefault(default.to_string()))?;
        Ok(Self { default, others })
    }

    /// Register another table.
    pub fn with_table(mut self, table: RouteTable) -> Result<Self, RouteTableError> {
        if table.name == self.default.name || self.others.contains_key(&table.name) {
            return Err(RouteTableError::DuplicateTable(table.name));
        }
        self.others.insert(table.name.clone(), table);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&RouteTable> {
        if name == self.default.name {
            Some(&self.default)
        } else {
            self.others.get(name)
        }
    }

    pub fn default_table(&self) -> &RouteTable {
        &self.default
    }

    /// The table named `name`, or the default when none is given.
    ///
    /// An unknown name falls back to the default table.
    pub fn select(&self, name: Option<&str>) -> &RouteTable {
        match name {
            None => &self.default,
            Some(name) => self.get(name).unwrap_or_else(|| {
                tracing::warn!(table = %name, "Unknown route table, using default");
                &self.default
            }),
        }
    }

    /// Ensure every table the subdomain map points at is registered.
    pub fn check_targets(&self, map: &UrlConfMap) -> Result<(), RouteTableError> {
        let mut unknown: Vec<String> = map
            .tables()
            .filter(|name| self.get(name).is_none())
            .map(str::to_string)
            .collect();

        if unknown.is_empty() {
            return Ok(());
        }
        unknown.sort_unstable();
        unknown.dedup();
        Err(RouteTableError::UnknownTables(unknown))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default.name.as_str()).chain(self.others.keys().map(String::as_str))
    }
}
