//! Route table: pattern registration and path resolution.
//!
//! DESIGN
//! ======
//! Routes keep registration order. Resolution tries an exact pattern match
//! first, then scans parameterized patterns (`:name` segments) in
//! registration order; the first whose segment count and literal segments
//! agree with the path wins. The table is generic over the handler key so
//! it carries no knowledge of concrete pages.

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;

use std::collections::BTreeMap;

use crate::net::types::Role;

pub const DEFAULT_TITLE: &str = "HR System";

/// Normalize a location path to `#/...` form. Empty input is the root `#/`.
pub fn normalize_path(path: &str) -> String {
    let bare = path.strip_prefix('#').unwrap_or(path);
    let bare = bare.strip_prefix('/').unwrap_or(bare);
    format!("#/{bare}")
}

/// Access policy and metadata for a registered route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteOptions {
    pub auth_required: bool,
    /// Empty means any authenticated role.
    pub roles: Vec<Role>,
    pub title: String,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            auth_required: true,
            roles: Vec::new(),
            title: DEFAULT_TITLE.to_owned(),
        }
    }
}

impl RouteOptions {
    /// Reachable without a session.
    pub fn public() -> Self {
        Self {
            auth_required: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.roles = roles.to_vec();
        self
    }

    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        title.clone_into(&mut self.title);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route<K> {
    pub pattern: String,
    pub handler: K,
    pub auth_required: bool,
    pub roles: Vec<Role>,
    pub title: String,
}

impl<K> Route<K> {
    pub fn is_parameterized(&self) -> bool {
        self.pattern.split('/').any(|s| s.starts_with(':'))
    }

    /// Parameters of `path` under this pattern, or `None` when it does not
    /// match.
    fn match_params(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = self.pattern.split('/').collect();
        let actual: Vec<&str> = path.split('/').collect();
        if pattern.len() != actual.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (expected, value) in pattern.iter().zip(&actual) {
            if let Some(name) = expected.strip_prefix(':') {
                params.insert(name.to_owned(), decode_segment(value));
            } else if expected != value {
                return None;
            }
        }
        Some(params)
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_owned(), |s| s.into_owned())
}

/// A resolved route and the parameters extracted from the path.
#[derive(Debug, PartialEq, Eq)]
pub struct RouteMatch<'a, K> {
    pub route: &'a Route<K>,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct RouteTable<K> {
    routes: Vec<Route<K>>,
}

impl<K> Default for RouteTable<K> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<K> RouteTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern`. Registering the same pattern again replaces the
    /// earlier entry in place.
    pub fn register(&mut self, pattern: &str, handler: K, options: RouteOptions) {
        let route = Route {
            pattern: normalize_path(pattern),
            handler,
            auth_required: options.auth_required,
            roles: options.roles,
            title: options.title,
        };
        match self.routes.iter_mut().find(|r| r.pattern == route.pattern) {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
    }

    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_, K>> {
        let path = normalize_path(path);
        if let Some(route) = self.get(&path) {
            return Some(RouteMatch {
                route,
                params: BTreeMap::new(),
            });
        }
        self.routes
            .iter()
            .filter(|r| r.is_parameterized())
            .find_map(|route| route.match_params(&path).map(|params| RouteMatch { route, params }))
    }

    /// Route registered under exactly `pattern`.
    pub fn get(&self, pattern: &str) -> Option<&Route<K>> {
        let pattern = normalize_path(pattern);
        self.routes.iter().find(|r| r.pattern == pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route<K>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
