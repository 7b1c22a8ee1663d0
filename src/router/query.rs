//! Fragment query strings (`#/path?key=value&...`).
//!
//! Keys and values are percent-coded with `urlencoding`; `+` is a literal
//! plus, not a space. Parsing is flat: a repeated key keeps its last value.

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;

use std::collections::BTreeMap;

use super::table::normalize_path;

pub type QueryMap = BTreeMap<String, String>;

/// Split a location into its path and optional query string.
pub fn split_location(location: &str) -> (&str, Option<&str>) {
    match location.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (location, None),
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), |s| s.into_owned())
}

pub fn parse(query: &str) -> QueryMap {
    let mut map = QueryMap::new();
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }
        map.insert(decode(key), decode(value));
    }
    map
}

/// `key=value&...` for every pair with a value; `None` values are dropped.
pub fn serialize<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| {
            value.map(|v| format!("{}={}", urlencoding::encode(key), urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Normalized `path` with the serialized query appended. A query already
/// present on `path` is kept ahead of the new pairs.
pub fn build_location(path: &str, query: &[(&str, Option<&str>)]) -> String {
    let (path, existing) = split_location(path);
    let path = normalize_path(path);
    let added = serialize(query.iter().copied());
    let parts: Vec<&str> = [existing.unwrap_or(""), added.as_str()]
        .into_iter()
        .filter(|q| !q.is_empty())
        .collect();
    if parts.is_empty() {
        path
    } else {
        format!("{path}?{}", parts.join("&"))
    }
}
