//! Cookie parsing and the restricted cookie table.
//!
//! Cookies cross the proxy as bare name/value pairs. Attributes on upstream
//! `Set-Cookie` headers (domain, path, secure, ...) are discarded and the
//! downstream cookie is recreated without them.

/// Cookies never forwarded upstream and never relayed back downstream.
pub const RESTRICTED_COOKIES: &[&str] = &["JSESSIONID", "Domain"];

/// Returns true if a cookie name is blocked in both directions.
pub fn is_restricted_cookie(name: &str) -> bool {
    RESTRICTED_COOKIES.contains(&name)
}

/// Parse a request `Cookie` header into name/value pairs.
///
/// Pairs without a name are skipped. A pair without `=` yields an empty value.
pub fn parse_cookie_header(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|pair| split_pair(pair.trim()))
        .collect()
}

/// Extract the name/value pair from a `Set-Cookie` header, ignoring attributes.
pub fn parse_set_cookie(value: &str) -> Option<(String, String)> {
    let pair = value.split(';').next()?;
    split_pair(pair.trim())
}

fn split_pair(pair: &str) -> Option<(String, String)> {
    let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Insertion-ordered cookie map.
///
/// Setting a name that is already present replaces its value but keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Copy every cookie from `other`, later values winning.
    pub fn merge(&mut self, other: &CookieJar) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Render as a request `Cookie` header value (`a=1; b=2`).
    pub fn to_header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let rendered = self
            .entries
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(rendered)
    }
}

/// Format a downstream `Set-Cookie` value with no attributes.
pub fn format_bare_set_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}")
}
