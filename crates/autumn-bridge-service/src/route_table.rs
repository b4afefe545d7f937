//! Public-to-internal path rewriting.
//!
//! Requests arrive under [`EXTERNAL_PREFIX`]; the suffix is looked up in
//! [`ROUTE_TABLE`] and the result is re-rooted under [`INTERNAL_PREFIX`].
//! Unknown suffixes are kept verbatim so the internal router can decide.

/// Prefix of every public billing path.
pub const EXTERNAL_PREFIX: &str = "/autumn";

/// Prefix of every internal billing route.
pub const INTERNAL_PREFIX: &str = "/api/autumn";

/// One public-suffix to internal-name mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// Suffix after [`EXTERNAL_PREFIX`], without leading slash.
    pub public_path: &'static str,
    /// Internal route segment.
    pub internal_name: &'static str,
}

const fn entry(public_path: &'static str, internal_name: &'static str) -> RouteEntry {
    RouteEntry {
        public_path,
        internal_name,
    }
}

/// Static route table.
///
/// `entitled` and `event` are the names older SDKs used for `check` and
/// `track`.
pub const ROUTE_TABLE: &[RouteEntry] = &[
    entry("customers", "customers"),
    entry("products", "products"),
    entry("checkout", "checkout"),
    entry("attach", "attach"),
    entry("check", "check"),
    entry("track", "track"),
    entry("cancel", "cancel"),
    entry("referrals/code", "referrals/code"),
    entry("referrals/redeem", "referrals/redeem"),
    entry("billing_portal", "billing_portal"),
    entry("entities", "entities"),
    entry("entitled", "check"),
    entry("event", "track"),
];

/// Strip [`EXTERNAL_PREFIX`] from a request path.
///
/// Paths outside the prefix are returned unchanged.
#[must_use]
pub fn strip_external_prefix(path: &str) -> &str {
    match path.strip_prefix(EXTERNAL_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Map a public suffix to its internal path.
#[must_use]
pub fn resolve_path(public_suffix: &str) -> String {
    let suffix = public_suffix.trim_matches('/');

    let segment = ROUTE_TABLE
        .iter()
        .find(|e| e.public_path == suffix)
        .map_or(suffix, |e| e.internal_name);

    format!("{INTERNAL_PREFIX}/{segment}")
}
