//! Environment variable parsing helpers shared by services and the pool.

use std::str::FromStr;

/// Parse an environment variable, falling back to `default` when it is
/// missing or does not parse.
///
/// # Example
/// ```ignore
/// let port: u16 = parse_env_with_default("LISTING_SERVICE_PORT", 5000);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    parse_env_optional(key).unwrap_or(default)
}

/// Parse an environment variable, returning `None` if missing or invalid
pub fn parse_env_optional<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// First non-empty value among `keys`, in order.
///
/// Lets a service accept a namespaced variable and a legacy alias, e.g.
/// `LISTING_SERVICE_PORT` then `PORT`.
pub fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
