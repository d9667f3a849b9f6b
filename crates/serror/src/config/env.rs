//! Reading `SERROR_*` overrides.

use std::str::FromStr;

/// Parse the override named `key`, falling back to the library default.
///
/// Surrounding whitespace is ignored. A missing variable and a value that
/// does not parse (say `SERROR_STACK_FRAMES=lots`) both leave `default`.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Read an on/off switch such as `SERROR_CAPTURE_ON_NEW`.
///
/// `1`, `true`, `yes` and `on` switch it on, in any case. Any other value
/// switches it off; a missing variable leaves `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    let raw = raw.trim();
    ["1", "true", "yes", "on"]
        .iter()
        .any(|on| raw.eq_ignore_ascii_case(on))
}
