//! Cookie extraction from `Set-Cookie` headers and `Cookie` header
//! assembly for outbound requests.

use cookie::Cookie;
use reqwest::header::{HeaderMap, SET_COOKIE};
use swi_domain::error::{Error, Result};

/// Identity-session cookie set by the credential login.
pub const SWICUS: &str = "swicus";

/// Settings cookie set by the login page.
pub const SWI_SETTINGS: &str = "swi-settings";

/// Return the value of the first `Set-Cookie` entry named `name`.
///
/// Malformed `Set-Cookie` values are skipped. Absence is reported as
/// [`Error::CookieMissing`]; transport failures never reach this point.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Result<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw).ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| Error::CookieMissing(name.to_owned()))
}

/// Render `name=value` pairs as a single `Cookie` request header value.
pub fn cookie_header(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| Cookie::new(*name, *value).to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
