//! Protocol header names and list-header parsing.
//!
//! Header names are protocol-fixed but kept configurable ([`HeaderNames`])
//! because exact casing can matter to older client builds; lookups through
//! `http::HeaderMap` stay case-insensitive either way.

use http::HeaderMap;

/// Marker for client-driven navigations (request) and page-object
/// responses (response).
pub const INERTIA: &str = "x-inertia";
/// Asset version the client was built against.
pub const VERSION: &str = "x-inertia-version";
/// Target URL of a forced full-page visit, on a 409 response.
pub const LOCATION: &str = "x-inertia-location";
/// Named bag for validation errors.
pub const ERROR_BAG: &str = "x-inertia-error-bag";
/// Allow-list of prop keys for a partial reload.
pub const PARTIAL_ONLY: &str = "x-inertia-partial-data";
/// Deny-list of prop keys for a partial reload.
pub const PARTIAL_EXCEPT: &str = "x-inertia-partial-except";
/// Component the client currently has rendered.
pub const PARTIAL_COMPONENT: &str = "x-inertia-partial-component";
/// Keys whose values must be replaced instead of merged.
pub const RESET: &str = "x-inertia-reset";

/// The set of protocol header names in effect.
///
/// [`HeaderNames::default`] yields the documented constant set above.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderNames {
    pub inertia: String,
    pub version: String,
    pub location: String,
    pub error_bag: String,
    pub partial_only: String,
    pub partial_except: String,
    pub partial_component: String,
    pub reset: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        HeaderNames {
            inertia: INERTIA.to_string(),
            version: VERSION.to_string(),
            location: LOCATION.to_string(),
            error_bag: ERROR_BAG.to_string(),
            partial_only: PARTIAL_ONLY.to_string(),
            partial_except: PARTIAL_EXCEPT.to_string(),
            partial_component: PARTIAL_COMPONENT.to_string(),
            reset: RESET.to_string(),
        }
    }
}

/// Parse a comma-separated list header value.
///
/// Segments are trimmed; empty segments are dropped; order is preserved.
///
/// # Examples
///
/// ```
/// use inertia_rs::protocol::parse_list_header;
///
/// assert_eq!(parse_list_header("a, b ,c"), vec!["a", "b", "c"]);
/// assert_eq!(parse_list_header(",,"), Vec::<String>::new());
/// ```
pub fn parse_list_header(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}

/// Read a header as UTF-8 text. Malformed values read as absent.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
