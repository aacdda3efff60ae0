//! Per-request negotiation state parsed from the protocol headers.

use http::HeaderMap;

use crate::protocol::headers::{header_str, parse_list_header, HeaderNames};
use crate::types::AssetsVersion;

/// Immutable view over a request's Inertia negotiation headers.
///
/// Built once per request, then consulted by the resolution engine and the
/// envelope dispatcher. Parsing never fails: malformed or non-UTF-8 header
/// values degrade to "header absent".
///
/// # Examples
///
/// ```
/// use http::HeaderMap;
/// use inertia_rs::InertiaState;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-inertia", "true".parse().unwrap());
/// headers.insert("x-inertia-partial-component", "Users/Index".parse().unwrap());
/// headers.insert("x-inertia-partial-data", "posts,comments".parse().unwrap());
///
/// let state = InertiaState::from_headers(&headers);
/// assert!(state.is_inertia);
/// assert!(state.is_partial("Users/Index"));
/// assert!(!state.is_partial("Users/Show"));
/// assert_eq!(state.only.as_deref(), Some(&["posts".to_string(), "comments".to_string()][..]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InertiaState {
    /// The protocol marker header is present (client-driven navigation).
    pub is_inertia: bool,
    /// Asset version the client was built against, if sent.
    pub version: Option<String>,
    /// Named error bag requested by the client, if any.
    pub error_bag: Option<String>,
    /// Component the client believes it currently has rendered.
    pub partial_component: Option<String>,
    /// Allow-list of top-level prop keys. `None` when the header is absent
    /// or empty; order preserved, membership treated as a set.
    pub only: Option<Vec<String>>,
    /// Deny-list of top-level prop keys, same parsing as `only`.
    pub except: Option<Vec<String>>,
    /// Keys the client demands full replacement for instead of a merge.
    pub reset: Vec<String>,
}

impl InertiaState {
    /// Parse negotiation state using the default header names.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_headers_with(headers, &HeaderNames::default())
    }

    /// Parse negotiation state using a custom header-name set.
    pub fn from_headers_with(headers: &HeaderMap, names: &HeaderNames) -> Self {
        let non_empty = |value: &str| !value.is_empty();

        InertiaState {
            is_inertia: header_str(headers, &names.inertia).is_some_and(non_empty),
            version: header_str(headers, &names.version)
                .filter(|v| non_empty(v))
                .map(String::from),
            error_bag: header_str(headers, &names.error_bag)
                .filter(|v| non_empty(v))
                .map(String::from),
            partial_component: header_str(headers, &names.partial_component)
                .filter(|v| non_empty(v))
                .map(String::from),
            only: header_str(headers, &names.partial_only)
                .filter(|v| non_empty(v))
                .map(parse_list_header),
            except: header_str(headers, &names.partial_except)
                .filter(|v| non_empty(v))
                .map(parse_list_header),
            reset: header_str(headers, &names.reset)
                .map(parse_list_header)
                .unwrap_or_default(),
        }
    }

    /// A request is a partial reload iff the protocol marker is present AND
    /// the client's target component matches the component being rendered.
    pub fn is_partial(&self, component: &str) -> bool {
        self.is_inertia && self.partial_component.as_deref() == Some(component)
    }

    /// Did the client send a version marker that no longer matches the
    /// current asset version? Callers typically answer a stale navigation
    /// with a `location()` (409) response to force a full reload.
    pub fn is_stale(&self, current: &AssetsVersion) -> bool {
        match &self.version {
            Some(sent) => *sent != current.to_string(),
            None => false,
        }
    }
}
