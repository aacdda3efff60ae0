//! The page-object: the canonical wire artifact describing one navigable page.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::AssetsVersion;

/// The JSON artifact handed to the client for one navigable page.
///
/// Constructed fresh per render call by the resolution engine and never
/// mutated afterwards (the SSR fields are filled by the dispatcher before
/// the object reaches the template, which is still pre-dispatch).
///
/// Optional fields are omitted from the JSON entirely rather than emitted
/// as `null`:
///
/// ```
/// use inertia_rs::{AssetsVersion, PageObject};
///
/// let page = PageObject {
///     component: "Users/Index".into(),
///     props: serde_json::Map::new(),
///     url: "/users".into(),
///     version: AssetsVersion::new("v1"),
///     clear_history: false,
///     encrypt_history: false,
///     merge_props: None,
///     deferred_props: None,
///     ssr_head: None,
///     ssr_body: None,
/// };
///
/// let json = serde_json::to_string(&page).unwrap();
/// assert!(!json.contains("mergeProps"));
/// assert!(!json.contains("deferredProps"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageObject {
    /// Logical component name, e.g. `"Users/Index"`.
    pub component: String,

    /// Resolved top-level props. Insertion order is preserved on the wire.
    pub props: Map<String, Value>,

    /// Path and query of the request that produced this page.
    pub url: String,

    /// Current asset version (string or integer).
    pub version: AssetsVersion,

    /// Ask the client to clear its history state for this page.
    pub clear_history: bool,

    /// Ask the client to encrypt the history entry for this page.
    pub encrypt_history: bool,

    /// Keys the client should instance-merge instead of replace.
    /// Present only if at least one mergeable, non-reset key exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_props: Option<Vec<String>>,

    /// Deferred keys grouped by fetch group, first-seen order.
    /// Present only on non-partial responses with at least one deferred prop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred_props: Option<IndexMap<String, Vec<String>>>,

    /// Head fragments produced by the SSR collaborator (HTML path only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_head: Option<Vec<String>>,

    /// Body markup produced by the SSR collaborator (HTML path only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> PageObject {
        let mut props = Map::new();
        props.insert("id".to_string(), json!(1));
        PageObject {
            component: "Posts/Show".into(),
            props,
            url: "/posts/1".into(),
            version: AssetsVersion::new("v1"),
            clear_history: true,
            encrypt_history: false,
            merge_props: None,
            deferred_props: None,
            ssr_head: None,
            ssr_body: None,
        }
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let json = serde_json::to_value(page()).unwrap();
        assert_eq!(json["component"], "Posts/Show");
        assert_eq!(json["clearHistory"], true);
        assert_eq!(json["encryptHistory"], false);
        assert_eq!(json["props"]["id"], 1);
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let json = serde_json::to_string(&page()).unwrap();
        assert!(!json.contains("mergeProps"));
        assert!(!json.contains("deferredProps"));
        assert!(!json.contains("ssrHead"));
        assert!(!json.contains("ssrBody"));
    }

    #[test]
    fn test_present_optionals_are_emitted() {
        let mut page = page();
        page.merge_props = Some(vec!["feed".into()]);
        let mut groups = IndexMap::new();
        groups.insert("default".to_string(), vec!["stats".to_string()]);
        page.deferred_props = Some(groups);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["mergeProps"], json!(["feed"]));
        assert_eq!(json["deferredProps"], json!({"default": ["stats"]}));
    }

    #[test]
    fn test_round_trips_through_json() {
        let json = serde_json::to_string(&page()).unwrap();
        let back: PageObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.component, "Posts/Show");
        assert_eq!(back.url, "/posts/1");
        assert_eq!(back.version, AssetsVersion::new("v1"));
        assert!(back.clear_history);
    }
}
