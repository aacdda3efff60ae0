//! The page resolution engine and response envelope dispatcher.
//!
//! A [`Response`] captures everything a render call decided — component,
//! merged property bag, asset version, history flags — and turns it into a
//! [`PageObject`] against a concrete request:
//!
//! 1. **Selection** — decide which keys participate, from the prop variants
//!    and the partial-reload negotiation state.
//! 2. **Resolution** — await every selected producer, concurrently, with
//!    key-stable output ordering.
//! 3. **Deferred report** — on first loads, tell the client which keys to
//!    fetch later and in which groups.
//! 4. **Merge report** — tell the client which keys to instance-merge,
//!    honoring requested resets.
//!
//! [`Response::into_rendered`] then dispatches: protocol navigations get the
//! raw page-object (the transport serializes it as JSON, HTTP 200); first
//! loads get the HTML envelope from the [`TemplateRenderer`], with the
//! [`SsrRenderer`] consulted first when one is configured.

use futures::future::{self, BoxFuture};
use http::HeaderMap;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{InertiaError, PropError, Result};
use crate::props::{Prop, Props};
use crate::protocol::{HeaderNames, InertiaState};
use crate::ssr::SsrRenderer;
use crate::template::TemplateRenderer;
use crate::types::{AssetsVersion, PageObject};

/// Read-only view of the inbound request, handed to context producers.
///
/// Resolution runs producers concurrently, so the view is shared and
/// immutable; response mutation belongs in handler code, after the render.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Path and query of the request, e.g. `/users?page=2`.
    pub uri: String,
    /// The request headers, unfiltered.
    pub headers: HeaderMap,
    /// Parsed protocol negotiation state.
    pub state: InertiaState,
}

impl RequestContext {
    /// Build a context using the default protocol header names.
    pub fn new(uri: impl Into<String>, headers: HeaderMap) -> Self {
        let state = InertiaState::from_headers(&headers);
        RequestContext {
            uri: uri.into(),
            headers,
            state,
        }
    }

    /// Build a context using a custom header-name set.
    pub fn with_header_names(
        uri: impl Into<String>,
        headers: HeaderMap,
        names: &HeaderNames,
    ) -> Self {
        let state = InertiaState::from_headers_with(&headers, names);
        RequestContext {
            uri: uri.into(),
            headers,
            state,
        }
    }
}

/// The dispatched response artifact.
#[derive(Clone, Debug)]
pub enum Rendered {
    /// A protocol navigation: serialize as JSON with HTTP 200.
    Page(PageObject),
    /// A first load: the full HTML document.
    Html(String),
}

/// A pending page render, produced by
/// [`ResponseFactory::render`](crate::ResponseFactory::render).
#[derive(Clone, Debug)]
pub struct Response {
    component: String,
    props: Props,
    version: AssetsVersion,
    clear_history: bool,
    encrypt_history: bool,
}

impl Response {
    pub(crate) fn new(
        component: String,
        props: Props,
        version: AssetsVersion,
        clear_history: bool,
        encrypt_history: bool,
    ) -> Self {
        Response {
            component,
            props,
            version,
            clear_history,
            encrypt_history,
        }
    }

    /// The component this response will render.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Add or replace a single prop after the render call.
    pub fn with(mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.props.insert(key.into(), prop.into());
        self
    }

    /// Select the keys that participate in this response.
    ///
    /// Non-partial requests drop optional and deferred props before any
    /// list filtering. Partial requests honor `only` (selection restarts
    /// from the full bag, in `only` order) or, failing that, `except`.
    /// `Always` props win over both lists.
    fn pick_props(&self, state: &InertiaState) -> Props {
        let is_partial = state.is_partial(&self.component);

        let mut selected: Props = if !is_partial {
            self.props
                .iter()
                .filter(|(_, prop)| !prop.ignored_on_first_load())
                .map(|(key, prop)| (key.clone(), prop.clone()))
                .collect()
        } else if let Some(only) = &state.only {
            tracing::debug!(
                "partial reload of `{}`: only {:?}",
                self.component,
                only
            );
            only.iter()
                .filter_map(|key| {
                    self.props
                        .get(key)
                        .map(|prop| (key.clone(), prop.clone()))
                })
                .collect()
        } else if let Some(except) = &state.except {
            tracing::debug!(
                "partial reload of `{}`: except {:?}",
                self.component,
                except
            );
            let mut kept = self.props.clone();
            for key in except {
                kept.shift_remove(key);
            }
            kept
        } else {
            self.props.clone()
        };

        // Always-props are re-added last and win over both lists. Inserting
        // an existing key keeps its selected position.
        for (key, prop) in &self.props {
            if prop.is_always() {
                selected.insert(key.clone(), prop.clone());
            }
        }

        selected
    }

    /// Group deferred keys from the original bag, first-seen order.
    /// Reported on non-partial responses only.
    fn deferred_props(&self, state: &InertiaState) -> Option<IndexMap<String, Vec<String>>> {
        if state.is_partial(&self.component) {
            return None;
        }

        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, prop) in &self.props {
            if let Some(group) = prop.defer_group() {
                groups.entry(group.to_string()).or_default().push(key.clone());
            }
        }

        (!groups.is_empty()).then_some(groups)
    }

    /// Mergeable keys from the original bag, minus requested resets.
    fn merge_props(&self, state: &InertiaState) -> Option<Vec<String>> {
        let keys: Vec<String> = self
            .props
            .iter()
            .filter(|(key, prop)| prop.should_merge() && !state.reset.contains(key))
            .map(|(key, _)| key.clone())
            .collect();

        (!keys.is_empty()).then_some(keys)
    }

    /// Run the resolution algorithm against a request and assemble the
    /// page-object. Producer failures fail the whole render.
    pub async fn build_page_object(&self, ctx: &RequestContext) -> Result<PageObject> {
        let selected = self.pick_props(&ctx.state);

        let resolutions = selected.into_iter().map(|(key, prop)| async move {
            match resolve_prop(prop, ctx).await {
                Ok(value) => Ok((key, value)),
                Err(source) => Err(InertiaError::PropResolve { key, source }),
            }
        });
        let resolved = future::try_join_all(resolutions).await?;

        let mut props = Map::new();
        for (key, value) in resolved {
            props.insert(key, value);
        }

        Ok(PageObject {
            component: self.component.clone(),
            props,
            url: if ctx.uri.is_empty() {
                "/".to_string()
            } else {
                ctx.uri.clone()
            },
            version: self.version.clone(),
            clear_history: self.clear_history,
            encrypt_history: self.encrypt_history,
            merge_props: self.merge_props(&ctx.state),
            deferred_props: self.deferred_props(&ctx.state),
            ssr_head: None,
            ssr_body: None,
        })
    }

    /// Dispatch the response envelope: the raw page-object for protocol
    /// navigations, the HTML document otherwise.
    pub async fn into_rendered(
        self,
        ctx: &RequestContext,
        template: &dyn TemplateRenderer,
        ssr: Option<&dyn SsrRenderer>,
    ) -> Result<Rendered> {
        let mut page = self.build_page_object(ctx).await?;

        if ctx.state.is_inertia {
            return Ok(Rendered::Page(page));
        }

        if let Some(ssr) = ssr {
            let rendered = ssr.render(&page).await?;
            page.ssr_head = Some(rendered.head);
            page.ssr_body = Some(rendered.body);
        }

        let html = template.render(&page).await?;
        Ok(Rendered::Html(html))
    }
}

/// Resolve one prop to its final JSON value.
///
/// Plain values pass through un-awaited; tagged props await their producer;
/// context props are invoked with the request view and their result resolved
/// recursively (a context producer may hand back another variant).
fn resolve_prop<'a>(
    prop: Prop,
    ctx: &'a RequestContext,
) -> BoxFuture<'a, std::result::Result<Value, PropError>> {
    Box::pin(async move {
        match prop {
            Prop::Value(value) => Ok(value),
            Prop::Tagged(tagged) => tagged.producer.resolve().await,
            Prop::Context(producer) => {
                let next = producer.call(ctx.clone()).await?;
                resolve_prop(next, ctx).await
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{ContextProducer, Producer};
    use crate::ssr::{SsrRendered, SsrRenderer};
    use async_trait::async_trait;
    use http::HeaderValue;
    use serde_json::json;

    fn ctx(pairs: &[(&str, &str)]) -> RequestContext {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(
                http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        RequestContext::new("/test", headers)
    }

    fn first_load() -> RequestContext {
        ctx(&[])
    }

    fn partial(component: &str, extra: &[(&str, &str)]) -> RequestContext {
        let mut pairs = vec![
            ("x-inertia", "true"),
            ("x-inertia-partial-component", component),
        ];
        pairs.extend_from_slice(extra);
        ctx(&pairs)
    }

    fn response(props: Props) -> Response {
        Response::new(
            "Demo".to_string(),
            props,
            AssetsVersion::new("v1"),
            false,
            false,
        )
    }

    fn scenario_bag() -> Props {
        let mut props = Props::new();
        props.insert("id".into(), Prop::from(1));
        props.insert("title".into(), Prop::from("x"));
        props.insert("extra".into(), Prop::optional(Producer::sync(|| "y")));
        props
    }

    #[tokio::test]
    async fn test_first_load_drops_optional_and_deferred() {
        let mut props = scenario_bag();
        props.insert("notes".into(), Prop::deferred(Producer::sync(|| "n")));

        let page = response(props).build_page_object(&first_load()).await.unwrap();
        assert_eq!(page.props.len(), 2);
        assert_eq!(page.props["id"], json!(1));
        assert_eq!(page.props["title"], json!("x"));
        assert!(!page.props.contains_key("extra"));
        assert!(!page.props.contains_key("notes"));
    }

    #[tokio::test]
    async fn test_partial_only_selects_from_full_bag() {
        let page = response(scenario_bag())
            .build_page_object(&partial("Demo", &[("x-inertia-partial-data", "extra")]))
            .await
            .unwrap();
        assert_eq!(page.props.len(), 1);
        assert_eq!(page.props["extra"], json!("y"));
    }

    #[tokio::test]
    async fn test_partial_against_other_component_is_first_load() {
        let page = response(scenario_bag())
            .build_page_object(&partial("Other", &[("x-inertia-partial-data", "extra")]))
            .await
            .unwrap();
        // Target component mismatch: only-list ignored, first-load filtering applies.
        assert!(!page.props.contains_key("extra"));
        assert_eq!(page.props["id"], json!(1));
    }

    #[tokio::test]
    async fn test_partial_except_removes_keys() {
        let page = response(scenario_bag())
            .build_page_object(&partial("Demo", &[("x-inertia-partial-except", "title")]))
            .await
            .unwrap();
        assert!(!page.props.contains_key("title"));
        assert_eq!(page.props["id"], json!(1));
        // No first-load filtering under partial: optional props resolve.
        assert_eq!(page.props["extra"], json!("y"));
    }

    #[tokio::test]
    async fn test_only_takes_precedence_over_except() {
        let page = response(scenario_bag())
            .build_page_object(&partial(
                "Demo",
                &[
                    ("x-inertia-partial-data", "id,title"),
                    ("x-inertia-partial-except", "id"),
                ],
            ))
            .await
            .unwrap();
        // `except` is not consulted once `only` is present.
        assert_eq!(page.props.len(), 2);
        assert!(page.props.contains_key("id"));
        assert!(page.props.contains_key("title"));
    }

    #[tokio::test]
    async fn test_always_wins_over_only_and_except() {
        let mut props = scenario_bag();
        props.insert("auth".into(), Prop::always(Producer::sync(|| "user-7")));

        let only = response(props.clone())
            .build_page_object(&partial("Demo", &[("x-inertia-partial-data", "id")]))
            .await
            .unwrap();
        assert_eq!(only.props["auth"], json!("user-7"));
        assert_eq!(only.props["id"], json!(1));
        assert_eq!(only.props.len(), 2);

        let except = response(props)
            .build_page_object(&partial("Demo", &[("x-inertia-partial-except", "auth")]))
            .await
            .unwrap();
        assert_eq!(except.props["auth"], json!("user-7"));
    }

    #[tokio::test]
    async fn test_partial_without_lists_resolves_full_bag() {
        let page = response(scenario_bag())
            .build_page_object(&partial("Demo", &[]))
            .await
            .unwrap();
        assert_eq!(page.props.len(), 3);
        assert_eq!(page.props["extra"], json!("y"));
    }

    #[tokio::test]
    async fn test_only_order_drives_output_order() {
        let page = response(scenario_bag())
            .build_page_object(&partial("Demo", &[("x-inertia-partial-data", "title,id")]))
            .await
            .unwrap();
        let keys: Vec<&String> = page.props.keys().collect();
        assert_eq!(keys, ["title", "id"]);
    }

    #[tokio::test]
    async fn test_deferred_report_groups_in_first_seen_order() {
        let mut props = Props::new();
        props.insert("a".into(), Prop::deferred(Producer::sync(|| 1)).in_group("g1"));
        props.insert("b".into(), Prop::deferred(Producer::sync(|| 2)).in_group("g2"));
        props.insert("c".into(), Prop::deferred(Producer::sync(|| 3)).in_group("g1"));

        let page = response(props).build_page_object(&first_load()).await.unwrap();
        let deferred = page.deferred_props.unwrap();
        let groups: Vec<&String> = deferred.keys().collect();
        assert_eq!(groups, ["g1", "g2"]);
        assert_eq!(deferred["g1"], vec!["a", "c"]);
        assert_eq!(deferred["g2"], vec!["b"]);
    }

    #[tokio::test]
    async fn test_deferred_report_absent_on_partial() {
        let mut props = Props::new();
        props.insert("notes".into(), Prop::deferred(Producer::sync(|| "n")));

        let page = response(props)
            .build_page_object(&partial("Demo", &[]))
            .await
            .unwrap();
        assert!(page.deferred_props.is_none());
    }

    #[tokio::test]
    async fn test_deferred_report_absent_without_deferred_props() {
        let page = response(scenario_bag())
            .build_page_object(&first_load())
            .await
            .unwrap();
        assert!(page.deferred_props.is_none());
    }

    #[tokio::test]
    async fn test_scenario_c_deferred_excluded_but_reported() {
        let mut props = Props::new();
        props.insert(
            "notes".into(),
            Prop::deferred(Producer::sync(|| "n")).in_group("group1"),
        );

        let page = response(props).build_page_object(&first_load()).await.unwrap();
        assert!(!page.props.contains_key("notes"));
        let deferred = page.deferred_props.unwrap();
        assert_eq!(deferred["group1"], vec!["notes"]);
    }

    #[tokio::test]
    async fn test_merge_report_and_reset() {
        let mut props = Props::new();
        props.insert("counter".into(), Prop::merge(Producer::sync(|| 5)));
        props.insert("feed".into(), Prop::merge(Producer::sync(|| 6)));

        let page = response(props.clone())
            .build_page_object(&first_load())
            .await
            .unwrap();
        assert_eq!(page.merge_props.as_deref(), Some(&["counter".to_string(), "feed".to_string()][..]));

        // Scenario D: reset suppresses the merge flag for that key.
        let page = response(props)
            .build_page_object(&ctx(&[("x-inertia-reset", "counter,feed")]))
            .await
            .unwrap();
        assert!(page.merge_props.is_none());
    }

    #[tokio::test]
    async fn test_merge_report_partial_reset() {
        let mut props = Props::new();
        props.insert("counter".into(), Prop::merge(Producer::sync(|| 5)));
        props.insert("feed".into(), Prop::merge(Producer::sync(|| 6)));

        let page = response(props)
            .build_page_object(&ctx(&[("x-inertia-reset", "counter")]))
            .await
            .unwrap();
        assert_eq!(page.merge_props.as_deref(), Some(&["feed".to_string()][..]));
    }

    #[tokio::test]
    async fn test_deferred_prop_can_also_merge() {
        let mut props = Props::new();
        props.insert(
            "stream".into(),
            Prop::deferred(Producer::sync(Vec::<i32>::new))
                .in_group("feed")
                .mergeable(),
        );

        let page = response(props).build_page_object(&first_load()).await.unwrap();
        assert_eq!(page.deferred_props.unwrap()["feed"], vec!["stream"]);
        assert_eq!(page.merge_props.as_deref(), Some(&["stream".to_string()][..]));
    }

    #[tokio::test]
    async fn test_context_producer_receives_request_view() {
        let mut props = Props::new();
        props.insert(
            "path".into(),
            Prop::context(ContextProducer::new(|ctx: RequestContext| async move {
                Value::from(ctx.uri)
            })),
        );

        let page = response(props).build_page_object(&first_load()).await.unwrap();
        assert_eq!(page.props["path"], json!("/test"));
    }

    #[tokio::test]
    async fn test_context_producer_result_resolves_recursively() {
        let mut props = Props::new();
        props.insert(
            "nested".into(),
            Prop::context(ContextProducer::new(|_ctx| async {
                Prop::optional(Producer::sync(|| "inner"))
            })),
        );

        let page = response(props).build_page_object(&first_load()).await.unwrap();
        assert_eq!(page.props["nested"], json!("inner"));
    }

    #[tokio::test]
    async fn test_producer_failure_fails_whole_render() {
        let mut props = scenario_bag();
        props.insert(
            "boom".into(),
            Prop::always(Producer::try_sync(|| {
                Err::<i32, _>(std::io::Error::new(std::io::ErrorKind::Other, "db down"))
            })),
        );

        let err = response(props)
            .build_page_object(&first_load())
            .await
            .unwrap_err();
        match err {
            InertiaError::PropResolve { key, .. } => assert_eq!(key, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_uri_defaults_to_root() {
        let page = response(scenario_bag())
            .build_page_object(&RequestContext::new("", HeaderMap::new()))
            .await
            .unwrap();
        assert_eq!(page.url, "/");
    }

    #[tokio::test]
    async fn test_round_trip_only_of_all_keys_matches_first_load() {
        let first = response(scenario_bag())
            .build_page_object(&first_load())
            .await
            .unwrap();
        let keys = first.props.keys().cloned().collect::<Vec<_>>().join(",");

        let again = response(scenario_bag())
            .build_page_object(&partial("Demo", &[("x-inertia-partial-data", &keys)]))
            .await
            .unwrap();
        for (key, value) in &first.props {
            assert_eq!(&again.props[key], value);
        }
    }

    struct StubTemplate;

    #[async_trait]
    impl TemplateRenderer for StubTemplate {
        async fn render(&self, page: &PageObject) -> Result<String> {
            Ok(format!("<html>{}</html>", page.component))
        }
    }

    struct StubSsr;

    #[async_trait]
    impl SsrRenderer for StubSsr {
        async fn render(&self, _page: &PageObject) -> Result<SsrRendered> {
            Ok(SsrRendered {
                head: vec!["<title>ssr</title>".into()],
                body: "<div>ssr body</div>".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_dispatch_returns_page_for_protocol_navigation() {
        let rendered = response(scenario_bag())
            .into_rendered(&ctx(&[("x-inertia", "true")]), &StubTemplate, None)
            .await
            .unwrap();
        match rendered {
            Rendered::Page(page) => assert_eq!(page.component, "Demo"),
            Rendered::Html(_) => panic!("expected a page-object"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_renders_html_for_first_load() {
        let rendered = response(scenario_bag())
            .into_rendered(&first_load(), &StubTemplate, None)
            .await
            .unwrap();
        match rendered {
            Rendered::Html(html) => assert_eq!(html, "<html>Demo</html>"),
            Rendered::Page(_) => panic!("expected html"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_ssr_before_templating() {
        struct CapturingTemplate;

        #[async_trait]
        impl TemplateRenderer for CapturingTemplate {
            async fn render(&self, page: &PageObject) -> Result<String> {
                Ok(page.ssr_body.clone().unwrap_or_default())
            }
        }

        let rendered = response(scenario_bag())
            .into_rendered(&first_load(), &CapturingTemplate, Some(&StubSsr))
            .await
            .unwrap();
        match rendered {
            Rendered::Html(html) => assert_eq!(html, "<div>ssr body</div>"),
            Rendered::Page(_) => panic!("expected html"),
        }
    }

    #[tokio::test]
    async fn test_ssr_skipped_for_protocol_navigation() {
        let rendered = response(scenario_bag())
            .into_rendered(&ctx(&[("x-inertia", "true")]), &StubTemplate, Some(&StubSsr))
            .await
            .unwrap();
        match rendered {
            Rendered::Page(page) => {
                assert!(page.ssr_body.is_none());
                assert!(page.ssr_head.is_none());
            }
            Rendered::Html(_) => panic!("expected a page-object"),
        }
    }

    #[tokio::test]
    async fn test_with_adds_a_prop() {
        let page = response(scenario_bag())
            .with("flash", Prop::from("saved"))
            .build_page_object(&first_load())
            .await
            .unwrap();
        assert_eq!(page.props["flash"], json!("saved"));
    }
}
