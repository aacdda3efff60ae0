//! The process-wide root handle and the per-request extractor.

use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Extension;

use crate::config::Config;
use crate::error::InertiaError;
use crate::factory::ResponseFactory;
use crate::props::{Prop, Props};
use crate::protocol::HeaderNames;
use crate::response::{Rendered, RequestContext};
use crate::server::response::InertiaResponse;
use crate::ssr::SsrRenderer;
use crate::template::{RootTemplate, TemplateRenderer};
use crate::types::AssetsVersion;
use crate::version::VersionCache;

/// Process-wide Inertia handle, installed on the router as an extension
/// layer. Cheap to clone.
#[derive(Clone)]
pub struct InertiaRoot {
    inner: Arc<RootInner>,
}

struct RootInner {
    config: Config,
    header_names: HeaderNames,
    version_cache: VersionCache,
    template: Arc<dyn TemplateRenderer>,
    ssr: Option<Arc<dyn SsrRenderer>>,
    shared: Props,
}

impl InertiaRoot {
    /// A root with default collaborators for `config`.
    pub fn new(config: Config) -> Self {
        Self::builder(config).build()
    }

    /// Start a builder to override collaborators.
    pub fn builder(config: Config) -> InertiaRootBuilder {
        InertiaRootBuilder {
            config,
            header_names: HeaderNames::default(),
            template: None,
            ssr: None,
            shared: Props::new(),
        }
    }

    /// The extension layer registering this root with a router.
    pub fn layer(&self) -> Extension<InertiaRoot> {
        Extension(self.clone())
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn header_names(&self) -> &HeaderNames {
        &self.inner.header_names
    }

    /// Current asset version, resolved through the process-wide cache.
    pub async fn version(&self) -> AssetsVersion {
        self.inner.version_cache.version().await
    }

    pub fn template(&self) -> &dyn TemplateRenderer {
        self.inner.template.as_ref()
    }

    pub fn ssr(&self) -> Option<&dyn SsrRenderer> {
        self.inner.ssr.as_deref()
    }

    /// Application-wide shared props seeded into every request.
    pub fn shared(&self) -> &Props {
        &self.inner.shared
    }
}

impl fmt::Debug for InertiaRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InertiaRoot")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`InertiaRoot`].
pub struct InertiaRootBuilder {
    config: Config,
    header_names: HeaderNames,
    template: Option<Arc<dyn TemplateRenderer>>,
    ssr: Option<Arc<dyn SsrRenderer>>,
    shared: Props,
}

impl InertiaRootBuilder {
    /// Replace the root-template renderer.
    pub fn template(mut self, template: impl TemplateRenderer + 'static) -> Self {
        self.template = Some(Arc::new(template));
        self
    }

    /// Replace the SSR collaborator.
    pub fn ssr(mut self, ssr: impl SsrRenderer + 'static) -> Self {
        self.ssr = Some(Arc::new(ssr));
        self
    }

    /// Use a custom protocol header-name set.
    pub fn header_names(mut self, names: HeaderNames) -> Self {
        self.header_names = names;
        self
    }

    /// Seed a shared prop into every request's store.
    pub fn share(mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.shared.insert(key.into(), prop.into());
        self
    }

    pub fn build(self) -> InertiaRoot {
        let template = self
            .template
            .unwrap_or_else(|| Arc::new(RootTemplate::new(&self.config.root_template)));

        let ssr = match self.ssr {
            Some(ssr) => Some(ssr),
            None if self.config.ssr.enabled => default_ssr_gateway(&self.config),
            None => None,
        };

        InertiaRoot {
            inner: Arc::new(RootInner {
                version_cache: VersionCache::from_config(&self.config),
                header_names: self.header_names,
                template,
                ssr,
                shared: self.shared,
                config: self.config,
            }),
        }
    }
}

#[cfg(feature = "ssr")]
fn default_ssr_gateway(config: &Config) -> Option<Arc<dyn SsrRenderer>> {
    Some(Arc::new(crate::ssr::HttpSsrGateway::from_config(
        &config.ssr,
    )))
}

#[cfg(not(feature = "ssr"))]
fn default_ssr_gateway(_config: &Config) -> Option<Arc<dyn SsrRenderer>> {
    tracing::warn!("ssr.enabled is set but the `ssr` feature is disabled; rendering without SSR");
    None
}

/// Rejection emitted when [`Inertia`] is used without a registered root.
#[derive(Debug)]
pub struct InertiaRejection(pub(crate) InertiaError);

/// Per-request Inertia handle.
///
/// Extracting it builds a fresh [`ResponseFactory`], so shared props and
/// history flags are scoped to this request only. `render` consumes the
/// handle: one page per request.
#[derive(Debug)]
pub struct Inertia {
    root: InertiaRoot,
    ctx: RequestContext,
    factory: ResponseFactory,
}

impl<S> FromRequestParts<S> for Inertia
where
    S: Send + Sync,
{
    type Rejection = InertiaRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Some(root) = parts.extensions.get::<InertiaRoot>().cloned() else {
            return Err(InertiaRejection(InertiaError::Config(
                "Inertia is not registered. Did you forget to add the InertiaRoot layer \
                 to the router?"
                    .to_string(),
            )));
        };

        let uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let ctx =
            RequestContext::with_header_names(uri, parts.headers.clone(), root.header_names());

        let version = root.version().await;
        let encrypt = root.config().history.encrypt;
        let factory = ResponseFactory::new(version, encrypt).with_shared(root.shared().clone());

        Ok(Inertia { root, ctx, factory })
    }
}

impl Inertia {
    /// The parsed negotiation state of this request.
    pub fn state(&self) -> &crate::protocol::InertiaState {
        &self.ctx.state
    }

    /// The full request view handed to context producers.
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Contribute a shared prop to this request's store.
    pub fn share(&mut self, key: impl Into<String>, prop: impl Into<Prop>) {
        self.factory.share(key, prop);
    }

    /// The currently accumulated shared props.
    pub fn shared(&self) -> &Props {
        self.factory.shared()
    }

    /// Clear this request's shared-prop store.
    pub fn flush_shared(&mut self) {
        self.factory.flush_shared();
    }

    /// Ask the client to clear its history state.
    pub fn clear_history(&mut self) {
        self.factory.clear_history();
    }

    /// Override history encryption for this page.
    pub fn encrypt_history(&mut self, encrypt: bool) {
        self.factory.encrypt_history(encrypt);
    }

    /// Did the client navigate with a stale asset version? Answer stale GET
    /// navigations with [`Inertia::location`] to force a full reload.
    pub fn is_stale(&self) -> bool {
        self.ctx.state.is_stale(self.factory.version())
    }

    /// Resolve and dispatch a page. Consumes the handle.
    pub async fn render(
        mut self,
        component: impl Into<String>,
        props: Props,
    ) -> crate::error::Result<InertiaResponse> {
        let response = self.factory.render(component, props);
        let rendered = response
            .into_rendered(&self.ctx, self.root.template(), self.root.ssr())
            .await?;

        Ok(match rendered {
            Rendered::Page(page) => {
                InertiaResponse::page(page, self.root.header_names().clone())
            }
            Rendered::Html(html) => InertiaResponse::html(html),
        })
    }

    /// A forced full-page visit to `url` (HTTP 409 + location header).
    pub fn location(&self, url: impl Into<String>) -> InertiaResponse {
        InertiaResponse::location(
            ResponseFactory::location(url),
            self.root.header_names().clone(),
        )
    }
}
