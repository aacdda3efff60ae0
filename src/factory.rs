//! The response factory: a request-scoped accumulator of shared props and
//! history flags, flushed into a [`Response`] by the render call.
//!
//! One factory exists per logical request. Handlers (or middleware running
//! before them) contribute props with [`ResponseFactory::share`] at any
//! point; [`ResponseFactory::render`] merges the accumulated map with the
//! call's own props — the call's props win on key conflicts — and clears the
//! store, so two consecutive renders in the same scope never see duplicated
//! shared data.
//!
//! Scoping is by construction, not by a global: the server integration
//! builds a fresh factory per request (see [`crate::server`]), which keeps
//! concurrent requests from corrupting each other's shared props.

use http::StatusCode;

use crate::props::{Prop, Props};
use crate::response::Response;
use crate::types::AssetsVersion;

/// A forced full-page visit: answered as HTTP 409 with the target URL in
/// the protocol's location header, so the client-side router intercepts it
/// instead of following an ordinary redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Absolute or relative URL the client must visit.
    pub url: String,
}

impl Location {
    /// The status code the transport must answer with.
    pub const STATUS: StatusCode = StatusCode::CONFLICT;
}

/// Request-scoped shared-prop store and render entry point.
#[derive(Clone, Debug)]
pub struct ResponseFactory {
    version: AssetsVersion,
    shared: Props,
    clear_history: bool,
    encrypt_history: bool,
}

impl ResponseFactory {
    /// Create a factory for one request.
    ///
    /// `encrypt_history` seeds the per-request flag from the application
    /// default; [`ResponseFactory::encrypt_history`] overrides it.
    pub fn new(version: AssetsVersion, encrypt_history: bool) -> Self {
        ResponseFactory {
            version,
            shared: Props::new(),
            clear_history: false,
            encrypt_history,
        }
    }

    /// Seed the store with application-wide shared props.
    pub fn with_shared(mut self, shared: Props) -> Self {
        self.shared = shared;
        self
    }

    /// The asset version this factory will stamp on pages.
    pub fn version(&self) -> &AssetsVersion {
        &self.version
    }

    /// Contribute a shared prop. Last write wins for a given key.
    pub fn share(&mut self, key: impl Into<String>, prop: impl Into<Prop>) {
        self.shared.insert(key.into(), prop.into());
    }

    /// The currently accumulated shared props.
    pub fn shared(&self) -> &Props {
        &self.shared
    }

    /// Clear the shared-prop store. Idempotent.
    pub fn flush_shared(&mut self) {
        self.shared.clear();
    }

    /// Ask the client to clear its history state for the page rendered by
    /// this request.
    pub fn clear_history(&mut self) {
        self.clear_history = true;
    }

    /// Override history encryption for the page rendered by this request.
    pub fn encrypt_history(&mut self, encrypt: bool) {
        self.encrypt_history = encrypt;
    }

    /// Merge shared props with `props` (the latter wins), flush the store,
    /// and capture everything into a pending [`Response`].
    pub fn render(&mut self, component: impl Into<String>, props: Props) -> Response {
        let mut merged = std::mem::take(&mut self.shared);
        merged.extend(props);

        Response::new(
            component.into(),
            merged,
            self.version.clone(),
            self.clear_history,
            self.encrypt_history,
        )
    }

    /// Build a forced full-page visit to `url` (HTTP 409 semantics).
    pub fn location(url: impl Into<String>) -> Location {
        Location { url: url.into() }
    }
}
