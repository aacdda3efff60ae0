//! Inertia.js protocol engine for Rust
//!
//! A server-side implementation of the Inertia protocol: render logical
//! "pages" (a component name plus a bag of props) as JSON page-objects for
//! client-driven navigations, or as full HTML documents for first loads,
//! honoring the partial-reload negotiation carried in `X-Inertia-*` headers.
//!
//! # Overview
//!
//! - **Prop variants**: eager, optional, deferred (grouped), mergeable and
//!   always-included props, with producers awaited concurrently at render
//!   time
//! - **Partial reloads**: allow/deny lists, target-component matching and
//!   merge resets, negotiated entirely through request headers
//! - **History control**: per-page clear/encrypt flags
//! - **SSR hook**: optional pre-rendering through an external collaborator
//!
//! # Modules
//!
//! - [`props`] - Prop variants, producers and the ordered property bag
//! - [`protocol`] - Header names and per-request negotiation state
//! - [`response`] - The resolution engine and envelope dispatcher
//! - [`factory`] - Request-scoped shared-prop store and render entry point
//! - [`types`] - The page-object wire artifact and asset version
//! - [`template`] - The HTML envelope around a page-object
//! - [`ssr`] - The server-side-rendering collaborator interface
//! - [`version`] - Manifest-hash asset version resolution
//! - [`server`] - Axum extractor, root handle and response types
//!
//! # Quick Start
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use inertia_rs::{Config, Inertia, InertiaResponse, InertiaRoot, Prop, Producer, Props, Result};
//!
//! async fn users(inertia: Inertia) -> Result<InertiaResponse> {
//!     let mut props = Props::new();
//!     props.insert("users".into(), Prop::from(serde_json::json!(["ada", "grace"])));
//!     props.insert("stats".into(), Prop::deferred(Producer::new(|| async { 99 })));
//!     inertia.render("Users/Index", props).await
//! }
//!
//! let root = InertiaRoot::new(Config::default());
//! let app: Router = Router::new().route("/users", get(users)).layer(root.layer());
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod props;
pub mod protocol;
pub mod response;
#[cfg(feature = "server")]
pub mod server;
pub mod ssr;
pub mod template;
pub mod types;
pub mod version;

// Re-export commonly used types at crate root
pub use config::{Config, HistoryConfig, SsrConfig};
pub use error::{InertiaError, Result};
pub use factory::{Location, ResponseFactory};
pub use props::{ContextProducer, Producer, Prop, PropKind, Props};
pub use protocol::{HeaderNames, InertiaState};
pub use response::{Rendered, RequestContext, Response};
pub use ssr::{SsrRendered, SsrRenderer};
pub use template::{RootTemplate, TemplateRenderer};
pub use types::{AssetsVersion, PageObject};
pub use version::VersionCache;

#[cfg(feature = "ssr")]
pub use ssr::HttpSsrGateway;

// Re-export server types
#[cfg(feature = "server")]
pub use server::{Inertia, InertiaResponse};
#[cfg(feature = "server")]
pub use server::{InertiaRejection, InertiaRoot, InertiaRootBuilder};
