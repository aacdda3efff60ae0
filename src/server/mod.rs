//! Axum integration.
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`InertiaRoot`] | Process-wide handle: config, version cache, template and SSR collaborators |
//! | [`Inertia`] | Per-request extractor: shared-prop store, history flags, `render`/`location` |
//! | [`InertiaResponse`] | `IntoResponse`: JSON page-object, HTML document, or 409 location |
//!
//! # Wiring
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use inertia_rs::{Config, Inertia, InertiaResponse, Prop, Producer, Props, Result};
//!
//! async fn index(mut inertia: Inertia) -> Result<InertiaResponse> {
//!     inertia.share("flash", Prop::from("saved"));
//!
//!     let mut props = Props::new();
//!     props.insert("users".into(), Prop::optional(Producer::new(|| async { vec!["ada"] })));
//!     inertia.render("Users/Index", props).await
//! }
//!
//! let root = inertia_rs::InertiaRoot::builder(Config::default()).build();
//! let app: Router = Router::new()
//!     .route("/users", get(index))
//!     .layer(root.layer());
//! ```
//!
//! The extractor builds one [`crate::ResponseFactory`] per request, which is
//! what keeps shared props from leaking between concurrent requests. Using
//! [`Inertia`] without installing the root layer is the configuration error
//! of the engine: the extractor rejects loudly with a 500.

mod extract;
mod response;

pub use extract::{Inertia, InertiaRejection, InertiaRoot, InertiaRootBuilder};
pub use response::InertiaResponse;
