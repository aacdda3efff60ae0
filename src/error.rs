//! Error types for the Inertia protocol engine.
//!
//! The crate distinguishes a small number of failure classes:
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | [`InertiaError::Config`] | The engine was used before being registered/configured |
//! | [`InertiaError::PropResolve`] | A prop producer failed; the whole render fails |
//! | [`InertiaError::Template`] | The root template is missing or failed to render |
//! | [`InertiaError::Ssr`] | The SSR collaborator failed or answered garbage |
//! | [`InertiaError::Json`] | The page-object could not be serialized |
//!
//! Malformed *inbound* headers are never an error: parsing degrades to
//! "header absent" semantics instead (see [`crate::protocol`]).

use thiserror::Error;

/// Boxed error produced by a prop producer.
///
/// Producers are application code; any error type they return is carried
/// opaquely and surfaced through [`InertiaError::PropResolve`].
pub type PropError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the Inertia engine.
#[derive(Debug, Error)]
pub enum InertiaError {
    /// The engine was invoked before the enclosing application registered it,
    /// or its configuration is unusable. Fatal, not retried.
    #[error("inertia configuration error: {0}")]
    Config(String),

    /// A prop producer failed during resolution. No partial page is emitted;
    /// the render fails as a whole and maps to a 500-class response at the
    /// transport boundary.
    #[error("failed to resolve prop `{key}`: {source}")]
    PropResolve {
        /// Top-level key of the failing prop.
        key: String,
        #[source]
        source: PropError,
    },

    /// The root template could not be read or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// The server-side-rendering collaborator failed.
    #[error("ssr error: {0}")]
    Ssr(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InertiaError>;
