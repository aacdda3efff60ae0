//! Server-side rendering collaborator.
//!
//! On first loads the dispatcher can ask an SSR collaborator to pre-render
//! the page before the HTML envelope is emitted. The engine only cares about
//! the interface: hand over the page-object, get head fragments and body
//! markup back. How the collaborator executes the client bundle is its own
//! business.
//!
//! The `ssr` feature ships [`HttpSsrGateway`], which POSTs the page-object
//! to a rendering server (conventionally listening on port 13714) and
//! decodes the `{head, body}` answer. Failures are surfaced, never
//! swallowed: an unreachable SSR server fails the render.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PageObject;

/// Output of one SSR pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SsrRendered {
    /// Markup fragments for the document head.
    pub head: Vec<String>,
    /// Markup replacing the client mount point.
    pub body: String,
}

/// Pre-renders a page-object to markup.
#[async_trait]
pub trait SsrRenderer: Send + Sync {
    async fn render(&self, page: &PageObject) -> Result<SsrRendered>;
}

#[cfg(feature = "ssr")]
pub use gateway::HttpSsrGateway;

#[cfg(feature = "ssr")]
mod gateway {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{SsrRendered, SsrRenderer};
    use crate::config::SsrConfig;
    use crate::error::{InertiaError, Result};
    use crate::types::PageObject;

    /// HTTP gateway to an external SSR server.
    #[derive(Clone, Debug)]
    pub struct HttpSsrGateway {
        client: reqwest::Client,
        url: String,
    }

    impl HttpSsrGateway {
        /// Gateway to the render endpoint at `url`.
        pub fn new(url: impl Into<String>) -> Self {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default();

            HttpSsrGateway {
                client,
                url: url.into(),
            }
        }

        /// Gateway to the endpoint named by the application config.
        pub fn from_config(config: &SsrConfig) -> Self {
            Self::new(&config.server_url)
        }
    }

    #[async_trait]
    impl SsrRenderer for HttpSsrGateway {
        async fn render(&self, page: &PageObject) -> Result<SsrRendered> {
            let response = self
                .client
                .post(&self.url)
                .json(page)
                .send()
                .await
                .map_err(|err| {
                    InertiaError::Ssr(format!("ssr server unreachable at {}: {}", self.url, err))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(InertiaError::Ssr(format!(
                    "ssr server answered {} for {}",
                    status, page.component
                )));
            }

            response
                .json::<SsrRendered>()
                .await
                .map_err(|err| InertiaError::Ssr(format!("invalid ssr payload: {}", err)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssr_rendered_wire_shape() {
        let rendered: SsrRendered =
            serde_json::from_str(r#"{"head": ["<title>t</title>"], "body": "<div/>"}"#).unwrap();
        assert_eq!(rendered.head, vec!["<title>t</title>"]);
        assert_eq!(rendered.body, "<div/>");
    }
}
