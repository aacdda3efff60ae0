//! Response types for axum handlers.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::error::InertiaError;
use crate::factory::Location;
use crate::protocol::HeaderNames;
use crate::types::PageObject;

/// A dispatched Inertia response.
///
/// Three shapes, matching the protocol's envelope rules:
///
/// - a JSON page-object with the `X-Inertia: true` marker (client-driven
///   navigation),
/// - an HTML document (first load),
/// - an HTTP 409 carrying the target URL in the location header (forced
///   full-page visit).
#[derive(Clone, Debug)]
pub struct InertiaResponse {
    kind: ResponseKind,
    names: HeaderNames,
}

#[derive(Clone, Debug)]
enum ResponseKind {
    Page(PageObject),
    Html(String),
    Location(Location),
}

impl InertiaResponse {
    pub(crate) fn page(page: PageObject, names: HeaderNames) -> Self {
        InertiaResponse {
            kind: ResponseKind::Page(page),
            names,
        }
    }

    pub(crate) fn html(html: String) -> Self {
        InertiaResponse {
            kind: ResponseKind::Html(html),
            names: HeaderNames::default(),
        }
    }

    pub(crate) fn location(location: Location, names: HeaderNames) -> Self {
        InertiaResponse {
            kind: ResponseKind::Location(location),
            names,
        }
    }

    /// Is this a JSON page-object response?
    pub fn is_page(&self) -> bool {
        matches!(self.kind, ResponseKind::Page(_))
    }

    /// Is this an HTML document response?
    pub fn is_html(&self) -> bool {
        matches!(self.kind, ResponseKind::Html(_))
    }

    /// The page-object, when this is a protocol response.
    pub fn as_page(&self) -> Option<&PageObject> {
        match &self.kind {
            ResponseKind::Page(page) => Some(page),
            _ => None,
        }
    }
}

impl IntoResponse for InertiaResponse {
    fn into_response(self) -> Response {
        match self.kind {
            ResponseKind::Page(page) => match serde_json::to_vec(&page) {
                Ok(body) => {
                    let mut response = (
                        StatusCode::OK,
                        [(header::CONTENT_TYPE, "application/json")],
                        body,
                    )
                        .into_response();
                    set_header(&mut response, &self.names.inertia, "true");
                    response
                }
                Err(err) => {
                    tracing::error!("failed to serialize page object: {}", err);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
            ResponseKind::Html(html) => Html(html).into_response(),
            ResponseKind::Location(location) => {
                let mut response = Location::STATUS.into_response();
                set_header(&mut response, &self.names.location, &location.url);
                response
            }
        }
    }
}

fn set_header(response: &mut Response, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            response.headers_mut().insert(name, value);
        }
        _ => {
            tracing::error!("invalid protocol header `{}: {}`", name, value);
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        }
    }
}

/// Producer and template failures surface as plain 500s; the body carries
/// the display form, the log carries the chain.
impl IntoResponse for InertiaError {
    fn into_response(self) -> Response {
        tracing::error!("inertia render failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Missing-registration rejection from the [`crate::Inertia`] extractor.
impl IntoResponse for super::extract::InertiaRejection {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}
