//! The HTML envelope around a page-object.
//!
//! This is deliberately not a template engine: first-load responses need one
//! root document with the page-object embedded where the client bundle can
//! boot from, and that is all [`RootTemplate`] does. Applications with real
//! templating needs implement [`TemplateRenderer`] over their engine of
//! choice and hand it to the server layer.
//!
//! # Directives
//!
//! | Directive | Expands to |
//! |-----------|------------|
//! | `@inertia` | SSR body when present, else `<div id="app" data-page='…'></div>` |
//! | `@inertiaHead` | SSR head fragments joined by newlines, else nothing |
//! | `{{ dotted.path }}` | value looked up in `{component, url, version, props}` |
//!
//! `@inertiaHead` is expanded before `@inertia` (the former contains the
//! latter as a prefix). Unresolved interpolation paths render empty.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{InertiaError, Result};
use crate::types::PageObject;

/// Renders the HTML document for a first-load response.
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    /// Produce the full HTML document embedding `page`.
    async fn render(&self, page: &PageObject) -> Result<String>;
}

/// File-backed root template with directive expansion.
///
/// The template file is read on every render, so edits show up without a
/// restart.
#[derive(Clone, Debug)]
pub struct RootTemplate {
    path: PathBuf,
}

impl RootTemplate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RootTemplate { path: path.into() }
    }
}

#[async_trait]
impl TemplateRenderer for RootTemplate {
    async fn render(&self, page: &PageObject) -> Result<String> {
        let template = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            InertiaError::Template(format!(
                "failed to read root template {}: {}",
                self.path.display(),
                err
            ))
        })?;
        render_template(&template, page)
    }
}

/// Expand the directives of `template` against `page`.
pub fn render_template(template: &str, page: &PageObject) -> Result<String> {
    let head = page
        .ssr_head
        .as_ref()
        .map(|fragments| fragments.join("\n"))
        .unwrap_or_default();

    let app = match &page.ssr_body {
        Some(body) => body.clone(),
        None => {
            let payload = serde_json::to_string(page)?;
            format!(
                "<div id=\"app\" data-page='{}'></div>",
                escape_attribute(&payload)
            )
        }
    };

    // @inertiaHead first: @inertia is a prefix of it.
    let expanded = template
        .replace("@inertiaHead", &head)
        .replace("@inertia", &app);

    let context = json!({
        "component": &page.component,
        "url": &page.url,
        "version": &page.version,
        "props": &page.props,
    });
    Ok(interpolate(&expanded, &context))
}

/// Replace every `{{ dotted.path }}` with the context value at that path.
fn interpolate(template: &str, context: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                out.push_str(&lookup(context, after[..end].trim()));
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated marker: emit verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn lookup(context: &Value, path: &str) -> String {
    let mut value = context;
    for segment in path.split('.') {
        match value.get(segment) {
            Some(next) => value = next,
            None => return String::new(),
        }
    }

    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Escape a string for embedding in an HTML attribute.
fn escape_attribute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
