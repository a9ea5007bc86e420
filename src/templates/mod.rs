//! Built-in nova theme templates using the Tera template engine
//!
//! All templates are embedded directly in the binary, so a site needs no
//! theme directory on disk.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers;

/// Template renderer with the embedded nova theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all nova templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Section bodies and cards are HTML produced (and escaped) upstream,
        // so template-level autoescaping would double-escape them
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("nova/layout.html")),
            ("index.html", include_str!("nova/index.html")),
            ("post.html", include_str!("nova/post.html")),
            (
                "partials/head.html",
                include_str!("nova/partials/head.html"),
            ),
            (
                "partials/header.html",
                include_str!("nova/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("nova/partials/footer.html"),
            ),
            (
                "partials/pager.html",
                include_str!("nova/partials/pager.html"),
            ),
            (
                "partials/preview.html",
                include_str!("nova/partials/preview.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    Ok(tera::Value::String(helpers::truncate(&s, length, None)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
    pub language: String,
}

/// One card on a listing page
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Localized publication date; absent for unpublished drafts
    pub date: Option<String>,
}

/// A rendered section of a post body
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: String,
    pub body_html: String,
}

/// Adjacent-post navigation target
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}

/// Everything the post template needs
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub edited: Option<String>,
    pub banner_url: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionView>,
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub total: usize,
    /// Link towards newer posts; absent on the first page
    pub newer_url: Option<String>,
    /// Link towards older posts; absent once the listing is exhausted
    pub older_url: Option<String>,
}
