//! Template registry, HTML rendering, and artifact output.
//!
//! Every page descriptor binds a template reference; [`resolve_template`]
//! maps the reference to a renderer or fails with
//! [`RenderError::TemplateMissing`]. Templates receive a [`RenderCtx`] — the
//! page's context mapping plus the node set for re-fetching full content by
//! the `slug` context key — and produce the inner markup, which the page's
//! resolved layout then wraps.
//!
//! ## Templates
//!
//! - `blog-post`: re-fetches the document node by slug, converts its markdown
//!   body, renders title/date header.
//! - `post-index`: renders the ordered post listing from context.
//!
//! ## Layouts
//!
//! - `index` (default): site header with title and tagline, nav, footer.
//! - `landing-page`: hero treatment for the root route, no site header.
//!
//! ## Output
//!
//! Routes map to files as `/<route>/index.html` under the output directory
//! (`/` → `index.html`). Pages render to memory first; nothing is written
//! until every page rendered, so a failed build publishes no artifact.
//!
//! HTML is generated with [maud](https://maud.lambda.xyz/): compile-time
//! checked templates with automatic XSS escaping. The stylesheet is embedded
//! at compile time from `static/style.css`.

use crate::config::SiteMeta;
use crate::fields::SLUG_FIELD;
use crate::node::NodeSet;
use crate::pages::{PageDescriptor, PageSet, TemplateRef};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSS: &str = include_str!("../static/style.css");

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no template registered for `{0}`")]
    TemplateMissing(String),
    #[error("no layout registered for `{0}`")]
    LayoutMissing(String),
    #[error("page {route}: context key `{key}` missing or not a string")]
    MissingContext { route: String, key: String },
    #[error("no content node carries slug {slug}")]
    NodeNotFound { slug: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a template may read: the page's own context plus the node set
/// for content re-fetch by slug.
pub struct RenderCtx<'a> {
    pub page: &'a PageDescriptor,
    pub nodes: &'a NodeSet,
    pub site: &'a SiteMeta,
}

type TemplateFn = fn(&RenderCtx) -> Result<Markup, RenderError>;

/// Map a template reference to its renderer.
pub fn resolve_template(template: &TemplateRef) -> Result<TemplateFn, RenderError> {
    match template.as_str() {
        "blog-post" => Ok(blog_post),
        "post-index" => Ok(post_index),
        other => Err(RenderError::TemplateMissing(other.to_string())),
    }
}

/// One fully rendered page, not yet on disk.
#[derive(Debug)]
pub struct RenderedPage {
    pub route: String,
    pub layout: String,
    pub html: String,
}

/// A page artifact on disk, for reporting.
#[derive(Debug)]
pub struct WrittenPage {
    pub route: String,
    pub file: PathBuf,
    pub layout: String,
}

/// Render every page in the set to memory.
pub fn render_pages(
    pages: &PageSet,
    nodes: &NodeSet,
    site: &SiteMeta,
) -> Result<Vec<RenderedPage>, RenderError> {
    pages
        .iter()
        .map(|page| {
            let html = render_page(page, nodes, site)?;
            Ok(RenderedPage {
                route: page.route().to_string(),
                layout: page.layout().to_string(),
                html,
            })
        })
        .collect()
}

/// Write rendered pages under the output directory, one artifact per route.
pub fn write_pages(
    rendered: &[RenderedPage],
    output_dir: &Path,
) -> Result<Vec<WrittenPage>, RenderError> {
    let mut written = Vec::with_capacity(rendered.len());
    for page in rendered {
        let file = route_to_file(output_dir, &page.route);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, &page.html)?;
        written.push(WrittenPage {
            route: page.route.clone(),
            file,
            layout: page.layout.clone(),
        });
    }
    Ok(written)
}

/// Map a route to its artifact path: `/` → `index.html`,
/// `/blog/posts/a/` → `blog/posts/a/index.html`.
pub fn route_to_file(output_dir: &Path, route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        output_dir.join("index.html")
    } else {
        output_dir.join(trimmed).join("index.html")
    }
}

fn render_page(
    page: &PageDescriptor,
    nodes: &NodeSet,
    site: &SiteMeta,
) -> Result<String, RenderError> {
    let template = resolve_template(page.template())?;
    let ctx = RenderCtx { page, nodes, site };
    let inner = template(&ctx)?;

    let title = context_str(page, "title").unwrap_or(site.title.as_str());
    let doc = match page.layout() {
        "index" => base_document(title, site, default_layout(site, inner)),
        "landing-page" => base_document(title, site, landing_layout(site, inner)),
        other => return Err(RenderError::LayoutMissing(other.to_string())),
    };
    Ok(doc.into_string())
}

fn context_str<'a>(page: &'a PageDescriptor, key: &str) -> Option<&'a str> {
    page.context().get(key).and_then(Value::as_str)
}

// ============================================================================
// Templates
// ============================================================================

/// Document page: markdown body re-fetched from the node set by slug.
fn blog_post(ctx: &RenderCtx) -> Result<Markup, RenderError> {
    let slug = context_str(ctx.page, SLUG_FIELD).ok_or_else(|| RenderError::MissingContext {
        route: ctx.page.route().to_string(),
        key: SLUG_FIELD.to_string(),
    })?;
    let node = ctx
        .nodes
        .find_by_field(SLUG_FIELD, &Value::String(slug.to_string()))
        .ok_or_else(|| RenderError::NodeNotFound {
            slug: slug.to_string(),
        })?;

    let title = context_str(ctx.page, "title").unwrap_or(slug);
    let body_html = markdown_to_html(node.body());

    Ok(html! {
        article.post {
            h1.post-title { (title) }
            @if let Some(date) = context_str(ctx.page, "date") {
                h2.post-date { (date) }
            }
            div.post-content { (PreEscaped(body_html)) }
        }
    })
}

/// Root listing page: ordered post entries from context.
fn post_index(ctx: &RenderCtx) -> Result<Markup, RenderError> {
    let posts = ctx
        .page
        .context()
        .get("posts")
        .and_then(Value::as_array)
        .ok_or_else(|| RenderError::MissingContext {
            route: ctx.page.route().to_string(),
            key: "posts".to_string(),
        })?;

    Ok(html! {
        section.post-list {
            h2 { "Latest posts" }
            @if posts.is_empty() {
                p.post-list-empty { "Nothing published yet." }
            }
            ul {
                @for post in posts {
                    @let slug = post.get(SLUG_FIELD).and_then(Value::as_str).unwrap_or("/");
                    li.post-entry {
                        a href=(slug) {
                            (post.get("title").and_then(Value::as_str).unwrap_or(slug))
                        }
                        @if let Some(date) = post.get("date").and_then(Value::as_str) {
                            span.post-entry-date { (date) }
                        }
                        @if let Some(minutes) = post.get("read_time_minutes").and_then(Value::as_u64) {
                            span.post-entry-read-time { (minutes) " min read" }
                        }
                        @if let Some(excerpt) = post.get("excerpt").and_then(Value::as_str) {
                            p.post-entry-excerpt { (excerpt) }
                        }
                    }
                }
            }
        }
    })
}

// ============================================================================
// Layouts
// ============================================================================

fn base_document(title: &str, site: &SiteMeta, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if !site.tagline.is_empty() {
                    meta name="description" content=(site.tagline);
                }
                title { (title) }
                // raw-text element: entities are not decoded inside <style>
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Default layout: site header, nav, page body, footer.
fn default_layout(site: &SiteMeta, content: Markup) -> Markup {
    html! {
        div.main-wrapper {
            header.site-header {
                a.main-header-link href="/" {
                    h1 {
                        (site.title)
                        @if !site.tagline.is_empty() {
                            " " span.site-tagline { (site.tagline) }
                        }
                    }
                }
            }
            nav.main-nav {
                a href="/" { "Home" }
            }
            div.page-body { (content) }
            footer.site-footer {
                p { "© " (site.title) }
            }
        }
    }
}

/// Landing layout: hero treatment for the root route.
fn landing_layout(site: &SiteMeta, content: Markup) -> Markup {
    html! {
        div.landing-wrapper {
            nav.landing-nav {
                a href="/" { "Home" }
            }
            div.landing-hero {
                h1 { (site.title) }
                @if !site.tagline.is_empty() {
                    h4 { (site.tagline) }
                }
            }
            div.landing-body { (content) }
        }
    }
}

fn markdown_to_html(body: &str) -> String {
    let parser = Parser::new(body);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}
