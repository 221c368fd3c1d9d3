//! Page materialization — the page-phase hook that turns query rows into
//! page descriptors.
//!
//! One [`materialize`] call consumes one query result and produces the full
//! page set for the build, or nothing: the first error aborts the batch, so
//! a partial set is never surfaced.
//!
//! Per row, exactly one [`PageDescriptor`] is created: route = the node's
//! slug, template = the configured document template, context carrying at
//! minimum the slug (so the template can re-fetch the node's full content by
//! that key) plus presentation fields. On top of the per-row pages, one index
//! page is materialized at the root route whose context carries the ordered
//! post listing — row ordering affects only this presentation data, never
//! page identity.
//!
//! Route paths are unique: two claimants for one route are a
//! [`MaterializeError::DuplicateRoute`], never a silent overwrite.

use crate::config::SiteConfig;
use crate::fields::SLUG_FIELD;
use crate::query::{EXCERPT_FIELD, READ_TIME_FIELD, Row};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Route of the materialized listing page.
pub const INDEX_ROUTE: &str = "/";

/// Context keys copied from each row onto its page (beyond `slug`).
const PRESENTATION_FIELDS: &[&str] = &["title", "date", EXCERPT_FIELD, READ_TIME_FIELD];

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("route {route} claimed by both {first} and {second}")]
    DuplicateRoute {
        route: String,
        first: String,
        second: String,
    },
    #[error("query row for node {node} carries no slug field")]
    MissingSlug { node: String },
}

/// Identifies which rendering template a page binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRef(String);

impl TemplateRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit of build output: a route, a template binding, context data, and
/// a layout. Route and template are fixed at creation; only the layout may
/// be rewritten, and only by the layout resolver.
#[derive(Debug, Clone, Serialize)]
pub struct PageDescriptor {
    route: String,
    template: TemplateRef,
    context: BTreeMap<String, Value>,
    layout: String,
}

impl PageDescriptor {
    pub fn new(
        route: impl Into<String>,
        template: TemplateRef,
        context: BTreeMap<String, Value>,
        layout: impl Into<String>,
    ) -> Self {
        Self {
            route: route.into(),
            template,
            context,
            layout: layout.into(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn template(&self) -> &TemplateRef {
        &self.template
    }

    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub(crate) fn set_layout(&mut self, layout: &str) {
        self.layout = layout.to_string();
    }
}

/// The build's page set. Routes are unique keys.
#[derive(Debug, Default, Serialize)]
pub struct PageSet {
    pages: Vec<PageDescriptor>,
    #[serde(skip)]
    claimants: BTreeMap<String, String>,
}

impl PageSet {
    /// Insert a page, recording who claimed the route for error reporting.
    pub fn insert(
        &mut self,
        page: PageDescriptor,
        source: &str,
    ) -> Result<(), MaterializeError> {
        if let Some(first) = self.claimants.get(page.route()) {
            return Err(MaterializeError::DuplicateRoute {
                route: page.route().to_string(),
                first: first.clone(),
                second: source.to_string(),
            });
        }
        self.claimants
            .insert(page.route().to_string(), source.to_string());
        self.pages.push(page);
        Ok(())
    }

    pub fn get(&self, route: &str) -> Option<&PageDescriptor> {
        self.pages.iter().find(|p| p.route() == route)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageDescriptor> {
        self.pages.iter()
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [PageDescriptor] {
        &mut self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Materialize the page set for one query result.
pub fn materialize(rows: &[Row], config: &SiteConfig) -> Result<PageSet, MaterializeError> {
    let mut set = PageSet::default();
    let mut listing = Vec::with_capacity(rows.len());

    for row in rows {
        let slug = row
            .field(SLUG_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| MaterializeError::MissingSlug {
                node: row.node_id().to_string(),
            })?;

        let mut context = BTreeMap::new();
        context.insert(SLUG_FIELD.to_string(), Value::String(slug.to_string()));
        for key in PRESENTATION_FIELDS {
            if let Some(value) = row.field(key) {
                context.insert((*key).to_string(), value.clone());
            }
        }

        // The listing entry mirrors the page context: row order is the only
        // thing the sort influences.
        let mut entry = Map::new();
        for (key, value) in &context {
            entry.insert(key.clone(), value.clone());
        }
        listing.push(Value::Object(entry));

        let page = PageDescriptor::new(
            slug,
            TemplateRef::new(&config.templates.document),
            context,
            &config.layouts.default,
        );
        set.insert(page, row.node_id())?;
    }

    let mut context = BTreeMap::new();
    context.insert("posts".to_string(), Value::Array(listing));
    let index = PageDescriptor::new(
        INDEX_ROUTE,
        TemplateRef::new(&config.templates.index),
        context,
        &config.layouts.default,
    );
    set.insert(index, "built-in index page")?;

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ContentNode, NodeSet};
    use crate::query::{InMemoryEngine, Query, QueryEngine, Sort};
    use crate::scan::DOCUMENT_KIND;
    use serde_json::json;

    fn rows_for(specs: &[(&str, &str, Option<&str>)]) -> Vec<Row> {
        let mut nodes = NodeSet::default();
        for (id, slug, date) in specs {
            let mut node = ContentNode::new(*id, DOCUMENT_KIND, "Body text.");
            node.attach_field(SLUG_FIELD, json!(slug)).unwrap();
            if let Some(date) = date {
                node.attach_field("date", json!(date)).unwrap();
            }
            nodes.insert(node);
        }
        InMemoryEngine::new(&nodes)
            .execute(&Query {
                kind: DOCUMENT_KIND.to_string(),
                sort: Some(Sort {
                    field: "date".to_string(),
                    descending: true,
                }),
            })
            .unwrap()
    }

    #[test]
    fn one_page_per_row_plus_index() {
        let rows = rows_for(&[
            ("posts/a.md", "/blog/posts/a/", Some("2018-01-01")),
            ("posts/b.md", "/blog/posts/b/", Some("2018-06-01")),
        ]);
        let set = materialize(&rows, &SiteConfig::default()).unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.get("/blog/posts/a/").is_some());
        assert!(set.get("/blog/posts/b/").is_some());
        assert!(set.get(INDEX_ROUTE).is_some());
    }

    #[test]
    fn page_context_carries_slug() {
        let rows = rows_for(&[("posts/a.md", "/blog/posts/a/", None)]);
        let set = materialize(&rows, &SiteConfig::default()).unwrap();

        let page = set.get("/blog/posts/a/").unwrap();
        assert_eq!(page.context().get(SLUG_FIELD), Some(&json!("/blog/posts/a/")));
        assert_eq!(page.template().as_str(), "blog-post");
        assert_eq!(page.layout(), "index");
    }

    #[test]
    fn index_listing_preserves_row_order() {
        let rows = rows_for(&[
            ("posts/old.md", "/blog/posts/old/", Some("2017-01-01")),
            ("posts/new.md", "/blog/posts/new/", Some("2018-06-01")),
        ]);
        let set = materialize(&rows, &SiteConfig::default()).unwrap();

        let index = set.get(INDEX_ROUTE).unwrap();
        let posts = index.context().get("posts").unwrap().as_array().unwrap();
        let slugs: Vec<&str> = posts
            .iter()
            .map(|p| p.get(SLUG_FIELD).unwrap().as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["/blog/posts/new/", "/blog/posts/old/"]);
    }

    #[test]
    fn duplicate_route_is_error_not_merge() {
        let rows = rows_for(&[
            ("posts/A.md", "/blog/posts/a/", Some("2018-01-01")),
            ("posts/a.md", "/blog/posts/a/", Some("2018-06-01")),
        ]);
        let err = materialize(&rows, &SiteConfig::default()).unwrap_err();
        match err {
            MaterializeError::DuplicateRoute { route, first, second } => {
                assert_eq!(route, "/blog/posts/a/");
                assert_ne!(first, second);
            }
            other => panic!("expected DuplicateRoute, got {other:?}"),
        }
    }

    #[test]
    fn document_slug_colliding_with_index_route_is_error() {
        let rows = rows_for(&[("index.md", "/", None)]);
        let err = materialize(&rows, &SiteConfig::default()).unwrap_err();
        assert!(matches!(err, MaterializeError::DuplicateRoute { .. }));
    }

    #[test]
    fn row_without_slug_is_error() {
        // Hand-built page set path: materialize trusts no one.
        let mut nodes = NodeSet::default();
        let mut node = ContentNode::new("posts/a.md", DOCUMENT_KIND, "");
        node.attach_field(SLUG_FIELD, json!(7)).unwrap(); // not a string
        nodes.insert(node);
        let rows = InMemoryEngine::new(&nodes)
            .execute(&Query {
                kind: DOCUMENT_KIND.to_string(),
                sort: None,
            })
            .unwrap();

        let err = materialize(&rows, &SiteConfig::default()).unwrap_err();
        assert!(matches!(err, MaterializeError::MissingSlug { .. }));
    }

    #[test]
    fn empty_query_result_still_yields_index() {
        let set = materialize(&[], &SiteConfig::default()).unwrap();
        assert_eq!(set.len(), 1);
        let index = set.get(INDEX_ROUTE).unwrap();
        assert_eq!(index.template().as_str(), "post-index");
        assert!(index.context().get("posts").unwrap().as_array().unwrap().is_empty());
    }
}
