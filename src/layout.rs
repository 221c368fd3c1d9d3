//! Layout resolution — the post-creation pass that overrides the default
//! layout for specific routes.
//!
//! Resolution is a mutation pass over the already-materialized page set: it
//! rewrites the layout field on existing descriptors and can never enqueue
//! page creation, so the "overriding a page re-creates it, which triggers
//! another override" loop is structurally impossible. Overrides are exact
//! route matches and idempotent — resolving twice equals resolving once.
//!
//! One override ships by default: the root route `/` gets the landing
//! layout; every other page keeps the default layout it was created with.

use crate::pages::{PageDescriptor, PageSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutRules {
    /// Layout every page carries at creation.
    pub default: String,
    /// Exact-match route overrides, applied at most once per page.
    pub overrides: Vec<LayoutOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutOverride {
    pub route: String,
    pub layout: String,
}

impl LayoutRules {
    /// Rules with the single shipped override: root route → landing layout.
    pub fn with_landing(default: &str, landing: &str) -> Self {
        Self {
            default: default.to_string(),
            overrides: vec![LayoutOverride {
                route: "/".to_string(),
                layout: landing.to_string(),
            }],
        }
    }
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self::with_landing("index", "landing-page")
    }
}

/// Resolve the layout for one page.
pub fn resolve_layout(page: &mut PageDescriptor, rules: &LayoutRules) {
    if let Some(over) = rules.overrides.iter().find(|o| o.route == page.route()) {
        page.set_layout(&over.layout);
    }
}

/// Resolve layouts across the whole page set, once per page.
pub fn resolve_layouts(pages: &mut PageSet, rules: &LayoutRules) {
    for page in pages.pages_mut() {
        resolve_layout(page, rules);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::TemplateRef;
    use std::collections::BTreeMap;

    fn page(route: &str) -> PageDescriptor {
        PageDescriptor::new(
            route,
            TemplateRef::new("blog-post"),
            BTreeMap::new(),
            "index",
        )
    }

    fn set_of(routes: &[&str]) -> PageSet {
        let mut set = PageSet::default();
        for route in routes {
            set.insert(page(route), *route).unwrap();
        }
        set
    }

    #[test]
    fn root_route_gets_landing_layout() {
        let mut pages = set_of(&["/", "/blog/posts/a/", "/blog/posts/b/"]);
        resolve_layouts(&mut pages, &LayoutRules::default());

        assert_eq!(pages.get("/").unwrap().layout(), "landing-page");
        assert_eq!(pages.get("/blog/posts/a/").unwrap().layout(), "index");
        assert_eq!(pages.get("/blog/posts/b/").unwrap().layout(), "index");
    }

    #[test]
    fn match_is_exact_not_prefix() {
        let mut pages = set_of(&["/blog/"]);
        resolve_layouts(&mut pages, &LayoutRules::default());
        assert_eq!(pages.get("/blog/").unwrap().layout(), "index");
    }

    #[test]
    fn resolving_twice_equals_resolving_once() {
        let rules = LayoutRules::default();
        let mut once = set_of(&["/", "/blog/posts/a/"]);
        resolve_layouts(&mut once, &rules);

        let mut twice = set_of(&["/", "/blog/posts/a/"]);
        resolve_layouts(&mut twice, &rules);
        resolve_layouts(&mut twice, &rules);

        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.layout(), b.layout());
        }
    }

    #[test]
    fn resolution_never_changes_route_or_template() {
        let mut pages = set_of(&["/"]);
        resolve_layouts(&mut pages, &LayoutRules::default());

        let root = pages.get("/").unwrap();
        assert_eq!(root.route(), "/");
        assert_eq!(root.template().as_str(), "blog-post");
    }

    #[test]
    fn resolution_creates_no_pages() {
        let mut pages = set_of(&["/", "/blog/posts/a/"]);
        let before = pages.len();
        resolve_layouts(&mut pages, &LayoutRules::default());
        resolve_layouts(&mut pages, &LayoutRules::default());
        assert_eq!(pages.len(), before);
    }
}
