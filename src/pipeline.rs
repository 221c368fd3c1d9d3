//! Build driver: an explicit ordered pipeline of typed phase functions.
//!
//! One build invocation runs two phases:
//!
//! ```text
//! node phase   scan → create nodes → derive fields   (barrier)
//! page phase   query → materialize → resolve layouts → render → write
//! ```
//!
//! The node phase is a barrier — [`run_node_phase`] returns only once every
//! node carries its derived fields, so no query observes a half-derived set.
//! The page phase consumes the frozen node set. Any component error aborts
//! the whole invocation; pages render to memory before anything is written,
//! so a failed build publishes no artifact. No retries: content and
//! configuration are static per build, so every error is fatal to the run.

use crate::config::SiteConfig;
use crate::fields::{self, DeriveError};
use crate::layout;
use crate::node::{ContentNode, NodeSet};
use crate::pages::{self, MaterializeError, PageSet};
use crate::query::{InMemoryEngine, Query, QueryEngine, QueryError, Sort};
use crate::render::{self, RenderError, WrittenPage};
use crate::scan::{self, ScanError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("scan: {0}")]
    Scan(#[from] ScanError),
    #[error("field derivation: {0}")]
    Derive(#[from] DeriveError),
    #[error("query: {0}")]
    Query(#[from] QueryError),
    #[error("materialize: {0}")]
    Materialize(#[from] MaterializeError),
    #[error("render: {0}")]
    Render(#[from] RenderError),
}

/// What one successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub documents: usize,
    pub pages: Vec<WrittenPage>,
}

/// Node phase: discover content, create nodes, attach derived fields.
pub fn run_node_phase(source: &Path, config: &SiteConfig) -> Result<NodeSet, BuildError> {
    let items = scan::list_content_items(source)?;

    let mut nodes = NodeSet::default();
    for item in items {
        let (front_matter, body) = scan::parse_front_matter(&item.body);
        let mut node = ContentNode::new(item.path.to_string_lossy(), item.kind, body);
        for (name, value) in front_matter {
            node.attach_field(&name, value).map_err(DeriveError::from)?;
        }
        nodes.insert(node);
    }

    fields::derive_fields(&mut nodes, source, &config.base_route)?;
    Ok(nodes)
}

/// Page phase: query the frozen node set, materialize pages, resolve layouts.
pub fn run_page_phase(nodes: &NodeSet, config: &SiteConfig) -> Result<PageSet, BuildError> {
    let engine = InMemoryEngine::new(nodes);
    let query = Query {
        kind: scan::DOCUMENT_KIND.to_string(),
        sort: Some(Sort {
            field: config.query.sort_field.clone(),
            descending: true,
        }),
    };
    let rows = engine.execute(&query)?;

    let mut page_set = pages::materialize(&rows, config)?;
    layout::resolve_layouts(&mut page_set, &config.layout_rules());
    Ok(page_set)
}

/// Full build: both phases, then render and write one artifact per page.
pub fn build(source: &Path, output: &Path, config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let nodes = run_node_phase(source, config)?;
    let page_set = run_page_phase(&nodes, config)?;

    let rendered = render::render_pages(&page_set, &nodes, &config.site)?;
    let written = render::write_pages(&rendered, output)?;

    Ok(BuildReport {
        documents: nodes.len(),
        pages: written,
    })
}

/// Validate content without writing: both phases plus an in-memory render.
pub fn check(source: &Path, config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let nodes = run_node_phase(source, config)?;
    let page_set = run_page_phase(&nodes, config)?;

    let rendered = render::render_pages(&page_set, &nodes, &config.site)?;
    let pages = rendered
        .iter()
        .map(|p| WrittenPage {
            route: p.route.clone(),
            file: render::route_to_file(Path::new(""), &p.route),
            layout: p.layout.clone(),
        })
        .collect();

    Ok(BuildReport {
        documents: nodes.len(),
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SLUG_FIELD;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn node_phase_attaches_front_matter_and_slug() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "posts/a.md",
            "---\ntitle: First\ndate: 2018-06-01\n---\nBody.",
        );

        let nodes = run_node_phase(tmp.path(), &SiteConfig::default()).unwrap();
        assert_eq!(nodes.len(), 1);

        let node = nodes.iter().next().unwrap();
        assert_eq!(node.field("title"), Some(&json!("First")));
        assert_eq!(node.field(SLUG_FIELD), Some(&json!("/blog/posts/a/")));
        assert_eq!(node.body(), "Body.");
    }

    #[test]
    fn page_phase_runs_only_on_derived_nodes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "posts/a.md", "A.");
        write(tmp.path(), "posts/b.md", "B.");

        let config = SiteConfig::default();
        let nodes = run_node_phase(tmp.path(), &config).unwrap();
        let pages = run_page_phase(&nodes, &config).unwrap();

        // two posts plus the root index
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.get("/").unwrap().layout(), "landing-page");
        assert_eq!(pages.get("/blog/posts/a/").unwrap().layout(), "index");
    }

    #[test]
    fn check_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "posts/a.md", "A.");

        let report = check(tmp.path(), &SiteConfig::default()).unwrap();
        assert_eq!(report.pages.len(), 2);

        // nothing but the content we wrote exists under the temp root
        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
