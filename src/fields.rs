//! Field derivation — the node-phase hook that attaches a canonical route
//! slug to every document node.
//!
//! The slug is a pure function of (source path, content root, base route):
//! the path relative to the content root, with the file extension stripped,
//! joined onto the normalized base route, always starting and ending with
//! `/`. Two builds over identical inputs yield identical slugs.
//!
//! ```text
//! posts/a.md        + "/blog/"  →  /blog/posts/a/
//! posts/index.md    + "/blog/"  →  /blog/posts/      (index collapses)
//! about.md          + "/"       →  /about/
//! ```
//!
//! Derivation is per-node and independent across nodes, so the pass runs in
//! parallel. Re-deriving an already-derived node is a no-op; a derivation
//! that would change an existing field is a conflict (see [`crate::node`]).

use crate::node::{FieldError, NodeSet};
use crate::scan::DOCUMENT_KIND;
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Field name the deriver attaches and the page phase queries on.
pub const SLUG_FIELD: &str = "slug";

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("source path {path} is outside the content root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Attach the `slug` field to every document node.
///
/// This is the node-phase barrier: it returns only once every node has its
/// derived fields, so no query can observe a half-derived set.
pub fn derive_fields(
    nodes: &mut NodeSet,
    content_root: &Path,
    base_route: &str,
) -> Result<(), DeriveError> {
    nodes.nodes_mut().par_iter_mut().try_for_each(|node| {
        if node.kind() != DOCUMENT_KIND {
            return Ok(());
        }
        let path = Path::new(node.id());
        let relative = relativize(path, content_root)?;
        let slug = derive_slug(&relative, base_route);
        node.attach_field(SLUG_FIELD, Value::String(slug))?;
        Ok(())
    })
}

/// Make a source path relative to the content root, rejecting paths that
/// escape it (including `..` traversal).
fn relativize(path: &Path, content_root: &Path) -> Result<PathBuf, DeriveError> {
    let outside = || DeriveError::OutsideRoot {
        path: path.to_path_buf(),
        root: content_root.to_path_buf(),
    };
    let relative = path.strip_prefix(content_root).map_err(|_| outside())?;
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(outside());
    }
    Ok(relative.to_path_buf())
}

/// Compute the route slug for a root-relative source path.
///
/// The base route is normalized to start and end with `/` (`"blog"`,
/// `"/blog"` and `"/blog/"` are equivalent; empty means the site root).
/// A final `index` stem maps to its directory route.
pub fn derive_slug(relative: &Path, base_route: &str) -> String {
    let mut route = normalize_base(base_route);
    let count = relative.components().count();
    for (idx, component) in relative.components().enumerate() {
        let part = component.as_os_str().to_string_lossy();
        let part = if idx + 1 == count {
            let stem = Path::new(part.as_ref())
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if stem == "index" {
                continue;
            }
            stem
        } else {
            part.into_owned()
        };
        route.push_str(&part);
        route.push('/');
    }
    route
}

fn normalize_base(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
