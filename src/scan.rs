//! Content discovery — the source-provider boundary of the pipeline.
//!
//! Walks the content root and returns one [`ContentItem`] per markdown file,
//! in stable sorted order. The provider does not deduplicate and does not
//! interpret content beyond splitting off front matter; everything downstream
//! works on the returned items.
//!
//! ## Content layout
//!
//! ```text
//! content/                 # Content root
//! ├── config.toml          # Site configuration (optional, skipped by the walk)
//! ├── posts/
//! │   ├── first-post.md    # Document → route under the base route
//! │   └── second-post.md
//! └── notes/
//!     └── index.md         # `index` stem → directory route
//! ```
//!
//! Hidden files and directories (leading `.`) and non-markdown files are
//! skipped.
//!
//! ## Front matter
//!
//! A document may open with a `---` fenced block of `key: value` lines:
//!
//! ```text
//! ---
//! title: First Post
//! date: 2018-06-01
//! ---
//! Body starts here.
//! ```
//!
//! The block is parsed into initial node fields and stripped from the body.
//! An unterminated fence is not front matter — the whole file stays body.
//!
//! Front matter keys share the node's field namespace. `slug` is reserved
//! for route derivation: a document declaring its own `slug` fails the
//! build with a field conflict rather than silently winning.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Kind tag for markdown documents.
pub const DOCUMENT_KIND: &str = "document";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One raw content item as discovered: path, kind tag, raw body.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub path: PathBuf,
    pub kind: String,
    pub body: String,
}

/// Enumerate content items under the root in stable sorted order.
pub fn list_content_items(content_root: &Path) -> Result<Vec<ContentItem>, ScanError> {
    let mut items = Vec::new();
    // depth 0 is the root itself, which may legitimately be a dot-directory
    let walker = WalkDir::new(content_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !is_hidden(entry.file_name().to_string_lossy().as_ref())
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_document(entry.path()) {
            continue;
        }
        let body = fs::read_to_string(entry.path())?;
        items.push(ContentItem {
            path: entry.into_path(),
            kind: DOCUMENT_KIND.to_string(),
            body,
        });
    }
    Ok(items)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

/// Split a leading front matter block off a raw body.
///
/// Returns the parsed fields and the remaining body. Keys and values are
/// trimmed; lines without `key: value` shape inside the fence are ignored.
pub fn parse_front_matter(raw: &str) -> (BTreeMap<String, Value>, String) {
    let mut fields = BTreeMap::new();
    let mut lines = raw.lines();

    match lines.next() {
        Some(first) if first.trim() == "---" => {}
        _ => return (fields, raw.to_string()),
    }

    let mut block = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim() == "---" {
            closed = true;
            break;
        }
        block.push(line);
    }
    if !closed {
        return (fields, raw.to_string());
    }

    for line in block {
        if let Some((key, value)) = line.split_once(':') {
            let (key, value) = (key.trim(), value.trim());
            if !key.is_empty() && !value.is_empty() {
                fields.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    (fields, body)
}
