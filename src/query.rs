//! Query boundary between the node phase and the page phase.
//!
//! The pipeline never walks the node set directly when building pages; it
//! issues a [`Query`] against a [`QueryEngine`] and consumes the resulting
//! rows. The shipped engine is in-memory over the frozen [`NodeSet`], but the
//! trait keeps the boundary explicit: a row is a bag of fields, not a node
//! reference.
//!
//! Rows carry the node's own fields plus computed aggregates the node does
//! not store: an `excerpt` of the body and an estimated
//! `read_time_minutes`. A field the node already carries is never
//! overwritten by an aggregate.

use crate::fields::SLUG_FIELD;
use crate::node::NodeSet;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Computed aggregate: first body paragraph, truncated.
pub const EXCERPT_FIELD: &str = "excerpt";
/// Computed aggregate: estimated reading time, minimum 1.
pub const READ_TIME_FIELD: &str = "read_time_minutes";

const EXCERPT_MAX_CHARS: usize = 140;
const WORDS_PER_MINUTE: u64 = 200;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("query engine failure: {0}")]
    Engine(String),
}

/// Declarative selection over the node set: nodes of one kind that carry a
/// `slug` field, optionally sorted.
#[derive(Debug, Clone)]
pub struct Query {
    pub kind: String,
    pub sort: Option<Sort>,
}

#[derive(Debug, Clone)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

/// One query result: the originating node's identity plus its fields and
/// computed aggregates.
#[derive(Debug, Clone)]
pub struct Row {
    node_id: String,
    fields: BTreeMap<String, Value>,
}

impl Row {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

pub trait QueryEngine {
    fn execute(&self, query: &Query) -> Result<Vec<Row>, QueryError>;
}

/// Engine over an already-derived node set.
pub struct InMemoryEngine<'a> {
    nodes: &'a NodeSet,
}

impl<'a> InMemoryEngine<'a> {
    pub fn new(nodes: &'a NodeSet) -> Self {
        Self { nodes }
    }
}

impl QueryEngine for InMemoryEngine<'_> {
    fn execute(&self, query: &Query) -> Result<Vec<Row>, QueryError> {
        let mut rows: Vec<Row> = self
            .nodes
            .iter()
            .filter(|n| n.kind() == query.kind && n.field(SLUG_FIELD).is_some())
            .map(|node| {
                let mut fields = node.fields().clone();
                fields
                    .entry(EXCERPT_FIELD.to_string())
                    .or_insert_with(|| Value::String(excerpt(node.body())));
                fields
                    .entry(READ_TIME_FIELD.to_string())
                    .or_insert_with(|| Value::from(read_time_minutes(node.body())));
                Row {
                    node_id: node.id().to_string(),
                    fields,
                }
            })
            .collect();

        if let Some(sort) = &query.sort {
            sort_rows(&mut rows, sort);
        }
        Ok(rows)
    }
}

/// Sort rows by the requested field. Rows missing the field order after rows
/// that have it regardless of direction; ties break on slug so the result is
/// deterministic for identical inputs.
fn sort_rows(rows: &mut [Row], sort: &Sort) {
    rows.sort_by(|a, b| {
        let ord = match (a.field(&sort.field), b.field(&sort.field)) {
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                if sort.descending { ord.reverse() } else { ord }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        ord.then_with(|| slug_of(a).cmp(slug_of(b)))
    });
}

fn slug_of(row: &Row) -> &str {
    row.field(SLUG_FIELD).and_then(Value::as_str).unwrap_or("")
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// First non-heading, non-empty body line, truncated at a char boundary.
fn excerpt(body: &str) -> String {
    let line = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or("");
    if line.chars().count() <= EXCERPT_MAX_CHARS {
        line.to_string()
    } else {
        let mut cut: String = line.chars().take(EXCERPT_MAX_CHARS).collect();
        cut.push('…');
        cut
    }
}

fn read_time_minutes(body: &str) -> u64 {
    let words = body.split_whitespace().count() as u64;
    (words.div_ceil(WORDS_PER_MINUTE)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ContentNode, NodeSet};
    use crate::scan::DOCUMENT_KIND;
    use serde_json::json;

    fn doc(id: &str, slug: Option<&str>, date: Option<&str>, body: &str) -> ContentNode {
        let mut node = ContentNode::new(id, DOCUMENT_KIND, body);
        if let Some(slug) = slug {
            node.attach_field(SLUG_FIELD, json!(slug)).unwrap();
        }
        if let Some(date) = date {
            node.attach_field("date", json!(date)).unwrap();
        }
        node
    }

    fn date_query() -> Query {
        Query {
            kind: DOCUMENT_KIND.to_string(),
            sort: Some(Sort {
                field: "date".to_string(),
                descending: true,
            }),
        }
    }

    #[test]
    fn selects_only_documents_with_slug() {
        let mut nodes = NodeSet::default();
        nodes.insert(doc("a.md", Some("/a/"), None, ""));
        nodes.insert(doc("b.md", None, None, "")); // no slug → not routable
        nodes.insert(ContentNode::new("data.json", "data", "{}"));

        let rows = InMemoryEngine::new(&nodes).execute(&date_query()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].node_id(), "a.md");
    }

    #[test]
    fn sorts_by_date_descending() {
        let mut nodes = NodeSet::default();
        nodes.insert(doc("a.md", Some("/a/"), Some("2018-01-01"), ""));
        nodes.insert(doc("b.md", Some("/b/"), Some("2018-06-01"), ""));
        nodes.insert(doc("c.md", Some("/c/"), Some("2017-12-31"), ""));

        let rows = InMemoryEngine::new(&nodes).execute(&date_query()).unwrap();
        let slugs: Vec<&str> = rows.iter().map(slug_of).collect();
        assert_eq!(slugs, vec!["/b/", "/a/", "/c/"]);
    }

    #[test]
    fn missing_sort_field_orders_last() {
        let mut nodes = NodeSet::default();
        nodes.insert(doc("a.md", Some("/a/"), None, ""));
        nodes.insert(doc("b.md", Some("/b/"), Some("2018-06-01"), ""));

        let rows = InMemoryEngine::new(&nodes).execute(&date_query()).unwrap();
        let slugs: Vec<&str> = rows.iter().map(slug_of).collect();
        assert_eq!(slugs, vec!["/b/", "/a/"]);
    }

    #[test]
    fn equal_dates_tie_break_on_slug() {
        let mut nodes = NodeSet::default();
        nodes.insert(doc("b.md", Some("/b/"), Some("2018-06-01"), ""));
        nodes.insert(doc("a.md", Some("/a/"), Some("2018-06-01"), ""));

        let rows = InMemoryEngine::new(&nodes).execute(&date_query()).unwrap();
        let slugs: Vec<&str> = rows.iter().map(slug_of).collect();
        assert_eq!(slugs, vec!["/a/", "/b/"]);
    }

    #[test]
    fn rows_carry_computed_aggregates() {
        let mut nodes = NodeSet::default();
        nodes.insert(doc(
            "a.md",
            Some("/a/"),
            None,
            "# Heading\n\nFirst real paragraph.\n\nMore text.",
        ));

        let rows = InMemoryEngine::new(&nodes).execute(&date_query()).unwrap();
        assert_eq!(rows[0].field(EXCERPT_FIELD), Some(&json!("First real paragraph.")));
        assert_eq!(rows[0].field(READ_TIME_FIELD), Some(&json!(1)));
    }

    #[test]
    fn aggregate_never_overwrites_node_field() {
        let mut nodes = NodeSet::default();
        let mut node = doc("a.md", Some("/a/"), None, "body text");
        node.attach_field(EXCERPT_FIELD, json!("hand-written summary")).unwrap();
        nodes.insert(node);

        let rows = InMemoryEngine::new(&nodes).execute(&date_query()).unwrap();
        assert_eq!(rows[0].field(EXCERPT_FIELD), Some(&json!("hand-written summary")));
    }

    #[test]
    fn excerpt_truncates_long_lines() {
        let line = "word ".repeat(60);
        let result = excerpt(&line);
        assert!(result.chars().count() <= EXCERPT_MAX_CHARS + 1);
        assert!(result.ends_with('…'));
    }

    #[test]
    fn read_time_has_floor_of_one() {
        assert_eq!(read_time_minutes(""), 1);
        assert_eq!(read_time_minutes("a few words"), 1);
        let long = "word ".repeat(450);
        assert_eq!(read_time_minutes(&long), 3);
    }
}
