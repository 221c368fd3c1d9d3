//! Content node arena shared by both pipeline phases.
//!
//! Every discovered content item becomes a [`ContentNode`]: an immutable
//! identity (the source path as discovered), a kind tag, the raw body, and a
//! map of derived fields. Fields are add-only — attaching an equal value for
//! an existing key is a no-op, attaching a different value is a
//! [`FieldError::Conflict`]. That single rule makes field derivation
//! idempotent and makes silent re-derivation with a different result
//! impossible.
//!
//! Nodes live in a [`NodeSet`] arena and are addressed by their stable id.
//! "Get a related node" is always a lookup by id or by field value, never a
//! held reference, so the node set stays a plain owned collection with no
//! ownership cycles.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("node {node}: field `{field}` already holds a different value")]
    Conflict { node: String, field: String },
}

/// One discovered content item plus its derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct ContentNode {
    id: String,
    kind: String,
    body: String,
    fields: BTreeMap<String, Value>,
}

impl ContentNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            body: body.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Stable identity: the source path as discovered. Never changes.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Raw body with any front matter already stripped off.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Attach a derived field. Re-attaching an equal value is a no-op;
    /// a different value for an existing key is a conflict.
    pub fn attach_field(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        match self.fields.get(name) {
            Some(existing) if *existing == value => Ok(()),
            Some(_) => Err(FieldError::Conflict {
                node: self.id.clone(),
                field: name.to_string(),
            }),
            None => {
                self.fields.insert(name.to_string(), value);
                Ok(())
            }
        }
    }
}

/// Arena of content nodes, addressed by stable id.
#[derive(Debug, Default, Serialize)]
pub struct NodeSet {
    nodes: Vec<ContentNode>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl NodeSet {
    /// Insert a node. A rediscovered id replaces the earlier node — the
    /// provider visits each path once, so this only matters for callers
    /// constructing sets by hand.
    pub fn insert(&mut self, node: ContentNode) {
        if let Some(&slot) = self.index.get(node.id()) {
            self.nodes[slot] = node;
        } else {
            self.index.insert(node.id().to_string(), self.nodes.len());
            self.nodes.push(node);
        }
    }

    pub fn get(&self, id: &str) -> Option<&ContentNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentNode> {
        self.nodes.iter()
    }

    /// Mutable view for the field-derivation pass. Each derivation touches
    /// only its own node, so the slice can be split across threads.
    pub(crate) fn nodes_mut(&mut self) -> &mut [ContentNode] {
        &mut self.nodes
    }

    /// Look a node up by an exact field value (e.g. re-fetch by `slug`).
    pub fn find_by_field(&self, name: &str, value: &Value) -> Option<&ContentNode> {
        self.nodes.iter().find(|n| n.field(name) == Some(value))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
