//! # pagemill
//!
//! A minimal static blog build pipeline. Your filesystem is the data source:
//! markdown files become content nodes, nodes gain derived fields, and a
//! declarative query over those nodes materializes the routable page set.
//!
//! # Architecture: Two-Phase Pipeline
//!
//! Every build is one deterministic transform from a content node set to a
//! page set, split into two sequential phases:
//!
//! ```text
//! node phase   content/ → nodes → derived fields      (barrier)
//! page phase   query → pages → layouts → HTML → dist/
//! ```
//!
//! The node phase is a barrier: no query runs before every node carries its
//! derived fields. The page phase then treats the node set as frozen — pages
//! are materialized from query rows, layout overrides are a mutation pass
//! over the finished page set (never a second round of page creation), and
//! artifacts are written only after every page rendered.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | content discovery — walks the content root, splits off front matter |
//! | [`node`] | content node arena with add-only field attachment |
//! | [`fields`] | field derivation — computes the canonical route slug per node |
//! | [`query`] | query boundary — selection, sorting, computed aggregates |
//! | [`pages`] | page materialization — query rows to unique-route page descriptors |
//! | [`layout`] | layout resolution — the root-route landing override |
//! | [`render`] | template registry, maud HTML, artifact writing |
//! | [`pipeline`] | build driver — ordered phases, build-fatal error handling |
//! | [`config`] | `config.toml` loading, validation, stock config |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Phases Over Lifecycle Hooks
//!
//! Build systems in this space often expose named lifecycle callbacks
//! (on-node-created, on-page-created) discovered at runtime. pagemill
//! replaces that with an explicit ordered pipeline of typed functions called
//! directly by [`pipeline::build`]. Same extension points, but the order is
//! in the code, not in a registry, and the layout-override hook structurally
//! cannot re-enter page creation.
//!
//! ## Errors Are Build-Fatal
//!
//! Content and configuration are static per build, so there is no transient
//! failure to retry. Every component error aborts the invocation, names the
//! failing node or page, and nothing is published — pages render to memory
//! before the first file is written.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system: malformed markup is a build error, template variables
//! are Rust expressions, and all interpolation is auto-escaped.

pub mod config;
pub mod fields;
pub mod layout;
pub mod node;
pub mod output;
pub mod pages;
pub mod pipeline;
pub mod query;
pub mod render;
pub mod scan;
