//! Site configuration module.
//!
//! Loads and validates `config.toml` from the content root. All fields have
//! defaults; user config files specify only the overrides they want. Unknown
//! keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_route = "/blog/"        # Route prefix for document slugs
//!
//! [site]
//! title = "pagemill"           # Site title shown in the default header
//! tagline = ""                 # Short tagline next to the title
//!
//! [templates]
//! document = "blog-post"       # Template bound to document pages
//! index = "post-index"         # Template bound to the root listing page
//!
//! [layouts]
//! default = "index"            # Layout wrapping every page
//! landing = "landing-page"     # Layout overriding the root route
//!
//! [query]
//! sort_field = "date"          # Front matter field the listing sorts by
//! ```

use crate::layout::LayoutRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Route prefix for document slugs (normalized to `/…/` at derivation).
    pub base_route: String,
    /// Title and tagline rendered by the layouts.
    pub site: SiteMeta,
    /// Template bound per node kind.
    pub templates: TemplatesConfig,
    /// Default layout and the landing override for the root route.
    pub layouts: LayoutsConfig,
    /// Query settings for the post listing.
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub tagline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Template reference for document pages.
    pub document: String,
    /// Template reference for the root listing page.
    pub index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutsConfig {
    pub default: String,
    pub landing: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub sort_field: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_route: "/blog/".to_string(),
            site: SiteMeta::default(),
            templates: TemplatesConfig::default(),
            layouts: LayoutsConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "pagemill".to_string(),
            tagline: String::new(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            document: "blog-post".to_string(),
            index: "post-index".to_string(),
        }
    }
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            default: "index".to_string(),
            landing: "landing-page".to_string(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            sort_field: "date".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_route.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "base_route must not contain whitespace".into(),
            ));
        }
        for (key, value) in [
            ("site.title", &self.site.title),
            ("templates.document", &self.templates.document),
            ("templates.index", &self.templates.index),
            ("layouts.default", &self.layouts.default),
            ("layouts.landing", &self.layouts.landing),
            ("query.sort_field", &self.query.sort_field),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    /// Layout rules for the page phase: the configured default plus the
    /// single root-route override.
    pub fn layout_rules(&self) -> LayoutRules {
        LayoutRules::with_landing(&self.layouts.default, &self.layouts.landing)
    }
}

/// Load `config.toml` from the content root, or defaults when absent.
pub fn load_config(content_root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = content_root.join("config.toml");
    let config = if path.exists() {
        toml::from_str(&fs::read_to_string(&path)?)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Stock `config.toml` with all options documented, for `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r#"# pagemill configuration
# All options are optional - defaults shown below.

# Route prefix for document slugs. "posts/a.md" with base_route "/blog/"
# becomes the route "/blog/posts/a/".
base_route = "/blog/"

[site]
title = "pagemill"           # Site title shown in the default header
tagline = ""                 # Short tagline next to the title

[templates]
document = "blog-post"       # Template bound to document pages
index = "post-index"         # Template bound to the root listing page

[layouts]
default = "index"            # Layout wrapping every page
landing = "landing-page"     # Layout overriding the root route "/"

[query]
sort_field = "date"          # Front matter field the listing sorts by
"#
}
