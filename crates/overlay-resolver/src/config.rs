use std::path::Path;

use overlay_query::SqlDialect;
use serde::{Deserialize, Serialize};

use crate::error::ResolverResult;

/// Resolver settings shared by every table a factory creates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// SQL flavour used when rendering queries.
    pub dialect: SqlDialect,
    /// Prefix of object links, e.g. `director` in `director/host?name=web1`.
    pub url_prefix: String,
    /// Name of the endpoint configuration is deployed to, highlighted in
    /// endpoint listings.
    pub deployment_endpoint: Option<String>,
    /// Match search terms regardless of case.
    pub case_insensitive_search: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            dialect: SqlDialect::Postgres,
            url_prefix: "director".to_string(),
            deployment_endpoint: None,
            case_insensitive_search: true,
        }
    }
}

impl ResolverConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> ResolverResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ResolverResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
