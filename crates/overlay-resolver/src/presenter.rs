//! Turning result rows into renderable records.

use std::fmt;

use overlay_types::{Flag, Row, Value};
use url::form_urlencoded;

use crate::config::ResolverConfig;
use crate::specialization::{Header, Specialization};

/// Link to an object's detail view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if self.params.is_empty() {
            return Ok(());
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.params)
            .finish();
        write!(f, "?{query}")
    }
}

/// One listing row, ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedRow {
    pub label: String,
    pub link: Link,
    /// Displayed columns after the label, as `(alias, value)`.
    pub columns: Vec<(String, Value)>,
    pub disabled: bool,
    pub classes: Vec<String>,
}

/// Renders rows for one category. Never queries, never filters.
pub struct Presenter<'a> {
    specialization: &'a dyn Specialization,
    config: &'a ResolverConfig,
    base_url: &'a str,
    headers: Vec<Header>,
}

impl<'a> Presenter<'a> {
    /// `projected` lists the aliases actually fetched; headers for columns
    /// outside it are dropped.
    pub fn new(
        specialization: &'a dyn Specialization,
        config: &'a ResolverConfig,
        base_url: &'a str,
        projected: &[String],
    ) -> Self {
        let headers = specialization
            .headers()
            .into_iter()
            .filter(|h| projected.contains(&h.alias))
            .collect();
        Self {
            specialization,
            config,
            base_url,
            headers,
        }
    }

    /// Headers of the displayed columns, label column included.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn present(&self, row: &Row) -> RenderedRow {
        let disabled = row.get_str("disabled") == Some(Flag::Yes.as_str());
        let mut classes = Vec::new();
        if disabled {
            classes.push("disabled".to_string());
        }
        classes.extend(self.specialization.row_classes(row, self.config));

        RenderedRow {
            label: self.specialization.label(row),
            link: Link {
                path: format!("{}/{}", self.config.url_prefix, self.base_url),
                params: vec![("name".to_string(), row.get("object_name").to_string())],
            },
            columns: self
                .headers
                .iter()
                .filter(|h| h.alias != "object_name")
                .map(|h| (h.alias.clone(), row.get(&h.alias).clone()))
                .collect(),
            disabled,
            classes,
        }
    }
}
