//! Per-category table specializations.
//!
//! A specialization contributes extra columns, column headers, a link label
//! and row classes. Categories without one use [`GenericTable`].

use std::collections::BTreeMap;
use std::sync::Arc;

use overlay_types::Row;

use crate::config::ResolverConfig;
use crate::schema::{CategorySchema, ColumnDef};

/// A displayed column: result alias plus the title shown above it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub alias: String,
    pub title: String,
}

impl Header {
    pub fn new(alias: &str, title: &str) -> Self {
        Self {
            alias: alias.to_string(),
            title: title.to_string(),
        }
    }
}

/// Category-specific presentation and columns.
pub trait Specialization: Send + Sync {
    /// Extra columns beyond the mandatory ones.
    fn columns(&self) -> Vec<ColumnDef> {
        Vec::new()
    }

    /// Displayed columns, the label column first.
    fn headers(&self) -> Vec<Header> {
        vec![Header::new("object_name", "Name")]
    }

    /// Text of the object link.
    fn label(&self, row: &Row) -> String {
        row.get("object_name").to_string()
    }

    /// Extra CSS-style classes for a row.
    fn row_classes(&self, _row: &Row, _config: &ResolverConfig) -> Vec<String> {
        Vec::new()
    }

    /// Full schema for `category`.
    fn schema(&self, category: &str) -> CategorySchema {
        self.columns()
            .into_iter()
            .fold(CategorySchema::new(category), CategorySchema::with)
    }
}

/// Fallback for categories without a specialization.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericTable;

impl Specialization for GenericTable {}

/// Hosts: display name and address.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostTable;

impl Specialization for HostTable {
    fn columns(&self) -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("display_name").searchable(),
            ColumnDef::new("address").searchable(),
        ]
    }

    fn headers(&self) -> Vec<Header> {
        vec![
            Header::new("object_name", "Hostname"),
            Header::new("address", "Address"),
        ]
    }
}

/// Commands: command line and execution method.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandTable;

impl Specialization for CommandTable {
    fn columns(&self) -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("command").searchable(),
            ColumnDef::new("methods_execute"),
        ]
    }

    fn headers(&self) -> Vec<Header> {
        vec![
            Header::new("object_name", "Command"),
            Header::new("command", "Command line"),
        ]
    }
}

/// Endpoints: host and port; the deployment endpoint is highlighted.
#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointTable;

impl Specialization for EndpointTable {
    fn columns(&self) -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("host").searchable(),
            ColumnDef::new("port"),
        ]
    }

    fn headers(&self) -> Vec<Header> {
        vec![
            Header::new("object_name", "Endpoint"),
            Header::new("host", "Host"),
            Header::new("port", "Port"),
        ]
    }

    fn row_classes(&self, row: &Row, config: &ResolverConfig) -> Vec<String> {
        match (&config.deployment_endpoint, row.get_str("object_name")) {
            (Some(endpoint), Some(name)) if endpoint == name => {
                vec!["deployment-endpoint".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

/// Category name to specialization.
#[derive(Clone, Default)]
pub struct SpecializationRegistry {
    entries: BTreeMap<String, Arc<dyn Specialization>>,
}

impl SpecializationRegistry {
    /// Registry with the host, command and endpoint specializations.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register("host", Arc::new(HostTable));
        registry.register("command", Arc::new(CommandTable));
        registry.register("endpoint", Arc::new(EndpointTable));
        registry
    }

    pub fn register(&mut self, category: &str, specialization: Arc<dyn Specialization>) {
        self.entries.insert(category.to_string(), specialization);
    }

    pub fn get(&self, category: &str) -> Option<Arc<dyn Specialization>> {
        self.entries.get(category).cloned()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }
}

impl std::fmt::Debug for SpecializationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecializationRegistry")
            .field("categories", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
