//! Category metadata: which tables back each object category.

use std::collections::BTreeMap;

/// Table layout of one object category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryMeta {
    /// Category name as requested by callers.
    pub name: String,
    /// Short type used in table, column and permission names.
    pub short_type: String,
    /// Canonical (base) table.
    pub table: String,
}

impl CategoryMeta {
    pub fn new(short_type: &str) -> Self {
        Self {
            name: short_type.to_string(),
            short_type: short_type.to_string(),
            table: format!("icinga_{short_type}"),
        }
    }

    /// Table holding branch deltas for this category.
    pub fn branch_table(&self) -> String {
        format!("branched_{}", self.table)
    }

    /// Table mapping objects to the templates they import.
    pub fn inheritance_table(&self) -> String {
        format!("{}_inheritance", self.table)
    }

    /// Child column of the inheritance table.
    pub fn child_column(&self) -> String {
        format!("{}_id", self.short_type)
    }

    /// Parent column of the inheritance table.
    pub fn parent_column(&self) -> String {
        format!("parent_{}_id", self.short_type)
    }

    /// Default link path segment, e.g. `scheduled-downtime`.
    pub fn url_segment(&self) -> String {
        self.short_type.replace('_', "-")
    }
}

/// Source of category metadata.
pub trait MetadataRegistry: Send + Sync {
    fn lookup(&self, category: &str) -> Option<CategoryMeta>;

    /// Known category names, sorted.
    fn categories(&self) -> Vec<String>;
}

/// Built-in categories.
pub const KNOWN_CATEGORIES: [&str; 14] = [
    "host",
    "service",
    "command",
    "user",
    "notification",
    "timeperiod",
    "endpoint",
    "zone",
    "hostgroup",
    "servicegroup",
    "usergroup",
    "dependency",
    "scheduled_downtime",
    "service_set",
];

/// A fixed table of categories.
#[derive(Clone, Debug)]
pub struct StaticMetadata {
    categories: BTreeMap<String, CategoryMeta>,
}

impl StaticMetadata {
    /// A registry with no categories.
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, meta: CategoryMeta) {
        self.categories.insert(meta.name.clone(), meta);
    }
}

impl Default for StaticMetadata {
    fn default() -> Self {
        let mut registry = Self::empty();
        for short in KNOWN_CATEGORIES {
            registry.register(CategoryMeta::new(short));
        }
        registry
    }
}

impl MetadataRegistry for StaticMetadata {
    fn lookup(&self, category: &str) -> Option<CategoryMeta> {
        self.categories.get(&category.to_ascii_lowercase()).cloned()
    }

    fn categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_derive_from_short_type() {
        let meta = CategoryMeta::new("host");
        assert_eq!(meta.table, "icinga_host");
        assert_eq!(meta.branch_table(), "branched_icinga_host");
        assert_eq!(meta.inheritance_table(), "icinga_host_inheritance");
        assert_eq!(meta.child_column(), "host_id");
        assert_eq!(meta.parent_column(), "parent_host_id");
    }

    #[test]
    fn url_segment_uses_dashes() {
        assert_eq!(CategoryMeta::new("scheduled_downtime").url_segment(), "scheduled-downtime");
    }

    #[test]
    fn static_registry_knows_builtin_categories() {
        let registry = StaticMetadata::default();
        assert_eq!(registry.categories().len(), KNOWN_CATEGORIES.len());
        assert!(registry.lookup("service_set").is_some());
        assert!(registry.lookup("Host").is_some());
        assert!(registry.lookup("spaceship").is_none());
    }
}
