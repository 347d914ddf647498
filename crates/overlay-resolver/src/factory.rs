use std::sync::Arc;

use overlay_restrict::{DefaultRestrictionProvider, RestrictionProvider};
use overlay_store::Store;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::error::{ResolverError, ResolverResult};
use crate::metadata::{MetadataRegistry, StaticMetadata};
use crate::resolver::ObjectsResolver;
use crate::specialization::{GenericTable, SpecializationRegistry};

/// Creates resolvers by category name.
///
/// Metadata decides whether a category exists at all; the specialization
/// registry only refines how it is listed.
pub struct TableFactory {
    metadata: Arc<dyn MetadataRegistry>,
    specializations: SpecializationRegistry,
    provider: Arc<dyn RestrictionProvider>,
    config: ResolverConfig,
}

impl TableFactory {
    /// Factory over the built-in categories and specializations.
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            metadata: Arc::new(StaticMetadata::default()),
            specializations: SpecializationRegistry::builtin(),
            provider: Arc::new(DefaultRestrictionProvider),
            config,
        }
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataRegistry>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_specializations(mut self, specializations: SpecializationRegistry) -> Self {
        self.specializations = specializations;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn RestrictionProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Known categories and whether each has a specialization.
    pub fn categories(&self) -> Vec<(String, bool)> {
        self.metadata
            .categories()
            .into_iter()
            .map(|c| {
                let specialized = self.specializations.contains(&c);
                (c, specialized)
            })
            .collect()
    }

    /// A resolver for `category`.
    ///
    /// Fails with [`ResolverError::UnknownCategory`] when no metadata exists.
    /// A category without a specialization gets the generic table.
    pub fn create(&self, category: &str, store: &dyn Store) -> ResolverResult<ObjectsResolver> {
        let meta = self
            .metadata
            .lookup(category)
            .ok_or_else(|| ResolverError::UnknownCategory(category.to_string()))?;
        let specialization = match self.specializations.get(&meta.name) {
            Some(s) => s,
            None => {
                debug!(category = %meta.name, "no specialization registered, using generic table");
                Arc::new(GenericTable)
            }
        };
        debug!(
            category = %meta.name,
            table = %meta.table,
            dialect = %store.dialect(),
            "resolver created"
        );
        Ok(ObjectsResolver::new(
            meta,
            specialization,
            Arc::clone(&self.provider),
            self.config.clone(),
        ))
    }
}

impl Default for TableFactory {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
