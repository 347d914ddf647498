//! The objects resolver: one category, one principal.

use std::sync::{Arc, OnceLock};

use overlay_query::{render, render_inline, Query, RenderedSql, SqlDialect};
use overlay_restrict::{Restriction, RestrictionChain, RestrictionProvider};
use overlay_store::Store;
use overlay_types::{BranchId, ObjectId, ObjectType, Principal, Row};
use tracing::debug;

use crate::config::ResolverConfig;
use crate::error::{ResolverError, ResolverResult};
use crate::inheritance::{self, TemplateFilter};
use crate::metadata::CategoryMeta;
use crate::overlay::{self, QueryPlan};
use crate::presenter::{Presenter, RenderedRow};
use crate::schema::{CategorySchema, ColumnDef};
use crate::specialization::{Header, Specialization};

/// Parameters of one listing request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub category: String,
    pub branch: Option<BranchId>,
    pub template: Option<TemplateFilter>,
    pub search: Option<String>,
    /// Display columns to fetch besides the mandatory ones. `None` fetches
    /// every column of the category.
    pub columns: Option<Vec<String>>,
}

impl QuerySpec {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Default::default()
        }
    }

    pub fn with_branch(mut self, branch: BranchId) -> Self {
        self.branch = Some(branch);
        self
    }

    pub fn with_template(mut self, template: TemplateFilter) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Builds and runs effective-object listings for one category.
///
/// A resolver is scoped to a single principal: the restriction chain is
/// built on first use and cached, and changing the principal discards it.
/// The store is borrowed per call and never kept.
pub struct ObjectsResolver {
    meta: CategoryMeta,
    schema: CategorySchema,
    specialization: Arc<dyn Specialization>,
    config: ResolverConfig,
    provider: Arc<dyn RestrictionProvider>,
    object_type: ObjectType,
    principal: Option<Principal>,
    base_url: String,
    added: Vec<Arc<dyn Restriction>>,
    chain: OnceLock<RestrictionChain>,
}

impl ObjectsResolver {
    pub fn new(
        meta: CategoryMeta,
        specialization: Arc<dyn Specialization>,
        provider: Arc<dyn RestrictionProvider>,
        config: ResolverConfig,
    ) -> Self {
        let schema = specialization.schema(&meta.name);
        let base_url = meta.url_segment();
        Self {
            meta,
            schema,
            specialization,
            config,
            provider,
            object_type: ObjectType::Object,
            principal: None,
            base_url,
            added: Vec::new(),
            chain: OnceLock::new(),
        }
    }

    pub fn meta(&self) -> &CategoryMeta {
        &self.meta
    }

    pub fn schema(&self) -> &CategorySchema {
        &self.schema
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// List objects of another type, e.g. templates.
    pub fn filter_object_type(&mut self, object_type: ObjectType) -> &mut Self {
        self.object_type = object_type;
        self
    }

    /// Set the caller. Discards a restriction chain built for a previous one.
    pub fn set_principal(&mut self, principal: Principal) -> &mut Self {
        self.principal = Some(principal);
        self.chain = OnceLock::new();
        self
    }

    /// Add a restriction on top of the provider's. It can only narrow the
    /// listing; a provider rule of the same name stays in force.
    pub fn add_restriction(&mut self, restriction: Arc<dyn Restriction>) -> &mut Self {
        if let Some(chain) = self.chain.get_mut() {
            chain.push(Box::new(Arc::clone(&restriction)));
        }
        self.added.push(restriction);
        self
    }

    /// Path segment of object links, below the configured URL prefix.
    pub fn set_base_object_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.base_url = url.into();
        self
    }

    /// The restriction chain, built on first use.
    pub fn restrictions(&self, store: &dyn Store) -> ResolverResult<&RestrictionChain> {
        if let Some(chain) = self.chain.get() {
            return Ok(chain);
        }
        let mut chain =
            self.provider
                .restrictions(store, self.principal.as_ref(), &self.meta.short_type)?;
        for restriction in &self.added {
            chain.push(Box::new(Arc::clone(restriction)));
        }
        debug!(category = %self.meta.name, restrictions = ?chain.names(), "restriction chain cached");
        Ok(self.chain.get_or_init(|| chain))
    }

    /// Build the listing query for `spec`.
    pub fn build_query(&self, store: &dyn Store, spec: &QuerySpec) -> ResolverResult<Query> {
        if spec.category != self.meta.name {
            return Err(ResolverError::CategoryMismatch {
                expected: self.meta.name.clone(),
                actual: spec.category.clone(),
            });
        }
        let schema = match &spec.columns {
            Some(columns) => self.schema.subset(columns)?,
            None => self.schema.clone(),
        };
        let restrictions = self.restrictions(store)?;
        let template = spec
            .template
            .map(|t| t.resolve(store, &self.meta))
            .transpose()?;

        let search_columns: Vec<ColumnDef> = self.schema.search_columns().cloned().collect();
        let plan = QueryPlan {
            meta: &self.meta,
            schema: &schema,
            search_columns: &search_columns,
            object_type: self.object_type,
            restrictions,
            template: template.as_ref(),
            search: spec.search.as_deref(),
            case_insensitive: self.config.case_insensitive_search,
        };
        let query = match spec.branch {
            None => overlay::resolve_base(&plan),
            Some(branch) => overlay::resolve_overlay(&plan, branch),
        };
        query.validate()?;
        Ok(query)
    }

    /// Rows of the effective listing.
    pub fn fetch(&self, store: &dyn Store, spec: &QuerySpec) -> ResolverResult<Vec<Row>> {
        let query = self.build_query(store, spec)?;
        let rows = store.execute(&query)?;
        debug!(category = %self.meta.name, rows = rows.len(), "listing fetched");
        Ok(rows)
    }

    /// Fetch and present the listing.
    pub fn render(&self, store: &dyn Store, spec: &QuerySpec) -> ResolverResult<Vec<RenderedRow>> {
        let rows = self.fetch(store, spec)?;
        let presenter = self.presenter(spec)?;
        Ok(rows.iter().map(|row| presenter.present(row)).collect())
    }

    /// Presenter matching the columns `spec` fetches.
    pub fn presenter(&self, spec: &QuerySpec) -> ResolverResult<Presenter<'_>> {
        let projected = match &spec.columns {
            Some(columns) => self.schema.subset(columns)?.aliases(),
            None => self.schema.aliases(),
        };
        Ok(Presenter::new(
            self.specialization.as_ref(),
            &self.config,
            &self.base_url,
            &projected,
        ))
    }

    /// Displayed column headers for `spec`.
    pub fn headers(&self, spec: &QuerySpec) -> ResolverResult<Vec<Header>> {
        Ok(self.presenter(spec)?.headers().to_vec())
    }

    /// The listing query as parameterized SQL for `dialect`.
    pub fn sql(
        &self,
        store: &dyn Store,
        spec: &QuerySpec,
        dialect: SqlDialect,
    ) -> ResolverResult<RenderedSql> {
        Ok(render(&self.build_query(store, spec)?, dialect)?)
    }

    /// The listing query with literals inlined, for diagnostics.
    pub fn sql_inline(
        &self,
        store: &dyn Store,
        spec: &QuerySpec,
        dialect: SqlDialect,
    ) -> ResolverResult<String> {
        Ok(render_inline(&self.build_query(store, spec)?, dialect)?)
    }

    /// Resolve a template of this category by name.
    pub fn find_template(&self, store: &dyn Store, name: &str) -> ResolverResult<Option<ObjectId>> {
        inheritance::find_template(store, &self.meta, name)
    }
}

impl std::fmt::Debug for ObjectsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectsResolver")
            .field("category", &self.meta.name)
            .field("object_type", &self.object_type)
            .field("principal", &self.principal.as_ref().map(|p| &p.name))
            .field("chain_built", &self.chain.get().is_some())
            .finish()
    }
}
