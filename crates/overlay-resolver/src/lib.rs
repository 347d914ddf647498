//! Branch-aware object overlay resolver.
//!
//! Computes the effective list of configuration objects a principal sees:
//! the canonical base rows, overlaid with the uncommitted deltas of an
//! optional branch, narrowed by access restrictions, object type, template
//! inheritance and search, sorted by name and cut to one page.
//!
//! # Quick Start
//!
//! ```rust
//! use overlay_resolver::{QuerySpec, TableFactory};
//! use overlay_store::InMemoryStore;
//! use overlay_types::{Principal, Row};
//!
//! let store = InMemoryStore::default();
//! store.create_table("icinga_zone", ["id", "object_name", "object_type", "disabled"]).unwrap();
//! store.insert("icinga_zone", Row::new()
//!     .with("id", 1)
//!     .with("object_name", "master")
//!     .with("object_type", "object")
//!     .with("disabled", "n")).unwrap();
//!
//! let mut zones = TableFactory::default().create("zone", &store).unwrap();
//! zones.set_principal(Principal::new("admin"));
//! let rows = zones.render(&store, &QuerySpec::new("zone")).unwrap();
//! assert_eq!(rows[0].label, "master");
//! assert_eq!(rows[0].link.to_string(), "director/zone?name=master");
//! ```
//!
//! # Modules
//!
//! - [`metadata`] -- category to table mapping
//! - [`schema`] -- projected, searchable and overlay-eligible columns
//! - [`inheritance`] -- template filters and the template tree
//! - [`overlay`] -- the base and branch overlay query builders
//! - [`resolver`] -- [`ObjectsResolver`] and [`QuerySpec`]
//! - [`presenter`] -- rows to [`RenderedRow`]s
//! - [`specialization`] -- per-category columns and presentation
//! - [`factory`] -- [`TableFactory`]

pub mod config;
pub mod error;
pub mod factory;
pub mod inheritance;
pub mod metadata;
pub mod overlay;
pub mod presenter;
pub mod resolver;
pub mod schema;
pub mod specialization;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod properties;

pub use config::ResolverConfig;
pub use error::{ResolverError, ResolverResult};
pub use factory::TableFactory;
pub use inheritance::{find_template, Inheritance, TemplateFilter, TemplateScope, TemplateTree};
pub use metadata::{CategoryMeta, MetadataRegistry, StaticMetadata, KNOWN_CATEGORIES};
pub use overlay::{resolve_base, resolve_overlay, union, QueryPlan, PAGE_SIZE, SORT_KEY};
pub use presenter::{Link, Presenter, RenderedRow};
pub use resolver::{ObjectsResolver, QuerySpec};
pub use schema::{CategorySchema, ColumnDef, MANDATORY_COLUMNS};
pub use specialization::{
    CommandTable, EndpointTable, GenericTable, Header, HostTable, Specialization,
    SpecializationRegistry,
};
