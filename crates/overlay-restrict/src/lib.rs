//! Access restrictions for overlay queries.
//!
//! A [`RestrictionChain`] is an ordered list of [`Restriction`]s. Each one
//! adds conditions to a select on behalf of the current principal; none can
//! remove conditions, so applying a chain only ever narrows a result set.
//!
//! Because an overlay query is a union of fragments, a restriction is
//! applied once per fragment and reads columns through the
//! [`Fragment`](overlay_query::Fragment) it is given rather than naming table
//! aliases itself.
//!
//! # Quick Start
//!
//! ```rust
//! use overlay_query::{Expr, Fragment, Select};
//! use overlay_restrict::{NameFilterRestriction, RestrictionChain};
//! use overlay_types::Principal;
//!
//! let principal = Principal::new("alice").with_restriction("director/host/filter-by-name", "web*");
//! let mut chain = RestrictionChain::new();
//! chain.push(Box::new(NameFilterRestriction::new(&principal, "host")));
//!
//! let mut select = Select::from_table("icinga_host", "o").column("id", Expr::col("o", "id"));
//! chain.apply(&mut select, Fragment::Base);
//! assert_eq!(select.filters.len(), 1);
//! ```

pub mod chain;
pub mod error;
pub mod provider;
pub mod restriction;
pub mod restrictions;

pub use chain::RestrictionChain;
pub use error::{RestrictError, RestrictResult};
pub use provider::{DefaultRestrictionProvider, RestrictionProvider};
pub use restriction::Restriction;
pub use restrictions::hostgroup::{HostgroupRestriction, HOSTGROUP_PERMISSION};
pub use restrictions::name_filter::NameFilterRestriction;
