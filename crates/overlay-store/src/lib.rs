//! Row storage for the object overlay resolver.
//!
//! The resolver never talks to a database directly. It builds a
//! [`Query`](overlay_query::Query) and hands it to a [`Store`], which either
//! renders it for a real database connection or, as [`InMemoryStore`] does,
//! evaluates it against tables held in memory.
//!
//! # Storage Backends
//!
//! All backends implement the [`Store`] trait:
//!
//! - [`InMemoryStore`] -- `BTreeMap`-of-tables store for tests, fixtures and embedding
//!
//! # Evaluation Rules
//!
//! 1. Predicates follow SQL three-valued logic; only TRUE keeps a row.
//! 2. NULL sorts before every other value.
//! 3. Sorting is stable, so ties keep production order.
//! 4. `UNION` removes duplicate rows, keeping the first occurrence.
//! 5. Unqualified column names must resolve to exactly one source in scope.

pub mod error;
pub mod eval;
pub mod memory;
pub mod table;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use eval::Evaluator;
pub use memory::InMemoryStore;
pub use table::Table;
pub use traits::Store;
