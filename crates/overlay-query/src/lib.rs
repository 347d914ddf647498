//! Query construction for the object overlay resolver.
//!
//! Queries are built as a small relational AST rather than as SQL strings.
//! The same AST is rendered to SQL for a real database and evaluated
//! directly by the in-memory store, so both paths see identical plans.
//!
//! # Modules
//!
//! - [`ast`]: [`Select`], [`Query`], [`Expr`], [`Predicate`], joins and sources
//! - [`fragment`]: [`Fragment`]: how a logical column is read in each part of an overlay query
//! - [`render`]: SQL text generation per [`SqlDialect`]
//! - [`error`]: [`QueryError`]

pub mod ast;
pub mod error;
pub mod fragment;
pub mod render;

pub use ast::{
    escape_like, ColumnRef, Expr, Join, JoinKind, OrderBy, Predicate, Projection, Query, Select,
    Source, TableRef,
};
pub use error::{QueryError, QueryResult};
pub use fragment::{Fragment, BASE_ALIAS, DELTA_ALIAS, IDENTITY_COLUMN, UNION_ALIAS};
pub use render::{render, render_inline, RenderedSql, SqlDialect};
