//! Foundation types for the object overlay resolver.
//!
//! This crate provides the identity, branch, and row types shared by every
//! other overlay crate. It has no knowledge of queries or stores.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Stable integer primary key of a base record
//! - [`BranchId`]: Opaque 16-byte token naming the active branch
//! - [`ObjectType`]: Category discriminator (`object`, `template`, ...)
//! - [`Flag`]: The `y`/`n` booleans used by `disabled` and `deleted`
//! - [`Value`] / [`Row`]: Dynamically typed column values and result rows
//! - [`Principal`]: The caller whose permissions scope every query

pub mod branch;
pub mod error;
pub mod object;
pub mod principal;
pub mod value;

pub use branch::BranchId;
pub use error::TypeError;
pub use object::{Flag, ObjectId, ObjectType};
pub use principal::Principal;
pub use value::{Row, Value};
