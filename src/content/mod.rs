//! Static learning content
//!
//! Read-only catalog of modules, domains and nodes. The core never mutates
//! content; per-user state lives in [`crate::progress`].

pub mod catalog;
pub mod models;

pub use catalog::{Catalog, ContentError, ContentProvider, NodeLocation};
pub use models::*;
