//! Core domain types for the Campus school-administration backend.
//!
//! This crate holds the types that cross the boundary between the
//! request-handling layer and the cache subsystem:
//!
//! - [`ClassSnapshot`] - the slice of a class record the cache layer is
//!   allowed to read (id plus dimension fields)
//! - [`ListParams`] - normalized list/search query parameters
//! - [`Page`] / [`PageMeta`] - pagination envelope shapes
//! - [`CoreError`] - shared error taxonomy with client/server classification
//!
//! The crate deliberately knows nothing about HTTP, the ORM, or the cache
//! backends. It is pure data.

pub mod class;
pub mod error;
pub mod pagination;
pub mod query;

pub use class::ClassSnapshot;
pub use error::{CoreError, ErrorCategory, Result};
pub use pagination::{Page, PageMeta};
pub use query::ListParams;
