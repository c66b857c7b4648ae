//! `restock-core`: shared domain building blocks.
//!
//! Identifiers and the error model used by every other crate in the workspace.
//! This crate performs no IO.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, FieldError, ValidationError};
pub use id::{ItemId, RunId};
