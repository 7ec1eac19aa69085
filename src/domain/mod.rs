//! Workflows and derived views on top of the document store.
//!
//! Every operation takes the caller's [`Session`](crate::middleware::auth::Session)
//! and the store explicitly; nothing here reads ambient state.

pub mod approval;
pub mod assets;
pub mod error;
pub mod payments;
pub mod read_models;
pub mod seats;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DomainError, DomainResult};
