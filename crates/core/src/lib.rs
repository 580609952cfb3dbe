//! `docmail-core`: shared building blocks for the document mail pipeline.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::DomainError;
pub use id::{DocumentId, PartyId, UserId};
pub use money::Money;
