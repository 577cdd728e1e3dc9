//! Domain layer for the glyph operator
//!
//! Plain data records shared by the analysis services, the configuration
//! model, and the boundary error type.

pub mod errors;
pub mod models;

pub use errors::{DomainError, DomainResult};
