//! Domain layer - Business abstractions
//!
//! Repository traits, domain errors, and the pure logic behind search
//! dispatch, reading positions and money handling. No Axum here.

pub mod errors;
pub mod money;
pub mod reading;
pub mod repositories;
pub mod search;

pub use errors::{DomainError, FieldErrors};
pub use money::Money;
pub use repositories::*;
