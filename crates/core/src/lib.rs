//! Folio domain primitives.
//!
//! Pure types and functions with no I/O so both the repository layer and
//! the HTTP layer can depend on them.

pub mod dates;
pub mod error;
pub mod technology;
pub mod types;
pub mod validation;
