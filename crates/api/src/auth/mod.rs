//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`account`] -- registration and credential checks against `tb_user`.

pub mod account;
pub mod password;
