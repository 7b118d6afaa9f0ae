//! User entity model and DTOs.

use folio_core::types::DbId;
use sqlx::FromRow;

/// Full user row from the `tb_user` table.
///
/// Contains the password hash -- never render or log this struct directly.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// DTO for creating a new user. The password must already be hashed.
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
