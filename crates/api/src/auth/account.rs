//! User registration and credential verification.

use folio_core::error::CoreError;
use folio_core::types::DbId;
use folio_core::validation::validate_name;
use folio_db::models::user::{CreateUser, User};
use folio_db::repositories::UserRepo;
use folio_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};

/// Message for every login failure. Unknown email and wrong password are
/// reported identically.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration input as submitted by the register form.
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub user_id: DbId,
    pub name: String,
}

/// Reject empty or overlong names, emails without `@`, and short passwords.
pub fn validate_registration(input: &Registration) -> Result<(), CoreError> {
    validate_name("Name", &input.name)?;
    let email = input.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(CoreError::Validation("A valid email is required".into()));
    }
    validate_password_strength(&input.password).map_err(CoreError::Validation)
}

/// Hash the password and insert a new user.
///
/// A duplicate email maps to [`CoreError::Conflict`].
pub async fn register(pool: &DbPool, input: &Registration) -> AppResult<User> {
    validate_registration(input)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        password_hash,
    };

    match UserRepo::create(pool, &create).await {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => Err(
            AppError::Core(CoreError::Conflict("Email is already registered".into())),
        ),
        Err(e) => Err(e.into()),
    }
}

/// Check `email` and `password` against the stored hash.
///
/// Unknown emails, wrong passwords and unreadable stored hashes all fail with
/// [`CoreError::Unauthorized`] carrying [`INVALID_CREDENTIALS`].
pub async fn authenticate(pool: &DbPool, email: &str, password: &str) -> AppResult<SessionGrant> {
    let invalid = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    let user = UserRepo::find_by_email(pool, email.trim())
        .await?
        .ok_or_else(invalid)?;

    let valid = match verify_password(password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(user_id = user.id, error = %e, "Stored password hash is unreadable");
            false
        }
    };

    if !valid {
        return Err(invalid());
    }

    Ok(SessionGrant {
        user_id: user.id,
        name: user.name,
    })
}
