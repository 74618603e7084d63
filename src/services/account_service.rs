//! Account Service - registration, login and account administration

use crate::domain::{DomainError, UserRepository};
use crate::infrastructure::auth::{hash_password, verify_password};
use crate::models::user::{NewUser, UserDto, UserUpdate};

/// Validated sign-up or admin-creation request
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub email: String,
    pub password: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

fn hash(password: &str) -> Result<String, DomainError> {
    hash_password(password).map_err(|e| DomainError::Database(format!("password hashing: {}", e)))
}

/// Create an account whose username is its email address.
pub async fn create_account(
    users: &dyn UserRepository,
    account: NewAccount,
) -> Result<UserDto, DomainError> {
    let email = account.email.trim().to_string();
    if users.email_taken(&email, None).await? {
        return Err(DomainError::invalid(
            "email",
            "This email address is already registered.",
        ));
    }

    users
        .create(NewUser {
            username: email.clone(),
            email,
            first_name: account.first_name,
            password_hash: hash(&account.password)?,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
        })
        .await
}

/// Credentials check. `None` for an unknown user or a wrong password.
pub async fn authenticate(
    users: &dyn UserRepository,
    email: &str,
    password: &str,
) -> Result<Option<UserDto>, DomainError> {
    let Some(credentials) = users.find_credentials(email.trim()).await? else {
        return Ok(None);
    };

    let valid = verify_password(password, &credentials.password_hash).unwrap_or_else(|e| {
        tracing::error!("Stored hash for user {} is unreadable: {}", credentials.user.id, e);
        false
    });

    if valid {
        tracing::info!("User {} logged in", credentials.user.id);
        Ok(Some(credentials.user))
    } else {
        tracing::warn!("Failed login for {}", email.trim());
        Ok(None)
    }
}

pub async fn update_account(
    users: &dyn UserRepository,
    id: i32,
    update: UserUpdate,
) -> Result<UserDto, DomainError> {
    if users.email_taken(&update.email, Some(id)).await? {
        return Err(DomainError::invalid(
            "email",
            "This email address is already registered.",
        ));
    }
    users.update(id, update).await
}

/// Delete a user. Superuser accounts are protected.
pub async fn delete_account(users: &dyn UserRepository, id: i32) -> Result<(), DomainError> {
    let user = users.find_by_id(id).await?.ok_or(DomainError::NotFound)?;

    if user.is_superuser {
        tracing::warn!("Refused to delete superuser {}", id);
        return Err(DomainError::AuthorizationDenied(
            "Superuser accounts cannot be deleted.".to_string(),
        ));
    }

    users.delete(id).await
}
