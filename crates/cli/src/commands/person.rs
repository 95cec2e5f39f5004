//! Account management commands.
//!
//! The storefront only lets customers and sellers sign up. Admin and rider
//! accounts are created here.

use chaldal_storefront::db::PersonRepository;
use chaldal_storefront::db::RepositoryError;
use chaldal_storefront::db::persons::RoleDetails;
use chaldal_storefront::services::AuthError;
use chaldal_storefront::services::auth::{SignupInput, hash_password, validate_signup};
use chaldal_core::PersonId;

use super::{CommandError, connect};

/// Command-line account details.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub vehicle: Option<String>,
}

/// Create an account of any role.
///
/// Validation is the same as public signup.
///
/// # Errors
///
/// Returns `CommandError::Auth` for invalid input or a taken email/phone.
pub async fn create(account: NewAccount) -> Result<PersonId, CommandError> {
    let input = SignupInput {
        full_name: account.name,
        email: account.email,
        password: account.password,
        phone: account.phone,
        role: Some(account.role),
        address: account.address,
        label: None,
    };

    let mut new = validate_signup(&input)?;
    new.password_hash = hash_password(&input.password)?;

    let details = RoleDetails {
        company_name: account.company,
        vehicle_type: account.vehicle,
    };

    let pool = connect().await?;
    let id = PersonRepository::new(&pool)
        .create_account(&new, &details)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CommandError::Auth(AuthError::UserAlreadyExists),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(
        person_id = %id,
        email = %new.email,
        role = %new.role,
        "Account created"
    );
    Ok(id)
}
