//! Authentication service.
//!
//! Signup creates a person of any role; login checks an Argon2id password
//! hash. Both return an [`AuthenticatedPerson`] which the route handler puts
//! in the session.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use chaldal_core::address::AddressText;
use chaldal_core::{AddressLabel, Email, Phone, Role};

use crate::db::{PersonRepository, RepositoryError};
use crate::models::{AttachedAddress, AuthenticatedPerson, NewPerson, PersonAddressInput};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Longest full name stored (`person.name VARCHAR(100)`).
pub const MAX_NAME_LENGTH: usize = 100;

/// Unvalidated signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub address: Option<String>,
    pub label: Option<String>,
}

/// Result of a successful signup.
#[derive(Debug, Clone)]
pub struct Signup {
    pub person: AuthenticatedPerson,
    pub address: Option<AttachedAddress>,
}

/// Authentication service.
pub struct AuthService<'a> {
    persons: PersonRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            persons: PersonRepository::new(pool),
        }
    }

    /// Register a person with the role named in the form (default `user`).
    ///
    /// # Errors
    ///
    /// Returns a validation variant of `AuthError` for bad input,
    /// `AuthError::UserAlreadyExists` if the email or phone is taken.
    pub async fn signup(&self, input: SignupInput) -> Result<Signup, AuthError> {
        let mut new = validate_signup(&input)?;
        new.password_hash = hash_password(&input.password)?;

        let (person, address) = self.persons.register(&new).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        Ok(Signup { person, address })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown email and
    /// `AuthError::InvalidCredentials` for a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedPerson, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let (person, password_hash) = self
            .persons
            .find_by_email_with_password(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &password_hash)?;

        let default_address = self.persons.default_address(person.id).await?;

        Ok(AuthenticatedPerson {
            id: person.id,
            name: person.name,
            email: person.email,
            role: person.role,
            address: default_address.as_ref().map(|(_, street)| street.clone()),
            address_id: default_address.map(|(id, _)| id),
        })
    }
}

/// Validate a signup form into a `NewPerson` with an empty password hash.
///
/// # Errors
///
/// Returns the first validation failure, checking the role first.
pub fn validate_signup(input: &SignupInput) -> Result<NewPerson, AuthError> {
    let role = match input.role.as_deref() {
        None => Role::default(),
        Some(role) => role.parse::<Role>()?,
    };

    let name = input.full_name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }

    let email = Email::parse(&input.email)?;

    let phone = input
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(Phone::parse)
        .transpose()?;

    validate_password(&input.password)?;

    let label = parse_label(input.label.as_deref())?;
    let address = input
        .address
        .as_deref()
        .and_then(AddressText::parse)
        .map(|text| PersonAddressInput { text, label });

    Ok(NewPerson {
        name: name.to_owned(),
        email,
        phone,
        role,
        password_hash: String::new(),
        address,
    })
}

/// Parse an optional address label, defaulting to `Home`.
///
/// # Errors
///
/// Returns `AuthError::InvalidLabel` for an unknown label.
pub fn parse_label(label: Option<&str>) -> Result<AddressLabel, AuthError> {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        None => Ok(AddressLabel::default()),
        Some(l) => l
            .parse::<AddressLabel>()
            .map_err(|_| AuthError::InvalidLabel(l.to_owned())),
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> SignupInput {
        SignupInput {
            full_name: "Rahima Akter".to_owned(),
            email: "Rahima@Example.com".to_owned(),
            password: "secret1".to_owned(),
            ..SignupInput::default()
        }
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_plaintext_stored_password_is_rejected() {
        assert!(matches!(
            verify_password("secret1", "secret1"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_signup_defaults() {
        let new = validate_signup(&form()).unwrap();
        assert_eq!(new.role, Role::User);
        assert_eq!(new.email.as_str(), "rahima@example.com");
        assert!(new.phone.is_none());
        assert!(new.address.is_none());
    }

    #[test]
    fn test_validate_signup_checks_role_first() {
        let input = SignupInput {
            role: Some("superuser".to_owned()),
            email: "not-an-email".to_owned(),
            ..form()
        };
        let err = validate_signup(&input).unwrap_err();
        assert!(matches!(err, AuthError::InvalidRole(_)));
        assert_eq!(err.to_string(), "Invalid role specified.");
    }

    #[test]
    fn test_validate_signup_rejects_short_password() {
        let input = SignupInput {
            password: "12345".to_owned(),
            ..form()
        };
        assert!(matches!(
            validate_signup(&input),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_signup_with_seller_phone_and_address() {
        let input = SignupInput {
            role: Some("seller".to_owned()),
            phone: Some("+880 1711-000111".to_owned()),
            address: Some("House 2, Road 7, Banani, Dhaka".to_owned()),
            label: Some("Office".to_owned()),
            ..form()
        };
        let new = validate_signup(&input).unwrap();
        assert_eq!(new.role, Role::Seller);
        assert_eq!(new.phone.unwrap().as_str(), "01711000111");
        let address = new.address.unwrap();
        assert_eq!(address.label, AddressLabel::Office);
        assert_eq!(address.text.area_hint, "Banani");
    }

    #[test]
    fn test_blank_phone_and_address_are_ignored() {
        let input = SignupInput {
            phone: Some("  ".to_owned()),
            address: Some(String::new()),
            ..form()
        };
        let new = validate_signup(&input).unwrap();
        assert!(new.phone.is_none());
        assert!(new.address.is_none());
    }

    #[test]
    fn test_validate_signup_bounds_stored_lengths() {
        let input = SignupInput {
            full_name: "R".repeat(MAX_NAME_LENGTH + 1),
            ..form()
        };
        let err = validate_signup(&input).unwrap_err();
        assert!(err.is_client_error());
        assert!(matches!(err, AuthError::NameTooLong { .. }));

        let input = SignupInput {
            address: Some(format!("{} Mohakhali", "9".repeat(150))),
            ..form()
        };
        let address = validate_signup(&input).unwrap().address.unwrap();
        assert_eq!(address.text.area_hint, "Mohakhali");

        let input = SignupInput {
            address: Some(format!("Road 4, {}", "Kallyanpur".repeat(15))),
            ..form()
        };
        let address = validate_signup(&input).unwrap().address.unwrap();
        assert!(address.text.area_hint.chars().count() <= 100);
        assert!(address.text.city.chars().count() <= 100);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label(None).unwrap(), AddressLabel::Home);
        assert_eq!(parse_label(Some("Friend")).unwrap(), AddressLabel::Friend);
        assert!(matches!(
            parse_label(Some("Gym")),
            Err(AuthError::InvalidLabel(_))
        ));
    }
}
