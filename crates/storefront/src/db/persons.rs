//! Person repository: signup, login lookups and role subtype rows.
//!
//! A person is one `person` row plus exactly one row in the subtype table
//! for its role (`users`, `seller`, `admin` or `rider`), sharing the same id.

use sqlx::{PgConnection, PgPool};

use chaldal_core::{AddressId, Email, PersonId, Phone, Role};

use super::{RepositoryError, addresses, parse_column};
use crate::models::{AttachedAddress, AuthenticatedPerson, NewPerson, Person};

#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    person_id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
}

impl TryFrom<PersonRow> for Person {
    type Error = RepositoryError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = row
            .phone
            .as_deref()
            .map(|p| parse_column::<Phone>("phone", p))
            .transpose()?;

        Ok(Self {
            id: PersonId::new(row.person_id),
            name: row.name,
            email,
            phone,
            role: parse_column::<Role>("role", &row.role)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PersonWithPasswordRow {
    #[sqlx(flatten)]
    person: PersonRow,
    password: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DefaultAddressRow {
    address_id: i32,
    street: String,
}

/// Extra columns for role subtype rows. Only sellers and riders have any.
#[derive(Debug, Clone, Default)]
pub struct RoleDetails {
    pub company_name: Option<String>,
    pub vehicle_type: Option<String>,
}

/// Repository for person database operations.
pub struct PersonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PersonRepository<'a> {
    /// Create a new person repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run the signup transaction.
    ///
    /// Inserts the person, its role subtype row and, when an address was
    /// given, the address under its label as the default. Either everything
    /// is committed or nothing is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn register(
        &self,
        new: &NewPerson,
    ) -> Result<(AuthenticatedPerson, Option<AttachedAddress>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = insert_person(&mut tx, new).await?;
        insert_role_row(&mut tx, id, new.role, &RoleDetails::default()).await?;

        let attached = match &new.address {
            Some(input) => {
                Some(addresses::attach_address(&mut tx, id, &input.text, input.label, true).await?)
            }
            None => None,
        };

        tx.commit().await?;

        tracing::info!(person_id = %id, role = %new.role, "Person registered");

        let person = AuthenticatedPerson {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            role: new.role,
            address: attached.as_ref().map(|a| a.street.clone()),
            address_id: attached.as_ref().map(|a| a.address_id),
        };
        Ok((person, attached))
    }

    /// Create an account with role-specific details (operator tooling).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_account(
        &self,
        new: &NewPerson,
        details: &RoleDetails,
    ) -> Result<PersonId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_person(&mut tx, new).await?;
        insert_role_row(&mut tx, id, new.role, details).await?;
        if let Some(input) = &new.address {
            addresses::attach_address(&mut tx, id, &input.text, input.label, true).await?;
        }
        tx.commit().await?;
        Ok(id)
    }

    /// Get a person and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored column is invalid.
    pub async fn find_by_email_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(Person, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, PersonWithPasswordRow>(
            "SELECT person_id, name, email, phone, role, password FROM person WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((Person::try_from(r.person)?, r.password)))
            .transpose()
    }

    /// The person's default address, or any saved address if none is marked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn default_address(
        &self,
        id: PersonId,
    ) -> Result<Option<(AddressId, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, DefaultAddressRow>(
            r"
            SELECT a.address_id, a.street
            FROM person_address pa
            JOIN address a ON a.address_id = pa.address_id
            WHERE pa.person_id = $1
            ORDER BY pa.is_default DESC, pa.label
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (AddressId::new(r.address_id), r.street)))
    }
}

async fn insert_person(conn: &mut PgConnection, new: &NewPerson) -> Result<PersonId, RepositoryError> {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO person (name, email, phone, role, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING person_id
        ",
    )
    .bind(&new.name)
    .bind(new.email.as_str())
    .bind(new.phone.as_ref().map(Phone::as_str))
    .bind(new.role.as_str())
    .bind(&new.password_hash)
    .fetch_one(&mut *conn)
    .await
    .map_err(RepositoryError::from_constraint)?;

    Ok(PersonId::new(id))
}

async fn insert_role_row(
    conn: &mut PgConnection,
    id: PersonId,
    role: Role,
    details: &RoleDetails,
) -> Result<(), RepositoryError> {
    let query = match role {
        Role::User => sqlx::query("INSERT INTO users (user_id) VALUES ($1)").bind(id),
        Role::Admin => sqlx::query("INSERT INTO admin (admin_id) VALUES ($1)").bind(id),
        Role::Seller => sqlx::query("INSERT INTO seller (seller_id, company_name) VALUES ($1, $2)")
            .bind(id)
            .bind(details.company_name.as_deref()),
        Role::Rider => sqlx::query("INSERT INTO rider (rider_id, vehicle_type) VALUES ($1, $2)")
            .bind(id)
            .bind(details.vehicle_type.as_deref()),
    };

    query.execute(&mut *conn).await?;
    Ok(())
}
