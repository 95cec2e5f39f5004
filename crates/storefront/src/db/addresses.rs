//! Saved addresses and the person-to-address link table.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use chaldal_core::address::AddressText;
use chaldal_core::{AddressId, AddressLabel, AreaId, PersonId};

use super::{RepositoryError, areas, parse_column};
use crate::models::{Area, AttachedAddress, SavedAddress};

#[derive(Debug, sqlx::FromRow)]
struct OwnedAddressRow {
    address_id: i32,
    street: String,
    area_id: i32,
    area_name: String,
    delivery_fee: Decimal,
}

impl From<OwnedAddressRow> for AttachedAddress {
    fn from(row: OwnedAddressRow) -> Self {
        Self {
            address_id: AddressId::new(row.address_id),
            street: row.street,
            area: Area {
                area_id: AreaId::new(row.area_id),
                name: row.area_name,
                delivery_fee: row.delivery_fee,
            },
            area_created: false,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SavedAddressRow {
    address_id: i32,
    label: String,
    street: String,
    city: String,
    area_name: String,
    delivery_fee: Decimal,
    is_default: bool,
}

impl TryFrom<SavedAddressRow> for SavedAddress {
    type Error = RepositoryError;

    fn try_from(row: SavedAddressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            address_id: AddressId::new(row.address_id),
            label: parse_column::<AddressLabel>("address label", &row.label)?,
            street: row.street,
            city: row.city,
            area: row.area_name,
            delivery_fee: row.delivery_fee,
            is_default: row.is_default,
        })
    }
}

/// Store an address and file it under `label` for `person_id`.
///
/// An existing address under the same label is replaced. The address becomes
/// the person's default when `make_default` is set or when the person has no
/// default yet.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidReference` if the person does not exist,
/// `RepositoryError::Database` for other failures.
pub async fn attach_address(
    conn: &mut PgConnection,
    person_id: PersonId,
    address: &AddressText,
    label: AddressLabel,
    make_default: bool,
) -> Result<AttachedAddress, RepositoryError> {
    let (area, area_created) = areas::resolve_or_create(conn, address).await?;

    let address_id: i32 = sqlx::query_scalar(
        "INSERT INTO address (street, area_id, city) VALUES ($1, $2, $3) RETURNING address_id",
    )
    .bind(&address.street)
    .bind(area.area_id)
    .bind(&address.city)
    .fetch_one(&mut *conn)
    .await?;

    if make_default {
        sqlx::query(
            "UPDATE person_address SET is_default = FALSE WHERE person_id = $1 AND label <> $2",
        )
        .bind(person_id)
        .bind(label.as_str())
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query(
        r"
        INSERT INTO person_address (person_id, address_id, label, is_default)
        VALUES (
            $1, $2, $3,
            $4 OR NOT EXISTS (
                SELECT 1 FROM person_address
                WHERE person_id = $1 AND is_default AND label <> $3
            )
        )
        ON CONFLICT (person_id, label) DO UPDATE
        SET address_id = EXCLUDED.address_id,
            is_default = person_address.is_default OR EXCLUDED.is_default
        ",
    )
    .bind(person_id)
    .bind(address_id)
    .bind(label.as_str())
    .bind(make_default)
    .execute(&mut *conn)
    .await
    .map_err(RepositoryError::from_constraint)?;

    tracing::debug!(
        person_id = %person_id,
        address_id,
        label = label.as_str(),
        area = %area.name,
        "Attached address"
    );

    Ok(AttachedAddress {
        address_id: AddressId::new(address_id),
        street: address.street.clone(),
        area,
        area_created,
    })
}

/// Load an address only if it is saved under one of `person_id`'s labels.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn owned_address(
    conn: &mut PgConnection,
    person_id: PersonId,
    address_id: AddressId,
) -> Result<Option<AttachedAddress>, RepositoryError> {
    let row = sqlx::query_as::<_, OwnedAddressRow>(
        r"
        SELECT a.address_id, a.street, ar.area_id, ar.name AS area_name, ar.delivery_fee
        FROM person_address pa
        JOIN address a ON a.address_id = pa.address_id
        JOIN area ar ON ar.area_id = a.area_id
        WHERE pa.person_id = $1 AND pa.address_id = $2
        LIMIT 1
        ",
    )
    .bind(person_id)
    .bind(address_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(AttachedAddress::from))
}

/// Read-side queries for saved addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A person's saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored label is unknown.
    pub async fn list_for_person(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<SavedAddress>, RepositoryError> {
        let rows = sqlx::query_as::<_, SavedAddressRow>(
            r"
            SELECT a.address_id, pa.label, a.street, a.city,
                   ar.name AS area_name, ar.delivery_fee, pa.is_default
            FROM person_address pa
            JOIN address a ON a.address_id = pa.address_id
            JOIN area ar ON ar.area_id = a.area_id
            WHERE pa.person_id = $1
            ORDER BY pa.is_default DESC, pa.label
            ",
        )
        .bind(person_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SavedAddress::try_from).collect()
    }
}
