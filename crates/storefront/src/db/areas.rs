//! Delivery area lookups.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use chaldal_core::AreaId;
use chaldal_core::address::{AddressText, match_area};
use chaldal_core::pricing::DEFAULT_DELIVERY_FEE;

use super::RepositoryError;
use crate::models::Area;

#[derive(Debug, sqlx::FromRow)]
struct AreaRow {
    area_id: i32,
    name: String,
    delivery_fee: Decimal,
}

impl From<AreaRow> for Area {
    fn from(row: AreaRow) -> Self {
        Self {
            area_id: AreaId::new(row.area_id),
            name: row.name,
            delivery_fee: row.delivery_fee,
        }
    }
}

const SELECT_AREAS: &str = "SELECT area_id, name, delivery_fee FROM area ORDER BY name";

/// Repository for delivery areas.
pub struct AreaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AreaRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All areas, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Area>, RepositoryError> {
        let rows = sqlx::query_as::<_, AreaRow>(SELECT_AREAS)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Area::from).collect())
    }
}

/// Pick the fee for `text` from an already loaded area list.
#[must_use]
pub fn fee_for(areas: &[Area], text: &str) -> (Option<Area>, Decimal) {
    match_area(areas, text, |a| a.name.as_str()).map_or((None, DEFAULT_DELIVERY_FEE), |area| {
        (Some(area.clone()), area.delivery_fee)
    })
}

/// Find the area an address belongs to, creating it from the address's area
/// hint when no known area name occurs in the text.
///
/// Runs on the caller's connection so it can take part in a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn resolve_or_create(
    conn: &mut PgConnection,
    address: &AddressText,
) -> Result<(Area, bool), RepositoryError> {
    let areas: Vec<Area> = sqlx::query_as::<_, AreaRow>(SELECT_AREAS)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Area::from)
        .collect();

    if let Some(area) = match_area(&areas, &address.street, |a| a.name.as_str()) {
        return Ok((area.clone(), false));
    }

    let inserted = sqlx::query_as::<_, AreaRow>(
        r"
        INSERT INTO area (name, delivery_fee)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        RETURNING area_id, name, delivery_fee
        ",
    )
    .bind(&address.area_hint)
    .bind(DEFAULT_DELIVERY_FEE)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = inserted {
        tracing::info!(area = %row.name, "Created delivery area");
        return Ok((row.into(), true));
    }

    // Another transaction created it between the read and the insert.
    let row = sqlx::query_as::<_, AreaRow>(
        "SELECT area_id, name, delivery_fee FROM area WHERE name = $1",
    )
    .bind(&address.area_hint)
    .fetch_one(&mut *conn)
    .await?;
    Ok((row.into(), false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(id: i32, name: &str, fee: i64) -> Area {
        Area {
            area_id: AreaId::new(id),
            name: name.to_owned(),
            delivery_fee: Decimal::new(fee, 0),
        }
    }

    #[test]
    fn test_fee_for_matched_area() {
        let areas = vec![area(1, "Gulshan", 40), area(2, "Savar", 120)];
        let (matched, fee) = fee_for(&areas, "Road 3, savar cantonment");
        assert_eq!(matched.map(|a| a.area_id), Some(AreaId::new(2)));
        assert_eq!(fee, Decimal::new(120, 0));
    }

    #[test]
    fn test_fee_for_unknown_area_uses_default() {
        let areas = vec![area(1, "Gulshan", 40)];
        let (matched, fee) = fee_for(&areas, "Sylhet Sadar");
        assert!(matched.is_none());
        assert_eq!(fee, DEFAULT_DELIVERY_FEE);
    }
}
