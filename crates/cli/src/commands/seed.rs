//! Seed the storefront database with a starter catalog.
//!
//! Reads a YAML catalog (the built-in `seed/catalog.yaml` unless a file is
//! given) and inserts categories, delivery areas, a demo seller account and
//! that seller's products. Rows that already exist are skipped, so the seed
//! can be re-run.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use chaldal_core::{PersonId, Role};
use chaldal_storefront::db::PersonRepository;
use chaldal_storefront::db::persons::RoleDetails;
use chaldal_storefront::services::auth::{SignupInput, hash_password, validate_signup};

use super::{CommandError, connect};

const BUILTIN_CATALOG: &str = include_str!("../../seed/catalog.yaml");

/// Seed file layout.
#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    pub categories: Vec<String>,
    pub areas: Vec<SeedArea>,
    pub seller: SeedSeller,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedArea {
    pub name: String,
    pub delivery_fee: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SeedSeller {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
}

/// Counts of rows actually inserted.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub categories: u64,
    pub areas: u64,
    pub seller_created: bool,
    pub products: u64,
}

/// Load and apply a seed catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a database
/// operation fails.
pub async fn run(file: Option<&str>, seller_password: &str) -> Result<SeedReport, CommandError> {
    let catalog = match file {
        Some(path) => {
            info!(path = %path, "Loading seed catalog from file");
            parse_catalog(&tokio::fs::read_to_string(Path::new(path)).await?)?
        }
        None => parse_catalog(BUILTIN_CATALOG)?,
    };

    let pool = connect().await?;

    let mut report = SeedReport {
        categories: seed_categories(&pool, &catalog.categories).await?,
        areas: seed_areas(&pool, &catalog.areas).await?,
        ..SeedReport::default()
    };

    let (seller_id, created) = ensure_seller(&pool, &catalog.seller, seller_password).await?;
    report.seller_created = created;
    report.products = seed_products(&pool, seller_id, &catalog.products).await?;

    info!(
        categories = report.categories,
        areas = report.areas,
        seller_created = report.seller_created,
        products = report.products,
        "Seeding complete"
    );
    Ok(report)
}

/// Parse a YAML catalog.
///
/// # Errors
///
/// Returns `CommandError::SeedFormat` for malformed YAML.
pub fn parse_catalog(yaml: &str) -> Result<SeedCatalog, CommandError> {
    Ok(serde_yaml::from_str(yaml)?)
}

async fn seed_categories(pool: &PgPool, names: &[String]) -> Result<u64, CommandError> {
    let mut inserted = 0;
    for name in names {
        inserted += sqlx::query("INSERT INTO category (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?
            .rows_affected();
    }
    Ok(inserted)
}

async fn seed_areas(pool: &PgPool, areas: &[SeedArea]) -> Result<u64, CommandError> {
    let mut inserted = 0;
    for area in areas {
        inserted += sqlx::query(
            "INSERT INTO area (name, delivery_fee) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&area.name)
        .bind(area.delivery_fee)
        .execute(pool)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

/// Find the demo seller by email, creating the account when missing.
async fn ensure_seller(
    pool: &PgPool,
    seller: &SeedSeller,
    password: &str,
) -> Result<(PersonId, bool), CommandError> {
    let input = SignupInput {
        full_name: seller.name.clone(),
        email: seller.email.clone(),
        password: password.to_owned(),
        phone: seller.phone.clone(),
        role: Some(Role::Seller.to_string()),
        address: None,
        label: None,
    };
    let mut new = validate_signup(&input)?;

    let repo = PersonRepository::new(pool);
    if let Some((person, _)) = repo.find_by_email_with_password(&new.email).await? {
        info!(person_id = %person.id, "Demo seller already exists");
        return Ok((person.id, false));
    }

    new.password_hash = hash_password(password)?;
    let details = RoleDetails {
        company_name: seller.company_name.clone(),
        vehicle_type: None,
    };

    let id = repo.create_account(&new, &details).await?;
    info!(person_id = %id, "Demo seller created");
    Ok((id, true))
}

async fn seed_products(
    pool: &PgPool,
    seller_id: PersonId,
    products: &[SeedProduct],
) -> Result<u64, CommandError> {
    let mut inserted = 0;
    for product in products {
        let category_id: Option<i32> =
            sqlx::query_scalar("SELECT category_id FROM category WHERE name = $1")
                .bind(&product.category)
                .fetch_optional(pool)
                .await?;
        let category_id =
            category_id.ok_or_else(|| CommandError::UnknownCategory(product.category.clone()))?;

        inserted += sqlx::query(
            r"
            INSERT INTO products (name, unit, unit_price, stock, image_url, category_id, seller_id)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (
                SELECT 1 FROM products WHERE seller_id = $7 AND name = $1
            )
            ",
        )
        .bind(&product.name)
        .bind(&product.unit)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.image_url.as_deref())
        .bind(category_id)
        .bind(seller_id)
        .execute(pool)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chaldal_core::Email;

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = parse_catalog(BUILTIN_CATALOG).unwrap();
        assert!(!catalog.categories.is_empty());
        assert!(catalog.areas.iter().all(|a| a.delivery_fee > Decimal::ZERO));
        assert!(Email::parse(&catalog.seller.email).is_ok());
        for product in &catalog.products {
            assert!(
                catalog.categories.contains(&product.category),
                "unknown category {}",
                product.category
            );
            assert!(product.price >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_products_are_optional() {
        let yaml = r"
categories: [Grocery]
areas:
  - name: Khilgaon
    delivery_fee: 60
seller:
  name: Test Seller
  email: test@seller.example
";
        let catalog = parse_catalog(yaml).unwrap();
        assert!(catalog.products.is_empty());
        assert_eq!(catalog.areas[0].delivery_fee, Decimal::new(60, 0));
        assert_eq!(catalog.seller.phone, None);
    }
}
