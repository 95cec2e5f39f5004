//! Per-customer order history and saved addresses.
//!
//! Open to anonymous callers, matching the frontend contract. A logged-in
//! customer may only read their own records; admins may read anyone's.

use axum::{
    Json,
    extract::{Path, State},
};

use chaldal_core::{PersonId, Role};

use crate::db::{AddressRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, OrderSummary, SavedAddress};
use crate::state::AppState;

/// GET /api/users/{id}/orders
pub async fn orders(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<PersonId>,
) -> Result<Json<Vec<OrderSummary>>> {
    ensure_may_read(user.as_ref(), id)?;
    let orders = OrderRepository::new(state.pool()).list_for_user(id).await?;
    Ok(Json(orders))
}

/// GET /api/users/{id}/addresses
pub async fn addresses(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<PersonId>,
) -> Result<Json<Vec<SavedAddress>>> {
    ensure_may_read(user.as_ref(), id)?;
    let addresses = AddressRepository::new(state.pool())
        .list_for_person(id)
        .await?;
    Ok(Json(addresses))
}

pub(crate) fn ensure_may_read(user: Option<&CurrentUser>, owner: PersonId) -> Result<()> {
    match user {
        Some(u) if u.id != owner && u.role != Role::Admin => Err(AppError::Forbidden(
            "You can only view your own records".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chaldal_core::Email;

    fn user(id: i32, role: Role) -> CurrentUser {
        CurrentUser {
            id: PersonId::new(id),
            name: "Rafi".to_string(),
            email: Email::parse("rafi@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn test_ensure_may_read() {
        let owner = PersonId::new(4);
        assert!(ensure_may_read(None, owner).is_ok());
        assert!(ensure_may_read(Some(&user(4, Role::User)), owner).is_ok());
        assert!(ensure_may_read(Some(&user(1, Role::Admin)), owner).is_ok());
        assert!(matches!(
            ensure_may_read(Some(&user(5, Role::User)), owner),
            Err(AppError::Forbidden(_))
        ));
    }
}
