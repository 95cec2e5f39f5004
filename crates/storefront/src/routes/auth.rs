//! Signup, login and session routes.
//!
//! Responses carry the `user` object the frontend keeps in memory; the
//! server side of the login lives in the session cookie.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use chaldal_core::Role;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{AuthenticatedPerson, CurrentUser};
use crate::services::AuthService;
use crate::services::auth::SignupInput;
use crate::state::AppState;

/// Signup form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub address: Option<String>,
    pub label: Option<String>,
}

impl From<SignupRequest> for SignupInput {
    fn from(req: SignupRequest) -> Self {
        Self {
            full_name: req.full_name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            role: req.role,
            address: req.address,
            label: req.label,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: AuthenticatedPerson,
}

/// Register and log in.
///
/// POST /api/signup
#[instrument(skip(state, session, request), fields(role = ?request.role))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let signup = AuthService::new(state.pool())
        .signup(request.into())
        .await?;

    if signup.address.as_ref().is_some_and(|a| a.area_created) {
        state.cache().invalidate_areas().await;
    }

    start_session(&session, &signup.person).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: signup_message(signup.person.role),
            user: signup.person,
        }),
    ))
}

/// Log in with email and password.
///
/// POST /api/login
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let person = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    start_session(&session, &person).await?;
    tracing::info!(person_id = %person.id, role = %person.role, "Person logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_owned(),
        user: person,
    }))
}

fn signup_message(role: Role) -> String {
    format!("{role} registered successfully!")
}

/// End the session.
///
/// POST /api/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user.
///
/// GET /api/me
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

async fn start_session(session: &Session, person: &AuthenticatedPerson) -> Result<()> {
    set_current_user(session, &CurrentUser::from(person))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&person.id, Some(person.email.as_str()));
    Ok(())
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_message_names_the_role() {
        assert_eq!(signup_message(Role::User), "user registered successfully!");
        assert_eq!(
            signup_message(Role::Seller),
            "seller registered successfully!"
        );
    }
}
