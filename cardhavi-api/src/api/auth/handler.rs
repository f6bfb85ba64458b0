//! Account API Handlers
//!
//! No session or token is issued; the storefront keeps the returned profile.

use axum::Json;
use axum::extract::State;
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::{LoginRequest, SignupRequest, User};

use crate::api::extract::ApiJson;
use crate::db::{RepoError, users};
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::{hash_password, new_id, now_millis, verify_password};

fn non_empty<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::required(field))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ServiceResult<(StatusCode, Json<User>)> {
    let name = non_empty(&req.name, "name")?.trim();
    let email = non_empty(&req.email, "email")?.trim().to_lowercase();
    let password = non_empty(&req.password, "password")?;

    let password_hash = hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash password");
        AppError::internal("Failed to hash password")
    })?;

    let user = match users::create(&state.pool, &new_id(), name, &email, &password_hash, now_millis())
        .await
    {
        Ok(user) => user,
        Err(RepoError::Duplicate(_)) => {
            return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password share one response.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ServiceResult<Json<User>> {
    let email = non_empty(&req.email, "email")?.trim().to_lowercase();
    let password = non_empty(&req.password, "password")?;

    let Some(row) = users::find_by_email(&state.pool, &email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(AppError::invalid_credentials().into());
    };
    if !verify_password(password, &row.password_hash) {
        tracing::debug!(user_id = %row.id, "Login with wrong password");
        return Err(AppError::invalid_credentials().into());
    }

    Ok(Json(User::from(row)))
}
