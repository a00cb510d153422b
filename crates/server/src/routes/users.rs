//! User route handlers.

use axum::extract::{Path, State};
use ordercast_core::validate::{parse_positive_id, validate_new_user, validate_user_patch};
use ordercast_core::{User, UserId};

use super::extract::JsonBody;
use super::response::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

fn user_id(raw: &str) -> Result<UserId> {
    Ok(UserId::new(parse_positive_id(raw, "user")?))
}

/// GET /api/users
pub async fn index(State(state): State<AppState>) -> ApiResponse<Vec<User>> {
    ApiResponse::ok(state.users().list())
}

/// POST /api/users
///
/// # Errors
///
/// 400 on validation failure or duplicate email.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<User>> {
    let new = validate_new_user(&body)?;
    let user = state.users().create(new)?;
    Ok(ApiResponse::created(user))
}

/// GET /api/users/{id}
///
/// # Errors
///
/// 400 for a malformed id, 404 if no such user.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>> {
    let id = user_id(&id)?;
    Ok(ApiResponse::ok(state.users().get(id)?))
}

/// PUT /api/users/{id}
///
/// # Errors
///
/// 400 for a malformed id, invalid fields or a duplicate email; 404 if no
/// such user.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<User>> {
    let id = user_id(&id)?;
    let patch = validate_user_patch(&body)?;
    Ok(ApiResponse::ok(state.users().update(id, patch)?))
}

/// DELETE /api/users/{id}
///
/// # Errors
///
/// 400 for a malformed id, 404 if no such user.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>> {
    let id = user_id(&id)?;
    let user = state.users().delete(id)?;
    Ok(ApiResponse::ok(user).with_message("User deleted successfully."))
}
