//! # Users API
//!
//! CRUD over the user collection.
//!
//! ## Endpoints
//!
//! - `GET /api/users` — list users
//! - `POST /api/users` — create user
//! - `GET /api/users/:id` — get user
//! - `PUT /api/users/:id` — replace user
//! - `DELETE /api/users/:id` — delete user
//!
//! Path and body are decoded and validated before the store is touched.
//! Successful get/create/update/delete dispatch an audit entry; the response
//! never waits on it.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use usersvc_core::User;

use crate::audit::AuditAction;
use crate::error::AppError;
use crate::extractors::{extract_user_id, extract_validated_json};
use crate::state::AppState;

// ── Router ──────────────────────────────────────────────────────────

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/users — List all users.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All stored users", body = Vec<User>),
    ),
    tag = "users"
)]
async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.get_all())
}

/// GET /api/users/:id — Get a single user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Malformed user ID", body = crate::error::ErrorBody),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let id = extract_user_id(path)?;
    let user = state.users.get_by_id(id)?;
    state.audit.record(AuditAction::Get, id);
    Ok(Json(user))
}

/// POST /api/users — Create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = User,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Malformed body or validation error", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<User>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let req = extract_validated_json(body)?;
    let user = state.users.create(req);
    state.audit.record(AuditAction::Create, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/:id — Replace a user wholesale.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = User,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Malformed input or validation error", body = crate::error::ErrorBody),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<User>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let id = extract_user_id(path)?;
    let req = extract_validated_json(body)?;
    let user = state.users.update(id, req)?;
    state.audit.record(AuditAction::Update, id);
    Ok(Json(user))
}

/// DELETE /api/users/:id — Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed user ID", body = crate::error::ErrorBody),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_user_id(path)?;
    state.users.delete(id)?;
    state.audit.record(AuditAction::Delete, id);
    Ok(StatusCode::NO_CONTENT)
}
