// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        gate::{AdminOnly, Authenticated, Guard},
        i18n::Locale,
    },
    models::rbac::{InviteUserPayload, RoleAssignment, RoleChange, UserWithRoles},
};

// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "RBAC",
    responses(
        (status = 200, description = "Atribuições de papel visíveis", body = Vec<RoleAssignment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
) -> Result<impl IntoResponse, ApiError> {
    let roles = app_state
        .rbac_service
        .list_role_assignments(guard.identity.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(roles))
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "Usuários e seus papéis", body = Vec<UserWithRoles>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .rbac_service
        .list_users_with_roles(guard.identity.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(users))
}

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Admin",
    request_body = InviteUserPayload,
    responses(
        (status = 201, description = "Usuário convidado", body = UserWithRoles),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<AdminOnly>,
    Json(payload): Json<InviteUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .rbac_service
        .invite_user(guard.identity.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// DELETE /api/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 400, description = "Não é possível remover a própria conta"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .rbac_service
        .delete_user(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/users/{id}/toggle-admin
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/toggle-admin",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Novo estado do papel admin", body = RoleChange),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_admin(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let change = app_state
        .rbac_service
        .toggle_admin(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(change))
}

// POST /api/admin/users/{id}/admin
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/admin",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Papel admin concedido", body = RoleChange)
    ),
    security(("api_jwt" = []))
)]
pub async fn grant_admin(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let change = app_state
        .rbac_service
        .grant_admin(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(change))
}

// DELETE /api/admin/users/{id}/admin
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}/admin",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Papel admin revogado", body = RoleChange)
    ),
    security(("api_jwt" = []))
)]
pub async fn revoke_admin(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let change = app_state
        .rbac_service
        .revoke_admin(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(change))
}
