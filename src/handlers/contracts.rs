// src/handlers/contracts.rs

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
        gate::{Authenticated, Guard},
        i18n::Locale,
    },
    models::contract::{Contract, ContractFields},
};

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Contracts",
    responses(
        (status = 200, description = "Contratos visíveis (mais recentes primeiro)", body = Vec<Contract>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
) -> Result<impl IntoResponse, ApiError> {
    let contracts = app_state
        .contract_service
        .list(guard.identity.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(contracts))
}

// GET /api/contracts/{id}
#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 200, body = Contract),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = app_state
        .contract_service
        .get(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(contract))
}

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Contracts",
    request_body = ContractFields,
    responses(
        (status = 201, description = "Contrato criado", body = Contract),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Json(payload): Json<ContractFields>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = app_state
        .contract_service
        .create(guard.identity.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(contract)))
}

// PUT /api/contracts/{id}
#[utoipa::path(
    put,
    path = "/api/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    request_body = ContractFields,
    responses(
        (status = 200, description = "Contrato atualizado", body = Contract),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContractFields>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = app_state
        .contract_service
        .update(guard.identity.id, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(contract))
}

// DELETE /api/contracts/{id}
#[utoipa::path(
    delete,
    path = "/api/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 204, description = "Contrato removido (receitas ligadas permanecem)"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .contract_service
        .delete(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
