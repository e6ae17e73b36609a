// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
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
    models::finance::{Expense, ExpenseChanges, ExpenseFields, PeriodFilter, Revenue, RevenueEntry, RevenueFields},
};

// =========================================================================
//  RECEITAS
// =========================================================================

// GET /api/revenues?month=3&year=2025
#[utoipa::path(
    get,
    path = "/api/revenues",
    tag = "Revenues",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Receitas com o nome do contrato", body = Vec<RevenueEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_revenues(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Query(filter): Query<PeriodFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let revenues = app_state
        .revenue_service
        .list(guard.identity.id, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(revenues))
}

// POST /api/revenues
#[utoipa::path(
    post,
    path = "/api/revenues",
    tag = "Revenues",
    request_body = RevenueFields,
    responses(
        (status = 201, description = "Receita lançada", body = Revenue),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Contrato inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Json(payload): Json<RevenueFields>,
) -> Result<impl IntoResponse, ApiError> {
    let revenue = app_state
        .revenue_service
        .create(guard.identity.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(revenue)))
}

// DELETE /api/revenues/{id}
#[utoipa::path(
    delete,
    path = "/api/revenues/{id}",
    tag = "Revenues",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 204, description = "Receita removida"),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .revenue_service
        .delete(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
//  DESPESAS
// =========================================================================

// GET /api/expenses?month=3&year=2025
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Despesas visíveis (mais recentes primeiro)", body = Vec<Expense>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Query(filter): Query<PeriodFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let expenses = app_state
        .expense_service
        .list(guard.identity.id, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(expenses))
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = ExpenseFields,
    responses(
        (status = 201, description = "Despesa criada", body = Expense),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Json(payload): Json<ExpenseFields>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = app_state
        .expense_service
        .create(guard.identity.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// PUT /api/expenses/{id}
#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    request_body = ExpenseChanges,
    responses(
        (status = 200, description = "Despesa atualizada", body = Expense),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseChanges>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = app_state
        .expense_service
        .update(guard.identity.id, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(expense))
}

// POST /api/expenses/{id}/toggle-status
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/toggle-status",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 200, description = "Status alternado (pending <-> paid)", body = Expense),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_expense_status(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = app_state
        .expense_service
        .toggle_status(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(expense))
}

// DELETE /api/expenses/{id}
#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 204, description = "Despesa removida"),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .expense_service
        .delete(guard.identity.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
