// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        gate::{Authenticated, Guard},
        i18n::Locale,
    },
    models::dashboard::{MonthQuery, MonthlySummary, YearQuery, YearlySummary},
};

// GET /api/dashboard/summary?month=3&year=2025
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(MonthQuery),
    responses(
        (status = 200, description = "Cards do mês: receitas, despesas e lucro", body = MonthlySummary),
        (status = 400, description = "Mês inválido"),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .get_summary(guard.identity.id, query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/yearly?year=2025
#[utoipa::path(
    get,
    path = "/api/dashboard/yearly",
    tag = "Dashboard",
    params(YearQuery),
    responses(
        (status = 200, description = "Gráficos do ano (12 meses, por tipo e por status)", body = YearlySummary),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_yearly(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: Guard<Authenticated>,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let yearly = app_state
        .dashboard_service
        .get_yearly(guard.identity.id, query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(yearly)))
}
