// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::session_guard};

pub fn build_app(app_state: AppState) -> Router {
    // Daqui para baixo o `Guard` de cada handler decide (401/403/503)
    let session_routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/users/me",
            get(handlers::auth::get_me).put(handlers::auth::update_me),
        )
        .route(
            "/contracts",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route(
            "/contracts/{id}",
            get(handlers::contracts::get_contract)
                .put(handlers::contracts::update_contract)
                .delete(handlers::contracts::delete_contract),
        )
        .route(
            "/revenues",
            get(handlers::finance::list_revenues).post(handlers::finance::create_revenue),
        )
        .route("/revenues/{id}", delete(handlers::finance::delete_revenue))
        .route(
            "/expenses",
            get(handlers::finance::list_expenses).post(handlers::finance::create_expense),
        )
        .route(
            "/expenses/{id}",
            put(handlers::finance::update_expense)
                .delete(handlers::finance::delete_expense),
        )
        .route(
            "/expenses/{id}/toggle-status",
            post(handlers::finance::toggle_expense_status),
        )
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/dashboard/yearly", get(handlers::dashboard::get_yearly))
        .route("/roles", get(handlers::rbac::list_roles))
        .route(
            "/admin/users",
            get(handlers::rbac::list_users).post(handlers::rbac::invite_user),
        )
        .route("/admin/users/{id}", delete(handlers::rbac::delete_user))
        .route(
            "/admin/users/{id}/toggle-admin",
            post(handlers::rbac::toggle_admin),
        )
        .route(
            "/admin/users/{id}/admin",
            post(handlers::rbac::grant_admin).delete(handlers::rbac::revoke_admin),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // Rotas de autenticação (públicas)
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .nest("/api", session_routes)
        .with_state(app_state)
}
