// src/middleware/auth.rs

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::config::AppState;

// Monta o Session Store da requisição a partir do `Authorization: Bearer`
// e o resolve antes do handler. A decisão (401/403) fica com o `Guard`.
pub async fn session_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    let session = Arc::new(app_state.session_for(token));
    session.restore().await;

    // Insere o Session Store nos "extensions" da requisição
    request.extensions_mut().insert(session);
    next.run(request).await
}
