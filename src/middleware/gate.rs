// src/middleware/gate.rs

use std::{marker::PhantomData, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Identity,
    services::session::SessionStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    Unauthenticated,
    InsufficientPrivilege,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Denied(DenialReason),
    Pending,
}

impl GateDecision {
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            GateDecision::Allowed => Ok(()),
            GateDecision::Denied(DenialReason::Unauthenticated) => Err(AppError::Unauthenticated),
            GateDecision::Denied(DenialReason::InsufficientPrivilege) => {
                Err(AppError::InsufficientPrivilege)
            }
            GateDecision::Pending => Err(AppError::SessionPending),
        }
    }
}

// Fotografia do Session Store no momento da decisão
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub loading: bool,
    pub identity: Option<Identity>,
    pub is_admin: bool,
}

/// Tabela de decisão do portão. Não altera nada.
pub fn guard(snapshot: &SessionSnapshot, requires_admin: bool) -> GateDecision {
    if snapshot.loading {
        return GateDecision::Pending;
    }
    match snapshot.identity {
        None => GateDecision::Denied(DenialReason::Unauthenticated),
        Some(_) if !requires_admin => GateDecision::Allowed,
        Some(_) if snapshot.is_admin => GateDecision::Allowed,
        Some(_) => GateDecision::Denied(DenialReason::InsufficientPrivilege),
    }
}

/// 1. O Trait que define o requisito de acesso de uma rota
pub trait AccessRequirement: Send + Sync + 'static {
    fn requires_admin() -> bool;
    fn label() -> &'static str;
}

pub struct Authenticated;
impl AccessRequirement for Authenticated {
    fn requires_admin() -> bool { false }
    fn label() -> &'static str { "authenticated" }
}

pub struct AdminOnly;
impl AccessRequirement for AdminOnly {
    fn requires_admin() -> bool { true }
    fn label() -> &'static str { "admin" }
}

/// 2. O Extractor (Guardião)
pub struct Guard<T> {
    pub identity: Identity,
    pub is_admin: bool,
    pub session: Arc<SessionStore>,
    _requirement: PhantomData<T>,
}

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for Guard<T>
where
    T: AccessRequirement,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        // A. Session Store da requisição (inserido pelo `session_guard`)
        let Some(session) = parts.extensions.get::<Arc<SessionStore>>().cloned() else {
            return Err(AppError::Unauthenticated.to_api_error(&locale, &app_state.i18n_store));
        };

        // B. Decide
        let snapshot = session
            .snapshot(T::requires_admin())
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        let decision = guard(&snapshot, T::requires_admin());
        if decision != GateDecision::Allowed {
            tracing::warn!(
                "⛔ Acesso negado a {} {} (requisito: {}): {:?}",
                parts.method,
                parts.uri.path(),
                T::label(),
                decision
            );
        }
        decision
            .into_result()
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        // Allowed implica identidade presente
        let identity = snapshot
            .identity
            .ok_or_else(|| AppError::Unauthenticated.to_api_error(&locale, &app_state.i18n_store))?;

        Ok(Guard {
            identity,
            is_admin: snapshot.is_admin,
            session,
            _requirement: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "ana@imobras.com.br".into(),
            display_name: Some("Ana".into()),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn snapshot(loading: bool, signed_in: bool, is_admin: bool) -> SessionSnapshot {
        SessionSnapshot {
            loading,
            identity: signed_in.then(identity),
            is_admin,
        }
    }

    #[test]
    fn loading_is_always_pending() {
        assert_eq!(guard(&snapshot(true, false, false), false), GateDecision::Pending);
        assert_eq!(guard(&snapshot(true, true, true), true), GateDecision::Pending);
    }

    #[test]
    fn anonymous_is_denied() {
        assert_eq!(
            guard(&snapshot(false, false, false), false),
            GateDecision::Denied(DenialReason::Unauthenticated)
        );
        assert_eq!(
            guard(&snapshot(false, false, false), true),
            GateDecision::Denied(DenialReason::Unauthenticated)
        );
    }

    #[test]
    fn signed_in_user_passes_plain_gate() {
        assert_eq!(guard(&snapshot(false, true, false), false), GateDecision::Allowed);
    }

    #[test]
    fn admin_gate_requires_admin() {
        assert_eq!(
            guard(&snapshot(false, true, false), true),
            GateDecision::Denied(DenialReason::InsufficientPrivilege)
        );
        assert_eq!(guard(&snapshot(false, true, true), true), GateDecision::Allowed);
    }

    #[test]
    fn decisions_map_to_errors() {
        assert!(GateDecision::Allowed.into_result().is_ok());
        assert!(matches!(GateDecision::Pending.into_result(), Err(AppError::SessionPending)));
        assert!(matches!(
            GateDecision::Denied(DenialReason::InsufficientPrivilege).into_result(),
            Err(AppError::InsufficientPrivilege)
        ));
    }
}
