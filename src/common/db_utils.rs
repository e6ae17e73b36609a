use std::{future::Future, time::Duration};

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;

// Papel sem privilégios de dono: as policies RLS valem para ele.
const SET_APP_ROLE: &str = "SET LOCAL ROLE imobras_app";

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação já "assinada" pela identidade: troca para o papel da
/// aplicação e define `app.user_id`, lido pelas policies RLS.
/// As configurações são locais à transação (`set_config(..., true)`).
pub(crate) async fn rls_transaction(
    pool: &PgPool,
    actor: Uuid,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(SET_APP_ROLE)
        .execute(&mut *tx)
        .await?;

    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(actor.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

/// Transação do próprio sistema (ex.: papel inicial no cadastro). Continua
/// sujeita às policies, que aceitam `app.system = 'on'`.
pub(crate) async fn system_transaction(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(SET_APP_ROLE)
        .execute(&mut *tx)
        .await?;

    sqlx::query("SELECT set_config('app.system', 'on', true)")
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

// 42501 = insufficient_privilege (inclui "new row violates row-level security policy")
pub(crate) fn map_store_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            Some("42501") => return AppError::PermissionDenied,
            // numeric_value_out_of_range
            Some("22003") => return AppError::ValueOutOfRange,
            _ => {}
        }
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return AppError::EmailAlreadyExists;
        }
        // Papel ou sessão apontando para usuário inexistente
        if db_err.is_foreign_key_violation() {
            return AppError::UserNotFound;
        }
    }
    e.into()
}

/// Limita o tempo de espera de uma chamada ao armazenamento.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("⏱️ Chamada ao armazenamento excedeu {:?}", limit);
            Err(AppError::StoreTimeout)
        }
    }
}
