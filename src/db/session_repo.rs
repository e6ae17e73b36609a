// src/db/session_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{common::{db_utils::map_store_error, error::AppError}, db::PgStore, models::auth::SessionRecord};

// Sessões do lado do servidor; o JWT carrega o id da sessão (`sid`).
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<SessionRecord, AppError>;

    async fn find_session(&self, id: Uuid) -> Result<Option<SessionRecord>, AppError>;

    /// `false` se a sessão não existia ou já estava revogada.
    async fn revoke_session(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
impl SessionRepository for PgStore {
    async fn create_session(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<SessionRecord, AppError> {
        sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO sessions (user_id, expires_at)
            VALUES ($1, $2)
            RETURNING id, user_id, created_at, expires_at, revoked_at
            "#,
        )
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_store_error)
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<SessionRecord>, AppError> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, created_at, expires_at, revoked_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(session)
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
