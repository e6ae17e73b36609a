// src/db/user_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_store_error, rls_transaction}, error::AppError},
    db::PgStore,
    models::auth::Identity,
};

// Tabela `users`: identidade + hash da senha.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    // Busca um usuário pelo seu e-mail (uso interno da autenticação)
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, AppError>;

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, AppError>;

    /// Falha com `EmailAlreadyExists` se o e-mail já estiver cadastrado.
    async fn insert_identity(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<Identity, AppError>;

    async fn update_display_name(
        &self,
        id: Uuid,
        full_name: &str,
    ) -> Result<Option<Identity>, AppError>;

    /// Admin vê todas as identidades; usuário comum só a própria.
    async fn list_identities(&self, actor: Uuid) -> Result<Vec<Identity>, AppError>;

    /// Exclusivo de admin. Remove também papéis e sessões da identidade.
    async fn delete_identity(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError>;
}

const IDENTITY_COLUMNS: &str = "id, email, full_name, password_hash, created_at, updated_at";

#[async_trait]
impl IdentityRepository for PgStore {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", IDENTITY_COLUMNS);
        let maybe_user = sqlx::query_as::<_, Identity>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(maybe_user)
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", IDENTITY_COLUMNS);
        let maybe_user = sqlx::query_as::<_, Identity>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(maybe_user)
    }

    async fn insert_identity(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<Identity, AppError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, full_name) VALUES ($1, $2, $3) RETURNING {}",
            IDENTITY_COLUMNS
        );
        sqlx::query_as::<_, Identity>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(full_name)
            .fetch_one(self.pool())
            .await
            .map_err(map_store_error)
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        full_name: &str,
    ) -> Result<Option<Identity>, AppError> {
        let sql = format!(
            "UPDATE users SET full_name = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            IDENTITY_COLUMNS
        );
        let user = sqlx::query_as::<_, Identity>(&sql)
            .bind(id)
            .bind(full_name)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn list_identities(&self, actor: Uuid) -> Result<Vec<Identity>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;
        let caller = PgStore::actor_in(&mut tx, actor).await?;

        let sql = format!(
            "SELECT {} FROM users WHERE $1 OR id = $2 ORDER BY created_at DESC",
            IDENTITY_COLUMNS
        );
        let users = sqlx::query_as::<_, Identity>(&sql)
            .bind(caller.is_admin)
            .bind(actor)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(users)
    }

    async fn delete_identity(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;
        PgStore::actor_in(&mut tx, actor).await?.require_admin()?;

        // user_roles e sessions caem por ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
