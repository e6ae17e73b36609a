// src/db/rbac_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_store_error, rls_transaction, system_transaction}, error::AppError},
    db::PgStore,
    models::rbac::{AppRole, RoleAssignment},
};

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Papéis de uma identidade, sem filtro de visibilidade (resolução interna).
    async fn roles_of(&self, identity_id: Uuid) -> Result<Vec<RoleAssignment>, AppError>;

    /// Admin vê todas as atribuições; usuário comum só as próprias.
    async fn list_role_assignments(&self, actor: Uuid) -> Result<Vec<RoleAssignment>, AppError>;

    /// União: se a identidade já tem o papel, devolve a linha existente.
    async fn grant_role(&self, actor: Uuid, identity_id: Uuid, role: AppRole) -> Result<RoleAssignment, AppError>;

    /// Diferença: remove todas as linhas (identity, role). Devolve quantas saíram.
    async fn revoke_role(&self, actor: Uuid, identity_id: Uuid, role: AppRole) -> Result<u64, AppError>;

    /// Papel inicial atribuído pelo próprio sistema (cadastro, convite).
    async fn assign_initial_role(&self, identity_id: Uuid, role: AppRole) -> Result<RoleAssignment, AppError>;
}

#[async_trait]
impl RoleRepository for PgStore {
    async fn roles_of(&self, identity_id: Uuid) -> Result<Vec<RoleAssignment>, AppError> {
        let roles = sqlx::query_as::<_, RoleAssignment>(
            r#"
            SELECT id, user_id, role, created_at
            FROM user_roles
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(identity_id)
        .fetch_all(self.pool())
        .await?;

        Ok(roles)
    }

    async fn list_role_assignments(&self, actor: Uuid) -> Result<Vec<RoleAssignment>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let roles = sqlx::query_as::<_, RoleAssignment>(
            "SELECT id, user_id, role, created_at FROM user_roles ORDER BY created_at DESC",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(roles)
    }

    async fn grant_role(&self, actor: Uuid, identity_id: Uuid, role: AppRole) -> Result<RoleAssignment, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;
        PgStore::actor_in(&mut tx, actor).await?.require_admin()?;

        // 1. Já tem? Então não duplica
        let existing = sqlx::query_as::<_, RoleAssignment>(
            r#"
            SELECT id, user_id, role, created_at
            FROM user_roles
            WHERE user_id = $1 AND role = $2
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(identity_id)
        .bind(role)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(assignment) = existing {
            tx.commit().await?;
            return Ok(assignment);
        }

        // 2. Insere a nova atribuição
        let assignment = sqlx::query_as::<_, RoleAssignment>(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            RETURNING id, user_id, role, created_at
            "#,
        )
        .bind(identity_id)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(assignment)
    }

    async fn revoke_role(&self, actor: Uuid, identity_id: Uuid, role: AppRole) -> Result<u64, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;
        PgStore::actor_in(&mut tx, actor).await?.require_admin()?;

        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(identity_id)
            .bind(role)
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn assign_initial_role(&self, identity_id: Uuid, role: AppRole) -> Result<RoleAssignment, AppError> {
        let mut tx = system_transaction(self.pool()).await?;

        let assignment = sqlx::query_as::<_, RoleAssignment>(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            RETURNING id, user_id, role, created_at
            "#,
        )
        .bind(identity_id)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(assignment)
    }
}
