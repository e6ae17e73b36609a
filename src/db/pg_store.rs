// src/db/pg_store.rs

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{common::error::AppError, db::policy::Actor};

// Backend Postgres. Cada chamada com identidade roda numa transação RLS
// (ver `common::db_utils::rls_transaction`); as implementações dos
// repositórios ficam nos arquivos `*_repo.rs`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Conecta e aplica as migrações embutidas.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&pool).await?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Ok(Self::new(pool))
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Resolve o papel da identidade dentro da transação corrente.
    pub(crate) async fn actor_in(
        tx: &mut Transaction<'static, Postgres>,
        actor: Uuid,
    ) -> Result<Actor, AppError> {
        let is_admin: bool = sqlx::query_scalar("SELECT has_role($1, 'admin')")
            .bind(actor)
            .fetch_one(&mut **tx)
            .await?;

        Ok(Actor { id: actor, is_admin })
    }
}
