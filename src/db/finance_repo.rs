// src/db/finance_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_store_error, rls_transaction}, error::AppError},
    db::PgStore,
    models::finance::{
        Competence, Expense, ExpenseFields, ExpenseUpdate, PeriodFilter, Revenue, RevenueFields,
    },
};

// =========================================================================
//  RECEITAS
// =========================================================================

#[async_trait]
pub trait RevenueRepository: Send + Sync {
    async fn list_revenues(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Revenue>, AppError>;

    async fn insert_revenue(&self, actor: Uuid, fields: &RevenueFields) -> Result<Revenue, AppError>;

    async fn delete_revenue(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError>;
}

const REVENUE_COLUMNS: &str = "id, user_id, contract_id, type, value, month, year, created_at";

#[async_trait]
impl RevenueRepository for PgStore {
    async fn list_revenues(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Revenue>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!(
            r#"
            SELECT {} FROM revenues
            WHERE ($1::int IS NULL OR month = $1)
              AND ($2::int IS NULL OR year = $2)
            ORDER BY created_at DESC
            "#,
            REVENUE_COLUMNS
        );
        let revenues = sqlx::query_as::<_, Revenue>(&sql)
            .bind(filter.month)
            .bind(filter.year)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(revenues)
    }

    async fn insert_revenue(&self, actor: Uuid, fields: &RevenueFields) -> Result<Revenue, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!(
            r#"
            INSERT INTO revenues (user_id, contract_id, type, value, month, year)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            REVENUE_COLUMNS
        );
        let revenue = sqlx::query_as::<_, Revenue>(&sql)
            .bind(actor)
            .bind(fields.contract_id)
            .bind(fields.kind)
            .bind(fields.value)
            .bind(fields.month)
            .bind(fields.year)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(revenue)
    }

    async fn delete_revenue(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let result = sqlx::query("DELETE FROM revenues WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

// =========================================================================
//  DESPESAS
// =========================================================================

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn list_expenses(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Expense>, AppError>;

    async fn find_expense(&self, actor: Uuid, id: Uuid) -> Result<Option<Expense>, AppError>;

    /// Grava a competência (month/year) a partir do vencimento.
    async fn insert_expense(&self, actor: Uuid, fields: &ExpenseFields) -> Result<Expense, AppError>;

    async fn update_expense(
        &self,
        actor: Uuid,
        id: Uuid,
        update: &ExpenseUpdate,
    ) -> Result<Option<Expense>, AppError>;

    /// pending <-> paid
    async fn toggle_expense_status(&self, actor: Uuid, id: Uuid) -> Result<Option<Expense>, AppError>;

    async fn delete_expense(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError>;
}

const EXPENSE_COLUMNS: &str = r#"
    id, user_id, description, value, due_date, status,
    bank, payment_method, month, year, created_at, updated_at
"#;

#[async_trait]
impl ExpenseRepository for PgStore {
    async fn list_expenses(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Expense>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!(
            r#"
            SELECT {} FROM expenses
            WHERE ($1::int IS NULL OR month = $1)
              AND ($2::int IS NULL OR year = $2)
            ORDER BY created_at DESC
            "#,
            EXPENSE_COLUMNS
        );
        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .bind(filter.month)
            .bind(filter.year)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(expenses)
    }

    async fn find_expense(&self, actor: Uuid, id: Uuid) -> Result<Option<Expense>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!("SELECT {} FROM expenses WHERE id = $1", EXPENSE_COLUMNS);
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(expense)
    }

    async fn insert_expense(&self, actor: Uuid, fields: &ExpenseFields) -> Result<Expense, AppError> {
        let competence = Competence::of(fields.due_date);
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!(
            r#"
            INSERT INTO expenses (
                user_id, description, value, due_date, status,
                bank, payment_method, month, year
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(actor)
            .bind(&fields.description)
            .bind(fields.value)
            .bind(fields.due_date)
            .bind(fields.status)
            .bind(&fields.bank)
            .bind(&fields.payment_method)
            .bind(competence.month)
            .bind(competence.year)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(expense)
    }

    async fn update_expense(
        &self,
        actor: Uuid,
        id: Uuid,
        update: &ExpenseUpdate,
    ) -> Result<Option<Expense>, AppError> {
        let changes = &update.changes;
        let mut tx = rls_transaction(self.pool(), actor).await?;

        // COALESCE: campo ausente mantém o valor atual
        let sql = format!(
            r#"
            UPDATE expenses SET
                description = COALESCE($2, description),
                value = COALESCE($3, value),
                due_date = COALESCE($4, due_date),
                status = COALESCE($5, status),
                bank = COALESCE($6, bank),
                payment_method = COALESCE($7, payment_method),
                month = COALESCE($8, month),
                year = COALESCE($9, year),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .bind(changes.description.as_deref())
            .bind(changes.value)
            .bind(changes.due_date)
            .bind(changes.status)
            .bind(changes.bank.as_deref())
            .bind(changes.payment_method.as_deref())
            .bind(update.competence.map(|c| c.month))
            .bind(update.competence.map(|c| c.year))
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(expense)
    }

    async fn toggle_expense_status(&self, actor: Uuid, id: Uuid) -> Result<Option<Expense>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!(
            r#"
            UPDATE expenses SET
                status = CASE WHEN status = 'paid' THEN 'pending'::expense_status
                              ELSE 'paid'::expense_status END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(expense)
    }

    async fn delete_expense(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
