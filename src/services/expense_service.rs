// src/services/expense_service.rs

use std::{sync::Arc, time::Duration};

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::bounded, error::AppError},
    db::RecordStore,
    models::finance::{Expense, ExpenseChanges, ExpenseFields, ExpenseUpdate, PeriodFilter},
};

#[derive(Clone)]
pub struct ExpenseService {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn list(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Expense>, AppError> {
        bounded(self.timeout, self.store.list_expenses(actor, filter)).await
    }

    pub async fn get(&self, actor: Uuid, id: Uuid) -> Result<Expense, AppError> {
        bounded(self.timeout, self.store.find_expense(actor, id))
            .await?
            .ok_or(AppError::NotFound("expense"))
    }

    pub async fn create(&self, actor: Uuid, fields: &ExpenseFields) -> Result<Expense, AppError> {
        fields.validate()?;

        let expense = bounded(self.timeout, self.store.insert_expense(actor, fields)).await?;
        tracing::info!(
            "🧾 Despesa criada: {} (competência {}/{})",
            expense.id,
            expense.month,
            expense.year
        );
        Ok(expense)
    }

    /// Atualização parcial; a competência só muda com novo vencimento.
    pub async fn update(&self, actor: Uuid, id: Uuid, changes: ExpenseChanges) -> Result<Expense, AppError> {
        changes.validate()?;

        let update = ExpenseUpdate::from(changes);
        let expense = bounded(self.timeout, self.store.update_expense(actor, id, &update))
            .await?
            .ok_or(AppError::NotFound("expense"))?;
        tracing::info!("🧾 Despesa atualizada: {}", expense.id);
        Ok(expense)
    }

    pub async fn toggle_status(&self, actor: Uuid, id: Uuid) -> Result<Expense, AppError> {
        let expense = bounded(self.timeout, self.store.toggle_expense_status(actor, id))
            .await?
            .ok_or(AppError::NotFound("expense"))?;
        tracing::info!("🧾 Despesa {} agora está {:?}", expense.id, expense.status);
        Ok(expense)
    }

    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), AppError> {
        let deleted = bounded(self.timeout, self.store.delete_expense(actor, id)).await?;
        if !deleted {
            return Err(AppError::NotFound("expense"));
        }
        tracing::info!("🗑️ Despesa removida: {}", id);
        Ok(())
    }
}
