// src/services/revenue_service.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::bounded, error::AppError},
    db::RecordStore,
    models::finance::{PeriodFilter, Revenue, RevenueEntry, RevenueFields},
};

#[derive(Clone)]
pub struct RevenueService {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl RevenueService {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Receitas com o nome do contrato. Contrato removido vira "Contrato removido".
    pub async fn list(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<RevenueEntry>, AppError> {
        let revenues = self.list_raw(actor, filter).await?;
        let contracts = bounded(self.timeout, self.store.list_contracts(actor)).await?;

        let names: HashMap<Uuid, String> = contracts
            .into_iter()
            .map(|c| (c.id, c.fields.name))
            .collect();

        Ok(revenues
            .into_iter()
            .map(|revenue| {
                let name = names.get(&revenue.fields.contract_id).cloned();
                RevenueEntry::new(revenue, name)
            })
            .collect())
    }

    pub async fn list_raw(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Revenue>, AppError> {
        bounded(self.timeout, self.store.list_revenues(actor, filter)).await
    }

    /// O contrato precisa existir (e ser visível) no momento da criação.
    pub async fn create(&self, actor: Uuid, fields: &RevenueFields) -> Result<Revenue, AppError> {
        fields.validate()?;

        bounded(self.timeout, self.store.find_contract(actor, fields.contract_id))
            .await?
            .ok_or(AppError::ContractNotFound)?;

        let revenue = bounded(self.timeout, self.store.insert_revenue(actor, fields)).await?;
        tracing::info!(
            "💰 Receita lançada: {} ({:?} {}/{})",
            revenue.id,
            revenue.fields.kind,
            revenue.fields.month,
            revenue.fields.year
        );
        Ok(revenue)
    }

    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), AppError> {
        let deleted = bounded(self.timeout, self.store.delete_revenue(actor, id)).await?;
        if !deleted {
            return Err(AppError::NotFound("revenue"));
        }
        tracing::info!("🗑️ Receita removida: {}", id);
        Ok(())
    }
}
