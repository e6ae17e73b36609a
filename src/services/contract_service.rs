// src/services/contract_service.rs

use std::{sync::Arc, time::Duration};

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::bounded, error::AppError},
    db::RecordStore,
    models::contract::{Contract, ContractFields},
};

#[derive(Clone)]
pub struct ContractService {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl ContractService {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn list(&self, actor: Uuid) -> Result<Vec<Contract>, AppError> {
        bounded(self.timeout, self.store.list_contracts(actor)).await
    }

    pub async fn get(&self, actor: Uuid, id: Uuid) -> Result<Contract, AppError> {
        bounded(self.timeout, self.store.find_contract(actor, id))
            .await?
            .ok_or(AppError::NotFound("contract"))
    }

    pub async fn create(&self, actor: Uuid, fields: &ContractFields) -> Result<Contract, AppError> {
        fields.validate()?;

        let contract = bounded(self.timeout, self.store.insert_contract(actor, fields)).await?;
        tracing::info!("📄 Contrato criado: {} ({})", contract.id, contract.fields.name);
        Ok(contract)
    }

    pub async fn update(&self, actor: Uuid, id: Uuid, fields: &ContractFields) -> Result<Contract, AppError> {
        fields.validate()?;

        let contract = bounded(self.timeout, self.store.update_contract(actor, id, fields))
            .await?
            .ok_or(AppError::NotFound("contract"))?;
        tracing::info!("📄 Contrato atualizado: {}", contract.id);
        Ok(contract)
    }

    /// Não remove as receitas ligadas ao contrato.
    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), AppError> {
        let deleted = bounded(self.timeout, self.store.delete_contract(actor, id)).await?;
        if !deleted {
            return Err(AppError::NotFound("contract"));
        }
        tracing::info!("🗑️ Contrato removido: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{IdentityRepository, MemoryStore},
        models::contract::fixtures::contract_fields,
    };

    async fn setup() -> (ContractService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let actor = store
            .insert_identity("ana@imobras.com.br", "hash", "Ana")
            .await
            .unwrap()
            .id;
        (ContractService::new(store, Duration::from_secs(5)), actor)
    }

    #[tokio::test]
    async fn create_list_delete() {
        let (service, actor) = setup().await;

        let contract = service.create(actor, &contract_fields("Apto 101")).await.unwrap();
        assert!(service.list(actor).await.unwrap().iter().any(|c| c.id == contract.id));

        service.delete(actor, contract.id).await.unwrap();
        assert!(service.list(actor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected() {
        let (service, actor) = setup().await;
        let mut fields = contract_fields("Apto 101");
        fields.rent_value = rust_decimal::Decimal::new(-1, 0);

        let err = service.create(actor, &fields).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(service.list(actor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_contract_is_not_found() {
        let (service, actor) = setup().await;
        let err = service
            .update(actor, Uuid::new_v4(), &contract_fields("Apto 101"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_keeps_owner() {
        let (service, actor) = setup().await;
        let contract = service.create(actor, &contract_fields("Apto 101")).await.unwrap();

        let updated = service
            .update(actor, contract.id, &contract_fields("Apto 102"))
            .await
            .unwrap();
        assert_eq!(updated.user_id, actor);
        assert_eq!(updated.fields.name, "Apto 102");
    }
}
