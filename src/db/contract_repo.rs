// src/db/contract_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_store_error, rls_transaction}, error::AppError},
    db::PgStore,
    models::contract::{Contract, ContractFields, LeasePeriod, Party, Property},
};

#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Contratos visíveis para `actor`, mais recentes primeiro.
    async fn list_contracts(&self, actor: Uuid) -> Result<Vec<Contract>, AppError>;

    async fn find_contract(&self, actor: Uuid, id: Uuid) -> Result<Option<Contract>, AppError>;

    async fn insert_contract(&self, actor: Uuid, fields: &ContractFields) -> Result<Contract, AppError>;

    /// `None` quando o contrato não existe ou não é visível.
    async fn update_contract(
        &self,
        actor: Uuid,
        id: Uuid,
        fields: &ContractFields,
    ) -> Result<Option<Contract>, AppError>;

    async fn delete_contract(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError>;
}

// Linha "achatada" da tabela `contracts`
#[derive(Debug, FromRow)]
struct ContractRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    owner_name: String,
    owner_document: String,
    tenant_name: String,
    tenant_document: String,
    property_address: String,
    property_iptu: String,
    property_due_day: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rent_value: Decimal,
    iptu_value: Decimal,
    admin_fee_percentage: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Contract {
            id: row.id,
            user_id: row.user_id,
            fields: ContractFields {
                name: row.name,
                owner: Party {
                    name: row.owner_name,
                    document: row.owner_document,
                },
                tenant: Party {
                    name: row.tenant_name,
                    document: row.tenant_document,
                },
                property: Property {
                    address: row.property_address,
                    iptu: row.property_iptu,
                    due_day: row.property_due_day,
                },
                period: LeasePeriod {
                    start_date: row.start_date,
                    end_date: row.end_date,
                },
                rent_value: row.rent_value,
                iptu_value: row.iptu_value,
                admin_fee_percentage: row.admin_fee_percentage,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CONTRACT_COLUMNS: &str = r#"
    id, user_id, name,
    owner_name, owner_document, tenant_name, tenant_document,
    property_address, property_iptu, property_due_day,
    start_date, end_date,
    rent_value, iptu_value, admin_fee_percentage,
    created_at, updated_at
"#;

#[async_trait]
impl ContractRepository for PgStore {
    async fn list_contracts(&self, actor: Uuid) -> Result<Vec<Contract>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        // A policy RLS já filtra: dono OU admin
        let sql = format!("SELECT {} FROM contracts ORDER BY created_at DESC", CONTRACT_COLUMNS);
        let rows = sqlx::query_as::<_, ContractRow>(&sql)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rows.into_iter().map(Contract::from).collect())
    }

    async fn find_contract(&self, actor: Uuid, id: Uuid) -> Result<Option<Contract>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!("SELECT {} FROM contracts WHERE id = $1", CONTRACT_COLUMNS);
        let row = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.map(Contract::from))
    }

    async fn insert_contract(&self, actor: Uuid, fields: &ContractFields) -> Result<Contract, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        let sql = format!(
            r#"
            INSERT INTO contracts (
                user_id, name,
                owner_name, owner_document, tenant_name, tenant_document,
                property_address, property_iptu, property_due_day,
                start_date, end_date,
                rent_value, iptu_value, admin_fee_percentage
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            CONTRACT_COLUMNS
        );
        let row = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(actor)
            .bind(&fields.name)
            .bind(&fields.owner.name)
            .bind(&fields.owner.document)
            .bind(&fields.tenant.name)
            .bind(&fields.tenant.document)
            .bind(&fields.property.address)
            .bind(&fields.property.iptu)
            .bind(fields.property.due_day)
            .bind(fields.period.start_date)
            .bind(fields.period.end_date)
            .bind(fields.rent_value)
            .bind(fields.iptu_value)
            .bind(fields.admin_fee_percentage)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn update_contract(
        &self,
        actor: Uuid,
        id: Uuid,
        fields: &ContractFields,
    ) -> Result<Option<Contract>, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        // O dono (user_id) nunca muda num update
        let sql = format!(
            r#"
            UPDATE contracts SET
                name = $2,
                owner_name = $3, owner_document = $4,
                tenant_name = $5, tenant_document = $6,
                property_address = $7, property_iptu = $8, property_due_day = $9,
                start_date = $10, end_date = $11,
                rent_value = $12, iptu_value = $13, admin_fee_percentage = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CONTRACT_COLUMNS
        );
        let row = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.owner.name)
            .bind(&fields.owner.document)
            .bind(&fields.tenant.name)
            .bind(&fields.tenant.document)
            .bind(&fields.property.address)
            .bind(&fields.property.iptu)
            .bind(fields.property.due_day)
            .bind(fields.period.start_date)
            .bind(fields.period.end_date)
            .bind(fields.rent_value)
            .bind(fields.iptu_value)
            .bind(fields.admin_fee_percentage)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(row.map(Contract::from))
    }

    async fn delete_contract(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = rls_transaction(self.pool(), actor).await?;

        // Receitas que apontam para o contrato continuam existindo
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
