// src/models/contract.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::validation::{validate_not_blank, validate_money, validate_percentage};

// ---
// Partes do contrato (proprietário e inquilino)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Carlos Pereira")]
    pub name: String,

    // CPF ou CNPJ, guardado como digitado
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "123.456.789-00")]
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: String,

    // Inscrição imobiliária do IPTU
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "000.123.4567-8")]
    pub iptu: String,

    #[validate(range(min = 1, max = 31, message = "O dia de vencimento deve estar entre 1 e 31."))]
    #[schema(example = 10)]
    pub due_day: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_period_order"))]
pub struct LeasePeriod {
    #[schema(value_type = String, format = Date, example = "2025-01-01")]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2026-12-31")]
    pub end_date: NaiveDate,
}

fn validate_period_order(period: &LeasePeriod) -> Result<(), ValidationError> {
    if period.end_date < period.start_date {
        let mut err = ValidationError::new("period_order");
        err.message = Some("A data final deve ser posterior à data inicial.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Campos editáveis de um contrato (entrada de create/update)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractFields {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Apto 101 - Ed. Solar")]
    pub name: String,

    #[validate(nested)]
    pub owner: Party,

    #[validate(nested)]
    pub tenant: Party,

    #[validate(nested)]
    pub property: Property,

    #[validate(nested)]
    pub period: LeasePeriod,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "2500.00")]
    pub rent_value: Decimal,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "180.00")]
    pub iptu_value: Decimal,

    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "10.00")]
    pub admin_fee_percentage: Decimal,
}

// Contrato de locação persistido
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,

    // Identidade dona do registro
    pub user_id: Uuid,

    #[serde(flatten)]
    pub fields: ContractFields,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
