// src/models/finance.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::validation::{validate_not_blank, validate_money};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "revenue_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RevenueType {
    Admin,     // Taxa de administração
    Location,  // Aluguel
    Insurance, // Seguro
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Paid,
}

impl ExpenseStatus {
    pub fn toggled(self) -> Self {
        match self {
            ExpenseStatus::Pending => ExpenseStatus::Paid,
            ExpenseStatus::Paid => ExpenseStatus::Pending,
        }
    }
}

// Filtro opcional de competência (?month=3&year=2025)
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodFilter {
    pub month: Option<i32>,
    pub year: Option<i32>,
}

impl PeriodFilter {
    pub fn matches(&self, month: i32, year: i32) -> bool {
        self.month.is_none_or(|m| m == month) && self.year.is_none_or(|y| y == year)
    }
}

// =========================================================================
//  RECEITAS
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueFields {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub contract_id: Uuid,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: RevenueType,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "1000.00")]
    pub value: Decimal,

    #[validate(range(min = 1, max = 12, message = "O mês deve estar entre 1 e 12."))]
    #[schema(example = 3)]
    pub month: i32,

    #[validate(range(min = 1900, max = 2999, message = "Ano inválido."))]
    #[schema(example = 2025)]
    pub year: i32,
}

// Lançamento de receita. Só existe criação e remoção.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: Uuid,
    pub user_id: Uuid,

    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: RevenueFields,

    pub created_at: DateTime<Utc>,
}

pub const REMOVED_CONTRACT_LABEL: &str = "Contrato removido";

// Receita com o nome do contrato resolvido (referência fraca)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueEntry {
    #[serde(flatten)]
    pub revenue: Revenue,

    pub contract_name: Option<String>,

    #[schema(example = "Apto 101 - Ed. Solar")]
    pub contract_label: String,
}

impl RevenueEntry {
    pub fn new(revenue: Revenue, contract_name: Option<String>) -> Self {
        let contract_label = contract_name
            .clone()
            .unwrap_or_else(|| REMOVED_CONTRACT_LABEL.to_string());
        Self {
            revenue,
            contract_name,
            contract_label,
        }
    }
}

// =========================================================================
//  DESPESAS
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFields {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Conta de luz - escritório")]
    pub description: String,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "400.00")]
    pub value: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-15")]
    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: ExpenseStatus,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Banco do Brasil")]
    pub bank: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Boleto")]
    pub payment_method: String,
}

// Alteração parcial. `month`/`year` só mudam se `due_date` vier preenchido.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseChanges {
    #[validate(custom(function = "validate_not_blank"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_money"))]
    pub value: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    pub status: Option<ExpenseStatus>,

    #[validate(custom(function = "validate_not_blank"))]
    pub bank: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    pub payment_method: Option<String>,
}

// Competência derivada do vencimento no momento da escrita
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Competence {
    pub month: i32,
    pub year: i32,
}

impl Competence {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month() as i32,
            year: date.year(),
        }
    }
}

// O que o repositório recebe num update de despesa
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseUpdate {
    pub changes: ExpenseChanges,
    pub competence: Option<Competence>,
}

impl From<ExpenseChanges> for ExpenseUpdate {
    fn from(changes: ExpenseChanges) -> Self {
        let competence = changes.due_date.map(Competence::of);
        Self { changes, competence }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,

    pub description: String,

    #[schema(example = "400.00")]
    pub value: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-15")]
    pub due_date: NaiveDate,

    pub status: ExpenseStatus,
    pub bank: String,
    pub payment_method: String,

    // Snapshot gravado a partir de due_date; não é recalculado na leitura
    pub month: i32,
    pub year: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn from_fields(id: Uuid, user_id: Uuid, fields: ExpenseFields, now: DateTime<Utc>) -> Self {
        let competence = Competence::of(fields.due_date);
        Self {
            id,
            user_id,
            description: fields.description,
            value: fields.value,
            due_date: fields.due_date,
            status: fields.status,
            bank: fields.bank,
            payment_method: fields.payment_method,
            month: competence.month,
            year: competence.year,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: &ExpenseUpdate, now: DateTime<Utc>) {
        let changes = &update.changes;
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(value) = changes.value {
            self.value = value;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(bank) = &changes.bank {
            self.bank = bank.clone();
        }
        if let Some(payment_method) = &changes.payment_method {
            self.payment_method = payment_method.clone();
        }
        if let Some(competence) = update.competence {
            self.month = competence.month;
            self.year = competence.year;
        }
        self.updated_at = now;
    }
}
