// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::finance::{ExpenseStatus, RevenueType};

// ?month=3&year=2025
#[derive(Debug, Clone, Copy, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    #[validate(range(min = 1, max = 12, message = "O mês deve estar entre 1 e 12."))]
    pub month: i32,
    pub year: i32,
}

// ?year=2025
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    pub year: i32,
}

// 1. Resumo do Mês (Os Cards do Topo)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: i32,
    pub year: i32,
    pub contract_count: usize,      // Contratos visíveis para a identidade
    pub total_revenue: Decimal,
    pub total_expense: Decimal,
    pub paid_expense: Decimal,
    pub pending_expense: Decimal,
    pub net_profit: Decimal,        // Receitas - Despesas
}

// 2. Uma barra do gráfico anual
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub month: i32,
    pub revenue: Decimal,
    pub expense: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTypeTotal {
    #[serde(rename = "type")]
    pub kind: RevenueType,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStatusTotal {
    pub status: ExpenseStatus,
    pub total: Decimal,
}

// 3. Visão Anual (gráficos de barra e pizza)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YearlySummary {
    pub year: i32,
    pub months: Vec<MonthlyBreakdown>, // Sempre 12 entradas, jan..dez
    pub total_revenue: Decimal,
    pub total_expense: Decimal,
    pub total_profit: Decimal,
    pub revenue_by_type: Vec<RevenueTypeTotal>,
    pub expense_by_status: Vec<ExpenseStatusTotal>,
}
