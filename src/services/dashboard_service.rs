// src/services/dashboard_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{
            ExpenseStatusTotal, MonthQuery, MonthlyBreakdown, MonthlySummary, RevenueTypeTotal,
            YearQuery, YearlySummary,
        },
        finance::{Expense, ExpenseStatus, PeriodFilter, Revenue, RevenueType},
    },
    services::{
        contract_service::ContractService, expense_service::ExpenseService,
        revenue_service::RevenueService,
    },
};

const REVENUE_TYPES: [RevenueType; 3] = [RevenueType::Admin, RevenueType::Location, RevenueType::Insurance];
const EXPENSE_STATUSES: [ExpenseStatus; 2] = [ExpenseStatus::Pending, ExpenseStatus::Paid];

// Nada é guardado: cada chamada recalcula a partir das listagens.
#[derive(Clone)]
pub struct DashboardService {
    contracts: ContractService,
    revenues: RevenueService,
    expenses: ExpenseService,
}

impl DashboardService {
    pub fn new(contracts: ContractService, revenues: RevenueService, expenses: ExpenseService) -> Self {
        Self {
            contracts,
            revenues,
            expenses,
        }
    }

    pub async fn get_summary(&self, actor: Uuid, query: MonthQuery) -> Result<MonthlySummary, AppError> {
        query.validate()?;

        let filter = PeriodFilter {
            month: Some(query.month),
            year: Some(query.year),
        };
        let contract_count = self.contracts.list(actor).await?.len();
        let revenues = self.revenues.list_raw(actor, filter).await?;
        let expenses = self.expenses.list(actor, filter).await?;

        Ok(summarize_month(contract_count, &revenues, &expenses, query.month, query.year))
    }

    pub async fn get_yearly(&self, actor: Uuid, query: YearQuery) -> Result<YearlySummary, AppError> {
        let filter = PeriodFilter {
            month: None,
            year: Some(query.year),
        };
        let revenues = self.revenues.list_raw(actor, filter).await?;
        let expenses = self.expenses.list(actor, filter).await?;

        Ok(summarize_year(&revenues, &expenses, query.year))
    }
}

// `Sum` de Decimal entra em pânico no overflow; aqui o total satura.
fn money_total(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

fn revenue_total<'a>(revenues: impl Iterator<Item = &'a Revenue>) -> Decimal {
    money_total(revenues.map(|r| r.fields.value))
}

fn expense_total<'a>(expenses: impl Iterator<Item = &'a Expense>) -> Decimal {
    money_total(expenses.map(|e| e.value))
}

/// Cards do mês. Usa a competência gravada (month/year), não o vencimento.
pub fn summarize_month(
    contract_count: usize,
    revenues: &[Revenue],
    expenses: &[Expense],
    month: i32,
    year: i32,
) -> MonthlySummary {
    let revenues_in = || {
        revenues
            .iter()
            .filter(move |r| r.fields.month == month && r.fields.year == year)
    };
    let expenses_in = || {
        expenses
            .iter()
            .filter(move |e| e.month == month && e.year == year)
    };

    let total_revenue = revenue_total(revenues_in());
    let total_expense = expense_total(expenses_in());
    let paid_expense = expense_total(expenses_in().filter(|e| e.status == ExpenseStatus::Paid));
    let pending_expense = expense_total(expenses_in().filter(|e| e.status == ExpenseStatus::Pending));

    MonthlySummary {
        month,
        year,
        contract_count,
        total_revenue,
        total_expense,
        paid_expense,
        pending_expense,
        net_profit: total_revenue.saturating_sub(total_expense),
    }
}

/// Gráficos do ano: 12 meses, receita por tipo e despesa por status.
pub fn summarize_year(revenues: &[Revenue], expenses: &[Expense], year: i32) -> YearlySummary {
    let revenues: Vec<&Revenue> = revenues.iter().filter(|r| r.fields.year == year).collect();
    let expenses: Vec<&Expense> = expenses.iter().filter(|e| e.year == year).collect();

    let months: Vec<MonthlyBreakdown> = (1..=12)
        .map(|month| {
            let revenue = revenue_total(revenues.iter().copied().filter(|r| r.fields.month == month));
            let expense = expense_total(expenses.iter().copied().filter(|e| e.month == month));
            MonthlyBreakdown {
                month,
                revenue,
                expense,
                profit: revenue.saturating_sub(expense),
            }
        })
        .collect();

    let revenue_by_type = REVENUE_TYPES
        .iter()
        .map(|kind| RevenueTypeTotal {
            kind: *kind,
            total: revenue_total(revenues.iter().copied().filter(|r| r.fields.kind == *kind)),
        })
        .collect();

    let expense_by_status = EXPENSE_STATUSES
        .iter()
        .map(|status| ExpenseStatusTotal {
            status: *status,
            total: expense_total(expenses.iter().copied().filter(|e| e.status == *status)),
        })
        .collect();

    let total_revenue = revenue_total(revenues.iter().copied());
    let total_expense = expense_total(expenses.iter().copied());

    YearlySummary {
        year,
        months,
        total_revenue,
        total_expense,
        total_profit: total_revenue.saturating_sub(total_expense),
        revenue_by_type,
        expense_by_status,
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use chrono::Utc;

    use super::*;
    use crate::{
        db::{IdentityRepository, MemoryStore},
        models::{
            contract::fixtures::contract_fields,
            finance::fixtures::{expense_fields, revenue_fields},
        },
    };

    fn revenue(kind: RevenueType, cents: i64, month: i32, year: i32) -> Revenue {
        Revenue {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            fields: revenue_fields(Uuid::new_v4(), kind, cents, month, year),
            created_at: Utc::now(),
        }
    }

    fn expense(cents: i64, due: (i32, u32, u32), status: ExpenseStatus) -> Expense {
        Expense::from_fields(
            Uuid::new_v4(),
            Uuid::new_v4(),
            expense_fields("Conta", cents, due, status),
            Utc::now(),
        )
    }

    #[test]
    fn march_scenario_adds_up() {
        let revenues = vec![
            revenue(RevenueType::Location, 100000, 3, 2025),
            revenue(RevenueType::Admin, 25050, 3, 2025),
            revenue(RevenueType::Location, 99900, 4, 2025),
        ];
        let expenses = vec![expense(40000, (2025, 3, 15), ExpenseStatus::Paid)];

        let summary = summarize_month(1, &revenues, &expenses, 3, 2025);

        assert_eq!(summary.total_revenue, Decimal::new(125050, 2));
        assert_eq!(summary.total_expense, Decimal::new(40000, 2));
        assert_eq!(summary.paid_expense, Decimal::new(40000, 2));
        assert_eq!(summary.pending_expense, Decimal::ZERO);
        assert_eq!(summary.net_profit, Decimal::new(85050, 2));
    }

    #[test]
    fn totals_saturate_instead_of_panicking() {
        let huge = || {
            let mut e = expense(0, (2025, 3, 15), ExpenseStatus::Pending);
            e.value = Decimal::from_scientific("5e28").unwrap();
            e
        };
        let expenses = vec![huge(), huge()];

        let summary = summarize_month(0, &[], &expenses, 3, 2025);
        assert_eq!(summary.total_expense, Decimal::MAX);
        assert_eq!(summary.net_profit, Decimal::MIN);

        let yearly = summarize_year(&[], &expenses, 2025);
        assert_eq!(yearly.months[2].expense, Decimal::MAX);
    }

    #[test]
    fn summary_is_idempotent() {
        let revenues = vec![revenue(RevenueType::Insurance, 1999, 7, 2025)];
        let expenses = vec![expense(999, (2025, 7, 1), ExpenseStatus::Pending)];

        let first = summarize_month(0, &revenues, &expenses, 7, 2025);
        let second = summarize_month(0, &revenues, &expenses, 7, 2025);
        assert_eq!(first, second);
    }

    #[test]
    fn snapshot_month_wins_over_due_date() {
        let mut late = expense(5000, (2025, 3, 31), ExpenseStatus::Pending);
        // Competência gravada diverge do vencimento
        late.month = 4;

        let march = summarize_month(0, &[], std::slice::from_ref(&late), 3, 2025);
        let april = summarize_month(0, &[], std::slice::from_ref(&late), 4, 2025);
        assert_eq!(march.total_expense, Decimal::ZERO);
        assert_eq!(april.pending_expense, Decimal::new(5000, 2));
    }

    #[test]
    fn yearly_has_twelve_months_and_breakdowns() {
        let revenues = vec![
            revenue(RevenueType::Location, 100000, 1, 2025),
            revenue(RevenueType::Admin, 10000, 1, 2025),
            revenue(RevenueType::Location, 100000, 2, 2025),
            revenue(RevenueType::Location, 777700, 2, 2024),
        ];
        let expenses = vec![
            expense(30000, (2025, 1, 10), ExpenseStatus::Paid),
            expense(5000, (2025, 12, 10), ExpenseStatus::Pending),
        ];

        let yearly = summarize_year(&revenues, &expenses, 2025);

        assert_eq!(yearly.months.len(), 12);
        assert_eq!(yearly.months[0].profit, Decimal::new(80000, 2));
        assert_eq!(yearly.months[11].profit, Decimal::new(-5000, 2));
        assert_eq!(yearly.total_revenue, Decimal::new(210000, 2));
        assert_eq!(yearly.total_profit, Decimal::new(175000, 2));

        let location = yearly
            .revenue_by_type
            .iter()
            .find(|t| t.kind == RevenueType::Location)
            .unwrap();
        assert_eq!(location.total, Decimal::new(200000, 2));

        let pending = yearly
            .expense_by_status
            .iter()
            .find(|s| s.status == ExpenseStatus::Pending)
            .unwrap();
        assert_eq!(pending.total, Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn service_reads_only_visible_rows() {
        let store = Arc::new(MemoryStore::new());
        let ana = store.insert_identity("ana@imobras.com.br", "hash", "Ana").await.unwrap().id;
        let bia = store.insert_identity("bia@imobras.com.br", "hash", "Bia").await.unwrap().id;

        let timeout = Duration::from_secs(5);
        let contracts = ContractService::new(store.clone(), timeout);
        let revenues = RevenueService::new(store.clone(), timeout);
        let expenses = ExpenseService::new(store.clone(), timeout);
        let dashboard = DashboardService::new(contracts.clone(), revenues.clone(), expenses.clone());

        let contract = contracts.create(ana, &contract_fields("Apto 101")).await.unwrap();
        revenues
            .create(ana, &revenue_fields(contract.id, RevenueType::Location, 100000, 3, 2025))
            .await
            .unwrap();
        expenses
            .create(bia, &expense_fields("Luz", 40000, (2025, 3, 15), ExpenseStatus::Paid))
            .await
            .unwrap();

        let query = MonthQuery { month: 3, year: 2025 };
        let summary = dashboard.get_summary(ana, query).await.unwrap();
        assert_eq!(summary.contract_count, 1);
        assert_eq!(summary.total_revenue, Decimal::new(100000, 2));
        assert_eq!(summary.total_expense, Decimal::ZERO);
    }

    #[tokio::test]
    async fn invalid_month_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let timeout = Duration::from_secs(5);
        let dashboard = DashboardService::new(
            ContractService::new(store.clone(), timeout),
            RevenueService::new(store.clone(), timeout),
            ExpenseService::new(store, timeout),
        );

        let err = dashboard
            .get_summary(Uuid::new_v4(), MonthQuery { month: 13, year: 2025 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
