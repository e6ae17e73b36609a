// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,

        // --- Contracts ---
        handlers::contracts::list_contracts,
        handlers::contracts::get_contract,
        handlers::contracts::create_contract,
        handlers::contracts::update_contract,
        handlers::contracts::delete_contract,

        // --- Revenues ---
        handlers::finance::list_revenues,
        handlers::finance::create_revenue,
        handlers::finance::delete_revenue,

        // --- Expenses ---
        handlers::finance::list_expenses,
        handlers::finance::create_expense,
        handlers::finance::update_expense,
        handlers::finance::toggle_expense_status,
        handlers::finance::delete_expense,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_yearly,

        // --- RBAC ---
        handlers::rbac::list_roles,
        handlers::rbac::list_users,
        handlers::rbac::invite_user,
        handlers::rbac::delete_user,
        handlers::rbac::toggle_admin,
        handlers::rbac::grant_admin,
        handlers::rbac::revoke_admin,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Identity,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- Contracts ---
            models::contract::Party,
            models::contract::Property,
            models::contract::LeasePeriod,
            models::contract::ContractFields,
            models::contract::Contract,

            // --- FINANCE ---
            models::finance::RevenueType,
            models::finance::ExpenseStatus,
            models::finance::RevenueFields,
            models::finance::Revenue,
            models::finance::RevenueEntry,
            models::finance::ExpenseFields,
            models::finance::ExpenseChanges,
            models::finance::Expense,

            // --- DASHBOARD ---
            models::dashboard::MonthlySummary,
            models::dashboard::MonthlyBreakdown,
            models::dashboard::RevenueTypeTotal,
            models::dashboard::ExpenseStatusTotal,
            models::dashboard::YearlySummary,

            // --- RBAC ---
            models::rbac::AppRole,
            models::rbac::RoleAssignment,
            models::rbac::UserWithRoles,
            models::rbac::InviteUserPayload,
            models::rbac::RoleChange,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Contracts", description = "Contratos de Locação"),
        (name = "Revenues", description = "Receitas Mensais"),
        (name = "Expenses", description = "Despesas"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais"),
        (name = "RBAC", description = "Papéis dos Usuários"),
        (name = "Admin", description = "Gestão de Usuários (apenas administradores)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
