pub mod auth;
pub mod contract_service;
pub mod dashboard_service;
pub mod expense_service;
pub mod rbac_service;
pub mod revenue_service;
pub mod role_resolver;
pub mod session;
