pub mod auth;
pub mod contract;
pub mod dashboard;
pub mod finance;
pub mod rbac;
