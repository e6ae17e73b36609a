pub mod auth;
pub mod contracts;
pub mod dashboard;
pub mod finance;
pub mod rbac;
