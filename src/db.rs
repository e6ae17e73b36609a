pub mod policy;
pub mod pg_store;
pub use pg_store::PgStore;
pub mod memory_store;
pub use memory_store::MemoryStore;

pub mod user_repo;
pub use user_repo::IdentityRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod rbac_repo;
pub use rbac_repo::RoleRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod finance_repo;
pub use finance_repo::{ExpenseRepository, RevenueRepository};

/// Tudo o que os serviços precisam do armazenamento.
pub trait RecordStore:
    IdentityRepository
    + SessionRepository
    + RoleRepository
    + ContractRepository
    + RevenueRepository
    + ExpenseRepository
{
}

impl<T> RecordStore for T where
    T: IdentityRepository
        + SessionRepository
        + RoleRepository
        + ContractRepository
        + RevenueRepository
        + ExpenseRepository
{
}
