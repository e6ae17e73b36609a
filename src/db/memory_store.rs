// src/db/memory_store.rs
//
// Backend em memória (STORE_BACKEND=memory). Aplica a mesma política de
// acesso das policies RLS do Postgres via `Actor`, resolvendo o papel a
// partir da sua própria tabela de papéis.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        contract_repo::ContractRepository,
        finance_repo::{ExpenseRepository, RevenueRepository},
        policy::Actor,
        rbac_repo::RoleRepository,
        session_repo::SessionRepository,
        user_repo::IdentityRepository,
    },
    models::{
        auth::{Identity, SessionRecord},
        contract::{Contract, ContractFields},
        finance::{Expense, ExpenseFields, ExpenseUpdate, PeriodFilter, Revenue, RevenueFields},
        rbac::{AppRole, RoleAssignment},
    },
};

// Cada Vec guarda as linhas em ordem de inserção
#[derive(Default)]
struct Tables {
    users: Vec<Identity>,
    sessions: Vec<SessionRecord>,
    roles: Vec<RoleAssignment>,
    contracts: Vec<Contract>,
    revenues: Vec<Revenue>,
    expenses: Vec<Expense>,
}

impl Tables {
    fn actor(&self, id: Uuid) -> Actor {
        let is_admin = self.roles.iter().any(|r| r.user_id == id && r.role == AppRole::Admin);
        Actor { id, is_admin }
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn push_role(&mut self, identity_id: Uuid, role: AppRole) -> Result<RoleAssignment, AppError> {
        if !self.user_exists(identity_id) {
            return Err(AppError::UserNotFound);
        }
        let assignment = RoleAssignment {
            id: Uuid::new_v4(),
            user_id: identity_id,
            role,
            created_at: Utc::now(),
        };
        self.roles.push(assignment.clone());
        Ok(assignment)
    }
}

// Mais recentes primeiro = ordem de inserção invertida
fn newest_first<T: Clone>(rows: &[T], visible: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().rev().filter(|row| visible(row)).cloned().collect()
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_identity(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<Identity, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(AppError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: Some(full_name.to_string()),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(identity.clone());
        Ok(identity)
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        full_name: &str,
    ) -> Result<Option<Identity>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.display_name = Some(full_name.to_string());
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list_identities(&self, actor: Uuid) -> Result<Vec<Identity>, AppError> {
        let tables = self.tables.read().await;
        let caller = tables.actor(actor);
        Ok(newest_first(&tables.users, |u| caller.can_access(u.id)))
    }

    async fn delete_identity(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        tables.actor(actor).require_admin()?;

        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        // Mesmo efeito do ON DELETE CASCADE
        tables.roles.retain(|r| r.user_id != id);
        tables.sessions.retain(|s| s.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create_session(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<SessionRecord, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(user_id) {
            return Err(AppError::UserNotFound);
        }

        let session = SessionRecord {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            expires_at,
            revoked_at: None,
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<SessionRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.sessions.iter_mut().find(|s| s.id == id && s.revoked_at.is_none()) {
            Some(session) => {
                session.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn roles_of(&self, identity_id: Uuid) -> Result<Vec<RoleAssignment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().filter(|r| r.user_id == identity_id).cloned().collect())
    }

    async fn list_role_assignments(&self, actor: Uuid) -> Result<Vec<RoleAssignment>, AppError> {
        let tables = self.tables.read().await;
        let caller = tables.actor(actor);
        Ok(newest_first(&tables.roles, |r| caller.can_access(r.user_id)))
    }

    async fn grant_role(&self, actor: Uuid, identity_id: Uuid, role: AppRole) -> Result<RoleAssignment, AppError> {
        let mut tables = self.tables.write().await;
        tables.actor(actor).require_admin()?;

        if let Some(existing) = tables
            .roles
            .iter()
            .find(|r| r.user_id == identity_id && r.role == role)
        {
            return Ok(existing.clone());
        }
        tables.push_role(identity_id, role)
    }

    async fn revoke_role(&self, actor: Uuid, identity_id: Uuid, role: AppRole) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        tables.actor(actor).require_admin()?;

        let before = tables.roles.len();
        tables.roles.retain(|r| !(r.user_id == identity_id && r.role == role));
        Ok((before - tables.roles.len()) as u64)
    }

    async fn assign_initial_role(&self, identity_id: Uuid, role: AppRole) -> Result<RoleAssignment, AppError> {
        let mut tables = self.tables.write().await;
        tables.push_role(identity_id, role)
    }
}

#[async_trait]
impl ContractRepository for MemoryStore {
    async fn list_contracts(&self, actor: Uuid) -> Result<Vec<Contract>, AppError> {
        let tables = self.tables.read().await;
        let caller = tables.actor(actor);
        Ok(newest_first(&tables.contracts, |c| caller.can_access(c.user_id)))
    }

    async fn find_contract(&self, actor: Uuid, id: Uuid) -> Result<Option<Contract>, AppError> {
        let tables = self.tables.read().await;
        let caller = tables.actor(actor);
        Ok(tables
            .contracts
            .iter()
            .find(|c| c.id == id && caller.can_access(c.user_id))
            .cloned())
    }

    async fn insert_contract(&self, actor: Uuid, fields: &ContractFields) -> Result<Contract, AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let contract = Contract {
            id: Uuid::new_v4(),
            user_id: actor,
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.contracts.push(contract.clone());
        Ok(contract)
    }

    async fn update_contract(
        &self,
        actor: Uuid,
        id: Uuid,
        fields: &ContractFields,
    ) -> Result<Option<Contract>, AppError> {
        let mut tables = self.tables.write().await;
        let caller = tables.actor(actor);
        let Some(contract) = tables
            .contracts
            .iter_mut()
            .find(|c| c.id == id && caller.can_access(c.user_id))
        else {
            return Ok(None);
        };

        contract.fields = fields.clone();
        contract.updated_at = Utc::now();
        Ok(Some(contract.clone()))
    }

    async fn delete_contract(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let caller = tables.actor(actor);
        let before = tables.contracts.len();
        tables
            .contracts
            .retain(|c| !(c.id == id && caller.can_access(c.user_id)));
        Ok(tables.contracts.len() < before)
    }
}

#[async_trait]
impl RevenueRepository for MemoryStore {
    async fn list_revenues(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Revenue>, AppError> {
        let tables = self.tables.read().await;
        let caller = tables.actor(actor);
        Ok(newest_first(&tables.revenues, |r| {
            caller.can_access(r.user_id) && filter.matches(r.fields.month, r.fields.year)
        }))
    }

    async fn insert_revenue(&self, actor: Uuid, fields: &RevenueFields) -> Result<Revenue, AppError> {
        let mut tables = self.tables.write().await;
        let revenue = Revenue {
            id: Uuid::new_v4(),
            user_id: actor,
            fields: fields.clone(),
            created_at: Utc::now(),
        };
        tables.revenues.push(revenue.clone());
        Ok(revenue)
    }

    async fn delete_revenue(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let caller = tables.actor(actor);
        let before = tables.revenues.len();
        tables
            .revenues
            .retain(|r| !(r.id == id && caller.can_access(r.user_id)));
        Ok(tables.revenues.len() < before)
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn list_expenses(&self, actor: Uuid, filter: PeriodFilter) -> Result<Vec<Expense>, AppError> {
        let tables = self.tables.read().await;
        let caller = tables.actor(actor);
        Ok(newest_first(&tables.expenses, |e| {
            caller.can_access(e.user_id) && filter.matches(e.month, e.year)
        }))
    }

    async fn find_expense(&self, actor: Uuid, id: Uuid) -> Result<Option<Expense>, AppError> {
        let tables = self.tables.read().await;
        let caller = tables.actor(actor);
        Ok(tables
            .expenses
            .iter()
            .find(|e| e.id == id && caller.can_access(e.user_id))
            .cloned())
    }

    async fn insert_expense(&self, actor: Uuid, fields: &ExpenseFields) -> Result<Expense, AppError> {
        let mut tables = self.tables.write().await;
        let expense = Expense::from_fields(Uuid::new_v4(), actor, fields.clone(), Utc::now());
        tables.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn update_expense(
        &self,
        actor: Uuid,
        id: Uuid,
        update: &ExpenseUpdate,
    ) -> Result<Option<Expense>, AppError> {
        let mut tables = self.tables.write().await;
        let caller = tables.actor(actor);
        let Some(expense) = tables
            .expenses
            .iter_mut()
            .find(|e| e.id == id && caller.can_access(e.user_id))
        else {
            return Ok(None);
        };

        expense.apply(update, Utc::now());
        Ok(Some(expense.clone()))
    }

    async fn toggle_expense_status(&self, actor: Uuid, id: Uuid) -> Result<Option<Expense>, AppError> {
        let mut tables = self.tables.write().await;
        let caller = tables.actor(actor);
        let Some(expense) = tables
            .expenses
            .iter_mut()
            .find(|e| e.id == id && caller.can_access(e.user_id))
        else {
            return Ok(None);
        };

        expense.status = expense.status.toggled();
        expense.updated_at = Utc::now();
        Ok(Some(expense.clone()))
    }

    async fn delete_expense(&self, actor: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let caller = tables.actor(actor);
        let before = tables.expenses.len();
        tables
            .expenses
            .retain(|e| !(e.id == id && caller.can_access(e.user_id)));
        Ok(tables.expenses.len() < before)
    }
}
