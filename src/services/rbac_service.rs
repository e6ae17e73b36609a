// src/services/rbac_service.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::bounded, error::AppError},
    db::RecordStore,
    models::{
        auth::Identity,
        rbac::{has_admin_role, AppRole, InviteUserPayload, RoleAssignment, RoleChange, UserWithRoles},
    },
    services::auth::AuthService,
};

// Atribuições de papel + painel administrativo de usuários.
// A autorização final é do armazenamento (admin ou PermissionDenied).
#[derive(Clone)]
pub struct RbacService {
    store: Arc<dyn RecordStore>,
    auth: AuthService,
    timeout: Duration,
}

impl RbacService {
    pub fn new(store: Arc<dyn RecordStore>, auth: AuthService, timeout: Duration) -> Self {
        Self { store, auth, timeout }
    }

    /// Admin vê todas; usuário comum, só as próprias.
    pub async fn list_role_assignments(&self, actor: Uuid) -> Result<Vec<RoleAssignment>, AppError> {
        bounded(self.timeout, self.store.list_role_assignments(actor)).await
    }

    pub async fn list_users_with_roles(&self, actor: Uuid) -> Result<Vec<UserWithRoles>, AppError> {
        let users = bounded(self.timeout, self.store.list_identities(actor)).await?;
        let assignments = self.list_role_assignments(actor).await?;

        let mut by_user: HashMap<Uuid, Vec<RoleAssignment>> = HashMap::new();
        for assignment in assignments {
            by_user.entry(assignment.user_id).or_default().push(assignment);
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let rows = by_user.remove(&user.id).unwrap_or_default();
                with_roles(user, &rows)
            })
            .collect())
    }

    pub async fn invite_user(&self, actor: Uuid, payload: &InviteUserPayload) -> Result<UserWithRoles, AppError> {
        payload.validate()?;

        // 1. Só administrador convida. Conta e papel são gravados em passos
        //    separados, então a checagem vem antes de criar qualquer coisa.
        let actor_roles = bounded(self.timeout, self.store.roles_of(actor)).await?;
        if !has_admin_role(&actor_roles) {
            return Err(AppError::PermissionDenied);
        }

        // 2. Conta nasce como usuário comum
        let user = self
            .auth
            .create_account(&payload.email, &payload.password, &payload.full_name, AppRole::User)
            .await?;

        // 3. Promoção passa pela política de acesso do armazenamento
        if payload.role == AppRole::Admin {
            bounded(self.timeout, self.store.grant_role(actor, user.id, AppRole::Admin)).await?;
        }

        tracing::info!("✉️ Usuário {} convidado por {}", user.id, actor);
        let rows = bounded(self.timeout, self.store.roles_of(user.id)).await?;
        Ok(with_roles(user, &rows))
    }

    pub async fn grant_admin(&self, actor: Uuid, target: Uuid) -> Result<RoleChange, AppError> {
        self.ensure_exists(target).await?;
        bounded(self.timeout, self.store.grant_role(actor, target, AppRole::Admin)).await?;

        tracing::info!("🛡️ {} promovido a admin por {}", target, actor);
        Ok(RoleChange { user_id: target, is_admin: true })
    }

    pub async fn revoke_admin(&self, actor: Uuid, target: Uuid) -> Result<RoleChange, AppError> {
        self.ensure_exists(target).await?;
        let removed = bounded(self.timeout, self.store.revoke_role(actor, target, AppRole::Admin)).await?;

        tracing::info!("🛡️ {} deixou de ser admin ({} linhas removidas)", target, removed);
        Ok(RoleChange { user_id: target, is_admin: false })
    }

    /// Concede se não é admin; revoga se é.
    pub async fn toggle_admin(&self, actor: Uuid, target: Uuid) -> Result<RoleChange, AppError> {
        self.ensure_exists(target).await?;
        let rows = bounded(self.timeout, self.store.roles_of(target)).await?;

        if has_admin_role(&rows) {
            self.revoke_admin(actor, target).await
        } else {
            self.grant_admin(actor, target).await
        }
    }

    /// Remove a identidade, seus papéis e sessões. Os registros dela ficam.
    pub async fn delete_user(&self, actor: Uuid, target: Uuid) -> Result<(), AppError> {
        if actor == target {
            return Err(AppError::CannotDeleteSelf);
        }

        let deleted = bounded(self.timeout, self.store.delete_identity(actor, target)).await?;
        if !deleted {
            return Err(AppError::UserNotFound);
        }

        tracing::info!("🗑️ Usuário {} removido por {}", target, actor);
        Ok(())
    }

    async fn ensure_exists(&self, target: Uuid) -> Result<Identity, AppError> {
        bounded(self.timeout, self.store.find_identity(target))
            .await?
            .ok_or(AppError::UserNotFound)
    }
}

fn with_roles(user: Identity, rows: &[RoleAssignment]) -> UserWithRoles {
    let mut roles: Vec<AppRole> = Vec::new();
    for row in rows {
        if !roles.contains(&row.role) {
            roles.push(row.role);
        }
    }

    UserWithRoles {
        id: user.id,
        email: user.email,
        full_name: user.display_name,
        created_at: user.created_at,
        is_admin: has_admin_role(rows),
        roles,
    }
}
