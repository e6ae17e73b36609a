// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

// Uma linha de `user_roles`. Um usuário pode ter várias (inclusive repetidas).
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}

/// Sem nenhuma linha `admin` o papel efetivo é `user`.
pub fn has_admin_role(assignments: &[RoleAssignment]) -> bool {
    assignments.iter().any(|a| a.role == AppRole::Admin)
}

// Linha do painel administrativo: perfil + papéis
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRoles {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<AppRole>,
    pub is_admin: bool,
}

// Convite feito por um administrador
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteUserPayload {
    #[validate(email(message = "Email inválido"), length(max = 255))]
    #[schema(example = "novo.corretor@imobras.com.br")]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "A senha deve ter no mínimo 6 caracteres"))]
    pub password: String,

    #[validate(length(min = 2, max = 100, message = "Nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "João Lima")]
    pub full_name: String,

    #[serde(default = "default_invite_role")]
    #[schema(example = "user")]
    pub role: AppRole,
}

fn default_invite_role() -> AppRole {
    AppRole::User
}

// Resultado de POST /api/admin/users/{id}/toggle-admin
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleChange {
    pub user_id: Uuid,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: Uuid, role: AppRole) -> RoleAssignment {
        RoleAssignment {
            id: Uuid::new_v4(),
            user_id,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_rows_means_plain_user() {
        assert!(!has_admin_role(&[]));
    }

    #[test]
    fn any_admin_row_wins_over_user_rows() {
        let id = Uuid::new_v4();
        let rows = vec![row(id, AppRole::User), row(id, AppRole::Admin), row(id, AppRole::User)];
        assert!(has_admin_role(&rows));
    }

    #[test]
    fn only_user_rows_is_not_admin() {
        let id = Uuid::new_v4();
        assert!(!has_admin_role(&[row(id, AppRole::User), row(id, AppRole::User)]));
    }
}
