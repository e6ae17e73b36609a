// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// Identidade autenticada (tabela `users`).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "corretor@imobras.com.br")]
    pub email: String,

    #[sqlx(rename = "full_name")]
    #[schema(example = "Maria Souza")]
    pub display_name: Option<String>,

    #[serde(skip_serializing)] // Nunca sai na API
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Sessão no servidor: permite revogar o token no logout.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "Email inválido"), length(max = 255))]
    #[schema(example = "corretor@imobras.com.br")]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "A senha deve ter no mínimo 6 caracteres"))]
    pub password: String,

    #[validate(length(min = 2, max = 100, message = "Nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Maria Souza")]
    pub full_name: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "Email inválido"), length(max = 255))]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "A senha deve ter no mínimo 6 caracteres"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 2, max = 100, message = "Nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Maria S. Souza")]
    pub full_name: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: Identity,
}

// GET /api/users/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub identity: Identity,
    pub is_admin: bool,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do usuário
    pub sid: Uuid,  // ID da sessão (revogável)
    pub exp: usize,
    pub iat: usize,
}
