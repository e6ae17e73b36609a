// src/db/policy.rs
//
// Política de acesso avaliada na fronteira do armazenamento. É a mesma regra
// das policies RLS em `migrations/`: uma linha é visível/alterável pela
// identidade X se X é a dona da linha OU X tem o papel `admin`.

use uuid::Uuid;

use crate::common::error::AppError;

// Quem está executando a operação, com o papel já resolvido pelo próprio
// armazenamento (nunca informado pelo cliente).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_admin || self.id == owner_id
    }

    /// Gestão de papéis e de identidades alheias é exclusiva de admins.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}
