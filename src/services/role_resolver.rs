// src/services/role_resolver.rs

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::{db_utils::bounded, error::AppError},
    db::RecordStore,
    models::rbac::has_admin_role,
};

// Decide se a identidade é admin consultando `user_roles`.
// Guarda a última resposta até a identidade mudar ou `invalidate()`.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
    cache: Arc<Mutex<Option<(Uuid, bool)>>>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn is_admin(&self, identity_id: Uuid) -> Result<bool, AppError> {
        let mut cache = self.cache.lock().await;

        if let Some((cached_id, is_admin)) = *cache {
            if cached_id == identity_id {
                return Ok(is_admin);
            }
        }

        let assignments = bounded(self.timeout, self.store.roles_of(identity_id)).await?;
        let is_admin = has_admin_role(&assignments);

        *cache = Some((identity_id, is_admin));
        Ok(is_admin)
    }

    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}
