// src/services/session.rs
//
// Session Store: identidade corrente + estado de carregamento.
// Unknown (carregando) -> Authenticated | Anonymous, resolvido uma única vez
// em `restore()`; depois só muda por sign_in / sign_up / sign_out.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, OnceCell};

use crate::{
    common::error::AppError,
    middleware::gate::{guard, GateDecision, SessionSnapshot},
    models::auth::{Identity, LoginUserPayload, RegisterUserPayload},
    services::{auth::AuthService, role_resolver::RoleResolver},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unknown,
    Authenticated(Identity),
    Anonymous,
}

// ---
// Onde o token fica guardado entre execuções
// ---
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, AppError>;
    async fn save(&self, token: &str) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

// Token em memória. O middleware HTTP cria um por requisição com o Bearer.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        *self.token.lock().await = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

// Token num arquivo JSON ({"token": "..."}), para clientes embarcados.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(anyhow::Error::from(e).into()),
        };

        // Arquivo corrompido equivale a não ter sessão
        match serde_json::from_slice::<StoredToken>(&raw) {
            Ok(stored) => Ok(Some(stored.token)),
            Err(e) => {
                tracing::warn!("Arquivo de token ilegível em {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        let body = serde_json::to_vec(&StoredToken {
            token: token.to_string(),
        })
        .map_err(anyhow::Error::from)?;

        tokio::fs::write(&self.path, body)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::from(e).into()),
        }
    }
}

// ---
// O Session Store
// ---
pub struct SessionStore {
    auth: AuthService,
    roles: RoleResolver,
    tokens: Box<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    restored: OnceCell<()>,
    resolve_timeout: Duration,
}

impl SessionStore {
    pub fn new(
        auth: AuthService,
        roles: RoleResolver,
        tokens: Box<dyn TokenStore>,
        resolve_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            auth,
            roles,
            tokens,
            state,
            restored: OnceCell::new(),
            resolve_timeout,
        }
    }

    /// Resolução inicial a partir do token guardado. Roda uma vez só;
    /// chamadas seguintes esperam a primeira terminar.
    pub async fn restore(&self) {
        self.restored
            .get_or_init(|| async {
                let next = match tokio::time::timeout(self.resolve_timeout, self.resolve_token()).await {
                    Ok(Ok(Some(identity))) => SessionState::Authenticated(identity),
                    Ok(Ok(None)) => SessionState::Anonymous,
                    Ok(Err(e)) => {
                        tracing::warn!("Falha ao restaurar sessão: {}", e);
                        SessionState::Anonymous
                    }
                    Err(_) => {
                        tracing::warn!(
                            "⏱️ Sessão não resolvida em {:?}, seguindo como anônimo",
                            self.resolve_timeout
                        );
                        SessionState::Anonymous
                    }
                };

                // Um sign_in concorrente já decidiu o estado: não sobrescreve
                self.state.send_if_modified(|current| {
                    if *current == SessionState::Unknown {
                        *current = next;
                        true
                    } else {
                        false
                    }
                });
            })
            .await;
    }

    async fn resolve_token(&self) -> Result<Option<Identity>, AppError> {
        let Some(token) = self.tokens.load().await? else {
            return Ok(None);
        };

        match self.auth.validate_token(&token).await {
            Ok(identity) => Ok(Some(identity)),
            Err(AppError::InvalidToken) | Err(AppError::UserNotFound) => {
                self.tokens.clear().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        match &*self.state.borrow() {
            SessionState::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    pub fn loading(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Unknown)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Falha não altera o estado.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let payload = LoginUserPayload {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session = self.auth.login_user(&payload).await?;
        self.enter(session.token, session.user).await
    }

    /// Cria a conta e já entra com ela.
    pub async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<Identity, AppError> {
        let payload = RegisterUserPayload {
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
        };
        let session = self.auth.register_user(&payload).await?;
        self.enter(session.token, session.user).await
    }

    async fn enter(&self, token: String, identity: Identity) -> Result<Identity, AppError> {
        self.tokens.save(&token).await?;
        self.roles.invalidate().await;
        self.state
            .send_replace(SessionState::Authenticated(identity.clone()));

        tracing::info!("🔑 Sessão iniciada para {}", identity.id);
        Ok(identity)
    }

    /// Sem sessão ativa é um no-op.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        if !matches!(*self.state.borrow(), SessionState::Authenticated(_)) {
            return Ok(());
        }

        if let Some(token) = self.tokens.load().await? {
            match self.auth.logout(&token).await {
                Ok(()) | Err(AppError::InvalidToken) => {}
                Err(e) => return Err(e),
            }
        }

        self.tokens.clear().await?;
        self.roles.invalidate().await;
        self.state.send_replace(SessionState::Anonymous);
        Ok(())
    }

    pub async fn is_admin(&self) -> Result<bool, AppError> {
        match self.current_identity() {
            Some(identity) => self.roles.is_admin(identity.id).await,
            None => Ok(false),
        }
    }

    /// O papel só é consultado quando a rota exige admin.
    pub async fn snapshot(&self, requires_admin: bool) -> Result<SessionSnapshot, AppError> {
        let loading = self.loading();
        let identity = self.current_identity();

        let is_admin = match &identity {
            Some(identity) if requires_admin && !loading => self.roles.is_admin(identity.id).await?,
            _ => false,
        };

        Ok(SessionSnapshot {
            loading,
            identity,
            is_admin,
        })
    }

    pub async fn authorize(&self, requires_admin: bool) -> Result<GateDecision, AppError> {
        let snapshot = self.snapshot(requires_admin).await?;
        Ok(guard(&snapshot, requires_admin))
    }
}
