// src/services/auth.rs

use std::{sync::Arc, time::Duration};

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use validator::Validate;

use crate::{
    common::{db_utils::bounded, error::AppError},
    db::RecordStore,
    models::{
        auth::{AuthResponse, Claims, Identity, LoginUserPayload, RegisterUserPayload, UpdateProfilePayload},
        rbac::AppRole,
    },
};

const SESSION_DAYS: i64 = 7;

// E-mails são comparados sem diferenciar maiúsculas
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RecordStore>,
    jwt_secret: String,
    admin_emails: Arc<Vec<String>>,
    timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        jwt_secret: String,
        admin_emails: Vec<String>,
        timeout: Duration,
    ) -> Self {
        let admin_emails = admin_emails.iter().map(|e| normalize_email(e)).collect();
        Self {
            store,
            jwt_secret,
            admin_emails: Arc::new(admin_emails),
            timeout,
        }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;

        let email = normalize_email(&payload.email);
        // Bootstrap: e-mails configurados nascem administradores
        let role = if self.admin_emails.contains(&email) {
            AppRole::Admin
        } else {
            AppRole::User
        };

        let user = self
            .create_account(&email, &payload.password, &payload.full_name, role)
            .await?;

        let token = self.open_session(&user).await?;
        Ok(AuthResponse { token, user })
    }

    /// Cria a identidade e seu papel inicial (cadastro e convite).
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: AppRole,
    ) -> Result<Identity, AppError> {
        let email = normalize_email(email);

        // 1. Hashing fora do runtime assíncrono
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
            ?;

        // 2. Cria o usuário
        let user = bounded(
            self.timeout,
            self.store.insert_identity(&email, &hashed_password, full_name.trim()),
        )
        .await?;

        // 3. Papel inicial
        bounded(self.timeout, self.store.assign_initial_role(user.id, role)).await?;

        tracing::info!("👤 Conta criada: {} ({:?})", user.id, role);
        Ok(user)
    }

    pub async fn login_user(&self, payload: &LoginUserPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;

        let email = normalize_email(&payload.email);
        let user = bounded(self.timeout, self.store.find_identity_by_email(&email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = payload.password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.open_session(&user).await?;
        Ok(AuthResponse { token, user })
    }

    /// Token válido = assinatura ok, sessão ativa e identidade existente.
    pub async fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        let claims = self.decode_claims(token)?;

        let session = bounded(self.timeout, self.store.find_session(claims.sid))
            .await?
            .ok_or(AppError::InvalidToken)?;

        if session.user_id != claims.sub || !session.is_active(Utc::now()) {
            return Err(AppError::InvalidToken);
        }

        bounded(self.timeout, self.store.find_identity(claims.sub))
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Revoga a sessão do token. Sessão já revogada não é erro.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let claims = self.decode_claims(token)?;
        let revoked = bounded(self.timeout, self.store.revoke_session(claims.sid)).await?;
        if revoked {
            tracing::info!("🚪 Sessão {} encerrada", claims.sid);
        }
        Ok(())
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        payload: &UpdateProfilePayload,
    ) -> Result<Identity, AppError> {
        payload.validate()?;

        bounded(
            self.timeout,
            self.store.update_display_name(identity.id, payload.full_name.trim()),
        )
        .await?
        .ok_or(AppError::UserNotFound)
    }

    async fn open_session(&self, user: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(SESSION_DAYS);

        let session = bounded(self.timeout, self.store.create_session(user.id, expires_at)).await?;

        let claims = Claims {
            sub: user.id,
            sid: session.id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{IdentityRepository, MemoryStore, RoleRepository};

    fn service(admin_emails: Vec<String>) -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(
            store.clone(),
            "segredo-de-teste".into(),
            admin_emails,
            Duration::from_secs(5),
        );
        (auth, store)
    }

    fn register(email: &str) -> RegisterUserPayload {
        RegisterUserPayload {
            email: email.into(),
            password: "senha123".into(),
            full_name: "Maria Souza".into(),
        }
    }

    #[tokio::test]
    async fn register_then_validate_token() {
        let (auth, _) = service(vec![]);
        let session = auth.register_user(&register("Maria@Imobras.com.br")).await.unwrap();

        assert_eq!(session.user.email, "maria@imobras.com.br");
        let identity = auth.validate_token(&session.token).await.unwrap();
        assert_eq!(identity.id, session.user.id);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (auth, _) = service(vec![]);
        auth.register_user(&register("maria@imobras.com.br")).await.unwrap();
        let err = auth.register_user(&register("MARIA@imobras.com.br")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (auth, _) = service(vec![]);
        auth.register_user(&register("maria@imobras.com.br")).await.unwrap();

        let err = auth
            .login_user(&LoginUserPayload {
                email: "maria@imobras.com.br".into(),
                password: "errada99".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let (auth, _) = service(vec![]);
        let session = auth.register_user(&register("maria@imobras.com.br")).await.unwrap();

        auth.logout(&session.token).await.unwrap();

        let err = auth.validate_token(&session.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn configured_emails_become_admins() {
        let (auth, store) = service(vec!["Chefe@Imobras.com.br".into()]);
        let boss = auth.register_user(&register("chefe@imobras.com.br")).await.unwrap();
        let plain = auth.register_user(&register("maria@imobras.com.br")).await.unwrap();

        let boss_roles = store.roles_of(boss.user.id).await.unwrap();
        let plain_roles = store.roles_of(plain.user.id).await.unwrap();
        assert_eq!(boss_roles[0].role, AppRole::Admin);
        assert_eq!(plain_roles[0].role, AppRole::User);
    }

    #[tokio::test]
    async fn short_password_never_reaches_the_store() {
        let (auth, store) = service(vec![]);
        let mut payload = register("maria@imobras.com.br");
        payload.password = "123".into();

        let err = auth.register_user(&payload).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(store.find_identity_by_email("maria@imobras.com.br").await.unwrap().is_none());
    }
}
