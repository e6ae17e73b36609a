// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    common::i18n::I18nStore,
    db::{MemoryStore, PgStore, RecordStore},
    services::{
        auth::AuthService,
        contract_service::ContractService,
        dashboard_service::DashboardService,
        expense_service::ExpenseService,
        rbac_service::RbacService,
        revenue_service::RevenueService,
        role_resolver::RoleResolver,
        session::{MemoryTokenStore, SessionStore},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("STORE_BACKEND inválido: '{}' (use postgres ou memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub session_resolve_timeout: Duration,
    pub store_timeout: Duration,
    pub admin_emails: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            store_backend,
            database_url: env::var("DATABASE_URL").ok(),
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            session_resolve_timeout: secs_from_env("SESSION_RESOLVE_TIMEOUT_SECS", 10)?,
            store_timeout: secs_from_env("STORE_TIMEOUT_SECS", 15)?,
            admin_emails: env::var("ADMIN_EMAILS")
                .map(|raw| parse_email_list(&raw))
                .unwrap_or_default(),
        })
    }
}

fn secs_from_env(key: &str, default: u64) -> anyhow::Result<Duration> {
    match env::var(key) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{} deve ser um número de segundos", key))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub contract_service: ContractService,
    pub revenue_service: RevenueService,
    pub expense_service: ExpenseService,
    pub rbac_service: RbacService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn RecordStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;
                Arc::new(PgStore::connect(database_url).await?)
            }
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: os dados somem ao reiniciar");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        let timeout = config.store_timeout;

        let auth_service = AuthService::new(
            store.clone(),
            config.jwt_secret.clone(),
            config.admin_emails.clone(),
            timeout,
        );
        let contract_service = ContractService::new(store.clone(), timeout);
        let revenue_service = RevenueService::new(store.clone(), timeout);
        let expense_service = ExpenseService::new(store.clone(), timeout);
        let rbac_service = RbacService::new(store.clone(), auth_service.clone(), timeout);
        let dashboard_service = DashboardService::new(
            contract_service.clone(),
            revenue_service.clone(),
            expense_service.clone(),
        );

        Self {
            config: Arc::new(config),
            store,
            i18n_store: Arc::new(I18nStore::new()),
            auth_service,
            contract_service,
            revenue_service,
            expense_service,
            rbac_service,
            dashboard_service,
        }
    }

    /// Session Store de uma requisição, semeado com o token do cliente.
    pub fn session_for(&self, token: Option<String>) -> SessionStore {
        SessionStore::new(
            self.auth_service.clone(),
            RoleResolver::new(self.store.clone(), self.config.store_timeout),
            Box::new(MemoryTokenStore::new(token)),
            self.config.session_resolve_timeout,
        )
    }
}
