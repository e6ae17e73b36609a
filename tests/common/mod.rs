use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use imobras::{
    build_app,
    config::{AppConfig, AppState, StoreBackend},
    db::MemoryStore,
};

pub const ADMIN_EMAIL: &str = "chefe@imobras.com.br";

/// Router completo sobre um armazenamento em memória novo.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig {
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt_secret: "segredo-de-teste".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            session_resolve_timeout: Duration::from_secs(10),
            store_timeout: Duration::from_secs(15),
            admin_emails: vec![ADMIN_EMAIL.to_string()],
        };
        let state = AppState::with_store(config, Arc::new(MemoryStore::new()));
        Self {
            router: build_app(state),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Registra e devolve o token da sessão.
    pub async fn register(&self, email: &str, name: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": "senha123", "fullName": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_contract(&self, token: &str, name: &str) -> Value {
        let (status, body) = self.post("/api/contracts", token, contract_body(name)).await;
        assert_eq!(status, StatusCode::CREATED, "create contract failed: {body}");
        body
    }
}

pub fn contract_body(name: &str) -> Value {
    json!({
        "name": name,
        "owner": { "name": "Carlos Pereira", "document": "123.456.789-00" },
        "tenant": { "name": "Ana Lima", "document": "987.654.321-00" },
        "property": { "address": "Rua das Flores, 123", "iptu": "000.123.4567-8", "dueDay": 10 },
        "period": { "startDate": "2025-01-01", "endDate": "2026-12-31" },
        "rentValue": 2500.0,
        "iptuValue": 180.0,
        "adminFeePercentage": 10.0
    })
}

pub fn expense_body(description: &str, value: f64, due_date: &str) -> Value {
    json!({
        "description": description,
        "value": value,
        "dueDate": due_date,
        "bank": "Banco do Brasil",
        "paymentMethod": "Boleto"
    })
}
