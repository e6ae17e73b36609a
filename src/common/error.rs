// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erro de domínio. Cada variante tem uma chave de tradução (ver `code()`).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // --- Portão de autorização ---
    #[error("Autenticação necessária")]
    Unauthenticated,

    #[error("Privilégio insuficiente")]
    InsufficientPrivilege,

    #[error("Sessão ainda carregando")]
    SessionPending,

    // --- Armazenamento ---
    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Contrato referenciado não existe")]
    ContractNotFound,

    #[error("Permissão negada pela política de acesso")]
    PermissionDenied,

    #[error("Um administrador não pode remover a própria conta")]
    CannotDeleteSelf,

    #[error("Valor fora da faixa aceita pelo armazenamento")]
    ValueOutOfRange,

    #[error("Tempo limite excedido ao acessar o armazenamento")]
    StoreTimeout,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` guarda o contexto de falhas inesperadas.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Chave usada no catálogo de mensagens do `I18nStore`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::Unauthenticated => "unauthenticated",
            AppError::InsufficientPrivilege => "insufficient_privilege",
            AppError::SessionPending => "session_pending",
            AppError::NotFound(_) => "not_found",
            AppError::ContractNotFound => "contract_not_found",
            AppError::PermissionDenied => "permission_denied",
            AppError::CannotDeleteSelf => "cannot_delete_self",
            AppError::ValueOutOfRange => "value_out_of_range",
            AppError::StoreTimeout => "store_timeout",
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientPrivilege | AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::SessionPending => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ContractNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CannotDeleteSelf | AppError::ValueOutOfRange => StatusCode::BAD_REQUEST,
            AppError::StoreTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro numa resposta traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError {
            status,
            error: i18n.translate(&locale.0, self.code()),
            details,
        }
    }
}

// Agrupa as mensagens de cada campo inválido: { "campo": ["msg", ...] }
fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details = serde_json::Map::new();
    collect_field_errors(errors, "", &mut details);
    Value::Object(details)
}

fn collect_field_errors(
    errors: &validator::ValidationErrors,
    prefix: &str,
    out: &mut serde_json::Map<String, Value>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<Value> = field_errors
                    .iter()
                    .map(|e| {
                        let text = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string());
                        Value::String(text)
                    })
                    .collect();
                out.insert(path, Value::Array(messages));
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

// Corpo de erro devolvido ao cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Fallback quando não há contexto de idioma (ex.: middleware): usa pt-BR.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
        password: String,
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Probe { password: "abc".into() }.validate().unwrap_err();
        let api = AppError::from(errors).to_api_error(&Locale::default(), &I18nStore::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(
            details["password"][0],
            "A senha deve ter no mínimo 6 caracteres."
        );
    }

    #[test]
    fn gate_errors_map_to_auth_statuses() {
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InsufficientPrivilege.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::SessionPending.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(AppError::StoreTimeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn numeric_overflow_is_a_client_error() {
        let api = AppError::ValueOutOfRange.to_api_error(&Locale("en".into()), &I18nStore::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Numeric value out of range.");
    }

    #[test]
    fn messages_follow_locale() {
        let i18n = I18nStore::default();
        let en = AppError::InvalidCredentials.to_api_error(&Locale("en".into()), &i18n);
        let pt = AppError::InvalidCredentials.to_api_error(&Locale("pt".into()), &i18n);

        assert_eq!(en.error, "Invalid e-mail or password.");
        assert_eq!(pt.error, "E-mail ou senha inválidos.");
    }
}
