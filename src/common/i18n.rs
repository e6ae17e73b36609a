// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Catálogo de mensagens por idioma. Chaves vêm de `AppError::code()`.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let pt = HashMap::from([
            ("validation_error", "Um ou mais campos são inválidos."),
            ("email_already_exists", "Este e-mail já está em uso."),
            ("invalid_credentials", "E-mail ou senha inválidos."),
            ("invalid_token", "Token de autenticação inválido ou ausente."),
            ("user_not_found", "Usuário não encontrado."),
            ("unauthenticated", "Você precisa estar logado para acessar este recurso."),
            (
                "insufficient_privilege",
                "Apenas administradores autorizados podem acessar esta área.",
            ),
            ("session_pending", "Carregando sessão, tente novamente."),
            ("not_found", "Registro não encontrado."),
            ("contract_not_found", "O contrato informado não existe."),
            ("permission_denied", "Você não tem permissão para alterar este registro."),
            ("cannot_delete_self", "Você não pode remover a sua própria conta."),
            ("value_out_of_range", "Valor numérico fora da faixa permitida."),
            ("store_timeout", "O servidor demorou demais para responder. Tente novamente."),
            ("internal_error", "Ocorreu um erro inesperado."),
        ]);

        let en = HashMap::from([
            ("validation_error", "One or more fields are invalid."),
            ("email_already_exists", "This e-mail is already in use."),
            ("invalid_credentials", "Invalid e-mail or password."),
            ("invalid_token", "Missing or invalid authentication token."),
            ("user_not_found", "User not found."),
            ("unauthenticated", "You must be signed in to access this resource."),
            (
                "insufficient_privilege",
                "Only authorized administrators can access this area.",
            ),
            ("session_pending", "Session is still loading, please retry."),
            ("not_found", "Record not found."),
            ("contract_not_found", "The referenced contract does not exist."),
            ("permission_denied", "You are not allowed to change this record."),
            ("cannot_delete_self", "You cannot delete your own account."),
            ("value_out_of_range", "Numeric value out of range."),
            ("store_timeout", "The server took too long to respond. Please retry."),
            ("internal_error", "An unexpected error occurred."),
        ]);

        Self {
            catalogs: HashMap::from([("pt", pt), ("en", en)]),
        }
    }

    /// Traduz a chave; cai para pt-BR e, por fim, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| {
                self.catalogs
                    .get(DEFAULT_LANG)
                    .and_then(|catalog| catalog.get(key))
            })
            .map(|message| message.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
