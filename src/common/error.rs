// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;
use crate::models::quotes::QuoteStatus;

// Erros de domínio. A tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Login já existe")]
    LoginAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Categoria já existe: {0}")]
    CategoryAlreadyExists(String),

    #[error("Transição de status inválida: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: QuoteStatus, to: QuoteStatus },

    #[error("Orçamento não pode mais ser alterado")]
    QuoteLocked,

    #[error("Composição do orçamento inválida: {0}")]
    InvalidBreakdown(String),

    #[error("Falha no cálculo da comissão: {0}")]
    CommissionComputation(String),

    #[error("Competência inválida para a data '{0}'")]
    InvalidCompetence(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que sai pela API (já traduzido)
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

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidBreakdown(_)
            | AppError::InvalidCompetence(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::LoginAlreadyExists
            | AppError::CategoryAlreadyExists(_)
            | AppError::InvalidStatusTransition { .. }
            | AppError::QuoteLocked => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::CompanyNotFound | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::CommissionComputation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta da API, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status_code();
        let pt = locale.is_portuguese();

        if let AppError::ValidationError(errors) = self {
            let mut details = serde_json::Map::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<Value> = field_errors
                    .iter()
                    .map(|e| {
                        let msg = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string());
                        Value::String(msg)
                    })
                    .collect();
                details.insert(field.to_string(), Value::Array(messages));
            }
            let error = if pt {
                "Um ou mais campos são inválidos."
            } else {
                "One or more fields are invalid."
            };
            return ApiError {
                status,
                error: error.to_string(),
                details: Some(Value::Object(details)),
            };
        }

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let error = match self {
            AppError::EmailAlreadyExists if pt => "Este e-mail já está em uso.".to_string(),
            AppError::EmailAlreadyExists => "This e-mail is already in use.".to_string(),
            AppError::LoginAlreadyExists if pt => "Este login já está em uso.".to_string(),
            AppError::LoginAlreadyExists => "This login is already in use.".to_string(),
            AppError::InvalidCredentials if pt => "E-mail ou senha inválidos.".to_string(),
            AppError::InvalidCredentials => "Invalid credentials.".to_string(),
            AppError::InvalidToken if pt => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::InvalidToken => "Missing or invalid authentication token.".to_string(),
            AppError::Forbidden if pt => "Você não tem acesso a este recurso.".to_string(),
            AppError::Forbidden => "You do not have access to this resource.".to_string(),
            AppError::CompanyNotFound if pt => "Empresa não encontrada.".to_string(),
            AppError::CompanyNotFound => "Company not found.".to_string(),
            AppError::ResourceNotFound(what) if pt => format!("Não encontrado: {}", what),
            AppError::ResourceNotFound(what) => format!("Not found: {}", what),
            AppError::CategoryAlreadyExists(name) if pt => format!("A categoria '{}' já existe.", name),
            AppError::CategoryAlreadyExists(name) => format!("Category '{}' already exists.", name),
            AppError::InvalidStatusTransition { from, to } if pt => {
                format!("Não é possível mudar o orçamento de {} para {}.", from.as_str(), to.as_str())
            }
            AppError::InvalidStatusTransition { from, to } => {
                format!("Cannot move quote from {} to {}.", from.as_str(), to.as_str())
            }
            AppError::QuoteLocked if pt => "Apenas orçamentos pendentes podem ser alterados.".to_string(),
            AppError::QuoteLocked => "Only pending quotes can be changed.".to_string(),
            AppError::InvalidBreakdown(reason) if pt => format!("Composição inválida: {}", reason),
            AppError::InvalidBreakdown(reason) => format!("Invalid breakdown: {}", reason),
            AppError::CommissionComputation(reason) if pt => {
                format!("Não foi possível calcular a comissão: {}", reason)
            }
            AppError::CommissionComputation(reason) => format!("Commission could not be computed: {}", reason),
            AppError::InvalidCompetence(date) if pt => {
                format!("A data '{}' não está no formato AAAA-MM.", date)
            }
            AppError::InvalidCompetence(date) => format!("Date '{}' does not start with YYYY-MM.", date),
            _ if pt => "Ocorreu um erro inesperado.".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        };

        ApiError { status, error, details: None }
    }
}

// Usado pelos extratores, que não têm acesso ao idioma.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::QuoteLocked.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidCompetence("15/03/2024".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::CommissionComputation("taxa".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_messages_follow_locale() {
        let err = AppError::InvalidStatusTransition {
            from: QuoteStatus::Rejected,
            to: QuoteStatus::Approved,
        };
        let pt = err.to_api_error(&Locale("pt".into()));
        assert_eq!(pt.error, "Não é possível mudar o orçamento de REJECTED para APPROVED.");

        let en = err.to_api_error(&Locale("en".into()));
        assert_eq!(en.error, "Cannot move quote from REJECTED to APPROVED.");
        assert_eq!(en.status, StatusCode::CONFLICT);
    }
}
