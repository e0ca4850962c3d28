// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::Permission;

// Um único tipo de erro para o console inteiro: store, backend remoto e HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{entity} {id} não encontrado")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Prospecto {0} já foi convertido em cliente")]
    AlreadyConverted(Uuid),

    #[error("Transição inválida de {from} para {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Sessão ausente ou usuário desconhecido")]
    Unauthenticated,

    #[error("Permissão negada: {0:?}")]
    Forbidden(Permission),

    // Falhas do backend remoto sobem como erro para quem chamou
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de armazenamento local: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        AppError::NotFound { entity, id }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                format!("{} {} não encontrado.", entity, id),
            ),
            AppError::AlreadyConverted(id) => (
                StatusCode::CONFLICT,
                format!("O prospecto {} já foi convertido em cliente.", id),
            ),
            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                format!("Não é possível passar de '{}' para '{}'.", from, to),
            ),
            AppError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Cabeçalho x-user-id ausente ou usuário desconhecido.".to_string(),
            ),
            AppError::Forbidden(permission) => (
                StatusCode::FORBIDDEN,
                format!("Sem permissão para {:?}.", permission),
            ),

            // O resto vira 500. O detalhe só vai para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
