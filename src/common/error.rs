// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Taxonomia de erros do núcleo. Cada variante mapeia para um status HTTP
// específico no IntoResponse abaixo.
#[derive(Debug, Error)]
pub enum AppError {
    // Entrada malformada ou fora das regras (janela de agendamento,
    // categoria desconhecida, campos faltando).
    #[error("{0}")]
    Validation(String),

    // Erros do `validator` nos payloads (vira um mapa campo -> mensagens).
    #[error("Payload inválido")]
    PayloadValidation(#[from] validator::ValidationErrors),

    // Sessão ausente ou token inválido.
    #[error("Missing or invalid authentication token")]
    Auth,

    #[error("Invalid email or password")]
    InvalidCredentials,

    // Autenticado, mas sem papel/posse para a operação.
    #[error("{0}")]
    Permission(String),

    #[error("{0}")]
    NotFound(String),

    // Pedido válido, mas a entidade está num estado que não permite a
    // operação (agendamento terminal, laudo sem itens, oficial inativo).
    #[error("{0}")]
    Precondition(String),

    // Falha de colaborador externo (e-mail, envelope de assinatura).
    // NUNCA propaga como falha da operação que a disparou; só é logada.
    #[error("External dependency failure: {0}")]
    Dependency(String),

    // Falha na composição do PDF. O laudo vira 'failed', o agendamento
    // não sofre rollback, e a mensagem crua sobe para o oficial.
    #[error("{0}")]
    Render(String),

    #[error("Erro de banco de dados")]
    Database(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    Internal(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo por campo.
            AppError::PayloadValidation(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Validation(msg) | AppError::Precondition(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Auth => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authentication token.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password.".to_string(),
            ),
            AppError::Permission(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            // A mensagem crua de renderização sobe para quem disparou a geração.
            AppError::Render(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),

            // Dependency nunca deveria chegar aqui (o padrão é try/ignore nos
            // pontos de disparo), mas se chegar vira 500 como os demais.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
