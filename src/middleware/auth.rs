// src/middleware/auth.rs
//
// Extratores de autenticação. Em vez de um middleware global, cada handler
// declara o que precisa: `AuthenticatedUser` exige um Bearer token válido,
// `MaybeUser` aceita requisições anônimas (agendamento de visitantes).

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{common::error::AppError, config::AppState, models::auth::User};

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Usuário autenticado. Rejeita com 401 quando o token falta ou é inválido.
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts).ok_or(AppError::Auth)?;
        let user = state.auth_service.authenticate(token).await?;
        Ok(Self(user))
    }
}

/// Sessão opcional. Token ausente ou inválido vira `None` em vez de 401,
/// para que visitantes consigam agendar sem conta.
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = match bearer_token(parts) {
            Some(token) => state.auth_service.authenticate(token).await.ok(),
            None => None,
        };
        Ok(Self(user))
    }
}
