// src/handlers/officers.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AdminOnly, RequireRole},
    models::auth::User,
};

#[utoipa::path(
    get,
    path = "/api/officers",
    responses(
        (status = 200, description = "Oficiais ativos disponíveis para atribuição", body = [User]),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = [])),
    tag = "admin"
)]
pub async fn list_officers(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let officers = state.users.list_active_officers().await?;
    Ok(Json(officers))
}
