// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AdminOnly, RequireRole},
    models::dashboard::DashboardStats,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Resumo administrativo do dia", body = DashboardStats),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = [])),
    tag = "admin"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.stats.dashboard_stats().await?;
    Ok(Json(stats))
}
