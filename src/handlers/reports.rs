// src/handlers/reports.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum::Json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{RequireRole, Staff},
    models::report::ReportResponse,
};

#[utoipa::path(
    post,
    path = "/api/reports/generate/{appointment_id}",
    params(("appointment_id" = Uuid, Path, description = "Id do agendamento")),
    responses(
        (status = 201, description = "Laudo gerado; PDF embutido em base64", body = ReportResponse),
        (status = 400, description = "Sem itens, sem cliente vinculado ou laudo já existente"),
        (status = 403, description = "Chamador não é admin nem o oficial atribuído"),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "reports"
)]
pub async fn generate_report(
    State(state): State<AppState>,
    staff: RequireRole<Staff>,
    Path(appointment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let response = state
        .report_service
        .generate(appointment_id, &staff.user)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
