// src/handlers/appointments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AdminOnly, AuthenticatedUser, MaybeUser, RequireRole},
    models::appointment::{
        Appointment, AssignOfficerPayload, CreateAppointmentPayload, UpdateStatusPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = Appointment),
        (status = 400, description = "Dados inválidos ou data fora da janela de agendamento")
    ),
    tag = "appointments"
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state
        .appointment_service
        .create(payload, session.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "Agendamentos visíveis para o papel da sessão", body = [Appointment]),
        (status = 401, description = "Sessão ausente ou inválida")
    ),
    security(("api_jwt" = [])),
    tag = "appointments"
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let appointments = state.appointment_service.list_for(&user).await?;
    Ok(Json(appointments))
}

#[utoipa::path(
    patch,
    path = "/api/appointments/{id}/status",
    params(("id" = Uuid, Path, description = "Id do agendamento")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado"),
        (status = 400, description = "Transição inválida"),
        (status = 403, description = "Chamador não é admin nem o oficial atribuído"),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "appointments"
)]
pub async fn update_status(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    state
        .appointment_service
        .update_status(id, &payload.status, &user)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    patch,
    path = "/api/appointments/{id}/assign-officer",
    params(("id" = Uuid, Path, description = "Id do agendamento")),
    request_body = AssignOfficerPayload,
    responses(
        (status = 200, description = "Oficial atribuído"),
        (status = 400, description = "Alvo não é um oficial ativo ou agendamento encerrado"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Agendamento ou oficial não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "appointments"
)]
pub async fn assign_officer(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignOfficerPayload>,
) -> Result<impl IntoResponse, AppError> {
    state
        .appointment_service
        .assign_officer(id, payload.officer_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}
